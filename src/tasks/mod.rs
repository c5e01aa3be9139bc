//! Background tasks module
//!
//! Tasks that run alongside the HTTP server: the persistence writer and one
//! ticker per running session.

pub mod persist_writer;
pub mod session_ticker;

pub use persist_writer::{persist_writer_task, PersistCommand, PersistHandle};
pub use session_ticker::session_ticker_task;
