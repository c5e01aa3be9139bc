//! Configuration and CLI argument handling

use std::path::PathBuf;

use clap::Parser;
use directories::ProjectDirs;

use crate::{
    state::SessionDefaults,
    timer::plan::{DEFAULT_REST_SECONDS, DEFAULT_WORKOUT_ROUNDS},
};

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "fitsync")]
#[command(about = "A local fitness tracker with session timers and daily stats")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Directory holding the persisted stats
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Keep everything in memory; nothing survives a restart
    #[arg(long)]
    pub ephemeral: bool,

    /// Rest between workout exercises in seconds
    #[arg(long, default_value_t = DEFAULT_REST_SECONDS)]
    pub rest_seconds: u32,

    /// Number of workout rounds
    #[arg(long, default_value_t = DEFAULT_WORKOUT_ROUNDS)]
    pub rounds: u32,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// `--data-dir`, or the platform's local data directory
    pub fn data_dir(&self) -> Option<PathBuf> {
        self.data_dir.clone().or_else(|| {
            ProjectDirs::from("", "", "fitsync").map(|dirs| dirs.data_local_dir().to_path_buf())
        })
    }

    pub fn session_defaults(&self) -> SessionDefaults {
        SessionDefaults {
            rest_seconds: self.rest_seconds,
            rounds: self.rounds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["fitsync"]).unwrap();
        assert_eq!(config.address(), "127.0.0.1:20554");
        assert_eq!(config.log_level(), "info");
        assert!(!config.ephemeral);
        assert_eq!(config.session_defaults(), SessionDefaults::default());
    }

    #[test]
    fn explicit_data_dir_wins() {
        let config =
            Config::try_parse_from(["fitsync", "--data-dir", "/tmp/fit", "-v", "--rounds", "2"]).unwrap();
        assert_eq!(config.data_dir(), Some(PathBuf::from("/tmp/fit")));
        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.session_defaults().rounds, 2);
    }
}
