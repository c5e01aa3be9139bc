//! Featured articles and which ones the user liked

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::TrackerError,
    storage::{Scope, Slot, Storage},
};

pub const BLOGS_KEY: &str = "fitness_blogs";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: u64,
    pub title: String,
    pub author: String,
    /// Reading time as shown on the card, e.g. `5 min read`
    pub time: String,
    pub content: String,
    pub liked: bool,
}

impl BlogPost {
    fn new(id: u64, title: &str, author: &str, time: &str, content: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
            author: author.to_string(),
            time: time.to_string(),
            content: content.to_string(),
            liked: false,
        }
    }
}

pub fn default_posts() -> Vec<BlogPost> {
    vec![
        BlogPost::new(
            1,
            "How to Build Muscle Fast",
            "Alex Fitness",
            "5 min read",
            "Progressive overload, enough protein and real rest days do most of the work.",
        ),
        BlogPost::new(
            2,
            "Nutrition Tips for Beginners",
            "Nutrition Expert",
            "3 min read",
            "Start with regular meals, plenty of vegetables and water before anything fancy.",
        ),
        BlogPost::new(
            3,
            "Cardio vs Weight Training",
            "Fitness Pro",
            "7 min read",
            "Both improve health; mixing them beats picking a side.",
        ),
    ]
}

#[derive(Debug)]
pub struct BlogFeed {
    posts: Slot<Vec<BlogPost>>,
}

impl BlogFeed {
    pub fn new(storage: Storage) -> Self {
        Self {
            posts: Slot::new(storage, BLOGS_KEY, Scope::Lifetime, default_posts()),
        }
    }

    pub fn posts(&self) -> Vec<BlogPost> {
        self.posts.get()
    }

    /// Flip the liked flag of post `id`
    pub fn toggle_like(&self, id: u64) -> Result<BlogPost, TrackerError> {
        let post = self
            .posts
            .update(|posts| {
                let post = posts.iter_mut().find(|p| p.id == id)?;
                post.liked = !post.liked;
                Some(post.clone())
            })
            .ok_or(TrackerError::NotFound { kind: "post", id })?;
        info!("Post {} liked: {}", id, post.liked);
        Ok(post)
    }

    /// Every post back to not liked
    pub fn reset(&self) {
        self.posts.reset();
    }
}
