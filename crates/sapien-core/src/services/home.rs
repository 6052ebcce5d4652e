use std::sync::Arc;

use serde::Serialize;

use crate::error::DomainError;
use crate::ports::{CommentRepository, PromptRepository, UserRepository};

/// Landing page counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HomeStats {
    pub creators: u64,
    /// Active prompts only.
    pub prompts: u64,
    pub comments: u64,
}

pub struct HomeService {
    users: Arc<dyn UserRepository>,
    prompts: Arc<dyn PromptRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl HomeService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        prompts: Arc<dyn PromptRepository>,
        comments: Arc<dyn CommentRepository>,
    ) -> Self {
        Self {
            users,
            prompts,
            comments,
        }
    }

    /// Run the three counts concurrently.
    pub async fn stats(&self) -> Result<HomeStats, DomainError> {
        let (creators, prompts, comments) = futures::try_join!(
            self.users.count(),
            self.prompts.count_active(),
            self.comments.count()
        )?;

        Ok(HomeStats {
            creators,
            prompts,
            comments,
        })
    }
}
