//! In-memory repositories - used when no database is configured, and in tests.
//!
//! All three repositories share one [`MemoryStore`] so comment views can join
//! users and prompts the same way the SQL repositories do.
//! Note: Data is lost on process restart.

mod comment;
mod prompt;
mod user;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use sapien_core::domain::{Comment, Prompt, User};
use sapien_core::query::PageRequest;

pub use comment::InMemoryCommentRepository;
pub use prompt::InMemoryPromptRepository;
pub use user::InMemoryUserRepository;

/// Backing tables for the in-memory repositories.
#[derive(Default)]
pub struct MemoryStore {
    pub(crate) users: RwLock<HashMap<Uuid, User>>,
    pub(crate) prompts: RwLock<HashMap<Uuid, Prompt>>,
    pub(crate) comments: RwLock<HashMap<Uuid, Comment>>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

/// Slice one page out of an already sorted list.
fn paginate<T>(items: Vec<T>, page: PageRequest) -> (Vec<T>, u64) {
    let total = items.len() as u64;
    let items = items
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit as usize)
        .collect();
    (items, total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paginate_reports_total_and_slices() {
        let page = PageRequest::new(Some(2), Some(2)).unwrap();
        let (items, total) = paginate(vec![1, 2, 3, 4, 5], page);
        assert_eq!(items, vec![3, 4]);
        assert_eq!(total, 5);

        let page = PageRequest::new(Some(4), Some(2)).unwrap();
        let (items, _) = paginate(vec![1, 2, 3, 4, 5], page);
        assert!(items.is_empty());
    }
}
