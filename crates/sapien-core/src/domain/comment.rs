use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AuthorSummary, PromptSummary};

/// Comment entity - a user's remark on a prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    #[serde(rename = "user")]
    pub user_id: Uuid,
    #[serde(rename = "prompt")]
    pub prompt_id: Uuid,
    pub content: String,
    pub is_edited: bool,
    pub edited_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(user_id: Uuid, prompt_id: Uuid, content: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            prompt_id,
            content: content.trim().to_string(),
            is_edited: false,
            edited_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the content and stamp the edit.
    pub fn edit(&mut self, content: &str) {
        let now = Utc::now();
        self.content = content.trim().to_string();
        self.is_edited = true;
        self.edited_at = Some(now);
        self.updated_at = now;
    }
}

/// A reference that is either joined with its summary or left as a bare id
/// (not requested, or the referenced record is gone).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Populated<T> {
    Resolved(T),
    Reference(Uuid),
}

impl<T> Populated<T> {
    pub fn from_option(id: Uuid, resolved: Option<T>) -> Self {
        match resolved {
            Some(value) => Populated::Resolved(value),
            None => Populated::Reference(id),
        }
    }

    pub fn resolved(&self) -> Option<&T> {
        match self {
            Populated::Resolved(value) => Some(value),
            Populated::Reference(_) => None,
        }
    }
}

/// Comment as returned by the API, with joined author and prompt fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: Uuid,
    pub user: Populated<AuthorSummary>,
    pub prompt: Populated<PromptSummary>,
    pub content: String,
    pub is_edited: bool,
    pub edited_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CommentView {
    pub fn new(
        comment: Comment,
        author: Option<AuthorSummary>,
        prompt: Option<PromptSummary>,
    ) -> Self {
        Self {
            id: comment.id,
            user: Populated::from_option(comment.user_id, author),
            prompt: Populated::from_option(comment.prompt_id, prompt),
            content: comment.content,
            is_edited: comment.is_edited,
            edited_at: comment.edited_at,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_marks_comment() {
        let mut comment = Comment::new(Uuid::new_v4(), Uuid::new_v4(), "  hello  ");
        assert_eq!(comment.content, "hello");
        assert!(!comment.is_edited);

        comment.edit(" updated ");
        assert_eq!(comment.content, "updated");
        assert!(comment.is_edited);
        assert!(comment.edited_at.is_some());
    }

    #[test]
    fn view_falls_back_to_reference() {
        let comment = Comment::new(Uuid::new_v4(), Uuid::new_v4(), "hi");
        let user_id = comment.user_id;
        let view = CommentView::new(comment, None, None);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["user"], serde_json::json!(user_id));
    }
}
