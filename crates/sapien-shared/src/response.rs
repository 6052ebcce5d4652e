//! Standardized API response envelope.
//!
//! Every response carries `success`; the rest of the keys are present only
//! when they apply.

use sapien_core::domain::Prompt;
use sapien_core::query::{Page, Pagination};
use serde::{Deserialize, Serialize};

/// Standard successful API response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            count: None,
            pagination: None,
        }
    }

    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::ok(data)
        }
    }

    /// A success with no payload, e.g. a permanent delete.
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            count: None,
            pagination: None,
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    /// A list response that also reports its length.
    pub fn counted(items: Vec<T>) -> Self {
        Self {
            count: Some(items.len()),
            ..Self::ok(items)
        }
    }

    pub fn paginated(page: Page<T>) -> Self {
        Self {
            pagination: Some(page.pagination),
            ..Self::ok(page.items)
        }
    }
}

/// Error envelope: `{ success: false, error, details? }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Serialize) -> Self {
        self.details = serde_json::to_value(details).ok();
        self
    }
}

/// A prompt as served by the API, with its derived `versionString`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptView {
    #[serde(flatten)]
    pub prompt: Prompt,
    pub version_string: String,
}

impl From<Prompt> for PromptView {
    fn from(prompt: Prompt) -> Self {
        Self {
            version_string: prompt.version_string(),
            prompt,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    pub current_version: i32,
    pub version_string: String,
}

impl From<&Prompt> for VersionInfo {
    fn from(prompt: &Prompt) -> Self {
        Self {
            current_version: prompt.version,
            version_string: prompt.version_string(),
        }
    }
}

/// Like counter after an increment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LikesCount {
    pub likes: i64,
}

/// Use counter after an increment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UsesCount {
    pub uses: i64,
}

/// Payload of a delete acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedId {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use sapien_core::domain::{NewPrompt, ResultType};
    use sapien_core::query::PageRequest;

    #[test]
    fn envelope_omits_absent_keys() {
        let json = serde_json::to_value(ApiResponse::ok(1)).unwrap();
        assert_eq!(json, serde_json::json!({ "success": true, "data": 1 }));

        let json = serde_json::to_value(ApiResponse::<()>::message_only("gone")).unwrap();
        assert_eq!(json, serde_json::json!({ "success": true, "message": "gone" }));
    }

    #[test]
    fn paginated_envelope_carries_metadata() {
        let page = Page::new(vec![1, 2], PageRequest::new(Some(1), Some(2)).unwrap(), 5);
        let json = serde_json::to_value(ApiResponse::paginated(page)).unwrap();
        assert_eq!(json["pagination"]["pages"], 3);
        assert_eq!(json["data"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn prompt_view_flattens_with_version_string() {
        let prompt = Prompt::new(NewPrompt {
            title: "T".to_string(),
            description: "D".to_string(),
            content: "C".to_string(),
            category: "X".to_string(),
            tags: vec![],
            cover_image: None,
            result_type: ResultType::Image,
            sample_output: None,
            works_best_with: vec![],
            created_by: None,
        });

        let json = serde_json::to_value(PromptView::from(prompt)).unwrap();
        assert_eq!(json["versionString"], "v1");
        assert_eq!(json["resultType"], "image");
        assert_eq!(json["isActive"], true);
    }

    #[test]
    fn error_envelope_shape() {
        let json = serde_json::to_value(
            ErrorResponse::new("Validation error").with_details(vec!["x"]),
        )
        .unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["details"][0], "x");
    }
}
