//! Pagination, sorting, and filter types shared by services and repositories.

use serde::{Deserialize, Serialize};

use crate::domain::{AiModel, ResultType};
use crate::error::{DomainError, FieldError};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;
pub const MAX_PAGE: u64 = 1_000_000;

pub const DEFAULT_POPULAR_LIMIT: u64 = 20;
pub const DEFAULT_CATEGORY_LIMIT: u64 = 50;

/// A validated page request. `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Build from raw query values. Zero and negative values are rejected, as
    /// are pages past [`MAX_PAGE`]; the limit is capped at [`MAX_LIMIT`].
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Result<Self, DomainError> {
        let mut errors = Vec::new();

        let page = match page {
            None => DEFAULT_PAGE,
            Some(value) if value > 0 && value as u64 <= MAX_PAGE => value as u64,
            Some(value) if value > 0 => {
                errors.push(FieldError::new(
                    "page",
                    format!("Page must not exceed {MAX_PAGE}"),
                ));
                DEFAULT_PAGE
            }
            Some(_) => {
                errors.push(FieldError::new("page", "Page must be a positive integer"));
                DEFAULT_PAGE
            }
        };

        let limit = match limit {
            None => DEFAULT_LIMIT,
            Some(value) if value > 0 => (value as u64).min(MAX_LIMIT),
            Some(_) => {
                errors.push(FieldError::new("limit", "Limit must be a positive integer"));
                DEFAULT_LIMIT
            }
        };

        if !errors.is_empty() {
            return Err(DomainError::Validation(errors));
        }

        Ok(Self { page, limit })
    }

    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

/// Pagination metadata returned alongside list results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub pages: u64,
}

impl Pagination {
    pub fn new(request: PageRequest, total: u64) -> Self {
        Self {
            page: request.page,
            limit: request.limit,
            total,
            pages: total.div_ceil(request.limit),
        }
    }
}

/// One page of results.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            pagination: Pagination::new(request, total),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Sortable prompt fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PromptSortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Title,
    Category,
    Likes,
    Views,
    Uses,
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PromptSort {
    pub field: PromptSortField,
    pub order: SortOrder,
}

/// Sortable user fields. Listings always sort descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UserSortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Name,
    Username,
    LastLogin,
}

/// Sortable comment fields. Listings always sort descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommentSortField {
    #[default]
    CreatedAt,
    UpdatedAt,
}

/// Filters for the prompt listing. Empty lists mean "no filter".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptFilter {
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub result_type: Option<ResultType>,
    pub works_best_with: Vec<AiModel>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

/// Split a comma-separated value into trimmed, non-empty parts.
pub fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Extract search terms: alphanumeric runs, lowercased.
pub fn search_terms(query: &str) -> Vec<String> {
    query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|term| !term.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Build a PostgreSQL tsquery that matches any of the terms, each as a prefix.
pub fn build_tsquery(query: &str) -> Option<String> {
    let terms = search_terms(query);
    if terms.is_empty() {
        return None;
    }
    let terms: Vec<String> = terms.into_iter().map(|term| format!("{term}:*")).collect();
    Some(terms.join(" | "))
}

/// Escape LIKE wildcards so user input matches literally.
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_is_ceiling_of_total_over_limit() {
        let request = PageRequest::new(Some(2), Some(5)).unwrap();
        let pagination = Pagination::new(request, 12);
        assert_eq!(
            pagination,
            Pagination {
                page: 2,
                limit: 5,
                total: 12,
                pages: 3
            }
        );
        assert_eq!(request.offset(), 5);

        assert_eq!(Pagination::new(request, 0).pages, 0);
        assert_eq!(Pagination::new(request, 10).pages, 2);
    }

    #[test]
    fn page_request_defaults_and_caps() {
        assert_eq!(PageRequest::new(None, None).unwrap(), PageRequest::default());
        assert_eq!(PageRequest::new(None, Some(500)).unwrap().limit, MAX_LIMIT);
    }

    #[test]
    fn page_request_rejects_zero() {
        let err = PageRequest::new(Some(0), Some(-5)).unwrap_err();
        match err {
            DomainError::Validation(fields) => {
                let names: Vec<_> = fields.iter().map(|f| f.field.as_str()).collect();
                assert_eq!(names, vec!["page", "limit"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn page_request_bounds_page_and_offset() {
        let err = PageRequest::new(Some(i64::MAX), Some(100)).unwrap_err();
        match err {
            DomainError::Validation(fields) => {
                assert_eq!(fields.len(), 1);
                assert_eq!(fields[0].field, "page");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let last = PageRequest::new(Some(MAX_PAGE as i64), Some(100)).unwrap();
        assert_eq!(last.offset(), (MAX_PAGE - 1) * 100);

        let unchecked = PageRequest {
            page: u64::MAX,
            limit: MAX_LIMIT,
        };
        assert_eq!(unchecked.offset(), u64::MAX);
    }

    #[test]
    fn tsquery_ors_sanitized_terms() {
        assert_eq!(
            build_tsquery("Code review!"),
            Some("code:* | review:*".to_string())
        );
        assert_eq!(build_tsquery("rev:*"), Some("rev:*".to_string()));
        assert_eq!(build_tsquery("  & | "), None);
    }

    #[test]
    fn csv_and_like_helpers() {
        assert_eq!(split_csv("a, b,,c "), vec!["a", "b", "c"]);
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
    }
}
