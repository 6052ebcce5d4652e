//! Data Transfer Objects - request types for the API.
//!
//! Every body DTO is trimmed, validated, and converted into its domain input in
//! one `into_*` call so handlers never see a half-checked value.

use sapien_core::domain::{
    AiModel, LoginMode, NewPrompt, NewUser, PromptChanges, PromptPatch, ResultType, UserChanges,
};
use sapien_core::query::{
    CommentSortField, PageRequest, PromptFilter, PromptSort, PromptSortField, SortOrder,
    UserSortField, split_csv,
};
use sapien_core::{DomainError, FieldError};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::validation::{
    StringList, flexible_bool, into_domain_error, login_mode_validator, models_validator,
    result_type_validator, trim, url_validator, username_validator, uuid_validator,
};

fn parse_models(list: Option<StringList>) -> Option<Vec<AiModel>> {
    list.map(|models| {
        models
            .into_inner()
            .iter()
            .filter_map(|model| model.parse().ok())
            .collect()
    })
}

fn parse_result_type(value: Option<String>) -> Option<ResultType> {
    value.and_then(|v| v.parse().ok())
}

// ---------------------------------------------------------------------------
// Prompts
// ---------------------------------------------------------------------------

/// Request to publish a prompt. JSON or multipart text fields.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePromptRequest {
    #[validate(
        required(message = "Title is required"),
        length(min = 1, max = 200, message = "Title must be between 1 and 200 characters")
    )]
    pub title: Option<String>,

    #[validate(
        required(message = "Description is required"),
        length(
            min = 1,
            max = 1000,
            message = "Description must be between 1 and 1000 characters"
        )
    )]
    pub description: Option<String>,

    #[validate(
        required(message = "Prompt content is required"),
        length(min = 1, message = "Content cannot be empty")
    )]
    pub content: Option<String>,

    #[validate(
        required(message = "Category is required"),
        length(min = 1, message = "Category cannot be empty")
    )]
    pub category: Option<String>,

    #[validate(
        required(message = "Result type is required"),
        custom(function = "result_type_validator")
    )]
    pub result_type: Option<String>,

    pub tags: Option<StringList>,

    #[validate(custom(function = "models_validator"))]
    pub works_best_with: Option<StringList>,

    #[validate(length(max = 2000, message = "Sample output cannot exceed 2000 characters"))]
    pub sample_output: Option<String>,

    #[validate(length(
        min = 1,
        max = 100,
        message = "Created by must be between 1 and 100 characters"
    ))]
    pub created_by: Option<String>,

    /// Set by the upload handler, never read from the client body.
    #[serde(skip)]
    pub cover_image: Option<String>,
}

impl CreatePromptRequest {
    pub fn into_new_prompt(mut self) -> Result<NewPrompt, DomainError> {
        for field in [
            &mut self.title,
            &mut self.description,
            &mut self.content,
            &mut self.category,
            &mut self.result_type,
            &mut self.sample_output,
            &mut self.created_by,
        ] {
            trim(field);
        }
        self.validate().map_err(into_domain_error)?;

        Ok(NewPrompt {
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            content: self.content.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            tags: self.tags.map(StringList::into_inner).unwrap_or_default(),
            cover_image: self.cover_image,
            result_type: parse_result_type(self.result_type).unwrap_or_default(),
            sample_output: self.sample_output,
            works_best_with: parse_models(self.works_best_with).unwrap_or_default(),
            created_by: self.created_by,
        })
    }
}

/// Full prompt update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePromptRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: Option<String>,

    #[validate(length(
        min = 1,
        max = 1000,
        message = "Description must be between 1 and 1000 characters"
    ))]
    pub description: Option<String>,

    #[validate(length(min = 1, message = "Content cannot be empty"))]
    pub content: Option<String>,

    #[validate(length(min = 1, message = "Category cannot be empty"))]
    pub category: Option<String>,

    #[validate(custom(function = "result_type_validator"))]
    pub result_type: Option<String>,

    pub tags: Option<StringList>,

    #[validate(custom(function = "models_validator"))]
    pub works_best_with: Option<StringList>,

    #[validate(length(max = 2000, message = "Sample output cannot exceed 2000 characters"))]
    pub sample_output: Option<String>,

    #[serde(default, deserialize_with = "flexible_bool")]
    pub is_active: Option<bool>,

    #[validate(length(
        min = 1,
        max = 100,
        message = "Updated by must be between 1 and 100 characters"
    ))]
    pub updated_by: Option<String>,

    /// Either a stored upload path or a URL supplied in the JSON body.
    pub cover_image: Option<String>,
}

impl UpdatePromptRequest {
    pub fn into_changes(mut self) -> Result<PromptChanges, DomainError> {
        for field in [
            &mut self.title,
            &mut self.description,
            &mut self.content,
            &mut self.category,
            &mut self.result_type,
            &mut self.sample_output,
            &mut self.updated_by,
        ] {
            trim(field);
        }
        self.validate().map_err(into_domain_error)?;

        Ok(PromptChanges {
            title: self.title,
            description: self.description,
            content: self.content,
            category: self.category,
            tags: self.tags.map(StringList::into_inner),
            cover_image: self.cover_image,
            result_type: parse_result_type(self.result_type),
            sample_output: self.sample_output,
            works_best_with: parse_models(self.works_best_with),
            is_active: self.is_active,
            updated_by: self.updated_by,
        })
    }
}

/// Partial update. Only these fields are accepted; anything else in the body
/// is ignored.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PatchPromptRequest {
    #[serde(default, deserialize_with = "flexible_bool")]
    pub is_active: Option<bool>,

    pub tags: Option<Vec<String>>,

    #[validate(length(
        min = 1,
        max = 100,
        message = "Updated by must be between 1 and 100 characters"
    ))]
    pub updated_by: Option<String>,

    #[validate(range(min = 0, message = "Likes must be a non-negative integer"))]
    pub likes: Option<i64>,

    #[validate(range(min = 0, message = "Uses must be a non-negative integer"))]
    pub uses: Option<i64>,
}

impl PatchPromptRequest {
    pub fn into_patch(mut self) -> Result<PromptPatch, DomainError> {
        trim(&mut self.updated_by);
        self.validate().map_err(into_domain_error)?;

        Ok(PromptPatch {
            is_active: self.is_active,
            tags: self.tags,
            updated_by: self.updated_by,
            likes: self.likes,
            uses: self.uses,
        })
    }
}

/// Query string for `GET /api/prompts`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub category: Option<String>,
    pub tags: Option<String>,
    pub result_type: Option<String>,
    pub works_best_with: Option<String>,
    pub is_active: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<PromptSortField>,
    pub sort_order: Option<SortOrder>,
}

impl PromptListQuery {
    /// Resolve the raw query into filter, sort, and page. Every bad value is
    /// reported together.
    pub fn into_parts(self) -> Result<(PromptFilter, PromptSort, PageRequest), DomainError> {
        let mut errors: Vec<FieldError> = Vec::new();

        let page = match PageRequest::new(self.page, self.limit) {
            Ok(page) => Some(page),
            Err(DomainError::Validation(mut fields)) => {
                errors.append(&mut fields);
                None
            }
            Err(other) => return Err(other),
        };

        let result_type = match non_blank(self.result_type) {
            Some(raw) => match raw.parse::<ResultType>() {
                Ok(kind) => Some(kind),
                Err(_) => {
                    errors.push(FieldError::new(
                        "resultType",
                        "Result type must be text, image, or video",
                    ));
                    None
                }
            },
            None => None,
        };

        let mut works_best_with = Vec::new();
        for raw in self.works_best_with.as_deref().map(split_csv).unwrap_or_default() {
            match raw.parse::<AiModel>() {
                Ok(model) => works_best_with.push(model),
                Err(_) => {
                    errors.push(FieldError::new(
                        "worksBestWith",
                        format!("Unknown model: {raw}"),
                    ));
                }
            }
        }

        let is_active = match non_blank(self.is_active).as_deref() {
            None => None,
            Some("true") => Some(true),
            Some("false") => Some(false),
            Some(_) => {
                errors.push(FieldError::new("isActive", "isActive must be true or false"));
                None
            }
        };

        let page = match page {
            Some(page) if errors.is_empty() => page,
            _ => return Err(DomainError::Validation(errors)),
        };

        let filter = PromptFilter {
            category: non_blank(self.category),
            tags: self
                .tags
                .as_deref()
                .map(split_csv)
                .unwrap_or_default()
                .into_iter()
                .map(|tag| tag.to_lowercase())
                .collect(),
            result_type,
            works_best_with,
            is_active,
            search: non_blank(self.search),
        };
        let sort = PromptSort {
            field: self.sort_by.unwrap_or_default(),
            order: self.sort_order.unwrap_or_default(),
        };

        Ok((filter, sort, page))
    }
}

/// `?permanent=true` on prompt delete.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeletePromptQuery {
    #[serde(default, deserialize_with = "flexible_bool")]
    pub permanent: Option<bool>,
}

/// `?limit=` on the category and popular listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<u64>,
}

// ---------------------------------------------------------------------------
// Shared queries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    pub fn page_request(&self) -> Result<PageRequest, DomainError> {
        PageRequest::new(self.page, self.limit)
    }
}

/// `?q=` plus paging, for the search endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl SearchQuery {
    pub fn into_parts(self) -> Result<(String, PageRequest), DomainError> {
        let page = PageRequest::new(self.page, self.limit)?;
        let q = non_blank(self.q)
            .ok_or_else(|| DomainError::BadRequest("Search query is required".to_string()))?;
        Ok((q, page))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<UserSortField>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<CommentSortField>,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Request to register a new user.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(
        required(message = "Name is required"),
        length(min = 2, max = 50, message = "Name must be between 2 and 50 characters")
    )]
    pub name: Option<String>,

    #[validate(
        required(message = "Username is required"),
        length(min = 3, max = 30, message = "Username must be between 3 and 30 characters"),
        custom(function = "username_validator")
    )]
    pub username: Option<String>,

    #[validate(
        required(message = "Email is required"),
        email(message = "Please provide a valid email address")
    )]
    pub email: Option<String>,

    #[validate(
        required(message = "Password is required"),
        length(min = 6, message = "Password must be at least 6 characters long")
    )]
    pub password: Option<String>,

    #[validate(
        required(message = "Avatar URL is required"),
        custom(function = "url_validator")
    )]
    pub avatar: Option<String>,

    #[validate(
        required(message = "Bio is required"),
        length(max = 300, message = "Bio must be at most 300 characters")
    )]
    pub bio: Option<String>,

    #[validate(custom(function = "login_mode_validator"))]
    pub login_mode: Option<String>,
}

impl CreateUserRequest {
    pub fn into_new_user(mut self) -> Result<NewUser, DomainError> {
        for field in [
            &mut self.name,
            &mut self.username,
            &mut self.email,
            &mut self.avatar,
            &mut self.bio,
            &mut self.login_mode,
        ] {
            trim(field);
        }
        self.validate().map_err(into_domain_error)?;

        Ok(NewUser {
            name: self.name.unwrap_or_default(),
            username: self.username.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            password: self.password.unwrap_or_default(),
            avatar: self.avatar.unwrap_or_default(),
            bio: self.bio.unwrap_or_default(),
            login_mode: self
                .login_mode
                .and_then(|mode| mode.parse().ok())
                .unwrap_or_default(),
        })
    }
}

/// Profile update. A `password` key in the body is ignored.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(min = 2, max = 50, message = "Name must be between 2 and 50 characters"))]
    pub name: Option<String>,

    #[validate(
        length(min = 3, max = 30, message = "Username must be between 3 and 30 characters"),
        custom(function = "username_validator")
    )]
    pub username: Option<String>,

    #[validate(email(message = "Please provide a valid email address"))]
    pub email: Option<String>,

    #[validate(custom(function = "url_validator"))]
    pub avatar: Option<String>,

    #[validate(length(max = 300, message = "Bio must be at most 300 characters"))]
    pub bio: Option<String>,

    #[validate(custom(function = "login_mode_validator"))]
    pub login_mode: Option<String>,
}

impl UpdateUserRequest {
    pub fn into_changes(mut self) -> Result<UserChanges, DomainError> {
        for field in [
            &mut self.name,
            &mut self.username,
            &mut self.email,
            &mut self.avatar,
            &mut self.bio,
            &mut self.login_mode,
        ] {
            trim(field);
        }
        self.validate().map_err(into_domain_error)?;

        Ok(UserChanges {
            name: self.name,
            username: self.username,
            email: self.email,
            avatar: self.avatar,
            bio: self.bio,
            login_mode: self.login_mode.and_then(|mode| mode.parse().ok()),
        })
    }
}

/// Request to login.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(
        required(message = "Email is required"),
        length(min = 1, message = "Email is required")
    )]
    pub email: Option<String>,

    #[validate(
        required(message = "Login mode is required"),
        custom(function = "login_mode_validator")
    )]
    pub login_mode: Option<String>,

    pub password: Option<String>,
}

/// A validated login attempt.
#[derive(Debug, Clone)]
pub struct LoginAttempt {
    pub email: String,
    pub mode: LoginMode,
    pub password: Option<String>,
}

impl LoginRequest {
    pub fn into_attempt(mut self) -> Result<LoginAttempt, DomainError> {
        trim(&mut self.email);
        trim(&mut self.login_mode);
        self.validate().map_err(into_domain_error)?;

        Ok(LoginAttempt {
            email: self.email.unwrap_or_default(),
            mode: self
                .login_mode
                .and_then(|mode| mode.parse().ok())
                .unwrap_or_default(),
            password: self.password,
        })
    }
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(
        required(message = "User ID is required"),
        custom(function = "uuid_validator")
    )]
    pub user: Option<String>,

    #[validate(
        required(message = "Prompt ID is required"),
        custom(function = "uuid_validator")
    )]
    pub prompt: Option<String>,

    #[validate(
        required(message = "Content is required"),
        length(min = 1, max = 1000, message = "Content must be between 1 and 1000 characters")
    )]
    pub content: Option<String>,
}

/// A validated new comment.
#[derive(Debug, Clone)]
pub struct NewCommentInput {
    pub user_id: Uuid,
    pub prompt_id: Uuid,
    pub content: String,
}

impl CreateCommentRequest {
    pub fn into_input(mut self) -> Result<NewCommentInput, DomainError> {
        trim(&mut self.user);
        trim(&mut self.prompt);
        trim(&mut self.content);
        self.validate().map_err(into_domain_error)?;

        let user_id = sapien_core::error::parse_id("User", self.user.as_deref().unwrap_or_default())?;
        let prompt_id =
            sapien_core::error::parse_id("Prompt", self.prompt.as_deref().unwrap_or_default())?;

        Ok(NewCommentInput {
            user_id,
            prompt_id,
            content: self.content.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCommentRequest {
    #[validate(
        required(message = "Content is required"),
        length(min = 1, max = 1000, message = "Content must be between 1 and 1000 characters")
    )]
    pub content: Option<String>,
}

impl UpdateCommentRequest {
    pub fn into_content(mut self) -> Result<String, DomainError> {
        trim(&mut self.content);
        self.validate().map_err(into_domain_error)?;
        Ok(self.content.unwrap_or_default())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
