//! Comment handlers.

use actix_web::{HttpResponse, web};
use sapien_core::error::parse_id;
use sapien_core::query::PageRequest;
use sapien_shared::ApiResponse;
use sapien_shared::dto::{
    CommentListQuery, CreateCommentRequest, PageQuery, UpdateCommentRequest,
};
use sapien_shared::response::DeletedId;

use crate::middleware::error::AppResult;
use crate::state::AppState;

const ENTITY: &str = "Comment";

/// GET /api/comments
pub async fn list_comments(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let comments = state.comments.list(query.page_request()?).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::paginated(comments)))
}

/// GET /api/comments/{id}
pub async fn get_comment(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(ENTITY, &path)?;
    let comment = state.comments.get(id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(comment)))
}

/// GET /api/comments/prompt/{promptId}
pub async fn comments_by_prompt(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<CommentListQuery>,
) -> AppResult<HttpResponse> {
    let prompt_id = parse_id("Prompt", &path)?;
    let page = PageRequest::new(query.page, query.limit)?;
    let comments = state
        .comments
        .list_by_prompt(prompt_id, query.sort_by.unwrap_or_default(), page)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::paginated(comments)))
}

/// GET /api/comments/prompt/{promptId}/stats
pub async fn comment_stats(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let prompt_id = parse_id("Prompt", &path)?;
    let stats = state.comments.stats(prompt_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(stats)))
}

/// GET /api/comments/user/{userId}
pub async fn comments_by_user(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let user_id = parse_id("User", &path)?;
    let comments = state
        .comments
        .list_by_user(user_id, query.page_request()?)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::paginated(comments)))
}

/// POST /api/comments
pub async fn create_comment(
    state: web::Data<AppState>,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let input = body.into_inner().into_input()?;
    let comment = state
        .comments
        .create(input.user_id, input.prompt_id, &input.content)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        comment,
        "Comment created successfully",
    )))
}

/// PUT /api/comments/{id}
pub async fn update_comment(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpdateCommentRequest>,
) -> AppResult<HttpResponse> {
    let id = parse_id(ENTITY, &path)?;
    let content = body.into_inner().into_content()?;
    let comment = state.comments.update(id, &content).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        comment,
        "Comment updated successfully",
    )))
}

/// DELETE /api/comments/{id}
pub async fn delete_comment(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(ENTITY, &path)?;
    state.comments.delete(id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        DeletedId { id: id.to_string() },
        "Comment deleted successfully",
    )))
}
