//! User handlers.

use actix_web::{HttpResponse, web};
use sapien_core::error::parse_id;
use sapien_core::query::PageRequest;
use sapien_shared::ApiResponse;
use sapien_shared::dto::{CreateUserRequest, SearchQuery, UpdateUserRequest, UserListQuery};
use sapien_shared::response::DeletedId;

use crate::middleware::error::AppResult;
use crate::state::AppState;

const ENTITY: &str = "User";

/// GET /api/users
pub async fn list_users(
    state: web::Data<AppState>,
    query: web::Query<UserListQuery>,
) -> AppResult<HttpResponse> {
    let page = PageRequest::new(query.page, query.limit)?;
    let users = state
        .users
        .list(query.sort_by.unwrap_or_default(), page)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::paginated(users)))
}

/// GET /api/users/{id}
pub async fn get_user(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(ENTITY, &path)?;
    let user = state.users.get(id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(user)))
}

/// GET /api/users/email/{email}
pub async fn get_user_by_email(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let user = state.users.get_by_email(&path).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(user)))
}

/// GET /api/users/username/{username}
pub async fn get_user_by_username(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let user = state.users.get_by_username(&path).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(user)))
}

/// POST /api/users
pub async fn create_user(
    state: web::Data<AppState>,
    body: web::Json<CreateUserRequest>,
) -> AppResult<HttpResponse> {
    let input = body.into_inner().into_new_user()?;
    let user = state.users.create(input).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        user,
        "User created successfully",
    )))
}

/// PUT /api/users/{id}
pub async fn update_user(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpdateUserRequest>,
) -> AppResult<HttpResponse> {
    let id = parse_id(ENTITY, &path)?;
    let changes = body.into_inner().into_changes()?;
    let user = state.users.update(id, changes).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        user,
        "User updated successfully",
    )))
}

/// DELETE /api/users/{id}
pub async fn delete_user(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(ENTITY, &path)?;
    state.users.delete(id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        DeletedId { id: id.to_string() },
        "User deleted successfully",
    )))
}

/// GET /api/users/search?q=
pub async fn search_users(
    state: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> AppResult<HttpResponse> {
    let (q, page) = query.into_inner().into_parts()?;
    let users = state.users.search(&q, page).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::paginated(users)))
}
