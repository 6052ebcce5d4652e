//! Prompt handlers.

use actix_web::{HttpRequest, HttpResponse, web};
use sapien_core::domain::Prompt;
use sapien_core::error::parse_id;
use sapien_shared::dto::{
    CreatePromptRequest, DeletePromptQuery, LimitQuery, PageQuery, PatchPromptRequest,
    PromptListQuery, SearchQuery, UpdatePromptRequest,
};
use sapien_shared::response::{LikesCount, UsesCount, VersionInfo};
use sapien_shared::{ApiResponse, PromptView};

use super::upload::read_prompt_form;
use crate::middleware::error::AppResult;
use crate::state::AppState;

const ENTITY: &str = "Prompt";

fn views(prompts: Vec<Prompt>) -> Vec<PromptView> {
    prompts.into_iter().map(PromptView::from).collect()
}

/// GET /api/prompts
pub async fn list_prompts(
    state: web::Data<AppState>,
    query: web::Query<PromptListQuery>,
) -> AppResult<HttpResponse> {
    let (filter, sort, page) = query.into_inner().into_parts()?;
    let prompts = state.prompts.list(&filter, sort, page).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::paginated(prompts.map(PromptView::from))))
}

/// GET /api/prompts/{id}
///
/// Every fetch counts as a view.
pub async fn get_prompt(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(ENTITY, &path)?;
    let prompt = state.prompts.get(id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(PromptView::from(prompt))))
}

/// POST /api/prompts (JSON or multipart)
pub async fn create_prompt(
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: web::Payload,
) -> AppResult<HttpResponse> {
    let form = read_prompt_form::<CreatePromptRequest>(&req, payload, &state.upload).await?;
    let mut body = form.body;
    body.cover_image = form.cover_image;

    let prompt = state.prompts.create(body.into_new_prompt()?).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        PromptView::from(prompt),
        "Prompt created successfully",
    )))
}

/// PUT /api/prompts/{id} (JSON or multipart)
pub async fn update_prompt(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: HttpRequest,
    payload: web::Payload,
) -> AppResult<HttpResponse> {
    let id = parse_id(ENTITY, &path)?;
    let form = read_prompt_form::<UpdatePromptRequest>(&req, payload, &state.upload).await?;
    let mut body = form.body;
    if form.cover_image.is_some() {
        body.cover_image = form.cover_image;
    }

    let prompt = state.prompts.update(id, body.into_changes()?).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        PromptView::from(prompt),
        "Prompt updated successfully",
    )))
}

/// PATCH /api/prompts/{id}
pub async fn patch_prompt(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<PatchPromptRequest>,
) -> AppResult<HttpResponse> {
    let id = parse_id(ENTITY, &path)?;
    let patch = body.into_inner().into_patch()?;
    let prompt = state.prompts.patch(id, patch).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        PromptView::from(prompt),
        "Prompt updated successfully",
    )))
}

/// DELETE /api/prompts/{id}?permanent=true
pub async fn delete_prompt(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<DeletePromptQuery>,
) -> AppResult<HttpResponse> {
    let id = parse_id(ENTITY, &path)?;
    let permanent = query.permanent.unwrap_or(false);

    let response = match state.prompts.delete(id, permanent).await? {
        Some(prompt) => ApiResponse::ok_with_message(
            PromptView::from(prompt),
            "Prompt deactivated successfully",
        ),
        None => ApiResponse::message_only("Prompt permanently deleted"),
    };
    Ok(HttpResponse::Ok().json(response))
}

/// PATCH /api/prompts/{id}/like
pub async fn like_prompt(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(ENTITY, &path)?;
    let likes = state.prompts.like(id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        LikesCount { likes },
        "Prompt liked successfully",
    )))
}

/// PATCH /api/prompts/{id}/use
pub async fn use_prompt(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(ENTITY, &path)?;
    let uses = state.prompts.record_use(id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        UsesCount { uses },
        "Prompt usage recorded",
    )))
}

/// GET /api/prompts/{id}/versions
pub async fn prompt_versions(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(ENTITY, &path)?;
    let prompt = state.prompts.find(id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(VersionInfo::from(&prompt))))
}

/// GET /api/prompts/search?q=
pub async fn search_prompts(
    state: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> AppResult<HttpResponse> {
    let (q, page) = query.into_inner().into_parts()?;
    let prompts = state.prompts.search(&q, page).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::paginated(prompts.map(PromptView::from))))
}

/// GET /api/prompts/popular?limit=
pub async fn popular_prompts(
    state: web::Data<AppState>,
    query: web::Query<LimitQuery>,
) -> AppResult<HttpResponse> {
    let prompts = state.prompts.popular(query.limit).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::counted(views(prompts))))
}

/// GET /api/prompts/recent
pub async fn recent_prompts(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let prompts = state.prompts.recent(query.page_request()?).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::paginated(prompts.map(PromptView::from))))
}

/// GET /api/prompts/categories
pub async fn list_categories(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let categories = state.prompts.categories().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::counted(categories)))
}

/// GET /api/prompts/tags
pub async fn list_tags(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let tags = state.prompts.tags().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::counted(tags)))
}

/// GET /api/prompts/category/{category}?limit=
pub async fn prompts_by_category(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<LimitQuery>,
) -> AppResult<HttpResponse> {
    let prompts = state.prompts.by_category(&path, query.limit).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::counted(views(prompts))))
}

/// GET /api/prompts/tag/{tag}
pub async fn prompts_by_tag(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let prompts = state.prompts.by_tag(&path).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::counted(views(prompts))))
}
