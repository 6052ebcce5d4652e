//! Login handler.

use actix_web::{HttpResponse, web};
use sapien_shared::ApiResponse;
use sapien_shared::dto::LoginRequest;

use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/login
///
/// Checks the credentials and returns the user. No session or token is issued.
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let attempt = body.into_inner().into_attempt()?;

    let user = state
        .auth
        .login(&attempt.email, attempt.mode, attempt.password.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(user, "Login successful")))
}
