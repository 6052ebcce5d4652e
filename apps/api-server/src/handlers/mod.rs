//! HTTP handlers and route configuration.

mod auth;
mod comments;
mod health;
mod prompts;
mod upload;
mod users;

use actix_web::web;

pub use upload::JSON_BODY_LIMIT;

use crate::middleware::error::{json_error_handler, path_error_handler, query_error_handler};

/// Extractor settings so malformed input gets the standard error envelope.
pub fn configure_extractors(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(JSON_BODY_LIMIT)
            .error_handler(json_error_handler),
    )
    .app_data(web::QueryConfig::default().error_handler(query_error_handler))
    .app_data(web::PathConfig::default().error_handler(path_error_handler));
}

/// Configure all application routes.
///
/// Fixed segments (`search`, `popular`, ...) are registered ahead of `{id}`.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .route("/home", web::get().to(health::home))
            .route("/login", web::post().to(auth::login))
            .service(
                web::scope("/prompts")
                    .route("", web::get().to(prompts::list_prompts))
                    .route("", web::post().to(prompts::create_prompt))
                    .route("/search", web::get().to(prompts::search_prompts))
                    .route("/popular", web::get().to(prompts::popular_prompts))
                    .route("/recent", web::get().to(prompts::recent_prompts))
                    .route("/categories", web::get().to(prompts::list_categories))
                    .route("/tags", web::get().to(prompts::list_tags))
                    .route(
                        "/category/{category}",
                        web::get().to(prompts::prompts_by_category),
                    )
                    .route("/tag/{tag}", web::get().to(prompts::prompts_by_tag))
                    .route("/{id}/like", web::patch().to(prompts::like_prompt))
                    .route("/{id}/use", web::patch().to(prompts::use_prompt))
                    .route("/{id}/versions", web::get().to(prompts::prompt_versions))
                    .route("/{id}", web::get().to(prompts::get_prompt))
                    .route("/{id}", web::put().to(prompts::update_prompt))
                    .route("/{id}", web::patch().to(prompts::patch_prompt))
                    .route("/{id}", web::delete().to(prompts::delete_prompt)),
            )
            .service(
                web::scope("/comments")
                    .route("", web::get().to(comments::list_comments))
                    .route("", web::post().to(comments::create_comment))
                    .route(
                        "/prompt/{prompt_id}/stats",
                        web::get().to(comments::comment_stats),
                    )
                    .route(
                        "/prompt/{prompt_id}",
                        web::get().to(comments::comments_by_prompt),
                    )
                    .route("/user/{user_id}", web::get().to(comments::comments_by_user))
                    .route("/{id}", web::get().to(comments::get_comment))
                    .route("/{id}", web::put().to(comments::update_comment))
                    .route("/{id}", web::delete().to(comments::delete_comment)),
            )
            .service(
                web::scope("/users")
                    .route("", web::get().to(users::list_users))
                    .route("", web::post().to(users::create_user))
                    .route("/search", web::get().to(users::search_users))
                    .route("/email/{email}", web::get().to(users::get_user_by_email))
                    .route(
                        "/username/{username}",
                        web::get().to(users::get_user_by_username),
                    )
                    .route("/{id}", web::get().to(users::get_user))
                    .route("/{id}", web::put().to(users::update_user))
                    .route("/{id}", web::delete().to(users::delete_user)),
            ),
    );
}
