//! # Sapien API Server
//!
//! Actix-web application for the Sapien prompt-sharing backend. The binary in
//! `main.rs` wires it to a socket; tests mount the same routes in-process.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod state;
pub mod telemetry;

use actix_web::web;

use state::AppState;

/// Mount shared state, extractor settings, and every `/api` route.
pub fn configure_app(state: AppState) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(state));
        handlers::configure_extractors(cfg);
        handlers::configure_routes(cfg);
    }
}
