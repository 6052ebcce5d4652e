//! Migration CLI for the Sapien schema.
//!
//! Reads `DATABASE_URL` (or `-u`) and accepts the standard sea-orm-migration
//! subcommands: `up`, `down`, `fresh`, `status`. The CLI installs its own
//! tracing subscriber.

use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    cli::run_cli(migration::Migrator).await;
}
