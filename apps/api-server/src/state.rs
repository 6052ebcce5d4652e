//! Application state - shared across all handlers.

use std::sync::Arc;

use sapien_core::ports::{CommentRepository, PasswordService, PromptRepository, UserRepository};
use sapien_core::services::{AuthService, CommentService, HomeService, PromptService, UserService};
use sapien_infra::{
    Argon2PasswordService, DatabaseConnections, InMemoryCommentRepository,
    InMemoryPromptRepository, InMemoryUserRepository, MemoryStore,
};

#[cfg(feature = "postgres")]
use sapien_infra::{PostgresCommentRepository, PostgresPromptRepository, PostgresUserRepository};

use crate::config::{AppConfig, UploadConfig};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub prompts: Arc<PromptService>,
    pub users: Arc<UserService>,
    pub comments: Arc<CommentService>,
    pub auth: Arc<AuthService>,
    pub home: Arc<HomeService>,
    pub db: Option<Arc<DatabaseConnections>>,
    pub upload: UploadConfig,
}

struct Repositories {
    users: Arc<dyn UserRepository>,
    prompts: Arc<dyn PromptRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl Repositories {
    fn in_memory() -> Self {
        let store = MemoryStore::new();
        Self {
            users: Arc::new(InMemoryUserRepository::new(store.clone())),
            prompts: Arc::new(InMemoryPromptRepository::new(store.clone())),
            comments: Arc::new(InMemoryCommentRepository::new(store)),
        }
    }

    #[cfg(feature = "postgres")]
    fn postgres(connections: &DatabaseConnections) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(connections.main.clone())),
            prompts: Arc::new(PostgresPromptRepository::new(connections.main.clone())),
            comments: Arc::new(PostgresCommentRepository::new(connections.main.clone())),
        }
    }
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        #[cfg(feature = "postgres")]
        let (db, repos) = match &config.database {
            Some(db_config) => match DatabaseConnections::init(db_config).await {
                Ok(connections) => {
                    let repos = Repositories::postgres(&connections);
                    (Some(Arc::new(connections)), repos)
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                    (None, Repositories::in_memory())
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                (None, Repositories::in_memory())
            }
        };

        #[cfg(not(feature = "postgres"))]
        let (db, repos) = {
            tracing::info!("Running without postgres feature - using in-memory repositories");
            (None, Repositories::in_memory())
        };

        let state = Self::build(repos, db, config.upload.clone());
        tracing::info!("Application state initialized");
        state
    }

    /// State backed by a fresh in-memory store.
    pub fn in_memory(upload: UploadConfig) -> Self {
        Self::build(Repositories::in_memory(), None, upload)
    }

    fn build(
        repos: Repositories,
        db: Option<Arc<DatabaseConnections>>,
        upload: UploadConfig,
    ) -> Self {
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());
        let Repositories {
            users,
            prompts,
            comments,
        } = repos;

        Self {
            prompts: Arc::new(PromptService::new(prompts.clone())),
            users: Arc::new(UserService::new(users.clone(), passwords.clone())),
            comments: Arc::new(CommentService::new(
                comments.clone(),
                users.clone(),
                prompts.clone(),
            )),
            auth: Arc::new(AuthService::new(users.clone(), passwords)),
            home: Arc::new(HomeService::new(users, prompts, comments)),
            db,
            upload,
        }
    }

    /// Whether a database is configured and answering.
    pub async fn database_connected(&self) -> bool {
        match &self.db {
            Some(db) => db.ping().await,
            None => false,
        }
    }
}
