use std::cmp::Reverse;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use sapien_core::domain::{LoginMode, User};
use sapien_core::error::RepoError;
use sapien_core::ports::{BaseRepository, UserRepository};
use sapien_core::query::{PageRequest, UserSortField};

use super::{MemoryStore, paginate};

/// In-memory user repository. Enforces the same unique keys as the schema.
pub struct InMemoryUserRepository {
    store: Arc<MemoryStore>,
}

impl InMemoryUserRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

fn clashes(existing: &User, candidate: &User) -> bool {
    existing.id != candidate.id
        && (existing.email == candidate.email || existing.username == candidate.username)
}

fn sort_desc(users: &mut [User], field: UserSortField) {
    match field {
        UserSortField::CreatedAt => users.sort_by_key(|u| Reverse(u.created_at)),
        UserSortField::UpdatedAt => users.sort_by_key(|u| Reverse(u.updated_at)),
        UserSortField::Name => users.sort_by(|a, b| b.name.cmp(&a.name)),
        UserSortField::Username => users.sort_by(|a, b| b.username.cmp(&a.username)),
        UserSortField::LastLogin => users.sort_by_key(|u| Reverse(u.last_login)),
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.store.users.read().await.get(&id).cloned())
    }

    async fn insert(&self, entity: User) -> Result<User, RepoError> {
        let mut users = self.store.users.write().await;
        if users.contains_key(&entity.id) || users.values().any(|u| clashes(u, &entity)) {
            return Err(RepoError::Constraint("users_email_username_key".to_string()));
        }
        users.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: User) -> Result<User, RepoError> {
        let mut users = self.store.users.write().await;
        if !users.contains_key(&entity.id) {
            return Err(RepoError::NotFound);
        }
        if users.values().any(|u| clashes(u, &entity)) {
            return Err(RepoError::Constraint("users_email_username_key".to_string()));
        }
        users.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.store
            .users
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let users = self.store.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let users = self.store.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_login(
        &self,
        email: &str,
        mode: LoginMode,
    ) -> Result<Option<User>, RepoError> {
        let users = self.store.users.read().await;
        Ok(users
            .values()
            .find(|u| u.email == email && u.login_mode == mode)
            .cloned())
    }

    async fn find_conflicting(
        &self,
        email: Option<&str>,
        username: Option<&str>,
        exclude: Option<Uuid>,
    ) -> Result<Option<User>, RepoError> {
        let users = self.store.users.read().await;
        Ok(users
            .values()
            .filter(|u| Some(u.id) != exclude)
            .find(|u| {
                email.is_some_and(|e| u.email == e) || username.is_some_and(|n| u.username == n)
            })
            .cloned())
    }

    async fn list(
        &self,
        sort: UserSortField,
        page: PageRequest,
    ) -> Result<(Vec<User>, u64), RepoError> {
        let mut users: Vec<User> = self.store.users.read().await.values().cloned().collect();
        sort_desc(&mut users, sort);
        Ok(paginate(users, page))
    }

    async fn search(&self, term: &str, page: PageRequest) -> Result<(Vec<User>, u64), RepoError> {
        let needle = term.to_lowercase();
        let mut users: Vec<User> = self
            .store
            .users
            .read()
            .await
            .values()
            .filter(|u| {
                u.name.to_lowercase().contains(&needle)
                    || u.username.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        sort_desc(&mut users, UserSortField::CreatedAt);
        Ok(paginate(users, page))
    }

    async fn touch_last_login(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<User>, RepoError> {
        let mut users = self.store.users.write().await;
        Ok(users.get_mut(&id).map(|user| {
            user.last_login = at;
            user.clone()
        }))
    }

    async fn count(&self) -> Result<u64, RepoError> {
        Ok(self.store.users.read().await.len() as u64)
    }
}
