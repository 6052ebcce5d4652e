//! PostgreSQL repository implementations.

mod comment;
mod prompt;
mod user;

use sea_orm::{ConnectionTrait, PaginatorTrait, SelectorTrait};

use sapien_core::error::RepoError;
use sapien_core::query::PageRequest;

use super::entity::{comment as comment_entity, prompt as prompt_entity, user as user_entity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<user_entity::Entity>;

/// PostgreSQL prompt repository.
pub type PostgresPromptRepository = PostgresBaseRepository<prompt_entity::Entity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<comment_entity::Entity>;

/// Run a paginated select, returning one page and the total item count.
async fn fetch_page<'db, C, S>(
    db: &'db C,
    selector: impl PaginatorTrait<'db, C, Selector = S>,
    page: PageRequest,
) -> Result<(Vec<S::Item>, u64), RepoError>
where
    C: ConnectionTrait,
    S: SelectorTrait + Send + Sync + 'db,
{
    let paginator = selector.paginate(db, page.limit);
    let total = paginator.num_items().await.map_err(map_db_err)?;
    let items = paginator
        .fetch_page(page.page.saturating_sub(1))
        .await
        .map_err(map_db_err)?;
    Ok((items, total))
}

/// Mask an email for logging to avoid PII in logs.
fn mask_email(email: &str) -> String {
    match email.find('@') {
        Some(at_pos) => {
            let (local, domain) = email.split_at(at_pos);
            let masked_local = match local.chars().next() {
                Some(first) if local.len() > 1 => format!("{first}***"),
                _ => "***".to_string(),
            };
            format!("{masked_local}{domain}")
        }
        None => "***".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::mask_email;

    #[test]
    fn masks_local_part() {
        assert_eq!(mask_email("ada@example.com"), "a***@example.com");
        assert_eq!(mask_email("a@example.com"), "***@example.com");
        assert_eq!(mask_email("nope"), "***");
    }
}
