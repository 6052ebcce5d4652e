use std::collections::BTreeMap;

use chrono::Utc;
use sea_orm::{DatabaseBackend, DbConn, MockDatabase, MockExecResult, Statement, Value};
use uuid::Uuid;

use sapien_core::domain::{
    AiModel, LoginMode, Prompt, PromptChanges, PromptCounter, PromptPatch, User,
};
use sapien_core::error::RepoError;
use sapien_core::ports::{BaseRepository, CommentRepository, PromptRepository, UserRepository};
use sapien_core::query::{
    CommentSortField, PageRequest, PromptFilter, PromptSort, UserSortField,
};

use crate::database::entity::comment;
use crate::database::entity::prompt::{self, DbResultType};
use crate::database::entity::user::{self, DbLoginMode};
use crate::database::postgres_repo::{
    PostgresCommentRepository, PostgresPromptRepository, PostgresUserRepository,
};

fn prompt_model(id: Uuid, likes: i64) -> prompt::Model {
    let now = Utc::now();
    prompt::Model {
        id,
        title: "Code Reviewer".to_owned(),
        description: "Reviews a diff".to_owned(),
        content: "Review the following code".to_owned(),
        category: "Development".to_owned(),
        tags: vec!["code".to_owned(), "review".to_owned()],
        cover_image: None,
        result_type: DbResultType::Text,
        sample_output: None,
        works_best_with: vec!["GPT-4".to_owned(), "Unknown-Model".to_owned()],
        version: 1,
        is_active: true,
        created_by: "system".to_owned(),
        updated_by: None,
        views: 0,
        likes,
        uses: 0,
        created_at: now.into(),
        updated_at: now.into(),
    }
}

fn user_model(id: Uuid) -> user::Model {
    let now = Utc::now();
    user::Model {
        id,
        name: "Ada Lovelace".to_owned(),
        username: "ada".to_owned(),
        email: "ada@example.com".to_owned(),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$salt$hash".to_owned(),
        avatar: "https://example.com/ada.png".to_owned(),
        bio: "First programmer".to_owned(),
        last_login: now.into(),
        login_mode: DbLoginMode::Email,
        created_at: now.into(),
        updated_at: now.into(),
    }
}

fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
    BTreeMap::from([("num_items", Value::BigInt(Some(n)))])
}

#[tokio::test]
async fn test_find_prompt_by_id() {
    let prompt_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![prompt_model(prompt_id, 0)]])
        .into_connection();

    let repo = PostgresPromptRepository::new(db);
    let result: Option<Prompt> = repo.find_by_id(prompt_id).await.unwrap();

    let prompt = result.unwrap();
    assert_eq!(prompt.id, prompt_id);
    assert_eq!(prompt.title, "Code Reviewer");
    // Unknown model names stored in the column are dropped on read.
    assert_eq!(prompt.works_best_with, vec![AiModel::Gpt4]);
}

#[tokio::test]
async fn test_increment_returns_updated_row() {
    let prompt_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![prompt_model(prompt_id, 6)]])
        .into_connection();

    let repo = PostgresPromptRepository::new(db);
    let prompt = repo
        .increment(prompt_id, PromptCounter::Likes)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(prompt.likes, 6);

    let statements = executed(repo.db);
    assert!(statements[0].sql.contains(r#"UPDATE "prompts""#));
    assert!(statements[0].sql.contains(r#""likes" = "likes" + $1"#));
    assert!(statements[0].sql.contains("RETURNING"));
}

#[tokio::test]
async fn test_increment_missing_prompt_is_none() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<prompt::Model>::new()])
        .into_connection();

    let repo = PostgresPromptRepository::new(db);
    let result = repo
        .increment(Uuid::new_v4(), PromptCounter::Views)
        .await
        .unwrap();
    assert!(result.is_none());
}

fn executed(db: DbConn) -> Vec<Statement> {
    db.into_transaction_log()
        .iter()
        .flat_map(|transaction| transaction.statements().to_vec())
        .collect()
}

/// The SET clause of an UPDATE statement.
fn set_clause(sql: &str) -> &str {
    let start = sql.find(" SET ").unwrap_or(0);
    let end = sql.find(" WHERE ").unwrap_or(sql.len());
    &sql[start..end]
}

#[tokio::test]
async fn test_update_fields_bumps_version_in_sql() {
    let prompt_id = Uuid::new_v4();
    let mut model = prompt_model(prompt_id, 4);
    model.version = 2;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![model]])
        .into_connection();

    let repo = PostgresPromptRepository::new(db);
    let prompt = repo
        .update_fields(
            prompt_id,
            PromptChanges {
                content: Some("Review this diff".to_owned()),
                tags: Some(vec![" Code ".to_owned()]),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(prompt.version, 2);
    assert_eq!(prompt.likes, 4);

    let statements = executed(repo.db);
    let sql = &statements[0].sql;
    let set = set_clause(sql);
    assert!(set.contains("version + CASE WHEN content IS DISTINCT FROM"));
    assert!(set.contains(r#""content" = "#));
    assert!(set.contains(r#""tags" = "#));
    for column in ["likes", "views", "uses", "title", "created_at"] {
        assert!(!set.contains(column), "{column} must not be written");
    }
    assert!(sql.contains("RETURNING"));
}

#[tokio::test]
async fn test_patch_fields_writes_only_supplied_columns() {
    let prompt_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![prompt_model(prompt_id, 9)]])
        .into_connection();

    let repo = PostgresPromptRepository::new(db);
    let prompt = repo
        .patch_fields(
            prompt_id,
            PromptPatch {
                likes: Some(9),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(prompt.likes, 9);

    let statements = executed(repo.db);
    let set = set_clause(&statements[0].sql);
    assert!(set.contains(r#""likes" = "#));
    for column in ["views", "uses", "version", "content", "tags"] {
        assert!(!set.contains(column), "{column} must not be written");
    }
}

#[tokio::test]
async fn test_update_fields_missing_prompt_is_none() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<prompt::Model>::new()])
        .into_connection();

    let repo = PostgresPromptRepository::new(db);
    let result = repo
        .update_fields(Uuid::new_v4(), PromptChanges::default())
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_search_uses_text_index() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![count_row(1)]])
        .append_query_results([vec![prompt_model(Uuid::new_v4(), 0)]])
        .into_connection();

    let repo = PostgresPromptRepository::new(db);
    let (items, total) = repo
        .search("code review", PageRequest::default())
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(items.len(), 1);

    let log: Vec<String> = executed(repo.db).iter().map(ToString::to_string).collect();
    let log = log.join("\n");
    assert!(log.contains("to_tsquery('english', 'code:* | review:*')"));
    assert!(log.contains("ts_rank"));
}

#[tokio::test]
async fn test_list_filters_bind_array_parameters() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![count_row(1)]])
        .append_query_results([vec![prompt_model(Uuid::new_v4(), 0)]])
        .into_connection();

    let repo = PostgresPromptRepository::new(db);
    let filter = PromptFilter {
        tags: vec!["code".to_owned()],
        works_best_with: vec![AiModel::Gpt4],
        is_active: Some(true),
        ..Default::default()
    };
    let (items, total) = repo
        .list(&filter, PromptSort::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(items.len(), 1);

    for statement in executed(repo.db) {
        assert!(statement.sql.contains("tags && $"));
        assert!(statement.sql.contains("works_best_with && $"));
        assert!(!statement.sql.contains('?'));
    }
}

#[tokio::test]
async fn test_list_users_paginates() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![count_row(11)]])
        .append_query_results([vec![user_model(Uuid::new_v4())]])
        .into_connection();

    let repo = PostgresUserRepository::new(db);
    let page = PageRequest::new(Some(2), Some(10)).unwrap();
    let (users, total) = repo.list(UserSortField::Name, page).await.unwrap();

    assert_eq!(total, 11);
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].login_mode, LoginMode::Email);
}

#[tokio::test]
async fn test_comment_pages_break_timestamp_ties_by_id() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![count_row(0)]])
        .append_query_results([Vec::<comment::Model>::new()])
        .into_connection();

    let repo = PostgresCommentRepository::new(db);
    let (views, total) = repo
        .list_by_prompt(Uuid::new_v4(), CommentSortField::UpdatedAt, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(total, 0);
    assert!(views.is_empty());

    let statements = executed(repo.db);
    let page_query = &statements[statements.len() - 1].sql;
    assert!(page_query.contains(r#"ORDER BY "comments"."updated_at" DESC, "comments"."id" ASC"#));
}

#[tokio::test]
async fn test_update_missing_user_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<user::Model>::new()])
        .into_connection();

    let repo = PostgresUserRepository::new(db);
    let user: User = user_model(Uuid::new_v4()).into();
    let err = repo.update(user).await.unwrap_err();
    assert!(matches!(err, RepoError::NotFound));
}

#[tokio::test]
async fn test_delete_missing_row_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresPromptRepository::new(db);
    let err = BaseRepository::<Prompt, Uuid>::delete(&repo, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound));
}
