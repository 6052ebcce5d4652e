//! Prompt entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use sapien_core::domain::{AiModel, Prompt, ResultType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum DbResultType {
    #[sea_orm(string_value = "text")]
    Text,
    #[sea_orm(string_value = "image")]
    Image,
    #[sea_orm(string_value = "video")]
    Video,
}

impl From<DbResultType> for ResultType {
    fn from(kind: DbResultType) -> Self {
        match kind {
            DbResultType::Text => ResultType::Text,
            DbResultType::Image => ResultType::Image,
            DbResultType::Video => ResultType::Video,
        }
    }
}

impl From<ResultType> for DbResultType {
    fn from(kind: ResultType) -> Self {
        match kind {
            ResultType::Text => DbResultType::Text,
            ResultType::Image => DbResultType::Image,
            ResultType::Video => DbResultType::Video,
        }
    }
}

/// Column representation of `works_best_with`.
pub fn model_names(models: &[AiModel]) -> Vec<String> {
    models.iter().map(|model| model.as_str().to_string()).collect()
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "prompts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
    pub cover_image: Option<String>,
    pub result_type: DbResultType,
    #[sea_orm(column_type = "Text", nullable)]
    pub sample_output: Option<String>,
    /// Model display names, e.g. `GPT-4`.
    pub works_best_with: Vec<String>,
    pub version: i32,
    pub is_active: bool,
    pub created_by: String,
    pub updated_by: Option<String>,
    pub views: i64,
    pub likes: i64,
    pub uses: i64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Prompt {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            content: model.content,
            category: model.category,
            tags: model.tags,
            cover_image: model.cover_image,
            result_type: model.result_type.into(),
            sample_output: model.sample_output,
            // Values outside the known set are dropped rather than failing the row.
            works_best_with: model
                .works_best_with
                .iter()
                .filter_map(|name| name.parse().ok())
                .collect(),
            version: model.version,
            is_active: model.is_active,
            created_by: model.created_by,
            updated_by: model.updated_by,
            views: model.views,
            likes: model.likes,
            uses: model.uses,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl From<Prompt> for ActiveModel {
    fn from(prompt: Prompt) -> Self {
        Self {
            id: Set(prompt.id),
            title: Set(prompt.title),
            description: Set(prompt.description),
            content: Set(prompt.content),
            category: Set(prompt.category),
            tags: Set(prompt.tags),
            cover_image: Set(prompt.cover_image),
            result_type: Set(prompt.result_type.into()),
            sample_output: Set(prompt.sample_output),
            works_best_with: Set(model_names(&prompt.works_best_with)),
            version: Set(prompt.version),
            is_active: Set(prompt.is_active),
            created_by: Set(prompt.created_by),
            updated_by: Set(prompt.updated_by),
            views: Set(prompt.views),
            likes: Set(prompt.likes),
            uses: Set(prompt.uses),
            created_at: Set(prompt.created_at.into()),
            updated_at: Set(prompt.updated_at.into()),
        }
    }
}
