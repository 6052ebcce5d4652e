//! User entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use sapien_core::domain::{LoginMode, User};

/// Stored form of [`LoginMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum DbLoginMode {
    #[sea_orm(string_value = "email")]
    Email,
    #[sea_orm(string_value = "github")]
    Github,
}

impl From<DbLoginMode> for LoginMode {
    fn from(mode: DbLoginMode) -> Self {
        match mode {
            DbLoginMode::Email => LoginMode::Email,
            DbLoginMode::Github => LoginMode::Github,
        }
    }
}

impl From<LoginMode> for DbLoginMode {
    fn from(mode: LoginMode) -> Self {
        match mode {
            LoginMode::Email => DbLoginMode::Email,
            LoginMode::Github => DbLoginMode::Github,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub avatar: String,
    pub bio: String,
    pub last_login: DateTimeWithTimeZone,
    pub login_mode: DbLoginMode,
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

/// Conversion from SeaORM Model to Domain User.
impl From<Model> for User {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            username: model.username,
            email: model.email,
            password_hash: model.password_hash,
            avatar: model.avatar,
            bio: model.bio,
            last_login: model.last_login.into(),
            login_mode: model.login_mode.into(),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

/// Conversion from Domain User to SeaORM ActiveModel.
impl From<User> for ActiveModel {
    fn from(user: User) -> Self {
        Self {
            id: Set(user.id),
            name: Set(user.name),
            username: Set(user.username),
            email: Set(user.email),
            password_hash: Set(user.password_hash),
            avatar: Set(user.avatar),
            bio: Set(user.bio),
            last_login: Set(user.last_login.into()),
            login_mode: Set(user.login_mode.into()),
            created_at: Set(user.created_at.into()),
            updated_at: Set(user.updated_at.into()),
        }
    }
}
