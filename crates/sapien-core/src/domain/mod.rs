//! Domain entities - the core business objects.

mod comment;
mod prompt;
mod user;

pub use comment::{Comment, CommentView, Populated};
pub use prompt::{
    AiModel, DEFAULT_AUTHOR, NewPrompt, Prompt, PromptChanges, PromptCounter, PromptPatch,
    PromptSummary, ResultType, normalize_tags,
};
pub use user::{AuthorSummary, LoginMode, NewUser, User, UserChanges, normalize_email};
