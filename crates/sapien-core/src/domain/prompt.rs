use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default attribution when a request does not name an author.
pub const DEFAULT_AUTHOR: &str = "system";

/// Kind of output a prompt produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultType {
    #[default]
    Text,
    Image,
    Video,
}

impl ResultType {
    pub const ALL: [ResultType; 3] = [ResultType::Text, ResultType::Image, ResultType::Video];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResultType::Text => "text",
            ResultType::Image => "image",
            ResultType::Video => "video",
        }
    }
}

impl fmt::Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResultType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown result type: {s}"))
    }
}

/// Models a prompt can be tagged as working best with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AiModel {
    #[serde(rename = "GPT-4")]
    Gpt4,
    #[serde(rename = "GPT-3.5")]
    Gpt35,
    #[serde(rename = "Claude-3")]
    Claude3,
    #[serde(rename = "Claude-2")]
    Claude2,
    #[serde(rename = "Gemini Pro")]
    GeminiPro,
    #[serde(rename = "DALL-E 3")]
    DallE3,
    #[serde(rename = "Midjourney")]
    Midjourney,
    #[serde(rename = "Stable Diffusion")]
    StableDiffusion,
    #[serde(rename = "RunwayML")]
    RunwayMl,
    #[serde(rename = "Pika Labs")]
    PikaLabs,
}

impl AiModel {
    pub const ALL: [AiModel; 10] = [
        AiModel::Gpt4,
        AiModel::Gpt35,
        AiModel::Claude3,
        AiModel::Claude2,
        AiModel::GeminiPro,
        AiModel::DallE3,
        AiModel::Midjourney,
        AiModel::StableDiffusion,
        AiModel::RunwayMl,
        AiModel::PikaLabs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AiModel::Gpt4 => "GPT-4",
            AiModel::Gpt35 => "GPT-3.5",
            AiModel::Claude3 => "Claude-3",
            AiModel::Claude2 => "Claude-2",
            AiModel::GeminiPro => "Gemini Pro",
            AiModel::DallE3 => "DALL-E 3",
            AiModel::Midjourney => "Midjourney",
            AiModel::StableDiffusion => "Stable Diffusion",
            AiModel::RunwayMl => "RunwayML",
            AiModel::PikaLabs => "Pika Labs",
        }
    }
}

impl fmt::Display for AiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AiModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|model| model.as_str() == s)
            .ok_or_else(|| format!("unknown model: {s}"))
    }
}

/// Prompt entity - a shareable AI prompt with usage counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
    pub cover_image: Option<String>,
    pub result_type: ResultType,
    pub sample_output: Option<String>,
    pub works_best_with: Vec<AiModel>,
    pub version: i32,
    pub is_active: bool,
    pub created_by: String,
    pub updated_by: Option<String>,
    pub views: i64,
    pub likes: i64,
    pub uses: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for publishing a prompt.
#[derive(Debug, Clone)]
pub struct NewPrompt {
    pub title: String,
    pub description: String,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
    pub cover_image: Option<String>,
    pub result_type: ResultType,
    pub sample_output: Option<String>,
    pub works_best_with: Vec<AiModel>,
    pub created_by: Option<String>,
}

/// Full update: absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct PromptChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub cover_image: Option<String>,
    pub result_type: Option<ResultType>,
    pub sample_output: Option<String>,
    pub works_best_with: Option<Vec<AiModel>>,
    pub is_active: Option<bool>,
    pub updated_by: Option<String>,
}

/// Partial update restricted to moderation and counter fields.
#[derive(Debug, Clone, Default)]
pub struct PromptPatch {
    pub is_active: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub updated_by: Option<String>,
    pub likes: Option<i64>,
    pub uses: Option<i64>,
}

/// Counters that can be bumped atomically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptCounter {
    Views,
    Likes,
    Uses,
}

impl Prompt {
    /// Create a new prompt at version 1.
    pub fn new(input: NewPrompt) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            content: input.content,
            category: input.category,
            tags: normalize_tags(input.tags),
            cover_image: input.cover_image,
            result_type: input.result_type,
            sample_output: input.sample_output,
            works_best_with: input.works_best_with,
            version: 1,
            is_active: true,
            created_by: input
                .created_by
                .unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
            updated_by: None,
            views: 0,
            likes: 0,
            uses: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a full update. Returns whether the content changed, in which case
    /// the version was bumped by one.
    pub fn apply_changes(&mut self, changes: PromptChanges) -> bool {
        let mut content_changed = false;

        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(content) = changes.content {
            if content != self.content {
                self.content = content;
                content_changed = true;
            }
        }
        if let Some(category) = changes.category {
            self.category = category;
        }
        if let Some(tags) = changes.tags {
            self.tags = normalize_tags(tags);
        }
        if let Some(cover_image) = changes.cover_image {
            self.cover_image = Some(cover_image);
        }
        if let Some(result_type) = changes.result_type {
            self.result_type = result_type;
        }
        if let Some(sample_output) = changes.sample_output {
            self.sample_output = Some(sample_output);
        }
        if let Some(models) = changes.works_best_with {
            self.works_best_with = models;
        }
        if let Some(is_active) = changes.is_active {
            self.is_active = is_active;
        }
        self.updated_by = Some(
            changes
                .updated_by
                .unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
        );

        if content_changed {
            self.version += 1;
        }
        self.updated_at = Utc::now();

        content_changed
    }

    pub fn apply_patch(&mut self, patch: PromptPatch) {
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        if let Some(tags) = patch.tags {
            self.tags = normalize_tags(tags);
        }
        if let Some(updated_by) = patch.updated_by {
            self.updated_by = Some(updated_by);
        }
        if let Some(likes) = patch.likes {
            self.likes = likes.max(0);
        }
        if let Some(uses) = patch.uses {
            self.uses = uses.max(0);
        }
        self.updated_at = Utc::now();
    }

    pub fn counter(&self, counter: PromptCounter) -> i64 {
        match counter {
            PromptCounter::Views => self.views,
            PromptCounter::Likes => self.likes,
            PromptCounter::Uses => self.uses,
        }
    }

    pub fn bump(&mut self, counter: PromptCounter) {
        match counter {
            PromptCounter::Views => self.views += 1,
            PromptCounter::Likes => self.likes += 1,
            PromptCounter::Uses => self.uses += 1,
        }
    }

    /// Human-readable version label, e.g. `v3`.
    pub fn version_string(&self) -> String {
        format!("v{}", self.version)
    }

    pub fn summary(&self) -> PromptSummary {
        PromptSummary {
            id: self.id,
            title: self.title.clone(),
        }
    }
}

/// Tags are stored trimmed and lowercased; blanks and duplicates are dropped.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !normalized.contains(&tag) {
            normalized.push(tag);
        }
    }
    normalized
}

/// Prompt fields joined into comment listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptSummary {
    pub id: Uuid,
    pub title: String,
}
