//! Seeds the database with a handful of sample prompts.
//!
//! Applies pending migrations first. Skips seeding when active prompts
//! already exist unless `--force` is passed.

use std::sync::Arc;

use anyhow::Context;
use migration::{Migrator, MigratorTrait};
use sapien_core::domain::{AiModel, NewPrompt, ResultType};
use sapien_core::ports::PromptRepository;
use sapien_core::services::PromptService;
use sapien_infra::{DatabaseConfig, DatabaseConnections, PostgresPromptRepository};
use tracing_subscriber::EnvFilter;

struct Sample {
    title: &'static str,
    description: &'static str,
    content: &'static str,
    category: &'static str,
    tags: &'static [&'static str],
    result_type: ResultType,
    sample_output: Option<&'static str>,
    works_best_with: &'static [AiModel],
}

const SAMPLES: &[Sample] = &[
    Sample {
        title: "Code Review Assistant",
        description: "Reviews a diff for bugs, readability and missing tests",
        content: "You are a senior engineer. Review the following diff and list concrete issues, \
                  ordered by severity, with a suggested fix for each:\n\n{{diff}}",
        category: "development",
        tags: &["code", "review", "engineering"],
        result_type: ResultType::Text,
        sample_output: Some("1. Possible null dereference in `load_user`..."),
        works_best_with: &[AiModel::Gpt4, AiModel::Claude3],
    },
    Sample {
        title: "Blog Post Outline",
        description: "Turns a topic into a structured outline with section goals",
        content: "Create a blog post outline about {{topic}} for {{audience}}. Include a hook, \
                  five sections with one-sentence goals, and a closing call to action.",
        category: "writing",
        tags: &["blog", "outline", "content"],
        result_type: ResultType::Text,
        sample_output: None,
        works_best_with: &[AiModel::Gpt4, AiModel::Claude3, AiModel::GeminiPro],
    },
    Sample {
        title: "Product Photo Studio",
        description: "Studio-lit product shot on a seamless background",
        content: "Professional product photograph of {{product}}, soft box lighting, \
                  seamless white background, 85mm lens, high detail",
        category: "design",
        tags: &["image", "product", "photography"],
        result_type: ResultType::Image,
        sample_output: None,
        works_best_with: &[AiModel::Midjourney, AiModel::DallE3],
    },
    Sample {
        title: "SQL Query Explainer",
        description: "Explains what a SQL query does and how to speed it up",
        content: "Explain the following SQL query step by step, then suggest indexes or \
                  rewrites that would make it faster:\n\n{{query}}",
        category: "development",
        tags: &["sql", "database", "performance"],
        result_type: ResultType::Text,
        sample_output: None,
        works_best_with: &[AiModel::Gpt4],
    },
];

impl Sample {
    fn to_new_prompt(&self) -> NewPrompt {
        NewPrompt {
            title: self.title.to_string(),
            description: self.description.to_string(),
            content: self.content.to_string(),
            category: self.category.to_string(),
            tags: self.tags.iter().map(|tag| tag.to_string()).collect(),
            cover_image: None,
            result_type: self.result_type,
            sample_output: self.sample_output.map(str::to_string),
            works_best_with: self.works_best_with.to_vec(),
            created_by: Some("seed".to_string()),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let force = std::env::args().any(|arg| arg == "--force");
    let url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set to seed")?;

    let mut config = DatabaseConfig::new(url);
    config.max_connections = 5;
    config.min_connections = 1;

    let connections = DatabaseConnections::init(&config)
        .await
        .context("failed to connect to the database")?;

    Migrator::up(&connections.main, None)
        .await
        .context("failed to apply migrations")?;

    let repository: Arc<dyn PromptRepository> =
        Arc::new(PostgresPromptRepository::new(connections.main.clone()));

    let existing = repository.count_active().await?;
    if existing > 0 && !force {
        tracing::info!(existing, "Prompts already present, skipping (use --force to seed anyway)");
        return Ok(());
    }

    let service = PromptService::new(repository);
    for sample in SAMPLES {
        let prompt = service
            .create(sample.to_new_prompt())
            .await
            .with_context(|| format!("failed to seed prompt '{}'", sample.title))?;
        tracing::debug!(prompt_id = %prompt.id, title = %prompt.title, "Seeded prompt");
    }

    tracing::info!(count = SAMPLES.len(), "Seeding complete");
    Ok(())
}
