//! Postforge CLI - batch-mode LinkedIn post generation.
//!
//! Composes prompt templates with retrieved brand context, drafts
//! candidates across fixed angle strategies, ranks them with a second
//! provider, refines the winner, and brand-checks the result. Prints the
//! final post followed by a JSON metadata block.

mod examples;

use anyhow::{bail, Context};
use clap::Parser;
use examples::{mock_post, StaticExample, STATIC_EXAMPLES};
use postforge_core::{
    FileConfig, GenerationConfig, KnowledgeBase, PostType, PromptLibrary, OPENAI_MODEL_OPTIONS,
};
use postforge_models::cohere::COHERE_API_KEY_VAR;
use postforge_models::openai::OPENAI_API_KEY_VAR;
use postforge_models::{
    CompletionClient, ModelFactory, ModelProvider, ProviderConfig, RetryPolicy,
};
use postforge_pipeline::{GenerationRequest, Pipeline};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Generate SME-focused LinkedIn posts.
///
/// With no topic/post-type/objective (or with --run-static-examples) the
/// built-in example inputs are used; without an API key those render
/// deterministic offline posts.
#[derive(Parser, Debug)]
#[command(name = "postforge", version, about = "Generate SME-focused LinkedIn posts")]
struct Args {
    /// Post topic
    #[arg(long)]
    topic: Option<String>,

    /// Type of post template to use (thought_leadership, educational, trend_commentary)
    #[arg(long)]
    post_type: Option<PostType>,

    /// Business objective for this post
    #[arg(long)]
    business_objective: Option<String>,

    /// Drafting model [default: gpt-4o-mini]
    #[arg(long, value_parser = clap::builder::PossibleValuesParser::new(OPENAI_MODEL_OPTIONS))]
    model: Option<String>,

    /// Evaluator model [default: command-a-03-2025]
    #[arg(long)]
    cohere_model: Option<String>,

    /// Sampling temperature [default: 0.7]
    #[arg(long)]
    temperature: Option<f32>,

    /// Max output tokens [default: 500]
    #[arg(long)]
    max_tokens: Option<u32>,

    /// Retry attempts per provider call [default: 3]
    #[arg(long)]
    retries: Option<u32>,

    /// Backoff between retries, in seconds [default: 1.0]
    #[arg(long)]
    retry_backoff_seconds: Option<f64>,

    /// Request timeout, in seconds [default: 60.0]
    #[arg(long)]
    timeout: Option<f64>,

    /// Drafting API key (falls back to the OPENAI_API_KEY env var)
    #[arg(long)]
    api_key: Option<String>,

    /// Print metadata JSON only
    #[arg(long)]
    metadata_only: bool,

    /// Run built-in static examples (also used automatically when required
    /// arguments are missing)
    #[arg(long)]
    run_static_examples: bool,

    /// Prompt template directory [default: prompts]
    #[arg(long)]
    prompts_dir: Option<PathBuf>,

    /// Knowledge-base document directory [default: knowledge]
    #[arg(long)]
    knowledge_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    /// Folds CLI flags over the file-and-default config.
    fn apply_to(&self, config: &mut GenerationConfig) {
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(cohere_model) = &self.cohere_model {
            config.cohere_model = cohere_model.clone();
        }
        if let Some(temperature) = self.temperature {
            config.temperature = temperature;
        }
        if let Some(max_tokens) = self.max_tokens {
            config.max_tokens = max_tokens;
        }
        if let Some(retries) = self.retries {
            config.retries = retries;
        }
        if let Some(backoff) = self.retry_backoff_seconds {
            config.retry_backoff_seconds = backoff;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_seconds = timeout;
        }
        if let Some(api_key) = &self.api_key {
            config.api_key = Some(api_key.clone());
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pick up OPENAI_API_KEY / COHERE_API_KEY from a local .env if present.
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let file_config = FileConfig::discover().context("failed to load postforge.toml")?;
    let mut config = GenerationConfig::default();
    file_config.apply_to(&mut config);
    args.apply_to(&mut config);

    let prompts_dir = args
        .prompts_dir
        .clone()
        .or_else(|| file_config.paths.prompts_dir.clone())
        .unwrap_or_else(|| PathBuf::from("prompts"));
    let knowledge_dir = args
        .knowledge_dir
        .clone()
        .or_else(|| file_config.paths.knowledge_dir.clone())
        .unwrap_or_else(|| PathBuf::from("knowledge"));

    let has_drafting_key =
        config.api_key.is_some() || std::env::var(OPENAI_API_KEY_VAR).is_ok();
    let has_evaluator_key =
        config.cohere_api_key.is_some() || std::env::var(COHERE_API_KEY_VAR).is_ok();

    let explicit_inputs = match (&args.topic, args.post_type, &args.business_objective) {
        (Some(topic), Some(post_type), Some(objective)) if !args.run_static_examples => {
            Some((topic.clone(), post_type, objective.clone()))
        }
        _ => None,
    };

    let Some((topic, post_type, business_objective)) = explicit_inputs else {
        return run_static_examples(
            &config,
            &prompts_dir,
            &knowledge_dir,
            has_drafting_key && has_evaluator_key,
            args.metadata_only,
        )
        .await;
    };

    if !has_drafting_key {
        bail!("{OPENAI_API_KEY_VAR} is not set. Provide --api-key or export {OPENAI_API_KEY_VAR}.");
    }
    if !has_evaluator_key {
        bail!("{COHERE_API_KEY_VAR} is not set. Export it to enable candidate ranking.");
    }

    let pipeline = build_pipeline(&config, &prompts_dir, &knowledge_dir)?;
    let request = GenerationRequest::new(topic, post_type, business_objective, config);
    let run = pipeline.run(&request).await?;

    let metadata = serde_json::to_string_pretty(&run.metadata)?;
    if args.metadata_only {
        println!("{metadata}");
    } else {
        println!("{}", run.final_post);
        println!("\n--- METADATA ---");
        println!("{metadata}");
    }
    Ok(())
}

/// Runs the three built-in examples, live when credentials exist and
/// offline otherwise.
async fn run_static_examples(
    config: &GenerationConfig,
    prompts_dir: &Path,
    knowledge_dir: &Path,
    has_credentials: bool,
    metadata_only: bool,
) -> anyhow::Result<()> {
    let pipeline = if has_credentials {
        Some(build_pipeline(config, prompts_dir, knowledge_dir)?)
    } else {
        None
    };

    for (index, example) in STATIC_EXAMPLES.iter().enumerate() {
        let (post, metadata) = if let Some(pipeline) = &pipeline {
            let request = GenerationRequest::new(
                example.topic,
                example.post_type,
                example.business_objective,
                config.clone(),
            );
            let run = pipeline.run(&request).await?;
            (run.final_post, serde_json::to_value(&run.metadata)?)
        } else {
            let post = mock_post(example.topic, example.post_type);
            let metadata = mock_metadata(example, &post);
            (post, metadata)
        };

        let metadata = serde_json::to_string_pretty(&metadata)?;
        if metadata_only {
            println!("{metadata}");
        } else {
            println!("=== STATIC EXAMPLE {} ({}) ===", index + 1, example.post_type);
            println!("{post}");
            println!("\n--- METADATA ---");
            println!("{metadata}");
            println!();
        }
    }
    Ok(())
}

/// Metadata block for an offline mock run, mirroring the live shape where
/// it applies.
fn mock_metadata(example: &StaticExample, post: &str) -> serde_json::Value {
    serde_json::json!({
        "topic": example.topic,
        "post_type": example.post_type,
        "business_objective": example.business_objective,
        "context_used": false,
        "llm": {
            "model": "mock-static-example",
            "attempts": 0,
            "usage": {"prompt_tokens": 0, "completion_tokens": 0, "total_tokens": 0},
            "length": {"prompt_chars": 0, "completion_chars": post.len()},
            "estimated_cost_usd": 0.0,
            "error": null
        }
    })
}

/// Wires providers, prompts, and the knowledge base into a pipeline.
fn build_pipeline(
    config: &GenerationConfig,
    prompts_dir: &Path,
    knowledge_dir: &Path,
) -> anyhow::Result<Pipeline> {
    let policy = RetryPolicy {
        max_attempts: config.retries.max(1),
        backoff: config.retry_backoff(),
    };

    let mut drafting = ProviderConfig::new(ModelProvider::OpenAi, config.model.clone())
        .with_timeout(config.request_timeout());
    if let Some(api_key) = &config.api_key {
        drafting = drafting.with_api_key(api_key.clone());
    }
    let drafting_model = ModelFactory::create(drafting)?;

    let mut evaluating = ProviderConfig::new(ModelProvider::Cohere, config.cohere_model.clone())
        .with_timeout(config.request_timeout());
    if let Some(api_key) = &config.cohere_api_key {
        evaluating = evaluating.with_api_key(api_key.clone());
    }
    let evaluating_model = ModelFactory::create(evaluating)?;

    let mut knowledge = KnowledgeBase::new(knowledge_dir);
    let documents = knowledge.load_all()?;
    info!(documents, root = %knowledge_dir.display(), "Knowledge base loaded");

    Ok(Pipeline::new(
        CompletionClient::new(drafting_model, policy),
        CompletionClient::new(evaluating_model, policy),
        PromptLibrary::new(prompts_dir),
        Box::new(knowledge),
    ))
}
