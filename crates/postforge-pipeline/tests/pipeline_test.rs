//! End-to-end pipeline tests with scripted stub models.

use async_trait::async_trait;
use postforge_abstraction::{
    ChatMessage, Model, ModelError, ModelParameters, ModelResponse, ModelUsage,
};
use postforge_core::{
    ContextRetriever, GenerationConfig, PostType, PromptLibrary, SYSTEM_PROMPT_FILE,
};
use postforge_models::{CompletionClient, RetryPolicy};
use postforge_pipeline::{GenerationRequest, Pipeline, PipelineError};
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Returns scripted responses in call order; repeats the last one when the
/// script runs out.
struct ScriptedModel {
    id: String,
    responses: Mutex<Vec<String>>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    fn new(id: &str, responses: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            responses: Mutex::new(responses.iter().map(ToString::to_string).collect()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn seen_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Model for ScriptedModel {
    async fn generate_text(
        &self,
        prompt: &str,
        parameters: Option<ModelParameters>,
    ) -> Result<ModelResponse, ModelError> {
        self.generate_chat_completion(&[ChatMessage::user(prompt)], parameters).await
    }

    async fn generate_chat_completion(
        &self,
        messages: &[ChatMessage],
        _parameters: Option<ModelParameters>,
    ) -> Result<ModelResponse, ModelError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap()
            .push(messages.iter().map(|m| m.content.clone()).collect::<Vec<_>>().join("\n"));
        let responses = self.responses.lock().unwrap();
        let content = responses.get(call).or_else(|| responses.last()).cloned().unwrap_or_default();
        Ok(ModelResponse {
            content,
            model_id: Some(self.id.clone()),
            usage: Some(ModelUsage { prompt_tokens: 100, completion_tokens: 50, total_tokens: 150 }),
        })
    }

    fn model_id(&self) -> &str {
        &self.id
    }
}

struct FixedContext(&'static str);

impl ContextRetriever for FixedContext {
    fn search(&self, _topic: &str) -> String {
        self.0.to_string()
    }
}

fn write_prompts(dir: &TempDir) -> PromptLibrary {
    fs::write(dir.path().join(SYSTEM_PROMPT_FILE), "You are an SME brand copywriter.\n").unwrap();
    for post_type in PostType::ALL {
        fs::write(
            dir.path().join(post_type.template_file()),
            "Topic: {{topic}}\nAudience: {{audience}}\nGoal: {{goal}}\nContext: {{brand_context}}\nMarket: {{market_context}}\n",
        )
        .unwrap();
    }
    PromptLibrary::new(dir.path())
}

fn client(model: Arc<dyn Model>) -> CompletionClient {
    CompletionClient::new(
        model,
        RetryPolicy { max_attempts: 2, backoff: Duration::from_millis(1) },
    )
}

fn request() -> GenerationRequest {
    GenerationRequest::new(
        "Why SME teams fail at AI adoption after pilot success",
        PostType::ThoughtLeadership,
        "Build authority with SME founders",
        GenerationConfig::default(),
    )
}

#[tokio::test]
async fn test_full_pipeline_sequence() {
    let prompt_dir = TempDir::new().unwrap();
    let prompts = write_prompts(&prompt_dir);

    // Call order on the drafting model: 3 drafts, refine, brand check,
    // refine with feedback, final brand check.
    let drafting = ScriptedModel::new(
        "gpt-4o-mini",
        &[
            "Contrarian draft.",
            "Operational lesson draft.",
            "Case-first draft.",
            "Refined post v1.",
            "SCORE: 62\nFEEDBACK: Hook is generic; strengthen the CTA.",
            "Refined post v2 with feedback applied.",
            "SCORE: 88\nFEEDBACK: On brand.",
        ],
    );
    let evaluating = ScriptedModel::new(
        "command-a-03-2025",
        &[r#"{"selection": 2, "reasoning": "strongest operational insight"}"#],
    );

    let pipeline = Pipeline::new(
        client(drafting.clone()),
        client(evaluating.clone()),
        prompts,
        Box::new(FixedContext("From playbook: assign one rollout owner.")),
    );

    let run = pipeline.run(&request()).await.unwrap();

    // Exactly three candidates, in angle order.
    let meta = &run.metadata;
    assert_eq!(meta.candidates.len(), 3);
    assert_eq!(
        meta.candidate_generation.angles,
        vec!["contrarian", "operational_lesson", "case_first"]
    );

    // Evaluator picked candidate 2 (0-based index 1) without fallback.
    assert_eq!(meta.candidate_generation.selected_index, 1);
    assert_eq!(meta.candidate_generation.selected_angle, "operational_lesson");
    assert!(!meta.candidate_generation.evaluator.used_fallback);
    assert_eq!(
        meta.candidate_generation.evaluator.reasoning.as_deref(),
        Some("strongest operational insight")
    );

    // Two brand checks with parsed scores, and the final text comes from
    // the feedback-driven refinement.
    assert_eq!(meta.brand_check.initial.score, 62);
    assert_eq!(meta.brand_check.final_check.score, 88);
    assert!(meta.refinement.feedback_driven.incorporated_feedback);
    assert!(!meta.refinement.initial.incorporated_feedback);
    assert_eq!(run.final_post, "Refined post v2 with feedback applied.");
    assert!(!run.final_post.is_empty());

    // Strictly sequential: 7 drafting calls, 1 evaluator call.
    assert_eq!(drafting.call_count(), 7);
    assert_eq!(evaluating.call_count(), 1);

    // The drafting prompts carried topic, retrieval context, and the angle
    // instructions; the feedback refinement carried the first check's output.
    let prompts_seen = drafting.seen_prompts();
    assert!(prompts_seen[0].contains("Why SME teams fail at AI adoption after pilot success"));
    assert!(prompts_seen[0].contains("assign one rollout owner"));
    assert!(prompts_seen[0].contains("contrarian stance"));
    assert!(prompts_seen[5].contains("62/100"));
    assert!(prompts_seen[5].contains("strengthen the CTA"));

    // Context came from the retriever, not the fallback.
    assert!(meta.context_used);

    // The metadata aggregate serializes cleanly.
    let json = serde_json::to_string_pretty(&meta).unwrap();
    assert!(json.contains("\"selected_index\": 1"));
    assert!(json.contains("\"final\""));
}

#[tokio::test]
async fn test_all_empty_drafts_is_no_usable_drafts() {
    let prompt_dir = TempDir::new().unwrap();
    let prompts = write_prompts(&prompt_dir);

    let drafting = ScriptedModel::new("gpt-4o-mini", &["", "   ", ""]);
    let evaluating = ScriptedModel::new("command-a-03-2025", &["unused"]);

    let pipeline = Pipeline::new(
        client(drafting),
        client(evaluating.clone()),
        prompts,
        Box::new(FixedContext("ctx")),
    );

    let err = pipeline.run(&request()).await.unwrap_err();
    assert!(matches!(err, PipelineError::NoUsableDrafts));
    // The evaluator is never consulted without drafts.
    assert_eq!(evaluating.call_count(), 0);
}

#[tokio::test]
async fn test_unparseable_evaluation_falls_back_to_first_candidate() {
    let prompt_dir = TempDir::new().unwrap();
    let prompts = write_prompts(&prompt_dir);

    let drafting = ScriptedModel::new(
        "gpt-4o-mini",
        &[
            "Draft A.",
            "Draft B.",
            "Draft C.",
            "Refined.",
            "SCORE: 70\nFEEDBACK: fine",
            "Refined again.",
            "SCORE: 75\nFEEDBACK: fine",
        ],
    );
    let evaluating =
        ScriptedModel::new("command-a-03-2025", &["They are all strong drafts, honestly."]);

    let pipeline = Pipeline::new(
        client(drafting),
        client(evaluating),
        prompts,
        Box::new(FixedContext("ctx")),
    );

    let run = pipeline.run(&request()).await.unwrap();
    assert_eq!(run.metadata.candidate_generation.selected_index, 0);
    assert!(run.metadata.candidate_generation.evaluator.used_fallback);
    assert_eq!(
        run.metadata.candidate_generation.evaluator.raw_response,
        "They are all strong drafts, honestly."
    );
}

#[tokio::test]
async fn test_empty_refinements_keep_prior_draft() {
    let prompt_dir = TempDir::new().unwrap();
    let prompts = write_prompts(&prompt_dir);

    // Drafts succeed; every later call returns nothing.
    let drafting =
        ScriptedModel::new("gpt-4o-mini", &["Draft A.", "Draft B.", "Draft C.", "", "", "", ""]);
    let evaluating = ScriptedModel::new("command-a-03-2025", &[r#"{"selection": 1}"#]);

    let pipeline = Pipeline::new(
        client(drafting),
        client(evaluating),
        prompts,
        Box::new(FixedContext("ctx")),
    );

    let run = pipeline.run(&request()).await.unwrap();

    // Both refinements fell back; brand checks degraded to score 0.
    assert_eq!(run.final_post, "Draft A.");
    assert_eq!(run.metadata.refinement.initial.text, "Draft A.");
    assert_eq!(run.metadata.brand_check.initial.score, 0);
    assert!(run.metadata.brand_check.initial.parse_failed);
    assert_eq!(run.metadata.brand_check.final_check.score, 0);
}

#[tokio::test]
async fn test_skipped_empty_angle_keeps_candidate_order() {
    let prompt_dir = TempDir::new().unwrap();
    let prompts = write_prompts(&prompt_dir);

    // The middle angle returns nothing and is skipped.
    let drafting = ScriptedModel::new(
        "gpt-4o-mini",
        &[
            "Contrarian draft.",
            "",
            "Case-first draft.",
            "Refined.",
            "SCORE: 80\nFEEDBACK: ok",
            "Refined again.",
            "SCORE: 85\nFEEDBACK: ok",
        ],
    );
    let evaluating = ScriptedModel::new("command-a-03-2025", &[r#"{"selection": 2}"#]);

    let pipeline = Pipeline::new(
        client(drafting),
        client(evaluating),
        prompts,
        Box::new(FixedContext("ctx")),
    );

    let run = pipeline.run(&request()).await.unwrap();
    let meta = &run.metadata;
    assert_eq!(meta.candidates.len(), 2);
    assert_eq!(meta.candidate_generation.angles, vec!["contrarian", "case_first"]);
    // Selection 2 resolves against the returned list, not the angle table.
    assert_eq!(meta.candidate_generation.selected_angle, "case_first");
}

#[tokio::test]
async fn test_missing_template_aborts_before_any_call() {
    let prompt_dir = TempDir::new().unwrap();
    // Only the system prompt exists; post templates are missing.
    fs::write(prompt_dir.path().join(SYSTEM_PROMPT_FILE), "system\n").unwrap();
    let prompts = PromptLibrary::new(prompt_dir.path());

    let drafting = ScriptedModel::new("gpt-4o-mini", &["unused"]);
    let evaluating = ScriptedModel::new("command-a-03-2025", &["unused"]);

    let pipeline = Pipeline::new(
        client(drafting.clone()),
        client(evaluating.clone()),
        prompts,
        Box::new(FixedContext("ctx")),
    );

    let err = pipeline.run(&request()).await.unwrap_err();
    assert!(matches!(err, PipelineError::Template(_)));
    assert_eq!(drafting.call_count(), 0);
    assert_eq!(evaluating.call_count(), 0);
}

#[tokio::test]
async fn test_invalid_config_aborts() {
    let prompt_dir = TempDir::new().unwrap();
    let prompts = write_prompts(&prompt_dir);

    let drafting = ScriptedModel::new("gpt-4o-mini", &["unused"]);
    let evaluating = ScriptedModel::new("command-a-03-2025", &["unused"]);
    let pipeline = Pipeline::new(
        client(drafting.clone()),
        client(evaluating),
        prompts,
        Box::new(FixedContext("ctx")),
    );

    let mut req = request();
    req.config.temperature = 9.0;
    let err = pipeline.run(&req).await.unwrap_err();
    assert!(matches!(err, PipelineError::Config(_)));
    assert_eq!(drafting.call_count(), 0);
}
