//! Top-level pipeline orchestration.
//!
//! A straight-line sequence: candidates -> evaluate -> refine ->
//! brand-check -> refine with feedback -> brand-check. Stages that can
//! degrade do so internally; only configuration problems and a fully
//! empty candidate set abort the run.

use crate::brand::BrandChecker;
use crate::candidates::CandidateGenerator;
use crate::error::Result;
use crate::evaluator::CandidateEvaluator;
use crate::metadata::{
    BrandCheckBlock, CandidateGenerationRecord, GenerationMetadata, PromptFiles, RefinementBlock,
};
use crate::refiner::{BrandFeedback, Refiner};
use postforge_abstraction::ModelParameters;
use postforge_core::{
    ContextRetriever, GenerationConfig, PostType, PromptLibrary, DEFAULT_AUDIENCE,
    NO_CONTEXT_FALLBACK,
};
use postforge_models::CompletionClient;
use tracing::info;

/// One immutable generation request.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Post topic.
    pub topic: String,
    /// Post type.
    pub post_type: PostType,
    /// Business objective for this post.
    pub business_objective: String,
    /// Audience label.
    pub audience: String,
    /// Model configuration.
    pub config: GenerationConfig,
}

impl GenerationRequest {
    /// Creates a request with the default audience label.
    pub fn new(
        topic: impl Into<String>,
        post_type: PostType,
        business_objective: impl Into<String>,
        config: GenerationConfig,
    ) -> Self {
        Self {
            topic: topic.into(),
            post_type,
            business_objective: business_objective.into(),
            audience: DEFAULT_AUDIENCE.to_string(),
            config,
        }
    }
}

/// The result of one end-to-end run.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    /// Final post text; never empty on success.
    pub final_post: String,
    /// Full nested run record.
    pub metadata: GenerationMetadata,
}

/// The end-to-end generation pipeline.
///
/// Owns its collaborators, including the retrieval service, so runs are
/// testable in isolation with stub models and retrievers.
pub struct Pipeline {
    drafting: CompletionClient,
    evaluator: CandidateEvaluator,
    refiner: Refiner,
    checker: BrandChecker,
    prompts: PromptLibrary,
    retriever: Box<dyn ContextRetriever>,
}

impl Pipeline {
    /// Creates a pipeline from its collaborators.
    ///
    /// `drafting` is used for drafts, refinement, and brand checks;
    /// `evaluating` ranks candidates.
    pub fn new(
        drafting: CompletionClient,
        evaluating: CompletionClient,
        prompts: PromptLibrary,
        retriever: Box<dyn ContextRetriever>,
    ) -> Self {
        Self {
            refiner: Refiner::new(drafting.clone()),
            checker: BrandChecker::new(drafting.clone()),
            evaluator: CandidateEvaluator::new(evaluating),
            drafting,
            prompts,
            retriever,
        }
    }

    /// Runs the full sequence for one request.
    ///
    /// # Errors
    /// Configuration and template errors abort before any provider call;
    /// `NoUsableDrafts` aborts when every angle draft is empty. The
    /// orchestration performs no retries of its own.
    pub async fn run(&self, request: &GenerationRequest) -> Result<PipelineRun> {
        request.config.validate()?;

        // Prompt files are resolved before any network traffic so a missing
        // template is a fatal configuration error, not a degraded run.
        let system_prompt = self.prompts.system_prompt()?;
        let template = self.prompts.post_template(request.post_type)?;
        let parameters = ModelParameters {
            temperature: Some(request.config.temperature),
            max_tokens: Some(request.config.max_tokens),
        };

        info!(topic = %request.topic, post_type = %request.post_type, "Generating candidate drafts");
        let brand_context = self.retriever.search(&request.topic);
        let context_used = brand_context != NO_CONTEXT_FALLBACK;

        let generator = CandidateGenerator::new(&self.drafting, &system_prompt, &template);
        let candidates = generator
            .generate(
                &request.topic,
                request.post_type,
                &request.audience,
                &request.business_objective,
                &brand_context,
                &parameters,
            )
            .await?;

        info!(count = candidates.len(), "Evaluating candidates");
        let evaluation = self
            .evaluator
            .evaluate(
                &request.topic,
                request.post_type,
                &request.business_objective,
                &candidates,
                &parameters,
            )
            .await;
        let selected = &candidates[evaluation.selected_index];

        info!(
            selected_index = evaluation.selected_index,
            selected_angle = %selected.angle,
            "Running first refinement pass"
        );
        let initial_refinement = self
            .refiner
            .refine(
                &selected.text,
                &request.topic,
                request.post_type,
                &request.business_objective,
                None,
                &parameters,
            )
            .await;

        info!("Running initial brand consistency check");
        let initial_check = self.checker.check(&initial_refinement.text, &parameters).await;

        info!(score = initial_check.score, "Refining again with brand feedback");
        let feedback = BrandFeedback {
            summary: initial_check.feedback_summary.clone(),
            score: initial_check.score,
        };
        let feedback_refinement = self
            .refiner
            .refine(
                &initial_refinement.text,
                &request.topic,
                request.post_type,
                &request.business_objective,
                Some(&feedback),
                &parameters,
            )
            .await;

        info!("Running final brand consistency check");
        let final_check = self.checker.check(&feedback_refinement.text, &parameters).await;

        let final_post = feedback_refinement.text.clone();
        info!(score = final_check.score, chars = final_post.len(), "Final post ready");

        let metadata = GenerationMetadata {
            topic: request.topic.clone(),
            post_type: request.post_type,
            business_objective: request.business_objective.clone(),
            context_used,
            prompt_files: PromptFiles {
                system: self.prompts.system_prompt_name(),
                template: self.prompts.template_name(request.post_type),
            },
            candidate_generation: CandidateGenerationRecord {
                count: candidates.len(),
                angles: candidates.iter().map(|c| c.angle.clone()).collect(),
                selected_index: evaluation.selected_index,
                selected_angle: selected.angle.clone(),
                evaluator: evaluation.evaluator,
            },
            llm: selected.llm.clone(),
            candidates,
            refinement: RefinementBlock {
                initial: initial_refinement,
                feedback_driven: feedback_refinement,
            },
            brand_check: BrandCheckBlock { initial: initial_check, final_check },
        };

        Ok(PipelineRun { final_post, metadata })
    }
}
