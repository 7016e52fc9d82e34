use std::sync::Arc;

use futures::future::join_all;
use sqa_core::domain::{renumber_questions, AnswerResult, Question};
use sqa_core::error::AppError;
use sqa_core::questions::{extract_questions, group_similar_questions};
use tracing::{info, warn};

use crate::answer::{AnswerCache, AnswerSynthesizer};
use crate::config::{PipelineConfig, DEFAULT_BATCH_SIZE};
use crate::llm::{build_generator, Generator};

/// One document-processing session: question mining, batched answering, grouping.
///
/// The answer cache lives exactly as long as the pipeline.
pub struct QaPipeline {
    synthesizer: AnswerSynthesizer,
    batch_size: usize,
}

impl QaPipeline {
    /// Pipeline with a fresh cache sized by `config`, answering through `generator`.
    pub fn new(generator: Arc<dyn Generator>, config: &PipelineConfig) -> Result<Self, AppError> {
        config.validate()?;
        let cache = Arc::new(AnswerCache::with_ttl(config.cache_ttl()));
        Ok(Self {
            synthesizer: AnswerSynthesizer::new(generator, cache),
            batch_size: config.batch_size,
        })
    }

    /// Pipeline whose generator is built from `config.backend`.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, AppError> {
        let generator = build_generator(config)?;
        Self::new(generator, config)
    }

    pub fn with_synthesizer(synthesizer: AnswerSynthesizer) -> Self {
        Self {
            synthesizer,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn synthesizer(&self) -> &AnswerSynthesizer {
        &self.synthesizer
    }

    /// Answer `questions` in input order.
    ///
    /// Each batch runs its answers concurrently and is fully joined before the next batch
    /// starts, so at most `batch_size` generation calls are in flight.
    pub async fn answer_questions(&self, questions: &[String], study_content: &str) -> Vec<Question> {
        let content: Arc<str> = Arc::from(study_content);
        let mut answered: Vec<Question> = Vec::with_capacity(questions.len());

        for (batch_idx, batch) in questions.chunks(self.batch_size).enumerate() {
            info!(batch = batch_idx, size = batch.len(), "answering batch");
            let tasks = batch.iter().map(|question| {
                let synthesizer = self.synthesizer.clone();
                let question = question.clone();
                let content = Arc::clone(&content);
                tokio::task::spawn_blocking(move || synthesizer.generate_answer(&question, &content))
            });
            let results = join_all(tasks).await;

            for (question, result) in batch.iter().zip(results) {
                let answer = result.unwrap_or_else(|e| {
                    let err = AppError::new("PIPELINE_TASK_FAILED", "Answer task did not complete")
                        .with_details(e.to_string());
                    warn!(error = %err, question = %question, "answer task failed");
                    AnswerResult::error()
                });
                let mut q = Question::unanswered(question.as_str()).with_answer(answer);
                q.id = answered.len() as u32 + 1;
                answered.push(q);
            }
        }

        answered
    }

    /// Mine questions from `question_paper`, answer them from `study_content`, collapse
    /// near-duplicates and number the survivors `1..=N`.
    pub async fn run(&self, question_paper: &str, study_content: &str) -> Vec<Question> {
        let questions = extract_questions(question_paper);
        info!(questions = questions.len(), "questions extracted");

        let answered = self.answer_questions(&questions, study_content).await;
        let mut grouped = group_similar_questions(answered);
        renumber_questions(&mut grouped);

        let stats = self.synthesizer.cache().stats();
        info!(
            questions = grouped.len(),
            cached = stats.entries,
            "pipeline run complete"
        );
        grouped
    }
}
