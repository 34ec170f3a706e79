//! Evaluation pipeline: extract → validate → prompt → one provider call → table.
//!
//! Runs sequentially inside a single request. Documents are extracted one at
//! a time; every failure is terminal for the run and nothing is retried.

use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use crate::errors::{AppError, MissingInput};
use crate::extraction::{extract_blocking, Document, DocumentReport, Extraction};
use crate::llm_client::{resolve_model, ModelProvider};
use crate::screening::models::ResultSet;
use crate::screening::parser::build_rows;
use crate::screening::progress::play_status_sequence;
use crate::screening::prompts::{
    build_evaluation_prompt, CandidateBlock, CandidateSource, EvaluationRequest,
};

/// Everything the user submitted for one run.
#[derive(Debug, Default)]
pub struct SubmittedForm {
    pub api_key: String,
    pub job_file: Option<Document>,
    pub job_text: String,
    pub candidate_files: Vec<Document>,
    pub candidate_text: String,
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub default_model: String,
    pub status_step: Duration,
}

#[derive(Debug)]
pub struct EvaluationOutcome {
    pub results: ResultSet,
    pub status_log: Vec<String>,
    pub documents: Vec<DocumentReport>,
}

/// Inputs after extraction, before any network call.
#[derive(Debug)]
pub struct PreparedInputs {
    pub api_key: String,
    pub request: EvaluationRequest,
    pub documents: Vec<DocumentReport>,
}

/// Extracts every uploaded document and resolves the job description.
/// An uploaded job file wins when it yields text; otherwise the pasted text.
pub async fn prepare_inputs(form: SubmittedForm) -> PreparedInputs {
    let mut documents = Vec::new();

    let mut job_description = String::new();
    if let Some(job_file) = form.job_file {
        let filename = job_file.filename.clone();
        let extraction = extract_blocking(job_file).await;
        documents.push(DocumentReport::new(&filename, &extraction));
        job_description = extraction.text().to_string();
    }
    if job_description.trim().is_empty() {
        job_description = form.job_text;
    }

    let mut candidates = Vec::with_capacity(form.candidate_files.len() + 1);
    for file in form.candidate_files {
        let filename = file.filename.clone();
        let extraction = extract_blocking(file).await;
        let block = CandidateBlock::new(
            CandidateSource::File(filename.clone()),
            extraction.text(),
        );
        documents.push(DocumentReport::new(&filename, &extraction).with_detail(truncation(&block)));
        candidates.push(block);
    }
    if !form.candidate_text.trim().is_empty() {
        let block = CandidateBlock::new(CandidateSource::Pasted, &form.candidate_text);
        // Pasted text is only reported when part of it was cut.
        if let Some(note) = truncation(&block) {
            let pasted = Extraction::Text(form.candidate_text);
            documents.push(
                DocumentReport::new(&block.source.to_string(), &pasted).with_detail(Some(note)),
            );
        }
        candidates.push(block);
    }

    PreparedInputs {
        api_key: form.api_key.trim().to_string(),
        request: EvaluationRequest {
            job_description,
            candidates,
        },
        documents,
    }
}

fn truncation(block: &CandidateBlock) -> Option<String> {
    let note = block.truncation_note()?;
    warn!("Candidate block '{}' {note}", block.source);
    Some(note)
}

/// Credential, then job description, then candidate material.
/// Unreadable files leave empty blocks, so they count as no material.
pub fn validate(inputs: &PreparedInputs) -> Result<(), MissingInput> {
    if inputs.api_key.is_empty() {
        return Err(MissingInput::ApiKey);
    }
    if inputs.request.job_description.trim().is_empty() {
        return Err(MissingInput::JobDescription);
    }
    if !inputs.request.has_candidate_material() {
        return Err(MissingInput::Candidates);
    }
    Ok(())
}

pub async fn run_evaluation(
    provider: &dyn ModelProvider,
    settings: &PipelineSettings,
    form: SubmittedForm,
) -> Result<EvaluationOutcome, AppError> {
    let inputs = prepare_inputs(form).await;
    validate(&inputs).map_err(AppError::MissingInput)?;

    let status_log = play_status_sequence(settings.status_step).await;

    let prompt = build_evaluation_prompt(&inputs.request);
    let model = resolve_model(provider, &inputs.api_key, &settings.default_model).await;
    info!(
        "Evaluating {} candidate block(s) with {} ({:?}), prompt_chars={}",
        inputs.request.candidates.len(),
        model.name,
        model.source,
        prompt.chars().count()
    );

    let raw = provider
        .generate_content(&inputs.api_key, &model.name, &prompt)
        .await?;
    let rows = build_rows(&raw)?;
    info!("Evaluation produced {} row(s)", rows.len());

    Ok(EvaluationOutcome {
        results: ResultSet {
            evaluated_at: Utc::now(),
            model,
            rows,
        },
        status_log,
        documents: inputs.documents,
    })
}
