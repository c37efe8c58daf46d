use std::sync::Arc;

use tracing::{info, warn};

use super::answers::{AnswerSet, Responses};
use super::catalog::CriteriaCatalog;
use super::record::{
    EvaluationError, EvaluationId, EvaluationMetadata, EvaluationRecord, MetadataError,
};
use super::repository::{EvaluationStore, EvaluationSummary, StoreError};
use super::scoring::{ScoreSet, ScoringEngine, ScoringError};
use super::validation::{ResponseValidator, ValidationResult};

/// Service composing the catalog, validator, scoring engine, and store.
pub struct EvaluationService<S> {
    catalog: Arc<CriteriaCatalog>,
    store: Arc<S>,
}

impl<S> EvaluationService<S>
where
    S: EvaluationStore + 'static,
{
    pub fn new(catalog: Arc<CriteriaCatalog>, store: Arc<S>) -> Self {
        Self { catalog, store }
    }

    pub fn catalog(&self) -> &CriteriaCatalog {
        &self.catalog
    }

    pub fn validate(&self, answers: &AnswerSet) -> ValidationResult {
        ResponseValidator::new(&self.catalog).validate(answers)
    }

    /// Score answers without creating a record.
    pub fn preview(&self, answers: &AnswerSet) -> Result<ScoreSet, EvaluationServiceError> {
        let scores = ScoringEngine::new(&self.catalog).score(answers)?;
        Ok(scores)
    }

    /// Validate, score, and store a new evaluation.
    pub fn create(
        &self,
        metadata: EvaluationMetadata,
        answers: AnswerSet,
    ) -> Result<EvaluationRecord, EvaluationServiceError> {
        if let Err(error) = metadata.validate() {
            warn!(name = %metadata.name, %error, "evaluation metadata rejected");
            return Err(error.into());
        }

        let mut record = EvaluationRecord::new(metadata, answers);
        self.finalize(&mut record)?;
        self.store.insert(record.persisted_document(&self.catalog)?)?;
        record.mark_persisted()?;

        if let Some(scores) = record.scores() {
            info!(
                evaluation_id = %record.id(),
                overall_score = scores.overall_score,
                carbon_footprint = scores.carbon_footprint,
                "evaluation created"
            );
        }
        Ok(record)
    }

    /// Load a stored evaluation as persisted, without recomputing its scores.
    pub fn get(&self, id: &EvaluationId) -> Result<EvaluationRecord, EvaluationServiceError> {
        let document = self.store.load(id)?;
        Ok(EvaluationRecord::from_document(&self.catalog, document))
    }

    /// Apply response changes to a stored evaluation, then re-validate, re-score, and save.
    pub fn amend(
        &self,
        id: &EvaluationId,
        changes: &Responses,
    ) -> Result<EvaluationRecord, EvaluationServiceError> {
        let mut record = self.get(id)?;
        record.amend(&self.catalog, changes);
        self.finalize(&mut record)?;
        self.store.update(record.persisted_document(&self.catalog)?)?;
        record.mark_persisted()?;

        info!(evaluation_id = %record.id(), "evaluation amended");
        Ok(record)
    }

    pub fn list(&self) -> Result<Vec<EvaluationSummary>, EvaluationServiceError> {
        Ok(self.store.list()?)
    }

    fn finalize(&self, record: &mut EvaluationRecord) -> Result<(), EvaluationServiceError> {
        let result = record.validate(&self.catalog);
        if !result.is_success() {
            warn!(
                evaluation_id = %record.id(),
                violations = result.violations().len(),
                "evaluation rejected by validation"
            );
            return Err(EvaluationServiceError::Validation(result));
        }

        let scored = record.score(&self.catalog).map(|_| ());
        match scored {
            Ok(()) => Ok(()),
            Err(EvaluationError::Scoring(error)) => {
                warn!(evaluation_id = %record.id(), %error, "evaluation could not be scored");
                Err(error.into())
            }
            Err(error) => Err(error.into()),
        }
    }
}

/// Error raised by the evaluation service.
#[derive(Debug, thiserror::Error)]
pub enum EvaluationServiceError {
    #[error("evaluation rejected: {0}")]
    Validation(ValidationResult),
    #[error("invalid evaluation metadata: {0}")]
    Metadata(#[from] MetadataError),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Lifecycle(#[from] EvaluationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
