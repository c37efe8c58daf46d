use serde::Serialize;

use super::record::{EvaluationDocument, EvaluationId, EvaluationState};

/// Persistence collaborator for evaluation documents.
///
/// Calls are synchronous and may fail; callers surface failures rather than retrying.
pub trait EvaluationStore: Send + Sync {
    fn insert(&self, document: EvaluationDocument) -> Result<(), StoreError>;
    fn update(&self, document: EvaluationDocument) -> Result<(), StoreError>;
    fn load(&self, id: &EvaluationId) -> Result<EvaluationDocument, StoreError>;
    fn delete(&self, id: &EvaluationId) -> Result<(), StoreError>;
    fn list(&self) -> Result<Vec<EvaluationSummary>, StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("evaluation already exists")]
    Conflict,
    #[error("evaluation not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("stored evaluation is unreadable: {0}")]
    Corrupt(String),
}

/// Listing entry returned by [`EvaluationStore::list`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationSummary {
    pub evaluation_id: EvaluationId,
    pub name: String,
    pub status: Option<EvaluationState>,
    pub overall_score: Option<f64>,
}

impl From<&EvaluationDocument> for EvaluationSummary {
    fn from(document: &EvaluationDocument) -> Self {
        Self {
            evaluation_id: document.evaluation_id,
            name: document.metadata.name.clone(),
            status: document.status,
            overall_score: document
                .calculated_scores
                .as_ref()
                .map(|scores| scores.overall_score),
        }
    }
}
