//! Exhibition eco-evaluation: criteria catalog, response validation, weighted scoring, and the
//! evaluation record lifecycle.
//!
//! Validation and scoring are pure functions of a [`CriteriaCatalog`] and an [`AnswerSet`].
//! Persistence goes through the [`EvaluationStore`] collaborator trait.

pub mod answers;
pub mod catalog;
pub mod completion;
pub mod import;
pub mod record;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use answers::{Answer, AnswerSet, Responses};
pub use catalog::{CatalogError, Category, CriteriaCatalog, Criterion, Subcategory};
pub use completion::Completion;
pub use import::{AnswerImportError, AnswerSheetImporter};
pub use record::{
    EvaluationDocument, EvaluationError, EvaluationId, EvaluationMetadata, EvaluationRecord,
    EvaluationState, ExhibitionType, MetadataError,
};
pub use repository::{EvaluationStore, EvaluationSummary, StoreError};
pub use router::evaluation_router;
pub use scoring::{CriticalityAssessment, ScoreSet, ScoringEngine, ScoringError};
pub use service::{EvaluationService, EvaluationServiceError};
pub use validation::{ResponseValidator, ValidationResult, Violation, ViolationKind};
