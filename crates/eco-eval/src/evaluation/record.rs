use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::answers::{AnswerSet, Responses};
use super::catalog::CriteriaCatalog;
use super::completion::Completion;
use super::scoring::{ScoreSet, ScoringEngine, ScoringError};
use super::validation::{ResponseValidator, ValidationResult, Violation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvaluationId(pub Uuid);

impl EvaluationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(raw: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(raw.trim()).map(Self)
    }
}

impl Default for EvaluationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EvaluationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExhibitionType {
    SmallMuseum,
    LargeMuseum,
    TemporaryExhibition,
    OutdoorExhibition,
    TravelingExhibition,
    VirtualExhibition,
}

impl ExhibitionType {
    pub fn label(&self) -> &'static str {
        match self {
            ExhibitionType::SmallMuseum => "small_museum",
            ExhibitionType::LargeMuseum => "large_museum",
            ExhibitionType::TemporaryExhibition => "temporary_exhibition",
            ExhibitionType::OutdoorExhibition => "outdoor_exhibition",
            ExhibitionType::TravelingExhibition => "traveling_exhibition",
            ExhibitionType::VirtualExhibition => "virtual_exhibition",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        [
            ExhibitionType::SmallMuseum,
            ExhibitionType::LargeMuseum,
            ExhibitionType::TemporaryExhibition,
            ExhibitionType::OutdoorExhibition,
            ExhibitionType::TravelingExhibition,
            ExhibitionType::VirtualExhibition,
        ]
        .into_iter()
        .find(|kind| kind.label() == normalized)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetadata {
    pub name: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub exhibition_type: ExhibitionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
}

/// Upper limit, in characters, for the free-text metadata fields.
pub const METADATA_TEXT_LIMIT: usize = 200;

impl EvaluationMetadata {
    /// The name must be 1-200 characters once trimmed; a venue, when given, likewise.
    pub fn validate(&self) -> Result<(), MetadataError> {
        check_text("name", &self.name)?;
        if let Some(venue) = &self.venue {
            check_text("venue", venue)?;
        }
        Ok(())
    }
}

fn check_text(field: &'static str, value: &str) -> Result<(), MetadataError> {
    let length = value.trim().chars().count();
    if length == 0 {
        return Err(MetadataError::Blank { field });
    }
    if length > METADATA_TEXT_LIMIT {
        return Err(MetadataError::TooLong { field, length });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationState {
    Draft,
    Validated,
    Scored,
    Persisted,
}

impl EvaluationState {
    pub fn label(&self) -> &'static str {
        match self {
            EvaluationState::Draft => "draft",
            EvaluationState::Validated => "validated",
            EvaluationState::Scored => "scored",
            EvaluationState::Persisted => "persisted",
        }
    }
}

impl fmt::Display for EvaluationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One exhibition evaluation moving through `Draft -> Validated -> Scored -> Persisted`.
///
/// Scores are only reachable in the scored states; any answer change drops them and
/// returns the record to `Draft`.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationRecord {
    id: EvaluationId,
    metadata: EvaluationMetadata,
    answers: AnswerSet,
    scores: Option<ScoreSet>,
    state: EvaluationState,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl EvaluationRecord {
    pub fn new(metadata: EvaluationMetadata, answers: AnswerSet) -> Self {
        let now = Utc::now();
        Self {
            id: EvaluationId::new(),
            metadata,
            answers,
            scores: None,
            state: EvaluationState::Draft,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> EvaluationId {
        self.id
    }

    pub fn metadata(&self) -> &EvaluationMetadata {
        &self.metadata
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    pub fn state(&self) -> EvaluationState {
        self.state
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn scores(&self) -> Option<&ScoreSet> {
        match self.state {
            EvaluationState::Scored | EvaluationState::Persisted => self.scores.as_ref(),
            EvaluationState::Draft | EvaluationState::Validated => None,
        }
    }

    pub fn completion(&self, catalog: &CriteriaCatalog) -> Completion {
        Completion::measure(catalog, &self.answers)
    }

    pub fn replace_answers(&mut self, answers: AnswerSet) {
        self.answers = answers;
        self.invalidate();
    }

    /// Apply a batch of response changes as one mutation; `null` values clear answers.
    pub fn amend(&mut self, catalog: &CriteriaCatalog, changes: &Responses) {
        let mut answers = self.answers.clone();
        answers.apply_responses(catalog, changes);
        self.replace_answers(answers);
    }

    pub fn validate(&mut self, catalog: &CriteriaCatalog) -> ValidationResult {
        let result = ResponseValidator::new(catalog).validate(&self.answers);
        if !result.is_success() {
            self.invalidate();
        } else if self.state == EvaluationState::Draft {
            self.transition(EvaluationState::Validated);
        }
        result
    }

    pub fn score(&mut self, catalog: &CriteriaCatalog) -> Result<&ScoreSet, EvaluationError> {
        if self.state != EvaluationState::Validated {
            return Err(EvaluationError::IncompleteEvaluation {
                state: self.state,
                violations: Vec::new(),
            });
        }

        let state = self.state;
        let scores = ScoringEngine::new(catalog)
            .score(&self.answers)
            .map_err(|error| match error {
                ScoringError::IncompleteEvaluation(result) => {
                    EvaluationError::IncompleteEvaluation {
                        state,
                        violations: result.violations().to_vec(),
                    }
                }
                other => EvaluationError::Scoring(other),
            })?;

        self.transition(EvaluationState::Scored);
        Ok(self.scores.insert(scores))
    }

    /// Document as the store should hold it once saved; only scored records qualify.
    pub fn persisted_document(
        &self,
        catalog: &CriteriaCatalog,
    ) -> Result<EvaluationDocument, EvaluationError> {
        match self.state {
            EvaluationState::Scored | EvaluationState::Persisted => {
                let mut document = self.to_document(catalog);
                document.status = Some(EvaluationState::Persisted);
                Ok(document)
            }
            state => Err(EvaluationError::IncompleteEvaluation {
                state,
                violations: Vec::new(),
            }),
        }
    }

    /// Record that the store accepted the document; only scored records may be saved.
    pub fn mark_persisted(&mut self) -> Result<(), EvaluationError> {
        match self.state {
            EvaluationState::Scored => {
                self.state = EvaluationState::Persisted;
                Ok(())
            }
            EvaluationState::Persisted => Ok(()),
            state => Err(EvaluationError::IncompleteEvaluation {
                state,
                violations: Vec::new(),
            }),
        }
    }

    pub fn to_document(&self, catalog: &CriteriaCatalog) -> EvaluationDocument {
        EvaluationDocument {
            evaluation_id: self.id,
            metadata: self.metadata.clone(),
            status: Some(self.state),
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
            responses: self.answers.to_responses(catalog),
            calculated_scores: self.scores().cloned(),
        }
    }

    /// Restore a stored record. Stored scores are kept as-is, never recomputed.
    pub fn from_document(catalog: &CriteriaCatalog, document: EvaluationDocument) -> Self {
        let answers = AnswerSet::from_responses(catalog, &document.responses);
        let state = if document.calculated_scores.is_some() {
            EvaluationState::Persisted
        } else {
            EvaluationState::Draft
        };
        let created_at = document.created_at.unwrap_or_else(Utc::now);

        Self {
            id: document.evaluation_id,
            metadata: document.metadata,
            answers,
            scores: document.calculated_scores,
            state,
            created_at,
            updated_at: document.updated_at.unwrap_or(created_at),
        }
    }

    fn invalidate(&mut self) {
        self.scores = None;
        self.transition(EvaluationState::Draft);
    }

    fn transition(&mut self, state: EvaluationState) {
        self.state = state;
        self.updated_at = Utc::now();
    }
}

/// Persisted JSON shape of an evaluation record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationDocument {
    pub evaluation_id: EvaluationId,
    pub metadata: EvaluationMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EvaluationState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub responses: Responses,
    #[serde(default)]
    pub calculated_scores: Option<ScoreSet>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error("evaluation is incomplete in state {state} ({} violation(s))", .violations.len())]
    IncompleteEvaluation {
        state: EvaluationState,
        violations: Vec<Violation>,
    },
    #[error(transparent)]
    Scoring(ScoringError),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetadataError {
    #[error("metadata field '{field}' must not be blank")]
    Blank { field: &'static str },
    #[error("metadata field '{field}' is {length} characters long, the limit is {}", METADATA_TEXT_LIMIT)]
    TooLong { field: &'static str, length: usize },
}
