use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use super::answers::{Answer, AnswerSet};
use super::catalog::{AnswerType, CoherenceRule, CriteriaCatalog, Criterion, Relation};
use super::completion::Completion;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    MissingRequired,
    TypeMismatch,
    OutOfRange,
    InvalidChoice,
    IncoherentRelation,
    UnknownQuestion,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub question_id: String,
    pub kind: ViolationKind,
    pub detail: String,
}

impl Violation {
    fn new(question_id: &str, kind: ViolationKind, detail: String) -> Self {
        Self {
            question_id: question_id.to_string(),
            kind,
            detail,
        }
    }
}

/// Outcome of one validation pass; an empty violation list is the only success.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    success: bool,
    violations: Vec<Violation>,
    completion: Completion,
}

impl ValidationResult {
    fn new(violations: Vec<Violation>, completion: Completion) -> Self {
        Self {
            success: violations.is_empty(),
            violations,
            completion,
        }
    }

    /// Answered share of the questionnaire, reported whether or not validation passed.
    pub fn completion(&self) -> &Completion {
        &self.completion
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn has(&self, question_id: &str, kind: ViolationKind) -> bool {
        self.violations
            .iter()
            .any(|violation| violation.question_id == question_id && violation.kind == kind)
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.violations.first() {
            None => write!(f, "no violations"),
            Some(first) => write!(
                f,
                "{} violation(s), first on '{}': {}",
                self.violations.len(),
                first.question_id,
                first.detail
            ),
        }
    }
}

/// Checks an answer set against the catalog without side effects.
pub struct ResponseValidator<'a> {
    catalog: &'a CriteriaCatalog,
}

impl<'a> ResponseValidator<'a> {
    pub fn new(catalog: &'a CriteriaCatalog) -> Self {
        Self { catalog }
    }

    /// Report every violation in catalog traversal order, unknown question ids last.
    pub fn validate(&self, answers: &AnswerSet) -> ValidationResult {
        let mut violations = Vec::new();

        for criterion in self.catalog.questions() {
            if let Some(answer) = self.check_criterion(criterion, answers, &mut violations) {
                for rule in self.catalog.rules_for(&criterion.id) {
                    if let Some(detail) = incoherence(rule, answer, answers) {
                        violations.push(Violation::new(
                            &criterion.id,
                            ViolationKind::IncoherentRelation,
                            detail,
                        ));
                    }
                }
            }
        }

        let unknown: BTreeSet<&str> = answers
            .submitted_ids()
            .filter(|id| !self.catalog.contains(id))
            .collect();
        for id in unknown {
            violations.push(Violation::new(
                id,
                ViolationKind::UnknownQuestion,
                "question is not part of the catalog".to_string(),
            ));
        }

        ValidationResult::new(violations, Completion::measure(self.catalog, answers))
    }

    /// Returns the answer when it passed every per-question check.
    fn check_criterion<'s>(
        &self,
        criterion: &Criterion,
        answers: &'s AnswerSet,
        violations: &mut Vec<Violation>,
    ) -> Option<&'s Answer> {
        let id = criterion.id.as_str();

        let Some(answer) = answers.get(id) else {
            if let Some(raw) = answers.rejected(id) {
                violations.push(Violation::new(
                    id,
                    ViolationKind::TypeMismatch,
                    format!("expected {}, got {raw}", criterion.answer_type.label()),
                ));
            } else if criterion.required {
                violations.push(Violation::new(
                    id,
                    ViolationKind::MissingRequired,
                    format!("'{}' is required", criterion.label),
                ));
            }
            return None;
        };

        match check_answer(criterion, answer) {
            Ok(()) => Some(answer),
            Err((kind, detail)) => {
                violations.push(Violation::new(id, kind, detail));
                None
            }
        }
    }
}

/// Convenience wrapper around [`ResponseValidator::validate`].
pub fn validate(catalog: &CriteriaCatalog, answers: &AnswerSet) -> ValidationResult {
    ResponseValidator::new(catalog).validate(answers)
}

fn check_answer(criterion: &Criterion, answer: &Answer) -> Result<(), (ViolationKind, String)> {
    if !answer.matches(&criterion.answer_type) {
        return Err((
            ViolationKind::TypeMismatch,
            format!(
                "expected {}, got {}",
                criterion.answer_type.label(),
                answer.kind()
            ),
        ));
    }

    if let Some(value) = answer.as_number() {
        if !value.is_finite() {
            return Err((
                ViolationKind::TypeMismatch,
                "value is not a finite number".to_string(),
            ));
        }
        if !criterion.bounds.contains(value) {
            return Err((ViolationKind::OutOfRange, out_of_range(criterion, value)));
        }
    }

    match (answer, &criterion.answer_type) {
        (Answer::Text(text), AnswerType::FreeText { max_length }) => {
            let length = text.chars().count();
            if length > *max_length {
                return Err((
                    ViolationKind::OutOfRange,
                    format!("text is {length} characters long, limit is {max_length}"),
                ));
            }
        }
        (Answer::SingleChoice(value), _) => {
            if criterion.choice(value).is_none() {
                return Err((
                    ViolationKind::InvalidChoice,
                    format!("'{value}' is not one of {}", choice_list(criterion)),
                ));
            }
        }
        (Answer::MultiChoice(values), _) => {
            let invalid: Vec<&str> = values
                .iter()
                .map(String::as_str)
                .filter(|value| criterion.choice(value).is_none())
                .collect();
            if !invalid.is_empty() {
                return Err((
                    ViolationKind::InvalidChoice,
                    format!(
                        "'{}' not among {}",
                        invalid.join("', '"),
                        choice_list(criterion)
                    ),
                ));
            }
        }
        _ => {}
    }

    Ok(())
}

fn out_of_range(criterion: &Criterion, value: f64) -> String {
    match (criterion.bounds.min, criterion.bounds.max) {
        (Some(min), Some(max)) => format!("{value} outside {min}..={max}"),
        (Some(min), None) => format!("{value} below minimum {min}"),
        (None, Some(max)) => format!("{value} above maximum {max}"),
        (None, None) => format!("{value} out of range"),
    }
}

fn choice_list(criterion: &Criterion) -> String {
    let values: Vec<&str> = criterion
        .choices
        .iter()
        .map(|choice| choice.value.as_str())
        .collect();
    format!("[{}]", values.join(", "))
}

fn incoherence(rule: &CoherenceRule, subject: &Answer, answers: &AnswerSet) -> Option<String> {
    match &rule.relation {
        Relation::RequiresNonZero { any_of } => {
            let satisfied = any_of
                .iter()
                .any(|id| answers.get(id).is_some_and(Answer::is_non_zero));
            (subject.is_non_zero() && !satisfied)
                .then(|| format!("{} (needs one of: {})", rule.description, any_of.join(", ")))
        }
        Relation::RequiresAnswer { all_of } => {
            let missing: Vec<&str> = all_of
                .iter()
                .map(String::as_str)
                .filter(|id| answers.get(id).is_none())
                .collect();
            (subject.is_non_zero() && !missing.is_empty())
                .then(|| format!("{} (missing: {})", rule.description, missing.join(", ")))
        }
        Relation::NotGreaterThan { other } => {
            let value = subject.as_number()?;
            let limit = answers.number(other)?;
            (value > limit).then(|| format!("{} ({value} > {limit})", rule.description))
        }
    }
}
