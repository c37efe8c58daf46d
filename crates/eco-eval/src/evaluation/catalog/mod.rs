//! Hierarchical criteria taxonomy: categories, subcategories, and weighted leaf questions.
//!
//! A [`CriteriaCatalog`] is validated once when built and immutable afterwards. Callers share
//! it behind an `Arc` and pass it by reference into validation and scoring.

mod criterion;
pub mod factors;
mod rules;
mod standard;

pub use criterion::{
    AnswerType, Bounds, Choice, Criterion, EmissionSource, ImpactLevel, Polarity, QuestionPath,
    ScoreBand, NUMERIC_CEILING,
};
pub use rules::{CoherenceRule, MetricSources, Relation, RiskProfile};

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

/// Tolerance applied when checking that sibling weights sum to one.
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subcategory {
    pub id: String,
    pub label: String,
    pub weight: f64,
    pub questions: Vec<Criterion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk: Option<RiskProfile>,
}

impl Subcategory {
    pub fn new(id: &str, label: &str, weight: f64) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            weight,
            questions: Vec::new(),
            risk: None,
        }
    }

    pub fn question(mut self, criterion: Criterion) -> Self {
        self.questions.push(criterion);
        self
    }

    pub fn risk(mut self, profile: RiskProfile) -> Self {
        self.risk = Some(profile);
        self
    }

    /// A subcategory counts toward its parent only when some leaf carries weight.
    pub fn is_scorable(&self) -> bool {
        self.questions.iter().any(|question| question.weight > 0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    pub id: String,
    pub label: String,
    pub weight: f64,
    pub subcategories: Vec<Subcategory>,
}

impl Category {
    pub fn new(id: &str, label: &str, weight: f64) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            weight,
            subcategories: Vec::new(),
        }
    }

    pub fn subcategory(mut self, subcategory: Subcategory) -> Self {
        self.subcategories.push(subcategory);
        self
    }
}

#[derive(Debug, Clone, Copy)]
struct LeafIndex {
    category: usize,
    subcategory: usize,
    question: usize,
    weight: f64,
}

/// Immutable, validated evaluation taxonomy.
#[derive(Debug, Clone, Serialize)]
pub struct CriteriaCatalog {
    categories: Vec<Category>,
    coherence_rules: Vec<CoherenceRule>,
    metric_sources: MetricSources,
    #[serde(skip)]
    index: BTreeMap<String, LeafIndex>,
    #[serde(skip)]
    subcategory_weights: BTreeMap<String, f64>,
}

impl CriteriaCatalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    /// Reference taxonomy of 93 questions across five weighted categories.
    pub fn standard() -> Result<Self, CatalogError> {
        standard::build()
    }

    pub fn get(&self, question_id: &str) -> Result<&Criterion, CatalogError> {
        self.index
            .get(question_id)
            .map(|leaf| self.leaf(leaf))
            .ok_or_else(|| CatalogError::UnknownQuestion(question_id.to_string()))
    }

    pub fn contains(&self, question_id: &str) -> bool {
        self.index.contains_key(question_id)
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, category_id: &str) -> Option<&Category> {
        self.categories
            .iter()
            .find(|category| category.id == category_id)
    }

    pub fn subcategory(&self, subcategory_id: &str) -> Option<&Subcategory> {
        self.categories
            .iter()
            .flat_map(|category| category.subcategories.iter())
            .find(|subcategory| subcategory.id == subcategory_id)
    }

    /// Share of the overall score carried by one question; all leaf weights sum to one.
    pub fn weight_of(&self, question_id: &str) -> Result<f64, CatalogError> {
        self.index
            .get(question_id)
            .map(|leaf| leaf.weight)
            .ok_or_else(|| CatalogError::UnknownQuestion(question_id.to_string()))
    }

    /// Subcategory weight within its category after excluding unscorable siblings.
    pub fn effective_subcategory_weight(&self, subcategory_id: &str) -> Option<f64> {
        self.subcategory_weights.get(subcategory_id).copied()
    }

    /// Leaf questions in traversal order.
    pub fn questions(&self) -> impl Iterator<Item = &Criterion> + '_ {
        self.categories.iter().flat_map(|category| {
            category
                .subcategories
                .iter()
                .flat_map(|subcategory| subcategory.questions.iter())
        })
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn coherence_rules(&self) -> &[CoherenceRule] {
        &self.coherence_rules
    }

    pub fn rules_for<'a>(&'a self, question_id: &'a str) -> impl Iterator<Item = &'a CoherenceRule> {
        self.coherence_rules
            .iter()
            .filter(move |rule| rule.question == question_id)
    }

    pub fn metric_sources(&self) -> &MetricSources {
        &self.metric_sources
    }

    fn leaf(&self, leaf: &LeafIndex) -> &Criterion {
        &self.categories[leaf.category].subcategories[leaf.subcategory].questions[leaf.question]
    }
}

/// Collects categories and rules, then checks every structural invariant in [`build`].
///
/// [`build`]: CatalogBuilder::build
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    categories: Vec<Category>,
    coherence_rules: Vec<CoherenceRule>,
    metric_sources: MetricSources,
}

impl CatalogBuilder {
    pub fn category(mut self, category: Category) -> Self {
        self.categories.push(category);
        self
    }

    pub fn coherence(mut self, rule: CoherenceRule) -> Self {
        self.coherence_rules.push(rule);
        self
    }

    pub fn metrics(mut self, sources: MetricSources) -> Self {
        self.metric_sources = sources;
        self
    }

    pub fn build(self) -> Result<CriteriaCatalog, CatalogError> {
        let CatalogBuilder {
            mut categories,
            coherence_rules,
            metric_sources,
        } = self;

        let mut category_ids = BTreeSet::new();
        let mut subcategory_ids = BTreeSet::new();
        let mut question_ids = BTreeSet::new();

        for category in &mut categories {
            check_weight(&category.id, category.weight)?;
            if !category_ids.insert(category.id.clone()) {
                return Err(CatalogError::DuplicateId {
                    kind: "category",
                    id: category.id.clone(),
                });
            }

            for subcategory in &mut category.subcategories {
                check_weight(&subcategory.id, subcategory.weight)?;
                if !subcategory_ids.insert(subcategory.id.clone()) {
                    return Err(CatalogError::DuplicateId {
                        kind: "subcategory",
                        id: subcategory.id.clone(),
                    });
                }

                for question in &mut subcategory.questions {
                    check_weight(&question.id, question.weight)?;
                    if !question_ids.insert(question.id.clone()) {
                        return Err(CatalogError::DuplicateId {
                            kind: "question",
                            id: question.id.clone(),
                        });
                    }
                    check_answer_type(question)?;
                    question.path = QuestionPath {
                        category: category.id.clone(),
                        subcategory: subcategory.id.clone(),
                    };
                }

                if subcategory.is_scorable() {
                    let sum: f64 = subcategory.questions.iter().map(|q| q.weight).sum();
                    check_sum(&subcategory.id, sum)?;
                    if !subcategory.questions.iter().any(|q| q.required && q.weight > 0.0) {
                        return Err(CatalogError::NoRequiredQuestion(subcategory.id.clone()));
                    }
                }
            }

            let declared: f64 = category.subcategories.iter().map(|s| s.weight).sum();
            check_sum(&category.id, declared)?;
        }

        let total: f64 = categories.iter().map(|category| category.weight).sum();
        check_sum("catalog", total)?;

        let mut index = BTreeMap::new();
        let mut subcategory_weights = BTreeMap::new();

        for (category_idx, category) in categories.iter().enumerate() {
            let scorable: f64 = category
                .subcategories
                .iter()
                .filter(|subcategory| subcategory.is_scorable())
                .map(|subcategory| subcategory.weight)
                .sum();
            if category.weight > 0.0 && scorable <= 0.0 {
                return Err(CatalogError::EmptyCategory(category.id.clone()));
            }

            for (subcategory_idx, subcategory) in category.subcategories.iter().enumerate() {
                let effective = if subcategory.is_scorable() && scorable > 0.0 {
                    subcategory.weight / scorable
                } else {
                    0.0
                };
                subcategory_weights.insert(subcategory.id.clone(), effective);

                for (question_idx, question) in subcategory.questions.iter().enumerate() {
                    index.insert(
                        question.id.clone(),
                        LeafIndex {
                            category: category_idx,
                            subcategory: subcategory_idx,
                            question: question_idx,
                            weight: category.weight * effective * question.weight,
                        },
                    );
                }
            }
        }

        let catalog = CriteriaCatalog {
            categories,
            coherence_rules,
            metric_sources,
            index,
            subcategory_weights,
        };

        check_references(&catalog)?;
        Ok(catalog)
    }
}

fn check_weight(id: &str, weight: f64) -> Result<(), CatalogError> {
    if weight.is_finite() && weight >= 0.0 {
        Ok(())
    } else {
        Err(CatalogError::InvalidWeight {
            id: id.to_string(),
            weight,
        })
    }
}

fn check_sum(scope: &str, sum: f64) -> Result<(), CatalogError> {
    if (sum - 1.0).abs() <= WEIGHT_TOLERANCE {
        Ok(())
    } else {
        Err(CatalogError::WeightSum {
            scope: scope.to_string(),
            sum,
        })
    }
}

fn check_answer_type(question: &Criterion) -> Result<(), CatalogError> {
    let invalid = |reason: &str| CatalogError::InvalidAnswerType {
        id: question.id.clone(),
        reason: reason.to_string(),
    };

    match &question.answer_type {
        AnswerType::Scale { min, max } if min >= max => {
            return Err(invalid("scale minimum must be below its maximum"))
        }
        AnswerType::SingleChoice | AnswerType::MultiChoice if question.choices.is_empty() => {
            return Err(invalid("choice questions need at least one choice"))
        }
        AnswerType::FreeText { max_length: 0 } => {
            return Err(invalid("free text needs a positive maximum length"))
        }
        AnswerType::Numeric { .. } if !question.bounds.max.is_some_and(f64::is_finite) => {
            return Err(invalid("numeric questions need a finite maximum"))
        }
        _ => {}
    }

    if question.bounds.min.is_some_and(|min| !min.is_finite()) {
        return Err(invalid("minimum bounds must be finite"));
    }

    let mut values = BTreeSet::new();
    for choice in &question.choices {
        if !values.insert(choice.value.as_str()) {
            return Err(invalid("choice values must be unique"));
        }
        if !(0.0..=10.0).contains(&choice.score) {
            return Err(invalid("choice scores must lie within 0-10"));
        }
    }

    if let Some(band) = question.score_band {
        if !band.best.is_finite() || !band.worst.is_finite() || band.best == band.worst {
            return Err(invalid("score band needs two distinct finite ends"));
        }
    }

    if !question.is_scorable() && question.weight > 0.0 {
        return Err(CatalogError::UnscoredWeight(question.id.clone()));
    }

    Ok(())
}

fn check_references(catalog: &CriteriaCatalog) -> Result<(), CatalogError> {
    let missing = |context: &str, id: &str| CatalogError::UnknownReference {
        context: context.to_string(),
        id: id.to_string(),
    };

    for rule in &catalog.coherence_rules {
        for id in rule.referenced_ids() {
            if !catalog.contains(id) {
                return Err(missing("coherence rule", id));
            }
        }
        if let Relation::NotGreaterThan { other } = &rule.relation {
            for id in [rule.question.as_str(), other.as_str()] {
                if !catalog.get(id)?.answer_type.is_quantity() {
                    return Err(CatalogError::InvalidAnswerType {
                        id: id.to_string(),
                        reason: "ordering rules only compare quantities".to_string(),
                    });
                }
            }
        }
    }

    for question in catalog.questions() {
        match &question.emission {
            Some(EmissionSource::ByChoice { selector }) => {
                let selector = catalog
                    .get(selector)
                    .map_err(|_| missing("emission selector", selector))?;
                if selector.answer_type != AnswerType::SingleChoice {
                    return Err(CatalogError::InvalidAnswerType {
                        id: selector.id.clone(),
                        reason: "emission selectors must be single choice".to_string(),
                    });
                }
                if let Some(choice) = selector
                    .choices
                    .iter()
                    .find(|choice| !choice.emission_factor.is_some_and(f64::is_finite))
                {
                    return Err(CatalogError::InvalidAnswerType {
                        id: selector.id.clone(),
                        reason: format!(
                            "emission selector choice '{}' needs a finite factor",
                            choice.value
                        ),
                    });
                }
            }
            Some(EmissionSource::Fixed { factor }) if !factor.is_finite() => {
                return Err(CatalogError::InvalidAnswerType {
                    id: question.id.clone(),
                    reason: "emission factors must be finite".to_string(),
                });
            }
            _ => {}
        }
        if question.emission.is_some() && !matches!(question.answer_type, AnswerType::Numeric { .. })
        {
            return Err(CatalogError::InvalidAnswerType {
                id: question.id.clone(),
                reason: "emission sources must be numeric quantities".to_string(),
            });
        }
    }

    for category in &catalog.categories {
        for subcategory in &category.subcategories {
            if let Some(risk) = &subcategory.risk {
                for id in [&risk.frequency, &risk.severity, &risk.control] {
                    let criterion = catalog.get(id).map_err(|_| missing("risk profile", id))?;
                    if !criterion.answer_type.is_quantity() {
                        return Err(CatalogError::InvalidAnswerType {
                            id: id.clone(),
                            reason: "risk inputs must be quantities".to_string(),
                        });
                    }
                }
            }
        }
    }

    for id in catalog.metric_sources.referenced_questions() {
        if !catalog.contains(id) {
            return Err(missing("metric source", id));
        }
    }
    if let Some(category) = &catalog.metric_sources.eco_social_category {
        if catalog.category(category).is_none() {
            return Err(missing("metric source", category));
        }
    }

    Ok(())
}

/// Catalog lookup misses and structural invariant violations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    #[error("unknown question '{0}'")]
    UnknownQuestion(String),
    #[error("duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },
    #[error("weight {weight} for '{id}' must be finite and non-negative")]
    InvalidWeight { id: String, weight: f64 },
    #[error("weights under '{scope}' sum to {sum}, expected 1.0")]
    WeightSum { scope: String, sum: f64 },
    #[error("category '{0}' has no scorable subcategory")]
    EmptyCategory(String),
    #[error("subcategory '{0}' has no required weighted question")]
    NoRequiredQuestion(String),
    #[error("question '{0}' cannot be normalized and must carry zero weight")]
    UnscoredWeight(String),
    #[error("question '{id}' is misconfigured: {reason}")]
    InvalidAnswerType { id: String, reason: String },
    #[error("{context} references unknown id '{id}'")]
    UnknownReference { context: String, id: String },
}
