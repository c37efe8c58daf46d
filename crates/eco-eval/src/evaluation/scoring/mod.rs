mod carbon;
mod criticality;
mod normalize;

pub use criticality::{criticality, CriticalityAssessment};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::answers::AnswerSet;
use super::catalog::{Category, CriteriaCatalog, Subcategory};
use super::validation::{ResponseValidator, ValidationResult};
use normalize::{normalized_score, MAX_SCORE};

/// Complete output of one scoring pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSet {
    pub carbon_footprint: f64,
    pub eco_social_score: f64,
    pub recycled_material_rate: f64,
    pub renewable_energy_share: f64,
    pub category_scores: BTreeMap<String, f64>,
    pub overall_score: f64,
    #[serde(default)]
    pub subcategory_scores: BTreeMap<String, f64>,
    #[serde(default)]
    pub carbon_breakdown: BTreeMap<String, f64>,
    #[serde(default)]
    pub carbon_footprint_per_visitor: Option<f64>,
    #[serde(default)]
    pub energy_consumption_total: f64,
    #[serde(default)]
    pub local_sourcing_share: f64,
    #[serde(default)]
    pub criticality: Vec<CriticalityAssessment>,
}

impl ScoreSet {
    pub fn flagged_risks(&self) -> impl Iterator<Item = &CriticalityAssessment> + '_ {
        self.criticality.iter().filter(|assessment| assessment.flagged)
    }

    /// Name of the first derived figure that is not a finite number.
    ///
    /// JSON has no representation for `inf` or `NaN`, so a set carrying one cannot be stored.
    pub fn non_finite_metric(&self) -> Option<String> {
        let scalars = [
            ("carbon_footprint", self.carbon_footprint),
            ("eco_social_score", self.eco_social_score),
            ("recycled_material_rate", self.recycled_material_rate),
            ("renewable_energy_share", self.renewable_energy_share),
            ("overall_score", self.overall_score),
            ("energy_consumption_total", self.energy_consumption_total),
            ("local_sourcing_share", self.local_sourcing_share),
            (
                "carbon_footprint_per_visitor",
                self.carbon_footprint_per_visitor.unwrap_or(0.0),
            ),
        ];
        if let Some((name, _)) = scalars.iter().find(|(_, value)| !value.is_finite()) {
            return Some((*name).to_string());
        }

        let keyed = [
            ("category_scores", &self.category_scores),
            ("subcategory_scores", &self.subcategory_scores),
            ("carbon_breakdown", &self.carbon_breakdown),
        ];
        for (scope, values) in keyed {
            if let Some(key) = values
                .iter()
                .find(|(_, value)| !value.is_finite())
                .map(|(key, _)| key)
            {
                return Some(format!("{scope}.{key}"));
            }
        }

        self.criticality
            .iter()
            .find(|assessment| !assessment.criticality.is_finite())
            .map(|assessment| format!("criticality.{}", assessment.subcategory))
    }
}

/// Weighted aggregation of validated answers into a [`ScoreSet`].
pub struct ScoringEngine<'a> {
    catalog: &'a CriteriaCatalog,
}

impl<'a> ScoringEngine<'a> {
    pub fn new(catalog: &'a CriteriaCatalog) -> Self {
        Self { catalog }
    }

    /// Score an answer set, refusing input that does not validate.
    pub fn score(&self, answers: &AnswerSet) -> Result<ScoreSet, ScoringError> {
        let validation = ResponseValidator::new(self.catalog).validate(answers);
        if !validation.is_success() {
            return Err(ScoringError::IncompleteEvaluation(validation));
        }

        let mut subcategory_scores = BTreeMap::new();
        let mut category_scores = BTreeMap::new();
        let mut overall = 0.0;

        for category in self.catalog.categories() {
            let score = category_score(category, answers, &mut subcategory_scores);
            overall += category.weight * score;
            category_scores.insert(category.id.clone(), score);
        }

        let carbon = carbon::carbon_footprint(self.catalog, answers);
        let sources = self.catalog.metric_sources();
        let share = |source: &Option<String>| {
            source
                .as_deref()
                .and_then(|id| answers.number(id))
                .unwrap_or(0.0)
        };

        let energy_consumption_total = sources
            .energy_consumption
            .iter()
            .filter_map(|id| answers.number(id))
            .sum();
        let carbon_footprint_per_visitor = sources
            .visitor_count
            .as_deref()
            .and_then(|id| answers.number(id))
            .filter(|visitors| *visitors > 0.0)
            .map(|visitors| carbon.total / visitors);
        let eco_social_score = sources
            .eco_social_category
            .as_deref()
            .and_then(|id| category_scores.get(id).copied())
            .unwrap_or(0.0);

        let scores = ScoreSet {
            carbon_footprint: carbon.total,
            eco_social_score,
            recycled_material_rate: share(&sources.recycled_material_rate),
            renewable_energy_share: share(&sources.renewable_energy_share),
            category_scores,
            overall_score: overall.clamp(0.0, MAX_SCORE),
            subcategory_scores,
            carbon_breakdown: carbon.breakdown,
            carbon_footprint_per_visitor,
            energy_consumption_total,
            local_sourcing_share: share(&sources.local_sourcing_share),
            criticality: criticality::assess(self.catalog, answers),
        };

        match scores.non_finite_metric() {
            Some(metric) => Err(ScoringError::NonFinite { metric }),
            None => Ok(scores),
        }
    }
}

/// Convenience wrapper around [`ScoringEngine::score`].
pub fn score(catalog: &CriteriaCatalog, answers: &AnswerSet) -> Result<ScoreSet, ScoringError> {
    ScoringEngine::new(catalog).score(answers)
}

/// Average over included subcategories, renormalizing the weights of those left out.
fn category_score(
    category: &Category,
    answers: &AnswerSet,
    subcategory_scores: &mut BTreeMap<String, f64>,
) -> f64 {
    let mut weighted = 0.0;
    let mut weight_total = 0.0;

    for subcategory in &category.subcategories {
        let Some(score) = subcategory_score(subcategory, answers) else {
            continue;
        };
        subcategory_scores.insert(subcategory.id.clone(), score);
        weighted += subcategory.weight * score;
        weight_total += subcategory.weight;
    }

    if weight_total > 0.0 {
        (weighted / weight_total).clamp(0.0, MAX_SCORE)
    } else {
        0.0
    }
}

/// Weighted average over answered scorable leaves; `None` when there are none.
fn subcategory_score(subcategory: &Subcategory, answers: &AnswerSet) -> Option<f64> {
    let mut weighted = 0.0;
    let mut weight_total = 0.0;

    for criterion in &subcategory.questions {
        if criterion.weight <= 0.0 {
            continue;
        }
        let Some(score) = answers
            .get(&criterion.id)
            .and_then(|answer| normalized_score(criterion, answer))
        else {
            continue;
        };
        weighted += criterion.weight * score;
        weight_total += criterion.weight;
    }

    (weight_total > 0.0).then(|| (weighted / weight_total).clamp(0.0, MAX_SCORE))
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    #[error("evaluation is incomplete: {0}")]
    IncompleteEvaluation(ValidationResult),
    #[error("derived metric '{metric}' is not a finite number")]
    NonFinite { metric: String },
}
