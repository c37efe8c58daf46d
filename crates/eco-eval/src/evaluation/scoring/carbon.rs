use std::collections::BTreeMap;

use super::super::answers::{Answer, AnswerSet};
use super::super::catalog::{CriteriaCatalog, Criterion, EmissionSource};

pub(crate) struct CarbonTally {
    pub(crate) total: f64,
    pub(crate) breakdown: BTreeMap<String, f64>,
}

/// Sum `quantity * factor` over answered emission-source questions.
pub(crate) fn carbon_footprint(catalog: &CriteriaCatalog, answers: &AnswerSet) -> CarbonTally {
    let mut breakdown = BTreeMap::new();
    let mut total = 0.0;

    for criterion in catalog.questions() {
        let Some(source) = &criterion.emission else {
            continue;
        };
        let Some(quantity) = answers.number(&criterion.id) else {
            continue;
        };
        let Some(factor) = emission_factor(catalog, criterion, source, answers) else {
            continue;
        };

        let emissions = quantity * factor;
        total += emissions;
        breakdown.insert(criterion.id.clone(), emissions);
    }

    CarbonTally {
        total: total.max(0.0),
        breakdown,
    }
}

fn emission_factor(
    catalog: &CriteriaCatalog,
    criterion: &Criterion,
    source: &EmissionSource,
    answers: &AnswerSet,
) -> Option<f64> {
    match source {
        EmissionSource::Fixed { factor } => Some(*factor),
        EmissionSource::ByChoice { selector } => {
            let Some(Answer::SingleChoice(selected)) = answers.get(selector) else {
                tracing::debug!(question = %criterion.id, %selector, "emission selector unanswered");
                return None;
            };
            catalog
                .get(selector)
                .ok()?
                .choice(selected)?
                .emission_factor
        }
    }
}
