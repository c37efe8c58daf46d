use serde::{Deserialize, Serialize};

use super::super::answers::AnswerSet;
use super::super::catalog::CriteriaCatalog;

/// Risk flag for one subcategory; never feeds the weighted scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalityAssessment {
    pub subcategory: String,
    pub frequency: f64,
    pub severity: f64,
    pub control: f64,
    pub criticality: f64,
    pub threshold: f64,
    pub flagged: bool,
}

/// `frequency * severity / control`, with control floored at 1.
pub fn criticality(frequency: f64, severity: f64, control: f64) -> f64 {
    frequency * severity / control.max(1.0)
}

/// Assess every risk-profiled subcategory whose three inputs are answered.
pub(crate) fn assess(catalog: &CriteriaCatalog, answers: &AnswerSet) -> Vec<CriticalityAssessment> {
    let mut assessments = Vec::new();

    for subcategory in catalog
        .categories()
        .iter()
        .flat_map(|category| category.subcategories.iter())
    {
        let Some(risk) = &subcategory.risk else {
            continue;
        };
        let (Some(frequency), Some(severity), Some(control)) = (
            answers.number(&risk.frequency),
            answers.number(&risk.severity),
            answers.number(&risk.control),
        ) else {
            continue;
        };

        let value = criticality(frequency, severity, control);
        assessments.push(CriticalityAssessment {
            subcategory: subcategory.id.clone(),
            frequency,
            severity,
            control,
            criticality: value,
            threshold: risk.threshold,
            flagged: value >= risk.threshold,
        });
    }

    assessments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_is_floored_at_one() {
        assert_eq!(criticality(4.0, 3.0, 0.0), 12.0);
        assert_eq!(criticality(4.0, 3.0, 2.0), 6.0);
    }
}
