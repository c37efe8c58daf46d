use serde::Serialize;

/// Cross-field constraint checked after the subject question passes its own checks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoherenceRule {
    pub question: String,
    pub relation: Relation,
    pub description: String,
}

impl CoherenceRule {
    pub fn requires_non_zero(question: &str, any_of: &[&str], description: &str) -> Self {
        Self {
            question: question.to_string(),
            relation: Relation::RequiresNonZero {
                any_of: any_of.iter().map(|id| id.to_string()).collect(),
            },
            description: description.to_string(),
        }
    }

    pub fn requires_answer(question: &str, all_of: &[&str], description: &str) -> Self {
        Self {
            question: question.to_string(),
            relation: Relation::RequiresAnswer {
                all_of: all_of.iter().map(|id| id.to_string()).collect(),
            },
            description: description.to_string(),
        }
    }

    pub fn not_greater_than(question: &str, other: &str, description: &str) -> Self {
        Self {
            question: question.to_string(),
            relation: Relation::NotGreaterThan {
                other: other.to_string(),
            },
            description: description.to_string(),
        }
    }

    pub fn referenced_ids(&self) -> Vec<&str> {
        let mut ids = vec![self.question.as_str()];
        match &self.relation {
            Relation::RequiresNonZero { any_of } => ids.extend(any_of.iter().map(String::as_str)),
            Relation::RequiresAnswer { all_of } => ids.extend(all_of.iter().map(String::as_str)),
            Relation::NotGreaterThan { other } => ids.push(other.as_str()),
        }
        ids
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Relation {
    /// A non-zero subject needs at least one non-zero answer among `any_of`.
    RequiresNonZero { any_of: Vec<String> },
    /// A non-zero subject needs every question in `all_of` answered.
    RequiresAnswer { all_of: Vec<String> },
    /// When both are answered the subject may not exceed `other`.
    NotGreaterThan { other: String },
}

/// Questions feeding the `frequency * severity / control` criticality of a subcategory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskProfile {
    pub frequency: String,
    pub severity: String,
    pub control: String,
    pub threshold: f64,
}

impl RiskProfile {
    pub fn new(frequency: &str, severity: &str, control: &str, threshold: f64) -> Self {
        Self {
            frequency: frequency.to_string(),
            severity: severity.to_string(),
            control: control.to_string(),
            threshold,
        }
    }
}

/// Questions and categories read for the named derived metrics of a score set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricSources {
    pub recycled_material_rate: Option<String>,
    pub renewable_energy_share: Option<String>,
    pub local_sourcing_share: Option<String>,
    pub eco_social_category: Option<String>,
    pub energy_consumption: Vec<String>,
    pub visitor_count: Option<String>,
}

impl MetricSources {
    pub(crate) fn referenced_questions(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = [
            &self.recycled_material_rate,
            &self.renewable_energy_share,
            &self.local_sourcing_share,
            &self.visitor_count,
        ]
        .into_iter()
        .flatten()
        .map(String::as_str)
        .collect();
        ids.extend(self.energy_consumption.iter().map(String::as_str));
        ids
    }
}
