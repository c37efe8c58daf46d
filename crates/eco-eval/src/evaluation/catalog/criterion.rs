use serde::Serialize;

/// Informational weighting hint carried over from the questionnaire design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactLevel {
    High,
    Medium,
    Low,
}

/// Direction in which a normalized answer improves the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    HigherIsBetter,
    LowerIsBetter,
}

/// Declared shape of the value a question collects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerType {
    Numeric { unit: String },
    Percentage,
    Scale { min: i64, max: i64 },
    SingleChoice,
    MultiChoice,
    Boolean,
    FreeText { max_length: usize },
}

impl AnswerType {
    pub fn label(&self) -> &'static str {
        match self {
            AnswerType::Numeric { .. } => "numeric",
            AnswerType::Percentage => "percentage",
            AnswerType::Scale { .. } => "scale",
            AnswerType::SingleChoice => "single_choice",
            AnswerType::MultiChoice => "multi_choice",
            AnswerType::Boolean => "boolean",
            AnswerType::FreeText { .. } => "free_text",
        }
    }

    pub fn is_choice(&self) -> bool {
        matches!(self, AnswerType::SingleChoice | AnswerType::MultiChoice)
    }

    pub fn is_quantity(&self) -> bool {
        matches!(
            self,
            AnswerType::Numeric { .. } | AnswerType::Percentage | AnswerType::Scale { .. }
        )
    }
}

/// Default upper bound for numeric quantities that declare none of their own.
pub const NUMERIC_CEILING: f64 = 1.0e9;

/// Inclusive numeric bounds; `None` leaves a side open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Bounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Bounds {
    pub fn contains(&self, value: f64) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

/// One entry of a choice set with its 0-10 score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emission_factor: Option<f64>,
}

impl Choice {
    pub fn new(value: &str, label: &str, score: f64) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
            score,
            emission_factor: None,
        }
    }

    /// Attach an emission factor used when this choice selects a carbon source.
    pub fn emitting(mut self, factor: f64) -> Self {
        self.emission_factor = Some(factor);
        self
    }
}

/// Linear mapping of a numeric quantity onto 0-10, `best` scoring 10 and `worst` scoring 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBand {
    pub best: f64,
    pub worst: f64,
}

/// Where the emission factor for a carbon-source question comes from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EmissionSource {
    /// Constant factor in kg CO2eq per unit of the answered quantity.
    Fixed { factor: f64 },
    /// Factor read from the selected choice of another single-choice question.
    ByChoice { selector: String },
}

/// Location of a question within the taxonomy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QuestionPath {
    pub category: String,
    pub subcategory: String,
}

/// Leaf question of the taxonomy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Criterion {
    pub id: String,
    pub path: QuestionPath,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    pub answer_type: AnswerType,
    pub weight: f64,
    pub bounds: Bounds,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
    pub required: bool,
    pub polarity: Polarity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_band: Option<ScoreBand>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emission: Option<EmissionSource>,
    pub impact: ImpactLevel,
}

impl Criterion {
    pub fn new(id: &str, label: &str, answer_type: AnswerType) -> Self {
        let bounds = match &answer_type {
            AnswerType::Numeric { .. } => Bounds {
                min: Some(0.0),
                max: Some(NUMERIC_CEILING),
            },
            AnswerType::Percentage => Bounds {
                min: Some(0.0),
                max: Some(100.0),
            },
            AnswerType::Scale { min, max } => Bounds {
                min: Some(*min as f64),
                max: Some(*max as f64),
            },
            _ => Bounds::default(),
        };

        Self {
            id: id.to_string(),
            path: QuestionPath::default(),
            label: label.to_string(),
            help: None,
            answer_type,
            weight: 0.0,
            bounds,
            choices: Vec::new(),
            required: false,
            polarity: Polarity::HigherIsBetter,
            score_band: None,
            emission: None,
            impact: ImpactLevel::Medium,
        }
    }

    pub fn numeric(id: &str, label: &str, unit: &str) -> Self {
        Self::new(
            id,
            label,
            AnswerType::Numeric {
                unit: unit.to_string(),
            },
        )
    }

    pub fn percentage(id: &str, label: &str) -> Self {
        Self::new(id, label, AnswerType::Percentage)
    }

    pub fn scale(id: &str, label: &str, min: i64, max: i64) -> Self {
        Self::new(id, label, AnswerType::Scale { min, max })
    }

    pub fn scale_1_10(id: &str, label: &str) -> Self {
        Self::scale(id, label, 1, 10)
    }

    pub fn scale_1_5(id: &str, label: &str) -> Self {
        Self::scale(id, label, 1, 5)
    }

    pub fn single_choice(id: &str, label: &str, choices: Vec<Choice>) -> Self {
        let mut criterion = Self::new(id, label, AnswerType::SingleChoice);
        criterion.choices = choices;
        criterion
    }

    pub fn multi_choice(id: &str, label: &str, choices: Vec<Choice>) -> Self {
        let mut criterion = Self::new(id, label, AnswerType::MultiChoice);
        criterion.choices = choices;
        criterion
    }

    pub fn boolean(id: &str, label: &str) -> Self {
        Self::new(id, label, AnswerType::Boolean)
    }

    pub fn free_text(id: &str, label: &str, max_length: usize) -> Self {
        Self::new(id, label, AnswerType::FreeText { max_length })
    }

    pub fn weighted(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn lower_is_better(mut self) -> Self {
        self.polarity = Polarity::LowerIsBetter;
        self
    }

    pub fn bounded(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.bounds = Bounds { min, max };
        self
    }

    pub fn with_help(mut self, help: &str) -> Self {
        self.help = Some(help.to_string());
        self
    }

    pub fn banded(mut self, best: f64, worst: f64) -> Self {
        self.score_band = Some(ScoreBand { best, worst });
        self
    }

    pub fn emits(mut self, source: EmissionSource) -> Self {
        self.emission = Some(source);
        self
    }

    pub fn impact(mut self, impact: ImpactLevel) -> Self {
        self.impact = impact;
        self
    }

    pub fn choice(&self, value: &str) -> Option<&Choice> {
        self.choices.iter().find(|choice| choice.value == value)
    }

    /// Whether answers to this question can be normalized onto 0-10.
    pub fn is_scorable(&self) -> bool {
        match self.answer_type {
            AnswerType::FreeText { .. } => false,
            AnswerType::Numeric { .. } => self.score_band.is_some(),
            _ => true,
        }
    }
}
