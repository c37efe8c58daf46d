use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use super::catalog::{AnswerType, CriteriaCatalog};

/// Nested `category -> subcategory -> question -> value` mapping exchanged with callers.
pub type Responses = BTreeMap<String, BTreeMap<String, BTreeMap<String, Value>>>;

/// Typed answer, one variant per declared [`AnswerType`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Answer {
    Numeric(f64),
    Percentage(f64),
    Scale(i64),
    SingleChoice(String),
    MultiChoice(Vec<String>),
    Boolean(bool),
    Text(String),
}

impl Answer {
    /// Decode a raw JSON value according to the declared answer type.
    ///
    /// Numeric strings and the usual yes/no spellings are accepted so answer sheets typed by
    /// hand decode the same way as form submissions.
    pub fn decode(answer_type: &AnswerType, raw: &Value) -> Option<Self> {
        match raw {
            Value::String(text) => Self::parse_text(answer_type, text),
            Value::Number(number) => {
                let value = number.as_f64()?;
                match answer_type {
                    AnswerType::Numeric { .. } => Some(Answer::Numeric(value)),
                    AnswerType::Percentage => Some(Answer::Percentage(value)),
                    AnswerType::Scale { .. } => whole_number(value).map(Answer::Scale),
                    _ => None,
                }
            }
            Value::Bool(flag) => match answer_type {
                AnswerType::Boolean => Some(Answer::Boolean(*flag)),
                _ => None,
            },
            Value::Array(items) => match answer_type {
                AnswerType::MultiChoice => items
                    .iter()
                    .map(|item| item.as_str().map(str::to_string))
                    .collect::<Option<Vec<_>>>()
                    .map(Answer::MultiChoice),
                _ => None,
            },
            Value::Null | Value::Object(_) => None,
        }
    }

    /// Parse a textual answer, as found in CSV sheets or string-typed form fields.
    pub fn parse_text(answer_type: &AnswerType, raw: &str) -> Option<Self> {
        let text = raw.trim();
        match answer_type {
            AnswerType::Numeric { .. } => text.parse::<f64>().ok().map(Answer::Numeric),
            AnswerType::Percentage => text
                .trim_end_matches('%')
                .trim()
                .parse::<f64>()
                .ok()
                .map(Answer::Percentage),
            AnswerType::Scale { .. } => text
                .parse::<i64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().and_then(whole_number))
                .map(Answer::Scale),
            AnswerType::Boolean => parse_flag(text).map(Answer::Boolean),
            AnswerType::SingleChoice => Some(Answer::SingleChoice(text.to_string())),
            AnswerType::MultiChoice => Some(Answer::MultiChoice(
                text.split(';')
                    .map(str::trim)
                    .filter(|value| !value.is_empty())
                    .map(str::to_string)
                    .collect(),
            )),
            AnswerType::FreeText { .. } => Some(Answer::Text(raw.to_string())),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Answer::Numeric(_) => "numeric",
            Answer::Percentage(_) => "percentage",
            Answer::Scale(_) => "scale",
            Answer::SingleChoice(_) => "single_choice",
            Answer::MultiChoice(_) => "multi_choice",
            Answer::Boolean(_) => "boolean",
            Answer::Text(_) => "free_text",
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Answer::Numeric(value) | Answer::Percentage(value) => Some(*value),
            Answer::Scale(value) => Some(*value as f64),
            _ => None,
        }
    }

    /// Whether the answer carries something other than zero, `false`, or an empty value.
    pub fn is_non_zero(&self) -> bool {
        match self {
            Answer::Numeric(value) | Answer::Percentage(value) => *value != 0.0,
            Answer::Scale(value) => *value != 0,
            Answer::Boolean(flag) => *flag,
            Answer::SingleChoice(value) | Answer::Text(value) => !value.trim().is_empty(),
            Answer::MultiChoice(values) => !values.is_empty(),
        }
    }

    pub fn matches(&self, answer_type: &AnswerType) -> bool {
        matches!(
            (self, answer_type),
            (Answer::Numeric(_), AnswerType::Numeric { .. })
                | (Answer::Percentage(_), AnswerType::Percentage)
                | (Answer::Scale(_), AnswerType::Scale { .. })
                | (Answer::SingleChoice(_), AnswerType::SingleChoice)
                | (Answer::MultiChoice(_), AnswerType::MultiChoice)
                | (Answer::Boolean(_), AnswerType::Boolean)
                | (Answer::Text(_), AnswerType::FreeText { .. })
        )
    }

    fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

fn whole_number(value: f64) -> Option<i64> {
    (value.is_finite() && value.fract() == 0.0).then_some(value as i64)
}

pub(crate) fn parse_flag(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "yes" | "true" | "oui" | "1" => Some(true),
        "no" | "false" | "non" | "0" => Some(false),
        _ => None,
    }
}

/// Answers keyed by question id, plus raw values that did not decode to their declared type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnswerSet {
    answers: BTreeMap<String, Answer>,
    rejected: BTreeMap<String, Value>,
}

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, question_id: &str, answer: Answer) -> Self {
        self.insert(question_id, answer);
        self
    }

    pub fn insert(&mut self, question_id: &str, answer: Answer) -> Option<Answer> {
        self.rejected.remove(question_id);
        self.answers.insert(question_id.to_string(), answer)
    }

    /// Record a value that could not be decoded so validation can report it.
    pub fn reject(&mut self, question_id: &str, raw: Value) {
        self.answers.remove(question_id);
        self.rejected.insert(question_id.to_string(), raw);
    }

    pub fn remove(&mut self, question_id: &str) {
        self.answers.remove(question_id);
        self.rejected.remove(question_id);
    }

    pub fn get(&self, question_id: &str) -> Option<&Answer> {
        self.answers.get(question_id)
    }

    pub fn number(&self, question_id: &str) -> Option<f64> {
        self.get(question_id).and_then(Answer::as_number)
    }

    pub fn rejected(&self, question_id: &str) -> Option<&Value> {
        self.rejected.get(question_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Answer)> + '_ {
        self.answers.iter().map(|(id, answer)| (id.as_str(), answer))
    }

    pub fn rejected_iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.rejected.iter().map(|(id, raw)| (id.as_str(), raw))
    }

    /// Every question id carrying a value, decoded or not.
    pub fn submitted_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.answers.keys().chain(self.rejected.keys()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.answers.len() + self.rejected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty() && self.rejected.is_empty()
    }

    /// Flatten nested responses by question id, decoding each value per the catalog.
    pub fn from_responses(catalog: &CriteriaCatalog, responses: &Responses) -> Self {
        let mut set = Self::new();
        set.apply_responses(catalog, responses);
        set
    }

    /// Apply a batch of changes; `null` clears an answer.
    ///
    /// The category and subcategory keys are informational only. Unknown question ids are
    /// kept as rejected values.
    pub fn apply_responses(&mut self, catalog: &CriteriaCatalog, responses: &Responses) {
        for questions in responses.values().flat_map(BTreeMap::values) {
            for (question_id, raw) in questions {
                if raw.is_null() {
                    self.remove(question_id);
                    continue;
                }

                let decoded = catalog
                    .get(question_id)
                    .ok()
                    .and_then(|criterion| Answer::decode(&criterion.answer_type, raw));

                match decoded {
                    Some(answer) => {
                        self.insert(question_id, answer);
                    }
                    None => self.reject(question_id, raw.clone()),
                }
            }
        }
    }

    /// Re-nest answers under their catalog path. Values for unknown questions are dropped.
    pub fn to_responses(&self, catalog: &CriteriaCatalog) -> Responses {
        let mut responses = Responses::new();
        let decoded = self.answers.iter().map(|(id, answer)| (id, answer.to_value()));
        let raw = self.rejected.iter().map(|(id, raw)| (id, raw.clone()));

        for (question_id, value) in decoded.chain(raw) {
            if let Ok(criterion) = catalog.get(question_id) {
                responses
                    .entry(criterion.path.category.clone())
                    .or_default()
                    .entry(criterion.path.subcategory.clone())
                    .or_default()
                    .insert(question_id.clone(), value);
            }
        }

        responses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scale() -> AnswerType {
        AnswerType::Scale { min: 1, max: 10 }
    }

    #[test]
    fn decode_follows_declared_type() {
        assert_eq!(Answer::decode(&scale(), &json!(7)), Some(Answer::Scale(7)));
        assert_eq!(Answer::decode(&scale(), &json!(7.5)), None);
        assert_eq!(
            Answer::decode(&AnswerType::Percentage, &json!("42 %")),
            Some(Answer::Percentage(42.0))
        );
        assert_eq!(Answer::decode(&AnswerType::Boolean, &json!(1)), None);
        assert_eq!(
            Answer::decode(&AnswerType::Boolean, &json!("oui")),
            Some(Answer::Boolean(true))
        );
        assert_eq!(
            Answer::decode(&AnswerType::MultiChoice, &json!(["braille", "easy_read"])),
            Some(Answer::MultiChoice(vec![
                "braille".to_string(),
                "easy_read".to_string()
            ]))
        );
        assert_eq!(Answer::decode(&AnswerType::MultiChoice, &json!([1, 2])), None);
    }

    #[test]
    fn numeric_text_that_does_not_parse_is_rejected() {
        let numeric = AnswerType::Numeric {
            unit: "kWh".to_string(),
        };
        assert_eq!(Answer::parse_text(&numeric, "about ten"), None);
        assert_eq!(Answer::parse_text(&numeric, " 12.5 "), Some(Answer::Numeric(12.5)));
    }

    #[test]
    fn serializes_as_plain_values() {
        let value = serde_json::to_value(Answer::MultiChoice(vec!["signage".to_string()]))
            .expect("serialize answer");
        assert_eq!(value, json!(["signage"]));
        assert_eq!(
            serde_json::to_value(Answer::Scale(4)).expect("serialize"),
            json!(4)
        );
    }

    #[test]
    fn insert_clears_rejected_value() {
        let mut set = AnswerSet::new();
        set.reject("circularity", json!("high"));
        assert!(set.rejected("circularity").is_some());
        set.insert("circularity", Answer::Scale(8));
        assert!(set.rejected("circularity").is_none());
        assert_eq!(set.len(), 1);
    }
}
