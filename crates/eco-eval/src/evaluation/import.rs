use std::collections::BTreeSet;
use std::io::Read;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::answers::{Answer, AnswerSet};
use super::catalog::CriteriaCatalog;

/// Reads `question_id,value` answer sheets into an [`AnswerSet`].
///
/// Extra columns such as `category` are ignored. Values that do not parse for their
/// question are kept as rejected so validation reports them.
pub struct AnswerSheetImporter<'a> {
    catalog: &'a CriteriaCatalog,
}

impl<'a> AnswerSheetImporter<'a> {
    pub fn new(catalog: &'a CriteriaCatalog) -> Self {
        Self { catalog }
    }

    pub fn from_reader<R: Read>(&self, reader: R) -> Result<AnswerSet, AnswerImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut answers = AnswerSet::new();
        let mut seen = BTreeSet::new();

        for row in csv_reader.deserialize::<AnswerRow>() {
            let row = row?;
            if !seen.insert(row.question_id.clone()) {
                return Err(AnswerImportError::DuplicateQuestion(row.question_id));
            }
            let Some(raw) = row.value else {
                continue;
            };

            let parsed = self
                .catalog
                .get(&row.question_id)
                .ok()
                .and_then(|criterion| Answer::parse_text(&criterion.answer_type, &raw));
            match parsed {
                Some(answer) => {
                    answers.insert(&row.question_id, answer);
                }
                None => answers.reject(&row.question_id, Value::String(raw)),
            }
        }

        Ok(answers)
    }
}

#[derive(Debug, Deserialize)]
struct AnswerRow {
    question_id: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    value: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[derive(Debug, thiserror::Error)]
pub enum AnswerImportError {
    #[error("failed to read answer sheet: {0}")]
    Csv(#[from] csv::Error),
    #[error("question '{0}' appears more than once in the answer sheet")]
    DuplicateQuestion(String),
}
