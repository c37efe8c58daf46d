//! Questionnaire progress: answered share per subcategory, category, and evaluation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::answers::AnswerSet;
use super::catalog::{Category, CriteriaCatalog, Subcategory};

/// Completion percentages on a 0-100 scale.
///
/// A subcategory counts its answered questions over all of its questions. Categories average
/// their subcategories and the overall figure averages the categories, all unweighted.
/// Subcategories without questions are left out.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Completion {
    pub overall: f64,
    pub categories: BTreeMap<String, f64>,
    pub subcategories: BTreeMap<String, f64>,
}

impl Completion {
    pub fn measure(catalog: &CriteriaCatalog, answers: &AnswerSet) -> Self {
        let mut completion = Completion::default();

        for category in catalog.categories() {
            if let Some(share) = completion.category_share(category, answers) {
                completion.categories.insert(category.id.clone(), share);
            }
        }
        completion.overall = mean(completion.categories.values().copied()).unwrap_or(0.0);
        completion
    }

    pub fn is_complete(&self) -> bool {
        self.overall >= 100.0
    }

    fn category_share(&mut self, category: &Category, answers: &AnswerSet) -> Option<f64> {
        let mut shares = Vec::with_capacity(category.subcategories.len());
        for subcategory in &category.subcategories {
            if let Some(share) = subcategory_share(subcategory, answers) {
                self.subcategories.insert(subcategory.id.clone(), share);
                shares.push(share);
            }
        }
        mean(shares.into_iter())
    }
}

/// `None` for a subcategory without questions, which has nothing to answer.
fn subcategory_share(subcategory: &Subcategory, answers: &AnswerSet) -> Option<f64> {
    if subcategory.questions.is_empty() {
        return None;
    }
    let answered = subcategory
        .questions
        .iter()
        .filter(|question| answers.get(&question.id).is_some())
        .count();
    Some(answered as f64 * 100.0 / subcategory.questions.len() as f64)
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    (count > 0).then(|| sum / count as f64)
}
