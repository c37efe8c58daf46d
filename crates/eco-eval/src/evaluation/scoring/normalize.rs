use std::collections::BTreeSet;

use super::super::answers::Answer;
use super::super::catalog::{AnswerType, Criterion, Polarity};

pub(crate) const MAX_SCORE: f64 = 10.0;

/// Map an answer onto 0-10, or `None` when the question is not scored.
///
/// Polarity applies to scales, percentages, and booleans. Choice tables and score bands
/// already encode their own direction.
pub(crate) fn normalized_score(criterion: &Criterion, answer: &Answer) -> Option<f64> {
    let (raw, apply_polarity) = match (answer, &criterion.answer_type) {
        (Answer::Percentage(value), AnswerType::Percentage) => (value / 10.0, true),
        (Answer::Scale(value), AnswerType::Scale { min, max }) => {
            let span = (max - min) as f64;
            (((value - min) as f64 / span) * MAX_SCORE, true)
        }
        (Answer::Boolean(flag), AnswerType::Boolean) => {
            (if *flag { MAX_SCORE } else { 0.0 }, true)
        }
        (Answer::SingleChoice(value), AnswerType::SingleChoice) => {
            (criterion.choice(value)?.score, false)
        }
        (Answer::MultiChoice(values), AnswerType::MultiChoice) => {
            let selected: BTreeSet<&str> = values.iter().map(String::as_str).collect();
            let total: f64 = selected
                .into_iter()
                .filter_map(|value| criterion.choice(value))
                .map(|choice| choice.score)
                .sum();
            (total.min(MAX_SCORE), false)
        }
        (Answer::Numeric(value), AnswerType::Numeric { .. }) => {
            let band = criterion.score_band?;
            let position = (value - band.worst) / (band.best - band.worst);
            (position.clamp(0.0, 1.0) * MAX_SCORE, false)
        }
        _ => return None,
    };

    let score = match criterion.polarity {
        Polarity::LowerIsBetter if apply_polarity => MAX_SCORE - raw,
        _ => raw,
    };

    Some(score.clamp(0.0, MAX_SCORE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::catalog::Choice;

    #[test]
    fn scales_map_linearly_from_their_minimum() {
        let criterion = Criterion::scale_1_5("control", "Control");
        assert_eq!(normalized_score(&criterion, &Answer::Scale(1)), Some(0.0));
        assert_eq!(normalized_score(&criterion, &Answer::Scale(3)), Some(5.0));
        assert_eq!(normalized_score(&criterion, &Answer::Scale(5)), Some(10.0));
    }

    #[test]
    fn lower_is_better_inverts_booleans_and_scales() {
        let hazardous = Criterion::boolean("hazardous", "Hazardous").lower_is_better();
        assert_eq!(normalized_score(&hazardous, &Answer::Boolean(true)), Some(0.0));
        assert_eq!(normalized_score(&hazardous, &Answer::Boolean(false)), Some(10.0));

        let frequency = Criterion::scale_1_5("frequency", "Frequency").lower_is_better();
        assert_eq!(normalized_score(&frequency, &Answer::Scale(2)), Some(7.5));
    }

    #[test]
    fn multi_choice_sums_distinct_selections_capped_at_ten() {
        let criterion = Criterion::multi_choice(
            "aids",
            "Aids",
            vec![
                Choice::new("a", "A", 4.0),
                Choice::new("b", "B", 4.0),
                Choice::new("c", "C", 4.0),
            ],
        );
        let twice_a = Answer::MultiChoice(vec!["a".to_string(), "a".to_string()]);
        assert_eq!(normalized_score(&criterion, &twice_a), Some(4.0));

        let all = Answer::MultiChoice(vec!["a".into(), "b".into(), "c".into()]);
        assert_eq!(normalized_score(&criterion, &all), Some(10.0));
    }

    #[test]
    fn numeric_needs_a_score_band() {
        let unbanded = Criterion::numeric("waste", "Waste", "kg");
        assert_eq!(normalized_score(&unbanded, &Answer::Numeric(50.0)), None);

        let banded = unbanded.banded(0.0, 200.0);
        assert_eq!(normalized_score(&banded, &Answer::Numeric(50.0)), Some(7.5));
        assert_eq!(normalized_score(&banded, &Answer::Numeric(500.0)), Some(0.0));
    }
}
