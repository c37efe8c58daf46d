use super::common::*;
use serde_json::json;

use crate::evaluation::answers::{Answer, AnswerSet, Responses};
use crate::evaluation::catalog::{
    Category, CriteriaCatalog, Criterion, EmissionSource, MetricSources, Subcategory,
};
use crate::evaluation::scoring::{score, ScoringError};
use crate::evaluation::validation::ViolationKind;

#[test]
fn transport_distance_is_priced_by_selected_mode() {
    let catalog = transport_catalog();
    let responses: Responses = serde_json::from_value(json!({
        "carbon": { "transport": { "distance_km": 500, "mode": "car" } }
    }))
    .expect("responses parse");
    let answers = AnswerSet::from_responses(&catalog, &responses);

    let scores = score(&catalog, &answers).expect("valid answers score");
    approx(scores.carbon_footprint, 100.0);
    approx(scores.carbon_breakdown["distance_km"], 100.0);
}

#[test]
fn weighted_averages_follow_the_tree() {
    let scores = score(&compact_catalog(), &compact_answers()).expect("valid answers score");

    approx(scores.subcategory_scores["energy"], 7.0);
    approx(scores.subcategory_scores["materials"], 10.0);
    approx(scores.subcategory_scores["access"], 8.0);
    approx(scores.category_scores["environment"], 8.5);
    approx(scores.category_scores["social"], 8.0);
    approx(scores.overall_score, 0.6 * 8.5 + 0.4 * 8.0);
}

#[test]
fn empty_subcategory_does_not_dilute_its_category() {
    let scores = score(&compact_catalog(), &compact_answers()).expect("valid answers score");
    assert!(!scores.subcategory_scores.contains_key("future"));
    approx(scores.category_scores["environment"], (7.0 + 10.0) / 2.0);
}

#[test]
fn unanswered_optional_questions_fall_back_to_required_average() {
    let mut answers = compact_answers();
    answers.remove("monitoring");
    answers.remove("aids");

    let scores = score(&compact_catalog(), &answers).expect("valid answers score");
    approx(scores.subcategory_scores["energy"], 5.0);
    approx(scores.subcategory_scores["access"], 10.0);
    approx(scores.category_scores["environment"], (5.0 + 10.0) / 2.0);
}

#[test]
fn every_weighted_category_is_scored_from_its_answers() {
    let scores = score(&standard_catalog(), &complete_answers()).expect("valid answers score");
    let catalog = standard_catalog();
    for subcategory in catalog
        .categories()
        .iter()
        .flat_map(|category| category.subcategories.iter())
        .filter(|subcategory| subcategory.is_scorable())
    {
        assert!(
            scores.subcategory_scores.contains_key(&subcategory.id),
            "{} left out",
            subcategory.id
        );
    }
    approx(scores.category_scores["transversal"], 10.0);
}

#[test]
fn overflowing_quantities_are_refused_before_storage() {
    let catalog = CriteriaCatalog::builder()
        .category(
            Category::new("energy", "Energy", 1.0).subcategory(
                Subcategory::new("use", "Use", 1.0)
                    .question(
                        Criterion::numeric("lighting", "Lighting", "kWh")
                            .bounded(Some(0.0), Some(f64::MAX))
                            .emits(EmissionSource::Fixed { factor: 1.0 }),
                    )
                    .question(
                        Criterion::numeric("hvac", "HVAC", "kWh")
                            .bounded(Some(0.0), Some(f64::MAX))
                            .emits(EmissionSource::Fixed { factor: 1.0 }),
                    )
                    .question(
                        Criterion::boolean("metered", "Metered")
                            .weighted(1.0)
                            .required(),
                    ),
            ),
        )
        .metrics(MetricSources {
            energy_consumption: vec!["lighting".to_string(), "hvac".to_string()],
            ..MetricSources::default()
        })
        .build()
        .expect("catalog builds");
    let answers = AnswerSet::new()
        .with("lighting", Answer::Numeric(1e308))
        .with("hvac", Answer::Numeric(1e308))
        .with("metered", Answer::Boolean(true));

    let error = score(&catalog, &answers).expect_err("overflow refused");
    assert!(matches!(
        error,
        ScoringError::NonFinite { ref metric } if metric == "carbon_footprint"
    ));
}

#[test]
fn standard_quantities_are_capped() {
    let answers = complete_answers()
        .with("lighting_consumption", Answer::Numeric(1e308))
        .with("hvac_consumption", Answer::Numeric(1e308));
    let error = score(&standard_catalog(), &answers).expect_err("oversized answers refused");
    let ScoringError::IncompleteEvaluation(result) = error else {
        panic!("expected validation failure, got {error:?}");
    };
    assert!(result.has("lighting_consumption", ViolationKind::OutOfRange));
    assert!(result.has("hvac_consumption", ViolationKind::OutOfRange));
}

#[test]
fn invalid_answers_are_refused() {
    let answers = complete_answers().with("circularity", Answer::Scale(12));
    let error = score(&standard_catalog(), &answers).expect_err("invalid answers refused");
    let ScoringError::IncompleteEvaluation(result) = error else {
        panic!("expected validation failure, got {error:?}");
    };
    assert!(result.has("circularity", ViolationKind::OutOfRange));
}

#[test]
fn standard_answers_produce_derived_metrics() {
    let scores = score(&standard_catalog(), &complete_answers()).expect("valid answers score");

    let expected_carbon =
        1200.0 + 5000.0 * 0.000_132 + 12000.0 * 0.052 + 30000.0 * 0.052 + 500.0 * 0.8 + 800.0 * 0.1;
    assert!((scores.carbon_footprint - expected_carbon).abs() < 1e-6);
    approx(scores.energy_consumption_total, 42000.0);
    let per_visitor = scores
        .carbon_footprint_per_visitor
        .expect("visitor count answered");
    assert!((per_visitor - expected_carbon / 25000.0).abs() < 1e-9);

    approx(scores.recycled_material_rate, 45.0);
    approx(scores.renewable_energy_share, 60.0);
    approx(scores.local_sourcing_share, 55.0);
    approx(scores.eco_social_score, scores.category_scores["eco_social"]);
    assert!((0.0..=10.0).contains(&scores.overall_score));
}

#[test]
fn overall_score_stays_within_bounds_at_the_extremes() {
    let catalog = standard_catalog();
    let worst = complete_answers()
        .with("recycled_materials_pct", Answer::Percentage(0.0))
        .with("renewable_energy_pct", Answer::Percentage(0.0))
        .with("hazardous_waste", Answer::Boolean(true))
        .with("hazardous_waste_mass", Answer::Numeric(10.0))
        .with("circularity", Answer::Scale(1));
    let best = complete_answers()
        .with("recycled_materials_pct", Answer::Percentage(100.0))
        .with("circularity", Answer::Scale(10));

    for answers in [worst, best] {
        let scores = score(&catalog, &answers).expect("valid answers score");
        assert!((0.0..=10.0).contains(&scores.overall_score));
        for value in scores.category_scores.values() {
            assert!((0.0..=10.0).contains(value));
        }
    }
}

#[test]
fn scoring_is_bit_identical_across_runs() {
    let catalog = standard_catalog();
    let answers = complete_answers();
    let first = score(&catalog, &answers).expect("score");
    let second = score(&catalog, &answers).expect("score");

    assert_eq!(first, second);
    assert_eq!(first.overall_score.to_bits(), second.overall_score.to_bits());
    assert_eq!(
        serde_json::to_string(&first).expect("serialize"),
        serde_json::to_string(&second).expect("serialize")
    );
}

#[test]
fn changing_one_answer_only_moves_its_branch() {
    let catalog = standard_catalog();
    let before = score(&catalog, &complete_answers()).expect("score");
    let after = score(
        &catalog,
        &complete_answers().with("circularity", Answer::Scale(10)),
    )
    .expect("score");

    for (id, value) in &before.subcategory_scores {
        if id != "life_cycle" {
            assert_eq!(after.subcategory_scores[id], *value, "{id} moved");
        }
    }
    for (id, value) in &before.category_scores {
        if id != "indirect_environmental" {
            assert_eq!(after.category_scores[id], *value, "{id} moved");
        }
    }
    assert!(after.subcategory_scores["life_cycle"] > before.subcategory_scores["life_cycle"]);

    let category_delta =
        after.category_scores["indirect_environmental"] - before.category_scores["indirect_environmental"];
    let overall_delta = after.overall_score - before.overall_score;
    assert!((overall_delta - 0.15 * category_delta).abs() < 1e-9);
}

#[test]
fn risk_profiles_flag_high_criticality() {
    let catalog = standard_catalog();
    let calm = score(&catalog, &complete_answers()).expect("score");
    assert_eq!(calm.criticality.len(), 2);
    assert_eq!(calm.flagged_risks().count(), 0);

    let risky = complete_answers()
        .with("accident_frequency", Answer::Scale(5))
        .with("accident_severity", Answer::Scale(5))
        .with("safety_control_level", Answer::Scale(2));
    let scores = score(&catalog, &risky).expect("score");
    let flagged: Vec<_> = scores.flagged_risks().collect();
    assert_eq!(flagged.len(), 1);
    assert_eq!(flagged[0].subcategory, "health_safety");
    approx(flagged[0].criticality, 12.5);
}
