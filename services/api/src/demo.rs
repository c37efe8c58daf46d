use crate::infra::{parse_date, InMemoryEvaluationStore, JsonFileEvaluationStore};
use chrono::{Local, NaiveDate};
use clap::Args;
use eco_eval::config::AppConfig;
use eco_eval::error::AppError;
use eco_eval::evaluation::{
    Answer, AnswerSet, AnswerSheetImporter, Completion, CriteriaCatalog, EvaluationId,
    EvaluationMetadata, EvaluationService, EvaluationServiceError, EvaluationStore,
    ExhibitionType, Responses, ScoreSet, ScoringEngine, ScoringError, ValidationResult,
};
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// Answer file: a JSON responses object or a `question_id,value` CSV sheet
    pub(crate) answers: PathBuf,
    /// Exhibition name recorded in the evaluation metadata
    #[arg(long, default_value = "Unnamed exhibition")]
    pub(crate) name: String,
    /// Evaluation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) date: Option<NaiveDate>,
    /// Exhibition type, e.g. temporary_exhibition or small-museum
    #[arg(long = "type", default_value = "temporary_exhibition")]
    pub(crate) exhibition_type: String,
    /// Venue recorded in the evaluation metadata
    #[arg(long)]
    pub(crate) venue: Option<String>,
    /// Store the scored evaluation in the configured data directory
    #[arg(long)]
    pub(crate) save: bool,
}

/// Accepts either a bare responses tree or a document carrying one.
#[derive(Deserialize)]
#[serde(untagged)]
enum AnswerFile {
    Document { responses: Responses },
    Bare(Responses),
}

pub(crate) fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let EvaluateArgs {
        answers,
        name,
        date,
        exhibition_type,
        venue,
        save,
    } = args;

    let exhibition_type = ExhibitionType::parse(&exhibition_type).ok_or_else(|| {
        AppError::InvalidInput(format!("unknown exhibition type '{exhibition_type}'"))
    })?;
    let metadata = EvaluationMetadata {
        name,
        date: date.unwrap_or_else(|| Local::now().date_naive()),
        exhibition_type,
        venue,
    };
    metadata.validate().map_err(EvaluationServiceError::from)?;

    let catalog = Arc::new(CriteriaCatalog::standard()?);
    let answer_set = load_answers(&catalog, &answers)?;
    render_completion(&Completion::measure(&catalog, &answer_set));

    if save {
        let config = AppConfig::load()?;
        let store = JsonFileEvaluationStore::open(&config.storage.data_dir)
            .map_err(EvaluationServiceError::from)?;
        let (id, scores) = submit(catalog, store, metadata, answer_set)?;
        println!(
            "Saved evaluation {id} to {}",
            config.storage.data_dir.display()
        );
        render_scores(&scores);
        return Ok(());
    }

    println!(
        "{} ({}, {})",
        metadata.name,
        metadata.exhibition_type.label(),
        metadata.date
    );
    match ScoringEngine::new(&catalog).score(&answer_set) {
        Ok(scores) => {
            render_scores(&scores);
            Ok(())
        }
        Err(ScoringError::IncompleteEvaluation(result)) => {
            render_violations(&result);
            Err(EvaluationServiceError::Validation(result).into())
        }
        Err(error) => Err(EvaluationServiceError::from(error).into()),
    }
}

pub(crate) fn run_catalog() -> Result<(), AppError> {
    let catalog = CriteriaCatalog::standard()?;
    println!("Criteria catalog ({} questions)", catalog.len());

    for category in catalog.categories() {
        println!(
            "\n{} [{}] weight {:.0}%",
            category.label,
            category.id,
            category.weight * 100.0
        );
        for subcategory in &category.subcategories {
            let effective = catalog
                .effective_subcategory_weight(&subcategory.id)
                .unwrap_or_default();
            println!(
                "  {} [{}] weight {:.0}% (effective {:.1}%)",
                subcategory.label,
                subcategory.id,
                subcategory.weight * 100.0,
                effective * 100.0
            );
            for question in &subcategory.questions {
                let marker = if question.required { "*" } else { " " };
                println!(
                    "   {marker} {:<36} {:<13} weight {:.2}",
                    question.id,
                    question.answer_type.label(),
                    question.weight
                );
            }
        }
    }
    println!("\n* required");
    Ok(())
}

pub(crate) fn run_demo() -> Result<(), AppError> {
    let catalog = Arc::new(CriteriaCatalog::standard()?);
    let metadata = EvaluationMetadata {
        name: "Rivages fragiles".to_string(),
        date: Local::now().date_naive(),
        exhibition_type: ExhibitionType::TemporaryExhibition,
        venue: Some("Musee des Confluences".to_string()),
    };

    println!("Eco-evaluation demo");
    println!(
        "- {} | {} | {}",
        metadata.name,
        metadata.exhibition_type.label(),
        metadata.date
    );

    let (id, scores) = submit(
        catalog,
        InMemoryEvaluationStore::default(),
        metadata,
        sample_answers(),
    )?;
    println!("- stored as {id}");
    render_scores(&scores);
    Ok(())
}

fn submit<S>(
    catalog: Arc<CriteriaCatalog>,
    store: S,
    metadata: EvaluationMetadata,
    answers: AnswerSet,
) -> Result<(EvaluationId, ScoreSet), AppError>
where
    S: EvaluationStore + 'static,
{
    let service = EvaluationService::new(catalog, Arc::new(store));
    match service.create(metadata, answers) {
        Ok(record) => {
            let scores = record.scores().cloned().ok_or_else(|| {
                AppError::InvalidInput("stored evaluation carries no scores".to_string())
            })?;
            Ok((record.id(), scores))
        }
        Err(EvaluationServiceError::Validation(result)) => {
            render_violations(&result);
            Err(EvaluationServiceError::Validation(result).into())
        }
        Err(other) => Err(other.into()),
    }
}

fn load_answers(catalog: &CriteriaCatalog, path: &Path) -> Result<AnswerSet, AppError> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    let file = File::open(path)?;
    if is_csv {
        return Ok(AnswerSheetImporter::new(catalog).from_reader(file)?);
    }

    let responses = match serde_json::from_reader(file)? {
        AnswerFile::Document { responses } | AnswerFile::Bare(responses) => responses,
    };
    Ok(AnswerSet::from_responses(catalog, &responses))
}

fn render_scores(scores: &ScoreSet) {
    println!("\nOverall score: {:.2} / 10", scores.overall_score);
    println!("Category scores:");
    for (category, value) in &scores.category_scores {
        println!("  - {category}: {value:.2}");
    }

    println!("Indicators:");
    println!("  - carbon footprint: {:.1} kg CO2e", scores.carbon_footprint);
    if let Some(per_visitor) = scores.carbon_footprint_per_visitor {
        println!("  - per visitor: {per_visitor:.3} kg CO2e");
    }
    println!("  - energy consumption: {:.0} kWh", scores.energy_consumption_total);
    println!("  - recycled materials: {:.0}%", scores.recycled_material_rate);
    println!("  - renewable energy: {:.0}%", scores.renewable_energy_share);
    println!("  - local sourcing: {:.0}%", scores.local_sourcing_share);
    println!("  - eco-social score: {:.2}", scores.eco_social_score);

    let flagged: Vec<_> = scores.flagged_risks().collect();
    if flagged.is_empty() {
        println!("No risk above its criticality threshold.");
    } else {
        println!("Risks above threshold:");
        for risk in flagged {
            println!(
                "  - {}: criticality {:.1} (threshold {:.1})",
                risk.subcategory, risk.criticality, risk.threshold
            );
        }
    }
}

fn render_completion(completion: &Completion) {
    println!("Questionnaire completion: {:.0}%", completion.overall);
    for (category, share) in &completion.categories {
        println!("  - {category}: {share:.0}%");
    }
}

fn render_violations(result: &ValidationResult) {
    println!("Evaluation is incomplete:");
    for violation in result.violations() {
        println!("  - {}: {}", violation.question_id, violation.detail);
    }
}

fn sample_answers() -> AnswerSet {
    let choice = |value: &str| Answer::SingleChoice(value.to_string());
    AnswerSet::new()
        .with("materials_carbon_footprint", Answer::Numeric(950.0))
        .with("materials_water_consumption", Answer::Numeric(3200.0))
        .with("recycled_materials_pct", Answer::Percentage(62.0))
        .with("material_toxicity", choice("low"))
        .with("post_exhibition_reuse", Answer::Scale(9))
        .with("lighting_consumption", Answer::Numeric(8400.0))
        .with("hvac_consumption", Answer::Numeric(21000.0))
        .with("renewable_energy_pct", Answer::Percentage(75.0))
        .with("led_lighting_pct", Answer::Percentage(95.0))
        .with("energy_monitoring", Answer::Boolean(true))
        .with("materials_transport_distance", Answer::Numeric(320.0))
        .with("transport_mode", choice("train"))
        .with("construction_waste", Answer::Numeric(450.0))
        .with("waste_recycling_rate", Answer::Percentage(80.0))
        .with("hazardous_waste", Answer::Boolean(false))
        .with("end_of_life", choice("mostly_recycled"))
        .with("circularity", Answer::Scale(8))
        .with("biodiversity_impact", Answer::Scale(2))
        .with("supplier_environmental_criteria", Answer::Boolean(true))
        .with("working_conditions", Answer::Scale(8))
        .with("human_rights_respect", Answer::Boolean(true))
        .with("reduced_mobility_access", choice("fully"))
        .with("admission_pricing", choice("social_rate"))
        .with(
            "sensory_accessibility",
            Answer::MultiChoice(vec!["audio_description".to_string(), "braille".to_string()]),
        )
        .with("local_sourcing_pct", Answer::Percentage(58.0))
        .with("pedagogical_dimension", Answer::Scale(9))
        .with("accident_frequency", Answer::Scale(1))
        .with("accident_severity", Answer::Scale(2))
        .with("safety_control_level", Answer::Scale(4))
        .with("exhibition_duration", Answer::Numeric(150.0))
        .with("visitor_count", Answer::Numeric(42000.0))
        .with("visitor_public_transport_pct", Answer::Percentage(55.0))
        .with("reversibility", Answer::Scale(9))
        .with("materials_traceability", Answer::Scale(8))
        .with("quantified_targets", Answer::Boolean(true))
        .with("replication_potential", Answer::Scale(7))
}
