use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use super::super::answers::{Answer, AnswerSet};
use super::super::catalog::{
    Category, Choice, CoherenceRule, CriteriaCatalog, Criterion, EmissionSource, MetricSources,
    Subcategory,
};
use super::super::record::{
    EvaluationDocument, EvaluationId, EvaluationMetadata, ExhibitionType,
};
use super::super::repository::{EvaluationStore, EvaluationSummary, StoreError};
use super::super::service::EvaluationService;

pub(super) fn standard_catalog() -> CriteriaCatalog {
    CriteriaCatalog::standard().expect("standard catalog builds")
}

/// Two categories weighted 0.6 / 0.4; `future` carries weight but no questions.
pub(super) fn compact_catalog() -> CriteriaCatalog {
    CriteriaCatalog::builder()
        .category(
            Category::new("environment", "Environment", 0.6)
                .subcategory(
                    Subcategory::new("energy", "Energy", 0.4)
                        .question(
                            Criterion::percentage("renewable", "Renewable share")
                                .weighted(0.6)
                                .required(),
                        )
                        .question(Criterion::boolean("monitoring", "Monitoring").weighted(0.4))
                        .question(Criterion::numeric("consumption", "Consumption", "kWh")),
                )
                .subcategory(
                    Subcategory::new("materials", "Materials", 0.4)
                        .question(Criterion::scale_1_10("reuse", "Reuse").weighted(1.0).required()),
                )
                .subcategory(Subcategory::new("future", "Not yet assessed", 0.2)),
        )
        .category(
            Category::new("social", "Social", 0.4).subcategory(
                Subcategory::new("access", "Access", 1.0)
                    .question(
                        Criterion::single_choice(
                            "pricing",
                            "Pricing",
                            vec![
                                Choice::new("free", "Free", 10.0),
                                Choice::new("paid", "Paid", 2.0),
                            ],
                        )
                        .weighted(0.5)
                        .required(),
                    )
                    .question(
                        Criterion::multi_choice(
                            "aids",
                            "Aids",
                            vec![Choice::new("a", "A", 6.0), Choice::new("b", "B", 6.0)],
                        )
                        .weighted(0.5),
                    )
                    .question(Criterion::free_text("notes", "Notes", 20)),
            ),
        )
        .coherence(CoherenceRule::requires_non_zero(
            "renewable",
            &["consumption"],
            "a renewable share needs a consumption",
        ))
        .build()
        .expect("compact catalog builds")
}

pub(super) fn compact_answers() -> AnswerSet {
    AnswerSet::new()
        .with("renewable", Answer::Percentage(50.0))
        .with("monitoring", Answer::Boolean(true))
        .with("consumption", Answer::Numeric(1000.0))
        .with("reuse", Answer::Scale(10))
        .with("pricing", Answer::SingleChoice("free".to_string()))
        .with("aids", Answer::MultiChoice(vec!["a".to_string()]))
}

/// Single transport subcategory whose distance is priced by the selected mode.
pub(super) fn transport_catalog() -> CriteriaCatalog {
    CriteriaCatalog::builder()
        .category(
            Category::new("carbon", "Carbon", 1.0).subcategory(
                Subcategory::new("transport", "Transport", 1.0)
                    .question(
                        Criterion::numeric("distance_km", "Distance", "km")
                            .required()
                            .emits(EmissionSource::ByChoice {
                                selector: "mode".to_string(),
                            }),
                    )
                    .question(
                        Criterion::single_choice(
                            "mode",
                            "Mode",
                            vec![
                                Choice::new("car", "Car", 4.0).emitting(0.2),
                                Choice::new("train", "Train", 10.0).emitting(0.03),
                            ],
                        )
                        .weighted(1.0)
                        .required(),
                    ),
            ),
        )
        .metrics(MetricSources::default())
        .build()
        .expect("transport catalog builds")
}

pub(super) fn complete_answers() -> AnswerSet {
    AnswerSet::new()
        .with("materials_carbon_footprint", Answer::Numeric(1200.0))
        .with("materials_water_consumption", Answer::Numeric(5000.0))
        .with("recycled_materials_pct", Answer::Percentage(45.0))
        .with("material_toxicity", Answer::SingleChoice("low".to_string()))
        .with("post_exhibition_reuse", Answer::Scale(8))
        .with("lighting_consumption", Answer::Numeric(12000.0))
        .with("hvac_consumption", Answer::Numeric(30000.0))
        .with("renewable_energy_pct", Answer::Percentage(60.0))
        .with("led_lighting_pct", Answer::Percentage(80.0))
        .with("energy_monitoring", Answer::Boolean(true))
        .with("materials_transport_distance", Answer::Numeric(500.0))
        .with("transport_mode", Answer::SingleChoice("truck".to_string()))
        .with("construction_waste", Answer::Numeric(800.0))
        .with("waste_recycling_rate", Answer::Percentage(70.0))
        .with("hazardous_waste", Answer::Boolean(false))
        .with("pollution_incident_frequency", Answer::Scale(2))
        .with("pollution_severity", Answer::Scale(2))
        .with("pollution_control_level", Answer::Scale(4))
        .with("end_of_life", Answer::SingleChoice("mostly_recycled".to_string()))
        .with("circularity", Answer::Scale(7))
        .with("biodiversity_impact", Answer::Scale(2))
        .with("supplier_environmental_criteria", Answer::Boolean(true))
        .with("working_conditions", Answer::Scale(8))
        .with("human_rights_respect", Answer::Boolean(true))
        .with("reduced_mobility_access", Answer::SingleChoice("fully".to_string()))
        .with("admission_pricing", Answer::SingleChoice("social_rate".to_string()))
        .with(
            "sensory_accessibility",
            Answer::MultiChoice(vec!["audio_description".to_string(), "braille".to_string()]),
        )
        .with("local_sourcing_pct", Answer::Percentage(55.0))
        .with("pedagogical_dimension", Answer::Scale(9))
        .with("accident_frequency", Answer::Scale(1))
        .with("accident_severity", Answer::Scale(2))
        .with("safety_control_level", Answer::Scale(5))
        .with("exhibition_duration", Answer::Numeric(120.0))
        .with("visitor_count", Answer::Numeric(25000.0))
        .with("visitor_public_transport_pct", Answer::Percentage(40.0))
        .with("reversibility", Answer::Scale(8))
        .with("materials_traceability", Answer::Scale(7))
        .with("governance_notes", Answer::Text("Quarterly review".to_string()))
        .with("quantified_targets", Answer::Boolean(true))
        .with("replication_potential", Answer::Scale(10))
}

pub(super) fn metadata() -> EvaluationMetadata {
    EvaluationMetadata {
        name: "Climats en partage".to_string(),
        date: NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid date"),
        exhibition_type: ExhibitionType::TemporaryExhibition,
        venue: Some("Halle aux grains".to_string()),
    }
}

pub(super) fn service_with<S: EvaluationStore + 'static>(store: S) -> EvaluationService<S> {
    EvaluationService::new(Arc::new(standard_catalog()), Arc::new(store))
}

pub(super) fn approx(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    pub(super) documents: Arc<Mutex<HashMap<EvaluationId, EvaluationDocument>>>,
}

impl EvaluationStore for MemoryStore {
    fn insert(&self, document: EvaluationDocument) -> Result<(), StoreError> {
        let mut guard = self.documents.lock().expect("store mutex poisoned");
        if guard.contains_key(&document.evaluation_id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(document.evaluation_id, document);
        Ok(())
    }

    fn update(&self, document: EvaluationDocument) -> Result<(), StoreError> {
        let mut guard = self.documents.lock().expect("store mutex poisoned");
        match guard.get_mut(&document.evaluation_id) {
            Some(existing) => {
                *existing = document;
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    fn load(&self, id: &EvaluationId) -> Result<EvaluationDocument, StoreError> {
        let guard = self.documents.lock().expect("store mutex poisoned");
        guard.get(id).cloned().ok_or(StoreError::NotFound)
    }

    fn delete(&self, id: &EvaluationId) -> Result<(), StoreError> {
        let mut guard = self.documents.lock().expect("store mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(StoreError::NotFound)
    }

    fn list(&self) -> Result<Vec<EvaluationSummary>, StoreError> {
        let guard = self.documents.lock().expect("store mutex poisoned");
        Ok(guard.values().map(EvaluationSummary::from).collect())
    }
}

impl MemoryStore {
    pub(super) fn len(&self) -> usize {
        self.documents.lock().expect("store mutex poisoned").len()
    }
}

pub(super) struct ConflictStore;

impl EvaluationStore for ConflictStore {
    fn insert(&self, _document: EvaluationDocument) -> Result<(), StoreError> {
        Err(StoreError::Conflict)
    }

    fn update(&self, _document: EvaluationDocument) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("read only".to_string()))
    }

    fn load(&self, _id: &EvaluationId) -> Result<EvaluationDocument, StoreError> {
        Err(StoreError::NotFound)
    }

    fn delete(&self, _id: &EvaluationId) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("read only".to_string()))
    }

    fn list(&self) -> Result<Vec<EvaluationSummary>, StoreError> {
        Ok(Vec::new())
    }
}

/// Serves reads from the wrapped store and refuses every write.
pub(super) struct ReadOnlyStore(pub(super) MemoryStore);

impl EvaluationStore for ReadOnlyStore {
    fn insert(&self, _document: EvaluationDocument) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("read only".to_string()))
    }

    fn update(&self, _document: EvaluationDocument) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("read only".to_string()))
    }

    fn load(&self, id: &EvaluationId) -> Result<EvaluationDocument, StoreError> {
        self.0.load(id)
    }

    fn delete(&self, _id: &EvaluationId) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("read only".to_string()))
    }

    fn list(&self) -> Result<Vec<EvaluationSummary>, StoreError> {
        self.0.list()
    }
}

pub(super) struct UnavailableStore;

impl EvaluationStore for UnavailableStore {
    fn insert(&self, _document: EvaluationDocument) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk offline".to_string()))
    }

    fn update(&self, _document: EvaluationDocument) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk offline".to_string()))
    }

    fn load(&self, _id: &EvaluationId) -> Result<EvaluationDocument, StoreError> {
        Err(StoreError::Unavailable("disk offline".to_string()))
    }

    fn delete(&self, _id: &EvaluationId) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk offline".to_string()))
    }

    fn list(&self) -> Result<Vec<EvaluationSummary>, StoreError> {
        Err(StoreError::Unavailable("disk offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
