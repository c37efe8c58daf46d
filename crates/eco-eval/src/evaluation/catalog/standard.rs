use super::factors;
use super::{
    CatalogError, Category, Choice, CoherenceRule, CriteriaCatalog, Criterion, EmissionSource,
    ImpactLevel, MetricSources, RiskProfile, Subcategory,
};

const FREE_TEXT_LIMIT: usize = 1000;
const RISK_THRESHOLD: f64 = 8.0;
const MAX_DURATION_DAYS: f64 = 3650.0;
const MAX_VISITORS: f64 = 1.0e8;
const MAX_SURFACE_M2: f64 = 1.0e6;

pub(super) fn build() -> Result<CriteriaCatalog, CatalogError> {
    let builder = CriteriaCatalog::builder()
        .category(direct_environmental())
        .category(indirect_environmental())
        .category(eco_social())
        .category(temporal_contextual())
        .category(transversal())
        .metrics(MetricSources {
            recycled_material_rate: Some("recycled_materials_pct".to_string()),
            renewable_energy_share: Some("renewable_energy_pct".to_string()),
            local_sourcing_share: Some("local_sourcing_pct".to_string()),
            eco_social_category: Some("eco_social".to_string()),
            energy_consumption: vec![
                "lighting_consumption".to_string(),
                "hvac_consumption".to_string(),
                "audiovisual_consumption".to_string(),
            ],
            visitor_count: Some("visitor_count".to_string()),
        });

    coherence_rules()
        .into_iter()
        .fold(builder, |builder, rule| builder.coherence(rule))
        .build()
}

fn coherence_rules() -> Vec<CoherenceRule> {
    vec![
        CoherenceRule::requires_non_zero(
            "renewable_energy_pct",
            &[
                "lighting_consumption",
                "hvac_consumption",
                "audiovisual_consumption",
            ],
            "a renewable share needs a non-zero energy consumption",
        ),
        CoherenceRule::requires_non_zero(
            "led_lighting_pct",
            &["lighting_consumption"],
            "an LED share needs a non-zero lighting consumption",
        ),
        CoherenceRule::requires_non_zero(
            "waste_recycling_rate",
            &["construction_waste"],
            "a recycling rate needs a non-zero waste quantity",
        ),
        CoherenceRule::requires_non_zero(
            "hazardous_waste",
            &["hazardous_waste_mass"],
            "declared hazardous waste needs a non-zero mass",
        ),
        CoherenceRule::not_greater_than(
            "hazardous_waste_mass",
            "construction_waste",
            "hazardous waste cannot exceed the total waste mass",
        ),
        CoherenceRule::requires_answer(
            "artwork_shipping_distance",
            &["artwork_transport_mode"],
            "an artwork shipping distance needs its transport mode",
        ),
        CoherenceRule::requires_non_zero(
            "visitor_public_transport_pct",
            &["visitor_count"],
            "a visitor modal share needs a non-zero visitor count",
        ),
    ]
}

fn transport_modes() -> Vec<Choice> {
    vec![
        Choice::new("train", "Rail freight", 10.0).emitting(factors::TRAIN_PER_KM),
        Choice::new("truck", "Road haulage", 3.0).emitting(factors::TRUCK_PER_KM),
        Choice::new("car", "Car or van", 4.0).emitting(factors::CAR_PER_KM),
        Choice::new("boat", "Sea or river freight", 7.0).emitting(factors::BOAT_PER_KM),
        Choice::new("plane", "Air freight", 0.0).emitting(factors::PLANE_PER_KM),
        Choice::new("multimodal", "Combined modes", 7.0).emitting(factors::MULTIMODAL_PER_KM),
    ]
}

fn electricity() -> EmissionSource {
    EmissionSource::Fixed {
        factor: factors::ELECTRICITY_PER_KWH,
    }
}

fn direct_environmental() -> Category {
    Category::new("direct_environmental", "Direct environmental impacts", 0.30)
        .subcategory(
            Subcategory::new("materials_resources", "Materials and resources", 0.30)
                .question(
                    Criterion::numeric(
                        "materials_carbon_footprint",
                        "Embodied carbon of scenography materials",
                        "kg CO2eq",
                    )
                    .required()
                    .impact(ImpactLevel::High)
                    .with_help("Sum of supplier or database footprints for all built elements")
                    .emits(EmissionSource::Fixed {
                        factor: factors::DIRECT_KG_CO2EQ,
                    }),
                )
                .question(
                    Criterion::numeric(
                        "materials_water_consumption",
                        "Water used to produce materials",
                        "litres",
                    )
                    .emits(EmissionSource::Fixed {
                        factor: factors::WATER_PER_LITRE,
                    }),
                )
                .question(Criterion::numeric(
                    "materials_total_mass",
                    "Total mass of materials",
                    "kg",
                ))
                .question(
                    Criterion::percentage("recycled_materials_pct", "Share of recycled materials")
                        .weighted(0.20)
                        .required()
                        .impact(ImpactLevel::High),
                )
                .question(
                    Criterion::percentage(
                        "biosourced_materials_pct",
                        "Share of bio-sourced materials",
                    )
                    .weighted(0.10),
                )
                .question(
                    Criterion::single_choice(
                        "material_toxicity",
                        "Toxicity of paints, glues and finishes",
                        vec![
                            Choice::new("none", "No toxic substances", 10.0),
                            Choice::new("low", "Low-emission products", 7.0),
                            Choice::new("moderate", "Some solvent-based products", 3.0),
                            Choice::new("high", "Mostly solvent-based products", 0.0),
                        ],
                    )
                    .weighted(0.20)
                    .required(),
                )
                .question(
                    Criterion::scale_1_10(
                        "post_exhibition_reuse",
                        "Planned reuse of elements after closing",
                    )
                    .weighted(0.25)
                    .required()
                    .impact(ImpactLevel::High),
                )
                .question(
                    Criterion::percentage(
                        "reused_scenography_pct",
                        "Share of scenography reused from earlier exhibitions",
                    )
                    .weighted(0.15),
                )
                .question(
                    Criterion::percentage("certified_wood_pct", "Share of FSC or PEFC wood")
                        .weighted(0.10),
                ),
        )
        .subcategory(
            Subcategory::new("energy_climate", "Energy and climate", 0.30)
                .question(
                    Criterion::numeric("lighting_consumption", "Lighting consumption", "kWh")
                        .required()
                        .emits(electricity()),
                )
                .question(
                    Criterion::numeric(
                        "hvac_consumption",
                        "Heating, ventilation and cooling consumption",
                        "kWh",
                    )
                    .required()
                    .emits(electricity()),
                )
                .question(
                    Criterion::numeric(
                        "audiovisual_consumption",
                        "Audiovisual and digital equipment consumption",
                        "kWh",
                    )
                    .emits(electricity()),
                )
                .question(
                    Criterion::percentage("renewable_energy_pct", "Share of renewable energy")
                        .weighted(0.35)
                        .required()
                        .impact(ImpactLevel::High),
                )
                .question(
                    Criterion::single_choice(
                        "equipment_efficiency",
                        "Energy label of installed equipment",
                        vec![
                            Choice::new("a_plus_plus_plus", "A+++", 10.0),
                            Choice::new("a_plus_plus", "A++", 8.0),
                            Choice::new("a_plus", "A+", 6.0),
                            Choice::new("a", "A", 4.0),
                            Choice::new("b_or_lower", "B or lower", 1.0),
                        ],
                    )
                    .weighted(0.15),
                )
                .question(
                    Criterion::percentage("led_lighting_pct", "Share of LED lighting").weighted(0.20),
                )
                .question(
                    Criterion::boolean("energy_monitoring", "Sub-metered energy monitoring")
                        .weighted(0.10),
                )
                .question(
                    Criterion::boolean("standby_management", "Automatic standby outside hours")
                        .weighted(0.05),
                )
                .question(
                    Criterion::scale_1_5(
                        "heating_setpoint_control",
                        "Control of temperature setpoints",
                    )
                    .weighted(0.15),
                ),
        )
        .subcategory(
            Subcategory::new("transport_logistics", "Transport and logistics", 0.25)
                .question(
                    Criterion::numeric(
                        "materials_transport_distance",
                        "Distance travelled by materials",
                        "km",
                    )
                    .required()
                    .emits(EmissionSource::ByChoice {
                        selector: "transport_mode".to_string(),
                    }),
                )
                .question(
                    Criterion::single_choice(
                        "transport_mode",
                        "Main transport mode for materials",
                        transport_modes(),
                    )
                    .weighted(0.30)
                    .required()
                    .impact(ImpactLevel::High),
                )
                .question(
                    Criterion::scale_1_5("delivery_optimisation", "Grouping and route optimisation")
                        .weighted(0.20),
                )
                .question(
                    Criterion::numeric(
                        "artwork_shipping_distance",
                        "Distance travelled by loaned artworks",
                        "km",
                    )
                    .emits(EmissionSource::ByChoice {
                        selector: "artwork_transport_mode".to_string(),
                    }),
                )
                .question(
                    Criterion::single_choice(
                        "artwork_transport_mode",
                        "Main transport mode for artworks",
                        transport_modes(),
                    )
                    .weighted(0.20),
                )
                .question(
                    Criterion::percentage(
                        "visitor_public_transport_pct",
                        "Share of visitors arriving by public transport",
                    )
                    .weighted(0.20),
                )
                .question(
                    Criterion::numeric("staff_travel_distance", "Staff travel by car", "km").emits(
                        EmissionSource::Fixed {
                            factor: factors::CAR_PER_KM,
                        },
                    ),
                )
                .question(
                    Criterion::boolean("shared_crates_reuse", "Reusable or shared crates")
                        .weighted(0.10),
                ),
        )
        .subcategory(
            Subcategory::new("waste_pollution", "Waste and pollution", 0.15)
                .question(
                    Criterion::numeric("construction_waste", "Construction and dismantling waste", "kg")
                        .required()
                        .emits(EmissionSource::Fixed {
                            factor: factors::CONSTRUCTION_WASTE_PER_KG,
                        }),
                )
                .question(
                    Criterion::percentage("waste_recycling_rate", "Waste recycling rate")
                        .weighted(0.25)
                        .required(),
                )
                .question(
                    Criterion::boolean("hazardous_waste", "Hazardous waste produced")
                        .weighted(0.15)
                        .required()
                        .lower_is_better(),
                )
                .question(Criterion::numeric(
                    "hazardous_waste_mass",
                    "Mass of hazardous waste",
                    "kg",
                ))
                .question(
                    Criterion::single_choice(
                        "indoor_air_measures",
                        "Indoor air quality measures",
                        vec![
                            Choice::new("none", "None", 0.0),
                            Choice::new("basic_ventilation", "Basic ventilation", 3.0),
                            Choice::new("advanced_filtration", "Advanced filtration", 6.0),
                            Choice::new("low_emission_materials", "Low-emission materials", 8.0),
                            Choice::new("full_voc_control", "Full VOC monitoring and control", 10.0),
                        ],
                    )
                    .weighted(0.15),
                )
                .question(
                    Criterion::scale_1_5(
                        "pollution_incident_frequency",
                        "Frequency of pollution incidents",
                    )
                    .weighted(0.10)
                    .lower_is_better(),
                )
                .question(
                    Criterion::scale_1_5("pollution_severity", "Severity of pollution incidents")
                        .weighted(0.10)
                        .lower_is_better(),
                )
                .question(
                    Criterion::scale_1_5("pollution_control_level", "Pollution control measures")
                        .weighted(0.10),
                )
                .question(
                    Criterion::boolean("waste_sorting_points", "Sorting points for visitors")
                        .weighted(0.15),
                )
                .risk(RiskProfile::new(
                    "pollution_incident_frequency",
                    "pollution_severity",
                    "pollution_control_level",
                    RISK_THRESHOLD,
                )),
        )
}

fn indirect_environmental() -> Category {
    Category::new("indirect_environmental", "Indirect environmental impacts", 0.15)
        .subcategory(
            Subcategory::new("life_cycle", "Life cycle and circularity", 0.50)
                .question(
                    Criterion::single_choice(
                        "end_of_life",
                        "End-of-life route for the scenography",
                        vec![
                            Choice::new("total_reuse", "Fully reused", 10.0),
                            Choice::new("mostly_recycled", "Mostly recycled", 8.0),
                            Choice::new("energy_recovery", "Energy recovery", 5.0),
                            Choice::new("partial_landfill", "Partly landfilled", 2.0),
                            Choice::new("total_landfill", "Landfilled", 0.0),
                        ],
                    )
                    .weighted(0.30)
                    .required()
                    .impact(ImpactLevel::High),
                )
                .question(
                    Criterion::scale_1_10("circularity", "Overall circularity of the design")
                        .weighted(0.25)
                        .required(),
                )
                .question(
                    Criterion::boolean("modular_design", "Modular and demountable design")
                        .weighted(0.15),
                )
                .question(
                    Criterion::single_choice(
                        "lca_scope",
                        "Scope of the life cycle assessment",
                        vec![
                            Choice::new("none", "No assessment", 0.0),
                            Choice::new("materials_only", "Materials only", 4.0),
                            Choice::new("cradle_to_gate", "Cradle to gate", 7.0),
                            Choice::new("cradle_to_grave", "Cradle to grave", 10.0),
                        ],
                    )
                    .weighted(0.15),
                )
                .question(
                    Criterion::boolean(
                        "donation_after_closing",
                        "Donation of elements after closing",
                    )
                    .weighted(0.15),
                ),
        )
        .subcategory(
            Subcategory::new("systemic_effects", "Systemic effects", 0.30)
                .question(
                    Criterion::scale_1_5("urban_heat_island", "Contribution to urban heat island")
                        .weighted(0.20)
                        .lower_is_better(),
                )
                .question(
                    Criterion::scale_1_5("biodiversity_impact", "Pressure on local biodiversity")
                        .weighted(0.25)
                        .required()
                        .lower_is_better(),
                )
                .question(
                    Criterion::boolean(
                        "rebound_effects_considered",
                        "Rebound effects considered",
                    )
                    .weighted(0.15),
                )
                .question(
                    Criterion::numeric("digital_footprint", "Data hosted and streamed", "GB").emits(
                        EmissionSource::Fixed {
                            factor: factors::DIGITAL_PER_GB,
                        },
                    ),
                )
                .question(
                    Criterion::scale_1_10("digital_sobriety", "Digital sobriety of the content")
                        .weighted(0.20),
                )
                .question(
                    Criterion::boolean("land_artificialisation", "New land artificialisation")
                        .weighted(0.20)
                        .lower_is_better(),
                ),
        )
        .subcategory(
            Subcategory::new("supply_chain", "Supply chain", 0.20)
                .question(
                    Criterion::boolean(
                        "supplier_environmental_criteria",
                        "Environmental criteria in supplier selection",
                    )
                    .weighted(0.30)
                    .required(),
                )
                .question(
                    Criterion::percentage("rental_equipment_pct", "Share of rented equipment")
                        .weighted(0.25),
                )
                .question(
                    Criterion::scale_1_5("packaging_reduction", "Packaging reduction")
                        .weighted(0.20),
                )
                .question(
                    Criterion::percentage(
                        "second_hand_purchases_pct",
                        "Share of second-hand purchases",
                    )
                    .weighted(0.25),
                ),
        )
}

fn eco_social() -> Category {
    Category::new("eco_social", "Eco-social impacts", 0.30)
        .subcategory(
            Subcategory::new("social_justice", "Social justice and accessibility", 0.35)
                .question(
                    Criterion::scale_1_10("working_conditions", "Working conditions of teams")
                        .weighted(0.20)
                        .required(),
                )
                .question(
                    Criterion::boolean(
                        "human_rights_respect",
                        "Human rights due diligence in the supply chain",
                    )
                    .weighted(0.20)
                    .required()
                    .impact(ImpactLevel::High),
                )
                .question(
                    Criterion::scale_1_10("gender_equality", "Gender balance of teams and artists")
                        .weighted(0.10),
                )
                .question(
                    Criterion::single_choice(
                        "reduced_mobility_access",
                        "Access for people with reduced mobility",
                        vec![
                            Choice::new("not_accessible", "Not accessible", 0.0),
                            Choice::new("partially", "Partially accessible", 4.0),
                            Choice::new("with_assistance", "Accessible with assistance", 7.0),
                            Choice::new("fully", "Fully accessible", 10.0),
                        ],
                    )
                    .weighted(0.20)
                    .required(),
                )
                .question(
                    Criterion::single_choice(
                        "admission_pricing",
                        "Admission pricing policy",
                        vec![
                            Choice::new("free", "Free admission", 10.0),
                            Choice::new("social_rate", "Social rates available", 8.0),
                            Choice::new("moderate", "Moderate pricing", 5.0),
                            Choice::new("high", "High pricing", 1.0),
                        ],
                    )
                    .weighted(0.15)
                    .required(),
                )
                .question(
                    Criterion::multi_choice(
                        "sensory_accessibility",
                        "Sensory accessibility aids",
                        vec![
                            Choice::new("audio_description", "Audio description", 3.0),
                            Choice::new("braille", "Braille", 3.0),
                            Choice::new("sign_language", "Sign language", 3.0),
                            Choice::new("easy_read", "Easy-read texts", 3.0),
                            Choice::new("tactile_models", "Tactile models", 3.0),
                        ],
                    )
                    .weighted(0.15),
                ),
        )
        .subcategory(
            Subcategory::new("local_economy", "Local economy", 0.25)
                .question(
                    Criterion::percentage("local_sourcing_pct", "Share of local sourcing")
                        .weighted(0.35)
                        .required()
                        .impact(ImpactLevel::High),
                )
                .question(Criterion::numeric("local_jobs", "Local jobs created", "jobs"))
                .question(
                    Criterion::boolean("skills_transfer", "Skills transfer to local actors")
                        .weighted(0.15),
                )
                .question(
                    Criterion::percentage("local_artists_pct", "Share of local artists")
                        .weighted(0.20),
                )
                .question(
                    Criterion::boolean(
                        "social_economy_suppliers",
                        "Social and solidarity economy suppliers",
                    )
                    .weighted(0.15),
                )
                .question(
                    Criterion::scale_1_5("local_partnerships", "Depth of local partnerships")
                        .weighted(0.15),
                ),
        )
        .subcategory(
            Subcategory::new("education_awareness", "Education and awareness", 0.20)
                .question(
                    Criterion::scale_1_10(
                        "pedagogical_dimension",
                        "Environmental pedagogy of the exhibition",
                    )
                    .weighted(0.30)
                    .required(),
                )
                .question(
                    Criterion::boolean("team_training", "Team trained on sustainability")
                        .weighted(0.15),
                )
                .question(
                    Criterion::boolean("school_programmes", "Programmes for schools")
                        .weighted(0.15),
                )
                .question(
                    Criterion::multi_choice(
                        "visitor_awareness_tools",
                        "Visitor awareness tools",
                        vec![
                            Choice::new("signage", "Signage", 3.0),
                            Choice::new("guided_tours", "Guided tours", 3.0),
                            Choice::new("workshops", "Workshops", 3.0),
                            Choice::new("digital_content", "Digital content", 2.0),
                            Choice::new("eco_guide", "Eco-guide", 2.0),
                        ],
                    )
                    .weighted(0.20),
                )
                .question(
                    Criterion::boolean(
                        "scientific_partnerships",
                        "Partnerships with research institutions",
                    )
                    .weighted(0.20),
                ),
        )
        .subcategory(
            Subcategory::new("health_safety", "Health and safety", 0.20)
                .question(
                    Criterion::scale_1_5("accident_frequency", "Frequency of accidents")
                        .weighted(0.20)
                        .required()
                        .lower_is_better(),
                )
                .question(
                    Criterion::scale_1_5("accident_severity", "Severity of accidents")
                        .weighted(0.20)
                        .required()
                        .lower_is_better(),
                )
                .question(
                    Criterion::scale_1_5("safety_control_level", "Safety control measures")
                        .weighted(0.25)
                        .required(),
                )
                .question(
                    Criterion::boolean("safety_training", "Safety training for staff")
                        .weighted(0.20),
                )
                .question(
                    Criterion::scale_1_10("visitor_wellbeing", "Visitor comfort and wellbeing")
                        .weighted(0.15),
                )
                .risk(RiskProfile::new(
                    "accident_frequency",
                    "accident_severity",
                    "safety_control_level",
                    RISK_THRESHOLD,
                )),
        )
}

fn temporal_contextual() -> Category {
    Category::new("temporal_contextual", "Temporal and contextual factors", 0.15)
        .subcategory(
            Subcategory::new("duration_intensity", "Duration and intensity", 0.50)
                .question(
                    Criterion::numeric("exhibition_duration", "Exhibition duration", "days")
                        .required()
                        .bounded(Some(1.0), Some(MAX_DURATION_DAYS)),
                )
                .question(
                    Criterion::numeric("visitor_count", "Expected visitors", "visitors")
                        .required()
                        .bounded(Some(0.0), Some(MAX_VISITORS)),
                )
                .question(
                    Criterion::scale_1_10("reversibility", "Reversibility of installations")
                        .weighted(0.40)
                        .required(),
                )
                .question(
                    Criterion::numeric("opening_hours_per_week", "Weekly opening hours", "hours")
                        .bounded(Some(0.0), Some(168.0)),
                )
                .question(
                    Criterion::boolean("touring_potential", "Designed to tour").weighted(0.30),
                )
                .question(
                    Criterion::scale_1_5("intensity_of_use", "Intensity of use of the installation")
                        .weighted(0.30),
                )
                .question(
                    Criterion::numeric("surface_area", "Exhibition surface", "m2")
                        .bounded(Some(0.0), Some(MAX_SURFACE_M2)),
                ),
        )
        .subcategory(
            Subcategory::new("governance_transparency", "Governance and transparency", 0.50)
                .question(
                    Criterion::scale_1_10("materials_traceability", "Traceability of materials")
                        .weighted(0.25)
                        .required(),
                )
                .question(
                    Criterion::single_choice(
                        "supplier_certifications",
                        "Environmental certifications held",
                        vec![
                            Choice::new("none", "None", 0.0),
                            Choice::new("iso_14001", "ISO 14001", 6.0),
                            Choice::new("sector_labels", "Sector labels", 6.0),
                            Choice::new("multiple", "Several certifications", 10.0),
                        ],
                    )
                    .weighted(0.15),
                )
                .question(
                    Criterion::boolean("cost_transparency", "Published environmental costs")
                        .weighted(0.10),
                )
                .question(
                    Criterion::boolean("environmental_policy", "Formal environmental policy")
                        .weighted(0.15),
                )
                .question(
                    Criterion::boolean("sustainability_referent", "Named sustainability referent")
                        .weighted(0.10),
                )
                .question(
                    Criterion::boolean("public_reporting", "Public impact reporting")
                        .weighted(0.15),
                )
                .question(
                    Criterion::scale_1_5("stakeholder_consultation", "Stakeholder consultation")
                        .weighted(0.10),
                )
                .question(Criterion::free_text(
                    "governance_notes",
                    "Governance notes",
                    FREE_TEXT_LIMIT,
                )),
        )
}

fn transversal() -> Category {
    Category::new("transversal", "Transversal criteria", 0.10)
        .subcategory(
            Subcategory::new("measurement", "Measurement and targets", 0.50)
                .question(
                    Criterion::boolean("lca_method", "Recognised assessment method used")
                        .weighted(0.30),
                )
                .question(
                    Criterion::boolean("quantified_targets", "Quantified reduction targets")
                        .weighted(0.40)
                        .required(),
                )
                .question(
                    Criterion::boolean("carbon_offsetting", "Residual emissions contribution")
                        .weighted(0.30),
                ),
        )
        .subcategory(
            Subcategory::new("innovation_exemplarity", "Innovation and exemplarity", 0.50)
                .question(
                    Criterion::boolean("innovative_materials", "Innovative low-impact materials")
                        .weighted(0.30),
                )
                .question(
                    Criterion::scale_1_10("replication_potential", "Potential for replication")
                        .weighted(0.40)
                        .required(),
                )
                .question(
                    Criterion::boolean("knowledge_sharing", "Open sharing of methods")
                        .weighted(0.30),
                ),
        )
}
