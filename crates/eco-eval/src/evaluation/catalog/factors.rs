//! Emission factors in kg CO2eq per unit, from the ADEME Base Empreinte reference tables.

/// Embodied footprint already expressed in kg CO2eq.
pub const DIRECT_KG_CO2EQ: f64 = 1.0;

/// French grid electricity mix, per kWh.
pub const ELECTRICITY_PER_KWH: f64 = 0.052;

/// Mains water supply and treatment, per litre.
pub const WATER_PER_LITRE: f64 = 0.000_132;

/// Mixed non-hazardous construction waste, per kg.
pub const CONSTRUCTION_WASTE_PER_KG: f64 = 0.1;

/// Data transfer and storage, per GB.
pub const DIGITAL_PER_GB: f64 = 0.02;

pub const TRAIN_PER_KM: f64 = 0.03;
pub const TRUCK_PER_KM: f64 = 0.8;
pub const CAR_PER_KM: f64 = 0.2;
pub const BOAT_PER_KM: f64 = 0.1;
pub const PLANE_PER_KM: f64 = 1.0;
pub const MULTIMODAL_PER_KM: f64 = 0.3;
