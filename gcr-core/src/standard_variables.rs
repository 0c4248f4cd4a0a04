//! Column names of the per-timestep table.
//!
//! Raw columns are produced by the external integrator. Derived columns are
//! added by the policy layer and are what the presentation layer reads.

// ============================================================================
// Raw integrator output
// ============================================================================

pub const VAR_POPULATION: &str = "population";
pub const VAR_POPULATION_0_14: &str = "population_0_14";
pub const VAR_POPULATION_15_44: &str = "population_15_44";
pub const VAR_POPULATION_45_64: &str = "population_45_64";
pub const VAR_POPULATION_65_PLUS: &str = "population_65_plus";
pub const VAR_INDUSTRIAL_OUTPUT: &str = "industrial_output";
pub const VAR_POLLUTION_INDEX: &str = "persistent_pollution_index";
pub const VAR_FOOD_PER_CAPITA: &str = "food_per_capita";
pub const VAR_SERVICE_OUTPUT_PER_CAPITA: &str = "service_output_per_capita";
pub const VAR_NONRENEWABLE_RESOURCES: &str = "nonrenewable_resources";
pub const VAR_LIFE_EXPECTANCY: &str = "life_expectancy";

/// Columns every integrator must provide.
pub const REQUIRED_RAW_VARIABLES: [&str; 3] =
    [VAR_POPULATION, VAR_INDUSTRIAL_OUTPUT, VAR_POLLUTION_INDEX];

/// Age cohorts, youngest first.
pub const COHORT_VARIABLES: [&str; 4] = [
    VAR_POPULATION_0_14,
    VAR_POPULATION_15_44,
    VAR_POPULATION_45_64,
    VAR_POPULATION_65_PLUS,
];

// ============================================================================
// Derived by the policy layer
// ============================================================================

/// unit: MtCO2e / yr
pub const VAR_GROSS_EMISSIONS: &str = "gross_emissions";
/// unit: MtCO2e / yr
pub const VAR_NATURAL_UPTAKE: &str = "natural_uptake";
/// unit: MtCO2e / yr
pub const VAR_NET_EMISSIONS: &str = "net_emissions";
/// unit: MtCO2e per unit of industrial output
pub const VAR_EMISSION_INTENSITY: &str = "emission_intensity";
/// unit: MtCO2e / yr
pub const VAR_XCC_SEQUESTRATION: &str = "xcc_sequestration";
/// unit: ppm
pub const VAR_ATMOSPHERIC_CO2: &str = "atmospheric_co2";
