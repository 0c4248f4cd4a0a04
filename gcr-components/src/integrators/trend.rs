use gcr_core::errors::{ensure_finite, GcrResult};
use gcr_core::integrator::{InitialStocks, Integrator, RawRun};
use gcr_core::standard_variables::{
    COHORT_VARIABLES, VAR_FOOD_PER_CAPITA, VAR_INDUSTRIAL_OUTPUT, VAR_LIFE_EXPECTANCY,
    VAR_NONRENEWABLE_RESOURCES, VAR_POLLUTION_INDEX, VAR_POPULATION,
    VAR_SERVICE_OUTPUT_PER_CAPITA,
};
use gcr_core::timeseries::{FloatValue, Time, TimeAxis};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Growth rates and conversion factors for [`TrendIntegrator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendParameters {
    /// Growth rate applied to every cohort
    /// unit: 1 / yr
    /// default: 0.008
    pub population_growth_rate: FloatValue,
    /// Growth rate of industrial and service capital
    /// unit: 1 / yr
    /// default: 0.02
    pub capital_growth_rate: FloatValue,
    /// Capital needed per unit of output
    /// unit: yr
    /// default: 3.0
    pub capital_output_ratio: FloatValue,
    /// Growth rate of the persistent pollution stock
    /// unit: 1 / yr
    /// default: 0.015
    pub pollution_growth_rate: FloatValue,
    /// Pollution stock that corresponds to an index of 1
    /// default: 1.0
    pub pollution_reference: FloatValue,
    /// Annual fraction of non-renewable resources consumed
    /// unit: 1 / yr
    /// default: 0.01
    pub resource_depletion_rate: FloatValue,
    /// Food produced per unit of arable land
    /// default: 2.0
    pub land_yield: FloatValue,
    /// unit: yr
    /// default: 65.0
    pub initial_life_expectancy: FloatValue,
    /// unit: yr / yr
    /// default: 0.1
    pub life_expectancy_gain: FloatValue,
    /// unit: yr
    /// default: 85.0
    pub max_life_expectancy: FloatValue,
}

impl Default for TrendParameters {
    fn default() -> Self {
        Self {
            population_growth_rate: 0.008,
            capital_growth_rate: 0.02,
            capital_output_ratio: 3.0,
            pollution_growth_rate: 0.015,
            pollution_reference: 1.0,
            resource_depletion_rate: 0.01,
            land_yield: 2.0,
            initial_life_expectancy: 65.0,
            life_expectancy_gain: 0.1,
            max_life_expectancy: 85.0,
        }
    }
}

/// Smooth compound-growth trends seeded from the initial stocks.
///
/// Stands in for the external integrator in demos and tests. Cohorts grow at a
/// common rate so their proportions stay fixed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendIntegrator {
    #[serde(default)]
    parameters: TrendParameters,
}

impl TrendIntegrator {
    pub fn from_parameters(parameters: TrendParameters) -> Self {
        Self { parameters }
    }

    fn growth(rate: FloatValue, elapsed: Time) -> FloatValue {
        (1.0 + rate).powf(elapsed)
    }
}

#[typetag::serde(name = "trend")]
impl Integrator for TrendIntegrator {
    fn integrate(&self, time_axis: &Arc<TimeAxis>, initial: &InitialStocks) -> GcrResult<RawRun> {
        let p = &self.parameters;
        let start = time_axis.first();
        let n = time_axis.len();

        let mut cohorts: [Vec<FloatValue>; 4] = Default::default();
        let mut population = Vec::with_capacity(n);
        let mut output = Vec::with_capacity(n);
        let mut pollution = Vec::with_capacity(n);
        let mut resources = Vec::with_capacity(n);
        let mut food = Vec::with_capacity(n);
        let mut services = Vec::with_capacity(n);
        let mut life_expectancy = Vec::with_capacity(n);

        for t in time_axis.iter() {
            let elapsed = t - start;
            let pop_growth = Self::growth(p.population_growth_rate, elapsed);
            let capital_growth = Self::growth(p.capital_growth_rate, elapsed);

            for (series, value) in cohorts.iter_mut().zip(initial.cohorts()) {
                series.push(value * pop_growth);
            }
            let total = initial.total_population() * pop_growth;
            population.push(ensure_finite(VAR_POPULATION, t, total)?);

            let industrial_capital = initial.industrial_capital * capital_growth;
            output.push(ensure_finite(
                VAR_INDUSTRIAL_OUTPUT,
                t,
                industrial_capital / p.capital_output_ratio,
            )?);
            pollution.push(ensure_finite(
                VAR_POLLUTION_INDEX,
                t,
                initial.persistent_pollution * Self::growth(p.pollution_growth_rate, elapsed)
                    / p.pollution_reference,
            )?);
            resources.push(
                initial.nonrenewable_resources * (1.0 - p.resource_depletion_rate).powf(elapsed),
            );

            let per_capita = |value: FloatValue| if total > 0.0 { value / total } else { 0.0 };
            food.push(per_capita(initial.arable_land * p.land_yield));
            services.push(per_capita(
                initial.service_capital * capital_growth / p.capital_output_ratio,
            ));
            life_expectancy.push(
                (p.initial_life_expectancy + p.life_expectancy_gain * elapsed)
                    .min(p.max_life_expectancy),
            );
        }

        let [c0, c1, c2, c3] = cohorts;
        RawRun::from_columns(
            time_axis.clone(),
            [
                (VAR_POPULATION, population),
                (VAR_INDUSTRIAL_OUTPUT, output),
                (VAR_POLLUTION_INDEX, pollution),
                (COHORT_VARIABLES[0], c0),
                (COHORT_VARIABLES[1], c1),
                (COHORT_VARIABLES[2], c2),
                (COHORT_VARIABLES[3], c3),
                (VAR_FOOD_PER_CAPITA, food),
                (VAR_SERVICE_OUTPUT_PER_CAPITA, services),
                (VAR_NONRENEWABLE_RESOURCES, resources),
                (VAR_LIFE_EXPECTANCY, life_expectancy),
            ],
        )
    }
}
