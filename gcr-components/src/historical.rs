//! Measured atmospheric CO2 concentrations.
//!
//! The table anchors the atmospheric series up to the calibration cutoff and
//! provides the calibration ratio applied to early-year emissions.

use gcr_core::errors::{GcrError, GcrResult};
use gcr_core::interpolate::{bracket, log_linear, Bracket};
use gcr_core::timeseries::{FloatValue, Time};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Default calibration cutoff year
pub const DEFAULT_CUTOFF_YEAR: Time = 2025.0;

const STANDARD_ANCHORS: [(Time, FloatValue); 12] = [
    (1850.0, 285.2),
    (1900.0, 295.7),
    (1950.0, 311.3),
    (1960.0, 316.91),
    (1970.0, 325.68),
    (1980.0, 338.76),
    (1990.0, 354.39),
    (2000.0, 369.71),
    (2010.0, 389.90),
    (2015.0, 401.01),
    (2020.0, 414.24),
    (2025.0, 421.50),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawTable {
    anchors: Vec<(Time, FloatValue)>,
    cutoff_year: Time,
}

/// Calibration year to measured ppm, sorted by year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTable", into = "RawTable")]
pub struct HistoricalCO2Table {
    years: Array1<Time>,
    ppm: Array1<FloatValue>,
    cutoff_year: Time,
}

impl TryFrom<RawTable> for HistoricalCO2Table {
    type Error = GcrError;

    fn try_from(raw: RawTable) -> GcrResult<Self> {
        Self::new(raw.anchors, raw.cutoff_year)
    }
}

impl From<HistoricalCO2Table> for RawTable {
    fn from(table: HistoricalCO2Table) -> Self {
        Self {
            anchors: table.anchors().collect(),
            cutoff_year: table.cutoff_year,
        }
    }
}

impl Default for HistoricalCO2Table {
    fn default() -> Self {
        Self::standard()
    }
}

impl HistoricalCO2Table {
    /// Build a table from `(year, ppm)` anchors.
    ///
    /// Anchors may be given in any order but years must be unique and finite.
    /// The cutoff must lie within the anchored range.
    pub fn new(mut anchors: Vec<(Time, FloatValue)>, cutoff_year: Time) -> GcrResult<Self> {
        if anchors.is_empty() {
            return Err(GcrError::InvalidCalibrationTable(
                "at least one anchor is required".to_string(),
            ));
        }
        if anchors
            .iter()
            .any(|(year, ppm)| !year.is_finite() || !ppm.is_finite())
        {
            return Err(GcrError::InvalidCalibrationTable(
                "anchors must be finite".to_string(),
            ));
        }
        anchors.sort_by(|a, b| a.0.total_cmp(&b.0));
        if anchors.windows(2).any(|w| w[0].0 == w[1].0) {
            return Err(GcrError::InvalidCalibrationTable(
                "anchor years must be unique".to_string(),
            ));
        }

        let first = anchors[0].0;
        let last = anchors[anchors.len() - 1].0;
        if !(first..=last).contains(&cutoff_year) {
            return Err(GcrError::InvalidCalibrationTable(format!(
                "cutoff {cutoff_year} outside anchored range [{first}, {last}]"
            )));
        }

        let (years, ppm): (Vec<_>, Vec<_>) = anchors.into_iter().unzip();
        Ok(Self {
            years: Array1::from(years),
            ppm: Array1::from(ppm),
            cutoff_year,
        })
    }

    /// Measured concentrations from 1850 to 2025 with a 2025 cutoff.
    pub fn standard() -> Self {
        Self {
            years: STANDARD_ANCHORS.iter().map(|a| a.0).collect(),
            ppm: STANDARD_ANCHORS.iter().map(|a| a.1).collect(),
            cutoff_year: DEFAULT_CUTOFF_YEAR,
        }
    }

    pub fn cutoff_year(&self) -> Time {
        self.cutoff_year
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn anchors(&self) -> impl Iterator<Item = (Time, FloatValue)> + '_ {
        self.years.iter().copied().zip(self.ppm.iter().copied())
    }

    /// The earliest anchor
    pub fn earliest(&self) -> (Time, FloatValue) {
        (self.years[0], self.ppm[0])
    }

    /// Concentration at `year` within the anchored range.
    ///
    /// Exact anchors are returned untouched. Between anchors `ln(ppm)` is
    /// interpolated linearly in time.
    pub fn ppm_at(&self, year: Time) -> GcrResult<FloatValue> {
        match bracket(self.years.view(), year) {
            Bracket::Exact(i) => Ok(self.ppm[i]),
            Bracket::Between(i, j) => Ok(log_linear(
                year,
                (self.years[i], self.ppm[i]),
                (self.years[j], self.ppm[j]),
            )),
            Bracket::Before | Bracket::After => Err(GcrError::ExtrapolationNotAllowed {
                target: year,
                start: self.years[0],
                end: self.years[self.years.len() - 1],
            }),
        }
    }

    /// Value of the anchor closest in time to `year`.
    ///
    /// Ties resolve to the earlier anchor.
    pub fn nearest_ppm(&self, year: Time) -> FloatValue {
        let mut best = 0;
        for (i, anchor) in self.years.iter().enumerate().skip(1) {
            if (anchor - year).abs() < (self.years[best] - year).abs() {
                best = i;
            }
        }
        self.ppm[best]
    }

    /// Ratio of the nearest anchor to the earliest anchor.
    pub fn calibration_ratio(&self, year: Time) -> FloatValue {
        let (_, earliest) = self.earliest();
        if earliest <= 0.0 {
            return 1.0;
        }
        self.nearest_ppm(year) / earliest
    }
}
