//! Calculation history and precision policy.
//!
//! [`CalculationHistory`] is an append-only, insertion-ordered log of [`ParallaxResult`]s.
//! Nothing is ever evicted implicitly: the log grows until [`CalculationHistory::clear`] is
//! called, so callers that need a bound must cap it themselves.
//!
//! [`PrecisionMode`] only selects the tolerance used by [`PrecisionPolicy::is_within_tolerance`];
//! it never alters how a result is computed.

use std::fmt;
use std::str::FromStr;

use hifitime::Epoch;
use serde::Deserialize;

use crate::parallax::ParallaxResult;
use crate::transit_errors::TransitError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrecisionMode {
    #[default]
    Standard,
    High,
    Ultra,
}

impl fmt::Display for PrecisionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PrecisionMode::Standard => "standard",
            PrecisionMode::High => "high",
            PrecisionMode::Ultra => "ultra",
        };
        f.write_str(s)
    }
}

impl FromStr for PrecisionMode {
    type Err = TransitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(PrecisionMode::Standard),
            "high" => Ok(PrecisionMode::High),
            "ultra" => Ok(PrecisionMode::Ultra),
            other => Err(TransitError::InputValidation(format!(
                "unknown precision mode '{other}'"
            ))),
        }
    }
}

/// Tolerances attached to each [`PrecisionMode`].
pub struct PrecisionPolicy;

impl PrecisionPolicy {
    /// Accepted error for a mode, compared directly with `error_percent`.
    pub fn tolerance(mode: PrecisionMode) -> f64 {
        match mode {
            PrecisionMode::Standard => 0.10,
            PrecisionMode::High => 0.05,
            PrecisionMode::Ultra => 0.01,
        }
    }

    /// `true` when the result's error stays within the tolerance of its own mode.
    pub fn is_within_tolerance(result: &ParallaxResult) -> bool {
        Self::accepts(result.precision_mode, result.error_percent)
    }

    /// `true` when `error_percent ≤ tolerance(mode)`.
    pub fn accepts(mode: PrecisionMode, error_percent: f64) -> bool {
        error_percent <= Self::tolerance(mode)
    }
}

/// Criteria for [`CalculationHistory::filter`]; unset fields do not filter.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HistoryFilter {
    /// Keep results whose epoch is at or after this instant
    pub start: Option<Epoch>,
    /// Keep results whose epoch is at or before this instant
    pub end: Option<Epoch>,
    /// Keep results whose error does not exceed this percentage
    pub max_error: Option<f64>,
}

impl HistoryFilter {
    pub fn matches(&self, result: &ParallaxResult) -> bool {
        self.start.is_none_or(|start| result.epoch >= start)
            && self.end.is_none_or(|end| result.epoch <= end)
            && self.max_error.is_none_or(|max| result.error_percent <= max)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CalculationHistory {
    results: Vec<ParallaxResult>,
}

impl CalculationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: ParallaxResult) {
        tracing::debug!(
            site_a = %result.site_a,
            site_b = %result.site_b,
            entries = self.results.len() + 1,
            "result appended to history"
        );
        self.results.push(result);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParallaxResult> {
        self.results.iter()
    }

    pub fn as_slice(&self) -> &[ParallaxResult] {
        &self.results
    }

    pub fn latest(&self) -> Option<&ParallaxResult> {
        self.results.last()
    }

    /// Entry with the smallest error; the earliest one wins ties.
    pub fn best(&self) -> Option<&ParallaxResult> {
        self.results
            .iter()
            .reduce(|best, r| if r.error_percent < best.error_percent { r } else { best })
    }

    pub fn filter(&self, filter: &HistoryFilter) -> Vec<ParallaxResult> {
        self.filter_by(|r| filter.matches(r))
    }

    pub fn filter_by<P>(&self, predicate: P) -> Vec<ParallaxResult>
    where
        P: Fn(&ParallaxResult) -> bool,
    {
        self.results.iter().filter(|r| predicate(r)).cloned().collect()
    }

    pub fn clear(&mut self) {
        tracing::debug!(entries = self.results.len(), "history cleared");
        self.results.clear();
    }
}
