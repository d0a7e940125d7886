//! Allowed ranges for user assumptions.
//!
//! Bounds are expressed in the units the user types: percent for growth rates
//! and ROE, a plain multiple for P/E.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssumptionBounds {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default_value: Option<f64>,
}

impl AssumptionBounds {
    /// Expected EPS growth, percent per year.
    pub const EPS_CAGR: AssumptionBounds = AssumptionBounds {
        min: -10.0,
        max: 40.0,
        step: 0.5,
        default_value: None,
    };

    /// Expected exit P/E for either method.
    pub const PE: AssumptionBounds = AssumptionBounds {
        min: 5.0,
        max: 60.0,
        step: 0.5,
        default_value: Some(15.0),
    };

    /// Expected book value growth, percent per year.
    pub const BVPS_CAGR: AssumptionBounds = AssumptionBounds {
        min: -10.0,
        max: 40.0,
        step: 0.5,
        default_value: None,
    };

    /// Expected return on equity in year five, percent.
    pub const ROE: AssumptionBounds = AssumptionBounds {
        min: 0.0,
        max: 60.0,
        step: 0.5,
        default_value: None,
    };

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Clamp a fraction (0.08) against percent bounds (8.0).
    pub fn clamp_fraction(&self, fraction: f64) -> f64 {
        self.clamp(fraction * 100.0) / 100.0
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}
