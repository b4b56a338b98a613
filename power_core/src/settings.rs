//! # Planning Settings
//!
//! Caller-supplied defaults, the planning analogue of project-wide settings.
//! Every field has a default, so a settings document may name only what it
//! overrides:
//!
//! ```rust
//! use power_core::settings::PlanningSettings;
//!
//! let settings = PlanningSettings::from_json_str(r#"{ "power": 0.9 }"#).unwrap();
//! assert_eq!(settings.power, 0.9);
//! assert_eq!(settings.alpha, 0.05);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{PlanError, PlanResult};
use crate::params::DesignParameters;
use crate::stats::f_search::DEFAULT_MAX_PROBES;

/// Defaults applied when a request leaves a value unspecified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningSettings {
    /// Default type I error rate
    pub alpha: f64,

    /// Default target power
    pub power: f64,

    /// Default sidedness
    pub two_sided: bool,

    /// Default expected dropout
    pub dropout_rate: f64,

    /// Events per variable for the logistic-regression rule
    pub default_epv: u32,

    /// Probe budget for the noncentral-F search
    pub max_probes: u32,
}

impl Default for PlanningSettings {
    fn default() -> Self {
        PlanningSettings {
            alpha: 0.05,
            power: 0.80,
            two_sided: true,
            dropout_rate: 0.0,
            default_epv: 10,
            max_probes: DEFAULT_MAX_PROBES,
        }
    }
}

impl PlanningSettings {
    /// Parse a (possibly partial) settings document.
    pub fn from_json_str(json: &str) -> PlanResult<Self> {
        let settings: PlanningSettings =
            serde_json::from_str(json).map_err(|e| PlanError::invalid_document("settings", e))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate the defaults as a `DesignParameters` plus the search settings.
    pub fn validate(&self) -> PlanResult<()> {
        self.design_parameters()?;
        if self.default_epv == 0 {
            return Err(PlanError::out_of_range("default_epv", self.default_epv, "EPV must be positive"));
        }
        if self.max_probes == 0 {
            return Err(PlanError::out_of_range("max_probes", self.max_probes, "Probe budget must be positive"));
        }
        Ok(())
    }

    /// Build validated design parameters from these defaults.
    pub fn design_parameters(&self) -> PlanResult<DesignParameters> {
        let params = DesignParameters {
            alpha: self.alpha,
            power: self.power,
            two_sided: self.two_sided,
            dropout_rate: self.dropout_rate,
        };
        params.validate()?;
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = PlanningSettings::default();
        assert_eq!(settings.default_epv, 10);
        assert_eq!(settings.max_probes, 10_000);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_document() {
        let settings = PlanningSettings::from_json_str(r#"{ "dropout_rate": 0.15, "two_sided": false }"#).unwrap();
        let params = settings.design_parameters().unwrap();
        assert_eq!(params.dropout_rate, 0.15);
        assert!(!params.two_sided);
        assert_eq!(params.alpha, 0.05);
    }

    #[test]
    fn test_invalid_document() {
        let err = PlanningSettings::from_json_str("not json").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_DOCUMENT");
        assert_eq!(err.field(), None);
        let err = PlanningSettings::from_json_str(r#"{ "dropout_rate": 0.97 }"#).unwrap_err();
        assert_eq!(err.error_code(), "DROPOUT_TOO_HIGH");
        assert!(PlanningSettings::from_json_str(r#"{ "max_probes": 0 }"#).is_err());
    }
}
