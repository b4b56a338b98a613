//! # Planning Requests
//!
//! A [`PlanningRequest`] is the JSON document a front end submits: a design
//! plus any design parameters the caller wants to pin. Parameters it leaves
//! out come from [`PlanningSettings`].
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "params": { "power": 0.9, "dropout_rate": 0.1 },
//!   "design": { "design": "correlation", "r": 0.3 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::{plan_with_settings, PlanningResult, StudyDesign};
use crate::errors::{PlanError, PlanResult};
use crate::params::DesignParameters;
use crate::settings::PlanningSettings;

/// Per-request overrides of the settings defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterOverrides {
    pub alpha: Option<f64>,
    pub power: Option<f64>,
    pub two_sided: Option<bool>,
    pub dropout_rate: Option<f64>,
}

impl ParameterOverrides {
    /// Merge over `defaults` and validate the result.
    pub fn resolve(&self, defaults: &DesignParameters) -> PlanResult<DesignParameters> {
        let params = DesignParameters {
            alpha: self.alpha.unwrap_or(defaults.alpha),
            power: self.power.unwrap_or(defaults.power),
            two_sided: self.two_sided.unwrap_or(defaults.two_sided),
            dropout_rate: self.dropout_rate.unwrap_or(defaults.dropout_rate),
        };
        params.validate()?;
        Ok(params)
    }
}

impl From<DesignParameters> for ParameterOverrides {
    fn from(params: DesignParameters) -> Self {
        ParameterOverrides {
            alpha: Some(params.alpha),
            power: Some(params.power),
            two_sided: Some(params.two_sided),
            dropout_rate: Some(params.dropout_rate),
        }
    }
}

/// A design plus optional parameter overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningRequest {
    #[serde(default)]
    pub params: ParameterOverrides,
    pub design: StudyDesign,
}

impl PlanningRequest {
    pub fn new(design: StudyDesign) -> Self {
        PlanningRequest {
            params: ParameterOverrides::default(),
            design,
        }
    }

    pub fn with_params(mut self, params: DesignParameters) -> Self {
        self.params = params.into();
        self
    }

    /// Parse a request document.
    pub fn from_json_str(json: &str) -> PlanResult<Self> {
        serde_json::from_str(json).map_err(|e| PlanError::invalid_document("request", e))
    }

    /// Design parameters after applying the overrides to `settings`.
    pub fn resolved_params(&self, settings: &PlanningSettings) -> PlanResult<DesignParameters> {
        settings.validate()?;
        self.params.resolve(&settings.design_parameters()?)
    }

    /// Resolve parameters against `settings` and run the calculation.
    pub fn run(&self, settings: &PlanningSettings) -> PlanResult<PlanningResult> {
        let params = self.resolved_params(settings)?;
        debug!(design = self.design.label(), alpha = params.alpha, power = params.power, "planning request");
        plan_with_settings(&params, &self.design, settings)
    }
}
