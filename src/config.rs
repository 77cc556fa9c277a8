//! Analysis configuration.
//!
//! Every field has a default, so a configuration file only needs the keys it
//! overrides:
//!
//! ```toml
//! period = 4
//! missing_values = "interpolate"
//!
//! [adf]
//! lag_selection = "bic"
//!
//! [heuristics]
//! irregularity_threshold = 2.5
//! ```

use crate::core::MissingValuePolicy;
use crate::diagnostics::HeuristicConfig;
use crate::error::{AnalysisError, Result};
use crate::seasonality::DecompositionModel;
use crate::validation::AdfConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Settings for one analysis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Seasonal period of the decomposition.
    pub period: usize,
    /// Largest ACF/PACF lag; `min(n - 1, 40)` when unset.
    pub max_lag: Option<usize>,
    pub adf: AdfConfig,
    pub heuristics: HeuristicConfig,
    pub missing_values: MissingValuePolicy,
    pub model: DecompositionModel,
    /// Run the independent components on the rayon pool.
    pub parallel: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            period: 12,
            max_lag: None,
            adf: AdfConfig::default(),
            heuristics: HeuristicConfig::default(),
            missing_values: MissingValuePolicy::Error,
            model: DecompositionModel::Additive,
            parallel: true,
        }
    }
}

impl AnalysisConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_period(mut self, period: usize) -> Self {
        self.period = period;
        self
    }

    pub fn with_max_lag(mut self, max_lag: usize) -> Self {
        self.max_lag = Some(max_lag);
        self
    }

    pub fn with_adf(mut self, adf: AdfConfig) -> Self {
        self.adf = adf;
        self
    }

    pub fn with_heuristics(mut self, heuristics: HeuristicConfig) -> Self {
        self.heuristics = heuristics;
        self
    }

    pub fn with_missing_values(mut self, policy: MissingValuePolicy) -> Self {
        self.missing_values = policy;
        self
    }

    pub fn with_model(mut self, model: DecompositionModel) -> Self {
        self.model = model;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Reject settings no analysis could run with.
    pub fn validate(&self) -> Result<()> {
        if self.period < 2 {
            return Err(AnalysisError::InvalidParameter(format!(
                "period must be at least 2, got {}",
                self.period
            )));
        }
        self.adf.validate()?;
        self.heuristics.validate()?;
        Ok(())
    }

    /// Load a TOML or JSON file; the format follows the file extension.
    ///
    /// Missing keys take their defaults. The loaded configuration is validated.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path))
            .build()?;

        let loaded: AnalysisConfig = settings.try_deserialize()?;
        loaded.validate()?;

        debug!(path = %path.display(), config = ?loaded, "loaded analysis configuration");
        Ok(loaded)
    }
}
