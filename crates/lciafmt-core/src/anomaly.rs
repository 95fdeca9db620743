//! Non-fatal data-quality findings
//!
//! Pipeline stages never abort on these; they return them alongside a
//! best-effort result and log each one at warn level.

use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Anomaly {
    /// No mapping entry matched the flow
    #[error("No mapping for flow '{flowable}' in context '{context}'")]
    UnmappedFlow { flowable: String, context: String },

    /// The unit does not name a known flow property
    #[error("Could not infer flow property for unit '{unit}'")]
    FlowPropertyInferenceFailure { unit: String },

    /// Several factors for one (method, indicator, flow) with different values
    #[error(
        "Conflicting factors for flow '{flow_uuid}' in '{method}' / '{indicator}': {values:?}"
    )]
    DuplicateFactorConflict {
        method: String,
        indicator: String,
        flow_uuid: String,
        values: Vec<f64>,
    },
}

impl Anomaly {
    pub fn log(&self) {
        warn!("{}", self);
    }
}
