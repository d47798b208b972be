//! Application state for the SLD API.

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusHandle;

use sld_protocol::{MarshalContext, SldEncoder};

use crate::config::ServiceConfig;

/// Shared application state.
pub struct AppState {
    /// Context every document is marshalled with. Read-only after startup.
    pub context: MarshalContext,

    pub config: ServiceConfig,

    /// Prometheus recorder handle, absent when no recorder is installed.
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            context: config.marshal_context(),
            config,
            prometheus: None,
        }
    }

    /// Load configuration from `path` and build the state.
    pub fn from_config_file(path: &str) -> Result<Self> {
        Ok(Self::new(ServiceConfig::load_from_file(path)?))
    }

    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }

    pub fn encoder(&self) -> SldEncoder<'_> {
        SldEncoder::new(&self.context)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(ServiceConfig::default())
    }
}
