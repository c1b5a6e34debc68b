//! Configuration for the tracker, the traverser and the session facade.

use provenance_types::Application;
use serde::{Deserialize, Serialize};

use crate::error::{ProvenanceError, Result};
use crate::telemetry::TracingConfig;

/// Tracker configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Recorded as `createdBy` on every node the tracker creates
    pub username: String,
    /// Capture a screenshot for each new node when a provider is attached
    pub auto_screenshot: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            username: "Unknown".to_string(),
            auto_screenshot: false,
        }
    }
}

impl TrackerConfig {
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn with_auto_screenshot(mut self, enabled: bool) -> Self {
        self.auto_screenshot = enabled;
        self
    }
}

/// Traverser configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraverserConfig {
    /// Keep the tracker accepting actions while do/undo functions replay.
    ///
    /// When `false`, actions applied re-entrantly by replayed functions are
    /// ignored instead of growing the tree.
    pub tracking_when_traversing: bool,
}

impl TraverserConfig {
    pub fn with_tracking_when_traversing(mut self, enabled: bool) -> Self {
        self.tracking_when_traversing = enabled;
        self
    }
}

/// Complete configuration for a provenance session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvenanceConfig {
    pub application: Application,
    pub tracker: TrackerConfig,
    pub traverser: TraverserConfig,
    pub tracing: TracingConfig,
}

impl ProvenanceConfig {
    pub fn new(application: Application) -> Self {
        Self {
            application,
            ..Default::default()
        }
    }

    /// Parse a JSON document; missing sections take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tracker.username.trim().is_empty() {
            return Err(ProvenanceError::Config("tracker.username must not be empty".into()));
        }
        Ok(())
    }

    pub fn with_tracker(mut self, tracker: TrackerConfig) -> Self {
        self.tracker = tracker;
        self
    }

    pub fn with_traverser(mut self, traverser: TraverserConfig) -> Self {
        self.traverser = traverser;
        self
    }
}
