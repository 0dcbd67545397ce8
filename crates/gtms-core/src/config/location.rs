//! Location trigger configuration.

use serde::{Deserialize, Serialize};

/// How often a geofence may fire while the user stays inside it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefirePolicy {
    /// Fire on every location report inside the radius.
    #[default]
    Always,
    /// Fire once per boundary crossing that matches the trigger mode.
    OncePerEntry,
}

/// Location reminder settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Refire policy for geofence reminders.
    #[serde(default)]
    pub refire_policy: RefirePolicy,
    /// Radius used when a reminder is created without one, in metres.
    #[serde(default = "default_radius")]
    pub default_radius_meters: f64,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            refire_policy: RefirePolicy::default(),
            default_radius_meters: default_radius(),
        }
    }
}

fn default_radius() -> f64 {
    100.0
}
