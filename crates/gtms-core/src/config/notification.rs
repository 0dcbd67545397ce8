//! Notification listing configuration.

use serde::{Deserialize, Serialize};

/// Language used for display labels returned alongside notifications.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// Thai.
    #[default]
    Th,
    /// English.
    En,
}

/// Notification list and history settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Rows returned by the inbox when no limit is given.
    #[serde(default = "default_list_limit")]
    pub default_list_limit: u32,
    /// Largest limit the inbox accepts.
    #[serde(default = "default_max_list_limit")]
    pub max_list_limit: u32,
    /// Page size of the history search when none is given.
    #[serde(default = "default_history_page_size")]
    pub history_page_size: u64,
    /// Largest page size the history search accepts.
    #[serde(default = "default_max_history_page_size")]
    pub max_history_page_size: u64,
    /// Display label language.
    #[serde(default)]
    pub locale: Locale,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            default_list_limit: default_list_limit(),
            max_list_limit: default_max_list_limit(),
            history_page_size: default_history_page_size(),
            max_history_page_size: default_max_history_page_size(),
            locale: Locale::default(),
        }
    }
}

fn default_list_limit() -> u32 {
    50
}

fn default_max_list_limit() -> u32 {
    1000
}

fn default_history_page_size() -> u64 {
    20
}

fn default_max_history_page_size() -> u64 {
    100
}
