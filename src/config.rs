//! # Runtime configuration and widget specifications.
//!
//! Provides [`ManagerConfig`] (settings for the lifecycle manager) and
//! [`WidgetSpec`] (one configured widget, as delivered by the host's config parser).
//!
//! ## Sentinel values
//! - `exit_grace = 0s` → no wait at all, every worker still running at shutdown is aborted
//! - `bus_capacity = 0` → clamped to 1 by the bus

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::error::ConfigError;

/// Configuration for the [`LifecycleManager`](crate::LifecycleManager).
///
/// ## Field semantics
/// - `exit_grace`: how long the shutdown coordinator waits for **each** widget to confirm its exit
/// - `bus_capacity`: event bus ring buffer size (min 1)
/// - `module_dir`: directory searched for `libwidget_<name>` shared modules (`dylib` feature only)
#[derive(Clone, Debug)]
pub struct ManagerConfig {
    /// Per-widget exit budget applied sequentially during shutdown.
    ///
    /// Worst case shutdown duration is roughly `exit_grace × widget count`.
    pub exit_grace: Duration,

    /// Capacity of the event bus broadcast channel.
    pub bus_capacity: usize,

    /// Installation directory for shared widget modules.
    pub module_dir: Option<PathBuf>,
}

impl ManagerConfig {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for ManagerConfig {
    /// Default configuration:
    ///
    /// - `exit_grace = 2s`
    /// - `bus_capacity = 256`
    /// - `module_dir = None`
    fn default() -> Self {
        Self {
            exit_grace: Duration::from_secs(2),
            bus_capacity: 256,
            module_dir: None,
        }
    }
}

/// One configured widget: which module to run and the configuration lent to it.
///
/// ## Example
/// ```rust
/// use serde_json::json;
/// use widgetvisor::WidgetSpec;
///
/// let spec = WidgetSpec::new("volume", json!({ "step": 5 }));
/// assert_eq!(spec.module, "volume");
/// assert!(spec.name.is_none());
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct WidgetSpec {
    /// Module name, resolved by the module loader.
    pub module: String,

    /// Explicit widget name; defaults to the module name.
    #[serde(default)]
    pub name: Option<String>,

    /// Opaque per-widget configuration.
    #[serde(default)]
    pub config: Value,
}

impl WidgetSpec {
    /// Creates a spec for `module` with the given configuration.
    pub fn new(module: impl Into<String>, config: Value) -> Self {
        Self {
            module: module.into(),
            name: None,
            config,
        }
    }

    /// Returns the spec with an explicit widget name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Name the widget is known by before de-duplication.
    pub fn base_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.module)
    }

    /// Extracts the ordered widget list from a bar configuration document.
    ///
    /// Reads the top-level `"widgets"` array; a document without one yields an empty list.
    ///
    /// ```rust
    /// use serde_json::json;
    /// use widgetvisor::WidgetSpec;
    ///
    /// let bar = json!({
    ///     "widgets": [
    ///         { "module": "volume", "config": {} },
    ///         { "module": "clock" }
    ///     ]
    /// });
    /// let specs = WidgetSpec::list_from_bar_config(&bar).unwrap();
    /// assert_eq!(specs.len(), 2);
    /// assert_eq!(specs[1].module, "clock");
    /// ```
    pub fn list_from_bar_config(bar: &Value) -> Result<Vec<WidgetSpec>, ConfigError> {
        let widgets = match bar.get("widgets") {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Array(items)) => items,
            Some(_) => return Err(ConfigError::NotAnArray),
        };

        widgets
            .iter()
            .enumerate()
            .map(|(index, item)| {
                WidgetSpec::deserialize(item)
                    .map_err(|source| ConfigError::InvalidEntry { index, source })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_grace_is_two_seconds() {
        let cfg = ManagerConfig::default();
        assert_eq!(cfg.exit_grace, Duration::from_secs(2));
        assert_eq!(ManagerConfig { bus_capacity: 0, ..cfg }.bus_capacity_clamped(), 1);
    }

    #[test]
    fn missing_widgets_array_is_empty() {
        assert!(WidgetSpec::list_from_bar_config(&json!({})).unwrap().is_empty());
    }

    #[test]
    fn widgets_must_be_an_array() {
        let err = WidgetSpec::list_from_bar_config(&json!({ "widgets": "volume" })).unwrap_err();
        assert!(matches!(err, ConfigError::NotAnArray));
    }

    #[test]
    fn entry_without_module_is_rejected() {
        let bar = json!({ "widgets": [ { "module": "volume" }, { "config": {} } ] });
        let err = WidgetSpec::list_from_bar_config(&bar).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEntry { index: 1, .. }));
    }

    #[test]
    fn explicit_name_wins() {
        let bar = json!({ "widgets": [ { "module": "volume", "name": "speakers", "config": { "card": 1 } } ] });
        let specs = WidgetSpec::list_from_bar_config(&bar).unwrap();
        assert_eq!(specs[0].base_name(), "speakers");
        assert_eq!(specs[0].config, json!({ "card": 1 }));
    }
}
