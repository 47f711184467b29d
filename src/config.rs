//! Reorganizer configuration.
//!
//! The default configuration accepts any batch. Limits are opt-in, for
//! callers that want to refuse pathological bulk imports before any work is
//! done. They are read once when a [`crate::BundleReorganizer`] is built and
//! never change during a call.
//!
//! ## Environment
//!
//! - `BUNDLE_REORG_MAX_BATCH_SIZE`: maximum records per batch (default: unlimited)
//! - `BUNDLE_REORG_MAX_EDGES`: maximum dependency edges per batch (default: unlimited)

use serde::{Deserialize, Serialize};

/// Environment variable overriding [`ReorganizerConfig::max_batch_size`].
pub const MAX_BATCH_SIZE_ENV: &str = "BUNDLE_REORG_MAX_BATCH_SIZE";
/// Environment variable overriding [`ReorganizerConfig::max_edges`].
pub const MAX_EDGES_ENV: &str = "BUNDLE_REORG_MAX_EDGES";

const GUARDED_MAX_BATCH_SIZE: usize = 100_000;
const GUARDED_MAX_EDGES: usize = 1_000_000;

/// Limits applied to every reorganization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorganizerConfig {
    /// Maximum records accepted in one batch.
    pub max_batch_size: usize,
    /// Maximum in-batch dependency edges accepted in one batch.
    pub max_edges: usize,
}

impl Default for ReorganizerConfig {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl ReorganizerConfig {
    /// No limits at all. This is the default.
    pub fn unbounded() -> Self {
        Self {
            max_batch_size: usize::MAX,
            max_edges: usize::MAX,
        }
    }

    /// 100_000 records and 1_000_000 edges per batch.
    ///
    /// For services that take batches from untrusted producers.
    pub fn guarded() -> Self {
        Self {
            max_batch_size: GUARDED_MAX_BATCH_SIZE,
            max_edges: GUARDED_MAX_EDGES,
        }
    }

    /// Defaults, overridden by any well-formed environment variables.
    ///
    /// Unset or unparsable variables fall back to the default with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            max_batch_size: read_limit(&lookup, MAX_BATCH_SIZE_ENV, defaults.max_batch_size),
            max_edges: read_limit(&lookup, MAX_EDGES_ENV, defaults.max_edges),
        }
    }
}

fn read_limit(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: usize) -> usize {
    let Some(raw) = lookup(name) else {
        return default;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(variable = name, value = %raw, default, "Ignoring unparsable limit");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_is_unbounded() {
        let config = ReorganizerConfig::default();
        assert_eq!(config.max_batch_size, usize::MAX);
        assert_eq!(config.max_edges, usize::MAX);
        assert_eq!(config, ReorganizerConfig::unbounded());
    }

    #[test]
    fn test_guarded_preset() {
        let config = ReorganizerConfig::guarded();
        assert_eq!(config.max_batch_size, 100_000);
        assert_eq!(config.max_edges, 1_000_000);
    }

    #[test]
    fn test_lookup_overrides() {
        let vars: HashMap<&str, &str> = [(MAX_BATCH_SIZE_ENV, " 250 ")].into_iter().collect();
        let config = ReorganizerConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.max_batch_size, 250);
        assert_eq!(config.max_edges, usize::MAX);
    }

    #[test]
    fn test_unparsable_value_falls_back() {
        let config = ReorganizerConfig::from_lookup(|name| {
            (name == MAX_EDGES_ENV).then(|| "lots".to_string())
        });
        assert_eq!(config, ReorganizerConfig::default());
    }
}
