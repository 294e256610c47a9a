//! Engine configuration loaded from environment variables.

use firecheck_checklist::MergeKey;

pub const MERGE_KEY_VAR: &str = "FIRECHECK_MERGE_KEY";
pub const UPLOAD_CONCURRENCY_VAR: &str = "FIRECHECK_UPLOAD_CONCURRENCY";
pub const PHOTO_PREFIX_VAR: &str = "FIRECHECK_PHOTO_PREFIX";
pub const REPORTING_VAR: &str = "FIRECHECK_REPORTING";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// How template, previous and session nodes are matched.
    pub merge_key: MergeKey,
    /// Upper bound on concurrent per-item photo uploads.
    pub upload_concurrency: usize,
    /// Leading segment of blob path hints.
    pub photo_prefix: String,
    /// Deliver the defect summary to the reporting sink after each submission.
    pub reporting_enabled: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            merge_key: MergeKey::Id,
            upload_concurrency: 4,
            photo_prefix: "inventories".to_string(),
            reporting_enabled: true,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; malformed values fall back to defaults with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let merge_key = match lookup(MERGE_KEY_VAR).as_deref().map(str::trim) {
            None => defaults.merge_key,
            Some(v) if v.eq_ignore_ascii_case("id") => MergeKey::Id,
            Some(v) if v.eq_ignore_ascii_case("position") => MergeKey::Position,
            Some(other) => {
                tracing::warn!("{MERGE_KEY_VAR}={other:?} not recognised; using id matching");
                defaults.merge_key
            }
        };

        let upload_concurrency = match lookup(UPLOAD_CONCURRENCY_VAR) {
            None => defaults.upload_concurrency,
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    tracing::warn!(
                        "{UPLOAD_CONCURRENCY_VAR}={raw:?} is not a positive integer; using {}",
                        defaults.upload_concurrency
                    );
                    defaults.upload_concurrency
                }
            },
        };

        let photo_prefix = lookup(PHOTO_PREFIX_VAR)
            .map(|p| p.trim().trim_matches('/').to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or(defaults.photo_prefix);

        let reporting_enabled = match lookup(REPORTING_VAR).as_deref().map(str::trim) {
            None => defaults.reporting_enabled,
            Some("1") | Some("true") | Some("yes") => true,
            Some("0") | Some("false") | Some("no") => false,
            Some(other) => {
                tracing::warn!("{REPORTING_VAR}={other:?} not recognised; reporting stays enabled");
                defaults.reporting_enabled
            }
        };

        Self {
            merge_key,
            upload_concurrency,
            photo_prefix,
            reporting_enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(EngineConfig::from_lookup(|_| None), EngineConfig::default());
    }

    #[test]
    fn reads_every_variable() {
        let config = EngineConfig::from_lookup(lookup(&[
            (MERGE_KEY_VAR, "Position"),
            (UPLOAD_CONCURRENCY_VAR, "8"),
            (PHOTO_PREFIX_VAR, "/fleet/photos/"),
            (REPORTING_VAR, "no"),
        ]));
        assert_eq!(config.merge_key, MergeKey::Position);
        assert_eq!(config.upload_concurrency, 8);
        assert_eq!(config.photo_prefix, "fleet/photos");
        assert!(!config.reporting_enabled);
    }

    #[test]
    fn malformed_values_fall_back() {
        let config = EngineConfig::from_lookup(lookup(&[
            (MERGE_KEY_VAR, "name"),
            (UPLOAD_CONCURRENCY_VAR, "0"),
            (PHOTO_PREFIX_VAR, "  "),
            (REPORTING_VAR, "maybe"),
        ]));
        assert_eq!(config, EngineConfig::default());
    }
}
