//! Validation runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the validator behind an
//! `Arc`. The validator never reads environment variables or other process-wide state while a
//! visit is being checked, so tests can run validators with different policies side by side.

use crate::constants::DEFAULT_VOID_REASON_MAX_LENGTH;
use crate::{VisitError, VisitResult};
use serde::{Deserialize, Serialize};

/// Policy knobs consulted by [`crate::VisitValidator`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationConfig {
    allow_overlapping_visits: bool,
    void_reason_max_length: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            allow_overlapping_visits: false,
            void_reason_max_length: DEFAULT_VOID_REASON_MAX_LENGTH,
        }
    }
}

impl ValidationConfig {
    /// Create a new `ValidationConfig`.
    ///
    /// # Errors
    ///
    /// Returns `VisitError::InvalidInput` if `void_reason_max_length` is zero.
    pub fn new(allow_overlapping_visits: bool, void_reason_max_length: usize) -> VisitResult<Self> {
        if void_reason_max_length == 0 {
            return Err(VisitError::InvalidInput(
                "void_reason_max_length must be greater than zero".into(),
            ));
        }

        Ok(Self {
            allow_overlapping_visits,
            void_reason_max_length,
        })
    }

    /// Parse configuration from YAML, filling omitted keys with defaults.
    pub fn from_yaml_str(yaml_text: &str) -> VisitResult<Self> {
        let cfg: Self = serde_yaml::from_str(yaml_text).map_err(VisitError::YamlDeserialization)?;
        Self::new(cfg.allow_overlapping_visits, cfg.void_reason_max_length)
    }

    /// Resolve configuration from raw environment values.
    ///
    /// Callers read the variables (see [`crate::constants`]) and hand the values in, keeping this
    /// function free of process-wide state.
    pub fn from_env_values(
        allow_overlapping_visits: Option<String>,
        void_reason_max_length: Option<String>,
    ) -> VisitResult<Self> {
        Self::new(
            allow_overlapping_visits_from_env_value(allow_overlapping_visits)?,
            void_reason_max_length_from_env_value(void_reason_max_length)?,
        )
    }

    pub fn allow_overlapping_visits(&self) -> bool {
        self.allow_overlapping_visits
    }

    pub fn void_reason_max_length(&self) -> usize {
        self.void_reason_max_length
    }

    /// Returns a copy with the overlap policy replaced.
    pub fn with_allow_overlapping_visits(mut self, allow: bool) -> Self {
        self.allow_overlapping_visits = allow;
        self
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse the overlap policy from an optional string value.
///
/// If `value` is `None` or empty/whitespace, overlapping visits are disallowed.
pub fn allow_overlapping_visits_from_env_value(value: Option<String>) -> VisitResult<bool> {
    match non_blank(value) {
        None => Ok(false),
        Some(v) => match v.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(VisitError::InvalidInput(format!(
                "allow overlapping visits must be a boolean, got '{v}'"
            ))),
        },
    }
}

/// Parse the `voidReason` length limit from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_VOID_REASON_MAX_LENGTH`].
pub fn void_reason_max_length_from_env_value(value: Option<String>) -> VisitResult<usize> {
    match non_blank(value) {
        None => Ok(DEFAULT_VOID_REASON_MAX_LENGTH),
        Some(v) => v.parse::<usize>().map_err(|_| {
            VisitError::InvalidInput(format!(
                "void reason max length must be a positive integer, got '{v}'"
            ))
        }),
    }
}
