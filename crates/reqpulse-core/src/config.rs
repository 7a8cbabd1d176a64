//! Configuration for the request monitor.
//!
//! Use the builder pattern to customize behavior:
//!
//! ```
//! use reqpulse_core::{CaseRule, MonitorConfig};
//!
//! let config = MonitorConfig::new()
//!     .sensitive_param("api_key")
//!     .case_rule(CaseRule::Insensitive);
//! assert!(config.validate().is_ok());
//! ```

use crate::error::ConfigError;
use std::collections::HashSet;

/// Default token substituted for masked parameter values.
pub const DEFAULT_MASK_TOKEN: &str = "*******";

/// How sensitive parameter names are matched against query-string keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseRule {
    /// Keys must match a sensitive name exactly.
    #[default]
    Sensitive,
    /// Keys match sensitive names ignoring ASCII case.
    Insensitive,
}

/// Configuration for a [`crate::RequestMonitor`].
///
/// The config is immutable once the monitor is built; re-wiring a new
/// monitor makes changes visible to the next dispatched request.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Query-string keys whose values are masked before leaving the core.
    pub(crate) sensitive_params: HashSet<String>,

    /// Case rule applied when matching sensitive keys.
    pub(crate) case_rule: CaseRule,

    /// Fixed-length token substituted for masked values.
    pub(crate) mask_token: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl MonitorConfig {
    /// Create a configuration with default values.
    ///
    /// Defaults:
    /// - Sensitive parameters: `password`
    /// - Case rule: [`CaseRule::Sensitive`]
    /// - Mask token: `*******`
    pub fn new() -> Self {
        let mut sensitive = HashSet::new();
        sensitive.insert("password".to_string());

        Self {
            sensitive_params: sensitive,
            case_rule: CaseRule::Sensitive,
            mask_token: DEFAULT_MASK_TOKEN.to_string(),
        }
    }

    /// Add a query-string key to the sensitive set.
    pub fn sensitive_param(mut self, name: impl Into<String>) -> Self {
        self.sensitive_params.insert(name.into());
        self
    }

    /// Replace the sensitive set wholesale.
    pub fn sensitive_params(
        mut self,
        names: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.sensitive_params = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the case rule for sensitive-key matching.
    pub fn case_rule(mut self, rule: CaseRule) -> Self {
        self.case_rule = rule;
        self
    }

    /// Override the mask token.
    pub fn mask_token(mut self, token: impl Into<String>) -> Self {
        self.mask_token = token.into();
        self
    }

    /// Validate the configuration.
    ///
    /// Called by [`crate::RequestMonitor::new`]; exposed for callers that
    /// want to fail fast at composition time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mask_token.is_empty() {
            return Err(ConfigError::EmptyMaskToken);
        }
        for name in &self.sensitive_params {
            if name.is_empty() {
                return Err(ConfigError::EmptySensitiveName);
            }
        }
        if self.is_sensitive_key(&self.mask_token) {
            return Err(ConfigError::MaskTokenCollision(self.mask_token.clone()));
        }
        Ok(())
    }

    /// Whether a query-string key is subject to masking.
    pub fn is_sensitive_key(&self, key: &str) -> bool {
        match self.case_rule {
            CaseRule::Sensitive => self.sensitive_params.contains(key),
            CaseRule::Insensitive => self
                .sensitive_params
                .iter()
                .any(|name| name.eq_ignore_ascii_case(key)),
        }
    }

    /// The token substituted for masked values.
    pub fn mask_token_str(&self) -> &str {
        &self.mask_token
    }
}
