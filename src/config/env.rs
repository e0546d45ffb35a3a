// src/config/env.rs
// Environment-based configuration - single source of truth for all env vars

use crate::error::{Result, ScalpError};
use crate::governor::GovernorConfig;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default model for strategy critiques and idea generation
pub const DEFAULT_ANALYSIS_MODEL: &str = "gemini-3-pro-preview";
/// Default model for live signal scans
pub const DEFAULT_SIGNAL_MODEL: &str = "gemini-3-flash-preview";
/// Default pause between automatic scans
pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_secs(15);

/// API keys loaded from environment variables
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    /// Gemini key (GEMINI_API_KEY, GOOGLE_API_KEY or API_KEY)
    pub gemini: Option<String>,
}

impl ApiKeys {
    /// Load API keys from environment variables
    ///
    /// Set `SCALP_DISABLE_LLM=1` to drop the key (every AI action then
    /// reports a missing key without contacting the service)
    pub fn from_env() -> Self {
        if parse_bool_env("SCALP_DISABLE_LLM").unwrap_or(false) {
            info!("SCALP_DISABLE_LLM is set - AI calls disabled");
            return Self::default();
        }

        let gemini = Self::read_key("GEMINI_API_KEY")
            .or_else(|| Self::read_key("GOOGLE_API_KEY"))
            .or_else(|| Self::read_key("API_KEY"));

        let keys = Self { gemini };
        if keys.has_llm_provider() {
            debug!("Gemini API key loaded");
        } else {
            warn!("No Gemini API key configured - AI features will be unavailable");
        }
        keys
    }

    /// Read a single API key from environment, filtering empty values
    fn read_key(name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|k| !k.trim().is_empty())
    }

    pub fn has_llm_provider(&self) -> bool {
        self.gemini.is_some()
    }
}

/// Model identifiers per call site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    /// SCALP_ANALYSIS_MODEL
    pub analysis: String,
    /// SCALP_SIGNAL_MODEL
    pub signal: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            analysis: DEFAULT_ANALYSIS_MODEL.to_string(),
            signal: DEFAULT_SIGNAL_MODEL.to_string(),
        }
    }
}

impl ModelConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            analysis: read_non_empty("SCALP_ANALYSIS_MODEL").unwrap_or(defaults.analysis),
            signal: read_non_empty("SCALP_SIGNAL_MODEL").unwrap_or(defaults.signal),
        }
    }
}

/// Configuration validation result
#[derive(Debug)]
pub struct ConfigValidation {
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl Default for ConfigValidation {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigValidation {
    pub fn new() -> Self {
        Self {
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    pub fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    /// `Config` error listing every validation error, if any
    pub fn into_result(self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(ScalpError::Config(self.errors.join("; ")))
        }
    }

    /// Format as a human-readable report
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        if !self.errors.is_empty() {
            lines.push("Errors:".to_string());
            for err in &self.errors {
                lines.push(format!("  - {}", err));
            }
        }

        if !self.warnings.is_empty() {
            lines.push("Warnings:".to_string());
            for warn in &self.warnings {
                lines.push(format!("  - {}", warn));
            }
        }

        if lines.is_empty() {
            "Configuration OK".to_string()
        } else {
            lines.join("\n")
        }
    }
}

/// Environment configuration - all env vars in one place
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub api_keys: ApiKeys,
    pub models: ModelConfig,
    /// SCALP_MIN_REQUEST_GAP_MS / SCALP_COOLDOWN_MS
    pub governor: GovernorConfig,
    /// SCALP_SCAN_INTERVAL_SECS
    pub scan_interval: Duration,
}

impl EnvConfig {
    /// Load all environment configuration (call once at startup)
    pub fn load() -> Self {
        info!("Loading environment configuration");

        let defaults = GovernorConfig::default();
        let governor = GovernorConfig {
            min_request_gap: duration_ms_env("SCALP_MIN_REQUEST_GAP_MS")
                .unwrap_or(defaults.min_request_gap),
            cooldown_period: duration_ms_env("SCALP_COOLDOWN_MS")
                .unwrap_or(defaults.cooldown_period),
        };

        let scan_interval = read_non_empty("SCALP_SCAN_INTERVAL_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_SCAN_INTERVAL);

        Self {
            api_keys: ApiKeys::from_env(),
            models: ModelConfig::from_env(),
            governor,
            scan_interval,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigValidation {
        let mut validation = ConfigValidation::new();

        if !self.api_keys.has_llm_provider() {
            validation.add_warning(
                "No Gemini API key configured. Set GEMINI_API_KEY (or GOOGLE_API_KEY / API_KEY).",
            );
        }

        if self.governor.min_request_gap.is_zero() {
            validation.add_warning(
                "SCALP_MIN_REQUEST_GAP_MS is 0 - requests will not be spaced apart.",
            );
        }

        if self.governor.cooldown_period.is_zero() {
            validation.add_error(
                "SCALP_COOLDOWN_MS is 0 - rate-limit failures would never pause AI calls.",
            );
        }

        if self.scan_interval < self.governor.min_request_gap {
            validation.add_warning(format!(
                "Scan interval ({}s) is shorter than the request gap ({}ms); scans will queue.",
                self.scan_interval.as_secs(),
                self.governor.min_request_gap.as_millis()
            ));
        }

        validation
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            api_keys: ApiKeys::default(),
            models: ModelConfig::default(),
            governor: GovernorConfig::default(),
            scan_interval: DEFAULT_SCAN_INTERVAL,
        }
    }
}

fn read_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

fn duration_ms_env(name: &str) -> Option<Duration> {
    let value = read_non_empty(name)?;
    let parsed = parse_duration_ms(&value);
    if parsed.is_none() {
        warn!(name, value = %value, "Ignoring invalid millisecond value");
    }
    parsed
}

/// Parse a whole number of milliseconds
pub fn parse_duration_ms(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_millis)
}

fn parse_bool_env(name: &str) -> Option<bool> {
    parse_bool(&std::env::var(name).ok()?)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
