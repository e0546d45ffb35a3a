// src/advisor/signal.rs
// Trade signal parsed from a model's free-text answer

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::LazyLock;
use strum::{Display, EnumString};

/// Take profit used when the model omits one
pub const DEFAULT_TP_PERCENT: f64 = 0.15;
/// Stop loss used when the model omits one
pub const DEFAULT_SL_PERCENT: f64 = 0.1;

static SIGNAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)SIGNAL:\s*(BUY|SELL|HOLD)").expect("valid regex"));
static CONFIDENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)CONFIDENCE:\s*(HIGH|MEDIUM|LOW)").expect("valid regex"));
static TP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)TP_PERCENT:\s*([\d.]+)").expect("valid regex"));
static SL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)SL_PERCENT:\s*([\d.]+)").expect("valid regex"));
static REASON_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)REASON:\s*(.*)").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
    Hold,
    /// No decision could be requested (no credential configured); never
    /// produced by parsing
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// Entry decision for one scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeSignal {
    pub signal: Signal,
    pub confidence: Confidence,
    /// Take profit, percent move from entry
    pub tp_percent: f64,
    /// Stop loss, percent move from entry
    pub sl_percent: f64,
    pub reasoning: String,
    /// Set when the scan was refused or failed because of rate limiting
    #[serde(default)]
    pub is_rate_limited: bool,
}

impl TradeSignal {
    /// Parse the `SIGNAL: / CONFIDENCE: / TP_PERCENT: / SL_PERCENT: / REASON:`
    /// answer format. Missing or malformed fields fall back to a low
    /// confidence HOLD with the default exits.
    pub fn parse(text: &str) -> Self {
        let capture = |re: &Regex| {
            re.captures(text)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string())
        };

        Self {
            signal: capture(&SIGNAL_RE)
                .and_then(|s| Signal::from_str(&s).ok())
                .unwrap_or(Signal::Hold),
            confidence: capture(&CONFIDENCE_RE)
                .and_then(|s| Confidence::from_str(&s).ok())
                .unwrap_or(Confidence::Low),
            tp_percent: capture(&TP_RE)
                .and_then(|s| parse_percent(&s))
                .unwrap_or(DEFAULT_TP_PERCENT),
            sl_percent: capture(&SL_RE)
                .and_then(|s| parse_percent(&s))
                .unwrap_or(DEFAULT_SL_PERCENT),
            reasoning: capture(&REASON_RE)
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| "Monitoring...".to_string()),
            is_rate_limited: false,
        }
    }

    /// HOLD with zeroed exits, used when no answer could be obtained
    pub fn hold(reasoning: impl Into<String>, is_rate_limited: bool) -> Self {
        Self {
            signal: Signal::Hold,
            confidence: Confidence::Low,
            tp_percent: 0.0,
            sl_percent: 0.0,
            reasoning: reasoning.into(),
            is_rate_limited,
        }
    }

    /// ERROR signal with the default exits, used when the service was never
    /// asked
    pub fn unavailable(reasoning: impl Into<String>) -> Self {
        Self {
            signal: Signal::Error,
            confidence: Confidence::Low,
            tp_percent: DEFAULT_TP_PERCENT,
            sl_percent: DEFAULT_SL_PERCENT,
            reasoning: reasoning.into(),
            is_rate_limited: false,
        }
    }

    /// True for BUY or SELL
    pub fn opens_position(&self) -> bool {
        matches!(self.signal, Signal::Buy | Signal::Sell)
    }
}

/// Leading float of a `[\d.]+` capture ("0.25." -> 0.25)
fn parse_percent(raw: &str) -> Option<f64> {
    let raw = raw.trim_end_matches('.');
    let end = raw
        .char_indices()
        .filter(|(_, c)| *c == '.')
        .nth(1)
        .map(|(i, _)| i)
        .unwrap_or(raw.len());
    raw[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}
