// src/advisor/mod.rs
// AI strategy advisor - critique, idea generation and live signal scans
//
// Every call goes through the shared request governor. Each call site turns
// its failures into user-facing text; nothing here retries.

pub mod prompts;
pub mod signal;

pub use signal::{Confidence, Signal, TradeSignal};

use crate::config::ModelConfig;
use crate::error::{Result, ScalpError};
use crate::governor::RequestGovernor;
use crate::llm::{GenerationRequest, TextGenerator};
use crate::strategy::Strategy;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Shown instead of calling the service when no key is configured
pub const MISSING_KEY_MESSAGE: &str = "API key missing.";

/// Result of a scan request from the live terminal
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// Refused before submission; the value is the remaining cooldown in seconds
    CoolingDown(u64),
    Signal(TradeSignal),
}

/// Strategy advisor backed by a text generator and the request governor
pub struct StrategyAdvisor {
    governor: Arc<RequestGovernor>,
    generator: Option<Arc<dyn TextGenerator>>,
    models: ModelConfig,
}

impl StrategyAdvisor {
    /// `generator` is `None` when no credential is configured; every action
    /// then short-circuits with a missing-key message.
    pub fn new(
        governor: Arc<RequestGovernor>,
        generator: Option<Arc<dyn TextGenerator>>,
        models: ModelConfig,
    ) -> Self {
        Self {
            governor,
            generator,
            models,
        }
    }

    pub fn governor(&self) -> &Arc<RequestGovernor> {
        &self.governor
    }

    /// Remaining cooldown in whole seconds (0 when idle)
    pub fn cooldown_secs(&self) -> u64 {
        self.governor.remaining_cooldown_secs()
    }

    /// Whether AI actions should be offered right now
    pub fn actions_enabled(&self) -> bool {
        self.cooldown_secs() == 0
    }

    /// Run one prompt through the governor
    pub async fn complete(&self, model: &str, prompt: String) -> Result<String> {
        let Some(generator) = self.generator.as_ref() else {
            return Err(ScalpError::MissingCredential("GEMINI_API_KEY".to_string()));
        };

        let request = GenerationRequest::new(model, prompt);
        let text = self
            .governor
            .submit(|| generator.generate(&request))
            .await?;
        Ok(text)
    }

    /// Critique a strategy: logic breakdown, risks and one advanced tip
    pub async fn analyze_strategy(&self, strategy: &Strategy) -> String {
        info!(strategy = %strategy.name, "Analyzing strategy");
        let prompt = prompts::strategy_critique(strategy);

        match self.complete(&self.models.analysis, prompt).await {
            Ok(text) if text.trim().is_empty() => "Analysis unavailable.".to_string(),
            Ok(text) => text,
            Err(err) => failure_message(
                &err,
                "Quota limited. Please wait a moment before re-auditing.",
                "Analysis failed. Please try again.",
            ),
        }
    }

    /// Ask for a fresh scalping strategy concept (Markdown)
    pub async fn generate_strategy_idea(&self) -> String {
        info!("Generating strategy idea");

        match self
            .complete(&self.models.analysis, prompts::STRATEGY_IDEA_PROMPT.to_string())
            .await
        {
            Ok(text) if text.trim().is_empty() => "Generation failed.".to_string(),
            Ok(text) => text,
            Err(err) => failure_message(
                &err,
                "API busy. Strategy generation is currently throttled.",
                "Generation failed. Please try again.",
            ),
        }
    }

    /// Ask the signal model for a 1m entry decision.
    ///
    /// Never fails: a missing key yields an `ERROR` signal, and throttling or
    /// call failures yield a HOLD with zeroed exits.
    pub async fn live_trade_signal(
        &self,
        strategy: &Strategy,
        current_price: f64,
        market_history: &str,
    ) -> TradeSignal {
        let prompt = prompts::live_signal(strategy, current_price, market_history);

        match self.complete(&self.models.signal, prompt).await {
            Ok(text) => {
                let signal = TradeSignal::parse(&text);
                debug!(signal = %signal.signal, confidence = %signal.confidence, "Parsed trade signal");
                signal
            }
            Err(ScalpError::MissingCredential(_)) => TradeSignal::unavailable("API key missing"),
            Err(ScalpError::CooldownActive(_)) => TradeSignal::hold("System cooling down...", true),
            Err(ScalpError::RateLimited(_)) => TradeSignal::hold("API quota limit reached.", true),
            Err(err) => {
                warn!(error = %err, "Signal scan failed");
                TradeSignal::hold("Signal scan failed.", false)
            }
        }
    }

    /// Scan action of the live terminal: refused without submitting while a
    /// cooldown is active
    pub async fn scan(
        &self,
        strategy: &Strategy,
        current_price: f64,
        market_history: &str,
    ) -> ScanOutcome {
        let cooldown = self.cooldown_secs();
        if cooldown > 0 {
            debug!(cooldown_secs = cooldown, "Scan disabled during cooldown");
            return ScanOutcome::CoolingDown(cooldown);
        }

        ScanOutcome::Signal(
            self.live_trade_signal(strategy, current_price, market_history)
                .await,
        )
    }
}

/// User-facing text for a failed text call
fn failure_message(err: &ScalpError, rate_limited: &str, failed: &str) -> String {
    match err {
        ScalpError::MissingCredential(_) => MISSING_KEY_MESSAGE.to_string(),
        ScalpError::CooldownActive(secs) => {
            format!("System cooling down. Available in {}s.", secs)
        }
        ScalpError::RateLimited(_) => rate_limited.to_string(),
        other => {
            warn!(error = %other, "AI request failed");
            failed.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_message_cooldown() {
        let msg = failure_message(&ScalpError::CooldownActive(17), "limited", "failed");
        assert_eq!(msg, "System cooling down. Available in 17s.");
    }

    #[test]
    fn test_failure_message_variants() {
        assert_eq!(
            failure_message(&ScalpError::RateLimited("429".into()), "limited", "failed"),
            "limited"
        );
        assert_eq!(
            failure_message(&ScalpError::Llm("boom".into()), "limited", "failed"),
            "failed"
        );
        assert_eq!(
            failure_message(&ScalpError::MissingCredential("k".into()), "limited", "failed"),
            MISSING_KEY_MESSAGE
        );
    }

    #[tokio::test]
    async fn test_missing_generator_short_circuits() {
        let advisor = StrategyAdvisor::new(
            Arc::new(RequestGovernor::default()),
            None,
            ModelConfig::default(),
        );
        let err = advisor.complete("m", "p".into()).await.unwrap_err();
        assert!(matches!(err, ScalpError::MissingCredential(_)));
        assert_eq!(advisor.generate_strategy_idea().await, MISSING_KEY_MESSAGE);
        assert!(advisor.actions_enabled());
    }

    #[tokio::test]
    async fn test_missing_generator_signal_defaults() {
        let advisor = StrategyAdvisor::new(
            Arc::new(RequestGovernor::default()),
            None,
            ModelConfig::default(),
        );
        let strategy = Strategy::new("s", "Test", "Me", 80.0, &["RSI"]);
        let signal = advisor.live_trade_signal(&strategy, 100.0, "").await;
        assert_eq!(signal.signal, Signal::Error);
        assert_eq!(signal.reasoning, "API key missing");
        assert_eq!(signal.tp_percent, signal::DEFAULT_TP_PERCENT);
        assert!(!signal.is_rate_limited);
    }
}
