// src/advisor/prompts.rs
// Prompt templates for the strategy advisor

use crate::strategy::Strategy;

pub const STRATEGY_IDEA_PROMPT: &str = "Generate a unique 1m BTC scalping strategy concept based on \
     volume delta and liquidity sweeps. Use Markdown.";

pub fn strategy_critique(strategy: &Strategy) -> String {
    format!(
        "Critique this BTC Scalping Strategy: {name}.\n\
         Winrate: {win_rate}%. Indicators: {indicators}.\n\
         Provide logic breakdown, risks, and one advanced tip.",
        name = strategy.name,
        win_rate = strategy.win_rate,
        indicators = strategy.indicator_list(),
    )
}

pub fn live_signal(strategy: &Strategy, current_price: f64, market_history: &str) -> String {
    format!(
        "You are a High-Frequency Trading Algo.\n\
         Strategy: \"{name}\" using indicators: {indicators}.\n\
         Current Price: ${price}.\n\
         Recent 1m Candles:\n\
         {history}\n\
         \n\
         TASK: Analyze for a 1m scalp entry.\n\
         DECISION: SIGNAL: [BUY/SELL/HOLD].\n\
         CONFIDENCE: [HIGH/MEDIUM/LOW].\n\
         TP_PERCENT: [A recommended Take Profit percentage move from entry, e.g., 0.25].\n\
         SL_PERCENT: [A recommended Stop Loss percentage move from entry, e.g., 0.15].\n\
         REASON: Technical reason (max 10 words).\n",
        name = strategy.name,
        indicators = strategy.indicator_list(),
        price = current_price,
        history = market_history.trim_end(),
    )
}
