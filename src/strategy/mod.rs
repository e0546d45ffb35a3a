// src/strategy/mod.rs
// Strategy catalog and leaderboard

use crate::error::{Result, ScalpError};
use serde::{Deserialize, Serialize};

/// A scalping strategy card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Strategy {
    pub id: String,
    pub name: String,
    pub author: String,
    /// Percentage, 0-100
    pub win_rate: f64,
    pub timeframe: String,
    pub indicators: Vec<String>,
    pub description: String,
    pub tags: Vec<String>,
}

impl Strategy {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        author: impl Into<String>,
        win_rate: f64,
        indicators: &[&str],
    ) -> Self {
        let indicators: Vec<String> = indicators.iter().map(|s| s.to_string()).collect();
        let description = format!(
            "A high-frequency scalping strategy focusing on {} to identify rapid price \
             movements on the 1-minute timeframe. This strategy aims to capture small moves \
             with high probability, utilizing tight stop losses and trailing profits based on \
             volatility.",
            indicators.join(" and ")
        );
        let tags = ["Scalping", "Bitcoin", "High Winrate"]
            .iter()
            .map(|s| s.to_string())
            .chain(indicators.iter().cloned())
            .collect();

        Self {
            id: id.into(),
            name: name.into(),
            author: author.into(),
            win_rate,
            timeframe: "1m".to_string(),
            indicators,
            description,
            tags,
        }
    }

    /// Indicators as a comma-separated list, as used in prompts
    pub fn indicator_list(&self) -> String {
        self.indicators.join(", ")
    }
}

/// (name, author, win rate, indicators)
const CATALOG: &[(&str, &str, f64, &[&str])] = &[
    ("Order Block Sniper", "CryptoWizard_99", 88.5, &["Order Blocks", "RSI", "Volume"]),
    ("VWAP Reversion Scalp", "DeltaOne", 84.2, &["VWAP", "Bollinger Bands"]),
    ("Golden Pocket 1m", "FibMaster", 82.1, &["Fib Retracement", "Stochastic"]),
    ("EMA Cloud Breakout", "TrendSurfer", 81.5, &["EMA 9", "EMA 21", "EMA 50"]),
    ("Delta Divergence Trap", "FlowTrader", 89.2, &["CVD", "Open Interest", "Footprint"]),
    ("Asian Session Range", "TokyoDrift", 85.0, &["Session Range", "Liquidity Grabs"]),
    ("MacDivergence Pro", "OscillatorKing", 80.5, &["MACD", "RSI"]),
    ("Liquidity Sweep Reversal", "SmartMoneyConcept", 87.8, &["Fractals", "Volume Profile"]),
    ("Heikin Ashi Smoothed", "ZenTrader", 83.4, &["Heikin Ashi", "TMA"]),
    ("Momentum Box", "BoxTheory", 81.9, &["Darvas Box", "ADX"]),
    ("RSI 14/2 Cross", "MeanReverter", 86.1, &["RSI", "SMA"]),
    ("Ichimoku Cloud Edge", "CloudWalker", 82.7, &["Ichimoku Kinko Hyo"]),
    ("Bollinger Squeeze 1m", "VolHunter", 88.0, &["Bollinger Bands", "Keltner Channels"]),
    ("Parabolic SAR Trail", "StopHunter", 80.2, &["Parabolic SAR", "EMA 200"]),
    ("Volume Spread Analysis", "WyckoffDisciple", 85.5, &["Volume", "Spread"]),
    ("ATR Trailing Stop", "RiskManager", 81.0, &["ATR", "SuperTrend"]),
    ("Double Bottom Scalp", "PatternRecog", 83.2, &["Chart Patterns"]),
    ("CCI 100 Bounce", "ChannelSurfer", 84.8, &["CCI"]),
    ("Williams %R Overbought", "RangeTrader", 82.3, &["Williams %R"]),
    ("MFI Divergence", "MoneyFlow", 87.1, &["MFI", "VWAP"]),
    ("3-Bar Play", "PriceActionPure", 81.7, &["Candlestick Math"]),
    ("Gap Fill Strategy", "CME_Watcher", 89.5, &["Gaps", "Volume"]),
    ("Pivot Point Bounce", "FloorTrader", 83.9, &["Pivot Points Standard"]),
    ("Supply Demand Zones", "ZoneTrader", 86.4, &["Price Action"]),
    ("Gamma Scalp", "OptionsDesk", 88.8, &["Delta", "Gamma Exposure"]),
    ("Fair Value Gap", "ICT_Student", 85.2, &["FVG", "Imbalance"]),
    ("Session Open Break", "Ny_London", 80.8, &["Time"]),
    ("Turtle Soup", "OldSchool", 82.5, &["20 Day High/Low"]),
    ("Inside Bar Breakout", "VolatilityPlay", 84.0, &["Inside Bar"]),
    ("Correlation Arbitrage", "QuantFund", 91.2, &["ETH Correlation"]),
];

/// All strategies, best win rate first (the leaderboard order).
///
/// Ids follow definition order (`strat-0` ..), so they are stable across
/// runs regardless of ranking.
pub fn catalog() -> Vec<Strategy> {
    let mut strategies: Vec<Strategy> = CATALOG
        .iter()
        .enumerate()
        .map(|(i, (name, author, win_rate, indicators))| {
            Strategy::new(format!("strat-{}", i), *name, *author, *win_rate, indicators)
        })
        .collect();

    strategies.sort_by(|a, b| b.win_rate.total_cmp(&a.win_rate));
    strategies
}

/// Look up a strategy by id or case-insensitive name
pub fn find<'a>(strategies: &'a [Strategy], key: &str) -> Option<&'a Strategy> {
    let key = key.trim();
    strategies
        .iter()
        .find(|s| s.id == key || s.name.eq_ignore_ascii_case(key))
}

/// Like [`find`], failing with `InvalidInput` for an unknown key
pub fn lookup<'a>(strategies: &'a [Strategy], key: &str) -> Result<&'a Strategy> {
    find(strategies, key).ok_or_else(|| {
        ScalpError::InvalidInput(format!(
            "unknown strategy '{}' (see `scalplab strategies`)",
            key.trim()
        ))
    })
}
