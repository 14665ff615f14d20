// Decision policies over the window history, plus position sizing
pub mod sign_flip;
pub mod sizing;
pub mod trailing_run;

use crate::models::{Decision, RatioPoint};
use serde::{Deserialize, Serialize};

pub use sign_flip::SignFlipPolicy;
pub use sizing::{streak_percentage, PositionSizer, SizingConfig, SizingReport};
pub use trailing_run::TrailingRunPolicy;

/// Base trait for streak-based decision policies
pub trait DecisionPolicy: Send + Sync {
    /// Decide from the window history, oldest first.
    ///
    /// Total: short or unusable history yields HOLD, never an error.
    fn decide(&self, history: &[RatioPoint]) -> Decision;

    /// Get policy name
    fn name(&self) -> &str;

    /// Minimum windows required before the policy can act
    fn min_windows_required(&self) -> usize;
}

/// Which streak policy drives trading
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Trailing same-sign run of high-volume windows
    #[default]
    TrailingRun,
    /// Sign flip between the two newest windows after a high-volume run
    SignFlip,
}

impl std::str::FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "trailing_run" => Ok(PolicyKind::TrailingRun),
            "sign_flip" => Ok(PolicyKind::SignFlip),
            other => Err(format!("unknown policy: {}", other)),
        }
    }
}

/// Streak policy parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    pub policy: PolicyKind,
    /// A window only counts toward a streak above this total volume
    pub volume_threshold: f64,
    /// Trailing run: windows needed before acting
    pub min_streak: usize,
    /// Trailing run: buy percentage at `min_streak`
    pub trailing_buy_base: f64,
    /// Trailing run: sell percentage at `min_streak`
    pub trailing_sell_base: f64,
    pub trailing_cap: f64,
    pub flip_cap: f64,
    /// Seconds between decision polls
    pub poll_secs: u64,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            policy: PolicyKind::TrailingRun,
            volume_threshold: 1_400_000.0,
            min_streak: 3,
            trailing_buy_base: 3.0,
            trailing_sell_base: 1.0,
            trailing_cap: 50.0,
            flip_cap: 20.0,
            poll_secs: 30,
        }
    }
}

/// Build the configured policy
pub fn build_policy(config: &DecisionConfig) -> Box<dyn DecisionPolicy> {
    match config.policy {
        PolicyKind::TrailingRun => Box::new(TrailingRunPolicy::new(config.clone())),
        PolicyKind::SignFlip => Box::new(SignFlipPolicy::new(config.clone())),
    }
}
