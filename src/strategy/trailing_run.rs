use super::sizing::streak_percentage;
use super::{DecisionConfig, DecisionPolicy};
use crate::models::{Decision, RatioPoint};

/// Trades in the direction of a run of same-sign, high-volume windows
///
/// Walks back from the newest window. The newest window fixes the direction
/// (buy if its ratio is positive, sell otherwise); the run continues while
/// each window is above the volume threshold and strictly on that side.
/// A run of at least `min_streak` windows trades, growing the size by one
/// percentage point per extra window up to the cap.
#[derive(Debug, Clone, Default)]
pub struct TrailingRunPolicy {
    config: DecisionConfig,
}

/// Direction and length of the trailing run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrailingRun {
    pub positive: bool,
    pub streak: usize,
}

impl TrailingRunPolicy {
    pub fn new(config: DecisionConfig) -> Self {
        Self { config }
    }

    /// Measure the run ending at the newest window
    pub fn trailing_run(&self, history: &[RatioPoint]) -> Option<TrailingRun> {
        let mut run: Option<TrailingRun> = None;

        for point in history.iter().rev() {
            if point.total_volume <= self.config.volume_threshold {
                break;
            }

            match run.as_mut() {
                None => {
                    run = Some(TrailingRun {
                        positive: point.ratio > 0.0,
                        streak: 1,
                    });
                }
                Some(current) => {
                    let same_side = (point.ratio > 0.0 && current.positive)
                        || (point.ratio < 0.0 && !current.positive);
                    if !same_side {
                        break;
                    }
                    current.streak += 1;
                }
            }
        }

        run
    }
}

impl DecisionPolicy for TrailingRunPolicy {
    fn decide(&self, history: &[RatioPoint]) -> Decision {
        if history.len() < self.min_windows_required() {
            return Decision::hold();
        }

        let Some(run) = self.trailing_run(history) else {
            return Decision::hold();
        };

        if run.streak < self.config.min_streak {
            tracing::debug!(streak = run.streak, "Trailing run too short, holding");
            return Decision::hold();
        }

        if run.positive {
            let percentage = streak_percentage(
                run.streak,
                self.config.min_streak,
                self.config.trailing_buy_base,
                self.config.trailing_cap,
            );
            tracing::info!(
                streak = run.streak,
                "{} consecutive windows meet the buy condition, buying {}% of cash",
                run.streak,
                percentage
            );
            Decision::buy(percentage)
        } else {
            let percentage = streak_percentage(
                run.streak,
                self.config.min_streak,
                self.config.trailing_sell_base,
                self.config.trailing_cap,
            );
            tracing::info!(
                streak = run.streak,
                "{} consecutive windows meet the sell condition, selling {}% of position",
                run.streak,
                percentage
            );
            Decision::sell(percentage)
        }
    }

    fn name(&self) -> &str {
        "trailing_run"
    }

    fn min_windows_required(&self) -> usize {
        self.config.min_streak.max(1)
    }
}
