use super::{DecisionConfig, DecisionPolicy};
use crate::models::{Decision, RatioPoint};

/// Trades the reversal when the newest window flips sign after a run.
///
/// When the two newest windows disagree in sign, the run that ended at the
/// previous window is measured. If any window of that run cleared the volume
/// threshold, the flip is acted on: a positive run turning negative sells
/// `streak`%, a negative run turning positive buys `2 * streak`%, both capped.
#[derive(Debug, Clone, Default)]
pub struct SignFlipPolicy {
    config: DecisionConfig,
}

/// Run ending at the window before the flip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlipRun {
    pub previous_positive: bool,
    pub streak: usize,
    pub threshold_reached: bool,
}

impl SignFlipPolicy {
    pub fn new(config: DecisionConfig) -> Self {
        Self { config }
    }

    /// Run preceding a sign flip, or `None` when the two newest windows agree
    pub fn flip_run(&self, history: &[RatioPoint]) -> Option<FlipRun> {
        let [.., previous, latest] = history else {
            return None;
        };

        let previous_positive = previous.is_positive();
        if latest.is_positive() == previous_positive {
            return None;
        }

        let mut streak = 0;
        let mut threshold_reached = false;
        for point in history[..history.len() - 1].iter().rev() {
            if point.is_positive() != previous_positive {
                break;
            }
            streak += 1;
            if point.total_volume > self.config.volume_threshold {
                threshold_reached = true;
            }
        }

        Some(FlipRun {
            previous_positive,
            streak,
            threshold_reached,
        })
    }
}

impl DecisionPolicy for SignFlipPolicy {
    fn decide(&self, history: &[RatioPoint]) -> Decision {
        if history.len() < self.min_windows_required() {
            return Decision::hold();
        }

        let Some(run) = self.flip_run(history) else {
            return Decision::hold();
        };

        if !run.threshold_reached {
            tracing::debug!(
                streak = run.streak,
                "Sign flip without a high-volume run, holding"
            );
            return Decision::hold();
        }

        let streak = run.streak as f64;
        if run.previous_positive {
            let percentage = streak.min(self.config.flip_cap);
            tracing::info!(
                streak = run.streak,
                "Downtrend reversal after {} buy windows, selling {}% of position",
                run.streak,
                percentage
            );
            Decision::sell(percentage)
        } else {
            let percentage = (streak * 2.0).min(self.config.flip_cap);
            tracing::info!(
                streak = run.streak,
                "Uptrend reversal after {} sell windows, buying {}% of cash",
                run.streak,
                percentage
            );
            Decision::buy(percentage)
        }
    }

    fn name(&self) -> &str {
        "sign_flip"
    }

    fn min_windows_required(&self) -> usize {
        2
    }
}
