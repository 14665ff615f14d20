use uuid::Uuid;

use crate::models::{Action, Decision, TradeSide};

/// Available balances passed in by the caller
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Balances {
    /// Quote currency available to spend
    pub cash: f64,
    /// Base currency held
    pub position: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionAction {
    Execute {
        side: TradeSide,
        /// Order size in base units
        base_size: f64,
        client_order_id: Uuid,
    },
    Skip,
}

#[derive(Debug, Clone)]
pub struct ExecutionDecision {
    pub action: ExecutionAction,
    pub reason: String,
}

impl ExecutionDecision {
    fn skip(reason: impl Into<String>) -> Self {
        Self {
            action: ExecutionAction::Skip,
            reason: reason.into(),
        }
    }

    fn execute(side: TradeSide, base_size: f64, reason: String) -> Self {
        Self {
            action: ExecutionAction::Execute {
                side,
                base_size,
                client_order_id: Uuid::new_v4(),
            },
            reason,
        }
    }
}

fn check_inputs(balances: &Balances, price: f64) -> anyhow::Result<Option<ExecutionDecision>> {
    if !(balances.cash.is_finite() && balances.cash >= 0.0)
        || !(balances.position.is_finite() && balances.position >= 0.0)
    {
        anyhow::bail!(
            "Invalid balances: cash={}, position={}",
            balances.cash,
            balances.position
        );
    }

    if !(price.is_finite() && price > 0.0) {
        return Ok(Some(ExecutionDecision::skip(format!(
            "No usable price ({})",
            price
        ))));
    }

    Ok(None)
}

/// Turn a percentage decision into an order.
///
/// BUY spends `percentage`% of cash at `price`; SELL sells `percentage`% of
/// the position. HOLD, a zero percentage or a zero-size order is skipped.
pub fn plan_order(
    decision: &Decision,
    balances: &Balances,
    price: f64,
) -> anyhow::Result<ExecutionDecision> {
    plan_from_fraction(decision.action, decision.percentage / 100.0, balances, price)
}

/// Same as [`plan_order`] for a fraction in [0, 1]; out-of-range fractions
/// are clamped against the available balance.
pub fn plan_from_fraction(
    action: Action,
    fraction: f64,
    balances: &Balances,
    price: f64,
) -> anyhow::Result<ExecutionDecision> {
    if action == Action::Hold {
        return Ok(ExecutionDecision::skip("Hold signal"));
    }

    if let Some(skip) = check_inputs(balances, price)? {
        return Ok(skip);
    }

    let fraction = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };

    match action {
        Action::Buy => {
            let spend = balances.cash * fraction;
            let base_size = spend / price;
            if base_size <= 0.0 {
                return Ok(ExecutionDecision::skip("Nothing to buy"));
            }
            Ok(ExecutionDecision::execute(
                TradeSide::Buy,
                base_size,
                format!(
                    "Buy {:.2}% of cash: spend {:.4} at {:.4}",
                    fraction * 100.0,
                    spend,
                    price
                ),
            ))
        }
        Action::Sell => {
            let base_size = balances.position * fraction;
            if base_size <= 0.0 {
                return Ok(ExecutionDecision::skip("No position to sell"));
            }
            Ok(ExecutionDecision::execute(
                TradeSide::Sell,
                base_size,
                format!(
                    "Sell {:.2}% of position at {:.4}",
                    fraction * 100.0,
                    price
                ),
            ))
        }
        Action::Hold => Ok(ExecutionDecision::skip("Hold signal")),
    }
}
