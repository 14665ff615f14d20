use std::sync::{Arc, Mutex};

use crate::models::Decision;

/// Receives each decision once; order placement lives behind this seam
pub trait DecisionSink: Send + Sync {
    fn emit(&self, decision: &Decision);
}

/// Logs decisions through tracing
#[derive(Debug, Clone, Default)]
pub struct LogSink;

impl DecisionSink for LogSink {
    fn emit(&self, decision: &Decision) {
        if decision.is_hold() {
            tracing::info!("Trading conditions not met, holding position");
        } else {
            tracing::info!(
                action = %decision.action,
                percentage = decision.percentage,
                "Decision: {} {}%",
                decision.action,
                decision.percentage
            );
        }
    }
}

/// Keeps every emitted decision in memory
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    decisions: Arc<Mutex<Vec<Decision>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decisions(&self) -> Vec<Decision> {
        self.decisions
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }
}

impl DecisionSink for RecordingSink {
    fn emit(&self, decision: &Decision) {
        if let Ok(mut decisions) = self.decisions.lock() {
            decisions.push(*decision);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink() {
        let sink = RecordingSink::new();
        let shared = sink.clone();

        sink.emit(&Decision::buy(4.0));
        sink.emit(&Decision::hold());

        assert_eq!(shared.decisions(), vec![Decision::buy(4.0), Decision::hold()]);
    }

    #[test]
    fn test_log_sink_accepts_any_decision() {
        LogSink.emit(&Decision::sell(20.0));
        LogSink.emit(&Decision::hold());
    }
}
