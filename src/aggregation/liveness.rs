use crate::models::TradeWindow;

/// Alerts raised while observing completed windows
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// The most recent window saw no trades; raised once until volume returns
    NoTrades,
    /// Window volume reached the alert threshold
    HighVolume { total_volume: f64, summary: String },
}

impl Alert {
    pub fn message(&self) -> String {
        match self {
            Alert::NoTrades => "Alert: no trade data received in the most recent window.".to_string(),
            Alert::HighVolume { summary, .. } => summary.clone(),
        }
    }
}

/// Feed health as seen through the window history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LivenessStatus {
    /// No window has been produced yet
    NoData,
    /// Latest window had zero volume
    Idle,
    /// Latest window had trades
    Active,
}

impl LivenessStatus {
    pub fn from_history(history: &[TradeWindow]) -> Self {
        match history.last() {
            None => LivenessStatus::NoData,
            Some(w) if w.is_empty() => LivenessStatus::Idle,
            Some(_) => LivenessStatus::Active,
        }
    }
}

/// Tracks the one-shot zero-volume alert and the high-volume threshold
#[derive(Debug, Clone)]
pub struct LivenessMonitor {
    alert_volume: f64,
    zero_alert_sent: bool,
}

impl LivenessMonitor {
    pub fn new(alert_volume: f64) -> Self {
        Self {
            alert_volume,
            zero_alert_sent: false,
        }
    }

    /// Inspect a freshly closed window. `summary` is the text carried by a
    /// high-volume alert (normally the ratio log line).
    pub fn observe(&mut self, window: &TradeWindow, summary: &str) -> Vec<Alert> {
        let mut alerts = Vec::new();

        if window.total_volume >= self.alert_volume && window.total_volume > 0.0 {
            alerts.push(Alert::HighVolume {
                total_volume: window.total_volume,
                summary: summary.to_string(),
            });
        }

        if window.is_empty() {
            if !self.zero_alert_sent {
                alerts.push(Alert::NoTrades);
                self.zero_alert_sent = true;
            }
        } else {
            self.zero_alert_sent = false;
        }

        alerts
    }
}
