use crate::error::SignalError;
use crate::models::{RatioPoint, TradeWindow};
use regex::Regex;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Lines kept in the log by default
pub const DEFAULT_MAX_LINES: usize = 1000;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const TOTAL_VOLUME_PATTERN: &str = r"Total Volume: (\d+\.?\d*)";
const RATIO_PATTERN: &str = r"Ratio: ([+-]?\d+\.?\d*)";

fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::error!("Invalid ratio log pattern {:?}: {}", pattern, e);
            None
        }
    }
}

fn total_volume_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| compile(TOTAL_VOLUME_PATTERN)).as_ref()
}

fn ratio_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| compile(RATIO_PATTERN)).as_ref()
}

/// First capture of `re` in `line`, parsed as a number
fn capture_number(re: Option<&Regex>, line: &str) -> Option<f64> {
    re?.captures(line)?.get(1)?.as_str().parse::<f64>().ok()
}

/// Render a window as one log line.
///
/// Other tooling reads only the `Total Volume: <n>` and `Ratio: <n>` fields.
pub fn format_window(window: &TradeWindow) -> String {
    format!(
        "Time Window: {} - {}, Buy Volume: {}, Sell Volume: {}, Ratio: {}, Total Volume: {}",
        window.window_start.format(TIME_FORMAT),
        window.window_end.format(TIME_FORMAT),
        window.buy_volume,
        window.sell_volume,
        window.ratio,
        window.total_volume
    )
}

/// Extract total volume and ratio from a log line
pub fn parse_line(line: &str) -> Result<RatioPoint, SignalError> {
    let total_volume = capture_number(total_volume_re(), line)
        .ok_or_else(|| SignalError::LogFormat(format!("no total volume in {:?}", line)))?;

    let ratio = capture_number(ratio_re(), line)
        .ok_or_else(|| SignalError::LogFormat(format!("no ratio in {:?}", line)))?;

    Ok(RatioPoint::new(total_volume, ratio))
}

/// Parse every well-formed line, oldest first. Blank and malformed lines are skipped.
pub fn parse_lines(contents: &str) -> Vec<RatioPoint> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match parse_line(line) {
            Ok(point) => Some(point),
            Err(e) => {
                tracing::debug!("Skipping ratio log line: {}", e);
                None
            }
        })
        .collect()
}

/// Append-only text log of completed windows, capped to the newest lines
#[derive(Debug, Clone)]
pub struct RatioLog {
    path: PathBuf,
    max_lines: usize,
}

impl RatioLog {
    pub fn new(path: impl Into<PathBuf>, max_lines: usize) -> Self {
        Self {
            path: path.into(),
            max_lines: max_lines.max(1),
        }
    }

    async fn read_contents(&self) -> Result<String, SignalError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(contents),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Append one window and drop the oldest lines beyond the cap.
    ///
    /// The file is rewritten through a temporary sibling and renamed into
    /// place, so readers never see a half-written log.
    pub async fn append(&self, window: &TradeWindow) -> Result<(), SignalError> {
        let contents = self.read_contents().await?;

        let mut lines: Vec<&str> = contents.lines().filter(|l| !l.trim().is_empty()).collect();
        let line = format_window(window);
        lines.push(&line);

        let skip = lines.len().saturating_sub(self.max_lines);
        let mut output = lines[skip..].join("\n");
        output.push('\n');

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, output).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        Ok(())
    }

    /// All parseable windows, oldest first. A missing file reads as empty.
    pub async fn read_points(&self) -> Result<Vec<RatioPoint>, SignalError> {
        let contents = self.read_contents().await?;
        if contents.is_empty() {
            tracing::warn!("Ratio log {} is empty or missing", self.path.display());
        }
        Ok(parse_lines(&contents))
    }
}
