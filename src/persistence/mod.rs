// On-disk ratio log shared by the monitor and the trader
pub mod ratio_log;

pub use ratio_log::{format_window, parse_line, parse_lines, RatioLog, DEFAULT_MAX_LINES};
