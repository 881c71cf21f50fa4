// campaigns/src/config.rs
//
// Explicit run configuration. Built once from the CLI and passed down;
// nothing here is global.

use chrono::Duration;

pub const DEFAULT_GAP_MINUTES: u32 = 5;
pub const DEFAULT_TIME_FORMAT: &str = "%m.%d.%Y %H:%M:%S";

/// Settings consumed by the campaign engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Largest allowed `event.start - window_end` for an event to join the
    /// active window. Inclusive.
    pub gap_tolerance: Duration,
    /// Group by (destination, port) instead of destination alone.
    pub split_by_port: bool,
}

impl EngineConfig {
    pub fn new(gap_minutes: u32, split_by_port: bool) -> Self {
        Self {
            gap_tolerance: Duration::minutes(gap_minutes as i64),
            split_by_port,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(DEFAULT_GAP_MINUTES, false)
    }
}

/// Settings consumed by the table normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeConfig {
    /// strftime layout for Start/End cells. `None` infers from common layouts.
    pub time_format: Option<String>,
}

impl NormalizeConfig {
    /// An empty format string means "infer".
    pub fn with_time_format(fmt: &str) -> Self {
        let fmt = fmt.trim();
        Self {
            time_format: if fmt.is_empty() { None } else { Some(fmt.to_string()) },
        }
    }
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self::with_time_format(DEFAULT_TIME_FORMAT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_cli_defaults() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.gap_tolerance, Duration::minutes(5));
        assert!(!cfg.split_by_port);
        assert_eq!(NormalizeConfig::default().time_format.as_deref(), Some(DEFAULT_TIME_FORMAT));
    }

    #[test]
    fn blank_time_format_means_infer() {
        assert_eq!(NormalizeConfig::with_time_format("  ").time_format, None);
    }
}
