// campaigns/src/events.rs
//
// Domain types flowing through the campaign builder.
//
//   AttackEvent      — one normalized appliance row (input to the engine)
//   PortKey          — destination port reduced to a number or "unknown"
//   RiskLevel        — ordered risk label (Low < Medium < High)
//   CampaignSummary  — one aggregated attack window (output of the engine)

use chrono::NaiveDateTime;

/// Placeholder used for empty categorical rollups and a missing risk level.
pub const NOT_AVAILABLE: &str = "N/A";

/// Dest-ports label when no numeric port was observed in a window.
pub const MULTIPLE_UNKNOWN_PORTS: &str = "Multiple/Unknown";

// ── Destination port ──────────────────────────────────────────────────────────

/// Port values the appliance exports when a single port does not apply.
const PORT_SENTINELS: &[&str] = &["multiple", "unknown", "n/a", "na", "none", "0", ""];

/// Normalized destination port.
///
/// `Known` sorts before `Unknown`, so the unknown bucket of a destination is
/// always visited after its numeric buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PortKey {
    Known(i64),
    #[default]
    Unknown,
}

impl PortKey {
    /// Normalize a raw port cell. Sentinels and non-numeric text collapse
    /// into `Unknown`; any other number is truncated, range unchecked.
    pub fn parse(raw: &str) -> Self {
        let s = raw.trim().to_lowercase();
        if PORT_SENTINELS.contains(&s.as_str()) {
            return Self::Unknown;
        }
        // Exports sometimes carry ports as floats ("443.0").
        match s.parse::<f64>() {
            Ok(v) if v.is_finite() => Self::Known(v.trunc() as i64),
            _ => Self::Unknown,
        }
    }

    pub fn number(&self) -> Option<i64> {
        match self {
            Self::Known(p) => Some(*p),
            Self::Unknown => None,
        }
    }
}

impl std::fmt::Display for PortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Known(p) => write!(f, "{}", p),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

// ── Risk ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Exact label match; anything else is treated as no risk information.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "Low" => Some(Self::Low),
            "Medium" => Some(Self::Medium),
            "High" => Some(Self::High),
            _ => None,
        }
    }

    /// Ordinal used for max-aggregation (Low=1, Medium=2, High=3).
    pub fn rank(&self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
        }
    }

    pub fn from_rank(rank: u8) -> Option<Self> {
        match rank {
            1 => Some(Self::Low),
            2 => Some(Self::Medium),
            3 => Some(Self::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}

// ── Input event ───────────────────────────────────────────────────────────────

/// One appliance detection row after column resolution and value coercion.
///
/// Start/end stay optional: the engine skips rows where either is missing
/// instead of failing the run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttackEvent {
    pub destination: String,
    pub dest_port: PortKey,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub device: Option<String>,
    pub protocol: Option<String>,
    pub threat_category: Option<String>,
    pub attack_name: Option<String>,
    pub action: Option<String>,
    pub policy: Option<String>,
    pub packets_dropped: Option<f64>,
    pub mbits_dropped: Option<f64>,
    pub peak_pps: Option<f64>,
    pub peak_bps: Option<f64>,
    pub risk: Option<RiskLevel>,
}

impl AttackEvent {
    pub fn new(destination: impl Into<String>) -> Self {
        Self { destination: destination.into(), ..Default::default() }
    }

    /// Start and end, if both are present and ordered.
    pub fn span(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        match (self.start, self.end) {
            (Some(s), Some(e)) if e >= s => Some((s, e)),
            _ => None,
        }
    }
}

// ── Output summary ────────────────────────────────────────────────────────────

/// Finalized attack window. Built once when the window closes, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignSummary {
    /// SHA256[:8] over destination, port key and window start.
    pub campaign_id: String,
    pub destination: String,
    /// Set only when grouping splits by port.
    pub port_key: Option<PortKey>,
    pub window_start: NaiveDateTime,
    pub window_end: NaiveDateTime,
    pub duration_mins: f64,
    pub n_events: usize,
    pub devices: String,
    pub protocols: String,
    pub threat_categories: String,
    pub attack_names: String,
    pub dest_ports: String,
    pub total_packets_dropped: Option<u64>,
    pub total_mbits_dropped: Option<f64>,
    pub peak_pps: Option<f64>,
    pub peak_bps: Option<f64>,
    pub max_risk: Option<RiskLevel>,
}

impl CampaignSummary {
    pub fn max_risk_label(&self) -> String {
        self.max_risk
            .map(|r| r.to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_sentinels_are_unknown() {
        for raw in ["multiple", "Unknown", " N/A ", "na", "none", "0", "", "http"] {
            assert_eq!(PortKey::parse(raw), PortKey::Unknown, "raw={:?}", raw);
        }
    }

    #[test]
    fn port_parses_integers_and_floats() {
        assert_eq!(PortKey::parse("80"), PortKey::Known(80));
        assert_eq!(PortKey::parse("443.0"), PortKey::Known(443));
        assert_eq!(PortKey::parse("443.9"), PortKey::Known(443));
    }

    #[test]
    fn out_of_range_ports_are_kept() {
        assert_eq!(PortKey::parse("0.0"), PortKey::Known(0));
        assert_eq!(PortKey::parse("70000"), PortKey::Known(70000));
        assert_eq!(PortKey::parse("-5"), PortKey::Known(-5));
        assert_eq!(PortKey::parse("nan"), PortKey::Unknown);
        assert_eq!(PortKey::parse("inf"), PortKey::Unknown);
    }

    #[test]
    fn known_ports_sort_before_unknown() {
        let mut keys = vec![PortKey::Unknown, PortKey::Known(443), PortKey::Known(80)];
        keys.sort();
        assert_eq!(keys, vec![PortKey::Known(80), PortKey::Known(443), PortKey::Unknown]);
    }

    #[test]
    fn risk_labels_are_exact() {
        assert_eq!(RiskLevel::from_label("High"), Some(RiskLevel::High));
        assert_eq!(RiskLevel::from_label(" Low "), Some(RiskLevel::Low));
        assert_eq!(RiskLevel::from_label("high"), None);
        assert_eq!(RiskLevel::from_label("Critical"), None);
        assert_eq!(RiskLevel::from_rank(RiskLevel::Medium.rank()), Some(RiskLevel::Medium));
        assert_eq!(RiskLevel::from_rank(0), None);
    }

    #[test]
    fn span_requires_ordered_timestamps() {
        let t0 = NaiveDateTime::parse_from_str("2024-01-01 10:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let t1 = NaiveDateTime::parse_from_str("2024-01-01 10:05:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let mut ev = AttackEvent::new("10.0.0.1");
        assert!(ev.span().is_none());
        ev.start = Some(t0);
        ev.end = Some(t1);
        assert_eq!(ev.span(), Some((t0, t1)));
        ev.start = Some(t1);
        ev.end = Some(t0);
        assert!(ev.span().is_none());
    }
}
