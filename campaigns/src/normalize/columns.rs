// campaigns/src/normalize/columns.rs
//
// Canonical column names and the aliases appliance exports use for them.
// Different firmware versions and report templates rename columns freely,
// so every canonical field has a short list of accepted spellings.
//
// Matching per canonical field, candidates in order:
//   1. exact header match
//   2. case-insensitive, whitespace-trimmed match

use std::collections::HashMap;

use crate::error::{Error, Result};

pub const START_TIME: &str = "Start Time";
pub const END_TIME: &str = "End Time";
pub const DEVICE: &str = "Device IP Address";
pub const DESTINATION: &str = "Destination IP Address";
pub const DEST_PORT: &str = "Destination Port";
pub const THREAT_CATEGORY: &str = "Threat Category";
pub const ATTACK_NAME: &str = "Attack Name";
pub const ACTION: &str = "Action";
pub const PROTOCOL: &str = "Protocol";
pub const PACKETS_DROPPED: &str = "Total Packets Dropped";
pub const MBITS_DROPPED: &str = "Total Mbits Dropped";
pub const MAX_PPS: &str = "Max pps";
pub const MAX_BPS: &str = "Max bps";
pub const RISK: &str = "Risk";
pub const POLICY: &str = "Policy Name";

pub const REQUIRED: &[&str] = &[DESTINATION, START_TIME, END_TIME];

const ALIASES: &[(&str, &[&str])] = &[
    (START_TIME,      &["Start Time", "Start", "Time Start"]),
    (END_TIME,        &["End Time", "End", "Time End"]),
    (DEVICE,          &["Device IP Address", "Device IP", "Device"]),
    (DESTINATION,     &["Destination IP Address", "Destination IP", "Dst IP", "DstIP"]),
    (DEST_PORT,       &["Destination Port", "Dst Port", "DstPort", "Port"]),
    (THREAT_CATEGORY, &["Threat Category", "Category"]),
    (ATTACK_NAME,     &["Attack Name", "Attack", "Vector"]),
    (ACTION,          &["Action"]),
    (PROTOCOL,        &["Protocol", "Proto"]),
    (PACKETS_DROPPED, &["Total Packets Dropped", "Packets Dropped"]),
    (MBITS_DROPPED,   &["Total Mbits Dropped", "Mbits Dropped"]),
    (MAX_PPS,         &["Max pps", "Peak pps", "pps max"]),
    (MAX_BPS,         &["Max bps", "Peak bps", "bps max"]),
    (RISK,            &["Risk"]),
    (POLICY,          &["Policy Name", "Policy"]),
];

/// Maps a canonical field name to the source column that carries it.
pub trait ColumnResolver {
    fn resolve(&self, canonical: &str) -> Option<&str>;
}

/// Column resolution for one concrete header row.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    headers: Vec<String>,
    index:   HashMap<&'static str, usize>,
}

impl ColumnMap {
    /// Resolve every known canonical field against `headers`.
    /// Fails when a required field has no matching column.
    pub fn from_headers(headers: &[String]) -> Result<Self> {
        let headers: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();

        // Later duplicates win, same as a dict built over the header row.
        let lowered: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.to_lowercase(), i))
            .collect();

        let mut index = HashMap::new();
        for (canon, candidates) in ALIASES {
            let hit = candidates.iter().find_map(|c| {
                headers
                    .iter()
                    .position(|h| h == c)
                    .or_else(|| lowered.get(&c.trim().to_lowercase()).copied())
            });
            if let Some(i) = hit {
                index.insert(*canon, i);
            }
        }

        let missing: Vec<String> = REQUIRED
            .iter()
            .filter(|r| !index.contains_key(*r))
            .map(|r| r.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(Error::MissingColumns { missing, available: headers });
        }

        Ok(Self { headers, index })
    }

    /// Position of the source column for `canonical`, if resolved.
    pub fn index(&self, canonical: &str) -> Option<usize> {
        self.index.get(canonical).copied()
    }
}

impl ColumnResolver for ColumnMap {
    fn resolve(&self, canonical: &str) -> Option<&str> {
        self.index(canonical).map(|i| self.headers[i].as_str())
    }
}
