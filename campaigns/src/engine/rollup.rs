// campaigns/src/engine/rollup.rs
//
// Per-window aggregation — turns a closed CampaignWindow into a summary row.
//
//   categorical  devices / protocols / categories / vectors
//                distinct, sorted, joined; empty → "N/A"
//   ports        distinct numeric ports joined by ","; none → "Multiple/Unknown"
//   sums         packets, Mbits: absent values count as 0, all absent → absent
//   maxima       peak pps / bps: max of present values, all absent → absent
//   risk         highest rank among recognized labels, none → "N/A"
//
// A window where every event lacks a numeric field reports nothing, not zero.

use std::collections::BTreeSet;

use sha2::{Digest, Sha256};

use crate::events::{
    AttackEvent, CampaignSummary, RiskLevel, MULTIPLE_UNKNOWN_PORTS, NOT_AVAILABLE,
};
use crate::state::window::{CampaignWindow, GroupKey};

pub fn summarize(window: &CampaignWindow<'_>) -> CampaignSummary {
    let members = &window.members;

    let duration_ms   = (window.end - window.start).num_milliseconds() as f64;
    let duration_mins = round2(duration_ms / 60_000.0);

    CampaignSummary {
        campaign_id:           campaign_id(&window.key, window),
        destination:           window.key.destination.clone(),
        port_key:              window.key.port,
        window_start:          window.start,
        window_end:            window.end,
        duration_mins,
        n_events:              members.len(),
        devices:               distinct_join(members, |e| e.device.as_deref(), ", "),
        protocols:             distinct_join(members, |e| e.protocol.as_deref(), ", "),
        threat_categories:     distinct_join(members, |e| e.threat_category.as_deref(), ", "),
        attack_names:          distinct_join(members, |e| e.attack_name.as_deref(), "; "),
        dest_ports:            port_label(members),
        total_packets_dropped: sum_present(members, |e| e.packets_dropped).map(|v| v as u64),
        total_mbits_dropped:   sum_present(members, |e| e.mbits_dropped),
        peak_pps:              max_present(members, |e| e.peak_pps),
        peak_bps:              max_present(members, |e| e.peak_bps),
        max_risk:              max_risk(members),
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// SHA256[:8] over destination, port bucket and window start.
fn campaign_id(key: &GroupKey, window: &CampaignWindow<'_>) -> String {
    let port = key.port.map(|p| p.to_string()).unwrap_or_else(|| "*".to_string());
    let mut h = Sha256::new();
    h.update(key.destination.as_bytes());
    h.update(b"|");
    h.update(port.as_bytes());
    h.update(b"|");
    h.update(window.start.format("%Y-%m-%dT%H:%M:%S%.f").to_string().as_bytes());
    hex::encode(&h.finalize()[..8])
}

fn distinct_join<F>(members: &[&AttackEvent], field: F, sep: &str) -> String
where
    F: Fn(&AttackEvent) -> Option<&str>,
{
    let set: BTreeSet<&str> = members.iter().filter_map(|e| field(*e)).collect();
    if set.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        set.into_iter().collect::<Vec<_>>().join(sep)
    }
}

fn port_label(members: &[&AttackEvent]) -> String {
    let ports: BTreeSet<i64> = members.iter().filter_map(|e| e.dest_port.number()).collect();
    if ports.is_empty() {
        MULTIPLE_UNKNOWN_PORTS.to_string()
    } else {
        ports.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(",")
    }
}

fn sum_present<F>(members: &[&AttackEvent], field: F) -> Option<f64>
where
    F: Fn(&AttackEvent) -> Option<f64>,
{
    members
        .iter()
        .filter_map(|e| field(*e))
        .fold(None, |acc: Option<f64>, v| Some(acc.unwrap_or(0.0) + v))
}

fn max_present<F>(members: &[&AttackEvent], field: F) -> Option<f64>
where
    F: Fn(&AttackEvent) -> Option<f64>,
{
    members
        .iter()
        .filter_map(|e| field(*e))
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))))
}

fn max_risk(members: &[&AttackEvent]) -> Option<RiskLevel> {
    let rank = members
        .iter()
        .filter_map(|e| e.risk)
        .map(|r| r.rank())
        .max()
        .unwrap_or(0);
    RiskLevel::from_rank(rank)
}
