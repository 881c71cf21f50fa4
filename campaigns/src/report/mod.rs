// campaigns/src/report/mod.rs
//
// Report sink: file writers plus a markdown digest for the terminal.

pub mod writer;

use crate::engine::CampaignRun;
use crate::events::CampaignSummary;

/// The `n` largest campaigns by event count; ties go to the earlier window.
pub fn top_campaigns(summaries: &[CampaignSummary], n: usize) -> Vec<&CampaignSummary> {
    let mut ranked: Vec<&CampaignSummary> = summaries.iter().collect();
    ranked.sort_by(|a, b| {
        b.n_events
            .cmp(&a.n_events)
            .then_with(|| a.window_start.cmp(&b.window_start))
    });
    ranked.truncate(n);
    ranked
}

/// Markdown digest: run counts plus the top `n` campaigns.
pub fn render_markdown(run: &CampaignRun, n: usize) -> String {
    let mut out = String::new();
    out.push_str("## Attack Campaigns\n\n");
    out.push_str("| Metric     | Value |\n");
    out.push_str("|------------|-------|\n");
    out.push_str(&format!("| Events     | {} |\n", run.stats.events_in));
    out.push_str(&format!("| Skipped    | {} |\n", run.stats.events_skipped));
    out.push_str(&format!("| Groups     | {} |\n", run.stats.groups));
    out.push_str(&format!("| Campaigns  | {} |\n", run.stats.campaigns));

    let top = top_campaigns(&run.summaries, n);
    if top.is_empty() {
        return out;
    }

    out.push_str(&format!("\n### Top {} by event count\n\n", top.len()));
    out.push_str("| Destination | Start | Mins | Events | Vectors | Max Risk |\n");
    out.push_str("|-------------|-------|------|--------|---------|----------|\n");
    for s in top {
        let dst = match s.port_key.and_then(|p| p.number()) {
            Some(port) => format!("{}:{}", s.destination, port),
            None => s.destination.clone(),
        };
        out.push_str(&format!(
            "| {} | {} | {:.2} | {} | {} | {} |\n",
            dst,
            s.window_start.format("%Y-%m-%d %H:%M:%S"),
            s.duration_mins,
            s.n_events,
            s.attack_names,
            s.max_risk_label(),
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::engine::CampaignEngine;
    use crate::events::{AttackEvent, PortKey};
    use chrono::{Duration, NaiveDateTime};

    fn ev(dst: &str, start: i64) -> AttackEvent {
        let t0 = NaiveDateTime::parse_from_str("2024-01-01 00:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        AttackEvent {
            dest_port: PortKey::Known(80),
            start: Some(t0 + Duration::minutes(start)),
            end: Some(t0 + Duration::minutes(start + 1)),
            attack_name: Some("HTTP Flood".into()),
            ..AttackEvent::new(dst)
        }
    }

    #[test]
    fn top_is_ordered_by_event_count() {
        let events = vec![ev("a", 0), ev("b", 10), ev("b", 11), ev("b", 12), ev("c", 30), ev("c", 31)];
        let run = CampaignEngine::new(EngineConfig::default()).run(&events);
        let top = top_campaigns(&run.summaries, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].destination, "b");
        assert_eq!(top[1].destination, "c");
    }

    #[test]
    fn markdown_lists_top_rows() {
        let events = vec![ev("10.0.0.1", 0), ev("10.0.0.1", 2)];
        let run = CampaignEngine::new(EngineConfig::new(5, true)).run(&events);
        let md = render_markdown(&run, 5);
        assert!(md.contains("| Campaigns  | 1 |"));
        assert!(md.contains("| 10.0.0.1:80 | 2024-01-01 00:00:00 | 3.00 | 2 | HTTP Flood | N/A |"));

        let bare = render_markdown(&run, 0);
        assert!(!bare.contains("Top"));
    }
}
