// campaigns/src/engine/mod.rs
//
// Campaign engine: group → merge → roll up → order.
//
// Groups are independent. Each one runs the merge state machine on its own
// sorted events; the only cross-group step is the final sort by
// (window start, destination).

pub mod merge;
pub mod rollup;

use tracing::info;

use crate::config::EngineConfig;
use crate::events::{AttackEvent, CampaignSummary};
use crate::state::window::GroupStore;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub groups:         usize,
    pub events_in:      usize,
    pub events_skipped: usize,
    pub campaigns:      usize,
}

#[derive(Debug, Clone)]
pub struct CampaignRun {
    pub summaries: Vec<CampaignSummary>,
    pub stats:     EngineStats,
}

pub struct CampaignEngine {
    config: EngineConfig,
}

impl CampaignEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, events: &[AttackEvent]) -> CampaignRun {
        let store = GroupStore::build(events, self.config.split_by_port);

        let mut stats = EngineStats {
            groups: store.group_count(),
            events_in: events.len(),
            ..Default::default()
        };
        let mut summaries = Vec::new();

        for (key, bucket) in store.iter() {
            let merged = merge::merge_group(key, bucket, self.config.gap_tolerance);
            stats.events_skipped += merged.skipped;
            summaries.extend(merged.windows.iter().map(rollup::summarize));
        }

        // Stable: ties keep group-key order (numeric ports before unknown).
        summaries.sort_by(|a, b| {
            a.window_start
                .cmp(&b.window_start)
                .then_with(|| a.destination.cmp(&b.destination))
        });
        stats.campaigns = summaries.len();

        info!(
            "Built {} campaigns from {} events across {} groups ({} skipped, gap={}m, split_by_port={})",
            stats.campaigns, stats.events_in, stats.groups, stats.events_skipped,
            self.config.gap_tolerance.num_minutes(), self.config.split_by_port,
        );

        CampaignRun { summaries, stats }
    }
}
