// campaigns/src/lib.rs
//
// Attack campaign builder.
//
// Pipeline:
//   source     — find and read the appliance export into a RawTable
//   normalize  — resolve column aliases, coerce cells → AttackEvents
//   engine     — group by destination (± port), merge by gap tolerance,
//                roll each window up into a CampaignSummary
//   report     — CSV / JSONL files and a markdown digest

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod normalize;
pub mod report;
pub mod source;
pub mod state;

use config::{EngineConfig, NormalizeConfig};
use engine::{CampaignEngine, CampaignRun};
use normalize::{NormalizeStats, Normalizer, RawTable};

/// Normalize a raw table and build its campaigns in one step.
pub fn campaigns_from_table(
    table: &RawTable,
    normalize: NormalizeConfig,
    engine: EngineConfig,
) -> error::Result<(CampaignRun, NormalizeStats)> {
    let (events, stats) = Normalizer::new(normalize).normalize(table)?;
    Ok((CampaignEngine::new(engine).run(&events), stats))
}
