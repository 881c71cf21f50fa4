// campaigns/src/normalize/mod.rs
//
// Table normalizer — turns a raw header + rows table into AttackEvents.
//
//   1. Resolve canonical columns (columns.rs). Missing required → fatal.
//   2. Coerce each cell (values.rs). Unreadable cells → absent, never fatal.
//   3. Drop rows without a destination identity.
//
// The engine only ever sees AttackEvents; raw column names stop here.

pub mod columns;
pub mod values;

use tracing::{debug, info, warn};

use crate::config::NormalizeConfig;
use crate::error::Result;
use crate::events::{AttackEvent, PortKey, RiskLevel};

use columns::{ColumnMap, ColumnResolver};

/// Rows as read from the source, before any interpretation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows:    Vec<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    pub rows:                   usize,
    pub events:                 usize,
    pub dropped_no_destination: usize,
    pub unparsed_start:         usize,
    pub unparsed_end:           usize,
}

pub struct Normalizer {
    config: NormalizeConfig,
}

impl Normalizer {
    pub fn new(config: NormalizeConfig) -> Self {
        Self { config }
    }

    pub fn normalize(&self, table: &RawTable) -> Result<(Vec<AttackEvent>, NormalizeStats)> {
        let cols = ColumnMap::from_headers(&table.headers)?;
        for canon in [columns::DESTINATION, columns::START_TIME, columns::END_TIME] {
            debug!("column {:?} <- {:?}", canon, cols.resolve(canon));
        }

        let mut stats  = NormalizeStats { rows: table.rows.len(), ..Default::default() };
        let mut events = Vec::with_capacity(table.rows.len());

        for row in &table.rows {
            let cell = |canon: &str| {
                values::clean(cols.index(canon).and_then(|i| row.get(i)).map(String::as_str))
            };

            let Some(destination) = cell(columns::DESTINATION) else {
                stats.dropped_no_destination += 1;
                continue;
            };

            let fmt   = self.config.time_format.as_deref();
            let start = cell(columns::START_TIME).and_then(|c| values::parse_timestamp(c, fmt));
            let end   = cell(columns::END_TIME).and_then(|c| values::parse_timestamp(c, fmt));
            if start.is_none() { stats.unparsed_start += 1; }
            if end.is_none()   { stats.unparsed_end += 1; }

            let text   = |canon: &str| cell(canon).map(str::to_string);
            let number = |canon: &str| cell(canon).and_then(values::parse_number);

            events.push(AttackEvent {
                destination:     destination.to_string(),
                dest_port:       cell(columns::DEST_PORT).map(PortKey::parse).unwrap_or_default(),
                start,
                end,
                device:          text(columns::DEVICE),
                protocol:        text(columns::PROTOCOL),
                threat_category: text(columns::THREAT_CATEGORY),
                attack_name:     text(columns::ATTACK_NAME),
                action:          text(columns::ACTION),
                policy:          text(columns::POLICY),
                packets_dropped: number(columns::PACKETS_DROPPED),
                mbits_dropped:   number(columns::MBITS_DROPPED),
                peak_pps:        number(columns::MAX_PPS),
                peak_bps:        number(columns::MAX_BPS),
                risk:            cell(columns::RISK).and_then(RiskLevel::from_label),
            });
        }

        stats.events = events.len();
        if stats.dropped_no_destination > 0 {
            warn!("Dropped {} rows without a destination", stats.dropped_no_destination);
        }
        if stats.unparsed_start + stats.unparsed_end > 0 {
            warn!(
                "Unparseable timestamps: start={} end={} (format={:?})",
                stats.unparsed_start, stats.unparsed_end, self.config.time_format
            );
        }
        info!("Normalized {} of {} rows", stats.events, stats.rows);

        Ok((events, stats))
    }
}
