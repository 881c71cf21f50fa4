// campaigns/src/engine/merge.rs
//
// Interval-merge state machine for one group.
//
// Input: the group's events, already stable-sorted by start time.
//
//   NoActiveWindow ──valid event──▶ Active(window)
//   Active ──gap ≤ tolerance──▶ Active (absorb, end = max(end, ev.end))
//   Active ──gap > tolerance──▶ emit window, Active(new window)
//   Active ──exhausted──▶ emit window, NoActiveWindow
//
//   gap = event.start − window.end   (closed interval: gap == tolerance merges)
//
// Events without an ordered start/end pair are skipped silently; they never
// open, extend or split a window.

use chrono::Duration;
use tracing::debug;

use crate::events::AttackEvent;
use crate::state::window::{CampaignWindow, GroupKey};

enum MergeState<'a> {
    NoActiveWindow,
    Active(CampaignWindow<'a>),
}

/// Closed windows for one group plus the number of skipped events.
#[derive(Debug)]
pub struct GroupMerge<'a> {
    pub windows: Vec<CampaignWindow<'a>>,
    pub skipped: usize,
}

pub fn merge_group<'a>(key: &GroupKey, events: &[&'a AttackEvent], tolerance: Duration) -> GroupMerge<'a> {
    let mut windows = Vec::new();
    let mut skipped = 0usize;
    let mut state   = MergeState::NoActiveWindow;

    for &event in events {
        let Some((start, end)) = event.span() else {
            skipped += 1;
            debug!("{}: skipping event without a usable start/end", key);
            continue;
        };

        state = match state {
            MergeState::NoActiveWindow => {
                MergeState::Active(CampaignWindow::open(key.clone(), event, start, end))
            }
            MergeState::Active(mut window) => {
                if start - window.end <= tolerance {
                    window.absorb(event, end);
                    MergeState::Active(window)
                } else {
                    debug!("{}: window {} → {} closed with {} events",
                           key, window.start, window.end, window.event_count());
                    windows.push(window);
                    MergeState::Active(CampaignWindow::open(key.clone(), event, start, end))
                }
            }
        };
    }

    if let MergeState::Active(window) = state {
        debug!("{}: window {} → {} closed with {} events",
               key, window.start, window.end, window.event_count());
        windows.push(window);
    }

    GroupMerge { windows, skipped }
}
