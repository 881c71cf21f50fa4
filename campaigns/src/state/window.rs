// campaigns/src/state/window.rs
//
// Per-group event buckets and the attack-window accumulator.
//
// Design:
//   - GroupKey: destination, or (destination, port) when splitting by port
//   - GroupStore: group key → events, stable-sorted by start time
//   - CampaignWindow: open window being grown by the merge state machine
//
// BTreeMap keeps group iteration deterministic, so two runs over the same
// table visit groups (and emit windows) in the same order.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use crate::events::{AttackEvent, PortKey};

// ── Group key ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey {
    pub destination: String,
    /// `None` when grouping ignores ports.
    pub port: Option<PortKey>,
}

impl GroupKey {
    pub fn for_event(event: &AttackEvent, split_by_port: bool) -> Self {
        Self {
            destination: event.destination.clone(),
            port: split_by_port.then_some(event.dest_port),
        }
    }
}

impl std::fmt::Display for GroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.port {
            Some(p) => write!(f, "{}:{}", self.destination, p),
            None => write!(f, "{}", self.destination),
        }
    }
}

// ── Group store ───────────────────────────────────────────────────────────────

/// Two-level grouping: key → events in chronological order.
#[derive(Debug, Default)]
pub struct GroupStore<'a> {
    groups: BTreeMap<GroupKey, Vec<&'a AttackEvent>>,
}

impl<'a> GroupStore<'a> {
    pub fn build(events: &'a [AttackEvent], split_by_port: bool) -> Self {
        let mut groups: BTreeMap<GroupKey, Vec<&'a AttackEvent>> = BTreeMap::new();
        for ev in events {
            groups.entry(GroupKey::for_event(ev, split_by_port)).or_default().push(ev);
        }
        // Stable: equal start times keep input order.
        for bucket in groups.values_mut() {
            bucket.sort_by_key(|ev| ev.start);
        }
        Self { groups }
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GroupKey, &[&'a AttackEvent])> {
        self.groups.iter().map(|(k, v)| (k, v.as_slice()))
    }
}

// ── Window accumulator ────────────────────────────────────────────────────────

/// An attack window under construction.
///
/// `start` is fixed by the opening event; `end` is the running maximum of
/// member end times and never moves backwards.
#[derive(Debug, Clone)]
pub struct CampaignWindow<'a> {
    pub key:     GroupKey,
    pub start:   NaiveDateTime,
    pub end:     NaiveDateTime,
    pub members: Vec<&'a AttackEvent>,
}

impl<'a> CampaignWindow<'a> {
    pub fn open(key: GroupKey, event: &'a AttackEvent, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { key, start, end, members: vec![event] }
    }

    pub fn absorb(&mut self, event: &'a AttackEvent, end: NaiveDateTime) {
        if end > self.end {
            self.end = end;
        }
        self.members.push(event);
    }

    pub fn event_count(&self) -> usize {
        self.members.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(min: i64) -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2024-01-01 00:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
            + chrono::Duration::minutes(min)
    }

    fn ev(dst: &str, port: PortKey, start: Option<i64>) -> AttackEvent {
        AttackEvent {
            dest_port: port,
            start: start.map(at),
            end: start.map(at),
            ..AttackEvent::new(dst)
        }
    }

    #[test]
    fn groups_by_destination_only() {
        let events = vec![
            ev("10.0.0.1", PortKey::Known(80), Some(5)),
            ev("10.0.0.1", PortKey::Known(443), Some(1)),
            ev("10.0.0.2", PortKey::Unknown, Some(0)),
        ];
        let store = GroupStore::build(&events, false);
        assert_eq!(store.group_count(), 2);
        let (key, bucket) = store.iter().next().unwrap();
        assert_eq!(key.to_string(), "10.0.0.1");
        assert_eq!(bucket[0].dest_port, PortKey::Known(443));
    }

    #[test]
    fn split_by_port_keeps_unknown_bucket_last() {
        let events = vec![
            ev("10.0.0.1", PortKey::Unknown, Some(0)),
            ev("10.0.0.1", PortKey::Known(443), Some(1)),
            ev("10.0.0.1", PortKey::Unknown, Some(2)),
        ];
        let store = GroupStore::build(&events, true);
        let keys: Vec<String> = store.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["10.0.0.1:443", "10.0.0.1:unknown"]);
        let unknown = store.iter().nth(1).unwrap().1;
        assert_eq!(unknown.len(), 2);
    }

    #[test]
    fn sort_is_stable_on_equal_starts() {
        let mut a = ev("10.0.0.1", PortKey::Unknown, Some(3));
        a.device = Some("first".into());
        let mut b = ev("10.0.0.1", PortKey::Unknown, Some(3));
        b.device = Some("second".into());
        let events = vec![a, b, ev("10.0.0.1", PortKey::Unknown, Some(1))];
        let store = GroupStore::build(&events, false);
        let bucket = store.iter().next().unwrap().1;
        assert_eq!(bucket[1].device.as_deref(), Some("first"));
        assert_eq!(bucket[2].device.as_deref(), Some("second"));
    }

    #[test]
    fn window_end_is_running_max() {
        let e1 = ev("10.0.0.1", PortKey::Unknown, Some(0));
        let e2 = ev("10.0.0.1", PortKey::Unknown, Some(1));
        let key = GroupKey::for_event(&e1, false);
        let mut w = CampaignWindow::open(key, &e1, at(0), at(10));
        w.absorb(&e2, at(4));
        assert_eq!(w.end, at(10));
        w.absorb(&e2, at(12));
        assert_eq!(w.end, at(12));
        assert_eq!(w.event_count(), 3);
    }
}
