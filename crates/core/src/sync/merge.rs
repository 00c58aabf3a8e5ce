//! Merge policy for remote event deltas.
//!
//! Given the local authoritative set of an account and the concatenated
//! remote delta of one pass, produce the new authoritative set. The policy is
//! a pure function: no I/O, no clock, no randomness.
//!
//! Within the delta, duplicate ids collapse to their last occurrence. Output
//! order is the surviving local events in their original order followed by
//! new events in order of first appearance in the delta.

use std::collections::{HashMap, HashSet};

use calsync_domain::CalendarEvent;

/// Outcome for a single event id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeDecision {
    /// Local event with no remote counterpart survives unchanged
    Keep,
    /// Local event is replaced by its non-cancelled remote copy
    Replace,
    /// Local event is removed because the remote copy is cancelled
    Drop,
    /// Remote event unknown locally is added
    Add,
    /// Cancelled remote event unknown locally is discarded
    Ignore,
}

/// Tally of decisions taken during one merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub kept: usize,
    pub replaced: usize,
    pub dropped: usize,
    pub added: usize,
    pub ignored: usize,
}

impl MergeStats {
    fn record(&mut self, decision: MergeDecision) {
        match decision {
            MergeDecision::Keep => self.kept += 1,
            MergeDecision::Replace => self.replaced += 1,
            MergeDecision::Drop => self.dropped += 1,
            MergeDecision::Add => self.added += 1,
            MergeDecision::Ignore => self.ignored += 1,
        }
    }
}

/// Decide what happens to one event id.
///
/// `local` is the stored event with that id, `remote` the effective delta
/// entry (after last-write-wins collapsing). Returns `None` when neither
/// side knows the id.
pub fn decide(
    local: Option<&CalendarEvent>,
    remote: Option<&CalendarEvent>,
) -> Option<MergeDecision> {
    match (local, remote) {
        (Some(_), Some(remote)) if remote.is_cancelled() => Some(MergeDecision::Drop),
        (Some(_), Some(_)) => Some(MergeDecision::Replace),
        (Some(_), None) => Some(MergeDecision::Keep),
        (None, Some(remote)) if remote.is_cancelled() => Some(MergeDecision::Ignore),
        (None, Some(_)) => Some(MergeDecision::Add),
        (None, None) => None,
    }
}

/// Merge `delta` into `existing` and return the new authoritative set.
pub fn merge_events(existing: &[CalendarEvent], delta: &[CalendarEvent]) -> Vec<CalendarEvent> {
    merge_events_with_stats(existing, delta).0
}

/// Same as [`merge_events`], also returning the decision tally.
pub fn merge_events_with_stats(
    existing: &[CalendarEvent],
    delta: &[CalendarEvent],
) -> (Vec<CalendarEvent>, MergeStats) {
    // Last occurrence wins for the content, first occurrence fixes the order.
    let mut latest: HashMap<&str, &CalendarEvent> = HashMap::with_capacity(delta.len());
    let mut first_seen: Vec<&str> = Vec::with_capacity(delta.len());
    for event in delta {
        if latest.insert(event.id.as_str(), event).is_none() {
            first_seen.push(event.id.as_str());
        }
    }

    let mut stats = MergeStats::default();
    let mut merged = Vec::with_capacity(existing.len() + first_seen.len());
    let mut local_ids: HashSet<&str> = HashSet::with_capacity(existing.len());

    for local in existing {
        // A malformed local set with repeated ids still yields one entry per id.
        if !local_ids.insert(local.id.as_str()) {
            continue;
        }
        let remote = latest.get(local.id.as_str()).copied();
        let Some(decision) = decide(Some(local), remote) else { continue };
        stats.record(decision);
        match (decision, remote) {
            (MergeDecision::Keep, _) => merged.push(local.clone()),
            (MergeDecision::Replace, Some(remote)) => merged.push(remote.clone()),
            _ => {}
        }
    }

    for id in first_seen {
        if local_ids.contains(id) {
            continue;
        }
        let remote = latest.get(id).copied();
        let Some(decision) = decide(None, remote) else { continue };
        stats.record(decision);
        if let (MergeDecision::Add, Some(remote)) = (decision, remote) {
            merged.push(remote.clone());
        }
    }

    (merged, stats)
}
