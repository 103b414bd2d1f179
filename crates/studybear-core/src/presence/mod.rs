//! Presence events translated into registry state.
//!
//! Nothing here does accrual math. Joins and leaves only flip
//! `is_studying` (and reset the staleness baseline on a fresh join); the
//! next accrual tick turns that state into time.

mod transition;

pub use transition::{Transition, VoiceStateChange};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::events::Event;
use crate::registry::{SharedRegistry, StudentRegistry, TrackedMember};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// First sighting; a new member was tracked.
    Created,
    /// Known member came back; baseline reset.
    Resumed,
    /// Member was already marked as studying; nothing changed.
    AlreadyStudying,
}

/// Result of the startup reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// Members whose studying flag was cleared before the live pass.
    pub cleared: usize,
    /// Live members seen for the first time.
    pub created: usize,
    /// Live members that were already tracked.
    pub resumed: usize,
    /// True when the live membership was unavailable.
    pub skipped: bool,
}

/// Mark `id` as studying, creating the member on first sighting.
///
/// A member who was not studying gets `last_seen_ms` cleared so the next
/// tick is a zero-credit baseline. Without this, leaving and rejoining
/// before the tick that would have cleared the old timestamp credits the
/// time spent outside the channel.
pub fn join(registry: &mut StudentRegistry, id: &str, now_ms: u64) -> JoinOutcome {
    match registry.find_mut(id) {
        Some(member) if member.is_studying => JoinOutcome::AlreadyStudying,
        Some(member) => {
            member.is_studying = true;
            member.last_seen_ms = None;
            JoinOutcome::Resumed
        }
        None => {
            track(registry, id, now_ms);
            JoinOutcome::Created
        }
    }
}

/// Mark `id` as no longer studying and drop its baseline. Returns false
/// for unknown members.
///
/// The baseline goes at once, not at the next tick, so a snapshot written
/// in between cannot carry it across a restart.
pub fn leave(registry: &mut StudentRegistry, id: &str) -> bool {
    match registry.find_mut(id) {
        Some(member) => {
            member.is_studying = false;
            member.last_seen_ms = None;
            true
        }
        None => false,
    }
}

/// Track a member first seen at `now_ms`. Callers check `find_mut` first.
fn track(registry: &mut StudentRegistry, id: &str, now_ms: u64) {
    if let Err(e) = registry.insert(TrackedMember::new(id, now_ms)) {
        tracing::warn!(member = %id, error = %e, "member already tracked");
    }
}

/// Re-establish who is studying after a restart.
///
/// Everyone is cleared first. Members found in `live` are then marked as
/// studying with their stored `last_seen_ms` untouched, which is what lets
/// the first tick after a short outage credit the gap (up to the cap).
/// With `live = None` the channel could not be resolved and everyone stays
/// cleared.
pub fn reconcile(
    registry: &mut StudentRegistry,
    live: Option<&[String]>,
    now_ms: u64,
) -> ReconcileReport {
    let mut report = ReconcileReport::default();
    for member in registry.all_mut() {
        if member.is_studying {
            report.cleared += 1;
        }
        member.is_studying = false;
    }

    let Some(live) = live else {
        report.skipped = true;
        return report;
    };

    for id in live {
        match registry.find_mut(id) {
            Some(member) => {
                if !member.is_studying {
                    report.resumed += 1;
                }
                member.is_studying = true;
            }
            None => {
                track(registry, id, now_ms);
                report.created += 1;
            }
        }
    }
    report
}

/// Applies presence signals to the shared registry.
#[derive(Debug, Clone)]
pub struct PresenceAdapter {
    registry: SharedRegistry,
    study_channel_id: String,
}

impl PresenceAdapter {
    pub fn new(registry: SharedRegistry, study_channel_id: impl Into<String>) -> Self {
        Self {
            registry,
            study_channel_id: study_channel_id.into(),
        }
    }

    pub fn study_channel_id(&self) -> &str {
        &self.study_channel_id
    }

    pub fn on_join(&self, id: &str, now_ms: u64) -> Vec<Event> {
        let mut registry = self.registry.lock();
        let outcome = join(&mut registry, id, now_ms);
        let at = Utc::now();

        let mut events = Vec::new();
        match outcome {
            JoinOutcome::AlreadyStudying => return events,
            JoinOutcome::Created => {
                tracing::info!(member = %id, "tracking new member");
                events.push(Event::MemberTracked {
                    member_id: id.to_string(),
                    at,
                });
            }
            JoinOutcome::Resumed => {}
        }
        tracing::info!(member = %id, "joined study channel");

        let studying = registry
            .all()
            .iter()
            .filter(|m| m.is_studying)
            .map(|m| m.id.clone())
            .collect();
        events.push(Event::StudyStarted {
            member_id: id.to_string(),
            studying,
            at,
        });
        events
    }

    pub fn on_leave(&self, id: &str) -> Option<Event> {
        if !leave(&mut self.registry.lock(), id) {
            tracing::debug!(member = %id, "leave for untracked member ignored");
            return None;
        }
        tracing::info!(member = %id, "left study channel");
        Some(Event::StudyStopped {
            member_id: id.to_string(),
            at: Utc::now(),
        })
    }

    /// Route a raw voice-state update.
    pub fn on_voice_state(&self, change: &VoiceStateChange, now_ms: u64) -> Vec<Event> {
        match change.transition(&self.study_channel_id) {
            Some(Transition::Join) => self.on_join(&change.member_id, now_ms),
            Some(Transition::Leave) => self.on_leave(&change.member_id).into_iter().collect(),
            None => Vec::new(),
        }
    }

    pub fn reconcile(&self, live: Option<&[String]>, now_ms: u64) -> ReconcileReport {
        let report = reconcile(&mut self.registry.lock(), live, now_ms);
        if report.skipped {
            tracing::error!(
                channel = %self.study_channel_id,
                "study channel not available; everyone starts as not studying"
            );
        } else {
            tracing::info!(
                created = report.created,
                resumed = report.resumed,
                "startup reconciliation done"
            );
        }
        report
    }
}
