use super::event::{EntryKind, FsEvent};
use notify::{
    Event, EventKind,
    event::{ModifyKind, RenameMode},
};
use std::{
    collections::HashMap,
    path::PathBuf,
    time::{Duration, Instant},
};

#[derive(Debug)]
struct Departure {
    path: PathBuf,
    kind: EntryKind,
    seen: Instant,
}

/// Pairs the `From` and `To` halves of backend rename notifications.
///
/// A rename inside the tree is reported by the paired `Both` notification and
/// needs nothing from here. A `To` without a preceding `From` is an entry
/// moved in from outside and becomes a creation. A `From` that is not
/// matched within `window` is an entry moved out and becomes a deletion.
#[derive(Debug)]
pub struct RenameHalves {
    departures: HashMap<usize, Departure>,
    window: Duration,
}

impl RenameHalves {
    pub fn new(window: Duration) -> Self {
        Self {
            departures: HashMap::new(),
            window,
        }
    }

    /// Account for a half, returning the creation it implies, if any.
    pub fn observe(&mut self, event: &Event, now: Instant) -> Option<FsEvent> {
        let EventKind::Modify(ModifyKind::Name(mode)) = &event.kind else {
            return None;
        };
        let path = event.paths.first()?;

        match (mode, event.tracker()) {
            (RenameMode::From, Some(tracker)) => {
                self.departures.insert(
                    tracker,
                    Departure {
                        path: path.clone(),
                        kind: EntryKind::File,
                        seen: now,
                    },
                );
                None
            }
            // a watched directory reports its own move without a cookie
            (RenameMode::From, None) => {
                if let Some(departure) = self.departures.values_mut().find(|d| &d.path == path) {
                    departure.kind = EntryKind::Directory;
                }
                None
            }
            (RenameMode::To, tracker) => {
                if tracker.is_some_and(|t| self.departures.remove(&t).is_some()) {
                    return None;
                }
                Some(FsEvent::Created {
                    path: path.clone(),
                    kind: EntryKind::of(path),
                })
            }
            _ => None,
        }
    }

    /// Departures whose window has elapsed, oldest first.
    pub fn expire(&mut self, now: Instant) -> Vec<FsEvent> {
        let due: Vec<usize> = self
            .departures
            .iter()
            .filter(|(_, departure)| now.saturating_duration_since(departure.seen) >= self.window)
            .map(|(tracker, _)| *tracker)
            .collect();
        let mut expired: Vec<Departure> = due
            .iter()
            .filter_map(|tracker| self.departures.remove(tracker))
            .collect();
        expired.sort_by_key(|departure| departure.seen);
        expired
            .into_iter()
            .map(|departure| FsEvent::Deleted {
                path: departure.path,
                kind: departure.kind,
            })
            .collect()
    }

    /// When the oldest unmatched departure expires.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.departures
            .values()
            .map(|departure| departure.seen + self.window)
            .min()
    }

    pub fn is_empty(&self) -> bool {
        self.departures.is_empty()
    }
}
