use chrono::{DateTime, TimeDelta, Utc};
use std::fmt;
use std::time::Duration;

/// Kind of event that can be persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Motion,
    Face,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Motion, Category::Face];

    /// Lowercase name used in file names and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Motion => "motion",
            Category::Face => "face",
        }
    }

    fn index(self) -> usize {
        match self {
            Category::Motion => 0,
            Category::Face => 1,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug)]
struct Slot {
    cooldown: TimeDelta,
    last_saved: Option<DateTime<Utc>>,
}

/// Rate limit on saved snapshots, tracked per [`Category`].
///
/// The gate only advises; callers decide whether an event happened, ask
/// [`should_save`](Self::should_save) and [`record`](Self::record) once the
/// snapshot is written.
#[derive(Clone, Debug)]
pub struct CooldownGate {
    slots: [Slot; 2],
}

impl CooldownGate {
    pub fn new(motion: Duration, face: Duration) -> Self {
        let slot = |d: Duration| Slot {
            cooldown: TimeDelta::from_std(d).unwrap_or(TimeDelta::MAX),
            last_saved: None,
        };
        Self {
            slots: [slot(motion), slot(face)],
        }
    }

    /// Whether more than the cooldown has passed since the last save.
    pub fn should_save(&self, category: Category, now: DateTime<Utc>) -> bool {
        let slot = &self.slots[category.index()];
        match slot.last_saved {
            None => true,
            Some(last) => now - last > slot.cooldown,
        }
    }

    /// Note a save at `now`. Never moves the last-saved time backwards.
    pub fn record(&mut self, category: Category, now: DateTime<Utc>) {
        let slot = &mut self.slots[category.index()];
        slot.last_saved = Some(slot.last_saved.map_or(now, |last| last.max(now)));
    }

    pub fn last_saved(&self, category: Category) -> Option<DateTime<Utc>> {
        self.slots[category.index()].last_saved
    }
}
