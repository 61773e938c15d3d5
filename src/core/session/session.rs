use serde::Serialize;

/// How far a session should advance through the changes queued on it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seek {
    /// Stop once the given turn has begun
    Turn(u32),
    /// Apply everything that is queued
    End,
}

/// Numeric seek signal; any negative value means "advance to completion".
impl From<i64> for Seek {
    fn from(value: i64) -> Self {
        if value < 0 {
            Seek::End
        } else {
            Seek::Turn(u32::try_from(value).unwrap_or(u32::MAX))
        }
    }
}

impl std::fmt::Display for Seek {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Seek::Turn(turn) => write!(f, "turn {}", turn),
            Seek::End => write!(f, "end"),
        }
    }
}

/// Sessions that have an initial run step
pub trait Runnable {
    /// Begin running the session
    fn play(&mut self);
}

/// Sessions that accept changes and advance through them
pub trait Mutable {
    /// Queue a change for later application
    fn add(&mut self, changes: &str);

    /// Apply queued changes up to `seek`
    fn fast_forward_to(&mut self, seek: Seek);
}

/// Sessions holding resources that must be released before removal
pub trait Destroyable {
    /// Release everything the session holds
    fn destroy(&mut self);
}

/// Sessions that can hand out an independent copy of their state
pub trait Snapshot {
    /// Owned, acyclic copy of the observable state
    type Snapshot: Clone + Serialize;

    /// Copy the current state out of the session
    fn snapshot(&self) -> Self::Snapshot;
}

/// Everything the registry needs from a session
pub trait Session: Runnable + Mutable + Destroyable + Snapshot {}

impl<T> Session for T where T: Runnable + Mutable + Destroyable + Snapshot {}
