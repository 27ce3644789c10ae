//! Detecting values that are never released.
//!
//! A value with an explicit reference count that is dropped while its
//! count is still positive has been leaked: some holder forgot to release
//! it. Such values carry a [`ResourceLeak`] which reports this through a
//! `warn!` event when it is dropped without having been closed.
//!
//! How much effort goes into detection is controlled by the process-wide
//! [`Level`]. It can be set via [`set_level`] or through the
//! `DOMAIN_LEAK_DETECTION` environment variable which is read the first
//! time the level is needed and no level has been set explicitly.

use core::cell::RefCell;
use core::fmt;
use core::str::FromStr;
use core::sync::atomic::{AtomicU8, Ordering};
use std::collections::VecDeque;
use std::env;
use tracing::warn;

/// The environment variable for the initial detection level.
pub const LEVEL_ENV: &str = "DOMAIN_LEAK_DETECTION";

/// The number of access hints kept at level [`Level::Advanced`].
const MAX_HINTS: usize = 4;

const UNSET: u8 = u8::MAX;

static LEVEL: AtomicU8 = AtomicU8::new(UNSET);

//------------ Level ---------------------------------------------------------

/// The level of leak detection.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(u8)]
pub enum Level {
    /// No leak detection at all.
    Disabled = 0,

    /// Leaked values are reported.
    #[default]
    Simple = 1,

    /// Leaked values are reported together with their last access hints.
    Advanced = 2,
}

impl Level {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Level::Disabled,
            2 => Level::Advanced,
            _ => Level::Simple,
        }
    }

    fn from_env() -> Self {
        match env::var(LEVEL_ENV) {
            Ok(value) => value.parse().unwrap_or_else(|_| {
                warn!(
                    "ignoring invalid value {:?} for {}",
                    value, LEVEL_ENV
                );
                Level::default()
            }),
            Err(_) => Level::default(),
        }
    }
}

impl FromStr for Level {
    type Err = UnknownLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("disabled") {
            Ok(Level::Disabled)
        } else if s.eq_ignore_ascii_case("simple") {
            Ok(Level::Simple)
        } else if s.eq_ignore_ascii_case("advanced") {
            Ok(Level::Advanced)
        } else {
            Err(UnknownLevel(()))
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            Level::Disabled => "disabled",
            Level::Simple => "simple",
            Level::Advanced => "advanced",
        })
    }
}

/// Returns the current detection level.
pub fn level() -> Level {
    let current = LEVEL.load(Ordering::Relaxed);
    if current != UNSET {
        return Level::from_u8(current);
    }
    let level = Level::from_env() as u8;
    match LEVEL.compare_exchange(
        UNSET,
        level,
        Ordering::Relaxed,
        Ordering::Relaxed,
    ) {
        Ok(_) => Level::from_u8(level),
        Err(other) => Level::from_u8(other),
    }
}

/// Sets the detection level for all values created from now on.
pub fn set_level(level: Level) {
    LEVEL.store(level as u8, Ordering::Relaxed)
}

//------------ ResourceLeak --------------------------------------------------

/// Tracks a single value for leaks.
///
/// The tracker is open from creation until [`close`][Self::close] is
/// called. Dropping it while open reports a leak.
pub struct ResourceLeak {
    /// The type name of the tracked value used in the report.
    kind: &'static str,

    /// Whether the tracked value is still alive.
    open: bool,

    /// The most recent access hints if running at the advanced level.
    hints: Option<RefCell<VecDeque<String>>>,
}

impl ResourceLeak {
    /// Starts tracking a value of the given kind.
    pub fn new(kind: &'static str) -> Self {
        let level = level();
        ResourceLeak {
            kind,
            open: level != Level::Disabled,
            hints: (level == Level::Advanced)
                .then(|| RefCell::new(VecDeque::with_capacity(MAX_HINTS))),
        }
    }

    /// Returns whether the tracked value has not been closed yet.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Records an access to the tracked value.
    ///
    /// Hints are only kept at level [`Level::Advanced`]. Only the last few
    /// are retained.
    pub fn touch(&self, hint: impl fmt::Display) {
        if let Some(hints) = self.hints.as_ref() {
            let mut hints = hints.borrow_mut();
            if hints.len() == MAX_HINTS {
                hints.pop_front();
            }
            hints.push_back(hint.to_string());
        }
    }

    /// Stops tracking because the value has been deallocated properly.
    pub fn close(&mut self) {
        self.open = false;
        if let Some(hints) = self.hints.as_mut() {
            hints.get_mut().clear()
        }
    }
}

impl Drop for ResourceLeak {
    fn drop(&mut self) {
        if !self.open {
            return;
        }
        match self.hints.as_ref() {
            Some(hints) => {
                let hints = hints.borrow();
                warn!(
                    kind = self.kind,
                    hints = ?hints,
                    "LEAK: {} dropped without being released",
                    self.kind
                );
            }
            None => {
                warn!(
                    kind = self.kind,
                    "LEAK: {} dropped without being released. \
                     Set {}=advanced to see recent accesses.",
                    self.kind,
                    LEVEL_ENV
                );
            }
        }
    }
}

impl fmt::Debug for ResourceLeak {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ResourceLeak")
            .field("kind", &self.kind)
            .field("open", &self.open)
            .finish()
    }
}

//------------ UnknownLevel --------------------------------------------------

/// A string was not a valid leak detection level.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct UnknownLevel(());

impl fmt::Display for UnknownLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("unknown leak detection level")
    }
}

impl std::error::Error for UnknownLevel {}

//============ Tests =========================================================
