//! Periodic timer registrations owned by the simulation clock.
//!
//! The engine never runs its own event loop. A host supplies a
//! [`TimerDriver`] that registers a periodic callback and hands back a
//! [`TimerHandle`]. The handle *is* the registration: dropping it cancels the
//! callback. The clock keeps the handle only while running, so every path
//! that stops playback (pause, steady state, resize, reset, restore, or
//! dropping the simulation) releases the registration.
//!
//! When the host's timer fires it calls
//! [`Simulation::on_timer_fired`](crate::simulation::Simulation::on_timer_fired)
//! with the [`TimerId`]. Firings for a registration that is no longer active
//! are ignored.
//!
//! [`ManualTimer`] is a cooperative, virtual-time driver for headless hosts
//! and tests.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use life_engine::timer::{ManualTimer, TimerDriver};
//!
//! let mut timer = ManualTimer::new();
//! let handle = timer.schedule(Duration::from_millis(250));
//! assert_eq!(timer.advance(Duration::from_secs(1)).len(), 4);
//!
//! drop(handle);
//! assert!(timer.advance(Duration::from_secs(1)).is_empty());
//! ```

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// TimerId
// ---------------------------------------------------------------------------

/// Identifies one periodic registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimerId(pub u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// TimerHandle
// ---------------------------------------------------------------------------

type CancelFn = Box<dyn FnOnce(TimerId)>;

/// Owned periodic registration. Cancelled on drop.
pub struct TimerHandle {
    id: TimerId,
    interval: Duration,
    cancel: Option<CancelFn>,
}

impl TimerHandle {
    /// Wrap a registration. `cancel` runs exactly once, when the handle is
    /// dropped.
    pub fn new<F>(id: TimerId, interval: Duration, cancel: F) -> Self
    where
        F: FnOnce(TimerId) + 'static,
    {
        Self {
            id,
            interval,
            cancel: Some(Box::new(cancel)),
        }
    }

    #[inline]
    pub fn id(&self) -> TimerId {
        self.id
    }

    /// The period the registration was scheduled with.
    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel(self.id);
        }
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle")
            .field("id", &self.id)
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// TimerDriver
// ---------------------------------------------------------------------------

/// Host-side periodic callback mechanism.
///
/// Implementations must deliver at most one firing at a time: each call into
/// the simulation runs to completion before the next firing is delivered.
pub trait TimerDriver {
    /// Register a periodic callback every `interval`.
    fn schedule(&mut self, interval: Duration) -> TimerHandle;
}

// ---------------------------------------------------------------------------
// ManualTimer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct Registration {
    interval: Duration,
    next_due: Duration,
}

#[derive(Debug, Default)]
struct ManualTimerState {
    now: Duration,
    next_id: u64,
    active: BTreeMap<TimerId, Registration>,
}

impl ManualTimerState {
    /// Pop the earliest firing due at or before `until`, moving the clock to
    /// its deadline. Ties go to the older registration.
    fn pop_due(&mut self, until: Duration) -> Option<TimerId> {
        let (id, due) = self
            .active
            .iter()
            .filter(|(_, r)| r.next_due <= until)
            .min_by_key(|(id, r)| (r.next_due, **id))
            .map(|(id, r)| (*id, r.next_due))?;

        if let Some(registration) = self.active.get_mut(&id) {
            registration.next_due += registration.interval;
        }
        self.now = due;
        Some(id)
    }
}

/// Virtual-time [`TimerDriver`] advanced explicitly by the host.
///
/// Clones share the same clock and registrations, so a host can keep one
/// clone while the simulation owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualTimer {
    inner: Rc<RefCell<ManualTimerState>>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    /// Number of live registrations.
    pub fn active_count(&self) -> usize {
        self.inner.borrow().active.len()
    }

    pub fn is_active(&self, id: TimerId) -> bool {
        self.inner.borrow().active.contains_key(&id)
    }

    /// Advance virtual time by `elapsed` and return every firing in deadline
    /// order.
    ///
    /// The list is computed up front, so cancellations made while the host
    /// processes it are not reflected. Use
    /// [`advance_with`](Self::advance_with) when handling a firing may cancel
    /// the registration.
    pub fn advance(&self, elapsed: Duration) -> Vec<TimerId> {
        let mut fired = Vec::new();
        self.advance_with(elapsed, |id| fired.push(id));
        fired
    }

    /// Advance virtual time by `elapsed`, invoking `on_fire` for one firing
    /// at a time. Registrations cancelled or created inside `on_fire` are
    /// honored for the rest of the advance.
    pub fn advance_with<F>(&self, elapsed: Duration, mut on_fire: F)
    where
        F: FnMut(TimerId),
    {
        let until = self.now() + elapsed;
        loop {
            // The borrow must end before `on_fire`, which may drop handles.
            let next = self.inner.borrow_mut().pop_due(until);
            match next {
                Some(id) => on_fire(id),
                None => break,
            }
        }
        self.inner.borrow_mut().now = until;
    }
}

impl TimerDriver for ManualTimer {
    fn schedule(&mut self, interval: Duration) -> TimerHandle {
        let interval = interval.max(Duration::from_nanos(1));
        let id = {
            let mut state = self.inner.borrow_mut();
            let id = TimerId(state.next_id);
            state.next_id += 1;
            let next_due = state.now + interval;
            state.active.insert(
                id,
                Registration {
                    interval,
                    next_due,
                },
            );
            id
        };

        let weak: Weak<RefCell<ManualTimerState>> = Rc::downgrade(&self.inner);
        TimerHandle::new(id, interval, move |id| {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().active.remove(&id);
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
