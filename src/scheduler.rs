//! Scheduled callbacks on the UI thread.
//!
//! A [`Scheduler`] runs callbacks at fixed intervals as the host's idle or
//! redraw tick advances its clock. It is a UI-only mechanism and shares
//! nothing with the lock-free audio path in [`crate::param`]. Each
//! registration returns a [`Subscription`]; dropping it cancels the task.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::reactive::Subscription;

type Task = Box<dyn FnMut()>;

struct Entry {
    id: u64,
    interval: Duration,
    due: Duration,
    repeat: bool,
    /// Taken out while the callback runs.
    task: Option<Task>,
}

#[derive(Default)]
struct Inner {
    now: Duration,
    entries: Vec<Entry>,
    next_id: u64,
}

/// A cooperative timer wheel driven by [`advance`](Scheduler::advance).
/// Cloning shares the same schedule.
#[derive(Clone, Default)]
pub struct Scheduler {
    inner: Rc<RefCell<Inner>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` every `interval`, first after one interval has passed.
    pub fn schedule_every(&self, interval: Duration, task: impl FnMut() + 'static) -> Subscription {
        self.add(interval, true, Box::new(task))
    }

    /// Run `task` once after `delay`.
    pub fn schedule_once(&self, delay: Duration, task: impl FnOnce() + 'static) -> Subscription {
        let mut task = Some(task);
        self.add(
            delay,
            false,
            Box::new(move || {
                if let Some(task) = task.take() {
                    task();
                }
            }),
        )
    }

    fn add(&self, interval: Duration, repeat: bool, task: Task) -> Subscription {
        // A zero interval would fire on every pass of the catch-up loop.
        let interval = interval.max(Duration::from_millis(1));
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            let due = inner.now + interval;
            inner.entries.push(Entry { id, interval, due, repeat, task: Some(task) });
            id
        };
        let weak: Weak<RefCell<Inner>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().entries.retain(|e| e.id != id);
            }
        })
    }

    /// Advance the clock by `elapsed` and run every task that came due, in
    /// due order. A repeating task that fell behind runs once, not once per
    /// missed interval. Returns the number of callbacks run.
    pub fn advance(&self, elapsed: Duration) -> usize {
        let now = {
            let mut inner = self.inner.borrow_mut();
            inner.now += elapsed;
            inner.now
        };

        let mut due: Vec<(Duration, u64)> = self
            .inner
            .borrow()
            .entries
            .iter()
            .filter(|e| e.due <= now)
            .map(|e| (e.due, e.id))
            .collect();
        due.sort();

        let mut ran = 0;
        for (_, id) in due {
            let taken = {
                let mut inner = self.inner.borrow_mut();
                inner.entries.iter_mut().find(|e| e.id == id).and_then(|e| e.task.take())
            };
            // Cancelled by an earlier callback in this pass.
            let Some(mut task) = taken else { continue };
            task();
            ran += 1;

            let mut inner = self.inner.borrow_mut();
            let Some(index) = inner.entries.iter().position(|e| e.id == id) else { continue };
            if inner.entries[index].repeat {
                let entry = &mut inner.entries[index];
                entry.task = Some(task);
                while entry.due <= now {
                    entry.due += entry.interval;
                }
            } else {
                inner.entries.remove(index);
            }
        }
        ran
    }

    /// Time elapsed since the scheduler was created.
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    /// Number of scheduled tasks.
    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Scheduler")
            .field("now", &inner.now)
            .field("tasks", &inner.entries.len())
            .finish()
    }
}
