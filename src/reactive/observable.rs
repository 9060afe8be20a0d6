//! Observable<T> values and Subscription handles for the UI thread.
//!
//! An [`Observable`] holds a value and notifies its subscribers when the value
//! changes. Each subscription is an explicit [`Subscription`] handle: dropping
//! the handle removes the callback. Owners keep their handles in a
//! [`Subscriptions`] list and release them all at once on teardown.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<T> = Box<dyn FnMut(&T)>;

struct Listener<T> {
    id: u64,
    /// Wrapped in `Option` so the callback can be taken out while it runs
    /// (no `RefMut` is held across user code).
    callback: Option<Callback<T>>,
}

struct Inner<T> {
    value: T,
    listeners: Vec<Listener<T>>,
    next_id: u64,
}

/// A shared, observable value. Cloning shares the same value.
pub struct Observable<T: 'static> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T: 'static> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self { inner: Rc::clone(&self.inner) }
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("listeners", &inner.listeners.len())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner { value, listeners: Vec::new(), next_id: 0 })),
        }
    }

    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Read by reference without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Store `value` and notify subscribers if it differs from the current
    /// one. Returns `true` if it changed.
    pub fn set(&self, value: T) -> bool {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return false;
            }
            inner.value = value;
        }
        self.notify();
        true
    }

    /// Store `value` and notify subscribers even if it is unchanged.
    pub fn publish(&self, value: T) {
        self.inner.borrow_mut().value = value;
        self.notify();
    }

    /// Edit the value in place and notify if it changed.
    pub fn update(&self, f: impl FnOnce(&mut T)) -> bool {
        let mut next = self.get();
        f(&mut next);
        self.set(next)
    }

    /// Call `callback` with every new value until the handle is dropped.
    pub fn subscribe(&self, callback: impl FnMut(&T) + 'static) -> Subscription {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.listeners.push(Listener { id, callback: Some(Box::new(callback)) });
            id
        };
        let weak: Weak<RefCell<Inner<T>>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().listeners.retain(|l| l.id != id);
            }
        })
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    fn notify(&self) {
        let ids: Vec<u64> = self.inner.borrow().listeners.iter().map(|l| l.id).collect();
        for id in ids {
            let taken = {
                let mut inner = self.inner.borrow_mut();
                let value = inner.value.clone();
                inner
                    .listeners
                    .iter_mut()
                    .find(|l| l.id == id)
                    .and_then(|l| l.callback.take())
                    .map(|cb| (cb, value))
            };
            // Removed meanwhile, or already running further up the stack.
            let Some((mut callback, value)) = taken else { continue };
            callback(&value);
            let mut inner = self.inner.borrow_mut();
            if let Some(listener) = inner.listeners.iter_mut().find(|l| l.id == id) {
                listener.callback = Some(callback);
            }
        }
    }
}

/// A registration handle. Dropping it (or calling
/// [`unsubscribe`](Self::unsubscribe)) releases the registration.
#[must_use = "dropping a Subscription releases it immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// A handle that runs `release` when dropped.
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self { release: Some(Box::new(release)) }
    }

    /// A handle with nothing to release.
    pub fn empty() -> Self {
        Self { release: None }
    }

    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("active", &self.release.is_some()).finish()
    }
}

/// The subscriptions one owner holds; all are released when it is dropped
/// or cleared.
#[derive(Debug, Default)]
pub struct Subscriptions {
    handles: Vec<Subscription>,
}

impl Subscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, subscription: Subscription) {
        self.handles.push(subscription);
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Release every subscription now.
    pub fn clear(&mut self) {
        self.handles.clear();
    }
}
