//! Explicit reference counting.
//!
//! Messages and the entries attached to them can be units of explicitly
//! managed memory. Each such unit carries a [`RefCnt`] starting at one.
//! Every holder acquires a reference via [`ReferenceCounted::retain`] and
//! gives it back via [`ReferenceCounted::release`]. The unit is deallocated
//! by the release that brings the count to zero.
//!
//! Using a count incorrectly, i.e., releasing more references than are
//! held or retaining a unit that is already deallocated, is a programming
//! error. It panics in debug builds. In release builds the error is logged
//! and the count is left unchanged.

use core::cell::Cell;
use core::fmt;
use core::num::NonZeroUsize;
use tracing::error;

//------------ ReferenceCounted ----------------------------------------------

/// A type with an explicit reference count.
pub trait ReferenceCounted {
    /// Returns the current reference count.
    ///
    /// A value of zero means the value has been deallocated.
    fn ref_cnt(&self) -> usize;

    /// Increases the reference count by `increment`.
    fn retain_by(&self, increment: NonZeroUsize);

    /// Decreases the reference count by `decrement`.
    ///
    /// Returns `true` if and only if the count has reached zero and the
    /// value has been deallocated.
    fn release_by(&mut self, decrement: NonZeroUsize) -> bool;

    /// Increases the reference count by one.
    ///
    /// Returns the value itself for chaining.
    fn retain(&self) -> &Self
    where
        Self: Sized,
    {
        self.retain_by(NonZeroUsize::MIN);
        self
    }

    /// Decreases the reference count by one.
    ///
    /// Returns `true` if and only if the count has reached zero and the
    /// value has been deallocated.
    fn release(&mut self) -> bool {
        self.release_by(NonZeroUsize::MIN)
    }
}

//------------ Resource ------------------------------------------------------

/// A type that can be attached to a message.
///
/// Questions and records may or may not be reference counted. A message
/// uses this trait to find out which of its entries it has to release when
/// it is deallocated itself. The default implementation says that the
/// value is not reference counted, so plain types only need an empty impl.
pub trait Resource {
    /// Returns the reference count of the value if it has one.
    fn as_ref_counted(&mut self) -> Option<&mut dyn ReferenceCounted> {
        None
    }
}

impl<T: Resource + ?Sized> Resource for Box<T> {
    fn as_ref_counted(&mut self) -> Option<&mut dyn ReferenceCounted> {
        (**self).as_ref_counted()
    }
}

/// Releases every reference counted value in `items` once.
pub(crate) fn release_all<T: Resource>(items: &mut [T]) {
    for item in items {
        if let Some(item) = item.as_ref_counted() {
            item.release();
        }
    }
}

/// Checks that `item` may be attached to the value counted by `owner`.
///
/// Attaching a deallocated entry or attaching to a deallocated value is a
/// programming error. If this returns `false`, the entry must not be
/// attached. An entry that is still alive has been released by then since
/// nobody else would ever release it.
pub(crate) fn check_attach<T: Resource>(owner: &RefCnt, item: &mut T) -> bool {
    if let Some(item) = item.as_ref_counted() {
        if item.ref_cnt() == 0 {
            attach_misuse("attach of deallocated entry");
            return false;
        }
    }
    if owner.is_dead() {
        attach_misuse("attach to deallocated value");
        if let Some(item) = item.as_ref_counted() {
            item.release();
        }
        return false;
    }
    true
}

//------------ RefCnt --------------------------------------------------------

/// A reference count.
///
/// The count starts at one for the reference held by whoever created the
/// value. It lives in a [`Cell`], so retaining only needs a shared
/// reference. This also means that values carrying a count cannot be
/// shared between threads.
pub struct RefCnt(Cell<usize>);

impl RefCnt {
    /// Creates a new count of one.
    pub fn new() -> Self {
        RefCnt(Cell::new(1))
    }

    /// Returns the current count.
    pub fn get(&self) -> usize {
        self.0.get()
    }

    /// Returns whether the count has reached zero.
    pub fn is_dead(&self) -> bool {
        self.get() == 0
    }

    /// Increases the count.
    ///
    /// Returns whether the count was changed.
    pub fn retain(&self, increment: NonZeroUsize) -> bool {
        let cnt = self.get();
        if cnt == 0 {
            misuse("retain on deallocated value", cnt, increment);
            return false;
        }
        match cnt.checked_add(increment.get()) {
            Some(new) => {
                self.0.set(new);
                true
            }
            None => {
                misuse("reference count overflow", cnt, increment);
                false
            }
        }
    }

    /// Decreases the count.
    ///
    /// Returns `true` if the count has reached zero with this call.
    pub fn release(&self, decrement: NonZeroUsize) -> bool {
        let cnt = self.get();
        if cnt < decrement.get() {
            misuse("release of unheld references", cnt, decrement);
            return false;
        }
        self.0.set(cnt - decrement.get());
        cnt == decrement.get()
    }
}

impl Default for RefCnt {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RefCnt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("RefCnt").field(&self.get()).finish()
    }
}

fn misuse(what: &'static str, cnt: usize, delta: NonZeroUsize) {
    error!(ref_cnt = cnt, delta = delta.get(), "{}", what);
    debug_assert!(false, "{}: refCnt {}, delta {}", what, cnt, delta);
}

fn attach_misuse(what: &'static str) {
    error!("{}", what);
    debug_assert!(false, "{}", what);
}

//============ Tests =========================================================
