//! Contains the [`Handler`] trait, the sink every diagnostic of the engine is
//! reported to, and a few ready-made sinks.

use std::fmt;

use parking_lot::{RwLock, RwLockReadGuard};


/// A sink receiving the diagnostics reported while typeclasses, definitions
/// and instances are declared.
///
/// The receiving side decides what happens to a diagnostic; the reporting
/// side only aborts the operation that failed.
pub trait Handler<T>: Send + Sync {
    /// Receives a reported diagnostic.
    fn receive(&self, diagnostic: T);
}

/// Keeps every received diagnostic in reporting order.
#[derive(Debug)]
pub struct Storage<T: Send + Sync> {
    diagnostics: RwLock<Vec<T>>,
}

impl<T: Send + Sync> Storage<T> {
    /// Creates a storage holding nothing.
    #[must_use]
    pub const fn new() -> Self {
        Self { diagnostics: RwLock::new(Vec::new()) }
    }

    /// Returns a read guard over the diagnostics received so far.
    #[must_use]
    pub fn as_vec(&self) -> RwLockReadGuard<Vec<T>> { self.diagnostics.read() }

    /// Consumes the storage and returns its diagnostics.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> { self.diagnostics.into_inner() }

    /// Returns the number of diagnostics received so far.
    #[must_use]
    pub fn len(&self) -> usize { self.diagnostics.read().len() }

    /// Returns `true` if nothing has been received.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.diagnostics.read().is_empty() }

    /// Takes the received diagnostics out, leaving the storage empty.
    #[must_use]
    pub fn drain(&self) -> Vec<T> {
        std::mem::take(&mut *self.diagnostics.write())
    }

    /// Hands the received diagnostics over to another handler in reporting
    /// order, leaving the storage empty.
    pub fn forward_to<H: ?Sized + Handler<T>>(&self, handler: &H) {
        for diagnostic in self.drain() {
            handler.receive(diagnostic);
        }
    }
}

impl<T: Send + Sync> Default for Storage<T> {
    fn default() -> Self { Self::new() }
}

impl<T: Send + Sync, U: Into<T>> Handler<U> for Storage<T> {
    fn receive(&self, diagnostic: U) {
        self.diagnostics.write().push(diagnostic.into());
    }
}

/// Writes every received diagnostic to the [`log`] facade at a fixed level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Logger {
    level: log::Level,
}

impl Logger {
    /// Creates a logger writing at the given level.
    #[must_use]
    pub const fn new(level: log::Level) -> Self { Self { level } }

    /// Returns the level the diagnostics are written at.
    #[must_use]
    pub const fn level(&self) -> log::Level { self.level }
}

impl Default for Logger {
    fn default() -> Self { Self::new(log::Level::Error) }
}

impl<T: fmt::Display> Handler<T> for Logger {
    fn receive(&self, diagnostic: T) {
        log::log!(target: "kindred", self.level, "{diagnostic}");
    }
}

/// Panics on the first received diagnostic. Meant for tests and examples
/// that expect every declaration to succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Panic;

impl<T: fmt::Debug> Handler<T> for Panic {
    fn receive(&self, diagnostic: T) {
        panic!("unexpected diagnostic: {diagnostic:?}");
    }
}
