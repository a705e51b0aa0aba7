use std::ops::{Deref, DerefMut};

use crate::error::Result;
use crate::handle::FileHandle;

/// Scoped acquisition of a [`FileHandle`].
///
/// The guard dereferences to the handle and closes it when dropped, on
/// normal exit, early return, `?` propagation and unwinding alike. The
/// handle itself outlives the guard; any use after that reports `Closed`.
pub struct Scope<'a> {
    handle: &'a mut FileHandle,
}

impl Deref for Scope<'_> {
    type Target = FileHandle;

    fn deref(&self) -> &FileHandle {
        self.handle
    }
}

impl DerefMut for Scope<'_> {
    fn deref_mut(&mut self) -> &mut FileHandle {
        self.handle
    }
}

impl Drop for Scope<'_> {
    fn drop(&mut self) {
        if self.handle.is_closed() {
            return;
        }
        if let Err(e) = self.handle.close() {
            debug!("scope exit for {}: {e}", self.handle.path().display());
        }
    }
}

impl FileHandle {
    pub fn scope(&mut self) -> Scope<'_> {
        Scope { handle: self }
    }

    /// Run `f` inside a scope.
    ///
    /// The descriptor is released when `f` returns. An error from `f` is
    /// logged and counts as handled, yielding `None`.
    pub fn scoped<T, F>(&mut self, f: F) -> Option<T>
    where
        F: FnOnce(&mut FileHandle) -> Result<T>,
    {
        let mut scope = self.scope();
        match f(&mut *scope) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("error inside scope on {}: {e}", scope.path().display());
                None
            }
        }
    }
}
