//! ResourceArc Wrapper
//!
//! Persistent reader state handed to the BEAM. The item tree materializes
//! lazily, so one parsed document serves any number of later lookups.

use crate::reader::Reader;
use rustler::ResourceArc;
use std::sync::Mutex;

/// Wrapper for Reader that can be stored in a ResourceArc
pub struct ReaderResource {
    pub inner: Mutex<Reader>,
}

impl ReaderResource {
    pub fn new(reader: Reader) -> Self {
        ReaderResource {
            inner: Mutex::new(reader),
        }
    }

    /// Run `f` against the reader.
    ///
    /// # Errors
    ///
    /// Returns `"mutex_poisoned"` if the reader mutex is poisoned.
    pub fn with_reader<F, R>(&self, f: F) -> Result<R, &'static str>
    where
        F: FnOnce(&Reader) -> R,
    {
        let guard = self.inner.lock().map_err(|_| "mutex_poisoned")?;
        Ok(f(&guard))
    }

    /// Run `f` with mutable access, for loads.
    pub fn with_reader_mut<F, R>(&self, f: F) -> Result<R, &'static str>
    where
        F: FnOnce(&mut Reader) -> R,
    {
        let mut guard = self.inner.lock().map_err(|_| "mutex_poisoned")?;
        Ok(f(&mut guard))
    }
}

#[rustler::resource_impl]
impl rustler::Resource for ReaderResource {}

impl Default for ReaderResource {
    fn default() -> Self {
        Self::new(Reader::new())
    }
}

/// Type alias for the ResourceArc
pub type ReaderRef = ResourceArc<ReaderResource>;
