use std::ffi::CStr;
use std::sync::OnceLock;

use crate::{Error, Result};

mod libinjector;

#[cfg(test)]
pub(crate) mod stub;

/// Raw outcome of one backend call; `Err` carries the nonzero status code.
pub(crate) type Status<T> = std::result::Result<T, i32>;

/// Capability surface of the native injection backend.
///
/// Attach and library handles cross this boundary as opaque pointer-width
/// tokens. Only a [`Session`](crate::session::Session) holds an attach
/// token, and it releases it exactly once. `uninject` and `last_error`
/// appeared in later protocol revisions, so they are optional capabilities:
/// consult `supports_uninject` before requesting an unload.
pub(crate) trait Backend: Send + Sync {
    fn attach(&self, pid: i32) -> Status<u64>;
    fn inject(&self, attach: u64, library_path: &CStr) -> Status<u64>;
    fn uninject(&self, attach: u64, library: u64) -> Status<()>;
    fn detach(&self, attach: u64) -> Status<()>;
    fn supports_uninject(&self) -> bool;
    /// Out-of-band diagnostic for the most recent failure, if the backend
    /// offers one. An empty string counts as no diagnostic.
    fn last_error(&self) -> Option<String>;
}

// The native library is loaded once and its function table resolved once;
// there is no unload operation, so the backend lives as long as the process.
static BACKEND: OnceLock<std::result::Result<libinjector::LibinjectorBackend, Error>> =
    OnceLock::new();

pub(crate) fn default_backend() -> Result<&'static dyn Backend> {
    match BACKEND.get_or_init(libinjector::LibinjectorBackend::load) {
        Ok(backend) => Ok(backend),
        Err(err) => Err(err.clone()),
    }
}
