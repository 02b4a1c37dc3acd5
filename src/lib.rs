//! Load (and optionally unload) shared libraries in already-running
//! processes.
//!
//! The remote-execution machinery — ptrace, symbol resolution, gaining a
//! foothold in the target — lives in the `injector` native library, which
//! this crate loads at runtime and treats as a black box. What this crate
//! owns is the orchestration: attaching to the target, requesting the load,
//! detaching on every control path, and turning backend status codes into
//! actionable errors.
//!
//! # Quickstart
//! ```no_run
//! use dylib_inject::{Library, Process, inject};
//!
//! let process = Process::from_pid(1234)?;
//! let handle = inject(process, &Library::from_path("/path/to/libagent.so"))?;
//! println!("loaded as {handle}");
//! # Ok::<(), dylib_inject::Error>(())
//! ```
//!
//! # Containerized targets
//! When the target's filesystem view differs from the caller's (container or
//! chroot jail), give the library path as the *target* sees it and point
//! [`Library::with_process_root`] at the target's root:
//! ```no_run
//! use dylib_inject::{Library, Process, inject};
//!
//! let library = Library::from_path("/opt/libagent.so").with_process_root("/proc/1234/root");
//! let handle = inject(Process::from_pid_unchecked(1234), &library)?;
//! # Ok::<(), dylib_inject::Error>(())
//! ```
//!
//! # Backend location
//! The backend is resolved once per process, never unloaded, and found via
//! the system loader under its platform soname; set `LIBINJECTOR_PATH` to
//! load it from a specific file instead.
//!
//! # Concurrency
//! Each injection is a blocking sequence of backend calls with no timeouts
//! of its own. Sessions hold no shared mutable state, so independent
//! injections may run from multiple threads; whether the backend tolerates
//! concurrent attaches to the *same* pid is its own affair, so serialize
//! those unless its documentation says otherwise.

mod backend;
mod classify;
mod error;
mod library;
mod path;
mod process;
mod session;

pub use error::{Error, Result};
pub use library::Library;
pub use process::Process;

use std::fmt;

use backend::Backend;
use session::Session;

/// Opaque token for a library loaded in the target process.
///
/// The value is backend-defined; treat it as an address-width integer with
/// no further meaning. If the library was left loaded, the token remains
/// meaningful to the target after detach.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LibraryHandle(u64);

impl LibraryHandle {
    pub(crate) fn from_raw(raw: u64) -> LibraryHandle {
        LibraryHandle(raw)
    }

    /// Return the backend-issued raw value.
    pub fn as_raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for LibraryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Inject the shared library into the process (or thread) with the given
/// pid. The library stays loaded after detach; the returned handle
/// identifies it inside the target.
///
/// # Examples
/// ```no_run
/// use dylib_inject::{Library, Process, inject};
///
/// let handle = inject(
///     Process::from_pid_unchecked(1234),
///     &Library::from_path("/path/to/libagent.so"),
/// )?;
/// # Ok::<(), dylib_inject::Error>(())
/// ```
pub fn inject(process: Process, library: &Library) -> Result<LibraryHandle> {
    run(process, library, false)
}

/// Inject the shared library and unload it again before detaching.
///
/// Both the library's load-time and unload-time side effects run in the
/// target, in that order, within a single attach bracket. Fails fast with a
/// not-supported error if the loaded backend predates the uninject
/// primitive.
///
/// # Examples
/// ```no_run
/// use dylib_inject::{Library, Process, inject_and_unload};
///
/// inject_and_unload(
///     Process::from_pid_unchecked(1234),
///     &Library::from_path("/path/to/libagent.so"),
/// )?;
/// # Ok::<(), dylib_inject::Error>(())
/// ```
pub fn inject_and_unload(process: Process, library: &Library) -> Result<LibraryHandle> {
    run(process, library, true)
}

fn run(process: Process, library: &Library, unload: bool) -> Result<LibraryHandle> {
    // The existence check uses the caller-visible path and runs before the
    // backend is even loaded; a missing library never touches the target.
    let caller_path = library.caller_path();
    if !caller_path.is_file() {
        return Err(Error::library_not_found(caller_path));
    }

    inject_with(backend::default_backend()?, process, library, unload)
}

fn inject_with(
    backend: &dyn Backend,
    process: Process,
    library: &Library,
    unload: bool,
) -> Result<LibraryHandle> {
    if unload && !backend.supports_uninject() {
        return Err(Error::not_supported(
            "the loaded injector backend does not provide injector_uninject",
        ));
    }

    let target_path = library.target_cstring()?;
    let mut session = Session::attach(backend, process.pid())?;
    let handle = session.inject(&target_path)?;
    if unload {
        session.uninject(handle)?;
    }
    session.detach()?;
    Ok(handle)
}
