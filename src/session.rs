use std::ffi::CStr;

use crate::backend::Backend;
use crate::classify::{classify, detach_failure};
use crate::{LibraryHandle, Result};

/// One attach/detach bracket against a target process.
///
/// The session exclusively owns the backend's attach token. Detach happens
/// exactly once on every exit path: explicitly via [`Session::detach`] on
/// the success path, or through the `Drop` backstop while an earlier failure
/// is propagating. A detach failure during unwinding never replaces the
/// in-flight error; it is only logged as secondary context.
pub(crate) struct Session<'a> {
    backend: &'a dyn Backend,
    handle: u64,
    detached: bool,
}

impl std::fmt::Debug for Session<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("handle", &self.handle)
            .field("detached", &self.detached)
            .finish_non_exhaustive()
    }
}

impl<'a> Session<'a> {
    /// Attach to `pid`. On failure no resource is held.
    pub(crate) fn attach(backend: &'a dyn Backend, pid: i32) -> Result<Session<'a>> {
        match backend.attach(pid) {
            Ok(handle) => Ok(Session {
                backend,
                handle,
                detached: false,
            }),
            Err(status) => Err(classify("injector_attach", status, backend.last_error())),
        }
    }

    /// Ask the target to load the library at the (target-visible) path.
    pub(crate) fn inject(&mut self, library_path: &CStr) -> Result<LibraryHandle> {
        self.backend
            .inject(self.handle, library_path)
            .map(LibraryHandle::from_raw)
            .map_err(|status| classify("injector_inject", status, self.backend.last_error()))
    }

    /// Ask the target to unload a library injected within this session.
    ///
    /// A failure here leaves the session usable; the caller still detaches.
    pub(crate) fn uninject(&mut self, library: LibraryHandle) -> Result<()> {
        self.backend
            .uninject(self.handle, library.as_raw())
            .map_err(|status| classify("injector_uninject", status, self.backend.last_error()))
    }

    /// Release the attach token. Consumes the session, so the `Drop`
    /// backstop cannot release it a second time.
    pub(crate) fn detach(mut self) -> Result<()> {
        self.detached = true;
        self.backend
            .detach(self.handle)
            .map_err(|status| detach_failure(status, self.backend.last_error()))
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        if self.detached {
            return;
        }
        self.detached = true;
        if let Err(status) = self.backend.detach(self.handle) {
            // The error that unwound us stays primary; this one is context.
            log::warn!(
                "injector_detach returned {status} while recovering from an earlier failure"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Session;
    use crate::backend::stub::StubBackend;

    #[test]
    fn dropping_an_undetached_session_detaches_once() {
        let stub = StubBackend::default();
        {
            let _session = Session::attach(&stub, 42).unwrap();
        }
        assert_eq!(stub.attach_count(), 1);
        assert_eq!(stub.detach_count(), 1);
    }

    #[test]
    fn explicit_detach_skips_the_drop_backstop() {
        let stub = StubBackend::default();
        let session = Session::attach(&stub, 42).unwrap();
        session.detach().unwrap();
        assert_eq!(stub.detach_count(), 1);
    }

    #[test]
    fn failed_attach_holds_nothing_to_detach() {
        let stub = StubBackend {
            attach_status: -3,
            ..Default::default()
        };
        let err = Session::attach(&stub, 42).unwrap_err();
        assert_eq!(err.raw_status(), Some(-3));
        assert_eq!(err.operation(), Some("injector_attach"));
        assert_eq!(stub.detach_count(), 0);
    }

    #[test]
    fn detach_failure_in_drop_is_swallowed() {
        let stub = StubBackend {
            detach_status: -2,
            ..Default::default()
        };
        {
            let _session = Session::attach(&stub, 42).unwrap();
            // Dropping here stands in for an error unwinding past the
            // session; the detach failure must not panic or escape.
        }
        assert_eq!(stub.detach_count(), 1);
    }
}
