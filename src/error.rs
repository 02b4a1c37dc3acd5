use std::fmt;
use std::fmt::Display;
use std::path::{Path, PathBuf};

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ErrorKind {
    LibraryNotFound,
    PermissionDenied,
    ProcessNotFound,
    NotSupported,
    BackendUnavailable,
    InvalidInput,
    Injector,
    Detach,
    Io,
}

/// Error type for this crate.
///
/// This is intentionally a struct to minimize breaking changes over time, and
/// only exposes its message via `Display`. Failures reported by the native
/// backend additionally carry the failing operation name and the raw status
/// code; a missing-library failure carries the path that was checked.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: String,
    operation: Option<&'static str>,
    status: Option<i32>,
    path: Option<PathBuf>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    pub(crate) fn library_not_found(path: PathBuf) -> Self {
        let mut err = Self::new(
            ErrorKind::LibraryNotFound,
            format_args!("could not find library: {}", path.display()),
        );
        err.path = Some(path);
        err
    }

    pub(crate) fn invalid_input(msg: impl Display) -> Self {
        Self::new(ErrorKind::InvalidInput, msg)
    }

    pub(crate) fn not_supported(msg: impl Display) -> Self {
        Self::new(ErrorKind::NotSupported, msg)
    }

    pub(crate) fn backend_unavailable(msg: impl Display) -> Self {
        Self::new(ErrorKind::BackendUnavailable, msg)
    }

    pub(crate) fn process_not_found(pid: i32) -> Self {
        Self::new(
            ErrorKind::ProcessNotFound,
            format_args!("process not found: {pid}"),
        )
    }

    pub(crate) fn permission_denied(msg: impl Display) -> Self {
        Self::new(ErrorKind::PermissionDenied, msg)
    }

    pub(crate) fn injector(operation: &'static str, status: i32, msg: impl Display) -> Self {
        let mut err = Self::new(ErrorKind::Injector, msg);
        err.operation = Some(operation);
        err.status = Some(status);
        err
    }

    pub(crate) fn injector_permission_denied(
        operation: &'static str,
        status: i32,
        msg: impl Display,
    ) -> Self {
        let mut err = Self::new(ErrorKind::PermissionDenied, msg);
        err.operation = Some(operation);
        err.status = Some(status);
        err
    }

    pub(crate) fn detach_failed(status: i32, msg: impl Display) -> Self {
        let mut err = Self::new(ErrorKind::Detach, msg);
        err.operation = Some("injector_detach");
        err.status = Some(status);
        err
    }

    pub(crate) fn from_io(err: std::io::Error) -> Self {
        Self {
            kind: ErrorKind::Io,
            message: err.to_string(),
            operation: None,
            status: None,
            path: None,
            source: Some(Box::new(err)),
        }
    }

    fn new(kind: ErrorKind, msg: impl Display) -> Self {
        Self {
            kind,
            message: msg.to_string(),
            operation: None,
            status: None,
            path: None,
            source: None,
        }
    }

    /// Returns true if the resolved library path did not name an existing
    /// regular file.
    pub fn is_library_not_found(&self) -> bool {
        self.kind == ErrorKind::LibraryNotFound
    }

    /// Returns true if the error was caused by OS security policy (ptrace
    /// scope, platform sandboxing) or by insufficient permissions while
    /// probing the target.
    pub fn is_permission_denied(&self) -> bool {
        self.kind == ErrorKind::PermissionDenied
    }

    /// Returns true if the target process was not found by the probe.
    pub fn is_process_not_found(&self) -> bool {
        self.kind == ErrorKind::ProcessNotFound
    }

    /// Returns true if the requested operation is not provided by the loaded
    /// backend.
    pub fn is_not_supported(&self) -> bool {
        self.kind == ErrorKind::NotSupported
    }

    /// Returns true if the native backend library could not be loaded or is
    /// missing a required entry point.
    pub fn is_backend_unavailable(&self) -> bool {
        self.kind == ErrorKind::BackendUnavailable
    }

    /// Returns true if the backend reported a failure without a more
    /// specific category.
    pub fn is_injector_error(&self) -> bool {
        self.kind == ErrorKind::Injector
    }

    /// Returns true if detach itself failed and no earlier failure was in
    /// flight.
    pub fn is_detach_failure(&self) -> bool {
        self.kind == ErrorKind::Detach
    }

    /// The backend entry point that failed, if this error came from a
    /// backend call.
    pub fn operation(&self) -> Option<&'static str> {
        self.operation
    }

    /// The raw status code the backend returned, if this error came from a
    /// backend call.
    pub fn raw_status(&self) -> Option<i32> {
        self.status
    }

    /// The library path that was checked, for missing-library failures.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl Clone for Error {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            operation: self.operation,
            status: self.status,
            path: self.path.clone(),
            source: None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::from_io(err)
    }
}
