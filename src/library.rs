use std::ffi::CString;
use std::path::{Path, PathBuf};

use crate::path::{bytes_from_path, path_from_bytes, resolve};
use crate::{Error, Result};

/// Reference to a shared library, named as the *target* process resolves it.
///
/// For a target sharing the caller's filesystem view that is the whole
/// story. For a containerized or chrooted target, give the path as the
/// target sees it and set [`with_process_root`](Library::with_process_root)
/// to the target's root as visible to the caller (for example
/// `/proc/<pid>/root`): the existence check then runs against the composed
/// caller-visible path, while the backend still receives the unprefixed one.
#[derive(Clone, Debug)]
pub struct Library {
    path: Vec<u8>,
    process_root: Vec<u8>,
}

impl Library {
    /// Reference the library at `path`.
    ///
    /// Existence is not checked here; the injection entry points check the
    /// caller-visible path before anything else happens.
    ///
    /// # Examples
    /// ```
    /// # use dylib_inject::Library;
    /// let library = Library::from_path("/path/to/libagent.so");
    /// ```
    pub fn from_path<P: AsRef<Path>>(path: P) -> Library {
        Library {
            path: bytes_from_path(path.as_ref()),
            process_root: Vec::new(),
        }
    }

    /// Reference the library by a raw byte path, exactly as the target's
    /// loader will see it.
    pub fn from_bytes<B: Into<Vec<u8>>>(path: B) -> Library {
        Library {
            path: path.into(),
            process_root: Vec::new(),
        }
    }

    /// Set the target process's filesystem root as seen by the caller.
    ///
    /// An empty root means the caller and the target share a filesystem
    /// view.
    ///
    /// # Examples
    /// ```
    /// # use dylib_inject::Library;
    /// let library = Library::from_path("/opt/libagent.so").with_process_root("/proc/1234/root");
    /// ```
    pub fn with_process_root<P: AsRef<Path>>(mut self, root: P) -> Self {
        self.process_root = bytes_from_path(root.as_ref());
        self
    }

    /// The path this library resolves to from the caller's point of view,
    /// with the process root (if any) applied and normalized.
    pub fn caller_path(&self) -> PathBuf {
        path_from_bytes(&resolve(&self.path, &self.process_root))
    }

    /// The path handed to the backend: target-visible, NUL-terminated.
    pub(crate) fn target_cstring(&self) -> Result<CString> {
        CString::new(self.path.clone())
            .map_err(|_| Error::invalid_input("library path contains NUL"))
    }
}
