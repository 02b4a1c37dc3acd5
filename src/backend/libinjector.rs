//! FFI to the `injector` native library, resolved at runtime.
//!
//! The orchestration layer treats the backend as a black box behind five
//! entry points. Rather than linking against it at build time, the library
//! is loaded dynamically on first use, so the crate builds and runs its
//! offline tests without the backend installed.

use std::env;
use std::ffi::{CStr, c_char, c_void};
use std::path::PathBuf;
use std::ptr;

use super::{Backend, Status};
use crate::Error;

/// Environment variable overriding the backend library location. Without it
/// the platform's default soname is handed to the system loader.
const LIBINJECTOR_PATH_ENV: &str = "LIBINJECTOR_PATH";

type AttachFn = unsafe extern "C" fn(*mut *mut c_void, i32) -> i32;
type InjectFn = unsafe extern "C" fn(*mut c_void, *const c_char, *mut *mut c_void) -> i32;
type UninjectFn = unsafe extern "C" fn(*mut c_void, *mut c_void) -> i32;
type DetachFn = unsafe extern "C" fn(*mut c_void) -> i32;
type LastErrorFn = unsafe extern "C" fn() -> *const c_char;

pub(super) struct LibinjectorBackend {
    attach: AttachFn,
    inject: InjectFn,
    uninject: Option<UninjectFn>,
    detach: DetachFn,
    last_error: Option<LastErrorFn>,
    // Keeps the resolved function pointers valid. Never dropped in practice:
    // the backend lives in a process-wide static and is never unloaded.
    _library: libloading::Library,
}

impl LibinjectorBackend {
    pub(super) fn load() -> std::result::Result<LibinjectorBackend, Error> {
        let path = env::var_os(LIBINJECTOR_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(default_library_name()));

        // Safety: loading libinjector runs no initialization beyond setting
        // up its own state.
        let library = unsafe { libloading::Library::new(&path) }.map_err(|err| {
            Error::backend_unavailable(format_args!(
                "failed to load the injector backend from {}: {err}",
                path.display()
            ))
        })?;

        let attach = required_symbol::<AttachFn>(&library, "injector_attach")?;
        let inject = required_symbol::<InjectFn>(&library, "injector_inject")?;
        let detach = required_symbol::<DetachFn>(&library, "injector_detach")?;
        // Later protocol revisions only.
        let uninject = optional_symbol::<UninjectFn>(&library, "injector_uninject");
        let last_error = optional_symbol::<LastErrorFn>(&library, "injector_error");

        log::debug!(
            "loaded injector backend from {} (uninject: {}, diagnostics: {})",
            path.display(),
            uninject.is_some(),
            last_error.is_some()
        );

        Ok(LibinjectorBackend {
            attach,
            inject,
            uninject,
            detach,
            last_error,
            _library: library,
        })
    }
}

impl Backend for LibinjectorBackend {
    fn attach(&self, pid: i32) -> Status<u64> {
        let mut handle: *mut c_void = ptr::null_mut();
        // Safety: signature mirrors injector.h; the out pointer is valid for
        // the duration of the call.
        let ret = unsafe { (self.attach)(&mut handle, pid) };
        if ret == 0 { Ok(handle as u64) } else { Err(ret) }
    }

    fn inject(&self, attach: u64, library_path: &CStr) -> Status<u64> {
        let mut library: *mut c_void = ptr::null_mut();
        // Safety: `attach` is a token the backend itself issued and has not
        // yet been passed to detach; the path is NUL-terminated.
        let ret =
            unsafe { (self.inject)(attach as *mut c_void, library_path.as_ptr(), &mut library) };
        if ret == 0 { Ok(library as u64) } else { Err(ret) }
    }

    fn uninject(&self, attach: u64, library: u64) -> Status<()> {
        // The facade refuses unload requests before attaching when this
        // capability is missing, so this branch is not normally reachable.
        let Some(uninject) = self.uninject else {
            return Err(-1);
        };
        // Safety: both tokens were issued by this backend within the same
        // attach bracket.
        let ret = unsafe { uninject(attach as *mut c_void, library as *mut c_void) };
        if ret == 0 { Ok(()) } else { Err(ret) }
    }

    fn detach(&self, attach: u64) -> Status<()> {
        // Safety: the session guarantees each attach token reaches detach
        // exactly once.
        let ret = unsafe { (self.detach)(attach as *mut c_void) };
        if ret == 0 { Ok(()) } else { Err(ret) }
    }

    fn supports_uninject(&self) -> bool {
        self.uninject.is_some()
    }

    fn last_error(&self) -> Option<String> {
        let last_error = self.last_error?;
        // The returned string is backend-owned and static; it must not be
        // freed here.
        let text = unsafe { last_error() };
        if text.is_null() {
            return None;
        }
        let message = unsafe { CStr::from_ptr(text) }.to_string_lossy().into_owned();
        if message.is_empty() { None } else { Some(message) }
    }
}

fn required_symbol<T: Copy>(
    library: &libloading::Library,
    name: &'static str,
) -> std::result::Result<T, Error> {
    // Safety: the fn pointer types above mirror injector.h, and the pointers
    // stay valid because the library handle is stored alongside them.
    let symbol = unsafe { library.get::<T>(name.as_bytes()) }.map_err(|err| {
        Error::backend_unavailable(format_args!(
            "injector backend is missing required symbol {name}: {err}"
        ))
    })?;
    Ok(*symbol)
}

fn optional_symbol<T: Copy>(library: &libloading::Library, name: &'static str) -> Option<T> {
    // Safety: as in `required_symbol`.
    unsafe { library.get::<T>(name.as_bytes()) }
        .ok()
        .map(|symbol| *symbol)
}

fn default_library_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "injector.dll"
    } else if cfg!(target_vendor = "apple") {
        "libinjector.dylib"
    } else {
        "libinjector.so"
    }
}
