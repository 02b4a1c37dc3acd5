//! Scripted in-memory backend for exercising the orchestration layer.
//!
//! Each primitive counts its calls and returns a configured status, which is
//! how the tests pin down the 1:1 attach/detach accounting across every
//! failure branch.

use std::ffi::CStr;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{Backend, Status};

pub(crate) const STUB_ATTACH_HANDLE: u64 = 0x5e55;
pub(crate) const STUB_LIBRARY_HANDLE: u64 = 0x11b;

pub(crate) struct StubBackend {
    pub(crate) attach_status: i32,
    pub(crate) inject_status: i32,
    pub(crate) uninject_status: i32,
    pub(crate) detach_status: i32,
    pub(crate) uninject_supported: bool,
    pub(crate) diagnostic: Option<&'static str>,
    pub(crate) attach_calls: AtomicUsize,
    pub(crate) inject_calls: AtomicUsize,
    pub(crate) uninject_calls: AtomicUsize,
    pub(crate) detach_calls: AtomicUsize,
}

impl Default for StubBackend {
    fn default() -> Self {
        StubBackend {
            attach_status: 0,
            inject_status: 0,
            uninject_status: 0,
            detach_status: 0,
            uninject_supported: true,
            diagnostic: None,
            attach_calls: AtomicUsize::new(0),
            inject_calls: AtomicUsize::new(0),
            uninject_calls: AtomicUsize::new(0),
            detach_calls: AtomicUsize::new(0),
        }
    }
}

impl StubBackend {
    pub(crate) fn attach_count(&self) -> usize {
        self.attach_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn inject_count(&self) -> usize {
        self.inject_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn uninject_count(&self) -> usize {
        self.uninject_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn detach_count(&self) -> usize {
        self.detach_calls.load(Ordering::SeqCst)
    }
}

fn to_status(code: i32) -> Status<()> {
    if code == 0 { Ok(()) } else { Err(code) }
}

impl Backend for StubBackend {
    fn attach(&self, _pid: i32) -> Status<u64> {
        self.attach_calls.fetch_add(1, Ordering::SeqCst);
        to_status(self.attach_status).map(|()| STUB_ATTACH_HANDLE)
    }

    fn inject(&self, attach: u64, _library_path: &CStr) -> Status<u64> {
        assert_eq!(attach, STUB_ATTACH_HANDLE, "inject used a stale handle");
        self.inject_calls.fetch_add(1, Ordering::SeqCst);
        to_status(self.inject_status).map(|()| STUB_LIBRARY_HANDLE)
    }

    fn uninject(&self, attach: u64, library: u64) -> Status<()> {
        assert_eq!(attach, STUB_ATTACH_HANDLE, "uninject used a stale handle");
        assert_eq!(library, STUB_LIBRARY_HANDLE, "uninject got a foreign handle");
        self.uninject_calls.fetch_add(1, Ordering::SeqCst);
        to_status(self.uninject_status)
    }

    fn detach(&self, attach: u64) -> Status<()> {
        assert_eq!(attach, STUB_ATTACH_HANDLE, "detach used a stale handle");
        self.detach_calls.fetch_add(1, Ordering::SeqCst);
        to_status(self.detach_status)
    }

    fn supports_uninject(&self) -> bool {
        self.uninject_supported
    }

    fn last_error(&self) -> Option<String> {
        self.diagnostic.map(str::to_string)
    }
}
