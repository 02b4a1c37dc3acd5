use std::path::Path;

use dylib_inject::{Library, Process, inject};

#[test]
fn missing_library_is_rejected_before_any_backend_work() {
    let library = Library::from_path("nosuchpath.so");
    let err = inject(Process::from_pid_unchecked(-1), &library).unwrap_err();
    assert!(err.is_library_not_found());
    assert_eq!(err.path(), Some(Path::new("nosuchpath.so")));
}

#[test]
fn a_directory_is_not_a_library() {
    let dir = std::env::temp_dir();
    let err = inject(Process::from_pid_unchecked(1), &Library::from_path(&dir)).unwrap_err();
    assert!(err.is_library_not_found());
}

#[test]
fn the_existence_check_accounts_for_the_process_root() {
    let library =
        Library::from_path("/tmp/definitely-missing.so").with_process_root("/proc/123/root");
    let err = inject(Process::from_pid_unchecked(123), &library).unwrap_err();
    assert!(err.is_library_not_found());
    // The reported path is the caller-visible composition that was checked.
    assert_eq!(
        err.path(),
        Some(Path::new("/proc/123/root/tmp/definitely-missing.so"))
    );
}
