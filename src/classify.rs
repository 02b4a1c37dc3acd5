//! Translation of backend status codes into actionable errors.
//!
//! Every backend entry point returns a signed status: zero is success and
//! negative codes are defined by the backend's own header. Two codes get a
//! specialized explanation keyed on the *host* platform, since attach
//! failures are observed locally regardless of what the target is. Everything
//! else becomes a generic failure carrying the operation name, the raw
//! status, and the backend's diagnostic text when it offers one.

use crate::Error;

const STATUS_REFERENCE: &str = "see the error code definitions in injector/include/injector.h";

const PTRACE_SCOPE_REMEDY: &str = "\
attach was refused by the kernel's ptrace scope restrictions. Possible solutions:
 - rerun as root
 - temporarily lift the restriction: echo 0 | sudo tee /proc/sys/kernel/yama/ptrace_scope
 - persistently lift it by editing /etc/sysctl.d/10-ptrace.conf";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Host {
    Linux,
    Apple,
    Other,
}

fn current_host() -> Host {
    if cfg!(any(target_os = "linux", target_os = "android")) {
        Host::Linux
    } else if cfg!(target_vendor = "apple") {
        Host::Apple
    } else {
        Host::Other
    }
}

#[cfg(unix)]
fn caller_is_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}

#[cfg(not(unix))]
fn caller_is_root() -> bool {
    false
}

/// Classify a nonzero status from `operation`, folding in the backend's
/// out-of-band diagnostic if one was retrieved.
pub(crate) fn classify(operation: &'static str, status: i32, diagnostic: Option<String>) -> Error {
    classify_for(current_host(), caller_is_root(), operation, status, diagnostic)
}

/// Build the error for a failed detach. Detach failures keep their own kind
/// so that callers can tell a release problem apart from an injection
/// problem; the session layer guarantees one never shadows the other.
pub(crate) fn detach_failure(status: i32, diagnostic: Option<String>) -> Error {
    Error::detach_failed(
        status,
        describe("injector_detach", status, diagnostic.as_deref()),
    )
}

fn classify_for(
    host: Host,
    elevated: bool,
    operation: &'static str,
    status: i32,
    diagnostic: Option<String>,
) -> Error {
    let description = describe(operation, status, diagnostic.as_deref());
    match (status, host) {
        (-8, Host::Linux) => Error::injector_permission_denied(
            operation,
            status,
            format_args!("{description}\n{PTRACE_SCOPE_REMEDY}"),
        ),
        (-1, Host::Apple) => Error::injector_permission_denied(
            operation,
            status,
            format_args!("{description}\n{}", apple_remedy(elevated)),
        ),
        _ => Error::injector(operation, status, description),
    }
}

fn describe(operation: &'static str, status: i32, diagnostic: Option<&str>) -> String {
    // An empty diagnostic is treated the same as no diagnostic at all.
    let detail = match diagnostic {
        Some(text) if !text.is_empty() => text,
        _ => STATUS_REFERENCE,
    };
    format!("injector returned {status} calling {operation}: {detail}")
}

fn apple_remedy(elevated: bool) -> &'static str {
    if elevated {
        "the OS restricts injection for security reasons, and the restriction held even with elevated privileges"
    } else {
        "the OS restricts injection for security reasons; try rerunning as root"
    }
}
