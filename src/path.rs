//! Byte-level path composition for namespaced targets.
//!
//! A containerized or chrooted target resolves library paths against its own
//! filesystem root, so the caller-visible form of a path is the target's form
//! prefixed with that root. Composition works on raw bytes and never asks the
//! OS anything; only the facade's existence check touches the filesystem.

use std::path::{Path, PathBuf};

/// Normalize a POSIX path, collapsing redundant separators and `.`/`..`
/// segments lexically.
pub(crate) fn normalize(path: &[u8]) -> Vec<u8> {
    if path.is_empty() {
        return b".".to_vec();
    }

    let absolute = path.starts_with(b"/");
    // POSIX gives exactly two leading slashes an implementation-defined
    // meaning; preserve them, collapse any other run.
    let double_slash = path.starts_with(b"//") && !path.starts_with(b"///");

    let mut kept: Vec<&[u8]> = Vec::new();
    for comp in path.split(|&b| b == b'/') {
        if comp.is_empty() || comp == b"." {
            continue;
        }
        if comp != b".."
            || (!absolute && kept.is_empty())
            || kept.last().is_some_and(|last| *last == b"..")
        {
            kept.push(comp);
        } else if !kept.is_empty() {
            kept.pop();
        }
        // A `..` hitting the root of an absolute path is dropped: there is
        // nothing above the root to back into.
    }

    let mut out = Vec::with_capacity(path.len());
    if absolute {
        out.push(b'/');
        if double_slash {
            out.push(b'/');
        }
    }
    for (idx, comp) in kept.iter().enumerate() {
        if idx > 0 {
            out.push(b'/');
        }
        out.extend_from_slice(comp);
    }
    if out.is_empty() {
        return b".".to_vec();
    }
    out
}

/// Compose the caller-visible form of `library_path` for a target whose
/// filesystem root is `process_root`. An empty root means the caller and the
/// target share a view of the filesystem and the path passes through
/// untouched.
pub(crate) fn resolve(library_path: &[u8], process_root: &[u8]) -> Vec<u8> {
    if process_root.is_empty() {
        return library_path.to_vec();
    }

    let mut joined = Vec::with_capacity(process_root.len() + library_path.len() + 1);
    joined.extend_from_slice(process_root);
    joined.push(b'/');
    joined.extend_from_slice(library_path);
    normalize(&joined)
}

#[cfg(unix)]
pub(crate) fn bytes_from_path(path: &Path) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;

    path.as_os_str().as_bytes().to_vec()
}

#[cfg(not(unix))]
pub(crate) fn bytes_from_path(path: &Path) -> Vec<u8> {
    path.to_string_lossy().into_owned().into_bytes()
}

#[cfg(unix)]
pub(crate) fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    use std::os::unix::ffi::OsStrExt;

    PathBuf::from(std::ffi::OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
pub(crate) fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::{normalize, resolve};

    #[test]
    fn resolve_composes_root_and_library_path() {
        let cases: &[(&[u8], &[u8], &[u8])] = &[
            (b"/tmp/some/lib.so", b"", b"/tmp/some/lib.so"),
            (
                b"/tmp/some/lib.so",
                b"/proc/123/root",
                b"/proc/123/root/tmp/some/lib.so",
            ),
            (
                b"/tmp/some/lib.so",
                b"/proc/123/root/",
                b"/proc/123/root/tmp/some/lib.so",
            ),
            (
                b"tmp/some/lib.so",
                b"/proc/123/root",
                b"/proc/123/root/tmp/some/lib.so",
            ),
            (
                b"tmp/some/lib.so",
                b"/proc/123/root/",
                b"/proc/123/root/tmp/some/lib.so",
            ),
        ];
        for (library_path, process_root, expected) in cases {
            assert_eq!(
                resolve(library_path, process_root),
                expected.to_vec(),
                "resolve({:?}, {:?})",
                String::from_utf8_lossy(library_path),
                String::from_utf8_lossy(process_root),
            );
        }
    }

    #[test]
    fn resolve_with_empty_root_is_identity() {
        // Deliberately unnormalized input: without a root the path passes
        // through byte for byte.
        assert_eq!(resolve(b"a//b/./lib.so", b""), b"a//b/./lib.so".to_vec());
    }

    #[test]
    fn normalize_collapses_separators_and_dots() {
        assert_eq!(normalize(b"/a//b///c"), b"/a/b/c".to_vec());
        assert_eq!(normalize(b"a/./b"), b"a/b".to_vec());
        assert_eq!(normalize(b"a/b/"), b"a/b".to_vec());
        assert_eq!(normalize(b""), b".".to_vec());
        assert_eq!(normalize(b"./"), b".".to_vec());
    }

    #[test]
    fn normalize_resolves_parent_segments() {
        assert_eq!(normalize(b"a/b/../c"), b"a/c".to_vec());
        assert_eq!(normalize(b"/../a"), b"/a".to_vec());
        assert_eq!(normalize(b"../a"), b"../a".to_vec());
        assert_eq!(normalize(b"a/../../b"), b"../b".to_vec());
    }

    #[test]
    fn normalize_preserves_exactly_two_leading_slashes() {
        assert_eq!(normalize(b"//a/b"), b"//a/b".to_vec());
        assert_eq!(normalize(b"///a/b"), b"/a/b".to_vec());
    }
}
