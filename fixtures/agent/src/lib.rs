//! Injectable fixture: announces its load and unload through a marker file.
//!
//! The marker path comes from `DYLIB_INJECT_MARKER_FILE` in the *target*
//! process's environment; without it the markers go to the target's stdout,
//! which mirrors how the load is observed by eye.

use std::fs::OpenOptions;
use std::io::Write;

const MARKER_ENV: &str = "DYLIB_INJECT_MARKER_FILE";

fn emit(marker: &[u8]) {
    match std::env::var_os(MARKER_ENV) {
        Some(path) => {
            if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
                let _ = file.write_all(marker);
            }
        }
        None => {
            let mut stdout = std::io::stdout();
            let _ = stdout.write_all(marker);
            let _ = stdout.flush();
        }
    }
}

unsafe extern "C" fn on_load() {
    emit(b"loaded\n");
}

unsafe extern "C" fn on_unload() {
    emit(b"unloaded\n");
}

#[cfg(target_os = "linux")]
mod registration {
    #[unsafe(link_section = ".init_array")]
    #[used]
    static ON_LOAD: unsafe extern "C" fn() = super::on_load;

    #[unsafe(link_section = ".fini_array")]
    #[used]
    static ON_UNLOAD: unsafe extern "C" fn() = super::on_unload;
}

#[cfg(target_vendor = "apple")]
mod registration {
    #[unsafe(link_section = "__DATA,__mod_init_func")]
    #[used]
    static ON_LOAD: unsafe extern "C" fn() = super::on_load;

    #[unsafe(link_section = "__DATA,__mod_term_func")]
    #[used]
    static ON_UNLOAD: unsafe extern "C" fn() = super::on_unload;
}
