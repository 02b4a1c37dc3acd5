use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use dylib_inject::{Library, Process, inject, inject_and_unload};

/// Inject a dynamic library into a running process.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// pid of the process to inject the library into
    pid: i32,

    /// path of the library to inject, as the target process sees it
    library_path: PathBuf,

    /// unload the library again after injecting it
    #[arg(short, long)]
    uninject: bool,

    /// the target process's filesystem root as seen by the caller,
    /// e.g. /proc/<pid>/root for a containerized target
    #[arg(long, value_name = "PATH")]
    process_root: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let mut library = Library::from_path(&cli.library_path);
    if let Some(root) = &cli.process_root {
        library = library.with_process_root(root);
    }

    // No existence probe on the pid: the backend reports a nonexistent
    // target with its own status code.
    let process = Process::from_pid_unchecked(cli.pid);
    let result = if cli.uninject {
        inject_and_unload(process, &library)
    } else {
        inject(process, &library)
    };

    match result {
        Ok(handle) => {
            println!("{handle}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
