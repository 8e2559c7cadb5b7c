// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// TaskMaster — batch conversion and cleanup for spreadsheets, images, and PDFs
//
// Entry point. Loads the config, initialises logging, installs the Ctrl-C
// handler, and runs the interactive shell on stdin/stdout.

mod console;
mod logging;
mod picker;
mod shell;

use std::io::{self, BufWriter};
use std::path::PathBuf;

use taskmaster_core::AppConfig;
use tracing::{error, info, warn};

use shell::Shell;

fn main() {
    let workdir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let (config, config_error) = match AppConfig::load_from_dir(&workdir) {
        Ok(Some(config)) => (config, None),
        Ok(None) => (AppConfig::default(), None),
        Err(err) => (AppConfig::default(), Some(err)),
    };

    let log_path = logging::init(&config);
    info!(log = ?log_path, "TaskMaster starting");
    if let Some(err) = config_error {
        warn!(%err, "config file unusable, using defaults");
        console::print_error(&mut io::stdout(), &format!("Config file ignored: {err}"));
    }

    spawn_interrupt_handler();

    let stdin = io::stdin();
    let mut shell = Shell::new(stdin.lock(), BufWriter::new(io::stdout()), config, workdir);
    if let Err(err) = shell.run() {
        error!(%err, "terminal I/O failed");
    }

    info!("TaskMaster exiting");
}

/// Wait for Ctrl-C on a dedicated thread, say goodbye, and exit.
fn spawn_interrupt_handler() {
    let spawned = std::thread::Builder::new()
        .name("ctrl-c".into())
        .spawn(|| {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(err) => {
                    warn!(%err, "no signal runtime, Ctrl-C uses the default handler");
                    return;
                }
            };
            if runtime.block_on(tokio::signal::ctrl_c()).is_ok() {
                info!("interrupted by user");
                console::print_goodbye(&mut io::stdout());
                std::process::exit(0);
            }
        });

    if let Err(err) = spawned {
        warn!(%err, "failed to spawn Ctrl-C handler thread");
    }
}
