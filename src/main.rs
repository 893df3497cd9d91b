use std::{env, process};

use console::Console;
use emu::cartridge::Cartridge;
use emu::nds::Nds;
use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();
    println!("satsuma v0.1.0");

    let mut nds = Nds::new();

    match env::args().nth(1) {
        Some(path) => {
            let cartridge = match Cartridge::from_file(&path) {
                Ok(cartridge) => cartridge,
                Err(error) => {
                    eprintln!("failed to load {path}: {error}");
                    process::exit(1);
                }
            };
            println!("loaded {path} ({})", cartridge.header().game_title());

            if let Err(error) = nds.load_cartridge(&cartridge) {
                eprintln!("failed to map {path}: {error}");
                process::exit(2);
            }
        }
        None => {
            println!("no cartridge given, seeding the bring-up program");
            if let Err(error) = nds.load_demo_program() {
                eprintln!("{error}");
                process::exit(2);
            }
        }
    }

    Console::new(nds).run();
}

/// Stderr logging filtered by `RUST_LOG`; `SATSUMA_LOG=<file>` redirects
/// to a file instead.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if let Ok(path) = env::var("SATSUMA_LOG") {
        let file = match std::fs::File::create(&path) {
            Ok(file) => file,
            Err(error) => {
                eprintln!("cannot open log file {path}: {error}");
                process::exit(1);
            }
        };
        let (writer, guard) = tracing_appender::non_blocking(file);
        // the worker must outlive main; leaking the guard keeps it alive
        // for the whole process
        std::mem::forget(guard);
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
