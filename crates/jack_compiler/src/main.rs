//! Jack Compiler CLI
//!
//! Command-line interface for compiling `.jack` source into Hack VM code.

use clap::Parser as ClapParser;
use std::path::PathBuf;
use std::process;
use tracing::{error, info};

#[derive(ClapParser)]
#[command(name = "jackc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compile Jack source files to Hack VM code", long_about = None)]
struct Cli {
    /// A single .jack file, or a directory containing .jack files
    input: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("jackc=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    run(&cli.input);
}

fn run(input: &std::path::Path) {
    let inputs = match n2t_support::discover_inputs(input, "jack") {
        Ok(inputs) => inputs,
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    if inputs.is_empty() {
        eprintln!("Error: no .jack files found in {}", input.display());
        process::exit(1);
    }

    for path in inputs {
        info!("compiling {}", path.display());
        match jackc::compile_file(&path) {
            Ok(vm) => {
                let out_path = n2t_support::sibling_with_extension(&path, "vm");
                if let Err(e) = std::fs::write(&out_path, vm) {
                    error!("{e}");
                    eprintln!("Error writing {}: {e}", out_path.display());
                    process::exit(1);
                }
                println!("Compiled {} -> {}", path.display(), out_path.display());
            }
            Err(e) => {
                error!("{e}");
                eprintln!("Error compiling {}: {e}", path.display());
                process::exit(1);
            }
        }
    }
}
