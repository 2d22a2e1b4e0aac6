//! VM Translator CLI
//!
//! Command-line interface for translating Hack VM code into Hack symbolic
//! assembly.

use clap::Parser as ClapParser;
use std::path::PathBuf;
use std::process;
use tracing::{error, info};

#[derive(ClapParser)]
#[command(name = "vmc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Translate Hack VM code to Hack symbolic assembly", long_about = None)]
struct Cli {
    /// A single .vm file, or a directory containing .vm files
    input: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("vmc=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    run(&cli.input);
}

fn run(input: &std::path::Path) {
    let inputs = match n2t_support::discover_inputs(input, "vm") {
        Ok(inputs) => inputs,
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    if inputs.is_empty() {
        eprintln!("Error: no .vm files found in {}", input.display());
        process::exit(1);
    }

    let (asm, out_path) = if input.is_dir() {
        info!("translating {} .vm file(s) in {}", inputs.len(), input.display());
        match vmc::translate_directory(&inputs) {
            Ok(asm) => (asm, n2t_support::directory_output_path(input, "asm")),
            Err(e) => {
                error!("{e}");
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
    } else {
        info!("translating {}", input.display());
        match vmc::translate_file(input) {
            Ok(asm) => (asm, n2t_support::sibling_with_extension(input, "asm")),
            Err(e) => {
                error!("{e}");
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
    };

    if let Err(e) = std::fs::write(&out_path, asm) {
        error!("{e}");
        eprintln!("Error writing {}: {e}", out_path.display());
        process::exit(1);
    }
    println!("Translated {} -> {}", input.display(), out_path.display());
}
