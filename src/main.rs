//! rsx: parse and validate single-file RSX components.
#![allow(clippy::multiple_crate_versions)]

use clap::Parser;
use rsx::{config, engine::Engine, input, report};
use std::fs;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rsx")]
#[command(about = "Parse and validate RSX single-file components", long_about = None)]
struct Args {
    /// Files or directories to parse
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// File extensions to match
    #[arg(long, short = 'e', value_name = "EXT")]
    ext: Vec<String>,

    /// Print each parsed document as JSON
    #[arg(long)]
    json: bool,

    /// Print only the formatted error list
    #[arg(long, conflicts_with = "json")]
    errors_only: bool,
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    let mut cfg = config::Config::load();

    // Override config with command line args
    if !args.ext.is_empty() {
        cfg.file_extensions = args.ext;
    }

    let documents = input::find_documents(args.paths, &cfg.file_extensions)?;

    if documents.is_empty() {
        eprintln!("No matching files found");
        return Ok(());
    }

    let mut engine = Engine::new(cfg).map_err(io::Error::other)?;

    for path in &documents {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("Skipping {}: {e}", path.display());
                continue;
            }
        };
        let document = engine.parse(&text);

        if args.json {
            let json = serde_json::json!({ "path": path, "document": document });
            let json = serde_json::to_string_pretty(&json).map_err(io::Error::other)?;
            println!("{json}");
        } else if args.errors_only {
            if !document.errors.is_empty() {
                println!("{}:", path.display());
                println!("{}", report::format_errors(&document.errors));
            }
        } else {
            println!("{}", path.display());
            println!("{}", report::generate_report(&document));
        }
    }

    Ok(())
}
