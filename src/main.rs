use std::fs;
use std::path::PathBuf;

use clap::Parser;
use mdgdoc::edit::BatchUpdate;
use mdgdoc::{Config, MemoryDocument, Segment};

#[derive(Parser)]
#[command(name = "mdgdoc")]
#[command(about = "Compile Markdown into Google Docs batch update requests")]
struct Cli {
    /// Input Markdown file
    input: PathBuf,

    /// Output JSON file (defaults to input name with .requests.json extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Config file; defaults apply when it does not exist
    #[arg(short, long, default_value = "mdgdoc.toml")]
    config: PathBuf,

    /// Print the parsed blocks and exit
    #[arg(long)]
    blocks: bool,

    /// Print the resulting document as plain text
    #[arg(long)]
    preview: bool,
}

fn main() {
    // RUST_LOG overrides the Info default.
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();

    // Read input file
    let markdown = match fs::read_to_string(&cli.input) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading {}: {}", cli.input.display(), e);
            std::process::exit(1);
        }
    };

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if cli.blocks {
        for block in mdgdoc::parse(&markdown) {
            println!("{:#?}", block);
        }
        return;
    }

    let segments = mdgdoc::segments(&markdown);
    let tables = segments
        .iter()
        .filter(|s| matches!(s, Segment::Table(_)))
        .count();
    log::info!(
        "Read {} ({} chars): {} text segments, {} tables",
        cli.input.display(),
        markdown.chars().count(),
        segments.len() - tables,
        tables
    );

    // Plan against an empty simulated document
    let mut document = MemoryDocument::new(config.sync.max_edits_per_call);
    let report = match mdgdoc::sync_document(&mut document, &segments, &config) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let batches: Vec<BatchUpdate> = document
        .calls()
        .iter()
        .map(|edits| BatchUpdate {
            requests: edits.clone(),
        })
        .collect();
    let json = match serde_json::to_string_pretty(&batches) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let output = cli
        .output
        .unwrap_or_else(|| cli.input.with_extension("requests.json"));

    if let Err(e) = fs::write(&output, json) {
        eprintln!("Error writing {}: {}", output.display(), e);
        std::process::exit(1);
    }

    if cli.preview {
        print!("{}", document.render());
    }

    println!(
        "Created {} ({} batch updates, {} remote calls)",
        output.display(),
        batches.len(),
        report.api_calls
    );
}
