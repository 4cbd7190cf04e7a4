//! CLI tool converting a selected region of a web page into a PowerPoint deck.

use anyhow::{Context, Result};
use clap::Parser;
use deck_core::{
    extract_slides, ImageErrorPolicy, LayoutConfig, LayoutEngine, Presentation,
};
use deck_html::{parse_document, select_subtree};
use deck_pptx::PptxWriter;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

mod fetch;

use fetch::{fetch_source, WebImageFetcher};

/// Convert a selected region of a web page into a PowerPoint deck.
#[derive(Parser, Debug)]
#[command(name = "deckgen")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Source web page URL or local HTML file
    input: String,

    /// CSS selector choosing the content subtree; one slide per direct
    /// child element of the first match
    #[arg(short, long, default_value = "body")]
    selector: String,

    /// Output .pptx path
    #[arg(short, long, default_value = "presentation.pptx")]
    output: PathBuf,

    /// Abort the whole conversion when an image cannot be fetched,
    /// instead of keeping a placeholder slot
    #[arg(long)]
    strict_images: bool,

    /// Paint text boxes red to visualize computed geometry
    #[arg(long)]
    debug_fill: bool,

    /// Print the extracted content model as JSON and exit
    #[arg(long)]
    dump_atoms: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let (html, base) = fetch_source(&args.input)
        .with_context(|| format!("Failed to load {}", args.input))?;

    let document = parse_document(&html);
    let content = select_subtree(&document, &args.selector)
        .with_context(|| format!("Failed to select content in {}", args.input))?;

    let slides = extract_slides(&content);
    let presentation = Presentation::new(slides);

    if args.verbose {
        eprintln!("  Extracted {} slides", presentation.slide_count());
    }

    if args.dump_atoms {
        println!("{}", serde_json::to_string_pretty(&presentation)?);
        return Ok(());
    }

    let policy = if args.strict_images {
        ImageErrorPolicy::Abort
    } else {
        ImageErrorPolicy::UsePlaceholder
    };

    let config = LayoutConfig::default();
    let engine = LayoutEngine::new(config.clone()).with_image_error_policy(policy);
    let fetcher = WebImageFetcher::new(base);
    let plan = engine
        .plan(&presentation, &fetcher)
        .context("Failed to lay out slides")?;

    let writer = PptxWriter::new(config).with_debug_fill(args.debug_fill);
    let bytes = writer.write(&plan).context("Failed to write deck package")?;

    let mut file = File::create(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    file.write_all(&bytes)
        .with_context(|| format!("Failed to write to {}", args.output.display()))?;

    if args.verbose {
        eprintln!("  Written to: {}", args.output.display());
    }

    Ok(())
}
