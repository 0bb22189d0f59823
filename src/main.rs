use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use conductkit::{init_logging, load_config, rewrite, updated_path, RewriteConfig};

/// Rewrite dual-extrusion G-code for conductive dispensing and
/// pick-and-place.
#[derive(Parser, Debug)]
#[command(name = "conductkit", version, about, long_version = conductkit::BUILD_DATE)]
struct Cli {
    /// Sliced dual-extrusion G-code file to rewrite
    input: PathBuf,

    /// Run configuration file (.json or .toml); built-in defaults apply
    /// when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Start-code preamble file prepended verbatim to the output
    #[arg(short, long)]
    preamble: Option<PathBuf>,

    /// Output path; defaults to the input path with an `-updated` suffix
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    init_logging()?;
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => RewriteConfig::default(),
    };

    let input = fs::read_to_string(&cli.input)
        .with_context(|| format!("Failed to read input {}", cli.input.display()))?;
    let preamble = cli
        .preamble
        .as_ref()
        .map(|path| {
            fs::read_to_string(path)
                .with_context(|| format!("Failed to read preamble {}", path.display()))
        })
        .transpose()?;

    // Any engine failure aborts here, before the output file exists.
    let result = rewrite(&input, preamble.as_deref(), &config)?;

    let output_path = cli.output.unwrap_or_else(|| updated_path(&cli.input));
    fs::write(&output_path, &result.text)
        .with_context(|| format!("Failed to write output {}", output_path.display()))?;

    let report = &result.report;
    tracing::info!(
        "{} -> {}: {} lines in, {} lines out, {} skipped, {} part(s) placed, {} parse warning(s)",
        cli.input.display(),
        output_path.display(),
        report.lines_read,
        report.lines_written,
        report.lines_skipped,
        report.parts_placed,
        report.parse_warnings.len()
    );
    println!("Wrote {}", output_path.display());

    Ok(())
}
