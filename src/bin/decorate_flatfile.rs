use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use flatfile_decorator::cli;
use flatfile_decorator::config::DecoratorConfig;
use flatfile_decorator::decorator::StructuralErrorPolicy;
use flatfile_decorator::pipeline::{self, RunPaths};
use flatfile_decorator::rfam::FeatureOrder;

#[derive(Parser)]
#[command(
    name = "decorate_flatfile",
    about = "Add functional and non-coding RNA annotations to an EMBL flat-file"
)]
struct Cli {
    /// EMBL flat-file to decorate
    in_flatfile: PathBuf,

    /// InterProScan TSV output
    annotation_file: PathBuf,

    /// Deoverlapped cmsearch hits
    rna_deoverlap_file: PathBuf,

    /// Rfam model lookup table
    rfam_lookup_file: PathBuf,

    /// InterProScan version recorded in the inference qualifier
    scanner_version: String,

    /// Locus-tag prefix
    #[arg(long = "tag-name")]
    tag_name: Option<String>,

    /// Output flat-file (default: input name with `.new.embl`)
    #[arg(short = 'o', long = "out_flatfile")]
    out_flatfile: Option<PathBuf>,

    /// Optional JSON settings file
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Order RNA features by start position instead of hit order
    #[arg(long = "sort-rna-by-position")]
    sort_rna_by_position: bool,

    /// Write records with RNA features but no sequence section unchanged instead of failing
    #[arg(long = "skip-structural-errors")]
    skip_structural_errors: bool,

    /// Debug logging
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

/// Initializes the logger with verbosity given in `log_max_level`.
fn init_log(log_max_level: usize) -> Result<()> {
    stderrlog::new()
        .modules([module_path!(), "flatfile_decorator"])
        .quiet(false)
        .verbosity(log_max_level)
        .timestamp(stderrlog::Timestamp::Off)
        .init()
        .context("failed to initialize logging")
}

/// `contigs.embl.gz` becomes `contigs.new.embl.gz`; names without `.embl` get `.new.embl` appended.
fn default_output_path(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let out_name = if name.contains(".embl") {
        name.replacen(".embl", ".new.embl", 1)
    } else {
        format!("{name}.new.embl")
    };
    input.with_file_name(out_name)
}

fn main() -> Result<ExitCode> {
    let start = Instant::now();
    let cli_args = Cli::parse();
    init_log(if cli_args.verbose { 3 } else { 2 })?;

    for (name, path) in [
        ("input flat-file", &cli_args.in_flatfile),
        ("annotation file", &cli_args.annotation_file),
    ] {
        if !path.exists() {
            log::error!("{name} not found: {}", path.display());
            return Ok(ExitCode::FAILURE);
        }
    }

    cli::banner("Decorate Flat-file");

    // ── Configuration ────────────────────────────────────
    cli::section("Configuration");

    let mut config = match &cli_args.config {
        Some(path) => DecoratorConfig::from_file(path)?,
        None => DecoratorConfig::default(),
    };
    if let Some(tag_name) = &cli_args.tag_name {
        config.tag_name.clone_from(tag_name);
    }
    if cli_args.sort_rna_by_position {
        config.rna_feature_order = FeatureOrder::Position;
    }
    if cli_args.skip_structural_errors {
        config.structural_errors = StructuralErrorPolicy::Skip;
    }
    config.validate()?;

    let paths = RunPaths {
        output: cli_args
            .out_flatfile
            .clone()
            .unwrap_or_else(|| default_output_path(&cli_args.in_flatfile)),
        flatfile: cli_args.in_flatfile,
        annotation_file: cli_args.annotation_file,
        rna_deoverlap_file: cli_args.rna_deoverlap_file,
        rfam_lookup_file: cli_args.rfam_lookup_file,
    };

    cli::kv("Flat-file", paths.flatfile.display());
    cli::kv("Annotations", paths.annotation_file.display());
    cli::kv("RNA hits", paths.rna_deoverlap_file.display());
    cli::kv("Rfam lookup", paths.rfam_lookup_file.display());
    cli::kv("Scanner", format!("{} {}", config.scanner_name, cli_args.scanner_version));
    cli::kv("Locus tag", format!("{}_LOCUS{}", config.tag_name, config.first_locus_tag));
    cli::kv("Output", paths.output.display());
    eprintln!();

    // ── Decorating ───────────────────────────────────────
    cli::section("Decorating");

    let report = pipeline::run(&paths, &config, &cli_args.scanner_version)
        .with_context(|| format!("failed to decorate {}", paths.flatfile.display()))?;
    cli::print_report(&report);

    cli::print_summary(start);
    Ok(ExitCode::SUCCESS)
}
