pub mod cli;
mod tui_app;

use anyhow::Context;
use clap::Parser;
use cli::{
    errors::CrlSetCliError,
    helpers::{exit_with_error, is_supported_package, summary_lines},
};
use crlset_rs::{
    crlset::{decode_package, types::CrlSet},
    snapshot::Snapshot,
    update::{
        constants::DEFAULT_APP_ID,
        helpers::{build_update_url, verify_sha256},
        manifest::parse_update_manifest,
        types::UpdateParams,
    },
};
use std::{env, fs, path::Path, process};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "crlset")]
#[command(version)]
#[command(about = "Decode the CRLSet carried by a CRX update package", long_about = None)]
#[command(next_line_help = true)]
struct Cli {
    /// CRX package holding the CRLSet
    #[arg(required_unless_present = "print_url")]
    filename: Option<String>,
    /// Update-check response (XML) announcing the package; the package digest is checked against it
    #[arg(short, long)]
    manifest: Option<String>,
    /// Expected SHA-256 digest of the package, hex encoded
    #[arg(long, conflicts_with = "manifest")]
    sha256: Option<String>,
    /// Application ID the update check must be for
    #[arg(long, default_value = DEFAULT_APP_ID)]
    app_id: String,
    /// Write the output to this file instead of stdout
    #[arg(short, long)]
    output: Option<String>,
    /// Print a short summary instead of the JSON document
    #[arg(long)]
    summary: bool,
    /// Print the update-check URL for the application and exit
    #[arg(long)]
    print_url: bool,
    /// Log decoding progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_crl_set(cli: &Cli, current_dir: &Path, data: &[u8]) -> anyhow::Result<(u32, CrlSet)> {
    if let Some(manifest) = &cli.manifest {
        let manifest_path = current_dir.join(manifest);
        if !manifest_path.exists() {
            exit_with_error(CrlSetCliError::ManifestNotFound(
                manifest_path.to_string_lossy().to_string(),
            ));
        }

        let xml = fs::read_to_string(&manifest_path)
            .with_context(|| format!("Failed to read {}", manifest_path.display()))?;

        let update = parse_update_manifest(&xml, &cli.app_id)?;
        let snapshot = Snapshot::from_package(update, data)?;

        return Ok((snapshot.crx_version(), snapshot.into_crl_set()));
    }

    if let Some(digest) = &cli.sha256 {
        verify_sha256(data, digest)?;
    }

    let decoded = decode_package(data).context("Failed to decode CRLSet package")?;
    Ok((decoded.container.version, decoded.crl_set))
}

fn run(cli: Cli) -> anyhow::Result<()> {
    if cli.print_url {
        println!("{}", build_update_url(&UpdateParams::for_app(&cli.app_id)));
        return Ok(());
    }

    let filename = cli.filename.as_deref().context("No CRX file given")?;
    if !is_supported_package(filename) {
        exit_with_error(CrlSetCliError::UnsupportedFileType);
    }

    let current_dir = env::current_dir().context("Failed to get current directory")?;
    let crx_file_path = current_dir.join(filename);

    if !crx_file_path.exists() {
        exit_with_error(CrlSetCliError::PackageNotFound(
            crx_file_path.to_string_lossy().to_string(),
        ));
    }

    let data = fs::read(&crx_file_path)
        .with_context(|| format!("Failed to read {}", crx_file_path.display()))?;
    debug!(path = %crx_file_path.display(), bytes = data.len(), "read package");

    let (crx_version, crl_set) = load_crl_set(&cli, &current_dir, &data)?;

    let document = if cli.summary {
        summary_lines(crx_version, &crl_set).join("\n")
    } else {
        serde_json::to_string_pretty(&crl_set).context("Failed to render CRLSet")?
    };

    match &cli.output {
        Some(path) => {
            let output_file = current_dir.join(path);
            fs::write(&output_file, format!("{}\n", document))
                .with_context(|| format!("Failed to write {}", output_file.display()))?;

            println!(
                "Successfully decoded {} to {}",
                filename,
                output_file.display()
            );
        }
        None => println!("{}", document),
    }

    Ok(())
}

pub fn main() {
    // If no arguments provided, launch TUI mode
    if env::args().len() == 1 {
        if let Err(err) = tui_app::run_tui() {
            eprintln!("TUI Error: {}", err);
            process::exit(1);
        }
        return;
    }

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("Error: {:#}", err);
        process::exit(1);
    }
}
