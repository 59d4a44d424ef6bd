use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use recordset_contacts::{resolve_and_export, ExportConfig, SearchBatch};

#[derive(Parser)]
#[command(
    name = "recordset-contacts",
    about = "Resolve recordset contacts for a search batch and export one CSV per recordset"
)]
#[command(version)]
struct Cli {
    /// Search batch JSON ({"records": [...], "attribution": [...]})
    input: PathBuf,

    /// Directory receiving the export files
    dest_dir: PathBuf,

    /// Contact slots grouped at the front of the contact table
    #[arg(long, default_value_t = recordset_contacts::config::DEFAULT_CONTACT_CAP)]
    contact_cap: usize,

    /// Record field holding the recordset uuid
    #[arg(long, default_value = recordset_contacts::config::DEFAULT_SOURCE_FIELD)]
    source_field: String,

    /// Leave out recordsets that have records but no emailed contacts
    #[arg(long)]
    omit_undocumented: bool,

    /// Do not write the contact table CSV
    #[arg(long)]
    no_summary: bool,

    /// Reject export file names that differ only by case
    #[arg(long)]
    fold_case: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = ExportConfig::default()
        .contact_cap(cli.contact_cap)
        .source_field(cli.source_field.clone())
        .include_undocumented_sources(!cli.omit_undocumented)
        .case_insensitive_file_names(cli.fold_case);
    if cli.no_summary {
        config = config.summary_file(None);
    }

    let batch = SearchBatch::load(&cli.input, &config.source_field)
        .await
        .with_context(|| format!("reading {}", cli.input.display()))?;

    let outcome = resolve_and_export(&batch, &cli.dest_dir, &config)
        .await
        .context("export run failed")?;

    for failure in &outcome.report.failed {
        warn!("Recordset {:?} not exported: {}", failure.source_uuid, failure.reason);
    }
    info!(
        "{} recordsets, {} files written to {}",
        outcome.table.len(),
        outcome.report.written.len(),
        cli.dest_dir.display()
    );

    if !outcome.report.is_complete() {
        anyhow::bail!("{} recordsets failed to export", outcome.report.failed.len());
    }
    Ok(())
}
