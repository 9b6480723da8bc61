//! Command implementation for the tabcompare CLI

use crate::cli::{Cli, OutputFormat};
use crate::compare::{compare_tables, ComparisonResult};
use crate::data::DataProcessor;
use crate::error::Result;
use crate::excel;
use crate::export::{self, WrittenFile};
use crate::hash::{fingerprint, ResultFingerprint};
use crate::output::{ComparisonSummary, JsonFormatter, PrettyPrinter};
use crate::progress::ProgressReporter;
use crate::workspace::{OutputKind, OutputWorkspace};
use std::fs;

/// Everything a run produced
#[derive(Debug)]
pub struct RunOutcome {
    pub result: ComparisonResult,
    pub fingerprint: ResultFingerprint,
    pub files: Vec<WrittenFile>,
    pub workspace: OutputWorkspace,
    /// Rendered JSON summary when `--json` was given
    pub summary_json: Option<String>,
}

/// Execute the command and print its results
pub fn execute_command(cli: Cli) -> Result<()> {
    let format = cli.output_format();
    let outcome = run(&cli)?;

    match format {
        OutputFormat::Pretty => PrettyPrinter::print_comparison_summary(&outcome.result, &outcome.files),
        OutputFormat::Json => {
            if let Some(json) = &outcome.summary_json {
                println!("{}", json);
            }
        }
        OutputFormat::Quiet => PrettyPrinter::print_quiet(&outcome.result),
    }
    Ok(())
}

/// Load, compare and write outputs without printing the final summary
pub fn run(cli: &Cli) -> Result<RunOutcome> {
    let format = cli.output_format();
    let mut progress = if format == OutputFormat::Pretty {
        ProgressReporter::new_for_comparison()
    } else {
        ProgressReporter::new_minimal()
    };

    // Output location is validated before any loading work
    let workspace = OutputWorkspace::new(cli.outdir(), cli.prefix.as_str())?;

    let options = cli.load_options();
    let processor = DataProcessor::with_options(options.clone())?;
    progress.update_load(&format!("Loading {} and {}...", cli.a.display(), cli.b.display()));
    let (first, second) = processor.load_pair(&cli.a, &cli.b)?;
    progress.finish_load(&format!(
        "Loaded {} ({} rows) and {} ({} rows)",
        first.name,
        first.row_count(),
        second.name,
        second.row_count()
    ));

    let config = cli.comparison_config();
    if progress.is_enabled() {
        let swapped = config
            .reference_policy
            .swaps(first.row_count(), second.row_count());
        PrettyPrinter::print_input_preview(&first, &second, swapped, options.sample_rows);
    }

    progress.start_compare();
    let result = compare_tables(&first, &second, &config)?;
    let counts = result.counts();
    progress.finish_compare(&format!(
        "Compared {} keys: {} same, {} updated, {} deleted, {} inserted",
        result.metadata.distinct_keys, counts.same, counts.updated, counts.deleted, counts.inserted
    ));

    workspace.ensure_dir()?;
    let stale = workspace.existing_outputs();
    if !stale.is_empty() {
        log::info!(
            "Overwriting {} existing output file(s) in {}",
            stale.len(),
            workspace.outdir.display()
        );
    }
    let extra = [cli.report, cli.excel, cli.json].iter().filter(|f| **f).count();
    progress.start_write((4 + extra) as u64);

    let mut files = export::write_csv_views(&result, &workspace)?;
    for file in &files {
        progress.advance_write(&file.path.display().to_string());
    }

    if cli.report {
        let path = workspace.report_path();
        export::write_report(&result, &path)?;
        progress.advance_write(&path.display().to_string());
        files.push(WrittenFile {
            kind: OutputKind::Report,
            path,
            rows: 0,
        });
    }

    if cli.excel {
        let path = workspace.excel_path();
        excel::write_comparison_workbook(&result, &path)?;
        progress.advance_write(&path.display().to_string());
        files.push(WrittenFile {
            kind: OutputKind::Excel,
            path,
            rows: result.combined.len(),
        });
    }

    let fingerprint = fingerprint(&result);
    log::debug!("Result fingerprint: {}", fingerprint.overall);

    let summary_json = if cli.json {
        let summary = ComparisonSummary::new(&result, fingerprint.clone(), &files);
        let json = JsonFormatter::format(&summary)?;
        let path = workspace.summary_path();
        fs::write(&path, &json)?;
        log::info!("Wrote summary: {}", path.display());
        progress.advance_write(&path.display().to_string());
        files.push(WrittenFile {
            kind: OutputKind::Summary,
            path,
            rows: 0,
        });
        Some(json)
    } else {
        None
    };

    progress.finish_write(&format!("Wrote {} files to {}", files.len(), workspace.outdir.display()));
    log::debug!("Finished in {:.2?}", progress.elapsed());

    Ok(RunOutcome {
        result,
        fingerprint,
        files,
        workspace,
        summary_json,
    })
}
