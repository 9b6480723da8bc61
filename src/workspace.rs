//! Output directory layout for comparison artifacts

use crate::error::{Result, TabcompareError};
use std::fs;
use std::path::{Path, PathBuf};

/// Kinds of file a comparison run can write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Deleted,
    Inserted,
    Updated,
    Combined,
    Report,
    Excel,
    Summary,
}

impl OutputKind {
    fn suffix(&self) -> &'static str {
        match self {
            OutputKind::Deleted => "deleted.csv",
            OutputKind::Inserted => "inserted.csv",
            OutputKind::Updated => "updated.csv",
            OutputKind::Combined => "combined.csv",
            OutputKind::Report => "report.txt",
            OutputKind::Excel => "comparison.xlsx",
            OutputKind::Summary => "summary.json",
        }
    }

    pub const ALL: [OutputKind; 7] = [
        OutputKind::Deleted,
        OutputKind::Inserted,
        OutputKind::Updated,
        OutputKind::Combined,
        OutputKind::Report,
        OutputKind::Excel,
        OutputKind::Summary,
    ];
}

/// Directory and file-name prefix where results are written
#[derive(Debug, Clone)]
pub struct OutputWorkspace {
    pub outdir: PathBuf,
    pub prefix: String,
}

impl OutputWorkspace {
    /// Describe a workspace without touching the filesystem
    pub fn new(outdir: impl Into<PathBuf>, prefix: impl Into<String>) -> Result<Self> {
        let prefix = prefix.into();
        if prefix.trim().is_empty() {
            return Err(TabcompareError::config("Output prefix must not be empty"));
        }
        if prefix.contains(['/', '\\']) {
            return Err(TabcompareError::config(format!(
                "Output prefix must not contain path separators: {}",
                prefix
            )));
        }

        Ok(Self {
            outdir: outdir.into(),
            prefix,
        })
    }

    /// Create the output directory if needed
    pub fn create(outdir: impl Into<PathBuf>, prefix: impl Into<String>) -> Result<Self> {
        let workspace = Self::new(outdir, prefix)?;
        workspace.ensure_dir()?;
        Ok(workspace)
    }

    pub fn ensure_dir(&self) -> Result<()> {
        if !self.outdir.exists() {
            fs::create_dir_all(&self.outdir)?;
            log::info!("Created output directory: {}", self.outdir.display());
        } else if !self.outdir.is_dir() {
            return Err(TabcompareError::config(format!(
                "Output path exists and is not a directory: {}",
                self.outdir.display()
            )));
        }
        Ok(())
    }

    pub fn path(&self, kind: OutputKind) -> PathBuf {
        self.outdir.join(format!("{}_{}", self.prefix, kind.suffix()))
    }

    pub fn deleted_path(&self) -> PathBuf {
        self.path(OutputKind::Deleted)
    }

    pub fn inserted_path(&self) -> PathBuf {
        self.path(OutputKind::Inserted)
    }

    pub fn updated_path(&self) -> PathBuf {
        self.path(OutputKind::Updated)
    }

    pub fn combined_path(&self) -> PathBuf {
        self.path(OutputKind::Combined)
    }

    pub fn report_path(&self) -> PathBuf {
        self.path(OutputKind::Report)
    }

    pub fn excel_path(&self) -> PathBuf {
        self.path(OutputKind::Excel)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.path(OutputKind::Summary)
    }

    /// Output files of this prefix currently on disk
    pub fn existing_outputs(&self) -> Vec<PathBuf> {
        OutputKind::ALL
            .iter()
            .map(|kind| self.path(*kind))
            .filter(|p| p.is_file())
            .collect()
    }

    pub fn outdir(&self) -> &Path {
        &self.outdir
    }
}
