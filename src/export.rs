use crate::record::Projection;
use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

pub const EXPORT_SUBDIR: &str = "signoff_exports";

/// Deterministic artifact name: the same job and date always export to the
/// same filename.
pub fn export_filename(job_number: &str, date: NaiveDate, ext: &str) -> String {
    format!("Timesheet_{}_{}.{}", job_number, date.format("%Y-%m-%d"), ext)
}

/// The export collaborator: consumes the projection plus a rendered visual
/// representation of it and produces a downloadable document. Document
/// rasterization (e.g. PDF layout) is the implementor's concern.
pub trait SheetExporter {
    fn export(&self, sheet: &Projection<'_>, rendered: &[u8], ext: &str) -> Result<PathBuf>;
}

/// Writes the rendered artifact into a local exports folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileExporter {
    output_dir: PathBuf,
}

impl FileExporter {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    /// Exports land in a folder next to the executable.
    pub fn exe_relative() -> Result<Self> {
        let exe_path = std::env::current_exe().context("resolve current executable")?;
        Ok(Self::new(exe_relative_output_folder_from_path(&exe_path)?))
    }
}

pub fn exe_relative_output_folder_from_path(exe_path: &Path) -> Result<PathBuf> {
    let parent = exe_path
        .parent()
        .ok_or_else(|| anyhow!("executable path has no parent: {}", exe_path.display()))?;
    Ok(parent.join(EXPORT_SUBDIR))
}

impl SheetExporter for FileExporter {
    fn export(&self, sheet: &Projection<'_>, rendered: &[u8], ext: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)
            .with_context(|| format!("create export folder {}", self.output_dir.display()))?;

        let filename = export_filename(&sheet.fields.job_number, sheet.fields.date, ext);
        let path = self.output_dir.join(filename);
        fs::write(&path, rendered)
            .with_context(|| format!("write export {}", path.display()))?;
        tracing::info!("exported timesheet to {}", path.display());
        Ok(path)
    }
}
