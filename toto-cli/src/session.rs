use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use toto_db::models::DrawTable;
use toto_db::store::{load_clean, save_table};
use toto_db::validate::ValidationReport;

use crate::config::AnalysisConfig;

/// A validated table together with where it came from.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub path: PathBuf,
    pub table: DrawTable,
    /// `None` for freshly generated draws, which are valid by construction.
    pub report: Option<ValidationReport>,
}

impl Dataset {
    pub fn label(&self) -> String {
        self.path.display().to_string()
    }
}

/// Loads and cleans a CSV. In strict mode any invalid row is an error.
pub fn load_dataset(path: &Path, strict: bool) -> Result<Dataset> {
    let (table, report) = load_clean(path).with_context(|| format!("Cannot load {}", path.display()))?;
    if strict && !report.is_clean() {
        bail!(
            "{} invalid row(s) of {} in {} (strict mode)",
            report.invalid_count(),
            report.total_rows,
            path.display()
        );
    }
    Ok(Dataset {
        path: path.to_path_buf(),
        table,
        report: Some(report),
    })
}

/// State of one interactive run: the configuration and the dataset currently
/// under analysis. Handlers receive it explicitly.
pub struct Session {
    pub config: AnalysisConfig,
    dataset: Option<Dataset>,
}

impl Session {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config, dataset: None }
    }

    pub fn dataset(&self) -> Result<&Dataset> {
        self.dataset
            .as_ref()
            .context("No data loaded. Load a CSV file or generate draws first")
    }

    pub fn load(&mut self, path: &Path) -> Result<&Dataset> {
        let dataset = load_dataset(path, self.config.strict)?;
        Ok(self.dataset.insert(dataset))
    }

    /// Replaces the current dataset with generated draws, also written to `output`.
    pub fn set_generated(&mut self, table: DrawTable, output: &Path) -> Result<&Dataset> {
        save_table(output, &table).with_context(|| format!("Cannot write {}", output.display()))?;
        Ok(self.dataset.insert(Dataset {
            path: output.to_path_buf(),
            table,
            report: None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toto_analysis::generator::generate;

    #[test]
    fn test_session_starts_empty() {
        let session = Session::new(AnalysisConfig::default());
        assert!(session.dataset().is_err());
    }

    #[test]
    fn test_generated_then_reloaded() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("sim.csv");
        let mut session = Session::new(AnalysisConfig::default());

        let table = generate(20, Some(5)).unwrap();
        let generated = session.set_generated(table.clone(), &output).unwrap();
        assert_eq!(generated.table.len(), 20);
        assert!(generated.report.is_none());

        let loaded = session.load(&output).unwrap();
        assert_eq!(loaded.table, table);
        assert!(loaded.report.as_ref().unwrap().is_clean());
    }

    #[test]
    fn test_strict_mode_rejects_dirty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dirty.csv");
        std::fs::write(&path, "Num1,Num2,Num3,Num4,Num5,Num6,Num7\n1,2,3,4,5,6,7\n1,1,2,3,4,5,6\n").unwrap();

        assert_eq!(load_dataset(&path, false).unwrap().table.len(), 1);
        assert!(load_dataset(&path, true).is_err());
    }

    #[test]
    fn test_missing_file_keeps_previous_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("sim.csv");
        let mut session = Session::new(AnalysisConfig::default());
        session.set_generated(generate(3, Some(1)).unwrap(), &output).unwrap();

        assert!(session.load(&dir.path().join("missing.csv")).is_err());
        assert_eq!(session.dataset().unwrap().table.len(), 3);
    }
}
