//! File-backed weight log.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use margay_align::WeightSink;
use margay_core::Result;

/// Append-only weight log: one `source,model,weight` line per record.
///
/// The file is opened (and created if absent) on every record, so
/// successive runs of independent alignments accumulate without any state
/// held between calls.
#[derive(Debug, Clone)]
pub struct WeightLog {
    path: PathBuf,
}

impl WeightLog {
    /// Create a log that appends to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl WeightSink for WeightLog {
    fn record(&mut self, source: &str, model: &str, weight: f64) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{},{},{}", source, model, weight)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn records_append() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("weights.log");
        let mut log = WeightLog::new(&path);
        log.record("a.fasta", "marginal", 1.51294).unwrap();
        log.record("b.fasta", "marginal", -0.658564).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "a.fasta,marginal,1.51294");
        assert!(lines[1].starts_with("b.fasta,marginal,-0.658564"));
    }

    #[test]
    fn separate_logs_do_not_share_state() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("weights.log");
        WeightLog::new(&path).record("x", "marginal", 0.5).unwrap();
        WeightLog::new(&path).record("y", "marginal", 0.25).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }
}
