//! Journal writer.
//!
//! Writes entries as JSON lines (one JSON object per line).

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::error::TransportError;

use super::entry::AuditEntry;

/// Appends journal entries to a file.
///
/// Thread-safe via internal mutex.
pub struct AuditLogger {
    file: Mutex<File>,
    path: PathBuf,
}

impl AuditLogger {
    /// Open the journal at `path` in append mode, creating parent
    /// directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file
    /// cannot be opened.
    pub fn new(path: &Path) -> Result<Self, TransportError> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                debug!(path = %parent.display(), "Creating journal directory");
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        debug!(path = %path.display(), "Exchange journal opened");

        Ok(Self {
            file: Mutex::new(file),
            path: path.to_path_buf(),
        })
    }

    /// Append an entry and sync it to disk.
    pub fn log(&self, entry: &AuditEntry) -> Result<(), TransportError> {
        let json = serde_json::to_string(entry)?;

        let mut file = match self.file.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        writeln!(file, "{}", json)?;

        if let Err(e) = file.sync_data() {
            warn!(error = %e, "Failed to sync exchange journal");
        }

        debug!(
            exchange_id = %entry.exchange_id,
            channel_id = %entry.channel_id,
            "Journal entry written"
        );

        Ok(())
    }

    /// Path to the journal file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Destination for completed-exchange entries.
pub trait ExchangeJournal: Send + Sync {
    /// Record one entry.
    fn record(&self, entry: &AuditEntry) -> Result<(), TransportError>;

    /// Whether entries are kept at all. Callers may skip building entries
    /// when this is `false`.
    fn is_enabled(&self) -> bool {
        true
    }
}

impl ExchangeJournal for AuditLogger {
    fn record(&self, entry: &AuditEntry) -> Result<(), TransportError> {
        self.log(entry)
    }
}

/// A no-op journal for when journaling is disabled.
pub struct NullAuditLogger;

impl NullAuditLogger {
    /// Create a new null audit logger.
    pub fn new() -> Self {
        Self
    }
}

impl Default for NullAuditLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl ExchangeJournal for NullAuditLogger {
    fn record(&self, _entry: &AuditEntry) -> Result<(), TransportError> {
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;
    use uuid::Uuid;

    use crate::exchange::ExchangeState;
    use crate::transport::ChannelId;

    fn create_test_entry(timed_out: bool) -> AuditEntry {
        let mut state = ExchangeState::new("https://c/relay.html", "https://api.example");
        state.api_uri = "https://api.example/items".to_string();
        AuditEntry::new(
            "2024-01-15T10:30:45.123Z".to_string(),
            Uuid::nil(),
            ChannelId::new(1),
            &state,
            timed_out,
            10,
        )
    }

    fn read_lines(path: &Path) -> Vec<String> {
        let mut content = String::new();
        File::open(path)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        content.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_logger_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("subdir/exchanges.log");

        let logger = AuditLogger::new(&log_path).unwrap();
        assert!(log_path.parent().unwrap().exists());
        assert_eq!(logger.path(), log_path);
    }

    #[test]
    fn test_logger_writes_json_lines() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("exchanges.log");

        let logger = AuditLogger::new(&log_path).unwrap();
        logger.log(&create_test_entry(false)).unwrap();
        logger.log(&create_test_entry(true)).unwrap();

        let lines = read_lines(&log_path);
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(first["uri"], "https://api.example/items");
        assert_eq!(first["result"]["outcome"], "completed");

        let second: serde_json::Value = serde_json::from_str(&lines[1]).unwrap();
        assert_eq!(second["result"]["outcome"], "timed_out");
    }

    #[test]
    fn test_logger_appends_to_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("exchanges.log");

        {
            let logger = AuditLogger::new(&log_path).unwrap();
            logger.log(&create_test_entry(false)).unwrap();
        }
        {
            let logger = AuditLogger::new(&log_path).unwrap();
            logger.log(&create_test_entry(false)).unwrap();
        }

        assert_eq!(read_lines(&log_path).len(), 2);
    }

    #[test]
    fn test_logger_records_through_journal_trait() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("exchanges.log");

        let journal: Box<dyn ExchangeJournal> = Box::new(AuditLogger::new(&log_path).unwrap());
        assert!(journal.is_enabled());
        journal.record(&create_test_entry(false)).unwrap();

        assert_eq!(read_lines(&log_path).len(), 1);
    }

    #[test]
    fn test_null_logger_discards_entries() {
        let journal = NullAuditLogger::new();
        assert!(!journal.is_enabled());
        assert!(journal.record(&create_test_entry(true)).is_ok());
    }
}
