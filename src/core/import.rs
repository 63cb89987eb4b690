//! Bulk import of `amount,date,category` lines into the store.

use std::{
    fs::File,
    io::{BufRead, BufReader, ErrorKind},
    path::Path,
};

use thiserror::Error;

use crate::{
    errors::{LedgerError, Result},
    ledger::{parse_amount, validate_date, Transaction},
};

use super::ledger_store::LedgerStore;

const FIELD_SEPARATOR: char = ',';
const EXPECTED_FIELDS: usize = 3;

/// Why a single import line was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportLineError {
    #[error("expected 3 comma-separated fields (amount,date,category), found {0}")]
    FieldCount(usize),
    #[error("amount `{0}` is not a number")]
    InvalidAmount(String),
    #[error("date is missing")]
    MissingDate,
    #[error("date `{0}` is not in YYYY-MM-DD format")]
    InvalidDate(String),
    #[error("category is missing")]
    MissingCategory,
    #[error("line is not valid UTF-8")]
    InvalidEncoding,
}

/// A rejected line, numbered from 1.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedLine {
    pub line_number: usize,
    pub content: String,
    pub reason: ImportLineError,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    pub imported: Vec<Transaction>,
    pub skipped: Vec<SkippedLine>,
}

impl ImportReport {
    pub fn imported_count(&self) -> usize {
        self.imported.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// One accepted line, ready to be added to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportLine {
    pub amount: f64,
    pub date: String,
    pub category: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    /// Reject dates that are not `YYYY-MM-DD` instead of storing them verbatim.
    pub strict_dates: bool,
}

/// Parses one line. `Ok(None)` means the line carries no data and is ignored.
pub fn parse_line(
    raw: &str,
    options: ImportOptions,
) -> std::result::Result<Option<ImportLine>, ImportLineError> {
    let line = raw.trim();
    if line
        .chars()
        .all(|ch| ch == FIELD_SEPARATOR || ch.is_whitespace())
    {
        return Ok(None);
    }

    let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    let [amount, date, category] = fields.as_slice() else {
        return Err(ImportLineError::FieldCount(fields.len()));
    };

    let amount = parse_amount(amount)
        .map_err(|_| ImportLineError::InvalidAmount(amount.trim().to_string()))?;
    if date.is_empty() {
        return Err(ImportLineError::MissingDate);
    }
    let date = if options.strict_dates {
        validate_date(date).map_err(|_| ImportLineError::InvalidDate(date.to_string()))?
    } else {
        date.to_string()
    };
    if category.is_empty() {
        return Err(ImportLineError::MissingCategory);
    }

    Ok(Some(ImportLine {
        amount,
        date,
        category: category.to_string(),
    }))
}

/// Feeds parsed lines into a [`LedgerStore`], persisting once per source.
#[derive(Debug, Clone, Default)]
pub struct BulkImporter {
    options: ImportOptions,
}

impl BulkImporter {
    pub fn new(options: ImportOptions) -> Self {
        Self { options }
    }

    /// Imports every valid line of the file at `path`.
    ///
    /// A missing file is reported as [`LedgerError::ImportSourceMissing`];
    /// malformed lines end up in [`ImportReport::skipped`].
    pub fn import_file(&self, store: &mut LedgerStore, path: &Path) -> Result<ImportReport> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(LedgerError::ImportSourceMissing(path.to_path_buf()))
            }
            Err(err) => return Err(err.into()),
        };
        let report = self.import_reader(store, BufReader::new(file))?;
        tracing::info!(
            path = %path.display(),
            imported = report.imported_count(),
            skipped = report.skipped_count(),
            "bulk import finished"
        );
        Ok(report)
    }

    pub fn import_reader<R: BufRead>(
        &self,
        store: &mut LedgerStore,
        mut reader: R,
    ) -> Result<ImportReport> {
        let mut report = ImportReport::default();
        let mut read_error = None;
        let mut buf = Vec::new();
        let mut line_number = 0;

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {}
                Err(err) => {
                    read_error = Some(err);
                    break;
                }
            }
            line_number += 1;
            let line = match std::str::from_utf8(&buf) {
                Ok(line) => line,
                Err(_) => {
                    let reason = ImportLineError::InvalidEncoding;
                    tracing::warn!(line_number, %reason, "import line skipped");
                    report.skipped.push(SkippedLine {
                        line_number,
                        content: String::from_utf8_lossy(&buf).trim().to_string(),
                        reason,
                    });
                    continue;
                }
            };
            match parse_line(line, self.options) {
                Ok(Some(parsed)) => {
                    let transaction =
                        store.insert(&parsed.category, parsed.amount, "", &parsed.date);
                    report.imported.push(transaction);
                }
                Ok(None) => {}
                Err(reason) => {
                    tracing::warn!(line_number, %reason, "import line skipped");
                    report.skipped.push(SkippedLine {
                        line_number,
                        content: line.trim().to_string(),
                        reason,
                    });
                }
            }
        }

        // Records read before a failure are kept.
        store.persist()?;
        match read_error {
            Some(err) => Err(err.into()),
            None => Ok(report),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use std::io::Cursor;

    fn lenient() -> ImportOptions {
        ImportOptions::default()
    }

    #[test]
    fn parse_line_trims_amount_only() {
        let parsed = parse_line(" 12.50 ,2024-03-01, Food ", lenient())
            .unwrap()
            .unwrap();
        assert_eq!(parsed.amount, 12.5);
        assert_eq!(parsed.date, "2024-03-01");
        // Outer whitespace goes with the line trim, inner spacing is kept.
        assert_eq!(parsed.category, " Food");
    }

    #[test]
    fn parse_line_ignores_blank_and_separator_only_lines() {
        assert_eq!(parse_line("", lenient()), Ok(None));
        assert_eq!(parse_line("   ", lenient()), Ok(None));
        assert_eq!(parse_line(", ", lenient()), Ok(None));
        assert_eq!(parse_line(",,", lenient()), Ok(None));
    }

    #[test]
    fn parse_line_reports_field_errors() {
        assert_eq!(
            parse_line("bad-line", lenient()),
            Err(ImportLineError::FieldCount(1))
        );
        assert_eq!(
            parse_line("1,2024-01-01,Food,extra", lenient()),
            Err(ImportLineError::FieldCount(4))
        );
        assert_eq!(
            parse_line("ten,2024-01-01,Food", lenient()),
            Err(ImportLineError::InvalidAmount("ten".into()))
        );
        assert_eq!(
            parse_line("10,,Food", lenient()),
            Err(ImportLineError::MissingDate)
        );
        assert_eq!(
            parse_line("10,2024-01-01,", lenient()),
            Err(ImportLineError::MissingCategory)
        );
    }

    #[test]
    fn lenient_mode_keeps_dates_verbatim() {
        let parsed = parse_line("10,01/02/2024,Food", lenient()).unwrap().unwrap();
        assert_eq!(parsed.date, "01/02/2024");

        let strict = ImportOptions { strict_dates: true };
        assert_eq!(
            parse_line("10,01/02/2024,Food", strict),
            Err(ImportLineError::InvalidDate("01/02/2024".into()))
        );
        let parsed = parse_line("10,2024-2-1,Food", strict).unwrap().unwrap();
        assert_eq!(parsed.date, "2024-02-01");
    }

    #[test]
    fn import_reader_isolates_bad_lines_and_persists_once() {
        let storage = MemoryStorage::new();
        let mut store = LedgerStore::open(Box::new(storage.clone()));
        store.add("Food", 1.0, "seed", "2024-01-01").unwrap();

        let input = "50.00,2024-03-01,Food\n, \nbad-line\n20,2024-03-02,Transport";
        let report = BulkImporter::default()
            .import_reader(&mut store, Cursor::new(input))
            .unwrap();

        assert_eq!(report.imported_count(), 2);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.skipped[0].line_number, 3);
        assert_eq!(report.skipped[0].content, "bad-line");
        let ids: Vec<u64> = report.imported.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 3]);
        assert!(report.imported.iter().all(|t| t.description.is_empty()));
        assert_eq!(store.find_by_id(3).unwrap().0, "Transport");
        assert_eq!(store.ledger().category("Food").unwrap().len(), 2);
        // One save from the seed add, one for the whole import.
        assert_eq!(storage.save_count(), 2);
    }

    #[test]
    fn import_reader_skips_undecodable_line_and_continues() {
        let storage = MemoryStorage::new();
        let mut store = LedgerStore::open(Box::new(storage.clone()));
        let input: &[u8] = b"1,2024-01-01,Food\n2,2024-01-02,Caf\xe9\r\n3,2024-01-03,Bills\n";

        let report = BulkImporter::default()
            .import_reader(&mut store, Cursor::new(input))
            .unwrap();

        assert_eq!(report.imported_count(), 2);
        assert_eq!(report.skipped_count(), 1);
        let skipped = &report.skipped[0];
        assert_eq!(skipped.line_number, 2);
        assert_eq!(skipped.reason, ImportLineError::InvalidEncoding);
        assert_eq!(skipped.content, "2,2024-01-02,Caf\u{FFFD}");
        assert_eq!(store.find_by_id(2).unwrap().0, "Bills");
        assert_eq!(storage.save_count(), 1);
    }

    #[test]
    fn import_file_reports_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let storage = MemoryStorage::new();
        let mut store = LedgerStore::open(Box::new(storage.clone()));
        let missing = dir.path().join("nope.txt");

        let err = BulkImporter::default()
            .import_file(&mut store, &missing)
            .expect_err("missing file must fail");
        assert!(
            matches!(err, LedgerError::ImportSourceMissing(ref path) if path == &missing),
            "unexpected: {err:?}"
        );
        assert_eq!(storage.save_count(), 0);
    }

    #[test]
    fn import_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bulk.txt");
        std::fs::write(&path, "5,2024-01-01,Food\n\n7.5,2024-01-02,Bills\n").unwrap();
        let mut store = LedgerStore::open(Box::new(MemoryStorage::new()));

        let report = BulkImporter::default()
            .import_file(&mut store, &path)
            .unwrap();
        assert_eq!(report.imported_count(), 2);
        assert!(report.skipped.is_empty());
        assert_eq!(store.aggregate().unwrap().grand_total, 12.5);
    }
}
