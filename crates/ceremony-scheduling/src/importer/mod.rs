//! Migration of bookings from the previous office registry.
//!
//! The old system exports `Registration ID,Date,Time,Venue,Status` rows.
//! Each usable row is admitted through the capacity ledger so migrated data
//! obeys the same caps as live bookings; rows that cannot be admitted are
//! reported, never silently dropped.

mod parser;

use std::io::Read;
use std::path::Path;

use tracing::info;

use crate::scheduling::{
    BookingRepository, CapacityLedger, LedgerError, QuotaPolicy, RegistrationId,
    RegistrationStatus, RepositoryError,
};
use parser::{LegacyRecord, RowIssue};

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Ledger(LedgerError),
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Io(err) => write!(f, "failed to read registry export: {}", err),
            ImportError::Csv(err) => write!(f, "invalid registry CSV data: {}", err),
            ImportError::Ledger(err) => write!(f, "could not apply registry data: {}", err),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io(err) => Some(err),
            ImportError::Csv(err) => Some(err),
            ImportError::Ledger(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Row the import left out, with the line number of the export file.
#[derive(Debug, Clone)]
pub struct SkippedRow {
    pub line: u64,
    pub registration_id: Option<String>,
    pub reason: String,
}

/// Outcome of one registry import.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: Vec<SkippedRow>,
}

pub struct LegacyRegistryImporter;

impl LegacyRegistryImporter {
    pub fn from_path<R, P>(
        path: P,
        ledger: &CapacityLedger<R>,
    ) -> Result<ImportReport, ImportError>
    where
        R: BookingRepository,
        P: AsRef<Path>,
    {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, ledger)
    }

    pub fn from_reader<R, I>(reader: I, ledger: &CapacityLedger<R>) -> Result<ImportReport, ImportError>
    where
        R: BookingRepository,
        I: Read,
    {
        let rows = parser::parse_records(reader)?;
        let mut report = ImportReport::default();

        let mut counted = Vec::new();
        let mut archived = Vec::new();
        for (line, row) in rows {
            match row {
                Ok(record) if QuotaPolicy::is_counted(record.status) => {
                    counted.push((line, record))
                }
                Ok(record) => archived.push((line, record)),
                Err(issue) => skip(&mut report, line, None, &issue),
            }
        }

        // Completed/rejected rows go first: each one frees its transient
        // hold before live rows claim the slot, so an archived ceremony can
        // never crowd out a counted one.
        for (line, record) in archived.into_iter().chain(counted) {
            apply_record(line, record, ledger, &mut report)?;
        }

        info!(
            imported = report.imported,
            skipped = report.skipped.len(),
            "legacy registry import finished"
        );
        Ok(report)
    }
}

fn apply_record<R>(
    line: u64,
    record: LegacyRecord,
    ledger: &CapacityLedger<R>,
    report: &mut ImportReport,
) -> Result<(), ImportError>
where
    R: BookingRepository,
{
    let LegacyRecord {
        registration_id,
        date,
        slot,
        category,
        status,
    } = record;

    let admitted = ledger.try_admit(RegistrationId(registration_id.clone()), date, slot, category);
    let booking = match admitted {
        Ok(booking) => booking,
        Err(error) if is_row_rejection(&error) => {
            report.skipped.push(SkippedRow {
                line,
                registration_id: Some(registration_id),
                reason: error.to_string(),
            });
            return Ok(());
        }
        Err(error) => return Err(ImportError::Ledger(error)),
    };

    if status != RegistrationStatus::Draft {
        ledger
            .update_status(&booking.id, status)
            .map_err(ImportError::Ledger)?;
    }

    report.imported += 1;
    Ok(())
}

/// Rejections that condemn a single row rather than the whole import.
fn is_row_rejection(error: &LedgerError) -> bool {
    matches!(
        error,
        LedgerError::SlotInvalid { .. }
            | LedgerError::CategoryFull { .. }
            | LedgerError::CombinedFull { .. }
            | LedgerError::Repository(RepositoryError::Conflict)
    )
}

fn skip(report: &mut ImportReport, line: u64, registration_id: Option<String>, issue: &RowIssue) {
    report.skipped.push(SkippedRow {
        line,
        registration_id,
        reason: issue.describe(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduling::tests_support::MemoryRepository;
    use crate::scheduling::{SlotGrid, VenueCategory};
    use chrono::{NaiveDate, NaiveTime};
    use std::io::Cursor;
    use std::sync::Arc;

    fn ledger() -> CapacityLedger<MemoryRepository> {
        CapacityLedger::new(SlotGrid::office_hours(), Arc::new(MemoryRepository::default()))
    }

    const EXPORT: &str = "\
Registration ID,Date,Time,Venue,Status
REG-2001,2025-03-10,09:00,Office,approved
REG-2002,2025-03-10,09:00,External,draft
REG-2003,2025-03-10,09:00,External,completed
REG-2004,2025-03-10,25:00,Office,draft
";

    #[test]
    fn imports_counted_and_archived_rows() {
        let ledger = ledger();
        let report = LegacyRegistryImporter::from_reader(Cursor::new(EXPORT), &ledger)
            .expect("import succeeds");

        assert_eq!(report.imported, 3);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].reason.contains("HH:MM"));

        let occupancy = ledger
            .occupancy_of(
                NaiveDate::from_ymd_opt(2025, 3, 10).expect("valid date"),
                NaiveTime::from_hms_opt(9, 0, 0).expect("valid time"),
            )
            .expect("occupancy readable");
        // The completed row is archived and no longer counts.
        assert_eq!(occupancy.count_for(VenueCategory::OnPremise), 1);
        assert_eq!(occupancy.count_for(VenueCategory::OffPremise), 1);
    }

    #[test]
    fn capacity_violations_condemn_the_row_not_the_import() {
        let export = "\
Registration ID,Date,Time,Venue,Status
REG-3001,2025-03-11,10:00,Office,draft
REG-3002,2025-03-11,10:00,Office,draft
";
        let ledger = ledger();
        let report = LegacyRegistryImporter::from_reader(Cursor::new(export), &ledger)
            .expect("import succeeds");

        assert_eq!(report.imported, 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].registration_id.as_deref(), Some("REG-3002"));
        assert!(report.skipped[0].reason.contains("capacity"));
    }

    #[test]
    fn malformed_header_fails_the_import() {
        let ledger = ledger();
        let result =
            LegacyRegistryImporter::from_reader(Cursor::new("not,a,registry\n1,2,3\n"), &ledger);
        assert!(matches!(result, Err(ImportError::Csv(_))));
    }
}
