// 💾 Storage - load/save the registry file, export the table report
//
// Thin file layer over the codec: opens files, maps I/O failures to
// GymError and logs the outcome.

use crate::codec::{self, DecodeReport};
use crate::entities::{FeeSchedule, MemberRegistry};
use crate::error::{GymError, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::{info, warn};

/// Default file used for the implicit load on start and save on exit
pub const DEFAULT_DATA_FILE: &str = "gym_records.csv";

/// Load a registry file. Malformed rows are skipped and listed in the report.
pub fn load_file(path: &Path) -> Result<DecodeReport> {
    let read_err = |source| GymError::FileRead {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(read_err)?;
    let report = codec::read_registry(BufReader::new(file)).map_err(read_err)?;

    for issue in &report.issues {
        warn!(path = %path.display(), "skipped row: {}", issue);
    }
    info!(
        path = %path.display(),
        loaded = report.loaded(),
        skipped = report.skipped(),
        "registry loaded"
    );

    Ok(report)
}

/// Write every member to `path`, replacing its contents
pub fn save_file(path: &Path, registry: &MemberRegistry) -> Result<usize> {
    let write_err = |source| GymError::FileWrite {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(write_err)?;
    let written = codec::write_registry(BufWriter::new(file), registry)
        .map_err(|e| write_err(e.into()))?;

    info!(path = %path.display(), written, "registry saved");
    Ok(written)
}

/// Write the human-readable table (header + quoted cells)
pub fn export_table(path: &Path, registry: &MemberRegistry, fees: &FeeSchedule) -> Result<usize> {
    let write_err = |source| GymError::FileWrite {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(write_err)?;
    let written = codec::write_table(BufWriter::new(file), registry, fees)
        .map_err(|e| write_err(e.into()))?;

    info!(path = %path.display(), written, "table exported");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Member, MembershipStatus, PerformanceRecord};
    use chrono::NaiveDate;
    use std::fs;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("members.csv");

        let mut registry = MemberRegistry::new();
        let mut ben = Member::premium("P001", "Ben Ito", date(2023, 6, 1), 20.0).unwrap();
        ben.add_performance(PerformanceRecord::new(5, 2024, true).unwrap());
        registry.add(ben).unwrap();
        registry
            .add(
                Member::regular("M001", "Ana Lopez", date(2024, 1, 15))
                    .unwrap()
                    .with_status(MembershipStatus::Frozen),
            )
            .unwrap();

        assert_eq!(save_file(&path, &registry).unwrap(), 2);

        let report = load_file(&path).unwrap();
        assert!(report.issues.is_empty());
        assert_eq!(report.registry.list(), registry.list());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_file(&dir.path().join("nope.csv"));
        assert!(matches!(result, Err(GymError::FileRead { .. })));
    }

    #[test]
    fn test_save_to_unwritable_destination() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing_dir").join("out.csv");

        let result = save_file(&path, &MemberRegistry::new());
        assert!(matches!(result, Err(GymError::FileWrite { .. })));
    }

    #[test]
    fn test_load_reports_bad_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mixed.csv");
        fs::write(&path, "M001,Ana Lopez,Regular,2024-01-15,ACTIVE\nM002,Broken,Regular\n").unwrap();

        let report = load_file(&path).unwrap();
        assert_eq!(report.loaded(), 1);
        assert_eq!(report.skipped(), 1);
    }

    #[test]
    fn test_export_table_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.csv");
        let mut registry = MemberRegistry::new();
        registry
            .add(Member::regular("M001", "Ana", date(2024, 1, 15)).unwrap())
            .unwrap();

        export_table(&path, &registry, &FeeSchedule::default()).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("\"ID\",\"Name\""));
        assert_eq!(text.lines().count(), 2);
    }
}
