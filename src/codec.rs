// 🧾 Row Codec - Member <-> delimited text rows
//
// Row layout (no header):
//   id, name, kind, join_date, status, [trainer_fee], [history]
//
// - trainer_fee only for Premium members
// - history only when non-empty: "month;year;achieved" joined by '|'
//
// Older files predate the status and history columns. Those rows are told
// apart by field count, never by a version tag.

use crate::entities::{
    FeeSchedule, KindTag, Member, MemberKind, MemberRegistry, MembershipStatus, PerformanceRecord,
};
use crate::error::{GymError, Result};
use chrono::NaiveDate;
use std::io;

pub const HISTORY_SEPARATOR: char = '|';
pub const RECORD_SEPARATOR: char = ';';

/// Column headers of the table export
pub const TABLE_COLUMNS: [&str; 7] = [
    "ID",
    "Name",
    "Type",
    "Join Date",
    "Status",
    "Monthly Fee ($)",
    "Details",
];

// ============================================================================
// ENCODE
// ============================================================================

pub fn encode_history(history: &[PerformanceRecord]) -> String {
    history
        .iter()
        .map(|r| {
            format!(
                "{}{sep}{}{sep}{}",
                r.month(),
                r.year(),
                r.goal_achieved(),
                sep = RECORD_SEPARATOR
            )
        })
        .collect::<Vec<_>>()
        .join(&HISTORY_SEPARATOR.to_string())
}

/// Fields of one row, in file order
pub fn encode_member(member: &Member) -> Vec<String> {
    let mut fields = vec![
        member.id().to_string(),
        member.name().to_string(),
        member.kind().tag().to_string(),
        member.join_date().format("%Y-%m-%d").to_string(),
        member.status().to_string(),
    ];

    if let MemberKind::Premium { trainer_fee } = member.kind() {
        fields.push(trainer_fee.to_string());
    }

    if !member.history().is_empty() {
        fields.push(encode_history(member.history()));
    }

    fields
}

/// Write every member as one row. Fields are quoted only when they contain
/// a delimiter, a quote or a line break.
pub fn write_registry<W: io::Write>(writer: W, registry: &MemberRegistry) -> csv::Result<usize> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(writer);

    for member in registry.iter() {
        wtr.write_record(encode_member(member))?;
    }
    wtr.flush()?;

    Ok(registry.len())
}

/// Human-facing table export: header row plus fully quoted rows.
/// This is a report and cannot be loaded back.
pub fn write_table<W: io::Write>(
    writer: W,
    registry: &MemberRegistry,
    fees: &FeeSchedule,
) -> csv::Result<usize> {
    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(writer);

    wtr.write_record(TABLE_COLUMNS)?;
    for member in registry.iter() {
        wtr.write_record(table_row(member, fees))?;
    }
    wtr.flush()?;

    Ok(registry.len())
}

/// Display cells shared by the table export and the terminal form
pub fn table_row(member: &Member, fees: &FeeSchedule) -> [String; 7] {
    let details = match member.kind().trainer_fee() {
        Some(fee) => format!("PT Fee: ${:.2}", fee),
        None => "-".to_string(),
    };

    [
        member.id().to_string(),
        member.name().to_string(),
        member.kind().tag().to_string(),
        member.join_date().to_string(),
        member.status().to_string(),
        format!("{:.2}", fees.monthly_fee(member)),
        details,
    ]
}

// ============================================================================
// DECODE
// ============================================================================

/// Outcome of decoding a whole file
#[derive(Debug, Default)]
pub struct DecodeReport {
    pub registry: MemberRegistry,
    /// One `GymError::MalformedRow` per skipped row
    pub issues: Vec<GymError>,
}

impl DecodeReport {
    pub fn loaded(&self) -> usize {
        self.registry.len()
    }

    pub fn skipped(&self) -> usize {
        self.issues.len()
    }
}

fn malformed(line: u64, reason: impl Into<String>) -> GymError {
    GymError::MalformedRow {
        line,
        reason: reason.into(),
    }
}

pub fn decode_history(field: &str, line: u64) -> Result<Vec<PerformanceRecord>> {
    let mut history = Vec::new();

    for entry in field.split(HISTORY_SEPARATOR) {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }

        let parts: Vec<&str> = entry.split(RECORD_SEPARATOR).map(str::trim).collect();
        if parts.len() != 3 {
            return Err(malformed(
                line,
                format!("performance record '{}' needs month;year;achieved", entry),
            ));
        }

        let month: u32 = parts[0]
            .parse()
            .map_err(|_| malformed(line, format!("invalid month '{}'", parts[0])))?;
        let year: i32 = parts[1]
            .parse()
            .map_err(|_| malformed(line, format!("invalid year '{}'", parts[1])))?;
        let achieved = parse_flag(parts[2])
            .ok_or_else(|| malformed(line, format!("invalid goal flag '{}'", parts[2])))?;

        let record =
            PerformanceRecord::new(month, year, achieved).map_err(|e| malformed(line, e.to_string()))?;
        history.push(record);
    }

    Ok(history)
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Decode one row. `line` is only used for error messages.
pub fn decode_row(fields: &[&str], line: u64) -> Result<Member> {
    if fields.len() < 4 {
        return Err(malformed(
            line,
            format!("expected at least 4 fields, found {}", fields.len()),
        ));
    }

    let kind = fields[2]
        .parse::<KindTag>()
        .map_err(|e| malformed(line, e.to_string()))?;

    let (status, fee, history) = match (kind, fields.len()) {
        (KindTag::Regular, 4) => (None, None, None),
        (KindTag::Regular, 5) => (Some(fields[4]), None, None),
        (KindTag::Regular, 6) => (Some(fields[4]), None, Some(fields[5])),
        // Legacy Premium rows carry the fee where newer rows carry the status
        (KindTag::Premium, 5) => (None, Some(fields[4]), None),
        (KindTag::Premium, 6) => (Some(fields[4]), Some(fields[5]), None),
        (KindTag::Premium, 7) => (Some(fields[4]), Some(fields[5]), Some(fields[6])),
        (KindTag::Regular, n) => {
            return Err(malformed(line, format!("Regular row needs 4-6 fields, found {}", n)))
        }
        (KindTag::Premium, n) => {
            return Err(malformed(line, format!("Premium row needs 5-7 fields, found {}", n)))
        }
    };

    let join_date = fields[3]
        .parse::<NaiveDate>()
        .map_err(|_| malformed(line, format!("invalid join date '{}'", fields[3])))?;

    let member_kind = match fee {
        Some(raw) => {
            let trainer_fee: f64 = raw
                .parse()
                .map_err(|_| malformed(line, format!("invalid trainer fee '{}'", raw)))?;
            MemberKind::Premium { trainer_fee }
        }
        None => MemberKind::Regular,
    };

    let mut member = Member::new(fields[0], fields[1], join_date, member_kind)
        .map_err(|e| malformed(line, e.to_string()))?;

    if let Some(raw) = status {
        member.set_status(
            raw.parse::<MembershipStatus>()
                .map_err(|e| malformed(line, e.to_string()))?,
        );
    }

    if let Some(raw) = history {
        for record in decode_history(raw, line)? {
            member.add_performance(record);
        }
    }

    Ok(member)
}

/// Decode every row from a reader. Malformed rows (and duplicate IDs) are
/// collected in the report and skipped. Only I/O failures abort.
pub fn read_registry<R: io::Read>(reader: R) -> io::Result<DecodeReport> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut report = DecodeReport::default();

    for result in rdr.records() {
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                if matches!(err.kind(), csv::ErrorKind::Io(_)) {
                    return Err(io::Error::from(err));
                }
                let line = err.position().map(|p| p.line()).unwrap_or(0);
                report.issues.push(malformed(line, err.to_string()));
                continue;
            }
        };

        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let fields: Vec<&str> = record.iter().collect();
        if fields.iter().all(|f| f.is_empty()) {
            continue;
        }

        let outcome = decode_row(&fields, line).and_then(|member| {
            report
                .registry
                .add(member)
                .map_err(|e| malformed(line, e.to_string()))
        });

        if let Err(issue) = outcome {
            report.issues.push(issue);
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn encode(registry: &MemberRegistry) -> String {
        let mut buf = Vec::new();
        write_registry(&mut buf, registry).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn decode(text: &str) -> DecodeReport {
        read_registry(text.as_bytes()).unwrap()
    }

    #[test]
    fn test_encode_layout() {
        let mut premium = Member::premium("P001", "Ben Ito", date(2023, 6, 1), 20.0).unwrap();
        premium.add_performance(PerformanceRecord::new(4, 2024, false).unwrap());
        premium.add_performance(PerformanceRecord::new(5, 2024, true).unwrap());
        let regular = Member::regular("M001", "Ana Lopez", date(2024, 1, 15)).unwrap();

        assert_eq!(
            encode_member(&premium),
            vec!["P001", "Ben Ito", "Premium", "2023-06-01", "ACTIVE", "20", "4;2024;false|5;2024;true"]
        );
        assert_eq!(
            encode_member(&regular),
            vec!["M001", "Ana Lopez", "Regular", "2024-01-15", "ACTIVE"]
        );
    }

    #[test]
    fn test_round_trip_preserves_everything() {
        let mut registry = MemberRegistry::new();

        let mut premium = Member::premium("P001", "Ben Ito", date(2023, 6, 1), 22.5)
            .unwrap()
            .with_status(MembershipStatus::Frozen);
        premium.add_performance(PerformanceRecord::new(5, 2024, true).unwrap());
        premium.add_performance(PerformanceRecord::new(5, 2024, true).unwrap());
        registry.add(premium).unwrap();

        let mut regular = Member::regular("M001", "Ana Lopez", date(2024, 1, 15)).unwrap();
        regular.add_performance(PerformanceRecord::new(12, 2023, false).unwrap());
        registry.add(regular).unwrap();

        registry
            .add(Member::premium("P002", "No History", date(2020, 2, 29), 0.0).unwrap())
            .unwrap();

        let report = decode(&encode(&registry));

        assert!(report.issues.is_empty(), "issues: {:?}", report.issues);
        assert_eq!(report.registry.list(), registry.list());
    }

    #[test]
    fn test_names_with_commas_round_trip() {
        let mut registry = MemberRegistry::new();
        registry
            .add(Member::regular("M010", "Smith, John \"Jack\"", date(2024, 3, 3)).unwrap())
            .unwrap();

        let text = encode(&registry);
        assert!(text.contains("\"Smith, John \"\"Jack\"\"\""));

        let report = decode(&text);
        assert_eq!(report.registry.list(), registry.list());
    }

    #[test]
    fn test_decode_legacy_rows() {
        let report = decode("M001,Ana Lopez,Regular,2024-01-15\nP001,Ben Ito,Premium,2023-06-01,35.0\n");

        assert!(report.issues.is_empty());
        let ana = report.registry.find_by_id("M001").unwrap();
        assert_eq!(ana.status(), MembershipStatus::Active);
        assert!(ana.history().is_empty());

        let ben = report.registry.find_by_id("p001").unwrap();
        assert_eq!(ben.status(), MembershipStatus::Active);
        assert_eq!(ben.kind().trainer_fee(), Some(35.0));
    }

    #[test]
    fn test_decode_status_without_history() {
        let report = decode(
            "M001, Ana Lopez , regular ,2024-01-15, frozen\nP001,Ben Ito,PREMIUM,2023-06-01,FROZEN,35.0\n",
        );

        assert!(report.issues.is_empty());
        assert_eq!(report.registry.find_by_id("M001").unwrap().name(), "Ana Lopez");
        assert_eq!(report.registry.find_by_id("M001").unwrap().status(), MembershipStatus::Frozen);
        let ben = report.registry.find_by_id("P001").unwrap();
        assert_eq!(ben.status(), MembershipStatus::Frozen);
        assert_eq!(ben.kind().trainer_fee(), Some(35.0));
    }

    #[test]
    fn test_malformed_row_is_skipped_and_reported() {
        let report = decode("M001,Ana Lopez,Regular,2024-01-15,ACTIVE\nM002,Broken\n");

        assert_eq!(report.loaded(), 1);
        assert!(report.registry.find_by_id("M001").is_some());
        assert_eq!(report.skipped(), 1);
        assert!(matches!(report.issues[0], GymError::MalformedRow { line: 2, .. }));
    }

    #[test]
    fn test_invalid_utf8_row_is_skipped() {
        let mut bytes = b"M001,Ana Lopez,Regular,2024-01-15,ACTIVE\n".to_vec();
        bytes.extend_from_slice(b"M002,Bad \xff\xfe Name,Regular,2024-01-15,ACTIVE\n");
        bytes.extend_from_slice(b"M003,Cara Diaz,Regular,2024-02-01,FROZEN\n");

        let report = read_registry(&bytes[..]).unwrap();

        assert_eq!(report.loaded(), 2);
        assert_eq!(report.skipped(), 1);
        assert!(matches!(report.issues[0], GymError::MalformedRow { line: 2, .. }));
        assert!(report.registry.find_by_id("M003").is_some());
    }

    #[test]
    fn test_bad_values_are_malformed() {
        let text = "\
A1,Bad Kind,Gold,2024-01-01
A2,Bad Date,Regular,01/02/2024
A3,Bad Status,Regular,2024-01-01,PAUSED
A4,Bad Fee,Premium,2024-01-01,ACTIVE,lots
A5,Bad Month,Regular,2024-01-01,ACTIVE,13;2024;true
A6,Bad Flag,Regular,2024-01-01,ACTIVE,1;2024;yes
A7,Too Many,Regular,2024-01-01,ACTIVE,1;2024;true,extra
,No Id,Regular,2024-01-01
A8,Fine,Regular,2024-01-01
a8,Duplicate,Regular,2024-01-01
";
        let report = decode(text);

        assert_eq!(report.loaded(), 1);
        assert_eq!(report.skipped(), 9);
        assert!(report.registry.find_by_id("A8").is_some());
    }

    #[test]
    fn test_blank_lines_and_empty_history_segments() {
        let report = decode("\nM001,Ana,Regular,2024-01-15,ACTIVE,1;2024;true||2;2024;FALSE\n\n");

        assert!(report.issues.is_empty());
        let ana = report.registry.find_by_id("M001").unwrap();
        assert_eq!(ana.history().len(), 2);
        assert!(!ana.history()[1].goal_achieved());
    }

    #[test]
    fn test_table_export_has_header_and_quotes() {
        let mut registry = MemberRegistry::new();
        registry
            .add(Member::premium("P001", "Ben Ito", date(2023, 6, 1), 20.0).unwrap())
            .unwrap();
        registry
            .add(Member::regular("M001", "Ana", date(2024, 1, 15)).unwrap())
            .unwrap();

        let mut buf = Vec::new();
        write_table(&mut buf, &registry, &FeeSchedule::default()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "\"ID\",\"Name\",\"Type\",\"Join Date\",\"Status\",\"Monthly Fee ($)\",\"Details\""
        );
        assert_eq!(
            lines[1],
            "\"P001\",\"Ben Ito\",\"Premium\",\"2023-06-01\",\"ACTIVE\",\"100.00\",\"PT Fee: $20.00\""
        );
        assert_eq!(
            lines[2],
            "\"M001\",\"Ana\",\"Regular\",\"2024-01-15\",\"ACTIVE\",\"50.00\",\"-\""
        );
    }
}
