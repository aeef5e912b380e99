use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{Column, DRAW_SIZE, DrawRecord, DrawTable, POOL_SIZE, WINNING_COUNT};
use crate::store::{RawRow, RawTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ViolationKind {
    NonNumeric,
    OutOfRange,
    DuplicateValue,
    NotSorted,
}

impl ViolationKind {
    pub const ALL: [ViolationKind; 4] = [
        ViolationKind::NonNumeric,
        ViolationKind::OutOfRange,
        ViolationKind::DuplicateValue,
        ViolationKind::NotSorted,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ViolationKind::NonNumeric => "non-numeric value",
            ViolationKind::OutOfRange => "out-of-range value",
            ViolationKind::DuplicateValue => "duplicate value",
            ViolationKind::NotSorted => "Num1-Num6 not increasing",
        }
    }
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One broken rule on one row. A row may carry several.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ValidationError {
    NonNumeric { column: Column, raw: String },
    OutOfRange { column: Column, value: i64 },
    DuplicateValue { value: i64 },
    /// `column` holds a value smaller than the winning number before it.
    NotSorted { column: Column },
}

impl ValidationError {
    pub fn kind(&self) -> ViolationKind {
        match self {
            ValidationError::NonNumeric { .. } => ViolationKind::NonNumeric,
            ValidationError::OutOfRange { .. } => ViolationKind::OutOfRange,
            ValidationError::DuplicateValue { .. } => ViolationKind::DuplicateValue,
            ValidationError::NotSorted { .. } => ViolationKind::NotSorted,
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::NonNumeric { column, raw } => write!(f, "{column}: '{raw}' is not an integer"),
            ValidationError::OutOfRange { column, value } => {
                write!(f, "{column}: {value} outside 1-{POOL_SIZE}")
            }
            ValidationError::DuplicateValue { value } => write!(f, "{value} appears more than once"),
            ValidationError::NotSorted { column } => write!(f, "{column} breaks ascending order"),
        }
    }
}

/// Integer literal, or a float literal with no fractional part ("12.0").
pub fn parse_field(raw: &str) -> Option<i64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    let f = s.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// Range, duplicate and ordering checks over already-parsed values. `None`
/// entries (fields that did not parse) are skipped.
pub(crate) fn check_values(values: &[Option<i64>; DRAW_SIZE]) -> Vec<ValidationError> {
    let mut violations = Vec::new();

    for (idx, value) in values.iter().enumerate() {
        if let Some(v) = *value {
            if v < 1 || v > i64::from(POOL_SIZE) {
                if let Some(column) = Column::from_index(idx) {
                    violations.push(ValidationError::OutOfRange { column, value: v });
                }
            }
        }
    }

    let mut seen: Vec<i64> = Vec::with_capacity(DRAW_SIZE);
    let mut reported: Vec<i64> = Vec::new();
    for v in values.iter().flatten() {
        if seen.contains(v) {
            if !reported.contains(v) {
                reported.push(*v);
                violations.push(ValidationError::DuplicateValue { value: *v });
            }
        } else {
            seen.push(*v);
        }
    }

    // Equal neighbours are already reported as duplicates.
    for i in 1..WINNING_COUNT {
        if let (Some(prev), Some(cur)) = (values[i - 1], values[i]) {
            if cur < prev {
                if let Some(column) = Column::from_index(i) {
                    violations.push(ValidationError::NotSorted { column });
                }
            }
        }
    }

    violations
}

/// Validates one raw row, returning every rule it breaks on rejection.
pub fn validate_row(row: &RawRow) -> Result<DrawRecord, Vec<ValidationError>> {
    let mut violations = Vec::new();
    let mut values: [Option<i64>; DRAW_SIZE] = [None; DRAW_SIZE];

    for (idx, raw) in row.fields.iter().enumerate() {
        match parse_field(raw) {
            Some(v) => values[idx] = Some(v),
            None => {
                if let Some(column) = Column::from_index(idx) {
                    violations.push(ValidationError::NonNumeric {
                        column,
                        raw: raw.clone(),
                    });
                }
            }
        }
    }

    violations.extend(check_values(&values));

    if !violations.is_empty() {
        return Err(violations);
    }

    let mut numbers = [0u8; DRAW_SIZE];
    for (slot, value) in numbers.iter_mut().zip(values.iter().flatten()) {
        // Range-checked above.
        *slot = *value as u8;
    }
    Ok(DrawRecord::from_checked(numbers))
}

#[derive(Debug, Clone, Serialize)]
pub struct RowRejection {
    /// 1-based data line, header excluded.
    pub line: u64,
    pub fields: Vec<String>,
    pub violations: Vec<ValidationError>,
}

impl RowRejection {
    pub fn kinds(&self) -> Vec<ViolationKind> {
        let mut kinds: Vec<ViolationKind> = self.violations.iter().map(|v| v.kind()).collect();
        kinds.sort();
        kinds.dedup();
        kinds
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub total_rows: usize,
    pub accepted: usize,
    pub rejected: Vec<RowRejection>,
    /// Rejected rows per rule; a row counts once for each rule it breaks.
    pub counts: BTreeMap<ViolationKind, usize>,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

impl ValidationReport {
    pub fn invalid_count(&self) -> usize {
        self.rejected.len()
    }

    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }

    pub fn count(&self, kind: ViolationKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn rejected_of(&self, kind: ViolationKind) -> impl Iterator<Item = &RowRejection> {
        self.rejected
            .iter()
            .filter(move |r| r.violations.iter().any(|v| v.kind() == kind))
    }
}

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%b-%y", "%a, %d %b %Y"];

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Splits rows into a clean table and a report of what was dropped and why.
pub fn clean_rows(raw: &RawTable) -> (DrawTable, ValidationReport) {
    let mut table = DrawTable::with_capacity(raw.rows.len());
    let mut report = ValidationReport {
        total_rows: raw.rows.len(),
        ..Default::default()
    };
    let mut unparsed_dates = 0usize;

    for row in &raw.rows {
        match validate_row(row) {
            Ok(draw) => {
                table.push(draw);
                report.accepted += 1;

                if let Some(raw_date) = row.date.as_deref() {
                    match parse_date(raw_date) {
                        Some(date) => {
                            report.date_range = Some(match report.date_range {
                                Some((lo, hi)) => (lo.min(date), hi.max(date)),
                                None => (date, date),
                            });
                        }
                        None => unparsed_dates += 1,
                    }
                }
            }
            Err(violations) => {
                log::debug!("line {} rejected: {:?}", row.line, violations);
                let rejection = RowRejection {
                    line: row.line,
                    fields: row.fields.to_vec(),
                    violations,
                };
                for kind in rejection.kinds() {
                    *report.counts.entry(kind).or_insert(0) += 1;
                }
                report.rejected.push(rejection);
            }
        }
    }

    if unparsed_dates > 0 {
        log::warn!("{} date(s) in an unrecognised format were ignored", unparsed_dates);
    }
    log::info!(
        "clean rows: {} / {} ({} rejected)",
        report.accepted,
        report.total_rows,
        report.invalid_count()
    );

    (table, report)
}
