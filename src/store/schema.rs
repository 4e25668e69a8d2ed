//! Worksheet names and the exact header row each one must carry.

use std::fmt;

use super::{StoreError, Worksheet};

pub const STUDENTS_SHEET: &str = "Students";
pub const VOLUNTEERS_SHEET: &str = "Volunteers";
pub const FAQ_SHEET: &str = "FAQ";
pub const ANNOUNCEMENTS_SHEET: &str = "Announcements";

/// Student columns in storage order. Stage blocks are three columns each
/// (status, by, ts) and start at column 3.
pub const STUDENT_HEADERS: [&str; 25] = [
    "student_identifier",
    "student_name",
    "stage0_entry_status",
    "stage0_entry_by",
    "stage0_entry_ts",
    "stage1_hostel_status",
    "stage1_hostel_by",
    "stage1_hostel_ts",
    "stage2_insurance_status",
    "stage2_insurance_by",
    "stage2_insurance_ts",
    "stage3_lhc_docs_status",
    "stage3_lhc_docs_by",
    "stage3_lhc_docs_ts",
    "stage4_doaa_status",
    "stage4_doaa_by",
    "stage4_doaa_ts",
    "Notes",
    "flagged",
    "verified_10th_marksheet",
    "verified_12th_marksheet",
    "verified_caste_certificate",
    "verified_iat_admit_card",
    "verified_transfer_certificate",
    "verified_fee_receipt",
];

pub const VOLUNTEER_HEADERS: [&str; 3] = ["username", "password", "role"];
pub const FAQ_HEADERS: [&str; 2] = ["question", "answer"];
pub const ANNOUNCEMENT_HEADERS: [&str; 1] = ["message"];

/// Every worksheet the application needs, with its header row.
pub const WORKSHEETS: [(&str, &[&str]); 4] = [
    (STUDENTS_SHEET, &STUDENT_HEADERS),
    (VOLUNTEERS_SHEET, &VOLUNTEER_HEADERS),
    (FAQ_SHEET, &FAQ_HEADERS),
    (ANNOUNCEMENTS_SHEET, &ANNOUNCEMENT_HEADERS),
];

/// Header verification failure. Any of these prevents the server from starting.
#[derive(Debug)]
pub enum SchemaError {
    Store(StoreError),
    Mismatch {
        sheet: String,
        missing: Vec<String>,
        unexpected: Vec<String>,
        misordered: bool,
    },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::Store(e) => write!(f, "Header verification failed: {e}"),
            SchemaError::Mismatch { sheet, missing, unexpected, misordered } => {
                write!(f, "Worksheet '{sheet}' headers do not match the expected schema")?;
                if !missing.is_empty() {
                    write!(f, "; missing: {}", missing.join(", "))?;
                }
                if !unexpected.is_empty() {
                    write!(f, "; unexpected or misspelled: {}", unexpected.join(", "))?;
                }
                if *misordered {
                    write!(f, "; columns are out of order")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for SchemaError {}

impl From<StoreError> for SchemaError {
    fn from(e: StoreError) -> Self {
        SchemaError::Store(e)
    }
}

/// Compare an actual header row against the expected one. Trailing empty
/// header cells are ignored; order matters because writes address columns by position.
pub fn compare_headers(sheet: &str, actual: &[String], expected: &[&str]) -> Result<(), SchemaError> {
    let actual: Vec<&str> = {
        let mut cells: Vec<&str> = actual.iter().map(|h| h.trim()).collect();
        while cells.last().is_some_and(|h| h.is_empty()) {
            cells.pop();
        }
        cells
    };

    if actual == expected {
        return Ok(());
    }

    let mut missing: Vec<String> = expected
        .iter()
        .filter(|h| !actual.contains(h))
        .map(|h| h.to_string())
        .collect();
    let mut unexpected: Vec<String> = actual
        .iter()
        .filter(|h| !expected.contains(h))
        .map(|h| h.to_string())
        .collect();
    missing.sort();
    unexpected.sort();
    let misordered = missing.is_empty() && unexpected.is_empty();

    Err(SchemaError::Mismatch {
        sheet: sheet.to_string(),
        missing,
        unexpected,
        misordered,
    })
}

pub async fn verify_headers(sheet: &Worksheet, expected: &[&str]) -> Result<(), SchemaError> {
    let actual = sheet.headers().await?;
    compare_headers(sheet.title(), &actual, expected)?;
    log::info!("Headers verified for worksheet '{}'", sheet.title());
    Ok(())
}
