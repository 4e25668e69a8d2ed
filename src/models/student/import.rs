use std::collections::HashSet;

use crate::models::outcome::Outcome;
use crate::models::user::Caller;
use crate::store::{StoreError, Worksheet};

use super::queries::locate;
use super::types::Student;

/// Counts reported back after a bulk upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub added: usize,
    pub duplicates: Vec<String>,
    pub malformed: usize,
}

/// Parse `application_id,student_name` lines (no header row). Lines that do
/// not have exactly two fields, or have an empty ID, count as malformed.
pub fn parse_roster(text: &str) -> (Vec<(String, String)>, usize) {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    let mut malformed = 0;
    for record in reader.records() {
        match record {
            Ok(r) if r.len() == 2 && !r[0].is_empty() => rows.push((r[0].to_string(), r[1].to_string())),
            Ok(r) if r.iter().all(str::is_empty) => {}
            _ => malformed += 1,
        }
    }
    (rows, malformed)
}

/// Append every roster entry whose ID is not registered yet. IDs that already
/// exist, or repeat within the upload, are reported as duplicates.
pub async fn bulk_import(
    sheet: &Worksheet,
    caller: &Caller,
    text: &str,
) -> Result<(Outcome, ImportSummary), StoreError> {
    if !caller.is_admin() {
        return Ok((Outcome::denied("Only administrators can bulk upload students"), ImportSummary::default()));
    }
    let (entries, malformed) = parse_roster(text);
    let mut summary = ImportSummary { malformed, ..Default::default() };

    let mut seen = HashSet::new();
    let mut new_rows = Vec::new();
    for (id, name) in entries {
        if !seen.insert(id.clone()) || locate(sheet, &id).await.is_some() {
            summary.duplicates.push(id);
            continue;
        }
        new_rows.push(Student::initial_cells(&id, &name));
    }

    if new_rows.is_empty() {
        return Ok((Outcome::invalid("No new students found in the upload"), summary));
    }
    summary.added = sheet.append_rows(&new_rows).await?;
    log::info!(
        "Bulk upload by '{}': added={}, duplicates={}, malformed={}",
        caller.username,
        summary.added,
        summary.duplicates.len(),
        summary.malformed
    );
    Ok((Outcome::Success, summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roster_lines_are_trimmed_and_validated() {
        let text = "A1, Asha Rao\nA2,Vikram\nbad line\nA3,too,many\n\n ,Nameless\n";
        let (rows, malformed) = parse_roster(text);
        assert_eq!(
            rows,
            vec![
                ("A1".to_string(), "Asha Rao".to_string()),
                ("A2".to_string(), "Vikram".to_string()),
            ]
        );
        assert_eq!(malformed, 3);
    }

    #[test]
    fn quoted_names_may_contain_commas() {
        let (rows, malformed) = parse_roster("A9,\"Rao, Asha\"\n");
        assert_eq!(rows, vec![("A9".to_string(), "Rao, Asha".to_string())]);
        assert_eq!(malformed, 0);
    }
}
