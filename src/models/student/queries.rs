use chrono::NaiveDateTime;

use crate::models::outcome::Outcome;
use crate::models::user::Caller;
use crate::store::{StoreError, Worksheet};

use super::types::{
    format_timestamp, Document, Stage, StageAction, StageStatus, Student, FLAGGED_COL,
    IDENTIFIER_COL, NAME_COL, NO, NOTES_COL, YES,
};

/// Row number of a student, matched exactly against the identifier column and
/// then the name column. Store failures are logged and reported as not found.
pub async fn locate(sheet: &Worksheet, search_term: &str) -> Option<usize> {
    let term = search_term.trim();
    if term.is_empty() {
        return None;
    }
    for column in [IDENTIFIER_COL, NAME_COL] {
        match sheet.find(term, Some(column)).await {
            Ok(Some(cell)) => return Some(cell.row),
            Ok(None) => {}
            Err(e) => {
                log::warn!("Student lookup for '{term}' failed: {e}");
                return None;
            }
        }
    }
    None
}

/// Load one student by identifier or name.
pub async fn find(sheet: &Worksheet, search_term: &str) -> Result<Option<Student>, StoreError> {
    let Some(row) = locate(sheet, search_term).await else {
        return Ok(None);
    };
    let cells = sheet.row_values(row).await?;
    Ok(Some(Student::from_cells(row, &cells)))
}

/// Every student in sheet order. Returns an empty list if the store cannot be read.
pub async fn list_all(sheet: &Worksheet) -> Vec<Student> {
    match sheet.records().await {
        Ok(records) => records
            .iter()
            .map(|(row, record)| Student::from_record(*row, record))
            .collect(),
        Err(e) => {
            log::warn!("Could not load students from '{}': {e}", sheet.title());
            Vec::new()
        }
    }
}

pub async fn create(sheet: &Worksheet, identifier: &str, name: &str) -> Result<Outcome, StoreError> {
    let identifier = identifier.trim();
    let name = name.trim();
    if identifier.is_empty() {
        return Ok(Outcome::invalid("Application ID is required"));
    }
    if locate(sheet, identifier).await.is_some() {
        log::warn!("Refused duplicate student '{identifier}'");
        return Ok(Outcome::Duplicate);
    }
    sheet.append_row(&Student::initial_cells(identifier, name)).await?;
    log::info!("Student '{name}' ({identifier}) added");
    Ok(Outcome::Success)
}

/// Move one stage of a student's checklist.
///
/// Marking the final approval done requires every earlier stage to be `Done`;
/// the check reads the row fresh but is not atomic with the write that follows.
pub async fn advance_stage(
    sheet: &Worksheet,
    identifier: &str,
    stage: Stage,
    action: StageAction,
    actor: &str,
    at: NaiveDateTime,
) -> Result<Outcome, StoreError> {
    if action == StageAction::MarkQueue && !stage.allows_queue() {
        return Ok(Outcome::invalid(format!("{} has no queue", stage.label())));
    }
    let Some(row) = locate(sheet, identifier).await else {
        return Ok(Outcome::NotFound);
    };

    let (status, by, ts) = match action {
        StageAction::Unmark => (StageStatus::Pending, String::new(), String::new()),
        StageAction::MarkDone => (StageStatus::Done, actor.to_string(), format_timestamp(at)),
        StageAction::MarkQueue => (StageStatus::InQueue, actor.to_string(), format_timestamp(at)),
    };

    if action == StageAction::MarkDone && !stage.prerequisites().is_empty() {
        let current = Student::from_cells(row, &sheet.row_values(row).await?);
        let unmet = current.unmet_prerequisites(stage);
        if !unmet.is_empty() {
            let labels: Vec<&str> = unmet.iter().map(|s| s.label()).collect();
            return Ok(Outcome::invalid(format!(
                "All previous stages must be 'Done' first (still open: {})",
                labels.join(", ")
            )));
        }
    }

    sheet
        .update_cells(
            row,
            &[
                (stage.status_col(), status.as_str().to_string()),
                (stage.by_col(), by),
                (stage.ts_col(), ts),
            ],
        )
        .await?;
    log::info!("Student '{identifier}' {} set to {} by '{actor}'", stage.key(), status.as_str());
    Ok(Outcome::Success)
}

pub async fn update_notes(sheet: &Worksheet, identifier: &str, notes: &str) -> Result<Outcome, StoreError> {
    let Some(row) = locate(sheet, identifier).await else {
        return Ok(Outcome::NotFound);
    };
    sheet.update_cell(row, NOTES_COL, notes.trim()).await?;
    Ok(Outcome::Success)
}

pub async fn update_flag(sheet: &Worksheet, identifier: &str, flagged: bool) -> Result<Outcome, StoreError> {
    let Some(row) = locate(sheet, identifier).await else {
        return Ok(Outcome::NotFound);
    };
    sheet.update_cell(row, FLAGGED_COL, if flagged { YES } else { NO }).await?;
    Ok(Outcome::Success)
}

/// Write all six verification marks; documents not listed are cleared.
pub async fn update_verified_documents(
    sheet: &Worksheet,
    identifier: &str,
    verified: &[Document],
) -> Result<Outcome, StoreError> {
    let Some(row) = locate(sheet, identifier).await else {
        return Ok(Outcome::NotFound);
    };
    let cells: Vec<(usize, String)> = Document::ALL
        .iter()
        .map(|doc| {
            let mark = if verified.contains(doc) { YES } else { NO };
            (doc.col(), mark.to_string())
        })
        .collect();
    sheet.update_cells(row, &cells).await?;
    Ok(Outcome::Success)
}

/// Change a student's identifier and name. A rename onto an identifier already
/// held by another row is refused before anything is written.
pub async fn update_identity(
    sheet: &Worksheet,
    original: &str,
    new_identifier: &str,
    new_name: &str,
) -> Result<Outcome, StoreError> {
    let original = original.trim();
    let new_identifier = new_identifier.trim();
    if new_identifier.is_empty() {
        return Ok(Outcome::invalid("Application ID is required"));
    }
    if new_identifier != original
        && sheet.find(new_identifier, Some(IDENTIFIER_COL)).await?.is_some()
    {
        return Ok(Outcome::Duplicate);
    }
    let Some(row) = locate(sheet, original).await else {
        return Ok(Outcome::NotFound);
    };
    sheet
        .update_cells(
            row,
            &[
                (IDENTIFIER_COL, new_identifier.to_string()),
                (NAME_COL, new_name.trim().to_string()),
            ],
        )
        .await?;
    Ok(Outcome::Success)
}

pub async fn delete(sheet: &Worksheet, caller: &Caller, identifier: &str) -> Result<Outcome, StoreError> {
    if !caller.is_admin() {
        return Ok(Outcome::denied("Only administrators can delete student records"));
    }
    let Some(row) = locate(sheet, identifier).await else {
        return Ok(Outcome::NotFound);
    };
    sheet.delete_row(row).await?;
    log::info!("Student '{identifier}' deleted by '{}'", caller.username);
    Ok(Outcome::Success)
}
