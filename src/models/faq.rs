use serde::Deserialize;

use crate::models::outcome::Outcome;
use crate::models::user::Caller;
use crate::store::{StoreError, Worksheet, HEADER_ROW};

/// A question/answer pair, addressed by its worksheet row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Faq {
    pub row_id: usize,
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct FaqForm {
    pub question: String,
    pub answer: String,
    pub csrf_token: String,
}

/// All FAQ entries in sheet order. Returns an empty list if the store cannot be read.
pub async fn find_all(sheet: &Worksheet) -> Vec<Faq> {
    match sheet.records().await {
        Ok(records) => records
            .into_iter()
            .map(|(row_id, r)| Faq {
                row_id,
                question: r.get("question").cloned().unwrap_or_default(),
                answer: r.get("answer").cloned().unwrap_or_default(),
            })
            .collect(),
        Err(e) => {
            log::warn!("Could not load FAQs: {e}");
            Vec::new()
        }
    }
}

fn check_admin(caller: &Caller) -> Option<Outcome> {
    (!caller.is_admin()).then(|| Outcome::denied("Only administrators can manage FAQs"))
}

fn check_text(question: &str, answer: &str) -> Option<Outcome> {
    (question.trim().is_empty() || answer.trim().is_empty())
        .then(|| Outcome::invalid("Both a question and an answer are required"))
}

/// Resolve a row id to an existing data row.
async fn check_row(sheet: &Worksheet, row_id: usize) -> Result<Option<Outcome>, StoreError> {
    if row_id <= HEADER_ROW {
        return Ok(Some(Outcome::invalid("Not an FAQ row")));
    }
    let cells = sheet.row_values(row_id).await?;
    if cells.iter().all(|c| c.trim().is_empty()) {
        return Ok(Some(Outcome::NotFound));
    }
    Ok(None)
}

pub async fn add(sheet: &Worksheet, caller: &Caller, question: &str, answer: &str) -> Result<Outcome, StoreError> {
    if let Some(outcome) = check_admin(caller).or_else(|| check_text(question, answer)) {
        return Ok(outcome);
    }
    sheet
        .append_row(&[question.trim().to_string(), answer.trim().to_string()])
        .await?;
    Ok(Outcome::Success)
}

pub async fn update(
    sheet: &Worksheet,
    caller: &Caller,
    row_id: usize,
    question: &str,
    answer: &str,
) -> Result<Outcome, StoreError> {
    if let Some(outcome) = check_admin(caller).or_else(|| check_text(question, answer)) {
        return Ok(outcome);
    }
    if let Some(outcome) = check_row(sheet, row_id).await? {
        return Ok(outcome);
    }
    sheet
        .update_cells(row_id, &[(1, question.trim().to_string()), (2, answer.trim().to_string())])
        .await?;
    Ok(Outcome::Success)
}

pub async fn delete(sheet: &Worksheet, caller: &Caller, row_id: usize) -> Result<Outcome, StoreError> {
    if let Some(outcome) = check_admin(caller) {
        return Ok(outcome);
    }
    if let Some(outcome) = check_row(sheet, row_id).await? {
        return Ok(outcome);
    }
    sheet.delete_row(row_id).await?;
    Ok(Outcome::Success)
}
