use serde::Deserialize;

use crate::models::outcome::Outcome;
use crate::models::user::Caller;
use crate::store::{StoreError, Worksheet};

/// The announcement lives in A2, directly under the `message` header.
const MESSAGE_ROW: usize = 2;
const MESSAGE_COL: usize = 1;

#[derive(Debug, Deserialize)]
pub struct AnnouncementForm {
    #[serde(default)]
    pub message: String,
    pub csrf_token: String,
}

/// Current announcement, or an empty string when unset or unreadable.
pub async fn get(sheet: &Worksheet) -> String {
    match sheet.row_values(MESSAGE_ROW).await {
        Ok(cells) => cells.into_iter().next().unwrap_or_default(),
        Err(e) => {
            log::warn!("Could not read announcement: {e}");
            String::new()
        }
    }
}

/// Replace the announcement. An empty message clears it.
pub async fn set(sheet: &Worksheet, caller: &Caller, message: &str) -> Result<Outcome, StoreError> {
    if !caller.is_admin() {
        return Ok(Outcome::denied("Only administrators can post announcements"));
    }
    sheet.update_cell(MESSAGE_ROW, MESSAGE_COL, message.trim()).await?;
    log::info!("Announcement updated by '{}'", caller.username);
    Ok(Outcome::Success)
}
