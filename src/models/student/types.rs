use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::store::Record;

/// Format of every stage timestamp cell.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const IDENTIFIER_COL: usize = 1;
pub const NAME_COL: usize = 2;
pub const NOTES_COL: usize = 18;
pub const FLAGGED_COL: usize = 19;
const FIRST_STAGE_COL: usize = 3;
const FIRST_DOCUMENT_COL: usize = 20;

pub const YES: &str = "yes";
pub const NO: &str = "no";

/// Checkpoints of the arrival pipeline, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Entry,
    Hostel,
    Insurance,
    LhcDocs,
    Doaa,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Entry,
        Stage::Hostel,
        Stage::Insurance,
        Stage::LhcDocs,
        Stage::Doaa,
    ];

    pub fn index(&self) -> usize {
        match self {
            Stage::Entry => 0,
            Stage::Hostel => 1,
            Stage::Insurance => 2,
            Stage::LhcDocs => 3,
            Stage::Doaa => 4,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Stage::Entry => "entry",
            Stage::Hostel => "hostel",
            Stage::Insurance => "insurance",
            Stage::LhcDocs => "lhc_docs",
            Stage::Doaa => "doaa",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Stage::Entry => "Entry",
            Stage::Hostel => "Hostel/Mess",
            Stage::Insurance => "Insurance",
            Stage::LhcDocs => "LHC Docs",
            Stage::Doaa => "Final DoAA",
        }
    }

    pub fn from_key(key: &str) -> Option<Stage> {
        Stage::ALL.into_iter().find(|s| s.key() == key)
    }

    /// 1-based column of this stage's status cell; `by` and `ts` follow it.
    pub fn status_col(&self) -> usize {
        FIRST_STAGE_COL + self.index() * 3
    }

    pub fn by_col(&self) -> usize {
        self.status_col() + 1
    }

    pub fn ts_col(&self) -> usize {
        self.status_col() + 2
    }

    /// Header prefix, e.g. `stage3_lhc_docs`.
    pub fn header_prefix(&self) -> String {
        format!("stage{}_{}", self.index(), self.key())
    }

    /// Only the LHC document desk keeps a waiting line.
    pub fn allows_queue(&self) -> bool {
        matches!(self, Stage::LhcDocs)
    }

    /// Stages that must be `Done` before this one may be marked done.
    pub fn prerequisites(&self) -> &'static [Stage] {
        match self {
            Stage::Doaa => &BEFORE_FINAL_APPROVAL,
            _ => &[],
        }
    }
}

const BEFORE_FINAL_APPROVAL: [Stage; 4] =
    [Stage::Entry, Stage::Hostel, Stage::Insurance, Stage::LhcDocs];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Pending,
    InQueue,
    Done,
}

impl StageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageStatus::Pending => "Pending",
            StageStatus::InQueue => "In Queue",
            StageStatus::Done => "Done",
        }
    }

    /// Parse a status cell. Blank or unrecognised values read as `Pending`.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "Done" => StageStatus::Done,
            "In Queue" => StageStatus::InQueue,
            _ => StageStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageAction {
    MarkDone,
    MarkQueue,
    Unmark,
}

impl StageAction {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "mark_done" => Some(StageAction::MarkDone),
            "mark_queue" => Some(StageAction::MarkQueue),
            "unmark" => Some(StageAction::Unmark),
            _ => None,
        }
    }
}

/// Decode a status-form action code: `mark_<stage>_done`, `mark_<stage>_queue`
/// or `unmark_<stage>`.
pub fn parse_action_code(code: &str) -> Option<(StageAction, Stage)> {
    if let Some(stage) = code.strip_prefix("unmark_") {
        return Stage::from_key(stage).map(|s| (StageAction::Unmark, s));
    }
    let rest = code.strip_prefix("mark_")?;
    if let Some(stage) = rest.strip_suffix("_done") {
        return Stage::from_key(stage).map(|s| (StageAction::MarkDone, s));
    }
    if let Some(stage) = rest.strip_suffix("_queue") {
        return Stage::from_key(stage).map(|s| (StageAction::MarkQueue, s));
    }
    None
}

/// Documents checked at the LHC desk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Document {
    TenthMarksheet,
    TwelfthMarksheet,
    CasteCertificate,
    IatAdmitCard,
    TransferCertificate,
    FeeReceipt,
}

impl Document {
    pub const ALL: [Document; 6] = [
        Document::TenthMarksheet,
        Document::TwelfthMarksheet,
        Document::CasteCertificate,
        Document::IatAdmitCard,
        Document::TransferCertificate,
        Document::FeeReceipt,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Document::TenthMarksheet => "10th_marksheet",
            Document::TwelfthMarksheet => "12th_marksheet",
            Document::CasteCertificate => "caste_certificate",
            Document::IatAdmitCard => "iat_admit_card",
            Document::TransferCertificate => "transfer_certificate",
            Document::FeeReceipt => "fee_receipt",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Document::TenthMarksheet => "Class 10 marksheet",
            Document::TwelfthMarksheet => "Class 12 marksheet",
            Document::CasteCertificate => "Caste certificate",
            Document::IatAdmitCard => "IAT admit card",
            Document::TransferCertificate => "Transfer certificate",
            Document::FeeReceipt => "Fee receipt",
        }
    }

    pub fn from_key(key: &str) -> Option<Document> {
        Document::ALL.into_iter().find(|d| d.key() == key)
    }

    pub fn header(&self) -> String {
        format!("verified_{}", self.key())
    }

    pub fn col(&self) -> usize {
        FIRST_DOCUMENT_COL + Document::ALL.iter().position(|d| d == self).unwrap_or(0)
    }
}

/// Status, actor and timestamp of one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageRecord {
    pub status: StageStatus,
    pub updated_by: String,
    pub updated_at: String,
}

impl StageRecord {
    pub fn pending() -> Self {
        Self { status: StageStatus::Pending, updated_by: String::new(), updated_at: String::new() }
    }

    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.updated_at)
    }
}

pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).ok()
}

pub fn format_timestamp(at: NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// One applicant row of the Students worksheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub row: usize,
    pub identifier: String,
    pub name: String,
    pub stages: [StageRecord; 5],
    pub notes: String,
    pub flagged: bool,
    pub verified: [bool; 6],
}

fn is_yes(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case(YES)
}

impl Student {
    /// Build from a header-keyed record. Missing keys read as empty cells.
    pub fn from_record(row: usize, record: &Record) -> Self {
        let cell = |key: &str| record.get(key).map(String::as_str).unwrap_or("");
        let stages = Stage::ALL.map(|stage| {
            let prefix = stage.header_prefix();
            StageRecord {
                status: StageStatus::parse(cell(&format!("{prefix}_status"))),
                updated_by: cell(&format!("{prefix}_by")).to_string(),
                updated_at: cell(&format!("{prefix}_ts")).to_string(),
            }
        });
        Student {
            row,
            identifier: cell("student_identifier").to_string(),
            name: cell("student_name").to_string(),
            stages,
            notes: cell("Notes").to_string(),
            flagged: is_yes(cell("flagged")),
            verified: Document::ALL.map(|doc| is_yes(cell(&doc.header()))),
        }
    }

    /// Build from raw row cells in storage order. Short rows are padded.
    pub fn from_cells(row: usize, cells: &[String]) -> Self {
        let cell = |col: usize| cells.get(col - 1).map(String::as_str).unwrap_or("");
        Student {
            row,
            identifier: cell(IDENTIFIER_COL).to_string(),
            name: cell(NAME_COL).to_string(),
            stages: Stage::ALL.map(|stage| StageRecord {
                status: StageStatus::parse(cell(stage.status_col())),
                updated_by: cell(stage.by_col()).to_string(),
                updated_at: cell(stage.ts_col()).to_string(),
            }),
            notes: cell(NOTES_COL).to_string(),
            flagged: is_yes(cell(FLAGGED_COL)),
            verified: Document::ALL.map(|doc| is_yes(cell(doc.col()))),
        }
    }

    /// Storage cells of a freshly registered student.
    pub fn initial_cells(identifier: &str, name: &str) -> Vec<String> {
        let mut cells = vec![identifier.to_string(), name.to_string()];
        for _ in Stage::ALL {
            cells.push(StageStatus::Pending.as_str().to_string());
            cells.push(String::new());
            cells.push(String::new());
        }
        cells.push(String::new());
        cells.push(NO.to_string());
        cells.extend(Document::ALL.iter().map(|_| NO.to_string()));
        cells
    }

    pub fn stage(&self, stage: Stage) -> &StageRecord {
        &self.stages[stage.index()]
    }

    pub fn status(&self, stage: Stage) -> StageStatus {
        self.stage(stage).status
    }

    pub fn is_verified(&self, doc: Document) -> bool {
        self.verified[Document::ALL.iter().position(|d| *d == doc).unwrap_or(0)]
    }

    /// Registration is complete once the final approval is done.
    pub fn is_complete(&self) -> bool {
        self.status(Stage::Doaa) == StageStatus::Done
    }

    /// Latest parseable stage timestamp, if any stage was ever stamped.
    pub fn last_activity(&self) -> Option<NaiveDateTime> {
        self.stages.iter().filter_map(StageRecord::timestamp).max()
    }

    /// Prerequisite stages of `stage` that are not yet `Done`.
    pub fn unmet_prerequisites(&self, stage: Stage) -> Vec<Stage> {
        stage
            .prerequisites()
            .iter()
            .copied()
            .filter(|s| self.status(*s) != StageStatus::Done)
            .collect()
    }
}

/// Search box submission.
#[derive(Debug, Deserialize)]
pub struct SearchForm {
    pub search_term: String,
    pub csrf_token: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub search_term: String,
}

#[derive(Debug, Deserialize)]
pub struct NewStudentForm {
    pub app_id: String,
    pub student_name: String,
    pub csrf_token: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub student_id: String,
    pub action: String,
    pub csrf_token: String,
    /// Page to return to after the update; defaults to the student page.
    #[serde(default)]
    pub return_to: String,
}

#[derive(Debug, Deserialize)]
pub struct NotesForm {
    pub student_id: String,
    #[serde(default)]
    pub notes: String,
    pub csrf_token: String,
}

#[derive(Debug, Deserialize)]
pub struct DetailsForm {
    pub original_student_id: String,
    pub student_identifier: String,
    pub student_name: String,
    pub csrf_token: String,
}

#[derive(Debug, Deserialize)]
pub struct FlagForm {
    pub student_id: String,
    #[serde(default)]
    pub current_flag: String,
    pub csrf_token: String,
}

#[derive(Debug, Deserialize)]
pub struct StudentIdForm {
    pub student_id: String,
    pub csrf_token: String,
}
