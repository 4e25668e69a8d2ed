//! Stage progression tests: done/queue/unmark transitions and the final
//! approval gate.

mod common;

use udaan::models::outcome::Outcome;
use udaan::models::student::{self, Stage, StageAction, StageStatus};
use udaan::store::Worksheet;
use common::*;

async fn advance(sheet: &Worksheet, id: &str, stage: Stage, action: StageAction, actor: &str) -> Outcome {
    student::advance_stage(sheet, id, stage, action, actor, at("2026-08-01 10:00:00"))
        .await
        .expect("Store failed")
}

#[tokio::test]
async fn test_arrival_scenario_gates_final_approval() {
    let env = setup().await;
    let sheet = &env.app.students;
    add_student(&env, "A100", "Jane Doe").await;

    let outcome = advance(sheet, "A100", Stage::Hostel, StageAction::MarkDone, "Raj").await;
    assert!(outcome.is_success());

    let before = sheet.row_values(2).await.unwrap();
    let outcome = advance(sheet, "A100", Stage::Doaa, StageAction::MarkDone, "Raj").await;
    match outcome {
        Outcome::Invalid(reason) => assert!(reason.contains("All previous stages must be 'Done'")),
        other => panic!("expected Invalid, got {other:?}"),
    }
    assert_eq!(sheet.row_values(2).await.unwrap(), before, "refused transition must not write");

    for stage in [Stage::Entry, Stage::Insurance, Stage::LhcDocs] {
        assert!(advance(sheet, "A100", stage, StageAction::MarkDone, "Raj").await.is_success());
    }
    assert!(advance(sheet, "A100", Stage::Doaa, StageAction::MarkDone, "Priya").await.is_success());

    let s = student::find(sheet, "A100").await.unwrap().unwrap();
    assert!(s.is_complete());
    assert_eq!(s.stage(Stage::Hostel).updated_by, "Raj");
    assert_eq!(s.stage(Stage::Doaa).updated_by, "Priya");
    assert_eq!(s.stage(Stage::Doaa).updated_at, "2026-08-01 10:00:00");
}

#[tokio::test]
async fn test_gate_reports_open_stages() {
    let env = setup().await;
    add_student(&env, "A100", "Jane Doe").await;
    advance(&env.app.students, "A100", Stage::Entry, StageAction::MarkDone, "Raj").await;
    advance(&env.app.students, "A100", Stage::LhcDocs, StageAction::MarkQueue, "Raj").await;

    let outcome = advance(&env.app.students, "A100", Stage::Doaa, StageAction::MarkDone, "Raj").await;
    let Outcome::Invalid(reason) = outcome else { panic!("expected Invalid") };
    assert!(reason.contains("Hostel/Mess"));
    assert!(reason.contains("LHC Docs"));
    assert!(!reason.contains("Entry"));
}

#[tokio::test]
async fn test_status_triple_round_trips() {
    let env = setup().await;
    add_student(&env, "A100", "Jane Doe").await;
    let when = at("2026-08-01 09:15:42");

    student::advance_stage(&env.app.students, "A100", Stage::Insurance, StageAction::MarkDone, "Meera", when)
        .await
        .unwrap();

    let s = student::find(&env.app.students, "A100").await.unwrap().unwrap();
    let rec = s.stage(Stage::Insurance);
    assert_eq!(rec.status, StageStatus::Done);
    assert_eq!(rec.updated_by, "Meera");
    assert_eq!(rec.timestamp(), Some(when));
}

#[tokio::test]
async fn test_unmark_always_resets_to_pending() {
    let env = setup().await;
    let sheet = &env.app.students;
    add_student(&env, "A100", "Jane Doe").await;

    // From Done
    advance(sheet, "A100", Stage::Entry, StageAction::MarkDone, "Raj").await;
    assert!(advance(sheet, "A100", Stage::Entry, StageAction::Unmark, "Raj").await.is_success());
    // From In Queue
    advance(sheet, "A100", Stage::LhcDocs, StageAction::MarkQueue, "Raj").await;
    assert!(advance(sheet, "A100", Stage::LhcDocs, StageAction::Unmark, "Raj").await.is_success());
    // From Pending
    assert!(advance(sheet, "A100", Stage::Hostel, StageAction::Unmark, "Raj").await.is_success());

    let s = student::find(sheet, "A100").await.unwrap().unwrap();
    for stage in [Stage::Entry, Stage::LhcDocs, Stage::Hostel] {
        let rec = s.stage(stage);
        assert_eq!(rec.status, StageStatus::Pending);
        assert!(rec.updated_by.is_empty());
        assert!(rec.updated_at.is_empty());
    }
}

#[tokio::test]
async fn test_queue_only_for_lhc_docs() {
    let env = setup().await;
    let sheet = &env.app.students;
    add_student(&env, "A100", "Jane Doe").await;

    let outcome = advance(sheet, "A100", Stage::Hostel, StageAction::MarkQueue, "Raj").await;
    assert!(matches!(outcome, Outcome::Invalid(_)));
    let s = student::find(sheet, "A100").await.unwrap().unwrap();
    assert_eq!(s.status(Stage::Hostel), StageStatus::Pending);

    assert!(advance(sheet, "A100", Stage::LhcDocs, StageAction::MarkQueue, "Raj").await.is_success());
    let s = student::find(sheet, "A100").await.unwrap().unwrap();
    assert_eq!(s.status(Stage::LhcDocs), StageStatus::InQueue);

    // Queue -> Done
    assert!(advance(sheet, "A100", Stage::LhcDocs, StageAction::MarkDone, "Asha").await.is_success());
    let s = student::find(sheet, "A100").await.unwrap().unwrap();
    assert_eq!(s.status(Stage::LhcDocs), StageStatus::Done);
    assert_eq!(s.stage(Stage::LhcDocs).updated_by, "Asha");
}

#[tokio::test]
async fn test_advance_missing_student_is_not_found() {
    let env = setup().await;
    let outcome = advance(&env.app.students, "Z9", Stage::Entry, StageAction::MarkDone, "Raj").await;
    assert_eq!(outcome, Outcome::NotFound);
}

#[tokio::test]
async fn test_advance_by_full_name() {
    let env = setup().await;
    add_student(&env, "A100", "Jane Doe").await;
    assert!(advance(&env.app.students, "Jane Doe", Stage::Entry, StageAction::MarkDone, "Raj").await.is_success());
    let s = student::find(&env.app.students, "A100").await.unwrap().unwrap();
    assert_eq!(s.status(Stage::Entry), StageStatus::Done);
}
