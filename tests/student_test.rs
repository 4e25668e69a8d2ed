//! Student record tests: creation, lookup, targeted edits, identity changes
//! and deletion against the in-memory workbook.

mod common;

use udaan::models::outcome::Outcome;
use udaan::models::student::{self, Document, Stage, StageStatus};
use common::*;

#[tokio::test]
async fn test_create_student_starts_pending() {
    let env = setup().await;
    add_student(&env, "A100", "Jane Doe").await;

    let s = student::find(&env.app.students, "A100")
        .await
        .expect("Query failed")
        .expect("Student not found");

    assert_eq!(s.identifier, "A100");
    assert_eq!(s.name, "Jane Doe");
    assert_eq!(s.row, 2);
    for stage in Stage::ALL {
        assert_eq!(s.status(stage), StageStatus::Pending);
        assert!(s.stage(stage).updated_by.is_empty());
        assert!(s.stage(stage).updated_at.is_empty());
    }
    assert!(!s.flagged);
    assert!(s.notes.is_empty());
    assert!(Document::ALL.iter().all(|d| !s.is_verified(*d)));
}

#[tokio::test]
async fn test_create_duplicate_leaves_store_unchanged() {
    let env = setup().await;
    add_student(&env, "A100", "Jane Doe").await;

    let outcome = student::create(&env.app.students, "A100", "Someone Else").await.unwrap();
    assert_eq!(outcome, Outcome::Duplicate);

    let all = student::list_all(&env.app.students).await;
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "Jane Doe");
}

#[tokio::test]
async fn test_create_requires_identifier() {
    let env = setup().await;
    let outcome = student::create(&env.app.students, "   ", "No Id").await.unwrap();
    assert!(matches!(outcome, Outcome::Invalid(_)));
    assert!(student::list_all(&env.app.students).await.is_empty());
}

#[tokio::test]
async fn test_locate_by_identifier_or_full_name() {
    let env = setup().await;
    add_student(&env, "A100", "Jane Doe").await;
    add_student(&env, "A101", "Arjun Mehta").await;

    assert_eq!(student::locate(&env.app.students, "A101").await, Some(3));
    assert_eq!(student::locate(&env.app.students, "Jane Doe").await, Some(2));
    assert_eq!(student::locate(&env.app.students, "Jane").await, None);
    // The header row never matches
    assert_eq!(student::locate(&env.app.students, "student_identifier").await, None);
}

#[tokio::test]
async fn test_locate_is_total_when_store_fails() {
    let env = setup().await;
    add_student(&env, "A100", "Jane Doe").await;

    env.store.set_available(false);
    assert_eq!(student::locate(&env.app.students, "A100").await, None);
    assert!(student::list_all(&env.app.students).await.is_empty());

    env.store.set_available(true);
    assert_eq!(student::locate(&env.app.students, "A100").await, Some(2));
}

#[tokio::test]
async fn test_mutation_propagates_store_failure() {
    let env = setup().await;
    env.store.set_available(false);
    // locate swallows the failure, so create sees "not found" and then the append fails
    let result = student::create(&env.app.students, "A100", "Jane Doe").await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_notes_flag_and_documents() {
    let env = setup().await;
    add_student(&env, "A100", "Jane Doe").await;
    let sheet = &env.app.students;

    assert!(student::update_notes(sheet, "A100", "  Needs wheelchair access ").await.unwrap().is_success());
    assert!(student::update_flag(sheet, "A100", true).await.unwrap().is_success());
    let docs = [Document::TenthMarksheet, Document::FeeReceipt];
    assert!(student::update_verified_documents(sheet, "A100", &docs).await.unwrap().is_success());

    let s = student::find(sheet, "A100").await.unwrap().unwrap();
    assert_eq!(s.notes, "Needs wheelchair access");
    assert!(s.flagged);
    assert!(s.is_verified(Document::TenthMarksheet));
    assert!(s.is_verified(Document::FeeReceipt));
    assert!(!s.is_verified(Document::CasteCertificate));

    // Unlisted documents are cleared on the next save
    student::update_verified_documents(sheet, "A100", &[Document::IatAdmitCard]).await.unwrap();
    student::update_flag(sheet, "A100", false).await.unwrap();
    let s = student::find(sheet, "A100").await.unwrap().unwrap();
    assert!(!s.is_verified(Document::TenthMarksheet));
    assert!(s.is_verified(Document::IatAdmitCard));
    assert!(!s.flagged);
}

#[tokio::test]
async fn test_edits_on_missing_student_are_not_found() {
    let env = setup().await;
    let sheet = &env.app.students;
    assert_eq!(student::update_notes(sheet, "Z9", "x").await.unwrap(), Outcome::NotFound);
    assert_eq!(student::update_flag(sheet, "Z9", true).await.unwrap(), Outcome::NotFound);
    assert_eq!(student::update_verified_documents(sheet, "Z9", &[]).await.unwrap(), Outcome::NotFound);
    assert_eq!(student::update_identity(sheet, "Z9", "Z10", "Nobody").await.unwrap(), Outcome::NotFound);
}

#[tokio::test]
async fn test_rename_onto_existing_identifier_is_refused() {
    let env = setup().await;
    add_student(&env, "A100", "Jane Doe").await;
    add_student(&env, "A200", "Ravi Kumar").await;

    let outcome = student::update_identity(&env.app.students, "A100", "A200", "Jane D.").await.unwrap();
    assert_eq!(outcome, Outcome::Duplicate);

    let a100 = student::find(&env.app.students, "A100").await.unwrap().unwrap();
    let a200 = student::find(&env.app.students, "A200").await.unwrap().unwrap();
    assert_eq!(a100.name, "Jane Doe");
    assert_eq!(a200.name, "Ravi Kumar");
}

#[tokio::test]
async fn test_rename_ignores_name_column_matches() {
    let env = setup().await;
    add_student(&env, "A100", "Jane Doe").await;
    add_student(&env, "A200", "Ravi Kumar").await;

    let outcome = student::update_identity(&env.app.students, "A100", "Ravi Kumar", "Jane Doe").await.unwrap();
    assert!(outcome.is_success());
    let outcome = student::update_identity(&env.app.students, "A200", "Ravi", "Ravi").await.unwrap();
    assert!(outcome.is_success());

    let all = student::list_all(&env.app.students).await;
    assert_eq!(all[0].identifier, "Ravi Kumar");
    assert_eq!(all[0].name, "Jane Doe");
    assert_eq!(all[1].identifier, "Ravi");
}

#[tokio::test]
async fn test_rename_keeps_progress() {
    let env = setup().await;
    add_student(&env, "A100", "Jane Doe").await;
    student::update_notes(&env.app.students, "A100", "late arrival").await.unwrap();

    let outcome = student::update_identity(&env.app.students, "A100", "A150", "Jane Doe").await.unwrap();
    assert!(outcome.is_success());
    assert!(student::find(&env.app.students, "A100").await.unwrap().is_none());
    let s = student::find(&env.app.students, "A150").await.unwrap().unwrap();
    assert_eq!(s.notes, "late arrival");

    // Same identifier, new name only
    let outcome = student::update_identity(&env.app.students, "A150", "A150", "Jane Q. Doe").await.unwrap();
    assert!(outcome.is_success());
}

#[tokio::test]
async fn test_delete_requires_admin_and_shifts_rows() {
    let env = setup_with_volunteer().await;
    add_student(&env, "A100", "Jane Doe").await;
    add_student(&env, "A101", "Arjun Mehta").await;

    let outcome = student::delete(&env.app.students, &volunteer(), "A100").await.unwrap();
    assert!(matches!(outcome, Outcome::Denied(_)));
    assert_eq!(student::list_all(&env.app.students).await.len(), 2);

    let outcome = student::delete(&env.app.students, &admin(), "A100").await.unwrap();
    assert!(outcome.is_success());
    assert_eq!(student::locate(&env.app.students, "A101").await, Some(2));

    let outcome = student::delete(&env.app.students, &admin(), "A100").await.unwrap();
    assert_eq!(outcome, Outcome::NotFound);
}
