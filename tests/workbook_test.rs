//! Startup checks: provisioning and header verification.

mod common;

use std::sync::Arc;

use udaan::context::{self, AppContext};
use udaan::models::user;
use udaan::store::schema::{
    SchemaError, ANNOUNCEMENTS_SHEET, ANNOUNCEMENT_HEADERS, FAQ_HEADERS, FAQ_SHEET,
    STUDENTS_SHEET, STUDENT_HEADERS, VOLUNTEERS_SHEET, VOLUNTEER_HEADERS,
};
use udaan::store::{MemoryWorkbook, RowStore, StoreError};
use common::*;

async fn workbook_with_students(headers: &[&str]) -> Arc<MemoryWorkbook> {
    let store = Arc::new(MemoryWorkbook::new());
    store.create_worksheet(STUDENTS_SHEET, headers).await.unwrap();
    store.create_worksheet(VOLUNTEERS_SHEET, &VOLUNTEER_HEADERS).await.unwrap();
    store.create_worksheet(FAQ_SHEET, &FAQ_HEADERS).await.unwrap();
    store.create_worksheet(ANNOUNCEMENTS_SHEET, &ANNOUNCEMENT_HEADERS).await.unwrap();
    store
}

#[tokio::test]
async fn test_provision_is_idempotent() {
    let env = setup().await;
    add_student(&env, "A100", "Jane Doe").await;

    context::provision(env.store.clone(), "changed").await.expect("Second provision failed");
    assert_eq!(user::find_all(&env.app.users).await.len(), 1);
    assert!(user::authenticate(&env.app.users, ADMIN_USER, ADMIN_PASS).await.is_some());
    assert!(udaan::models::student::locate(&env.app.students, "A100").await.is_some());
}

#[tokio::test]
async fn test_connect_accepts_exact_headers() {
    let store = workbook_with_students(&STUDENT_HEADERS).await;
    assert!(AppContext::connect(store, &test_config()).await.is_ok());
}

#[tokio::test]
async fn test_connect_fails_on_missing_worksheet() {
    let store = Arc::new(MemoryWorkbook::new());
    store.create_worksheet(STUDENTS_SHEET, &STUDENT_HEADERS).await.unwrap();

    let err = AppContext::connect(store, &test_config()).await.unwrap_err();
    assert!(matches!(err, SchemaError::Store(StoreError::WorksheetNotFound(ref s)) if s == VOLUNTEERS_SHEET));
}

#[tokio::test]
async fn test_connect_reports_misspelled_headers() {
    let mut headers: Vec<&str> = STUDENT_HEADERS.to_vec();
    headers[17] = "notes";
    let store = workbook_with_students(&headers).await;

    let err = AppContext::connect(store, &test_config()).await.unwrap_err();
    match err {
        SchemaError::Mismatch { sheet, missing, unexpected, misordered } => {
            assert_eq!(sheet, STUDENTS_SHEET);
            assert_eq!(missing, vec!["Notes".to_string()]);
            assert_eq!(unexpected, vec!["notes".to_string()]);
            assert!(!misordered);
        }
        other => panic!("expected Mismatch, got {other}"),
    }
}

#[tokio::test]
async fn test_connect_reports_swapped_columns() {
    let mut headers: Vec<&str> = STUDENT_HEADERS.to_vec();
    headers.swap(0, 1);
    let store = workbook_with_students(&headers).await;

    let err = AppContext::connect(store, &test_config()).await.unwrap_err();
    assert!(matches!(err, SchemaError::Mismatch { misordered: true, .. }));
    assert!(err.to_string().contains("out of order"));
}
