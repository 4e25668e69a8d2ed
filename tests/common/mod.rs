//! Shared test infrastructure.
//!
//! Every test gets its own provisioned in-memory workbook:
//! - `setup()` - all four worksheets with headers plus the primary admin
//! - `admin()` / `volunteer()` - callers for the explicit authorization checks
#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDateTime;

use udaan::config::{AppConfig, StoreBackend};
use udaan::context::{self, AppContext};
use udaan::models::student::{self, parse_timestamp};
use udaan::models::user::{self, Caller, Role};
use udaan::store::MemoryWorkbook;

// ============================================================================
// TEST CONSTANTS
// ============================================================================

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASS: &str = "admin123";
pub const VOLUNTEER_USER: &str = "raj";
pub const VOLUNTEER_PASS: &str = "desk42";

// ============================================================================
// WORKBOOK SETUP
// ============================================================================

pub struct TestEnv {
    pub store: Arc<MemoryWorkbook>,
    pub app: AppContext,
}

pub fn test_config() -> AppConfig {
    AppConfig {
        backend: StoreBackend::Memory,
        stuck_scan_interval_secs: 0,
        ..AppConfig::default()
    }
}

/// Fresh workbook with every worksheet provisioned and the admin seeded.
pub async fn setup() -> TestEnv {
    let store = Arc::new(MemoryWorkbook::new());
    context::provision(store.clone(), ADMIN_PASS)
        .await
        .expect("Failed to provision workbook");
    let app = AppContext::connect(store.clone(), &test_config())
        .await
        .expect("Failed to connect context");
    TestEnv { store, app }
}

/// `setup()` plus a volunteer account.
pub async fn setup_with_volunteer() -> TestEnv {
    let env = setup().await;
    let outcome = user::create(&env.app.users, &admin(), VOLUNTEER_USER, VOLUNTEER_PASS, Role::Volunteer)
        .await
        .expect("Failed to create volunteer");
    assert!(outcome.is_success());
    env
}

/// Add a student and assert it went in.
pub async fn add_student(env: &TestEnv, id: &str, name: &str) {
    let outcome = student::create(&env.app.students, id, name)
        .await
        .expect("Failed to create student");
    assert!(outcome.is_success(), "create {id}: {outcome}");
}

// ============================================================================
// CALLERS & TIME
// ============================================================================

pub fn admin() -> Caller {
    Caller::new(ADMIN_USER, Role::Admin)
}

pub fn volunteer() -> Caller {
    Caller::new(VOLUNTEER_USER, Role::Volunteer)
}

pub fn at(ts: &str) -> NaiveDateTime {
    parse_timestamp(ts).expect("Bad test timestamp")
}
