pub mod import;
pub mod queries;
pub mod stats;
pub mod stuck;
pub mod types;

pub use self::import::{bulk_import, parse_roster, ImportSummary};
pub use self::queries::*;
pub use self::stats::{end_of_day_report, flagged, leaderboard, lhc_queue, DashboardStats, LeaderboardEntry};
pub use self::stuck::{detect_stuck, idle_minutes, is_stuck, DEFAULT_STUCK_MINUTES};
pub use self::types::*;
