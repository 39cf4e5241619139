/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Monotonic per-slug document version. An absent record reads as version 1.
pub type Version = i64;

/// The version every slug starts at before its first accepted write.
pub const INITIAL_VERSION: Version = 1;
