/// Numeric primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// Audit timestamps (`created_at`, `updated_at`) are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Appointment and session times are salon-local wall-clock times with no
/// offset attached. Calendar bucketing reads the date straight off this value.
pub type LocalDateTime = chrono::NaiveDateTime;

/// Prices are stored as integer minor units (euro cents).
pub type Cents = i64;
