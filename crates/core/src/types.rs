/// Account primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// Session identifiers are random UUIDs; they identify a session but grant nothing.
pub type SessionId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
