/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Job identifiers are opaque strings chosen by the submission side.
pub type JobId = String;
