use chrono::NaiveDate;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid date range: end {end} precedes start {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("at least one meeting must be scheduled")]
    NoMeetings,

    #[error("constraint references meeting {index}, but only {n_meetings} meetings exist")]
    MeetingOutOfRange { index: usize, n_meetings: usize },

    #[error("unknown operator: {0}")]
    UnknownOperator(String),

    #[error("invalid constraint: {0}")]
    InvalidConstraint(String),
}
