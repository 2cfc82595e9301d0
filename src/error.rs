use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The row selector matched nothing at all
    #[error("Error: No schedule data found.")]
    NoRowsFound,

    /// Rows were found but none of them gave usable data
    #[error("Error: No valid schedule data extracted.")]
    NoValidDataExtracted,

    #[error("malformed time range: {0:?}")]
    MalformedTime(String),

    #[error("unknown day: {0:?}")]
    UnknownDay(String),

    #[error("non-positive duration ({minutes} min) for {time:?}")]
    NonPositiveDuration { time: String, minutes: f64 },

    #[error("Error: Failed to extract data - {0}")]
    Unexpected(String),

    #[error("invalid CSS selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_level_messages_are_distinct() {
        assert_ne!(
            Error::NoRowsFound.to_string(),
            Error::NoValidDataExtracted.to_string()
        );
    }
}
