use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Rejected custom duration. Never changes session state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a valid number of minutes! ({0:?} is not a number)")]
    NotANumber(String),
    #[error("Please enter a valid number of minutes! ({0} is not positive)")]
    NotPositive(i64),
}

/// Failure to start a completion sound.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("sound asset not found: {}", .0.display())]
    MissingAsset(PathBuf),
    #[error("no audio player available on this system")]
    NoPlayer,
    #[error("failed to spawn audio player: {0}")]
    Spawn(#[from] io::Error),
    #[error("audio player could not play the asset ({0})")]
    Failed(ExitStatus),
}

/// Parse a user-entered minute count.
pub fn parse_minutes(input: &str) -> Result<u32, ValidationError> {
    let trimmed = input.trim();
    let value: i64 = trimmed
        .parse()
        .map_err(|_| ValidationError::NotANumber(trimmed.to_string()))?;

    if value <= 0 {
        return Err(ValidationError::NotPositive(value));
    }

    u32::try_from(value).map_err(|_| ValidationError::NotANumber(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn parses_positive_minutes() {
        assert_eq!(parse_minutes("10"), Ok(10));
        assert_eq!(parse_minutes(" 25 "), Ok(25));
    }

    #[test]
    fn rejects_non_positive_minutes() {
        assert_eq!(parse_minutes("0"), Err(ValidationError::NotPositive(0)));
        assert_eq!(parse_minutes("-5"), Err(ValidationError::NotPositive(-5)));
    }

    #[test]
    fn rejects_garbage() {
        assert_matches!(parse_minutes(""), Err(ValidationError::NotANumber(_)));
        assert_matches!(parse_minutes("ten"), Err(ValidationError::NotANumber(_)));
        assert_matches!(parse_minutes("1.5"), Err(ValidationError::NotANumber(_)));
        assert_matches!(
            parse_minutes("99999999999"),
            Err(ValidationError::NotANumber(_))
        );
    }

    #[test]
    fn validation_message_is_user_facing() {
        let err = parse_minutes("-5").unwrap_err();
        assert!(err
            .to_string()
            .starts_with("Please enter a valid number of minutes!"));
    }
}
