/// Parse a duration such as `25m`, `30s` or `1m30s` into seconds.
/// A bare number is taken as minutes.
pub fn parse_duration(input: &str) -> Result<u64, String> {
    let input = input.trim().to_lowercase();

    if let Ok(minutes) = input.parse::<u64>() {
        if minutes == 0 {
            return Err("Duration must be greater than 0".to_string());
        }
        return minutes
            .checked_mul(60)
            .ok_or_else(|| "Duration is too long".to_string());
    }

    let mut total_seconds = 0u64;
    let mut current_number = String::new();

    for ch in input.chars() {
        if ch.is_ascii_digit() {
            current_number.push(ch);
        } else if ch == 'm' || ch == 's' {
            if current_number.is_empty() {
                return Err(
                    "Invalid duration format. Use formats like: 25m, 30s, 1m30s".to_string(),
                );
            }

            let number: u64 = current_number
                .parse()
                .map_err(|_| "Invalid number in duration".to_string())?;

            let seconds = if ch == 'm' {
                number.checked_mul(60)
            } else {
                Some(number)
            };
            total_seconds = seconds
                .and_then(|s| total_seconds.checked_add(s))
                .ok_or_else(|| "Duration is too long".to_string())?;

            current_number.clear();
        } else if !ch.is_whitespace() {
            return Err(
                "Invalid character in duration. Use formats like: 25m, 30s, 1m30s".to_string(),
            );
        }
    }

    if !current_number.is_empty() {
        return Err("Duration must end with 'm' (minutes) or 's' (seconds)".to_string());
    }

    if total_seconds == 0 {
        return Err("Duration must be greater than 0".to_string());
    }

    Ok(total_seconds)
}

/// Human-friendly form, e.g. "1 minute 30 seconds"
pub fn describe_duration(seconds: u64) -> String {
    let minutes = seconds / 60;
    let remaining_seconds = seconds % 60;
    let plural = |n: u64| if n == 1 { "" } else { "s" };

    match (minutes, remaining_seconds) {
        (0, s) => format!("{} second{}", s, plural(s)),
        (m, 0) => format!("{} minute{}", m, plural(m)),
        (m, s) => format!("{} minute{} {} second{}", m, plural(m), s, plural(s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_minutes() {
        assert_eq!(parse_duration("25"), Ok(1500));
        assert_eq!(parse_duration(" 1 "), Ok(60));
    }

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_duration("30s"), Ok(30));
        assert_eq!(parse_duration("25m"), Ok(1500));
        assert_eq!(parse_duration("1m30s"), Ok(90));
        assert_eq!(parse_duration("1M 5S"), Ok(65));
    }

    #[test]
    fn test_parse_rejects_zero() {
        assert!(parse_duration("0").is_err());
        assert!(parse_duration("0m0s").is_err());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(parse_duration("m").is_err());
        assert!(parse_duration("10h").is_err());
        assert!(parse_duration("5m3").is_err());
        assert!(parse_duration("-5").is_err());
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn test_describe_duration() {
        assert_eq!(describe_duration(1), "1 second");
        assert_eq!(describe_duration(45), "45 seconds");
        assert_eq!(describe_duration(60), "1 minute");
        assert_eq!(describe_duration(1500), "25 minutes");
        assert_eq!(describe_duration(61), "1 minute 1 second");
        assert_eq!(describe_duration(150), "2 minutes 30 seconds");
    }
}
