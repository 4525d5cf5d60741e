/// Input validation helpers shared by the account and subscription flows
///
/// Form-originated values (phones, dates) arrive as free text; everything
/// here turns malformed input into a `Validation` error instead of letting
/// a parse failure escape.
use crate::error::{SubgateError, SubgateResult};
use chrono::{DateTime, NaiveDate, Utc};
use validator::ValidateEmail;

/// Normalize a phone number to its digits-only form.
///
/// Uniqueness is enforced on the normalized form, so "(11) 9999-0000" and
/// "11999990000" refer to the same account.
pub fn normalize_phone(raw: &str) -> SubgateResult<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return Err(SubgateError::Validation(
            "Phone number must contain at least one digit".to_string(),
        ));
    }
    Ok(digits)
}

/// Parse a `YYYY-MM-DD` form field
pub fn parse_form_date(raw: &str) -> SubgateResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| SubgateError::Validation(format!("Invalid date format: {}", raw)))
}

/// First instant of the given calendar date, UTC
pub fn start_of_day(date: NaiveDate) -> SubgateResult<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .ok_or_else(|| SubgateError::Internal("Start-of-day construction failed".to_string()))
}

/// Last counted instant of the given calendar date (23:59:59), UTC
///
/// Expiration dates entered as a bare calendar date cover the whole day.
pub fn end_of_day(date: NaiveDate) -> SubgateResult<DateTime<Utc>> {
    date.and_hms_opt(23, 59, 59)
        .map(|dt| dt.and_utc())
        .ok_or_else(|| SubgateError::Internal("End-of-day construction failed".to_string()))
}

/// Validate an optional email address
pub fn validate_email(email: &str) -> SubgateResult<()> {
    if email.validate_email() {
        Ok(())
    } else {
        Err(SubgateError::Validation(format!(
            "Invalid email address: {}",
            email
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_normalize_phone_strips_formatting() {
        assert_eq!(normalize_phone("(11) 9999-0000").unwrap(), "11999990000");
        assert_eq!(normalize_phone("11999990000").unwrap(), "11999990000");
        assert_eq!(normalize_phone("+55 11 91234-5678").unwrap(), "5511912345678");
    }

    #[test]
    fn test_normalize_phone_rejects_digitless_input() {
        assert!(normalize_phone("").is_err());
        assert!(normalize_phone("abc-def").is_err());
    }

    #[test]
    fn test_parse_form_date() {
        let date = parse_form_date("2024-01-01").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());

        assert!(parse_form_date("01/01/2024").is_err());
        assert!(parse_form_date("not-a-date").is_err());
        assert!(parse_form_date("").is_err());
    }

    #[test]
    fn test_end_of_day() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let eod = end_of_day(date).unwrap();
        assert_eq!(eod.hour(), 23);
        assert_eq!(eod.minute(), 59);
        assert_eq!(eod.second(), 59);
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("customer@example.com").is_ok());
        assert!(validate_email("not-an-email").is_err());
    }
}
