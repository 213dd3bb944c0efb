/// Contact field sanitation shared by the source adapters.
///
/// Sources report emails and phones in whatever shape their pages or APIs
/// carry; candidates are cleaned here before deduplication so that the
/// identity key never keys off a fake address.
use phonenumber::country::Id as CountryId;
use phonenumber::Mode;
use regex::Regex;

/// Validate an email address.
///
/// Checks for:
/// - Basic email format (contains @ and .)
/// - Fake/placeholder patterns (repeated digits like 9999, 1111)
/// - Minimum length requirements
/// - Valid domain structure
pub fn is_valid_email(email: &str) -> bool {
    // Basic checks
    if email.len() < 5 || !email.contains('@') || !email.contains('.') {
        return false;
    }

    // Detect fake patterns (repeated digits)
    let fake_patterns = [
        "999999",    // Common fake: 1199999999333@gmail.com
        "111111",    // Common fake: 1111111111@
        "000000",    // Common fake: 000000@
        "123456789", // Sequential fake
    ];

    for pattern in &fake_patterns {
        if email.contains(pattern) {
            tracing::warn!(
                "Invalid email detected (fake pattern '{}'): {}",
                pattern,
                email
            );
            return false;
        }
    }

    // RFC 5322 simplified email regex
    // Matches: local@domain.tld
    let email_regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap();

    if !email_regex.is_match(email) {
        tracing::debug!("Invalid email format: {}", email);
        return false;
    }

    true
}

/// Keep the email only if it survives validation.
pub fn sanitize_email(raw: Option<String>) -> Option<String> {
    raw.filter(|e| is_valid_email(e)).map(|e| e.to_lowercase())
}

/// Normalize a phone number to E.164, defaulting to the US region.
///
/// Uses the phonenumber library (port of Google's libphonenumber). Returns
/// `None` when the input does not parse to a valid number.
pub fn normalize_phone(raw: &str) -> Option<String> {
    if raw.trim().is_empty() || raw.len() < 8 {
        return None;
    }

    match phonenumber::parse(Some(CountryId::US), raw) {
        Ok(number) => {
            if phonenumber::is_valid(&number) {
                let formatted = number.format().mode(Mode::E164).to_string();
                tracing::debug!("Normalized phone: {} -> {}", raw, formatted);
                Some(formatted)
            } else {
                tracing::debug!("Invalid phone number: {}", raw);
                None
            }
        }
        Err(e) => {
            tracing::debug!("Failed to parse phone '{}': {:?}", raw, e);
            None
        }
    }
}

/// Normalize when possible, otherwise keep the raw digits as reported.
/// Source phone fields are advisory; a number the parser rejects is still
/// worth surfacing to the caller.
pub fn sanitize_phone(raw: Option<String>) -> Option<String> {
    let raw = raw?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(normalize_phone(trimmed).unwrap_or_else(|| trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("test.user@example.com"));
        assert!(is_valid_email("user+tag@example.co.uk"));
        assert!(is_valid_email("user_name@example-domain.com"));
        assert!(is_valid_email("a@b.c"));
    }

    #[test]
    fn test_invalid_emails_basic() {
        // Missing @ or .
        assert!(!is_valid_email("userexample.com"));
        assert!(!is_valid_email("user@examplecom"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@"));

        // Too short
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_invalid_emails_fake_patterns() {
        assert!(!is_valid_email("1199999999333@gmail.com"));
        assert!(!is_valid_email("user999999@example.com"));
        assert!(!is_valid_email("1111111111@gmail.com"));
        assert!(!is_valid_email("000000@example.com"));
        assert!(!is_valid_email("test123456789@example.com"));
    }

    #[test]
    fn test_sanitize_email_lowercases() {
        assert_eq!(
            sanitize_email(Some("John.Smith@TechCorp.COM".to_string())),
            Some("john.smith@techcorp.com".to_string())
        );
        assert_eq!(sanitize_email(Some("not-an-email".to_string())), None);
        assert_eq!(sanitize_email(None), None);
    }

    #[test]
    fn test_valid_us_phones() {
        assert_eq!(
            normalize_phone("(415) 555-2671"),
            Some("+14155552671".to_string())
        );
        assert_eq!(
            normalize_phone("415-555-2671"),
            Some("+14155552671".to_string())
        );
        assert_eq!(
            normalize_phone("+14155552671"),
            Some("+14155552671".to_string())
        );
    }

    #[test]
    fn test_invalid_phones() {
        assert_eq!(normalize_phone("1234"), None);
        assert_eq!(normalize_phone(""), None);
        assert_eq!(normalize_phone("   "), None);
    }

    #[test]
    fn test_sanitize_phone_keeps_unparseable_raw() {
        // Advisory field: unparseable numbers survive as reported
        assert_eq!(
            sanitize_phone(Some("ext. 4451 front desk".to_string())),
            Some("ext. 4451 front desk".to_string())
        );
        assert_eq!(sanitize_phone(Some("  ".to_string())), None);
        assert_eq!(
            sanitize_phone(Some("(415) 555-2671".to_string())),
            Some("+14155552671".to_string())
        );
    }
}
