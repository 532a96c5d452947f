// Helper functions for safe logging and comparisons

/// Masks email addresses for safe logging
/// Prevents sensitive data exposure while preserving debugging utility
///
/// # Example
/// ```
/// let masked = safe_email_log("user@example.com");
/// // Returns: "u***@example.com"
/// ```
pub fn safe_email_log(email: &str) -> String {
    if email.len() > 3 {
        let parts: Vec<&str> = email.split('@').collect();
        if parts.len() == 2 {
            // First character, not first byte: the local part may be
            // internationalized UTF-8
            let initial: String = parts[0].chars().take(1).collect();
            format!("{}***@{}", initial, parts[1])
        } else {
            "***@***.***".to_string()
        }
    } else {
        "***@***.***".to_string()
    }
}

/// Masks tokens for safe logging
/// Shows only first and last 4 characters
pub fn safe_token_log(token: &str) -> String {
    if token.len() > 8 {
        format!("{}...{}", &token[..4], &token[token.len() - 4..])
    } else {
        "***".to_string()
    }
}

/// Constant-effort string equality for anti-forgery token checks.
/// Examines every byte regardless of where the first mismatch occurs.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    let a = a.as_bytes();
    let b = b.as_bytes();
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_email_log_masks_local_part() {
        assert_eq!(safe_email_log("user@example.com"), "u***@example.com");
    }

    #[test]
    fn test_safe_email_log_handles_garbage() {
        assert_eq!(safe_email_log("no"), "***@***.***");
        assert_eq!(safe_email_log("not-an-email"), "***@***.***");
    }

    #[test]
    fn test_safe_email_log_handles_multibyte_local_part() {
        assert_eq!(safe_email_log("émile@example.com"), "é***@example.com");
        assert_eq!(safe_email_log("日本@example.jp"), "日***@example.jp");
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq("ABCDEF", "ABCDEF"));
        assert!(!constant_time_eq("ABCDEF", "ABCDEG"));
        assert!(!constant_time_eq("ABCDEF", "ABCDE"));
        assert!(!constant_time_eq("", "A"));
        assert!(constant_time_eq("", ""));
    }

    #[test]
    fn test_safe_token_log() {
        assert_eq!(
            safe_token_log("eyJhbGciOiJIUzI1NiIsInR5cCJ9"),
            "eyJh...cCJ9"
        );
        assert_eq!(safe_token_log("short"), "***");
    }
}
