//! Field-level validators for catalog mutations

/// Non-empty, trimmed form field. Empty strings behave as absent so that
/// partial updates leave the field untouched.
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Image references must be URLs or absolute paths
pub fn validate_image_reference(image: &str) -> Result<(), String> {
    if image.starts_with("http://") || image.starts_with("https://") || image.starts_with('/') {
        Ok(())
    } else {
        Err("Image must be a URL or an absolute path".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_filters_blank_fields() {
        assert_eq!(non_empty(Some("shin guards")), Some("shin guards"));
        assert_eq!(non_empty(Some("  padded  ")), Some("padded"));
        assert_eq!(non_empty(Some("")), None);
        assert_eq!(non_empty(Some("   ")), None);
        assert_eq!(non_empty(None), None);
    }

    #[test]
    fn test_validate_image_reference() {
        assert!(validate_image_reference("https://example.com/a.png").is_ok());
        assert!(validate_image_reference("/static/img_not_available.png").is_ok());
        assert!(validate_image_reference("not a url").is_err());
    }
}
