use thiserror::Error;

/// Maximum length of the external business identifier shared by all aggregates
pub const IDENTIFICATION_MAX_LEN: usize = 25;

/// A field failed one of its declared constraints
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Non-empty and at most `max_len` characters. Whitespace counts as content.
pub fn ensure_present(
    field: &'static str,
    label: &str,
    value: &str,
    max_len: usize,
) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new(field, format!("{} is required", label)));
    }
    ensure_max_len(field, label, value, max_len)
}

/// Non-blank after trimming and at most `max_len` characters.
pub fn ensure_text(
    field: &'static str,
    label: &str,
    value: &str,
    max_len: usize,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, format!("{} is required", label)));
    }
    ensure_max_len(field, label, value, max_len)
}

fn ensure_max_len(
    field: &'static str,
    label: &str,
    value: &str,
    max_len: usize,
) -> Result<(), ValidationError> {
    if value.chars().count() > max_len {
        return Err(ValidationError::new(
            field,
            format!("{} must not exceed {} characters", label, max_len),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_present_rejects_empty_only() {
        assert!(ensure_present("identification", "Identification", "", 25).is_err());
        assert!(ensure_present("identification", "Identification", " ", 25).is_ok());
    }

    #[test]
    fn test_ensure_text_rejects_blank() {
        let err = ensure_text("name", "Name", "   ", 50).unwrap_err();
        assert_eq!(err.field, "name");
        assert_eq!(err.message, "Name is required");
    }

    #[test]
    fn test_length_is_counted_in_chars() {
        let accented = "é".repeat(50);
        assert!(ensure_text("name", "Name", &accented, 50).is_ok());

        let err = ensure_text("name", "Name", &"x".repeat(51), 50).unwrap_err();
        assert_eq!(err.message, "Name must not exceed 50 characters");
    }
}
