//! Input validation shared by the services and the HTTP layer.
//!
//! Every failure is [`Error::InvalidArgument`]. Lengths are counted in
//! characters, not bytes.

use kbase_core::defaults::{
    ANSWER_IMAGE_MAX_BYTES, ANSWER_MAX_CHARS, DOCX_MIME, NAME_MAX_CHARS, PNG_MIME,
    QUESTION_MAX_CHARS,
};
use kbase_core::{Error, Result};

fn validate_text(label: &str, value: &str, max_chars: usize) -> Result<()> {
    if value.is_empty() {
        return Err(Error::InvalidArgument(format!("{} cannot be empty", label)));
    }
    if value.chars().count() > max_chars {
        return Err(Error::InvalidArgument(format!(
            "{} cannot be longer than {} characters",
            label, max_chars
        )));
    }
    Ok(())
}

pub fn validate_topic_name(name: &str) -> Result<()> {
    validate_text("Topic name", name, NAME_MAX_CHARS)
}

pub fn validate_doc_name(name: &str) -> Result<()> {
    validate_text("Doc name", name, NAME_MAX_CHARS)
}

pub fn validate_question(question: &str) -> Result<()> {
    validate_text("Question", question, QUESTION_MAX_CHARS)
}

pub fn validate_answer(answer: &str) -> Result<()> {
    validate_text("Answer", answer, ANSWER_MAX_CHARS)
}

/// Answer images are non-empty and capped at [`ANSWER_IMAGE_MAX_BYTES`].
pub fn validate_answer_image_size(image: &[u8]) -> Result<()> {
    if image.is_empty() {
        return Err(Error::InvalidArgument(
            "Answer image cannot be empty".to_string(),
        ));
    }
    if image.len() > ANSWER_IMAGE_MAX_BYTES {
        return Err(Error::InvalidArgument(
            "File cannot be larger than 1 MB".to_string(),
        ));
    }
    Ok(())
}

/// Uploaded docs must be declared as DOCX.
pub fn validate_docx_content_type(content_type: Option<&str>) -> Result<()> {
    match content_type {
        Some(DOCX_MIME) => Ok(()),
        _ => Err(Error::InvalidArgument(
            "File has to be a DOCX-file".to_string(),
        )),
    }
}

/// Answer images must be declared as PNG.
pub fn validate_png_content_type(content_type: Option<&str>) -> Result<()> {
    match content_type {
        Some(PNG_MIME) => Ok(()),
        _ => Err(Error::InvalidArgument(
            "File has to be a PNG-file".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kbase_core::ErrorKind;

    #[test]
    fn test_name_limits() {
        assert!(validate_topic_name("Java").is_ok());
        assert!(validate_topic_name(&"x".repeat(50)).is_ok());
        assert_eq!(
            validate_topic_name(&"x".repeat(51)).unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
        assert!(validate_doc_name("").is_err());
    }

    #[test]
    fn test_lengths_count_characters() {
        // 50 two-byte characters are still 50 characters.
        assert!(validate_doc_name(&"ä".repeat(50)).is_ok());
    }

    #[test]
    fn test_question_and_answer_limits() {
        assert!(validate_question(&"q".repeat(200)).is_ok());
        assert!(validate_question(&"q".repeat(201)).is_err());
        assert!(validate_answer(&"a".repeat(1000)).is_ok());
        assert!(validate_answer(&"a".repeat(1001)).is_err());
        assert!(validate_answer("").is_err());
    }

    #[test]
    fn test_image_size_limit() {
        assert!(validate_answer_image_size(&vec![0; 1_000_000]).is_ok());
        let err = validate_answer_image_size(&[]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid argument: Answer image cannot be empty");
        let err = validate_answer_image_size(&vec![0; 1_000_001]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid argument: File cannot be larger than 1 MB");
    }

    #[test]
    fn test_content_types() {
        assert!(validate_docx_content_type(Some(DOCX_MIME)).is_ok());
        assert!(validate_docx_content_type(Some("application/pdf")).is_err());
        assert!(validate_docx_content_type(None).is_err());
        assert!(validate_png_content_type(Some("image/png")).is_ok());
        assert!(validate_png_content_type(Some("image/jpeg")).is_err());
    }
}
