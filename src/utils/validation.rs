//! Client-side form validation.
//!
//! These checks run before any network call; a request is only issued once
//! the inputs pass. Messages are the Korean strings the service shows in its
//! own forms.

use std::fmt;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingField,
    InvalidEmail,
    PasswordTooShort,
    PasswordMismatch,
    ScoreOutOfRange,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            ValidationError::MissingField => "모든 필수 항목을 입력해주세요.",
            ValidationError::InvalidEmail => "유효한 이메일 주소를 입력해주세요.",
            ValidationError::PasswordTooShort => "비밀번호는 최소 6자 이상이어야 합니다.",
            ValidationError::PasswordMismatch => "비밀번호가 일치하지 않습니다.",
            ValidationError::ScoreOutOfRange => "감정 점수는 1에서 10 사이여야 합니다.",
        };
        write!(f, "{message}")
    }
}

impl std::error::Error for ValidationError {}

/// Accepts `local@domain.tld` shapes: one `@`, no whitespace, and a dotted
/// domain with non-empty segments.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::MissingField);
    }
    if email.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidEmail);
    }
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ValidationError::InvalidEmail);
    }
    let mut segments = domain.split('.');
    let has_dot = domain.contains('.');
    if !has_dot || segments.any(str::is_empty) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::MissingField);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

pub fn validate_password_confirmation(
    password: &str,
    confirmation: &str,
) -> Result<(), ValidationError> {
    if password != confirmation {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

pub fn validate_score(score: u8) -> Result<(), ValidationError> {
    if (1..=10).contains(&score) {
        Ok(())
    } else {
        Err(ValidationError::ScoreOutOfRange)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_emails_without_at_or_domain_segment() {
        assert_eq!(validate_email("plainaddress"), Err(ValidationError::InvalidEmail));
        assert_eq!(validate_email("no-domain@"), Err(ValidationError::InvalidEmail));
        assert_eq!(validate_email("@no-local.com"), Err(ValidationError::InvalidEmail));
        assert_eq!(validate_email("dotless@domain"), Err(ValidationError::InvalidEmail));
        assert_eq!(validate_email("trailing@dot."), Err(ValidationError::InvalidEmail));
        assert_eq!(validate_email("spa ce@mail.com"), Err(ValidationError::InvalidEmail));
        assert_eq!(validate_email(""), Err(ValidationError::MissingField));
    }

    #[test]
    fn accepts_ordinary_addresses() {
        assert_eq!(validate_email("user@example.com"), Ok(()));
        assert_eq!(validate_email("first.last@mail.co.kr"), Ok(()));
    }

    #[test]
    fn rejects_short_passwords_with_fixed_message() {
        let err = validate_password("12345").unwrap_err();
        assert_eq!(err, ValidationError::PasswordTooShort);
        assert_eq!(err.to_string(), "비밀번호는 최소 6자 이상이어야 합니다.");
        assert_eq!(validate_password("123456"), Ok(()));
    }

    #[test]
    fn counts_password_length_in_characters_not_bytes() {
        // Six Hangul syllables are more than six bytes but still a valid length.
        assert_eq!(validate_password("비밀번호여섯"), Ok(()));
    }

    #[test]
    fn password_confirmation_must_match() {
        assert_eq!(
            validate_password_confirmation("secret1", "secret2"),
            Err(ValidationError::PasswordMismatch)
        );
        assert_eq!(validate_password_confirmation("secret1", "secret1"), Ok(()));
    }

    #[test]
    fn score_must_be_between_one_and_ten() {
        assert_eq!(validate_score(0), Err(ValidationError::ScoreOutOfRange));
        assert_eq!(validate_score(11), Err(ValidationError::ScoreOutOfRange));
        assert_eq!(validate_score(1), Ok(()));
        assert_eq!(validate_score(10), Ok(()));
    }
}
