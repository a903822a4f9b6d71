use validator::ValidationError;

const PUNCTUATION: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Password policy applied before hashing: at least 8 characters with one
/// uppercase, one lowercase, one digit and one punctuation symbol.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.len() < 8 {
        return Err(error(
            "password_too_short",
            "Password must be at least 8 characters long",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(error(
            "password_missing_uppercase",
            "Password must contain an uppercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(error(
            "password_missing_lowercase",
            "Password must contain a lowercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(error(
            "password_missing_digit",
            "Password must contain a digit",
        ));
    }
    if !password.chars().any(|c| PUNCTUATION.contains(c)) {
        return Err(error(
            "password_missing_symbol",
            "Password must contain a punctuation symbol",
        ));
    }
    Ok(())
}

pub fn validate_required_skills(skills: &[String]) -> Result<(), ValidationError> {
    if skills.iter().any(|skill| skill.trim().is_empty()) {
        return Err(error("blank_skill", "Skills cannot be empty strings"));
    }
    if skills.iter().any(|skill| skill.len() > 100) {
        return Err(error(
            "skill_too_long",
            "Skills must be at most 100 characters",
        ));
    }
    Ok(())
}
