//! Short code and token generation, plus custom code validation.
//!
//! Generated codes and tokens are drawn from `rand`'s thread-local generator,
//! a CSPRNG reseeded from the operating system.

use crate::error::AppError;
use rand::Rng;
use serde_json::json;

/// Alphabet for generated codes and tokens: `[0-9a-zA-Z]`.
const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Length of generated short codes.
pub const CODE_LENGTH: usize = 7;

/// Length of generated app tokens.
pub const TOKEN_LENGTH: usize = 24;

/// Bounds for caller-supplied short codes.
pub const CUSTOM_CODE_MIN: usize = 3;
pub const CUSTOM_CODE_MAX: usize = 10;

fn random_string(len: usize) -> String {
    let mut rng = rand::rng();

    (0..len)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Generates a random 7-character alphanumeric short code.
///
/// Does not check uniqueness; callers insert through the store, which rejects
/// taken codes.
///
/// # Examples
///
/// ```
/// use deeplink_shortener::utils::code_generator::generate_code;
///
/// let code = generate_code();
/// assert_eq!(code.len(), 7);
/// assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn generate_code() -> String {
    random_string(CODE_LENGTH)
}

/// Generates a random 24-character alphanumeric app token.
pub fn generate_token() -> String {
    random_string(TOKEN_LENGTH)
}

/// Validates a caller-supplied short code.
///
/// # Rules
///
/// - Length: 3-10 characters
/// - Allowed characters: ASCII letters and digits
///
/// # Errors
///
/// Returns [`AppError::Validation`] if any rule is violated.
pub fn validate_custom_code(code: &str) -> Result<(), AppError> {
    if code.len() < CUSTOM_CODE_MIN || code.len() > CUSTOM_CODE_MAX {
        return Err(AppError::bad_request(
            "Short code must be 3-10 characters",
            json!({ "provided_length": code.len() }),
        ));
    }

    if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AppError::bad_request(
            "Short code can only contain letters and digits",
            json!({ "short_code": code }),
        ));
    }

    Ok(())
}
