//! Graph facades: typed wrappers over the storage adapter, one per
//! co-resident graph plus the cross-linker. Each parses raw records into
//! domain objects and enforces label/relation naming discipline on writes.

mod causal;
mod cross_linker;
mod entity;
mod semantic;
mod temporal;

pub use causal::CausalFacade;
pub use cross_linker::CrossLinkerFacade;
pub use entity::EntityFacade;
pub use semantic::SemanticFacade;
pub use temporal::TemporalFacade;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::AppError;

static IDENTIFIER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Validates a label or relationship-type string against the identifier
/// grammar (`^[A-Za-z_][A-Za-z0-9_]*$`). Every facade write path runs its
/// fixed labels/relation types through this before touching the store.
pub fn validate_identifier(kind: &str, value: &str) -> Result<(), AppError> {
    if IDENTIFIER_RE.is_match(value) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "{} '{}' is not a valid identifier",
            kind, value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_letters_digits_and_underscores() {
        assert!(validate_identifier("label", "E_Entity").is_ok());
        assert!(validate_identifier("label", "_private").is_ok());
        assert!(validate_identifier("relation", "CAUSES_2").is_ok());
    }

    #[test]
    fn rejects_leading_digit() {
        assert!(validate_identifier("label", "2Entity").is_err());
    }

    #[test]
    fn rejects_non_identifier_characters() {
        assert!(validate_identifier("label", "E-Entity").is_err());
        assert!(validate_identifier("label", "E Entity").is_err());
        assert!(validate_identifier("label", "").is_err());
    }
}
