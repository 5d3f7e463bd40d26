//! Mapping of command failures to exit codes and hints.

use shiftlog_core::ShiftlogError;

use crate::constants::exit_codes::{
    AUTH_FAILED, FAILURE, INVALID_INPUT, INVALID_STATE, NOT_FOUND,
};

/// A failure ready to show to the operator.
#[derive(Debug)]
pub struct Failure {
    pub code: i32,
    pub message: String,
    pub hint: Option<&'static str>,
}

pub fn classify(err: &anyhow::Error) -> Failure {
    let Some(core) = err.downcast_ref::<ShiftlogError>() else {
        return Failure {
            code: FAILURE,
            message: err.to_string(),
            hint: None,
        };
    };

    let (code, hint) = match core {
        ShiftlogError::NotSignedIn => (
            FAILURE,
            Some("Run `shiftlog login <name>` or pass --user"),
        ),
        ShiftlogError::IncorrectPassphrase => (
            AUTH_FAILED,
            Some("Check SHIFTLOG_PASSPHRASE or retype the passphrase"),
        ),
        ShiftlogError::JournalNotFound => (NOT_FOUND, Some("Run `shiftlog init`")),
        e if e.is_validation() => (INVALID_INPUT, None),
        e if e.is_not_found() => (NOT_FOUND, None),
        e if e.is_invalid_state() => (INVALID_STATE, None),
        _ => (FAILURE, None),
    };
    Failure {
        code,
        message: core.to_string(),
        hint,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_core_errors_map_to_exit_codes() {
        let cases = [
            (ShiftlogError::Validation("title".into()), INVALID_INPUT),
            (ShiftlogError::InvalidInput("id".into()), INVALID_INPUT),
            (ShiftlogError::EntryNotFound(Uuid::nil()), NOT_FOUND),
            (ShiftlogError::InvalidState("cancelled".into()), INVALID_STATE),
            (ShiftlogError::IncorrectPassphrase, AUTH_FAILED),
            (ShiftlogError::Storage("disk".into()), FAILURE),
        ];
        for (err, code) in cases {
            assert_eq!(classify(&anyhow::Error::from(err)).code, code);
        }
    }

    #[test]
    fn test_not_signed_in_has_hint() {
        let failure = classify(&anyhow::Error::from(ShiftlogError::NotSignedIn));
        assert_eq!(failure.code, FAILURE);
        assert!(failure.hint.is_some_and(|h| h.contains("shiftlog login")));
    }

    #[test]
    fn test_other_errors_are_generic() {
        let failure = classify(&anyhow::anyhow!("boom"));
        assert_eq!(failure.code, FAILURE);
        assert_eq!(failure.message, "boom");
        assert!(failure.hint.is_none());
    }
}
