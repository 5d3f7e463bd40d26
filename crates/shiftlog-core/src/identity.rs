//! The authenticated operator.
//!
//! Entries record the operator's display name as `author` and, on
//! cancellation, as `cancelled_by`. How the operator proves who they are is
//! up to the implementation.

use crate::error::{Result, ShiftlogError};

/// Source of the current operator's identity.
pub trait Identity {
    /// Display name of the signed-in operator, if any.
    fn display_name(&self) -> Option<&str>;

    /// End the session.
    fn sign_out(&mut self) -> Result<()>;

    /// Display name, or `NotSignedIn`.
    fn require_name(&self) -> Result<&str> {
        self.display_name()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or(ShiftlogError::NotSignedIn)
    }
}

/// An identity fixed at construction time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticIdentity {
    name: Option<String>,
}

impl StaticIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl Identity for StaticIdentity {
    fn display_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn sign_out(&mut self) -> Result<()> {
        self.name = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_out_clears_name() {
        let mut identity = StaticIdentity::new("Ivanov");
        assert_eq!(identity.require_name().unwrap(), "Ivanov");

        identity.sign_out().unwrap();
        assert!(matches!(
            identity.require_name(),
            Err(ShiftlogError::NotSignedIn)
        ));
    }

    #[test]
    fn test_blank_name_is_not_signed_in() {
        let identity = StaticIdentity::new("   ");
        assert!(identity.require_name().is_err());
        assert!(StaticIdentity::anonymous().display_name().is_none());
    }
}
