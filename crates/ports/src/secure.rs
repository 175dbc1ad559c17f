//! A string wrapper that never prints its contents.

use std::fmt;

/// A secret value that redacts itself in `Debug` and `Display`.
///
/// Returned by [`crate::ResourceProvider::get_secret`] so a resolved
/// credential can flow through logs and panics without ever appearing in
/// them.
#[derive(Clone)]
pub struct SecureString(String);

impl SecureString {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the underlying value. Callers must not log or persist the
    /// returned `&str`.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecureString(***)")
    }
}

impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_and_display_never_leak_the_value() {
        let s = SecureString::new("super-secret-token");
        assert_eq!(format!("{s:?}"), "SecureString(***)");
        assert_eq!(format!("{s}"), "***");
        assert_eq!(s.expose(), "super-secret-token");
    }
}
