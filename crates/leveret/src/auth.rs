// File: src/auth.rs
// Purpose: Credential checks for routes that require authentication

use std::collections::HashMap;

/// Verifies the credentials supplied with a request
pub trait Authenticator: Send + Sync {
    fn authenticate(&self, user: &str, password: &str, remote_address: Option<&str>) -> bool;

    /// Detail reported when authentication fails
    fn message(&self) -> String {
        String::new()
    }
}

/// Authenticator backed by a fixed user → password table
///
/// ```
/// use leveret::auth::{Authenticator, StaticCredentials};
///
/// let auth = StaticCredentials::new().with_user("admin", "secret");
/// assert!(auth.authenticate("admin", "secret", None));
/// assert!(!auth.authenticate("admin", "guess", None));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    users: HashMap<String, String>,
    allowed_addresses: Vec<String>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.users.insert(user.into(), password.into());
        self
    }

    /// Restricts logins to the given client addresses
    pub fn allow_address(mut self, address: impl Into<String>) -> Self {
        self.allowed_addresses.push(address.into());
        self
    }
}

impl Authenticator for StaticCredentials {
    fn authenticate(&self, user: &str, password: &str, remote_address: Option<&str>) -> bool {
        let address_ok = self.allowed_addresses.is_empty()
            || remote_address
                .map(|addr| self.allowed_addresses.iter().any(|a| a == addr))
                .unwrap_or(false);

        address_ok && self.users.get(user).map(|p| p == password).unwrap_or(false)
    }

    fn message(&self) -> String {
        "Invalid user or password".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_user() {
        let auth = StaticCredentials::new().with_user("admin", "secret");
        assert!(!auth.authenticate("root", "secret", None));
    }

    #[test]
    fn test_address_restriction() {
        let auth = StaticCredentials::new()
            .with_user("admin", "secret")
            .allow_address("127.0.0.1");

        assert!(auth.authenticate("admin", "secret", Some("127.0.0.1")));
        assert!(!auth.authenticate("admin", "secret", Some("10.1.1.1")));
        assert!(!auth.authenticate("admin", "secret", None));
    }
}
