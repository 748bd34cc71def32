// Auth service - Single configured credential pair, no sessions
use crate::domain::view::View;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
}

#[derive(Clone)]
pub struct AuthService {
    email: String,
    password: String,
}

impl AuthService {
    pub fn new(email: String, password: String) -> Self {
        Self { email, password }
    }

    /// Check the pair and return the view to continue to.
    pub fn login(&self, email: &str, password: &str) -> Result<View, AuthError> {
        if email == self.email && password == self.password {
            tracing::info!("Login accepted for {}", self.email);
            Ok(View::Dashboard)
        } else {
            tracing::warn!("Login rejected for '{}'", email);
            Err(AuthError::InvalidCredentials)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        AuthService::new("admin@gmail.com".to_string(), "admin123".to_string())
    }

    #[test]
    fn test_login() {
        assert_eq!(service().login("admin@gmail.com", "admin123"), Ok(View::Dashboard));
        assert_eq!(
            service().login("admin@gmail.com", "admin"),
            Err(AuthError::InvalidCredentials)
        );
        assert_eq!(
            service().login("", ""),
            Err(AuthError::InvalidCredentials)
        );
    }

    #[test]
    fn test_email_must_match_exactly() {
        assert_eq!(
            service().login("  ADMIN@GMAIL.COM  ", "admin123"),
            Err(AuthError::InvalidCredentials)
        );
        assert_eq!(
            service().login(" admin@gmail.com", "admin123"),
            Err(AuthError::InvalidCredentials)
        );
    }
}
