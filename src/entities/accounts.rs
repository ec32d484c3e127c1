//! Login accounts. `admin_users` and `users` share one shape and one set of rules.

use super::{Action, Hooks};
use crate::error::AppError;
use chrono::NaiveDateTime;
use regex::Regex;

const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";

fn normalize_email(email: &mut String) {
    let normalized = email.trim().to_lowercase();
    *email = normalized;
}

fn check_email(email: &str) -> Result<(), AppError> {
    let re = Regex::new(EMAIL_PATTERN).map_err(|_| AppError::Validation("invalid email pattern".into()))?;
    if re.is_match(email) {
        Ok(())
    } else {
        Err(AppError::Validation("email must be a valid email".into()))
    }
}

entity! {
    AdminUser => "admin_users", key = id, generated {
        id: i64,
        email: String,
        encrypted_password: String,
        reset_password_token: Option<String>,
        reset_password_sent_at: Option<NaiveDateTime>,
        remember_created_at: Option<NaiveDateTime>,
        created_at: NaiveDateTime,
        updated_at: NaiveDateTime,
    }
}

impl Hooks for AdminUser {
    fn prepare(&mut self) {
        normalize_email(&mut self.email);
    }

    fn validate(&self, _action: Action) -> Result<(), AppError> {
        check_email(&self.email)
    }
}

entity! {
    User => "users", key = id, generated {
        id: i64,
        email: String,
        encrypted_password: String,
        reset_password_token: Option<String>,
        reset_password_sent_at: Option<NaiveDateTime>,
        remember_created_at: Option<NaiveDateTime>,
        created_at: NaiveDateTime,
        updated_at: NaiveDateTime,
    }
}

impl Hooks for User {
    fn prepare(&mut self) {
        normalize_email(&mut self.email);
    }

    fn validate(&self, _action: Action) -> Result<(), AppError> {
        check_email(&self.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(email: &str) -> User {
        User {
            id: 1,
            email: email.into(),
            encrypted_password: "x".into(),
            reset_password_token: None,
            reset_password_sent_at: None,
            remember_created_at: None,
            created_at: NaiveDateTime::default(),
            updated_at: NaiveDateTime::default(),
        }
    }

    #[test]
    fn prepare_trims_and_lowercases_email() {
        let mut u = user("  Ops@Example.COM ");
        u.prepare();
        assert_eq!(u.email, "ops@example.com");
        u.validate(Action::Create).unwrap();
    }

    #[test]
    fn validate_rejects_malformed_email() {
        let err = user("not-an-email").validate(Action::Update).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(user("a@b.com").validate(Action::Create).is_ok());
    }
}
