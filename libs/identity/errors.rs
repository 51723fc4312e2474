use thiserror::Error;

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("an account already exists for '{0}'")]
    AccountExists(String),
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
    #[error("password must be at least {0} characters long")]
    WeakPassword(usize),
    #[error("couldn't persist identity data: {0}")]
    Persistence(String),
}

impl From<std::io::Error> for IdentityError {
    fn from(value: std::io::Error) -> Self {
        Self::Persistence(value.to_string())
    }
}

impl From<serde_json::Error> for IdentityError {
    fn from(value: serde_json::Error) -> Self {
        Self::Persistence(value.to_string())
    }
}

pub type IdentityResult<T> = Result<T, IdentityError>;
