use serde_derive::{Deserialize, Serialize};

use crate::{IdentityError, IdentityResult};

/// An authenticated user as seen by the rest of the application.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    pub email: String,
}

/// Trim and lower-case `email`, rejecting anything without a local part and a domain.
pub fn normalize_email(email: &str) -> IdentityResult<String> {
    let email = email.trim().to_lowercase();

    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
        {
            Ok(email)
        }
        _ => Err(IdentityError::InvalidEmail(email)),
    }
}
