use taskboard_core::SyncError;
use taskboard_document_store::StoreError;
use taskboard_identity::IdentityError;

use crate::utils::exit_code::ExitCode;

pub enum Error {
    ExitWithError(ExitCode, eyre::Report),
    Exit(ExitCode),
}

impl Error {
    pub fn code(&self) -> &ExitCode {
        match self {
            Error::ExitWithError(exit_code, _) => exit_code,
            Error::Exit(exit_code) => exit_code,
        }
    }

    /// Pick the exit code matching a synchronizer failure
    pub fn from_sync(error: SyncError) -> Self {
        let code = match &error {
            SyncError::NoSession => ExitCode::PermissionDenied,
            SyncError::EmptyTitle => ExitCode::DataError,
            SyncError::TaskNotFound(_) => ExitCode::NoInput,
            SyncError::Store(StoreError::PermissionDenied(_) | StoreError::Unauthenticated) => {
                ExitCode::PermissionDenied
            }
            SyncError::Store(StoreError::NotFound { .. }) => ExitCode::NoInput,
            SyncError::Store(_) => ExitCode::Error,
            SyncError::Identity(identity_error) => identity_exit_code(identity_error),
        };
        Self::ExitWithError(code, error.into())
    }

    pub fn from_identity(error: IdentityError) -> Self {
        Self::ExitWithError(identity_exit_code(&error), error.into())
    }
}

fn identity_exit_code(error: &IdentityError) -> ExitCode {
    match error {
        IdentityError::InvalidCredentials => ExitCode::PermissionDenied,
        IdentityError::AccountExists(_)
        | IdentityError::InvalidEmail(_)
        | IdentityError::WeakPassword(_) => ExitCode::DataError,
        IdentityError::Persistence(_) => ExitCode::Error,
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl<E> From<E> for Error
where
    E: Into<eyre::Report>,
{
    #[track_caller]
    fn from(error: E) -> Self {
        let r: eyre::Report = error.into();
        Self::ExitWithError(ExitCode::Error, r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_failures_map_to_exit_codes() {
        let cases = [
            (SyncError::NoSession, ExitCode::PermissionDenied),
            (SyncError::EmptyTitle, ExitCode::DataError),
            (SyncError::TaskNotFound("x".to_owned()), ExitCode::NoInput),
            (
                SyncError::Store(StoreError::PermissionDenied("no".to_owned())),
                ExitCode::PermissionDenied,
            ),
            (
                SyncError::Identity(IdentityError::AccountExists("a@b.c".to_owned())),
                ExitCode::DataError,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(*Error::from_sync(error).code(), expected);
        }
    }

    #[test]
    fn other_errors_are_generic() {
        let error: Error = eyre::eyre!("boom").into();
        assert_eq!(*error.code(), ExitCode::Error);
    }
}
