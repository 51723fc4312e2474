use taskboard_document_store::AuthContext;
use taskboard_identity::IdentityProviderBox;

/// Makes the signed-in email the principal of every store request
pub struct ProviderAuthContext(IdentityProviderBox);

impl ProviderAuthContext {
    pub fn new(provider: IdentityProviderBox) -> Self {
        Self(provider)
    }
}

impl AuthContext for ProviderAuthContext {
    fn principal(&self) -> Option<String> {
        self.0.current_identity().map(|identity| identity.email)
    }
}
