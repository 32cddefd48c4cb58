//! Session credentials and the authentication middleware.

pub mod extractor;
pub mod jwt;
pub mod layer;
pub mod revocation;
pub mod types;

pub use extractor::{Auth, CurrentIdentity};
pub use jwt::{
    CredentialError, CredentialIssuer, CredentialValidator, IssuedCredential,
    CREDENTIAL_LIFETIME_DAYS,
};
pub use layer::{AuthLayer, AuthMiddleware};
pub use revocation::RevocationList;
pub use types::{AuthUser, Claims};
