pub mod session_credentials;

pub use session_credentials::SessionCredentialStore;
