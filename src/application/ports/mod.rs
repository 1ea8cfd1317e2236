pub mod credentials;
pub mod notifier;
pub mod record_api;

pub use credentials::CredentialProvider;
pub use notifier::{Notification, NotificationLevel, Notifier};
pub use record_api::RecordApi;
