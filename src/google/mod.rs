//! Google Cloud clients: OAuth tokens, Cloud Translation v3, Sheets v4.

pub mod auth;
pub mod sheets;
pub mod translate;

pub use auth::{CredentialSource, TokenProvider};
pub use sheets::SheetsClient;
pub use translate::GoogleTranslator;
