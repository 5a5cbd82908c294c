//! Gotify Client
//!
//! Provides access to the Gotify message API (list, send, delete, health).
//! Every call resolves to a [`CallResult`]; transport failures are folded
//! into the same shape as HTTP responses.

mod backend;
mod client;
mod error;
mod message;
mod result;

pub use backend::MessageBackend;
pub use client::{GotifyClient, DEFAULT_TIMEOUT_SECS, KEY_HEADER};
pub use error::GotifyError;
pub use message::{AlertifyExtras, GotifyMessage, MessagePayload, PayloadExtras};
pub use result::CallResult;
