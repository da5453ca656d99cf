//! mgc-client library interface
//!
//! Typed client for the music genre classifier API, the simulated fallback
//! classifier, the classification flow, rating form handling and the local
//! queue of undelivered ratings. The `mgc` binary is a thin front end over
//! these.

pub mod audio;
pub mod client;
pub mod config;
pub mod error;
pub mod flow;
pub mod outcome;
pub mod pending;
pub mod rating_form;
pub mod simulate;

pub use crate::audio::AudioFile;
pub use crate::client::ApiClient;
pub use crate::config::ClientConfig;
pub use crate::error::ClientError;
pub use crate::flow::{ClassificationFlow, ClassifierBackend};
pub use crate::outcome::Degradable;
pub use crate::pending::PendingRatings;
pub use crate::rating_form::RatingDraft;
