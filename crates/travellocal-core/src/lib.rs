//! travellocal-core - Core library for Travellocal
//!
//! This crate contains the backend client, the credential-backed session,
//! record normalization, and the list synchronization used by every
//! Travellocal screen.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod programs;
pub mod recommend;
pub mod reviews;
pub mod session;
pub mod sort;
pub mod sync;
pub mod text;

pub use api::{ApiClient, Auth, QueryParams};
pub use config::ClientConfig;
pub use error::{Error, ParseError, Result};
pub use models::{ProgramCard, ProgramDetail, Review, ReviewDraft};
pub use session::{CredentialStore, MemoryCredentialStore, Session};
pub use sync::{Confirm, DeleteOutcome, ListSource, ListState, ListSync, Phase};
