//! `forge-client`: async client for the Sutra Forge `/api/forge/*` API.
//!
//! # Architecture
//!
//! ```text
//! GenerationRequest ── { projectId, stage, context, model }
//!     │
//!     ▼
//! ForgeClient       ← reqwest, bearer token from the injected AuthProvider
//!     │                configurable timeout, no retry
//!     ▼
//! ApiResponse<T>    ← { content, qualityAssessment?, costTracking? }
//!     │
//!     ▼
//! SequencedClient   ← drops responses superseded by a newer request
//! ```
//!
//! # Quick start
//!
//! ```rust,ignore
//! use forge_client::{ClientConfig, Endpoint, ForgeClient};
//! use forge_core::auth::GuestAuth;
//! use forge_core::types::Stage;
//! use std::sync::Arc;
//!
//! let client = ForgeClient::new(
//!     ClientConfig::new("http://localhost:7071"),
//!     Arc::new(GuestAuth::new(5)),
//! )?;
//! let req = client.request("prompt-hub", Stage::IdeaRefinement, serde_json::json!({}));
//! let resp = client.generate(Endpoint::AnalyzeIdea, &req).await?;
//! println!("{}", resp.content);
//! ```
//!
//! Non-2xx responses become [`ClientError::Api`] (or
//! [`ClientError::Unauthorized`] for 401) with the message taken from the
//! body's `error` or `message` field.

pub mod client;
pub mod endpoint;
pub mod error;
pub mod export;
pub mod sequenced;
pub mod wire;

pub use client::{ClientConfig, ForgeClient};
pub use endpoint::{Endpoint, Method};
pub use error::ClientError;
pub use export::ExportedDocument;
pub use sequenced::SequencedClient;
pub use wire::{ApiResponse, CostTracking, GenerationRequest};

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, ClientError>;
