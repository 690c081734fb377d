//! Management API interaction module
//!
//! This module provides the transport for the identity platform's management
//! API: credential exchange and caching, the HTTP client, rate-limit backoff
//! and failure classification.
//!
//! # Module Structure
//!
//! - [`auth`] - OAuth2 client-credentials exchange with a shared token cache
//! - [`client`] - Main client for making API requests under a deadline
//! - [`error`] - Failure taxonomy ([`ApiError`])
//! - [`http`] - Single HTTP exchange and response classification
//!
//! # Example
//!
//! ```ignore
//! use idpsync::mgmt::{ClientSettings, Credentials, Deadline, ManagementClient};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let settings = ClientSettings::for_domain("tenant.example.com")?;
//!     let client = ManagementClient::new(settings, Credentials::StaticToken("...".into()))?;
//!     let conn: serde_json::Value = client
//!         .get("connections/con_123", Deadline::after(std::time::Duration::from_secs(30)))
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod http;

pub use auth::Credentials;
pub use client::{resource_path, ClientSettings, Deadline, ManagementClient};
pub use error::{ApiError, ApiResult, ErrorBody};
