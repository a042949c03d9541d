//! Zoho CRM — async client for the Zoho CRM REST API.
//!
//! Handles the OAuth refresh-token exchange behind a shared, expiring token
//! cache, and turns the page-based list and search endpoints into lazy
//! cursors.
//!
//! # Quick Start
//!
//! ```no_run
//! use zoho_crm::prelude::*;
//!
//! # async fn example() -> zoho_crm::error::Result<()> {
//! let client = CrmClient::from_env()?;
//! let mut contacts = client.records().search(
//!     SearchRequest::builder()
//!         .module_name("Contacts")
//!         .email("eric.cartman@example.com")
//!         .build(),
//! )?;
//! while let Some(contact) = contacts.next().await {
//!     println!("{:?}", contact?.id());
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod organization;
pub mod pagination;
pub mod prelude;
pub mod records;
pub mod transport;
pub mod util;

pub use client::CrmClient;
