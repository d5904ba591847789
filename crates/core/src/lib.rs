//! Core library for the Mixpost adapter
//!
//! This crate is the **Functional Core** of the adapter: everything that decides *what*
//! to send to the Mixpost API and *how* to read what comes back, with zero I/O. The
//! `mixpost` binary is the Imperative Shell that owns HTTP, credentials and the hosts
//! (CLI, workflow runner, MCP server).
//!
//! # Module Organization
//!
//! - [`types`]: Domain models mirroring API responses (posts, media, accounts, pagination)
//! - [`operation`]: Resource/operation selectors parsed into a closed enum
//! - [`fields`]: Per-record field models and request body/query builders
//! - [`pagination`]: Page-walk decisions for "return all" listings
//! - [`errors`]: Message composition for failed API calls
//! - [`options`]: Labels for account and media pickers
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use mixpost_core::fields::{create_post_body, AdditionalFields, CreatePost};
//!
//! let body = create_post_body(&CreatePost {
//!     content: "Hello".to_string(),
//!     accounts: vec![1],
//!     additional: AdditionalFields::default(),
//! });
//!
//! assert_eq!(body["status"], "draft");
//! ```

pub mod errors;
pub mod fields;
pub mod operation;
pub mod options;
pub mod pagination;
pub mod types;
