//! Confluence REST API access.
//!
//! [`ConfluenceClient`] is the production [`crate::source::PageSource`].

pub mod client;
pub mod types;

pub use client::{Auth, ConfluenceClient, PAGE_SIZE};
