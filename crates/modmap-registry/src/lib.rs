//! Application registry client for modmap.
//!
//! [`HttpRegistry`] implements [`modmap_core::RegistryClient`] over the
//! registry's REST API with offset pagination. Credentials come from the
//! environment via [`RegistryConfig::from_env`].

pub mod client;
pub mod config;

pub use client::{parse_candidate, parse_page, HttpRegistry, Page, MAX_PAGES, PAGE_SIZE};
pub use config::{decode_auth_token, RegistryConfig};
