//! Core types and logic for CivicLink.
//!
//! Claims, the trend scorer, search matching, the filter/sort pipeline and the
//! [`feed::FactFeed`] state container live here, along with the waitlist and
//! translation domain types and the traits implemented by storage backends
//! and outbound providers.
//!
//! This crate is deliberately free of HTTP and database dependencies.

// Native `async fn` in traits; the `Send` bounds are spelled out explicitly.
#![allow(async_fn_in_trait)]

pub mod claim;
pub mod debounce;
pub mod error;
pub mod feed;
pub mod pipeline;
pub mod provider;
pub mod search;
pub mod seed;
pub mod store;
pub mod translate;
pub mod trend;
pub mod waitlist;

pub use error::{Error, Result};
