//! Printify Provider Module
//!
//! Provides integration with the Printify API for image uploads, catalog
//! variants and the draft product lifecycle.
//!
//! API Documentation: https://developers.printify.com/

mod client;
mod mapper;
mod models;

pub use client::PrintifyProvider;
