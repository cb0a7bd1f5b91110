//! dropview - link-preview pages for Nextcloud file shares.
//!
//! Core library exposing the resolver, configuration and web server to the
//! binary and to integration tests.

pub mod config;
pub mod endpoints;
pub mod http_client;
pub mod models;
pub mod ocs;
pub mod resolver;
pub mod server;
pub mod utils;
