//! # Payhub server
//! This module hosts the REST server for the Payhub payment gateway. It is responsible for:
//! Authenticating users via email and password, and issuing access/refresh token pairs.
//! Serving the profile, account and payment queries for authenticated users.
//! The role-gated user administration endpoints.
//! Listening for incoming webhook requests from the payment provider and booking the reported
//! payments.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more
//! information.

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;

pub mod helpers;
pub mod routes;
pub mod server;
pub mod webhook_routes;

#[cfg(test)]
mod endpoint_tests;
