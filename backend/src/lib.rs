//! Peso Backend Library
//!
//! Weight and goal tracking services, their repositories and the HTTP API.
//! Exposed as a library for the integration tests.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
