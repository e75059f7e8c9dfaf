//! Modules layer - Infrastructure components for external integrations
//!
//! Contains the client for the municipal reporting backend.

pub mod backend;
