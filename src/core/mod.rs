//! Core Server Framework Module
//!
//! - tool.rs: capability contract every tool implements
//! - registry.rs: case-insensitive tool registry
//! - shaper.rs: execution result to content block conversion
//! - rest.rs: REST dispatcher (`/tools`, `/execute`)
//! - jsonrpc.rs: JSON-RPC 2.0 dispatcher (`POST /`)
//! - server.rs: shared context, HTTP and STDIO transports
//! - config.rs: environment configuration

pub mod config;
pub mod jsonrpc;
pub mod registry;
pub mod rest;
pub mod server;
pub mod shaper;
pub mod tool;
