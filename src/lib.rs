//! HTTP bridge exposing schema-described tools over a REST pair
//! (`GET /tools`, `POST /execute`) and MCP JSON-RPC 2.0 (`POST /`).

pub mod core;
pub mod tools;
