//! Example MCP tool server: four tools over stdio, with every file path
//! confined to a fixed project root.

pub mod sandbox;
pub mod server;
pub mod tools;
