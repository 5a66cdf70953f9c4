//! MySQL connection-phase packets.

pub mod auth;
pub mod client;
pub mod common;
pub mod handshake;

pub use auth::{NativePassword, PasswordHasher};
pub use client::HandshakeResponse;
pub use handshake::HandshakeMessage;
