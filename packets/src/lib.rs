//! Decoder and encoder for the MySQL connection-phase handshake: the
//! server greeting and the client's handshake response.
//!
//! ```ignore
//! use packets::mysql::{HandshakeMessage, HandshakeResponse};
//!
//! let greeting = HandshakeMessage::read_server(&mut reader)?;
//! HandshakeResponse::encode(&mut writer, greeting.next_sequence_id(), &greeting, "repl", "secret")?;
//! ```

pub mod error;
pub mod mysql;
pub mod proto;

pub use error::{Error, Result};
pub use proto::{ProtoRead, ProtoWrite};
