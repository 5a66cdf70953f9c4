pub mod handshake_response;

pub use handshake_response::HandshakeResponse;
