//! Client reply to the server greeting (`Protocol::HandshakeResponse41`).
//!
//! ```text
//! [3B length][1B seq][4B client capabilities][4B max packet size][1B charset]
//! [23B zero][NUL username][1B auth response length][auth response]
//! ```
//!
//! The auth response pair is only written when the greeting announced
//! `CLIENT_SECURE_CONNECTION`.

use crate::error::{Error, Result};
use crate::mysql::auth::{NativePassword, PasswordHasher};
use crate::mysql::common::{
    CLIENT_ALL_FLAGS, CLIENT_SECURE_CONNECTION, MAX_PACKET_SIZE, MAX_PAYLOAD_LEN,
};
use crate::mysql::handshake::HandshakeMessage;
use crate::proto::ProtoWrite;
use log::debug;

const RESERVED_LEN: usize = 23;

/// Capabilities, max packet size, charset, reserved.
const FIXED_LEN: usize = 4 + 4 + 1 + RESERVED_LEN;

pub struct HandshakeResponse;

impl HandshakeResponse {
    /// Writes the response using `mysql_native_password`.
    pub fn encode<W: ProtoWrite>(
        writer: &mut W,
        sequence_id: u8,
        handshake: &HandshakeMessage,
        username: &str,
        password: &str,
    ) -> Result<()> {
        Self::encode_with(&NativePassword, writer, sequence_id, handshake, username, password)
    }

    /// Writes the response and flushes `writer`.
    ///
    /// Nothing is written when the payload would not fit its length field
    /// or when `username` contains a NUL byte, which would end the field early.
    pub fn encode_with<H, W>(
        hasher: &H,
        writer: &mut W,
        sequence_id: u8,
        handshake: &HandshakeMessage,
        username: &str,
        password: &str,
    ) -> Result<()>
    where
        H: PasswordHasher + ?Sized,
        W: ProtoWrite,
    {
        if username.as_bytes().contains(&0) {
            return Err(Error::MalformedPacket(
                "username contains a NUL byte".to_string(),
            ));
        }

        let auth_response = if handshake.has_capability(CLIENT_SECURE_CONNECTION) {
            let hashed = hasher.hash(password.as_bytes(), &handshake.auth_plugin_data);
            if hashed.len() > usize::from(u8::MAX) {
                return Err(Error::EncodingOverflow {
                    len: hashed.len(),
                    max: usize::from(u8::MAX),
                });
            }
            Some(hashed)
        } else {
            None
        };

        let len = Self::payload_len(username.len(), auth_response.as_ref().map(Vec::len));
        if len > MAX_PAYLOAD_LEN {
            return Err(Error::EncodingOverflow {
                len,
                max: MAX_PAYLOAD_LEN,
            });
        }
        debug!(
            "handshake response: seq {}, payload {} bytes, auth response {}",
            sequence_id,
            len,
            auth_response.is_some()
        );

        writer.write_u24_le(len as u32)?;
        writer.write_u8(sequence_id)?;
        writer.write_u32_le(CLIENT_ALL_FLAGS)?;
        writer.write_u32_le(MAX_PACKET_SIZE)?;
        writer.write_u8(handshake.character_set)?;
        writer.write_zeros(RESERVED_LEN)?;
        writer.write_nul_bytes(username.as_bytes())?;
        if let Some(hashed) = &auth_response {
            writer.write_u8(hashed.len() as u8)?;
            writer.write_bytes(hashed)?;
        }
        writer.flush_packet()?;
        Ok(())
    }

    /// Payload length, header excluded. `auth_response_len` is `None` when
    /// the auth response is omitted altogether.
    pub fn payload_len(username_len: usize, auth_response_len: Option<usize>) -> usize {
        FIXED_LEN + username_len + 1 + auth_response_len.map_or(0, |len| len + 1)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mysql::handshake::test::mysql57_greeting;
    use bytes::Buf;
    use std::io::{self, Cursor, Write};

    fn mysql57() -> HandshakeMessage {
        HandshakeMessage::read_server(&mut Cursor::new(mysql57_greeting())).unwrap()
    }

    #[test]
    fn test_response_with_native_password() {
        let greeting = mysql57();
        let mut out = Vec::new();

        HandshakeResponse::encode(&mut out, greeting.next_sequence_id(), &greeting, "repl", "secret")
            .unwrap();

        let hashed = NativePassword.hash(b"secret", &greeting.auth_plugin_data);
        assert_eq!(hashed.len(), 20);
        let expected_len = 4 + 4 + 1 + 23 + 4 + 1 + 1 + hashed.len();
        assert_eq!(out.len(), 4 + expected_len);

        let mut buf = &out[..];
        assert_eq!(buf.get_uint_le(3) as usize, expected_len);
        assert_eq!(buf.get_u8(), 1);
        assert_eq!(buf.get_u32_le(), CLIENT_ALL_FLAGS);
        assert_eq!(buf.get_u32_le(), MAX_PACKET_SIZE);
        assert_eq!(buf.get_u8(), 8);
        assert!(buf[..23].iter().all(|b| *b == 0));
        buf.advance(23);
        assert_eq!(&buf[..5], b"repl\0");
        buf.advance(5);
        assert_eq!(buf.get_u8(), 20);
        assert_eq!(buf, &hashed[..]);
    }

    #[test]
    fn test_response_without_secure_connection() {
        let greeting = HandshakeMessage {
            character_set: 0x21,
            ..HandshakeMessage::default()
        };
        let mut out = Vec::new();

        HandshakeResponse::encode(&mut out, 1, &greeting, "root", "").unwrap();

        assert_eq!(HandshakeResponse::payload_len(4, None), 37);
        assert_eq!(&out[..4], &[37, 0, 0, 1]);
        assert_eq!(out.len(), 4 + 37);
        assert_eq!(out[12], 0x21);
        assert_eq!(&out[36..], b"root\0");
    }

    #[test]
    fn test_empty_password_keeps_length_byte() {
        let greeting = mysql57();
        let mut out = Vec::new();

        HandshakeResponse::encode(&mut out, 1, &greeting, "root", "").unwrap();

        assert_eq!(out[0] as usize, 4 + 4 + 1 + 23 + 4 + 1 + 1);
        assert_eq!(out.last(), Some(&0));
    }

    #[test]
    fn test_custom_hasher_gets_scramble() {
        let greeting = mysql57();
        let scramble = greeting.auth_plugin_data.clone();
        let hasher = move |password: &[u8], got: &[u8]| {
            assert_eq!(got, &scramble[..]);
            password.iter().rev().copied().collect::<Vec<u8>>()
        };
        let mut out = Vec::new();

        HandshakeResponse::encode_with(&hasher, &mut out, 1, &greeting, "u", "abc").unwrap();

        assert_eq!(&out[out.len() - 4..], &[3, b'c', b'b', b'a']);
    }

    #[test]
    fn test_username_overflows_length_field() {
        let greeting = mysql57();
        let username = "a".repeat(MAX_PAYLOAD_LEN);
        let mut out = Vec::new();

        let err = HandshakeResponse::encode(&mut out, 1, &greeting, &username, "pw").unwrap_err();

        assert!(matches!(err, Error::EncodingOverflow { max: MAX_PAYLOAD_LEN, .. }));
        assert!(out.is_empty());
    }

    #[test]
    fn test_auth_response_overflows_length_byte() {
        let greeting = mysql57();
        let hasher = |_: &[u8], _: &[u8]| vec![0u8; 256];
        let mut out = Vec::new();

        let err =
            HandshakeResponse::encode_with(&hasher, &mut out, 1, &greeting, "u", "pw").unwrap_err();

        assert!(matches!(err, Error::EncodingOverflow { len: 256, max: 255 }));
        assert!(out.is_empty());
    }

    #[test]
    fn test_username_with_nul_is_rejected() {
        let greeting = mysql57();
        let mut out = Vec::new();

        let err = HandshakeResponse::encode(&mut out, 1, &greeting, "ro\0ot", "pw").unwrap_err();

        assert!(matches!(err, Error::MalformedPacket(_)));
        assert!(out.is_empty());
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "peer went away"))
        }
    }

    #[test]
    fn test_flush_error_is_surfaced() {
        let greeting = mysql57();
        let err = HandshakeResponse::encode(&mut BrokenPipe, 1, &greeting, "root", "").unwrap_err();
        assert!(err.is_io());
    }
}
