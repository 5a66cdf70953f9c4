//! Server greeting (`Protocol::HandshakeV10`).
//!
//! ```text
//! [3B length][1B seq][1B protocol=10][NUL server version][4B connection id]
//! [8B scramble part 1][1B filler][2B capabilities low]
//! -- 4.1+ servers only --
//! [1B charset][2B status][2B capabilities high][1B auth data length][10B filler]
//! [scramble part 2, if CLIENT_SECURE_CONNECTION][NUL plugin name, if CLIENT_PLUGIN_AUTH]
//! [padding]
//! ```

use crate::error::{Error, Result};
use crate::mysql::common::{CLIENT_PLUGIN_AUTH, CLIENT_SECURE_CONNECTION, HANDSHAKE_VERSION_10};
use crate::proto::ProtoRead;
use log::{debug, warn};
use std::borrow::Cow;

/// Length of the scramble part that every greeting carries.
const AUTH_PLUGIN_DATA_PART_1_LEN: usize = 8;

/// Minimum length of scramble part 2, terminator included.
const AUTH_PLUGIN_DATA_PART_2_MIN_LEN: u8 = 13;

const RESERVED_LEN: usize = 10;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HandshakeMessage {
    pub sequence_id: u8,
    pub protocol_version: u8,
    pub server_version: Vec<u8>,
    pub connection_id: u32,
    pub capabilities: u32,
    pub character_set: u8,
    pub status_flags: u16,
    pub auth_plugin_data: Vec<u8>,
    pub auth_plugin_name: Vec<u8>,
}

/// Bytes of the payload not yet accounted for.
///
/// Signed so that a packet declaring less than it carries is caught as a
/// negative balance instead of wrapping.
struct LengthBudget {
    remaining: i64,
}

impl LengthBudget {
    fn new(declared: u32) -> Self {
        LengthBudget {
            remaining: i64::from(declared),
        }
    }

    fn charge(&mut self, len: usize, field: &str) -> Result<()> {
        self.remaining -= len as i64;
        if self.remaining < 0 {
            return Err(Error::MalformedPacket(format!(
                "declared length exhausted by {} ({} bytes over)",
                field, -self.remaining
            )));
        }
        Ok(())
    }

    fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Reads a NUL-terminated field without looking past the declared length.
    fn read_nul_bytes<R: ProtoRead>(&mut self, reader: &mut R, field: &str) -> Result<Vec<u8>> {
        let limit = self.remaining.max(0) as usize;
        match reader.read_nul_bytes_max(limit)? {
            Some(bytes) => {
                self.charge(bytes.len() + 1, field)?;
                Ok(bytes)
            }
            None => Err(Error::MalformedPacket(format!(
                "{} is not terminated within the declared length",
                field
            ))),
        }
    }
}

impl HandshakeMessage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a complete greeting packet, header included.
    pub fn read_server<R: ProtoRead>(reader: &mut R) -> Result<Self> {
        let mut msg = Self::new();
        msg.read_server_into(reader)?;
        Ok(msg)
    }

    /// Replaces `self` with the next packet on `reader`.
    ///
    /// On success exactly `4 + declared length` bytes have been consumed.
    /// No field is read past the declared length: fixed-width fields are
    /// charged before they are read and strings must terminate inside it.
    pub fn read_server_into<R: ProtoRead>(&mut self, reader: &mut R) -> Result<()> {
        *self = Self::default();
        let mut budget = LengthBudget::new(reader.read_u24_le()?);
        self.sequence_id = reader.read_u8()?;

        budget.charge(1, "protocol version")?;
        self.protocol_version = reader.read_u8()?;
        if self.protocol_version != HANDSHAKE_VERSION_10 {
            return Err(Error::UnsupportedProtocolVersion(self.protocol_version));
        }

        self.server_version = budget.read_nul_bytes(reader, "server version")?;

        budget.charge(4, "connection id")?;
        self.connection_id = reader.read_u32_le()?;

        budget.charge(AUTH_PLUGIN_DATA_PART_1_LEN, "auth plugin data")?;
        self.auth_plugin_data = reader.read_bytes(AUTH_PLUGIN_DATA_PART_1_LEN)?;

        budget.charge(1, "filler")?;
        reader.skip(1)?;

        budget.charge(2, "capability flags")?;
        self.capabilities = u32::from(reader.read_u16_le()?);

        if budget.is_exhausted() {
            debug!("pre-4.1 server greeting: {:?}", self);
            return Ok(());
        }

        budget.charge(5, "character set, status and upper capability flags")?;
        self.character_set = reader.read_u8()?;
        self.status_flags = reader.read_u16_le()?;
        self.capabilities |= u32::from(reader.read_u16_le()?) << 16;

        budget.charge(1, "auth plugin data length")?;
        let auth_plugin_data_len = reader.read_u8()?;

        budget.charge(RESERVED_LEN, "reserved")?;
        reader.skip(RESERVED_LEN)?;

        if self.has_capability(CLIENT_SECURE_CONNECTION) {
            let part_2_len = match auth_plugin_data_len.checked_sub(AUTH_PLUGIN_DATA_PART_1_LEN as u8) {
                Some(len) if len > AUTH_PLUGIN_DATA_PART_2_MIN_LEN => len,
                _ => AUTH_PLUGIN_DATA_PART_2_MIN_LEN,
            } as usize;
            budget.charge(part_2_len, "auth plugin data part 2")?;
            let mut part_2 = reader.read_bytes(part_2_len)?;
            // trailing NUL
            part_2.pop();
            self.auth_plugin_data.extend_from_slice(&part_2);
        }

        if self.has_capability(CLIENT_PLUGIN_AUTH) {
            self.auth_plugin_name = budget.read_nul_bytes(reader, "auth plugin name")?;
        }

        if !budget.is_exhausted() {
            warn!(
                "discarding {} trailing bytes of server greeting",
                budget.remaining
            );
            reader.skip(budget.remaining as usize)?;
        }

        debug!("server greeting: {:?}", self);
        Ok(())
    }

    pub fn has_capability(&self, flag: u32) -> bool {
        self.capabilities & flag == flag
    }

    /// Sequence id the client's reply must carry.
    pub fn next_sequence_id(&self) -> u8 {
        self.sequence_id.wrapping_add(1)
    }

    pub fn server_version_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.server_version)
    }

    pub fn auth_plugin_name_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.auth_plugin_name)
    }
}
