//! Packet handler registers
//!
//! Field positions inside the packet handler configuration bytes. These
//! registers mix unrelated fields, so the driver updates them with
//! [`Device::modify_bits`](crate::Device::modify_bits) rather than typed
//! definitions.

/// Data access control: CRC enable bit, followed by the 2-bit polynomial select
pub const CRC_ENABLE_BIT: u8 = 2;

/// Header control 2: fixed packet length (no length byte on air)
pub const FIXED_PACKET_LENGTH_BIT: u8 = 3;
/// Header control 2: sync word length minus one, bits 2:1
pub const SYNC_LENGTH_MSB: u8 = 2;
pub const SYNC_LENGTH_LSB: u8 = 1;
/// Header control 2: bit 8 of the preamble length in nibbles
pub const PREAMBLE_LENGTH_MSB_BIT: u8 = 0;

/// Preamble detection control: detection threshold in nibbles, bits 7:3
pub const PREAMBLE_THRESHOLD_MSB: u8 = 7;
pub const PREAMBLE_THRESHOLD_LSB: u8 = 3;

/// Largest frame the 64 byte FIFO holds
pub const MAX_PACKET_LENGTH: usize = 64;
