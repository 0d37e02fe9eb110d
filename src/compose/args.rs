//! Instruction argument encoding
//!
//! Payloads follow the Anchor wire convention: an 8-byte method
//! discriminator (sha256 of `global:<method>`) followed by the arguments.
//! Integers are little-endian at their declared width. Chain-qualified
//! addresses and hex payloads are appended as raw bytes with no added
//! length prefix; where a schema declares length-prefixed framing
//! (plain strings, byte vectors, lists), the borsh-style 4-byte
//! little-endian count is used.

use sha2::{Digest, Sha256};
use solana_sdk::pubkey::Pubkey;

/// Method discriminator: first 8 bytes of sha256("global:<method>")
pub fn method_discriminator(method: &str) -> [u8; 8] {
    let digest = Sha256::digest(format!("global:{method}").as_bytes());
    let mut discriminator = [0u8; 8];
    discriminator.copy_from_slice(&digest[..8]);
    discriminator
}

/// Ordered argument payload builder for one instruction
#[derive(Debug, Clone)]
pub struct InstructionData {
    buf: Vec<u8>,
}

impl InstructionData {
    /// Start a payload for the named method
    pub fn method(name: &str) -> Self {
        Self {
            buf: method_discriminator(name).to_vec(),
        }
    }

    pub fn u8(mut self, value: u8) -> Self {
        self.buf.push(value);
        self
    }

    /// 64-bit amount/fee/period, little-endian
    pub fn u64_le(mut self, value: u64) -> Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// 128-bit sequence/request identifier, little-endian
    pub fn u128_le(mut self, value: u128) -> Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn pubkey(mut self, key: &Pubkey) -> Self {
        self.buf.extend_from_slice(key.as_ref());
        self
    }

    /// Length-prefixed UTF-8 string (4-byte little-endian count)
    pub fn string(mut self, value: &str) -> Self {
        self.buf.extend_from_slice(&(value.len() as u32).to_le_bytes());
        self.buf.extend_from_slice(value.as_bytes());
        self
    }

    /// Length-prefixed byte vector (4-byte little-endian count)
    pub fn bytes(mut self, value: &[u8]) -> Self {
        self.buf.extend_from_slice(&(value.len() as u32).to_le_bytes());
        self.buf.extend_from_slice(value);
        self
    }

    /// Raw bytes, no framing added; used for chain-qualified addresses and
    /// hex payloads whose framing the target schema defines itself
    pub fn raw(mut self, value: &[u8]) -> Self {
        self.buf.extend_from_slice(value);
        self
    }

    /// Length-prefixed list of pubkeys
    pub fn pubkey_list(mut self, keys: &[Pubkey]) -> Self {
        self.buf.extend_from_slice(&(keys.len() as u32).to_le_bytes());
        for key in keys {
            self.buf.extend_from_slice(key.as_ref());
        }
        self
    }

    /// Length-prefixed list of length-prefixed strings
    pub fn string_list(mut self, values: &[String]) -> Self {
        self.buf.extend_from_slice(&(values.len() as u32).to_le_bytes());
        for value in values {
            self = self.string(value);
        }
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_discriminator_is_stable() {
        let first = method_discriminator("deposit_native");
        let second = method_discriminator("deposit_native");
        assert_eq!(first, second);
        assert_ne!(first, method_discriminator("deposit_token"));
    }

    #[test]
    fn test_amounts_are_little_endian() {
        let data = InstructionData::method("deposit_native").u64_le(1000).build();
        assert_eq!(&data[8..16], &[0xe8, 0x03, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_u128_identifier_width() {
        let data = InstructionData::method("execute_call").u128_le(42).build();
        assert_eq!(data.len(), 8 + 16);
        assert_eq!(data[8], 42);
    }

    #[test]
    fn test_raw_adds_no_framing() {
        let to = "0x2.icon/hxea3635f7495653d8596a7f23a78514b6ad1470e8";
        let data = InstructionData::method("send_call").raw(to.as_bytes()).build();
        assert_eq!(&data[8..], to.as_bytes());
    }

    #[test]
    fn test_string_is_length_prefixed() {
        let data = InstructionData::method("initialize").string("0x2.icon").build();
        assert_eq!(&data[8..12], &8u32.to_le_bytes());
        assert_eq!(&data[12..], b"0x2.icon");
    }

    #[test]
    fn test_list_framing() {
        let keys = vec![Pubkey::new_unique(), Pubkey::new_unique()];
        let data = InstructionData::method("set_protocols").pubkey_list(&keys).build();
        assert_eq!(&data[8..12], &2u32.to_le_bytes());
        assert_eq!(data.len(), 8 + 4 + 64);
    }
}
