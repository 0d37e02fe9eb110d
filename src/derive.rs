//! Deterministic derivation of program-owned addresses
//!
//! Derivation is a pure function of (seeds, program id): no network access,
//! fully reproducible. A one-byte bump nonce is appended and searched
//! descending from 255 until the candidate lies off the ed25519 curve.
//!
//! Numeric seeds are encoded big-endian at the exact width the target
//! schema declares (8 bytes for small indices, 16 bytes for 128-bit
//! sequence/request numbers). A width mismatch still yields a valid-looking
//! address that references the wrong account, so widths are fixed by the
//! `Seed` variant rather than left to the caller.

use solana_sdk::pubkey::Pubkey;

use crate::error::{OrbitError, Result};

/// A single derivation seed
#[derive(Debug, Clone)]
pub enum Seed<'a> {
    /// UTF-8 string seed (no terminator, no length prefix)
    Str(&'a str),
    /// Raw byte seed
    Bytes(&'a [u8]),
    /// 8-byte big-endian integer seed
    U64(u64),
    /// 16-byte big-endian integer seed (sequence/request numbers)
    U128(u128),
    /// Another address used as a 32-byte seed
    Address(Pubkey),
}

impl Seed<'_> {
    /// Encoded byte representation of this seed
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Seed::Str(s) => s.as_bytes().to_vec(),
            Seed::Bytes(b) => b.to_vec(),
            Seed::U64(n) => n.to_be_bytes().to_vec(),
            Seed::U128(n) => n.to_be_bytes().to_vec(),
            Seed::Address(key) => key.to_bytes().to_vec(),
        }
    }
}

/// Derive the program-owned address for the given seeds, returning the
/// address and the bump nonce that produced it
///
/// Searches bumps descending from 255; each candidate is accepted only if
/// it lies off the signing curve. Fails with `DerivationExhausted` when the
/// whole bump range is spent (fatal, practically unreachable).
pub fn derive_address(seeds: &[Seed<'_>], program_id: &Pubkey) -> Result<(Pubkey, u8)> {
    let encoded: Vec<Vec<u8>> = seeds.iter().map(Seed::to_bytes).collect();

    for bump in (0..=255u8).rev() {
        let bump_seed = [bump];
        let mut candidate: Vec<&[u8]> = encoded.iter().map(Vec::as_slice).collect();
        candidate.push(&bump_seed);

        // create_program_address rejects on-curve results, which is exactly
        // the off-curve guarantee the bump search needs
        if let Ok(address) = Pubkey::create_program_address(&candidate, program_id) {
            return Ok((address, bump));
        }
    }

    Err(OrbitError::DerivationExhausted { program: *program_id })
}

/// Derive just the address, discarding the bump
pub fn pda(seeds: &[Seed<'_>], program_id: &Pubkey) -> Result<Pubkey> {
    derive_address(seeds, program_id).map(|(address, _)| address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_matches_sdk_derivation() {
        let program = Pubkey::new_unique();
        let (derived, bump) = derive_address(&[Seed::Str("state")], &program).unwrap();

        let (expected, expected_bump) = Pubkey::find_program_address(&[b"state"], &program);
        assert_eq!(derived, expected);
        assert_eq!(bump, expected_bump);
    }

    #[test]
    fn test_u64_seed_width() {
        assert_eq!(Seed::U64(1).to_bytes(), vec![0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(Seed::U64(1).to_bytes().len(), 8);
    }

    #[test]
    fn test_u128_seed_width() {
        let bytes = Seed::U128(1).to_bytes();
        assert_eq!(bytes.len(), 16);
        assert_eq!(bytes[15], 1);
        assert!(bytes[..15].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_widths_produce_distinct_addresses() {
        // The same numeric value at different widths must not collide:
        // a silent width mismatch is the classic wrong-account bug.
        let program = Pubkey::new_unique();
        let narrow = pda(&[Seed::Str("rollback"), Seed::U64(7)], &program).unwrap();
        let wide = pda(&[Seed::Str("rollback"), Seed::U128(7)], &program).unwrap();
        assert_ne!(narrow, wide);
    }

    #[test]
    fn test_seed_roundtrip_per_width() {
        let n64 = 0x0102_0304_0506_0708u64;
        let bytes = Seed::U64(n64).to_bytes();
        assert_eq!(u64::from_be_bytes(bytes.try_into().unwrap()), n64);

        let n128 = 0x0102_0304_0506_0708_090a_0b0c_0d0e_0f10u128;
        let bytes = Seed::U128(n128).to_bytes();
        assert_eq!(u128::from_be_bytes(bytes.try_into().unwrap()), n128);
    }

    #[test]
    fn test_address_seed() {
        let program = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let derived = pda(&[Seed::Str("vault"), Seed::Address(mint)], &program).unwrap();

        let (expected, _) =
            Pubkey::find_program_address(&[b"vault", mint.as_ref()], &program);
        assert_eq!(derived, expected);
    }

    proptest! {
        #[test]
        fn prop_derivation_is_deterministic(value in any::<u128>()) {
            let program = Pubkey::new_unique();
            let seeds = [Seed::Str("proxy"), Seed::U128(value)];
            let first = derive_address(&seeds, &program).unwrap();
            let second = derive_address(&seeds, &program).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
