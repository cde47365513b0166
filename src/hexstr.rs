// SPDX-License-Identifier: Apache-2.0

//! Conversion of hexadecimal strings to and from little endian limb arrays.
//!
//! The hex digits are written most significant first, the way numbers in test vectors and
//! standards documents usually are. The resulting limb array is least significant limb first.

extern crate alloc;

use super::limb::{LimbType, LIMB_BYTES};
use alloc::string::String;
use alloc::vec::Vec;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LimbsFromHexStrError {
    #[error("invalid hex character {found:?} at offset {offset}")]
    InvalidHexChar { offset: usize, found: char },
    #[error("failed to allocate {nlimbs} limbs")]
    AllocationFailed { nlimbs: usize },
}

const HEX_DIGITS_PER_LIMB: usize = 2 * LIMB_BYTES;

fn nibble_from_hexchar(c: char) -> Option<LimbType> {
    c.to_digit(16).map(|d| d as LimbType)
}

/// Parse a big endian hex string into little endian limbs.
///
/// An optional `0x` prefix is accepted. The result has just enough limbs to hold all the digits,
/// leading zero digits included, and is empty for an empty string.
pub fn limbs_from_hexstr(hexstr: &str) -> Result<Vec<LimbType>, LimbsFromHexStrError> {
    let (prefix_len, digits) = match hexstr.strip_prefix("0x") {
        Some(digits) => (2, digits),
        None => (0, hexstr),
    };

    let nlimbs = (digits.len() + HEX_DIGITS_PER_LIMB - 1) / HEX_DIGITS_PER_LIMB;
    let mut limbs = Vec::new();
    limbs
        .try_reserve_exact(nlimbs)
        .map_err(|_| LimbsFromHexStrError::AllocationFailed { nlimbs })?;
    limbs.resize(nlimbs, 0);

    for (i, (offset, c)) in digits.char_indices().rev().enumerate() {
        let nibble = nibble_from_hexchar(c).ok_or(LimbsFromHexStrError::InvalidHexChar {
            offset: prefix_len + offset,
            found: c,
        })?;
        limbs[i / HEX_DIGITS_PER_LIMB] |= nibble << (4 * (i % HEX_DIGITS_PER_LIMB));
    }
    Ok(limbs)
}

#[test]
fn test_limbs_from_hexstr() {
    assert!(limbs_from_hexstr("").unwrap().is_empty());
    assert_eq!(limbs_from_hexstr("0x1").unwrap(), [1]);
    assert_eq!(limbs_from_hexstr("aBcD").unwrap(), [0xabcd]);

    let limb_digits = "f".repeat(HEX_DIGITS_PER_LIMB);
    assert_eq!(limbs_from_hexstr(&limb_digits).unwrap(), [!0]);
    let two_limbs = alloc::format!("1{}", "0".repeat(HEX_DIGITS_PER_LIMB));
    assert_eq!(limbs_from_hexstr(&two_limbs).unwrap(), [0, 1]);

    assert_eq!(
        limbs_from_hexstr("12g4"),
        Err(LimbsFromHexStrError::InvalidHexChar {
            offset: 2,
            found: 'g'
        })
    );
    assert_eq!(
        limbs_from_hexstr("0x0x"),
        Err(LimbsFromHexStrError::InvalidHexChar {
            offset: 3,
            found: 'x'
        })
    );
}

/// Format little endian limbs as a big endian hex string.
///
/// Every limb gets printed with all of its digits, so the output length is a multiple of the
/// digits per limb.
pub fn limbs_to_hexstr(limbs: &[LimbType]) -> Result<String, alloc::collections::TryReserveError> {
    fn nibble_to_hexchar(nibble: u8) -> char {
        let c = match nibble {
            0x0..=0x9 => b'0' + nibble,
            0xa..=0xf => b'a' + (nibble - 0xa),
            _ => unreachable!(),
        };
        c as char
    }

    let mut result = String::new();
    result.try_reserve_exact(HEX_DIGITS_PER_LIMB * limbs.len())?;
    for l in limbs.iter().rev() {
        for b in l.to_be_bytes() {
            result.push(nibble_to_hexchar(b >> 4));
            result.push(nibble_to_hexchar(b & 0xf));
        }
    }
    Ok(result)
}

#[test]
fn test_limbs_to_hexstr() {
    let hexstr = limbs_to_hexstr(&[0x89abcdef, 0xa]).unwrap();
    assert_eq!(hexstr.len(), 2 * HEX_DIGITS_PER_LIMB);
    assert!(hexstr.ends_with("89abcdef"));
    assert!(hexstr[..HEX_DIGITS_PER_LIMB].ends_with('a'));
    assert_eq!(limbs_from_hexstr(&hexstr).unwrap()[1], 0xa);
    assert_eq!(limbs_to_hexstr(&[]).unwrap(), "");
}
