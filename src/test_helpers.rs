// SPDX-License-Identifier: Apache-2.0

//! Shared test tooling: conversions between limb slices and [`BigUint`], which serves as the
//! reference implementation, and proptest strategies for limb arrays.

use super::limb::{LimbType, LIMB_BITS, LIMB_BYTES};
use num_bigint::BigUint;
use proptest::prelude::*;

/// Interpret a little endian limb slice as an integer.
pub fn limbs_to_biguint(limbs: &[LimbType]) -> BigUint {
    let mut result = BigUint::default();
    for limb in limbs.iter().rev() {
        result <<= LIMB_BITS as usize;
        result += BigUint::from(*limb);
    }
    result
}

/// Convert an integer to exactly `nlimbs` little endian limbs. The value must fit.
pub fn biguint_to_limbs(v: &BigUint, nlimbs: usize) -> Vec<LimbType> {
    let mut limbs = vec![0 as LimbType; nlimbs];
    for (i, b) in v.to_bytes_le().iter().enumerate() {
        if *b == 0 {
            continue;
        }
        assert!(i / LIMB_BYTES < nlimbs, "value doesn't fit {} limbs", nlimbs);
        limbs[i / LIMB_BYTES] |= (*b as LimbType) << (8 * (i % LIMB_BYTES));
    }
    limbs
}

/// The radix `B` raised to the `nlimbs`th power.
pub fn radix_pow(nlimbs: usize) -> BigUint {
    BigUint::from(1u8) << (LIMB_BITS as usize * nlimbs)
}

/// Single limbs, biased towards the values sitting at the carry boundaries.
pub fn limb_strategy() -> impl Strategy<Value = LimbType> {
    prop_oneof![
        1 => Just(0 as LimbType),
        1 => Just(1 as LimbType),
        2 => Just(!0 as LimbType),
        6 => any::<LimbType>(),
    ]
}

/// Limb arrays of up to `max_nlimbs` limbs, possibly empty.
pub fn limbs_strategy(max_nlimbs: usize) -> impl Strategy<Value = Vec<LimbType>> {
    prop::collection::vec(limb_strategy(), 0..=max_nlimbs)
}

/// Pairs of limb arrays of equal length, up to `max_nlimbs` limbs each.
pub fn limbs_pair_strategy(
    max_nlimbs: usize,
) -> impl Strategy<Value = (Vec<LimbType>, Vec<LimbType>)> {
    (0..=max_nlimbs).prop_flat_map(|nlimbs| {
        (
            prop::collection::vec(limb_strategy(), nlimbs),
            prop::collection::vec(limb_strategy(), nlimbs),
        )
    })
}

#[test]
fn test_biguint_conversions() {
    let limbs = [1, 0, !0];
    let v = limbs_to_biguint(&limbs);
    assert_eq!(biguint_to_limbs(&v, 3), limbs);
    assert_eq!(biguint_to_limbs(&v, 4), [1, 0, !0, 0]);
    assert!(biguint_to_limbs(&BigUint::default(), 0).is_empty());
    assert_eq!(limbs_to_biguint(&[]), BigUint::default());
    assert_eq!(radix_pow(1), BigUint::from(!0 as LimbType) + 1u8);
}
