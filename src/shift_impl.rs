// SPDX-License-Identifier: Apache-2.0

//! Implementation of sub-limb bit shifts on multiprecision integers.

use super::limb::{LimbType, LIMB_BITS};

/// Shift a multiprecision integer left by less than a limb's width.
///
/// Stores `op0 << cnt` truncated to `op0.len()` limbs in `result` and returns the bits shifted out
/// at the top, aligned to the least significant end of the returned limb.
///
/// A zero `cnt` copies `op0` and returns zero. Runs in constant time for a given operand length.
///
/// # Arguments:
///
/// * `result` - Receives the shifted value. Must be at least as long as `op0`.
/// * `op0` - The value to shift.
/// * `cnt` - The shift distance in bits, less than [`LIMB_BITS`].
pub fn ct_lshift(result: &mut [LimbType], op0: &[LimbType], cnt: u32) -> LimbType {
    debug_assert!(cnt < LIMB_BITS);
    debug_assert!(result.len() >= op0.len());
    let result = &mut result[..op0.len()];
    // Splitting the right shift keeps the distance in range for cnt == 0.
    let low_rshift = LIMB_BITS - 1 - cnt;
    let mut last_op0_val = 0;
    for (result_val, op0_val) in result.iter_mut().zip(op0.iter()) {
        *result_val = (*op0_val << cnt) | ((last_op0_val >> 1) >> low_rshift);
        last_op0_val = *op0_val;
    }
    (last_op0_val >> 1) >> low_rshift
}

/// Shift a multiprecision integer left in place.
///
/// Same as [`ct_lshift()`], but with the result replacing `op0`.
pub fn ct_lshift_assign(op0: &mut [LimbType], cnt: u32) -> LimbType {
    debug_assert!(cnt < LIMB_BITS);
    let low_rshift = LIMB_BITS - 1 - cnt;
    let mut last_op0_val = 0;
    for op0_val in op0.iter_mut() {
        let cur_op0_val = *op0_val;
        *op0_val = (cur_op0_val << cnt) | ((last_op0_val >> 1) >> low_rshift);
        last_op0_val = cur_op0_val;
    }
    (last_op0_val >> 1) >> low_rshift
}

#[test]
fn test_ct_lshift() {
    let mut result = [0 as LimbType; 2];
    assert_eq!(ct_lshift(&mut result, &[!0, 1], 1), 0);
    assert_eq!(result, [!1, 3]);

    assert_eq!(ct_lshift(&mut result, &[!0, !0], 4), 0xf);
    assert_eq!(result, [!0xf, !0]);

    assert_eq!(ct_lshift(&mut result, &[5, 6], 0), 0);
    assert_eq!(result, [5, 6]);

    assert_eq!(ct_lshift(&mut result, &[1, 1 << (LIMB_BITS - 1)], LIMB_BITS - 1), 1 << (LIMB_BITS - 2));
    assert_eq!(result, [1 << (LIMB_BITS - 1), 0]);

    assert_eq!(ct_lshift(&mut [], &[], 3), 0);

    let mut op0 = [1 << (LIMB_BITS - 1), 1 << (LIMB_BITS - 1)];
    assert_eq!(ct_lshift_assign(&mut op0, 1), 1);
    assert_eq!(op0, [0, 1]);
}

/// Shift a multiprecision integer right by less than a limb's width.
///
/// Stores `op0 >> cnt` in `result` and returns the bits shifted out at the bottom, aligned to the
/// most significant end of the returned limb.
///
/// A zero `cnt` copies `op0` and returns zero. Runs in constant time for a given operand length.
///
/// # Arguments:
///
/// * `result` - Receives the shifted value. Must be at least as long as `op0`.
/// * `op0` - The value to shift.
/// * `cnt` - The shift distance in bits, less than [`LIMB_BITS`].
pub fn ct_rshift(result: &mut [LimbType], op0: &[LimbType], cnt: u32) -> LimbType {
    debug_assert!(cnt < LIMB_BITS);
    debug_assert!(result.len() >= op0.len());
    let result = &mut result[..op0.len()];
    let high_lshift = LIMB_BITS - 1 - cnt;
    let mut last_op0_val = 0;
    for (result_val, op0_val) in result.iter_mut().zip(op0.iter()).rev() {
        *result_val = (*op0_val >> cnt) | ((last_op0_val << 1) << high_lshift);
        last_op0_val = *op0_val;
    }
    (last_op0_val << 1) << high_lshift
}

/// Shift a multiprecision integer right in place.
///
/// Same as [`ct_rshift()`], but with the result replacing `op0`.
pub fn ct_rshift_assign(op0: &mut [LimbType], cnt: u32) -> LimbType {
    debug_assert!(cnt < LIMB_BITS);
    let high_lshift = LIMB_BITS - 1 - cnt;
    let mut last_op0_val = 0;
    for op0_val in op0.iter_mut().rev() {
        let cur_op0_val = *op0_val;
        *op0_val = (cur_op0_val >> cnt) | ((last_op0_val << 1) << high_lshift);
        last_op0_val = cur_op0_val;
    }
    (last_op0_val << 1) << high_lshift
}

#[test]
fn test_ct_rshift() {
    let mut result = [0 as LimbType; 2];
    assert_eq!(ct_rshift(&mut result, &[3, 1], 1), 1 << (LIMB_BITS - 1));
    assert_eq!(result, [1 << (LIMB_BITS - 1) | 1, 0]);

    assert_eq!(ct_rshift(&mut result, &[!0, !0], 4), !0 << (LIMB_BITS - 4));
    assert_eq!(result, [!0, !0 >> 4]);

    assert_eq!(ct_rshift(&mut result, &[5, 6], 0), 0);
    assert_eq!(result, [5, 6]);

    assert_eq!(ct_rshift(&mut [], &[], 3), 0);

    let mut op0 = [0, 1];
    assert_eq!(ct_rshift_assign(&mut op0, LIMB_BITS - 1), 0);
    assert_eq!(op0, [2, 0]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{limbs_strategy, limbs_to_biguint, radix_pow};
    use num_bigint::BigUint;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn lshift_matches_reference(op0 in limbs_strategy(8), cnt in 0..LIMB_BITS) {
            let n = op0.len();
            let mut result = vec![0; n];
            let shifted_out = ct_lshift(&mut result, &op0, cnt);
            let full = limbs_to_biguint(&op0) << cnt as usize;
            prop_assert_eq!(limbs_to_biguint(&result), &full % radix_pow(n));
            prop_assert_eq!(BigUint::from(shifted_out), &full >> (LIMB_BITS as usize * n));

            let mut in_place = op0.clone();
            prop_assert_eq!(ct_lshift_assign(&mut in_place, cnt), shifted_out);
            prop_assert_eq!(in_place, result);
        }

        #[test]
        fn rshift_undoes_lshift(op0 in limbs_strategy(8), cnt in 0..LIMB_BITS) {
            let mut shifted = op0.clone();
            let high = ct_lshift_assign(&mut shifted, cnt);
            let mut result = vec![0; op0.len()];
            let low = ct_rshift(&mut result, &shifted, cnt);
            prop_assert_eq!(low, 0);

            // Reinsert the bits lost at the top to restore the original.
            if let Some(top) = result.last_mut() {
                *top |= (high << 1) << (LIMB_BITS - 1 - cnt);
            }
            prop_assert_eq!(&result, &op0);

            let mut in_place = shifted.clone();
            prop_assert_eq!(ct_rshift_assign(&mut in_place, cnt), 0);
            let mut expected = vec![0; op0.len()];
            ct_rshift(&mut expected, &shifted, cnt);
            prop_assert_eq!(in_place, expected);
        }

        #[test]
        fn rshift_matches_reference(op0 in limbs_strategy(8), cnt in 0..LIMB_BITS) {
            let mut result = vec![0; op0.len()];
            let shifted_out = ct_rshift(&mut result, &op0, cnt);
            let op0_val = limbs_to_biguint(&op0);
            prop_assert_eq!(limbs_to_biguint(&result), &op0_val >> cnt as usize);
            // The bits dropped at the bottom reappear at the top of the returned limb.
            let dropped = op0_val % (BigUint::from(1u8) << cnt as usize);
            let expected = if cnt == 0 {
                BigUint::default()
            } else {
                dropped << (LIMB_BITS - cnt) as usize
            };
            prop_assert_eq!(BigUint::from(shifted_out), expected);
        }
    }
}
