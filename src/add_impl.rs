// SPDX-License-Identifier: Apache-2.0

//! Implementation of multiprecision integer addition related primitives.
//!
//! All routines operate on little endian limb slices, run a fixed number of iterations determined
//! by the operand lengths only and thread the carry or borrow explicitly from the least to the
//! most significant limb. Nothing gets allocated.

use super::limb::{ct_add_l_l, ct_add_l_l_c, ct_sub_l_l, ct_sub_l_l_b, LimbChoice, LimbType};

/// Add a limb to a multiprecision integer.
///
/// Stores `op0 + op1` truncated to `op0.len()` limbs in `result` and returns the carry out of the
/// most significant limb. The limb `op1` enters the computation as the carry into the least
/// significant position and gets propagated all the way up, even after it has died out.
///
/// Runs in constant time for a given operand length.
///
/// # Arguments:
///
/// * `result` - Receives the sum in its `op0.len()` least significant limbs. Must be at least as
///   long as `op0`.
/// * `op0` - The multiprecision integer addend.
/// * `op1` - The single limb addend.
pub fn ct_add_1(result: &mut [LimbType], op0: &[LimbType], op1: LimbType) -> LimbType {
    debug_assert!(result.len() >= op0.len());
    let result = &mut result[..op0.len()];
    let mut carry = op1;
    for (result_val, op0_val) in result.iter_mut().zip(op0.iter()) {
        (carry, *result_val) = ct_add_l_l(*op0_val, carry);
    }
    carry
}

/// Add a limb to a multiprecision integer in place.
///
/// Same as [`ct_add_1()`], but with the result replacing `op0`.
pub fn ct_add_1_assign(op0: &mut [LimbType], op1: LimbType) -> LimbType {
    let mut carry = op1;
    for op0_val in op0.iter_mut() {
        (carry, *op0_val) = ct_add_l_l(*op0_val, carry);
    }
    carry
}

#[test]
fn test_ct_add_1() {
    let mut result = [0 as LimbType; 0];
    assert_eq!(ct_add_1(&mut result, &[], 5), 5);

    let mut result = [0 as LimbType; 2];
    assert_eq!(ct_add_1(&mut result, &[!0, 1], 1), 0);
    assert_eq!(result, [0, 2]);

    assert_eq!(ct_add_1(&mut result, &[!0, !0], 1), 1);
    assert_eq!(result, [0, 0]);

    assert_eq!(ct_add_1(&mut result, &[!1, !0], 1), 0);
    assert_eq!(result, [!0, !0]);

    // A longer result buffer gets written to only up to the operand's length.
    let mut result = [7 as LimbType; 3];
    assert_eq!(ct_add_1(&mut result, &[1, 2], 3), 0);
    assert_eq!(result, [4, 2, 7]);

    let mut op0 = [!0, !0, 5];
    assert_eq!(ct_add_1_assign(&mut op0, 2), 0);
    assert_eq!(op0, [1, 0, 6]);
}

/// Subtract a limb from a multiprecision integer.
///
/// Stores `op0 - op1` modulo `B^op0.len()` in `result` and returns the borrow out of the most
/// significant limb. A non-zero borrow indicates that `op0 < op1` in value, in which case `result`
/// holds the two's complement wrapped difference.
///
/// Runs in constant time for a given operand length.
///
/// # Arguments:
///
/// * `result` - Receives the difference in its `op0.len()` least significant limbs. Must be at
///   least as long as `op0`.
/// * `op0` - The multiprecision integer minuend.
/// * `op1` - The single limb subtrahend.
pub fn ct_sub_1(result: &mut [LimbType], op0: &[LimbType], op1: LimbType) -> LimbType {
    debug_assert!(result.len() >= op0.len());
    let result = &mut result[..op0.len()];
    let mut borrow = op1;
    for (result_val, op0_val) in result.iter_mut().zip(op0.iter()) {
        (borrow, *result_val) = ct_sub_l_l(*op0_val, borrow);
    }
    borrow
}

/// Subtract a limb from a multiprecision integer in place.
///
/// Same as [`ct_sub_1()`], but with the result replacing `op0`.
pub fn ct_sub_1_assign(op0: &mut [LimbType], op1: LimbType) -> LimbType {
    let mut borrow = op1;
    for op0_val in op0.iter_mut() {
        (borrow, *op0_val) = ct_sub_l_l(*op0_val, borrow);
    }
    borrow
}

#[test]
fn test_ct_sub_1() {
    let mut result = [0 as LimbType; 0];
    assert_eq!(ct_sub_1(&mut result, &[], 5), 5);

    let mut result = [0 as LimbType; 2];
    assert_eq!(ct_sub_1(&mut result, &[0, 2], 1), 0);
    assert_eq!(result, [!0, 1]);

    assert_eq!(ct_sub_1(&mut result, &[0, 0], 1), 1);
    assert_eq!(result, [!0, !0]);

    assert_eq!(ct_sub_1(&mut result, &[5, 0], 5), 0);
    assert_eq!(result, [0, 0]);

    let mut op0 = [1, 0, 6];
    assert_eq!(ct_sub_1_assign(&mut op0, 2), 0);
    assert_eq!(op0, [!0, !0, 5]);
}

/// Add two multiprecision integers of equal length.
///
/// Stores `op0 + op1` truncated to `op0.len()` limbs in `result` and returns the carry.
///
/// Runs in constant time for a given operand length.
///
/// # Arguments:
///
/// * `result` - Receives the sum. Must be at least as long as `op0`.
/// * `op0` - The first addend.
/// * `op1` - The second addend, its length must equal that of `op0`.
pub fn ct_add_n(result: &mut [LimbType], op0: &[LimbType], op1: &[LimbType]) -> LimbType {
    debug_assert_eq!(op0.len(), op1.len());
    debug_assert!(result.len() >= op0.len());
    let result = &mut result[..op0.len()];
    let mut carry = 0;
    for ((result_val, op0_val), op1_val) in result.iter_mut().zip(op0.iter()).zip(op1.iter()) {
        (carry, *result_val) = ct_add_l_l_c(*op0_val, *op1_val, carry);
    }
    carry
}

/// Add a multiprecision integer to another one of equal length in place.
pub fn ct_add_n_assign(op0: &mut [LimbType], op1: &[LimbType]) -> LimbType {
    ct_add_n_cond_assign(op0, op1, LimbChoice::from(1))
}

/// Subtract two multiprecision integers of equal length.
///
/// Stores `op0 - op1` modulo `B^op0.len()` in `result` and returns the borrow.
///
/// Runs in constant time for a given operand length.
pub fn ct_sub_n(result: &mut [LimbType], op0: &[LimbType], op1: &[LimbType]) -> LimbType {
    debug_assert_eq!(op0.len(), op1.len());
    debug_assert!(result.len() >= op0.len());
    let result = &mut result[..op0.len()];
    let mut borrow = 0;
    for ((result_val, op0_val), op1_val) in result.iter_mut().zip(op0.iter()).zip(op1.iter()) {
        (borrow, *result_val) = ct_sub_l_l_b(*op0_val, *op1_val, borrow);
    }
    borrow
}

/// Subtract a multiprecision integer from another one of equal length in place.
pub fn ct_sub_n_assign(op0: &mut [LimbType], op1: &[LimbType]) -> LimbType {
    ct_sub_n_cond_assign(op0, op1, LimbChoice::from(1))
}

/// Conditionally add two multiprecision integers of equal length in place.
///
/// If `cond` is set, `op0` gets replaced by `op0 + op1` and the carry gets returned. Otherwise
/// `op0` is left unmodified and zero is returned.
///
/// Runs in constant time for a given operand length, i.e. execution time depends only on the
/// integers' lengths, but not their values and neither on `cond`.
pub fn ct_add_n_cond_assign(op0: &mut [LimbType], op1: &[LimbType], cond: LimbChoice) -> LimbType {
    debug_assert_eq!(op0.len(), op1.len());
    let mut carry = 0;
    for (op0_val, op1_val) in op0.iter_mut().zip(op1.iter()) {
        let op1_val = cond.select(0, *op1_val);
        (carry, *op0_val) = ct_add_l_l_c(*op0_val, op1_val, carry);
    }
    carry
}

/// Conditionally subtract two multiprecision integers of equal length in place.
///
/// If `cond` is set, `op0` gets replaced by `op0 - op1` and the borrow gets returned. Otherwise
/// `op0` is left unmodified and zero is returned.
///
/// Runs in constant time for a given operand length, i.e. execution time depends only on the
/// integers' lengths, but not their values and neither on `cond`.
pub fn ct_sub_n_cond_assign(op0: &mut [LimbType], op1: &[LimbType], cond: LimbChoice) -> LimbType {
    debug_assert_eq!(op0.len(), op1.len());
    let mut borrow = 0;
    for (op0_val, op1_val) in op0.iter_mut().zip(op1.iter()) {
        let op1_val = cond.select(0, *op1_val);
        (borrow, *op0_val) = ct_sub_l_l_b(*op0_val, op1_val, borrow);
    }
    borrow
}

#[test]
fn test_ct_add_n_sub_n() {
    let op0 = [!0, !0];
    let op1 = [1, 0];
    let mut result = [0 as LimbType; 2];
    assert_eq!(ct_add_n(&mut result, &op0, &op1), 1);
    assert_eq!(result, [0, 0]);
    assert_eq!(ct_sub_n(&mut result, &[0, 0], &op1), 1);
    assert_eq!(result, [!0, !0]);

    let op0 = [!0, 1];
    let op1 = [!0, 1];
    assert_eq!(ct_add_n(&mut result, &op0, &op1), 0);
    assert_eq!(result, [!1, 3]);
    assert_eq!(ct_sub_n(&mut result, &[!1, 3], &op1), 0);
    assert_eq!(result, op0);

    assert_eq!(ct_add_n(&mut [], &[], &[]), 0);
    assert_eq!(ct_sub_n(&mut [], &[], &[]), 0);
}

#[test]
fn test_ct_add_sub_n_cond_assign() {
    let mut op0 = [!0, !0];
    let op1 = [!0, !0];
    assert_eq!(ct_add_n_cond_assign(&mut op0, &op1, LimbChoice::from(0)), 0);
    assert_eq!(op0, [!0, !0]);
    assert_eq!(ct_add_n_cond_assign(&mut op0, &op1, LimbChoice::from(1)), 1);
    assert_eq!(op0, [!1, !0]);

    let mut op0 = [!1, 0];
    let op1 = [!0, 1];
    assert_eq!(ct_sub_n_cond_assign(&mut op0, &op1, LimbChoice::from(0)), 0);
    assert_eq!(op0, [!1, 0]);
    assert_eq!(ct_sub_n_cond_assign(&mut op0, &op1, LimbChoice::from(1)), 1);
    assert_eq!(op0, [!0, !1]);

    let mut op0 = [!1, 1];
    assert_eq!(ct_sub_n_assign(&mut op0, &[!0, 0]), 0);
    assert_eq!(op0, [!0, 0]);
    assert_eq!(ct_add_n_assign(&mut op0, &[1, 0]), 0);
    assert_eq!(op0, [0, 1]);
}

/// Add two multiprecision integers of possibly different lengths.
///
/// Stores `op0 + op1` truncated to `op0.len()` limbs in `result` and returns the carry. The
/// common low part gets added with [`ct_add_n()`], the carry from there gets propagated through
/// the remaining high limbs of `op0` with [`ct_add_1()`].
///
/// Runs in constant time for a given configuration of operand lengths.
///
/// # Arguments:
///
/// * `result` - Receives the sum. Must be at least as long as `op0`.
/// * `op0` - The first addend.
/// * `op1` - The second addend, not longer than `op0`.
pub fn ct_add(result: &mut [LimbType], op0: &[LimbType], op1: &[LimbType]) -> LimbType {
    debug_assert!(op1.len() <= op0.len());
    let (op0_low, op0_high) = op0.split_at(op1.len());
    let (result_low, result_high) = result[..op0.len()].split_at_mut(op1.len());
    let carry = ct_add_n(result_low, op0_low, op1);
    ct_add_1(result_high, op0_high, carry)
}

/// Add a multiprecision integer to a possibly longer one in place.
pub fn ct_add_assign(op0: &mut [LimbType], op1: &[LimbType]) -> LimbType {
    debug_assert!(op1.len() <= op0.len());
    let (op0_low, op0_high) = op0.split_at_mut(op1.len());
    let carry = ct_add_n_assign(op0_low, op1);
    ct_add_1_assign(op0_high, carry)
}

/// Subtract two multiprecision integers of possibly different lengths.
///
/// Stores `op0 - op1` modulo `B^op0.len()` in `result` and returns the borrow, composed from
/// [`ct_sub_n()`] and [`ct_sub_1()`] like [`ct_add()`].
///
/// Runs in constant time for a given configuration of operand lengths.
pub fn ct_sub(result: &mut [LimbType], op0: &[LimbType], op1: &[LimbType]) -> LimbType {
    debug_assert!(op1.len() <= op0.len());
    let (op0_low, op0_high) = op0.split_at(op1.len());
    let (result_low, result_high) = result[..op0.len()].split_at_mut(op1.len());
    let borrow = ct_sub_n(result_low, op0_low, op1);
    ct_sub_1(result_high, op0_high, borrow)
}

/// Subtract a multiprecision integer from a possibly longer one in place.
pub fn ct_sub_assign(op0: &mut [LimbType], op1: &[LimbType]) -> LimbType {
    debug_assert!(op1.len() <= op0.len());
    let (op0_low, op0_high) = op0.split_at_mut(op1.len());
    let borrow = ct_sub_n_assign(op0_low, op1);
    ct_sub_1_assign(op0_high, borrow)
}

#[test]
fn test_ct_add_sub_mixed_lengths() {
    let mut result = [0 as LimbType; 3];
    assert_eq!(ct_add(&mut result, &[!0, !0, 1], &[1]), 0);
    assert_eq!(result, [0, 0, 2]);
    assert_eq!(ct_add(&mut result, &[!0, !0, !0], &[1, 0]), 1);
    assert_eq!(result, [0, 0, 0]);
    assert_eq!(ct_add(&mut result, &[3, 4, 5], &[]), 0);
    assert_eq!(result, [3, 4, 5]);

    assert_eq!(ct_sub(&mut result, &[0, 0, 2], &[1]), 0);
    assert_eq!(result, [!0, !0, 1]);
    assert_eq!(ct_sub(&mut result, &[0, 0, 0], &[0, 1]), 1);
    assert_eq!(result, [0, !0, !0]);

    let mut op0 = [!0, !0, 1];
    assert_eq!(ct_add_assign(&mut op0, &[1, 1]), 0);
    assert_eq!(op0, [0, 1, 2]);
    assert_eq!(ct_sub_assign(&mut op0, &[1, 1]), 0);
    assert_eq!(op0, [!0, !0, 1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{
        biguint_to_limbs, limb_strategy, limbs_pair_strategy, limbs_strategy, limbs_to_biguint,
        radix_pow,
    };
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn add_1_matches_reference(op0 in limbs_strategy(8), op1 in limb_strategy()) {
            let mut result = vec![0; op0.len()];
            let carry = ct_add_1(&mut result, &op0, op1);
            let mut full = result.clone();
            full.push(carry);
            // With an empty operand, the addend comes back out verbatim as the carry.
            let expected = limbs_to_biguint(&op0) + limbs_to_biguint(&[op1]);
            prop_assert_eq!(limbs_to_biguint(&full), expected);

            let mut in_place = op0.clone();
            prop_assert_eq!(ct_add_1_assign(&mut in_place, op1), carry);
            prop_assert_eq!(in_place, result);
        }

        #[test]
        fn add_1_and_sub_1_are_mutual_inverses(op0 in limbs_strategy(8), op1 in limb_strategy()) {
            let mut sum = vec![0; op0.len()];
            let carry = ct_add_1(&mut sum, &op0, op1);
            let mut diff = vec![0; op0.len()];
            let borrow = ct_sub_1(&mut diff, &sum, op1);
            prop_assert_eq!(&diff, &op0);
            // Whatever has been carried out at the top must get borrowed back in.
            prop_assert_eq!(borrow, carry);
        }

        #[test]
        fn sub_1_borrows_iff_less(op0 in limbs_strategy(4), op1 in limb_strategy()) {
            let mut result = vec![0; op0.len()];
            let borrow = ct_sub_1(&mut result, &op0, op1);
            let op0_val = limbs_to_biguint(&op0);
            let op1_val = limbs_to_biguint(&[op1]);
            if op0.is_empty() {
                prop_assert_eq!(borrow, op1);
            } else if op0_val >= op1_val {
                prop_assert_eq!(borrow, 0);
                prop_assert_eq!(limbs_to_biguint(&result), op0_val - op1_val);
            } else {
                prop_assert_eq!(borrow, 1);
                let wrapped = radix_pow(op0.len()) + op0_val - op1_val;
                prop_assert_eq!(limbs_to_biguint(&result), wrapped);
            }
        }

        #[test]
        fn add_n_sub_n_match_reference((op0, op1) in limbs_pair_strategy(8)) {
            let n = op0.len();
            let mut sum = vec![0; n];
            let carry = ct_add_n(&mut sum, &op0, &op1);
            let expected = limbs_to_biguint(&op0) + limbs_to_biguint(&op1);
            prop_assert_eq!(&sum, &biguint_to_limbs(&(&expected % radix_pow(n)), n));
            prop_assert_eq!(carry as usize, (expected >= radix_pow(n)) as usize);

            let mut diff = vec![0; n];
            let borrow = ct_sub_n(&mut diff, &sum, &op1);
            prop_assert_eq!(&diff, &op0);
            prop_assert_eq!(borrow, carry);
        }

        #[test]
        fn add_sub_mixed_match_reference(
            (op0, op1) in limbs_pair_strategy(6),
            extra in limbs_strategy(4),
        ) {
            let mut op0 = op0;
            op0.extend_from_slice(&extra);
            let m = op0.len();
            let mut sum = vec![0; m];
            let carry = ct_add(&mut sum, &op0, &op1);
            let mut full = sum.clone();
            full.push(carry);
            prop_assert_eq!(
                limbs_to_biguint(&full),
                limbs_to_biguint(&op0) + limbs_to_biguint(&op1)
            );

            let mut in_place = op0.clone();
            prop_assert_eq!(ct_add_assign(&mut in_place, &op1), carry);
            prop_assert_eq!(&in_place, &sum);
            prop_assert_eq!(ct_sub_assign(&mut in_place, &op1), carry);
            prop_assert_eq!(&in_place, &op0);
        }
    }
}
