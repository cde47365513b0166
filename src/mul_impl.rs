// SPDX-License-Identifier: Apache-2.0

//! Implementation of multiprecision integer multiplication primitives.
//!
//! The single limb routines, [`ct_mul_1()`], [`ct_addmul_1()`] and [`ct_submul_1()`], are the
//! building blocks the full schoolbook multiplication [`ct_mul()`] and the squaring [`ct_sqr()`]
//! are composed of. Products are never truncated: the caller provides a result buffer of
//! `op0.len() + op1.len()` limbs and normalizes a potential leading zero limb afterwards.

use super::limb::{
    ct_add_dl_l, ct_add_l_l_c, ct_mul_add_l_l_l_c, ct_mul_l_l, ct_mul_sub_l_l_l_b, LimbType,
};
use super::shift_impl::ct_lshift_assign;

/// Multiply a multiprecision integer by a limb.
///
/// Stores `op0 * op1` truncated to `op0.len()` limbs in `result` and returns the limb that
/// overflowed past the top, i.e. the most significant limb of the full product.
///
/// Each step computes the double limb product of one limb from `op0` with `op1` and folds the
/// running carry into it. The carry propagates from the least to the most significant limb.
///
/// Runs in constant time for a given operand length. In particular, a zero `op1` doesn't
/// short-circuit anything.
///
/// # Arguments:
///
/// * `result` - Receives the product in its `op0.len()` least significant limbs. Must be at least
///   as long as `op0`.
/// * `op0` - The multiprecision integer factor.
/// * `op1` - The single limb factor.
pub fn ct_mul_1(result: &mut [LimbType], op0: &[LimbType], op1: LimbType) -> LimbType {
    debug_assert!(result.len() >= op0.len());
    let result = &mut result[..op0.len()];
    let mut carry = 0;
    for (result_val, op0_val) in result.iter_mut().zip(op0.iter()) {
        let prod = ct_mul_l_l(*op0_val, op1);
        (carry, *result_val) = ct_add_dl_l(prod, carry);
    }
    carry
}

/// Multiply a multiprecision integer by a limb in place.
///
/// Same as [`ct_mul_1()`], but with the result replacing `op0`.
pub fn ct_mul_1_assign(op0: &mut [LimbType], op1: LimbType) -> LimbType {
    let mut carry = 0;
    for op0_val in op0.iter_mut() {
        let prod = ct_mul_l_l(*op0_val, op1);
        (carry, *op0_val) = ct_add_dl_l(prod, carry);
    }
    carry
}

#[test]
fn test_ct_mul_1() {
    let mut result = [0 as LimbType; 1];
    assert_eq!(ct_mul_1(&mut result, &[!0], 2), 1);
    assert_eq!(result, [!1]);

    let mut result = [0 as LimbType; 2];
    assert_eq!(ct_mul_1(&mut result, &[0, 1], 2), 0);
    assert_eq!(result, [0, 2]);

    assert_eq!(ct_mul_1(&mut result, &[!0, !0], !0), !1);
    assert_eq!(result, [1, !0]);

    // An empty operand doesn't touch the result at all.
    let mut result = [5 as LimbType; 1];
    assert_eq!(ct_mul_1(&mut result, &[], !0), 0);
    assert_eq!(result, [5]);

    let mut op0 = [!0, 0, 3];
    assert_eq!(ct_mul_1_assign(&mut op0, 2), 0);
    assert_eq!(op0, [!1, 1, 6]);
}

#[cfg(any(feature = "force_u32_limbs", not(target_arch = "x86_64")))]
#[test]
fn test_ct_mul_1_u32_vectors() {
    let mut result = [0u32; 1];
    assert_eq!(ct_mul_1(&mut result, &[0xffffffff], 0x00000002), 1);
    assert_eq!(result, [0xfffffffe]);

    let mut result = [0u32; 2];
    assert_eq!(ct_mul_1(&mut result, &[0x00000000, 0x00000001], 0x00000002), 0);
    assert_eq!(result, [0x00000000, 0x00000002]);
}

#[test]
fn test_ct_mul_1_by_zero_and_one() {
    for n in 0..5 {
        let op0: Vec<LimbType> = (0..n).map(|i| !(i as LimbType)).collect();

        let mut result = vec![!0 as LimbType; n];
        assert_eq!(ct_mul_1(&mut result, &op0, 0), 0);
        assert!(result.iter().all(|v| *v == 0));

        let mut result = vec![0 as LimbType; n];
        assert_eq!(ct_mul_1(&mut result, &op0, 1), 0);
        assert_eq!(result, op0);
    }
}

/// Multiply a multiprecision integer by a limb and add the product to another one.
///
/// Replaces the `op0.len()` least significant limbs of `result` by `result + op0 * op1`, truncated
/// to that length, and returns the carry limb.
///
/// Runs in constant time for a given operand length.
///
/// # Arguments:
///
/// * `result` - The accumulator. Only its `op0.len()` least significant limbs participate and it
///   must be at least as long as `op0`.
/// * `op0` - The multiprecision integer factor.
/// * `op1` - The single limb factor.
pub fn ct_addmul_1(result: &mut [LimbType], op0: &[LimbType], op1: LimbType) -> LimbType {
    debug_assert!(result.len() >= op0.len());
    let result = &mut result[..op0.len()];
    let mut carry = 0;
    for (result_val, op0_val) in result.iter_mut().zip(op0.iter()) {
        (carry, *result_val) = ct_mul_add_l_l_l_c(*result_val, *op0_val, op1, carry);
    }
    carry
}

/// Multiply a multiprecision integer by a limb and subtract the product from another one.
///
/// Replaces the `op0.len()` least significant limbs of `result` by `result - op0 * op1` modulo
/// `B^op0.len()` and returns the limb to be borrowed from above.
///
/// Runs in constant time for a given operand length.
pub fn ct_submul_1(result: &mut [LimbType], op0: &[LimbType], op1: LimbType) -> LimbType {
    debug_assert!(result.len() >= op0.len());
    let result = &mut result[..op0.len()];
    let mut borrow = 0;
    for (result_val, op0_val) in result.iter_mut().zip(op0.iter()) {
        (borrow, *result_val) = ct_mul_sub_l_l_l_b(*result_val, *op0_val, op1, borrow);
    }
    borrow
}

#[test]
fn test_ct_addmul_1_submul_1() {
    let mut result = [!0, !0, 7];
    assert_eq!(ct_addmul_1(&mut result, &[1, 0], 1), 1);
    assert_eq!(result, [0, 0, 7]);

    let mut result = [!0, !0];
    assert_eq!(ct_addmul_1(&mut result, &[!0, !0], !0), !0);
    // (B^2 - 1) + (B^2 - 1) * (B - 1) = (B^2 - 1) * B = (B - 1) * B^2 + (B - 1) * B
    assert_eq!(result, [0, !0]);

    assert_eq!(ct_submul_1(&mut result, &[!0, !0], !0), !0);
    assert_eq!(result, [!0, !0]);

    let mut result = [3, 0];
    assert_eq!(ct_submul_1(&mut result, &[2, 0], 2), 1);
    assert_eq!(result, [!0, !0]);
}

/// Multiply two multiprecision integers.
///
/// Stores the full, untruncated product of `op0` and `op1` in the `op0.len() + op1.len()` least
/// significant limbs of `result`. The longer operand gets scanned with [`ct_mul_1()`] for the
/// least significant limb of the shorter one first, then with [`ct_addmul_1()`] for each of the
/// remaining limbs, with the overflow limb of each pass landing right above the pass' window.
/// If either operand is empty, the result is zero.
///
/// The product's most significant limb can be zero, it's up to the caller to normalize.
///
/// Runs in constant time for a given configuration of operand lengths, i.e. execution time depends
/// only on the integers' lengths, but not their values.
///
/// # Arguments
///
/// * `result` - Receives the product. Must be at least `op0.len() + op1.len()` limbs long.
/// * `op0` - The first factor.
/// * `op1` - The second factor.
pub fn ct_mul(result: &mut [LimbType], op0: &[LimbType], op1: &[LimbType]) {
    // The lengths are not secret, let op0 be the longer one.
    let (op0, op1) = if op0.len() >= op1.len() {
        (op0, op1)
    } else {
        (op1, op0)
    };
    let op0_nlimbs = op0.len();
    let op1_nlimbs = op1.len();
    debug_assert!(result.len() >= op0_nlimbs + op1_nlimbs);
    let result = &mut result[..op0_nlimbs + op1_nlimbs];

    if op1_nlimbs == 0 {
        result.fill(0);
        return;
    }

    let carry = ct_mul_1(&mut result[..op0_nlimbs], op0, op1[0]);
    result[op0_nlimbs] = carry;
    for j in 1..op1_nlimbs {
        let carry = ct_addmul_1(&mut result[j..j + op0_nlimbs], op0, op1[j]);
        result[j + op0_nlimbs] = carry;
    }
}

#[test]
fn test_ct_mul() {
    let mut result = [0 as LimbType; 4];
    ct_mul(&mut result, &[!0, !0], &[!0, !0]);
    assert_eq!(result, [1, 0, !1, !0]);

    let mut result = [!0 as LimbType; 3];
    ct_mul(&mut result, &[!0], &[0, 1]);
    assert_eq!(result, [0, !0, 0]);
    let mut result = [!0 as LimbType; 3];
    ct_mul(&mut result, &[0, 1], &[!0]);
    assert_eq!(result, [0, !0, 0]);

    let mut result = [!0 as LimbType; 3];
    ct_mul(&mut result, &[1, 2, 3], &[]);
    assert_eq!(result, [0, 0, 0]);

    // Only the low op0.len() + op1.len() limbs get written.
    let mut result = [7 as LimbType; 3];
    ct_mul(&mut result, &[2], &[3]);
    assert_eq!(result, [6, 0, 7]);
}

/// Multiply two multiprecision integers of equal length.
///
/// Like [`ct_mul()`], but for operands of equal length. If both operands refer to the very same
/// limbs, the computation gets dispatched to [`ct_sqr()`].
pub fn ct_mul_n(result: &mut [LimbType], op0: &[LimbType], op1: &[LimbType]) {
    debug_assert_eq!(op0.len(), op1.len());
    if core::ptr::eq(op0, op1) {
        ct_sqr(result, op0);
    } else {
        ct_mul(result, op0, op1);
    }
}

/// Square a multiprecision integer.
///
/// Stores the full square of `op0` in the `2 * op0.len()` least significant limbs of `result`.
/// With `u = Σ u[i] B^i`, the square expands to `Σ u[i]^2 B^(2i) + 2 Σ_{i<j} u[i] u[j] B^(i+j)`.
/// The off-diagonal sum is accumulated first, row by row with [`ct_addmul_1()`], then doubled by a
/// single bit shift and finally, the diagonal squares get added in one carry chain. This needs
/// about half of the limb multiplications [`ct_mul()`] would, with a bit-identical result.
///
/// Runs in constant time for a given operand length.
///
/// # Arguments
///
/// * `result` - Receives the square. Must be at least `2 * op0.len()` limbs long.
/// * `op0` - The operand to square.
pub fn ct_sqr(result: &mut [LimbType], op0: &[LimbType]) {
    let nlimbs = op0.len();
    debug_assert!(result.len() >= 2 * nlimbs);
    let result = &mut result[..2 * nlimbs];
    result.fill(0);

    // Row i accumulates u[i] * u[i+1..] into the window starting at position 2i + 1. Its carry
    // lands at position i + n, which none of the preceding rows has reached yet.
    for i in 0..nlimbs {
        let carry = ct_addmul_1(&mut result[2 * i + 1..i + nlimbs], &op0[i + 1..], op0[i]);
        result[i + nlimbs] = carry;
    }

    // The doubled off-diagonal sum is less than the square, which fits.
    let shifted_out = ct_lshift_assign(result, 1);
    debug_assert_eq!(shifted_out, 0);

    let mut carry = 0;
    for (result_pair, op0_val) in result.chunks_exact_mut(2).zip(op0.iter()) {
        let prod = ct_mul_l_l(*op0_val, *op0_val);
        (carry, result_pair[0]) = ct_add_l_l_c(result_pair[0], prod.low(), carry);
        (carry, result_pair[1]) = ct_add_l_l_c(result_pair[1], prod.high(), carry);
    }
    debug_assert_eq!(carry, 0);
}

#[test]
fn test_ct_sqr() {
    let mut result = [0 as LimbType; 4];
    ct_sqr(&mut result, &[!0, !0]);
    assert_eq!(result, [1, 0, !1, !0]);

    let mut result = [!0 as LimbType; 2];
    ct_sqr(&mut result, &[!0]);
    assert_eq!(result, [1, !1]);

    let mut result = [0 as LimbType; 6];
    ct_sqr(&mut result, &[0, 0, 1]);
    assert_eq!(result, [0, 0, 0, 0, 1, 0]);

    let mut result = [5 as LimbType; 1];
    ct_sqr(&mut result, &[]);
    assert_eq!(result, [5]);

    let op0 = [3, !0, 1];
    let mut result = [0 as LimbType; 6];
    ct_mul_n(&mut result, &op0, &op0);
    let mut expected = [0 as LimbType; 6];
    ct_mul(&mut expected, &op0, &[3, !0, 1]);
    assert_eq!(result, expected);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{
        limb_strategy, limbs_pair_strategy, limbs_strategy, limbs_to_biguint, radix_pow,
    };
    use num_bigint::BigUint;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn mul_1_satisfies_product_identity(op0 in limbs_strategy(8), op1 in limb_strategy()) {
            let n = op0.len();
            let mut result = vec![0; n];
            let carry = ct_mul_1(&mut result, &op0, op1);
            // carry * B^n + value(result) == value(op0) * op1
            let lhs = BigUint::from(carry) * radix_pow(n) + limbs_to_biguint(&result);
            prop_assert_eq!(lhs, limbs_to_biguint(&op0) * BigUint::from(op1));

            let mut in_place = op0.clone();
            prop_assert_eq!(ct_mul_1_assign(&mut in_place, op1), carry);
            prop_assert_eq!(in_place, result);
        }

        #[test]
        fn addmul_1_satisfies_product_identity(
            (acc, op0) in limbs_pair_strategy(8),
            op1 in limb_strategy(),
        ) {
            let n = op0.len();
            let mut result = acc.clone();
            let carry = ct_addmul_1(&mut result, &op0, op1);
            let lhs = BigUint::from(carry) * radix_pow(n) + limbs_to_biguint(&result);
            let rhs = limbs_to_biguint(&acc) + limbs_to_biguint(&op0) * BigUint::from(op1);
            prop_assert_eq!(lhs, rhs);

            // Subtracting the very same product again restores the accumulator and borrows back
            // exactly what has been carried out.
            let borrow = ct_submul_1(&mut result, &op0, op1);
            prop_assert_eq!(&result, &acc);
            prop_assert_eq!(borrow, carry);
        }

        #[test]
        fn mul_matches_reference_and_commutes(op0 in limbs_strategy(8), op1 in limbs_strategy(8)) {
            let nlimbs = op0.len() + op1.len();
            let mut result = vec![!0; nlimbs];
            ct_mul(&mut result, &op0, &op1);
            let expected = limbs_to_biguint(&op0) * limbs_to_biguint(&op1);
            prop_assert_eq!(limbs_to_biguint(&result), expected);

            let mut swapped = vec![0; nlimbs];
            ct_mul(&mut swapped, &op1, &op0);
            prop_assert_eq!(swapped, result);
        }

        #[test]
        fn product_divided_by_factor_recovers_other(
            op0 in limbs_strategy(6),
            op1 in limbs_strategy(6),
        ) {
            let mut result = vec![0; op0.len() + op1.len()];
            ct_mul(&mut result, &op0, &op1);
            let prod = limbs_to_biguint(&result);
            let op0_val = limbs_to_biguint(&op0);
            let op1_val = limbs_to_biguint(&op1);
            let zero = BigUint::default();
            if op0_val != zero {
                prop_assert_eq!(&prod / &op0_val, op1_val.clone());
                prop_assert_eq!(&prod % &op0_val, zero.clone());
            }
            if op1_val != zero {
                prop_assert_eq!(&prod / &op1_val, op0_val);
            }
        }

        #[test]
        fn sqr_is_bit_identical_to_mul(op0 in limbs_strategy(10)) {
            let mut square = vec![!0; 2 * op0.len()];
            ct_sqr(&mut square, &op0);
            let mut prod = vec![0; 2 * op0.len()];
            ct_mul(&mut prod, &op0, &op0.clone());
            prop_assert_eq!(&square, &prod);

            let mut dispatched = vec![0; 2 * op0.len()];
            ct_mul_n(&mut dispatched, &op0, &op0);
            prop_assert_eq!(&dispatched, &prod);
        }

        #[test]
        fn mul_n_matches_mul((op0, op1) in limbs_pair_strategy(8)) {
            let mut result = vec![0; 2 * op0.len()];
            ct_mul_n(&mut result, &op0, &op1);
            let mut expected = vec![0; 2 * op0.len()];
            ct_mul(&mut expected, &op0, &op1);
            prop_assert_eq!(result, expected);
        }
    }
}
