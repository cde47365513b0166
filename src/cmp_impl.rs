// SPDX-License-Identifier: Apache-2.0

//! Implementation of multiprecision integer comparison primitives.

use super::limb::{ct_eq_l_l, ct_gt_l_l, ct_is_zero_l, ct_lt_l_l, ct_neq_l_l, LimbChoice, LimbType};
use core::cmp;

// Scan from the most significant limb downwards. Once a difference has been found, is_eq stays
// unset and subsequent limbs cannot influence is_lt anymore.
fn ct_lt_eq_n(op0: &[LimbType], op1: &[LimbType]) -> (LimbChoice, LimbChoice) {
    debug_assert_eq!(op0.len(), op1.len());
    let mut is_eq = LimbChoice::from(1);
    let mut is_lt = LimbChoice::from(0);
    for (op0_val, op1_val) in op0.iter().zip(op1.iter()).rev() {
        is_lt |= is_eq & ct_lt_l_l(*op0_val, *op1_val);
        is_eq &= ct_eq_l_l(*op0_val, *op1_val);
    }
    (is_lt, is_eq)
}

/// Compare two multiprecision integers of equal length for `==`.
pub fn ct_eq_n(op0: &[LimbType], op1: &[LimbType]) -> LimbChoice {
    debug_assert_eq!(op0.len(), op1.len());
    let mut is_eq = LimbChoice::from(1);
    for (op0_val, op1_val) in op0.iter().zip(op1.iter()) {
        is_eq &= ct_eq_l_l(*op0_val, *op1_val);
    }
    is_eq
}

/// Compare two multiprecision integers of equal length for `<`.
pub fn ct_lt_n(op0: &[LimbType], op1: &[LimbType]) -> LimbChoice {
    let (is_lt, _) = ct_lt_eq_n(op0, op1);
    is_lt
}

/// Compare two multiprecision integers of equal length for `<=`.
pub fn ct_leq_n(op0: &[LimbType], op1: &[LimbType]) -> LimbChoice {
    let (is_lt, is_eq) = ct_lt_eq_n(op0, op1);
    is_lt | is_eq
}

/// Compare two multiprecision integers of equal length for `>`.
pub fn ct_gt_n(op0: &[LimbType], op1: &[LimbType]) -> LimbChoice {
    ct_lt_n(op1, op0)
}

/// Compare two multiprecision integers of equal length for `>=`.
pub fn ct_geq_n(op0: &[LimbType], op1: &[LimbType]) -> LimbChoice {
    ct_leq_n(op1, op0)
}

/// Test whether a multiprecision integer is zero. The empty integer is.
pub fn ct_is_zero_n(op0: &[LimbType]) -> LimbChoice {
    let mut acc = 0;
    for op0_val in op0.iter() {
        acc |= *op0_val;
    }
    LimbChoice::from(ct_is_zero_l(acc))
}

/// Three-way comparison of two multiprecision integers of equal length.
///
/// Evaluates to `-1`, `0` or `1` if `op0` is less than, equal to or greater than `op1`
/// respectively. The operands' values don't influence the execution time, only their length
/// does.
///
/// # Arguments
///
/// * `op0` - The first operand.
/// * `op1` - The second operand, of the same length as `op0`.
pub fn ct_cmp_n(op0: &[LimbType], op1: &[LimbType]) -> i32 {
    let (is_lt, is_eq) = ct_lt_eq_n(op0, op1);
    let is_gt = !(is_lt | is_eq);
    is_gt.unwrap() as i32 - is_lt.unwrap() as i32
}

#[test]
fn test_ct_cmp_n() {
    assert_eq!(ct_cmp_n(&[], &[]), 0);
    assert_eq!(ct_cmp_n(&[1, 2], &[1, 2]), 0);
    assert_eq!(ct_cmp_n(&[!0, 1], &[0, 2]), -1);
    assert_eq!(ct_cmp_n(&[0, 2], &[!0, 1]), 1);
    assert_eq!(ct_cmp_n(&[2, 7], &[1, 7]), 1);

    assert_eq!(ct_eq_n(&[1, 2], &[1, 2]).unwrap(), 1);
    assert_eq!(ct_eq_n(&[1, 2], &[2, 1]).unwrap(), 0);
    assert_eq!(ct_lt_n(&[!0, 1], &[0, 2]).unwrap(), 1);
    assert_eq!(ct_lt_n(&[0, 2], &[0, 2]).unwrap(), 0);
    assert_eq!(ct_leq_n(&[0, 2], &[0, 2]).unwrap(), 1);
    assert_eq!(ct_leq_n(&[1, 2], &[0, 2]).unwrap(), 0);
    assert_eq!(ct_gt_n(&[1, 2], &[0, 2]).unwrap(), 1);
    assert_eq!(ct_geq_n(&[0, 1], &[0, 2]).unwrap(), 0);
    assert_eq!(ct_geq_n(&[], &[]).unwrap(), 1);

    assert_eq!(ct_is_zero_n(&[]).unwrap(), 1);
    assert_eq!(ct_is_zero_n(&[0, 0]).unwrap(), 1);
    assert_eq!(ct_is_zero_n(&[0, 1 << (LimbType::BITS - 1)]).unwrap(), 0);
}

/// Compare a multiprecision integer against a single limb.
///
/// Evaluates to `-1`, `0` or `1` if `op0` is less than, equal to or greater than `op1`
/// respectively. An empty `op0` compares as zero.
pub fn ct_cmp_l(op0: &[LimbType], op1: LimbType) -> i32 {
    let (op0_low, op0_high) = match op0.split_first() {
        Some((op0_low, op0_high)) => (*op0_low, op0_high),
        None => (0, op0),
    };
    let high_is_zero = ct_is_zero_n(op0_high);
    let is_lt = high_is_zero & ct_lt_l_l(op0_low, op1);
    let is_gt = !high_is_zero | ct_gt_l_l(op0_low, op1);
    is_gt.unwrap() as i32 - is_lt.unwrap() as i32
}

#[test]
fn test_ct_cmp_l() {
    assert_eq!(ct_cmp_l(&[], 0), 0);
    assert_eq!(ct_cmp_l(&[], 1), -1);
    assert_eq!(ct_cmp_l(&[5], 5), 0);
    assert_eq!(ct_cmp_l(&[4], 5), -1);
    assert_eq!(ct_cmp_l(&[5, 0], 4), 1);
    assert_eq!(ct_cmp_l(&[0, 1], !0), 1);
    assert_eq!(ct_cmp_l(&[!1, 0, 0], !0), -1);
}

/// Compare two normalized multiprecision integers.
///
/// For normalized operands, a longer one is always greater in value. The lengths are considered
/// public and get compared first, with a possible early return. Only if equal, the limbs get
/// compared in constant time by means of [`ct_cmp_n()`].
///
/// # Arguments
///
/// * `op0` - The first operand, without leading zero limbs.
/// * `op1` - The second operand, without leading zero limbs.
pub fn cmp_mp_mp(op0: &[LimbType], op1: &[LimbType]) -> cmp::Ordering {
    debug_assert_eq!(normalized_len(op0), op0.len());
    debug_assert_eq!(normalized_len(op1), op1.len());
    match op0.len().cmp(&op1.len()) {
        cmp::Ordering::Equal => ct_cmp_n(op0, op1).cmp(&0),
        ordering => ordering,
    }
}

#[test]
fn test_cmp_mp_mp() {
    use cmp::Ordering;
    assert_eq!(cmp_mp_mp(&[], &[]), Ordering::Equal);
    assert_eq!(cmp_mp_mp(&[], &[1]), Ordering::Less);
    assert_eq!(cmp_mp_mp(&[!0], &[0, 1]), Ordering::Less);
    assert_eq!(cmp_mp_mp(&[0, 1], &[!0]), Ordering::Greater);
    assert_eq!(cmp_mp_mp(&[3, 1], &[2, 1]), Ordering::Greater);
    assert_eq!(cmp_mp_mp(&[3, 1], &[3, 1]), Ordering::Equal);
}

/// Determine the number of limbs without the leading zero ones.
///
/// Scans from the most significant limb down to the first non-zero one. The execution time
/// depends on the value, use [`ct_normalized_len()`] for secret operands.
pub fn normalized_len(op0: &[LimbType]) -> usize {
    op0.iter().rposition(|v| *v != 0).map_or(0, |i| i + 1)
}

/// Determine the number of limbs without the leading zero ones in constant time.
///
/// Equivalent to [`normalized_len()`], but visits every limb regardless of the contents.
pub fn ct_normalized_len(op0: &[LimbType]) -> usize {
    let mut nlimbs = 0;
    for (i, op0_val) in op0.iter().enumerate() {
        nlimbs = ct_neq_l_l(*op0_val, 0).select_usize(nlimbs, i + 1);
    }
    nlimbs
}

#[test]
fn test_normalized_len() {
    let cases: [(&[LimbType], usize); 5] = [
        (&[], 0),
        (&[0, 0], 0),
        (&[1], 1),
        (&[0, 1, 0], 2),
        (&[1, 0, 0, !0], 4),
    ];
    for (limbs, expected) in cases {
        assert_eq!(normalized_len(limbs), expected);
        assert_eq!(ct_normalized_len(limbs), expected);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{limbs_pair_strategy, limbs_strategy, limbs_to_biguint};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn cmp_n_matches_reference((op0, op1) in limbs_pair_strategy(6)) {
            let expected = limbs_to_biguint(&op0).cmp(&limbs_to_biguint(&op1));
            prop_assert_eq!(ct_cmp_n(&op0, &op1).cmp(&0), expected);
            prop_assert_eq!(ct_eq_n(&op0, &op1).unwrap() == 1, expected.is_eq());
            prop_assert_eq!(ct_lt_n(&op0, &op1).unwrap() == 1, expected.is_lt());
            prop_assert_eq!(ct_leq_n(&op0, &op1).unwrap() == 1, expected.is_le());
            prop_assert_eq!(ct_gt_n(&op0, &op1).unwrap() == 1, expected.is_gt());
            prop_assert_eq!(ct_geq_n(&op0, &op1).unwrap() == 1, expected.is_ge());
        }

        #[test]
        fn cmp_mp_mp_matches_reference(op0 in limbs_strategy(5), op1 in limbs_strategy(5)) {
            let op0 = &op0[..normalized_len(&op0)];
            let op1 = &op1[..normalized_len(&op1)];
            let expected = limbs_to_biguint(op0).cmp(&limbs_to_biguint(op1));
            prop_assert_eq!(cmp_mp_mp(op0, op1), expected);
        }

        #[test]
        fn normalized_len_variants_agree(op0 in limbs_strategy(6)) {
            let nlimbs = normalized_len(&op0);
            prop_assert_eq!(ct_normalized_len(&op0), nlimbs);
            prop_assert_eq!(limbs_to_biguint(&op0[..nlimbs]), limbs_to_biguint(&op0));
            prop_assert_eq!(ct_is_zero_n(&op0).unwrap() == 1, nlimbs == 0);
        }
    }
}
