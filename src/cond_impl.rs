// SPDX-License-Identifier: Apache-2.0

//! Constant-time conditional operations on multiprecision integers.
//!
//! All of these touch every limb irrespective of the condition, the selection itself is done by
//! masking with [`LimbChoice`].

use super::limb::{ct_add_l_l, LimbChoice, LimbType};

/// Conditionally copy a multiprecision integer.
///
/// If `cond` is set, `op0` gets overwritten with `op1`, otherwise it is left unmodified.
pub fn ct_set_cond(op0: &mut [LimbType], op1: &[LimbType], cond: LimbChoice) {
    debug_assert_eq!(op0.len(), op1.len());
    for (op0_val, op1_val) in op0.iter_mut().zip(op1.iter()) {
        *op0_val = cond.select(*op0_val, *op1_val);
    }
}

/// Conditionally exchange two multiprecision integers of equal length.
pub fn ct_swap_cond(op0: &mut [LimbType], op1: &mut [LimbType], cond: LimbChoice) {
    debug_assert_eq!(op0.len(), op1.len());
    let cond_mask = cond.select(0, !0);
    for (op0_val, op1_val) in op0.iter_mut().zip(op1.iter_mut()) {
        let diff = (*op0_val ^ *op1_val) & cond_mask;
        *op0_val ^= diff;
        *op1_val ^= diff;
    }
}

#[test]
fn test_ct_set_swap_cond() {
    let mut op0 = [1, 2];
    let mut op1 = [3, 4];
    ct_set_cond(&mut op0, &op1, LimbChoice::from(0));
    assert_eq!(op0, [1, 2]);

    ct_swap_cond(&mut op0, &mut op1, LimbChoice::from(0));
    assert_eq!(op0, [1, 2]);
    assert_eq!(op1, [3, 4]);
    ct_swap_cond(&mut op0, &mut op1, LimbChoice::from(1));
    assert_eq!(op0, [3, 4]);
    assert_eq!(op1, [1, 2]);

    ct_set_cond(&mut op0, &op1, LimbChoice::from(1));
    assert_eq!(op0, [1, 2]);
}

/// Conditionally negate a multiprecision integer in two's complement.
///
/// If `cond` is set, `op0` gets replaced by `B^op0.len() - op0`, which is zero again for zero.
/// Applied to a two's complement value together with its sign as the condition, this yields the
/// absolute value.
pub fn ct_negate_cond(op0: &mut [LimbType], cond: LimbChoice) {
    let negate_mask = cond.select(0, !0);
    let mut negate_carry = negate_mask & 1;
    for op0_val in op0.iter_mut() {
        (negate_carry, *op0_val) = ct_add_l_l(*op0_val ^ negate_mask, negate_carry);
    }
}

#[test]
fn test_ct_negate_cond() {
    let mut op0 = [1, 0];
    ct_negate_cond(&mut op0, LimbChoice::from(0));
    assert_eq!(op0, [1, 0]);
    ct_negate_cond(&mut op0, LimbChoice::from(1));
    assert_eq!(op0, [!0, !0]);
    ct_negate_cond(&mut op0, LimbChoice::from(1));
    assert_eq!(op0, [1, 0]);

    let mut op0 = [0, 0];
    ct_negate_cond(&mut op0, LimbChoice::from(1));
    assert_eq!(op0, [0, 0]);

    let mut op0 = [0, 1];
    ct_negate_cond(&mut op0, LimbChoice::from(1));
    assert_eq!(op0, [0, !0]);

    let mut op0: [LimbType; 0] = [];
    ct_negate_cond(&mut op0, LimbChoice::from(1));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::add_impl::ct_add_n;
    use crate::test_helpers::{limbs_pair_strategy, limbs_strategy};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn negation_sums_to_zero(op0 in limbs_strategy(6)) {
            let mut negated = op0.clone();
            ct_negate_cond(&mut negated, LimbChoice::from(1));
            let mut sum = vec![0; op0.len()];
            ct_add_n(&mut sum, &op0, &negated);
            prop_assert!(sum.iter().all(|v| *v == 0));
        }

        #[test]
        fn swap_twice_restores((op0, op1) in limbs_pair_strategy(6), cond in 0..=1 as LimbType) {
            let cond = LimbChoice::from(cond);
            let (mut a, mut b) = (op0.clone(), op1.clone());
            ct_swap_cond(&mut a, &mut b, cond);
            let (expected_a, expected_b) = if cond.unwrap() != 0 {
                (&op1, &op0)
            } else {
                (&op0, &op1)
            };
            prop_assert_eq!(&a, expected_a);
            prop_assert_eq!(&b, expected_b);
            ct_swap_cond(&mut a, &mut b, cond);
            prop_assert_eq!(&a, &op0);
            prop_assert_eq!(&b, &op1);
        }
    }
}
