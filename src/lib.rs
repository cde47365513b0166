// SPDX-License-Identifier: Apache-2.0

//! Constant-time multiprecision integer limb arithmetic.
//!
//! Multiprecision integers are represented as little endian slices of [`LimbType`] words, i.e.
//! with the least significant limb first. The kernel functions operate on borrowed slices only,
//! never allocate and run a number of iterations determined by the operand lengths alone. In-place
//! variants carry an `_assign` suffix. Owned storage with secure wiping is provided by
//! [`LimbsBuffer`].

mod add_impl;
mod cmp_impl;
mod cond_impl;
pub mod hexstr;
mod limb;
mod limbs_buffer;
mod mul_impl;
mod shift_impl;

#[cfg(test)]
mod test_helpers;

pub use limb::{
    ct_add_dl_l, ct_add_l_l, ct_add_l_l_c, ct_eq_l_l, ct_find_last_set_bit_l, ct_ge_l_l,
    ct_gt_l_l, ct_is_nonzero_l, ct_is_zero_l, ct_le_l_l, ct_lt_l_l, ct_mul_add_l_l_l_c,
    ct_mul_l_l, ct_mul_sub_l_l_l_b, ct_neq_l_l, ct_sub_l_l, ct_sub_l_l_b, DoubleLimb, LimbChoice,
    LimbType, LIMB_BITS, LIMB_BYTES,
};

pub use limbs_buffer::{LimbsBuffer, LimbsBufferError, MemoryClass};

pub use add_impl::{
    ct_add, ct_add_1, ct_add_1_assign, ct_add_assign, ct_add_n, ct_add_n_assign,
    ct_add_n_cond_assign, ct_sub, ct_sub_1, ct_sub_1_assign, ct_sub_assign, ct_sub_n,
    ct_sub_n_assign, ct_sub_n_cond_assign,
};

pub use cmp_impl::{
    cmp_mp_mp, ct_cmp_l, ct_cmp_n, ct_eq_n, ct_geq_n, ct_gt_n, ct_is_zero_n, ct_leq_n, ct_lt_n,
    ct_normalized_len, normalized_len,
};

pub use cond_impl::{ct_negate_cond, ct_set_cond, ct_swap_cond};

pub use mul_impl::{
    ct_addmul_1, ct_mul, ct_mul_1, ct_mul_1_assign, ct_mul_n, ct_sqr, ct_submul_1,
};

pub use shift_impl::{ct_lshift, ct_lshift_assign, ct_rshift, ct_rshift_assign};
