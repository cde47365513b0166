// SPDX-License-Identifier: Apache-2.0

//! Definitions and arithmetic primitives related to [LimbType], the basic unit of multiprecision
//! integer arithmetic.
//!
//! Everything in here is the double-word layer the limb array kernel is composed from: adding and
//! subtracting limbs with an explicit carry or borrow, multiplying two limbs into a
//! [`DoubleLimb`] and folding a carry back into such a product.
use core::arch::asm;
use core::convert;
use core::mem;
use core::ops;
use zeroize::Zeroize;

/// The basic unit used by the multiprecision integer arithmetic implementation.
///
/// # Notes
///
/// The following arithmetic on a [`LimbType`] is assumed to be constant-time:
/// - Binary operations: `not`, `or`, `and`, `xor`.
/// - Wrapping addition and subtraction of two [`LimbType`] words.
/// - Multiplication of two [`LimbType`] words where the result also fits
///   a [`LimbType`].
/// - Shifts by a distance which is not secret.
///
/// The full double width product of two limbs is never obtained by means of a wider native integer
/// type, because that might get lowered to a call into some architecture support runtime library
/// with unknown timing properties. On x86_64, the `mul` instruction gets used directly, everywhere
/// else the product gets assembled from half limb multiplications.
///
/// The `force_u32_limbs` feature selects `u32` limbs on every target, which is mostly useful for
/// exercising the 32 bit code paths on 64 bit build hosts.
#[cfg(any(feature = "force_u32_limbs", not(target_arch = "x86_64")))]
pub type LimbType = u32;
#[cfg(all(not(feature = "force_u32_limbs"), target_arch = "x86_64"))]
pub type LimbType = u64;

/// The bit width of a [`LimbType`].
pub const LIMB_BITS: u32 = LimbType::BITS;
/// The size of a [`LimbType`] in bytes.
pub const LIMB_BYTES: usize = mem::size_of::<LimbType>();

/// The bit width of half a [`LimbType`], i.e. a "halfword".
const HALF_LIMB_BITS: u32 = LIMB_BITS / 2;
/// Mask for extracting the lower halfword from a [`LimbType`].
const HALF_LIMB_MASK: LimbType = ct_lsb_mask_l(HALF_LIMB_BITS);

#[cfg(all(
    feature = "enable_arch_math_asm",
    target_arch = "x86_64",
    not(feature = "force_u32_limbs")
))]
mod x86_64_math;

// core::hint::black_box() is inefficient: it writes and reads from memory.
#[inline(always)]
pub fn black_box_l(v: LimbType) -> LimbType {
    let result: LimbType;
    unsafe {
        asm!("/* {v} */", v = inout(reg) v => result, options(pure, nomem, nostack));
    }
    result
}

/// A condition represented as an all-zeroes or all-ones [`LimbType`] mask.
///
/// Selections based on a [`LimbChoice`] are implemented with bitwise operations only and don't
/// branch on the condition's value.
#[derive(Clone, Copy, Debug)]
pub struct LimbChoice {
    mask: LimbType,
}

impl LimbChoice {
    pub const fn new(cond: LimbType) -> Self {
        debug_assert!(cond == 0 || cond == 1);
        Self {
            mask: (0 as LimbType).wrapping_sub(cond),
        }
    }

    pub fn unwrap(&self) -> LimbType {
        black_box_l(self.mask & 1)
    }

    /// Select `v0` if the condition is unset and `v1` otherwise.
    pub const fn select(&self, v0: LimbType, v1: LimbType) -> LimbType {
        v0 ^ (self.mask & (v0 ^ v1))
    }

    pub fn select_usize(&self, v0: usize, v1: usize) -> usize {
        let cond = self.unwrap() as usize;
        let mask = (0 as usize).wrapping_sub(cond);
        v0 ^ (mask & (v0 ^ v1))
    }
}

impl convert::From<LimbType> for LimbChoice {
    fn from(value: LimbType) -> Self {
        Self::new(value)
    }
}

impl convert::From<subtle::Choice> for LimbChoice {
    fn from(value: subtle::Choice) -> Self {
        Self::new(value.unwrap_u8() as LimbType)
    }
}

impl convert::From<LimbChoice> for subtle::Choice {
    fn from(value: LimbChoice) -> Self {
        subtle::Choice::from(value.unwrap() as u8)
    }
}

impl ops::Not for LimbChoice {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self { mask: !self.mask }
    }
}

impl ops::BitAnd for LimbChoice {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self {
            mask: self.mask & rhs.mask,
        }
    }
}

impl ops::BitAndAssign for LimbChoice {
    fn bitand_assign(&mut self, rhs: Self) {
        self.mask &= rhs.mask
    }
}

impl ops::BitOr for LimbChoice {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self {
            mask: self.mask | rhs.mask,
        }
    }
}

impl ops::BitOrAssign for LimbChoice {
    fn bitor_assign(&mut self, rhs: Self) {
        self.mask |= rhs.mask
    }
}

/// Prerequisite trait for the [`zeroize::DefaultIsZeroes`] marker trait.
impl Default for LimbChoice {
    fn default() -> Self {
        Self::from(0)
    }
}

/// Marker trait enabling a generic [`zeroize::Zeroize`] trait implementation.
impl zeroize::DefaultIsZeroes for LimbChoice {}

#[test]
fn test_limb_choice() {
    let set = LimbChoice::from(1);
    let unset = LimbChoice::from(0);
    assert_eq!(set.unwrap(), 1);
    assert_eq!(unset.unwrap(), 0);
    assert_eq!(set.select(3, 5), 5);
    assert_eq!(unset.select(3, 5), 3);
    assert_eq!(set.select_usize(3, 5), 5);
    assert_eq!((!set).unwrap(), 0);
    assert_eq!((set & unset).unwrap(), 0);
    assert_eq!((set | unset).unwrap(), 1);

    let c: subtle::Choice = set.into();
    assert_eq!(c.unwrap_u8(), 1);
    assert_eq!(LimbChoice::from(subtle::Choice::from(0u8)).unwrap(), 0);
}

#[allow(unused)]
pub fn generic_ct_is_nonzero_l(v: LimbType) -> LimbType {
    // This trick is from subtle::*::ct_eq():
    // if v is non-zero, then v or -v or both have the high bit set.
    black_box_l((v | v.wrapping_neg()) >> (LIMB_BITS - 1))
}

#[allow(unused)]
pub fn generic_ct_is_zero_l(v: LimbType) -> LimbType {
    (1 as LimbType) ^ ct_is_nonzero_l(v)
}

pub fn ct_eq_l_l(v0: LimbType, v1: LimbType) -> LimbChoice {
    LimbChoice::from(ct_is_zero_l(v0 ^ v1))
}

pub fn ct_neq_l_l(v0: LimbType, v1: LimbType) -> LimbChoice {
    !ct_eq_l_l(v0, v1)
}

pub fn ct_lt_l_l(v0: LimbType, v1: LimbType) -> LimbChoice {
    let (borrow, _) = ct_sub_l_l(v0, v1);
    LimbChoice::from(borrow)
}

pub fn ct_le_l_l(v0: LimbType, v1: LimbType) -> LimbChoice {
    !ct_lt_l_l(v1, v0)
}

pub fn ct_gt_l_l(v0: LimbType, v1: LimbType) -> LimbChoice {
    ct_lt_l_l(v1, v0)
}

pub fn ct_ge_l_l(v0: LimbType, v1: LimbType) -> LimbChoice {
    ct_le_l_l(v1, v0)
}

#[test]
fn test_ct_cmp_l_l() {
    assert_eq!(ct_eq_l_l(0, 0).unwrap(), 1);
    assert_eq!(ct_eq_l_l(!0, !0).unwrap(), 1);
    assert_eq!(ct_eq_l_l(!0, !1).unwrap(), 0);
    assert_eq!(ct_neq_l_l(1, 2).unwrap(), 1);
    assert_eq!(ct_lt_l_l(1, 2).unwrap(), 1);
    assert_eq!(ct_lt_l_l(2, 2).unwrap(), 0);
    assert_eq!(ct_lt_l_l(!0, 0).unwrap(), 0);
    assert_eq!(ct_le_l_l(2, 2).unwrap(), 1);
    assert_eq!(ct_le_l_l(3, 2).unwrap(), 0);
    assert_eq!(ct_gt_l_l(!0, 0).unwrap(), 1);
    assert_eq!(ct_ge_l_l(0, !0).unwrap(), 0);
    assert_eq!(ct_ge_l_l(0, 0).unwrap(), 1);
}

pub const fn ct_lsb_mask_l(nbits: u32) -> LimbType {
    debug_assert!(nbits <= LIMB_BITS);
    // The standard way for generating a mask with nbits of the lower bits set is (1 << nbits) -
    // 1. However, for nbits == LIMB_BITS, the left shift would be undefined behaviour. Split nbits
    // into nbits_lo < LIMB_BITS and a nbits_hi == (nbits == LIMB_BITS) components and generate
    // masks for each individually.
    let nbits_lo = nbits % LIMB_BITS;
    let nbits_hi = nbits / LIMB_BITS;
    debug_assert!(nbits_hi <= 1);
    debug_assert!(nbits_hi == 0 || nbits_lo == 0);

    let mask_for_lo = (1 << nbits_lo) - 1;
    let mask_for_hi = (0 as LimbType).wrapping_sub(nbits_hi as LimbType);
    mask_for_lo | mask_for_hi
}

#[test]
fn test_ct_lsb_mask_l() {
    for i in 0..LIMB_BITS {
        let mask = ct_lsb_mask_l(i);
        assert_eq!(mask, (1 << i) - 1);
    }
    assert_eq!(ct_lsb_mask_l(LIMB_BITS), !0);
}

/// Split a limb into upper and lower half limbs.
///
/// Returns a pair of upper and lower half limb, in this order.
///
/// Runs in constant time.
fn ct_l_to_hls(v: LimbType) -> (LimbType, LimbType) {
    (black_box_l(v >> HALF_LIMB_BITS), black_box_l(v & HALF_LIMB_MASK))
}

/// Add two limbs.
///
/// Returns a pair of carry and the [`LimbType::BITS`] lower bits of the sum.
///
/// Runs in constant time.
///
/// # Arguments:
///
/// * `v0` - first operand
/// * `v1` - second operand
///
#[allow(unused)]
pub fn generic_ct_add_l_l(v0: LimbType, v1: LimbType) -> (LimbType, LimbType) {
    // Don't rely on overflowing_add() for determining the carry -- that would almost certainly
    // branch and not be constant-time.
    let v0 = black_box_l(v0);
    let v1 = black_box_l(v1);
    let r = v0.wrapping_add(v1);
    let carry = black_box_l((((v0 | v1) & !r) | (v0 & v1)) >> (LIMB_BITS - 1));
    (carry, r)
}

#[test]
fn test_ct_add_l_l() {
    assert_eq!(ct_add_l_l(0, 0), (0, 0));
    assert_eq!(ct_add_l_l(1, 0), (0, 1));
    assert_eq!(ct_add_l_l(!0 - 1, 1), (0, !0));
    assert_eq!(ct_add_l_l(!0, 1), (1, 0));
    assert_eq!(ct_add_l_l(1 << (LIMB_BITS - 1), 1 << (LIMB_BITS - 1)), (1, 0));
    assert_eq!(ct_add_l_l(!0, 1 << (LIMB_BITS - 1)), (1, ct_lsb_mask_l(LIMB_BITS - 1)));
    assert_eq!(ct_add_l_l(!0, !0), (1, !0 - 1));
}

/// Add two limbs and an incoming carry of at most one.
///
/// Returns a pair of the outgoing carry and the [`LimbType::BITS`] lower bits of the sum.
#[allow(unused)]
pub fn generic_ct_add_l_l_c(v0: LimbType, v1: LimbType, carry: LimbType) -> (LimbType, LimbType) {
    debug_assert!(carry <= 1);
    let (carry0, r) = generic_ct_add_l_l(v0, carry);
    let (carry1, r) = generic_ct_add_l_l(r, v1);
    let carry = carry0 + carry1;
    debug_assert!(carry <= 1);
    (carry, r)
}

#[test]
fn test_ct_add_l_l_c() {
    assert_eq!(ct_add_l_l_c(0, 0, 0), (0, 0));
    assert_eq!(ct_add_l_l_c(0, 0, 1), (0, 1));
    assert_eq!(ct_add_l_l_c(!0, 0, 1), (1, 0));
    assert_eq!(ct_add_l_l_c(0, !0, 1), (1, 0));
    assert_eq!(ct_add_l_l_c(!0, !0, 0), (1, !1));
    assert_eq!(ct_add_l_l_c(!0, !0, 1), (1, !0));
}

/// Subtract two limbs.
///
/// Returns a pair of borrow and the [`LimbType::BITS`] lower bits of the difference.
///
/// Runs in constant time.
///
/// # Arguments:
///
/// * `v0` - first operand
/// * `v1` - second operand
///
#[allow(unused)]
pub fn generic_ct_sub_l_l(v0: LimbType, v1: LimbType) -> (LimbType, LimbType) {
    // Don't rely on overflowing_sub() for determining the borrow -- that would almost certainly
    // branch and not be constant-time.
    let v0 = black_box_l(v0);
    let v1 = black_box_l(v1);
    let r = v0.wrapping_sub(v1);
    let borrow = black_box_l((((r | v1) & !v0) | (v1 & r)) >> (LIMB_BITS - 1));
    (borrow, r)
}

#[test]
fn test_ct_sub_l_l() {
    assert_eq!(ct_sub_l_l(0, 0), (0, 0));
    assert_eq!(ct_sub_l_l(1, 0), (0, 1));
    assert_eq!(ct_sub_l_l(0, 1), (1, !0));
    assert_eq!(ct_sub_l_l(1 << (LIMB_BITS - 1), 1 << (LIMB_BITS - 1)), (0, 0));
    assert_eq!(ct_sub_l_l(0, 1 << (LIMB_BITS - 1)), (1, 1 << (LIMB_BITS - 1)));
    assert_eq!(ct_sub_l_l(1 << (LIMB_BITS - 1), (1 << (LIMB_BITS - 1)) + 1), (1, !0));
}

/// Subtract a limb and an incoming borrow of at most one from another limb.
///
/// Returns a pair of the outgoing borrow and the [`LimbType::BITS`] lower bits of the difference.
#[allow(unused)]
pub fn generic_ct_sub_l_l_b(v0: LimbType, v1: LimbType, borrow: LimbType) -> (LimbType, LimbType) {
    debug_assert!(borrow <= 1);
    let (borrow0, r) = generic_ct_sub_l_l(v0, borrow);
    let (borrow1, r) = generic_ct_sub_l_l(r, v1);
    let borrow = borrow0 + borrow1;
    debug_assert!(borrow <= 1);
    (borrow, r)
}

#[test]
fn test_ct_sub_l_l_b() {
    assert_eq!(ct_sub_l_l_b(0, 0, 0), (0, 0));
    assert_eq!(ct_sub_l_l_b(1, 0, 1), (0, 0));
    assert_eq!(ct_sub_l_l_b(0, 0, 1), (1, !0));
    assert_eq!(ct_sub_l_l_b(0, !0, 1), (1, 0));
    assert_eq!(ct_sub_l_l_b(!0, !0, 0), (0, 0));
    assert_eq!(ct_sub_l_l_b(!0, !0, 1), (1, !0));
}

/// A pair of [`LimbType`]s interpreted as a double precision integer.
///
/// Used for the result of [`LimbType`] multiplications.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Zeroize)]
pub struct DoubleLimb {
    v: [LimbType; 2],
}

impl DoubleLimb {
    pub fn new(h: LimbType, l: LimbType) -> Self {
        Self { v: [l, h] }
    }

    pub fn high(&self) -> LimbType {
        self.v[1]
    }

    pub fn low(&self) -> LimbType {
        self.v[0]
    }
}

/// Mutiply two limbs in constant time.
///
/// Returns the result a double precision [`DoubleLimb`].
///
/// Runs in constant time.
///
/// # Arguments:
///
/// * `v0` - first operand
/// * `v1` - second operand
///
#[allow(unused)]
pub fn generic_ct_mul_l_l(v0: LimbType, v1: LimbType) -> DoubleLimb {
    let (v0h, v0l) = ct_l_to_hls(v0);
    let (v1h, v1l) = ct_l_to_hls(v1);

    let prod_v0l_v1l = v0l * v1l;
    let prod_v0l_v1h = v0l * v1h;
    let prod_v0h_v1l = v0h * v1l;
    let prod_v0h_v1h = v0h * v1h;

    let mut result_low: LimbType = prod_v0l_v1l;
    let mut result_high: LimbType = prod_v0h_v1h;

    let (prod_v0l_v1h_h, prod_v0l_v1h_l) = ct_l_to_hls(prod_v0l_v1h);
    let (prod_v0h_v1l_h, prod_v0h_v1l_l) = ct_l_to_hls(prod_v0h_v1l);

    let (result_low_carry, result_low_sum) =
        generic_ct_add_l_l(result_low, prod_v0l_v1h_l << HALF_LIMB_BITS);
    result_low = result_low_sum;
    result_high += result_low_carry;
    result_high += prod_v0l_v1h_h;

    let (result_low_carry, result_low_sum) =
        generic_ct_add_l_l(result_low, prod_v0h_v1l_l << HALF_LIMB_BITS);
    result_low = result_low_sum;
    result_high += result_low_carry;
    result_high += prod_v0h_v1l_h;

    DoubleLimb::new(result_high, result_low)
}

#[test]
fn test_ct_mul_l_l() {
    let p = ct_mul_l_l(0, 0);
    assert_eq!(p.low(), 0);
    assert_eq!(p.high(), 0);

    let p = ct_mul_l_l(2, 2);
    assert_eq!(p.low(), 4);
    assert_eq!(p.high(), 0);

    let p = ct_mul_l_l(1 << (LIMB_BITS - 1), 2);
    assert_eq!(p.low(), 0);
    assert_eq!(p.high(), 1);

    let p = ct_mul_l_l(2, 1 << (LIMB_BITS - 1));
    assert_eq!(p.low(), 0);
    assert_eq!(p.high(), 1);

    let p = ct_mul_l_l(1 << (LIMB_BITS - 1), 1 << (LIMB_BITS - 1));
    assert_eq!(p.low(), 0);
    assert_eq!(p.high(), 1 << (LIMB_BITS - 2));

    // The maximum limb value squared: (B - 1)^2 = (B - 2) * B + 1.
    let p = ct_mul_l_l(!0, !0);
    assert_eq!(p.low(), 1);
    assert_eq!(p.high(), !1);

    let p = ct_mul_l_l(!0, 2);
    assert_eq!(p.low(), !1);
    assert_eq!(p.high(), 1);
}

/// Add a single limb to a [`DoubleLimb`].
///
/// Returns a pair of the sum's high limb, i.e. the carry into the next limb position, and its low
/// limb, in this order. The sum must fit a [`DoubleLimb`], which is always the case when adding
/// any limb to the product of two limbs.
///
/// Runs in constant time.
///
/// # Arguments:
///
/// * `v` - the double limb addend, usually a product obtained from [`ct_mul_l_l()`]
/// * `carry` - the single limb addend
///
pub fn ct_add_dl_l(v: DoubleLimb, carry: LimbType) -> (LimbType, LimbType) {
    let (carry0, low) = ct_add_l_l(v.low(), carry);
    debug_assert!(v.high() != !0 || carry0 == 0);
    (v.high().wrapping_add(carry0), low)
}

#[test]
fn test_ct_add_dl_l() {
    assert_eq!(ct_add_dl_l(DoubleLimb::new(0, 0), 0), (0, 0));
    assert_eq!(ct_add_dl_l(DoubleLimb::new(0, !0), 1), (1, 0));
    assert_eq!(ct_add_dl_l(DoubleLimb::new(5, !0), !0), (6, !1));
    // The largest possible product plus the largest possible carry.
    assert_eq!(ct_add_dl_l(ct_mul_l_l(!0, !0), !0), (!0, 0));
}

/// Multiply two limbs and add another limb as well as a carry.
///
/// Computes `op0 + op10 * op11 + carry` and returns a pair of the resulting high limb, i.e. the
/// carry into the next limb position, and the low limb, in this order. The sum always fits a
/// [`DoubleLimb`], even for a full limb sized `carry`.
///
/// Runs in constant time.
#[allow(unused)]
pub fn generic_ct_mul_add_l_l_l_c(
    op0: LimbType,
    op10: LimbType,
    op11: LimbType,
    carry: LimbType,
) -> (LimbType, LimbType) {
    let prod = generic_ct_mul_l_l(op10, op11);
    // Basic property of the multiplication.
    debug_assert!(prod.high() < !1 || prod.high() == !1 && prod.low() == 1);
    let (carry0, result) = generic_ct_add_l_l(op0, carry);
    let (carry1, result) = generic_ct_add_l_l(result, prod.low());
    // The new carry does not overflow: if carry0 != 0,
    // then the result after after the first addition is
    // <= !1, because that addition did wrap around.
    // If in addition prod.high() == !1, then prod.low() <= 1
    // and the second addition would not overflow.
    debug_assert!(prod.high() < !1 || carry0 + carry1 <= 1);
    let carry = prod.high() + carry0 + carry1;
    (carry, result)
}

#[test]
fn test_ct_mul_add_l_l_l_c() {
    assert_eq!(ct_mul_add_l_l_l_c(0, 0, 0, 0), (0, 0));
    assert_eq!(ct_mul_add_l_l_l_c(1, 2, 3, 4), (0, 11));
    assert_eq!(ct_mul_add_l_l_l_c(!0, 1, 1, 0), (1, 0));
    assert_eq!(ct_mul_add_l_l_l_c(0, !0, 2, 1), (1, !0));
    // (B - 1) + (B - 1)^2 + (B - 1) = B^2 - 1
    assert_eq!(ct_mul_add_l_l_l_c(!0, !0, !0, !0), (!0, !0));
}

/// Multiply two limbs and subtract the product as well as a borrow from another limb.
///
/// Computes `op0 - op10 * op11 - borrow` and returns a pair of the borrow to subtract from the
/// next limb position and the resulting low limb, in this order.
///
/// Runs in constant time.
#[allow(unused)]
pub fn generic_ct_mul_sub_l_l_l_b(
    op0: LimbType,
    op10: LimbType,
    op11: LimbType,
    borrow: LimbType,
) -> (LimbType, LimbType) {
    let prod = generic_ct_mul_l_l(op10, op11);
    // Basic property of the multiplication.
    debug_assert!(prod.high() < !1 || prod.high() == !1 && prod.low() == 1);
    let (borrow0, result) = generic_ct_sub_l_l(op0, borrow);
    let (borrow1, result) = generic_ct_sub_l_l(result, prod.low());
    // The new borrow does not overflow: if borrow0 != 0,
    // then the result after after the first subtraction is
    // >= 1, because that subtraction did wrap around.
    // If in addition prod.high() == !1, then prod.low() <= 1
    // and the second subtraction would not wrap around.
    debug_assert!(prod.high() < !1 || borrow0 + borrow1 <= 1);
    let borrow = prod.high() + borrow0 + borrow1;
    (borrow, result)
}

#[test]
fn test_ct_mul_sub_l_l_l_b() {
    assert_eq!(ct_mul_sub_l_l_l_b(0, 0, 0, 0), (0, 0));
    assert_eq!(ct_mul_sub_l_l_l_b(11, 2, 3, 4), (0, 1));
    assert_eq!(ct_mul_sub_l_l_l_b(0, 1, 1, 0), (1, !0));
    assert_eq!(ct_mul_sub_l_l_l_b(0, 0, 0, 1), (1, !0));
    // 0 - (B - 1)^2 - (B - 1) = -(B - 1) * B = -B^2 + B
    assert_eq!(ct_mul_sub_l_l_l_b(0, !0, !0, !0), (!0, 0));
}

#[cfg(not(all(
    feature = "enable_arch_math_asm",
    target_arch = "x86_64",
    not(feature = "force_u32_limbs")
)))]
pub use self::{
    generic_ct_add_l_l as ct_add_l_l, generic_ct_add_l_l_c as ct_add_l_l_c,
    generic_ct_is_nonzero_l as ct_is_nonzero_l, generic_ct_is_zero_l as ct_is_zero_l,
    generic_ct_mul_add_l_l_l_c as ct_mul_add_l_l_l_c, generic_ct_mul_l_l as ct_mul_l_l,
    generic_ct_mul_sub_l_l_l_b as ct_mul_sub_l_l_l_b, generic_ct_sub_l_l as ct_sub_l_l,
    generic_ct_sub_l_l_b as ct_sub_l_l_b,
};

#[cfg(all(
    feature = "enable_arch_math_asm",
    target_arch = "x86_64",
    not(feature = "force_u32_limbs")
))]
pub use x86_64_math::{
    ct_add_l_l, ct_add_l_l_c, ct_is_nonzero_l, ct_is_zero_l, ct_mul_add_l_l_l_c, ct_mul_l_l,
    ct_mul_sub_l_l_l_b, ct_sub_l_l, ct_sub_l_l_b,
};

// Position of MSB + 1, if any, zero otherwise.
pub fn ct_find_last_set_bit_l(mut v: LimbType) -> usize {
    let mut bits = LIMB_BITS as LimbType;
    debug_assert!(bits & (bits - 1) == 0); // Is a power of two.
    let mut count: usize = 0;
    let mut lsb_mask = !0;
    while bits > 1 {
        bits /= 2;
        lsb_mask >>= bits;
        let v_l = v & lsb_mask;
        let v_h = v >> bits;
        let upper = ct_neq_l_l(v_h, 0);
        count += upper.select(0, bits) as usize;
        v = upper.select(v_l, v_h);
    }
    debug_assert!(v <= 1);
    count += v as usize;
    count
}

#[test]
fn test_ct_find_last_set_bit_l() {
    assert_eq!(ct_find_last_set_bit_l(0), 0);

    for i in 0..LIMB_BITS as usize {
        let v = 1 << i;
        assert_eq!(ct_find_last_set_bit_l(v), i + 1);
        assert_eq!(ct_find_last_set_bit_l(v - 1), i);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // The widening native multiplication serves as the reference here only.
    #[cfg(any(feature = "force_u32_limbs", not(target_arch = "x86_64")))]
    type WideLimbType = u64;
    #[cfg(all(not(feature = "force_u32_limbs"), target_arch = "x86_64"))]
    type WideLimbType = u128;

    fn wide(v: DoubleLimb) -> WideLimbType {
        (v.high() as WideLimbType) << LIMB_BITS | v.low() as WideLimbType
    }

    fn split(v: WideLimbType) -> (LimbType, LimbType) {
        ((v >> LIMB_BITS) as LimbType, v as LimbType)
    }

    proptest! {
        #[test]
        fn mul_l_l_matches_wide_product(v0 in any::<LimbType>(), v1 in any::<LimbType>()) {
            let expected = v0 as WideLimbType * v1 as WideLimbType;
            prop_assert_eq!(wide(ct_mul_l_l(v0, v1)), expected);
            prop_assert_eq!(wide(generic_ct_mul_l_l(v0, v1)), expected);
        }

        #[test]
        fn mul_add_matches_wide_sum(
            op0 in any::<LimbType>(),
            op10 in any::<LimbType>(),
            op11 in any::<LimbType>(),
            carry in any::<LimbType>(),
        ) {
            let expected = split(
                op0 as WideLimbType + op10 as WideLimbType * op11 as WideLimbType
                    + carry as WideLimbType,
            );
            prop_assert_eq!(ct_mul_add_l_l_l_c(op0, op10, op11, carry), expected);
            prop_assert_eq!(generic_ct_mul_add_l_l_l_c(op0, op10, op11, carry), expected);
            prop_assert_eq!(ct_add_dl_l(ct_mul_l_l(op10, op11), carry).1, expected.1.wrapping_sub(op0));
        }

        #[test]
        fn mul_sub_inverts_mul_add(
            op0 in any::<LimbType>(),
            op10 in any::<LimbType>(),
            op11 in any::<LimbType>(),
            carry in any::<LimbType>(),
        ) {
            let (carry_out, sum) = ct_mul_add_l_l_l_c(op0, op10, op11, carry);
            let (borrow_out, diff) = ct_mul_sub_l_l_l_b(sum, op10, op11, carry);
            prop_assert_eq!(diff, op0);
            prop_assert_eq!(borrow_out, carry_out);
            prop_assert_eq!(generic_ct_mul_sub_l_l_l_b(sum, op10, op11, carry), (borrow_out, diff));
        }

        #[test]
        fn add_sub_with_carry_match_generic(
            v0 in any::<LimbType>(),
            v1 in any::<LimbType>(),
            c in 0..=1 as LimbType,
        ) {
            prop_assert_eq!(ct_add_l_l_c(v0, v1, c), generic_ct_add_l_l_c(v0, v1, c));
            prop_assert_eq!(ct_sub_l_l_b(v0, v1, c), generic_ct_sub_l_l_b(v0, v1, c));
            prop_assert_eq!(ct_is_zero_l(v0), generic_ct_is_zero_l(v0));
            prop_assert_eq!(ct_is_nonzero_l(v0), generic_ct_is_nonzero_l(v0));
        }
    }
}
