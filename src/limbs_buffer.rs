// SPDX-License-Identifier: Apache-2.0

//! Owned limb storage with a memory class.
//!
//! A [`LimbsBuffer`] owns a zero-initialized, fixed capacity array of limbs plus the number of
//! significant limbs in it. Buffers of the [`MemoryClass::Secure`] class get their contents wiped
//! whenever storage is released: on growth, on [`LimbsBuffer::clear()`] and on drop. The
//! arithmetic kernel functions never allocate, they operate on borrowed slices obtained from
//! here.

extern crate alloc;

use super::add_impl::{ct_add, ct_sub_assign};
use super::cmp_impl::normalized_len;
use super::limb::{ct_find_last_set_bit_l, LimbType, LIMB_BITS, LIMB_BYTES};
use super::mul_impl::{ct_mul, ct_mul_n, ct_sqr};
use alloc::vec::Vec;
use core::{fmt, mem};
use thiserror::Error;
use tracing::{trace, warn};
use zeroize::{Zeroize, Zeroizing};

/// Whether the contents of a limbs buffer are sensitive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemoryClass {
    Ordinary,
    Secure,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LimbsBufferError {
    #[error("failed to allocate {nlimbs} limbs")]
    AllocationFailed { nlimbs: usize },
    #[error("{nlimbs} limbs exceed the buffer capacity of {capacity}")]
    InsufficientCapacity { nlimbs: usize, capacity: usize },
}

fn alloc_limbs(nlimbs: usize) -> Result<Vec<LimbType>, LimbsBufferError> {
    let mut limbs = Vec::new();
    limbs.try_reserve_exact(nlimbs).map_err(|_| {
        warn!(nlimbs, "limbs allocation failed");
        LimbsBufferError::AllocationFailed { nlimbs }
    })?;
    limbs.resize(nlimbs, 0);
    Ok(limbs)
}

/// Owned multiprecision integer storage.
///
/// The limbs are stored least significant first. Only the first [`nlimbs()`](Self::nlimbs) of
/// them are significant, the rest of the capacity is available for the kernel functions to write
/// results into.
pub struct LimbsBuffer {
    limbs: Vec<LimbType>,
    nlimbs: usize,
    class: MemoryClass,
}

impl LimbsBuffer {
    /// Allocate a zero-filled buffer of `capacity` limbs.
    ///
    /// Allocation failure gets reported as [`LimbsBufferError::AllocationFailed`].
    pub fn new(capacity: usize, class: MemoryClass) -> Result<Self, LimbsBufferError> {
        let limbs = alloc_limbs(capacity)?;
        trace!(capacity, ?class, "allocated limbs buffer");
        Ok(Self {
            limbs,
            nlimbs: 0,
            class,
        })
    }

    /// Create a buffer holding a copy of `limbs`, normalized.
    pub fn from_limbs(limbs: &[LimbType], class: MemoryClass) -> Result<Self, LimbsBufferError> {
        let mut result = Self::new(limbs.len(), class)?;
        result.limbs.copy_from_slice(limbs);
        result.nlimbs = limbs.len();
        result.normalize();
        Ok(result)
    }

    /// Create a buffer from a big endian byte string, normalized.
    pub fn from_be_bytes(bytes: &[u8], class: MemoryClass) -> Result<Self, LimbsBufferError> {
        let nlimbs = (bytes.len() + LIMB_BYTES - 1) / LIMB_BYTES;
        let mut result = Self::new(nlimbs, class)?;
        for (i, b) in bytes.iter().rev().enumerate() {
            result.limbs[i / LIMB_BYTES] |= (*b as LimbType) << (8 * (i % LIMB_BYTES));
        }
        result.nlimbs = nlimbs;
        result.normalize();
        Ok(result)
    }

    /// Export the value as a big endian byte string without leading zero bytes.
    ///
    /// The returned bytes get wiped when dropped, regardless of the buffer's class.
    pub fn to_be_bytes(&self) -> Result<Zeroizing<Vec<u8>>, LimbsBufferError> {
        let limbs = self.limbs();
        let nbytes = (self.bit_len() + 7) / 8;
        let mut bytes = Zeroizing::new(Vec::new());
        bytes.try_reserve_exact(nbytes).map_err(|_| {
            warn!(nbytes, "byte export allocation failed");
            LimbsBufferError::AllocationFailed {
                nlimbs: limbs.len(),
            }
        })?;
        for i in (0..nbytes).rev() {
            bytes.push((limbs[i / LIMB_BYTES] >> (8 * (i % LIMB_BYTES))) as u8);
        }
        Ok(bytes)
    }

    pub fn capacity(&self) -> usize {
        self.limbs.len()
    }

    pub fn nlimbs(&self) -> usize {
        self.nlimbs
    }

    pub fn class(&self) -> MemoryClass {
        self.class
    }

    pub fn is_secure(&self) -> bool {
        self.class == MemoryClass::Secure
    }

    /// The significant limbs.
    pub fn limbs(&self) -> &[LimbType] {
        &self.limbs[..self.nlimbs]
    }

    /// The full capacity, for use as a kernel function's output.
    ///
    /// Follow up with [`set_nlimbs()`](Self::set_nlimbs) and possibly
    /// [`normalize()`](Self::normalize) after writing.
    pub fn as_mut_slice(&mut self) -> &mut [LimbType] {
        &mut self.limbs
    }

    pub fn set_nlimbs(&mut self, nlimbs: usize) -> Result<(), LimbsBufferError> {
        if nlimbs > self.capacity() {
            return Err(LimbsBufferError::InsufficientCapacity {
                nlimbs,
                capacity: self.capacity(),
            });
        }
        self.nlimbs = nlimbs;
        Ok(())
    }

    /// Strip leading zero limbs from the significant part.
    ///
    /// The scan stops at the first non-zero limb and thus leaks the position of the value's most
    /// significant limb through timing. The length of a normalized value is considered public.
    pub fn normalize(&mut self) {
        self.nlimbs = normalized_len(self.limbs());
    }

    /// The position of the most significant set bit plus one, zero for a zero value.
    pub fn bit_len(&self) -> usize {
        let limbs = &self.limbs[..normalized_len(self.limbs())];
        match limbs.last() {
            Some(high) => (limbs.len() - 1) * LIMB_BITS as usize + ct_find_last_set_bit_l(*high),
            None => 0,
        }
    }

    /// Grow the capacity to at least `nlimbs`.
    ///
    /// The contents and the class are retained. The old storage of a secure buffer gets wiped
    /// before its release. The capacity never shrinks.
    pub fn ensure_capacity(&mut self, nlimbs: usize) -> Result<(), LimbsBufferError> {
        if nlimbs <= self.capacity() {
            return Ok(());
        }

        let old_capacity = self.capacity();
        let mut limbs = alloc_limbs(nlimbs)?;
        limbs[..self.nlimbs].copy_from_slice(self.limbs());
        let mut old_limbs = mem::replace(&mut self.limbs, limbs);
        if self.is_secure() {
            old_limbs.zeroize();
        }
        trace!(
            from = old_capacity,
            to = nlimbs,
            class = ?self.class,
            "grew limbs buffer"
        );
        Ok(())
    }

    /// Duplicate the buffer, retaining its class.
    pub fn try_clone(&self) -> Result<Self, LimbsBufferError> {
        let mut result = Self::new(self.capacity(), self.class)?;
        result.limbs.copy_from_slice(&self.limbs);
        result.nlimbs = self.nlimbs;
        Ok(result)
    }

    /// Copy the value from `src`.
    ///
    /// The buffer gets grown as needed and becomes secure if `src` is.
    pub fn assign(&mut self, src: &Self) -> Result<(), LimbsBufferError> {
        self.prepare_result(src.nlimbs, src.is_secure())?;
        let (dst_low, dst_high) = self.limbs.split_at_mut(src.nlimbs);
        dst_low.copy_from_slice(src.limbs());
        // Don't keep stale, possibly sensitive limbs beyond the new value around.
        dst_high[..self.nlimbs.saturating_sub(src.nlimbs)].zeroize();
        self.nlimbs = src.nlimbs;
        Ok(())
    }

    /// Set the value to zero, wiping all limbs.
    pub fn clear(&mut self) {
        self.limbs.as_mut_slice().zeroize();
        self.nlimbs = 0;
    }

    fn promote_to_secure(&mut self) {
        if !self.is_secure() {
            trace!(capacity = self.capacity(), "promoted limbs buffer to secure");
            self.class = MemoryClass::Secure;
        }
    }

    fn prepare_result(&mut self, nlimbs: usize, secure: bool) -> Result<(), LimbsBufferError> {
        self.ensure_capacity(nlimbs)?;
        if secure {
            self.promote_to_secure();
        }
        Ok(())
    }

    /// Set the buffer to the product of `op0` and `op1`.
    ///
    /// If both refer to the same buffer, the product gets computed as a square.
    pub fn set_mul(&mut self, op0: &Self, op1: &Self) -> Result<(), LimbsBufferError> {
        let nlimbs = op0.nlimbs + op1.nlimbs;
        self.prepare_result(nlimbs, op0.is_secure() || op1.is_secure())?;
        if op0.nlimbs == op1.nlimbs {
            ct_mul_n(&mut self.limbs[..nlimbs], op0.limbs(), op1.limbs());
        } else {
            ct_mul(&mut self.limbs[..nlimbs], op0.limbs(), op1.limbs());
        }
        self.nlimbs = nlimbs;
        self.normalize();
        Ok(())
    }

    /// Set the buffer to the square of `op0`.
    pub fn set_sqr(&mut self, op0: &Self) -> Result<(), LimbsBufferError> {
        let nlimbs = 2 * op0.nlimbs;
        self.prepare_result(nlimbs, op0.is_secure())?;
        ct_sqr(&mut self.limbs[..nlimbs], op0.limbs());
        self.nlimbs = nlimbs;
        self.normalize();
        Ok(())
    }

    /// Set the buffer to the sum of `op0` and `op1`.
    pub fn set_add(&mut self, op0: &Self, op1: &Self) -> Result<(), LimbsBufferError> {
        let (op0, op1) = if op0.nlimbs >= op1.nlimbs {
            (op0, op1)
        } else {
            (op1, op0)
        };
        let nlimbs = op0.nlimbs + 1;
        self.prepare_result(nlimbs, op0.is_secure() || op1.is_secure())?;
        let carry = ct_add(&mut self.limbs[..op0.nlimbs], op0.limbs(), op1.limbs());
        self.limbs[op0.nlimbs] = carry;
        self.nlimbs = nlimbs;
        self.normalize();
        Ok(())
    }

    /// Set the buffer to the difference of `op0` and `op1`.
    ///
    /// The difference is computed modulo `B^n`, with `n` being the larger of the two operands'
    /// lengths, and the borrow gets returned. A non-zero borrow indicates that `op0 < op1`.
    pub fn set_sub(&mut self, op0: &Self, op1: &Self) -> Result<LimbType, LimbsBufferError> {
        let nlimbs = op0.nlimbs.max(op1.nlimbs);
        self.prepare_result(nlimbs, op0.is_secure() || op1.is_secure())?;
        let result = &mut self.limbs[..nlimbs];
        let (result_low, result_high) = result.split_at_mut(op0.nlimbs);
        result_low.copy_from_slice(op0.limbs());
        result_high.fill(0);
        let borrow = ct_sub_assign(result, op1.limbs());
        self.nlimbs = nlimbs;
        self.normalize();
        Ok(borrow)
    }
}

impl Drop for LimbsBuffer {
    fn drop(&mut self) {
        if self.is_secure() {
            self.limbs.zeroize();
            trace!("released secure limbs buffer");
        }
    }
}

impl fmt::Debug for LimbsBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("LimbsBuffer");
        s.field("class", &self.class)
            .field("nlimbs", &self.nlimbs)
            .field("capacity", &self.capacity());
        if !self.is_secure() {
            s.field("limbs", &self.limbs());
        }
        s.finish()
    }
}

#[cfg(test)]
fn test_buffer_from_hexstr(hexstr: &str, class: MemoryClass) -> LimbsBuffer {
    let limbs = super::hexstr::limbs_from_hexstr(hexstr).unwrap();
    LimbsBuffer::from_limbs(&limbs, class).unwrap()
}

#[test]
fn test_new() {
    let buf = LimbsBuffer::new(3, MemoryClass::Ordinary).unwrap();
    assert_eq!(buf.capacity(), 3);
    assert_eq!(buf.nlimbs(), 0);
    assert!(!buf.is_secure());
    assert!(buf.limbs().is_empty());

    let mut buf = LimbsBuffer::new(2, MemoryClass::Secure).unwrap();
    assert!(buf.is_secure());
    assert_eq!(buf.class(), MemoryClass::Secure);
    assert!(buf.as_mut_slice().iter().all(|l| *l == 0));

    assert_eq!(
        LimbsBuffer::new(usize::MAX, MemoryClass::Ordinary).unwrap_err(),
        LimbsBufferError::AllocationFailed { nlimbs: usize::MAX }
    );
}

#[test]
fn test_set_nlimbs_normalize() {
    let mut buf = LimbsBuffer::new(3, MemoryClass::Ordinary).unwrap();
    buf.as_mut_slice()[..2].copy_from_slice(&[5, 0]);
    buf.set_nlimbs(3).unwrap();
    assert_eq!(buf.limbs(), [5, 0, 0]);
    buf.normalize();
    assert_eq!(buf.limbs(), [5]);
    assert_eq!(
        buf.set_nlimbs(4),
        Err(LimbsBufferError::InsufficientCapacity {
            nlimbs: 4,
            capacity: 3
        })
    );
    assert_eq!(buf.nlimbs(), 1);
}

#[test]
fn test_bytes_conversions() {
    let buf = LimbsBuffer::from_be_bytes(&[0, 0, 1, 2, 3], MemoryClass::Ordinary).unwrap();
    assert_eq!(buf.limbs(), [0x010203]);
    assert_eq!(buf.bit_len(), 17);
    assert_eq!(*buf.to_be_bytes().unwrap(), [1, 2, 3]);

    let bytes: Vec<u8> = (1..=(2 * LIMB_BYTES as u8 + 1)).collect();
    let buf = LimbsBuffer::from_be_bytes(&bytes, MemoryClass::Secure).unwrap();
    assert_eq!(buf.nlimbs(), 3);
    assert_eq!(buf.limbs()[2], 1);
    assert_eq!(buf.bit_len(), 2 * LIMB_BITS as usize + 1);
    assert_eq!(*buf.to_be_bytes().unwrap(), bytes);

    let buf = LimbsBuffer::from_be_bytes(&[0, 0], MemoryClass::Ordinary).unwrap();
    assert_eq!(buf.nlimbs(), 0);
    assert_eq!(buf.bit_len(), 0);
    assert!(buf.to_be_bytes().unwrap().is_empty());
}

#[test]
fn test_ensure_capacity() {
    let mut buf = LimbsBuffer::from_limbs(&[1, 2], MemoryClass::Secure).unwrap();
    buf.ensure_capacity(1).unwrap();
    assert_eq!(buf.capacity(), 2);
    buf.ensure_capacity(5).unwrap();
    assert_eq!(buf.capacity(), 5);
    assert_eq!(buf.limbs(), [1, 2]);
    assert!(buf.is_secure());
    assert!(buf.as_mut_slice()[2..].iter().all(|l| *l == 0));
}

#[test]
fn test_clone_assign_clear() {
    let secure = LimbsBuffer::from_limbs(&[7, 8], MemoryClass::Secure).unwrap();
    let cloned = secure.try_clone().unwrap();
    assert!(cloned.is_secure());
    assert_eq!(cloned.limbs(), [7, 8]);

    let mut buf = LimbsBuffer::from_limbs(&[1, 2, 3], MemoryClass::Ordinary).unwrap();
    buf.assign(&secure).unwrap();
    assert!(buf.is_secure());
    assert_eq!(buf.limbs(), [7, 8]);
    assert_eq!(buf.as_mut_slice()[2], 0);

    // Assigning from an ordinary buffer never demotes.
    let ordinary = LimbsBuffer::from_limbs(&[9], MemoryClass::Ordinary).unwrap();
    buf.assign(&ordinary).unwrap();
    assert!(buf.is_secure());
    assert_eq!(buf.limbs(), [9]);

    buf.clear();
    assert_eq!(buf.nlimbs(), 0);
    assert_eq!(buf.capacity(), 3);
    assert!(buf.as_mut_slice().iter().all(|l| *l == 0));
}

#[test]
fn test_debug_redacts_secure() {
    let buf = LimbsBuffer::from_limbs(&[0x1234], MemoryClass::Secure).unwrap();
    assert!(!alloc::format!("{:?}", buf).contains('['));
    let buf = LimbsBuffer::from_limbs(&[0x1234], MemoryClass::Ordinary).unwrap();
    assert!(alloc::format!("{:?}", buf).contains("limbs: [4660]"));
}

#[test]
fn test_set_mul_sqr() {
    let op0 = test_buffer_from_hexstr("ffffffff", MemoryClass::Ordinary);
    let op1 = test_buffer_from_hexstr("2", MemoryClass::Ordinary);
    let mut result = LimbsBuffer::new(0, MemoryClass::Ordinary).unwrap();
    result.set_mul(&op0, &op1).unwrap();
    assert_eq!(*result.to_be_bytes().unwrap(), [0x01, 0xff, 0xff, 0xff, 0xfe]);
    assert!(!result.is_secure());

    let secret = test_buffer_from_hexstr("0x100000000", MemoryClass::Secure);
    result.set_mul(&secret, &op1).unwrap();
    assert_eq!(*result.to_be_bytes().unwrap(), [0x02, 0, 0, 0, 0]);
    assert!(result.is_secure());

    let mut square = LimbsBuffer::new(0, MemoryClass::Ordinary).unwrap();
    square.set_sqr(&op0).unwrap();
    let mut prod = LimbsBuffer::new(0, MemoryClass::Ordinary).unwrap();
    prod.set_mul(&op0, &op0).unwrap();
    assert_eq!(square.limbs(), prod.limbs());
    assert_eq!(
        *square.to_be_bytes().unwrap(),
        [0xff, 0xff, 0xff, 0xfe, 0x00, 0x00, 0x00, 0x01]
    );

    let zero = LimbsBuffer::new(0, MemoryClass::Ordinary).unwrap();
    prod.set_mul(&op0, &zero).unwrap();
    assert_eq!(prod.nlimbs(), 0);
}

#[test]
fn test_set_add_sub() {
    let op0 = LimbsBuffer::from_limbs(&[!0, !0], MemoryClass::Ordinary).unwrap();
    let op1 = LimbsBuffer::from_limbs(&[1], MemoryClass::Secure).unwrap();
    let mut result = LimbsBuffer::new(1, MemoryClass::Ordinary).unwrap();
    result.set_add(&op1, &op0).unwrap();
    assert_eq!(result.limbs(), [0, 0, 1]);
    assert!(result.is_secure());

    let mut diff = LimbsBuffer::new(0, MemoryClass::Ordinary).unwrap();
    assert_eq!(diff.set_sub(&result, &op1).unwrap(), 0);
    assert_eq!(diff.limbs(), op0.limbs());

    assert_eq!(diff.set_sub(&op1, &op0).unwrap(), 1);
    // 1 - (B^2 - 1) mod B^2
    assert_eq!(diff.limbs(), [2]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{limbs_strategy, limbs_to_biguint};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn set_mul_matches_reference(op0 in limbs_strategy(6), op1 in limbs_strategy(6)) {
            let a = LimbsBuffer::from_limbs(&op0, MemoryClass::Ordinary).unwrap();
            let b = LimbsBuffer::from_limbs(&op1, MemoryClass::Secure).unwrap();
            let mut result = LimbsBuffer::new(0, MemoryClass::Ordinary).unwrap();
            result.set_mul(&a, &b).unwrap();
            prop_assert!(result.is_secure());
            prop_assert_eq!(
                limbs_to_biguint(result.limbs()),
                limbs_to_biguint(&op0) * limbs_to_biguint(&op1)
            );
            prop_assert_eq!(result.nlimbs(), normalized_len(result.limbs()));
        }

        #[test]
        fn be_bytes_round_trip(op0 in limbs_strategy(4)) {
            let buf = LimbsBuffer::from_limbs(&op0, MemoryClass::Ordinary).unwrap();
            let bytes = buf.to_be_bytes().unwrap();
            prop_assert!(bytes.first().map_or(true, |b| *b != 0));
            let restored = LimbsBuffer::from_be_bytes(&bytes, MemoryClass::Ordinary).unwrap();
            prop_assert_eq!(restored.limbs(), buf.limbs());
            prop_assert_eq!(limbs_to_biguint(restored.limbs()), limbs_to_biguint(&op0));
        }
    }
}
