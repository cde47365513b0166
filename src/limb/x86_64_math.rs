// SPDX-License-Identifier: Apache-2.0

//! x86_64 implementations of the double-word primitives.
//!
//! The carry and borrow chains map directly onto `adc` and `sbb`, the double width product onto
//! `mul`. None of the instructions used here have operand dependent timing.

use super::{DoubleLimb, LimbType};
use core::arch::asm;

pub fn ct_is_nonzero_l(v: LimbType) -> LimbType {
    let result: LimbType;
    unsafe {
        asm!("xor {result:r}, {result:r};\
              test {v:r}, {v:r};\
              setnz {result:l};\
              ",
             v = in(reg) v,
             result = out(reg) result,
             options(pure, nomem, nostack),
        );
    }
    result
}

pub fn ct_is_zero_l(v: LimbType) -> LimbType {
    let result: LimbType;
    unsafe {
        asm!("xor {result:r}, {result:r};\
              test {v:r}, {v:r};\
              setz {result:l};\
              ",
             v = in(reg) v,
             result = out(reg) result,
             options(pure, nomem, nostack),
        );
    }
    result
}

pub fn ct_add_l_l(v0: LimbType, v1: LimbType) -> (LimbType, LimbType) {
    let result: LimbType;
    let carry: LimbType;
    unsafe {
        asm!("xor {carry:r}, {carry:r};\
              add {v0:r}, {v1:r};\
              setc {carry:l};\
              ",
             v0 = inout(reg) v0 => result,
             v1 = in(reg) v1,
             carry = out(reg) carry,
             options(pure, nomem, nostack),
        );
    }
    (carry, result)
}

pub fn ct_add_l_l_c(v0: LimbType, v1: LimbType, carry: LimbType) -> (LimbType, LimbType) {
    debug_assert!(carry <= 1);
    let result: LimbType;
    let carry_out: LimbType;
    unsafe {
        // Adding all ones to the incoming carry moves it into CF.
        asm!("add {carry:r}, -1;\
              adc {v0:r}, {v1:r};\
              setc {carry:l};\
              movzx {carry:e}, {carry:l};\
              ",
             v0 = inout(reg) v0 => result,
             v1 = in(reg) v1,
             carry = inout(reg) carry => carry_out,
             options(pure, nomem, nostack),
        );
    }
    (carry_out, result)
}

pub fn ct_sub_l_l(v0: LimbType, v1: LimbType) -> (LimbType, LimbType) {
    let result: LimbType;
    let borrow: LimbType;
    unsafe {
        asm!("xor {borrow:r}, {borrow:r};\
              sub {v0:r}, {v1:r};\
              setc {borrow:l};\
              ",
             v0 = inout(reg) v0 => result,
             v1 = in(reg) v1,
             borrow = out(reg) borrow,
             options(pure, nomem, nostack),
        );
    }
    (borrow, result)
}

pub fn ct_sub_l_l_b(v0: LimbType, v1: LimbType, borrow: LimbType) -> (LimbType, LimbType) {
    debug_assert!(borrow <= 1);
    let result: LimbType;
    let borrow_out: LimbType;
    unsafe {
        asm!("add {borrow:r}, -1;\
              sbb {v0:r}, {v1:r};\
              setc {borrow:l};\
              movzx {borrow:e}, {borrow:l};\
              ",
             v0 = inout(reg) v0 => result,
             v1 = in(reg) v1,
             borrow = inout(reg) borrow => borrow_out,
             options(pure, nomem, nostack),
        );
    }
    (borrow_out, result)
}

pub fn ct_mul_l_l(v0: LimbType, v1: LimbType) -> DoubleLimb {
    let mut l: LimbType = v0;
    let h: LimbType;
    unsafe {
        asm!("mul {v1:r};",
             inout("rax") l,
             out("rdx") h,
             v1 = in(reg) v1,
             options(pure, nomem, nostack),
        );
    }
    DoubleLimb::new(h, l)
}

pub fn ct_mul_add_l_l_l_c(
    op0: LimbType,
    op10: LimbType,
    op11: LimbType,
    carry: LimbType,
) -> (LimbType, LimbType) {
    let result: LimbType;
    let carry_out: LimbType;
    unsafe {
        asm!("mul {op11:r};\
              add rax, {op0:r};\
              adc rdx, 0;\
              add rax, {carry:r};\
              adc rdx, 0;\
              ",
             inout("rax") op10 => result,
             out("rdx") carry_out,
             op11 = in(reg) op11,
             op0 = in(reg) op0,
             carry = in(reg) carry,
             options(pure, nomem, nostack),
        );
    }
    (carry_out, result)
}

pub fn ct_mul_sub_l_l_l_b(
    op0: LimbType,
    op10: LimbType,
    op11: LimbType,
    borrow: LimbType,
) -> (LimbType, LimbType) {
    let result: LimbType;
    let borrow_out: LimbType;
    unsafe {
        asm!("mul {op11:r};\
              sub {op0:r}, rax;\
              adc rdx, 0;\
              sub {op0:r}, {borrow:r};\
              adc rdx, 0;\
              ",
             inout("rax") op10 => _,
             out("rdx") borrow_out,
             op11 = in(reg) op11,
             op0 = inout(reg) op0 => result,
             borrow = in(reg) borrow,
             options(pure, nomem, nostack),
        );
    }
    (borrow_out, result)
}
