//! Arithmetic, comparison, and bitwise opcodes. All arithmetic is modulo
//! 32768; all three-operand forms write their result through the first
//! operand, which must name a register.

use crate::consts::MODULUS;
use crate::error::VmError;
use crate::word::Word;

use super::Vm;

impl Vm {
    pub(crate) fn op_set(&mut self, a: Word, b: Word) -> Result<(), VmError> {
        let value = self.resolve(b)?;
        self.write_dest(a, value)
    }

    pub(crate) fn op_eq(&mut self, a: Word, b: Word, c: Word) -> Result<(), VmError> {
        let (b, c) = (self.resolve(b)?, self.resolve(c)?);
        self.write_dest(a, if b == c { 1 } else { 0 })
    }

    pub(crate) fn op_gt(&mut self, a: Word, b: Word, c: Word) -> Result<(), VmError> {
        let (b, c) = (self.resolve(b)?, self.resolve(c)?);
        self.write_dest(a, if b > c { 1 } else { 0 })
    }

    pub(crate) fn op_add(&mut self, a: Word, b: Word, c: Word) -> Result<(), VmError> {
        let (b, c) = (self.resolve(b)?, self.resolve(c)?);
        self.write_dest(a, (b + c) % MODULUS)
    }

    pub(crate) fn op_mult(&mut self, a: Word, b: Word, c: Word) -> Result<(), VmError> {
        let (b, c) = (self.resolve(b)? as u64, self.resolve(c)? as u64);
        self.write_dest(a, ((b * c) % MODULUS as u64) as Word)
    }

    pub(crate) fn op_mod(&mut self, a: Word, b: Word, c: Word) -> Result<(), VmError> {
        let (b, c) = (self.resolve(b)?, self.resolve(c)?);
        if c == 0 {
            return Err(VmError::DivisionByZero);
        }
        self.write_dest(a, b % c)
    }

    pub(crate) fn op_and(&mut self, a: Word, b: Word, c: Word) -> Result<(), VmError> {
        let (b, c) = (self.resolve(b)?, self.resolve(c)?);
        self.write_dest(a, b & c)
    }

    pub(crate) fn op_or(&mut self, a: Word, b: Word, c: Word) -> Result<(), VmError> {
        let (b, c) = (self.resolve(b)?, self.resolve(c)?);
        self.write_dest(a, b | c)
    }

    pub(crate) fn op_not(&mut self, a: Word, b: Word) -> Result<(), VmError> {
        let b = self.resolve(b)?;
        self.write_dest(a, !b & (MODULUS - 1))
    }
}
