//! The fetch/decode/execute tick and the run loop built on top of it.

use tracing::{instrument, trace, warn};

use crate::error::VmError;

use super::Vm;

/// Outcome of a single tick, or of running ticks to a stopping point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The VM executed an instruction and is ready for the next tick.
    Proceed,
    /// The VM hit `in` with no input available; `pc` is unchanged so the
    /// same instruction runs again once input is fed.
    Suspended,
    /// `halt` executed, or `ret` popped an empty stack.
    Halted,
}

impl Vm {
    /// Executes exactly one instruction (or applies a registered call
    /// bypass in its place), returning what happened.
    #[instrument(level = "trace", skip(self), fields(pc = self.pc))]
    pub fn step(&mut self) -> Result<TickOutcome, VmError> {
        if let Some(bypass) = self.hooks.bypass_at(self.pc) {
            trace!(pc = self.pc, "applying registered call bypass");
            self.set_register(0, bypass.r0)?;
            self.set_register(1, bypass.r1)?;
            self.set_register(7, bypass.r7)?;
            self.advance(2);
            return Ok(TickOutcome::Proceed);
        }

        let op = self.fetch(0)?;
        match op {
            0 => {
                trace!("halt");
                Ok(TickOutcome::Halted)
            }
            1 => {
                let (a, b) = (self.fetch(1)?, self.fetch(2)?);
                self.op_set(a, b)?;
                self.advance(3);
                Ok(TickOutcome::Proceed)
            }
            2 => {
                let a = self.fetch(1)?;
                self.op_push(a)?;
                self.advance(2);
                Ok(TickOutcome::Proceed)
            }
            3 => {
                let a = self.fetch(1)?;
                self.op_pop(a)?;
                self.advance(2);
                Ok(TickOutcome::Proceed)
            }
            4 => {
                let (a, b, c) = (self.fetch(1)?, self.fetch(2)?, self.fetch(3)?);
                self.op_eq(a, b, c)?;
                self.advance(4);
                Ok(TickOutcome::Proceed)
            }
            5 => {
                let (a, b, c) = (self.fetch(1)?, self.fetch(2)?, self.fetch(3)?);
                self.op_gt(a, b, c)?;
                self.advance(4);
                Ok(TickOutcome::Proceed)
            }
            6 => {
                let a = self.fetch(1)?;
                self.op_jmp(a)?;
                Ok(TickOutcome::Proceed)
            }
            7 => {
                let (a, b) = (self.fetch(1)?, self.fetch(2)?);
                if !self.op_jt(a, b)? {
                    self.advance(3);
                }
                Ok(TickOutcome::Proceed)
            }
            8 => {
                let (a, b) = (self.fetch(1)?, self.fetch(2)?);
                if !self.op_jf(a, b)? {
                    self.advance(3);
                }
                Ok(TickOutcome::Proceed)
            }
            9 => {
                let (a, b, c) = (self.fetch(1)?, self.fetch(2)?, self.fetch(3)?);
                self.op_add(a, b, c)?;
                self.advance(4);
                Ok(TickOutcome::Proceed)
            }
            10 => {
                let (a, b, c) = (self.fetch(1)?, self.fetch(2)?, self.fetch(3)?);
                self.op_mult(a, b, c)?;
                self.advance(4);
                Ok(TickOutcome::Proceed)
            }
            11 => {
                let (a, b, c) = (self.fetch(1)?, self.fetch(2)?, self.fetch(3)?);
                self.op_mod(a, b, c)?;
                self.advance(4);
                Ok(TickOutcome::Proceed)
            }
            12 => {
                let (a, b, c) = (self.fetch(1)?, self.fetch(2)?, self.fetch(3)?);
                self.op_and(a, b, c)?;
                self.advance(4);
                Ok(TickOutcome::Proceed)
            }
            13 => {
                let (a, b, c) = (self.fetch(1)?, self.fetch(2)?, self.fetch(3)?);
                self.op_or(a, b, c)?;
                self.advance(4);
                Ok(TickOutcome::Proceed)
            }
            14 => {
                let (a, b) = (self.fetch(1)?, self.fetch(2)?);
                self.op_not(a, b)?;
                self.advance(3);
                Ok(TickOutcome::Proceed)
            }
            15 => {
                let (a, b) = (self.fetch(1)?, self.fetch(2)?);
                self.op_rmem(a, b)?;
                self.advance(3);
                Ok(TickOutcome::Proceed)
            }
            16 => {
                let (a, b) = (self.fetch(1)?, self.fetch(2)?);
                self.op_wmem(a, b)?;
                self.advance(3);
                Ok(TickOutcome::Proceed)
            }
            17 => {
                let a = self.fetch(1)?;
                let return_addr = (self.pc + 2) as u32;
                self.op_call(a, return_addr)?;
                Ok(TickOutcome::Proceed)
            }
            18 => {
                if self.op_ret()? {
                    Ok(TickOutcome::Proceed)
                } else {
                    Ok(TickOutcome::Halted)
                }
            }
            19 => {
                let a = self.fetch(1)?;
                self.op_out(a)?;
                self.advance(2);
                Ok(TickOutcome::Proceed)
            }
            20 => {
                let a = self.fetch(1)?;
                if self.op_in(a)? {
                    self.advance(2);
                    Ok(TickOutcome::Proceed)
                } else {
                    Ok(TickOutcome::Suspended)
                }
            }
            21 => {
                self.advance(1);
                Ok(TickOutcome::Proceed)
            }
            other => {
                warn!(pc = self.pc, opcode = other, "unknown opcode");
                Err(VmError::UnknownOpcode(other, self.pc))
            }
        }
    }

    /// Runs ticks until the VM suspends on `in`, halts, or hits an error.
    pub fn run(&mut self) -> Result<TickOutcome, VmError> {
        loop {
            match self.step()? {
                TickOutcome::Proceed => continue,
                outcome => return Ok(outcome),
            }
        }
    }

    /// Feeds a line of input (with its trailing newline) and runs until the
    /// next suspension, halt, or error.
    pub fn send(&mut self, line: &str) -> Result<TickOutcome, VmError> {
        self.feed_input(line);
        self.feed_input("\n");
        self.run()
    }
}
