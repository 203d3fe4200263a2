//! Control flow (`jmp`/`jt`/`jf`/`call`/`ret`) and indirect memory access
//! (`rmem`/`wmem`). Jumps set `pc` directly, so the tick loop must not
//! advance past them afterward.

use crate::error::VmError;
use crate::word::Word;

use super::Vm;

impl Vm {
    pub(crate) fn op_jmp(&mut self, a: Word) -> Result<(), VmError> {
        let target = self.resolve(a)?;
        self.jump(target);
        Ok(())
    }

    pub(crate) fn op_jt(&mut self, a: Word, b: Word) -> Result<bool, VmError> {
        let (cond, target) = (self.resolve(a)?, self.resolve(b)?);
        if cond != 0 {
            self.jump(target);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub(crate) fn op_jf(&mut self, a: Word, b: Word) -> Result<bool, VmError> {
        let (cond, target) = (self.resolve(a)?, self.resolve(b)?);
        if cond == 0 {
            self.jump(target);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub(crate) fn op_call(&mut self, a: Word, return_addr: Word) -> Result<(), VmError> {
        let target = self.resolve(a)?;
        self.stack.push(return_addr);
        self.jump(target);
        Ok(())
    }

    /// Returns `false` if the stack was empty (a program that `ret`s with
    /// nothing to return to has halted, per the architecture spec).
    pub(crate) fn op_ret(&mut self) -> Result<bool, VmError> {
        match self.stack.pop() {
            Ok(target) => {
                self.jump(target);
                Ok(true)
            }
            Err(VmError::StackUnderflow) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub(crate) fn op_push(&mut self, a: Word) -> Result<(), VmError> {
        let value = self.resolve(a)?;
        self.stack.push(value);
        Ok(())
    }

    pub(crate) fn op_pop(&mut self, a: Word) -> Result<(), VmError> {
        let value = self.stack.pop()?;
        self.write_dest(a, value)
    }

    pub(crate) fn op_rmem(&mut self, a: Word, b: Word) -> Result<(), VmError> {
        let src = self.resolve(b)? as usize;
        let value = self.memory.get(src)?;
        self.write_dest(a, value)
    }

    pub(crate) fn op_wmem(&mut self, a: Word, b: Word) -> Result<(), VmError> {
        let dest = self.resolve(a)? as usize;
        let value = self.resolve(b)?;
        self.memory.set(dest, value)
    }
}

#[cfg(test)]
mod tests {
    use crate::memory::MemoryImage;
    use crate::vm::Vm;

    fn vm() -> Vm {
        Vm::new(MemoryImage::from_words(vec![0; 16]))
    }

    #[test]
    fn jt_jumps_only_on_nonzero() {
        let mut vm = vm();
        assert!(!vm.op_jt(0, 9).unwrap());
        assert!(vm.op_jt(1, 9).unwrap());
        assert_eq!(vm.pc(), 9);
    }

    #[test]
    fn call_pushes_return_address_and_jumps() {
        let mut vm = vm();
        vm.op_call(42, 3).unwrap();
        assert_eq!(vm.pc(), 42);
        assert_eq!(vm.stack().as_slice(), &[3]);
    }

    #[test]
    fn ret_with_empty_stack_signals_halt() {
        let mut vm = vm();
        assert!(!vm.op_ret().unwrap());
    }

    #[test]
    fn wmem_then_rmem_round_trips_a_value() {
        let mut vm = vm();
        vm.op_wmem(4, 77).unwrap();
        vm.op_rmem(32768, 4).unwrap();
        assert_eq!(vm.registers()[0], 77);
    }
}
