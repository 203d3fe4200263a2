//! Per-opcode properties checked against random operand triples within the
//! legal domain (SPEC_FULL §8).

use quickcheck_macros::quickcheck;

use vm16::memory::MemoryImage;
use vm16::vm::{TickOutcome, Vm};

#[quickcheck]
fn add_and_mult_stay_in_range(a: u16, b: u16) -> bool {
    let a = a as u32 % 32768;
    let b = b as u32 % 32768;

    // add 32768(=r0), a, b ; halt
    let mut vm = Vm::new(MemoryImage::from_words(vec![9, 32768, a, b, 0]));
    vm.run().unwrap();
    let add_in_range = vm.registers()[0] < 32768;

    let mut vm = Vm::new(MemoryImage::from_words(vec![10, 32768, a, b, 0]));
    vm.run().unwrap();
    let mult_in_range = vm.registers()[0] < 32768;

    add_in_range && mult_in_range
}

#[quickcheck]
fn eq_and_gt_write_only_zero_or_one(a: u16, b: u16) -> bool {
    let a = a as u32 % 32768;
    let b = b as u32 % 32768;

    let mut vm = Vm::new(MemoryImage::from_words(vec![4, 32768, a, b, 0]));
    vm.run().unwrap();
    let eq_ok = vm.registers()[0] == 0 || vm.registers()[0] == 1;

    let mut vm = Vm::new(MemoryImage::from_words(vec![5, 32768, a, b, 0]));
    vm.run().unwrap();
    let gt_ok = vm.registers()[0] == 0 || vm.registers()[0] == 1;

    eq_ok && gt_ok
}

#[test]
fn set_then_read_yields_the_source_value() {
    // set r0, 777 ; halt
    let mut vm = Vm::new(MemoryImage::from_words(vec![1, 32768, 777, 0]));
    vm.run().unwrap();
    assert_eq!(vm.registers()[0], 777);
}

#[quickcheck]
fn push_then_pop_restores_the_value_and_stack_length(value: u16) -> bool {
    let value = value as u32 % 32768;
    // push value ; pop r0 ; halt
    let mut vm = Vm::new(MemoryImage::from_words(vec![2, value, 3, 32768, 0]));
    let before_len = vm.stack().len();
    vm.run().unwrap();
    vm.registers()[0] == value && vm.stack().len() == before_len
}

#[test]
fn jmp_never_alters_anything_but_pc() {
    // jmp 3 ; <unreachable> ; halt
    let mut vm = Vm::new(MemoryImage::from_words(vec![6, 3, 0, 0]));
    let before = vm.snapshot();
    vm.run().unwrap();
    let after = vm.snapshot();
    assert_eq!(before.registers, after.registers);
    assert_eq!(before.stack, after.stack);
    assert_ne!(before.pc, after.pc);
}

#[test]
fn unknown_opcode_halts_with_a_fatal_error() {
    let mut vm = Vm::new(MemoryImage::from_words(vec![9999]));
    assert!(vm.run().is_err());
}

#[test]
fn in_suspension_leaves_pc_pointing_at_the_in_instruction() {
    let mut vm = Vm::new(MemoryImage::from_words(vec![20, 32768, 0]));
    assert_eq!(vm.run().unwrap(), TickOutcome::Suspended);
    assert_eq!(vm.pc(), 0);
}

#[test]
fn clone_can_diverge_without_shared_state() {
    let mut vm = Vm::new(MemoryImage::from_words(vec![0; 4]));
    let mut clone = vm.clone();
    clone.set_register(0, 5).unwrap();
    assert_eq!(vm.registers()[0], 0);
    assert_eq!(clone.registers()[0], 5);
}
