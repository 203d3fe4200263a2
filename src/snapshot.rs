//! VM state snapshots: deep-copy capture, atomic restore, and structural
//! diffing between two snapshots.
//!
//! Grounded on the teacher's `interpreter/diff.rs` `Capture`/`Change` split,
//! simplified from its GAT-based per-category `Change<T>` enum down to two
//! shapes: scalars diff to an (old, new) pair, sequences diff to a list of
//! `(index, old, new)` triples over the union of both lengths.

use itertools::{EitherOrBoth, Itertools};
use serde::{Deserialize, Serialize};

use crate::consts::REGISTER_COUNT;
use crate::vm::Vm;
use crate::word::Word;

/// A full, independent copy of a VM's mutable state: full memory, full
/// stack, all registers, `pc`, both I/O buffers, and the two addresses
/// discovered by the explorer and the teleporter patcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub memory: Vec<Word>,
    pub registers: [Word; REGISTER_COUNT],
    pub stack: Vec<Word>,
    pub pc: usize,
    pub input: Vec<u8>,
    pub output: String,
    pub location_addr: Option<usize>,
    pub teleporter_call_addr: Option<usize>,
}

impl Vm {
    /// Captures the current state. The clone is fully independent: mutating
    /// the VM afterward never touches the snapshot, and vice versa.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            memory: self.memory.as_slice().to_vec(),
            registers: self.registers,
            stack: self.stack.as_slice().to_vec(),
            pc: self.pc,
            input: self.peek_input(),
            output: self.peek_output().to_string(),
            location_addr: self.location_addr,
            teleporter_call_addr: self.teleporter_call_addr,
        }
    }

    /// Replaces the VM's state with a snapshot's, all at once. Registered
    /// hooks are untouched: a bypass installed after the snapshot was taken
    /// stays installed, since it lives on the VM rather than being part of
    /// captured state.
    pub fn apply_snapshot(&mut self, snapshot: &Snapshot) {
        self.memory = crate::memory::MemoryImage::from_words(snapshot.memory.clone());
        self.registers = snapshot.registers;
        self.stack = crate::vm::Stack::from_words(snapshot.stack.clone());
        self.pc = snapshot.pc;
        self.set_input(snapshot.input.clone());
        self.set_output(snapshot.output.clone());
        self.location_addr = snapshot.location_addr;
        self.teleporter_call_addr = snapshot.teleporter_call_addr;
    }
}

/// One field's worth of difference between two snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotDiff {
    pub pc: Option<(usize, usize)>,
    pub registers: Vec<(usize, Option<Word>, Option<Word>)>,
    pub stack: Vec<(usize, Option<Word>, Option<Word>)>,
    pub memory: Vec<(usize, Option<Word>, Option<Word>)>,
}

impl SnapshotDiff {
    pub fn is_empty(&self) -> bool {
        self.pc.is_none()
            && self.registers.is_empty()
            && self.stack.is_empty()
            && self.memory.is_empty()
    }
}

fn diff_sequence(old: &[Word], new: &[Word]) -> Vec<(usize, Option<Word>, Option<Word>)> {
    old.iter()
        .copied()
        .zip_longest(new.iter().copied())
        .enumerate()
        .filter_map(|(idx, pair)| match pair {
            EitherOrBoth::Both(a, b) if a == b => None,
            EitherOrBoth::Both(a, b) => Some((idx, Some(a), Some(b))),
            EitherOrBoth::Left(a) => Some((idx, Some(a), None)),
            EitherOrBoth::Right(b) => Some((idx, None, Some(b))),
        })
        .collect()
}

/// Computes a structural diff between two snapshots: scalars (`pc`) diff to
/// an `(old, new)` pair when they differ, sequences (`registers`, `stack`,
/// `memory`) diff index-by-index over the longer of the two lengths.
pub fn diff(old: &Snapshot, new: &Snapshot) -> SnapshotDiff {
    SnapshotDiff {
        pc: if old.pc == new.pc { None } else { Some((old.pc, new.pc)) },
        registers: diff_sequence(&old.registers, &new.registers),
        stack: diff_sequence(&old.stack, &new.stack),
        memory: diff_sequence(&old.memory, &new.memory),
    }
}
