//! The four-kind error taxonomy: fatal engine errors, recoverable tooling
//! errors, user-facing shell errors, and the top-level error that unifies
//! them at the CLI boundary.

use std::io;

use thiserror::Error;

use crate::word::Word;

/// Kind 1: fatal VM errors. Any of these halts the VM and is surfaced to the
/// caller as a structured message; the engine never retries on its own.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VmError {
    #[error("unknown opcode {0} at address {1}")]
    UnknownOpcode(Word, usize),

    #[error("pop from empty stack")]
    StackUnderflow,

    #[error("memory address {0} out of range (size {1})")]
    MemoryOutOfRange(usize, usize),

    #[error("program counter {0} out of range (size {1})")]
    PcOutOfRange(usize, usize),

    #[error("word {0} is not a valid register reference")]
    InvalidRegister(Word),

    #[error("operand {0} used as a write destination is not a register reference")]
    InvalidWriteDestination(Word),

    #[error("division by zero in `mod`")]
    DivisionByZero,
}

/// Kind 3: recoverable tooling errors (parsing, snapshot files, pattern
/// search cardinality). Always surfaced to the caller, never panics.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("vm halted with a fatal error: {0}")]
    Vm(#[from] VmError),

    #[error("failed to parse exits from output")]
    ExitsNotFound,

    #[error("failed to parse items from output")]
    ItemsNotFound,

    #[error("code not found in output: {0}")]
    CodeNotFound(&'static str),

    #[error("expected exactly one match for pattern {name}, found {count}")]
    PatternCardinality { name: &'static str, count: usize },

    #[error("could not identify the location-address candidate")]
    LocationNotFound,

    #[error("could not identify an inventory flag address for item {0:?}")]
    ItemAddressNotFound(String),

    #[error("no solution found for {0}")]
    NoSolution(&'static str),

    #[error("snapshot file corrupted: {0}")]
    SnapshotCorrupt(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed architecture spec: {0}")]
    ArchSpec(String),
}

/// Kind 4: user errors at the interactive shell. Reported to the console; the
/// VM itself is left untouched.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("unknown debug command: {0}")]
    UnknownCommand(String),

    #[error("malformed argument to `.{command}`: {detail}")]
    MalformedArgument { command: String, detail: String },

    #[error(transparent)]
    Tool(#[from] ToolError),
}

/// The top-level error that unifies all three kinds at the CLI boundary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Vm(#[from] VmError),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error(transparent)]
    Shell(#[from] ShellError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
