//! VM parameters

/// Number of general-purpose registers.
pub const REGISTER_COUNT: usize = 8;

/// Words below this value are immediates; at or above it they name a register.
pub const REGISTER_BASE: u32 = 32768;

/// One past the highest valid register reference (`REGISTER_BASE + REGISTER_COUNT`).
pub const REGISTER_LIMIT: u32 = REGISTER_BASE + REGISTER_COUNT as u32;

/// Modulus for arithmetic (`add`, `mult`) and the immediate value space.
pub const MODULUS: u32 = 32768;

/// Number of opcodes defined by the architecture spec, ids `0..=21`.
pub const OPCODE_COUNT: usize = 22;

/// Default path to the bytecode image.
pub const DEFAULT_BINARY: &str = "challenge.bin";

/// Default path to the architecture spec file.
pub const DEFAULT_ARCHFILE: &str = "arch-spec";

/// Default snapshot directory.
pub const DEFAULT_SNAPSHOT_DIR: &str = "snapshots";

/// Default macro directory.
pub const DEFAULT_MACRO_DIR: &str = "macros";

/// Default name used by `.save`/`.load` when none is given.
pub const DEFAULT_SNAPSHOT_NAME: &str = "last";

/// Default inventory-flag address range used by `giveall` (start, end inclusive, stride).
pub const DEFAULT_GIVEALL_RANGE: (u16, u16, u16) = (2670, 2734, 4);

/// Register values installed by the teleporter-call bypass.
pub const TELEPORT_BYPASS_REGISTERS: (u16, u16, u16) = (6, 5, 25734);
