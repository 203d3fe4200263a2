//! Opcode table: id -> (name, arity), parsed once from the architecture spec.
//!
//! The architecture spec parser itself is a collaborator (SPEC_FULL §2): a
//! trivial line-oriented scan, not a subject of the core's invariants. The
//! table it produces is what the engine actually depends on.

use std::collections::HashMap;
use std::fmt;

use regex::Regex;

use crate::error::ToolError;

/// A single opcode definition: its mnemonic, numeric id, and operand count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpcodeEntry {
    pub name: String,
    pub id: u16,
    pub arity: u8,
}

impl fmt::Display for OpcodeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.id)
    }
}

/// Id-indexed opcode table.
#[derive(Debug, Clone, Default)]
pub struct OpcodeTable {
    by_id: HashMap<u16, OpcodeEntry>,
}

impl OpcodeTable {
    /// Parse an architecture spec's text, extracting every `<name>: <id> <arg>*`
    /// line. Argument tokens after the id only count toward arity; their
    /// textual content is irrelevant to decoding (SPEC_FULL §6).
    pub fn parse(spec_text: &str) -> Result<Self, ToolError> {
        let line_re = Regex::new(r"(?m)^(.*): (\d+)(.*?)$").expect("static regex is valid");

        let mut by_id = HashMap::new();
        for caps in line_re.captures_iter(spec_text) {
            let name = caps[1].trim().to_string();
            let id: u16 = caps[2]
                .parse()
                .map_err(|_| ToolError::ArchSpec(format!("non-numeric opcode id on line: {}", &caps[0])))?;
            let arity = caps[3].split_whitespace().count() as u8;

            by_id.insert(id, OpcodeEntry { name, id, arity });
        }

        if by_id.is_empty() {
            return Err(ToolError::ArchSpec("no opcode definitions found".into()));
        }

        Ok(Self { by_id })
    }

    /// Look up an opcode by id.
    pub fn get(&self, id: u16) -> Option<&OpcodeEntry> {
        self.by_id.get(&id)
    }

    /// Look up an opcode's mnemonic name, falling back to a placeholder for
    /// unrecognized ids (used by the disassembler's raw-value fallback).
    pub fn name_of(&self, id: u16) -> &str {
        self.by_id.get(&id).map(|e| e.name.as_str()).unwrap_or("?")
    }
}

/// Scrapes `Here's a code for the challenge website: <token>` out of the
/// architecture spec's free-form banner (SPEC_FULL §4.7 step 1).
pub fn scrape_archspec_code(spec_text: &str) -> Result<String, ToolError> {
    let re = Regex::new(r"Here's a code for the challenge website: (\S+)").expect("static regex is valid");
    re.captures(spec_text)
        .map(|c| c[1].to_string())
        .ok_or(ToolError::CodeNotFound("arch-spec banner"))
}
