//! Wildcard memory pattern matching and the teleporter-call patcher built on
//! top of it.
//!
//! `find_pattern` plays the role the teacher's `Debugger::set_breakpoint`
//! plays for blockchain contracts, but locates its target by content instead
//! of by a known address: a fixed signature identifies the recursive
//! subroutine's entry point across binary variants. The address a real
//! `call` instruction executes from is a different thing from the entry
//! point it targets, so locating the subroutine is only half the job; the
//! patcher also has to find the external instruction that calls into it.

use tracing::{info, instrument};

use crate::error::ToolError;
use crate::memory::MemoryImage;
use crate::puzzles::call6027;
use crate::vm::{CallBypass, Vm};
use crate::word::Word;

/// One position in a pattern: either `Exact(word)` or `Any` (matches
/// unconditionally).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternWord {
    Exact(Word),
    Any,
}

/// Returns every starting index `i` such that `memory[i+j] == pattern[j]`
/// for every `j` where `pattern[j]` is `Exact`; `Any` positions match
/// unconditionally. Omitting a wildcard (making it `Exact`) can only narrow
/// the result.
pub fn find_pattern(memory: &[Word], pattern: &[PatternWord]) -> Vec<usize> {
    if pattern.len() > memory.len() {
        return Vec::new();
    }

    (0..=memory.len() - pattern.len())
        .filter(|&i| {
            pattern
                .iter()
                .enumerate()
                .all(|(j, p)| matches!(p, PatternWord::Any) || memory[i + j] == exact(p))
        })
        .collect()
}

fn exact(p: &PatternWord) -> Word {
    match p {
        PatternWord::Exact(w) => *w,
        PatternWord::Any => unreachable!("Any is filtered out before calling exact"),
    }
}

/// The 41-word signature of the recursive subroutine's entry point, constant
/// across binary variants of the challenge. The subroutine calls itself
/// three times (the wildcarded operands at relative offsets 19, 28, and 39);
/// those operands vary with the subroutine's own load address, which is why
/// they're wildcards rather than fixed values.
pub fn teleporter_call_signature() -> Vec<PatternWord> {
    use PatternWord::{Any, Exact};
    [
        7, 32768, 0, 9, 32768, 32769, 1, 18, 7, 32769, 0, 9, 32768, 32768, 32767, 1, 32769,
        32775, 17, 0, 18, 2, 32768, 9, 32769, 32769, 32767, 17, 0, 1, 32769, 32768, 3, 32768, 9,
        32768, 32768, 32767, 17, 0, 18,
    ]
    .into_iter()
    .enumerate()
    .map(|(idx, word)| {
        if WILDCARD_POSITIONS.contains(&idx) {
            Any
        } else {
            Exact(word)
        }
    })
    .collect()
}

/// Indices (within the 41-word signature) that are wildcards in the spec's
/// source listing (written `*`). These are exactly the three internal
/// recursive self-calls, so they double as the offsets `external_call_site`
/// must not mistake for the external call it's looking for.
const WILDCARD_POSITIONS: [usize; 5] = [2, 10, 19, 28, 39];

const CALL_OPCODE: Word = 17;

/// `call <addr>` is a two-word instruction: the opcode and its one operand.
const CALL_INSTRUCTION_WORDS: usize = 2;

/// Finds the unique `call entry` instruction in `memory` that lies outside
/// `entry`'s own signature span — i.e. the external call site, as opposed to
/// one of the subroutine's internal recursive self-calls.
fn external_call_site(memory: &[Word], entry: usize, signature_len: usize) -> Result<usize, ToolError> {
    let own_span = entry..entry + signature_len;

    let matches: Vec<usize> = if memory.len() < CALL_INSTRUCTION_WORDS {
        Vec::new()
    } else {
        (0..=memory.len() - CALL_INSTRUCTION_WORDS)
            .filter(|addr| !own_span.contains(addr))
            .filter(|&addr| memory[addr] == CALL_OPCODE && memory[addr + 1] == entry as Word)
            .collect()
    };

    match matches.as_slice() {
        [addr] => Ok(*addr),
        _ => Err(ToolError::PatternCardinality {
            name: "teleporter-call-site",
            count: matches.len(),
        }),
    }
}

/// Register values the bypass installs once the teleporter call is skipped
/// (SPEC_FULL §4.1, §4.3). `r0`/`r1` are the fixed arguments the real call
/// site passes; `r7` is derived by brute-force search rather than hardcoded a
/// second time, so the two stay in lockstep by construction.
pub fn bypass_registers() -> Result<CallBypass, ToolError> {
    let (r0, r1, _) = crate::consts::TELEPORT_BYPASS_REGISTERS;
    let r7 = call6027::search_call_6027(r0 as u32)?;
    Ok(CallBypass { r0: r0 as Word, r1: r1 as Word, r7 })
}

/// Locates the teleporter subroutine's entry point, then the external `call`
/// instruction that invokes it, and registers the bypass at that call site
/// (not the entry point — `vm/exec.rs`'s tick loop checks for a bypass
/// *before* fetching the instruction at `pc`, so the bypass must sit where a
/// real `call` opcode would, or the tick that fires it corrupts execution).
/// Fails if the entry signature or the external call site isn't unique.
#[instrument(level = "info", skip(vm))]
pub fn patch_teleporter_call(vm: &mut Vm) -> Result<usize, ToolError> {
    let memory = vm.memory().as_slice().to_vec();
    let entry = locate_teleporter_call(vm.memory())?;
    let call_site = external_call_site(&memory, entry, teleporter_call_signature().len())?;
    info!(entry, call_site, "teleporter call site located");

    vm.hooks_mut().register_bypass(call_site, bypass_registers()?);
    vm.set_teleporter_call_addr(Some(call_site));
    Ok(call_site)
}

/// Exposed for tooling that only has a raw memory image (e.g. static
/// analysis of a binary before a VM is constructed over it). Returns the
/// subroutine's entry point, not the external call site — use
/// `patch_teleporter_call` when a bypass address is needed.
pub fn locate_teleporter_call(memory: &MemoryImage) -> Result<usize, ToolError> {
    let matches = find_pattern(memory.as_slice(), &teleporter_call_signature());
    match matches.as_slice() {
        [addr] => Ok(*addr),
        _ => Err(ToolError::PatternCardinality {
            name: "teleporter-call",
            count: matches.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vm::TickOutcome;

    #[test]
    fn signature_is_forty_one_words() {
        assert_eq!(teleporter_call_signature().len(), 41);
    }

    #[test]
    fn wildcards_match_any_word() {
        use PatternWord::{Any, Exact};
        let pattern = [Exact(1), Any, Exact(3)];
        assert_eq!(find_pattern(&[1, 99, 3, 1, 0, 3], &pattern), vec![0]);
    }

    #[test]
    fn narrowing_a_wildcard_can_only_shrink_the_match_set() {
        use PatternWord::{Any, Exact};
        let memory = [1, 2, 3, 1, 9, 3];
        let wildcard = [Exact(1), Any, Exact(3)];
        let narrowed = [Exact(1), Exact(2), Exact(3)];
        let wide = find_pattern(&memory, &wildcard);
        let narrow = find_pattern(&memory, &narrowed);
        assert!(narrow.iter().all(|i| wide.contains(i)));
    }

    #[test]
    fn patch_fails_when_the_signature_appears_zero_or_many_times() {
        let mut vm = Vm::new(MemoryImage::from_words(vec![0; 10]));
        assert!(patch_teleporter_call(&mut vm).is_err());
    }

    /// Builds a signature with its internal self-calls pointed at `entry`
    /// (mimicking a real binary, where they target the subroutine's own load
    /// address) placed starting at `entry`.
    fn signature_at(entry: usize) -> Vec<Word> {
        teleporter_call_signature()
            .iter()
            .map(|p| match p {
                PatternWord::Exact(w) => *w,
                PatternWord::Any => entry as Word,
            })
            .collect()
    }

    #[test]
    fn patch_fails_when_no_external_call_site_exists() {
        // The signature alone: its internal self-calls target entry 0, but
        // nothing outside the signature's own span calls it.
        let mut vm = Vm::new(MemoryImage::from_words(signature_at(0)));
        assert!(patch_teleporter_call(&mut vm).is_err());
    }

    #[test]
    fn patch_registers_a_bypass_at_the_external_call_site_not_the_entry() {
        let entry = 4;
        let mut memory = vec![17, entry as Word, 0, 0]; // external `call entry` at address 0
        memory.extend(signature_at(entry));

        let mut vm = Vm::new(MemoryImage::from_words(memory));
        let addr = patch_teleporter_call(&mut vm).unwrap();

        assert_eq!(addr, 0);
        assert!(vm.hooks().bypass_at(0).is_some());
        assert!(vm.hooks().bypass_at(entry).is_none());
        assert_eq!(vm.teleporter_call_addr(), Some(0));
    }

    #[test]
    fn bypass_fires_correctly_when_the_external_call_instruction_runs() {
        let entry = 4;
        // addr 0: call entry; addr 2: halt (reached only via the bypass's
        // advance(2), never by a real call into the subroutine).
        let mut memory = vec![17, entry as Word, 0, 0];
        memory.extend(signature_at(entry));

        let mut vm = Vm::new(MemoryImage::from_words(memory));
        let call_site = patch_teleporter_call(&mut vm).unwrap();
        assert_eq!(call_site, 0);

        let outcome = vm.run().unwrap();
        assert_eq!(outcome, TickOutcome::Halted);
        assert_eq!(vm.pc(), 2);
        assert!(vm.stack().as_slice().is_empty());

        let (r0, r1, r7) = crate::consts::TELEPORT_BYPASS_REGISTERS;
        assert_eq!(vm.registers()[0], r0 as Word);
        assert_eq!(vm.registers()[1], r1 as Word);
        assert_eq!(vm.registers()[7], r7 as Word);
    }
}
