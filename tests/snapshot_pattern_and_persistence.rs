//! Snapshot/diff/persistence and the wildcard pattern matcher, exercised
//! against small hand-assembled programs rather than the unavailable real
//! binary image (SPEC_FULL §8).

use vm16::memory::MemoryImage;
use vm16::pattern::{self, PatternWord};
use vm16::persistence;
use vm16::vm::Vm;

#[test]
fn snapshot_round_trips_through_apply() {
    let mut vm = Vm::new(MemoryImage::from_words(vec![1, 32768, 42, 0]));
    vm.run().unwrap();
    let after_run = vm.snapshot();

    let mut fresh = Vm::new(MemoryImage::from_words(vec![1, 32768, 42, 0]));
    fresh.apply_snapshot(&after_run);

    assert_eq!(fresh.snapshot(), after_run);
}

#[test]
fn diff_of_a_snapshot_against_itself_is_empty() {
    let mut vm = Vm::new(MemoryImage::from_words(vec![1, 32768, 42, 0]));
    vm.run().unwrap();
    let snap = vm.snapshot();
    let diff = vm16::snapshot::diff(&snap, &snap);
    assert!(diff.is_empty());
}

#[test]
fn diff_reports_exactly_the_registers_and_pc_that_changed() {
    let before = Vm::new(MemoryImage::from_words(vec![0; 4])).snapshot();
    let mut vm = Vm::new(MemoryImage::from_words(vec![1, 32768, 42, 0]));
    vm.run().unwrap();
    let after = vm.snapshot();

    let diff = vm16::snapshot::diff(&before, &after);
    assert!(diff.pc.is_some());
    assert!(diff.registers.iter().any(|(idx, old, new)| *idx == 0 && *old == Some(0) && *new == Some(42)));
}

#[test]
fn save_then_load_recovers_an_identical_snapshot() {
    let dir = std::env::temp_dir().join(format!("vm16-persistence-test-{:?}", std::thread::current().id()));
    let mut vm = Vm::new(MemoryImage::from_words(vec![1, 32768, 7, 0]));
    vm.run().unwrap();
    let snap = vm.snapshot();

    persistence::save(&dir, "checkpoint", &snap).unwrap();
    let loaded = persistence::load(&dir, "checkpoint").unwrap();
    assert_eq!(loaded, snap);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn find_pattern_matches_are_within_memory_bounds() {
    let memory = MemoryImage::from_words(vec![1, 2, 3, 2, 3, 4]);
    let pattern = vec![PatternWord::Exact(2), PatternWord::Exact(3)];
    let matches = pattern::find_pattern(memory.as_slice(), &pattern);
    assert!(!matches.is_empty());
    for addr in &matches {
        assert!(*addr + pattern.len() <= memory.len());
    }
    assert_eq!(matches, vec![1, 3]);
}

#[test]
fn narrowing_a_wildcard_to_exact_can_only_shrink_the_match_set() {
    let memory = MemoryImage::from_words(vec![1, 2, 3, 2, 9, 4]);
    let wildcard_pattern = vec![PatternWord::Exact(2), PatternWord::Any];
    let exact_pattern = vec![PatternWord::Exact(2), PatternWord::Exact(3)];

    let wildcard_matches = pattern::find_pattern(memory.as_slice(), &wildcard_pattern);
    let exact_matches = pattern::find_pattern(memory.as_slice(), &exact_pattern);

    for addr in &exact_matches {
        assert!(wildcard_matches.contains(addr));
    }
    assert!(exact_matches.len() <= wildcard_matches.len());
}

#[test]
fn teleporter_signature_has_five_wildcards_and_locates_an_exact_copy() {
    let signature = pattern::teleporter_call_signature();
    let wildcard_count = signature
        .iter()
        .filter(|w| matches!(w, PatternWord::Any))
        .count();
    assert_eq!(wildcard_count, 5);

    let literal: Vec<u32> = signature
        .iter()
        .map(|w| match w {
            PatternWord::Exact(v) => *v,
            PatternWord::Any => 0,
        })
        .collect();
    let memory = MemoryImage::from_words(literal);
    let addr = pattern::locate_teleporter_call(&memory).unwrap();
    assert_eq!(addr, 0);
}
