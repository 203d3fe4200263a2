//! The solution driver: a scripted supervisor that orchestrates the engine,
//! explorer, pattern matcher, and puzzle solvers to recover all eight
//! reward codes (SPEC_FULL §4.7).

use tracing::{info, instrument, warn};

use crate::codes;
use crate::config::Config;
use crate::error::ToolError;
use crate::explorer;
use crate::opcode;
use crate::pattern;
use crate::puzzles::{coins, vault};
use crate::vm::Vm;

/// The eight codes recovered over a full run, in the order the driver finds
/// them.
#[derive(Debug, Default)]
pub struct Codes {
    pub found: Vec<(u8, String)>,
}

impl Codes {
    fn record(&mut self, index: u8, value: String) {
        info!(index, %value, "code recovered");
        self.found.push((index, value));
    }
}

/// Runs the full solution sequence against a freshly booted VM.
#[instrument(skip(vm, config))]
pub fn run(vm: &mut Vm, archfile_text: &str, config: &Config) -> Result<Codes, ToolError> {
    let mut codes = Codes::default();

    // Step 1: arch-spec banner.
    let code1 = opcode::scrape_archspec_code(archfile_text)?;
    codes.record(1, code1);

    // Step 2-3: boot to first suspension; startup and self-test banners.
    vm.run()?;
    let boot_output = vm.drain_output();
    codes.record(2, codes::scrape_startup_code(&boot_output)?);
    codes.record(3, codes::scrape_self_test_code(&boot_output)?);

    // Step 4 (partial): location discovery, then explore and grant items.
    let location_addr = explorer::discover_location_address(vm)?;
    info!(location_addr, "location word discovered");

    let exploration = explorer::explore(vm, location_addr)?;
    explorer::grant_all_items(vm, &exploration.item_addresses)?;

    vm.send("use can")?;
    vm.send("use lantern")?;
    let tablet_output = vm.send_and_drain("use tablet")?;
    codes.record(4, codes::scrape_tablet_code(&tablet_output)?);

    // Step 5: re-explore, scrape the wall code from room descriptions.
    let reexploration = explorer::explore(vm, location_addr)?;
    let wall_passage = reexploration
        .rooms
        .values()
        .map(|room| room.description.as_str())
        .find(|text| codes::scrape_wall_code(text).is_ok())
        .ok_or(ToolError::CodeNotFound("chiseled wall"))?;
    codes.record(5, codes::scrape_wall_code(wall_passage)?);

    // Step 6: teleport to the central hall via a direct location-word write.
    const CENTRAL_HALL: u32 = 1;
    vm.memory_mut().set(location_addr, CENTRAL_HALL)?;

    // Step 7: coin puzzle.
    let order = coins::solve_coin_order()?;
    for coin in order {
        vm.send(&format!("use {coin}"))?;
    }

    // Step 8: first teleporter use.
    let first_teleport_output = vm.send_and_drain("use teleporter")?;
    codes.record(6, codes::scrape_first_teleport_code(&first_teleport_output)?);

    // Step 9: install the bypass and use the teleporter again.
    pattern::patch_teleporter_call(vm)?;
    let second_teleport_output = vm.send_and_drain("use teleporter")?;
    codes.record(7, codes::scrape_second_teleport_code(&second_teleport_output)?);

    // Step 10: vault grid, mirror room, reflection.
    let vault_path = vault::solve_vault()?;
    for step in vault_path {
        let direction = match step {
            "n" => "north",
            "s" => "south",
            "e" => "east",
            "w" => "west",
            other => {
                warn!(step = other, "unrecognized vault direction");
                continue;
            }
        };
        vm.send(direction)?;
    }
    vm.send("take mirror")?;
    let mirror_output = vm.send_and_drain("use mirror")?;
    let reflected = mirror_output
        .lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or_default();
    codes.record(8, codes::scrape_mirror_code(reflected, config.reflection));

    info!(codes = codes.found.len(), "solution driver finished");
    Ok(codes)
}

/// Convenience used throughout the driver: send a line and return only what
/// it produced.
impl Vm {
    pub fn send_and_drain(&mut self, line: &str) -> Result<String, ToolError> {
        self.send(line)?;
        Ok(self.drain_output())
    }
}
