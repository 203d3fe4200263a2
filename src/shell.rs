//! The interactive debug shell: alias expansion, semicolon chaining, and the
//! dotted debug-command grammar layered in front of the VM.

use std::fs;

use tracing::info;

use crate::config::Config;
use crate::disasm;
use crate::error::ShellError;
use crate::memory::MemoryImage;
use crate::opcode::OpcodeTable;
use crate::persistence;
use crate::puzzles::coins;
use crate::snapshot::diff;
use crate::vm::Vm;
use crate::word::Word;

const ALIASES: &[(&str, &str)] = &[
    ("l", "look"),
    ("n", "north"),
    ("s", "south"),
    ("e", "east"),
    ("w", "west"),
    ("br", "bridge"),
    ("dw", "doorway"),
    ("dn", "down"),
    ("cn", "continue"),
    ("pa", "passage"),
];

/// What running one shell segment produced.
pub enum ShellOutcome {
    Text(String),
    Quit,
}

pub struct Shell {
    pub vm: Vm,
    pub config: Config,
    pub opcodes: OpcodeTable,
    pub location_addr: Option<usize>,
}

impl Shell {
    pub fn new(vm: Vm, config: Config, opcodes: OpcodeTable) -> Self {
        Self { vm, config, opcodes, location_addr: None }
    }

    /// Splits `line` on `;`, forwards each trimmed segment through
    /// [`Shell::handle`], and joins the resulting text with newlines. Stops
    /// (returning `Quit`) as soon as any segment asks to quit.
    pub fn send_line(&mut self, line: &str) -> Result<ShellOutcome, ShellError> {
        let mut chunks = Vec::new();
        for segment in line.split(';') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            match self.handle(segment)? {
                ShellOutcome::Text(text) => chunks.push(text),
                ShellOutcome::Quit => return Ok(ShellOutcome::Quit),
            }
        }
        Ok(ShellOutcome::Text(chunks.join("\n")))
    }

    /// Handles one already-trimmed, already-split segment: a dotted debug
    /// command, an alias, or a plain line forwarded to the VM.
    pub fn handle(&mut self, segment: &str) -> Result<ShellOutcome, ShellError> {
        if let Some(command) = segment.strip_prefix('.') {
            return self.handle_debug_command(command);
        }

        let expanded = ALIASES
            .iter()
            .find(|(alias, _)| *alias == segment)
            .map(|(_, full)| *full)
            .unwrap_or(segment);

        self.vm.send(expanded).map_err(crate::error::ToolError::from)?;
        Ok(ShellOutcome::Text(self.vm.drain_output()))
    }

    fn handle_debug_command(&mut self, command: &str) -> Result<ShellOutcome, ShellError> {
        let mut tokens = command.split_whitespace();
        let name = tokens.next().unwrap_or("");
        let args: Vec<&str> = tokens.collect();

        let text = match name {
            "dump" => self.cmd_dump(),
            "save" => self.cmd_save(&args)?,
            "load" => self.cmd_load(&args)?,
            "diff" => self.cmd_diff(&args)?,
            "reg" => self.cmd_reg(),
            "pm" => self.cmd_pm(&args)?,
            "ps" => self.cmd_ps(&args)?,
            "wr" => self.cmd_wr(&args)?,
            "wm" => self.cmd_wm(&args)?,
            "ws" => self.cmd_ws(&args)?,
            "loc" => self.cmd_loc(&args)?,
            "dis" => self.cmd_dis(&args)?,
            "pc" => format!("pc={}", self.vm.pc()),
            "quit" | "q" => return Ok(ShellOutcome::Quit),
            "macro" => return self.cmd_macro(&args),
            "solve" if args.first() == Some(&"coins") => self.cmd_solve_coins()?,
            "giveall" => self.cmd_giveall()?,
            other => return Err(ShellError::UnknownCommand(other.to_string())),
        };

        Ok(ShellOutcome::Text(text))
    }

    fn cmd_dump(&self) -> String {
        format!(
            "pc={} location={}",
            self.vm.pc(),
            self.location_addr
                .map(|_| "known".to_string())
                .unwrap_or_else(|| "unknown".to_string())
        )
    }

    fn cmd_save(&self, args: &[&str]) -> Result<String, ShellError> {
        let name = args.first().copied().unwrap_or("last");
        persistence::save(&self.config.snapshot_dir, name, &self.vm.snapshot())?;
        Ok(format!("saved snapshot '{name}'"))
    }

    fn cmd_load(&mut self, args: &[&str]) -> Result<String, ShellError> {
        let name = args.first().ok_or_else(|| ShellError::MalformedArgument {
            command: "load".into(),
            detail: "requires a snapshot name".into(),
        })?;
        let snapshot = persistence::load(&self.config.snapshot_dir, name)?;
        self.vm.apply_snapshot(&snapshot);
        Ok(format!("loaded snapshot '{name}'"))
    }

    fn cmd_diff(&self, args: &[&str]) -> Result<String, ShellError> {
        let a_name = args.first().ok_or_else(|| ShellError::MalformedArgument {
            command: "diff".into(),
            detail: "requires at least one snapshot name".into(),
        })?;
        let a = persistence::load(&self.config.snapshot_dir, a_name)?;
        let b = match args.get(1) {
            Some(name) => persistence::load(&self.config.snapshot_dir, name)?,
            None => self.vm.snapshot(),
        };
        Ok(format!("{:#?}", diff(&a, &b)))
    }

    fn cmd_reg(&self) -> String {
        format!("{:?}", self.vm.registers())
    }

    fn parse_arg(args: &[&str], idx: usize, command: &str, what: &str) -> Result<usize, ShellError> {
        args.get(idx)
            .ok_or_else(|| ShellError::MalformedArgument {
                command: command.into(),
                detail: format!("missing {what}"),
            })?
            .parse()
            .map_err(|_| ShellError::MalformedArgument {
                command: command.into(),
                detail: format!("{what} must be a non-negative integer"),
            })
    }

    fn cmd_pm(&self, args: &[&str]) -> Result<String, ShellError> {
        let addr = Self::parse_arg(args, 0, "pm", "address")?;
        let n = args.get(1).map(|_| Self::parse_arg(args, 1, "pm", "count")).transpose()?.unwrap_or(8);
        let slice: Vec<Word> = (addr..addr + n).filter_map(|a| self.vm.memory().get(a).ok()).collect();
        Ok(format!("{slice:?}"))
    }

    fn cmd_ps(&self, args: &[&str]) -> Result<String, ShellError> {
        let addr = Self::parse_arg(args, 0, "ps", "index")?;
        let n = args.get(1).map(|_| Self::parse_arg(args, 1, "ps", "count")).transpose()?.unwrap_or(8);
        let stack = self.vm.stack().as_slice();
        let end = (addr + n).min(stack.len());
        let slice = stack.get(addr.min(end)..end).unwrap_or(&[]);
        Ok(format!("{slice:?}"))
    }

    fn cmd_wr(&mut self, args: &[&str]) -> Result<String, ShellError> {
        let idx = Self::parse_arg(args, 0, "wr", "register index")?;
        let value = Self::parse_arg(args, 1, "wr", "value")? as Word;
        self.vm.set_register(idx, value).map_err(|e| ShellError::MalformedArgument {
            command: "wr".into(),
            detail: e.to_string(),
        })?;
        Ok(format!("r{idx} = {value}"))
    }

    fn cmd_wm(&mut self, args: &[&str]) -> Result<String, ShellError> {
        let addr = Self::parse_arg(args, 0, "wm", "address")?;
        let value = Self::parse_arg(args, 1, "wm", "value")? as Word;
        self.vm.memory_mut().set(addr, value).map_err(|e| ShellError::MalformedArgument {
            command: "wm".into(),
            detail: e.to_string(),
        })?;
        Ok(format!("mem[{addr}] = {value}"))
    }

    fn cmd_ws(&mut self, args: &[&str]) -> Result<String, ShellError> {
        let idx = Self::parse_arg(args, 0, "ws", "stack index")?;
        let value = Self::parse_arg(args, 1, "ws", "value")? as Word;
        self.vm.stack_mut().set(idx, value).map_err(|e| ShellError::MalformedArgument {
            command: "ws".into(),
            detail: e.to_string(),
        })?;
        Ok(format!("stack[{idx}] = {value}"))
    }

    fn cmd_loc(&mut self, args: &[&str]) -> Result<String, ShellError> {
        let addr = self.location_addr.ok_or_else(|| ShellError::MalformedArgument {
            command: "loc".into(),
            detail: "location address has not been discovered yet".into(),
        })?;

        if let Some(raw) = args.first() {
            let value: Word = raw.parse().map_err(|_| ShellError::MalformedArgument {
                command: "loc".into(),
                detail: "value must be a non-negative integer".into(),
            })?;
            self.vm.memory_mut().set(addr, value).map_err(|e| ShellError::MalformedArgument {
                command: "loc".into(),
                detail: e.to_string(),
            })?;
            Ok(format!("location = {value}"))
        } else {
            let value = self.vm.memory().get(addr).map_err(|e| ShellError::MalformedArgument {
                command: "loc".into(),
                detail: e.to_string(),
            })?;
            Ok(format!("location = {value}"))
        }
    }

    fn cmd_dis(&self, args: &[&str]) -> Result<String, ShellError> {
        let lines = args.first().map(|_| Self::parse_arg(args, 0, "dis", "line count")).transpose()?.unwrap_or(10);
        let addr = args.get(1).map(|_| Self::parse_arg(args, 1, "dis", "address")).transpose()?.unwrap_or(self.vm.pc());
        let disassembled = disasm::disassemble(self.vm.memory().as_slice(), &self.opcodes, addr, lines);
        let rendered: Vec<String> = disassembled.iter().map(|l| format!("{:04} {}", l.addr, l.text)).collect();
        Ok(rendered.join("\n"))
    }

    fn cmd_macro(&mut self, args: &[&str]) -> Result<ShellOutcome, ShellError> {
        let filename = args.first().ok_or_else(|| ShellError::MalformedArgument {
            command: "macro".into(),
            detail: "requires a file name".into(),
        })?;
        let path = self.config.macro_dir.join(filename);
        let contents = fs::read_to_string(&path).map_err(|e| {
            ShellError::MalformedArgument { command: "macro".into(), detail: e.to_string() }
        })?;

        let mut chunks = Vec::new();
        for line in contents.lines() {
            for segment in line.split(';') {
                let segment = segment.trim();
                if segment.is_empty() {
                    continue;
                }
                match self.handle(segment)? {
                    ShellOutcome::Text(text) => chunks.push(text),
                    ShellOutcome::Quit => return Ok(ShellOutcome::Quit),
                }
            }
        }
        Ok(ShellOutcome::Text(chunks.join("\n")))
    }

    fn cmd_solve_coins(&mut self) -> Result<String, ShellError> {
        let order = coins::solve_coin_order()?;
        info!(?order, "coin order solved");
        let mut chunks = Vec::new();
        for coin in order {
            self.vm.send(&format!("use {coin}")).map_err(crate::error::ToolError::from)?;
            chunks.push(self.vm.drain_output());
        }
        Ok(chunks.join("\n"))
    }

    fn cmd_giveall(&mut self) -> Result<String, ShellError> {
        let (start, end, stride) = self.config.giveall_range;
        let mut written = 0;
        let mut addr = start as usize;
        while addr <= end as usize {
            self.vm.memory_mut().set(addr, 0).map_err(|e| ShellError::MalformedArgument {
                command: "giveall".into(),
                detail: e.to_string(),
            })?;
            written += 1;
            addr += stride as usize;
        }
        Ok(format!("wrote 0 to {written} inventory flag words"))
    }
}

/// Loads the architecture spec and binary image referenced by `config` into
/// a fresh `Shell`.
pub fn boot(config: Config) -> Result<Shell, crate::error::ToolError> {
    let spec_text = fs::read_to_string(&config.archfile_path)?;
    let opcodes = OpcodeTable::parse(&spec_text)?;
    let bytes = fs::read(&config.binary_path)?;
    let memory = MemoryImage::from_bytes(&bytes)?;
    let vm = Vm::new(memory);
    Ok(Shell::new(vm, config, opcodes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryImage;

    fn shell() -> Shell {
        let vm = Vm::new(MemoryImage::from_words(vec![19, b'h' as Word, 19, b'i' as Word, 0]));
        Shell::new(vm, Config::default(), OpcodeTable::parse("halt: 0\nout: 19 a\n").unwrap())
    }

    #[test]
    fn aliases_expand_before_reaching_the_vm() {
        let mut shell = shell();
        let outcome = shell.send_line("n").unwrap();
        match outcome {
            ShellOutcome::Text(_) => {}
            ShellOutcome::Quit => panic!("unexpected quit"),
        }
    }

    #[test]
    fn semicolon_chaining_runs_each_segment() {
        let mut shell = shell();
        let outcome = shell.send_line(".pc; .reg").unwrap();
        match outcome {
            ShellOutcome::Text(text) => assert!(text.contains("pc=")),
            ShellOutcome::Quit => panic!("unexpected quit"),
        }
    }

    #[test]
    fn unknown_debug_command_is_an_error() {
        let mut shell = shell();
        assert!(matches!(shell.handle(".bogus"), Err(ShellError::UnknownCommand(_))));
    }

    #[test]
    fn quit_short_circuits_a_chained_line() {
        let mut shell = shell();
        let outcome = shell.send_line(".pc; .q; .pc").unwrap();
        assert!(matches!(outcome, ShellOutcome::Quit));
    }

    #[test]
    fn wm_writes_through_to_memory() {
        let mut shell = shell();
        shell.handle(".wm 0 21").unwrap();
        assert_eq!(shell.vm.memory().get(0).unwrap(), 21);
    }
}
