//! Linear-sweep disassembler: one line per instruction, with consecutive
//! `out` instructions merged into a single text line and an ASCII/raw
//! fallback for anything that isn't a recognized opcode.

use crate::opcode::OpcodeTable;
use crate::word::Word;

fn format_operand(w: Word) -> String {
    if crate::word::is_register(w) {
        format!("r{}", w - crate::consts::REGISTER_BASE)
    } else {
        w.to_string()
    }
}

/// One disassembled line, either a decoded instruction or a raw-data
/// fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub addr: usize,
    pub text: String,
    /// Number of words this line consumed from memory.
    pub width: usize,
}

/// Disassembles up to `max_lines` lines starting at `start`. Stops early if
/// memory runs out.
pub fn disassemble(memory: &[Word], opcodes: &OpcodeTable, start: usize, max_lines: usize) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut addr = start;

    while lines.len() < max_lines && addr < memory.len() {
        let id = memory[addr];

        if id == 19 {
            let (text, width) = merge_out_run(memory, addr);
            lines.push(Line { addr, text, width });
            addr += width;
            continue;
        }

        match opcodes.get(id as u16) {
            Some(entry) => {
                let width = 1 + entry.arity as usize;
                if addr + width > memory.len() {
                    lines.push(raw_fallback(memory, addr));
                    addr += 1;
                    continue;
                }
                let args: Vec<String> = memory[addr + 1..addr + width]
                    .iter()
                    .map(|&w| format_operand(w))
                    .collect();
                let text = if args.is_empty() {
                    entry.name.clone()
                } else {
                    format!("{} {}", entry.name, args.join(" "))
                };
                lines.push(Line { addr, text, width });
                addr += width;
            }
            None => {
                lines.push(raw_fallback(memory, addr));
                addr += 1;
            }
        }
    }

    lines
}

/// Merges a run of consecutive `out <imm>` instructions whose operands are
/// printable characters into one `out "..."` line.
fn merge_out_run(memory: &[Word], start: usize) -> (String, usize) {
    let mut text = String::new();
    let mut addr = start;

    while addr + 1 < memory.len() && memory[addr] == 19 {
        let ch = memory[addr + 1];
        if !(0x20..=0x7e).contains(&ch) && ch != b'\n' as Word {
            break;
        }
        text.push(ch as u8 as char);
        addr += 2;
    }

    if text.is_empty() {
        // Operand wasn't printable; fall back to a single raw instruction.
        let operand = memory.get(start + 1).copied().unwrap_or(0);
        (format!("out {}", format_operand(operand)), 2)
    } else {
        (format!("out {:?}", text), addr - start)
    }
}

fn raw_fallback(memory: &[Word], addr: usize) -> Line {
    let word = memory[addr];
    let text = if (0x20..=0x7e).contains(&word) {
        format!("<data> {} {:?}", word, word as u8 as char)
    } else {
        format!("<data> {}", word)
    };
    Line { addr, text, width: 1 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> OpcodeTable {
        OpcodeTable::parse("halt: 0\nout: 19 a\nnoop: 21\nadd: 9 a b c\n").unwrap()
    }

    #[test]
    fn disassembles_a_simple_instruction() {
        let memory = [9, 32768, 1, 2, 0];
        let lines = disassemble(&memory, &table(), 0, 10);
        assert_eq!(lines[0].text, "add r0 1 2");
        assert_eq!(lines[0].width, 4);
    }

    #[test]
    fn merges_consecutive_out_into_one_line() {
        let memory = [19, b'h' as Word, 19, b'i' as Word, 0];
        let lines = disassemble(&memory, &table(), 0, 10);
        assert_eq!(lines[0].text, "out \"hi\"");
        assert_eq!(lines[0].width, 4);
    }

    #[test]
    fn falls_back_to_raw_data_for_unknown_opcode() {
        let memory = [9999, 0];
        let lines = disassemble(&memory, &table(), 0, 10);
        assert_eq!(lines[0].width, 1);
        assert!(lines[0].text.starts_with("<data>"));
    }

    #[test]
    fn stops_at_max_lines() {
        let memory = [21, 21, 21, 21];
        let lines = disassemble(&memory, &table(), 0, 2);
        assert_eq!(lines.len(), 2);
    }
}
