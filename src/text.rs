//! Regex-level scraping of the VM's textual output: exit lists and item
//! lists. Code scraping lives in `codes.rs`.

use regex::Regex;

use crate::error::ToolError;

fn exits_regex() -> Regex {
    Regex::new(r"(?s)There (?:is|are) \d+ exits?:\n((?:- .+\n)+)\nWhat do you do\?")
        .expect("static regex is valid")
}

fn items_regex() -> Regex {
    Regex::new(r"(?s)Things of interest here:\n((?:- .+\n)+)\n")
        .expect("static regex is valid")
}

fn list_items(block: &str) -> Vec<String> {
    block
        .lines()
        .filter_map(|line| line.strip_prefix("- "))
        .map(|s| s.trim().to_string())
        .collect()
}

/// Parses the exit-direction list out of a room description.
pub fn parse_exits(output: &str) -> Result<Vec<String>, ToolError> {
    exits_regex()
        .captures(output)
        .map(|c| list_items(&c[1]))
        .ok_or(ToolError::ExitsNotFound)
}

/// Parses the "things of interest" item list out of a room description.
pub fn parse_items(output: &str) -> Result<Vec<String>, ToolError> {
    items_regex()
        .captures(output)
        .map(|c| list_items(&c[1]))
        .ok_or(ToolError::ItemsNotFound)
}
