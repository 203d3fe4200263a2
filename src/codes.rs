//! Extraction of the eight reward codes from specific passages of VM output,
//! plus the mirror-passage reflection transform.
//!
//! Most passages announce their code with the same literal sentence; what
//! makes the scrapers "eight distinct regexes" is that each is scoped to a
//! distinct passage of output captured at a distinct point in the solution
//! driver's run, not a different sentence structure. The mirror passage is
//! the exception: it shows raw reflected glyphs with no announcing sentence.

use regex::Regex;

use crate::config::ReflectionVariant;
use crate::error::ToolError;

fn announced_code(output: &str, passage: &'static str) -> Result<String, ToolError> {
    let re = Regex::new(r"Here's a code for the challenge website: (\S+)")
        .expect("static regex is valid");
    re.captures(output)
        .map(|c| c[1].to_string())
        .ok_or(ToolError::CodeNotFound(passage))
}

/// Code 2: printed as the VM boots, before the self-test runs.
pub fn scrape_startup_code(output: &str) -> Result<String, ToolError> {
    announced_code(output, "startup banner")
}

/// Code 3: printed once the self-test completes.
pub fn scrape_self_test_code(output: &str) -> Result<String, ToolError> {
    announced_code(output, "self-test completion")
}

/// Code 4: printed after using the tablet.
pub fn scrape_tablet_code(output: &str) -> Result<String, ToolError> {
    announced_code(output, "tablet write")
}

/// Code 5: printed after re-exploring and reading wall inscriptions.
pub fn scrape_wall_code(output: &str) -> Result<String, ToolError> {
    announced_code(output, "chiseled wall")
}

/// Code 6: printed on the first `use teleporter`, before the bypass is
/// installed.
pub fn scrape_first_teleport_code(output: &str) -> Result<String, ToolError> {
    announced_code(output, "first teleport passage")
}

/// Code 7: printed on the second `use teleporter`, after the bypass takes
/// effect.
pub fn scrape_second_teleport_code(output: &str) -> Result<String, ToolError> {
    announced_code(output, "second teleport passage")
}

/// Reverses a string and swaps each character under the involution
/// `{d<->b, p<->q}`, plus `{2<->5}` when `variant` is `Extended`.
pub fn reflect(text: &str, variant: ReflectionVariant) -> String {
    text.chars()
        .rev()
        .map(|c| match (c, variant) {
            ('d', _) => 'b',
            ('b', _) => 'd',
            ('p', _) => 'q',
            ('q', _) => 'p',
            ('2', ReflectionVariant::Extended) => '5',
            ('5', ReflectionVariant::Extended) => '2',
            (other, _) => other,
        })
        .collect()
}

/// Code 8: the mirror passage shows a reflected string with no announcing
/// sentence; the caller supplies the raw text read from the room (typically
/// the single non-blank line of a `look` in the mirror room) and this
/// applies the reflection transform.
pub fn scrape_mirror_code(raw_reflected: &str, variant: ReflectionVariant) -> String {
    reflect(raw_reflected.trim(), variant)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BANNER: &str = "Self-test complete, all systems nominal.\n\n\
        Here's a code for the challenge website: QRSTUVWXYZ\n";

    #[test]
    fn scrapes_the_announced_code_from_a_passage() {
        assert_eq!(scrape_self_test_code(BANNER).unwrap(), "QRSTUVWXYZ");
    }

    #[test]
    fn missing_announcement_is_an_error() {
        assert!(scrape_startup_code("nothing to see here").is_err());
    }

    #[test]
    fn reflection_reverses_and_swaps_the_involution() {
        assert_eq!(reflect("pbqpqbpqb", ReflectionVariant::Extended), "dpqdpqpdq");
    }

    #[test]
    fn reflection_is_an_involution() {
        let original = "bridge";
        let once = reflect(original, ReflectionVariant::Extended);
        let twice = reflect(&once, ReflectionVariant::Extended);
        assert_eq!(twice, original);
    }

    #[test]
    fn minimal_variant_leaves_digits_untouched() {
        assert_eq!(reflect("25", ReflectionVariant::Minimal), "52");
    }
}
