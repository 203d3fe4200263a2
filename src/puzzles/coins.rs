//! Five-coin weight puzzle: find the permutation of coin values satisfying
//! `a + b*c^2 + d^3 - e == 399`.

use itertools::Itertools;

use crate::error::ToolError;

const TARGET: i64 = 399;
const VALUES: [i64; 5] = [2, 3, 5, 7, 9];

fn coin_name(value: i64) -> &'static str {
    match value {
        2 => "red coin",
        3 => "corroded coin",
        5 => "shiny coin",
        7 => "concave coin",
        9 => "blue coin",
        _ => unreachable!("coin values are fixed to the puzzle's five denominations"),
    }
}

fn satisfies(order: &[i64]) -> bool {
    let (a, b, c, d, e) = (order[0], order[1], order[2], order[3], order[4]);
    a + b * c.pow(2) + d.pow(3) - e == TARGET
}

/// Returns the coin names in the order they must be placed (equivalently,
/// `use`d), such that `a + b*c^2 + d^3 - e == 399`.
pub fn solve_coin_order() -> Result<Vec<&'static str>, ToolError> {
    VALUES
        .into_iter()
        .permutations(VALUES.len())
        .find(|order| satisfies(order))
        .map(|order| order.into_iter().map(coin_name).collect())
        .ok_or(ToolError::NoSolution("coin order"))
}
