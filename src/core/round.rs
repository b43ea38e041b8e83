//! Round numbering, derived from the round identifiers already persisted.

use regex::Regex;
use std::sync::OnceLock;

/// Digits of the zero-padded round number in a round file name.
pub const ROUND_NUMBER_WIDTH: usize = 6;

/// `1 + max(known)`, or 1 for an empty log. Gaps are fine.
///
/// `None` when the highest round is `u64::MAX` and has no successor.
pub fn next_round_number<I>(known: I) -> Option<u64>
where
    I: IntoIterator<Item = u64>,
{
    match known.into_iter().max() {
        Some(last) => last.checked_add(1),
        None => Some(1),
    }
}

pub fn round_file_name(round: u64, extension: &str) -> String {
    format!("{:0width$}.{}", round, extension, width = ROUND_NUMBER_WIDTH)
}

fn round_stem() -> &'static Regex {
    static STEM: OnceLock<Regex> = OnceLock::new();
    STEM.get_or_init(|| Regex::new(r"^[0-9]+$").expect("static pattern"))
}

/// Round number of a file name like `000004.placement`.
///
/// `None` when the extension does not match; `Some(Err(stem))` when it does
/// but the stem is not a number.
pub fn parse_round_file_name(
    file_name: &str,
    extension: &str,
) -> Option<std::result::Result<u64, String>> {
    let stem = file_name.strip_suffix(extension)?.strip_suffix('.')?;

    if !round_stem().is_match(stem) {
        return Some(Err(stem.to_string()));
    }

    Some(stem.parse::<u64>().map_err(|_| stem.to_string()))
}
