//! Node key generation.
//!
//! Generated keys are `Node{n}`. The counter is not persisted; after a reload it
//! is recovered from the largest numeric suffix among the loaded keys, so the
//! suffix parsing here decides whether new keys can collide with old ones.

pub const NODE_KEY_PREFIX: &str = "Node";
pub const GROUP_KEY_BASE: &str = "Group";

pub fn node_key(n: u64) -> String {
    format!("{}{}", NODE_KEY_PREFIX, n)
}

/// Integer value of `key` after stripping the `Node` prefix.
///
/// The remainder is read like JavaScript's `parseInt`: leading whitespace, an
/// optional sign, then as many digits as are present. Anything that yields no
/// digits counts as 0.
pub fn numeric_suffix(key: &str) -> i64 {
    let rest = key.strip_prefix(NODE_KEY_PREFIX).unwrap_or(key);
    parse_int_prefix(rest).unwrap_or(0)
}

fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Saturate rather than fail on absurdly long digit runs.
    let value = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}

/// Counter seed for a set of loaded keys: the largest suffix, never below 0.
pub fn counter_seed<'a>(keys: impl IntoIterator<Item = &'a str>) -> u64 {
    keys.into_iter()
        .map(numeric_suffix)
        .max()
        .unwrap_or(0)
        .max(0) as u64
}
