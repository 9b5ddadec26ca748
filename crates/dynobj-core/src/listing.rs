//! Object state parser
//!
//! Reconstructs `object name -> ranges` from the gateway's freeform `-l`
//! listing output. The format is line-oriented: repeated blocks of
//!
//! ```text
//! object name : NAME
//! range 0 :<TAB>BEGIN<TAB>END
//!
//! ```
//!
//! each terminated by a blank line. The scanner is a single pass with two
//! accumulators; an object is committed only when its trailing blank line is
//! seen, which the gateway guarantees to emit. Unrecognized lines are
//! ignored.

use std::collections::HashMap;

const NAME_PREFIX: &str = "object name :";
const RANGE_PREFIX: &str = "range ";

/// Ranges as raw text pairs, converted to [`crate::AddrRange`] by the
/// engine.
pub type RawRanges = Vec<(String, String)>;

/// Parse `-l` output into a mapping of object name to raw range pairs.
pub fn parse_listing<'a, I>(lines: I) -> HashMap<String, RawRanges>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut objects = HashMap::new();
    let mut name = String::new();
    let mut ranges = RawRanges::new();

    for line in lines {
        if let Some(rest) = line.strip_prefix(NAME_PREFIX) {
            name = rest.trim().to_owned();
        } else if line.starts_with(RANGE_PREFIX) {
            // "range N :\tBEGIN\tEND" -- the pair sits after the first colon
            if let Some((_, pair)) = line.split_once(':') {
                let pair = pair.trim();
                let (begin, end) = pair.split_once('\t').unwrap_or((pair, ""));
                ranges.push((begin.trim().to_owned(), end.trim().to_owned()));
            }
        } else if line.is_empty() && !name.is_empty() {
            objects.insert(std::mem::take(&mut name), std::mem::take(&mut ranges));
        }
    }

    objects
}
