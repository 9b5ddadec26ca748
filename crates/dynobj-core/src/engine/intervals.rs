//! Interval arithmetic over address ranges
//!
//! The reconciliation diff is computed with sorted-interval subtraction so
//! its cost scales with the number of ranges, not their width. A /8 block
//! is one interval here, never sixteen million addresses.

use crate::addr::AddrRange;

/// Sort and merge ranges into a minimal disjoint ascending list.
///
/// Overlapping and adjacent ranges collapse: `[10,14]` and `[15,20]` become
/// `[10,20]`. Input may be unsorted and overlapping, as the gateway is free
/// to return it.
pub fn normalize(ranges: &[AddrRange]) -> Vec<AddrRange> {
    let mut sorted = ranges.to_vec();
    sorted.sort();

    let mut out: Vec<AddrRange> = Vec::with_capacity(sorted.len());
    for range in sorted {
        match out.last_mut() {
            // adjacency check in u64 to survive end == u32::MAX
            Some(last) if range.begin as u64 <= last.end as u64 + 1 => {
                last.end = last.end.max(range.end);
            }
            _ => out.push(range),
        }
    }
    out
}

/// Subtract coverage: every address in `a` but not in `b`.
///
/// Both inputs must be normalized (ascending, disjoint); the result is too.
pub fn subtract(a: &[AddrRange], b: &[AddrRange]) -> Vec<AddrRange> {
    let mut out = Vec::new();
    let mut bi = 0usize;

    for range in a {
        let mut lo = range.begin as u64;
        let hi = range.end as u64;

        // b ranges ending before this a range can never matter again
        while bi < b.len() && (b[bi].end as u64) < lo {
            bi += 1;
        }

        // a b range may span several a ranges, so scan without consuming
        let mut j = bi;
        while j < b.len() && (b[j].begin as u64) <= hi && lo <= hi {
            if (b[j].begin as u64) > lo {
                out.push(AddrRange { begin: lo as u32, end: b[j].begin - 1 });
            }
            lo = b[j].end as u64 + 1;
            j += 1;
        }
        if lo <= hi {
            out.push(AddrRange { begin: lo as u32, end: range.end });
        }
    }
    out
}
