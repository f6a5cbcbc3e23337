//! Command suggestions for mistyped command names.

use strsim::levenshtein;

/// Distances at or above this are never suggested.
pub const SUGGESTION_THRESHOLD: usize = 4;

/// Suggest the known keys closest to `actual` by Levenshtein distance.
///
/// Every candidate at the minimum distance is named when that distance is
/// below [`SUGGESTION_THRESHOLD`]:
/// ``Perhaps you meant `bots`.`` or ``Perhaps you meant `a`, `b` or `c`.``
pub fn suggest<S: AsRef<str>>(actual: &str, candidates: &[S]) -> Option<String> {
    let mut best = SUGGESTION_THRESHOLD;
    let mut closest: Vec<&str> = Vec::new();

    for candidate in candidates {
        let candidate = candidate.as_ref();
        let distance = levenshtein(actual, candidate).min(SUGGESTION_THRESHOLD);
        if distance < best {
            best = distance;
            closest.clear();
        }
        if distance == best && distance < SUGGESTION_THRESHOLD && !closest.contains(&candidate) {
            closest.push(candidate);
        }
    }

    closest.sort_unstable();
    match closest.as_slice() {
        [] => None,
        [only] => Some(format!("Perhaps you meant `{}`.", only)),
        [init @ .., last] => {
            let init: Vec<String> = init.iter().map(|s| format!("`{}`", s)).collect();
            Some(format!("Perhaps you meant {} or `{}`.", init.join(", "), last))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
