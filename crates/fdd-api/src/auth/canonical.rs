//! Parameter canonicalization.
//!
//! The canonical string of a business parameter set is the concatenation of
//! its **values only**, ordered by key, with no delimiter:
//!
//! ```text
//! {open_id: "u1", account_type: 1}  →  sort keys  →  "1" + "u1"  →  "1u1"
//! ```
//!
//! Key names are discarded after sorting. The key collation is selectable
//! through [`SortMode`], whose numeric flags follow the sort flags of the
//! platform's reference client.

use std::cmp::Ordering;

/// Key collation used when canonicalizing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortMode {
    /// Flag `0`. Keys that look numeric compare as numbers and sort ahead of
    /// all other keys, which compare bytewise.
    #[default]
    Regular,
    /// Flag `1`. Keys compare as numbers; non-numeric keys count as zero.
    Numeric,
    /// Flag `2`. Plain bytewise comparison.
    String,
    /// Flag `6`. Natural order: digit runs compare by numeric value.
    Natural,
    /// Flag `10`. Bytewise, ignoring ASCII case.
    StringCaseInsensitive,
}

impl SortMode {
    /// Map a numeric collation flag to a mode.
    pub fn from_flag(flag: i32) -> Option<Self> {
        match flag {
            0 => Some(Self::Regular),
            1 => Some(Self::Numeric),
            2 => Some(Self::String),
            6 => Some(Self::Natural),
            10 => Some(Self::StringCaseInsensitive),
            _ => None,
        }
    }

    /// Compare two keys. Ties fall back to bytewise order so that the result
    /// is total and canonical strings are deterministic.
    pub fn compare(self, a: &str, b: &str) -> Ordering {
        let primary = match self {
            Self::Regular => match (numeric_value(a), numeric_value(b)) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            Self::Numeric => {
                let x = numeric_value(a).unwrap_or(0.0);
                let y = numeric_value(b).unwrap_or(0.0);
                x.total_cmp(&y)
            }
            Self::String => Ordering::Equal,
            Self::Natural => natural_cmp(a, b),
            Self::StringCaseInsensitive => a
                .bytes()
                .map(|c| c.to_ascii_lowercase())
                .cmp(b.bytes().map(|c| c.to_ascii_lowercase())),
        };
        primary.then_with(|| a.cmp(b))
    }
}

/// Build the canonical string for a set of `(key, value)` pairs.
///
/// An empty set yields the empty string.
pub fn canonicalize<I, K, V>(entries: I, mode: SortMode) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut entries: Vec<(K, V)> = entries.into_iter().collect();
    entries.sort_by(|(a, _), (b, _)| mode.compare(a.as_ref(), b.as_ref()));
    entries.iter().map(|(_, v)| v.as_ref()).collect()
}

/// Canonical string for the template-fill flow: `template_id` then
/// `contract_id`, nothing else.
///
/// The remote side signs only these two identifiers for template fills, so
/// the fill content and every other field stay out of the digest.
pub fn template_fill_canonical(template_id: &str, contract_id: &str) -> String {
    format!("{template_id}{contract_id}")
}

/// Value of a key that looks like a number (`12`, `-3.5`, `1e3`).
fn numeric_value(s: &str) -> Option<f64> {
    let t = s.trim();
    let starts_ok = t
        .bytes()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || matches!(c, b'+' | b'-' | b'.'));
    if !starts_ok || !t.bytes().all(|c| c.is_ascii_digit() || b"+-.eE".contains(&c)) {
        return None;
    }
    t.parse().ok()
}

/// Natural-order comparison: runs of digits compare by value, other bytes
/// compare directly.
fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        if a[i].is_ascii_digit() && b[j].is_ascii_digit() {
            let (run_a, next_i) = digit_run(a, i);
            let (run_b, next_j) = digit_run(b, j);
            let ord = run_a.len().cmp(&run_b.len()).then_with(|| run_a.cmp(run_b));
            if ord != Ordering::Equal {
                return ord;
            }
            i = next_i;
            j = next_j;
        } else {
            match a[i].cmp(&b[j]) {
                Ordering::Equal => {
                    i += 1;
                    j += 1;
                }
                ord => return ord,
            }
        }
    }

    (a.len() - i).cmp(&(b.len() - j))
}

/// Digit run starting at `start`, with leading zeros stripped, and the index
/// just past it.
fn digit_run(s: &[u8], start: usize) -> (&[u8], usize) {
    let end = s[start..]
        .iter()
        .position(|c| !c.is_ascii_digit())
        .map_or(s.len(), |p| start + p);
    let run = &s[start..end];
    let first_significant = run.iter().position(|&c| c != b'0').unwrap_or(run.len());
    (&run[first_significant..], end)
}
