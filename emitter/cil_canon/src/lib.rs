//! Output normalizer and differ.
//!
//! Different backends legally emit property get/set and event add/remove
//! accessor lines, custom-attribute lists, and field lists in different
//! relative orders while remaining semantically identical. Normalization
//! rewrites each listing into a canonical form — get/add before set/remove,
//! list-shaped runs sorted — so listings from different backends become
//! directly comparable, then a line diff proves (or disproves) equivalence.
//!
//! Normalization is idempotent, and a malformed block (unmatched delimiter)
//! is left untouched: the comparison then surfaces a genuine diff instead
//! of a crash.

mod diff;
mod normalize;

pub use diff::{diff_lines, write_diff, DiffLine, DiffReport, DiffTag};
pub use normalize::{normalize, strip_volatile};

/// Full canonicalization pipeline: strip volatile lines, then normalize.
pub fn canonicalize(text: &str) -> String {
    normalize(&strip_volatile(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_canonicalize_is_idempotent() {
        let text = "// MVID: {x}\n.property instance string P()\n{\n  .set instance void T::set_P(string)\n  .get instance string T::get_P()\n}\n";
        let once = canonicalize(text);
        assert_eq!(canonicalize(&once), once);
    }
}
