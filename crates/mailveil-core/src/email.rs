//! The fixed email address grammar and matcher.
//!
//! The grammar deliberately does not cover every valid RFC-5322 address.
//! `/` is left out so matches embed cleanly in document text, and non-ASCII
//! scripts are not supported. The exact character classes are a compatibility
//! contract with already-anonymized datasets and must not be changed.

use once_cell::sync::Lazy;
use regex::Regex;

/// Compiled address grammar.
///
/// Local part: 1-64 characters from a restricted ASCII set. Domain: 1-253
/// characters of `[a-zA-Z0-9.-]`, a literal dot, then a 1-63 letter TLD.
/// The whole address is captured as a single group.
static ADDRESS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([a-zA-Z0-9!#$%&'*+=?^_`.{|}~-]{1,64}@[a-zA-Z0-9.-]{1,253}\.[a-zA-Z]{1,63})")
        .expect("valid email address regex")
});

/// Find every address-like substring in `text`, in left-to-right order.
///
/// Each returned slice is a maximal, non-overlapping match of the grammar.
/// Mixed case is accepted and preserved; canonicalization (lower-casing)
/// is the caller's responsibility. Returns an empty vec when nothing
/// matches.
#[must_use]
pub fn find_addresses(text: &str) -> Vec<&str> {
    ADDRESS_REGEX.find_iter(text).map(|m| m.as_str()).collect()
}
