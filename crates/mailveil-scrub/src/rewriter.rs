//! Pure text transform replacing mapped addresses with pseudonym tokens.

use crate::identity_map::IdentityMap;
use mailveil_core::find_addresses;

/// Result of rewriting one text value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOutcome {
    /// The (possibly) rewritten text
    pub text: String,
    /// Address-like substrings found, duplicates included
    pub found: u64,
    /// Substitutions actually performed
    pub replaced: u64,
}

/// Replace every mapped address occurrence in `text` with its token.
///
/// Matches are deduplicated by exact string and substituted longest-first,
/// so a full address containing another valid address as a sub-match is
/// never partially clobbered. Each distinct match found in the map (by its
/// lower-cased form) has every literal occurrence of the original substring
/// replaced with `[email:<ids>]`. Addresses absent from the map are counted
/// as found but left untouched; that is an expected case, not a failure.
///
/// The transform is idempotent: tokens contain no `@`, so a second pass
/// over already-rewritten text replaces nothing.
#[must_use]
pub fn rewrite(text: &str, map: &IdentityMap) -> RewriteOutcome {
    let matches = find_addresses(text);
    if matches.is_empty() {
        return RewriteOutcome {
            text: text.to_string(),
            found: 0,
            replaced: 0,
        };
    }

    let found = matches.len() as u64;

    // Distinct matches in first-seen order, then longest first. The sort is
    // stable, so equal-length matches keep their text order.
    let mut distinct: Vec<&str> = Vec::new();
    for m in &matches {
        if !distinct.contains(m) {
            distinct.push(m);
        }
    }
    distinct.sort_by_key(|m| std::cmp::Reverse(m.len()));

    let mut result = text.to_string();
    let mut replaced = 0u64;

    for address in distinct {
        let Some(ids) = map.ids_for(&address.to_lowercase()) else {
            continue;
        };

        let token = format!("[email:{ids}]");
        let occurrences = result.matches(address).count() as u64;
        if occurrences > 0 {
            result = result.replace(address, &token);
            replaced += occurrences;
        }
    }

    RewriteOutcome {
        text: result,
        found,
        replaced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &str)]) -> IdentityMap {
        IdentityMap::from_entries(entries.iter().copied())
    }

    #[test]
    fn test_no_match_passthrough() {
        let outcome = rewrite("no addresses here", &map(&[("a@b.co", "P1")]));
        assert_eq!(outcome.text, "no addresses here");
        assert_eq!(outcome.found, 0);
        assert_eq!(outcome.replaced, 0);
    }

    #[test]
    fn test_basic_replacement() {
        let outcome = rewrite("contact p1@co.com today", &map(&[("p1@co.com", "P1")]));
        assert_eq!(outcome.text, "contact [email:P1] today");
        assert_eq!(outcome.found, 1);
        assert_eq!(outcome.replaced, 1);
    }

    #[test]
    fn test_case_insensitive_lookup_preserves_original_span() {
        let outcome = rewrite(
            "contact p1@co.com or P2@CO.com",
            &map(&[("p1@co.com", "P1"), ("p2@co.com", "P2")]),
        );
        assert_eq!(outcome.text, "contact [email:P1] or [email:P2]");
        assert_eq!(outcome.found, 2);
        assert_eq!(outcome.replaced, 2);
    }

    #[test]
    fn test_unmapped_address_found_but_not_replaced() {
        let outcome = rewrite("mail root@other.org", &map(&[("a@b.co", "P1")]));
        assert_eq!(outcome.text, "mail root@other.org");
        assert_eq!(outcome.found, 1);
        assert_eq!(outcome.replaced, 0);
    }

    #[test]
    fn test_duplicates_counted_and_all_replaced() {
        let outcome = rewrite(
            "a@b.co, again a@b.co, and once more a@b.co",
            &map(&[("a@b.co", "P1")]),
        );
        assert_eq!(
            outcome.text,
            "[email:P1], again [email:P1], and once more [email:P1]"
        );
        assert_eq!(outcome.found, 3);
        assert_eq!(outcome.replaced, 3);
    }

    #[test]
    fn test_longest_match_precedence() {
        // a@b.co is a literal substring of xa@b.co.uk; substituting the
        // shorter address first would corrupt the longer one.
        let outcome = rewrite(
            "ping a@b.co cc xa@b.co.uk",
            &map(&[("a@b.co", "P1"), ("xa@b.co.uk", "P2")]),
        );
        assert_eq!(outcome.text, "ping [email:P1] cc [email:P2]");
        assert_eq!(outcome.found, 2);
        assert_eq!(outcome.replaced, 2);
    }

    #[test]
    fn test_comma_joined_ids_emitted_verbatim() {
        let outcome = rewrite("by team@co.com", &map(&[("team@co.com", "P3,P1,P2")]));
        assert_eq!(outcome.text, "by [email:P3,P1,P2]");
    }

    #[test]
    fn test_idempotent() {
        let entries = map(&[("p1@co.com", "P1"), ("p2@co.com", "P2")]);
        let first = rewrite("contact p1@co.com or p2@co.com", &entries);
        let second = rewrite(&first.text, &entries);

        assert_eq!(second.text, first.text);
        assert_eq!(second.found, 0);
        assert_eq!(second.replaced, 0);
    }

    #[test]
    fn test_multiline_text() {
        let text = "Fix crash\n\nReported-by: jane@dev.org\nSigned-off-by: jane@dev.org\n";
        let outcome = rewrite(text, &map(&[("jane@dev.org", "P9")]));
        assert_eq!(
            outcome.text,
            "Fix crash\n\nReported-by: [email:P9]\nSigned-off-by: [email:P9]\n"
        );
        assert_eq!(outcome.found, 2);
        assert_eq!(outcome.replaced, 2);
    }
}
