//! Client-side recognition of "the standard deduction".
//!
//! The server stores deductions as plain description/amount rows, so the
//! client has to guess which one is the standard deduction in order to hide
//! the one-click "add standard deduction" action once it is used.

use crate::model::Deduction;

/// Known standard-deduction amounts (single, head of household, joint).
pub const KNOWN_STANDARD_AMOUNTS: [f64; 3] = [15000.0, 22500.0, 30000.0];

/// Description used when the client adds the standard deduction itself.
pub const STANDARD_DEDUCTION_DESCRIPTION: &str = "Standard Deduction";

/// True if the description mentions "standard" (any case) or the amount is
/// one of [`KNOWN_STANDARD_AMOUNTS`].
pub fn looks_like_standard_deduction(description: &str, amount: f64) -> bool {
    description.to_lowercase().contains("standard") || KNOWN_STANDARD_AMOUNTS.contains(&amount)
}

/// True if any deduction in `deductions` matches the heuristic.
pub fn contains_standard_deduction(deductions: &[Deduction]) -> bool {
    deductions
        .iter()
        .any(|d| looks_like_standard_deduction(&d.description, d.amount))
}

/// Number of deductions matching the heuristic.
pub fn count_standard_deductions(deductions: &[Deduction]) -> usize {
    deductions
        .iter()
        .filter(|d| looks_like_standard_deduction(&d.description, d.amount))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LineItem;

    #[test]
    fn test_description_match_is_case_insensitive() {
        assert!(looks_like_standard_deduction("Standard Deduction", 1.0));
        assert!(looks_like_standard_deduction("my STANDARD one", 1.0));
        assert!(!looks_like_standard_deduction("Mortgage interest", 1.0));
    }

    #[test]
    fn test_known_amounts_match() {
        for amount in KNOWN_STANDARD_AMOUNTS {
            assert!(looks_like_standard_deduction("Anything", amount));
        }
        assert!(!looks_like_standard_deduction("Anything", 15000.01));
    }

    #[test]
    fn test_collection_scan() {
        let deductions = vec![
            LineItem::new("Charity", 250.0),
            LineItem::new("Standard Deduction", 15000.0),
        ];
        assert!(contains_standard_deduction(&deductions));
        assert!(!contains_standard_deduction(&deductions[..1]));
        assert!(!contains_standard_deduction(&[]));
    }

    #[test]
    fn test_count_matches() {
        let deductions = vec![
            LineItem::new("Standard Deduction", 15000.0),
            LineItem::new("Charity", 250.0),
            LineItem::new("Flat", 22500.0),
        ];
        assert_eq!(count_standard_deductions(&deductions), 2);
        assert_eq!(count_standard_deductions(&deductions[1..2]), 0);
    }
}
