//! # Spin Module
//!
//! Weighted selection for the spin-the-wheel promotion.
//!
//! ## Cumulative Weight Table
//! ```text
//! prizes:   [ A w=5 ][ B w=3 ][ C w=0 ][ D w=2, stock 0 ][ E w=10 ]
//! eligible:  A         B                                   E
//! table:    [0 ..... 5)[5 .. 8)[8 ..................... 18)
//!
//! roll ∈ [0, 18) drawn uniformly by the caller
//!   roll = 6  ──► B
//!   roll = 17 ──► E
//! ```
//!
//! The roll is a parameter so selection stays deterministic under test; the
//! repository draws it with `rand` and persists the outcome.

use crate::types::SpinPrize;

/// Sum of weights over prizes that can currently be won.
pub fn total_weight(prizes: &[SpinPrize]) -> i64 {
    prizes
        .iter()
        .filter(|p| p.is_eligible())
        .map(|p| p.weight)
        .sum()
}

/// Picks the prize whose cumulative-weight slot contains `roll`.
///
/// Returns `None` when no prize is eligible or `roll` is outside
/// `[0, total_weight)`.
///
/// ```rust
/// use duka_core::spin::pick_prize;
/// use duka_core::SpinPrize;
///
/// let prize = |label: &str, weight| SpinPrize {
///     id: label.into(),
///     tenant_id: "t".into(),
///     label: label.into(),
///     weight,
///     reward_value: 0,
///     stock_remaining: None,
///     is_active: true,
/// };
/// let wheel = vec![prize("Try again", 7), prize("Free delivery", 3)];
///
/// assert_eq!(pick_prize(&wheel, 0).unwrap().label, "Try again");
/// assert_eq!(pick_prize(&wheel, 7).unwrap().label, "Free delivery");
/// assert!(pick_prize(&wheel, 10).is_none());
/// ```
pub fn pick_prize(prizes: &[SpinPrize], roll: i64) -> Option<&SpinPrize> {
    if roll < 0 {
        return None;
    }

    let mut upper = 0i64;
    for prize in prizes.iter().filter(|p| p.is_eligible()) {
        upper += prize.weight;
        if roll < upper {
            return Some(prize);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prize(label: &str, weight: i64, stock: Option<i64>) -> SpinPrize {
        SpinPrize {
            id: label.to_lowercase(),
            tenant_id: "t".to_string(),
            label: label.to_string(),
            weight,
            reward_value: 500,
            stock_remaining: stock,
            is_active: true,
        }
    }

    fn wheel() -> Vec<SpinPrize> {
        let mut inactive = prize("Retired", 50, None);
        inactive.is_active = false;
        vec![
            prize("A", 5, None),
            prize("B", 3, Some(4)),
            prize("C", 0, None),
            prize("D", 2, Some(0)),
            inactive,
            prize("E", 10, None),
        ]
    }

    #[test]
    fn test_total_weight_skips_ineligible() {
        assert_eq!(total_weight(&wheel()), 18);
        assert_eq!(total_weight(&[]), 0);
    }

    #[test]
    fn test_pick_prize_slots() {
        let w = wheel();
        let label = |roll| pick_prize(&w, roll).map(|p| p.label.clone());

        assert_eq!(label(0).as_deref(), Some("A"));
        assert_eq!(label(4).as_deref(), Some("A"));
        assert_eq!(label(5).as_deref(), Some("B"));
        assert_eq!(label(7).as_deref(), Some("B"));
        assert_eq!(label(8).as_deref(), Some("E"));
        assert_eq!(label(17).as_deref(), Some("E"));
    }

    #[test]
    fn test_pick_prize_out_of_range() {
        let w = wheel();
        assert!(pick_prize(&w, -1).is_none());
        assert!(pick_prize(&w, 18).is_none());
    }

    #[test]
    fn test_every_roll_hits_an_eligible_prize() {
        let w = wheel();
        let total = total_weight(&w);
        let mut hits = std::collections::HashMap::new();
        for roll in 0..total {
            let p = pick_prize(&w, roll).unwrap();
            assert!(p.is_eligible());
            *hits.entry(p.label.clone()).or_insert(0i64) += 1;
        }
        assert_eq!(hits["A"], 5);
        assert_eq!(hits["B"], 3);
        assert_eq!(hits["E"], 10);
        assert!(!hits.contains_key("D"));
    }

    #[test]
    fn test_empty_wheel() {
        let w = vec![prize("Gone", 5, Some(0))];
        assert_eq!(total_weight(&w), 0);
        assert!(pick_prize(&w, 0).is_none());
    }
}
