//! # Rewards Module
//!
//! Reward-bracket accumulation: every [`BRACKET_SIZE`] completed orders, the
//! customer's cumulative spend for those orders is mapped to a bonus.
//!
//! ## Accumulator Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  order completed (amount)                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  count += 1, spend += amount                                            │
//! │       │                                                                 │
//! │       ├── count < 10 ──► keep state, no reward                          │
//! │       │                                                                 │
//! │       └── count == 10                                                   │
//! │              │                                                          │
//! │              ├── finite bracket contains spend ──► award reward_value   │
//! │              ├── only open-ended bracket matches ──► 0, manual review   │
//! │              └── no bracket matches ──► 0                               │
//! │              │                                                          │
//! │              ▼                                                          │
//! │         reset to (0, 0) in the same step                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The function is pure. Making the read-modify-write atomic per user is the
//! repository's job.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{RewardBracketState, SpendingBracket};

/// Orders per bracket.
pub const BRACKET_SIZE: i64 = 10;

/// What one completed order did to the accumulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RewardOutcome {
    /// State to persist. Zeroed when a bracket completed.
    pub state: RewardBracketState,
    pub bracket_completed: bool,
    pub reward_awarded: Money,
    /// Spend went past every finite bracket. No automatic reward; an
    /// administrator has to decide.
    pub manual_review: bool,
    /// Spend that closed the bracket (zero when not completed).
    pub completed_spend: Money,
    /// Label of the matched bracket, if any.
    pub bracket_label: Option<String>,
}

/// Records one completed order.
///
/// ```rust
/// use duka_core::rewards::record_order;
/// use duka_core::{Money, RewardBracketState, SpendingBracket};
///
/// let brackets = vec![SpendingBracket {
///     id: "b1".into(),
///     tenant_id: "t1".into(),
///     label: "Silver".into(),
///     min_spend: 30_100,
///     max_spend: Some(50_000),
///     reward_value: 2_000,
/// }];
///
/// let mut state = RewardBracketState::new("user-1");
/// for _ in 0..9 {
///     state = record_order(&state, Money::from_minor(4_500), &brackets).state;
/// }
/// let outcome = record_order(&state, Money::from_minor(4_500), &brackets);
/// assert!(outcome.bracket_completed);
/// assert_eq!(outcome.reward_awarded.minor(), 2_000);
/// assert_eq!(outcome.state.order_count, 0);
/// ```
pub fn record_order(
    state: &RewardBracketState,
    order_amount: Money,
    brackets: &[SpendingBracket],
) -> RewardOutcome {
    let order_count = state.order_count + 1;
    let spend = state.spend() + order_amount;

    if order_count < BRACKET_SIZE {
        return RewardOutcome {
            state: RewardBracketState {
                user_id: state.user_id.clone(),
                cumulative_spend: spend.minor(),
                order_count,
            },
            bracket_completed: false,
            reward_awarded: Money::zero(),
            manual_review: false,
            completed_spend: Money::zero(),
            bracket_label: None,
        };
    }

    let matched = match_bracket(spend, brackets);
    let (reward_awarded, manual_review, bracket_label) = match matched {
        Some(bracket) if bracket.is_open_ended() => {
            (Money::zero(), true, Some(bracket.label.clone()))
        }
        Some(bracket) => (bracket.reward(), false, Some(bracket.label.clone())),
        None => (Money::zero(), exceeds_finite_brackets(spend, brackets), None),
    };

    RewardOutcome {
        state: RewardBracketState::new(state.user_id.clone()),
        bracket_completed: true,
        reward_awarded,
        manual_review,
        completed_spend: spend,
        bracket_label,
    }
}

/// First bracket whose range contains `spend`.
///
/// First match wins if the configuration overlaps;
/// [`crate::validation::validate_brackets`] catches that at setup time.
pub fn match_bracket(spend: Money, brackets: &[SpendingBracket]) -> Option<&SpendingBracket> {
    brackets.iter().find(|b| b.contains(spend))
}

/// True when at least one finite bracket exists and `spend` is above all of
/// their upper bounds.
fn exceeds_finite_brackets(spend: Money, brackets: &[SpendingBracket]) -> bool {
    brackets
        .iter()
        .filter_map(|b| b.max_spend)
        .max()
        .map_or(false, |highest| spend.minor() > highest)
}

// =============================================================================
// Unit Tests
// =============================================================================
