//! Stamp Cycle Math
//!
//! Pure functions deriving card-cycle state from the active-visit count.
//! Everything here is total-count in, positions out; no I/O.

use shared::models::{Milestone, StampSummary};

/// Derive the full cycle summary from an active-visit total.
///
/// `stamps_required < 1` never happens for persisted businesses (schema
/// CHECK), but the math clamps to 1 anyway rather than dividing by zero.
pub fn summary(total: i64, stamps_required: i64) -> StampSummary {
    let required = stamps_required.max(1);
    StampSummary {
        total_stamps: total,
        in_cycle: total % required,
        cards_completed: total / required,
    }
}

/// Position within the current card, counting the stamp that completes a
/// card as position `stamps_required` rather than 0.
///
/// This is the position milestones are matched against: a milestone at
/// the final stamp of a card fires on completion, and rollback keeps
/// milestones earned by a fully completed card.
pub fn cycle_position(total: i64, stamps_required: i64) -> i64 {
    let required = stamps_required.max(1);
    if total == 0 {
        return 0;
    }
    let rem = total % required;
    if rem == 0 { required } else { rem }
}

/// True when the stamp that produced `total` completed a card
pub fn completed_card(total: i64, stamps_required: i64) -> bool {
    total > 0 && total % stamps_required.max(1) == 0
}

/// The milestone reached exactly at the current cycle position, if any
pub fn milestone_at<'a>(
    milestones: &'a [Milestone],
    total: i64,
    stamps_required: i64,
) -> Option<&'a Milestone> {
    let position = cycle_position(total, stamps_required);
    milestones.iter().find(|m| m.position == position)
}
