use std::collections::BTreeSet;

use crate::model::{SeatGroup, SeatInfo};

/// Venue rules for wheelchair placement. The defaults reproduce the
/// venue's row-segment table and legal capacity; both are injectable so
/// other venues can supply their own.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RuleConfig {
    /// Inclusive row ranges. The 2-row spacing rule applies only between
    /// wheelchair seats inside the same segment; rows outside every
    /// segment are exempt.
    pub wheelchair_segments: Vec<(u32, u32)>,
    /// Plan-wide maximum of reserved/selected wheelchair spaces.
    pub wheelchair_cap: usize,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            wheelchair_segments: vec![
                (1, 10),
                (11, 25),
                (26, 40),
                (41, 55),
                (56, 68),
                (69, 83),
            ],
            wheelchair_cap: 15,
        }
    }
}

impl RuleConfig {
    /// Segment index for a row, 1-based. 0 means the row is outside every
    /// segment and exempt from the spacing rule.
    pub fn segment_of(&self, row: u32) -> usize {
        self.wheelchair_segments
            .iter()
            .position(|&(lo, hi)| (lo..=hi).contains(&row))
            .map_or(0, |i| i + 1)
    }
}

/// Derives the effective blocked-seat set. Pure and total: identical
/// inputs give identical output, malformed group data reads as empty,
/// nothing is cached.
///
/// 1. base = explicit blocks + reserved seats of active groups
/// 2. one-hop linked propagation out of base
/// 3. wheelchair spacing within row segments
/// 4. plan-wide wheelchair capacity cap
pub fn effective_blocked(
    config: &RuleConfig,
    explicit_blocked: &[String],
    groups: &[SeatGroup],
    seats: &[SeatInfo],
    selection: &[String],
) -> BTreeSet<String> {
    let mut base: BTreeSet<&str> = explicit_blocked.iter().map(String::as_str).collect();
    for group in groups.iter().filter(|g| g.reservation_active) {
        base.extend(group.reserved_seats.iter().map(String::as_str));
    }

    let selected: BTreeSet<&str> = selection.iter().map(String::as_str).collect();

    // Step 2: a seat linked to a blocked seat is blocked too. One hop
    // only; linked blocks do not propagate further.
    let linked: BTreeSet<&str> = seats
        .iter()
        .filter(|s| {
            s.linked_seat_number
                .as_deref()
                .is_some_and(|l| base.contains(l))
        })
        .map(|s| s.id.as_str())
        .collect();

    // Steps 3 and 4 trigger on wheelchair spaces that are taken directly
    // (reserved/explicit/selected), not on spacing casualties or seats
    // blocked only through a link.
    let taken_spaces: Vec<&SeatInfo> = seats
        .iter()
        .filter(|s| s.seat_type.is_wheelchair_space())
        .filter(|s| base.contains(s.id.as_str()) || selected.contains(s.id.as_str()))
        .collect();

    let mut auto: BTreeSet<&str> = linked;

    for taken in &taken_spaces {
        let Some(row) = taken.row_index() else {
            continue;
        };
        let segment = config.segment_of(row);
        if segment == 0 {
            continue;
        }

        for other in seats.iter().filter(|s| s.seat_type.is_wheelchair_space()) {
            if other.id == taken.id || other.seat_row_number != taken.seat_row_number {
                continue;
            }
            let Some(other_row) = other.row_index() else {
                continue;
            };
            if config.segment_of(other_row) != segment {
                continue;
            }
            let gap = row.abs_diff(other_row);
            if (1..=2).contains(&gap)
                && !base.contains(other.id.as_str())
                && !selected.contains(other.id.as_str())
            {
                auto.insert(other.id.as_str());
            }
        }
    }

    if taken_spaces.len() >= config.wheelchair_cap {
        for seat in seats.iter().filter(|s| s.seat_type.is_wheelchair_space()) {
            if !base.contains(seat.id.as_str()) && !selected.contains(seat.id.as_str()) {
                auto.insert(seat.id.as_str());
            }
        }
    }

    base.union(&auto).map(|s| (*s).to_string()).collect()
}
