use std::collections::BTreeMap;

use kurbo::{Point, Rect};
use planview::{RuleConfig, SeatGroup, SeatInfo, SeatType, effective_blocked};

fn seat(id: &str, seat_type: SeatType, row: &str, row_number: u32) -> SeatInfo {
    SeatInfo {
        id: id.to_string(),
        seat_type,
        seat_row: row.to_string(),
        seat_row_number: row_number,
        linked_seat_number: None,
        center: Point::new(5.0, 5.0),
        path_data: String::new(),
        bounds: Rect::new(0.0, 0.0, 10.0, 10.0),
        seat_group_id: Some("g1".to_string()),
        color: planview::Rgba8::rgb(0, 0, 0),
        display_name: id.to_string(),
    }
}

fn linked(id: &str, to: &str) -> SeatInfo {
    SeatInfo {
        linked_seat_number: Some(to.to_string()),
        ..seat(id, SeatType::Normal, "1", 1)
    }
}

fn active_group(reserved: &[&str]) -> SeatGroup {
    SeatGroup {
        id: "g1".to_string(),
        color: "#ff0000".to_string(),
        reservation_active: true,
        reserved_seats: reserved.iter().map(|s| s.to_string()).collect(),
        seats: BTreeMap::new(),
    }
}

#[test]
fn inactive_group_reservations_do_not_block() {
    let seats = vec![seat("A1", SeatType::Normal, "1", 1)];
    let group = SeatGroup {
        reservation_active: false,
        ..active_group(&["A1"])
    };
    let blocked = effective_blocked(&RuleConfig::default(), &[], &[group], &seats, &[]);
    assert!(blocked.is_empty());
}

#[test]
fn linked_seat_follows_blocked_partner() {
    // B5 reserved, B6 linked to B5: both end up blocked.
    let seats = vec![
        {
            let mut s = seat("B5", SeatType::Normal, "2", 5);
            s.linked_seat_number = Some("B6".to_string());
            s
        },
        linked("B6", "B5"),
    ];
    let blocked = effective_blocked(
        &RuleConfig::default(),
        &[],
        &[active_group(&["B5"])],
        &seats,
        &[],
    );
    assert_eq!(
        blocked.iter().map(String::as_str).collect::<Vec<_>>(),
        vec!["B5", "B6"]
    );
}

#[test]
fn linked_propagation_is_one_hop_only() {
    // C links to B, B links to A, A blocked: B follows, C does not.
    let seats = vec![
        seat("A", SeatType::Normal, "1", 1),
        linked("B", "A"),
        linked("C", "B"),
    ];
    let blocked = effective_blocked(
        &RuleConfig::default(),
        &["A".to_string()],
        &[],
        &seats,
        &[],
    );
    assert!(blocked.contains("A"));
    assert!(blocked.contains("B"));
    assert!(!blocked.contains("C"));
}

#[test]
fn wheelchair_spacing_blocks_two_rows_each_way() {
    let seats: Vec<SeatInfo> = (3..=8)
        .map(|row| seat(&format!("W{row}"), SeatType::Wheelchair, &row.to_string(), 1))
        .collect();
    let blocked = effective_blocked(
        &RuleConfig::default(),
        &["W5".to_string()],
        &[],
        &seats,
        &[],
    );
    for id in ["W3", "W4", "W5", "W6", "W7"] {
        assert!(blocked.contains(id), "{id} should be blocked");
    }
    assert!(!blocked.contains("W8"));
}

#[test]
fn wheelchair_spacing_respects_segment_boundary() {
    // Rows 10 and 11 are adjacent but in different segments.
    let seats = vec![
        seat("W10", SeatType::Wheelchair, "10", 1),
        seat("W11", SeatType::Wheelchair, "11", 1),
        seat("W12", SeatType::Wheelchair, "12", 1),
    ];
    let blocked = effective_blocked(
        &RuleConfig::default(),
        &["W10".to_string()],
        &[],
        &seats,
        &[],
    );
    assert!(blocked.contains("W10"));
    assert!(!blocked.contains("W11"));
    assert!(!blocked.contains("W12"));
}

#[test]
fn wheelchair_spacing_requires_same_seat_row_number() {
    let seats = vec![
        seat("W5a", SeatType::Wheelchair, "5", 1),
        seat("W6b", SeatType::Wheelchair, "6", 2),
    ];
    let blocked = effective_blocked(
        &RuleConfig::default(),
        &["W5a".to_string()],
        &[],
        &seats,
        &[],
    );
    assert!(!blocked.contains("W6b"));
}

#[test]
fn selected_wheelchair_seat_triggers_spacing_without_being_blocked() {
    let seats = vec![
        seat("W5", SeatType::Wheelchair, "5", 1),
        seat("W6", SeatType::Wheelchair, "6", 1),
    ];
    let blocked = effective_blocked(
        &RuleConfig::default(),
        &[],
        &[],
        &seats,
        &["W5".to_string()],
    );
    assert!(!blocked.contains("W5"), "selection itself is not blocked");
    assert!(blocked.contains("W6"));
}

#[test]
fn link_blocked_wheelchair_seat_does_not_trigger_spacing() {
    // W5 is blocked only through its link; that must not radiate.
    let seats = vec![
        {
            let mut s = seat("W5", SeatType::Wheelchair, "5", 1);
            s.linked_seat_number = Some("X".to_string());
            s
        },
        seat("W6", SeatType::Wheelchair, "6", 1),
        seat("X", SeatType::Normal, "99", 1),
    ];
    let blocked = effective_blocked(
        &RuleConfig::default(),
        &["X".to_string()],
        &[],
        &seats,
        &[],
    );
    assert!(blocked.contains("W5"));
    assert!(!blocked.contains("W6"));
}

#[test]
fn rows_outside_every_segment_are_exempt_from_spacing() {
    let seats = vec![
        seat("W90", SeatType::Wheelchair, "90", 1),
        seat("W91", SeatType::Wheelchair, "91", 1),
    ];
    let blocked = effective_blocked(
        &RuleConfig::default(),
        &["W90".to_string()],
        &[],
        &seats,
        &[],
    );
    assert!(!blocked.contains("W91"));
}

#[test]
fn capacity_cap_blocks_remaining_wheelchair_seats() {
    // 15 taken spaces plus one free one, spread out so spacing alone
    // cannot explain the result.
    let mut seats: Vec<SeatInfo> = (0..15)
        .map(|i| {
            seat(
                &format!("W{i}"),
                SeatType::Wheelchair,
                &(90 + i).to_string(), // outside every segment
                i as u32,
            )
        })
        .collect();
    seats.push(seat("W16", SeatType::Wheelchair, "120", 99));
    let taken: Vec<String> = (0..15).map(|i| format!("W{i}")).collect();

    let blocked = effective_blocked(&RuleConfig::default(), &taken, &[], &seats, &[]);
    assert!(blocked.contains("W16"));
}

#[test]
fn fourteen_taken_spaces_leave_the_rest_free() {
    let mut seats: Vec<SeatInfo> = (0..14)
        .map(|i| {
            seat(
                &format!("W{i}"),
                SeatType::Wheelchair,
                &(90 + i).to_string(),
                i as u32,
            )
        })
        .collect();
    seats.push(seat("W16", SeatType::Wheelchair, "120", 99));
    let taken: Vec<String> = (0..14).map(|i| format!("W{i}")).collect();

    let blocked = effective_blocked(&RuleConfig::default(), &taken, &[], &seats, &[]);
    assert!(!blocked.contains("W16"));
}

#[test]
fn companion_seats_do_not_count_toward_the_cap() {
    let mut seats: Vec<SeatInfo> = (0..15)
        .map(|i| {
            seat(
                &format!("C{i}"),
                SeatType::WheelchairAccompaniment,
                &(90 + i).to_string(),
                i as u32,
            )
        })
        .collect();
    seats.push(seat("W16", SeatType::Wheelchair, "120", 99));
    let taken: Vec<String> = (0..15).map(|i| format!("C{i}")).collect();

    let blocked = effective_blocked(&RuleConfig::default(), &taken, &[], &seats, &[]);
    assert!(!blocked.contains("W16"));
}

#[test]
fn derivation_is_pure() {
    let seats = vec![
        seat("W5", SeatType::Wheelchair, "5", 1),
        seat("W6", SeatType::Wheelchair, "6", 1),
        linked("B6", "B5"),
    ];
    let groups = vec![active_group(&["B5", "W5"])];
    let explicit = vec!["E1".to_string()];
    let selection = vec!["S1".to_string()];

    let cfg = RuleConfig::default();
    let first = effective_blocked(&cfg, &explicit, &groups, &seats, &selection);
    for _ in 0..3 {
        assert_eq!(
            effective_blocked(&cfg, &explicit, &groups, &seats, &selection),
            first
        );
    }
}

#[test]
fn custom_segments_are_honored() {
    let cfg = RuleConfig {
        wheelchair_segments: vec![(1, 2), (3, 4)],
        wheelchair_cap: 15,
    };
    let seats = vec![
        seat("W2", SeatType::Wheelchair, "2", 1),
        seat("W3", SeatType::Wheelchair, "3", 1),
    ];
    let blocked = effective_blocked(&cfg, &["W2".to_string()], &[], &seats, &[]);
    // Adjacent rows, but the custom table splits them.
    assert!(!blocked.contains("W3"));
}
