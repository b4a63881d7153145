use std::collections::BTreeMap;

use kurbo::Size;
use planview::{SeatMapProps, SeatMapView, ViewEvent};

const PLAN: &str = r#"
<svg>
  <rect seat_number="A1" seat_row="1" seat_row_number="1" x="10" y="10" width="10" height="10"/>
  <rect seat_number="A2" seat_row="1" seat_row_number="2" x="30" y="10" width="10" height="10"/>
</svg>
"#;

fn props() -> SeatMapProps {
    let mut seats = BTreeMap::new();
    seats.insert("A1".to_string(), "std".to_string());
    seats.insert("A2".to_string(), "std".to_string());
    SeatMapProps {
        plan_markup: PLAN.to_string(),
        seat_groups: vec![planview::SeatGroup {
            id: "g1".to_string(),
            color: "#00ff00".to_string(),
            seats,
            ..planview::SeatGroup::default()
        }],
        ..SeatMapProps::default()
    }
}

#[test]
fn seats_loaded_fires_once_per_parse() {
    let (mut view, events) = SeatMapView::new(props(), Size::new(800.0, 600.0)).unwrap();
    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], ViewEvent::SeatsLoaded { seats } if seats.len() == 2));

    // Selection-only change: no reparse, no SeatsLoaded.
    let mut p = props();
    p.selection = vec!["A1".to_string()];
    assert!(view.set_props(p).unwrap().is_empty());

    // Markup change: reparse and a fresh SeatsLoaded.
    let mut p = props();
    p.plan_markup = p.plan_markup.replace("A2", "B2");
    let events = view.set_props(p).unwrap();
    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], ViewEvent::SeatsLoaded { .. }));
    assert!(view.seats().iter().any(|s| s.id == "B2"));
}

#[test]
fn effective_blocked_is_rederived_on_input_change() {
    let (mut view, _) = SeatMapView::new(props(), Size::new(800.0, 600.0)).unwrap();
    assert!(view.effective_blocked().is_empty());

    let mut p = props();
    p.blocked_seats = vec!["A1".to_string()];
    view.set_props(p).unwrap();
    assert!(view.effective_blocked().contains("A1"));

    view.set_props(props()).unwrap();
    assert!(view.effective_blocked().is_empty());
}

#[test]
fn frame_fingerprint_tracks_visible_state() {
    let (mut view, _) = SeatMapView::new(props(), Size::new(800.0, 600.0)).unwrap();
    let initial = view.frame_fingerprint();

    // No change, same digest.
    assert_eq!(view.frame_fingerprint(), initial);

    let mut p = props();
    p.selection = vec!["A1".to_string()];
    view.set_props(p).unwrap();
    let selected = view.frame_fingerprint();
    assert_ne!(selected, initial);

    view.zoom_in(0.0);
    view.tick(10.0);
    assert_ne!(view.frame_fingerprint(), selected);
}

#[test]
fn zoom_controls_share_the_single_animation_slot() {
    let (mut view, _) = SeatMapView::new(props(), Size::new(800.0, 600.0)).unwrap();
    assert!(view.zoom_in(0.0));
    // A second request while the first runs is dropped.
    assert!(!view.zoom_in(0.1));
    assert!(!view.reset_view(0.1));
    view.tick(10.0);
    assert!(view.zoom_in(20.0));
    view.tick(30.0);

    assert!(view.reset_view(40.0));
    view.tick(50.0);
    let vp = view.viewport();
    assert!((vp.scale() - vp.fit_scale()).abs() < 1e-9);
}

#[test]
fn zoom_out_never_goes_below_the_fit_scale() {
    let (mut view, _) = SeatMapView::new(props(), Size::new(800.0, 600.0)).unwrap();
    assert!(view.zoom_out(0.0));
    view.tick(10.0);
    let vp = view.viewport();
    assert!(vp.scale() >= vp.fit_scale() - 1e-9);
}

#[test]
fn empty_plan_still_mounts() {
    let p = SeatMapProps {
        plan_markup: "<svg/>".to_string(),
        ..SeatMapProps::default()
    };
    let (view, events) = SeatMapView::new(p, Size::new(800.0, 600.0)).unwrap();
    assert!(matches!(&events[0], ViewEvent::SeatsLoaded { seats } if seats.is_empty()));
    assert!(view.viewport().scale().is_finite());
    assert!(view.viewport().scale() > 0.0);
}
