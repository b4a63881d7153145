use kurbo::{Point, Rect};

use crate::geom::Rgba8;

/// Fill used for seats whose seat number matches no seat group. Such
/// seats render but can never be selected.
pub const NEUTRAL_SEAT_COLOR: Rgba8 = Rgba8::rgb(0xc8, 0xc8, 0xc8);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatType {
    Normal,
    Wheelchair,
    WheelchairSide,
    WheelchairAccompaniment,
}

impl SeatType {
    pub fn from_attr(value: &str) -> Self {
        match value {
            "wheelchair" => Self::Wheelchair,
            "wheelchair_side" => Self::WheelchairSide,
            "wheelchair_accompaniment" => Self::WheelchairAccompaniment,
            _ => Self::Normal,
        }
    }

    /// Physical wheelchair positions, subject to the spacing and capacity
    /// rules. Companion seats are not spaces themselves.
    pub fn is_wheelchair_space(self) -> bool {
        matches!(self, Self::Wheelchair | Self::WheelchairSide)
    }

    /// Everything shown only in wheelchair mode (spaces and companions).
    pub fn is_wheelchair_category(self) -> bool {
        !matches!(self, Self::Normal)
    }
}

/// One selectable seat parsed out of the plan markup.
#[derive(Clone, Debug, serde::Serialize)]
pub struct SeatInfo {
    /// Equals the seat number; unique within a plan.
    pub id: String,
    pub seat_type: SeatType,
    pub seat_row: String,
    pub seat_row_number: u32,
    pub linked_seat_number: Option<String>,
    pub center: Point,
    pub path_data: String,
    pub bounds: Rect,
    pub seat_group_id: Option<String>,
    pub color: Rgba8,
    pub display_name: String,
}

impl SeatInfo {
    /// Row label as a number, for the wheelchair segment table. Rows with
    /// non-numeric labels fall outside every segment.
    pub fn row_index(&self) -> Option<u32> {
        self.seat_row.trim().parse().ok()
    }
}

/// Decorative plan geometry (stage outline, section labels, walls).
/// Never hit-tested, never selectable.
#[derive(Clone, Debug, serde::Serialize)]
pub struct LegendInfo {
    pub id: String,
    pub shape: LegendShape,
    pub rotation: Option<Rotation>,
    pub fill: Option<Rgba8>,
    pub stroke: Option<Rgba8>,
    pub bounds: Rect,
}

#[derive(Clone, Debug, serde::Serialize)]
pub enum LegendShape {
    Path { data: String },
    Rect { rect: Rect },
}

/// `rotate(angle cx cy)` from the markup: degrees around a pivot.
#[derive(Clone, Copy, Debug, serde::Serialize)]
pub struct Rotation {
    pub angle_deg: f64,
    pub cx: f64,
    pub cy: f64,
}

impl Rotation {
    pub fn to_affine(self) -> kurbo::Affine {
        kurbo::Affine::rotate_about(self.angle_deg.to_radians(), Point::new(self.cx, self.cy))
    }
}

/// Seat group as supplied by the booking flow. Absent fields read as
/// empty; the availability rules never fail on malformed groups.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SeatGroup {
    pub id: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub reservation_active: bool,
    #[serde(default)]
    pub reserved_seats: Vec<String>,
    /// seat number -> category key within the group.
    #[serde(default)]
    pub seats: std::collections::BTreeMap<String, String>,
}

/// Everything parsed out of one plan document, in document order.
#[derive(Clone, Debug, Default, serde::Serialize)]
pub struct ParsedPlan {
    pub seats: Vec<SeatInfo>,
    pub legends: Vec<LegendInfo>,
}

impl ParsedPlan {
    /// Union box of all seat and legend bounds; `None` for an empty plan.
    pub fn content_bounds(&self) -> Option<Rect> {
        let mut it = self
            .seats
            .iter()
            .map(|s| s.bounds)
            .chain(self.legends.iter().map(|l| l.bounds));
        let first = it.next()?;
        Some(it.fold(first, |acc, r| acc.union(r)))
    }

    pub fn seat(&self, id: &str) -> Option<&SeatInfo> {
        self.seats.iter().find(|s| s.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seat_type_attr_mapping() {
        assert_eq!(SeatType::from_attr("wheelchair"), SeatType::Wheelchair);
        assert_eq!(
            SeatType::from_attr("wheelchair_side"),
            SeatType::WheelchairSide
        );
        assert_eq!(
            SeatType::from_attr("wheelchair_accompaniment"),
            SeatType::WheelchairAccompaniment
        );
        assert_eq!(SeatType::from_attr(""), SeatType::Normal);
        assert_eq!(SeatType::from_attr("vip"), SeatType::Normal);
    }

    #[test]
    fn wheelchair_space_excludes_companions() {
        assert!(SeatType::Wheelchair.is_wheelchair_space());
        assert!(SeatType::WheelchairSide.is_wheelchair_space());
        assert!(!SeatType::WheelchairAccompaniment.is_wheelchair_space());
        assert!(SeatType::WheelchairAccompaniment.is_wheelchair_category());
    }

    #[test]
    fn seat_group_deserializes_with_missing_fields() {
        let g: SeatGroup = serde_json::from_str(r#"{"id":"g1"}"#).unwrap();
        assert!(g.reserved_seats.is_empty());
        assert!(!g.reservation_active);
    }

    #[test]
    fn rotation_affine_keeps_pivot_fixed() {
        let rot = Rotation {
            angle_deg: 90.0,
            cx: 3.0,
            cy: 4.0,
        };
        let p = rot.to_affine() * Point::new(3.0, 4.0);
        assert!((p.x - 3.0).abs() < 1e-9);
        assert!((p.y - 4.0).abs() < 1e-9);
    }
}
