use std::collections::HashMap;

use kurbo::Rect;

use crate::{
    error::{PlanviewError, PlanviewResult},
    geom::Rgba8,
    model::{
        LegendInfo, LegendShape, NEUTRAL_SEAT_COLOR, ParsedPlan, Rotation, SeatGroup, SeatInfo,
        SeatType,
    },
    path_bounds::{DEFAULT_BOUNDS, path_bounds},
};

/// Parses plan markup into seats and legends, in document order.
///
/// Seat shapes are `path`/`rect` elements carrying a `seat_number`
/// attribute; legend shapes carry `legend="true"` instead. Anything else
/// is ignored. The same inputs always produce the same output; the only
/// error is markup that is not well-formed XML.
#[tracing::instrument(skip(markup, groups), fields(markup_len = markup.len()))]
pub fn parse_plan(markup: &str, groups: &[SeatGroup]) -> PlanviewResult<ParsedPlan> {
    let doc = roxmltree::Document::parse(markup)
        .map_err(|e| PlanviewError::parse(format!("plan markup is not valid XML: {e}")))?;

    let group_by_seat = seat_group_lookup(groups);

    let mut plan = ParsedPlan::default();
    for node in doc.descendants().filter(roxmltree::Node::is_element) {
        let tag = node.tag_name().name();
        if tag != "path" && tag != "rect" {
            continue;
        }

        if node.attribute("legend") == Some("true") {
            plan.legends.push(parse_legend(node));
        } else if node.attribute("seat_number").is_some() {
            plan.seats.push(parse_seat(node, &group_by_seat));
        }
    }

    tracing::debug!(
        seats = plan.seats.len(),
        legends = plan.legends.len(),
        "parsed seat plan"
    );
    Ok(plan)
}

fn seat_group_lookup<'a>(groups: &'a [SeatGroup]) -> HashMap<&'a str, &'a SeatGroup> {
    let mut lookup = HashMap::new();
    for group in groups {
        for seat_number in group.seats.keys() {
            lookup.entry(seat_number.as_str()).or_insert(group);
        }
    }
    lookup
}

fn parse_seat(node: roxmltree::Node<'_, '_>, groups: &HashMap<&str, &SeatGroup>) -> SeatInfo {
    let seat_number = node.attribute("seat_number").unwrap_or_default().to_string();
    let seat_row = node.attribute("seat_row").unwrap_or_default().to_string();
    let seat_row_number = node
        .attribute("seat_row_number")
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0);
    let seat_type = SeatType::from_attr(node.attribute("type").unwrap_or_default());
    let linked_seat_number = node
        .attribute("linked_seat_number")
        .filter(|v| !v.is_empty())
        .map(str::to_string);

    let path_data = node.attribute("d").unwrap_or_default().to_string();
    let bounds = shape_bounds(node, &path_data);

    let group = groups.get(seat_number.as_str()).copied();
    if group.is_none() {
        tracing::debug!(seat = %seat_number, "seat matches no group, using neutral color");
    }
    let color = group
        .and_then(|g| Rgba8::from_hex(&g.color))
        .unwrap_or(NEUTRAL_SEAT_COLOR);

    SeatInfo {
        display_name: display_name(seat_type, &seat_row, &seat_number),
        id: seat_number,
        seat_type,
        seat_row,
        seat_row_number,
        linked_seat_number,
        center: bounds.center(),
        path_data,
        bounds,
        seat_group_id: group.map(|g| g.id.clone()),
        color,
    }
}

fn parse_legend(node: roxmltree::Node<'_, '_>) -> LegendInfo {
    let id = node.attribute("id").unwrap_or_default().to_string();
    let rotation = node.attribute("transform").and_then(parse_rotation);
    let fill = node.attribute("fill").and_then(Rgba8::from_hex);
    let stroke = node.attribute("stroke").and_then(Rgba8::from_hex);

    let (shape, bounds) = if node.tag_name().name() == "rect" {
        let rect = rect_attrs(node);
        (LegendShape::Rect { rect }, rect)
    } else {
        let data = node.attribute("d").unwrap_or_default().to_string();
        let bounds = checked_path_bounds(&data);
        (LegendShape::Path { data }, bounds)
    };

    LegendInfo {
        id,
        shape,
        rotation,
        fill,
        stroke,
        bounds,
    }
}

fn shape_bounds(node: roxmltree::Node<'_, '_>, path_data: &str) -> Rect {
    if node.tag_name().name() == "rect" {
        rect_attrs(node)
    } else {
        checked_path_bounds(path_data)
    }
}

fn checked_path_bounds(data: &str) -> Rect {
    let bounds = path_bounds(data);
    if bounds == DEFAULT_BOUNDS && !data.trim().is_empty() {
        tracing::warn!(path = data, "path data yielded no bounds, using default box");
    }
    bounds
}

fn rect_attrs(node: roxmltree::Node<'_, '_>) -> Rect {
    let get = |name: &str| {
        node.attribute(name)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .unwrap_or(0.0)
    };
    let x = get("x");
    let y = get("y");
    let w = get("width").max(0.0);
    let h = get("height").max(0.0);
    Rect::new(x, y, x + w, y + h)
}

fn display_name(seat_type: SeatType, row: &str, number: &str) -> String {
    match seat_type {
        SeatType::Normal => format!("Row {row}, Seat {number}"),
        SeatType::Wheelchair | SeatType::WheelchairSide => {
            format!("Wheelchair seat row {row}, seat {number}")
        }
        SeatType::WheelchairAccompaniment => format!("Wheelchair companion seat {number}"),
    }
}

/// Extracts `rotate(angle)` / `rotate(angle cx cy)` from a transform
/// attribute. Other transform kinds do not occur in plan exports.
fn parse_rotation(transform: &str) -> Option<Rotation> {
    let inner = transform
        .trim()
        .strip_prefix("rotate(")?
        .strip_suffix(')')?;
    let mut nums = inner
        .split([' ', ',', '\t'])
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<f64>().ok());
    let angle_deg = nums.next()??;
    let cx = nums.next().flatten().unwrap_or(0.0);
    let cy = nums.next().flatten().unwrap_or(0.0);
    Some(Rotation { angle_deg, cx, cy })
}
