//! Recovery of bare drawing calls that carry no marker.

use std::sync::LazyLock;

use panel_core::Widget;
use regex::Regex;

static DRAW_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*it\.(rectangle|filled_rectangle|circle|filled_circle|line)\s*\(([^;]*)\)\s*;")
        .expect("BUG: invalid DRAW_CALL regex literal")
});

static HEX6: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-f]{6}$").expect("BUG: invalid HEX6 regex literal"));

/// Map a color argument back to a color value.
fn color_arg(arg: Option<&str>) -> String {
    let Some(arg) = arg.map(str::trim) else {
        return "black".to_string();
    };
    match arg {
        "COLOR_OFF" => "white".to_string(),
        "COLOR_ON" => "black".to_string(),
        _ => match arg.strip_prefix("color_") {
            Some(name) if HEX6.is_match(name) => format!("#{name}"),
            Some(name) if !name.is_empty() => name.to_string(),
            _ => "black".to_string(),
        },
    }
}

/// Split the argument list into leading integers and an optional trailing
/// color. Returns `None` if any coordinate is not a plain integer.
fn split_args(args: &str, coords: usize) -> Option<(Vec<i32>, Option<&str>)> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() < coords || parts.len() > coords + 1 {
        return None;
    }
    let numbers = parts[..coords]
        .iter()
        .map(|p| p.parse::<i32>().ok())
        .collect::<Option<Vec<_>>>()?;
    Some((numbers, parts.get(coords).copied()))
}

fn shape(id: String, kind: &str, x: i32, y: i32, w: i32, h: i32) -> Widget {
    Widget::with_id(id, kind).with_geometry(x.into(), y.into(), w.into(), h.into())
}

/// Rebuild a widget from one unmarked drawing statement.
///
/// Calls whose geometry does not fit in pixel coordinates are ignored.
/// `ordinal` is the number of widgets already on the page and makes the
/// generated ID unique within it.
#[must_use]
pub fn recover(line: &str, ordinal: usize) -> Option<Widget> {
    let caps = DRAW_CALL.captures(line)?;
    let call = caps.get(1)?.as_str();
    let args = caps.get(2)?.as_str();

    let widget = match call {
        "rectangle" | "filled_rectangle" => {
            let (n, color) = split_args(args, 4)?;
            let filled = call == "filled_rectangle";
            let prefix = if filled { "w_frect" } else { "w_rect" };
            shape(format!("{prefix}_{ordinal}"), "shape_rect", n[0], n[1], n[2], n[3])
                .with_prop("fill", filled)
                .with_prop("color", color_arg(color))
        }
        "circle" | "filled_circle" => {
            let (n, color) = split_args(args, 3)?;
            let filled = call == "filled_circle";
            let prefix = if filled { "w_fcircle" } else { "w_circle" };
            let (cx, cy, r) = (n[0], n[1], n[2]);
            let diameter = r.checked_mul(2)?;
            let (x, y) = (cx.checked_sub(r)?, cy.checked_sub(r)?);
            shape(format!("{prefix}_{ordinal}"), "shape_circle", x, y, diameter, diameter)
                .with_prop("fill", filled)
                .with_prop("color", color_arg(color))
        }
        "line" => {
            let (n, color) = split_args(args, 4)?;
            let (dx, dy) = (n[2].checked_sub(n[0])?, n[3].checked_sub(n[1])?);
            let orientation = if dy.unsigned_abs() > dx.unsigned_abs() {
                "vertical"
            } else {
                "horizontal"
            };
            shape(format!("w_line_{ordinal}"), "line", n[0], n[1], dx, dy)
                .with_prop("stroke_width", 1)
                .with_prop("orientation", orientation)
                .with_prop("color", color_arg(color))
        }
        _ => return None,
    };
    Some(widget)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rectangle() {
        let widget = recover("        it.rectangle(10, 20, 30, 40, color_red);", 2).expect("rect");
        assert_eq!(widget.id, "w_rect_2");
        assert_eq!(widget.kind, "shape_rect");
        assert_eq!((widget.x, widget.y, widget.width, widget.height), (10.0, 20.0, 30.0, 40.0));
        assert_eq!(widget.props.get("fill"), Some(&json!(false)));
        assert_eq!(widget.props.get("color"), Some(&json!("red")));
    }

    #[test]
    fn test_filled_circle() {
        let widget = recover("it.filled_circle(50, 60, 10, COLOR_OFF);", 0).expect("circle");
        assert_eq!(widget.id, "w_fcircle_0");
        assert_eq!((widget.x, widget.y, widget.width, widget.height), (40.0, 50.0, 20.0, 20.0));
        assert_eq!(widget.props.get("fill"), Some(&json!(true)));
        assert_eq!(widget.props.get("color"), Some(&json!("white")));
    }

    #[test]
    fn test_line_orientation() {
        let widget = recover("it.line(5, 5, 5, 100, color_ff8800);", 1).expect("line");
        assert_eq!(widget.id, "w_line_1");
        assert_eq!(widget.props.get("orientation"), Some(&json!("vertical")));
        assert_eq!(widget.props.get("color"), Some(&json!("#ff8800")));
        assert_eq!(widget.height, 95.0);

        let widget = recover("it.line(0, 10, 200, 10);", 1).expect("line");
        assert_eq!(widget.props.get("orientation"), Some(&json!("horizontal")));
        assert_eq!(widget.props.get("color"), Some(&json!("black")));
    }

    #[test]
    fn test_expressions_are_not_recovered() {
        assert!(recover("it.circle(cx, cy, r - i, color_black);", 0).is_none());
        assert!(recover("it.print(0, 0, id(f), \"x\");", 0).is_none());
        assert!(recover("it.rectangle(1, 2, 3);", 0).is_none());
    }

    #[test]
    fn test_oversized_geometry_is_ignored() {
        assert!(recover("it.filled_circle(0, 0, 2000000000);", 0).is_none());
        assert!(recover("it.circle(-2147483648, 0, 1);", 0).is_none());
        assert!(recover("it.line(-2147483648, 0, 2147483647, 0);", 0).is_none());
        assert!(recover("it.line(0, 2147483647, 0, -2147483648);", 0).is_none());

        let widget = recover("it.circle(1000000000, 0, 1000000000);", 0).expect("fits");
        assert_eq!(widget.width, 2_000_000_000.0);
    }
}
