use kurbo::Rect;

/// Bounding box used when a path produced no finite coordinate at all.
pub const DEFAULT_BOUNDS: Rect = Rect::new(0.0, 0.0, 10.0, 10.0);

/// Computes an axis-aligned bounding box from SVG-style path data.
///
/// The box is an over-approximation for curves: every control point of a
/// `C` segment is folded in rather than solving for the true extrema.
/// Seat shapes are small and the box feeds hit-testing only, so the
/// overshoot is acceptable.
///
/// Malformed input never fails; if no finite bound can be derived the
/// result is [`DEFAULT_BOUNDS`]. The returned rect always satisfies
/// `x0 <= x1 && y0 <= y1`.
pub fn path_bounds(data: &str) -> Rect {
    let mut acc = BoundsAcc::new();

    for run in command_runs(data) {
        match run.cmd {
            'M' | 'L' => {
                for xy in run.args.chunks_exact(2) {
                    acc.add_x(xy[0]);
                    acc.add_y(xy[1]);
                }
            }
            'H' => {
                for &x in &run.args {
                    acc.add_x(x);
                }
            }
            'V' => {
                for &y in &run.args {
                    acc.add_y(y);
                }
            }
            'C' => {
                // Control points and endpoints alike widen the box.
                for xy in run.args.chunks_exact(2) {
                    acc.add_x(xy[0]);
                    acc.add_y(xy[1]);
                }
            }
            'Z' => {}
            _ => {
                for xy in run.args.chunks_exact(2) {
                    acc.add_x(xy[0]);
                    acc.add_y(xy[1]);
                }
            }
        }
    }

    acc.finish()
}

struct CommandRun {
    cmd: char,
    args: Vec<f64>,
}

/// Splits path data into per-command runs. Numbers may be separated by
/// commas or whitespace; a sign or a second `.` also starts a new number.
fn command_runs(data: &str) -> Vec<CommandRun> {
    let mut runs: Vec<CommandRun> = Vec::new();
    let mut num = String::new();

    fn flush(runs: &mut Vec<CommandRun>, num: &mut String) {
        if num.is_empty() {
            return;
        }
        if let Ok(v) = num.parse::<f64>()
            && v.is_finite()
            && let Some(run) = runs.last_mut()
        {
            run.args.push(v);
        }
        num.clear();
    }

    for ch in data.chars() {
        if ch == 'e' || ch == 'E' {
            // Exponent marker, not a command.
            num.push(ch);
        } else if ch.is_ascii_alphabetic() {
            flush(&mut runs, &mut num);
            runs.push(CommandRun {
                cmd: ch.to_ascii_uppercase(),
                args: Vec::new(),
            });
        } else if ch.is_ascii_digit() {
            num.push(ch);
        } else if ch == '.' {
            if num.contains('.') {
                flush(&mut runs, &mut num);
            }
            num.push(ch);
        } else if ch == '-' || ch == '+' {
            if num.ends_with('e') || num.ends_with('E') {
                num.push(ch);
            } else {
                flush(&mut runs, &mut num);
                num.push(ch);
            }
        } else {
            flush(&mut runs, &mut num);
        }
    }
    flush(&mut runs, &mut num);
    runs
}

struct BoundsAcc {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl BoundsAcc {
    fn new() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    fn add_x(&mut self, x: f64) {
        self.min_x = self.min_x.min(x);
        self.max_x = self.max_x.max(x);
    }

    fn add_y(&mut self, y: f64) {
        self.min_y = self.min_y.min(y);
        self.max_y = self.max_y.max(y);
    }

    fn finish(self) -> Rect {
        if self.min_x > self.max_x || self.min_y > self.max_y {
            return DEFAULT_BOUNDS;
        }
        Rect::new(self.min_x, self.min_y, self.max_x, self.max_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_rect_path() {
        let r = path_bounds("M10,10 L54,10 L54,54 L10,54 Z");
        assert_eq!(r, Rect::new(10.0, 10.0, 54.0, 54.0));
    }

    #[test]
    fn whitespace_and_comma_separators_agree() {
        assert_eq!(path_bounds("M 1 2 L 3 4"), path_bounds("M1,2L3,4"));
    }

    #[test]
    fn h_and_v_touch_one_axis_each() {
        let r = path_bounds("M5,5 H20 V-3");
        assert_eq!(r, Rect::new(5.0, -3.0, 20.0, 5.0));
    }

    #[test]
    fn cubic_folds_control_points() {
        // True curve extent stays inside the control hull; the box takes
        // the hull.
        let r = path_bounds("M0,0 C0,100 50,100 50,0");
        assert_eq!(r, Rect::new(0.0, 0.0, 50.0, 100.0));
    }

    #[test]
    fn unknown_commands_scan_pairs() {
        let r = path_bounds("Q 0 0 40 40");
        assert_eq!(r, Rect::new(0.0, 0.0, 40.0, 40.0));
    }

    #[test]
    fn degenerate_input_yields_default_rect() {
        assert_eq!(path_bounds(""), DEFAULT_BOUNDS);
        assert_eq!(path_bounds("Z"), DEFAULT_BOUNDS);
        assert_eq!(path_bounds("garbage with no digits"), DEFAULT_BOUNDS);
    }

    #[test]
    fn negative_numbers_split_without_separator() {
        let r = path_bounds("M10-20L-5-6");
        assert_eq!(r, Rect::new(-5.0, -20.0, 10.0, -6.0));
    }

    #[test]
    fn bounds_ordered_for_arbitrary_input() {
        for d in ["M3,9L1,2", "H9V9", "L0.5.5", "M1e3,1e-3", "M7,7"] {
            let r = path_bounds(d);
            assert!(r.x0 <= r.x1, "{d}: {r:?}");
            assert!(r.y0 <= r.y1, "{d}: {r:?}");
        }
    }
}
