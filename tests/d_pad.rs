//! D-shape pad outlines across the parameter ranges.

use padstack_mcp::geometry::{Point, Segment, ARC_RES};
use padstack_mcp::pads::{DShapePad, DShapeProps};
use serde_json::json;

const TOL: f64 = 1e-4;

struct Bounds {
    min_x: f64,
    max_x: f64,
    max_abs_y: f64,
}

fn bounds(s: &Segment) -> Bounds {
    s.points().iter().fold(
        Bounds {
            min_x: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_abs_y: 0.0,
        },
        |b, p| Bounds {
            min_x: b.min_x.min(p.x),
            max_x: b.max_x.max(p.x),
            max_abs_y: b.max_abs_y.max(p.y.abs()),
        },
    )
}

/// Range endpoints included: term length 0.1 and 10, term width 0.1 and 10,
/// side reduction at its cap, shrink at its cap.
fn sweep() -> Vec<DShapePad> {
    let mut pads = Vec::new();
    for length in [0.1, 0.55, 10.0] {
        for width in [0.1, 0.24, 1.2, 2.0, 10.0] {
            for toe in [0.0, 0.05, 0.4, 2.0] {
                for heel in [0.0, 0.05] {
                    for side in [0.0, 0.02, 10.0] {
                        for (swell, shrink) in [(0.0, 0.0), (0.08, 0.03), (0.05, 0.02), (1.0, 0.5)] {
                            let mut pad = DShapePad::new();
                            pad.set_props(&json!({
                                "termLength": length,
                                "termWidth": width,
                                "padToe": toe,
                                "padHeel": heel,
                                "padSide": side,
                                "maskSwell": swell,
                                "pasteShrink": shrink,
                            }));
                            pads.push(pad);
                        }
                    }
                }
            }
        }
    }
    pads
}

fn cross(o: Point, a: Point, b: Point) -> f64 {
    (a.x - o.x).mul_add(b.y - o.y, -((a.y - o.y) * (b.x - o.x)))
}

/// No two non-adjacent edges of the closed outline properly cross.
fn is_simple(s: &Segment) -> bool {
    let pts = s.points();
    let n = pts.len();
    let edge = |i: usize| (pts[i], pts[(i + 1) % n]);
    let straddles = |d1: f64, d2: f64| (d1 > 1e-12 && d2 < -1e-12) || (d1 < -1e-12 && d2 > 1e-12);
    (0..n).all(|i| {
        (i + 2..n).all(|j| {
            if i == 0 && j == n - 1 {
                return true;
            }
            let ((a, b), (c, d)) = (edge(i), edge(j));
            !(straddles(cross(c, d, a), cross(c, d, b)) && straddles(cross(a, b, c), cross(a, b, d)))
        })
    })
}

fn distance_to_edge(q: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len2 = dx.mul_add(dx, dy * dy);
    let t = if len2 > 0.0 {
        ((q.x - a.x).mul_add(dx, (q.y - a.y) * dy) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (q.x - t.mul_add(dx, a.x)).hypot(q.y - t.mul_add(dy, a.y))
}

/// `q` lies inside `outline` or within `tol` of its boundary.
fn covers(outline: &Segment, q: Point, tol: f64) -> bool {
    let pts = outline.points();
    let n = pts.len();
    let mut inside = false;
    for i in 0..n {
        let (a, b) = (pts[i], pts[(i + 1) % n]);
        if distance_to_edge(q, a, b) <= tol {
            return true;
        }
        if (a.y > q.y) != (b.y > q.y) && q.x < (b.x - a.x) * (q.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
    }
    inside
}

#[test]
fn outlines_are_finite_and_non_empty() {
    for pad in sweep() {
        let o = pad.outlines();
        for s in [&o.pad, &o.solder_mask, &o.paste_mask] {
            assert!(s.len() >= 3, "{:?}", pad.props());
            assert!(s.is_finite(), "{:?}", pad.props());
        }
    }
}

#[test]
fn copper_fits_the_terminal_box() {
    for pad in sweep() {
        let p = pad.props();
        let b = bounds(&pad.pad());
        assert!(b.min_x >= -p.pad_toe - TOL, "{p:?}");
        assert!(b.max_x <= p.right_edge() + TOL, "{p:?}");
        assert!(b.max_abs_y <= p.half_width() + TOL, "{p:?}");
        // the arc may miss its rightmost point by less than one chord
        assert!(b.max_x > p.right_edge() - ARC_RES, "{p:?}");
    }
}

#[test]
fn mask_contains_copper_contains_paste() {
    for pad in sweep() {
        let o = pad.outlines();
        let (mask, copper, paste) = (bounds(&o.solder_mask), bounds(&o.pad), bounds(&o.paste_mask));
        assert!(mask.min_x <= copper.min_x + TOL && copper.min_x <= paste.min_x + TOL);
        assert!(mask.max_x + TOL >= copper.max_x && copper.max_x + TOL >= paste.max_x);
        assert!(mask.max_abs_y + TOL >= copper.max_abs_y);
        assert!(copper.max_abs_y + TOL >= paste.max_abs_y);

        assert!(o.solder_mask.area() + 1e-9 >= o.pad.area(), "{:?}", pad.props());
        assert!(o.pad.area() + 1e-9 >= o.paste_mask.area(), "{:?}", pad.props());
    }
}

#[test]
fn outlines_are_simple_polygons() {
    for pad in sweep() {
        let o = pad.outlines();
        for s in [&o.pad, &o.solder_mask, &o.paste_mask] {
            assert!(is_simple(s), "{:?}", pad.props());
        }
    }
}

#[test]
fn outlines_nest_point_by_point() {
    // chords of the smaller arcs may bulge past the larger polygon by a
    // fraction of the arc resolution
    let tol = ARC_RES / 2.0;
    for pad in sweep() {
        let o = pad.outlines();
        for q in o.pad.points() {
            assert!(covers(&o.solder_mask, *q, tol), "{:?} at {q:?}", pad.props());
        }
        for q in o.paste_mask.points() {
            assert!(covers(&o.pad, *q, tol), "{:?} at {q:?}", pad.props());
        }
    }
}

#[test]
fn short_wide_terminal_keeps_mask_pad_paste_order() {
    let mut pad = DShapePad::new();
    pad.set_props(&json!({
        "termLength": 0.1, "termWidth": 2.0, "padToe": 0, "padHeel": 0,
        "maskSwell": 0.05, "pasteShrink": 0.02,
    }));
    let o = pad.outlines();
    let (mask, copper, paste) = (o.solder_mask.area(), o.pad.area(), o.paste_mask.area());
    assert!(mask > copper && copper > paste && paste > 0.0, "{mask} {copper} {paste}");
    assert!(copper <= 0.1 * 2.0);
}

#[test]
fn outlines_are_symmetric_about_the_x_axis() {
    for pad in sweep() {
        let b = pad.pad();
        let pts = b.points();
        let top = pts.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
        let bottom = pts.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        assert!((top + bottom).abs() < TOL, "{:?}", pad.props());
        assert!((b.area() - b.mirror_v().area()).abs() < 1e-9);
    }
}

#[test]
fn longer_terminal_means_more_copper() {
    let mut pad = DShapePad::new();
    let mut last = 0.0;
    for length in [0.2, 0.4, 0.8, 1.6, 3.2] {
        pad.set_props(&json!({ "termLength": length }));
        let area = pad.pad().area();
        assert!(area > last);
        last = area;
    }
}

#[test]
fn partial_updates_keep_other_fields() {
    let mut pad = DShapePad::new();
    pad.set_props(&json!({"termWidth": 0.3, "padToe": 0.25}));
    let p = pad.set_props(&json!({"padHeel": 0.1}));
    assert!((p.term_width - 0.3).abs() < 1e-12);
    assert!((p.pad_toe - 0.25).abs() < 1e-12);
    assert!((p.pad_heel - 0.1).abs() < 1e-12);
    assert!((p.term_length - DShapeProps::default().term_length).abs() < 1e-12);
}

#[test]
fn numeric_strings_are_accepted() {
    let mut pad = DShapePad::new();
    let p = pad.set_props(&json!({"termLength": "0.8mm", "padToe": "x"}));
    assert!((p.term_length - 0.8).abs() < 1e-12);
    assert!((p.pad_toe - 0.4).abs() < 1e-12);
}

#[test]
fn shrinking_width_reclamps_side_and_shrink() {
    let mut pad = DShapePad::new();
    pad.set_props(&json!({"termWidth": 2.0, "padSide": 0.4, "pasteShrink": 0.4}));
    let p = pad.set_props(&json!({"termWidth": 0.2}));
    assert!(p.pad_side <= 0.05 + 1e-12);
    assert!(p.paste_shrink <= p.half_width() - 0.01 + 1e-12);
    assert!(pad.paste_mask().is_finite());
}
