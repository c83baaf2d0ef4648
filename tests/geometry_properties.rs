//! Algebraic properties of segment transforms.
//!
//! Every transform is checked on an arc piece, a polyline and the empty
//! segment, so order reversal and coordinate mapping are both exercised.

use std::f64::consts::{FRAC_PI_2, PI};

use padstack_mcp::geometry::{arc, divisions, Arc, Point, Segment, ARC_RES};

fn samples() -> Vec<Segment> {
    vec![
        Segment::default(),
        Segment::from_pairs(&[(0.3, -1.2)]),
        Segment::from_pairs(&[(0.0, 0.0), (2.0, 0.5), (1.5, -1.0), (-0.25, -0.75)]),
        Arc::sweep(Point::new(0.4, 0.2), 0.35, FRAC_PI_2, -FRAC_PI_2).tessellate(),
    ]
}

fn close(a: &Segment, b: &Segment, tol: f64) -> bool {
    a.len() == b.len()
        && a
            .points()
            .iter()
            .zip(b.points())
            .all(|(p, q)| (p.x - q.x).abs() <= tol && (p.y - q.y).abs() <= tol)
}

// =============================================================================
// Involutions
// =============================================================================

#[test]
fn transforms_are_involutions() {
    for s in samples() {
        assert_eq!(s.mirror_h().mirror_h(), s);
        assert_eq!(s.mirror_v().mirror_v(), s);
        assert_eq!(s.rotate_180().rotate_180(), s);
        assert_eq!(s.reflect_45().reflect_45(), s);
    }
}

#[test]
fn both_mirrors_equal_half_turn() {
    for s in samples() {
        assert_eq!(s.mirror_h().mirror_v(), s.rotate_180());
        assert_eq!(s.mirror_v().mirror_h(), s.rotate_180());
    }
}

#[test]
fn mirrors_reverse_point_order() {
    let s = Segment::from_pairs(&[(1.0, 2.0), (3.0, 4.0), (5.0, 6.0)]);
    assert_eq!(
        s.mirror_h(),
        Segment::from_pairs(&[(-5.0, 6.0), (-3.0, 4.0), (-1.0, 2.0)])
    );
    assert_eq!(
        s.mirror_v(),
        Segment::from_pairs(&[(5.0, -6.0), (3.0, -4.0), (1.0, -2.0)])
    );
    assert_eq!(
        s.reflect_45(),
        Segment::from_pairs(&[(6.0, 5.0), (4.0, 3.0), (2.0, 1.0)])
    );
    assert_eq!(
        s.rotate_180(),
        Segment::from_pairs(&[(-1.0, -2.0), (-3.0, -4.0), (-5.0, -6.0)])
    );
}

#[test]
fn translate_is_undone_by_its_inverse() {
    for s in samples() {
        let back = s.translate(1.25, -0.7).translate(-1.25, 0.7);
        assert!(close(&back, &s, 1e-12));
    }
}

// =============================================================================
// Area
// =============================================================================

#[test]
fn area_is_invariant_under_transforms() {
    for s in samples() {
        let a = s.area();
        for t in [
            s.mirror_h(),
            s.mirror_v(),
            s.rotate_180(),
            s.reflect_45(),
            s.translate(-3.0, 8.5),
        ] {
            assert!((t.area() - a).abs() < 1e-9, "{} vs {a}", t.area());
        }
    }
}

#[test]
fn tessellated_circle_approaches_pi_r_squared() {
    let r = 1.0;
    let circle = Arc::sweep(Point::default(), r, FRAC_PI_2, FRAC_PI_2 - 2.0 * PI)
        .open_end()
        .tessellate();
    let exact = PI * r * r;
    assert!(circle.area() < exact);
    assert!(exact - circle.area() < 1e-3);
}

#[test]
fn degenerate_areas_are_zero() {
    assert!(Segment::default().area().abs() < f64::EPSILON);
    assert!(Segment::from_pairs(&[(0.0, 0.0), (1.0, 1.0)]).area().abs() < f64::EPSILON);
}

// =============================================================================
// Arcs
// =============================================================================

#[test]
fn arc_points_lie_on_the_circle() {
    let center = Point::new(-0.3, 0.9);
    let r = 0.42;
    let s = Arc::sweep(center, r, 0.0, -PI).tessellate();
    for p in s.points() {
        let d = (p.x - center.x).hypot(p.y - center.y);
        assert!((d - r).abs() < 1e-4);
    }
    assert_eq!(s.len(), divisions(-PI, r) + 1);
}

#[test]
fn chord_length_stays_near_arc_resolution() {
    let s = Arc::sweep(Point::default(), 2.0, 0.0, FRAC_PI_2).tessellate();
    for pair in s.points().windows(2) {
        let chord = (pair[1].x - pair[0].x).hypot(pair[1].y - pair[0].y);
        assert!(chord >= ARC_RES - 1e-3 && chord < 2.0 * ARC_RES);
    }
}

#[test]
fn zero_radius_arc_is_finite() {
    assert_eq!(divisions(PI, 0.0), 1);
    let s = arc(Point::new(1.0, 1.0), 0.0, 0.0, PI, 2);
    assert!(s.is_finite());
    assert_eq!(s.first(), Some(Point::new(1.0, 1.0)));
}

#[test]
fn open_end_drops_the_last_point() {
    let full = Arc::sweep(Point::default(), 0.5, FRAC_PI_2, 0.0);
    let open = full.open_end();
    assert_eq!(open.tessellate().len() + 1, full.tessellate().len());
    assert_eq!(open.tessellate(), full.tessellate().skip_last(1));
}

// =============================================================================
// Wire form
// =============================================================================

#[test]
fn serialises_as_flat_coordinates() {
    let s = Segment::from_pairs(&[(1.0, -2.0), (0.5, 0.25)]);
    assert_eq!(serde_json::to_string(&s).unwrap(), "[1.0,-2.0,0.5,0.25]");
    let back: Segment = serde_json::from_str("[1.0,-2.0,0.5,0.25]").unwrap();
    assert_eq!(back, s);
    assert!(serde_json::from_str::<Segment>("[1.0, 2.0, 3.0]").is_err());
}
