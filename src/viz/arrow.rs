//! Curved call-out arrows in pixel space (y grows downwards).
//!
//! The connector is an `arc3` curve: a quadratic Bézier whose control point sits
//! off the midpoint of the chord, perpendicular to it, at `rad` times the chord
//! length. Positive `rad` bends the curve counter-clockwise as seen on screen.

pub type Px = (f64, f64);

/// Quadratic Bézier connector between two pixel positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arc3 {
    pub start: Px,
    pub control: Px,
    pub end: Px,
}

impl Arc3 {
    pub fn new(start: Px, end: Px, rad: f64) -> Self {
        let (x1, y1) = start;
        let (x2, y2) = end;
        let (mx, my) = ((x1 + x2) / 2.0, (y1 + y2) / 2.0);
        let (dx, dy) = (x2 - x1, y2 - y1);
        // Perpendicular offset computed with y pointing up, then flipped back.
        let control = (mx - rad * dy, my + rad * dx);
        Self {
            start,
            control,
            end,
        }
    }

    pub fn point_at(&self, t: f64) -> Px {
        let u = 1.0 - t;
        (
            u * u * self.start.0 + 2.0 * u * t * self.control.0 + t * t * self.end.0,
            u * u * self.start.1 + 2.0 * u * t * self.control.1 + t * t * self.end.1,
        )
    }

    /// Sample the curve into `segments + 1` points.
    pub fn polyline(&self, segments: usize) -> Vec<Px> {
        let n = segments.max(1);
        (0..=n).map(|i| self.point_at(i as f64 / n as f64)).collect()
    }
}

fn dist(a: Px, b: Px) -> f64 {
    ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt()
}

fn lerp(a: Px, b: Px, t: f64) -> Px {
    (a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t)
}

/// Shorten a polyline by `from_start` pixels at the head and `from_end` at the tail,
/// measured along the path. Returns an empty path when nothing is left.
pub fn trim_polyline(points: &[Px], from_start: f64, from_end: f64) -> Vec<Px> {
    let total: f64 = points.windows(2).map(|w| dist(w[0], w[1])).sum();
    if points.len() < 2 || from_start + from_end >= total {
        return Vec::new();
    }
    let (lo, hi) = (from_start.max(0.0), total - from_end.max(0.0));

    let mut out = Vec::new();
    let mut walked = 0.0;
    for w in points.windows(2) {
        let seg = dist(w[0], w[1]);
        let (s0, s1) = (walked, walked + seg);
        walked = s1;
        if seg == 0.0 || s1 < lo || s0 > hi {
            continue;
        }
        if out.is_empty() {
            out.push(lerp(w[0], w[1], ((lo - s0) / seg).clamp(0.0, 1.0)));
        }
        if s1 <= hi {
            out.push(w[1]);
        } else {
            out.push(lerp(w[0], w[1], ((hi - s0) / seg).clamp(0.0, 1.0)));
            break;
        }
    }
    out
}

/// Axis-aligned box in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PxBox {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl PxBox {
    pub fn contains(&self, p: Px) -> bool {
        p.0 >= self.left && p.0 <= self.right && p.1 >= self.top && p.1 <= self.bottom
    }

    pub fn center(&self) -> Px {
        ((self.left + self.right) / 2.0, (self.top + self.bottom) / 2.0)
    }

    pub fn grow(&self, by: f64) -> Self {
        Self {
            left: self.left - by,
            top: self.top - by,
            right: self.right + by,
            bottom: self.bottom + by,
        }
    }
}

/// Point where the ray from the box centre towards `target` leaves the box.
/// Returns the centre itself when `target` lies inside.
pub fn exit_point(bx: &PxBox, target: Px) -> Px {
    let c = bx.center();
    if bx.contains(target) {
        return c;
    }
    let (dx, dy) = (target.0 - c.0, target.1 - c.1);
    let half_w = (bx.right - bx.left) / 2.0;
    let half_h = (bx.bottom - bx.top) / 2.0;
    let tx = if dx != 0.0 { half_w / dx.abs() } else { f64::INFINITY };
    let ty = if dy != 0.0 { half_h / dy.abs() } else { f64::INFINITY };
    let t = tx.min(ty).min(1.0);
    (c.0 + dx * t, c.1 + dy * t)
}

/// Two barbs of an open (`->`) arrow head whose tip is the last point of `path`.
pub fn open_head(path: &[Px], length: f64, half_width: f64) -> Option<[Px; 3]> {
    let tip = *path.last()?;
    // Direction from a point a little way back along the path, for a stable tangent.
    let back = path
        .iter()
        .rev()
        .skip(1)
        .find(|p| dist(**p, tip) >= length.min(1.0))
        .copied()?;
    let d = dist(back, tip);
    if d == 0.0 {
        return None;
    }
    let (ux, uy) = ((tip.0 - back.0) / d, (tip.1 - back.1) / d);
    let base = (tip.0 - ux * length, tip.1 - uy * length);
    let (nx, ny) = (-uy, ux);
    Some([
        (base.0 + nx * half_width, base.1 + ny * half_width),
        tip,
        (base.0 - nx * half_width, base.1 - ny * half_width),
    ])
}

/// Round a path to integer pixels for plotters elements.
pub fn to_pixels(path: &[Px]) -> Vec<(i32, i32)> {
    path.iter()
        .map(|(x, y)| (x.round() as i32, y.round() as i32))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Px, b: Px) -> bool {
        dist(a, b) < 1e-9
    }

    #[test]
    fn straight_when_rad_is_zero() {
        let arc = Arc3::new((0.0, 0.0), (10.0, 0.0), 0.0);
        assert!(close(arc.control, (5.0, 0.0)));
        assert!(close(arc.point_at(0.5), (5.0, 0.0)));
    }

    #[test]
    fn control_point_offset_matches_rad() {
        // Rightwards chord on screen; positive rad bends it downwards on screen
        // (counter-clockwise when y points up).
        let arc = Arc3::new((0.0, 0.0), (100.0, 0.0), 0.2);
        assert!(close(arc.control, (50.0, 20.0)));
        let poly = arc.polyline(16);
        assert_eq!(poly.len(), 17);
        assert!(close(poly[0], (0.0, 0.0)));
        assert!(close(poly[16], (100.0, 0.0)));
    }

    #[test]
    fn trimming_shortens_both_ends() {
        let line = vec![(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)];
        let t = trim_polyline(&line, 2.0, 5.0);
        assert!(close(t[0], (2.0, 0.0)));
        assert!(close(*t.last().unwrap(), (15.0, 0.0)));
        assert!(trim_polyline(&line, 12.0, 9.0).is_empty());
    }

    #[test]
    fn exit_point_lies_on_box_edge() {
        let bx = PxBox {
            left: 0.0,
            top: 0.0,
            right: 20.0,
            bottom: 10.0,
        };
        assert!(close(exit_point(&bx, (110.0, 5.0)), (20.0, 5.0)));
        assert!(close(exit_point(&bx, (10.0, 105.0)), (10.0, 10.0)));
        assert!(close(exit_point(&bx, (12.0, 6.0)), (10.0, 5.0)));
    }

    #[test]
    fn head_points_along_path() {
        let head = open_head(&[(0.0, 0.0), (10.0, 0.0)], 4.0, 2.0).unwrap();
        assert!(close(head[1], (10.0, 0.0)));
        assert!(close(head[0], (6.0, 2.0)));
        assert!(close(head[2], (6.0, -2.0)));
    }
}
