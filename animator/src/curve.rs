use bevy_math::Vec2;

/// How segments between curve points are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CurveInterpolation {
    /// Each segment holds the value of its left point.
    Constant,
    /// Straight lines between points.
    Linear,
    /// Cubic Bezier segments using the point handles.
    #[default]
    Bezier,
}

/// A curve point with its two Bezier handles.
///
/// Handles are ignored for constant and linear interpolation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePoint {
    pub coord: Vec2,
    pub handle_before: Vec2,
    pub handle_after: Vec2,
}

impl CurvePoint {
    /// Point with both handles collapsed onto the coordinate.
    pub fn new(coord: Vec2) -> Self {
        Self {
            coord,
            handle_before: coord,
            handle_after: coord,
        }
    }

    pub fn with_handles(coord: Vec2, handle_before: Vec2, handle_after: Vec2) -> Self {
        Self {
            coord,
            handle_before,
            handle_after,
        }
    }
}

// Points closer than this along x replace each other instead of stacking.
const POINT_MERGE_THRESHOLD: f32 = 1e-5;

/// Ordered 2D curve used by animator rules to shape controller values.
#[derive(Debug, Clone, Default)]
pub struct Curve {
    points: Vec<CurvePoint>,
    interpolation: CurveInterpolation,
}

impl Curve {
    pub fn new() -> Self {
        Self::default()
    }

    /// The identity ramp: (0,0) to (1,1).
    pub fn default_curve(interpolation: CurveInterpolation) -> Self {
        let mut curve = Self {
            points: Vec::new(),
            interpolation,
        };
        curve.add_point(CurvePoint::new(Vec2::ZERO));
        curve.add_point(CurvePoint::new(Vec2::ONE));
        curve
    }

    pub fn interpolation(&self) -> CurveInterpolation {
        self.interpolation
    }

    pub fn set_interpolation(&mut self, interpolation: CurveInterpolation) {
        self.interpolation = interpolation;
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn point_at(&self, index: usize) -> Option<&CurvePoint> {
        self.points.get(index)
    }

    /// Insert a point keeping the list sorted by x. A point (nearly) on top
    /// of an existing one replaces it. Returns the index of the point.
    pub fn add_point(&mut self, point: CurvePoint) -> usize {
        let x = point.coord.x;
        for (i, existing) in self.points.iter().enumerate() {
            if (existing.coord.x - x).abs() < POINT_MERGE_THRESHOLD {
                self.points[i] = point;
                return i;
            }
            if existing.coord.x > x {
                self.points.insert(i, point);
                return i;
            }
        }
        self.points.push(point);
        self.points.len() - 1
    }

    pub fn remove_point(&mut self, index: usize) {
        if index < self.points.len() {
            self.points.remove(index);
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Index of the point whose x lies closest to `coordinate`, if any.
    pub fn index_of_point_closest_to(&self, coordinate: f32) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (i, point) in self.points.iter().enumerate() {
            let distance = (point.coord.x - coordinate).abs();
            match best {
                Some((_, d)) if d <= distance => {}
                _ => best = Some((i, distance)),
            }
        }
        best.map(|(i, _)| i)
    }

    /// Evaluate the curve at `x`. Outside the point range the boundary value
    /// holds; an empty curve evaluates to zero.
    pub fn evaluate(&self, x: f32) -> f32 {
        let points = &self.points;
        let (Some(first), Some(last)) = (points.first(), points.last()) else {
            return 0.0;
        };
        if x <= first.coord.x {
            return first.coord.y;
        }
        if x >= last.coord.x {
            return last.coord.y;
        }

        let Some(segment) = points.windows(2).position(|w| x < w[1].coord.x) else {
            return last.coord.y;
        };
        let left = &points[segment];
        let right = &points[segment + 1];

        match self.interpolation {
            CurveInterpolation::Constant => left.coord.y,
            CurveInterpolation::Linear => {
                let t = (x - left.coord.x) / (right.coord.x - left.coord.x);
                left.coord.y + (right.coord.y - left.coord.y) * t
            }
            CurveInterpolation::Bezier => evaluate_bezier_segment(left, right, x),
        }
    }
}

/// Evaluate one cubic segment at `x` by solving the (monotonic in x)
/// parameter with bisection. Handle x coordinates are confined to the
/// segment so the solve stays well defined for hand-authored handles.
fn evaluate_bezier_segment(left: &CurvePoint, right: &CurvePoint, x: f32) -> f32 {
    let p0 = left.coord;
    let p3 = right.coord;
    let p1 = Vec2::new(left.handle_after.x.clamp(p0.x, p3.x), left.handle_after.y);
    let p2 = Vec2::new(right.handle_before.x.clamp(p0.x, p3.x), right.handle_before.y);

    let mut lower = 0.0f32;
    let mut upper = 1.0f32;
    for _ in 0..32 {
        let mid = (lower + upper) * 0.5;
        if cubic(p0.x, p1.x, p2.x, p3.x, mid) < x {
            lower = mid;
        } else {
            upper = mid;
        }
    }
    let t = (lower + upper) * 0.5;
    cubic(p0.y, p1.y, p2.y, p3.y, t)
}

#[inline]
fn cubic(a: f32, b: f32, c: f32, d: f32, t: f32) -> f32 {
    let u = 1.0 - t;
    u * u * u * a + 3.0 * u * u * t * b + 3.0 * u * t * t * c + t * t * t * d
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(interpolation: CurveInterpolation) -> Curve {
        Curve::default_curve(interpolation)
    }

    #[test]
    fn add_point_keeps_points_sorted() {
        let mut curve = Curve::new();
        curve.add_point(CurvePoint::new(Vec2::new(1.0, 1.0)));
        curve.add_point(CurvePoint::new(Vec2::new(0.0, 0.0)));
        let middle = curve.add_point(CurvePoint::new(Vec2::new(0.5, 2.0)));
        assert_eq!(middle, 1);
        assert_eq!(curve.point_count(), 3);
        assert_eq!(curve.point_at(1).unwrap().coord, Vec2::new(0.5, 2.0));
    }

    #[test]
    fn coincident_point_replaces() {
        let mut curve = ramp(CurveInterpolation::Linear);
        curve.add_point(CurvePoint::new(Vec2::new(1.0, 5.0)));
        assert_eq!(curve.point_count(), 2);
        assert_eq!(curve.evaluate(1.0), 5.0);
    }

    #[test]
    fn closest_point_lookup() {
        let curve = ramp(CurveInterpolation::Linear);
        assert_eq!(curve.index_of_point_closest_to(0.2), Some(0));
        assert_eq!(curve.index_of_point_closest_to(0.9), Some(1));
        assert_eq!(Curve::new().index_of_point_closest_to(0.5), None);
    }

    #[test]
    fn constant_holds_left_value() {
        let mut curve = ramp(CurveInterpolation::Constant);
        curve.add_point(CurvePoint::new(Vec2::new(0.5, 3.0)));
        assert_eq!(curve.evaluate(0.25), 0.0);
        assert_eq!(curve.evaluate(0.75), 3.0);
    }

    #[test]
    fn linear_interpolates_and_clamps_ends() {
        let curve = ramp(CurveInterpolation::Linear);
        assert!((curve.evaluate(0.25) - 0.25).abs() < 1e-6);
        assert_eq!(curve.evaluate(-1.0), 0.0);
        assert_eq!(curve.evaluate(2.0), 1.0);
    }

    #[test]
    fn bezier_with_flat_handles_matches_endpoints() {
        // Handles on the coordinates degenerate to a smooth-step-like ramp
        // that still hits both endpoints exactly.
        let curve = ramp(CurveInterpolation::Bezier);
        assert_eq!(curve.evaluate(0.0), 0.0);
        assert_eq!(curve.evaluate(1.0), 1.0);
        let mid = curve.evaluate(0.5);
        assert!((mid - 0.5).abs() < 1e-3, "midpoint off: {mid}");
    }

    #[test]
    fn bezier_ease_handles_bend_the_curve() {
        let mut curve = Curve::new();
        curve.add_point(CurvePoint::with_handles(
            Vec2::ZERO,
            Vec2::ZERO,
            Vec2::new(0.5, 0.0),
        ));
        curve.add_point(CurvePoint::with_handles(
            Vec2::ONE,
            Vec2::new(0.5, 1.0),
            Vec2::ONE,
        ));
        // Ease-in-ease-out: below the diagonal early, above it late.
        assert!(curve.evaluate(0.25) < 0.25);
        assert!(curve.evaluate(0.75) > 0.75);
    }

    #[test]
    fn empty_curve_evaluates_to_zero() {
        assert_eq!(Curve::new().evaluate(0.5), 0.0);
    }
}
