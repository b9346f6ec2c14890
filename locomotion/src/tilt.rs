use crate::collision::{CollisionTest, CollisionTestRef};
use crate::state::Locomotion;
use crate::Error;

/// How ground tilt is sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TiltMode {
    /// No tilt calculation.
    #[default]
    None,
    /// One test cast down at the actor center; the hit normal supplies both
    /// tilt axes. Cheap, good enough for simple bipeds on simple ground.
    Single,
    /// Four tests in a box around the feet, weighted against each other.
    /// More expensive, works for any actor on complex ground.
    Weighted,
}

impl TiltMode {
    pub(crate) fn to_byte(self) -> u8 {
        match self {
            TiltMode::None => 0,
            TiltMode::Single => 1,
            TiltMode::Weighted => 2,
        }
    }

    pub(crate) fn from_byte(byte: u8) -> Result<Self, Error> {
        match byte {
            0 => Ok(TiltMode::None),
            1 => Ok(TiltMode::Single),
            2 => Ok(TiltMode::Weighted),
            _ => Err(Error::InvalidFormat(format!("unknown tilt mode {byte}"))),
        }
    }
}

/// The four ground probes of the weighted tilt mode, set as one unit so a
/// partially wired corner rig cannot exist.
#[derive(Debug, Clone)]
pub struct TiltCornerTests {
    pub front_left: CollisionTestRef,
    pub front_right: CollisionTestRef,
    pub back_left: CollisionTestRef,
    pub back_right: CollisionTestRef,
}

impl Locomotion {
    pub fn can_tilt(&self) -> bool {
        self.can_tilt
    }

    pub fn set_can_tilt(&mut self, can_tilt: bool) {
        self.can_tilt = can_tilt;
    }

    pub fn tilt_mode(&self) -> TiltMode {
        self.tilt_mode
    }

    pub fn set_tilt_mode(&mut self, mode: TiltMode) {
        self.tilt_mode = mode;
    }

    pub fn tilt_single_test(&self) -> Option<&CollisionTestRef> {
        self.tilt_single_test.as_ref()
    }

    pub fn set_tilt_single_test(&mut self, test: Option<CollisionTestRef>) {
        self.tilt_single_test = test;
    }

    pub fn tilt_corner_tests(&self) -> Option<&TiltCornerTests> {
        self.tilt_corner_tests.as_ref()
    }

    pub fn set_tilt_corner_tests(&mut self, tests: Option<TiltCornerTests>) {
        self.tilt_corner_tests = tests;
    }

    // --- tilt up/down ---

    pub fn limit_tilt_up(&self) -> f32 {
        self.limit_tilt_up
    }

    pub fn set_limit_tilt_up(&mut self, limit: f32) {
        self.limit_tilt_up = limit;
        self.set_tilt_vertical(self.tilt_vertical.value());
        self.set_tilt_vertical_goal(self.tilt_vertical.goal());
    }

    pub fn limit_tilt_down(&self) -> f32 {
        self.limit_tilt_down
    }

    pub fn set_limit_tilt_down(&mut self, limit: f32) {
        self.limit_tilt_down = limit;
        self.set_tilt_vertical(self.tilt_vertical.value());
        self.set_tilt_vertical_goal(self.tilt_vertical.goal());
    }

    pub fn tilt_vertical(&self) -> &crate::smooth::SmoothFloat {
        &self.tilt_vertical
    }

    pub fn set_tilt_vertical(&mut self, value: f32) {
        self.tilt_vertical
            .set_value(value.clamp(self.limit_tilt_down, self.limit_tilt_up));
    }

    pub fn set_tilt_vertical_goal(&mut self, goal: f32) {
        self.tilt_vertical
            .set_goal(goal.clamp(self.limit_tilt_down, self.limit_tilt_up));
    }

    pub fn set_adjust_time_tilt_vertical(&mut self, time: f32) {
        self.tilt_vertical.set_adjust_time(time);
    }

    pub fn set_adjust_range_tilt_vertical(&mut self, range: f32) {
        self.tilt_vertical.set_adjust_range(range);
    }

    // --- tilt left/right ---

    pub fn limit_tilt_left(&self) -> f32 {
        self.limit_tilt_left
    }

    pub fn set_limit_tilt_left(&mut self, limit: f32) {
        self.limit_tilt_left = limit;
        self.set_tilt_horizontal(self.tilt_horizontal.value());
        self.set_tilt_horizontal_goal(self.tilt_horizontal.goal());
    }

    pub fn limit_tilt_right(&self) -> f32 {
        self.limit_tilt_right
    }

    pub fn set_limit_tilt_right(&mut self, limit: f32) {
        self.limit_tilt_right = limit;
        self.set_tilt_horizontal(self.tilt_horizontal.value());
        self.set_tilt_horizontal_goal(self.tilt_horizontal.goal());
    }

    pub fn tilt_horizontal(&self) -> &crate::smooth::SmoothFloat {
        &self.tilt_horizontal
    }

    pub fn set_tilt_horizontal(&mut self, value: f32) {
        self.tilt_horizontal
            .set_value(value.clamp(self.limit_tilt_left, self.limit_tilt_right));
    }

    pub fn set_tilt_horizontal_goal(&mut self, goal: f32) {
        self.tilt_horizontal
            .set_goal(goal.clamp(self.limit_tilt_left, self.limit_tilt_right));
    }

    pub fn set_adjust_time_tilt_horizontal(&mut self, time: f32) {
        self.tilt_horizontal.set_adjust_time(time);
    }

    pub fn set_adjust_range_tilt_horizontal(&mut self, range: f32) {
        self.tilt_horizontal.set_adjust_range(range);
    }

    /// Vertical body displacement implied by the sampled ground, meters.
    pub fn tilt_offset(&self) -> f32 {
        self.tilt_offset
    }

    pub fn set_tilt_offset(&mut self, offset: f32) {
        self.tilt_offset = offset;
    }

    /// Sample the ground per the tilt mode, then advance both tilt
    /// smoothers. Missing probes or collider leave the goals untouched;
    /// tilt is strictly opt-in.
    pub fn update_tilt(&mut self, elapsed: f32) {
        if self.can_tilt {
            match self.tilt_mode {
                TiltMode::None => {
                    self.tilt_vertical.set_goal(0.0);
                    self.tilt_horizontal.set_goal(0.0);
                }
                TiltMode::Single => self.update_tilt_single_cast(),
                TiltMode::Weighted => self.update_tilt_weight_cast(),
            }
        } else {
            self.tilt_vertical.set_goal(0.0);
            self.tilt_horizontal.set_goal(0.0);
        }

        self.tilt_vertical.update(elapsed);
        self.tilt_horizontal.update(elapsed);
    }

    fn update_tilt_single_cast(&mut self) {
        let (Some(test), Some(collider)) =
            (self.tilt_single_test.clone(), self.ai_collider.clone())
        else {
            return;
        };

        let test = test.borrow();
        match test.hit_at(0) {
            Some(hit) => {
                // Hit normal in the actor frame; its lean off the local up
                // axis is the ground tilt.
                let normal = collider.borrow().orientation().conjugate() * hit.normal;
                let horizontal = normal.x.atan2(normal.y).to_degrees();
                let vertical = normal.z.atan2(normal.y).to_degrees();
                let offset = test.origin().y - hit.distance * test.direction().length();

                self.set_tilt_horizontal_goal(horizontal);
                self.set_tilt_vertical_goal(vertical);
                self.tilt_offset = offset;
            }
            None => {
                self.set_tilt_horizontal_goal(0.0);
                self.set_tilt_vertical_goal(0.0);
                self.tilt_offset = 0.0;
            }
        }
    }

    fn update_tilt_weight_cast(&mut self) {
        let Some(corners) = self.tilt_corner_tests.clone() else {
            return;
        };

        fn probe_height(test: &CollisionTest) -> f32 {
            let reach = test.direction().length();
            match test.hit_at(0) {
                Some(hit) => test.origin().y - hit.distance * reach,
                // No hit: assume ground at full probe reach.
                None => test.origin().y - reach,
            }
        }

        let front_left = corners.front_left.borrow();
        let front_right = corners.front_right.borrow();
        let back_left = corners.back_left.borrow();
        let back_right = corners.back_right.borrow();

        let height_front_left = probe_height(&front_left);
        let height_front_right = probe_height(&front_right);
        let height_back_left = probe_height(&back_left);
        let height_back_right = probe_height(&back_right);

        // Assumes front and back probe pairs share their lateral offsets,
        // which holds for box-shaped rigs.
        let spread_horizontal = (front_right.origin().x - front_left.origin().x).max(0.01);
        let spread_front_back = (front_left.origin().z - back_left.origin().z).max(0.01);

        let hdiff_horizontal = (height_front_left - height_front_right) * 0.5
            + (height_back_left - height_back_right) * 0.5;
        let horizontal = (hdiff_horizontal / spread_horizontal).atan().to_degrees();

        let hdiff_vertical = (height_front_left - height_back_left) * 0.5
            + (height_front_right - height_back_right) * 0.5;
        let vertical = (hdiff_vertical / spread_front_back).atan().to_degrees();

        let offset =
            (height_front_left + height_front_right + height_back_left + height_back_right) * 0.25;

        self.set_tilt_horizontal_goal(horizontal);
        self.set_tilt_vertical_goal(vertical);
        self.tilt_offset = offset;
    }
}
