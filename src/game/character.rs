use nalgebra::Vector3;

use crate::game::config::{GameConfig, LaneChangeStyle};
use crate::game::lanes::{LaneDirection, LaneSet};
use crate::game::scene::RenderId;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LaneMotion {
    Cruising,
    ChangingLane { previous: usize, progress: f32 },
}

/// The player. Runs towards -z; the lane index is always valid for the lane
/// set it was placed with.
#[derive(Debug, Clone)]
pub struct Character {
    lane: usize,
    motion: LaneMotion,
    pub position: Vector3<f32>,
    pub speed: f32,
    /// Height the character stands at outside of a jump arc.
    base_y: f32,
    /// Offset left over from a support change mid lane change. Shrinks to
    /// zero by the time the change lands.
    settle: f32,
    pub render: Option<RenderId>,
}

impl Character {
    pub fn new(lanes: &LaneSet, config: &GameConfig) -> Self {
        let mut character = Character {
            lane: 0,
            motion: LaneMotion::Cruising,
            position: Vector3::zeros(),
            speed: config.character.speed,
            base_y: ground_height(config),
            settle: 0.0,
            render: None,
        };
        character.place(lanes.middle(), 0.0, lanes, config);
        character
    }

    /// Puts the character on `lane` at `z`, standing on the ground with no
    /// lane change in flight.
    pub fn place(&mut self, lane: usize, z: f32, lanes: &LaneSet, config: &GameConfig) {
        debug_assert!(lane < lanes.len(), "lane {lane} out of range");
        self.lane = lane;
        self.motion = LaneMotion::Cruising;
        self.speed = config.character.speed;
        self.base_y = ground_height(config);
        self.settle = 0.0;
        self.position = Vector3::new(lanes.x(lane), self.base_y, z);
    }

    pub fn reset(&mut self, lanes: &LaneSet, config: &GameConfig) {
        self.place(lanes.middle(), 0.0, lanes, config);
    }

    pub fn lane(&self) -> usize {
        self.lane
    }

    pub fn previous_lane(&self) -> usize {
        match self.motion {
            LaneMotion::ChangingLane { previous, .. } => previous,
            LaneMotion::Cruising => self.lane,
        }
    }

    pub fn is_changing_lane(&self) -> bool {
        matches!(self.motion, LaneMotion::ChangingLane { .. })
    }

    pub fn lane_change_progress(&self) -> f32 {
        match self.motion {
            LaneMotion::ChangingLane { progress, .. } => progress,
            LaneMotion::Cruising => 0.0,
        }
    }

    /// Starts a lane change. Dropped while another change is in flight or
    /// when the target lane does not exist.
    pub fn switch_lane(&mut self, direction: LaneDirection, lanes: &LaneSet) -> bool {
        if self.is_changing_lane() {
            return false;
        }
        match lanes.step(self.lane, direction) {
            Some(target) => {
                self.motion = LaneMotion::ChangingLane { previous: self.lane, progress: 0.0 };
                self.lane = target;
                true
            }
            None => false,
        }
    }

    pub fn advance(&mut self, delta: f32, lanes: &LaneSet, config: &GameConfig) {
        let settings = &config.character;
        let mut arc = 0.0;

        if let LaneMotion::ChangingLane { previous, progress: last } = self.motion {
            let progress = last + delta * settings.lane_change_speed;
            if progress >= 1.0 {
                self.motion = LaneMotion::Cruising;
                self.position.x = lanes.x(self.lane);
                self.settle = 0.0;
            } else {
                let start_x = lanes.x(previous);
                let end_x = lanes.x(self.lane);
                self.position.x = start_x + (end_x - start_x) * progress;
                self.settle *= (1.0 - progress) / (1.0 - last);
                arc = self.settle;
                if settings.lane_change_style == LaneChangeStyle::Jump {
                    arc += (progress * std::f32::consts::PI).sin() * settings.jump_height;
                }
                self.motion = LaneMotion::ChangingLane { previous, progress };
            }
        }

        self.position.y = self.base_y + arc;

        self.speed = (self.speed + settings.acceleration * delta).min(settings.max_speed);
        self.position.z -= self.speed * delta;
    }

    /// Applies the collision verdict: `Some(surface)` stands the character's
    /// lower bound on that surface, `None` puts it back on the ground.
    ///
    /// Mid lane change the height does not jump: the difference is carried in
    /// `settle` and blended out over the rest of the change, so the character
    /// lands exactly on the new base.
    pub fn set_support(&mut self, surface: Option<f32>, config: &GameConfig) {
        let base_y = match surface {
            Some(surface) => surface + half_height(config),
            None => ground_height(config),
        };
        if self.is_changing_lane() {
            self.settle += self.base_y - base_y;
        } else {
            self.settle = 0.0;
            self.position.y = base_y;
        }
        self.base_y = base_y;
    }

    pub fn is_riding(&self, config: &GameConfig) -> bool {
        self.base_y > ground_height(config)
    }

    /// Lower and upper bound of the collision volume.
    pub fn vertical_extent(&self, config: &GameConfig) -> (f32, f32) {
        let half = half_height(config);
        (self.position.y - half, self.position.y + half)
    }
}

pub fn ground_height(config: &GameConfig) -> f32 {
    config.character.height / 2.0 + config.character.ground_clearance
}

fn half_height(config: &GameConfig) -> f32 {
    config.character.height / 2.0 * config.character_hitbox().height
}
