use crate::game::config::TrackConfig;

/// A directional intent from the input layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneDirection {
    Left,
    Right,
}

impl LaneDirection {
    pub fn offset(self) -> isize {
        match self {
            LaneDirection::Left => -1,
            LaneDirection::Right => 1,
        }
    }
}

/// Lane-centre x coordinates, centred on 0.
#[derive(Debug, Clone, PartialEq)]
pub struct LaneSet {
    xs: Vec<f32>,
}

impl LaneSet {
    pub fn new(count: usize, spacing: f32) -> Self {
        let total_width = count.saturating_sub(1) as f32 * spacing;
        let start_x = -total_width / 2.0;
        let xs = (0..count).map(|i| start_x + i as f32 * spacing).collect();
        LaneSet { xs }
    }

    pub fn from_config(tracks: &TrackConfig) -> Self {
        LaneSet::new(tracks.count, tracks.spacing)
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    pub fn xs(&self) -> &[f32] {
        &self.xs
    }

    pub fn x(&self, lane: usize) -> f32 {
        debug_assert!(lane < self.xs.len(), "lane {lane} out of range");
        self.xs[lane]
    }

    pub fn middle(&self) -> usize {
        self.xs.len() / 2
    }

    /// The lane one step from `lane` in `direction`, if it exists.
    pub fn step(&self, lane: usize, direction: LaneDirection) -> Option<usize> {
        let target = lane as isize + direction.offset();
        (0..self.xs.len() as isize).contains(&target).then_some(target as usize)
    }
}
