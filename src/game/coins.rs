use nalgebra::Vector3;
use rand::Rng;

use crate::game::config::GameConfig;
use crate::game::lanes::LaneSet;
use crate::game::scene::{RenderId, Renderable, SceneGraph};
use crate::game::world::ChunkId;

#[derive(Debug, Clone, PartialEq)]
pub struct Coin {
    pub position: Vector3<f32>,
    pub lane: usize,
    pub chunk: ChunkId,
    /// Once set, never cleared.
    pub collected: bool,
    pub render: Option<RenderId>,
}

impl Coin {
    pub fn new(lane: usize, position: Vector3<f32>, chunk: ChunkId) -> Self {
        Coin { position, lane, chunk, collected: false, render: None }
    }

    pub fn is_visible(&self) -> bool {
        !self.collected
    }
}

/// Every live coin, bucketed by lane so a collection pass only walks the
/// character's lane.
#[derive(Debug, Clone, Default)]
pub struct CoinRegistry {
    lanes: Vec<Vec<Coin>>,
}

impl CoinRegistry {
    pub fn new(lane_count: usize) -> Self {
        CoinRegistry { lanes: vec![Vec::new(); lane_count] }
    }

    pub fn insert(&mut self, coin: Coin) {
        if coin.lane >= self.lanes.len() {
            self.lanes.resize_with(coin.lane + 1, Vec::new);
        }
        self.lanes[coin.lane].push(coin);
    }

    /// Scatters a batch of coins over every lane of the chunk starting at
    /// `chunk_start`. Returns how many were placed.
    pub fn spawn_batch<R, S>(
        &mut self,
        chunk: ChunkId,
        chunk_start: f32,
        lanes: &LaneSet,
        config: &GameConfig,
        rng: &mut R,
        scene: &mut S,
    ) -> usize
    where
        R: Rng + ?Sized,
        S: SceneGraph + ?Sized,
    {
        let settings = &config.coins;
        let near_z = chunk_start + settings.band_near;
        let far_z = chunk_start - (config.chunk.length - settings.band_far_margin);
        let y = config.tracks.y + settings.height;

        let mut spawned = 0;
        for (lane, &x) in lanes.xs().iter().enumerate() {
            let count = rng.gen_range(settings.min_per_track..=settings.max_per_track);
            for _ in 0..count {
                let z = rng.gen_range(far_z..near_z);
                let position = Vector3::new(x, y, z);
                let mut coin = Coin::new(lane, position, chunk);
                coin.render = Some(scene.insert(Renderable::Coin, position));
                self.insert(coin);
                spawned += 1;
            }
        }
        spawned
    }

    /// Drops every coin owned by `chunk`, handing back their renderables.
    pub fn remove_chunk(&mut self, chunk: ChunkId) -> Vec<RenderId> {
        let mut released = Vec::new();
        for lane in &mut self.lanes {
            lane.retain(|coin| {
                if coin.chunk == chunk {
                    released.extend(coin.render);
                    false
                } else {
                    true
                }
            });
        }
        released
    }

    pub fn clear(&mut self) -> Vec<RenderId> {
        let released = self.iter().filter_map(|coin| coin.render).collect();
        for lane in &mut self.lanes {
            lane.clear();
        }
        released
    }

    pub fn lane(&self, lane: usize) -> &[Coin] {
        self.lanes.get(lane).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn lane_mut(&mut self, lane: usize) -> &mut [Coin] {
        self.lanes.get_mut(lane).map(Vec::as_mut_slice).unwrap_or(&mut [])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Coin> {
        self.lanes.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.lanes.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
