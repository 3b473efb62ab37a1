use nalgebra::Vector3;
use rand::Rng;

use crate::game::config::GameConfig;
use crate::game::lanes::LaneSet;
use crate::game::scene::{RenderId, Renderable, SceneGraph};

/// A train on one lane. Only the front is stored; everything else about its
/// extent comes from the length fixed at spawn.
#[derive(Debug, Clone, PartialEq)]
pub struct Train {
    pub id: u32,
    pub lane: usize,
    pub front_z: f32,
    pub cars: u32,
    pub length: f32,
    pub speed: f32,
    pub removed: bool,
    pub render: Option<RenderId>,
}

impl Train {
    pub fn advance(&mut self, delta: f32) {
        self.front_z += self.speed * delta;
    }
}

/// Collision volume of a train, recomputed on every query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainBounds {
    pub front_z: f32,
    pub back_z: f32,
    pub lane: usize,
    pub top_y: f32,
    pub bottom_y: f32,
}

impl TrainBounds {
    pub fn contains_z(&self, z: f32) -> bool {
        z >= self.back_z && z <= self.front_z
    }
}

pub fn bounds(train: &Train, config: &GameConfig) -> TrainBounds {
    let scale = config.train_hitbox();
    let bottom_y = config.rail_top();
    let (front_z, back_z) = if scale.length == 1.0 {
        (train.front_z, train.front_z - train.length)
    } else {
        let middle = train.front_z - train.length / 2.0;
        let half_span = train.length * scale.length / 2.0;
        (middle + half_span, middle - half_span)
    };
    TrainBounds {
        front_z,
        back_z,
        lane: train.lane,
        top_y: bottom_y + config.train.height * scale.height,
        bottom_y,
    }
}

/// Spawns trains on a timer ahead of the player, moves them towards the
/// player and retires them once they are well behind.
#[derive(Debug, Default)]
pub struct TrainSpawner {
    trains: Vec<Train>,
    since_last_spawn: f32,
    next_id: u32,
}

impl TrainSpawner {
    pub fn new() -> Self {
        TrainSpawner::default()
    }

    pub fn trains(&self) -> &[Train] {
        &self.trains
    }

    pub fn since_last_spawn(&self) -> f32 {
        self.since_last_spawn
    }

    pub fn spawn<R, S>(
        &mut self,
        lane: usize,
        player_z: f32,
        lanes: &LaneSet,
        config: &GameConfig,
        rng: &mut R,
        scene: &mut S,
    ) -> &Train
    where
        R: Rng + ?Sized,
        S: SceneGraph + ?Sized,
    {
        let settings = &config.train;
        let cars = rng.gen_range(settings.min_cars..=settings.max_cars);
        let length = settings.length_for(cars);
        let front_z = player_z - settings.spawn_distance;
        let position = Vector3::new(lanes.x(lane), config.rail_top(), front_z);
        let render = scene.insert(Renderable::Train { cars, length }, position);

        let id = self.next_id;
        self.next_id += 1;
        log::debug!("train {} spawned on lane {} at z={} ({} cars)", id, lane, front_z, cars);

        self.trains.push(Train {
            id,
            lane,
            front_z,
            cars,
            length,
            speed: settings.speed,
            removed: false,
            render: Some(render),
        });
        &self.trains[self.trains.len() - 1]
    }

    pub fn tick<R, S>(
        &mut self,
        delta: f32,
        player_z: f32,
        lanes: &LaneSet,
        config: &GameConfig,
        rng: &mut R,
        scene: &mut S,
    ) -> &[Train]
    where
        R: Rng + ?Sized,
        S: SceneGraph + ?Sized,
    {
        self.since_last_spawn += delta;
        if self.since_last_spawn >= config.train.spawn_interval {
            if scene.train_model_ready() {
                let lane = rng.gen_range(0..lanes.len());
                self.spawn(lane, player_z, lanes, config, rng, scene);
                self.since_last_spawn = 0.0;
            } else {
                log::trace!("train model not loaded yet, deferring spawn");
            }
        }

        let retire_z = player_z + config.train.retire_margin;
        for train in &mut self.trains {
            train.advance(delta);
            if let Some(render) = train.render {
                scene.set_position(render, Vector3::new(lanes.x(train.lane), config.rail_top(), train.front_z));
            }
            if train.front_z > retire_z {
                log::debug!("train {} retired at z={}", train.id, train.front_z);
                if let Some(render) = train.render.take() {
                    scene.remove(render);
                }
                train.removed = true;
            }
        }
        self.trains.retain(|train| !train.removed);

        &self.trains
    }

    pub fn reset<S: SceneGraph + ?Sized>(&mut self, scene: &mut S) {
        for train in self.trains.drain(..) {
            if let Some(render) = train.render {
                scene.remove(render);
            }
        }
        self.since_last_spawn = 0.0;
    }
}
