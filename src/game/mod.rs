pub mod character;
pub mod clock;
pub mod coins;
pub mod collision;
pub mod config;
pub mod lanes;
pub mod scene;
pub mod trains;
pub mod world;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::game::character::Character;
use crate::game::coins::CoinRegistry;
use crate::game::config::{ConfigError, GameConfig};
use crate::game::lanes::{LaneDirection, LaneSet};
use crate::game::scene::{Renderable, SceneGraph};
use crate::game::trains::TrainSpawner;
use crate::game::world::ChunkStreamer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotPlaying,
    Playing,
    GameOver { final_score: u32 },
}

/// Notifications for the UI layer.
pub trait GameEvents {
    fn on_game_start(&mut self) {}
    fn on_score_changed(&mut self, _count: u32) {}
    fn on_game_over(&mut self, _final_score: u32) {}
}

impl GameEvents for () {}

/// One game instance: world window, trains, coins and the player.
pub struct Game<R: Rng = SmallRng> {
    config: GameConfig,
    lanes: LaneSet,
    rng: R,
    state: SessionState,
    character: Character,
    trains: TrainSpawner,
    coins: CoinRegistry,
    world: ChunkStreamer,
    coin_count: u32,
}

impl Game<SmallRng> {
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        Game::with_rng(config, SmallRng::from_entropy())
    }
}

impl<R: Rng> Game<R> {
    /// Builds a session. The config is validated up front so generation never
    /// sees empty ranges or zero-sized lots.
    pub fn with_rng(config: GameConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let lanes = LaneSet::from_config(&config.tracks);
        let character = Character::new(&lanes, &config);
        let coins = CoinRegistry::new(lanes.len());
        Ok(Game {
            config,
            lanes,
            rng,
            state: SessionState::NotPlaying,
            character,
            trains: TrainSpawner::new(),
            coins,
            world: ChunkStreamer::new(),
            coin_count: 0,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn lanes(&self) -> &LaneSet {
        &self.lanes
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == SessionState::Playing
    }

    pub fn coin_count(&self) -> u32 {
        self.coin_count
    }

    pub fn character(&self) -> &Character {
        &self.character
    }

    pub fn trains(&self) -> &TrainSpawner {
        &self.trains
    }

    pub fn coins(&self) -> &CoinRegistry {
        &self.coins
    }

    pub fn world(&self) -> &ChunkStreamer {
        &self.world
    }

    /// Starts a fresh run, from the menu or after a game over.
    pub fn start<S, U>(&mut self, scene: &mut S, ui: &mut U)
    where
        S: SceneGraph + ?Sized,
        U: GameEvents + ?Sized,
    {
        self.trains.reset(scene);
        for id in self.coins.clear() {
            scene.remove(id);
        }
        self.world.reset(&self.lanes, &self.config, &mut self.rng, scene, &mut self.coins);
        self.character.reset(&self.lanes, &self.config);
        self.world.ensure_streamed(
            self.character.position.z,
            &self.lanes,
            &self.config,
            &mut self.rng,
            scene,
            &mut self.coins,
        );

        match self.character.render {
            Some(id) => scene.set_position(id, self.character.position),
            None => self.character.render = Some(scene.insert(Renderable::Character, self.character.position)),
        }

        self.coin_count = 0;
        self.state = SessionState::Playing;
        log::info!("run started with {} lanes", self.lanes.len());
        ui.on_game_start();
        ui.on_score_changed(0);
    }

    /// Forwards a direction intent. Ignored outside of a run.
    pub fn switch_lane(&mut self, direction: LaneDirection) -> bool {
        if !self.is_playing() {
            return false;
        }
        self.character.switch_lane(direction, &self.lanes)
    }

    /// Advances the run by `delta` seconds: character, trains, collisions,
    /// then world streaming.
    pub fn tick<S, U>(&mut self, delta: f32, scene: &mut S, ui: &mut U)
    where
        S: SceneGraph + ?Sized,
        U: GameEvents + ?Sized,
    {
        if !self.is_playing() {
            return;
        }

        self.character.advance(delta, &self.lanes, &self.config);
        let player_z = self.character.position.z;

        let trains = self.trains.tick(delta, player_z, &self.lanes, &self.config, &mut self.rng, scene);

        let contact = collision::resolve_train_contact(&self.character, trains, &self.config);
        if contact.collision {
            self.sync_character(scene);
            self.state = SessionState::GameOver { final_score: self.coin_count };
            log::info!("run over at z={} with {} coins", player_z, self.coin_count);
            ui.on_game_over(self.coin_count);
            return;
        }
        self.character.set_support(contact.surface_y, &self.config);

        let collected = collision::collect_coins(&self.character, &mut self.coins, &self.config, scene);
        if collected > 0 {
            self.coin_count += collected;
            ui.on_score_changed(self.coin_count);
        }

        self.world.ensure_streamed(
            self.character.position.z,
            &self.lanes,
            &self.config,
            &mut self.rng,
            scene,
            &mut self.coins,
        );

        self.sync_character(scene);
    }

    fn sync_character<S: SceneGraph + ?Sized>(&self, scene: &mut S) {
        if let Some(id) = self.character.render {
            scene.set_position(id, self.character.position);
        }
    }
}
