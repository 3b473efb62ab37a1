use rand::rngs::mock::StepRng;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use subsurf::game::character::ground_height;
use subsurf::game::config::{GameConfig, LaneChangeStyle};
use subsurf::game::lanes::LaneDirection;
use subsurf::game::scene::{DisplayList, Renderable};
use subsurf::game::trains::bounds;
use subsurf::game::world::ChunkId;
use subsurf::game::{Game, GameEvents, SessionState};

const FRAME: f32 = 1.0 / 60.0;

#[derive(Default)]
struct Recorder {
    starts: u32,
    scores: Vec<u32>,
    game_overs: Vec<u32>,
}

impl GameEvents for Recorder {
    fn on_game_start(&mut self) {
        self.starts += 1;
    }

    fn on_score_changed(&mut self, count: u32) {
        self.scores.push(count);
    }

    fn on_game_over(&mut self, final_score: u32) {
        self.game_overs.push(final_score);
    }
}

fn single_track() -> GameConfig {
    let mut config = GameConfig::default();
    config.tracks.count = 1;
    config
}

fn no_trains(mut config: GameConfig) -> GameConfig {
    config.train.spawn_interval = 1.0e9;
    config
}

fn run_until<F>(game: &mut Game, scene: &mut DisplayList, ui: &mut Recorder, max_ticks: usize, done: F) -> usize
where
    F: Fn(&Game) -> bool,
{
    for tick in 0..max_ticks {
        if done(game) {
            return tick;
        }
        game.tick(FRAME, scene, ui);
    }
    max_ticks
}

#[test]
fn train_on_the_only_track_ends_the_run_and_restart_recovers() {
    let mut config = single_track();
    config.train.spawn_interval = 0.5;
    let mut game = Game::with_rng(config, SmallRng::seed_from_u64(1)).unwrap();
    let mut scene = DisplayList::new();
    let mut ui = Recorder::default();

    game.start(&mut scene, &mut ui);
    run_until(&mut game, &mut scene, &mut ui, 60 * 30, |g| !g.is_playing());

    let final_score = match game.state() {
        SessionState::GameOver { final_score } => final_score,
        other => panic!("expected game over, got {:?}", other),
    };
    assert_eq!(ui.game_overs, vec![final_score]);
    assert_eq!(final_score, game.coin_count());

    // Frozen after the collision.
    let z = game.character().position.z;
    game.tick(1.0, &mut scene, &mut ui);
    assert_eq!(game.character().position.z, z);
    assert!(!game.switch_lane(LaneDirection::Left));

    game.start(&mut scene, &mut ui);
    assert!(game.is_playing());
    assert_eq!(ui.starts, 2);
    assert_eq!(game.coin_count(), 0);
    assert_eq!(game.character().position.z, 0.0);
    assert!(game.trains().trains().is_empty());
    assert_eq!(scene.count_where(|r| matches!(r, Renderable::Train { .. })), 0);
    assert_eq!(scene.count_where(|r| matches!(r, Renderable::Character)), 1);
    assert_eq!(game.world().chunks().next().map(|c| c.id), Some(ChunkId(0)));
}

#[test]
fn running_through_a_chunk_collects_its_coins() {
    let mut game = Game::with_rng(no_trains(single_track()), SmallRng::seed_from_u64(2)).unwrap();
    let mut scene = DisplayList::new();
    let mut ui = Recorder::default();
    game.start(&mut scene, &mut ui);

    let chunk_length = game.config().chunk.length;
    run_until(&mut game, &mut scene, &mut ui, 60 * 120, |g| {
        g.character().position.z < -2.0 * chunk_length - 100.0
    });
    assert!(game.is_playing());

    let first_batch: Vec<_> = game.coins().iter().filter(|c| c.chunk == ChunkId(1)).collect();
    assert!(first_batch.len() >= game.config().coins.min_per_track as usize);
    for coin in &first_batch {
        assert!(coin.collected);
        let render = coin.render.expect("coin is placed in the scene");
        assert!(!scene.get(render).expect("coin renderable").visible);
    }

    assert!(game.coin_count() as usize >= first_batch.len());
    assert_eq!(ui.scores.first(), Some(&0));
    assert!(ui.scores.windows(2).all(|w| w[1] > w[0]));
    assert_eq!(ui.scores.last(), Some(&game.coin_count()));
}

#[test]
fn world_window_stays_bounded_on_a_long_run() {
    let mut game = Game::with_rng(no_trains(GameConfig::default()), SmallRng::seed_from_u64(3)).unwrap();
    let mut scene = DisplayList::new();
    game.start(&mut scene, &mut ());

    let lookahead = game.config().chunk.lookahead();
    for _ in 0..60 * 300 {
        game.tick(FRAME, &mut scene, &mut ());
        let z = game.character().position.z;
        assert!(z - game.world().frontier() >= lookahead);
        assert!(game.world().len() <= 6);
    }

    let ids: Vec<u32> = game.world().chunks().map(|c| c.id.0).collect();
    assert!(ids.windows(2).all(|w| w[1] == w[0] + 1));
    assert!(ids[0] > 0);

    // Only live chunks keep renderables around.
    let coins_in_scene = scene.count_where(|r| matches!(r, Renderable::Coin));
    assert_eq!(coins_in_scene, game.coins().len());
}

#[test]
fn trains_wait_for_the_model_to_load() {
    let mut config = GameConfig::default();
    config.train.spawn_interval = 0.5;
    let mut game = Game::with_rng(config, SmallRng::seed_from_u64(4)).unwrap();
    let mut scene = DisplayList::pending_assets();
    game.start(&mut scene, &mut ());

    for _ in 0..120 {
        game.tick(FRAME, &mut scene, &mut ());
    }
    assert!(game.trains().trains().is_empty());

    scene.mark_train_model_ready();
    game.tick(FRAME, &mut scene, &mut ());
    assert_eq!(game.trains().trains().len(), 1);
    assert_eq!(scene.count_where(|r| matches!(r, Renderable::Train { .. })), 1);
}

#[test]
fn lane_changes_only_during_a_run() {
    let mut game = Game::with_rng(no_trains(GameConfig::default()), SmallRng::seed_from_u64(5)).unwrap();
    let mut scene = DisplayList::new();

    assert!(!game.switch_lane(LaneDirection::Right));
    game.start(&mut scene, &mut ());
    let middle = game.lanes().middle();
    assert_eq!(game.character().lane(), middle);

    assert!(game.switch_lane(LaneDirection::Right));
    // A second request mid-change is dropped.
    assert!(!game.switch_lane(LaneDirection::Right));
    for _ in 0..30 {
        game.tick(FRAME, &mut scene, &mut ());
    }
    assert_eq!(game.character().lane(), middle + 1);
    assert_eq!(game.character().position.x, game.lanes().x(middle + 1));
    assert!(!game.character().is_changing_lane());
}

#[test]
fn same_seed_builds_the_same_world() {
    let build = || {
        let mut game = Game::with_rng(no_trains(GameConfig::default()), SmallRng::seed_from_u64(42)).unwrap();
        let mut scene = DisplayList::new();
        game.start(&mut scene, &mut ());
        game.coins().iter().map(|c| (c.lane, c.position)).collect::<Vec<_>>()
    };
    let first = build();
    assert!(!first.is_empty());
    assert_eq!(first, build());
}

#[test]
fn jump_onto_a_train_ride_it_and_jump_back_down() {
    let mut config = GameConfig::default();
    config.tracks.count = 2;
    config.character.lane_change_style = LaneChangeStyle::Jump;
    config.train.spawn_interval = 5.0;
    config.train.min_cars = 6;
    config.train.max_cars = 6;
    // A zero stream puts every train on lane 0; the player starts on lane 1.
    let mut game = Game::with_rng(config, StepRng::new(0, 0)).unwrap();
    let mut scene = DisplayList::new();
    game.start(&mut scene, &mut ());
    assert_eq!(game.character().lane(), 1);

    let mut last_y = game.character().position.y;
    let mut step = |game: &mut Game<StepRng>, scene: &mut DisplayList| {
        game.tick(FRAME, scene, &mut ());
        assert!(game.is_playing(), "run ended at z={}", game.character().position.z);
        let y = game.character().position.y;
        assert!((y - last_y).abs() < 1.5, "height jumped from {last_y} to {y}");
        last_y = y;
    };

    // Take off shortly before the locomotive reaches the player.
    let mut ticks = 0;
    loop {
        let gap = game
            .trains()
            .trains()
            .first()
            .map(|train| game.character().position.z - train.front_z);
        if matches!(gap, Some(gap) if gap > 0.0 && gap <= 4.5) {
            break;
        }
        step(&mut game, &mut scene);
        ticks += 1;
        assert!(ticks < 60 * 30, "no train came");
    }
    assert!(game.switch_lane(LaneDirection::Left));
    while game.character().is_changing_lane() {
        step(&mut game, &mut scene);
    }

    let roof = bounds(&game.trains().trains()[0], game.config()).top_y;
    assert_eq!(game.character().lane(), 0);
    assert!(game.character().is_riding(game.config()));
    let (lower, _) = game.character().vertical_extent(game.config());
    assert!((lower - roof).abs() < 1e-4);

    for _ in 0..30 {
        step(&mut game, &mut scene);
        assert!(game.character().is_riding(game.config()));
    }

    assert!(game.switch_lane(LaneDirection::Right));
    while game.character().is_changing_lane() {
        step(&mut game, &mut scene);
    }
    step(&mut game, &mut scene);

    assert_eq!(game.character().lane(), 1);
    assert!(!game.character().is_riding(game.config()));
    assert_eq!(game.character().position.y, ground_height(game.config()));
}
