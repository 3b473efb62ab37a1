use nalgebra::Vector3;
use rand::Rng;
use std::collections::VecDeque;

use crate::game::coins::CoinRegistry;
use crate::game::config::GameConfig;
use crate::game::lanes::LaneSet;
use crate::game::scene::{HouseLot, RenderId, Renderable, SceneGraph};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkId(pub u32);

/// One fixed-length slice of scenery. Spans `start_z` down to `end_z()`.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub id: ChunkId,
    pub start_z: f32,
    pub length: f32,
    pub renderables: Vec<RenderId>,
    pub coins: usize,
}

impl Chunk {
    pub fn end_z(&self) -> f32 {
        self.start_z - self.length
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamReport {
    pub generated: usize,
    pub removed: usize,
}

/// Owns the sliding window of chunks around the player. Chunks are laid out
/// back to back from z = 0 towards -z; `frontier` is the far edge of the
/// newest one.
#[derive(Debug, Default)]
pub struct ChunkStreamer {
    chunks: VecDeque<Chunk>,
    frontier: f32,
    next_id: u32,
}

impl ChunkStreamer {
    pub fn new() -> Self {
        ChunkStreamer::default()
    }

    pub fn frontier(&self) -> f32 {
        self.frontier
    }

    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.iter()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Tears the window down and lays the opening chunk at z = 0.
    pub fn reset<R, S>(
        &mut self,
        lanes: &LaneSet,
        config: &GameConfig,
        rng: &mut R,
        scene: &mut S,
        coins: &mut CoinRegistry,
    ) where
        R: Rng + ?Sized,
        S: SceneGraph + ?Sized,
    {
        while let Some(chunk) = self.chunks.pop_front() {
            release(chunk, scene, coins);
        }
        self.frontier = 0.0;
        self.next_id = 0;
        self.generate(lanes, config, rng, scene, coins);
    }

    /// Keeps at least `visible_chunks * length` of world ahead of `player_z`
    /// and drops chunks that fell more than the removal margin behind.
    pub fn ensure_streamed<R, S>(
        &mut self,
        player_z: f32,
        lanes: &LaneSet,
        config: &GameConfig,
        rng: &mut R,
        scene: &mut S,
        coins: &mut CoinRegistry,
    ) -> StreamReport
    where
        R: Rng + ?Sized,
        S: SceneGraph + ?Sized,
    {
        let mut report = StreamReport::default();

        let threshold = player_z - config.chunk.lookahead();
        while self.frontier > threshold {
            self.generate(lanes, config, rng, scene, coins);
            report.generated += 1;
        }

        let cutoff = player_z + config.chunk.removal_margin();
        while self.chunks.front().is_some_and(|chunk| chunk.start_z > cutoff) {
            if let Some(chunk) = self.chunks.pop_front() {
                log::debug!("dropping chunk {:?} at z={}", chunk.id, chunk.start_z);
                release(chunk, scene, coins);
                report.removed += 1;
            }
        }

        report
    }

    fn generate<R, S>(
        &mut self,
        lanes: &LaneSet,
        config: &GameConfig,
        rng: &mut R,
        scene: &mut S,
        coins: &mut CoinRegistry,
    ) where
        R: Rng + ?Sized,
        S: SceneGraph + ?Sized,
    {
        let id = ChunkId(self.next_id);
        self.next_id += 1;
        let start_z = self.frontier;
        let length = config.chunk.length;
        let origin = Vector3::new(0.0, 0.0, start_z);

        let mut renderables = vec![
            scene.insert(Renderable::Ground { length }, origin),
            scene.insert(Renderable::Road { length }, origin),
        ];
        for &x in lanes.xs() {
            renderables.push(scene.insert(Renderable::Track { length }, Vector3::new(x, 0.0, start_z)));
        }
        for side in [-1.0, 1.0] {
            for (lot, position) in house_row(side, start_z, config, rng) {
                renderables.push(scene.insert(Renderable::House(lot), position));
            }
        }

        // The opening chunk stays clear so the run does not start inside a
        // wall of coins.
        let coin_count = if id.0 == 0 {
            0
        } else {
            coins.spawn_batch(id, start_z, lanes, config, rng, scene)
        };

        log::debug!("generated chunk {:?} at z={} with {} coins", id, start_z, coin_count);

        self.chunks.push_back(Chunk { id, start_z, length, renderables, coins: coin_count });
        self.frontier = start_z - length;
    }
}

fn release<S: SceneGraph + ?Sized>(chunk: Chunk, scene: &mut S, coins: &mut CoinRegistry) {
    for id in chunk.renderables {
        scene.remove(id);
    }
    for id in coins.remove_chunk(chunk.id) {
        scene.remove(id);
    }
}

/// Houses along one side of the road, end to end from `start_z` until the
/// chunk length is covered.
pub fn house_row<R: Rng + ?Sized>(
    side: f32,
    start_z: f32,
    config: &GameConfig,
    rng: &mut R,
) -> Vec<(HouseLot, Vector3<f32>)> {
    let houses = &config.houses;
    let end_z = start_z - config.chunk.length;
    let mut row = Vec::new();
    let mut cursor = start_z;

    while cursor > end_z {
        let width = houses.width.sample(rng);
        let height = houses.height.sample(rng);
        let depth = houses.depth.sample(rng);
        let distance = houses.distance_from_road.sample(rng);
        let jitter = if houses.jitter > 0.0 { rng.gen_range(0.0..houses.jitter) } else { 0.0 };
        let color = if houses.colors.is_empty() { 0 } else { rng.gen_range(0..houses.colors.len()) };

        let x = side * (config.road.width / 2.0 + distance + width / 2.0);
        let z = cursor - depth / 2.0 - jitter;
        row.push((HouseLot { width, height, depth, color }, Vector3::new(x, height / 2.0, z)));
        cursor = z - depth / 2.0;
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::scene::DisplayList;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    struct Fixture {
        config: GameConfig,
        lanes: LaneSet,
        rng: SmallRng,
        scene: DisplayList,
        coins: CoinRegistry,
        streamer: ChunkStreamer,
    }

    impl Fixture {
        fn new() -> Self {
            let config = GameConfig::default();
            let lanes = LaneSet::from_config(&config.tracks);
            let coins = CoinRegistry::new(lanes.len());
            let mut fixture = Fixture {
                config,
                lanes,
                rng: SmallRng::seed_from_u64(42),
                scene: DisplayList::new(),
                coins,
                streamer: ChunkStreamer::new(),
            };
            fixture.streamer.reset(
                &fixture.lanes,
                &fixture.config,
                &mut fixture.rng,
                &mut fixture.scene,
                &mut fixture.coins,
            );
            fixture
        }

        fn stream(&mut self, player_z: f32) -> StreamReport {
            self.streamer.ensure_streamed(
                player_z,
                &self.lanes,
                &self.config,
                &mut self.rng,
                &mut self.scene,
                &mut self.coins,
            )
        }

        fn assert_contiguous(&self) {
            let chunks: Vec<&Chunk> = self.streamer.chunks().collect();
            for pair in chunks.windows(2) {
                assert_eq!(pair[0].end_z(), pair[1].start_z);
            }
            assert_eq!(chunks.last().unwrap().end_z(), self.streamer.frontier());
        }
    }

    #[test]
    fn test_reset_lays_coin_free_opening_chunk() {
        let fixture = Fixture::new();
        assert_eq!(fixture.streamer.len(), 1);
        assert_eq!(fixture.streamer.frontier(), -500.0);
        assert!(fixture.coins.is_empty());
        let chunk = fixture.streamer.chunks().next().unwrap();
        assert_eq!(chunk.coins, 0);
        assert_eq!(chunk.start_z, 0.0);
    }

    #[test]
    fn test_fills_lookahead() {
        let mut fixture = Fixture::new();
        let report = fixture.stream(0.0);
        assert_eq!(report.generated, 1);
        assert_eq!(fixture.streamer.frontier(), -1000.0);
        assert!(!fixture.coins.is_empty());
        fixture.assert_contiguous();

        let again = fixture.stream(0.0);
        assert_eq!(again, StreamReport::default());
    }

    #[test]
    fn test_coverage_holds_while_advancing() {
        let mut fixture = Fixture::new();
        let lookahead = fixture.config.chunk.lookahead();
        let mut player_z = 0.0;
        for step in 0..400 {
            player_z -= 7.0 + (step % 5) as f32 * 3.0;
            fixture.stream(player_z);
            assert!(player_z - fixture.streamer.frontier() >= lookahead);
            assert!(fixture.streamer.len() <= fixture.config.chunk.visible_chunks + 4);
            fixture.assert_contiguous();
        }
    }

    #[test]
    fn test_large_jump_still_covered() {
        let mut fixture = Fixture::new();
        let report = fixture.stream(-5000.0);
        assert!(report.generated >= 11);
        assert!(-5000.0 - fixture.streamer.frontier() >= fixture.config.chunk.lookahead());
        fixture.assert_contiguous();
    }

    #[test]
    fn test_drops_chunks_behind_with_their_coins() {
        let mut fixture = Fixture::new();
        fixture.stream(0.0);
        let first_coin_chunk = ChunkId(1);
        assert!(fixture.coins.iter().any(|c| c.chunk == first_coin_chunk));

        fixture.stream(-2000.0);
        let margin = fixture.config.chunk.removal_margin();
        for chunk in fixture.streamer.chunks() {
            assert!(chunk.start_z <= -2000.0 + margin);
        }
        assert!(fixture.streamer.chunks().all(|c| c.id != ChunkId(0)));

        fixture.stream(-2600.0);
        assert!(fixture.coins.iter().all(|c| c.chunk != first_coin_chunk));

        let live_coins = fixture.coins.len();
        assert_eq!(live_coins, fixture.scene.count_where(|r| matches!(r, Renderable::Coin)));
    }

    #[test]
    fn test_reset_releases_everything() {
        let mut fixture = Fixture::new();
        fixture.stream(-3000.0);
        fixture.streamer.reset(
            &fixture.lanes,
            &fixture.config,
            &mut fixture.rng,
            &mut fixture.scene,
            &mut fixture.coins,
        );
        assert_eq!(fixture.streamer.len(), 1);
        assert!(fixture.coins.is_empty());
        let expected = fixture.streamer.chunks().next().unwrap().renderables.len();
        assert_eq!(fixture.scene.len(), expected);
    }

    #[test]
    fn test_house_row_touches_and_covers() {
        let config = GameConfig::default();
        let mut rng = SmallRng::seed_from_u64(3);
        let row = house_row(1.0, 0.0, &config, &mut rng);
        assert!(!row.is_empty());

        let (last_lot, last_pos) = row.last().unwrap();
        assert!(last_pos.z - last_lot.depth / 2.0 <= -config.chunk.length);

        for (lot, position) in &row {
            assert!(position.x - lot.width / 2.0 >= config.road.width / 2.0);
            assert_eq!(position.y, lot.height / 2.0);
            assert!(lot.color < config.houses.colors.len());
        }
    }
}
