use crate::game::character::Character;
use crate::game::coins::{Coin, CoinRegistry};
use crate::game::config::GameConfig;
use crate::game::scene::SceneGraph;
use crate::game::trains::{bounds, Train};

/// Slack for standing exactly on a train roof.
const SURFACE_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrainContact {
    pub collision: bool,
    pub on_top_of_train: bool,
    /// Where the character's feet rest while riding.
    pub surface_y: Option<f32>,
}

/// Checks the character against the trains on its lane. Only the first train
/// (in spawn order) whose span contains the character is looked at.
pub fn resolve_train_contact(character: &Character, trains: &[Train], config: &GameConfig) -> TrainContact {
    let z = character.position.z;
    let hit = trains
        .iter()
        .filter(|train| !train.removed && train.lane == character.lane())
        .map(|train| bounds(train, config))
        .find(|b| b.contains_z(z));

    let Some(hit) = hit else {
        return TrainContact::default();
    };

    let (lower, upper) = character.vertical_extent(config);
    let surface = hit.top_y + config.train.riding_offset;
    if lower + SURFACE_EPSILON >= surface {
        TrainContact { collision: false, on_top_of_train: true, surface_y: Some(surface) }
    } else if upper >= hit.bottom_y && lower <= hit.top_y {
        TrainContact { collision: true, on_top_of_train: false, surface_y: None }
    } else {
        TrainContact::default()
    }
}

/// Whether `coin` is inside the character's pickup reach.
pub fn coin_in_reach(character: &Character, coin: &Coin, config: &GameConfig) -> bool {
    let dz = (coin.position.z - character.position.z).abs();
    if config.hitbox.is_none() {
        return dz < config.coins.collection_distance;
    }

    let coin_scale = config.coin_hitbox();
    let character_scale = config.character_hitbox();
    let coin_radius = config.coins.radius;
    let reach_z = coin_radius * coin_scale.radius + config.character.width / 2.0 * character_scale.radius;
    let reach_y = coin_radius * coin_scale.height + config.character.height / 2.0 * character_scale.height;
    let dy = (coin.position.y - character.position.y).abs();
    dz < reach_z && dy < reach_y
}

/// Collects every reachable coin on the character's lane, hiding it in the
/// scene. Returns the number collected by this call.
pub fn collect_coins<S: SceneGraph + ?Sized>(
    character: &Character,
    coins: &mut CoinRegistry,
    config: &GameConfig,
    scene: &mut S,
) -> u32 {
    let mut collected = 0;
    for coin in coins.lane_mut(character.lane()) {
        if coin.collected || !coin_in_reach(character, coin, config) {
            continue;
        }
        coin.collected = true;
        if let Some(render) = coin.render {
            scene.set_visible(render, false);
        }
        collected += 1;
    }
    collected
}
