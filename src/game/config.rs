use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Every tunable of a session. Loaded once; all fields default, so a partial
/// JSON document overrides only what it names.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    pub tracks: TrackConfig,
    pub chunk: ChunkConfig,
    pub ground: SlabConfig,
    pub road: SlabConfig,
    pub character: CharacterConfig,
    pub train: TrainConfig,
    pub coins: CoinConfig,
    pub houses: HouseConfig,
    /// Collision-only scale factors. `None` keeps the plain distance checks.
    pub hitbox: Option<HitboxConfig>,
    /// Upper bound on a single frame's delta, in seconds.
    pub max_frame_delta: f32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct TrackConfig {
    pub count: usize,
    pub spacing: f32,
    pub y: f32,
    pub rail_height: f32,
    pub ballast_width: f32,
    pub ballast_color: String,
    pub rail_color: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ChunkConfig {
    pub length: f32,
    pub visible_chunks: usize,
    /// How far behind the player, in chunk lengths, a chunk start may fall
    /// before the chunk is dropped.
    pub removal_chunks: f32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SlabConfig {
    pub width: f32,
    pub y: f32,
    pub color: String,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum LaneChangeStyle {
    /// Straight lateral slide at constant height.
    Slide,
    /// Lateral slide plus a `sin(progress * pi)` hop.
    Jump,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CharacterConfig {
    pub width: f32,
    pub height: f32,
    pub ground_clearance: f32,
    pub color: String,
    pub speed: f32,
    pub max_speed: f32,
    pub acceleration: f32,
    pub lane_change_speed: f32,
    pub lane_change_style: LaneChangeStyle,
    pub jump_height: f32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct TrainConfig {
    pub width: f32,
    pub height: f32,
    pub locomotive_length: f32,
    pub car_length: f32,
    pub gap: f32,
    pub min_cars: u32,
    pub max_cars: u32,
    pub min_length: f32,
    pub speed: f32,
    pub spawn_interval: f32,
    pub spawn_distance: f32,
    pub retire_margin: f32,
    pub riding_offset: f32,
    pub locomotive_color: String,
    pub window_color: String,
    pub car_colors: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CoinConfig {
    pub radius: f32,
    pub thickness: f32,
    /// Height of the coin centre above the track surface.
    pub height: f32,
    pub color: String,
    pub min_per_track: u32,
    pub max_per_track: u32,
    pub collection_distance: f32,
    /// Band start, measured backwards (+z) from the chunk start.
    pub band_near: f32,
    /// Gap kept free at the far end of the chunk.
    pub band_far_margin: f32,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct SizeRange {
    pub min: f32,
    pub max: f32,
}

impl SizeRange {
    pub const fn new(min: f32, max: f32) -> Self {
        SizeRange { min, max }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.max > self.min {
            rng.gen_range(self.min..self.max)
        } else {
            self.min
        }
    }
}

impl Default for SizeRange {
    fn default() -> Self {
        SizeRange::new(1.0, 1.0)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct HouseConfig {
    pub width: SizeRange,
    pub height: SizeRange,
    pub depth: SizeRange,
    pub distance_from_road: SizeRange,
    /// Random backwards jitter between neighbouring houses.
    pub jitter: f32,
    pub colors: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct HitboxScale {
    pub radius: f32,
    pub height: f32,
    pub length: f32,
}

impl Default for HitboxScale {
    fn default() -> Self {
        HitboxScale { radius: 1.0, height: 1.0, length: 1.0 }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
#[serde(default)]
pub struct HitboxConfig {
    pub character: HitboxScale,
    pub train: HitboxScale,
    pub coin: HitboxScale,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            tracks: TrackConfig::default(),
            chunk: ChunkConfig::default(),
            ground: SlabConfig { width: 200.0, y: -0.1, color: "#4caf50".into() },
            road: SlabConfig { width: 12.0, y: 0.0, color: "#7f8c8d".into() },
            character: CharacterConfig::default(),
            train: TrainConfig::default(),
            coins: CoinConfig::default(),
            houses: HouseConfig::default(),
            hitbox: None,
            max_frame_delta: 0.1,
        }
    }
}

impl Default for TrackConfig {
    fn default() -> Self {
        TrackConfig {
            count: 3,
            spacing: 3.0,
            y: 0.1,
            rail_height: 0.15,
            ballast_width: 2.4,
            ballast_color: "#8d8478".into(),
            rail_color: "#b0b0b0".into(),
        }
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        ChunkConfig { length: 500.0, visible_chunks: 2, removal_chunks: 2.0 }
    }
}

impl Default for SlabConfig {
    fn default() -> Self {
        SlabConfig { width: 10.0, y: 0.0, color: "#808080".into() }
    }
}

impl Default for CharacterConfig {
    fn default() -> Self {
        CharacterConfig {
            width: 1.0,
            height: 2.0,
            ground_clearance: 0.2,
            color: "#e67e22".into(),
            speed: 15.0,
            max_speed: 40.0,
            acceleration: 0.0,
            lane_change_speed: 4.0,
            lane_change_style: LaneChangeStyle::Slide,
            jump_height: 4.5,
        }
    }
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            width: 2.4,
            height: 3.2,
            locomotive_length: 12.0,
            car_length: 10.0,
            gap: 1.0,
            min_cars: 2,
            max_cars: 6,
            min_length: 20.0,
            speed: 20.0,
            spawn_interval: 3.0,
            spawn_distance: 300.0,
            retire_margin: 100.0,
            riding_offset: 0.0,
            locomotive_color: "#c0392b".into(),
            window_color: "#aed6f1".into(),
            car_colors: vec!["#2980b9".into(), "#16a085".into()],
        }
    }
}

impl Default for CoinConfig {
    fn default() -> Self {
        CoinConfig {
            radius: 0.5,
            thickness: 0.1,
            height: 1.0,
            color: "#ffd700".into(),
            min_per_track: 2,
            max_per_track: 6,
            collection_distance: 1.0,
            band_near: 30.0,
            band_far_margin: 50.0,
        }
    }
}

impl Default for HouseConfig {
    fn default() -> Self {
        HouseConfig {
            width: SizeRange::new(6.0, 12.0),
            height: SizeRange::new(5.0, 18.0),
            depth: SizeRange::new(8.0, 16.0),
            distance_from_road: SizeRange::new(2.0, 6.0),
            jitter: 0.5,
            colors: vec![
                "#d35400".into(),
                "#f5cba7".into(),
                "#a9cce3".into(),
                "#e8daef".into(),
                "#f9e79f".into(),
            ],
        }
    }
}

impl ChunkConfig {
    /// Distance ahead of the player the world must always cover.
    pub fn lookahead(&self) -> f32 {
        self.length * self.visible_chunks as f32
    }

    pub fn removal_margin(&self) -> f32 {
        self.length * self.removal_chunks
    }
}

impl TrainConfig {
    /// Total train length for `cars` cars behind the locomotive.
    pub fn length_for(&self, cars: u32) -> f32 {
        let raw = self.locomotive_length + cars as f32 * (self.car_length + self.gap);
        raw.max(self.min_length)
    }
}

impl GameConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn character_hitbox(&self) -> HitboxScale {
        self.hitbox.map(|h| h.character).unwrap_or_default()
    }

    pub fn train_hitbox(&self) -> HitboxScale {
        self.hitbox.map(|h| h.train).unwrap_or_default()
    }

    pub fn coin_hitbox(&self) -> HitboxScale {
        self.hitbox.map(|h| h.coin).unwrap_or_default()
    }

    /// Height of the rail tops, where train bodies rest.
    pub fn rail_top(&self) -> f32 {
        self.tracks.y + self.tracks.rail_height
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn check(ok: bool, what: &str) -> Result<(), ConfigError> {
            if ok {
                Ok(())
            } else {
                Err(ConfigError::Invalid(what.to_string()))
            }
        }

        check(self.tracks.count >= 1, "tracks.count must be at least 1")?;
        check(self.tracks.spacing > 0.0, "tracks.spacing must be positive")?;

        check(self.chunk.length > 0.0, "chunk.length must be positive")?;
        check(self.chunk.visible_chunks >= 1, "chunk.visibleChunks must be at least 1")?;
        check(self.chunk.removal_chunks >= 1.0, "chunk.removalChunks must be at least 1")?;

        let c = &self.character;
        check(c.width > 0.0 && c.height > 0.0, "character dimensions must be positive")?;
        check(c.speed >= 0.0, "character.speed must not be negative")?;
        check(c.max_speed >= c.speed, "character.maxSpeed must be at least character.speed")?;
        check(c.lane_change_speed > 0.0, "character.laneChangeSpeed must be positive")?;

        let t = &self.train;
        check(t.min_cars <= t.max_cars, "train.minCars must not exceed train.maxCars")?;
        check(t.spawn_interval > 0.0, "train.spawnInterval must be positive")?;
        check(t.locomotive_length > 0.0 && t.height > 0.0, "train dimensions must be positive")?;
        check(t.car_length >= 0.0 && t.gap >= 0.0, "train car length and gap must not be negative")?;

        let k = &self.coins;
        check(k.min_per_track <= k.max_per_track, "coins.minPerTrack must not exceed coins.maxPerTrack")?;
        check(k.band_far_margin >= 0.0, "coins.bandFarMargin must not be negative")?;
        check(
            self.chunk.length - k.band_far_margin + k.band_near > 0.0,
            "coin spawn band is empty",
        )?;

        let h = &self.houses;
        for range in [h.width, h.height, h.depth, h.distance_from_road] {
            check(range.min <= range.max, "house size range has min above max")?;
        }
        check(h.depth.min > 0.0, "houses.depth.min must be positive")?;

        if let Some(hitbox) = self.hitbox {
            for scale in [hitbox.character, hitbox.train, hitbox.coin] {
                check(
                    scale.radius >= 0.0 && scale.height >= 0.0 && scale.length >= 0.0,
                    "hitbox scales must not be negative",
                )?;
            }
        }

        check(self.max_frame_delta > 0.0, "maxFrameDelta must be positive")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = GameConfig::from_json(r#"{ "tracks": { "count": 5 }, "train": { "speed": 30 } }"#).unwrap();
        assert_eq!(config.tracks.count, 5);
        assert_eq!(config.tracks.spacing, 3.0);
        assert_eq!(config.train.speed, 30.0);
        assert_eq!(config.train.spawn_distance, 300.0);
        assert!(config.hitbox.is_none());
    }

    #[test]
    fn test_hitbox_and_enums_parse() {
        let config = GameConfig::from_json(
            r#"{
                "character": { "laneChangeStyle": "jump" },
                "train": { "ridingOffset": 0.25 },
                "hitbox": { "train": { "height": 0.8 } }
            }"#,
        )
        .unwrap();
        assert_eq!(config.character.lane_change_style, LaneChangeStyle::Jump);
        assert_eq!(config.train.riding_offset, 0.25);
        assert_eq!(config.train_hitbox().height, 0.8);
        assert_eq!(config.train_hitbox().length, 1.0);
        assert_eq!(config.coin_hitbox(), HitboxScale::default());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = GameConfig::from_json(r#"{ "tracks": { "count": 0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = GameConfig::from_json(r#"{ "train": { "minCars": 5, "maxCars": 2 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = GameConfig::from_json(r#"{ "chunk": { "length": 10 } }"#).unwrap_err();
        assert!(err.to_string().contains("coin spawn band"));
    }

    #[test]
    fn test_malformed_json_is_a_parse_error() {
        let err = GameConfig::from_json("{ tracks: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_train_length_is_clamped() {
        let train = TrainConfig::default();
        assert_eq!(train.length_for(0), 20.0);
        assert_eq!(train.length_for(3), 12.0 + 3.0 * 11.0);
    }
}
