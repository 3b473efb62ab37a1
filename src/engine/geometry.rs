use nalgebra::Vector3;

use crate::game::config::GameConfig;
use crate::game::scene::Renderable;

const FALLBACK_COLOR: [f32; 3] = [0.5, 0.5, 0.5];

/// One coloured box, relative to the position of the item it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawBox {
    pub center: Vector3<f32>,
    pub size: Vector3<f32>,
    pub color: [f32; 3],
}

impl DrawBox {
    fn new(center: Vector3<f32>, size: Vector3<f32>, color: [f32; 3]) -> Self {
        DrawBox { center, size, color }
    }
}

/// Parses `#rrggbb`. Anything else comes back grey.
pub fn parse_color(hex: &str) -> [f32; 3] {
    let digits = hex.trim_start_matches('#');
    if digits.len() != 6 {
        return FALLBACK_COLOR;
    }
    match u32::from_str_radix(digits, 16) {
        Ok(value) => [
            ((value >> 16) & 0xff) as f32 / 255.0,
            ((value >> 8) & 0xff) as f32 / 255.0,
            (value & 0xff) as f32 / 255.0,
        ],
        Err(_) => FALLBACK_COLOR,
    }
}

fn shade(color: [f32; 3], factor: f32) -> [f32; 3] {
    color.map(|c| (c * factor).min(1.0))
}

/// Builds the boxes that make up `renderable`.
pub fn build(renderable: &Renderable, config: &GameConfig) -> Vec<DrawBox> {
    match renderable {
        Renderable::Ground { length } => vec![slab(config.ground.width, config.ground.y, *length, &config.ground.color)],
        Renderable::Road { length } => vec![slab(config.road.width, config.road.y, *length, &config.road.color)],
        Renderable::Track { length } => track(*length, config),
        Renderable::House(lot) => {
            let color = config
                .houses
                .colors
                .get(lot.color)
                .map(|c| parse_color(c))
                .unwrap_or(FALLBACK_COLOR);
            vec![DrawBox::new(Vector3::zeros(), Vector3::new(lot.width, lot.height, lot.depth), color)]
        }
        Renderable::Coin => {
            let coins = &config.coins;
            let diameter = coins.radius * 2.0;
            vec![DrawBox::new(
                Vector3::zeros(),
                Vector3::new(diameter, diameter, coins.thickness),
                parse_color(&coins.color),
            )]
        }
        Renderable::Train { cars, .. } => train(*cars, config),
        Renderable::Character => {
            let c = &config.character;
            vec![DrawBox::new(Vector3::zeros(), Vector3::new(c.width, c.height, c.width), parse_color(&c.color))]
        }
    }
}

fn slab(width: f32, y: f32, length: f32, color: &str) -> DrawBox {
    DrawBox::new(Vector3::new(0.0, y, -length / 2.0), Vector3::new(width, 0.1, length), parse_color(color))
}

fn track(length: f32, config: &GameConfig) -> Vec<DrawBox> {
    let tracks = &config.tracks;
    let ballast_height = 0.1;
    let rail_y = tracks.y + ballast_height / 2.0 + tracks.rail_height / 2.0;
    let rail_offset = tracks.ballast_width * 0.3;
    let rail_color = parse_color(&tracks.rail_color);

    let mut boxes = vec![DrawBox::new(
        Vector3::new(0.0, tracks.y, -length / 2.0),
        Vector3::new(tracks.ballast_width, ballast_height, length),
        parse_color(&tracks.ballast_color),
    )];
    for x in [-rail_offset, rail_offset] {
        boxes.push(DrawBox::new(
            Vector3::new(x, rail_y, -length / 2.0),
            Vector3::new(0.1, tracks.rail_height, length),
            rail_color,
        ));
    }
    boxes
}

fn train(cars: u32, config: &GameConfig) -> Vec<DrawBox> {
    let t = &config.train;
    let body = parse_color(&t.locomotive_color);

    let mut boxes = vec![
        DrawBox::new(
            Vector3::new(0.0, t.height / 2.0, -t.locomotive_length / 2.0),
            Vector3::new(t.width, t.height, t.locomotive_length),
            body,
        ),
        DrawBox::new(
            Vector3::new(0.0, t.height * 1.15, -t.locomotive_length * 0.6),
            Vector3::new(t.width * 0.8, t.height * 0.3, t.locomotive_length * 0.6),
            shade(body, 0.8),
        ),
        DrawBox::new(
            Vector3::new(0.0, t.height * 0.6, -0.05),
            Vector3::new(t.width * 0.7, t.height * 0.4, 0.1),
            parse_color(&t.window_color),
        ),
    ];

    for i in 0..cars {
        let start = t.locomotive_length + t.gap + i as f32 * (t.car_length + t.gap);
        let color = match t.car_colors.len() {
            0 => body,
            n => parse_color(&t.car_colors[i as usize % n]),
        };
        boxes.push(DrawBox::new(
            Vector3::new(0.0, t.height * 0.45, -(start + t.car_length / 2.0)),
            Vector3::new(t.width * 0.95, t.height * 0.9, t.car_length),
            color,
        ));
    }
    boxes
}
