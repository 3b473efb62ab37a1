pub mod engine;
pub mod game;

#[cfg(target_arch = "wasm32")]
mod web;
