pub mod geometry;
pub mod mesh;

#[cfg(target_arch = "wasm32")]
pub mod renderer;
