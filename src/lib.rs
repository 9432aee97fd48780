//! Live scene and render core for a small 2D engine.
//!
//! The crate holds a mutable set of positioned, layered, textured items,
//! continuously composes them into raster frames at a target rate, and gates
//! certain mutations on axis-aligned collision checks against the rest of
//! the scene. Texture decoding lives outside: hosts implement
//! [`raster::RasterSource`] and the core only ever resizes and reads it.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`item`] | The [`item::Item`] record and overlap predicate |
//! | [`raster`] | Pixel buffers, blit/scale ops, the texture capability |
//! | [`collision`] | Collision kinds, events, and the pure detector |
//! | [`store`] | Authoritative scene mapping with guarded mutations |
//! | [`compose`] | Background + layered items + camera → one frame |
//! | [`renderer`] | The paced background render loop |
//! | [`consts`] | Shared defaults (item size, FPS, splash steps) |
//!
//! ## Typical wiring
//!
//! A host creates a [`renderer::Renderer`], registers a frame callback,
//! clones out the [`store::SceneHandle`], and starts the loop. Scene
//! mutations from any thread race safely against frame production: each
//! frame sees either all or none of any single mutation.

pub mod collision;
pub mod compose;
pub mod consts;
pub mod item;
pub mod raster;
pub mod renderer;
pub mod store;
