//! Shared numeric constants for the scene core.

// ── Items ───────────────────────────────────────────────────────

/// Width and height a freshly created item starts with.
pub const DEFAULT_ITEM_SIZE: u32 = 32;

// ── Frames ──────────────────────────────────────────────────────

/// Default output frame width in pixels.
pub const DEFAULT_FRAME_WIDTH: u32 = 640;

/// Default output frame height in pixels.
pub const DEFAULT_FRAME_HEIGHT: u32 = 480;

/// Default target frame rate.
pub const DEFAULT_FPS: u32 = 30;

/// Default background color (opaque black, `0xAARRGGBB`).
pub const DEFAULT_BACKGROUND_COLOR: u32 = 0xFF00_0000;

// ── Splash ──────────────────────────────────────────────────────

/// Number of steps in each half of the splash fade (in, then out).
pub const SPLASH_STEPS: u32 = 100;

/// Pause between splash fade steps, in milliseconds.
pub const SPLASH_STEP_MS: u64 = 10;
