//! The render scheduler: a paced background loop producing frames.
//!
//! DESIGN
//! ======
//! [`Renderer`] owns the scene handle and the render configuration; nothing
//! here is process-global. `start` spawns one tokio task that (optionally)
//! plays the splash fade and then loops forever: snapshot → compose →
//! deliver → pace. The loop checks a shared running flag each iteration, so
//! `stop` terminates it promptly and tests never leak a background task.
//!
//! Pacing is elapsed-based, not interval-based: each iteration sleeps
//! `floor(1000 / fps) - elapsed` milliseconds when positive and otherwise
//! proceeds immediately. A loop that falls behind free-runs; it never skips
//! frames to catch up. The frame callback runs inline on the loop task, so
//! callback duration directly delays the next frame.

#[cfg(test)]
#[path = "renderer_test.rs"]
mod renderer_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::compose::{self, Camera};
use crate::consts::{
    DEFAULT_BACKGROUND_COLOR, DEFAULT_FPS, DEFAULT_FRAME_HEIGHT, DEFAULT_FRAME_WIDTH,
    SPLASH_STEPS, SPLASH_STEP_MS,
};
use crate::raster::{Raster, RasterSource, SolidSource};
use crate::store::{lock, SceneHandle};

/// The single registered frame consumer.
pub type FrameCallback = Box<dyn FnMut(Raster) + Send>;

/// Render configuration, read fresh each loop iteration (last write wins).
struct RenderConfig {
    fps: u32,
    width: u32,
    height: u32,
    background: Box<dyn RasterSource>,
    camera: Camera,
    splash: bool,
    splash_logo: Option<Box<dyn RasterSource>>,
}

impl RenderConfig {
    fn new() -> Self {
        Self {
            fps: DEFAULT_FPS,
            width: DEFAULT_FRAME_WIDTH,
            height: DEFAULT_FRAME_HEIGHT,
            background: Box::new(SolidSource::new(DEFAULT_BACKGROUND_COLOR)),
            camera: Camera::full(),
            splash: false,
            splash_logo: None,
        }
    }
}

/// Owns the scene and produces composed frames at a target rate.
pub struct Renderer {
    scene: SceneHandle,
    config: Arc<Mutex<RenderConfig>>,
    callback: Arc<Mutex<Option<FrameCallback>>>,
    running: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl Renderer {
    /// A stopped renderer over a fresh, empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self {
            scene: SceneHandle::new(),
            config: Arc::new(Mutex::new(RenderConfig::new())),
            callback: Arc::new(Mutex::new(None)),
            running: Arc::new(AtomicBool::new(false)),
            task: None,
        }
    }

    /// A handle to the scene this renderer draws. Clone freely; all handles
    /// share the same store.
    #[must_use]
    pub fn scene(&self) -> SceneHandle {
        self.scene.clone()
    }

    /// Set the target frame rate. Clamped to at least 1; takes effect on the
    /// next loop iteration.
    pub fn set_fps(&self, fps: u32) {
        lock(&self.config).fps = fps.max(1);
    }

    /// The current target frame rate.
    #[must_use]
    pub fn fps(&self) -> u32 {
        lock(&self.config).fps
    }

    /// Set the output frame size in pixels.
    pub fn set_frame_size(&self, width: u32, height: u32) {
        let mut config = lock(&self.config);
        config.width = width;
        config.height = height;
    }

    /// The current output frame size.
    #[must_use]
    pub fn frame_size(&self) -> (u32, u32) {
        let config = lock(&self.config);
        (config.width, config.height)
    }

    /// Replace the background source.
    pub fn set_background(&self, background: Box<dyn RasterSource>) {
        lock(&self.config).background = background;
    }

    /// Set the camera viewport. [`Camera::full`] disables the remap.
    pub fn set_camera(&self, camera: Camera) {
        lock(&self.config).camera = camera;
    }

    /// The current camera viewport.
    #[must_use]
    pub fn camera(&self) -> Camera {
        lock(&self.config).camera
    }

    /// Enable or disable the startup splash fade.
    pub fn set_splash(&self, enabled: bool) {
        lock(&self.config).splash = enabled;
    }

    /// The logo source the splash fade draws, centered on the background.
    /// Without one the splash is skipped even when enabled.
    pub fn set_splash_logo(&self, logo: Option<Box<dyn RasterSource>>) {
        lock(&self.config).splash_logo = logo;
    }

    /// Register the frame consumer, replacing any previous one. Frames
    /// composed while no consumer is registered are discarded.
    pub fn set_frame_callback<F>(&self, callback: F)
    where
        F: FnMut(Raster) + Send + 'static,
    {
        *lock(&self.callback) = Some(Box::new(callback));
    }

    /// Drop the frame consumer, if any.
    pub fn clear_frame_callback(&self) {
        *lock(&self.callback) = None;
    }

    /// Whether the background loop is currently running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Spawn the render loop on the current tokio runtime. No-op if already
    /// running.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime context.
    pub fn start(&mut self) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }
        info!("render loop starting");
        let scene = self.scene.clone();
        let config = Arc::clone(&self.config);
        let callback = Arc::clone(&self.callback);
        let running = Arc::clone(&self.running);
        self.task = Some(tokio::spawn(async move {
            run_splash(&config, &callback, &running).await;
            run_loop(&scene, &config, &callback, &running).await;
        }));
    }

    /// Signal the loop to stop and wait for the task to finish.
    pub async fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            let _ = task.await;
            info!("render loop stopped");
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        // Dropping without stop(): the flag still ends the loop promptly.
        self.running.store(false, Ordering::SeqCst);
    }
}

/// Placement that centers an `inner`-wide span inside an `outer`-wide frame.
fn centered(outer: u32, inner: u32) -> i32 {
    let offset = (i64::from(outer) - i64::from(inner)) / 2;
    i32::try_from(offset).unwrap_or(0)
}

/// Logo opacity for a splash step: 100 steps fading in, then 100 fading out.
#[allow(clippy::cast_precision_loss)]
fn splash_alpha(step: u32) -> f32 {
    if step < SPLASH_STEPS {
        step as f32 / SPLASH_STEPS as f32
    } else {
        (2 * SPLASH_STEPS).saturating_sub(step) as f32 / SPLASH_STEPS as f32
    }
}

/// Play the splash fade, if configured: each step composes the background
/// with the logo centered at a stepped opacity, delivers, and pauses.
async fn run_splash(
    config: &Mutex<RenderConfig>,
    callback: &Mutex<Option<FrameCallback>>,
    running: &AtomicBool,
) {
    let logo = {
        let config = lock(config);
        if !config.splash {
            return;
        }
        match &config.splash_logo {
            Some(logo) => logo.image(),
            None => return,
        }
    };

    for step in 0..2 * SPLASH_STEPS {
        if !running.load(Ordering::SeqCst) {
            return;
        }
        let frame = {
            let mut config = lock(config);
            let (width, height) = (config.width, config.height);
            config.background.resize(width, height);
            let mut canvas = config.background.image();
            let faded = logo.with_alpha(splash_alpha(step));
            let x = centered(width, faded.width());
            let y = centered(height, faded.height());
            if let Err(error) = canvas.blit(&faded, x, y) {
                warn!(%error, "splash logo skipped: malformed raster");
            }
            canvas
        };
        deliver(callback, frame);
        tokio::time::sleep(Duration::from_millis(SPLASH_STEP_MS)).await;
    }
}

/// The running loop: snapshot → compose → deliver → pace, forever (or until
/// the running flag clears).
async fn run_loop(
    scene: &SceneHandle,
    config: &Mutex<RenderConfig>,
    callback: &Mutex<Option<FrameCallback>>,
    running: &AtomicBool,
) {
    while running.load(Ordering::SeqCst) {
        let started = Instant::now();

        let items = scene.snapshot();
        let (frame, fps) = {
            let mut config = lock(config);
            let (width, height, camera, fps) =
                (config.width, config.height, config.camera, config.fps);
            let frame = compose::compose(width, height, config.background.as_mut(), items, camera);
            (frame, fps)
        };
        deliver(callback, frame);

        let budget = Duration::from_millis(u64::from(1000 / fps));
        if let Some(remaining) = budget.checked_sub(started.elapsed()) {
            tokio::time::sleep(remaining).await;
        }
    }
}

/// Hand a frame to the registered consumer, or discard it.
fn deliver(callback: &Mutex<Option<FrameCallback>>, frame: Raster) {
    if let Some(callback) = lock(callback).as_mut() {
        callback(frame);
    }
}
