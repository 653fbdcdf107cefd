//! Cooperative frame loop
//!
//! One pipeline pass per animation tick: call the external detector on the
//! host-owned frame source, route the result through the session, hand the
//! report (and the overlay-ready data inside it) back to the host, then
//! schedule the next tick. The detector call is the only suspension point
//! and exactly one inference is in flight at a time — the next tick is not
//! scheduled until the current one resolves.
//!
//! Cancellation is a flag plus a generation counter: `stop()` prevents any
//! further tick from being scheduled, and a detector call that resolves
//! after `stop()` (or after a restart) sees a stale generation and is
//! discarded without touching session state. The camera itself belongs to
//! the host and is released there.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, spawn_local, JsFuture};

use crate::bridge;
use crate::engine::{select_best_pose, AchievementEvent, DetectedPose, EngineError};

fn now_secs() -> f64 {
    web_sys::window()
        .and_then(|window| window.performance())
        .map(|performance| performance.now() / 1000.0)
        .unwrap_or(0.0)
}

/// Resolves on the next display-synced tick.
async fn next_animation_frame() -> Result<(), JsValue> {
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        let scheduled = web_sys::window()
            .map(|window| window.request_animation_frame(&resolve).is_ok())
            .unwrap_or(false);
        if !scheduled {
            // no scheduler available; resolve now so the loop can wind down
            let _ = resolve.call0(&JsValue::NULL);
        }
    });
    JsFuture::from(promise).await.map(|_| ())
}

struct LoopShared {
    /// Opaque frame source handed to the detector (video element, image, ...)
    source: JsValue,
    /// `(source) -> Promise<[{score, keypoints: [{name, x, y, score}]}]>`
    detector: js_sys::Function,
    /// Called with the serialized frame report after every delivered tick
    on_report: js_sys::Function,
    /// Injected relay for achievement events; the engine never owns a socket
    on_achievement: RefCell<Option<js_sys::Function>>,
    active: Cell<bool>,
    generation: Cell<u64>,
    frame_width: Cell<f32>,
    frame_height: Cell<f32>,
}

impl LoopShared {
    fn is_current(&self, generation: u64) -> bool {
        self.active.get() && self.generation.get() == generation
    }

    /// One detector call against the frame source, parsed into poses.
    async fn detect(&self) -> Result<Vec<DetectedPose>, EngineError> {
        let promise: js_sys::Promise = self
            .detector
            .call1(&JsValue::NULL, &self.source)
            .map_err(|err| EngineError::DetectorFailure(format!("detector threw: {err:?}")))?
            .dyn_into()
            .map_err(|_| {
                EngineError::DetectorFailure("detector did not return a Promise".to_string())
            })?;

        let raw = JsFuture::from(promise)
            .await
            .map_err(|err| EngineError::DetectorFailure(format!("{err:?}")))?;

        serde_wasm_bindgen::from_value(raw)
            .map_err(|err| EngineError::DetectorFailure(err.to_string()))
    }

    fn relay_achievement(&self, event: &AchievementEvent) {
        let callback = self.on_achievement.borrow();
        let Some(callback) = callback.as_ref() else {
            return;
        };
        // fire-and-forget: a broken relay must not stall the loop
        match serde_wasm_bindgen::to_value(event) {
            Ok(js_event) => {
                let _ = callback.call1(&JsValue::NULL, &js_event);
            }
            Err(err) => web_sys::console::warn_1(&err.to_string().into()),
        }
    }
}

enum TickOutcome {
    Delivered,
    /// Detector resolved after cancellation; result was dropped
    Discarded,
}

async fn tick(state: &LoopShared, generation: u64) -> Result<TickOutcome, JsValue> {
    let poses = state.detect().await?;

    if !state.is_current(generation) {
        return Ok(TickOutcome::Discarded);
    }

    let report = bridge::run_frame(
        &poses,
        state.frame_width.get(),
        state.frame_height.get(),
        now_secs(),
    )?;

    if let Some(event) = &report.achievement {
        state.relay_achievement(event);
    }

    let js_report = serde_wasm_bindgen::to_value(&report)?;
    let _ = state.on_report.call1(&JsValue::NULL, &js_report);
    Ok(TickOutcome::Delivered)
}

async fn run(state: Rc<LoopShared>, generation: u64) {
    while state.is_current(generation) {
        match tick(&state, generation).await {
            Ok(TickOutcome::Delivered) => {}
            Ok(TickOutcome::Discarded) => break,
            // frame-level faults are non-fatal: log and keep looping
            Err(err) => web_sys::console::warn_1(&err),
        }

        if !state.is_current(generation) {
            break;
        }
        if next_animation_frame().await.is_err() {
            break;
        }
    }
}

/// Display-synced driver for the comparison pipeline
#[wasm_bindgen]
pub struct FrameLoop {
    state: Rc<LoopShared>,
}

#[wasm_bindgen]
impl FrameLoop {
    #[wasm_bindgen(constructor)]
    pub fn new(source: JsValue, detector: js_sys::Function, on_report: js_sys::Function) -> Self {
        Self {
            state: Rc::new(LoopShared {
                source,
                detector,
                on_report,
                on_achievement: RefCell::new(None),
                active: Cell::new(false),
                generation: Cell::new(0),
                frame_width: Cell::new(640.0),
                frame_height: Cell::new(480.0),
            }),
        }
    }

    /// Install the room relay callback for achievement events.
    pub fn set_achievement_relay(&self, callback: Option<js_sys::Function>) {
        *self.state.on_achievement.borrow_mut() = callback;
    }

    /// Pixel dimensions of the frames the detector sees; used to normalize
    /// keypoints into the unit square.
    pub fn set_frame_size(&self, width: f32, height: f32) {
        self.state.frame_width.set(width);
        self.state.frame_height.set(height);
    }

    pub fn is_active(&self) -> bool {
        self.state.active.get()
    }

    /// Start the continuous webcam loop. No-op if already running.
    ///
    /// Failing to find a scheduler here is the one fatal, user-visible
    /// error; everything after this point is contained per frame.
    pub fn start(&self) -> Result<(), JsValue> {
        if self.state.active.get() {
            return Ok(());
        }
        if web_sys::window().is_none() {
            return Err(JsValue::from_str("no window to schedule frames on"));
        }

        self.state.active.set(true);
        let generation = self.state.generation.get() + 1;
        self.state.generation.set(generation);

        let state = self.state.clone();
        spawn_local(run(state, generation));
        Ok(())
    }

    /// Stop the loop: no further tick is scheduled, and an in-flight
    /// detector result will be discarded when it resolves. Also abandons
    /// the current hold attempt.
    pub fn stop(&self) {
        self.state.active.set(false);
        self.state.generation.set(self.state.generation.get() + 1);
        bridge::reset_hold();
    }

    /// One-shot reference pass: detect the pose in the current frame source
    /// and install it as the comparison target. Resolves with the
    /// reference's joint angles.
    pub fn capture_reference(&self, reference_id: String) -> js_sys::Promise {
        let state = self.state.clone();
        future_to_promise(async move {
            let poses = state.detect().await?;
            let best = select_best_pose(&poses).ok_or_else(|| {
                EngineError::DetectorFailure("no pose detected in reference image".to_string())
            })?;

            let entries = bridge::set_reference_raw(
                &best.keypoints,
                state.frame_width.get(),
                state.frame_height.get(),
                reference_id,
                now_secs(),
            )?;
            Ok(serde_wasm_bindgen::to_value(&entries)?)
        })
    }
}
