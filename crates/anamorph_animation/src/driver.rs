//! Spring driver
//!
//! Runs a [`Spring`] from a [`FrameScheduler`]: every frame ticks the
//! spring once and hands the new value to a [`RenderSink`], rescheduling
//! itself until the spring settles. At most one frame is outstanding per
//! driver; retargeting cancels it and requests a fresh one, so a stale
//! callback never advances the state twice.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::motion::{MotionEvent, MotionMachine, MotionState};
use crate::scheduler::{FrameHandle, FrameScheduler};
use crate::sink::RenderSink;
use crate::spring::{Spring, SpringConfig, SpringPreset};

struct DriverState {
    spring: Spring,
    machine: MotionMachine,
    pending: Option<FrameHandle>,
    /// Taken out while rendering so the sink may call back into the driver
    sink: Option<Box<dyn RenderSink>>,
    frames: u64,
}

/// Cloneable, single-threaded handle driving one spring
pub struct SpringDriver<S: FrameScheduler + 'static> {
    state: Rc<RefCell<DriverState>>,
    scheduler: Rc<RefCell<S>>,
}

impl<S: FrameScheduler + 'static> Clone for SpringDriver<S> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<S: FrameScheduler + 'static> SpringDriver<S> {
    pub fn new(spring: Spring, scheduler: Rc<RefCell<S>>, sink: impl RenderSink + 'static) -> Self {
        Self {
            state: Rc::new(RefCell::new(DriverState {
                spring,
                machine: MotionMachine::new(),
                pending: None,
                sink: Some(Box::new(sink)),
                frames: 0,
            })),
            scheduler,
        }
    }

    /// Aim the spring at a new value and make sure a frame loop is running.
    ///
    /// Motion continues from the in-flight value and velocity.
    pub fn set_target(&self, target: f64) {
        let mut state = self.state.borrow_mut();
        state.spring.set_target(target);
        state.machine.send(MotionEvent::Retarget);

        if let Some(handle) = state.pending.take() {
            self.scheduler.borrow_mut().cancel_frame(handle);
        }
        state.pending = Some(schedule(&self.state, &self.scheduler));

        tracing::debug!(
            target,
            current = state.spring.current(),
            "spring retargeted"
        );
    }

    /// Stop the frame loop where it is, without snapping
    pub fn halt(&self) {
        let mut state = self.state.borrow_mut();
        if let Some(handle) = state.pending.take() {
            self.scheduler.borrow_mut().cancel_frame(handle);
        }
        state.machine.send(MotionEvent::Halt);
    }

    /// Jump to `value` immediately and render it once
    pub fn snap_to(&self, value: f64) {
        self.halt();
        let sink = {
            let mut state = self.state.borrow_mut();
            state.spring.snap_to(value);
            state.sink.take()
        };
        render_with(&self.state, sink, value);
    }

    pub fn set_config(&self, config: SpringConfig) {
        self.state.borrow_mut().spring.set_config(config);
    }

    pub fn set_preset(&self, preset: SpringPreset) {
        self.state.borrow_mut().spring.set_preset(preset);
    }

    pub fn current(&self) -> f64 {
        self.state.borrow().spring.current()
    }

    pub fn target(&self) -> f64 {
        self.state.borrow().spring.target()
    }

    pub fn velocity(&self) -> f64 {
        self.state.borrow().spring.velocity()
    }

    pub fn config(&self) -> SpringConfig {
        self.state.borrow().spring.config()
    }

    pub fn preset(&self) -> SpringPreset {
        self.state.borrow().spring.preset()
    }

    pub fn state(&self) -> MotionState {
        self.state.borrow().machine.state()
    }

    pub fn is_animating(&self) -> bool {
        self.state.borrow().machine.is_animating()
    }

    /// Whether a frame callback is outstanding
    pub fn has_pending_frame(&self) -> bool {
        self.state.borrow().pending.is_some()
    }

    /// Number of frames ticked so far
    pub fn frames(&self) -> u64 {
        self.state.borrow().frames
    }

    /// Snapshot of the spring state
    pub fn spring(&self) -> Spring {
        self.state.borrow().spring.clone()
    }
}

fn schedule<S: FrameScheduler + 'static>(
    state: &Rc<RefCell<DriverState>>,
    scheduler: &Rc<RefCell<S>>,
) -> FrameHandle {
    let state_ref: Weak<RefCell<DriverState>> = Rc::downgrade(state);
    let scheduler_ref: Weak<RefCell<S>> = Rc::downgrade(scheduler);
    scheduler.borrow_mut().request_frame(Box::new(move || {
        // The driver may have been dropped while the frame was pending
        if let (Some(state), Some(scheduler)) = (state_ref.upgrade(), scheduler_ref.upgrade()) {
            on_frame(&state, &scheduler);
        }
    }))
}

fn on_frame<S: FrameScheduler + 'static>(
    state: &Rc<RefCell<DriverState>>,
    scheduler: &Rc<RefCell<S>>,
) {
    let (tick, sink) = {
        let mut guard = state.borrow_mut();
        guard.pending = None;
        guard.frames += 1;
        (guard.spring.tick(), guard.sink.take())
    };

    render_with(state, sink, tick.current);

    let mut guard = state.borrow_mut();
    if guard.pending.is_some() || !guard.machine.is_animating() {
        // The sink already rescheduled or stopped the loop
        return;
    }

    if tick.settled {
        guard.machine.send(MotionEvent::Settle);
        tracing::debug!(
            value = tick.current,
            frames = guard.frames,
            "spring settled"
        );
    } else {
        guard.pending = Some(schedule(state, scheduler));
    }
}

fn render_with(state: &Rc<RefCell<DriverState>>, sink: Option<Box<dyn RenderSink>>, value: f64) {
    let Some(mut sink) = sink else {
        return;
    };
    sink.render(value);

    let mut guard = state.borrow_mut();
    if guard.sink.is_none() {
        guard.sink = Some(sink);
    }
}
