//! Anamorph Animation
//!
//! Damped spring interpolation for animating a scalar UI value, such as a
//! de-squeeze ratio, toward a target one frame at a time.
//!
//! # Features
//!
//! - **Spring**: stiffness/damping integration with snap-to-target settling
//! - **Presets**: subtle, medium and expressive coefficient pairs
//! - **Motion FSM**: explicit `Idle`/`Animating` states
//! - **Scheduling**: cancellable per-frame callbacks with a manual frame queue
//! - **Interruptible**: retargeting keeps the in-flight value and velocity
//!
//! # Example
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use anamorph_animation::scheduler::run_until_idle;
//! use anamorph_animation::{FrameQueue, Spring, SpringDriver, SpringPreset};
//!
//! let queue = Rc::new(RefCell::new(FrameQueue::new()));
//! let driver = SpringDriver::new(
//!     Spring::with_preset(SpringPreset::Medium, 1.0),
//!     queue.clone(),
//!     |ratio: f64| println!("ratio {ratio:.3}"),
//! );
//!
//! driver.set_target(1.33);
//! run_until_idle(&queue, 1_000);
//! assert_eq!(driver.current(), 1.33);
//! ```

pub mod driver;
pub mod error;
pub mod motion;
pub mod scheduler;
pub mod sink;
pub mod spring;

pub use driver::SpringDriver;
pub use error::{Result, SpringError};
pub use motion::{MotionEvent, MotionMachine, MotionState};
pub use scheduler::{FrameCallback, FrameHandle, FrameQueue, FrameScheduler};
pub use sink::{RenderSink, Trajectory};
pub use spring::{Spring, SpringConfig, SpringPreset, Tick, SPRING_EPSILON};
