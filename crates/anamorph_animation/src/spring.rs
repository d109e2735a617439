//! Damped spring interpolation
//!
//! A [`Spring`] pulls a scalar `current` value toward a `target` one
//! discrete tick at a time. Each tick converts a fraction of the remaining
//! gap into velocity (stiffness), decays that velocity (damping) and moves
//! the value. Once both the gap and the velocity fall below
//! [`SPRING_EPSILON`] the value snaps onto the target and the spring is
//! settled.
//!
//! Retargeting never resets the motion: [`Spring::set_target`] only moves
//! the goal, so an interrupted animation keeps its momentum.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SpringError};

/// Gap and velocity threshold below which a spring snaps onto its target
pub const SPRING_EPSILON: f64 = 6e-4;

/// Stiffness/damping pair for a spring
///
/// Fields are private so every config passes through [`SpringConfig::new`]
/// or the explicitly unchecked constructor:
///
/// ```compile_fail
/// use anamorph_animation::SpringConfig;
///
/// let config = SpringConfig { stiffness: 0.2, damping: 1.5 };
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringConfig {
    /// Fraction of the remaining gap added to velocity per tick, in (0, 1]
    stiffness: f64,
    /// Multiplicative velocity decay per tick, in (0, 1)
    damping: f64,
}

impl SpringConfig {
    /// Create a validated config.
    ///
    /// Coefficients outside the convergent range are rejected rather than
    /// clamped, so a bad slider value surfaces to the caller.
    pub fn new(stiffness: f64, damping: f64) -> Result<Self> {
        if !(stiffness > 0.0 && stiffness <= 1.0) {
            return Err(SpringError::Stiffness(stiffness));
        }
        if !(damping > 0.0 && damping < 1.0) {
            return Err(SpringError::Damping(damping));
        }
        Ok(Self { stiffness, damping })
    }

    /// Create a config without validation, for trusted constants
    pub const fn new_unchecked(stiffness: f64, damping: f64) -> Self {
        Self { stiffness, damping }
    }

    pub fn stiffness(&self) -> f64 {
        self.stiffness
    }

    pub fn damping(&self) -> f64 {
        self.damping
    }

    /// Gentle, slow settle
    pub const fn subtle() -> Self {
        Self::new_unchecked(0.10, 0.86)
    }

    /// Balanced default
    pub const fn medium() -> Self {
        Self::new_unchecked(0.15, 0.78)
    }

    /// Quick and bouncy
    pub const fn expressive() -> Self {
        Self::new_unchecked(0.22, 0.70)
    }

    /// Whether a motion starting at rest can never pass its target.
    ///
    /// The gap obeys `e[n+1] = (1 + d - d*k) e[n] - d e[n-1]`; with real
    /// characteristic roots the gap decays without changing sign.
    pub fn is_overshoot_free(&self) -> bool {
        let k = self.stiffness;
        let d = self.damping;
        let b = 1.0 + d - d * k;
        b * b >= 4.0 * d
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::medium()
    }
}

/// Named stiffness/damping presets exposed to the UI
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SpringPreset {
    Subtle,
    #[default]
    Medium,
    Expressive,
    /// Coefficients were set directly
    Custom,
}

impl SpringPreset {
    /// Named presets, excluding `Custom`
    pub fn all() -> &'static [SpringPreset] {
        &[
            SpringPreset::Subtle,
            SpringPreset::Medium,
            SpringPreset::Expressive,
        ]
    }

    pub fn id(self) -> &'static str {
        match self {
            SpringPreset::Subtle => "subtle",
            SpringPreset::Medium => "medium",
            SpringPreset::Expressive => "expressive",
            SpringPreset::Custom => "custom",
        }
    }

    /// Coefficients for a named preset; `None` for `Custom`
    pub fn config(self) -> Option<SpringConfig> {
        match self {
            SpringPreset::Subtle => Some(SpringConfig::subtle()),
            SpringPreset::Medium => Some(SpringConfig::medium()),
            SpringPreset::Expressive => Some(SpringConfig::expressive()),
            SpringPreset::Custom => None,
        }
    }

    /// Map a config back to the preset it came from, or `Custom`
    pub fn identify(config: SpringConfig) -> SpringPreset {
        Self::all()
            .iter()
            .copied()
            .find(|preset| preset.config() == Some(config))
            .unwrap_or(SpringPreset::Custom)
    }
}

impl fmt::Display for SpringPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for SpringPreset {
    type Err = SpringError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "subtle" => Ok(SpringPreset::Subtle),
            "medium" => Ok(SpringPreset::Medium),
            "expressive" => Ok(SpringPreset::Expressive),
            "custom" => Ok(SpringPreset::Custom),
            _ => Err(SpringError::UnknownPreset(s.to_string())),
        }
    }
}

/// Outcome of a single [`Spring::tick`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tick {
    pub current: f64,
    pub velocity: f64,
    /// This tick snapped onto the target; no further ticks are needed
    pub settled: bool,
}

/// Spring state: the rendered value, its goal and its momentum
#[derive(Clone, Debug)]
pub struct Spring {
    current: f64,
    target: f64,
    velocity: f64,
    config: SpringConfig,
    preset: SpringPreset,
}

impl Spring {
    /// Create a settled spring resting at `value`
    pub fn new(config: SpringConfig, value: f64) -> Self {
        Self {
            current: value,
            target: value,
            velocity: 0.0,
            config,
            preset: SpringPreset::identify(config),
        }
    }

    /// Create a settled spring from a named preset.
    ///
    /// `Custom` has no coefficients of its own and falls back to the
    /// default config.
    pub fn with_preset(preset: SpringPreset, value: f64) -> Self {
        let mut spring = Self::new(preset.config().unwrap_or_default(), value);
        spring.preset = preset;
        spring
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn config(&self) -> SpringConfig {
        self.config
    }

    pub fn preset(&self) -> SpringPreset {
        self.preset
    }

    /// Move the goal. Position and velocity are left untouched.
    pub fn set_target(&mut self, target: f64) {
        self.target = target;
    }

    /// Override the coefficients directly
    pub fn set_config(&mut self, config: SpringConfig) {
        self.config = config;
        self.preset = SpringPreset::identify(config);
    }

    /// Switch to a named preset.
    ///
    /// `Custom` keeps the current coefficients and only changes the label.
    pub fn set_preset(&mut self, preset: SpringPreset) {
        if let Some(config) = preset.config() {
            self.config = config;
        }
        self.preset = preset;
    }

    /// Jump straight to `value` with no motion
    pub fn snap_to(&mut self, value: f64) {
        self.current = value;
        self.target = value;
        self.velocity = 0.0;
    }

    /// Whether the spring rests exactly on its target
    pub fn is_settled(&self) -> bool {
        self.current == self.target && self.velocity == 0.0
    }

    /// Advance one step.
    ///
    /// Nothing is clamped: a NaN or infinite target propagates into
    /// `current`, and so does a finite gap too wide for `f64` (for example
    /// `-f64::MAX` toward `f64::MAX`), which overflows to infinity and then
    /// NaN. Such a spring never settles, so frame loops must be bounded.
    pub fn tick(&mut self) -> Tick {
        let delta = self.target - self.current;
        self.velocity += delta * self.config.stiffness;
        self.velocity *= self.config.damping;
        self.current += self.velocity;

        let settled = delta.abs() < SPRING_EPSILON && self.velocity.abs() < SPRING_EPSILON;
        if settled {
            self.current = self.target;
            self.velocity = 0.0;
        }

        tracing::trace!(
            current = self.current,
            target = self.target,
            velocity = self.velocity,
            settled,
            "spring tick"
        );

        Tick {
            current: self.current,
            velocity: self.velocity,
            settled,
        }
    }
}

impl Default for Spring {
    fn default() -> Self {
        Self::new(SpringConfig::default(), 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX_TICKS: usize = 10_000;

    fn run_to_rest(spring: &mut Spring) -> (Vec<f64>, usize) {
        let mut values = Vec::new();
        for n in 1..=MAX_TICKS {
            let tick = spring.tick();
            values.push(tick.current);
            if tick.settled {
                return (values, n);
            }
        }
        panic!("spring did not settle within {MAX_TICKS} ticks");
    }

    #[test]
    fn test_first_tick_matches_hand_computation() {
        let config = SpringConfig::new(0.15, 0.78).unwrap();
        let mut spring = Spring::new(config, 1.0);
        spring.set_target(0.5);

        let tick = spring.tick();
        assert!((tick.velocity - -0.0585).abs() < 1e-12);
        assert!((tick.current - 0.9415).abs() < 1e-12);
        assert!(!tick.settled);

        // Second tick feeds on the updated state
        let tick = spring.tick();
        let velocity = (-0.0585 + (0.5 - 0.9415) * 0.15) * 0.78;
        assert!((tick.velocity - velocity).abs() < 1e-12);
        assert!((tick.current - (0.9415 + velocity)).abs() < 1e-12);
    }

    #[test]
    fn test_converges_and_snaps_exactly() {
        for &preset in SpringPreset::all() {
            let mut spring = Spring::with_preset(preset, 0.0);
            spring.set_target(1.0);
            run_to_rest(&mut spring);
            assert_eq!(spring.current(), 1.0);
            assert_eq!(spring.velocity(), 0.0);
            assert!(spring.is_settled());
        }
    }

    #[test]
    fn test_converges_across_coefficient_grid() {
        for k in [0.05, 0.1, 0.3, 0.6, 1.0] {
            for d in [0.1, 0.5, 0.8, 0.9] {
                let mut spring = Spring::new(SpringConfig::new(k, d).unwrap(), -250.0);
                spring.set_target(1000.0);
                run_to_rest(&mut spring);
                assert_eq!(spring.current(), 1000.0, "k={k} d={d}");
            }
        }
    }

    #[test]
    fn test_settled_tick_is_idempotent() {
        let mut spring = Spring::new(SpringConfig::medium(), 0.0);
        spring.set_target(2.0);
        run_to_rest(&mut spring);

        for _ in 0..5 {
            let tick = spring.tick();
            assert!(tick.settled);
            assert_eq!(tick.current, 2.0);
            assert_eq!(tick.velocity, 0.0);
        }
    }

    #[test]
    fn test_retarget_keeps_position_and_velocity() {
        let mut spring = Spring::new(SpringConfig::expressive(), 0.0);
        spring.set_target(1.0);
        for _ in 0..4 {
            spring.tick();
        }

        let current = spring.current();
        let velocity = spring.velocity();
        spring.set_target(-3.0);

        assert_eq!(spring.current(), current);
        assert_eq!(spring.velocity(), velocity);
        assert_eq!(spring.target(), -3.0);
    }

    #[test]
    fn test_expressive_overshoots() {
        let mut spring = Spring::with_preset(SpringPreset::Expressive, 0.0);
        spring.set_target(1.0);
        let (values, _) = run_to_rest(&mut spring);
        assert!(values.iter().any(|&v| v > 1.0));
    }

    #[test]
    fn test_overshoot_free_configs_stay_below_target() {
        let configs = [
            SpringConfig::new(0.1, 0.5).unwrap(),
            SpringConfig::new(0.05, 0.6).unwrap(),
            SpringConfig::new(1.0, 0.1).unwrap(),
        ];
        for config in configs {
            assert!(config.is_overshoot_free(), "{config:?}");
            let mut spring = Spring::new(config, 0.0);
            spring.set_target(1.0);
            let (values, _) = run_to_rest(&mut spring);
            assert!(values.iter().all(|&v| v <= 1.0 + SPRING_EPSILON), "{config:?}");
        }
    }

    #[test]
    fn test_underdamped_presets_are_flagged() {
        for &preset in SpringPreset::all() {
            let config = preset.config().unwrap();
            assert!(!config.is_overshoot_free(), "{preset}");

            let mut spring = Spring::new(config, 0.0);
            spring.set_target(1.0);
            let (values, _) = run_to_rest(&mut spring);
            assert!(values.iter().any(|&v| v > 1.0 + SPRING_EPSILON), "{preset}");
        }
    }

    #[test]
    fn test_mirror_symmetry() {
        let mut up = Spring::new(SpringConfig::medium(), 0.0);
        let mut down = Spring::new(SpringConfig::medium(), 1.0);
        up.set_target(1.0);
        down.set_target(0.0);

        loop {
            let a = up.tick();
            let b = down.tick();
            assert!((a.current - (1.0 - b.current)).abs() < 1e-12);
            assert_eq!(a.settled, b.settled);
            if a.settled {
                break;
            }
        }
    }

    #[test]
    fn test_non_finite_target_propagates() {
        let mut spring = Spring::default();
        spring.set_target(f64::NAN);
        let tick = spring.tick();
        assert!(tick.current.is_nan());
        assert!(!tick.settled);

        let mut spring = Spring::default();
        spring.set_target(f64::INFINITY);
        assert_eq!(spring.tick().current, f64::INFINITY);
    }

    #[test]
    fn test_overflowing_gap_never_settles() {
        let mut spring = Spring::new(SpringConfig::medium(), -f64::MAX);
        spring.set_target(f64::MAX);

        let tick = spring.tick();
        assert_eq!(tick.current, f64::INFINITY);
        assert!(!tick.settled);

        let tick = spring.tick();
        assert!(tick.current.is_nan());
        assert!(tick.velocity.is_nan());
        assert!(!tick.settled);

        for _ in 0..10 {
            assert!(!spring.tick().settled);
        }
        assert!(!spring.is_settled());
    }

    #[test]
    fn test_config_validation() {
        assert_eq!(SpringConfig::new(0.0, 0.5), Err(SpringError::Stiffness(0.0)));
        assert_eq!(SpringConfig::new(1.2, 0.5), Err(SpringError::Stiffness(1.2)));
        assert_eq!(SpringConfig::new(0.2, 1.0), Err(SpringError::Damping(1.0)));
        assert_eq!(SpringConfig::new(0.2, -0.1), Err(SpringError::Damping(-0.1)));
        assert!(matches!(
            SpringConfig::new(f64::NAN, 0.5),
            Err(SpringError::Stiffness(_))
        ));
        assert!(SpringConfig::new(1.0, 0.99).is_ok());

        let config = SpringConfig::new(0.3, 0.5).unwrap();
        assert_eq!(config.stiffness(), 0.3);
        assert_eq!(config.damping(), 0.5);
    }

    #[test]
    fn test_preset_identity() {
        let mut spring = Spring::with_preset(SpringPreset::Subtle, 0.0);
        assert_eq!(spring.preset(), SpringPreset::Subtle);

        spring.set_config(SpringConfig::new(0.3, 0.5).unwrap());
        assert_eq!(spring.preset(), SpringPreset::Custom);

        spring.set_config(SpringConfig::expressive());
        assert_eq!(spring.preset(), SpringPreset::Expressive);

        spring.set_preset(SpringPreset::Custom);
        assert_eq!(spring.preset(), SpringPreset::Custom);
        assert_eq!(spring.config(), SpringConfig::expressive());
    }

    #[test]
    fn test_preset_parse() {
        assert_eq!("Subtle".parse::<SpringPreset>(), Ok(SpringPreset::Subtle));
        assert_eq!(" expressive ".parse::<SpringPreset>(), Ok(SpringPreset::Expressive));
        assert!("bouncy".parse::<SpringPreset>().is_err());
        for &preset in SpringPreset::all() {
            assert_eq!(preset.id().parse::<SpringPreset>(), Ok(preset));
        }
    }
}
