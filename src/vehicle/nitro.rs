//! Nitro state machine.
//!
//! Two clocks run side by side once nitro fires:
//!
//! - the **phase timer**, carried inside [`NitroPhase`]: `Active` for
//!   `active_duration`, then `Fading` for `fade_duration`, then `Cooldown`
//!   (no timer of its own);
//! - the **recharge counter**, drawn uniformly from
//!   `[cooldown_min, cooldown_max)` at activation and decremented every frame
//!   regardless of phase.
//!
//! [`transition`] applies the phase-local step first, then one top-level
//! rule: when the recharge counter reaches zero it clamps to 0 and the phase
//! becomes `Ready`, whatever it was.
//!
//! `Fading` always hands over to `Cooldown`, even when the recharge is about
//! to finish in the same frame; the recharge rule then lifts it to `Ready`.

use crate::config::NitroTuning;
use bevy::prelude::*;
use rand::Rng;

/// Current nitro phase.  Timers count down in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NitroPhase {
    /// Can be activated.
    Ready,
    /// Full nitro top speed.
    Active { remaining: f32 },
    /// Top speed easing back to base; `remaining` runs from `fade_duration` to 0.
    Fading { remaining: f32 },
    /// Waiting for the recharge counter.
    Cooldown,
}

impl NitroPhase {
    pub fn label(&self) -> &'static str {
        match self {
            NitroPhase::Ready => "ready",
            NitroPhase::Active { .. } => "active",
            NitroPhase::Fading { .. } => "fading",
            NitroPhase::Cooldown => "cooldown",
        }
    }

    /// Seconds left in the current phase (0 for untimed phases).
    pub fn timer(&self) -> f32 {
        match *self {
            NitroPhase::Active { remaining } | NitroPhase::Fading { remaining } => remaining,
            NitroPhase::Ready | NitroPhase::Cooldown => 0.0,
        }
    }

    /// Phase-local step, ignoring the recharge counter.
    pub fn advance(self, dt: f32, tuning: &NitroTuning) -> Self {
        match self {
            NitroPhase::Active { remaining } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    NitroPhase::Fading {
                        remaining: tuning.fade_duration,
                    }
                } else {
                    NitroPhase::Active { remaining }
                }
            }
            NitroPhase::Fading { remaining } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    NitroPhase::Cooldown
                } else {
                    NitroPhase::Fading { remaining }
                }
            }
            other => other,
        }
    }

    /// Forward top speed allowed in this phase.
    pub fn max_speed(&self, base: f32, tuning: &NitroTuning) -> f32 {
        match *self {
            NitroPhase::Ready | NitroPhase::Cooldown => base,
            NitroPhase::Active { .. } => tuning.max_speed,
            NitroPhase::Fading { remaining } => {
                if tuning.fade_duration <= 0.0 {
                    return base;
                }
                let t = (remaining / tuning.fade_duration).clamp(0.0, 1.0);
                base + (tuning.max_speed - base) * t
            }
        }
    }
}

/// One frame of the state machine: `(phase, dt, recharge) → (phase', recharge')`.
pub fn transition(
    phase: NitroPhase,
    dt: f32,
    cooldown_remaining: f32,
    tuning: &NitroTuning,
) -> (NitroPhase, f32) {
    let mut phase = phase.advance(dt, tuning);
    let mut cooldown = cooldown_remaining;

    if cooldown > 0.0 {
        cooldown -= dt;
        if cooldown <= 0.0 {
            cooldown = 0.0;
            phase = NitroPhase::Ready;
        }
    }

    (phase, cooldown)
}

/// Nitro phase plus its independent recharge counter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nitro {
    phase: NitroPhase,
    cooldown: f32,
}

impl Default for Nitro {
    fn default() -> Self {
        Self {
            phase: NitroPhase::Ready,
            cooldown: 0.0,
        }
    }
}

impl Nitro {
    /// Build from explicit parts (tests and snapshots).
    pub fn from_parts(phase: NitroPhase, cooldown: f32) -> Self {
        Self { phase, cooldown }
    }

    pub fn phase(&self) -> NitroPhase {
        self.phase
    }

    /// Seconds until nitro is ready again (0 when ready or never fired).
    pub fn cooldown(&self) -> f32 {
        self.cooldown
    }

    pub fn is_ready(&self) -> bool {
        self.phase == NitroPhase::Ready
    }

    /// Fire nitro if `Ready`: enter `Active` and start the recharge counter.
    ///
    /// Returns whether activation happened.  The caller applies the speed
    /// impulse.
    pub fn try_activate(&mut self, tuning: &NitroTuning, rng: &mut impl Rng) -> bool {
        if !self.is_ready() {
            return false;
        }
        self.phase = NitroPhase::Active {
            remaining: tuning.active_duration,
        };
        self.cooldown = if tuning.cooldown_min < tuning.cooldown_max {
            rng.gen_range(tuning.cooldown_min..tuning.cooldown_max)
        } else {
            tuning.cooldown_min
        };
        debug!("Nitro activated, recharge in {:.1}s", self.cooldown);
        true
    }

    pub fn tick(&mut self, dt: f32, tuning: &NitroTuning) {
        let (phase, cooldown) = transition(self.phase, dt, self.cooldown, tuning);
        if phase.label() != self.phase.label() {
            debug!(
                "Nitro {} -> {} ({:.1}s in phase, {:.1}s recharge)",
                self.phase.label(),
                phase.label(),
                phase.timer(),
                cooldown
            );
        }
        self.phase = phase;
        self.cooldown = cooldown;
    }

    pub fn max_speed(&self, base: f32, tuning: &NitroTuning) -> f32 {
        self.phase.max_speed(base, tuning)
    }
}
