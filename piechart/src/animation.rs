// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-slice selection scale animation.
//!
//! Every retained slice owns one [`ScaleTrack`]: a current value that eases toward
//! either `1.0` (resting) or the selected scale. Transitions run independently per
//! slice and are advanced explicitly by the host's frame loop through
//! [`AnimationController::advance`].
//!
//! Each transition carries the generation it was started under, along with the
//! timing it was started with. Retargeting a track bumps its generation, drops
//! the superseded transition and starts a fresh one from the current value. A
//! transition whose generation no longer matches its track never writes to it.

extern crate alloc;

use alloc::vec::Vec;

/// Easing curves for scale transitions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Easing {
    /// Constant speed.
    Linear,
    /// Fast start, gentle landing.
    #[default]
    EaseOutCubic,
    /// Gentle start and landing.
    EaseInOutCubic,
}

impl Easing {
    /// Maps linear progress `t` (clamped to `[0, 1]`) to eased progress in `[0, 1]`.
    ///
    /// All curves are monotonic, so an eased transition never overshoots its target.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseOutCubic => {
                let u = 1.0 - t;
                1.0 - u * u * u
            }
            Self::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let u = -2.0 * t + 2.0;
                    1.0 - u * u * u / 2.0
                }
            }
        }
    }
}

/// Timing for scale transitions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationSpec {
    /// Transition length in seconds. Zero (or less) snaps straight to the target.
    pub duration: f64,
    /// Easing curve.
    pub easing: Easing,
}

impl AnimationSpec {
    /// A spec that snaps to targets without animating.
    pub const IMMEDIATE: Self = Self {
        duration: 0.0,
        easing: Easing::Linear,
    };

    /// Creates a spec with the given duration (seconds) and easing.
    pub fn new(duration: f64, easing: Easing) -> Self {
        Self { duration, easing }
    }

    fn is_immediate(&self) -> bool {
        !(self.duration.is_finite() && self.duration > 0.0)
    }
}

impl Default for AnimationSpec {
    fn default() -> Self {
        Self::new(0.3, Easing::EaseOutCubic)
    }
}

/// The live scale of one slice.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleTrack {
    value: f64,
    target: f64,
    generation: u64,
}

impl ScaleTrack {
    /// A track at rest at scale `1.0`.
    pub const RESTING: Self = Self {
        value: 1.0,
        target: 1.0,
        generation: 0,
    };

    /// The scale to draw with right now.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// The scale this track is heading toward.
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Generation of the transition currently allowed to drive this track.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the track has reached its target.
    pub fn is_settled(&self) -> bool {
        self.value == self.target
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Transition {
    index: usize,
    generation: u64,
    from: f64,
    to: f64,
    elapsed: f64,
    spec: AnimationSpec,
}

/// Owns every slice's [`ScaleTrack`] and the transitions driving them.
#[derive(Clone, Debug, Default)]
pub struct AnimationController {
    spec: AnimationSpec,
    tracks: Vec<ScaleTrack>,
    transitions: Vec<Transition>,
    next_generation: u64,
}

impl AnimationController {
    /// Creates an empty controller.
    pub fn new(spec: AnimationSpec) -> Self {
        Self {
            spec,
            ..Self::default()
        }
    }

    /// Returns the timing used for new transitions.
    pub fn spec(&self) -> AnimationSpec {
        self.spec
    }

    /// Sets the timing used for transitions started from now on.
    ///
    /// Transitions already in flight keep the timing they started with.
    pub fn set_spec(&mut self, spec: AnimationSpec) {
        self.spec = spec;
    }

    /// Recreates `len` resting tracks, discarding all in-flight transitions.
    ///
    /// Used whenever the slice list itself changes.
    pub fn reset(&mut self, len: usize) {
        self.tracks.clear();
        self.tracks.resize(len, ScaleTrack::RESTING);
        self.transitions.clear();
    }

    /// Points each track at `target_for(index)`.
    ///
    /// Tracks whose target is unchanged keep animating undisturbed. Tracks with a
    /// new target restart from their current value. Returns how many tracks were
    /// retargeted.
    pub fn retarget(&mut self, mut target_for: impl FnMut(usize) -> f64) -> usize {
        let mut retargeted = 0;
        for (index, track) in self.tracks.iter_mut().enumerate() {
            let target = target_for(index);
            if track.target == target {
                continue;
            }
            retargeted += 1;
            self.next_generation = self.next_generation.wrapping_add(1);
            track.generation = self.next_generation;
            track.target = target;
            self.transitions.retain(|t| t.index != index);

            if self.spec.is_immediate() {
                track.value = target;
                continue;
            }
            log::trace!(
                "slice {index}: scale {:.3} -> {target:.3} (generation {})",
                track.value,
                track.generation
            );
            self.transitions.push(Transition {
                index,
                generation: track.generation,
                from: track.value,
                to: target,
                elapsed: 0.0,
                spec: self.spec,
            });
        }
        retargeted
    }

    /// Advances every live transition by `dt` seconds.
    ///
    /// Returns `true` while at least one transition is still in flight, i.e. the
    /// host should schedule another frame.
    pub fn advance(&mut self, dt: f64) -> bool {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let tracks = &mut self.tracks;
        self.transitions.retain_mut(|transition| {
            let Some(track) = tracks.get_mut(transition.index) else {
                return false;
            };
            if track.generation != transition.generation {
                return false;
            }
            transition.elapsed += dt;
            let spec = transition.spec;
            let progress = if spec.is_immediate() {
                1.0
            } else {
                transition.elapsed / spec.duration
            };
            if progress >= 1.0 {
                track.value = transition.to;
                return false;
            }
            let eased = spec.easing.apply(progress);
            track.value = transition.from + (transition.to - transition.from) * eased;
            true
        });
        self.is_animating()
    }

    /// Whether any transition is still in flight.
    pub fn is_animating(&self) -> bool {
        !self.transitions.is_empty()
    }

    /// Number of tracks.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether there are no tracks.
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Returns the track at `index`.
    pub fn track(&self, index: usize) -> Option<&ScaleTrack> {
        self.tracks.get(index)
    }

    /// Current scale of the track at `index`, `1.0` if there is none.
    pub fn scale(&self, index: usize) -> f64 {
        self.tracks.get(index).map_or(1.0, ScaleTrack::value)
    }

    /// Copies out the current scale of every track, in track order.
    pub fn snapshot(&self) -> Vec<f64> {
        self.tracks.iter().map(ScaleTrack::value).collect()
    }
}
