// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Slice angle allocation, hit-testing and edge points.
//!
//! Angles are in degrees, measured clockwise in y-down screen space from the
//! positive x axis. The first slice starts at [`START_ANGLE`] (12 o'clock) and
//! slices follow each other in input order without gaps.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Point, Size, Vec2};

use crate::format::format_percent;
use crate::slice::PieSlice;

/// Start angle of the first slice: straight up.
pub const START_ANGLE: f64 = -90.0;

/// Derived layout of one retained slice.
#[derive(Clone, Debug, PartialEq)]
pub struct SliceGeometry {
    /// Index of the source slice in the caller's list.
    pub index: usize,
    /// The source slice's value.
    pub value: f64,
    /// Start angle in degrees.
    pub start_angle: f64,
    /// Sweep in degrees, `0` when the total is not positive.
    pub sweep_angle: f64,
    /// Explicit label, or the share of the total such as `"25.0%"`.
    pub label: String,
    /// Measured label box in whole pixels.
    pub label_size: Size,
}

impl SliceGeometry {
    /// End angle in degrees.
    pub fn end_angle(&self) -> f64 {
        self.start_angle + self.sweep_angle
    }

    /// Point on the slice's middle ray at `radius` from `center`.
    pub fn edge_point(&self, radius: f64, center: Point) -> Point {
        edge_point(self.start_angle, self.end_angle(), radius, center)
    }

    /// Whether `point` falls inside this slice drawn at `radius` around `center`.
    pub fn contains(&self, point: Point, center: Point, radius: f64) -> bool {
        hit_test(point, center, radius, self.start_angle, self.sweep_angle)
    }
}

/// Angles and label sizes for a whole slice list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PieGeometry {
    /// Denominator used for every slice's share.
    pub total: f64,
    /// Retained slices in input order.
    pub slices: Vec<SliceGeometry>,
    /// Largest label width and largest label height over all retained slices.
    pub max_label: Size,
}

impl PieGeometry {
    /// Allocates angles to `slices`.
    ///
    /// The total is the sum of all positive values. `measure_label` returns the
    /// size of a label string.
    pub fn compute<K>(slices: &[PieSlice<K>], measure_label: impl FnMut(&str) -> Size) -> Self {
        Self::compute_with_total(slices, None, measure_label)
    }

    /// Like [`PieGeometry::compute`], but divides by `total_override` when one is given.
    ///
    /// A total larger than the sum of values leaves part of the circle empty.
    /// Shares are clamped to `[0, 1]`, so a smaller one never yields a sweep past
    /// 360° for a single slice.
    pub fn compute_with_total<K>(
        slices: &[PieSlice<K>],
        total_override: Option<f64>,
        mut measure_label: impl FnMut(&str) -> Size,
    ) -> Self {
        let total = match total_override {
            Some(total) if total.is_finite() => total,
            _ => slices
                .iter()
                .filter(|s| s.is_retained() && s.value > 0.0)
                .map(|s| s.value)
                .sum(),
        };

        let mut out = Vec::with_capacity(slices.len());
        let mut max_label = Size::ZERO;
        let mut start_angle = START_ANGLE;

        for (index, slice) in slices.iter().enumerate() {
            if !slice.is_retained() {
                continue;
            }
            let percent = if total > 0.0 {
                (slice.value / total).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let sweep_angle = percent * 360.0;

            let label = slice
                .label
                .clone()
                .unwrap_or_else(|| format_percent(percent));
            let label_size = measure_label(&label);
            max_label.width = max_label.width.max(label_size.width);
            max_label.height = max_label.height.max(label_size.height);

            out.push(SliceGeometry {
                index,
                value: slice.value,
                start_angle,
                sweep_angle,
                label,
                label_size,
            });
            start_angle += sweep_angle;
        }

        log::trace!(
            "pie geometry: {} of {} slices retained, total {total}",
            out.len(),
            slices.len()
        );

        Self {
            total,
            slices: out,
            max_label,
        }
    }

    /// Whether any slice has a positive share; otherwise only the background disc is drawn.
    pub fn has_positive_total(&self) -> bool {
        self.total > 0.0
    }

    /// Whether labels take up room: both the widest and the tallest label are non-empty.
    pub fn has_labels(&self) -> bool {
        self.max_label.width > 0.0 && self.max_label.height > 0.0
    }

    /// Sum of all sweeps in degrees.
    pub fn total_sweep(&self) -> f64 {
        self.slices.iter().map(|s| s.sweep_angle).sum()
    }
}

/// Wraps `degrees` into `[0, 360)`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees % 360.0;
    let wrapped = if wrapped < 0.0 {
        wrapped + 360.0
    } else {
        wrapped
    };
    // `-1e-15 + 360.0` rounds to exactly 360.
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Whether `point` lies inside the wedge of `radius` around `center` spanning
/// `sweep_angle` degrees from `start_angle`.
///
/// Points beyond `radius` never hit. A sweep of zero (or less) never hits; a
/// sweep of 360° or more hits everywhere inside the radius. Otherwise the
/// wedge may straddle the 0°/360° seam.
pub fn hit_test(
    point: Point,
    center: Point,
    radius: f64,
    start_angle: f64,
    sweep_angle: f64,
) -> bool {
    let delta = point - center;
    if delta.hypot() > radius {
        return false;
    }
    if sweep_angle.is_nan() || sweep_angle <= 0.0 {
        return false;
    }
    if sweep_angle >= 360.0 {
        return true;
    }

    let angle = normalize_degrees(delta.atan2().to_degrees());
    let start = normalize_degrees(start_angle);
    let end = normalize_degrees(start_angle + sweep_angle);

    if start <= end {
        (start..=end).contains(&angle)
    } else {
        angle >= start || angle <= end
    }
}

/// Point at the angular midpoint of `[start_angle, end_angle]`, `radius` away from `center`.
///
/// Used both as the label anchor and as the bend of the connector line.
pub fn edge_point(start_angle: f64, end_angle: f64, radius: f64, center: Point) -> Point {
    let mid = normalize_degrees(0.5 * (start_angle + end_angle)).to_radians();
    center + Vec2::from_angle(mid) * radius
}
