// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Radius planning for a pie with external labels.
//!
//! Only the selected slice shows its label, but the selection can move on any
//! frame. The planner therefore reserves room for the widest and the tallest
//! label on both sides of the disc at once, and leaves headroom for the
//! selected slice's enlargement, so nothing clips whichever slice is picked.

use kurbo::{Point, Rect, Size};

use crate::geometry::PieGeometry;
use crate::style::{PieStyle, sanitize_scale};

/// Largest pie radius that fits `canvas` with label bands reserved around it.
///
/// With labels (both `max_label` extents positive), the horizontal band on each
/// side is `max_label.width + connector_spacing + connector_horizontal_length`
/// and the vertical band on each side is `max_label.height`. The fitted radius
/// is then divided by `selected_scale`.
///
/// Returns `None` when the space left for the disc is empty; the frame should
/// then be skipped rather than drawn clipped.
pub fn plan_radius(
    canvas: Size,
    max_label: Size,
    connector_spacing: f64,
    connector_horizontal_length: f64,
    selected_scale: f64,
) -> Option<f64> {
    let has_labels = max_label.width > 0.0 && max_label.height > 0.0;
    let (safe_width, safe_height) = if has_labels {
        (
            canvas.width - 2.0 * (max_label.width + connector_spacing + connector_horizontal_length),
            canvas.height - 2.0 * max_label.height,
        )
    } else {
        (canvas.width, canvas.height)
    };

    if !(safe_width.is_finite() && safe_height.is_finite()) {
        return None;
    }
    if safe_width <= 0.0 || safe_height <= 0.0 {
        return None;
    }
    Some(safe_width.min(safe_height) / 2.0 / sanitize_scale(selected_scale))
}

/// Where the pie sits on the canvas for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChartLayout {
    /// Canvas size the layout was planned for.
    pub canvas: Size,
    /// Pie center (the canvas center).
    pub center: Point,
    /// Unscaled pie radius.
    pub radius: f64,
    /// Whether label bands were reserved (and labels may be drawn).
    pub has_labels: bool,
}

impl ChartLayout {
    /// Plans the layout of `geometry` on `canvas`, or `None` if the frame must be skipped.
    pub fn plan(canvas: Size, geometry: &PieGeometry, style: &PieStyle) -> Option<Self> {
        let Some(radius) = plan_radius(
            canvas,
            geometry.max_label,
            style.connector.spacing,
            style.connector.horizontal_length,
            style.selected_scale,
        ) else {
            log::debug!(
                "skipping pie frame: canvas {}x{} cannot fit labels of {}x{}",
                canvas.width,
                canvas.height,
                geometry.max_label.width,
                geometry.max_label.height
            );
            return None;
        };
        Some(Self {
            canvas,
            center: canvas.to_rect().center(),
            radius,
            has_labels: geometry.has_labels(),
        })
    }

    /// Canvas bounds, used as the clip of the chart's compositing layer.
    pub fn bounds(&self) -> Rect {
        self.canvas.to_rect()
    }

    /// Radius of the donut hole for `hollow` in `[0, 1]`.
    pub fn hole_radius(&self, hollow: f64) -> f64 {
        self.radius * hollow
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn without_labels_uses_the_whole_canvas() {
        let r = plan_radius(Size::new(200.0, 100.0), Size::ZERO, 2.0, 16.0, 1.0);
        assert_eq!(r, Some(50.0), "half the short side");
        let r = plan_radius(Size::new(200.0, 100.0), Size::ZERO, 2.0, 16.0, 1.25);
        assert_eq!(r, Some(40.0), "headroom for the selected scale");
    }

    #[test]
    fn labels_reserve_bands_on_both_axes() {
        // Width: 300 - 2 * (40 + 2 + 16) = 184. Height: 300 - 2 * 12 = 276.
        let r = plan_radius(Size::new(300.0, 300.0), Size::new(40.0, 12.0), 2.0, 16.0, 1.0);
        assert_eq!(r, Some(92.0), "limited by the horizontal bands");
    }

    #[test]
    fn label_wider_than_canvas_skips_the_frame() {
        let r = plan_radius(Size::new(100.0, 400.0), Size::new(40.0, 12.0), 2.0, 16.0, 1.1);
        assert_eq!(r, None, "100 - 2 * 58 is negative");
        let r = plan_radius(Size::new(400.0, 24.0), Size::new(40.0, 12.0), 2.0, 16.0, 1.1);
        assert_eq!(r, None, "vertical bands consume the height exactly");
        let r = plan_radius(Size::ZERO, Size::ZERO, 2.0, 16.0, 1.1);
        assert_eq!(r, None, "empty canvas");
    }

    #[test]
    fn half_empty_label_box_reserves_nothing() {
        let r = plan_radius(Size::new(100.0, 100.0), Size::new(0.0, 12.0), 2.0, 16.0, 1.0);
        assert_eq!(r, Some(50.0), "zero-width labels count as no labels");
    }

    #[test]
    fn invalid_scale_falls_back_to_one() {
        let r = plan_radius(Size::new(100.0, 100.0), Size::ZERO, 0.0, 0.0, 0.0);
        assert_eq!(r, Some(50.0), "zero scale treated as 1");
    }

    #[test]
    fn plan_centers_on_canvas() {
        let geometry = PieGeometry::default();
        let layout = ChartLayout::plan(Size::new(80.0, 60.0), &geometry, &PieStyle::default());
        let layout = layout.expect("fits");
        assert_eq!(layout.center, Point::new(40.0, 30.0), "canvas center");
        assert!(!layout.has_labels, "no slices, no labels");
        assert!(layout.radius > 0.0, "positive radius");
        assert_eq!(layout.hole_radius(0.5), layout.radius / 2.0, "hole fraction");
    }
}
