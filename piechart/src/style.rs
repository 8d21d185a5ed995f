// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chart styling and configuration.

use kurbo::{Cap, Join, Stroke};
use peniko::Color;
use peniko::color::palette::css;
use piechart_text::TextStyle;

use crate::animation::AnimationSpec;

/// Geometry of the bent line joining a label to its slice.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConnectorStyle {
    /// Gap between the end of the connector and the label text.
    pub spacing: f64,
    /// Length of the horizontal segment leading to the label.
    pub horizontal_length: f64,
    /// How far the connector reaches inward past the slice edge.
    pub inset: f64,
    /// Stroke width.
    pub width: f64,
}

impl ConnectorStyle {
    /// Horizontal room one label side needs next to the disc, excluding the label itself.
    pub fn reach(&self) -> f64 {
        self.spacing + self.horizontal_length
    }

    /// The stroke used to draw the connector: round caps and joins.
    pub fn stroke(&self) -> Stroke {
        Stroke::new(self.width)
            .with_caps(Cap::Round)
            .with_join(Join::Round)
    }

    fn sanitized(self) -> Self {
        Self {
            spacing: non_negative(self.spacing),
            horizontal_length: non_negative(self.horizontal_length),
            inset: non_negative(self.inset),
            width: non_negative(self.width),
        }
    }
}

impl Default for ConnectorStyle {
    fn default() -> Self {
        Self {
            spacing: 2.0,
            horizontal_length: 16.0,
            inset: 4.0,
            width: 1.0,
        }
    }
}

/// Everything about a pie chart that is not data.
#[derive(Clone, Debug, PartialEq)]
pub struct PieStyle {
    /// Radial enlargement of the selected slice.
    pub selected_scale: f64,
    /// Radius of the donut hole as a fraction of the pie radius, in `[0, 1]`.
    pub hollow: f64,
    /// Disc color drawn when no slice has a positive value.
    pub background: Color,
    /// Font used for slice labels.
    pub label: TextStyle,
    /// Color of label text and connector lines.
    pub label_color: Color,
    /// Connector line geometry.
    pub connector: ConnectorStyle,
    /// Selection animation timing.
    pub animation: AnimationSpec,
}

impl Default for PieStyle {
    fn default() -> Self {
        Self {
            selected_scale: 1.1,
            hollow: 0.0,
            background: Color::from_rgb8(0xcc, 0xcc, 0xcc),
            label: TextStyle::new(12.0),
            label_color: css::BLACK,
            connector: ConnectorStyle::default(),
            animation: AnimationSpec::default(),
        }
    }
}

impl PieStyle {
    /// Sets the selected scale. Non-finite or non-positive values fall back to `1.0`.
    pub fn with_selected_scale(mut self, selected_scale: f64) -> Self {
        self.selected_scale = sanitize_scale(selected_scale);
        self
    }

    /// Sets the donut hole fraction, clamped to `[0, 1]`.
    pub fn with_hollow(mut self, hollow: f64) -> Self {
        self.hollow = sanitize_hollow(hollow);
        self
    }

    /// Sets the empty-chart disc color.
    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    /// Sets the label font.
    pub fn with_label_style(mut self, label: TextStyle) -> Self {
        self.label = label;
        self
    }

    /// Sets the label and connector color.
    pub fn with_label_color(mut self, label_color: Color) -> Self {
        self.label_color = label_color;
        self
    }

    /// Sets the connector geometry. Negative lengths are clamped to zero.
    pub fn with_connector(mut self, connector: ConnectorStyle) -> Self {
        self.connector = connector.sanitized();
        self
    }

    /// Sets the selection animation timing.
    pub fn with_animation(mut self, animation: AnimationSpec) -> Self {
        self.animation = animation;
        self
    }

    /// Returns this style with every numeric field forced into its valid range.
    ///
    /// Fields assigned directly (bypassing the `with_*` setters) are sanitized
    /// when the style is handed to a chart.
    pub fn sanitized(self) -> Self {
        Self {
            selected_scale: sanitize_scale(self.selected_scale),
            hollow: sanitize_hollow(self.hollow),
            connector: self.connector.sanitized(),
            ..self
        }
    }
}

pub(crate) fn sanitize_scale(scale: f64) -> f64 {
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        1.0
    }
}

fn sanitize_hollow(hollow: f64) -> f64 {
    if hollow.is_finite() {
        hollow.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn non_negative(v: f64) -> f64 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}
