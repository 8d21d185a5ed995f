// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Parley-backed label measurement.
//!
//! Pie labels are single short lines (`"25.0%"`, a category name) whose box
//! decides how much of the canvas the pie may use. [`ParleyTextMeasurer`]
//! shapes each label with Parley, so the label bands a chart reserves match
//! what a Parley-based renderer draws into them.

#![no_std]

extern crate alloc;

use alloc::borrow::Cow;
use core::cell::RefCell;

use parley::style::{FontFamily as ParleyFontFamily, FontStack, GenericFamily, StyleProperty};
use parley::{
    Alignment, AlignmentOptions, FontContext, FontStyle as ParleyFontStyle, FontWeight,
    LayoutContext,
};
use piechart_text::{FontFamily, FontStyle, TextMeasurer, TextMetrics, TextStyle};

/// Measures pie labels by shaping them with Parley.
///
/// Contexts are kept behind `RefCell`s so measurement can go through `&self`;
/// the measurer lives on the UI thread next to the chart it serves.
pub struct ParleyTextMeasurer {
    font_cx: RefCell<FontContext>,
    layout_cx: RefCell<LayoutContext<()>>,
    display_scale: f32,
    quantize: bool,
}

impl core::fmt::Debug for ParleyTextMeasurer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ParleyTextMeasurer")
            .field("display_scale", &self.display_scale)
            .field("quantize", &self.quantize)
            .finish_non_exhaustive()
    }
}

impl Default for ParleyTextMeasurer {
    fn default() -> Self {
        Self::new()
    }
}

impl ParleyTextMeasurer {
    /// Creates a measurer over the system fonts.
    #[must_use]
    pub fn new() -> Self {
        Self::with_font_context(FontContext::new())
    }

    /// Creates a measurer that resolves label fonts through `font_cx`.
    ///
    /// Use this when the renderer registers its own fonts, so labels are
    /// measured with the faces they are drawn with.
    #[must_use]
    pub fn with_font_context(font_cx: FontContext) -> Self {
        Self {
            font_cx: RefCell::new(font_cx),
            layout_cx: RefCell::new(LayoutContext::new()),
            display_scale: 1.0,
            quantize: true,
        }
    }

    /// Shapes at `display_scale` device pixels per logical pixel.
    ///
    /// Metrics are still reported in logical pixels.
    #[must_use]
    pub fn with_display_scale(mut self, display_scale: f32) -> Self {
        self.display_scale = display_scale.max(0.0);
        self
    }

    /// Sets whether glyph positions snap to device pixels while shaping.
    #[must_use]
    pub fn with_quantize(mut self, quantize: bool) -> Self {
        self.quantize = quantize;
        self
    }
}

impl TextMeasurer for ParleyTextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        // Labels are single-line; anything after a newline is not drawn.
        let label = text.split('\n').next().unwrap_or("");
        if label.is_empty() {
            return TextMetrics::ZERO;
        }

        let scale = self.display_scale.max(1.0e-6);
        let mut font_cx = self.font_cx.borrow_mut();
        let mut layout_cx = self.layout_cx.borrow_mut();

        let mut builder = layout_cx.ranged_builder(&mut font_cx, label, scale, self.quantize);
        for property in label_properties(style) {
            builder.push_default(property);
        }
        let mut layout: parley::Layout<()> = builder.build(label);
        layout.break_all_lines(None);
        layout.align(None, Alignment::Start, AlignmentOptions::default());

        let Some(line) = layout.lines().next() else {
            return TextMetrics::ZERO;
        };
        let m = line.metrics();
        let to_logical = |v: f32| f64::from(v) / f64::from(scale);
        TextMetrics {
            advance_width: to_logical(m.advance),
            ascent: to_logical(m.ascent),
            descent: to_logical(m.descent),
            leading: to_logical(m.leading),
        }
        .sanitized()
    }
}

/// Parley style properties for a label drawn in `style`.
fn label_properties(style: &TextStyle) -> [StyleProperty<'_, ()>; 4] {
    let family = match &style.font_family {
        FontFamily::Serif => ParleyFontFamily::Generic(GenericFamily::Serif),
        FontFamily::SansSerif => ParleyFontFamily::Generic(GenericFamily::SansSerif),
        FontFamily::Monospace => ParleyFontFamily::Generic(GenericFamily::Monospace),
        FontFamily::Named(name) => ParleyFontFamily::Named(Cow::Borrowed(name.as_ref())),
    };
    let font_style = match style.font_style {
        FontStyle::Normal => ParleyFontStyle::Normal,
        FontStyle::Italic => ParleyFontStyle::Italic,
        FontStyle::Oblique => ParleyFontStyle::Oblique(None),
    };
    [
        StyleProperty::FontSize(label_font_size(style.font_size)),
        StyleProperty::FontStack(FontStack::from(family)),
        StyleProperty::FontStyle(font_style),
        StyleProperty::FontWeight(FontWeight::new(f32::from(style.font_weight.0))),
    ]
}

/// Label font size as Parley's `f32`. Unusable sizes shape nothing.
fn label_font_size(font_size: f64) -> f32 {
    if !font_size.is_finite() || font_size <= 0.0 {
        return 0.0;
    }
    if font_size >= f64::from(f32::MAX) {
        return f32::MAX;
    }
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Value is clamped to f32::MAX above"
    )]
    {
        font_size as f32
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn percent_label_has_extent() {
        let m = ParleyTextMeasurer::new();
        let metrics = m.measure("25.0%", &TextStyle::new(12.0));
        assert!(metrics.advance_width > 0.0, "label should have width");
        assert!(metrics.line_height() > 0.0, "label should have height");
    }

    #[test]
    fn empty_label_is_zero_size() {
        let m = ParleyTextMeasurer::new();
        assert_eq!(
            m.measure("", &TextStyle::new(12.0)),
            TextMetrics::ZERO,
            "empty label contributes nothing to layout"
        );
    }

    #[test]
    fn only_the_first_line_of_a_label_is_measured() {
        let m = ParleyTextMeasurer::new();
        let style = TextStyle::new(12.0);
        assert_eq!(
            m.measure("Rent\nand utilities", &style),
            m.measure("Rent", &style),
            "second line is ignored"
        );
    }

    #[test]
    fn display_scale_reports_logical_pixels() {
        let style = TextStyle::new(12.0);
        let base = ParleyTextMeasurer::new()
            .with_quantize(false)
            .measure("33.3%", &style);
        let hidpi = ParleyTextMeasurer::new()
            .with_display_scale(2.0)
            .with_quantize(false)
            .measure("33.3%", &style);
        assert!(
            (base.advance_width - hidpi.advance_width).abs() < 1.0,
            "same logical width: {} vs {}",
            base.advance_width,
            hidpi.advance_width
        );
    }

    #[test]
    fn unusable_font_sizes_are_clamped() {
        assert_eq!(label_font_size(f64::NAN), 0.0, "NaN shapes nothing");
        assert_eq!(label_font_size(-3.0), 0.0, "negative shapes nothing");
        assert_eq!(label_font_size(f64::MAX), f32::MAX, "huge clamps to f32::MAX");
        assert_eq!(label_font_size(12.0), 12.0, "normal sizes pass through");
    }
}
