// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interactive pie and donut charts.
//!
//! This crate is the renderer-agnostic core of a pie chart widget:
//! - **Geometry** allocates angles to weighted slices and hit-tests wedges.
//! - **Layout** sizes the pie so the selected slice's label and its enlargement
//!   always fit the canvas.
//! - **Animation** eases each slice's radial scale toward its selection state.
//! - **Rendering** produces an ordered [`DrawCommand`] list that a backend replays.
//!
//! [`PieChart`] bundles these behind a small stateful API meant to be driven
//! from a host frame loop: feed it slices and a selection, call
//! [`PieChart::advance`] and [`PieChart::render`] each frame, and route taps
//! through [`PieChart::click`].
//!
//! Text shaping is out of scope. Labels are measured through
//! [`TextMeasurer`] and text commands carry unshaped strings.
//!
//! ```
//! use kurbo::{Point, Size};
//! use peniko::color::palette::css;
//! use piechart::{HeuristicTextMeasurer, PieChart, PieSlice, PieStyle};
//!
//! let mut chart = PieChart::new(HeuristicTextMeasurer)
//!     .with_style(PieStyle::default().with_hollow(0.5));
//! chart.set_slices(vec![
//!     PieSlice::new("rent", 40.0, css::TOMATO),
//!     PieSlice::new("food", 20.0, css::GOLD),
//! ]);
//! chart.set_selected(Some("rent"));
//!
//! let canvas = Size::new(320.0, 240.0);
//! while chart.advance(1.0 / 60.0) {}
//! let commands = chart.render(canvas);
//! assert!(!commands.is_empty());
//! assert_eq!(chart.hit_test(Point::new(160.0, 120.0)), None, "the hole is not clickable");
//! ```

#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod animation;
mod chart;
#[cfg(not(feature = "std"))]
mod float;
mod format;
mod geometry;
mod layout;
mod measure;
mod render;
mod slice;
mod style;

pub use animation::{AnimationController, AnimationSpec, Easing, ScaleTrack};
pub use chart::{HitSlice, HitSnapshot, PieChart};
pub use format::format_percent;
pub use geometry::{
    PieGeometry, START_ANGLE, SliceGeometry, edge_point, hit_test, normalize_degrees,
};
pub use layout::{ChartLayout, plan_radius};
pub use measure::{LabelCache, label_size};
pub use render::{DrawCommand, LabelPlacement, LabelSide, render, wedge_path};
pub use slice::PieSlice;
pub use style::{ConnectorStyle, PieStyle};

pub use piechart_text::{
    FontFamily, FontStyle, FontWeight, HeuristicTextMeasurer, TextMeasurer, TextMetrics,
    TextStyle,
};
