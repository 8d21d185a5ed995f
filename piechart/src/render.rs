// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Draw list generation.
//!
//! [`render`] turns geometry, layout and the current animation scales into a flat,
//! ordered list of [`DrawCommand`]s. Backends (SVG, Vello, ...) replay the list
//! in order. Everything is drawn inside one isolated layer so that the final
//! [`DrawCommand::ClearCircle`] punches the donut hole through this chart's own
//! pixels only, never through whatever sits beneath the chart.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{BezPath, Circle, Point, Rect, Shape, Size, Stroke};
use peniko::Color;
use piechart_text::TextStyle;
use smallvec::SmallVec;

use crate::geometry::{PieGeometry, SliceGeometry};
use crate::layout::ChartLayout;
use crate::slice::PieSlice;
use crate::style::PieStyle;

/// Curve flattening tolerance when converting wedges to a `BezPath`.
const WEDGE_TOLERANCE: f64 = 0.1;

/// One drawing step.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// Start an isolated compositing layer clipped to `clip`.
    PushLayer {
        /// Layer bounds.
        clip: Rect,
    },
    /// End the layer opened by the matching [`DrawCommand::PushLayer`].
    PopLayer,
    /// Fill a circle.
    FillCircle {
        /// The circle.
        circle: Circle,
        /// Fill color.
        color: Color,
    },
    /// Fill a closed path.
    FillPath {
        /// The path.
        path: BezPath,
        /// Fill color.
        color: Color,
    },
    /// Stroke an open or closed path.
    StrokePath {
        /// The path.
        path: BezPath,
        /// Stroke geometry (width, caps, joins).
        stroke: Stroke,
        /// Stroke color.
        color: Color,
    },
    /// Draw a single line of text with its top-left corner at `origin`.
    Text {
        /// Text content (unshaped).
        text: String,
        /// Top-left corner of the text box.
        origin: Point,
        /// Measured size of the text box.
        size: Size,
        /// Font used when the text was measured.
        style: TextStyle,
        /// Text color.
        color: Color,
    },
    /// Erase everything drawn so far in the current layer within `circle`.
    ClearCircle {
        /// The erased region.
        circle: Circle,
    },
}

/// Builds the draw list for one frame.
///
/// `slices` is the caller's list that `geometry` was computed from and `scales`
/// holds each retained slice's current scale (in geometry order; missing
/// entries count as `1.0`).
pub fn render<K: PartialEq>(
    slices: &[PieSlice<K>],
    geometry: &PieGeometry,
    layout: &ChartLayout,
    scales: &[f64],
    selected: Option<&K>,
    style: &PieStyle,
) -> Vec<DrawCommand> {
    let mut out = Vec::with_capacity(geometry.slices.len() + 5);
    out.push(DrawCommand::PushLayer {
        clip: layout.bounds(),
    });

    if geometry.has_positive_total() {
        for (i, item) in geometry.slices.iter().enumerate() {
            let Some(slice) = slices.get(item.index) else {
                continue;
            };
            let scale = scales.get(i).copied().unwrap_or(1.0);
            out.push(DrawCommand::FillPath {
                path: wedge_path(layout.center, layout.radius * scale, item),
                color: slice.color,
            });

            if layout.has_labels && slice.is_selected_by(selected) {
                push_label(&mut out, item, layout, scale, style);
            }
        }
    } else {
        out.push(DrawCommand::FillCircle {
            circle: Circle::new(layout.center, layout.radius),
            color: style.background,
        });
    }

    let hole = layout.hole_radius(style.hollow);
    if hole > 0.0 {
        out.push(DrawCommand::ClearCircle {
            circle: Circle::new(layout.center, hole),
        });
    }

    out.push(DrawCommand::PopLayer);
    out
}

/// A centered-fan wedge: apex at `center`, outer arc at `radius`.
pub fn wedge_path(center: Point, radius: f64, item: &SliceGeometry) -> BezPath {
    Circle::new(center, radius)
        .segment(
            0.0,
            item.start_angle.to_radians(),
            item.sweep_angle.to_radians(),
        )
        .to_path(WEDGE_TOLERANCE)
}

/// Which side of the disc a label goes on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LabelSide {
    /// Label to the left of its edge point, text ending at the connector.
    Left,
    /// Label to the right of its edge point, text starting at the connector.
    Right,
}

/// Label box and connector for one selected slice.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelPlacement {
    /// Side of the disc.
    pub side: LabelSide,
    /// Where the connector meets the slice's outer edge.
    pub edge: Point,
    /// Top-left corner of the label text.
    pub origin: Point,
    /// Connector polyline: label end, edge point, inset point.
    pub connector: SmallVec<[Point; 3]>,
}

impl LabelPlacement {
    /// Places the label of `item` for a slice drawn at `scale`.
    ///
    /// Zero-value slices keep the base radius, since they have no visible wedge
    /// to follow outward.
    pub fn new(item: &SliceGeometry, layout: &ChartLayout, scale: f64, style: &PieStyle) -> Self {
        let radius = if item.value > 0.0 {
            layout.radius * scale
        } else {
            layout.radius
        };
        let connector = &style.connector;
        let edge = item.edge_point(radius, layout.center);
        let inset = item.edge_point(radius - connector.inset, layout.center);

        let side = if edge.x < layout.center.x {
            LabelSide::Left
        } else {
            LabelSide::Right
        };
        let (line_start_x, origin_x) = match side {
            LabelSide::Left => (
                edge.x - connector.horizontal_length,
                edge.x - item.label_size.width - connector.reach(),
            ),
            LabelSide::Right => (
                edge.x + connector.horizontal_length,
                edge.x + connector.reach(),
            ),
        };

        let mut points = SmallVec::new();
        points.push(Point::new(line_start_x, edge.y));
        points.push(edge);
        points.push(inset);

        Self {
            side,
            edge,
            origin: Point::new(origin_x, edge.y - item.label_size.height / 2.0),
            connector: points,
        }
    }

    /// The connector as an open path.
    pub fn connector_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let mut points = self.connector.iter().copied();
        if let Some(first) = points.next() {
            path.move_to(first);
            for p in points {
                path.line_to(p);
            }
        }
        path
    }
}

fn push_label(
    out: &mut Vec<DrawCommand>,
    item: &SliceGeometry,
    layout: &ChartLayout,
    scale: f64,
    style: &PieStyle,
) {
    let placement = LabelPlacement::new(item, layout, scale, style);
    if !item.label.is_empty() {
        out.push(DrawCommand::Text {
            text: item.label.clone(),
            origin: placement.origin,
            size: item.label_size,
            style: style.label.clone(),
            color: style.label_color,
        });
    }
    out.push(DrawCommand::StrokePath {
        path: placement.connector_path(),
        stroke: style.connector.stroke(),
        color: style.label_color,
    });
}

#[cfg(test)]
mod tests {
    extern crate std;

    use peniko::color::palette::css;

    use super::*;

    fn pie(values: &[f64]) -> (Vec<PieSlice<u32>>, PieGeometry) {
        let slices: Vec<_> = values
            .iter()
            .zip(1_u32..)
            .map(|(v, id)| PieSlice::new(id, *v, css::TOMATO))
            .collect();
        let geometry = PieGeometry::compute(&slices, |_| Size::new(30.0, 10.0));
        (slices, geometry)
    }

    fn layout_for(geometry: &PieGeometry, style: &PieStyle) -> ChartLayout {
        ChartLayout::plan(Size::new(400.0, 300.0), geometry, style).expect("fits")
    }

    fn count(cmds: &[DrawCommand], pred: impl Fn(&DrawCommand) -> bool) -> usize {
        cmds.iter().filter(|c| pred(c)).count()
    }

    #[test]
    fn draws_one_wedge_per_slice_inside_a_layer() {
        let (slices, geometry) = pie(&[1.0, 2.0, 3.0]);
        let style = PieStyle::default();
        let layout = layout_for(&geometry, &style);
        let cmds = render(&slices, &geometry, &layout, &[1.0; 3], None, &style);

        assert!(
            matches!(cmds.first(), Some(DrawCommand::PushLayer { .. })),
            "isolated layer first"
        );
        assert!(matches!(cmds.last(), Some(DrawCommand::PopLayer)), "layer closed last");
        assert_eq!(
            count(&cmds, |c| matches!(c, DrawCommand::FillPath { .. })),
            3,
            "one wedge each"
        );
        assert_eq!(
            count(&cmds, |c| matches!(c, DrawCommand::Text { .. })),
            0,
            "no selection, no label"
        );
        assert_eq!(
            count(&cmds, |c| matches!(c, DrawCommand::ClearCircle { .. })),
            0,
            "solid pie has no hole"
        );
    }

    #[test]
    fn empty_total_draws_background_disc_and_hole() {
        let (slices, geometry) = pie(&[0.0, 0.0]);
        let style = PieStyle::default().with_hollow(0.5);
        let layout = layout_for(&geometry, &style);
        let cmds = render(&slices, &geometry, &layout, &[1.0; 2], Some(&1), &style);

        assert_eq!(cmds.len(), 4, "layer, disc, hole, pop: {cmds:?}");
        assert_eq!(
            cmds[1],
            DrawCommand::FillCircle {
                circle: Circle::new(layout.center, layout.radius),
                color: style.background,
            },
            "background disc"
        );
        assert_eq!(
            cmds[2],
            DrawCommand::ClearCircle {
                circle: Circle::new(layout.center, layout.radius * 0.5),
            },
            "hole cut after the disc"
        );
    }

    #[test]
    fn selected_slice_gets_label_and_connector_on_its_side() {
        // First slice spans the right half, second the left half.
        let (slices, geometry) = pie(&[1.0, 1.0]);
        let style = PieStyle::default();
        let layout = layout_for(&geometry, &style);

        let right = render(&slices, &geometry, &layout, &[1.1, 1.0], Some(&1), &style);
        let Some(DrawCommand::Text { origin, text, .. }) =
            right.iter().find(|c| matches!(c, DrawCommand::Text { .. }))
        else {
            panic!("expected a label");
        };
        assert_eq!(text, "50.0%", "percent label");
        let edge_x = layout.center.x + layout.radius * 1.1;
        assert!(
            (origin.x - (edge_x + style.connector.reach())).abs() < 1e-9,
            "label starts past the connector on the right"
        );
        assert!(
            (origin.y - (layout.center.y - 5.0)).abs() < 1e-9,
            "vertically centered on the edge point"
        );

        let left = render(&slices, &geometry, &layout, &[1.0, 1.0], Some(&2), &style);
        let Some(DrawCommand::Text { origin, .. }) =
            left.iter().find(|c| matches!(c, DrawCommand::Text { .. }))
        else {
            panic!("expected a label");
        };
        let edge_x = layout.center.x - layout.radius;
        assert!(
            (origin.x - (edge_x - 30.0 - style.connector.reach())).abs() < 1e-9,
            "label ends before the connector on the left"
        );
    }

    #[test]
    fn connector_bends_at_the_edge_and_reaches_inward() {
        let (_, geometry) = pie(&[1.0, 1.0]);
        let style = PieStyle::default();
        let layout = layout_for(&geometry, &style);
        let placement = LabelPlacement::new(&geometry.slices[0], &layout, 1.0, &style);

        assert_eq!(placement.side, LabelSide::Right, "first half is on the right");
        assert_eq!(placement.connector.len(), 3, "three-point polyline");
        assert_eq!(placement.connector[1], placement.edge, "bends at the edge");
        let inward = placement.connector[2] - layout.center;
        assert!(
            (inward.hypot() - (layout.radius - style.connector.inset)).abs() < 1e-9,
            "last point sits inset on the same ray"
        );
        assert!(
            (placement.connector[0].x - placement.edge.x - style.connector.horizontal_length)
                .abs()
                < 1e-9,
            "horizontal run toward the label"
        );
    }

    #[test]
    fn zero_value_label_stays_on_base_radius() {
        let (_, geometry) = pie(&[0.0, 4.0]);
        let style = PieStyle::default();
        let layout = layout_for(&geometry, &style);
        let zero = &geometry.slices[0];
        let placement = LabelPlacement::new(zero, &layout, 1.1, &style);
        let distance = (placement.edge - layout.center).hypot();
        assert!(
            (distance - layout.radius).abs() < 1e-9,
            "scale is ignored for zero-value slices"
        );
    }

    #[test]
    fn wedge_radius_follows_scale() {
        let (slices, geometry) = pie(&[1.0]);
        let style = PieStyle::default();
        let layout = layout_for(&geometry, &style);
        let cmds = render(&slices, &geometry, &layout, &[1.1], None, &style);
        let Some(DrawCommand::FillPath { path, .. }) = cmds.get(1) else {
            panic!("expected the wedge");
        };
        let bounds = path.bounding_box();
        assert!(
            (bounds.width() - 2.0 * layout.radius * 1.1).abs() < 0.5,
            "full-circle wedge spans the scaled diameter"
        );
    }
}
