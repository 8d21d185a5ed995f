// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The stateful chart instance.
//!
//! [`PieChart`] ties the pieces together for a host UI loop:
//! - geometry is rebuilt only when the slice list (compared structurally) or the
//!   label style changes, and layout only when geometry, style or canvas size do;
//! - selection changes retarget the per-slice scale animation;
//! - each [`PieChart::render`] commits a [`HitSnapshot`] of exactly what was
//!   drawn, and pointer input is resolved against that snapshot only.

extern crate alloc;

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Point, Size};
use piechart_text::TextMeasurer;

use crate::animation::AnimationController;
use crate::geometry::{PieGeometry, hit_test};
use crate::layout::ChartLayout;
use crate::measure::LabelCache;
use crate::render::{DrawCommand, render};
use crate::slice::PieSlice;
use crate::style::{PieStyle, sanitize_scale};

type ClickHandler<K> = Box<dyn FnMut(&PieSlice<K>)>;

/// One hit-testable wedge as it was last drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitSlice {
    /// Index of the source slice.
    pub index: usize,
    /// Start angle in degrees.
    pub start_angle: f64,
    /// Sweep in degrees.
    pub sweep_angle: f64,
    /// Radius the wedge was drawn at (base radius times its scale).
    pub radius: f64,
}

/// Everything pointer hit-testing needs, frozen at the end of a render pass.
#[derive(Clone, Debug, PartialEq)]
pub struct HitSnapshot {
    /// Pie center.
    pub center: Point,
    /// Radius of the donut hole; taps inside it hit nothing.
    pub hole_radius: f64,
    /// Wedges in draw order.
    pub slices: Vec<HitSlice>,
}

impl HitSnapshot {
    /// Source index of the first wedge containing `point`.
    pub fn hit(&self, point: Point) -> Option<usize> {
        if (point - self.center).hypot() < self.hole_radius {
            return None;
        }
        self.slices
            .iter()
            .find(|s| hit_test(point, self.center, s.radius, s.start_angle, s.sweep_angle))
            .map(|s| s.index)
    }
}

/// An interactive pie/donut chart.
///
/// The caller owns selection: it feeds the selected id in through
/// [`PieChart::set_selected`] and typically updates it from the click handler.
pub struct PieChart<K, M> {
    measurer: M,
    style: PieStyle,
    slices: Vec<PieSlice<K>>,
    selected: Option<K>,
    labels: LabelCache,
    geometry: PieGeometry,
    animation: AnimationController,
    layout: Option<(Size, Option<ChartLayout>)>,
    snapshot: Option<HitSnapshot>,
    on_click: Option<ClickHandler<K>>,
}

impl<K: fmt::Debug, M: fmt::Debug> fmt::Debug for PieChart<K, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PieChart")
            .field("measurer", &self.measurer)
            .field("style", &self.style)
            .field("slices", &self.slices)
            .field("selected", &self.selected)
            .field("geometry", &self.geometry)
            .field("animation", &self.animation)
            .field("snapshot", &self.snapshot)
            .finish_non_exhaustive()
    }
}

impl<K: PartialEq, M: TextMeasurer> PieChart<K, M> {
    /// Creates an empty chart with the default style.
    pub fn new(measurer: M) -> Self {
        let style = PieStyle::default();
        Self {
            measurer,
            labels: LabelCache::new(style.label.clone()),
            animation: AnimationController::new(style.animation),
            style,
            slices: Vec::new(),
            selected: None,
            geometry: PieGeometry::default(),
            layout: None,
            snapshot: None,
            on_click: None,
        }
    }

    /// Sets the style (builder form of [`PieChart::set_style`]).
    pub fn with_style(mut self, style: PieStyle) -> Self {
        self.set_style(style);
        self
    }

    /// Sets the click handler (builder form of [`PieChart::on_click_slice`]).
    pub fn with_on_click(mut self, handler: impl FnMut(&PieSlice<K>) + 'static) -> Self {
        self.on_click_slice(handler);
        self
    }

    /// The current style.
    pub fn style(&self) -> &PieStyle {
        &self.style
    }

    /// Replaces the style.
    ///
    /// A new label font re-measures labels; animations keep running and are
    /// retargeted if the selected scale changed.
    pub fn set_style(&mut self, style: PieStyle) {
        let style = style.sanitized();
        if style == self.style {
            return;
        }
        let relabel = self.labels.set_style(&style.label);
        self.animation.set_spec(style.animation);
        self.style = style;
        if relabel {
            self.rebuild_geometry();
        }
        self.layout = None;
        self.retarget();
    }

    /// Sets the radial enlargement of the selected slice.
    pub fn set_selected_scale(&mut self, selected_scale: f64) {
        let selected_scale = sanitize_scale(selected_scale);
        if selected_scale == self.style.selected_scale {
            return;
        }
        self.style.selected_scale = selected_scale;
        self.layout = None;
        self.retarget();
    }

    /// The slices as last supplied.
    pub fn slices(&self) -> &[PieSlice<K>] {
        &self.slices
    }

    /// Replaces the slice list.
    ///
    /// A list equal to the current one is ignored. Any other list rebuilds
    /// geometry, restarts every slice at rest, and makes taps inert until the
    /// next render.
    pub fn set_slices(&mut self, slices: Vec<PieSlice<K>>) {
        if slices == self.slices {
            return;
        }
        self.slices = slices;
        self.rebuild_geometry();
        self.animation.reset(self.geometry.slices.len());
        self.retarget();
    }

    /// The selected id, if any.
    pub fn selected(&self) -> Option<&K> {
        self.selected.as_ref()
    }

    /// Changes the selection. Every slice whose id equals `selected` animates
    /// toward the selected scale; all others relax back to `1.0`.
    pub fn set_selected(&mut self, selected: Option<K>) {
        if selected == self.selected {
            return;
        }
        self.selected = selected;
        self.retarget();
    }

    /// Registers the handler invoked with the tapped slice.
    pub fn on_click_slice(&mut self, handler: impl FnMut(&PieSlice<K>) + 'static) {
        self.on_click = Some(Box::new(handler));
    }

    /// Removes the click handler.
    pub fn clear_on_click(&mut self) {
        self.on_click = None;
    }

    /// Current geometry.
    pub fn geometry(&self) -> &PieGeometry {
        &self.geometry
    }

    /// The animation state.
    pub fn animation(&self) -> &AnimationController {
        &self.animation
    }

    /// The snapshot committed by the last render, `None` if nothing was drawn.
    pub fn snapshot(&self) -> Option<&HitSnapshot> {
        self.snapshot.as_ref()
    }

    /// Layout for `canvas`, computed on demand and cached until something changes.
    pub fn layout(&mut self, canvas: Size) -> Option<ChartLayout> {
        if let Some((size, layout)) = self.layout
            && size == canvas
        {
            return layout;
        }
        let layout = ChartLayout::plan(canvas, &self.geometry, &self.style);
        self.layout = Some((canvas, layout));
        layout
    }

    /// Steps animations by `dt` seconds. Returns `true` while another frame is needed.
    pub fn advance(&mut self, dt: f64) -> bool {
        self.animation.advance(dt)
    }

    /// Whether any slice is still animating.
    pub fn is_animating(&self) -> bool {
        self.animation.is_animating()
    }

    /// Draws the chart onto a canvas of `canvas` size (origin at the top-left).
    ///
    /// Returns an empty list, and clears the hit snapshot, when labels cannot fit.
    pub fn render(&mut self, canvas: Size) -> Vec<DrawCommand> {
        let Some(layout) = self.layout(canvas) else {
            self.snapshot = None;
            return Vec::new();
        };
        let scales = self.animation.snapshot();
        let commands = render(
            &self.slices,
            &self.geometry,
            &layout,
            &scales,
            self.selected.as_ref(),
            &self.style,
        );

        let slices = self
            .geometry
            .slices
            .iter()
            .zip(&scales)
            .map(|(item, scale)| HitSlice {
                index: item.index,
                start_angle: item.start_angle,
                sweep_angle: item.sweep_angle,
                radius: layout.radius * scale,
            })
            .collect();
        self.snapshot = Some(HitSnapshot {
            center: layout.center,
            hole_radius: layout.hole_radius(self.style.hollow),
            slices,
        });
        commands
    }

    /// The slice under `point` in the last rendered frame, as an index into [`PieChart::slices`].
    pub fn hit_test(&self, point: Point) -> Option<usize> {
        self.snapshot.as_ref()?.hit(point)
    }

    /// Dispatches a tap at `point`: invokes the click handler with the tapped slice.
    ///
    /// Returns `true` if a slice was hit.
    pub fn click(&mut self, point: Point) -> bool {
        let Some(index) = self.hit_test(point) else {
            return false;
        };
        let Some(slice) = self.slices.get(index) else {
            return false;
        };
        if let Some(handler) = self.on_click.as_mut() {
            handler(slice);
        }
        true
    }

    fn rebuild_geometry(&mut self) {
        let labels = &mut self.labels;
        let measurer = &self.measurer;
        self.geometry = PieGeometry::compute(&self.slices, |text| labels.measure(measurer, text));
        // Only labels of the current slices stay cached.
        let geometry = &self.geometry;
        self.labels
            .retain(|text| geometry.slices.iter().any(|item| item.label == text));
        self.layout = None;
        self.snapshot = None;
    }

    fn retarget(&mut self) {
        let selected = self.selected.as_ref();
        let selected_scale = self.style.selected_scale;
        let slices = &self.slices;
        let geometry = &self.geometry;
        self.animation.retarget(|i| {
            let chosen = geometry
                .slices
                .get(i)
                .and_then(|item| slices.get(item.index))
                .is_some_and(|slice| slice.is_selected_by(selected));
            if chosen { selected_scale } else { 1.0 }
        });
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::rc::Rc;
    use core::cell::RefCell;
    use std::vec;

    use kurbo::Vec2;
    use peniko::color::palette::css;
    use piechart_text::{TextMetrics, TextStyle};

    use super::*;
    use crate::animation::{AnimationSpec, Easing};

    /// Every label measures 30x10.
    #[derive(Debug)]
    struct FixedMeasurer;

    impl TextMeasurer for FixedMeasurer {
        fn measure(&self, text: &str, _style: &TextStyle) -> TextMetrics {
            if text.is_empty() {
                return TextMetrics::ZERO;
            }
            TextMetrics {
                advance_width: 30.0,
                ascent: 8.0,
                descent: 2.0,
                leading: 0.0,
            }
        }
    }

    const CANVAS: Size = Size::new(400.0, 300.0);

    fn four_quarters() -> Vec<PieSlice<u32>> {
        vec![
            PieSlice::new(1, 10.0, css::RED),
            PieSlice::new(2, 10.0, css::GREEN),
            PieSlice::new(3, 10.0, css::BLUE),
            PieSlice::new(4, 10.0, css::CYAN),
        ]
    }

    fn chart() -> PieChart<u32, FixedMeasurer> {
        let style = PieStyle::default().with_animation(AnimationSpec::new(0.2, Easing::Linear));
        let mut chart = PieChart::new(FixedMeasurer).with_style(style);
        chart.set_slices(four_quarters());
        chart
    }

    /// A point inside the slice whose middle ray is at `deg`.
    fn at(chart: &mut PieChart<u32, FixedMeasurer>, deg: f64, fraction: f64) -> Point {
        let layout = chart.layout(CANVAS).expect("fits");
        layout.center + Vec2::from_angle(deg.to_radians()) * layout.radius * fraction
    }

    #[test]
    fn clicks_report_the_tapped_slice() {
        let clicked = Rc::new(RefCell::new(Vec::new()));
        let sink = clicked.clone();
        let mut chart = chart().with_on_click(move |s| sink.borrow_mut().push(s.id));
        chart.render(CANVAS);

        // Quarter one spans 12 to 3 o'clock, quarter three 6 to 9 o'clock.
        let p1 = at(&mut chart, -45.0, 0.5);
        let p3 = at(&mut chart, 135.0, 0.5);
        assert!(chart.click(p1), "hit the first quarter");
        assert!(chart.click(p3), "hit the third quarter");
        assert!(!chart.click(Point::new(0.0, 0.0)), "canvas corner misses");
        assert_eq!(*clicked.borrow(), [1, 3], "handler saw both hits in order");
    }

    #[test]
    fn taps_are_inert_before_the_first_render() {
        let mut chart = chart();
        let p = at(&mut chart, -45.0, 0.5);
        assert_eq!(chart.hit_test(p), None, "nothing committed yet");
        chart.render(CANVAS);
        assert_eq!(chart.hit_test(p), Some(0), "committed after render");
    }

    #[test]
    fn selection_animates_outward_and_back() {
        let mut chart = chart();
        chart.set_selected(Some(2));
        assert!(chart.is_animating(), "selection starts a transition");
        while chart.advance(1.0 / 60.0) {}
        assert_eq!(chart.animation().snapshot(), [1.0, 1.1, 1.0, 1.0], "only slice 2 grows");

        chart.set_selected(None);
        chart.advance(0.1);
        let mid = chart.animation().scale(1);
        assert!(mid > 1.0 && mid < 1.1, "relaxing back smoothly, got {mid}");
        while chart.advance(1.0 / 60.0) {}
        assert_eq!(chart.animation().scale(1), 1.0, "back at rest");
    }

    #[test]
    fn unknown_selection_leaves_everything_at_rest() {
        let mut chart = chart();
        chart.set_selected(Some(42));
        assert!(!chart.is_animating(), "nothing matched");
        assert_eq!(chart.animation().snapshot(), [1.0; 4], "all at rest");
    }

    #[test]
    fn duplicate_ids_all_animate() {
        let mut chart = chart();
        let mut slices = four_quarters();
        slices[3].id = 2;
        chart.set_slices(slices);
        chart.set_selected(Some(2));
        while chart.advance(0.05) {}
        assert_eq!(chart.animation().snapshot(), [1.0, 1.1, 1.0, 1.1], "both id-2 slices");
    }

    #[test]
    fn equal_slice_list_keeps_animation_state() {
        let mut chart = chart();
        chart.set_selected(Some(1));
        chart.advance(0.1);
        let before = chart.animation().scale(0);
        chart.set_slices(four_quarters());
        assert_eq!(chart.animation().scale(0), before, "same list, no reset");

        let mut changed = four_quarters();
        changed[0].value = 20.0;
        chart.set_slices(changed);
        assert_eq!(chart.animation().scale(0), 1.0, "new list restarts at rest");
        assert!(chart.is_animating(), "and heads for the selection again");
    }

    #[test]
    fn scaled_slice_is_hit_beyond_the_base_radius() {
        let mut chart = chart();
        chart.set_selected(Some(1));
        while chart.advance(0.05) {}
        chart.render(CANVAS);

        let outside_base = at(&mut chart, -45.0, 1.05);
        assert_eq!(chart.hit_test(outside_base), Some(0), "enlarged wedge reaches further");
        let neighbour = at(&mut chart, 45.0, 1.05);
        assert_eq!(chart.hit_test(neighbour), None, "resting neighbour does not");
    }

    #[test]
    fn donut_hole_is_not_clickable() {
        let mut chart = chart();
        chart.set_style(chart.style().clone().with_hollow(0.5));
        chart.render(CANVAS);
        let layout = chart.layout(CANVAS).expect("fits");
        let in_hole = at(&mut chart, -45.0, 0.4);
        let on_ring = at(&mut chart, -45.0, 0.75);
        assert_eq!(chart.hit_test(layout.center), None, "center is inside the hole");
        assert_eq!(chart.hit_test(in_hole), None, "anywhere inside the hole");
        assert_eq!(chart.hit_test(on_ring), Some(0), "ring still hits");
    }

    #[test]
    fn solid_pie_center_resolves_along_the_zero_degree_ray() {
        let mut chart = chart();
        chart.render(CANVAS);
        let layout = chart.layout(CANVAS).expect("fits");
        // The first quarter ends exactly at 0 degrees, inclusive.
        assert_eq!(chart.hit_test(layout.center), Some(0), "first wedge touching 0 degrees");

        chart.set_slices(vec![PieSlice::new(1, 1.0, css::RED), PieSlice::new(2, 9.0, css::BLUE)]);
        chart.render(CANVAS);
        // Slice 1 spans -90..-54, so 0 degrees belongs to slice 2.
        assert_eq!(chart.hit_test(layout.center), Some(1), "not the slice at 12 o'clock");
    }

    #[test]
    fn style_change_mid_flight_does_not_jump() {
        let mut chart = chart();
        chart.set_style(
            chart
                .style()
                .clone()
                .with_animation(AnimationSpec::new(1.0, Easing::Linear)),
        );
        chart.set_selected(Some(1));
        chart.advance(0.3);
        let before = chart.animation().scale(0);
        chart.set_style(
            chart
                .style()
                .clone()
                .with_animation(AnimationSpec::new(0.1, Easing::Linear)),
        );
        chart.advance(0.0);
        assert_eq!(chart.animation().scale(0), before, "scale is continuous");
        assert!(chart.is_animating(), "original transition still running");
    }

    #[test]
    fn empty_chart_is_inert() {
        let mut chart = chart();
        chart.set_slices(vec![PieSlice::new(1, 0.0, css::RED), PieSlice::new(2, -3.0, css::RED)]);
        let cmds = chart.render(CANVAS);
        assert!(
            cmds.iter().any(|c| matches!(c, DrawCommand::FillCircle { .. })),
            "background disc"
        );
        let layout = chart.layout(CANVAS).expect("fits");
        assert_eq!(chart.hit_test(layout.center), None, "no false full-circle hit");
        assert_eq!(chart.geometry().slices.len(), 1, "negative slice dropped");
    }

    #[test]
    fn zero_value_slice_can_be_selected_for_its_label() {
        let mut chart = chart();
        let mut slices = four_quarters();
        slices.push(PieSlice::new(5, 0.0, css::CYAN));
        chart.set_slices(slices);
        chart.set_selected(Some(5));
        let cmds = chart.render(CANVAS);
        assert!(
            cmds.iter()
                .any(|c| matches!(c, DrawCommand::Text { text, .. } if text == "0.0%")),
            "zero-value label is drawn"
        );
    }

    #[test]
    fn tiny_canvas_skips_the_frame() {
        let mut chart = chart();
        chart.render(CANVAS);
        let cmds = chart.render(Size::new(90.0, 300.0));
        assert!(cmds.is_empty(), "labels do not fit: nothing drawn");
        assert!(chart.snapshot().is_none(), "and nothing hit-testable");
    }

    #[test]
    fn layout_is_cached_per_canvas_size() {
        let mut chart = chart();
        let a = chart.layout(CANVAS);
        assert_eq!(chart.layout(CANVAS), a, "same canvas, same layout");
        chart.set_selected_scale(1.5);
        let b = chart.layout(CANVAS).expect("fits");
        assert!(
            b.radius < a.expect("fits").radius,
            "bigger selection headroom shrinks the pie"
        );
    }

    #[test]
    fn label_cache_only_holds_current_labels() {
        let mut chart = chart();
        for step in 1..=500_u32 {
            chart.set_slices(vec![
                PieSlice::new(1, f64::from(step), css::RED),
                PieSlice::new(2, 500.0, css::BLUE),
            ]);
            assert!(chart.labels.len() <= 2, "at most one entry per slice at step {step}");
        }
        assert_eq!(chart.geometry().slices[0].label, "50.0%", "last list is current");
    }

    #[test]
    fn slice_list_change_invalidates_snapshot() {
        let mut chart = chart();
        chart.render(CANVAS);
        assert!(chart.snapshot().is_some(), "committed");
        chart.set_slices(vec![PieSlice::new(9, 1.0, css::RED)]);
        assert!(chart.snapshot().is_none(), "stale snapshot dropped");
    }
}
