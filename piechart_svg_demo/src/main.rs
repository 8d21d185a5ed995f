// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless piechart demo.
//!
//! Builds a donut chart, plays back a short script of taps and animation frames,
//! and writes every rendered frame to `<out-dir>/frame_NNN.svg`.

mod svg;

use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::Context as _;
use kurbo::{Point, Size, Vec2};
use peniko::color::palette::css;
use piechart::{PieChart, PieSlice, PieStyle, TextMeasurer, TextStyle};

const CANVAS: Size = Size::new(360.0, 360.0);
const FRAME_DT: f64 = 1.0 / 30.0;

fn demo_measurer() -> Box<dyn TextMeasurer> {
    #[cfg(feature = "parley")]
    {
        Box::new(piechart_text_parley::ParleyTextMeasurer::new())
    }

    #[cfg(not(feature = "parley"))]
    {
        Box::new(piechart::HeuristicTextMeasurer)
    }
}

fn sample_slices() -> Vec<PieSlice<u32>> {
    vec![
        PieSlice::new(1, 10.0, css::RED),
        PieSlice::new(2, 10.0, css::LIME),
        PieSlice::new(3, 10.0, css::BLUE),
        PieSlice::new(4, 10.0, css::CYAN),
        PieSlice::new(5, 0.0, css::CYAN),
        PieSlice::new(6, 0.0, css::CYAN),
    ]
}

/// Writes rendered frames into one directory.
#[derive(Debug)]
struct FrameWriter {
    dir: PathBuf,
    next: usize,
}

impl FrameWriter {
    fn new(dir: PathBuf) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("creating output directory {}", dir.display()))?;
        Ok(Self { dir, next: 0 })
    }

    fn write<M: TextMeasurer>(&mut self, chart: &mut PieChart<u32, M>) -> anyhow::Result<()> {
        let commands = chart.render(CANVAS);
        if commands.is_empty() {
            log::warn!("frame {} skipped: labels do not fit", self.next);
        }
        let path = self.dir.join(format!("frame_{:03}.svg", self.next));
        std::fs::write(&path, svg::to_svg_string(&commands, CANVAS))
            .with_context(|| format!("writing {}", path.display()))?;
        log::debug!("wrote {} ({} commands)", path.display(), commands.len());
        self.next += 1;
        Ok(())
    }

    fn dir(&self) -> &Path {
        &self.dir
    }
}

/// A point on the middle ray of `slice` halfway between the hole and the rim.
fn point_on_slice<M: TextMeasurer>(chart: &mut PieChart<u32, M>, slice: usize) -> Option<Point> {
    let layout = chart.layout(CANVAS)?;
    let item = chart.geometry().slices.iter().find(|s| s.index == slice)?;
    let hollow = chart.style().hollow;
    let mid = (item.start_angle + item.sweep_angle / 2.0).to_radians();
    Some(layout.center + Vec2::from_angle(mid) * layout.radius * (1.0 + hollow) / 2.0)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let out_dir = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from("piechart_frames"), PathBuf::from);
    let mut frames = FrameWriter::new(out_dir)?;

    let tapped = Rc::new(Cell::new(None));
    let sink = tapped.clone();
    let style = PieStyle::default()
        .with_hollow(0.5)
        .with_background(css::LIGHT_GRAY)
        .with_label_style(TextStyle::new(12.0))
        .with_label_color(css::BLACK);
    let mut chart = PieChart::new(demo_measurer())
        .with_style(style)
        .with_on_click(move |slice: &PieSlice<u32>| sink.set(Some(slice.id)));
    chart.set_slices(sample_slices());

    // The first zero-value slice starts selected: label only, no wedge.
    chart.set_selected(Some(5));
    while chart.advance(FRAME_DT) {}
    frames.write(&mut chart)?;

    // Tap slice 3, then tap it again to deselect, then tap into the hole.
    let taps = [
        point_on_slice(&mut chart, 2),
        point_on_slice(&mut chart, 2),
        Some(CANVAS.to_rect().center()),
    ];
    for tap in taps.into_iter().flatten() {
        if chart.click(tap) {
            if let Some(id) = tapped.take() {
                let next = (chart.selected() != Some(&id)).then_some(id);
                log::info!("tapped slice {id}, selection now {next:?}");
                chart.set_selected(next);
            }
        } else {
            log::info!("tap at ({:.1}, {:.1}) missed", tap.x, tap.y);
        }
        loop {
            let animating = chart.advance(FRAME_DT);
            frames.write(&mut chart)?;
            if !animating {
                break;
            }
        }
    }

    // Nothing positive left: a flat background disc.
    chart.set_slices(vec![PieSlice::new(1, 0.0, css::RED)]);
    frames.write(&mut chart)?;

    // Too narrow for any label: the frame is skipped and taps are inert.
    chart.set_slices(sample_slices());
    chart.set_selected(Some(1));
    let narrow = Size::new(60.0, CANVAS.height);
    if chart.render(narrow).is_empty() && chart.hit_test(Point::new(30.0, 180.0)).is_none() {
        log::info!("{}x{} canvas: frame skipped", narrow.width, narrow.height);
    }

    println!("wrote {} frames to {}", frames.next, frames.dir().display());
    Ok(())
}
