// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interactive Vello renderer demo for `piechart`.

use std::cell::Cell;
use std::num::NonZeroUsize;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context as _;
use kurbo::{Affine, Point, Size, Vec2};
use parley::style::{FontStack, StyleProperty};
use parley::{Alignment, AlignmentOptions, FontContext, FontWeight, LayoutContext};
use peniko::color::palette::css;
use peniko::{Brush, Color};
use piechart::{DrawCommand, PieChart, PieSlice, PieStyle, TextStyle};
use piechart_text_parley::ParleyTextMeasurer;
use vello::peniko::{BlendMode, Compose, Fill, FontData, Mix};
use vello::util::{RenderContext, RenderSurface};
use vello::{AaConfig, AaSupport, RenderParams, Renderer, RendererOptions, Scene as VelloScene};
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowId};

/// Shapes and draws single-line labels at a top-left origin.
struct TextShaper {
    font_cx: FontContext,
    layout_cx: LayoutContext<()>,
}

impl TextShaper {
    fn new() -> Self {
        Self {
            font_cx: FontContext::new(),
            layout_cx: LayoutContext::new(),
        }
    }

    fn draw_text(
        &mut self,
        scene: &mut VelloScene,
        global: Affine,
        text: &str,
        origin: Point,
        box_size: Size,
        style: &TextStyle,
        fill: Color,
    ) {
        let text = text.split('\n').next().unwrap_or("");
        if text.is_empty() {
            return;
        }

        let mut builder = self
            .layout_cx
            .ranged_builder(&mut self.font_cx, text, 1.0, true);
        builder.push_default(StyleProperty::FontSize(font_size_f32(style.font_size)));
        builder.push_default(StyleProperty::FontStack(FontStack::from(
            style.font_family.as_css_family(),
        )));
        builder.push_default(StyleProperty::FontWeight(FontWeight::new(f32::from(
            style.font_weight.0,
        ))));

        let mut layout: parley::Layout<()> = builder.build(text);
        layout.break_all_lines(None);
        layout.align(None, Alignment::Start, AlignmentOptions::default());

        let Some(line) = layout.lines().next() else {
            return;
        };
        let metrics = line.metrics();
        let height = f64::from(metrics.ascent + metrics.descent + metrics.leading);
        // Center the shaped line in the box the label was measured into.
        let transform = global
            * Affine::translate(Vec2::new(
                origin.x,
                origin.y + 0.5 * (box_size.height - height),
            ));

        let brush = Brush::Solid(fill);
        for item in line.items() {
            let parley::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let font: &FontData = run.run().font();
            let glyphs = run.positioned_glyphs().map(|g| vello::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            scene
                .draw_glyphs(font)
                .transform(transform)
                .font_size(run.run().font_size())
                .brush(&brush)
                .draw(Fill::NonZero, glyphs);
        }
    }
}

fn font_size_f32(font_size: f64) -> f32 {
    if !font_size.is_finite() {
        return 0.0;
    }
    let font_size = font_size.max(0.0);
    if font_size >= f64::from(f32::MAX) {
        f32::MAX
    } else {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Value is clamped to f32::MAX above"
        )]
        {
            font_size as f32
        }
    }
}

/// Replays a piechart draw list into a Vello scene.
fn paint_commands(
    scene: &mut VelloScene,
    text: &mut TextShaper,
    commands: &[DrawCommand],
    transform: Affine,
) {
    for command in commands {
        match command {
            DrawCommand::PushLayer { clip } => {
                scene.push_layer(Mix::Normal, 1.0, transform, clip);
            }
            DrawCommand::PopLayer => scene.pop_layer(),
            DrawCommand::FillCircle { circle, color } => {
                scene.fill(Fill::NonZero, transform, &Brush::Solid(*color), None, circle);
            }
            DrawCommand::FillPath { path, color } => {
                scene.fill(Fill::NonZero, transform, &Brush::Solid(*color), None, path);
            }
            DrawCommand::StrokePath {
                path,
                stroke,
                color,
            } => {
                scene.stroke(stroke, transform, &Brush::Solid(*color), None, path);
            }
            DrawCommand::Text {
                text: label,
                origin,
                size,
                style,
                color,
            } => text.draw_text(scene, transform, label, *origin, *size, style, *color),
            DrawCommand::ClearCircle { circle } => {
                // An opaque disc composited with destination-out erases the backdrop.
                scene.push_layer(
                    BlendMode::new(Mix::Normal, Compose::DestOut),
                    1.0,
                    transform,
                    circle,
                );
                scene.fill(Fill::NonZero, transform, &Brush::Solid(css::BLACK), None, circle);
                scene.pop_layer();
            }
        }
    }
}

fn sample_slices() -> Vec<PieSlice<u32>> {
    vec![
        PieSlice::new(1, 10.0, css::RED).with_label("Housing"),
        PieSlice::new(2, 10.0, css::LIME),
        PieSlice::new(3, 10.0, css::BLUE),
        PieSlice::new(4, 10.0, css::CYAN),
        PieSlice::new(5, 4.0, css::ORANGE).with_label("Misc."),
        PieSlice::new(6, 0.0, css::CYAN),
    ]
}

struct App {
    window: Option<Arc<Window>>,
    window_id: Option<WindowId>,
    render_cx: RenderContext,
    surface: Option<RenderSurface<'static>>,
    renderer: Option<Renderer>,
    vello_scene: VelloScene,
    text: TextShaper,
    chart: PieChart<u32, ParleyTextMeasurer>,
    tapped: Rc<Cell<Option<u32>>>,
    cursor: Option<PhysicalPosition<f64>>,
    last_redraw: Instant,
}

impl App {
    fn new() -> Self {
        let tapped = Rc::new(Cell::new(None));
        let sink = tapped.clone();
        let style = PieStyle::default()
            .with_hollow(0.5)
            .with_label_style(TextStyle::new(14.0));
        let mut chart = PieChart::new(ParleyTextMeasurer::new())
            .with_style(style)
            .with_on_click(move |slice: &PieSlice<u32>| sink.set(Some(slice.id)));
        chart.set_slices(sample_slices());
        chart.set_selected(Some(5));

        Self {
            window: None,
            window_id: None,
            render_cx: RenderContext::new(),
            surface: None,
            renderer: None,
            vello_scene: VelloScene::new(),
            text: TextShaper::new(),
            chart,
            tapped,
            cursor: None,
            last_redraw: Instant::now(),
        }
    }

    fn init_gpu(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window = Arc::new(
            event_loop
                .create_window(
                    Window::default_attributes()
                        .with_title("piechart_vello_demo")
                        .with_inner_size(PhysicalSize::new(800_u32, 600_u32)),
                )
                .context("creating window")?,
        );
        let size = window.inner_size();
        let width = size.width.max(1);
        let height = size.height.max(1);

        let surface = pollster::block_on(self.render_cx.create_surface(
            window.clone(),
            width,
            height,
            wgpu::PresentMode::AutoVsync,
        ))
        .context("creating surface")?;

        let device_handle = &self.render_cx.devices[surface.dev_id];
        let renderer = Renderer::new(
            &device_handle.device,
            RendererOptions {
                antialiasing_support: AaSupport::all(),
                num_init_threads: NonZeroUsize::new(1),
                ..RendererOptions::default()
            },
        )
        .map_err(|err| anyhow::anyhow!("creating vello renderer: {err}"))?;

        self.window_id = Some(window.id());
        self.window = Some(window);
        self.surface = Some(surface);
        self.renderer = Some(renderer);
        Ok(())
    }

    fn scale_factor(&self) -> f64 {
        self.window.as_ref().map_or(1.0, |w| w.scale_factor())
    }

    /// Canvas size in logical pixels.
    fn canvas(&self) -> Size {
        let Some(surface) = self.surface.as_ref() else {
            return Size::ZERO;
        };
        let scale = self.scale_factor();
        Size::new(
            f64::from(surface.config.width) / scale,
            f64::from(surface.config.height) / scale,
        )
    }

    fn request_redraw(&self) {
        if let Some(w) = &self.window {
            w.request_redraw();
        }
    }

    fn update_window_title(&self) {
        let Some(w) = &self.window else {
            return;
        };
        let selected = self
            .chart
            .selected()
            .map_or_else(|| "none".to_string(), u32::to_string);
        w.set_title(&format!(
            "piechart_vello_demo: selected {selected}, scale {:.2}, hollow {:.1}",
            self.chart.style().selected_scale,
            self.chart.style().hollow
        ));
    }

    fn handle_click(&mut self) {
        let Some(cursor) = self.cursor else {
            return;
        };
        let scale = self.scale_factor();
        let point = Point::new(cursor.x / scale, cursor.y / scale);
        if !self.chart.click(point) {
            log::debug!("click at ({:.1}, {:.1}) hit nothing", point.x, point.y);
            return;
        }
        if let Some(id) = self.tapped.take() {
            let next = (self.chart.selected() != Some(&id)).then_some(id);
            log::info!("slice {id} clicked, selection now {next:?}");
            self.chart.set_selected(next);
            self.update_window_title();
            self.request_redraw();
        }
    }

    fn toggle_hollow(&mut self) {
        let hollow = if self.chart.style().hollow > 0.0 { 0.0 } else { 0.5 };
        let style = self.chart.style().clone().with_hollow(hollow);
        self.chart.set_style(style);
        self.update_window_title();
        self.request_redraw();
    }

    fn nudge_selected_scale(&mut self, delta: f64) {
        let scale = (self.chart.style().selected_scale + delta).clamp(1.0, 1.5);
        self.chart.set_selected_scale(scale);
        self.update_window_title();
        self.request_redraw();
    }

    fn rebuild_scene(&mut self) {
        let now = Instant::now();
        // Clamp dt to keep things sane during debugger stops.
        let dt = now.duration_since(self.last_redraw).as_secs_f64().min(0.1);
        self.last_redraw = now;
        self.chart.advance(dt);

        self.vello_scene.reset();
        let canvas = self.canvas();
        let commands = self.chart.render(canvas);
        let transform = Affine::scale(self.scale_factor());
        paint_commands(&mut self.vello_scene, &mut self.text, &commands, transform);
    }

    fn present(&mut self) -> anyhow::Result<()> {
        let Some(surface) = self.surface.as_mut() else {
            return Ok(());
        };
        let Some(renderer) = self.renderer.as_mut() else {
            return Ok(());
        };
        let device_handle = &self.render_cx.devices[surface.dev_id];

        let surface_texture = match surface.surface.get_current_texture() {
            Ok(tex) => tex,
            Err(err) => {
                log::debug!("surface lost ({err}), reconfiguring");
                self.render_cx
                    .resize_surface(surface, surface.config.width, surface.config.height);
                return Ok(());
            }
        };
        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        renderer
            .render_to_texture(
                &device_handle.device,
                &device_handle.queue,
                &self.vello_scene,
                &surface.target_view,
                &RenderParams {
                    base_color: css::LIGHT_YELLOW,
                    width: surface.config.width,
                    height: surface.config.height,
                    antialiasing_method: AaConfig::Msaa16,
                },
            )
            .map_err(|err| anyhow::anyhow!("rendering scene: {err}"))?;

        let mut encoder =
            device_handle
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("blit"),
                });
        surface.blitter.copy(
            &device_handle.device,
            &mut encoder,
            &surface.target_view,
            &surface_view,
        );
        device_handle.queue.submit([encoder.finish()]);
        surface_texture.present();
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.init_gpu(event_loop) {
            log::error!("{err:#}");
            event_loop.exit();
            return;
        }
        self.last_redraw = Instant::now();
        self.update_window_title();
        self.request_redraw();
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if self.chart.is_animating() {
            self.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        if Some(id) != self.window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if width == 0 || height == 0 {
                    return;
                }
                if let Some(surface) = self.surface.as_mut() {
                    self.render_cx.resize_surface(surface, width, height);
                }
                self.request_redraw();
            }
            WindowEvent::CursorMoved { position, .. } => self.cursor = Some(position),
            WindowEvent::CursorLeft { .. } => self.cursor = None,
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => self.handle_click(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key,
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => match logical_key {
                Key::Named(NamedKey::Escape) => event_loop.exit(),
                Key::Named(NamedKey::ArrowUp) => self.nudge_selected_scale(0.05),
                Key::Named(NamedKey::ArrowDown) => self.nudge_selected_scale(-0.05),
                Key::Character(c) if c.eq_ignore_ascii_case("h") => self.toggle_hollow(),
                _ => {}
            },
            WindowEvent::RedrawRequested => {
                self.rebuild_scene();
                if let Err(err) = self.present() {
                    log::error!("{err:#}");
                    event_loop.exit();
                    return;
                }
                // Keep the redraw loop going while slices are still moving.
                if self.chart.is_animating() {
                    self.request_redraw();
                }
            }
            _ => {}
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let event_loop = EventLoop::new().context("creating event loop")?;
    let mut app = App::new();
    event_loop.run_app(&mut app).context("running event loop")?;
    Ok(())
}

