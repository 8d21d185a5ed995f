// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal SVG writer for piechart draw lists.
//!
//! Layers become `<g>` groups clipped to their bounds. A clear-circle cannot be
//! expressed directly in SVG, so everything drawn in the layer so far is wrapped
//! in a group whose mask is black inside the circle.

use std::fmt::Write as _;

use kurbo::{Cap, Circle, Join, Rect, Size, Stroke};
use peniko::Color;
use piechart::{DrawCommand, FontStyle, TextStyle};

#[derive(Debug, Default)]
struct Layer {
    clip: Option<Rect>,
    body: String,
}

/// Serializes `commands` into a standalone SVG document of `canvas` size.
pub(crate) fn to_svg_string(commands: &[DrawCommand], canvas: Size) -> String {
    let mut defs = String::new();
    let mut next_id = 0_usize;
    let mut stack = vec![Layer::default()];

    for command in commands {
        match command {
            DrawCommand::PushLayer { clip } => stack.push(Layer {
                clip: Some(*clip),
                body: String::new(),
            }),
            DrawCommand::PopLayer => {
                // An unbalanced pop leaves the root layer in place.
                if stack.len() < 2 {
                    log::warn!("ignoring unbalanced PopLayer");
                    continue;
                }
                let Some(layer) = stack.pop() else { continue };
                let group = close_layer(layer, &mut defs, &mut next_id);
                if let Some(parent) = stack.last_mut() {
                    parent.body.push_str(&group);
                }
            }
            DrawCommand::FillCircle { circle, color } => {
                let Some(layer) = stack.last_mut() else { continue };
                let _ = write!(
                    layer.body,
                    r#"<circle cx="{}" cy="{}" r="{}""#,
                    circle.center.x, circle.center.y, circle.radius
                );
                write_paint_attr(&mut layer.body, "fill", *color);
                layer.body.push_str("/>\n");
            }
            DrawCommand::FillPath { path, color } => {
                let Some(layer) = stack.last_mut() else { continue };
                let _ = write!(layer.body, r#"<path d="{}""#, path.to_svg());
                write_paint_attr(&mut layer.body, "fill", *color);
                layer.body.push_str("/>\n");
            }
            DrawCommand::StrokePath {
                path,
                stroke,
                color,
            } => {
                let Some(layer) = stack.last_mut() else { continue };
                let _ = write!(layer.body, r#"<path d="{}" fill="none""#, path.to_svg());
                write_paint_attr(&mut layer.body, "stroke", *color);
                write_stroke_attrs(&mut layer.body, stroke);
                layer.body.push_str("/>\n");
            }
            DrawCommand::Text {
                text,
                origin,
                size,
                style,
                color,
            } => {
                let Some(layer) = stack.last_mut() else { continue };
                let _ = write!(
                    layer.body,
                    r#"<text x="{}" y="{}" dominant-baseline="middle""#,
                    origin.x,
                    origin.y + size.height / 2.0
                );
                write_font_attrs(&mut layer.body, style);
                write_paint_attr(&mut layer.body, "fill", *color);
                layer.body.push('>');
                layer.body.push_str(&escape_xml(text));
                layer.body.push_str("</text>\n");
            }
            DrawCommand::ClearCircle { circle } => {
                let Some(layer) = stack.last_mut() else { continue };
                let bounds = layer
                    .clip
                    .unwrap_or_else(|| canvas.to_rect())
                    .union(circle_bounds(*circle));
                let id = next_id;
                next_id += 1;
                let _ = writeln!(
                    defs,
                    r#"<mask id="clear{id}" maskUnits="userSpaceOnUse" x="{}" y="{}" width="{}" height="{}"><rect x="{}" y="{}" width="{}" height="{}" fill="white"/><circle cx="{}" cy="{}" r="{}" fill="black"/></mask>"#,
                    bounds.x0,
                    bounds.y0,
                    bounds.width(),
                    bounds.height(),
                    bounds.x0,
                    bounds.y0,
                    bounds.width(),
                    bounds.height(),
                    circle.center.x,
                    circle.center.y,
                    circle.radius
                );
                layer.body = format!("<g mask=\"url(#clear{id})\">\n{}</g>\n", layer.body);
            }
        }
    }

    // Close anything a truncated list left open.
    while stack.len() > 1 {
        let Some(layer) = stack.pop() else { break };
        let group = close_layer(layer, &mut defs, &mut next_id);
        if let Some(parent) = stack.last_mut() {
            parent.body.push_str(&group);
        }
    }
    let body = stack.pop().map(|layer| layer.body).unwrap_or_default();

    let mut out = String::new();
    out.push_str(r#"<svg xmlns="http://www.w3.org/2000/svg" "#);
    let _ = writeln!(
        out,
        r#"viewBox="0 0 {w} {h}" width="{w}" height="{h}">"#,
        w = canvas.width,
        h = canvas.height
    );
    if !defs.is_empty() {
        out.push_str("<defs>\n");
        out.push_str(&defs);
        out.push_str("</defs>\n");
    }
    out.push_str(&body);
    out.push_str("</svg>\n");
    out
}

fn close_layer(layer: Layer, defs: &mut String, next_id: &mut usize) -> String {
    match layer.clip {
        Some(clip) => {
            let id = *next_id;
            *next_id += 1;
            let _ = writeln!(
                defs,
                r#"<clipPath id="layer{id}"><rect x="{}" y="{}" width="{}" height="{}"/></clipPath>"#,
                clip.x0,
                clip.y0,
                clip.width(),
                clip.height()
            );
            format!(
                "<g clip-path=\"url(#layer{id})\" style=\"isolation:isolate\">\n{}</g>\n",
                layer.body
            )
        }
        None => layer.body,
    }
}

fn circle_bounds(circle: Circle) -> Rect {
    Rect::from_center_size(
        circle.center,
        Size::new(2.0 * circle.radius, 2.0 * circle.radius),
    )
}

fn write_paint_attr(out: &mut String, name: &str, color: Color) {
    let rgba = color.to_rgba8();
    let _ = write!(
        out,
        r##" {name}="#{:02x}{:02x}{:02x}""##,
        rgba.r, rgba.g, rgba.b
    );
    if rgba.a != 255 {
        let _ = write!(out, r#" {name}-opacity="{}""#, f64::from(rgba.a) / 255.0);
    }
}

fn write_stroke_attrs(out: &mut String, stroke: &Stroke) {
    let _ = write!(out, r#" stroke-width="{}""#, stroke.width);
    out.push_str(match stroke.start_cap {
        Cap::Butt => "",
        Cap::Square => r#" stroke-linecap="square""#,
        Cap::Round => r#" stroke-linecap="round""#,
    });
    out.push_str(match stroke.join {
        Join::Miter => "",
        Join::Bevel => r#" stroke-linejoin="bevel""#,
        Join::Round => r#" stroke-linejoin="round""#,
    });
}

fn write_font_attrs(out: &mut String, style: &TextStyle) {
    let _ = write!(
        out,
        r#" font-family="{}" font-size="{}""#,
        escape_xml(style.font_family.as_css_family()),
        style.font_size
    );
    if style.font_weight != piechart::FontWeight::NORMAL {
        let _ = write!(out, r#" font-weight="{}""#, style.font_weight.0);
    }
    out.push_str(match style.font_style {
        FontStyle::Normal => "",
        FontStyle::Italic => r#" font-style="italic""#,
        FontStyle::Oblique => r#" font-style="oblique""#,
    });
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
