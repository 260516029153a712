//! Renders charts as PNG images.
//!
//! The images only contain shapes. Labels and the legend are drawn in HTML
//! next to the image so the server does not need any fonts.

use std::{error::Error as StdError, f64::consts::PI};

use image::{ExtendedColorType, ImageEncoder, codecs::png::PngEncoder};
use plotters::{backend::BitMapBackend, coord::Shift, drawing::DrawingArea, prelude::*};

use crate::{
    Error,
    chart::data::{ChartData, ChartKind, palette_colour},
};

/// The width of the chart images in pixels.
pub const CHART_WIDTH: u32 = 480;
/// The height of the chart images in pixels.
pub const CHART_HEIGHT: u32 = 320;

const MARGIN: i32 = 24;
const BACKGROUND: RGBColor = RGBColor(0xff, 0xff, 0xff);
const PLACEHOLDER_BACKGROUND: RGBColor = RGBColor(0xf3, 0xf4, 0xf6);
const PLACEHOLDER_FOREGROUND: RGBColor = RGBColor(0xd1, 0xd5, 0xdb);
const AXIS_COLOUR: RGBColor = RGBColor(0x6b, 0x72, 0x80);

type ChartArea<'a> = DrawingArea<BitMapBackend<'a>, Shift>;
type DrawResult = Result<(), Box<dyn StdError>>;

fn colour(index: usize) -> RGBColor {
    let (red, green, blue) = palette_colour(index);
    RGBColor(red, green, blue)
}

/// Render `data` as a chart of the given `kind` and encode it as a PNG.
///
/// [ChartData::NoData] never plots anything and gives the placeholder image,
/// whatever the `kind`.
///
/// # Errors
/// Returns [Error::ChartRenderingError] if the image could not be drawn or encoded.
pub fn render_png(kind: ChartKind, data: &ChartData) -> Result<Vec<u8>, Error> {
    let mut buffer = vec![0u8; (CHART_WIDTH * CHART_HEIGHT * 3) as usize];

    {
        let root = BitMapBackend::with_buffer(&mut buffer, (CHART_WIDTH, CHART_HEIGHT))
            .into_drawing_area();

        let result = match data {
            ChartData::NoData => draw_placeholder(&root),
            ChartData::Series { values, .. } => match kind {
                ChartKind::Pie => draw_pie(&root, values),
                ChartKind::Bar => draw_bars(&root, values),
                ChartKind::Line => draw_line(&root, values),
            },
        };

        result
            .and_then(|_| root.present().map_err(Into::into))
            .map_err(|error| {
                tracing::error!("Could not draw {kind:?} chart: {error}");
                Error::ChartRenderingError(error.to_string())
            })?;
    }

    encode_png(&buffer)
}

fn encode_png(buffer: &[u8]) -> Result<Vec<u8>, Error> {
    let mut png = Vec::new();

    PngEncoder::new(&mut png)
        .write_image(buffer, CHART_WIDTH, CHART_HEIGHT, ExtendedColorType::Rgb8)
        .map_err(|error| {
            tracing::error!("Could not encode chart as PNG: {error}");
            Error::ChartRenderingError(error.to_string())
        })?;

    Ok(png)
}

fn draw_placeholder(root: &ChartArea) -> DrawResult {
    root.fill(&PLACEHOLDER_BACKGROUND)?;

    let (width, height) = (CHART_WIDTH as i32, CHART_HEIGHT as i32);
    let bar_width = width / 10;
    let base = height - 2 * MARGIN;

    for (i, bar_height) in [height / 5, height / 3, height / 4].into_iter().enumerate() {
        let left = width / 2 - 2 * bar_width + i as i32 * (bar_width + bar_width / 2);
        root.draw(&Rectangle::new(
            [(left, base - bar_height), (left + bar_width, base)],
            PLACEHOLDER_FOREGROUND.filled(),
        ))?;
    }

    root.draw(&PathElement::new(
        vec![(MARGIN * 2, base), (width - MARGIN * 2, base)],
        PLACEHOLDER_FOREGROUND.stroke_width(2),
    ))?;

    Ok(())
}

fn draw_pie(root: &ChartArea, values: &[f64]) -> DrawResult {
    root.fill(&BACKGROUND)?;

    let total: f64 = values.iter().filter(|value| **value > 0.0).sum();
    if total <= 0.0 {
        return Ok(());
    }

    let centre = (CHART_WIDTH as f64 / 2.0, CHART_HEIGHT as f64 / 2.0);
    let radius = (CHART_WIDTH.min(CHART_HEIGHT) as f64) / 2.0 - MARGIN as f64;
    // Start at twelve o'clock and go clockwise.
    let mut start_angle = -PI / 2.0;

    for (i, value) in values.iter().enumerate() {
        if *value <= 0.0 {
            continue;
        }

        let sweep = value / total * 2.0 * PI;
        let steps = ((sweep.to_degrees()).ceil() as usize).max(2);

        let mut points = Vec::with_capacity(steps + 2);
        points.push((centre.0 as i32, centre.1 as i32));

        for step in 0..=steps {
            let angle = start_angle + sweep * step as f64 / steps as f64;
            points.push((
                (centre.0 + radius * angle.cos()).round() as i32,
                (centre.1 + radius * angle.sin()).round() as i32,
            ));
        }

        root.draw(&Polygon::new(points, colour(i).filled()))?;
        start_angle += sweep;
    }

    Ok(())
}

/// The pixel height for `value` when `max` fills the plot area.
fn scale(value: f64, max: f64, plot_height: i32) -> i32 {
    if max <= 0.0 {
        return 0;
    }

    ((value.max(0.0) / max) * plot_height as f64).round() as i32
}

fn draw_axes(root: &ChartArea) -> DrawResult {
    let (width, height) = (CHART_WIDTH as i32, CHART_HEIGHT as i32);

    root.draw(&PathElement::new(
        vec![
            (MARGIN, MARGIN),
            (MARGIN, height - MARGIN),
            (width - MARGIN, height - MARGIN),
        ],
        AXIS_COLOUR.stroke_width(1),
    ))?;

    Ok(())
}

fn draw_bars(root: &ChartArea, values: &[f64]) -> DrawResult {
    root.fill(&BACKGROUND)?;
    draw_axes(root)?;

    if values.is_empty() {
        return Ok(());
    }

    let (width, height) = (CHART_WIDTH as i32, CHART_HEIGHT as i32);
    let plot_width = width - 2 * MARGIN;
    let plot_height = height - 2 * MARGIN;
    let max = values.iter().copied().fold(0.0, f64::max);

    let slot_width = plot_width / values.len() as i32;
    let bar_width = (slot_width * 7 / 10).max(1);
    let base = height - MARGIN;

    for (i, value) in values.iter().enumerate() {
        let left = MARGIN + i as i32 * slot_width + (slot_width - bar_width) / 2;
        let top = base - scale(*value, max, plot_height);

        root.draw(&Rectangle::new(
            [(left, top), (left + bar_width, base)],
            colour(i).filled(),
        ))?;
    }

    Ok(())
}

fn draw_line(root: &ChartArea, values: &[f64]) -> DrawResult {
    root.fill(&BACKGROUND)?;
    draw_axes(root)?;

    if values.is_empty() {
        return Ok(());
    }

    let (width, height) = (CHART_WIDTH as i32, CHART_HEIGHT as i32);
    let plot_width = width - 4 * MARGIN;
    let plot_height = height - 2 * MARGIN;
    let max = values.iter().copied().fold(0.0, f64::max);
    let base = height - MARGIN;

    let points: Vec<(i32, i32)> = values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let x = if values.len() == 1 {
                width / 2
            } else {
                2 * MARGIN + plot_width * i as i32 / (values.len() as i32 - 1)
            };

            (x, base - scale(*value, max, plot_height))
        })
        .collect();

    root.draw(&PathElement::new(points.clone(), colour(0).stroke_width(3)))?;

    for (i, point) in points.into_iter().enumerate() {
        root.draw(&Circle::new(point, 5, colour(i).filled()))?;
    }

    Ok(())
}
