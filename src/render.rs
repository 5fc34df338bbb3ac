use crate::error::{LanduseError, Result};
use crate::query::numeric_cells;
use crate::types::FeatureCollection;
use ab_glyph::FontRef;
use geo::{BoundingRect, MultiPolygon, Rect};
use image::{ImageBuffer, Rgba, RgbaImage};
use imageproc::drawing::{
    draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut, draw_text_mut, text_size,
};
use imageproc::rect::Rect as PixelRect;
use rayon::prelude::*;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

const MARGIN: u32 = 10;
const TITLE_HEIGHT: u32 = 24;
const LEGEND_WIDTH: u32 = 100;
const BAR_OFFSET: u32 = 15;
const BAR_WIDTH: u32 = 20;
const SWATCH_SIZE: u32 = 20;
const LABEL_GAP: u32 = 4;
const LUT_SIZE: usize = 256;

const TITLE_SCALE: f32 = 16.0;
const LABEL_SCALE: f32 = 12.0;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const TEXT_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);

static FONT_DATA: &[u8] = include_bytes!("../assets/DejaVuSansMono.ttf");

/// Named sequential colour ramps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Colormap {
    #[default]
    #[serde(alias = "Blues")]
    Blues,
    #[serde(alias = "Greens")]
    Greens,
    #[serde(alias = "Reds")]
    Reds,
    #[serde(alias = "Greys")]
    Greys,
    Viridis,
    Plasma,
}

impl Colormap {
    fn stops(&self) -> &'static [&'static str] {
        match self {
            Colormap::Blues => &[
                "#f7fbff", "#deebf7", "#c6dbef", "#9ecae1", "#6baed6", "#4292c6", "#2171b5",
                "#08519c", "#08306b",
            ],
            Colormap::Greens => &[
                "#f7fcf5", "#e5f5e0", "#c7e9c0", "#a1d99b", "#74c476", "#41ab5d", "#238b45",
                "#006d2c", "#00441b",
            ],
            Colormap::Reds => &[
                "#fff5f0", "#fee0d2", "#fcbba1", "#fc9272", "#fb6a4a", "#ef3b2c", "#cb181d",
                "#a50f15", "#67000d",
            ],
            Colormap::Greys => &[
                "#ffffff", "#f0f0f0", "#d9d9d9", "#bdbdbd", "#969696", "#737373", "#525252",
                "#252525", "#000000",
            ],
            Colormap::Viridis => &[
                "#440154", "#482878", "#3e4989", "#31688e", "#26828e", "#1f9e89", "#35b779",
                "#6ece58", "#b5de2b", "#fde725",
            ],
            Colormap::Plasma => &[
                "#0d0887", "#46039f", "#7201a8", "#9c179e", "#bd3786", "#d8576b", "#ed7953",
                "#fb9f3a", "#fdca26", "#f0f921",
            ],
        }
    }

    /// Colour at `t` in `[0, 1]`, linearly interpolated between stops.
    pub fn sample(&self, t: f64) -> Rgba<u8> {
        let stops: Vec<Rgba<u8>> = self
            .stops()
            .iter()
            .map(|s| hex_to_rgba(s).unwrap_or(BACKGROUND))
            .collect();
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let pos = t * (stops.len() - 1) as f64;
        let i = (pos.floor() as usize).min(stops.len() - 2);
        let frac = pos - i as f64;
        let (a, b) = (stops[i], stops[i + 1]);
        let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * frac).round() as u8;
        Rgba([mix(a[0], b[0]), mix(a[1], b[1]), mix(a[2], b[2]), 255])
    }

    fn lut(&self) -> Vec<Rgba<u8>> {
        (0..LUT_SIZE)
            .map(|i| self.sample(i as f64 / (LUT_SIZE - 1) as f64))
            .collect()
    }
}

impl FromStr for Colormap {
    type Err = LanduseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "blues" => Ok(Colormap::Blues),
            "greens" => Ok(Colormap::Greens),
            "reds" => Ok(Colormap::Reds),
            "greys" | "grays" => Ok(Colormap::Greys),
            "viridis" => Ok(Colormap::Viridis),
            "plasma" => Ok(Colormap::Plasma),
            _ => Err(LanduseError::InvalidStyle(format!("unknown colormap '{}'", s))),
        }
    }
}

impl fmt::Display for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Colormap::Blues => "Blues",
            Colormap::Greens => "Greens",
            Colormap::Reds => "Reds",
            Colormap::Greys => "Greys",
            Colormap::Viridis => "viridis",
            Colormap::Plasma => "plasma",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct StyleOptions {
    pub cmap: Colormap,
    /// Lower end of the colour scale; data minimum when unset.
    pub vmin: Option<f64>,
    /// Upper end of the colour scale; data maximum when unset.
    pub vmax: Option<f64>,
    pub width: u32,
    pub height: u32,
    pub edge_color: Rgba<u8>,
    pub missing_color: Rgba<u8>,
    pub legend: bool,
    pub title: Option<String>,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            cmap: Colormap::Blues,
            vmin: None,
            vmax: None,
            width: 800,
            height: 800,
            edge_color: Rgba([0, 0, 0, 255]),
            missing_color: Rgba([211, 211, 211, 255]), // lightgrey
            legend: true,
            title: None,
        }
    }
}

/// Maps data coordinates onto image pixels, preserving aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    min_x: f64,
    max_y: f64,
    scale: f64,
    offset_x: f64,
    offset_y: f64,
}

impl Frame {
    /// Fit `bounds` into `width` x `height`, leaving the top `top` rows free.
    fn fit(bounds: Rect<f64>, width: u32, height: u32, top: u32) -> Self {
        let avail_w = (width - 2 * MARGIN) as f64;
        let avail_h = (height - top - 2 * MARGIN) as f64;
        let dx = if bounds.width() > 0.0 { bounds.width() } else { 1.0 };
        let dy = if bounds.height() > 0.0 { bounds.height() } else { 1.0 };
        let scale = (avail_w / dx).min(avail_h / dy);
        Self {
            min_x: bounds.min().x,
            max_y: bounds.max().y,
            scale,
            offset_x: MARGIN as f64 + (avail_w - bounds.width() * scale) / 2.0,
            offset_y: (top + MARGIN) as f64 + (avail_h - bounds.height() * scale) / 2.0,
        }
    }

    /// Pixel position of a data coordinate. Y grows downwards.
    pub fn to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.offset_x + (x - self.min_x) * self.scale,
            self.offset_y + (self.max_y - y) * self.scale,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    pub cmap: Colormap,
    pub vmin: f64,
    pub vmax: f64,
    /// Label of the missing-value swatch, present when some rows had no value.
    pub missing_label: Option<String>,
}

/// A rendered map, ready to be saved or displayed.
#[derive(Debug, Clone)]
pub struct Choropleth {
    pub image: RgbaImage,
    pub title: String,
    pub legend: Legend,
    pub frame: Frame,
}

impl Choropleth {
    pub fn save(&self, path: &Path) -> Result<()> {
        self.image.save(path)?;
        info!("Saved map '{}' to {:?}", self.title, path);
        Ok(())
    }
}

struct ProjectedShape {
    rings: Vec<Vec<(f64, f64)>>,
    min_y: f64,
    max_y: f64,
    color: Rgba<u8>,
}

impl ProjectedShape {
    fn new(geometry: &MultiPolygon<f64>, frame: &Frame, color: Rgba<u8>) -> Self {
        let rings: Vec<Vec<(f64, f64)>> = geometry
            .iter()
            .flat_map(|polygon| std::iter::once(polygon.exterior()).chain(polygon.interiors()))
            .map(|ring| ring.coords().map(|c| frame.to_pixel(c.x, c.y)).collect())
            .collect();
        let (min_y, max_y) = rings
            .iter()
            .flatten()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, y)| {
                (lo.min(y), hi.max(y))
            });
        Self {
            rings,
            min_y,
            max_y,
            color,
        }
    }

    /// Even-odd crossings of the horizontal line `y` with every ring edge.
    fn crossings(&self, y: f64) -> Vec<f64> {
        let mut xs = Vec::new();
        for ring in &self.rings {
            for edge in ring.windows(2) {
                let ((x0, y0), (x1, y1)) = (edge[0], edge[1]);
                if (y0 <= y) != (y1 <= y) {
                    xs.push(x0 + (y - y0) * (x1 - x0) / (y1 - y0));
                }
            }
        }
        xs.sort_by(|a, b| a.total_cmp(b));
        xs
    }
}

/// Render `column` of `collection` as a filled map.
///
/// The title sits in a band above the map. Features with a missing value are
/// filled with `style.missing_color` and get a "No data" legend entry; rows
/// without geometry are not drawn and don't count towards it.
pub fn render_choropleth(
    collection: &FeatureCollection,
    column: &str,
    style: &StyleOptions,
) -> Result<Choropleth> {
    let values = numeric_cells(collection, column)?;

    let legend_width = if style.legend { LEGEND_WIDTH } else { 0 };
    if style.width <= legend_width + 2 * MARGIN
        || style.height <= TITLE_HEIGHT + 2 * MARGIN + SWATCH_SIZE * 2
    {
        return Err(LanduseError::InvalidStyle(format!(
            "image size {}x{} is too small",
            style.width, style.height
        )));
    }
    let map_width = style.width - legend_width;

    let data_min = values.iter().flatten().copied().fold(f64::INFINITY, f64::min);
    let data_max = values.iter().flatten().copied().fold(f64::NEG_INFINITY, f64::max);
    let vmin = style.vmin.unwrap_or(if data_min.is_finite() { data_min } else { 0.0 });
    let vmax = style.vmax.unwrap_or(if data_max.is_finite() { data_max } else { 1.0 });
    let has_missing = collection
        .features
        .iter()
        .zip(&values)
        .any(|(feature, value)| feature.geometry.is_some() && value.is_none());

    let lut = style.cmap.lut();
    let color_for = |v: f64| {
        let t = if vmax > vmin {
            ((v - vmin) / (vmax - vmin)).clamp(0.0, 1.0)
        } else {
            0.0
        };
        lut[(t * (LUT_SIZE - 1) as f64).round() as usize]
    };

    let bounds = collection
        .features
        .iter()
        .filter_map(|f| f.geometry.as_ref()?.bounding_rect())
        .reduce(|a, b| {
            Rect::new(
                geo::coord! { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
                geo::coord! { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
            )
        })
        .unwrap_or_else(|| Rect::new(geo::coord! { x: 0.0, y: 0.0 }, geo::coord! { x: 1.0, y: 1.0 }));
    let frame = Frame::fit(bounds, map_width, style.height, TITLE_HEIGHT);

    let shapes: Vec<ProjectedShape> = collection
        .features
        .iter()
        .zip(&values)
        .filter_map(|(feature, value)| {
            let color = value.map(color_for).unwrap_or(style.missing_color);
            feature
                .geometry
                .as_ref()
                .map(|g| ProjectedShape::new(g, &frame, color))
        })
        .collect();

    let mut image: RgbaImage = ImageBuffer::from_pixel(style.width, style.height, BACKGROUND);

    // Fill each pixel row independently; later features paint over earlier ones.
    let stride = style.width as usize * 4;
    image
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(row, pixels)| {
            let y = row as f64 + 0.5;
            for shape in shapes.iter().filter(|s| s.min_y <= y && y <= s.max_y) {
                for span in shape.crossings(y).chunks_exact(2) {
                    let start = (span[0] - 0.5).ceil().max(0.0) as usize;
                    let end = ((span[1] - 0.5).ceil().max(0.0) as usize).min(map_width as usize);
                    for px in start..end {
                        pixels[px * 4..px * 4 + 4].copy_from_slice(&shape.color.0);
                    }
                }
            }
        });

    for shape in &shapes {
        for ring in &shape.rings {
            for edge in ring.windows(2) {
                let (x0, y0) = edge[0];
                let (x1, y1) = edge[1];
                draw_line_segment_mut(
                    &mut image,
                    (x0 as f32, y0 as f32),
                    (x1 as f32, y1 as f32),
                    style.edge_color,
                );
            }
        }
    }

    let font = FontRef::try_from_slice(FONT_DATA)?;
    let title = style.title.clone().unwrap_or_else(|| column.to_string());
    draw_title(&mut image, map_width, &font, &title);

    let missing_label = has_missing.then(|| "No data".to_string());
    if style.legend {
        let bar = LegendBar {
            vmin,
            vmax,
            missing_label: missing_label.as_deref(),
        };
        draw_legend(&mut image, map_width, &lut, &font, &bar, style);
    }

    info!(
        "Rendered '{}' with {} shapes ({}x{})",
        title,
        shapes.len(),
        style.width,
        style.height
    );

    Ok(Choropleth {
        image,
        title,
        legend: Legend {
            cmap: style.cmap,
            vmin,
            vmax,
            missing_label,
        },
        frame,
    })
}

/// Title centred over the map area.
fn draw_title(image: &mut RgbaImage, map_width: u32, font: &FontRef, title: &str) {
    let (text_width, text_height) = text_size(TITLE_SCALE, font, title);
    let x = (map_width.saturating_sub(text_width) / 2).max(MARGIN);
    let y = TITLE_HEIGHT.saturating_sub(text_height) / 2 + MARGIN / 2;
    draw_text_mut(image, TEXT_COLOR, x as i32, y as i32, TITLE_SCALE, font, title);
}

fn format_tick(value: f64) -> String {
    if value.abs() >= 1000.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

struct LegendBar<'a> {
    vmin: f64,
    vmax: f64,
    missing_label: Option<&'a str>,
}

/// Vertical colour bar (vmax at the top) plus a "No data" swatch when needed.
fn draw_legend(
    image: &mut RgbaImage,
    map_width: u32,
    lut: &[Rgba<u8>],
    font: &FontRef,
    bar: &LegendBar,
    style: &StyleOptions,
) {
    let left = map_width + BAR_OFFSET;
    let right = left + BAR_WIDTH;
    let top = TITLE_HEIGHT + MARGIN;
    let mut bottom = style.height - MARGIN;
    if bar.missing_label.is_some() {
        bottom -= SWATCH_SIZE + MARGIN;
    }

    let bar_height = (bottom - top).max(1);
    for y in top..bottom {
        let t = 1.0 - (y - top) as f64 / bar_height as f64;
        let color = lut[(t * (lut.len() - 1) as f64).round() as usize];
        draw_filled_rect_mut(image, PixelRect::at(left as i32, y as i32).of_size(BAR_WIDTH, 1), color);
    }
    draw_hollow_rect_mut(
        image,
        PixelRect::at(left as i32, top as i32).of_size(BAR_WIDTH, bar_height),
        style.edge_color,
    );

    let label_x = (right + LABEL_GAP) as i32;
    draw_text_mut(image, TEXT_COLOR, label_x, top as i32, LABEL_SCALE, font, &format_tick(bar.vmax));
    let vmin_y = bottom.saturating_sub(LABEL_SCALE as u32).max(top) as i32;
    draw_text_mut(image, TEXT_COLOR, label_x, vmin_y, LABEL_SCALE, font, &format_tick(bar.vmin));

    if let Some(label) = bar.missing_label {
        let swatch = PixelRect::at(left as i32, (bottom + MARGIN) as i32).of_size(SWATCH_SIZE, SWATCH_SIZE);
        draw_filled_rect_mut(image, swatch, style.missing_color);
        draw_hollow_rect_mut(image, swatch, style.edge_color);
        let label_y = bottom + MARGIN + (SWATCH_SIZE - LABEL_SCALE as u32) / 2;
        draw_text_mut(
            image,
            TEXT_COLOR,
            (left + SWATCH_SIZE + LABEL_GAP) as i32,
            label_y as i32,
            LABEL_SCALE,
            font,
            label,
        );
    }
}

/// Parse `#rrggbb` or `#rrggbbaa`.
pub fn hex_to_rgba(hex: &str) -> Result<Rgba<u8>> {
    let digits = hex.trim_start_matches('#');
    let invalid = || LanduseError::InvalidStyle(format!("invalid hex colour '{}'", hex));
    if !(digits.len() == 6 || digits.len() == 8) || !digits.is_ascii() {
        return Err(invalid());
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
    let alpha = if digits.len() == 8 { channel(6)? } else { 255 };
    Ok(Rgba([channel(0)?, channel(2)?, channel(4)?, alpha]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Feature, Value};
    use geo::{polygon, MultiPolygon};

    fn square(x: f64, y: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: x, y: y),
            (x: x + 1.0, y: y),
            (x: x + 1.0, y: y + 1.0),
            (x: x, y: y + 1.0),
            (x: x, y: y),
        ]])
    }

    fn two_squares(first: Value, second: Value) -> FeatureCollection {
        let mut fc = FeatureCollection::new(vec!["NUTS_ID".into(), "temp_mean".into()]);
        fc.features.push(Feature {
            geometry: Some(square(0.0, 0.0)),
            values: vec![Value::Text("DE1".into()), first],
        });
        fc.features.push(Feature {
            geometry: Some(square(2.0, 0.0)),
            values: vec![Value::Text("DE2".into()), second],
        });
        fc
    }

    fn style() -> StyleOptions {
        StyleOptions {
            width: 400,
            height: 200,
            ..StyleOptions::default()
        }
    }

    fn pixel_at(map: &Choropleth, x: f64, y: f64) -> Rgba<u8> {
        let (px, py) = map.frame.to_pixel(x, y);
        *map.image.get_pixel(px as u32, py as u32)
    }

    #[test]
    fn test_hex_to_rgba() {
        assert_eq!(hex_to_rgba("#d3d3d3").unwrap(), Rgba([211, 211, 211, 255]));
        assert_eq!(hex_to_rgba("00000080").unwrap(), Rgba([0, 0, 0, 128]));
        assert!(hex_to_rgba("#12").unwrap_err().is_invalid_input());
        assert!(hex_to_rgba("#zzzzzz").is_err());
    }

    #[test]
    fn test_colormap_endpoints() {
        assert_eq!(Colormap::Blues.sample(0.0), Rgba([0xf7, 0xfb, 0xff, 255]));
        assert_eq!(Colormap::Blues.sample(1.0), Rgba([0x08, 0x30, 0x6b, 255]));
        assert_eq!(Colormap::Viridis.sample(2.0), Rgba([0xfd, 0xe7, 0x25, 255]));
        assert_eq!("Viridis".parse::<Colormap>().unwrap(), Colormap::Viridis);
        assert!("jet".parse::<Colormap>().unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_missing_values_use_neutral_colour() {
        let fc = two_squares(Value::Number(10.0), Value::Missing);
        let style = style();
        let map = render_choropleth(&fc, "temp_mean", &style).unwrap();

        assert_eq!(map.image.dimensions(), (400, 200));
        assert_eq!(pixel_at(&map, 0.5, 0.5), style.cmap.sample(0.0));
        assert_eq!(pixel_at(&map, 2.5, 0.5), style.missing_color);
        assert_eq!(map.legend.missing_label.as_deref(), Some("No data"));
        assert_eq!(map.legend.vmin, 10.0);
        assert_eq!(map.legend.vmax, 10.0);
    }

    #[test]
    fn test_scale_spans_data_range() {
        let fc = two_squares(Value::Number(0.0), Value::Number(4.0));
        let style = StyleOptions {
            cmap: Colormap::Reds,
            ..style()
        };
        let map = render_choropleth(&fc, "temp_mean", &style).unwrap();
        assert_eq!(pixel_at(&map, 0.5, 0.5), Colormap::Reds.sample(0.0));
        assert_eq!(pixel_at(&map, 2.5, 0.5), Colormap::Reds.sample(1.0));
        assert_eq!(map.legend.missing_label, None);
        // gap between the squares stays blank
        assert_eq!(pixel_at(&map, 1.5, 0.5), BACKGROUND);
    }

    #[test]
    fn test_explicit_limits() {
        let fc = two_squares(Value::Number(5.0), Value::Number(50.0));
        let style = StyleOptions {
            vmin: Some(0.0),
            vmax: Some(10.0),
            ..style()
        };
        let map = render_choropleth(&fc, "temp_mean", &style).unwrap();
        assert_eq!(pixel_at(&map, 2.5, 0.5), style.cmap.sample(1.0));
        assert_eq!(map.legend.vmax, 10.0);
    }

    fn has_ink(image: &RgbaImage, xs: std::ops::Range<u32>, ys: std::ops::Range<u32>) -> bool {
        ys.flat_map(|y| xs.clone().map(move |x| (x, y)))
            .any(|(x, y)| *image.get_pixel(x, y) != BACKGROUND)
    }

    #[test]
    fn test_title_drawn_above_map() {
        let fc = two_squares(Value::Number(1.0), Value::Number(2.0));
        let style = StyleOptions {
            title: Some("DE NUTS2 - temp_mean (2022)".into()),
            ..style()
        };
        let map = render_choropleth(&fc, "temp_mean", &style).unwrap();
        assert_eq!(map.title, "DE NUTS2 - temp_mean (2022)");
        assert!(has_ink(&map.image, 0..300, 0..TITLE_HEIGHT));
        // the map itself starts below the title band
        assert!(map.frame.to_pixel(0.0, 1.0).1 >= (TITLE_HEIGHT + MARGIN) as f64);

        // the column name stands in for a missing title
        let untitled = render_choropleth(&fc, "temp_mean", &self::style()).unwrap();
        assert_eq!(untitled.title, "temp_mean");
        assert!(has_ink(&untitled.image, 0..300, 0..TITLE_HEIGHT));
    }

    #[test]
    fn test_legend_labels_drawn() {
        let fc = two_squares(Value::Number(10.0), Value::Missing);
        let map = render_choropleth(&fc, "temp_mean", &style()).unwrap();
        let label_x = 300 + BAR_OFFSET + BAR_WIDTH + LABEL_GAP;
        let top = TITLE_HEIGHT + MARGIN;
        let bottom = 200 - MARGIN - SWATCH_SIZE - MARGIN;

        // vmax next to the top of the bar, vmin next to the bottom
        assert!(has_ink(&map.image, label_x..400, top..top + LABEL_SCALE as u32));
        assert!(has_ink(&map.image, label_x..400, bottom - LABEL_SCALE as u32..bottom));
        // "No data" beside the swatch
        let swatch_left = 300 + BAR_OFFSET;
        let swatch_top = bottom + MARGIN;
        assert_eq!(
            *map.image.get_pixel(swatch_left + SWATCH_SIZE / 2, swatch_top + SWATCH_SIZE / 2),
            style().missing_color
        );
        assert!(has_ink(
            &map.image,
            swatch_left + SWATCH_SIZE + LABEL_GAP..400,
            swatch_top..swatch_top + SWATCH_SIZE
        ));
    }

    #[test]
    fn test_legend_can_be_hidden() {
        let fc = two_squares(Value::Number(1.0), Value::Number(2.0));
        let style = StyleOptions {
            legend: false,
            ..style()
        };
        let map = render_choropleth(&fc, "temp_mean", &style).unwrap();
        assert!(!has_ink(&map.image, 395..400, TITLE_HEIGHT..200));
    }

    #[test]
    fn test_rows_without_geometry_dont_add_no_data_entry() {
        let mut fc = two_squares(Value::Number(1.0), Value::Number(2.0));
        fc.features.push(Feature {
            geometry: None,
            values: vec![Value::Text("DEZ".into()), Value::Missing],
        });
        let map = render_choropleth(&fc, "temp_mean", &style()).unwrap();
        assert_eq!(map.legend.missing_label, None);

        // a drawn feature without a value still gets the entry
        fc.features.push(Feature {
            geometry: Some(square(4.0, 0.0)),
            values: vec![Value::Text("DE3".into()), Value::Missing],
        });
        let map = render_choropleth(&fc, "temp_mean", &style()).unwrap();
        assert_eq!(map.legend.missing_label.as_deref(), Some("No data"));
    }

    #[test]
    fn test_tick_labels() {
        assert_eq!(format_tick(9.5), "9.50");
        assert_eq!(format_tick(-0.5), "-0.50");
        assert_eq!(format_tick(12345.6), "12346");
    }

    #[test]
    fn test_absent_column() {
        let fc = two_squares(Value::Number(1.0), Value::Number(2.0));
        let err = render_choropleth(&fc, "v_mean", &style()).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_too_small_image() {
        let fc = two_squares(Value::Number(1.0), Value::Number(2.0));
        let tiny = StyleOptions {
            width: 50,
            height: 50,
            ..StyleOptions::default()
        };
        assert!(render_choropleth(&fc, "temp_mean", &tiny).is_err());
    }
}
