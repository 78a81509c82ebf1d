use chrono::{DateTime, Utc};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;
use thiserror::Error;

use crate::models::{ChartAxis, CombinedDataset, Instrument, PriceUnit};

/// Canvas position of one plotted settlement
#[derive(Debug, Clone, PartialEq)]
pub struct ChartMarker {
    pub instrument: Instrument,
    pub month: String,
    pub price: f64,
    pub x: i32,
    pub y: i32,
}

/// An SVG chart plus the marker positions the dashboard uses for tooltips
#[derive(Debug, Clone)]
pub struct RenderedChart {
    pub svg: String,
    pub width: u32,
    pub height: u32,
    pub markers: Vec<ChartMarker>,
}

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Not enough price data to generate chart ({0} priced point(s), need at least 2)")]
    NotEnoughData(usize),
    #[error("Failed to draw chart: {0}")]
    Draw(String),
}

/// Line colours, in `Instrument::ALL` order
fn series_color(instrument: Instrument) -> RGBColor {
    match instrument {
        Instrument::Wti => RGBColor(27, 158, 119),
        Instrument::HenryHub => RGBColor(217, 95, 2),
        Instrument::Brent => RGBColor(117, 112, 179),
    }
}

/// Plotted points for one instrument; months without a price are skipped
fn series_points(dataset: &CombinedDataset, instrument: Instrument) -> Vec<(DateTime<Utc>, f64)> {
    let mut points: Vec<(DateTime<Utc>, f64)> = dataset
        .for_instrument(instrument)
        .filter_map(|row| {
            let price = row.settlement_price?;
            let day = row.contract_month.first_day()?;
            let timestamp = DateTime::<Utc>::from_naive_utc_and_offset(day.and_hms_opt(0, 0, 0)?, Utc);
            Some((timestamp, price))
        })
        .collect();

    points.sort_by_key(|(timestamp, _)| *timestamp);
    points
}

/// Pad a price range by 10% so lines never sit on the frame
///
/// The floor stays at zero for all-positive curves; a negative settlement
/// keeps its own padded minimum.
fn padded_range(bounds: Option<(f64, f64)>) -> std::ops::Range<f64> {
    match bounds {
        Some((min_price, max_price)) => {
            let price_range = (max_price - min_price).max(1e-8);
            let padding = (price_range * 0.1).max(max_price.abs() * 0.01);
            let lower = min_price - padding;
            let lower = if min_price >= 0.0 { lower.max(0.0) } else { lower };
            lower..max_price + padding
        }
        None => 0.0..1.0,
    }
}

fn axis_title(axis: ChartAxis) -> String {
    match axis {
        ChartAxis::Oil => format!("Oil Price, {}", PriceUnit::DollarsPerBarrel.symbol()),
        ChartAxis::Gas => format!("Gas Price, {}", PriceUnit::DollarsPerMmbtu.symbol()),
    }
}

/// Draw the dual-axis settlement curve onto any plotters backend
///
/// Oil-priced instruments use the left axis, gas uses the right one so the
/// two scales stay independent. Returns where each point landed on the
/// canvas.
fn draw_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    dataset: &CombinedDataset,
) -> Result<Vec<ChartMarker>, ChartError> {
    let priced = dataset.priced_points();
    if priced < 2 {
        return Err(ChartError::NotEnoughData(priced));
    }

    let series: Vec<(Instrument, Vec<(DateTime<Utc>, f64)>)> = dataset
        .instruments()
        .into_iter()
        .map(|instrument| (instrument, series_points(dataset, instrument)))
        .filter(|(_, points)| !points.is_empty())
        .collect();

    let x_min = series
        .iter()
        .filter_map(|(_, points)| points.first().map(|p| p.0))
        .min()
        .ok_or(ChartError::NotEnoughData(priced))?;
    let mut x_max = series
        .iter()
        .filter_map(|(_, points)| points.last().map(|p| p.0))
        .max()
        .ok_or(ChartError::NotEnoughData(priced))?;
    if x_max <= x_min {
        x_max = x_min + chrono::Duration::days(31);
    }

    let oil_range = padded_range(dataset.price_bounds(ChartAxis::Oil));
    let gas_range = padded_range(dataset.price_bounds(ChartAxis::Gas));

    root.fill(&WHITE)
        .map_err(|e| ChartError::Draw(format!("Failed to fill canvas: {}", e)))?;

    let mut chart = ChartBuilder::on(root)
        .caption(
            format!("Futures Settlements, {}", dataset.trade_date),
            ("sans-serif", 32.0).into_font(),
        )
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .right_y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, oil_range)
        .map_err(|e| ChartError::Draw(format!("Failed to build chart: {}", e)))?
        .set_secondary_coord(x_min..x_max, gas_range);

    let month_label = |t: &DateTime<Utc>| t.format("%b %y").to_string();
    chart
        .configure_mesh()
        .x_desc("Settlement Month")
        .y_desc(axis_title(ChartAxis::Oil))
        .x_label_formatter(&month_label)
        .draw()
        .map_err(|e| ChartError::Draw(format!("Failed to draw mesh: {}", e)))?;

    chart
        .configure_secondary_axes()
        .y_desc(axis_title(ChartAxis::Gas))
        .draw()
        .map_err(|e| ChartError::Draw(format!("Failed to draw secondary axis: {}", e)))?;

    for (instrument, points) in &series {
        let color = series_color(*instrument);
        let line = LineSeries::new(points.iter().copied(), color.stroke_width(2));
        let markers = points.iter().map(|p| Circle::new(*p, 3, color.filled()));

        let annotation = match instrument.axis() {
            ChartAxis::Oil => chart.draw_series(line),
            ChartAxis::Gas => chart.draw_secondary_series(line),
        }
        .map_err(|e| ChartError::Draw(format!("Failed to draw {} line: {}", instrument, e)))?;

        annotation
            .label(instrument.label())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));

        let drawn = match instrument.axis() {
            ChartAxis::Oil => chart.draw_series(markers),
            ChartAxis::Gas => chart.draw_secondary_series(markers),
        };
        drawn.map_err(|e| ChartError::Draw(format!("Failed to draw {} points: {}", instrument, e)))?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(|e| ChartError::Draw(format!("Failed to draw legend: {}", e)))?;

    let mut markers = Vec::with_capacity(priced);
    for (instrument, points) in &series {
        for point in points {
            let (x, y) = match instrument.axis() {
                ChartAxis::Oil => chart.backend_coord(point),
                ChartAxis::Gas => chart.borrow_secondary().backend_coord(point),
            };
            markers.push(ChartMarker {
                instrument: *instrument,
                month: point.0.format("%b %Y").to_string(),
                price: point.1,
                x,
                y,
            });
        }
    }

    root.present()
        .map_err(|e| ChartError::Draw(format!("Failed to render chart: {}", e)))?;

    Ok(markers)
}

/// Render the chart as an SVG document
pub fn render_svg(dataset: &CombinedDataset, width: u32, height: u32) -> Result<RenderedChart, ChartError> {
    let mut svg = String::new();
    let markers = {
        let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
        draw_chart(&root, dataset)?
    };
    Ok(RenderedChart {
        svg,
        width,
        height,
        markers,
    })
}

/// Render the chart to a PNG file
pub fn render_png(dataset: &CombinedDataset, path: &Path, width: u32, height: u32) -> Result<(), ChartError> {
    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    draw_chart(&root, dataset).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CombinedRow, ContractMonth};

    fn row(instrument: Instrument, month: u32, price: Option<f64>) -> CombinedRow {
        CombinedRow {
            instrument,
            contract_month: ContractMonth::new(2024, month).unwrap(),
            settlement_price: price,
        }
    }

    fn dataset(rows: Vec<CombinedRow>) -> CombinedDataset {
        CombinedDataset {
            trade_date: "2024-01-05".to_string(),
            rows,
        }
    }

    #[test]
    fn test_padded_range() {
        let range = padded_range(Some((70.0, 80.0)));
        assert!((range.start - 69.0).abs() < 1e-9);
        assert!((range.end - 81.0).abs() < 1e-9);
        assert_eq!(padded_range(None), 0.0..1.0);
        let flat = padded_range(Some((2.5, 2.5)));
        assert!(flat.start < 2.5 && flat.end > 2.5);
    }

    #[test]
    fn test_padded_range_keeps_negative_prices() {
        // WTI front month, 2020-04-20
        let range = padded_range(Some((-37.63, 60.0)));
        assert!(range.start < -37.63);
        assert!(range.end > 60.0);
        assert!((range.start - (-37.63 - 9.763)).abs() < 1e-9);

        let low = padded_range(Some((0.5, 60.0)));
        assert_eq!(low.start, 0.0);
    }

    #[test]
    fn test_series_points_skip_missing_and_sort() {
        let data = dataset(vec![
            row(Instrument::Wti, 3, Some(73.95)),
            row(Instrument::Wti, 2, Some(73.81)),
            row(Instrument::Wti, 4, None),
            row(Instrument::Brent, 2, Some(78.0)),
        ]);
        let points = series_points(&data, Instrument::Wti);
        assert_eq!(points.len(), 2);
        assert!(points[0].0 < points[1].0);
        assert_eq!(points[0].1, 73.81);
    }

    #[test]
    fn test_not_enough_data() {
        let data = dataset(vec![row(Instrument::Wti, 2, Some(73.81)), row(Instrument::Wti, 3, None)]);
        assert!(matches!(render_svg(&data, 640, 480), Err(ChartError::NotEnoughData(1))));
    }

    #[test]
    fn test_render_svg_with_both_axes() {
        let data = dataset(vec![
            row(Instrument::Wti, 2, Some(73.81)),
            row(Instrument::Wti, 3, Some(73.95)),
            row(Instrument::HenryHub, 2, Some(2.905)),
            row(Instrument::HenryHub, 3, Some(2.61)),
            row(Instrument::Brent, 3, Some(78.76)),
            row(Instrument::Brent, 4, None),
        ]);
        let chart = render_svg(&data, 800, 500).unwrap();
        assert!(chart.svg.starts_with("<svg"));
        assert!(chart.svg.contains("2024-01-05"));
        assert!(chart.svg.contains("Henry Hub"));
        assert!(chart.svg.contains("Gas Price"));
        assert_eq!((chart.width, chart.height), (800, 500));

        assert_eq!(chart.markers.len(), 5);
        for marker in &chart.markers {
            assert!((0..800).contains(&marker.x), "{:?}", marker);
            assert!((0..500).contains(&marker.y), "{:?}", marker);
        }
        let wti: Vec<&ChartMarker> = chart.markers.iter().filter(|m| m.instrument == Instrument::Wti).collect();
        assert_eq!(wti[0].month, "Feb 2024");
        assert!(wti[0].x < wti[1].x);
        // higher price sits higher on the canvas
        assert!(wti[0].y > wti[1].y);
    }

    #[test]
    fn test_render_svg_plots_negative_settlement() {
        let data = dataset(vec![
            row(Instrument::Wti, 5, Some(-37.63)),
            row(Instrument::Wti, 6, Some(20.43)),
            row(Instrument::Brent, 6, Some(25.57)),
        ]);
        let chart = render_svg(&data, 800, 500).unwrap();
        let negative = chart.markers.iter().find(|m| m.price < 0.0).unwrap();
        assert!((0..500).contains(&negative.y));
        let highest = chart.markers.iter().map(|m| m.y).min().unwrap();
        assert!(negative.y > highest);
    }
}
