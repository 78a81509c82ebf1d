use std::fmt::Write as _;
use std::path::Path;
use tracing::info;

use crate::models::CombinedDataset;
use crate::services::chart_service::RenderedChart;

const STYLE: &str = "body{font-family:sans-serif;margin:24px;color:#222}\
table{border-collapse:collapse;margin-top:16px}\
th,td{padding:4px 12px;border-bottom:1px solid #ddd;text-align:right}\
th:first-child,td:first-child{text-align:left}\
tbody tr:hover{background:#ffe9a8}\
.missing{color:#999}\
.chart{position:relative;display:inline-block}\
.chart>svg{display:block}\
.chart .hover{position:absolute;left:0;top:0}\
.hover circle{fill:transparent;stroke:transparent;stroke-width:2;pointer-events:all}\
.hover circle:hover{fill:#ffe9a8;stroke:#222}";

/// Minimal escaping for text placed in HTML element content
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Transparent layer over the chart with one `<title>` tooltip per point
fn hover_layer(chart: &RenderedChart) -> String {
    let mut layer = String::new();
    let _ = write!(
        layer,
        "<svg class=\"hover\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" xmlns=\"http://www.w3.org/2000/svg\">",
        w = chart.width,
        h = chart.height
    );
    for marker in &chart.markers {
        let _ = write!(
            layer,
            "<circle cx=\"{}\" cy=\"{}\" r=\"6\"><title>{}</title></circle>",
            marker.x,
            marker.y,
            escape_html(&format!(
                "{} {}: {:.3} {}",
                marker.instrument.label(),
                marker.month,
                marker.price,
                marker.instrument.unit().symbol()
            ))
        );
    }
    layer.push_str("</svg>");
    layer
}

/// Build the dashboard page: the chart followed by a month-by-instrument grid
///
/// The chart SVG is embedded as-is; it comes from the chart service, not from
/// the feed.
pub fn render_dashboard(dataset: &CombinedDataset, chart: &RenderedChart) -> String {
    let title = format!("Energy Futures Settlements, {}", escape_html(&dataset.trade_date));
    let instruments = dataset.instruments();

    let mut html = String::new();
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>{}</style>\n</head>\n<body>\n<h1>{}</h1>\n",
        title, STYLE, title
    );
    let _ = writeln!(html, "<div class=\"chart\">{}{}</div>", chart.svg, hover_layer(chart));

    if dataset.is_empty() {
        html.push_str("<p class=\"missing\">No settlements published for this date.</p>\n</body>\n</html>\n");
        return html;
    }

    html.push_str("<table>\n<thead><tr><th>Settlement Month</th>");
    for instrument in &instruments {
        let _ = write!(
            html,
            "<th>{} ({})</th>",
            escape_html(instrument.label()),
            escape_html(instrument.unit().symbol())
        );
    }
    html.push_str("</tr></thead>\n<tbody>\n");

    for month in dataset.months() {
        let _ = write!(html, "<tr><td>{}</td>", escape_html(&month.to_string()));
        for instrument in &instruments {
            match dataset.price(*instrument, month) {
                Some(price) => {
                    let _ = write!(html, "<td>{:.3}</td>", price);
                }
                None => html.push_str("<td class=\"missing\">n/a</td>"),
            }
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    html
}

/// Write the rendered page to `path`
pub fn write_dashboard(path: &Path, html: &str) -> std::io::Result<()> {
    std::fs::write(path, html)?;
    info!("Dashboard written to {} ({} bytes)", path.display(), html.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CombinedRow, ContractMonth, Instrument};
    use crate::services::chart_service::ChartMarker;

    fn dataset() -> CombinedDataset {
        let feb = ContractMonth::new(2024, 2).unwrap();
        let mar = ContractMonth::new(2024, 3).unwrap();
        CombinedDataset {
            trade_date: "2024-01-05".to_string(),
            rows: vec![
                CombinedRow { instrument: Instrument::Wti, contract_month: feb, settlement_price: Some(73.81) },
                CombinedRow { instrument: Instrument::Wti, contract_month: mar, settlement_price: None },
                CombinedRow { instrument: Instrument::HenryHub, contract_month: mar, settlement_price: Some(2.61) },
            ],
        }
    }

    fn chart(markers: Vec<ChartMarker>) -> RenderedChart {
        RenderedChart {
            svg: "<svg></svg>".to_string(),
            width: 800,
            height: 500,
            markers,
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<b>&'\""), "&lt;b&gt;&amp;&#39;&quot;");
        assert_eq!(escape_html("WTI"), "WTI");
    }

    #[test]
    fn test_dashboard_grid() {
        let html = render_dashboard(&dataset(), &chart(Vec::new()));
        assert!(html.contains("<title>Energy Futures Settlements, 2024-01-05</title>"));
        assert!(html.contains("<div class=\"chart\"><svg></svg><svg class=\"hover\" width=\"800\" height=\"500\""));
        assert!(html.contains("<th>Henry Hub ($/MMBtu)</th>"));
        assert!(html.contains("<tr><td>Feb 2024</td><td>73.810</td><td class=\"missing\">n/a</td></tr>"));
        assert!(html.contains("<tr><td>Mar 2024</td><td class=\"missing\">n/a</td><td>2.610</td></tr>"));
        assert!(!html.contains("<th>Brent"));
    }

    #[test]
    fn test_empty_dataset_has_no_grid() {
        let empty = CombinedDataset {
            trade_date: "2024-01-05".to_string(),
            rows: Vec::new(),
        };
        let html = render_dashboard(&empty, &chart(Vec::new()));
        assert!(html.contains("No settlements published"));
        assert!(!html.contains("<table>"));
    }

    #[test]
    fn test_point_tooltips() {
        let markers = vec![
            ChartMarker { instrument: Instrument::Wti, month: "Feb 2024".to_string(), price: 73.81, x: 120, y: 88 },
            ChartMarker { instrument: Instrument::HenryHub, month: "Mar 2024".to_string(), price: 2.61, x: 410, y: 300 },
        ];
        let html = render_dashboard(&dataset(), &chart(markers));
        assert!(html.contains("<circle cx=\"120\" cy=\"88\" r=\"6\"><title>WTI Feb 2024: 73.810 $/BBL</title></circle>"));
        assert!(html.contains("<circle cx=\"410\" cy=\"300\" r=\"6\"><title>Henry Hub Mar 2024: 2.610 $/MMBtu</title></circle>"));
        assert!(html.contains(".hover circle:hover"));
    }

    #[test]
    fn test_write_dashboard() {
        let path = std::env::temp_dir().join(format!("settle_board_{}.html", std::process::id()));
        write_dashboard(&path, "<html></html>").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<html></html>");
        let _ = std::fs::remove_file(&path);
    }
}
