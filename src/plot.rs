// Trend plotter: position-over-time series extraction and PNG rendering.
use crate::model::{AnalysisRecord, PlotError};
use chrono::{DateTime, Utc};
use plotters::prelude::*;
use std::path::Path;

/// `(timestamp, position)` for every analysis document the product appears
/// in, in document scan order.
pub fn extract_positions(
    records: &[AnalysisRecord],
    product_id: u64,
) -> Vec<(DateTime<Utc>, u32)> {
    records
        .iter()
        .filter_map(|record| {
            record
                .combined()
                .find(|p| p.id == product_id)
                .map(|p| (record.timestamp, p.position))
        })
        .collect()
}

/// Display name from the product's first appearance.
pub fn product_name(records: &[AnalysisRecord], product_id: u64) -> Option<String> {
    records.iter().find_map(|record| {
        record
            .combined()
            .find(|p| p.id == product_id)
            .map(|p| p.name.clone())
    })
}

/// Renders position over time. Rank 1 is best, so the y axis is drawn
/// inverted: positions are plotted negated and the labels flipped back,
/// with best/worst reference lines and a 5-position pad floored at 1.
pub fn render(
    path: &Path,
    title: &str,
    series: &[(DateTime<Utc>, u32)],
) -> Result<(), PlotError> {
    let best = series.iter().map(|(_, p)| *p).min().unwrap_or(1);
    let worst = series.iter().map(|(_, p)| *p).max().unwrap_or(1);

    let x_from = series.first().map(|(t, _)| *t).unwrap_or_else(Utc::now);
    let mut x_to = series.last().map(|(t, _)| *t).unwrap_or(x_from);
    if x_to <= x_from {
        x_to = x_from + chrono::Duration::minutes(1);
    }

    let y_low = -(i64::from(worst) + 5);
    let y_high = -i64::from(best.saturating_sub(5).max(1));

    let root = BitMapBackend::new(path, (1200, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(to_render_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(12)
        .x_label_area_size(44)
        .y_label_area_size(48)
        .build_cartesian_2d(x_from..x_to, y_low..y_high)
        .map_err(to_render_err)?;

    chart
        .configure_mesh()
        .x_desc("Time")
        .y_desc("Position (1 = best)")
        .x_label_formatter(&|t| t.format("%m-%d %H:%M").to_string())
        .y_label_formatter(&|y| (-y).to_string())
        .draw()
        .map_err(to_render_err)?;

    let points: Vec<(DateTime<Utc>, i64)> = series
        .iter()
        .map(|(t, p)| (*t, -i64::from(*p)))
        .collect();

    chart
        .draw_series(LineSeries::new(points.clone(), &BLUE))
        .map_err(to_render_err)?;
    chart
        .draw_series(
            points
                .iter()
                .map(|(t, y)| Circle::new((*t, *y), 3, BLUE.filled())),
        )
        .map_err(to_render_err)?;

    chart
        .draw_series(LineSeries::new(
            vec![(x_from, -i64::from(best)), (x_to, -i64::from(best))],
            &GREEN,
        ))
        .map_err(to_render_err)?
        .label(format!("Best Position: {best}"))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], GREEN));
    chart
        .draw_series(LineSeries::new(
            vec![(x_from, -i64::from(worst)), (x_to, -i64::from(worst))],
            &RED,
        ))
        .map_err(to_render_err)?
        .label(format!("Worst Position: {worst}"))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], RED));

    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .background_style(&WHITE.mix(0.8))
        .draw()
        .map_err(to_render_err)?;

    root.present().map_err(to_render_err)?;
    Ok(())
}

fn to_render_err<E: std::fmt::Display>(e: E) -> PlotError {
    PlotError::Render(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProductEntry;
    use chrono::TimeZone;

    fn entry(id: u64, position: u32, name: &str) -> ProductEntry {
        ProductEntry {
            position,
            previous_position: position,
            position_change: 0,
            id,
            name: name.to_string(),
            brand: String::new(),
            rating: 0.0,
            feedbacks: 0,
            price: None,
        }
    }

    fn record(
        seconds: i64,
        advertised: Vec<ProductEntry>,
        organic: Vec<ProductEntry>,
    ) -> AnalysisRecord {
        AnalysisRecord {
            timestamp: Utc.timestamp_opt(seconds, 0).unwrap(),
            total_products: advertised.len() + organic.len(),
            advertised_count: advertised.len(),
            organic_count: organic.len(),
            advertised_products: advertised,
            organic_products: organic,
            position_changes: vec![],
        }
    }

    #[test]
    fn series_spans_documents_in_scan_order() {
        let records = vec![
            record(0, vec![entry(7, 2, "a")], vec![]),
            record(300, vec![], vec![entry(9, 1, "x")]),
            record(600, vec![], vec![entry(7, 5, "a")]),
        ];

        let series = extract_positions(&records, 7);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0], (Utc.timestamp_opt(0, 0).unwrap(), 2));
        assert_eq!(series[1], (Utc.timestamp_opt(600, 0).unwrap(), 5));
    }

    #[test]
    fn unknown_product_yields_empty_series() {
        let records = vec![record(0, vec![entry(1, 1, "a")], vec![])];
        assert!(extract_positions(&records, 99).is_empty());
        assert_eq!(product_name(&records, 99), None);
    }

    #[test]
    fn name_comes_from_first_appearance() {
        let records = vec![
            record(0, vec![], vec![entry(7, 3, "old name")]),
            record(300, vec![], vec![entry(7, 1, "new name")]),
        ];
        assert_eq!(product_name(&records, 7).as_deref(), Some("old name"));
    }
}
