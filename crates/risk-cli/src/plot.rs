use anyhow::Result;
use plotters::prelude::*;
use risk_core::engine::risk_composer::SectorRisk;

/// Render a horizontal-bar chart of one model's sector risk, sorted
/// descending by `risk_sector`.
pub fn render_sector_risk_chart(rows: &[SectorRisk], model_id: &str, path: &std::path::Path) -> Result<()> {
    let mut sorted: Vec<&SectorRisk> = rows.iter().filter(|r| r.model_id == model_id).collect();
    sorted.sort_by(|a, b| b.risk_sector.partial_cmp(&a.risk_sector).unwrap_or(std::cmp::Ordering::Equal));

    let height = 60 + sorted.len() as u32 * 32;
    let root = BitMapBackend::new(path, (1100, height)).into_drawing_area();
    root.fill(&WHITE)?;

    let labels: Vec<String> = sorted.iter().map(|r| r.sector.code()).collect();
    let max_risk = sorted.iter().map(|r| r.risk_sector).fold(0.0_f64, f64::max).max(1e-6);

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Sector risk — {model_id}"), ("sans-serif", 22).into_font())
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(90)
        .build_cartesian_2d(0.0..(max_risk * 1.1), 0..labels.len())?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .x_desc("risk_sector")
        .y_label_formatter(&|idx| labels.get(*idx).cloned().unwrap_or_default())
        .draw()?;

    chart.draw_series(sorted.iter().enumerate().map(|(i, r)| {
        let mut bar = Rectangle::new([(0.0, i), (r.risk_sector, i + 1)], RGBColor(69, 123, 157).filled());
        bar.set_margin(4, 4, 0, 0);
        bar
    }))?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use risk_core::model::NaicsSector;

    #[test]
    fn render_sector_risk_chart_creates_valid_png() {
        let rows = vec![
            SectorRisk {
                model_id: "model-a".into(),
                sector: NaicsSector::Sector51,
                total_emp: 1000.0,
                exposure_emp: 400.0,
                affected_emp: 200.0,
                risk_sector: 0.2,
                effective_win: 0.5,
                emp_share: 1.0,
                contribution_to_national: 0.2,
            },
        ];
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("sector_risk.png");
        render_sector_risk_chart(&rows, "model-a", &path).expect("render failed");
        let bytes = std::fs::read(&path).expect("read png");
        assert_eq!(&bytes[..4], &[0x89, 0x50, 0x4E, 0x47]);
    }
}
