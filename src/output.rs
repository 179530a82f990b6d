use crate::charts::ChartPreview;
use crate::error::Result;
use crate::reports::Rendered;
use crate::types::Kpi;
use serde::Serialize;
use std::path::Path;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

pub const PAGE_TITLE: &str = "Executive KPI Dashboards";

#[derive(Serialize)]
struct JsonOut<T> {
    ok: bool,
    data: T,
}

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn print_json<T: Serialize>(data: T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(&JsonOut { ok: true, data })?
    );
    Ok(())
}

/// KPI titles on one row, their values on the next.
pub fn kpi_strip(kpis: &[Kpi]) -> String {
    let mut builder = Builder::default();
    builder.push_record(kpis.iter().map(|k| k.title.clone()));
    builder.push_record(kpis.iter().map(|k| k.value.clone()));
    let mut table = builder.build();
    table.with(Style::markdown());
    table.to_string()
}

pub fn preview_table(preview: &ChartPreview) -> String {
    let mut builder = Builder::default();
    builder.push_record(preview.headers.iter().cloned());
    for row in &preview.rows {
        builder.push_record(row.iter().cloned());
    }
    let mut table = builder.build();
    table.with(Style::markdown());
    table.to_string()
}

/// Plain-text page for one selection.
pub fn render_text(r: &Rendered) -> String {
    let mut out = String::new();
    out.push_str(PAGE_TITLE);
    out.push('\n');
    if let Some(title) = r.title {
        out.push_str(&format!("{}: {} Dashboard\n\n", r.label, title));
    } else {
        out.push_str(&format!("{}\n\n", r.label));
    }
    if !r.kpis.is_empty() {
        out.push_str(&kpi_strip(&r.kpis));
        out.push_str("\n\n");
    }
    if let (Some(chart), Some(preview)) = (&r.chart, &r.preview) {
        let spec = &chart.spec;
        let mut bindings = format!("x={}", spec.x);
        if let Some(y) = spec.y {
            bindings.push_str(&format!(", y={y}"));
        }
        if let Some(color) = spec.color {
            bindings.push_str(&format!(", color={color}"));
        }
        out.push_str(&format!("{} ({} chart: {})\n", spec.title, spec.kind, bindings));
        if preview.rows.is_empty() {
            out.push_str("(no rows)\n\n");
        } else {
            out.push_str(&preview_table(preview));
            out.push_str(&format!("\n({} points)\n\n", chart.points.len()));
        }
    }
    if let Some(notice) = r.notice {
        out.push_str(notice);
        out.push('\n');
    }
    out
}

pub fn print_rendered(r: &Rendered, json: bool) -> Result<()> {
    if json {
        print_json(r)
    } else {
        print!("{}", render_text(r));
        Ok(())
    }
}

pub fn print_rows<T>(rows: &[T], json: bool) -> Result<()>
where
    T: Tabled + Serialize + Clone,
{
    if json {
        return print_json(rows);
    }
    if rows.is_empty() {
        println!("(no rows)\n");
        return Ok(());
    }
    let table_str = Table::new(rows.to_vec()).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
    Ok(())
}
