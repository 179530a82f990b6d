// Chart descriptions bound to table data, plus the small text summaries the
// terminal shows in place of a drawn chart.
use crate::error::Result;
use crate::types::{GroupKey, Table, Value};
use crate::util::{format_fixed, format_number, quantile};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

const HISTOGRAM_BINS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Histogram,
    Scatter,
    Box,
    Bar,
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChartKind::Line => "line",
            ChartKind::Histogram => "histogram",
            ChartKind::Scatter => "scatter",
            ChartKind::Box => "box",
            ChartKind::Bar => "bar",
        })
    }
}

/// Chart kind and column bindings of one report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: &'static str,
    pub x: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub x: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Value>,
}

/// A chart spec with its bound points, one per table row in row order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    #[serde(flatten)]
    pub spec: ChartSpec,
    pub points: Vec<ChartPoint>,
}

/// Tabular text summary of a chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPreview {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Chart {
    /// Bind `spec` to `table`. Every bound column must exist.
    pub fn build(spec: ChartSpec, table: &Table) -> Result<Chart> {
        let x = table.column(spec.x)?;
        let y = spec.y.map(|name| table.column(name)).transpose()?;
        let color = spec.color.map(|name| table.column(name)).transpose()?;
        let points = (0..table.rows)
            .map(|row| ChartPoint {
                x: x.value(row),
                y: y.map(|c| c.value(row)),
                color: color.map(|c| c.value(row)),
            })
            .collect();
        Ok(Chart { spec, points })
    }

    pub fn preview(&self, max_rows: usize) -> ChartPreview {
        match self.spec.kind {
            ChartKind::Line | ChartKind::Scatter => self.first_points(max_rows),
            ChartKind::Histogram => self.histogram(),
            ChartKind::Bar => self.bar_totals(),
            ChartKind::Box => self.box_summary(),
        }
    }

    fn first_points(&self, max_rows: usize) -> ChartPreview {
        let mut headers = vec![self.spec.x.to_string()];
        headers.extend(self.spec.y.map(str::to_string));
        headers.extend(self.spec.color.map(str::to_string));
        let rows = self
            .points
            .iter()
            .take(max_rows)
            .map(|p| {
                let mut row = vec![p.x.to_string()];
                row.extend(p.y.as_ref().map(Value::to_string));
                row.extend(p.color.as_ref().map(Value::to_string));
                row
            })
            .collect();
        ChartPreview { headers, rows }
    }

    /// Counts per bucket: one bucket per distinct category, or equal-width
    /// bins when every x is numeric.
    fn histogram(&self) -> ChartPreview {
        let buckets = Buckets::new(self.points.iter().map(|p| &p.x));
        let mut counts: BTreeMap<(usize, String), usize> = BTreeMap::new();
        for p in &self.points {
            let Some(bucket) = buckets.index(&p.x) else {
                continue;
            };
            let series = p
                .color
                .as_ref()
                .and_then(Value::key)
                .map(|k| k.to_string())
                .unwrap_or_default();
            *counts.entry((bucket, series)).or_default() += 1;
        }

        let mut headers = vec![self.spec.x.to_string()];
        headers.extend(self.spec.color.map(str::to_string));
        headers.push("count".to_string());
        let rows = counts
            .into_iter()
            .map(|((bucket, series), count)| {
                let mut row = vec![buckets.label(bucket)];
                if self.spec.color.is_some() {
                    row.push(series);
                }
                row.push(count.to_string());
                row
            })
            .collect();
        ChartPreview { headers, rows }
    }

    /// Sum of y per distinct x.
    fn bar_totals(&self) -> ChartPreview {
        let mut totals: BTreeMap<GroupKey, f64> = BTreeMap::new();
        for p in &self.points {
            let Some(key) = p.x.key() else { continue };
            let y = p.y.as_ref().and_then(Value::as_number).unwrap_or(0.0);
            *totals.entry(key).or_default() += y;
        }
        let y_name = self.spec.y.unwrap_or("value");
        ChartPreview {
            headers: vec![self.spec.x.to_string(), format!("sum of {y_name}")],
            rows: totals
                .into_iter()
                .map(|(key, total)| vec![key.to_string(), format_number(total, 2)])
                .collect(),
        }
    }

    /// Five-number summary of y per distinct x.
    fn box_summary(&self) -> ChartPreview {
        let mut groups: BTreeMap<GroupKey, Vec<f64>> = BTreeMap::new();
        for p in &self.points {
            let (Some(key), Some(y)) = (p.x.key(), p.y.as_ref().and_then(Value::as_number))
            else {
                continue;
            };
            groups.entry(key).or_default().push(y);
        }
        let headers = [self.spec.x, "count", "min", "q1", "median", "q3", "max"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let rows = groups
            .into_iter()
            .map(|(key, mut values)| {
                values.sort_by(|a, b| a.total_cmp(b));
                let mut row = vec![key.to_string(), values.len().to_string()];
                row.extend(
                    [0.0, 0.25, 0.5, 0.75, 1.0]
                        .iter()
                        .map(|q| format_fixed(quantile(&values, *q), 2)),
                );
                row
            })
            .collect();
        ChartPreview { headers, rows }
    }
}

/// Histogram bucketing of x values.
enum Buckets {
    Categories(Vec<GroupKey>),
    Bins { min: f64, width: f64, count: usize },
}

impl Buckets {
    fn new<'a>(values: impl Iterator<Item = &'a Value> + Clone) -> Self {
        let present = values.filter(|v| **v != Value::Null);
        let numeric: Option<Vec<f64>> = present.clone().map(Value::as_number).collect();
        match numeric {
            Some(nums) if !nums.is_empty() => {
                let min = nums.iter().copied().fold(f64::INFINITY, f64::min);
                let max = nums.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                if max > min {
                    Buckets::Bins {
                        min,
                        width: (max - min) / HISTOGRAM_BINS as f64,
                        count: HISTOGRAM_BINS,
                    }
                } else {
                    Buckets::Bins {
                        min,
                        width: 0.0,
                        count: 1,
                    }
                }
            }
            _ => {
                let mut keys: Vec<GroupKey> = present.filter_map(Value::key).collect();
                keys.sort();
                keys.dedup();
                Buckets::Categories(keys)
            }
        }
    }

    fn index(&self, value: &Value) -> Option<usize> {
        match self {
            Buckets::Categories(keys) => {
                let key = value.key()?;
                keys.binary_search(&key).ok()
            }
            Buckets::Bins { min, width, count } => {
                let v = value.as_number()?;
                if *width == 0.0 {
                    return Some(0);
                }
                let i = ((v - min) / width).floor() as usize;
                Some(i.min(count - 1))
            }
        }
    }

    fn label(&self, index: usize) -> String {
        match self {
            Buckets::Categories(keys) => keys[index].to_string(),
            Buckets::Bins { min, width, count } => {
                let lo = min + width * index as f64;
                let hi = lo + width;
                let close = if index + 1 == *count { ']' } else { ')' };
                format!("[{}, {}{}", format_fixed(lo, 2), format_fixed(hi, 2), close)
            }
        }
    }
}
