use crate::charts::{Chart, ChartKind, ChartPreview, ChartSpec};
use crate::error::{DashboardError, Result};
use crate::loader::Datasets;
use crate::questions::Question;
use crate::types::{Dataset, GroupKey, Kpi, KpiValue, Style, Table};
use crate::util::{average, format_kpi};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

pub const FALLBACK_NOTICE: &str = "Dashboard not implemented for this selection.";

/// The fourteen dashboards a question can open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Report {
    Manufacturing,
    Ux,
    ECommerce,
    Iot,
    Healthcare,
    Telecom,
    Banking,
    Education,
    Logistics,
    Social,
    Hr,
    Weather,
    Stock,
    Traffic,
}

/// Scalar reduction over one table. Nulls are skipped unless noted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reduction {
    RowCount,
    Sum(&'static str),
    Mean(&'static str),
    Max(&'static str),
    /// `sum(col) / divisor`.
    SumScaled(&'static str, f64),
    /// Per-row sum of several columns (a null anywhere nulls the row), summed.
    RowSum(&'static [&'static str]),
    /// Fraction of all rows with `col >= threshold`; nulls never qualify.
    ShareAtLeast(&'static str, f64),
    /// Group key whose mean of `value` is highest; first key wins ties.
    TopGroupByMean {
        group: &'static str,
        value: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KpiSpec {
    pub title: &'static str,
    pub reduce: Reduction,
    pub style: Style,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportSpec {
    pub dataset: Dataset,
    pub kpis: &'static [KpiSpec],
    pub chart: ChartSpec,
}

const fn kpi(title: &'static str, reduce: Reduction, style: Style) -> KpiSpec {
    KpiSpec {
        title,
        reduce,
        style,
    }
}

const fn number(decimals: usize, grouped: bool, prefix: &'static str, suffix: &'static str) -> Style {
    Style::Number {
        decimals,
        grouped,
        prefix,
        suffix,
    }
}

const GROUPED: Style = number(0, true, "", "");
const DOLLARS: Style = number(0, true, "$", "");
const ONE_DP: Style = number(1, false, "", "");
const TWO_DP: Style = number(2, false, "", "");

const fn chart(
    kind: ChartKind,
    title: &'static str,
    x: &'static str,
    y: Option<&'static str>,
    color: Option<&'static str>,
) -> ChartSpec {
    ChartSpec {
        kind,
        title,
        x,
        y,
        color,
    }
}

use Reduction::*;

const MANUFACTURING: ReportSpec = ReportSpec {
    dataset: Dataset::Manufacturing,
    kpis: &[
        kpi("Total Production", Sum("production_units"), GROUPED),
        kpi("Avg Efficiency %", Mean("efficiency_pct"), number(1, false, "", "%")),
        kpi("Defect Rate", Mean("defect_rate"), Style::Percent),
        kpi("Downtime Hours", SumScaled("downtime_min", 60.0), number(1, true, "", "")),
    ],
    chart: chart(ChartKind::Line, "Efficiency Trend", "timestamp", Some("efficiency_pct"), None),
};

const UX: ReportSpec = ReportSpec {
    dataset: Dataset::Ux,
    kpis: &[
        kpi("Total Sessions", RowCount, Style::Integer),
        kpi("Conversion Rate", Mean("conversion"), Style::Percent),
        kpi("Avg Session Duration", Mean("session_duration"), number(1, false, "", "s")),
        kpi("Bounce Rate", Mean("bounce"), Style::Percent),
    ],
    chart: chart(ChartKind::Histogram, "Bounce Rate by Device", "device", None, Some("bounce")),
};

const ECOMMERCE: ReportSpec = ReportSpec {
    dataset: Dataset::ECommerce,
    kpis: &[
        kpi("Revenue", Sum("revenue"), DOLLARS),
        kpi("Profit", Sum("profit"), DOLLARS),
        kpi("Profit Margin", Mean("profit_margin"), Style::Percent),
        kpi("Avg Discount", Mean("discount"), Style::Percent),
    ],
    chart: chart(ChartKind::Scatter, "Revenue vs Profit", "revenue", Some("profit"), Some("category")),
};

const IOT: ReportSpec = ReportSpec {
    dataset: Dataset::Iot,
    kpis: &[
        kpi("Total Power", Sum("power_kw"), number(0, true, "", " kW")),
        kpi("Avg Temperature", Mean("temperature"), number(1, false, "", "°C")),
        kpi("Energy Cost", Sum("energy_cost"), DOLLARS),
        kpi("Anomalies", Sum("anomaly"), Style::Integer),
    ],
    chart: chart(ChartKind::Line, "Power Consumption Trend", "timestamp", Some("power_kw"), None),
};

const HEALTHCARE: ReportSpec = ReportSpec {
    dataset: Dataset::Healthcare,
    kpis: &[
        kpi("Total Admissions", RowCount, Style::Integer),
        kpi("Avg Length of Stay", Mean("length_of_stay"), number(1, false, "", " days")),
        kpi("Avg Treatment Cost", Mean("treatment_cost"), DOLLARS),
        kpi("Readmission Rate", Mean("readmission_flag"), Style::Percent),
    ],
    chart: chart(ChartKind::Box, "Stay by Department", "department", Some("length_of_stay"), None),
};

const TELECOM: ReportSpec = ReportSpec {
    dataset: Dataset::Telecom,
    kpis: &[
        kpi("Total Customers", RowCount, Style::Integer),
        kpi("Total Revenue", Sum("revenue"), DOLLARS),
        kpi("Avg Monthly Fee", Mean("monthly_fee"), number(1, false, "$", "")),
        kpi("Churn Rate", Mean("churn"), Style::Percent),
    ],
    chart: chart(ChartKind::Scatter, "Revenue vs Tenure", "tenure", Some("revenue"), Some("churn")),
};

const BANKING: ReportSpec = ReportSpec {
    dataset: Dataset::Banking,
    kpis: &[
        kpi("Transactions", RowCount, Style::Integer),
        kpi("Total Value", Sum("amount"), DOLLARS),
        kpi("Fraud Rate", Mean("fraud"), Style::Percent),
        kpi("Avg Risk Score", Mean("risk_score"), TWO_DP),
    ],
    chart: chart(ChartKind::Histogram, "Fraud Distribution", "amount", None, Some("fraud")),
};

const EDUCATION: ReportSpec = ReportSpec {
    dataset: Dataset::Education,
    kpis: &[
        kpi("Avg Final Score", Mean("final"), ONE_DP),
        kpi("Pass Rate", ShareAtLeast("final", 50.0), Style::Percent),
        kpi("Avg Attendance", Mean("attendance"), number(1, false, "", "%")),
    ],
    chart: chart(ChartKind::Histogram, "Grade Distribution", "grade", None, None),
};

const LOGISTICS: ReportSpec = ReportSpec {
    dataset: Dataset::Logistics,
    kpis: &[
        kpi("Total Shipments", RowCount, Style::Integer),
        kpi("Avg Delivery Time", Mean("delivery_hours"), number(1, false, "", "h")),
        kpi("Late Delivery Rate", Mean("late"), Style::Percent),
        kpi("Cost per KM", Mean("cost_per_km"), TWO_DP),
    ],
    chart: chart(ChartKind::Bar, "Late Deliveries by Region", "region", Some("late"), None),
};

const SOCIAL: ReportSpec = ReportSpec {
    dataset: Dataset::Social,
    kpis: &[
        kpi("Total Posts", RowCount, Style::Integer),
        kpi("Total Engagement", RowSum(&["likes", "comments", "shares"]), GROUPED),
        kpi("Avg Engagement Rate", Mean("engagement_rate"), Style::Percent),
        kpi(
            "Top Platform",
            TopGroupByMean {
                group: "platform",
                value: "engagement_rate",
            },
            Style::Label,
        ),
    ],
    chart: chart(ChartKind::Line, "Engagement Trend", "date", Some("engagement_rate"), None),
};

const HR: ReportSpec = ReportSpec {
    dataset: Dataset::Hr,
    kpis: &[
        kpi("Employees", RowCount, Style::Integer),
        kpi("Avg Salary", Mean("salary"), DOLLARS),
        kpi("Avg Performance", Mean("performance"), TWO_DP),
        kpi("Attrition Rate", Mean("attrition"), Style::Percent),
    ],
    chart: chart(ChartKind::Bar, "Attrition by Department", "department", Some("attrition"), None),
};

const WEATHER: ReportSpec = ReportSpec {
    dataset: Dataset::Weather,
    kpis: &[
        kpi("Avg Temperature", Mean("temperature"), number(1, false, "", "°C")),
        kpi("Total Rainfall", Sum("rainfall"), ONE_DP),
        kpi("Max Wind", Max("wind"), ONE_DP),
        kpi("Storm Rate", Mean("storm"), Style::Percent),
    ],
    chart: chart(ChartKind::Line, "Temperature Trend", "date", Some("temperature"), None),
};

const STOCK: ReportSpec = ReportSpec {
    dataset: Dataset::Stock,
    kpis: &[
        kpi("Avg Open", Mean("open"), TWO_DP),
        kpi("Avg Close", Mean("close"), TWO_DP),
        kpi("Total Volume", Sum("volume"), GROUPED),
        kpi("Avg Daily Return", Mean("daily_return"), Style::Percent),
    ],
    chart: chart(ChartKind::Scatter, "Price vs Volume", "close", Some("volume"), Some("daily_return")),
};

const TRAFFIC: ReportSpec = ReportSpec {
    dataset: Dataset::Traffic,
    kpis: &[
        kpi("Total Vehicles", Sum("vehicles"), GROUPED),
        kpi("Avg Speed", Mean("avg_speed"), ONE_DP),
        kpi("Congestion Rate", Mean("congestion"), Style::Percent),
        kpi("Flow Index", Mean("flow_index"), GROUPED),
    ],
    chart: chart(ChartKind::Line, "Traffic Volume Trend", "timestamp", Some("vehicles"), None),
};

impl Report {
    pub fn spec(self) -> &'static ReportSpec {
        match self {
            Report::Manufacturing => &MANUFACTURING,
            Report::Ux => &UX,
            Report::ECommerce => &ECOMMERCE,
            Report::Iot => &IOT,
            Report::Healthcare => &HEALTHCARE,
            Report::Telecom => &TELECOM,
            Report::Banking => &BANKING,
            Report::Education => &EDUCATION,
            Report::Logistics => &LOGISTICS,
            Report::Social => &SOCIAL,
            Report::Hr => &HR,
            Report::Weather => &WEATHER,
            Report::Stock => &STOCK,
            Report::Traffic => &TRAFFIC,
        }
    }

    pub fn dataset(self) -> Dataset {
        self.spec().dataset
    }

    pub fn title(self) -> &'static str {
        self.dataset().name()
    }
}

fn present(values: &[Option<f64>]) -> Vec<f64> {
    values.iter().flatten().copied().collect()
}

/// Evaluate one reduction against a table.
pub fn reduce(table: &Table, reduction: &Reduction) -> Result<KpiValue> {
    let n = match *reduction {
        RowCount => table.rows as f64,
        Sum(col) => present(table.numbers(col)?).iter().sum(),
        Mean(col) => average(&present(table.numbers(col)?)),
        Max(col) => present(table.numbers(col)?)
            .into_iter()
            .reduce(f64::max)
            .unwrap_or(f64::NAN),
        SumScaled(col, divisor) => present(table.numbers(col)?).iter().sum::<f64>() / divisor,
        RowSum(cols) => {
            let columns = cols
                .iter()
                .map(|c| table.numbers(c))
                .collect::<Result<Vec<_>>>()?;
            (0..table.rows)
                .filter_map(|row| {
                    columns
                        .iter()
                        .map(|c| c.get(row).copied().flatten())
                        .sum::<Option<f64>>()
                })
                .sum()
        }
        ShareAtLeast(col, threshold) => {
            let values = table.numbers(col)?;
            let hits = values
                .iter()
                .filter(|v| matches!(v, Some(x) if *x >= threshold))
                .count();
            if values.is_empty() {
                f64::NAN
            } else {
                hits as f64 / values.len() as f64
            }
        }
        TopGroupByMean { group, value } => {
            return top_group_by_mean(table, group, value).map(KpiValue::Label);
        }
    };
    Ok(KpiValue::Number(n))
}

fn top_group_by_mean(table: &Table, group: &str, value: &str) -> Result<String> {
    let keys = table.column(group)?;
    let values = table.numbers(value)?;
    let mut groups: BTreeMap<GroupKey, Vec<f64>> = BTreeMap::new();
    for (row, v) in values.iter().enumerate() {
        let Some(key) = keys.value(row).key() else {
            continue;
        };
        let entry = groups.entry(key).or_default();
        if let Some(v) = v {
            entry.push(*v);
        }
    }
    let mut best: Option<(GroupKey, f64)> = None;
    for (key, vals) in groups {
        let mean = average(&vals);
        if mean.is_nan() {
            continue;
        }
        if best.as_ref().map_or(true, |(_, m)| mean > *m) {
            best = Some((key, mean));
        }
    }
    best.map(|(key, _)| key.to_string()).ok_or_else(|| DashboardError::EmptyGroup {
        dataset: table.dataset,
        group: group.to_string(),
        value: value.to_string(),
    })
}

pub fn compute_kpis(spec: &ReportSpec, table: &Table) -> Result<Vec<Kpi>> {
    spec.kpis
        .iter()
        .map(|k| {
            let raw = reduce(table, &k.reduce)?;
            Ok(Kpi {
                title: k.title.to_string(),
                value: format_kpi(&raw, &k.style),
                raw,
            })
        })
        .collect()
}

/// Render-time settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub preview_rows: usize,
    /// Show the fallback notice under matched reports too.
    pub always_show_fallback: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            preview_rows: 10,
            always_show_fallback: false,
        }
    }
}

/// Everything one selection renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rendered {
    pub label: String,
    pub report: Option<Report>,
    pub title: Option<&'static str>,
    pub kpis: Vec<Kpi>,
    pub chart: Option<Chart>,
    pub preview: Option<ChartPreview>,
    pub notice: Option<&'static str>,
}

/// Resolve `label` and compute its report. Labels that are not one of the
/// 28 questions, or not routed to a report, render only the fallback notice.
pub fn dispatch(label: &str, data: &Datasets, opts: &RenderOptions) -> Result<Rendered> {
    let question = label.parse::<Question>().ok();
    let shown = question.map_or_else(|| label.trim().to_string(), Question::label);
    let Some(report) = question.and_then(Question::report) else {
        info!(label, "no dashboard for selection");
        return Ok(Rendered {
            label: shown,
            report: None,
            title: None,
            kpis: Vec::new(),
            chart: None,
            preview: None,
            notice: Some(FALLBACK_NOTICE),
        });
    };

    let spec = report.spec();
    let table = data.get(spec.dataset);
    debug!(label, ?report, rows = table.rows, "rendering dashboard");
    let kpis = compute_kpis(spec, table)?;
    let chart = Chart::build(spec.chart, table)?;
    let preview = chart.preview(opts.preview_rows);
    Ok(Rendered {
        label: shown,
        report: Some(report),
        title: Some(report.title()),
        kpis,
        chart: Some(chart),
        preview: Some(preview),
        notice: opts.always_show_fallback.then_some(FALLBACK_NOTICE),
    })
}
