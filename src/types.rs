use crate::error::{DashboardError, Result};
use crate::util::format_timestamp;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use tabled::Tabled;

/// The fourteen input tables, in their fixed load order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Dataset {
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

impl Dataset {
    pub const ALL: [Dataset; 14] = [
        Dataset::Manufacturing,
        Dataset::Ux,
        Dataset::ECommerce,
        Dataset::Iot,
        Dataset::Healthcare,
        Dataset::Telecom,
        Dataset::Banking,
        Dataset::Education,
        Dataset::Logistics,
        Dataset::Social,
        Dataset::Hr,
        Dataset::Weather,
        Dataset::Stock,
        Dataset::Traffic,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Dataset::Manufacturing => "Manufacturing_Smart_Factory.csv",
            Dataset::Ux => "UX_Digital_Experience.csv",
            Dataset::ECommerce => "E_commerce_Sales.csv",
            Dataset::Iot => "IoT_Building_Energy.csv",
            Dataset::Healthcare => "Healthcare_Analytics.csv",
            Dataset::Telecom => "Telecom_Churn.csv",
            Dataset::Banking => "Banking_Transactions.csv",
            Dataset::Education => "Education_Performance.csv",
            Dataset::Logistics => "Logistics_Supply_Chain.csv",
            Dataset::Social => "Social_Media_Performance.csv",
            Dataset::Hr => "HR_Analytics.csv",
            Dataset::Weather => "Climate_Weather.csv",
            Dataset::Stock => "Stock_Market.csv",
            Dataset::Traffic => "Smart_Traffic_Analytics.csv",
        }
    }

    /// The column coerced to a timestamp at load time, if the table has one.
    pub fn date_column(self) -> Option<&'static str> {
        match self {
            Dataset::Manufacturing | Dataset::Ux | Dataset::Iot | Dataset::Traffic => {
                Some("timestamp")
            }
            Dataset::Healthcare => Some("admission_date"),
            Dataset::Banking => Some("transaction_date"),
            Dataset::Logistics => Some("ship_date"),
            Dataset::Social | Dataset::Weather | Dataset::Stock => Some("date"),
            Dataset::ECommerce | Dataset::Telecom | Dataset::Education | Dataset::Hr => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Dataset::Manufacturing => "Manufacturing",
            Dataset::Ux => "UX",
            Dataset::ECommerce => "E-commerce",
            Dataset::Iot => "IoT",
            Dataset::Healthcare => "Healthcare",
            Dataset::Telecom => "Telecom",
            Dataset::Banking => "Banking",
            Dataset::Education => "Education",
            Dataset::Logistics => "Logistics",
            Dataset::Social => "Social",
            Dataset::Hr => "HR",
            Dataset::Weather => "Weather",
            Dataset::Stock => "Stock",
            Dataset::Traffic => "Traffic",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One typed cell, as handed to charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Number(f64),
    Text(String),
    Timestamp(NaiveDateTime),
}

impl Value {
    /// Grouping key; nulls have none and drop out of groupings.
    pub fn key(&self) -> Option<GroupKey> {
        match self {
            Value::Null => None,
            Value::Number(n) if n.is_nan() => None,
            Value::Number(n) => Some(GroupKey::Number(*n)),
            Value::Timestamp(ts) => Some(GroupKey::Timestamp(*ts)),
            Value::Text(s) => Some(GroupKey::Text(s.clone())),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) if !n.is_nan() => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
            Value::Timestamp(ts) => f.write_str(&format_timestamp(ts)),
        }
    }
}

/// Non-null cell used as a group. Keys sort by their typed value, so numeric
/// groups order as numbers (`9` before `10`).
#[derive(Debug, Clone)]
pub enum GroupKey {
    Number(f64),
    Timestamp(NaiveDateTime),
    Text(String),
}

impl GroupKey {
    fn rank(&self) -> u8 {
        match self {
            GroupKey::Number(_) => 0,
            GroupKey::Timestamp(_) => 1,
            GroupKey::Text(_) => 2,
        }
    }
}

impl Ord for GroupKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (GroupKey::Number(a), GroupKey::Number(b)) => a.total_cmp(b),
            (GroupKey::Timestamp(a), GroupKey::Timestamp(b)) => a.cmp(b),
            (GroupKey::Text(a), GroupKey::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for GroupKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for GroupKey {}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Number(n) => write!(f, "{}", n),
            GroupKey::Timestamp(ts) => f.write_str(&format_timestamp(ts)),
            GroupKey::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Number,
    Text,
    Timestamp,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ColumnKind::Number => "numeric",
            ColumnKind::Text => "text",
            ColumnKind::Timestamp => "timestamp",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Number(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
    Timestamp(Vec<Option<NaiveDateTime>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn kind(&self) -> ColumnKind {
        match self.data {
            ColumnData::Number(_) => ColumnKind::Number,
            ColumnData::Text(_) => ColumnKind::Text,
            ColumnData::Timestamp(_) => ColumnKind::Timestamp,
        }
    }

    pub fn value(&self, row: usize) -> Value {
        match &self.data {
            ColumnData::Number(v) => v
                .get(row)
                .copied()
                .flatten()
                .map_or(Value::Null, Value::Number),
            ColumnData::Text(v) => v
                .get(row)
                .cloned()
                .flatten()
                .map_or(Value::Null, Value::Text),
            ColumnData::Timestamp(v) => v
                .get(row)
                .copied()
                .flatten()
                .map_or(Value::Null, Value::Timestamp),
        }
    }
}

/// A loaded, read-only table.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub dataset: Dataset,
    pub rows: usize,
    pub columns: Vec<Column>,
}

impl Table {
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| DashboardError::MissingColumn {
                dataset: self.dataset,
                column: name.to_string(),
            })
    }

    /// Numeric cells of `name`; fails when the column is absent or not numeric.
    pub fn numbers(&self, name: &str) -> Result<&[Option<f64>]> {
        let column = self.column(name)?;
        match &column.data {
            ColumnData::Number(v) => Ok(v),
            _ => Err(DashboardError::ColumnType {
                dataset: self.dataset,
                column: name.to_string(),
                expected: ColumnKind::Number,
                found: column.kind(),
            }),
        }
    }
}

/// Display style of one KPI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Style {
    /// Truncated to a whole number, no separators.
    Integer,
    Number {
        decimals: usize,
        grouped: bool,
        prefix: &'static str,
        suffix: &'static str,
    },
    /// Ratio shown as percentage points with two decimals.
    Percent,
    Label,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum KpiValue {
    Number(f64),
    Label(String),
}

/// One computed entry of the KPI strip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpi {
    #[serde(rename = "Metric")]
    pub title: String,
    #[serde(rename = "Value")]
    pub value: String,
    #[serde(rename = "Raw")]
    pub raw: KpiValue,
}

/// Per-table load diagnostics.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct LoadReport {
    #[serde(rename = "Dataset")]
    #[tabled(rename = "Dataset")]
    pub dataset: Dataset,
    #[serde(rename = "File")]
    #[tabled(rename = "File")]
    pub file: &'static str,
    #[serde(rename = "Rows")]
    #[tabled(rename = "Rows")]
    pub rows: usize,
    #[serde(rename = "Columns")]
    #[tabled(rename = "Columns")]
    pub columns: usize,
    /// Rows kept with invalid UTF-8 bytes replaced.
    #[serde(rename = "RepairedRows")]
    #[tabled(rename = "RepairedRows")]
    pub repaired_rows: usize,
    #[serde(rename = "NullDates")]
    #[tabled(rename = "NullDates")]
    pub null_dates: usize,
}
