use crate::error::LoadError;
use crate::types::{Column, ColumnData, Dataset, LoadReport, Table};
use crate::util::{clean_cell, parse_number, parse_timestamp};
use csv::ReaderBuilder;
use once_cell::unsync::OnceCell;
use std::borrow::Cow;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// The fourteen loaded tables. Built once, read-only afterwards.
#[derive(Debug, Clone)]
pub struct Datasets {
    tables: Vec<Table>,
    reports: Vec<LoadReport>,
}

impl Datasets {
    pub fn get(&self, dataset: Dataset) -> &Table {
        &self.tables[dataset.index()]
    }

    pub fn reports(&self) -> &[LoadReport] {
        &self.reports
    }
}

/// Required files absent from `dir`, in load order.
pub fn missing_files(dir: &Path) -> Vec<String> {
    Dataset::ALL
        .iter()
        .map(|d| d.file_name())
        .filter(|f| !dir.join(f).is_file())
        .map(str::to_string)
        .collect()
}

pub fn check_required(dir: &Path) -> Result<(), LoadError> {
    let missing = missing_files(dir);
    if missing.is_empty() {
        return Ok(());
    }
    warn!(count = missing.len(), "required dataset files are missing");
    Err(LoadError::MissingFiles {
        dir: dir.display().to_string(),
        missing,
    })
}

fn csv_error(dataset: Dataset, source: csv::Error) -> LoadError {
    LoadError::Csv {
        file: dataset.file_name().to_string(),
        source,
    }
}

/// Decode one raw cell. Invalid UTF-8 is replaced rather than dropping the row.
fn decode_cell(bytes: &[u8]) -> (String, bool) {
    match String::from_utf8_lossy(bytes) {
        Cow::Borrowed(s) => (s.to_string(), false),
        Cow::Owned(s) => (s, true),
    }
}

/// Read one dataset file into a typed table.
///
/// Columns whose every non-empty cell is numeric (or a boolean flag) become
/// numeric, everything else stays text. The dataset's date column, when the
/// file has it, is coerced to timestamps; cells that fail to parse become
/// nulls and are counted in the report instead of failing the load. Every
/// row is kept: cells with invalid UTF-8 are decoded lossily and counted.
pub fn load_table(dataset: Dataset, path: &Path) -> Result<(Table, LoadReport), LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        file: dataset.file_name().to_string(),
        source,
    })?;
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(file);
    let headers: Vec<String> = rdr
        .byte_headers()
        .map_err(|e| csv_error(dataset, e))?
        .iter()
        .map(|h| decode_cell(h).0.trim().to_string())
        .collect();

    let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    let mut rows = 0usize;
    let mut repaired_rows = 0usize;
    for result in rdr.byte_records() {
        let record = result.map_err(|e| csv_error(dataset, e))?;
        rows += 1;
        let mut repaired = false;
        // Short rows are padded with nulls, extra trailing cells ignored.
        for (i, cells) in raw.iter_mut().enumerate() {
            let cell = record.get(i).map(decode_cell);
            if let Some((_, true)) = cell {
                repaired = true;
            }
            cells.push(cell.and_then(|(s, _)| clean_cell(&s).map(str::to_string)));
        }
        if repaired {
            warn!(%dataset, row = rows, "replaced invalid UTF-8 bytes");
            repaired_rows += 1;
        }
    }

    let date_column = dataset.date_column();
    let mut null_dates = 0usize;
    let columns: Vec<Column> = headers
        .into_iter()
        .zip(raw)
        .map(|(name, cells)| {
            let data = if Some(name.as_str()) == date_column {
                let (data, failed) = coerce_dates(cells);
                null_dates += failed;
                data
            } else {
                infer_column(cells)
            };
            Column { name, data }
        })
        .collect();

    let report = LoadReport {
        dataset,
        file: dataset.file_name(),
        rows,
        columns: columns.len(),
        repaired_rows,
        null_dates,
    };
    debug!(
        %dataset,
        rows,
        columns = report.columns,
        repaired_rows,
        null_dates,
        "loaded table"
    );
    Ok((
        Table {
            dataset,
            rows,
            columns,
        },
        report,
    ))
}

fn coerce_dates(cells: Vec<Option<String>>) -> (ColumnData, usize) {
    let mut failed = 0usize;
    let parsed = cells
        .iter()
        .map(|cell| {
            let cell = cell.as_deref()?;
            let ts = parse_timestamp(cell);
            if ts.is_none() {
                failed += 1;
            }
            ts
        })
        .collect();
    (ColumnData::Timestamp(parsed), failed)
}

fn infer_column(cells: Vec<Option<String>>) -> ColumnData {
    let numbers: Option<Vec<Option<f64>>> = cells
        .iter()
        .map(|cell| match cell.as_deref() {
            None => Some(None),
            Some(s) => parse_number(s).map(Some),
        })
        .collect();
    match numbers {
        Some(v) => ColumnData::Number(v),
        None => ColumnData::Text(cells),
    }
}

/// Check every required file first, then load all fourteen tables. Nothing is
/// loaded when any file is missing.
pub fn load_all(dir: &Path) -> Result<Datasets, LoadError> {
    check_required(dir)?;
    let mut tables = Vec::with_capacity(Dataset::ALL.len());
    let mut reports = Vec::with_capacity(Dataset::ALL.len());
    for dataset in Dataset::ALL {
        let (table, report) = load_table(dataset, &dir.join(dataset.file_name()))?;
        tables.push(table);
        reports.push(report);
    }
    let total_rows: usize = reports.iter().map(|r| r.rows).sum();
    info!(
        dir = %dir.display(),
        tables = tables.len(),
        total_rows,
        "datasets loaded"
    );
    Ok(Datasets { tables, reports })
}

/// Load-once holder for the datasets of one data directory.
pub struct Session {
    dir: PathBuf,
    data: OnceCell<Datasets>,
}

impl Session {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            data: OnceCell::new(),
        }
    }

    /// The loaded datasets; the first call reads the files, later calls reuse
    /// them. A failed load is not cached.
    pub fn datasets(&self) -> Result<&Datasets, LoadError> {
        self.data.get_or_try_init(|| load_all(&self.dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::write_all;
    use crate::types::ColumnKind;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn reports_exactly_the_missing_subset() {
        let tmp = TempDir::new().unwrap();
        write_all(tmp.path());
        let removed = [Dataset::Ux, Dataset::Hr, Dataset::Traffic];
        for d in removed {
            fs::remove_file(tmp.path().join(d.file_name())).unwrap();
        }
        let expected: Vec<String> = removed.iter().map(|d| d.file_name().to_string()).collect();
        assert_eq!(missing_files(tmp.path()), expected);

        match load_all(tmp.path()) {
            Err(LoadError::MissingFiles { missing, .. }) => assert_eq!(missing, expected),
            other => panic!("expected missing files, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn every_single_missing_file_is_named_alone() {
        let tmp = TempDir::new().unwrap();
        write_all(tmp.path());
        for d in Dataset::ALL {
            let path = tmp.path().join(d.file_name());
            fs::remove_file(&path).unwrap();
            assert_eq!(missing_files(tmp.path()), vec![d.file_name().to_string()]);
            fs::write(&path, "id\n1\n").unwrap();
        }
        assert!(check_required(tmp.path()).is_ok());
    }

    #[test]
    fn missing_files_message_lists_names_and_remedy() {
        let tmp = TempDir::new().unwrap();
        let err = check_required(tmp.path()).unwrap_err().to_string();
        for d in Dataset::ALL {
            assert!(err.contains(d.file_name()), "{err}");
        }
        assert!(err.contains("Copy these CSV files"));
    }

    #[test]
    fn infers_types_and_coerces_bad_dates_to_null() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("m.csv");
        fs::write(
            &path,
            "timestamp,production_units,line,defect\n\
             2024-01-01 08:00:00,100,A,False\n\
             not a date,200,B,True\n\
             2024-01-03,,C,\n",
        )
        .unwrap();
        let (table, report) = load_table(Dataset::Manufacturing, &path).unwrap();
        assert_eq!(table.rows, 3);
        assert_eq!(report.null_dates, 1);
        assert_eq!(table.column("timestamp").unwrap().kind(), ColumnKind::Timestamp);
        assert_eq!(table.column("line").unwrap().kind(), ColumnKind::Text);
        assert_eq!(
            table.numbers("production_units").unwrap(),
            &[Some(100.0), Some(200.0), None]
        );
        assert_eq!(table.numbers("defect").unwrap(), &[Some(0.0), Some(1.0), None]);
        match &table.column("timestamp").unwrap().data {
            ColumnData::Timestamp(v) => {
                assert!(v[0].is_some());
                assert!(v[1].is_none());
                assert!(v[2].is_some());
            }
            other => panic!("unexpected column data {other:?}"),
        }
    }

    #[test]
    fn absent_date_column_is_ignored() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("w.csv");
        fs::write(&path, "temperature\n21.5\n").unwrap();
        let (table, report) = load_table(Dataset::Weather, &path).unwrap();
        assert_eq!(report.null_dates, 0);
        assert_eq!(table.numbers("temperature").unwrap(), &[Some(21.5)]);
    }

    #[test]
    fn short_rows_are_padded() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("t.csv");
        fs::write(&path, "a,b\n1,2\n3\n").unwrap();
        let (table, _) = load_table(Dataset::Telecom, &path).unwrap();
        assert_eq!(table.numbers("b").unwrap(), &[Some(2.0), None]);
    }

    #[test]
    fn invalid_utf8_cells_keep_their_row() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("ux.csv");
        let mut body = b"session_id,device,bounce\n1,desktop,0\n2,mob".to_vec();
        body.push(0xFF);
        body.extend_from_slice(b"ile,1\n3,tablet,0\n");
        fs::write(&path, body).unwrap();

        let (table, report) = load_table(Dataset::Ux, &path).unwrap();
        assert_eq!(table.rows, 3);
        assert_eq!(report.repaired_rows, 1);
        assert_eq!(table.numbers("bounce").unwrap(), &[Some(0.0), Some(1.0), Some(0.0)]);
        assert_eq!(
            table.column("device").unwrap().value(1),
            crate::types::Value::Text("mob\u{FFFD}ile".into())
        );
    }

    #[test]
    fn unreadable_file_is_an_io_error() {
        let tmp = TempDir::new().unwrap();
        let err = load_table(Dataset::Hr, &tmp.path().join("nope.csv")).unwrap_err();
        match err {
            LoadError::Io { file, .. } => assert_eq!(file, Dataset::Hr.file_name()),
            other => panic!("expected io error, got {other:?}"),
        }
    }

    #[test]
    fn session_loads_once() {
        let tmp = TempDir::new().unwrap();
        write_all(tmp.path());
        let session = Session::new(tmp.path());
        let first = session.datasets().unwrap() as *const Datasets;
        // Files going away after the first load do not matter any more.
        fs::remove_file(tmp.path().join(Dataset::Stock.file_name())).unwrap();
        let second = session.datasets().unwrap() as *const Datasets;
        assert!(std::ptr::eq(first, second));
        assert_eq!(session.datasets().unwrap().reports().len(), 14);
    }

    #[test]
    fn loads_every_fixture_in_order() {
        let tmp = TempDir::new().unwrap();
        write_all(tmp.path());
        let data = load_all(tmp.path()).unwrap();
        for (d, report) in Dataset::ALL.iter().zip(data.reports()) {
            assert_eq!(report.dataset, *d);
            assert_eq!(data.get(*d).dataset, *d);
            assert!(report.rows > 0);
        }
        assert_eq!(data.get(Dataset::Manufacturing).rows, 3);
        assert_eq!(data.reports()[0].null_dates, 1);
    }
}
