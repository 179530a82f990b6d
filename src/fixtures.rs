// The fourteen dataset files under `tests/data`, shared with the CLI tests.
use crate::types::Dataset;
use std::fs;
use std::path::Path;

pub fn csv_for(dataset: Dataset) -> &'static str {
    match dataset {
        Dataset::Manufacturing => include_str!("../tests/data/Manufacturing_Smart_Factory.csv"),
        Dataset::Ux => include_str!("../tests/data/UX_Digital_Experience.csv"),
        Dataset::ECommerce => include_str!("../tests/data/E_commerce_Sales.csv"),
        Dataset::Iot => include_str!("../tests/data/IoT_Building_Energy.csv"),
        Dataset::Healthcare => include_str!("../tests/data/Healthcare_Analytics.csv"),
        Dataset::Telecom => include_str!("../tests/data/Telecom_Churn.csv"),
        Dataset::Banking => include_str!("../tests/data/Banking_Transactions.csv"),
        Dataset::Education => include_str!("../tests/data/Education_Performance.csv"),
        Dataset::Logistics => include_str!("../tests/data/Logistics_Supply_Chain.csv"),
        Dataset::Social => include_str!("../tests/data/Social_Media_Performance.csv"),
        Dataset::Hr => include_str!("../tests/data/HR_Analytics.csv"),
        Dataset::Weather => include_str!("../tests/data/Climate_Weather.csv"),
        Dataset::Stock => include_str!("../tests/data/Stock_Market.csv"),
        Dataset::Traffic => include_str!("../tests/data/Smart_Traffic_Analytics.csv"),
    }
}

pub fn write_all(dir: &Path) {
    for dataset in Dataset::ALL {
        fs::write(dir.join(dataset.file_name()), csv_for(dataset)).unwrap();
    }
}
