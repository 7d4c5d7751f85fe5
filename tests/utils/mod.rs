// Integration test utilities
//
// Synthetic housing-like tables: a coordinate pair, a few size/count columns
// and an income-driven value. Only `lat` carries geography, so splitting on it
// yields two sub-populations that differ in that column alone.

#![allow(dead_code)]

use covshift::Dataset;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;

pub const HOUSING_COLUMNS: [&str; 8] = [
    "lat",
    "lon",
    "housing_median_age",
    "total_rooms",
    "total_bedrooms",
    "population",
    "median_income",
    "median_house_value",
];

/// `n` rows drawn independently from one fixed distribution
pub fn synthetic_housing(n: usize, seed: u64) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let rows = (0..n)
        .map(|_| {
            let lat = rng.gen_range(-124.3..-114.3);
            let lon = rng.gen_range(32.5..42.0);
            let age: f64 = rng.gen_range(1.0..52.0);
            let rooms = rng.gen_range(500.0..6000.0);
            let bedrooms = rooms * rng.gen_range(0.15..0.25);
            let population = rooms * rng.gen_range(0.8..1.6);
            let income = rng.gen_range(0.5..15.0);
            let value = 40_000.0 + income * 30_000.0 + rng.gen_range(-25_000.0..25_000.0);
            vec![
                lat,
                lon,
                age.round(),
                rooms,
                bedrooms,
                population,
                income,
                value,
            ]
        })
        .collect();

    Dataset::new(
        HOUSING_COLUMNS.iter().map(|s| s.to_string()).collect(),
        rows,
    )
    .unwrap()
}

/// Prepend an `id` column numbering rows from `start`
pub fn with_id_column(ds: &Dataset, start: usize) -> Dataset {
    let mut columns = vec!["id".to_string()];
    columns.extend(ds.columns().iter().cloned());
    let rows = ds
        .rows()
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut out = vec![(start + i) as f64];
            out.extend_from_slice(row);
            out
        })
        .collect();
    Dataset::new(columns, rows).unwrap()
}

/// Write a dataset as CSV with a header row
pub fn write_csv(ds: &Dataset, path: &Path) {
    let mut writer = csv::Writer::from_path(path).unwrap();
    writer.write_record(ds.columns()).unwrap();
    for row in ds.rows() {
        writer
            .write_record(row.iter().map(|v| v.to_string()))
            .unwrap();
    }
    writer.flush().unwrap();
}
