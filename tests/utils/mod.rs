//! Fixture builders shared by the integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use credit_lens::{DashboardConfig, Dataset, Session};

/// One raw application row
#[derive(Debug, Clone)]
pub struct Applicant {
    pub target: Option<i64>,
    pub days_birth: f64,
    pub days_employed: f64,
    pub income: f64,
    pub credit: f64,
    pub annuity: Option<f64>,
    pub goods_price: Option<f64>,
    pub children: i64,
    pub family_members: f64,
    pub gender: &'static str,
    pub education: &'static str,
    pub family_status: &'static str,
    pub housing: &'static str,
    pub contract: &'static str,
    pub occupation: Option<&'static str>,
}

impl Default for Applicant {
    fn default() -> Self {
        Self {
            target: Some(0),
            days_birth: -12_000.0,
            days_employed: -2_000.0,
            income: 150_000.0,
            credit: 500_000.0,
            annuity: Some(25_000.0),
            goods_price: Some(450_000.0),
            children: 0,
            family_members: 2.0,
            gender: "F",
            education: "Secondary / secondary special",
            family_status: "Married",
            housing: "House / apartment",
            contract: "Cash loans",
            occupation: Some("Laborers"),
        }
    }
}

/// Build the raw batch the loader would produce for these rows
pub fn raw_batch(rows: &[Applicant]) -> RecordBatch {
    let text = |f: fn(&Applicant) -> Option<&'static str>| -> ArrayRef {
        Arc::new(rows.iter().map(f).collect::<StringArray>())
    };
    let float = |f: fn(&Applicant) -> Option<f64>| -> ArrayRef {
        Arc::new(rows.iter().map(f).collect::<Float64Array>())
    };

    let schema = Schema::new(vec![
        Field::new("SK_ID_CURR", DataType::Int64, false),
        Field::new("TARGET", DataType::Int64, true),
        Field::new("NAME_CONTRACT_TYPE", DataType::Utf8, true),
        Field::new("CODE_GENDER", DataType::Utf8, true),
        Field::new("CNT_CHILDREN", DataType::Int64, true),
        Field::new("AMT_INCOME_TOTAL", DataType::Float64, true),
        Field::new("AMT_CREDIT", DataType::Float64, true),
        Field::new("AMT_ANNUITY", DataType::Float64, true),
        Field::new("AMT_GOODS_PRICE", DataType::Float64, true),
        Field::new("NAME_EDUCATION_TYPE", DataType::Utf8, true),
        Field::new("NAME_FAMILY_STATUS", DataType::Utf8, true),
        Field::new("NAME_HOUSING_TYPE", DataType::Utf8, true),
        Field::new("DAYS_BIRTH", DataType::Float64, true),
        Field::new("DAYS_EMPLOYED", DataType::Float64, true),
        Field::new("OCCUPATION_TYPE", DataType::Utf8, true),
        Field::new("CNT_FAM_MEMBERS", DataType::Float64, true),
    ]);

    let ids: Int64Array = (0..rows.len() as i64).map(|i| Some(100_000 + i)).collect();
    let targets: Int64Array = rows.iter().map(|r| r.target).collect();
    let children: Int64Array = rows.iter().map(|r| Some(r.children)).collect();

    RecordBatch::try_new(
        Arc::new(schema),
        vec![
            Arc::new(ids),
            Arc::new(targets),
            text(|r| Some(r.contract)),
            text(|r| Some(r.gender)),
            Arc::new(children),
            float(|r| Some(r.income)),
            float(|r| Some(r.credit)),
            float(|r| r.annuity),
            float(|r| r.goods_price),
            text(|r| Some(r.education)),
            text(|r| Some(r.family_status)),
            text(|r| Some(r.housing)),
            float(|r| Some(r.days_birth)),
            float(|r| Some(r.days_employed)),
            text(|r| r.occupation),
            float(|r| Some(r.family_members)),
        ],
    )
    .expect("fixture batch")
}

/// Configuration with winsorization and rare-category collapse turned off,
/// so fixture values survive derivation unchanged
pub fn plain_config() -> DashboardConfig {
    DashboardConfig {
        winsorized_columns: Vec::new(),
        rare_category_share: 0.0,
        ..DashboardConfig::default()
    }
}

pub fn dataset_with(rows: &[Applicant], config: DashboardConfig) -> Arc<Dataset> {
    Arc::new(Dataset::from_raw(&raw_batch(rows), config).expect("fixture derives"))
}

pub fn dataset(rows: &[Applicant]) -> Arc<Dataset> {
    dataset_with(rows, plain_config())
}

pub fn session(rows: &[Applicant]) -> Session {
    Session::new(dataset(rows))
}

/// Ten rows with defaults at positions 0, 3 and 7
pub fn ten_applicants() -> Vec<Applicant> {
    [1, 0, 0, 1, 0, 0, 0, 1, 0, 0]
        .into_iter()
        .enumerate()
        .map(|(i, t)| Applicant {
            target: Some(t),
            income: 100_000.0 + 10_000.0 * i as f64,
            gender: if i % 2 == 0 { "F" } else { "M" },
            ..Applicant::default()
        })
        .collect()
}

/// A varied portfolio of `n` rows; deterministic in `n`
pub fn portfolio(n: usize) -> Vec<Applicant> {
    const EDUCATION: [&str; 3] = [
        "Secondary / secondary special",
        "Higher education",
        "Incomplete higher",
    ];
    const FAMILY: [&str; 3] = ["Married", "Single / not married", "Civil marriage"];
    const HOUSING: [&str; 2] = ["House / apartment", "With parents"];
    const OCCUPATION: [Option<&str>; 4] = [Some("Laborers"), Some("Sales staff"), None, Some("Drivers")];

    (0..n)
        .map(|i| {
            let f = i as f64;
            Applicant {
                target: Some(i64::from(i % 4 == 0 || i % 7 == 0)),
                days_birth: -(8_000.0 + 97.0 * f),
                days_employed: if i % 9 == 0 { 365_243.0 } else { -(300.0 + 41.0 * f) },
                income: 90_000.0 + 1_500.0 * f + if i % 5 == 0 { 40_000.0 } else { 0.0 },
                credit: 200_000.0 + 7_000.0 * f,
                annuity: Some(12_000.0 + 300.0 * f),
                goods_price: if i % 11 == 0 { None } else { Some(180_000.0 + 6_000.0 * f) },
                children: (i % 3) as i64,
                family_members: 1.0 + (i % 4) as f64,
                gender: if i % 3 == 0 { "M" } else { "F" },
                education: EDUCATION[i % 3],
                family_status: FAMILY[i % 3],
                housing: HOUSING[i % 2],
                contract: if i % 6 == 0 { "Revolving loans" } else { "Cash loans" },
                occupation: OCCUPATION[i % 4],
            }
        })
        .collect()
}
