mod utils;

use arrow::array::Array;
use credit_lens::derive::FillValue;
use credit_lens::schema::columns;
use credit_lens::utils::logging::finish_load;
use credit_lens::{DashboardConfig, DashboardError, Dataset};

use utils::{Applicant, dataset, dataset_with, portfolio, raw_batch};

#[test]
fn test_missing_required_column_is_named() {
    let raw = raw_batch(&portfolio(5));
    let keep: Vec<usize> = raw
        .schema()
        .fields()
        .iter()
        .enumerate()
        .filter(|(_, f)| f.name() != columns::AMT_ANNUITY)
        .map(|(i, _)| i)
        .collect();
    let without_annuity = raw.project(&keep).unwrap();

    let err = Dataset::from_raw(&without_annuity, DashboardConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        DashboardError::MissingColumn { ref column } if column == columns::AMT_ANNUITY
    ));
    assert!(err.to_string().contains(columns::AMT_ANNUITY));
}

#[test]
fn test_unemployed_sentinel_becomes_missing_tenure() {
    let data = dataset(&portfolio(30));
    let tenure = data.float(columns::EMPLOYMENT_YEARS).unwrap();
    let days = data.float(columns::DAYS_EMPLOYED).unwrap();

    for i in 0..30 {
        if i % 9 == 0 {
            assert!(tenure.is_null(i), "row {i} should have missing tenure");
            assert!(days.is_null(i));
        } else {
            assert!(tenure.value(i) >= 0.0);
        }
    }
    assert!(
        data.report()
            .notes
            .iter()
            .any(|n| n.contains(columns::DAYS_EMPLOYED))
    );
}

#[test]
fn test_derived_values_are_non_negative_or_missing() {
    let mut rows = portfolio(40);
    rows.push(Applicant {
        income: 0.0,
        annuity: Some(5_000.0),
        ..Applicant::default()
    });
    rows.push(Applicant {
        days_birth: 120.0,
        days_employed: 500.0,
        ..Applicant::default()
    });
    let data = dataset(&rows);

    for column in [columns::AGE_YEARS, columns::EMPLOYMENT_YEARS] {
        let values = data.float(column).unwrap();
        assert!(values.iter().flatten().all(|v| v >= 0.0), "{column} has a negative value");
    }
    for column in [columns::DTI, columns::LOAN_TO_INCOME, columns::ANNUITY_TO_CREDIT] {
        let values = data.float(column).unwrap();
        assert!(
            values.iter().flatten().all(|v| v.is_finite() && v >= 0.0),
            "{column} has an invalid value"
        );
    }

    let dti = data.float(columns::DTI).unwrap();
    assert!(dti.is_null(40), "zero income must leave DTI missing");
    let age = data.float(columns::AGE_YEARS).unwrap();
    assert!(age.is_null(41), "a positive birth offset is not an age");
}

#[test]
fn test_sparse_column_is_excluded_but_kept() {
    let rows: Vec<Applicant> = (0..10)
        .map(|i| Applicant {
            occupation: if i < 7 { None } else { Some("Laborers") },
            ..Applicant::default()
        })
        .collect();
    let data = dataset(&rows);

    assert_eq!(data.report().excluded_columns, vec![columns::OCCUPATION_TYPE.to_string()]);
    assert!(!data.is_available(columns::OCCUPATION_TYPE));
    assert!(data.kind(columns::OCCUPATION_TYPE).is_some());
    assert!(!data.categorical_columns().iter().any(|c| c == columns::OCCUPATION_TYPE));
    // excluded columns are not imputed
    assert!(data.strings(columns::OCCUPATION_TYPE).unwrap().is_null(0));
}

#[test]
fn test_imputation_uses_median_and_smallest_mode() {
    let data = dataset(&portfolio(12));
    let report = data.report();

    let goods = report
        .imputations
        .iter()
        .find(|i| i.column == columns::AMT_GOODS_PRICE)
        .expect("goods price imputed");
    assert_eq!(goods.filled, 2);
    assert_eq!(goods.value, FillValue::Median(213_000.0));
    assert_eq!(data.float(columns::AMT_GOODS_PRICE).unwrap().null_count(), 0);

    let occupation = report
        .imputations
        .iter()
        .find(|i| i.column == columns::OCCUPATION_TYPE)
        .expect("occupation imputed");
    assert_eq!(occupation.value, FillValue::Mode("Drivers".to_string()));
    assert_eq!(occupation.filled, 3);

    // derived columns keep their missing markers
    assert!(!report.imputations.iter().any(|i| columns::is_derived(&i.column)));
    assert!(report.missing_before(columns::AMT_GOODS_PRICE).unwrap() > 0.0);
}

#[test]
fn test_income_brackets_follow_quartiles() {
    let rows: Vec<Applicant> = (0..100)
        .map(|i| Applicant {
            income: 100_000.0 + 1_000.0 * f64::from(i),
            ..Applicant::default()
        })
        .collect();
    let data = dataset(&rows);

    let (q1, q3) = data.report().income_quartiles.unwrap();
    assert!((q1 - 124_750.0).abs() < 1e-6);
    assert!((q3 - 174_250.0).abs() < 1e-6);

    let brackets = data.strings(columns::INCOME_BRACKET).unwrap();
    let count = |label: &str| brackets.iter().filter(|b| *b == Some(label)).count();
    assert_eq!(count("Low"), 25);
    assert_eq!(count("Mid"), 50);
    assert_eq!(count("High"), 25);
    assert_eq!(brackets.value(24), "Low");
    assert_eq!(brackets.value(75), "High");
}

#[test]
fn test_rare_categories_collapse_into_other() {
    let rows: Vec<Applicant> = (0..200)
        .map(|i| Applicant {
            housing: match i {
                0 => "Office apartment",
                1 => "XNA",
                _ => "House / apartment",
            },
            ..Applicant::default()
        })
        .collect();
    let data = dataset_with(&rows, DashboardConfig::default());

    let housing = data.strings(columns::NAME_HOUSING_TYPE).unwrap();
    assert_eq!(housing.value(0), "Other");
    assert_eq!(housing.value(1), "XNA");

    let collapse = data
        .report()
        .rare_collapses
        .iter()
        .find(|c| c.column == columns::NAME_HOUSING_TYPE)
        .unwrap();
    assert_eq!(collapse.labels, vec!["Office apartment".to_string()]);
}

#[test]
fn test_winsorization_clips_both_tails() {
    let rows: Vec<Applicant> = (0..=100)
        .map(|i| Applicant {
            income: 1_000.0 * f64::from(i),
            ..Applicant::default()
        })
        .collect();
    let config = DashboardConfig {
        winsorized_columns: vec![columns::AMT_INCOME_TOTAL.to_string()],
        ..DashboardConfig::default()
    };
    let data = dataset_with(&rows, config);

    let bounds = &data.report().winsor_bounds[0];
    assert_eq!(bounds.column, columns::AMT_INCOME_TOTAL);
    assert!((bounds.lower - 1_000.0).abs() < 1e-6);
    assert!((bounds.upper - 99_000.0).abs() < 1e-6);
    assert_eq!(bounds.clipped, 2);

    let income = data.float(columns::AMT_INCOME_TOTAL).unwrap();
    assert!((income.value(0) - 1_000.0).abs() < 1e-6);
    assert!((income.value(100) - 99_000.0).abs() < 1e-6);
}

#[test]
fn test_load_spinner_reports_dataset_shape() {
    let mut rows = portfolio(10);
    for row in rows.iter_mut().take(7) {
        row.goods_price = None;
    }
    let data = dataset(&rows);
    let spinner = indicatif::ProgressBar::hidden();

    finish_load(&spinner, &data);
    let message = spinner.message();
    assert!(message.starts_with("Dataset ready: 10 rows"));
    assert!(message.ends_with("1 excluded"));
}
