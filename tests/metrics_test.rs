mod utils;

use std::sync::Arc;

use credit_lens::filter::ViewOptions;
use credit_lens::schema::columns;
use credit_lens::{
    DashboardError, EvalContext, MetricCatalog, MetricValue, PAGES, View, resolve,
};

use utils::{Applicant, dataset, portfolio, session, ten_applicants};

fn percent(value: &MetricValue) -> f64 {
    match value {
        MetricValue::Percent(p) => *p,
        other => panic!("expected a percentage, got {other:?}"),
    }
}

fn number(value: &MetricValue) -> f64 {
    match value {
        MetricValue::Number(n) => *n,
        other => panic!("expected a number, got {other:?}"),
    }
}

#[test]
fn test_default_and_repaid_rate() {
    let mut session = session(&ten_applicants());

    let default_rate = session.evaluate_metric("default_rate").unwrap();
    let repaid_rate = session.evaluate_metric("repaid_rate").unwrap();
    assert!((percent(&default_rate.value) - 30.0).abs() < 1e-9);
    assert!((percent(&repaid_rate.value) - 70.0).abs() < 1e-9);

    let defaults = session.evaluate_metric("total_defaults").unwrap();
    assert_eq!(defaults.value, MetricValue::Count(3));
    let total = session.evaluate_metric("total_applicants").unwrap();
    assert_eq!(total.value, MetricValue::Count(10));
}

#[test]
fn test_zero_income_row_is_left_out_of_average_dti() {
    let rows = vec![
        Applicant {
            income: 100_000.0,
            annuity: Some(20_000.0),
            ..Applicant::default()
        },
        Applicant {
            income: 200_000.0,
            annuity: Some(20_000.0),
            ..Applicant::default()
        },
        Applicant {
            income: 0.0,
            annuity: Some(5_000.0),
            ..Applicant::default()
        },
    ];
    let mut session = session(&rows);

    let avg_dti = session.evaluate_metric("avg_dti").unwrap();
    assert!((number(&avg_dti.value) - 0.15).abs() < 1e-12);
}

#[test]
fn test_max_default_rate_reports_group() {
    let mut session = session(&ten_applicants());
    let by_gender = session.evaluate_metric("max_default_rate_gender").unwrap();

    // M holds rows 1, 3, 5, 7, 9 with two defaults
    assert!((percent(&by_gender.value) - 40.0).abs() < 1e-9);
    assert_eq!(by_gender.detail.as_deref(), Some("M | n=5"));
}

#[test]
fn test_gender_split_and_shares() {
    let mut session = session(&portfolio(30));

    let split = session.evaluate_metric("gender_split").unwrap();
    assert_eq!(split.value, MetricValue::Text("M 33.3% | F 66.7%".to_string()));

    // children cycle through 0, 1, 2
    let with_children = session.evaluate_metric("pct_with_children").unwrap();
    assert!((percent(&with_children.value) - 200.0 / 3.0).abs() < 1e-9);

    // every sentinel row has missing tenure and does not count as working
    let working = session.evaluate_metric("pct_currently_working").unwrap();
    assert!((percent(&working.value) - 26.0 / 30.0 * 100.0).abs() < 1e-9);
}

#[test]
fn test_correlation_rankings_exclude_self_and_target() {
    let mut session = session(&portfolio(60));

    let positive = session.evaluate_metric("top5_positive_corr").unwrap();
    let MetricValue::List(entries) = &positive.value else {
        panic!("expected a ranked list");
    };
    assert!(entries.len() <= 5);
    assert!(entries.iter().all(|e| e.name != columns::TARGET));
    assert!(entries.windows(2).all(|w| w[0].value >= w[1].value));

    let negative = session.evaluate_metric("top5_negative_corr").unwrap();
    let MetricValue::List(entries) = &negative.value else {
        panic!("expected a ranked list");
    };
    assert!(entries.windows(2).all(|w| w[0].value <= w[1].value));

    let with_income = session.evaluate_metric("most_corr_with_income").unwrap();
    let MetricValue::List(entries) = &with_income.value else {
        panic!("expected a ranked list");
    };
    assert_eq!(entries.len(), 1);
    assert_ne!(entries[0].name, columns::AMT_INCOME_TOTAL);
}

#[test]
fn test_metrics_are_stable_across_resolutions() {
    let data = dataset(&portfolio(70));
    let catalog = MetricCatalog::standard();
    let mut state = credit_lens::FilterState::new();
    state
        .set_categories(&data, columns::NAME_FAMILY_STATUS, ["Married", "Civil marriage"])
        .unwrap();

    let first = resolve(&data, &state).unwrap();
    let second = resolve(&data, &state).unwrap();
    for name in catalog.names() {
        let a = catalog
            .evaluate(name, &EvalContext::new(&first, ViewOptions::default()))
            .unwrap();
        let b = catalog
            .evaluate(name, &EvalContext::new(&second, ViewOptions::default()))
            .unwrap();
        assert_eq!(a, b, "metric {name} changed between resolutions");
    }
}

#[test]
fn test_empty_view_yields_not_available() {
    let data = dataset(&portfolio(20));
    let empty = View::new(Arc::clone(&data), Vec::new());
    let catalog = MetricCatalog::standard();
    let ctx = EvalContext::new(&empty, ViewOptions::default());

    for name in catalog.names() {
        let result = catalog.evaluate(name, &ctx).unwrap();
        assert_eq!(result.value, MetricValue::NotAvailable, "metric {name}");
    }
}

#[test]
fn test_excluded_column_yields_not_available() {
    let rows: Vec<Applicant> = (0..10)
        .map(|i| Applicant {
            goods_price: if i < 7 { None } else { Some(300_000.0) },
            target: Some(i64::from(i % 2 == 0)),
            ..Applicant::default()
        })
        .collect();
    let mut session = session(&rows);
    let goods = session.evaluate_metric("avg_goods_price").unwrap();
    assert_eq!(goods.value, MetricValue::NotAvailable);
}

#[test]
fn test_every_page_metric_is_registered() {
    let catalog = MetricCatalog::standard();
    for page in &PAGES {
        for name in page.metrics {
            assert!(catalog.get(name).is_ok(), "page {} names unknown metric {name}", page.number);
        }
    }
    assert!(matches!(
        catalog.get("no_such_metric"),
        Err(DashboardError::UnknownMetric(_))
    ));
}
