mod utils;

use credit_lens::schema::columns;
use credit_lens::{CorrelationMethod, DashboardError, FilterCommand, MetricValue, Session};

use utils::{Applicant, dataset, portfolio, session};

/// 100 rows with rising income; only rows 97, 98 and 99 are female
fn income_ladder() -> Vec<Applicant> {
    (0..100)
        .map(|i| Applicant {
            income: 100_000.0 + 1_000.0 * f64::from(i),
            gender: if i >= 97 { "F" } else { "M" },
            target: Some(i64::from(i % 10 == 0)),
            ..Applicant::default()
        })
        .collect()
}

fn categories(column: &str, values: &[&str]) -> FilterCommand {
    FilterCommand::SetCategories {
        column: column.to_string(),
        values: values.iter().map(ToString::to_string).collect(),
    }
}

#[test]
fn test_gender_and_bracket_intersection() {
    let mut session = session(&income_ladder());
    session
        .apply_all([
            categories(columns::CODE_GENDER, &["F"]),
            categories(columns::INCOME_BRACKET, &["High"]),
        ])
        .unwrap();

    let view = session.view().unwrap();
    assert_eq!(view.len(), 3);
    assert_eq!(view.rows(), &[97, 98, 99]);

    let total = session.evaluate_metric("total_applicants").unwrap();
    assert_eq!(total.value, MetricValue::Count(3));
    let income = session.evaluate_metric("avg_income").unwrap();
    assert_eq!(income.value, MetricValue::Number(198_000.0));
}

#[test]
fn test_rejected_command_keeps_state() {
    let mut session = session(&portfolio(40));
    session
        .apply(categories(columns::CODE_GENDER, &["M"]))
        .unwrap();
    let before = session.state().clone();

    let err = session
        .apply(FilterCommand::SetRange {
            column: columns::AGE_YEARS.to_string(),
            min: 50.0,
            max: 30.0,
        })
        .unwrap_err();
    assert!(matches!(err, DashboardError::InvalidFilter(_)));
    assert!(session.apply(FilterCommand::SetTopN(100)).is_err());
    assert_eq!(session.state(), &before);
}

#[test]
fn test_reset_restores_full_view() {
    let mut session = session(&portfolio(60));
    let total = session.dataset().num_rows();
    session
        .apply_all([
            categories(columns::CODE_GENDER, &["F"]),
            categories(columns::NAME_HOUSING_TYPE, &["With parents"]),
            categories(columns::INCOME_BRACKET, &["Low", "Mid"]),
            FilterCommand::SetRange {
                column: columns::AGE_YEARS.to_string(),
                min: 20.0,
                max: 40.0,
            },
        ])
        .unwrap();
    assert_eq!(session.state().len(), 4);
    assert!(session.view().unwrap().len() < total);

    session.apply(FilterCommand::Reset).unwrap();
    assert!(session.state().is_empty());
    assert_eq!(session.view().unwrap().len(), total);
}

#[test]
fn test_views_and_charts_are_memoized() {
    let mut session = session(&portfolio(50));

    let first = session.view().unwrap();
    let second = session.view().unwrap();
    assert_eq!(first, second);
    let stats = session.cache_stats();
    assert_eq!(stats.view_misses, 1);
    assert_eq!(stats.view_hits, 1);

    let a = session.prepare_chart("target_donut").unwrap();
    let b = session.prepare_chart("target_donut").unwrap();
    assert_eq!(a, b);
    let stats = session.cache_stats();
    assert_eq!(stats.chart_misses, 1);
    assert_eq!(stats.chart_hits, 1);

    // view options are part of the chart key
    session.apply(FilterCommand::SetTopN(10)).unwrap();
    session.prepare_chart("target_donut").unwrap();
    assert_eq!(session.cache_stats().chart_misses, 2);
    // but not of the view key
    session.view().unwrap();
    assert_eq!(session.cache_stats().view_misses, 1);
}

#[test]
fn test_correlation_matrix_is_shared_between_metrics() {
    let mut session = session(&portfolio(50));
    session.evaluate_metric("top5_positive_corr").unwrap();
    session.evaluate_metric("top5_negative_corr").unwrap();
    session.evaluate_metric("strong_corr_count").unwrap();

    let stats = session.cache_stats();
    assert_eq!(stats.correlation_misses, 1);
    assert_eq!(stats.correlation_hits, 2);

    session
        .apply(FilterCommand::SetMethod(CorrelationMethod::Pearson))
        .unwrap();
    session.evaluate_metric("top5_positive_corr").unwrap();
    assert_eq!(session.cache_stats().correlation_misses, 2);
}

#[test]
fn test_every_page_renders() {
    let mut session = session(&portfolio(80));
    for number in 1..=5 {
        let report = session.render_page(number).unwrap();
        assert_eq!(report.page, number);
        assert_eq!(report.metrics.len(), 10);
        assert_eq!(report.charts.len(), 10);
        assert_eq!(report.row_count, 80);
        assert_eq!(report.total_rows, 80);
        assert!(!report.insights.is_empty());
    }
    assert!(matches!(
        session.render_page(6),
        Err(DashboardError::UnknownPage(6))
    ));
}

#[test]
fn test_empty_view_renders_notice() {
    let mut session = Session::new(dataset(&portfolio(30)));
    session
        .apply(FilterCommand::SetRange {
            column: columns::AGE_YEARS.to_string(),
            min: 95.0,
            max: 99.0,
        })
        .unwrap();

    let report = session.render_page(4).unwrap();
    assert_eq!(report.row_count, 0);
    assert_eq!(report.insights, vec![credit_lens::insights::NO_ROWS.to_string()]);
    assert!(report.metrics.iter().all(|m| m.value == MetricValue::NotAvailable));
}

#[test]
fn test_affordability_insights_name_thresholds() {
    let rows: Vec<Applicant> = (0..40)
        .map(|i| Applicant {
            income: 100_000.0,
            credit: if i < 10 { 800_000.0 } else { 300_000.0 },
            annuity: Some(if i < 10 { 40_000.0 } else { 20_000.0 }),
            target: Some(i64::from(i < 5)),
            ..Applicant::default()
        })
        .collect();
    let mut session = session(&rows);
    let report = session.render_page(4).unwrap();

    let lti = report
        .insights
        .iter()
        .find(|s| s.starts_with("LTI > 6"))
        .expect("LTI insight");
    assert!(lti.contains("50.00%"), "{lti}");
    assert!(lti.contains("0.00%"), "{lti}");
}

#[test]
fn test_drill_through_toggle() {
    let mut session = session(&portfolio(30));
    session
        .apply(FilterCommand::Toggle {
            column: columns::NAME_EDUCATION_TYPE.to_string(),
            value: "Higher education".to_string(),
        })
        .unwrap();
    assert_eq!(session.view().unwrap().len(), 10);

    session
        .apply(FilterCommand::Clear {
            column: columns::NAME_EDUCATION_TYPE.to_string(),
        })
        .unwrap();
    assert_eq!(session.view().unwrap().len(), 30);
}
