mod utils;

use std::sync::Arc;

use credit_lens::charts::relationship::sample_positions;
use credit_lens::filter::ViewOptions;
use credit_lens::schema::columns;
use credit_lens::{
    Cell, ChartCatalog, DashboardConfig, DashboardError, EvalContext, FilterCommand, PAGES,
    SummaryStatus, View,
};

use utils::{Applicant, dataset, dataset_with, plain_config, portfolio, session, ten_applicants};

fn count(cell: &Cell) -> u64 {
    match cell {
        Cell::Count(n) => *n,
        other => panic!("expected a count, got {other:?}"),
    }
}

#[test]
fn test_empty_view_gives_empty_summaries() {
    let data = dataset(&portfolio(20));
    let empty = View::new(Arc::clone(&data), Vec::new());
    let catalog = ChartCatalog::standard();
    let ctx = EvalContext::new(&empty, ViewOptions::default());

    for name in catalog.names() {
        let summary = catalog.prepare(name, &ctx).unwrap();
        assert_eq!(summary.status, SummaryStatus::Empty, "chart {name}");
        assert!(summary.rows.is_empty());
        assert!(!summary.columns.is_empty());
    }
}

#[test]
fn test_every_page_chart_is_registered() {
    let catalog = ChartCatalog::standard();
    for page in &PAGES {
        for name in page.charts {
            assert!(catalog.get(name).is_ok(), "page {} names unknown chart {name}", page.number);
        }
    }
    assert!(matches!(catalog.get("pie_of_pies"), Err(DashboardError::UnknownChart(_))));
}

#[test]
fn test_target_donut_shares() {
    let mut session = session(&ten_applicants());
    let donut = session.prepare_chart("target_donut").unwrap();

    assert_eq!(donut.status, SummaryStatus::Ready);
    assert_eq!(donut.rows.len(), 2);
    assert_eq!(donut.rows[0][0], Cell::text("Repaid"));
    assert_eq!(donut.rows[0][1], Cell::Count(7));
    let default_pct = donut.rows[1][2].as_number().unwrap();
    assert!((default_pct - 30.0).abs() < 1e-9);
}

#[test]
fn test_small_groups_are_marked() {
    let mut rows = ten_applicants();
    rows.push(Applicant {
        gender: "XNA",
        ..Applicant::default()
    });
    let mut session = session(&rows);
    let by_gender = session.prepare_chart("default_pct_gender").unwrap();

    let xna = by_gender
        .rows
        .iter()
        .find(|r| r[0] == Cell::text("XNA"))
        .expect("XNA group listed");
    assert_eq!(xna[1], Cell::insufficient());
    assert!(by_gender.has_insufficient_groups());
}

#[test]
fn test_histogram_counts_every_value() {
    let mut session = session(&portfolio(64));
    let hist = session.prepare_chart("income_histogram").unwrap();

    // sqrt(64) bins
    assert_eq!(hist.rows.len(), 8);
    let total: u64 = hist.rows.iter().map(|r| count(&r[2])).sum();
    assert_eq!(total, 64);
}

#[test]
fn test_heatmap_is_symmetric_with_unit_diagonal() {
    let mut session = session(&portfolio(60));
    let heatmap = session.prepare_chart("financial_spearman_heatmap").unwrap();
    assert_eq!(heatmap.columns, vec!["row", "column", "corr"]);

    let value = |a: &str, b: &str| {
        heatmap
            .rows
            .iter()
            .find(|r| r[0] == Cell::text(a) && r[1] == Cell::text(b))
            .map(|r| r[2].clone())
    };
    let n = (heatmap.rows.len() as f64).sqrt() as usize;
    assert_eq!(n * n, heatmap.rows.len());
    assert_eq!(value(columns::DTI, columns::DTI), Some(Cell::Number(1.0)));
    assert_eq!(
        value(columns::AMT_CREDIT, columns::TARGET),
        value(columns::TARGET, columns::AMT_CREDIT)
    );
}

#[test]
fn test_abs_corr_chart_respects_top_n() {
    let mut session = session(&portfolio(60));
    session.apply(FilterCommand::SetTopN(5)).unwrap();
    let chart = session.prepare_chart("abs_corr_to_target").unwrap();

    assert!(chart.rows.len() <= 5);
    let abs: Vec<f64> = chart.rows.iter().filter_map(|r| r[2].as_number()).collect();
    assert!(abs.windows(2).all(|w| w[0] >= w[1]));
    assert!(chart.rows.iter().all(|r| r[0] != Cell::text(columns::TARGET)));
}

#[test]
fn test_scatter_sample_is_bounded_and_repeatable() {
    let config = DashboardConfig {
        sample_size: 25,
        ..plain_config()
    };
    let data = dataset_with(&portfolio(100), config);
    let view = View::all(Arc::clone(&data));
    let catalog = ChartCatalog::standard();
    let ctx = EvalContext::new(&view, ViewOptions::default());

    let first = catalog.prepare("age_vs_credit_scatter", &ctx).unwrap();
    let second = catalog.prepare("age_vs_credit_scatter", &ctx).unwrap();
    assert_eq!(first.rows.len(), 25);
    assert_eq!(first, second);
    assert_eq!(first.columns, vec![columns::AGE_YEARS, columns::AMT_CREDIT, "status"]);

    let positions = sample_positions(100, 25, 42);
    assert_eq!(positions.len(), 25);
}

#[test]
fn test_jitter_stays_near_target() {
    let mut session = session(&portfolio(90));
    let jitter = session.prepare_chart("employment_vs_target_jitter").unwrap();

    // rows with the unemployed marker have no tenure
    assert_eq!(jitter.rows.len(), 80);
    for row in &jitter.rows {
        let y = row[1].as_number().unwrap();
        let nearest = y.round();
        assert!(nearest == 0.0 || nearest == 1.0);
        assert!((y - nearest).abs() <= 0.05);
    }
}

#[test]
fn test_density_grid_counts_complete_pairs() {
    let mut session = session(&portfolio(70));
    let density = session.prepare_chart("income_credit_density").unwrap();
    let total: u64 = density.rows.iter().map(|r| count(&r[4])).sum();
    assert_eq!(total, 70);
}

#[test]
fn test_unavailable_column_marks_chart() {
    let rows: Vec<Applicant> = (0..10)
        .map(|i| Applicant {
            occupation: if i < 9 { None } else { Some("Drivers") },
            ..Applicant::default()
        })
        .collect();
    let mut session = session(&rows);
    let chart = session.prepare_chart("occupation_top10").unwrap();
    assert_eq!(chart.status, SummaryStatus::Unavailable);
    assert!(chart.rows.is_empty());
}

#[test]
fn test_single_row_histogram_is_marked() {
    let data = dataset(&portfolio(10));
    let single = View::new(Arc::clone(&data), vec![3]);
    let catalog = ChartCatalog::standard();
    let ctx = EvalContext::new(&single, ViewOptions::default());

    for name in ["age_histogram", "income_histogram", "credit_histogram", "annuity_histogram"] {
        let hist = catalog.prepare(name, &ctx).unwrap();
        assert_eq!(hist.rows.len(), 1, "chart {name}");
        assert_eq!(hist.rows[0][2], Cell::insufficient());
        assert!(hist.has_insufficient_groups());
    }
}
