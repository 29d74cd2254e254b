mod utils;

use std::fs::File;
use std::io::Cursor;

use credit_lens::FilterCommand;
use credit_lens::schema::columns;
use credit_lens::utils::io::{read_csv_with_schema, read_parquet};

use utils::{portfolio, session};

fn filtered_session() -> credit_lens::Session {
    let mut session = session(&portfolio(45));
    session
        .apply_all([
            FilterCommand::SetCategories {
                column: columns::CODE_GENDER.to_string(),
                values: vec!["F".to_string()],
            },
            FilterCommand::SetRange {
                column: columns::AGE_YEARS.to_string(),
                min: 22.0,
                max: 30.0,
            },
        ])
        .unwrap();
    session
}

#[test]
fn test_csv_export_reloads_as_the_view() {
    let mut session = filtered_session();
    let view = session.view().unwrap();
    assert!(!view.is_empty());
    assert!(view.len() < view.total_rows());

    let mut bytes = Vec::new();
    let written = session.export_csv(&mut bytes).unwrap();
    assert_eq!(written, view.len());

    let text = String::from_utf8(bytes.clone()).unwrap();
    let header = text.lines().next().unwrap();
    assert!(header.starts_with(columns::SK_ID_CURR));
    assert!(header.contains(columns::INCOME_BRACKET));

    let reloaded = read_csv_with_schema(Cursor::new(bytes), session.dataset().schema(), 16).unwrap();
    assert_eq!(reloaded, view.to_batch().unwrap());
}

#[test]
fn test_empty_view_exports_header_only() {
    let mut session = session(&portfolio(20));
    session
        .apply(FilterCommand::SetRange {
            column: columns::AGE_YEARS.to_string(),
            min: 90.0,
            max: 99.0,
        })
        .unwrap();

    let mut bytes = Vec::new();
    assert_eq!(session.export_csv(&mut bytes).unwrap(), 0);
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.lines().count() <= 1);
}

#[test]
fn test_parquet_export_keeps_columns() {
    let mut session = filtered_session();
    let view = session.view().unwrap();
    let path = std::env::temp_dir().join(format!("credit_lens_export_{}.parquet", std::process::id()));

    view.export_parquet(File::create(&path).unwrap()).unwrap();
    let reloaded = read_parquet(&path, 8).unwrap();
    std::fs::remove_file(&path).ok();

    let expected = view.to_batch().unwrap();
    assert_eq!(reloaded.num_rows(), view.len());
    assert_eq!(reloaded.columns(), expected.columns());
}
