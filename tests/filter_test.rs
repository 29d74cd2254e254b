mod utils;

use credit_lens::schema::columns;
use credit_lens::{CorrelationMethod, DashboardError, FilterState, Predicate, filter_controls, resolve};

use utils::{Applicant, dataset, portfolio};

#[test]
fn test_empty_state_admits_every_row() {
    let data = dataset(&portfolio(50));
    let view = resolve(&data, &FilterState::new()).unwrap();
    assert_eq!(view.len(), 50);
    assert_eq!(view.rows(), (0..50).collect::<Vec<u32>>().as_slice());
}

#[test]
fn test_invalid_predicates_leave_state_unchanged() {
    let data = dataset(&portfolio(30));
    let mut state = FilterState::new();
    state
        .set_categories(&data, columns::CODE_GENDER, ["F"])
        .unwrap();
    let before = state.clone();

    let inverted = state.set_range(&data, columns::AGE_YEARS, 60.0, 20.0);
    assert!(matches!(inverted, Err(DashboardError::InvalidFilter(_))));

    let unknown = state.set_categories(&data, "NOT_A_COLUMN", ["x"]);
    assert!(matches!(unknown, Err(DashboardError::InvalidFilter(_))));

    let wrong_kind = state.set_categories(&data, columns::AGE_YEARS, ["30"]);
    assert!(matches!(wrong_kind, Err(DashboardError::InvalidFilter(_))));

    let not_finite = state.set_range(&data, columns::EMPLOYMENT_YEARS, f64::NAN, 3.0);
    assert!(not_finite.is_err());

    assert!(state.set_top_n(2).is_err());
    assert!(state.set_top_n(41).is_err());

    assert_eq!(state, before);
}

#[test]
fn test_excluded_column_cannot_be_filtered() {
    let rows: Vec<Applicant> = (0..10)
        .map(|i| Applicant {
            occupation: if i < 8 { None } else { Some("Drivers") },
            ..Applicant::default()
        })
        .collect();
    let data = dataset(&rows);
    let mut state = FilterState::new();
    let err = state
        .set_categories(&data, columns::OCCUPATION_TYPE, ["Drivers"])
        .unwrap_err();
    assert!(err.to_string().contains("excluded"));
    assert!(state.is_empty());
}

#[test]
fn test_adding_predicates_never_grows_the_view() {
    let data = dataset(&portfolio(120));
    let mut state = FilterState::new();
    let mut last = resolve(&data, &state).unwrap().len();

    let steps: Vec<Box<dyn Fn(&mut FilterState)>> = vec![
        Box::new(|s| s.set_categories(&data, columns::CODE_GENDER, ["F"]).unwrap()),
        Box::new(|s| {
            s.set_categories(&data, columns::NAME_HOUSING_TYPE, ["House / apartment"])
                .unwrap()
        }),
        Box::new(|s| s.set_range(&data, columns::AGE_YEARS, 25.0, 45.0).unwrap()),
        Box::new(|s| {
            s.set_include_missing(&data, columns::EMPLOYMENT_YEARS, false)
                .unwrap()
        }),
        Box::new(|s| s.set_categories(&data, columns::INCOME_BRACKET, ["Mid", "High"]).unwrap()),
    ];

    for step in steps {
        step(&mut state);
        let now = resolve(&data, &state).unwrap().len();
        assert!(now <= last, "view grew from {last} to {now}");
        last = now;
    }
}

#[test]
fn test_resolving_twice_is_identical() {
    let data = dataset(&portfolio(80));
    let mut state = FilterState::new();
    state
        .set_categories(&data, columns::NAME_EDUCATION_TYPE, ["Higher education", "Incomplete higher"])
        .unwrap();
    state.set_range(&data, columns::AGE_YEARS, 22.0, 40.0).unwrap();

    let first = resolve(&data, &state).unwrap();
    let second = resolve(&data, &state).unwrap();
    assert_eq!(first, second);
    assert!(first.rows().windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_missing_tenure_switch() {
    let data = dataset(&portfolio(120));
    let mut state = FilterState::new();

    state
        .set_include_missing(&data, columns::EMPLOYMENT_YEARS, false)
        .unwrap();
    // rows 0, 9, ..., 117 carry the unemployed marker
    assert_eq!(resolve(&data, &state).unwrap().len(), 106);

    // narrowing the range keeps the switch
    state.set_range(&data, columns::EMPLOYMENT_YEARS, 0.0, 1000.0).unwrap();
    assert!(matches!(
        state.predicate(columns::EMPLOYMENT_YEARS),
        Some(Predicate::Range { include_missing: false, .. })
    ));

    state
        .set_include_missing(&data, columns::EMPLOYMENT_YEARS, true)
        .unwrap();
    assert_eq!(resolve(&data, &state).unwrap().len(), 120);
}

#[test]
fn test_toggle_category_adds_and_removes() {
    let data = dataset(&portfolio(30));
    let mut state = FilterState::new();

    state.toggle_category(&data, columns::CODE_GENDER, "M").unwrap();
    let only_men = resolve(&data, &state).unwrap();
    assert_eq!(only_men.len(), 10);

    state.toggle_category(&data, columns::CODE_GENDER, "F").unwrap();
    assert_eq!(resolve(&data, &state).unwrap().len(), 30);

    state.toggle_category(&data, columns::CODE_GENDER, "M").unwrap();
    state.toggle_category(&data, columns::CODE_GENDER, "F").unwrap();
    assert!(state.is_empty(), "an emptied selection removes the predicate");
}

#[test]
fn test_reset_after_four_predicates() {
    let data = dataset(&portfolio(60));
    let mut state = FilterState::new();
    state.set_categories(&data, columns::CODE_GENDER, ["F"]).unwrap();
    state
        .set_categories(&data, columns::NAME_FAMILY_STATUS, ["Married"])
        .unwrap();
    state.set_range(&data, columns::AGE_YEARS, 25.0, 35.0).unwrap();
    state.set_categories(&data, columns::INCOME_BRACKET, ["Low"]).unwrap();
    state.set_method(CorrelationMethod::Pearson);
    assert_eq!(state.len(), 4);

    state.reset();
    assert!(state.is_empty());
    assert_eq!(state, FilterState::new());
    assert_eq!(resolve(&data, &state).unwrap().len(), data.num_rows());
}

#[test]
fn test_fingerprint_tracks_state() {
    let data = dataset(&portfolio(20));
    let mut a = FilterState::new();
    let mut b = FilterState::new();
    assert_eq!(a.fingerprint(), b.fingerprint());

    a.set_categories(&data, columns::CODE_GENDER, ["M", "F"]).unwrap();
    b.set_categories(&data, columns::CODE_GENDER, ["F", "M"]).unwrap();
    assert_eq!(a.fingerprint(), b.fingerprint());

    b.set_method(CorrelationMethod::Pearson);
    assert_ne!(a.fingerprint(), b.fingerprint());
    assert_eq!(a.predicate_fingerprint(), b.predicate_fingerprint());
}

#[test]
fn test_controls_list_sorted_options() {
    let data = dataset(&portfolio(30));
    let controls = filter_controls(&data);

    let gender = controls
        .categories
        .iter()
        .find(|c| c.column == columns::CODE_GENDER)
        .unwrap();
    assert_eq!(gender.options, vec!["F".to_string(), "M".to_string()]);

    let brackets = controls
        .categories
        .iter()
        .find(|c| c.column == columns::INCOME_BRACKET)
        .unwrap();
    assert_eq!(brackets.options, vec!["Low", "Mid", "High"]);

    let age = controls
        .ranges
        .iter()
        .find(|r| r.column == columns::AGE_YEARS)
        .unwrap();
    assert!(age.min <= age.max);
    assert_eq!(age.min, age.min.floor());
}

#[test]
fn test_age_range_drops_missing_age() {
    let mut rows = portfolio(20);
    // a positive day count gives no age
    rows[0].days_birth = 100.0;
    let data = dataset(&rows);
    let mut state = FilterState::new();

    state.set_range(&data, columns::AGE_YEARS, 0.0, 200.0).unwrap();
    assert!(matches!(
        state.predicate(columns::AGE_YEARS),
        Some(Predicate::Range { include_missing: false, .. })
    ));
    let view = resolve(&data, &state).unwrap();
    assert_eq!(view.len(), 19);
    assert!(!view.rows().contains(&0));

    state.set_range(&data, columns::AGE_YEARS, 1000.0, 2000.0).unwrap();
    assert!(resolve(&data, &state).unwrap().is_empty());
}

#[test]
fn test_new_tenure_range_keeps_unemployed() {
    let data = dataset(&portfolio(27));
    let mut state = FilterState::new();
    state.set_range(&data, columns::EMPLOYMENT_YEARS, 1000.0, 2000.0).unwrap();

    // only the three unemployed rows have no tenure
    assert_eq!(resolve(&data, &state).unwrap().rows(), &[0, 9, 18]);
}
