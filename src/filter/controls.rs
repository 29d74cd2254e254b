//! Options offered to a filter control surface.

use serde::Serialize;

use crate::schema::columns;
use crate::store::Dataset;
use crate::utils::arrow::float_values;

/// Categorical columns offered as multi-select filters
pub const CATEGORY_FILTERS: [(&str, &str); 5] = [
    (columns::CODE_GENDER, "Gender"),
    (columns::NAME_EDUCATION_TYPE, "Education"),
    (columns::NAME_FAMILY_STATUS, "Family Status"),
    (columns::NAME_HOUSING_TYPE, "Housing Type"),
    (columns::INCOME_BRACKET, "Income Bracket"),
];

/// Numeric columns offered as range sliders
pub const RANGE_FILTERS: [(&str, &str); 2] = [
    (columns::AGE_YEARS, "Age Range"),
    (columns::EMPLOYMENT_YEARS, "Employment Years"),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryControl {
    pub column: String,
    pub label: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeControl {
    pub column: String,
    pub label: String,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterControls {
    pub categories: Vec<CategoryControl>,
    pub ranges: Vec<RangeControl>,
}

/// List the filters the dataset supports
///
/// Category options are sorted, except income brackets which keep the
/// `Low`, `Mid`, `High` order. Slider domains are the floor of the minimum
/// and the ceiling of the maximum; a column with no values gets `0..0`.
#[must_use]
pub fn filter_controls(dataset: &Dataset) -> FilterControls {
    let categories = CATEGORY_FILTERS
        .iter()
        .filter(|(column, _)| dataset.is_available(column))
        .filter_map(|&(column, label)| {
            let values = dataset.strings(column).ok()?;
            let mut options: Vec<String> = values.iter().flatten().map(ToString::to_string).collect();
            options.sort_unstable();
            options.dedup();
            if column == columns::INCOME_BRACKET {
                options = columns::INCOME_BRACKETS
                    .iter()
                    .filter(|b| options.iter().any(|o| o == *b))
                    .map(ToString::to_string)
                    .collect();
            }
            Some(CategoryControl {
                column: column.to_string(),
                label: label.to_string(),
                options,
            })
        })
        .collect();

    let ranges = RANGE_FILTERS
        .iter()
        .filter(|(column, _)| dataset.is_available(column))
        .filter_map(|&(column, label)| {
            let values = float_values(dataset.float(column).ok()?);
            let (min, max) = crate::stats::min_max(&values)
                .map_or((0.0, 0.0), |(lo, hi)| (lo.floor(), hi.ceil()));
            Some(RangeControl {
                column: column.to_string(),
                label: label.to_string(),
                min,
                max,
            })
        })
        .collect();

    FilterControls { categories, ranges }
}
