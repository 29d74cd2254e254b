//! Page Composer: the fixed binding of metric and chart names to the five
//! dashboard pages.

use serde::Serialize;

use crate::error::{DashboardError, Result};

/// Metrics and charts shown on one page, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageDefinition {
    pub number: usize,
    pub title: &'static str,
    pub metrics: [&'static str; 10],
    pub charts: [&'static str; 10],
}

pub static PAGES: [PageDefinition; 5] = [
    PageDefinition {
        number: 1,
        title: "Overview & Data Quality",
        metrics: [
            "total_applicants",
            "default_rate",
            "repaid_rate",
            "total_features",
            "avg_missing_per_feature",
            "numeric_feature_count",
            "categorical_feature_count",
            "median_age",
            "median_income",
            "avg_credit",
        ],
        charts: [
            "target_donut",
            "missing_top20",
            "age_histogram",
            "income_histogram",
            "credit_histogram",
            "income_box",
            "credit_box",
            "gender_counts",
            "family_status_counts",
            "education_counts",
        ],
    },
    PageDefinition {
        number: 2,
        title: "Target & Risk Segmentation",
        metrics: [
            "total_defaults",
            "default_rate",
            "max_default_rate_gender",
            "max_default_rate_education",
            "max_default_rate_family",
            "avg_income_defaulters",
            "avg_credit_defaulters",
            "avg_annuity_defaulters",
            "avg_employment_years_defaulters",
            "max_default_rate_housing",
        ],
        charts: [
            "target_counts",
            "default_pct_gender",
            "default_pct_education",
            "default_pct_family",
            "default_pct_housing",
            "income_by_target_box",
            "credit_by_target_box",
            "age_by_target_violin",
            "employment_by_target_stacked",
            "contract_type_by_target_stacked",
        ],
    },
    PageDefinition {
        number: 3,
        title: "Demographics & Household",
        metrics: [
            "gender_split",
            "avg_age_defaulters",
            "avg_age_non_defaulters",
            "pct_with_children",
            "avg_family_size",
            "married_vs_single",
            "pct_higher_education",
            "pct_living_with_parents",
            "pct_currently_working",
            "avg_employment_years",
        ],
        charts: [
            "age_histogram",
            "age_by_target_overlay",
            "gender_counts",
            "family_status_counts",
            "education_counts",
            "occupation_top10",
            "housing_type_pie",
            "children_counts",
            "age_by_target_box",
            "demographic_spearman_heatmap",
        ],
    },
    PageDefinition {
        number: 4,
        title: "Financial Health & Affordability",
        metrics: [
            "avg_income",
            "median_income",
            "avg_credit",
            "avg_annuity",
            "avg_goods_price",
            "avg_dti",
            "avg_lti",
            "income_gap",
            "credit_gap",
            "pct_high_credit",
        ],
        charts: [
            "income_histogram",
            "credit_histogram",
            "annuity_histogram",
            "income_vs_credit_scatter",
            "income_vs_annuity_scatter",
            "credit_by_target_box",
            "income_by_target_box",
            "income_credit_density",
            "default_rate_by_income_bracket",
            "financial_spearman_heatmap",
        ],
    },
    PageDefinition {
        number: 5,
        title: "Correlations, Drivers & Slice-and-Dice",
        metrics: [
            "top5_positive_corr",
            "top5_negative_corr",
            "most_corr_with_income",
            "most_corr_with_credit",
            "corr_income_credit",
            "corr_age_target",
            "corr_employment_target",
            "corr_family_size_target",
            "top5_abs_corr_share",
            "strong_corr_count",
        ],
        charts: [
            "selected_numerics_heatmap",
            "abs_corr_to_target",
            "age_vs_credit_scatter",
            "age_vs_income_scatter",
            "employment_vs_target_jitter",
            "credit_by_education_box",
            "income_by_family_box",
            "scatter_matrix",
            "default_pct_gender",
            "default_pct_education",
        ],
    },
];

/// Look up a page by its 1-based number
///
/// # Errors
/// Returns [`DashboardError::UnknownPage`] outside 1..=5
pub fn page(number: usize) -> Result<&'static PageDefinition> {
    PAGES
        .iter()
        .find(|p| p.number == number)
        .ok_or(DashboardError::UnknownPage(number))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_are_numbered_in_order() {
        for (i, p) in PAGES.iter().enumerate() {
            assert_eq!(p.number, i + 1);
        }
        assert!(page(0).is_err());
        assert!(page(6).is_err());
    }
}
