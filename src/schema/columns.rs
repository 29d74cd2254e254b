//! Column names of the credit-application dataset.
//!
//! Raw names follow the application table; derived names are produced by
//! the derivation engine.

/// Default flag: 1 means the applicant defaulted, 0 means repaid
pub const TARGET: &str = "TARGET";
/// Application identifier, kept as text and never used as a feature
pub const SK_ID_CURR: &str = "SK_ID_CURR";

pub const DAYS_BIRTH: &str = "DAYS_BIRTH";
pub const DAYS_EMPLOYED: &str = "DAYS_EMPLOYED";
pub const AMT_INCOME_TOTAL: &str = "AMT_INCOME_TOTAL";
pub const AMT_CREDIT: &str = "AMT_CREDIT";
pub const AMT_ANNUITY: &str = "AMT_ANNUITY";
pub const AMT_GOODS_PRICE: &str = "AMT_GOODS_PRICE";
pub const CNT_CHILDREN: &str = "CNT_CHILDREN";
pub const CNT_FAM_MEMBERS: &str = "CNT_FAM_MEMBERS";

pub const CODE_GENDER: &str = "CODE_GENDER";
pub const NAME_EDUCATION_TYPE: &str = "NAME_EDUCATION_TYPE";
pub const NAME_FAMILY_STATUS: &str = "NAME_FAMILY_STATUS";
pub const NAME_HOUSING_TYPE: &str = "NAME_HOUSING_TYPE";
pub const NAME_CONTRACT_TYPE: &str = "NAME_CONTRACT_TYPE";
pub const OCCUPATION_TYPE: &str = "OCCUPATION_TYPE";

pub const AGE_YEARS: &str = "AGE_YEARS";
pub const EMPLOYMENT_YEARS: &str = "EMPLOYMENT_YEARS";
pub const DTI: &str = "DTI";
pub const LOAN_TO_INCOME: &str = "LOAN_TO_INCOME";
pub const ANNUITY_TO_CREDIT: &str = "ANNUITY_TO_CREDIT";
pub const INCOME_BRACKET: &str = "INCOME_BRACKET";

/// Columns the derivation engine cannot run without
pub const REQUIRED_RAW: [&str; 6] = [
    TARGET,
    DAYS_BIRTH,
    DAYS_EMPLOYED,
    AMT_INCOME_TOTAL,
    AMT_CREDIT,
    AMT_ANNUITY,
];

/// Numeric columns computed during derivation
pub const DERIVED_NUMERIC: [&str; 5] = [
    AGE_YEARS,
    EMPLOYMENT_YEARS,
    DTI,
    LOAN_TO_INCOME,
    ANNUITY_TO_CREDIT,
];

/// Income bracket labels in display order
pub const INCOME_BRACKETS: [&str; 3] = ["Low", "Mid", "High"];

/// Label for collapsed rare categories
pub const OTHER_LABEL: &str = "Other";
/// Source placeholder category kept explicit during rare collapsing
pub const XNA_LABEL: &str = "XNA";
/// Fill value for categorical columns with no observed value
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Display label for a target value
#[must_use]
pub fn status_label(target: f64) -> &'static str {
    if target >= 0.5 { "Default" } else { "Repaid" }
}

/// Whether a column is one of the derived numeric columns
#[must_use]
pub fn is_derived(column: &str) -> bool {
    DERIVED_NUMERIC.contains(&column) || column == INCOME_BRACKET
}
