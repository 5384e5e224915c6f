use serde::{Deserialize, Serialize};

/// Declares a closed set of form choices together with the labels used both on the wire and
/// in the trained feature names.
macro_rules! form_choice {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            pub fn ordered() -> &'static [Self] {
                &[$(Self::$variant),+]
            }

            pub const fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }

            pub fn from_label(raw: &str) -> Option<Self> {
                Self::ordered()
                    .iter()
                    .copied()
                    .find(|choice| choice.label() == raw.trim())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ValidationError;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                Self::from_label(raw).ok_or_else(|| ValidationError::UnknownChoice {
                    field: stringify!($name),
                    value: raw.to_string(),
                })
            }
        }
    };
}

form_choice! {
    Gender {
        Male => "m",
        Female => "f",
    }
}

form_choice! {
    /// Shared answer set for the y/n questions on the form.
    YesNo {
        Yes => "y",
        No => "n",
    }
}

form_choice! {
    Industry {
        Industrials => "Industrials",
        Finance => "Finance",
        Technology => "Technology",
        Healthcare => "Healthcare",
    }
}

form_choice! {
    Ethnicity {
        White => "White",
        Black => "Black",
        Asian => "Asian",
        Hispanic => "Hispanic",
        Other => "Other",
    }
}

form_choice! {
    Citizenship {
        ByBirth => "By Birth",
        ByOtherMeans => "By other means",
    }
}

form_choice! {
    IncomeType {
        PartTimeFreelancer => "part_time/freelancer",
        NotApplicable => "NA",
        FullTime => "full_time",
        FullTimeFreelancer => "full_time/freelancer",
    }
}

form_choice! {
    IncomeRate {
        Monthly => "Monthly",
        Yearly => "Yearly",
        NotApplicable => "NA",
    }
}

/// Numeric attributes collected on the form, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NumericField {
    Age,
    Income,
    CreditScore,
    Debt,
    YearsEmployed,
}

impl NumericField {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Age,
            Self::Income,
            Self::CreditScore,
            Self::Debt,
            Self::YearsEmployed,
        ]
    }

    /// Column name used by the trained feature schema.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Age => "Age",
            Self::Income => "Income",
            Self::CreditScore => "CreditScore",
            Self::Debt => "Debt",
            Self::YearsEmployed => "YearsEmployed",
        }
    }

    pub const fn range(self) -> NumericRange {
        match self {
            Self::Age => NumericRange::bounded(0.0, 100.0, 25.0, true),
            Self::Income => NumericRange::at_least(0.0, 1_000_000.0, 3000.0, false),
            Self::CreditScore => NumericRange::bounded(0.0, 20.0, 6.0, true),
            Self::Debt => NumericRange::at_least(0.0, 30.0, 0.0, false),
            Self::YearsEmployed => NumericRange::at_least(0.0, 50.0, 1.0, false),
        }
    }
}

/// Accepted domain and form default of a numeric attribute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumericRange {
    pub min: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Upper end offered by the form input. Larger values still validate when `max` is unset.
    pub form_max: f64,
    pub default: f64,
    pub integer: bool,
}

impl NumericRange {
    const fn bounded(min: f64, max: f64, default: f64, integer: bool) -> Self {
        Self {
            min,
            max: Some(max),
            form_max: max,
            default,
            integer,
        }
    }

    const fn at_least(min: f64, form_max: f64, default: f64, integer: bool) -> Self {
        Self {
            min,
            max: None,
            form_max,
            default,
            integer,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && self.max.map_or(true, |max| value <= max)
    }
}

/// Categorical attributes collected on the form, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CategoricalField {
    Gender,
    Married,
    BankCustomer,
    Industry,
    Ethnicity,
    PriorDefault,
    Employed,
    Citizen,
    IncomeType,
    AmbiguousIncome,
    IncomeRate,
}

impl CategoricalField {
    pub const fn ordered() -> [Self; 11] {
        [
            Self::Gender,
            Self::Married,
            Self::BankCustomer,
            Self::Industry,
            Self::Ethnicity,
            Self::PriorDefault,
            Self::Employed,
            Self::Citizen,
            Self::IncomeType,
            Self::AmbiguousIncome,
            Self::IncomeRate,
        ]
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Gender => "Gender",
            Self::Married => "Married",
            Self::BankCustomer => "BankCustomer",
            Self::Industry => "Industry",
            Self::Ethnicity => "Ethnicity",
            Self::PriorDefault => "PriorDefault",
            Self::Employed => "Employed",
            Self::Citizen => "Citizen",
            Self::IncomeType => "IncomeType",
            Self::AmbiguousIncome => "AmbiguousIncome",
            Self::IncomeRate => "IncomeRate",
        }
    }

    /// Every value the form offers for this field.
    pub fn options(self) -> Vec<&'static str> {
        fn labels<T: Copy>(choices: &[T], label: fn(T) -> &'static str) -> Vec<&'static str> {
            choices.iter().copied().map(label).collect()
        }

        match self {
            Self::Gender => labels(Gender::ordered(), Gender::label),
            Self::Married
            | Self::BankCustomer
            | Self::PriorDefault
            | Self::Employed
            | Self::AmbiguousIncome => labels(YesNo::ordered(), YesNo::label),
            Self::Industry => labels(Industry::ordered(), Industry::label),
            Self::Ethnicity => labels(Ethnicity::ordered(), Ethnicity::label),
            Self::Citizen => labels(Citizenship::ordered(), Citizenship::label),
            Self::IncomeType => labels(IncomeType::ordered(), IncomeType::label),
            Self::IncomeRate => labels(IncomeRate::ordered(), IncomeRate::label),
        }
    }

    /// Indicator column produced for `value`, e.g. `Industry_Finance`.
    pub fn indicator(self, value: &str) -> String {
        format!("{}_{}", self.name(), value)
    }
}

/// Applicant attributes as submitted through the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApplicantRecord {
    pub age: u8,
    pub income: f64,
    pub credit_score: u8,
    pub debt: f64,
    pub years_employed: f64,
    pub gender: Gender,
    pub married: YesNo,
    pub bank_customer: YesNo,
    pub industry: Industry,
    pub ethnicity: Ethnicity,
    pub prior_default: YesNo,
    pub employed: YesNo,
    pub citizen: Citizenship,
    pub income_type: IncomeType,
    pub ambiguous_income: YesNo,
    pub income_rate: IncomeRate,
}

impl ApplicantRecord {
    pub fn numeric(&self, field: NumericField) -> f64 {
        match field {
            NumericField::Age => f64::from(self.age),
            NumericField::Income => self.income,
            NumericField::CreditScore => f64::from(self.credit_score),
            NumericField::Debt => self.debt,
            NumericField::YearsEmployed => self.years_employed,
        }
    }

    pub fn categorical(&self, field: CategoricalField) -> &'static str {
        match field {
            CategoricalField::Gender => self.gender.label(),
            CategoricalField::Married => self.married.label(),
            CategoricalField::BankCustomer => self.bank_customer.label(),
            CategoricalField::Industry => self.industry.label(),
            CategoricalField::Ethnicity => self.ethnicity.label(),
            CategoricalField::PriorDefault => self.prior_default.label(),
            CategoricalField::Employed => self.employed.label(),
            CategoricalField::Citizen => self.citizen.label(),
            CategoricalField::IncomeType => self.income_type.label(),
            CategoricalField::AmbiguousIncome => self.ambiguous_income.label(),
            CategoricalField::IncomeRate => self.income_rate.label(),
        }
    }

    /// Reject values outside the declared domain before they reach the encoder.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for field in NumericField::ordered() {
            let value = self.numeric(field);
            let range = field.range();
            if !range.contains(value) {
                return Err(ValidationError::OutOfRange {
                    field: field.name(),
                    value,
                    min: range.min,
                    max: range.max,
                });
            }
        }
        Ok(())
    }

    /// Feature/value rows echoed back alongside a prediction.
    pub fn summary(&self) -> Vec<SummaryRow> {
        let numeric = NumericField::ordered().into_iter().map(|field| SummaryRow {
            feature: field.name(),
            value: format_numeric(field, self.numeric(field)),
        });
        let categorical = CategoricalField::ordered()
            .into_iter()
            .map(|field| SummaryRow {
                feature: field.name(),
                value: self.categorical(field).to_string(),
            });
        numeric.chain(categorical).collect()
    }
}

fn format_numeric(field: NumericField, value: f64) -> String {
    if field.range().integer {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

/// Single "Applicant Details" entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub feature: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error(
        "{field} must be at least {min}{} (got {value})",
        .max.map(|max| format!(" and at most {max}")).unwrap_or_default()
    )]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: Option<f64>,
    },
    #[error("{field} does not accept '{value}'")]
    UnknownChoice { field: &'static str, value: String },
}

/// Choices and ranges the form offers, in form order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormOptions {
    pub numeric: Vec<NumericOption>,
    pub categorical: Vec<CategoricalOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericOption {
    pub field: &'static str,
    #[serde(flatten)]
    pub range: NumericRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoricalOption {
    pub field: &'static str,
    pub options: Vec<&'static str>,
}

impl FormOptions {
    pub fn catalogue() -> Self {
        Self {
            numeric: NumericField::ordered()
                .into_iter()
                .map(|field| NumericOption {
                    field: field.name(),
                    range: field.range(),
                })
                .collect(),
            categorical: CategoricalField::ordered()
                .into_iter()
                .map(|field| CategoricalOption {
                    field: field.name(),
                    options: field.options(),
                })
                .collect(),
        }
    }
}
