use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::approval::artifacts::ModelArtifacts;
use crate::approval::context::ApprovalContext;
use crate::approval::decision::DecisionPolicy;
use crate::approval::domain::{
    ApplicantRecord, Citizenship, Ethnicity, Gender, IncomeRate, IncomeType, Industry, YesNo,
};
use crate::approval::encoder::EncodedRow;
use crate::approval::model::{ModelKind, ModelOutput, ScoringError, ScoringModel};
use crate::approval::schema::{FeatureLayout, FeatureSchema};

pub(super) fn schema_columns() -> Vec<String> {
    [
        "Age",
        "Income",
        "CreditScore",
        "Debt",
        "YearsEmployed",
        "Gender_f",
        "Gender_m",
        "Married_n",
        "Married_y",
        "BankCustomer_n",
        "BankCustomer_y",
        "Industry_Finance",
        "Industry_Healthcare",
        "Industry_Industrials",
        "Industry_Technology",
        "Ethnicity_Asian",
        "Ethnicity_Black",
        "Ethnicity_Hispanic",
        "Ethnicity_Other",
        "Ethnicity_White",
        "PriorDefault_n",
        "PriorDefault_y",
        "Employed_n",
        "Employed_y",
        "Citizen_By Birth",
        "Citizen_By other means",
        "IncomeType_NA",
        "IncomeType_full_time",
        "IncomeType_full_time/freelancer",
        "IncomeType_part_time/freelancer",
        "AmbiguousIncome_NA",
        "AmbiguousIncome_n",
        "AmbiguousIncome_y",
        "IncomeRate_Monthly",
        "IncomeRate_Yearly",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

pub(super) fn schema() -> Arc<FeatureSchema> {
    Arc::new(FeatureSchema::new(schema_columns()).expect("valid schema"))
}

pub(super) fn layout() -> FeatureLayout {
    FeatureLayout::new(schema())
}

/// The reference applicant used throughout the workflow scenarios.
pub(super) fn applicant() -> ApplicantRecord {
    ApplicantRecord {
        age: 25,
        income: 3000.0,
        credit_score: 6,
        debt: 0.0,
        years_employed: 1.0,
        gender: Gender::Male,
        married: YesNo::Yes,
        bank_customer: YesNo::Yes,
        industry: Industry::Finance,
        ethnicity: Ethnicity::White,
        prior_default: YesNo::No,
        employed: YesNo::Yes,
        citizen: Citizenship::ByBirth,
        income_type: IncomeType::FullTime,
        ambiguous_income: YesNo::No,
        income_rate: IncomeRate::Monthly,
    }
}

pub(super) fn applicant_aged(age: u8) -> ApplicantRecord {
    ApplicantRecord {
        age,
        ..applicant()
    }
}

/// Model double returning a fixed output and counting invocations.
pub(super) struct SpyModel {
    output: ModelOutput,
    calls: AtomicUsize,
}

impl SpyModel {
    pub(super) fn scalar(probability: f64) -> Self {
        Self::returning(ModelOutput::Scalar(probability))
    }

    pub(super) fn returning(output: ModelOutput) -> Self {
        Self {
            output,
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ScoringModel for SpyModel {
    fn predict_proba(&self, _row: &EncodedRow) -> Result<ModelOutput, ScoringError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.output.clone())
    }
}

pub(super) struct FailingModel;

impl ScoringModel for FailingModel {
    fn predict_proba(&self, _row: &EncodedRow) -> Result<ModelOutput, ScoringError> {
        Err(ScoringError::Backend("solver diverged".to_string()))
    }
}

pub(super) fn context_with(
    gam: Arc<dyn ScoringModel>,
    lgb: Arc<dyn ScoringModel>,
) -> ApprovalContext {
    let mut models: BTreeMap<ModelKind, Arc<dyn ScoringModel>> = BTreeMap::new();
    models.insert(ModelKind::Gam, gam);
    models.insert(ModelKind::Lgb, lgb);
    ApprovalContext::new(
        ModelArtifacts::from_parts(schema(), models),
        ModelKind::Gam,
        DecisionPolicy::default(),
    )
    .expect("context builds")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
