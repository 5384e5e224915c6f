use std::fs;
use std::path::PathBuf;

use credit_approval::approval::{
    ApplicantCsvReader, ApplicantRecord, ApprovalContext, ApprovalError, ArtifactError,
    Citizenship, Decision, DecisionPolicy, Ethnicity, Gender, HardRule, IncomeRate, IncomeType,
    Industry, ModelArtifacts, ModelKind, YesNo,
};

fn shipped_models() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../../models"))
}

fn context(default_model: ModelKind) -> ApprovalContext {
    let artifacts = ModelArtifacts::load(shipped_models()).expect("shipped artifacts load");
    ApprovalContext::new(artifacts, default_model, DecisionPolicy::default())
        .expect("context builds")
}

fn reference_applicant() -> ApplicantRecord {
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

fn probability_of(context: &ApprovalContext, record: &ApplicantRecord, kind: ModelKind) -> f64 {
    context
        .predict_with(record, kind)
        .expect("prediction succeeds")
        .result
        .probability
        .expect("model was consulted")
}

#[test]
fn shipped_schema_has_every_form_column_but_income_rate_na() {
    let context = context(ModelKind::Gam);

    assert_eq!(context.schema().width(), 35);
    assert_eq!(
        context.layout().unmapped_indicators(),
        vec!["IncomeRate_NA".to_string()]
    );
}

#[test]
fn models_disagree_on_the_reference_applicant() {
    let context = context(ModelKind::Gam);
    let applicant = reference_applicant();

    let additive = context.predict(&applicant).expect("gam scores");
    assert_eq!(additive.model, ModelKind::Gam);
    assert_eq!(additive.result.decision, Decision::Approved);
    let p = additive.result.probability.expect("probability");
    assert!((p - 0.5474).abs() < 1e-3, "gam probability {p}");

    let trees = context
        .predict_with(&applicant, ModelKind::Lgb)
        .expect("lgb scores");
    assert_eq!(trees.result.decision, Decision::Rejected);
    let p = trees.result.probability.expect("probability");
    assert!((p - 0.4378).abs() < 1e-3, "lgb probability {p}");
}

#[test]
fn configured_default_model_is_used() {
    let context = context(ModelKind::Lgb);

    let assessment = context.predict(&reference_applicant()).expect("scores");

    assert_eq!(assessment.model, ModelKind::Lgb);
    assert_eq!(assessment.result.decision, Decision::Rejected);
}

#[test]
fn prior_default_and_credit_move_probability() {
    let context = context(ModelKind::Gam);
    let baseline = reference_applicant();
    let prior_default = ApplicantRecord {
        prior_default: YesNo::Yes,
        ..reference_applicant()
    };
    let no_credit = ApplicantRecord {
        credit_score: 0,
        income: 0.0,
        ..reference_applicant()
    };

    for kind in ModelKind::ordered() {
        let base = probability_of(&context, &baseline, kind);
        assert!(probability_of(&context, &prior_default, kind) > base, "{kind}");
        assert!(probability_of(&context, &no_credit, kind) < base, "{kind}");
    }
}

#[test]
fn hard_rules_apply_with_shipped_models() {
    let context = context(ModelKind::Gam);

    let child = ApplicantRecord {
        age: 10,
        ..reference_applicant()
    };
    let assessment = context.predict(&child).expect("rule decision");
    assert_eq!(assessment.result.decision, Decision::Rejected);
    assert_eq!(assessment.result.rule, Some(HardRule::UnderMinimumAge));
    assert_eq!(assessment.result.probability, None);

    let retiree = ApplicantRecord {
        age: 70,
        ..reference_applicant()
    };
    let assessment = context
        .predict_with(&retiree, ModelKind::Lgb)
        .expect("rule decision");
    assert_eq!(
        assessment.result.reason.as_deref(),
        Some("Age limit for credit card exceeded.")
    );
}

#[test]
fn invalid_income_never_reaches_a_model() {
    let context = context(ModelKind::Gam);
    let record = ApplicantRecord {
        income: -10.0,
        ..reference_applicant()
    };

    let err = context.predict(&record).expect_err("validation fails");

    assert!(matches!(err, ApprovalError::Validation(_)));
}

#[test]
fn batch_file_scores_each_line() {
    let dir = std::env::temp_dir().join(format!("credit-approval-batch-{}", std::process::id()));
    fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join("applicants.csv");
    fs::write(
        &path,
        "Age,Income,CreditScore,Debt,YearsEmployed,Gender,Married,BankCustomer,Industry,\
Ethnicity,PriorDefault,Employed,Citizen,IncomeType,AmbiguousIncome,IncomeRate\n\
25,3000,6,0,1,m,y,y,Finance,White,n,y,By Birth,full_time,n,Monthly\n\
17,3000,6,0,1,f,n,n,Healthcare,Asian,n,n,By other means,NA,n,NA\n\
30,1000,4,0,2,m,y,n,Mining,White,n,y,By Birth,full_time,n,Monthly\n",
    )
    .expect("write batch");

    let context = context(ModelKind::Gam);
    let entries = ApplicantCsvReader::from_path(&path).expect("batch reads");
    fs::remove_dir_all(&dir).ok();

    assert_eq!(entries.len(), 3);
    let decisions: Vec<Option<Decision>> = entries
        .iter()
        .map(|entry| {
            entry
                .record
                .as_ref()
                .ok()
                .map(|record| context.predict(record).expect("scores").result.decision)
        })
        .collect();
    assert_eq!(
        decisions,
        vec![Some(Decision::Approved), Some(Decision::Rejected), None]
    );
    assert_eq!(entries[2].line, 4);
}

#[test]
fn missing_artifact_directory_is_reported() {
    let err = ModelArtifacts::load(shipped_models().join("does-not-exist"))
        .expect_err("nothing to load");

    match err {
        ArtifactError::Io { path, .. } => {
            assert!(path.ends_with("feature_columns.json"), "{path:?}");
        }
        other => panic!("expected io error, got {other}"),
    }
}
