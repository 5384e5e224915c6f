use crate::infra::load_context;
use clap::Args;
use credit_approval::approval::{
    ApplicantCsvReader, ApplicantRecord, ApprovalError, Assessment, Citizenship, Ethnicity,
    FormOptions, Gender, IncomeRate, IncomeType, Industry, ModelKind, YesNo,
};
use credit_approval::config::AppConfig;
use credit_approval::error::AppError;
use credit_approval::telemetry::{self, LogTarget};
use std::fmt::Write as _;
use std::path::PathBuf;

/// Applicant attributes as command-line flags; defaults mirror the web form.
#[derive(Args, Debug)]
pub(crate) struct ApplicantArgs {
    #[arg(long, default_value_t = 25)]
    pub(crate) age: u8,
    #[arg(long, default_value_t = 3000.0)]
    pub(crate) income: f64,
    #[arg(long, default_value_t = 6)]
    pub(crate) credit_score: u8,
    #[arg(long, default_value_t = 0.0)]
    pub(crate) debt: f64,
    #[arg(long, default_value_t = 1.0)]
    pub(crate) years_employed: f64,
    #[arg(long, default_value = "m")]
    pub(crate) gender: Gender,
    #[arg(long, default_value = "y")]
    pub(crate) married: YesNo,
    #[arg(long, default_value = "y")]
    pub(crate) bank_customer: YesNo,
    #[arg(long, default_value = "Finance")]
    pub(crate) industry: Industry,
    #[arg(long, default_value = "White")]
    pub(crate) ethnicity: Ethnicity,
    #[arg(long, default_value = "n")]
    pub(crate) prior_default: YesNo,
    #[arg(long, default_value = "y")]
    pub(crate) employed: YesNo,
    #[arg(long, default_value = "By Birth")]
    pub(crate) citizen: Citizenship,
    #[arg(long, default_value = "full_time")]
    pub(crate) income_type: IncomeType,
    #[arg(long, default_value = "n")]
    pub(crate) ambiguous_income: YesNo,
    #[arg(long, default_value = "Monthly")]
    pub(crate) income_rate: IncomeRate,
}

impl ApplicantArgs {
    pub(crate) fn into_record(self) -> ApplicantRecord {
        ApplicantRecord {
            age: self.age,
            income: self.income,
            credit_score: self.credit_score,
            debt: self.debt,
            years_employed: self.years_employed,
            gender: self.gender,
            married: self.married,
            bank_customer: self.bank_customer,
            industry: self.industry,
            ethnicity: self.ethnicity,
            prior_default: self.prior_default,
            employed: self.employed,
            citizen: self.citizen,
            income_type: self.income_type,
            ambiguous_income: self.ambiguous_income,
            income_rate: self.income_rate,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct PredictArgs {
    #[command(flatten)]
    pub(crate) applicant: ApplicantArgs,
    /// Model to score with (gam or lgb). Defaults to the configured model.
    #[arg(long)]
    pub(crate) model: Option<ModelKind>,
    /// Override the directory holding the feature schema and model artifacts
    #[arg(long)]
    pub(crate) model_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV file whose header uses the applicant field names (Age, Income, ...)
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Model to score with (gam or lgb). Defaults to the configured model.
    #[arg(long)]
    pub(crate) model: Option<ModelKind>,
    /// Override the directory holding the feature schema and model artifacts
    #[arg(long)]
    pub(crate) model_dir: Option<PathBuf>,
}

fn load_cli_config(model_dir: Option<PathBuf>) -> Result<AppConfig, AppError> {
    let mut config = AppConfig::load()?;
    if let Some(dir) = model_dir {
        config.models.artifact_dir = dir;
    }
    telemetry::init(&config.telemetry, LogTarget::Cli)?;
    Ok(config)
}

pub(crate) fn run_predict(args: PredictArgs) -> Result<(), AppError> {
    let PredictArgs {
        applicant,
        model,
        model_dir,
    } = args;

    let config = load_cli_config(model_dir)?;
    let context = load_context(&config.models)?;
    let kind = model.unwrap_or_else(|| context.default_model());
    let record = applicant.into_record();

    let assessment = context.predict_with(&record, kind)?;
    print!("{}", render_assessment(&assessment, &record));
    Ok(())
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let BatchArgs {
        input,
        model,
        model_dir,
    } = args;

    let config = load_cli_config(model_dir)?;
    let context = load_context(&config.models)?;
    let kind = model.unwrap_or_else(|| context.default_model());
    let entries = ApplicantCsvReader::from_path(&input)?;

    println!(
        "Scoring {} applicants from {} with the {} model",
        entries.len(),
        input.display(),
        kind
    );

    let mut tally = BatchTally::default();
    for entry in entries {
        let outcome = match entry.record {
            Ok(record) => context.predict_with(&record, kind).map_err(|err| match err {
                ApprovalError::Validation(err) => err.to_string(),
                other => format!("prediction unavailable ({other})"),
            }),
            Err(err) => Err(err),
        };
        tally.record(&outcome);
        println!("{}", render_batch_line(entry.line, &outcome));
    }

    println!(
        "\n{} approved | {} rejected | {} skipped",
        tally.approved, tally.rejected, tally.skipped
    );
    Ok(())
}

pub(crate) fn run_options() -> Result<(), AppError> {
    print!("{}", render_options(&FormOptions::catalogue()));
    Ok(())
}

#[derive(Debug, Default, PartialEq, Eq)]
struct BatchTally {
    approved: usize,
    rejected: usize,
    skipped: usize,
}

impl BatchTally {
    fn record(&mut self, outcome: &Result<Assessment, String>) {
        match outcome {
            Ok(assessment) if assessment.result.is_approved() => self.approved += 1,
            Ok(_) => self.rejected += 1,
            Err(_) => self.skipped += 1,
        }
    }
}

pub(crate) fn render_assessment(assessment: &Assessment, record: &ApplicantRecord) -> String {
    let mut out = String::new();
    let result = &assessment.result;

    let _ = writeln!(out, "Prediction ({} model)", assessment.model);
    let _ = writeln!(out, "Decision: {}", result.decision.label());
    if let Some(probability) = result.probability {
        let _ = writeln!(out, "Probability of approval: {probability:.2}");
    }
    if let Some(reason) = &result.reason {
        let _ = writeln!(out, "Reason: {reason}");
    }
    if !assessment.dropped_features.is_empty() {
        let _ = writeln!(
            out,
            "Not recognized by the model: {}",
            assessment.dropped_features.join(", ")
        );
    }

    let _ = writeln!(out, "\nApplicant details");
    for row in record.summary() {
        let _ = writeln!(out, "  {:<16} {}", row.feature, row.value);
    }
    out
}

fn render_batch_line(line: u64, outcome: &Result<Assessment, String>) -> String {
    match outcome {
        Ok(assessment) => {
            let result = &assessment.result;
            match (&result.reason, result.probability) {
                (Some(reason), _) => format!("line {line}: {} ({reason})", result.decision.label()),
                (None, Some(probability)) => format!(
                    "line {line}: {} (probability {probability:.2})",
                    result.decision.label()
                ),
                (None, None) => format!("line {line}: {}", result.decision.label()),
            }
        }
        Err(err) => format!("line {line}: skipped ({err})"),
    }
}

fn render_options(options: &FormOptions) -> String {
    let mut out = String::from("Numeric fields\n");
    for option in &options.numeric {
        let range = &option.range;
        let note = if range.max.is_none() {
            ", larger values accepted"
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "  {:<16} {} to {} (default {}{note})",
            option.field, range.min, range.form_max, range.default
        );
    }

    out.push_str("\nCategorical fields\n");
    for option in &options.categorical {
        let _ = writeln!(out, "  {:<16} {}", option.field, option.options.join(" | "));
    }
    out
}
