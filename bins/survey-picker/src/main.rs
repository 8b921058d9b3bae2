//! survey-picker - country dialling-code picker and contact form helper
//!
//! Ranks the built-in country table against a search query, checks phone
//! numbers and assembles contact-info submissions from the command line.

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::time::Instant;
use survey_cli::args::GlobalArgs;
use survey_cli::output::{
    align_column, format_count, format_duration, table, CellAlignment, Status, Table,
};
use survey_core::config::Config;
use survey_core::contact::{ContactInfoQuestion, PhoneEntry};
use survey_core::error::{exit_codes, Error, ResultExt};
use survey_core::state::{updated_ttc, ResponseTtc, ResponseUpdate, SurveyState};
use survey_search::{countries, find_by_code, find_by_id, MatchResult, Ranker};
use survey_telemetry::{metrics, Timer};

#[derive(Parser)]
#[command(name = "survey-picker")]
#[command(about = "Country dialling-code picker and contact form helper")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank countries against a search query
    Search {
        /// Country name, alternate name or dialling code
        query: String,
        /// Maximum results to show (0 shows all)
        #[arg(short, long)]
        limit: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the built-in country table
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check a phone number the way the contact form does
    ValidatePhone {
        /// Phone number as typed
        number: String,
        /// Dialling code picked in the form, e.g. +49
        #[arg(long, conflicts_with = "country")]
        code: Option<String>,
        /// Country picked in the form, by ISO id, e.g. US
        #[arg(long)]
        country: Option<String>,
    },

    /// Build the stored response for a contact-info question
    Submit {
        /// Question definition (JSON)
        #[arg(long)]
        question: PathBuf,
        /// Comma-separated values: first name, last name, email, phone, company
        #[arg(long, value_delimiter = ',')]
        values: Vec<String>,
        /// Dialling code picked for the phone field
        #[arg(long, conflicts_with = "country")]
        code: Option<String>,
        /// Country picked for the phone field, by ISO id
        #[arg(long)]
        country: Option<String>,
        /// Survey the response belongs to
        #[arg(long, default_value = "local")]
        survey: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    /// Whether the command asked for machine-readable output
    fn json(&self) -> bool {
        match self {
            Commands::Search { json, .. }
            | Commands::List { json }
            | Commands::Submit { json, .. } => *json,
            Commands::ValidatePhone { .. } => false,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match Config::load(cli.global.config.as_deref()) {
        Ok(config) => config,
        Err(e) => std::process::exit(report_error(&e, cli.command.json())),
    };

    let guard = survey_telemetry::init_with_config(
        cli.global.telemetry_config(&config.schema.logging),
    )?;
    tracing::info!(config = ?config.path, "Starting survey-picker");

    let result = match cli.command {
        Commands::Search { query, limit, json } => run_search(&query, limit, json, &config),
        Commands::List { json } => run_list(json),
        Commands::ValidatePhone {
            number,
            code,
            country,
        } => run_validate_phone(&number, code.as_deref(), country.as_deref()),
        Commands::Submit {
            question,
            values,
            code,
            country,
            survey,
            json,
        } => {
            let phone = PhoneChoice {
                code: code.as_deref(),
                country: country.as_deref(),
            };
            run_submit(&question, &values, phone, &survey, json, &config)
        }
    };

    tracing::debug!(metrics = ?metrics().snapshot(), exit_code = result, "Finished");
    drop(guard);
    std::process::exit(result);
}

fn run_search(query: &str, limit: Option<usize>, json: bool, config: &Config) -> i32 {
    let picker = &config.schema.picker;
    let limit = match limit {
        Some(0) => None,
        Some(n) => Some(n),
        None => picker.result_limit,
    };
    let ranker = Ranker::new().limit(limit).trim_query(picker.trim_query);

    metrics().increment("searches");
    let timer = Timer::start("rank_ms");
    let results = ranker.rank(query, countries());
    let elapsed = timer.stop();

    if json {
        return print_json(&results);
    }

    if results.is_empty() {
        Status::warning("No countries matched");
        return exit_codes::NO_MATCH;
    }

    println!("{}", match_table(&results));
    Status::info(&format!(
        "{} in {}",
        format_count(results.len(), "match", "matches"),
        format_duration(elapsed)
    ));
    exit_codes::SUCCESS
}

fn match_table(results: &[MatchResult<'_>]) -> Table {
    let mut table = table(["#", "Code", "Name", "Distance", "Marker"]);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for (i, result) in results.iter().enumerate() {
        let (marker, code) = result.selection();
        table.add_row([
            (i + 1).to_string(),
            code.to_string(),
            result.display_name().to_string(),
            format!("{:.2}", result.distance),
            marker.to_string(),
        ]);
    }
    table
}

fn run_list(json: bool) -> i32 {
    let records = countries();
    if json {
        return print_json(records);
    }

    let mut table = table(["Id", "Code", "Name", "Alternate", "Marker"]);
    for record in records {
        table.add_row([
            record.id.as_str(),
            record.code.as_str(),
            record.primary_name.as_str(),
            record.alternate_name.as_str(),
            record.marker.as_str(),
        ]);
    }
    println!("{}", table);
    Status::info(&format_count(records.len(), "country", "countries"));
    exit_codes::SUCCESS
}

fn run_validate_phone(number: &str, code: Option<&str>, country: Option<&str>) -> i32 {
    let choice = PhoneChoice { code, country };
    let phone = match choice.entry() {
        Ok(phone) => phone,
        Err(e) => return report_error(&e, false),
    };

    if phone.is_valid_number(number) {
        Status::success(&format!("Valid phone number: {}", phone.full_number(number)));
        if choice.is_picked() {
            Status::info(&format!("Dialling code: {}", phone.label()));
        }
        exit_codes::SUCCESS
    } else {
        Status::error(phone.hint());
        exit_codes::VALIDATION_ERROR
    }
}

/// Dialling code picked on the command line, by code or by country id
#[derive(Debug, Clone, Copy)]
struct PhoneChoice<'a> {
    code: Option<&'a str>,
    country: Option<&'a str>,
}

impl PhoneChoice<'_> {
    fn is_picked(&self) -> bool {
        self.code.is_some() || self.country.is_some()
    }

    /// Picker state for the choice.
    ///
    /// A code shared by several countries (`+1`, `+7`) picks the first one
    /// in table order; `--country` selects a specific one.
    fn entry(&self) -> survey_core::Result<PhoneEntry> {
        let record = match (self.country, self.code) {
            (Some(id), _) => find_by_id(id).ok_or_else(|| {
                Error::validation(format!("Unknown country id: {}", id))
                    .with_hint("Use an ISO 3166-1 alpha-2 id such as DE or US")
            })?,
            (None, Some(code)) => find_by_code(code).into_iter().next().ok_or_else(|| {
                Error::validation(format!("Unknown dialling code: {}", code))
                    .with_hint("Run `survey-picker search <code>` to find a valid code")
            })?,
            (None, None) => return Ok(PhoneEntry::new()),
        };
        Ok(PhoneEntry::with_code(&record.marker, &record.code))
    }
}

fn run_submit(
    question_path: &Path,
    values: &[String],
    phone: PhoneChoice<'_>,
    survey: &str,
    json: bool,
    config: &Config,
) -> i32 {
    let started = Instant::now();

    let question = match load_question(question_path) {
        Ok(question) => question,
        Err(e) => return report_error(&e, json),
    };
    let phone = match phone.entry() {
        Ok(phone) => phone,
        Err(e) => return report_error(&e, json),
    };

    // Replay the values as edits of the rendered fields; hidden ones end up blank.
    let entered = question
        .visible_fields()
        .fold(Vec::new(), |current, field| {
            let value = values.get(field.index()).map_or("", String::as_str);
            question.apply_change(&current, field, value)
        });

    let validation = question.validate(&entered, &phone);
    if !json {
        for error in validation.errors() {
            Status::error(&error.to_string());
        }
    }
    if let Err(e) = validation.into_result() {
        return if json {
            report_error(&e, true)
        } else {
            e.exit_code()
        };
    }

    let mut state = SurveyState::new(survey);
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    state.accumulate_response(ResponseUpdate {
        finished: true,
        data: question.submission_data(&entered, &phone),
        ttc: updated_ttc(&ResponseTtc::new(), &question.id, elapsed_ms),
        ..ResponseUpdate::default()
    });

    if json {
        return print_json(&json!({
            "surveyId": state.survey_id(),
            "response": state.response(),
        }));
    }

    let submitted = question.submission(&entered, &phone);
    if submitted.is_empty() {
        Status::warning("Nothing entered; the question is submitted empty");
        return exit_codes::SUCCESS;
    }

    let language = &config.schema.contact.default_language;
    let mut table = table(["Field", "Label", "Value"]);
    for field in question.visible_fields() {
        table.add_row([
            field.id().to_string(),
            question.placeholder(field, language),
            submitted[field.index()].clone(),
        ]);
    }
    println!("{}", table);
    Status::success(&format!("Submission ready for question {}", question.id));
    exit_codes::SUCCESS
}

fn load_question(path: &Path) -> survey_core::Result<ContactInfoQuestion> {
    if !path.exists() {
        return Err(Error::file_not_found(path));
    }
    let content = std::fs::read_to_string(path).context(format!("reading {}", path.display()))?;
    ContactInfoQuestion::from_json(&content).context(format!("parsing {}", path.display()))
}

/// Report a failed command and return its exit code.
///
/// With `--json` the error goes to stdout as an [`ErrorReport`]; otherwise it
/// is rendered for the terminal on stderr.
///
/// [`ErrorReport`]: survey_core::ErrorReport
fn report_error(e: &Error, json: bool) -> i32 {
    tracing::debug!(code = %e.code, exit_code = e.exit_code(), "Command failed");
    if json {
        print_json(&e.report());
    } else {
        Status::error(&e.render());
    }
    e.exit_code()
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(output) => {
            println!("{}", output);
            exit_codes::SUCCESS
        }
        Err(e) => {
            Status::error(&format!("Failed to serialize output: {}", e));
            exit_codes::FAILURE
        }
    }
}
