//! SlimVita CLI - command-line driver for the funnel engine
//!
//! Commands:
//! - calculate: Compute health metrics for a profile
//! - questions: Print the questionnaire
//! - run: Drive the questionnaire from NDJSON answer events on stdin
//! - plans: Show the plans page or a checkout redirect for a session
//! - avatar: Generate the before/after avatar preview
//! - doctor: Diagnose configuration and session files

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use slimvita_funnel::avatar::{generate_preview, AvatarKind, AvatarRequest, HttpAvatarClient};
use slimvita_funnel::questionnaire::{
    questions, AnswerEvent, Completion, QuestionnaireController,
};
use slimvita_funnel::{
    calculate_health_metrics, FunnelConfig, FunnelError, PlanTier, PlansPage, ResultsView,
    SessionStore, UserProfile, FUNNEL_VERSION, PRODUCT_NAME,
};

/// SlimVita - questionnaire, health metrics and plan hand-off engine
#[derive(Parser)]
#[command(name = "slimvita")]
#[command(author = "SlimVita")]
#[command(version = FUNNEL_VERSION)]
#[command(about = "Drive the SlimVita funnel from the command line", long_about = None)]
struct Cli {
    /// JSON configuration file (SLIMVITA_* environment variables override it)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute health metrics for a profile
    Calculate {
        /// Profile JSON file (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Output the results screen cards instead of raw metrics
        #[arg(long)]
        view: bool,

        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,
    },

    /// Print the questionnaire
    Questions {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Drive the questionnaire from NDJSON answer events on stdin
    Run {
        /// Session store file; the hand-off is written here on completion
        #[arg(long)]
        session: Option<PathBuf>,

        /// Flush output after each report
        #[arg(long, default_value = "true")]
        flush: bool,
    },

    /// Show the plans page, or the checkout redirect for a tier
    Plans {
        /// Session store file written by `run`
        #[arg(long)]
        session: Option<PathBuf>,

        /// Plan to check out
        #[arg(long, value_enum)]
        checkout: Option<TierArg>,

        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,
    },

    /// Generate the before/after avatar preview for a profile
    Avatar {
        /// Profile JSON file (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,
    },

    /// Diagnose configuration and session files
    Doctor {
        /// Check a session store file
        #[arg(long)]
        session: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Single-line JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, Copy, ValueEnum)]
enum TierArg {
    Basic,
    Pro,
    Premium,
}

impl From<TierArg> for PlanTier {
    fn from(tier: TierArg) -> Self {
        match tier {
            TierArg::Basic => PlanTier::Basic,
            TierArg::Pro => PlanTier::Pro,
            TierArg::Premium => PlanTier::Premium,
        }
    }
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), SlimvitaCliError> {
    let config_path = cli.config;

    match cli.command {
        Commands::Calculate {
            input,
            view,
            output_format,
        } => cmd_calculate(&input, view, &output_format),

        Commands::Questions { json } => cmd_questions(json),

        Commands::Run { session, flush } => cmd_run(session.as_deref(), flush),

        Commands::Plans {
            session,
            checkout,
            output_format,
        } => {
            let config = load_config(config_path.as_deref())?;
            cmd_plans(&config, session.as_deref(), checkout, &output_format)
        }

        Commands::Avatar { input } => {
            let config = load_config(config_path.as_deref())?;
            cmd_avatar(&config, &input)
        }

        Commands::Doctor { session, json } => {
            cmd_doctor(config_path.as_deref(), session.as_deref(), json)
        }
    }
}

fn cmd_calculate(input: &Path, view: bool, output_format: &OutputFormat) -> Result<(), SlimvitaCliError> {
    let profile = read_profile(input)?;
    let results = calculate_health_metrics(&profile);

    let output = if view {
        format_output(&ResultsView::new(&results), output_format)?
    } else {
        format_output(&results, output_format)?
    };
    println!("{}", output);

    Ok(())
}

fn cmd_questions(json: bool) -> Result<(), SlimvitaCliError> {
    if json {
        println!("{}", serde_json::to_string_pretty(questions())?);
        return Ok(());
    }

    for (index, question) in questions().iter().enumerate() {
        println!("{:>2}. [{}] {}", index + 1, question.id, question.title);
        for option in question.options {
            println!("      - {} ({})", option.value, option.label);
        }
        if let (Some(min), Some(max)) = (question.min, question.max) {
            println!(
                "      range {}-{} {}, default {}",
                min,
                max,
                question.unit.unwrap_or_default(),
                question.default.map(|d| d.to_string()).unwrap_or_default()
            );
        }
    }

    Ok(())
}

fn cmd_run(session: Option<&Path>, flush: bool) -> Result<(), SlimvitaCliError> {
    let mut controller = QuestionnaireController::new();
    let mut store = match session {
        Some(path) if path.exists() => SessionStore::from_json(&fs::read_to_string(path)?)?,
        _ => SessionStore::new(),
    };

    let stdin = io::stdin();
    let completion = drive_questionnaire(&mut controller, stdin.lock(), io::stdout(), flush)?;

    let completion = match completion {
        Some(completion) => completion,
        None => return Err(SlimvitaCliError::Incomplete(controller.current_step() + 1)),
    };

    store.record_completion(&completion.profile, &completion.results)?;
    if let Some(path) = session {
        fs::write(path, store.to_json()?)?;
    }

    Ok(())
}

/// Line written in place of a step report when an answer is rejected
#[derive(Serialize)]
struct RejectedEvent {
    step: usize,
    error: CliError,
}

/// Apply NDJSON answer events until the questionnaire is submitted or the
/// input ends. Rejected answers are reported inline and the step is kept;
/// only I/O and malformed lines stop the run.
fn drive_questionnaire<R: BufRead, W: Write>(
    controller: &mut QuestionnaireController,
    input: R,
    mut output: W,
    flush: bool,
) -> Result<Option<Completion>, SlimvitaCliError> {
    let mut completion = None;

    for line in input.lines() {
        let line = line?;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        let event: AnswerEvent = serde_json::from_str(trimmed).map_err(|e| {
            SlimvitaCliError::ParseError(format!("Failed to parse answer event: {}", e))
        })?;

        match controller.apply(&event) {
            Ok(report) => {
                writeln!(output, "{}", serde_json::to_string(&report)?)?;
                completion = report.completion;
            }
            Err(e) => {
                tracing::warn!(step = controller.current_step(), error = %e, "answer rejected");
                let rejected = RejectedEvent {
                    step: controller.current_step(),
                    error: SlimvitaCliError::Funnel(e).into(),
                };
                writeln!(output, "{}", serde_json::to_string(&rejected)?)?;
            }
        }
        if flush {
            output.flush()?;
        }

        if completion.is_some() {
            break;
        }
    }

    output.flush()?;
    Ok(completion)
}

fn cmd_plans(
    config: &FunnelConfig,
    session: Option<&Path>,
    checkout: Option<TierArg>,
    output_format: &OutputFormat,
) -> Result<(), SlimvitaCliError> {
    let store = match session {
        Some(path) => SessionStore::from_json(&fs::read_to_string(path)?)?,
        None => SessionStore::new(),
    };

    let page = PlansPage::from_session(&store, &config.checkout);

    let output = match checkout {
        Some(tier) => format_output(&page.checkout(tier.into())?, output_format)?,
        None => format_output(&page, output_format)?,
    };
    println!("{}", output);

    Ok(())
}

fn cmd_avatar(config: &FunnelConfig, input: &Path) -> Result<(), SlimvitaCliError> {
    let profile = read_profile(input)?;
    let request = AvatarRequest::from_profile(&profile, AvatarKind::Current);
    let client = HttpAvatarClient::new(&config.avatar);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let preview = runtime.block_on(generate_preview(&client, &request, config.avatar.timeout()));

    println!("{}", serde_json::to_string_pretty(&preview)?);
    Ok(())
}

fn cmd_doctor(
    config_path: Option<&Path>,
    session: Option<&Path>,
    json: bool,
) -> Result<(), SlimvitaCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "version".to_string(),
        status: CheckStatus::Ok,
        message: format!("{} version {}", PRODUCT_NAME, FUNNEL_VERSION),
    });

    checks.push(DoctorCheck {
        name: "questionnaire".to_string(),
        status: CheckStatus::Ok,
        message: format!("{} steps", questions().len()),
    });

    match load_config(config_path) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Ok,
                message: format!(
                    "Avatar endpoint {} (timeout {} ms)",
                    config.avatar.endpoint, config.avatar.timeout_ms
                ),
            });
            checks.push(if config.avatar.api_key.is_some() {
                DoctorCheck {
                    name: "avatar_api_key".to_string(),
                    status: CheckStatus::Ok,
                    message: "Avatar API key configured".to_string(),
                }
            } else {
                DoctorCheck {
                    name: "avatar_api_key".to_string(),
                    status: CheckStatus::Warning,
                    message: "No avatar API key; requests are sent unauthenticated".to_string(),
                }
            });
        }
        Err(e) => checks.push(DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Error,
            message: CliError::from(e).message,
        }),
    }

    if let Some(session_path) = session {
        if session_path.exists() {
            match fs::read_to_string(session_path) {
                Ok(content) => match SessionStore::from_json(&content) {
                    Ok(store) => {
                        let handoff = if store.load_handoff().is_some() {
                            "hand-off present"
                        } else {
                            "no hand-off"
                        };
                        checks.push(DoctorCheck {
                            name: "session".to_string(),
                            status: CheckStatus::Ok,
                            message: format!(
                                "Session {} valid (completed: {}, {})",
                                store.session_id(),
                                store.is_completed(),
                                handoff
                            ),
                        });
                    }
                    Err(e) => checks.push(DoctorCheck {
                        name: "session".to_string(),
                        status: CheckStatus::Error,
                        message: format!("Invalid session JSON: {}", e),
                    }),
                },
                Err(e) => checks.push(DoctorCheck {
                    name: "session".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Cannot read session file: {}", e),
                }),
            }
        } else {
            checks.push(DoctorCheck {
                name: "session".to_string(),
                status: CheckStatus::Warning,
                message: "Session file does not exist".to_string(),
            });
        }
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (ready for `run`)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        product: PRODUCT_NAME.to_string(),
        version: FUNNEL_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("SlimVita Doctor Report");
        println!("======================");
        println!("Product: {}", report.product);
        println!("Version: {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report.checks.iter().any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(SlimvitaCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Helper functions

fn load_config(path: Option<&Path>) -> Result<FunnelConfig, SlimvitaCliError> {
    let base = match path {
        Some(path) => FunnelConfig::from_json(&fs::read_to_string(path)?)?,
        None => FunnelConfig::default(),
    };
    Ok(base.with_overrides(|key| std::env::var(key).ok())?)
}

fn read_profile(input: &Path) -> Result<UserProfile, SlimvitaCliError> {
    let data = if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    serde_json::from_str(&data)
        .map_err(|e| SlimvitaCliError::ParseError(format!("Invalid profile: {}", e)))
}

fn format_output<T: Serialize>(value: &T, format: &OutputFormat) -> Result<String, SlimvitaCliError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(value)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
    }
}

// Error types

#[derive(Debug)]
enum SlimvitaCliError {
    Io(io::Error),
    Funnel(FunnelError),
    Json(serde_json::Error),
    Incomplete(usize),
    DoctorFailed,
    ParseError(String),
}

impl From<io::Error> for SlimvitaCliError {
    fn from(e: io::Error) -> Self {
        SlimvitaCliError::Io(e)
    }
}

impl From<FunnelError> for SlimvitaCliError {
    fn from(e: FunnelError) -> Self {
        SlimvitaCliError::Funnel(e)
    }
}

impl From<serde_json::Error> for SlimvitaCliError {
    fn from(e: serde_json::Error) -> Self {
        SlimvitaCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<SlimvitaCliError> for CliError {
    fn from(e: SlimvitaCliError) -> Self {
        match e {
            SlimvitaCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            SlimvitaCliError::Funnel(e) => {
                let hint = match &e {
                    FunnelError::InvalidEmail(_) => "The email answer must contain '@'",
                    FunnelError::UnknownQuestion(_) | FunnelError::UnknownOption { .. } => {
                        "Run 'slimvita questions' for valid ids and options"
                    }
                    FunnelError::ConfigError(_) => "Check the config file and SLIMVITA_* variables",
                    _ => "Check the input against the questionnaire",
                };
                CliError {
                    code: "FUNNEL_ERROR".to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            SlimvitaCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            SlimvitaCliError::Incomplete(step) => CliError {
                code: "INCOMPLETE".to_string(),
                message: format!("Input ended before the questionnaire was submitted (step {})", step),
                hint: Some("Send an advance event on the final step".to_string()),
            },
            SlimvitaCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
            SlimvitaCliError::ParseError(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some("Check input format".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct DoctorReport {
    product: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use slimvita_funnel::questionnaire::{ids, QuestionKind};

    /// Events answering every step up to the email with its first option
    fn answers_until_email() -> Vec<AnswerEvent> {
        let mut events = Vec::new();
        for question in questions() {
            if question.kind == QuestionKind::Email {
                break;
            }
            if question.kind.is_choice() {
                events.push(AnswerEvent::Select {
                    question: question.id.to_string(),
                    value: question.options[0].value.to_string(),
                });
            }
            events.push(AnswerEvent::Advance);
        }
        events
    }

    fn email(value: &str) -> AnswerEvent {
        AnswerEvent::Text {
            question: ids::EMAIL.to_string(),
            value: value.to_string(),
        }
    }

    fn ndjson(events: &[AnswerEvent]) -> String {
        events
            .iter()
            .map(|e| serde_json::to_string(e).unwrap())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_invalid_email_is_reported_and_run_continues() {
        let mut events = answers_until_email();
        events.extend([
            email("not-an-email"),
            AnswerEvent::Advance,
            email("me@example.com"),
            AnswerEvent::Advance,
        ]);
        let input = ndjson(&events);

        let mut controller = QuestionnaireController::new();
        let mut output = Vec::new();
        let completion =
            drive_questionnaire(&mut controller, input.as_bytes(), &mut output, false).unwrap();

        let completion = completion.expect("questionnaire should complete");
        assert_eq!(completion.profile.email.as_deref(), Some("me@example.com"));

        let lines: Vec<serde_json::Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), events.len());

        let rejected = &lines[events.len() - 3];
        assert_eq!(rejected["error"]["code"], "FUNNEL_ERROR");
        assert_eq!(rejected["step"], questions().len() - 1);
        assert!(lines[events.len() - 1]["completion"].is_object());
    }

    #[test]
    fn test_unknown_option_does_not_stop_the_run() {
        let events = [
            AnswerEvent::Select {
                question: ids::GENDER.to_string(),
                value: "robot".to_string(),
            },
            AnswerEvent::Select {
                question: ids::GENDER.to_string(),
                value: "male".to_string(),
            },
            AnswerEvent::Advance,
        ];
        let input = ndjson(&events);

        let mut controller = QuestionnaireController::new();
        let mut output = Vec::new();
        let completion =
            drive_questionnaire(&mut controller, input.as_bytes(), &mut output, true).unwrap();

        assert!(completion.is_none());
        assert_eq!(controller.current_step(), 1);
        assert_eq!(String::from_utf8(output).unwrap().lines().count(), 3);
    }

    #[test]
    fn test_malformed_line_is_fatal() {
        let mut controller = QuestionnaireController::new();
        let result = drive_questionnaire(
            &mut controller,
            "{\"action\":\"jump\"}".as_bytes(),
            Vec::new(),
            false,
        );

        assert!(matches!(result, Err(SlimvitaCliError::ParseError(_))));
    }
}
