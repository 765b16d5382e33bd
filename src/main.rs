//! Purpose: `jsongate` CLI entry point and command dispatch.
//! Role: Binary crate root; parses args, reads one JSON document, runs a command, emits JSON.
//! Invariants: Successful commands write exactly one JSON document to stdout.
//! Invariants: Errors are emitted as JSON on stderr (plain text when stderr is a terminal).
//! Invariants: Process exit code is derived from `api::to_exit_code`.
//! Invariants: Logs go to stderr through `tracing`; stdout stays machine-readable.
use std::cell::RefCell;
use std::error::Error as StdError;
use std::fs;
use std::io::{self, IsTerminal, Read, Write};
use std::path::PathBuf;
use std::rc::Rc;

use clap::{Args, Parser, Subcommand, error::ErrorKind as ClapErrorKind};
use serde_json::{Map, Value, json};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod rule_spec;

use jsongate::api::{
    Error, ErrorKind, GateFailure, Observed, ParseGate, deserialize_object, fragment_children,
    is_valid_json, select_fragment, to_exit_code,
};
use rule_spec::{RuleSpec, load_rules_file};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    init_tracing();
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, Error> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    Error::new(ErrorKind::Io)
                        .with_message("failed to write help")
                        .with_source(io_err)
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message(clap_error_summary(&err))
                    .with_hint("Try `jsongate --help`."));
            }
        },
    };

    let pretty = cli.pretty;
    match cli.command {
        Command::Validate(args) => run_validate(&args, pretty),
        Command::Select(args) => run_select(&args, pretty),
        Command::Gate(args) => run_gate(&args, pretty),
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "jsongate",
    version,
    about = "Check fields of a JSON document before trusting the rest of it",
    long_about = None,
    after_help = r#"EXAMPLES
  $ jsongate validate response.json
  $ jsongate select response.json --path data.items --children
  $ jsongate gate response.json --rule 'errCode:int == 0' --target data
  $ curl -s https://api.example.com/app | jsongate gate - --rules rules.json --target data

RULES
  PATH:KIND [OP LITERAL]
    KIND     int | float | bool | string | json
    OP       == != < <= > >=   (whitespace around OP is required)
    LITERAL  JSON text; bare words are read as strings
  Without OP the field only has to be present and of KIND.

LOGGING
  Set RUST_LOG (default: warn). Logs are written to stderr."#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(long, global = true, help = "Pretty-print JSON output")]
    pretty: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the input is a JSON object or array.
    Validate(InputArgs),
    /// Print the fragment at a path (or its children).
    Select(SelectArgs),
    /// Evaluate rules; print the target fragment only when all of them pass.
    Gate(GateArgs),
}

#[derive(Args, Debug)]
struct InputArgs {
    #[arg(value_name = "INPUT", help = "JSON file to read, or - for stdin")]
    input: String,
}

#[derive(Args, Debug)]
struct SelectArgs {
    #[command(flatten)]
    input: InputArgs,
    #[arg(long, default_value = "", help = "Path to select (default: document root)")]
    path: String,
    #[arg(long, help = "Print the array elements or object values of the fragment")]
    children: bool,
}

#[derive(Args, Debug)]
struct GateArgs {
    #[command(flatten)]
    input: InputArgs,
    #[arg(long = "rule", value_name = "SPEC", help = "Rule as PATH:KIND [OP LITERAL]; repeatable")]
    rules: Vec<String>,
    #[arg(long = "rules", value_name = "FILE", help = "JSON array of rule objects")]
    rules_file: Option<PathBuf>,
    #[arg(long, default_value = "", help = "Path of the fragment to print (default: root)")]
    target: String,
}

fn run_validate(args: &InputArgs, pretty: bool) -> Result<RunOutcome, Error> {
    let text = read_input(&args.input)?;
    if is_valid_json(&text) {
        emit_json(&json!({"valid": true}), pretty)?;
        return Ok(RunOutcome::ok());
    }
    // Surface the parser's own diagnosis when there is one.
    deserialize_object::<Value>(&text)?;
    Err(Error::new(ErrorKind::Parse)
        .with_message("document must be a JSON object or array")
        .with_hint("Scalars and bare values are not accepted as documents."))
}

fn run_select(args: &SelectArgs, pretty: bool) -> Result<RunOutcome, Error> {
    let text = read_input(&args.input.input)?;
    let not_found = || {
        Error::new(ErrorKind::NotFound)
            .with_message("path not found in document")
            .with_path(args.path.as_str())
    };
    let value = if args.children {
        Value::Array(fragment_children(&text, &args.path)?.ok_or_else(not_found)?)
    } else {
        select_fragment(&text, &args.path)?.ok_or_else(not_found)?
    };
    emit_json(&value, pretty)?;
    Ok(RunOutcome::ok())
}

fn run_gate(args: &GateArgs, pretty: bool) -> Result<RunOutcome, Error> {
    let text = read_input(&args.input.input)?;
    let mut gate = ParseGate::from_json(&text)?;

    let mut specs = Vec::new();
    if let Some(file) = &args.rules_file {
        specs.extend(load_rules_file(file)?);
    }
    for raw in &args.rules {
        specs.push(RuleSpec::parse(raw)?);
    }

    let reported = Rc::new(RefCell::new(Vec::new()));
    for spec in specs {
        debug!(rule = %spec, "adding rule");
        if !gate.has_fail_callback(&spec.path) {
            let sink = Rc::clone(&reported);
            let path = spec.path.clone();
            gate.add_condition_fail_callback(spec.path.as_str(), move |observed| {
                sink.borrow_mut().push(failure_json(&path, observed));
            })?;
        }
        gate.add_rule(spec.into_rule());
    }

    match gate.parse_with(&args.target, |fragment| Ok(fragment.clone())) {
        Ok(fragment) => {
            emit_json(&fragment, pretty)?;
            Ok(RunOutcome::ok())
        }
        Err(failure @ GateFailure::Conditions(_)) => {
            let err = Error::from(failure);
            emit_failure(&err, &reported.borrow());
            Ok(RunOutcome::with_code(to_exit_code(err.kind())))
        }
        Err(GateFailure::Bind(err)) => Err(err),
    }
}

fn failure_json(path: &str, observed: &Observed) -> Value {
    let mut entry = Map::new();
    entry.insert("path".to_string(), json!(path));
    entry.insert("absent".to_string(), json!(observed.is_absent()));
    entry.insert(
        "observed".to_string(),
        observed.to_json().unwrap_or(Value::Null),
    );
    Value::Object(entry)
}

fn read_input(input: &str) -> Result<String, Error> {
    if input == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text).map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to read stdin")
                .with_source(err)
        })?;
        return Ok(text);
    }
    fs::read_to_string(input).map_err(|err| {
        let kind = if err.kind() == io::ErrorKind::NotFound {
            ErrorKind::NotFound
        } else {
            ErrorKind::Io
        };
        Error::new(kind)
            .with_message(format!("failed to read {input}"))
            .with_source(err)
    })
}

fn encode_json(value: &Value, pretty: bool) -> String {
    let encoded = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    encoded.unwrap_or_else(|_| "null".to_string())
}

fn emit_json(value: &Value, pretty: bool) -> Result<(), Error> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", encode_json(value, pretty)).map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to write output")
            .with_source(err)
    })
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn clap_error_summary(err: &clap::Error) -> String {
    let rendered = err.to_string();
    rendered
        .lines()
        .find(|line| !line.trim().is_empty())
        .map(|line| line.trim_start_matches("error: ").trim().to_string())
        .unwrap_or_else(|| "invalid arguments".to_string())
}

fn emit_error(err: &Error) {
    emit_failure(err, &[]);
}

/// Report `err` on stderr along with any per-rule failure entries.
fn emit_failure(err: &Error, failures: &[Value]) {
    if io::stderr().is_terminal() {
        eprintln!("{}", error_text(err, failures));
        return;
    }

    let json = serde_json::to_string(&error_json(err, failures)).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::NotFound => "not found".to_string(),
        ErrorKind::AlreadyExists => "already exists".to_string(),
        ErrorKind::Parse => "invalid json".to_string(),
        ErrorKind::Bind => "could not bind fragment".to_string(),
        ErrorKind::ConditionFailed => "conditions not met".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error, failures: &[Value]) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }
    if !failures.is_empty() {
        inner.insert("failures".to_string(), Value::Array(failures.to_vec()));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error, failures: &[Value]) -> String {
    let mut lines = vec![format!("error: {}", error_message(err))];
    if let Some(hint) = err.hint() {
        lines.push(format!("hint: {hint}"));
    }
    if let Some(path) = err.path() {
        lines.push(format!("path: {path}"));
    }
    for failure in failures {
        let path = failure["path"].as_str().unwrap_or_default();
        if failure["absent"].as_bool().unwrap_or(false) {
            lines.push(format!("failed: {path} (absent)"));
        } else {
            lines.push(format!("failed: {path} (observed {})", failure["observed"]));
        }
    }
    lines.join("\n")
}
