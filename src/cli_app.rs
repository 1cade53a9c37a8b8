//! Top-level CLI definition and dispatch.

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell as CompletionShell, generate};
use colored::{Colorize, control};
use serde_json::{Value, json};
use thiserror::Error;

use password_options::clipboard::{Clipboard, ClipboardBackend, NullClipboard, Osc52Clipboard};
use password_options::core::config::Config;
use password_options::engine::{
    Activation, Collaborators, EventOutcome, PasswordDisplay, ReconciliationEngine, SessionEvent,
    SessionExit, SessionSettings,
};
use password_options::generator::RandomPasswordGenerator;
use password_options::list::{ListModel, Row, RowControl, RowInput, RowRef, field_at};
use password_options::options::policy::PolicyConstraint;
use password_options::options::state::{CharClass, Edit, OptionState};
use password_options::store::JsonFileStore;
use password_options::tracking::{
    JsonlConfig, JsonlTracker, NullTracker, TrackingMode, TrackingSink,
};

/// Password Options: reconcile generator options against stored defaults and host policy.
#[derive(Debug, Parser)]
#[command(
    name = "pwopts",
    author,
    version,
    about = "Password generator options with policy reconciliation",
    long_about = None,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Override config file path.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Force JSON output mode.
    #[arg(long, global = true)]
    json: bool,
    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
    /// Increase verbosity.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,
    /// Quiet mode (errors only).
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Generate a password from the stored options.
    Generate(GenerateArgs),
    /// Apply option edits and persist them as the new defaults.
    Edit(EditArgs),
    /// Show the option list as a rendering surface would.
    Show(ShowArgs),
    /// Interactive session reading one event per line from stdin.
    Session(SessionArgs),
    /// View configuration state.
    Config(ConfigArgs),
    /// Generate shell completions.
    Completions(CompletionsArgs),
}

/// Host policy for the session.
#[derive(Debug, Clone, Args, Default)]
struct PolicyArgs {
    /// Read the policy from a JSON document.
    #[arg(long, value_name = "PATH")]
    policy: Option<PathBuf>,
    /// Require at least one digit.
    #[arg(long)]
    require_digits: bool,
    /// Require at least one symbol.
    #[arg(long)]
    require_symbols: bool,
    /// Smallest permitted password length.
    #[arg(long, value_name = "N")]
    min_length: Option<u32>,
    /// Largest permitted password length.
    #[arg(long, value_name = "N")]
    max_length: Option<u32>,
    /// Report usage under the autofill stream.
    #[arg(long)]
    autofill: bool,
}

#[derive(Debug, Clone, Args, Default)]
struct GenerateArgs {
    #[command(flatten)]
    policy: PolicyArgs,
    /// Number of passwords to produce.
    #[arg(long, default_value_t = 1, value_name = "N")]
    count: u32,
    /// Copy the last password to the clipboard.
    #[arg(long)]
    copy: bool,
}

#[derive(Debug, Clone, Args, Default)]
struct EditArgs {
    #[command(flatten)]
    policy: PolicyArgs,
    /// Edits such as `length=20`, `special=off`, `upper=toggle`, `min-numbers=2`.
    #[arg(required = true, value_name = "EDIT")]
    edits: Vec<String>,
}

#[derive(Debug, Clone, Args, Default)]
struct ShowArgs {
    #[command(flatten)]
    policy: PolicyArgs,
}

#[derive(Debug, Clone, Args, Default)]
struct SessionArgs {
    #[command(flatten)]
    policy: PolicyArgs,
}

#[derive(Debug, Clone, Args, Default)]
struct ConfigArgs {
    /// Config operation to run.
    #[command(subcommand)]
    command: Option<ConfigCommand>,
}

#[derive(Debug, Clone, Subcommand)]
enum ConfigCommand {
    /// Print resolved config file path.
    Path,
    /// Print effective merged configuration.
    Show,
    /// Validate configuration and exit.
    Validate,
}

#[derive(Debug, Clone, Args)]
struct CompletionsArgs {
    /// Shell to generate completion script for.
    #[arg(value_enum)]
    shell: CompletionShell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

/// CLI error type with explicit exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input at runtime.
    #[error("{0}")]
    User(String),
    /// Environment/runtime failure.
    #[error("{0}")]
    Runtime(String),
    /// JSON serialization failed.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code contract for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::User(_) => 1,
            Self::Runtime(_) | Self::Io(_) => 2,
            Self::Json(_) => 3,
        }
    }
}

type CliEngine = ReconciliationEngine<
    JsonFileStore,
    RandomPasswordGenerator,
    Box<dyn TrackingSink>,
    Box<dyn Clipboard>,
>;

/// Dispatch CLI commands.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.no_color {
        control::set_override(false);
    }

    match &cli.command {
        Command::Generate(args) => run_generate(cli, args),
        Command::Edit(args) => run_edit(cli, args),
        Command::Show(args) => run_show(cli, args),
        Command::Session(args) => run_session(cli, args),
        Command::Config(args) => run_config(cli, args),
        Command::Completions(args) => {
            let mut command = Cli::command();
            let binary_name = command.get_name().to_string();
            generate(args.shell, &mut command, binary_name, &mut io::stdout());
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Engine wiring
// ---------------------------------------------------------------------------

fn load_config(cli: &Cli) -> Result<Config, CliError> {
    let config = Config::load(cli.config.as_deref()).map_err(|e| CliError::User(e.to_string()))?;
    if cli.verbose {
        let hash = config
            .stable_hash()
            .map_err(|e| CliError::Runtime(e.to_string()))?;
        eprintln!(
            "[PWO-CONFIG] loaded {} (hash {hash})",
            config.paths.config_file.display()
        );
    }
    Ok(config)
}

/// Command-line policy wins over the config file; individual flags refine
/// whichever base was chosen. A policy that constrains nothing counts as none.
fn resolve_policy(
    args: &PolicyArgs,
    config: &Config,
) -> Result<Option<PolicyConstraint>, CliError> {
    let base = match &args.policy {
        Some(path) => {
            Some(PolicyConstraint::load(path).map_err(|e| CliError::User(e.to_string()))?)
        }
        None => config.policy,
    };
    let has_flags = args.require_digits
        || args.require_symbols
        || args.min_length.is_some()
        || args.max_length.is_some();
    if !has_flags {
        return Ok(base.filter(|policy| !policy.is_empty()));
    }

    let mut policy = base.unwrap_or_default();
    policy.require_digits |= args.require_digits;
    policy.require_symbols |= args.require_symbols;
    if let Some(min) = args.min_length {
        policy.min_length = min;
    }
    if let Some(max) = args.max_length {
        policy.max_length = max;
    }
    Ok(Some(policy).filter(|policy| !policy.is_empty()))
}

fn open_engine(cli: &Cli, config: &Config, args: &PolicyArgs) -> Result<CliEngine, CliError> {
    let policy = resolve_policy(args, config)?;
    if cli.verbose
        && let Some(policy) = &policy
    {
        eprintln!("[PWO-ENGINE] policy: {}", serde_json::to_string(policy)?);
    }

    let store = JsonFileStore::new(config.paths.preferences_file.clone())
        .with_debounce(config.store.write_debounce());
    let tracker: Box<dyn TrackingSink> = if config.tracking.enabled {
        Box::new(JsonlTracker::open(JsonlConfig {
            path: config.paths.tracking_log.clone(),
            fallback_path: config.paths.tracking_fallback_log.clone(),
        }))
    } else {
        Box::new(NullTracker)
    };
    let clipboard: Box<dyn Clipboard> = match config.clipboard.backend {
        ClipboardBackend::Osc52 => Box::new(Osc52Clipboard::stderr()),
        ClipboardBackend::None => Box::new(NullClipboard),
    };
    let settings = SessionSettings {
        mode: TrackingMode::from_autofill(args.autofill || config.tracking.autofill),
        notice_timeout: config.clipboard.notice_timeout(),
    };

    Ok(ReconciliationEngine::open(
        Collaborators {
            store,
            generator: RandomPasswordGenerator::new(),
            tracker,
            clipboard,
        },
        policy.as_ref(),
        settings,
    ))
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn run_generate(cli: &Cli, args: &GenerateArgs) -> Result<(), CliError> {
    if args.count == 0 {
        return Err(CliError::User("--count must be at least 1".to_string()));
    }
    let config = load_config(cli)?;
    let mut engine = open_engine(cli, &config, &args.policy)?;

    let mut passwords = Vec::new();
    for i in 0..args.count {
        if i > 0 {
            engine.regenerate();
        }
        match engine.display() {
            PasswordDisplay::Generated { password } => passwords.push(password.clone()),
            PasswordDisplay::Failed { message, .. } => {
                return Err(CliError::User(message.clone()));
            }
        }
    }

    let copied = if args.copy {
        Some(engine.copy(Instant::now()))
    } else {
        None
    };
    engine.close(SessionExit::Cancel);

    match output_mode(cli) {
        OutputMode::Human => {
            for password in &passwords {
                println!("{}", password.bold());
            }
            if let Some(activation) = &copied {
                print_activation_human(cli, activation);
            }
        }
        OutputMode::Json => {
            let payload = json!({
                "command": "generate",
                "passwords": passwords,
                "copied": copied.map(|a| a == Activation::Copied),
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

fn run_edit(cli: &Cli, args: &EditArgs) -> Result<(), CliError> {
    let edits = args
        .edits
        .iter()
        .map(|raw| parse_edit(raw).map_err(CliError::User))
        .collect::<Result<Vec<_>, _>>()?;

    let config = load_config(cli)?;
    let mut engine = open_engine(cli, &config, &args.policy)?;
    let reports: Vec<_> = edits.into_iter().map(|edit| engine.apply(edit)).collect();
    let state = engine.state().clone();
    let display = engine.display().clone();
    engine.close(SessionExit::Cancel);

    match output_mode(cli) {
        OutputMode::Human => {
            if !cli.quiet {
                for report in &reports {
                    if report.ignored_locked {
                        eprintln!("{}", "class is required by policy; edit ignored".yellow());
                    }
                    if report.forced_lowercase {
                        eprintln!("{}", "at least one class must stay on; a-z re-enabled".yellow());
                    }
                }
            }
            print_state_human(&state);
            print_display_human(&display);
        }
        OutputMode::Json => {
            let payload = json!({
                "command": "edit",
                "reports": serde_json::to_value(&reports)?,
                "options": serde_json::to_value(&state)?,
                "display": serde_json::to_value(&display)?,
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

fn run_show(cli: &Cli, args: &ShowArgs) -> Result<(), CliError> {
    let config = load_config(cli)?;
    let engine = open_engine(cli, &config, &args.policy)?;
    let model = engine.list_model();
    let display = engine.display().clone();
    engine.close(SessionExit::Cancel);

    match output_mode(cli) {
        OutputMode::Human => {
            print_display_human(&display);
            print_list_human(&model);
        }
        OutputMode::Json => {
            let payload = json!({
                "command": "show",
                "display": serde_json::to_value(&display)?,
                "list": serde_json::to_value(&model)?,
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

fn run_session(cli: &Cli, args: &SessionArgs) -> Result<(), CliError> {
    let config = load_config(cli)?;
    let mut engine = open_engine(cli, &config, &args.policy)?;
    let mode = output_mode(cli);

    emit_session_state(cli, mode, &engine, None)?;

    let mut exit = SessionExit::Cancel;
    for line in io::stdin().lock().lines() {
        let line = line?;
        let now = Instant::now();
        engine.tick(now);
        let command = match parse_session_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                emit_session_error(mode, &message)?;
                continue;
            }
        };
        let outcome = match command {
            SessionCommand::Event(event) => engine.handle(event, now),
            SessionCommand::Regenerate => {
                engine.regenerate();
                EventOutcome::Activated {
                    activation: Activation::Regenerated,
                }
            }
            SessionCommand::Copy => EventOutcome::Activated {
                activation: engine.copy(now),
            },
            SessionCommand::Show => {
                if mode == OutputMode::Human {
                    print_list_human(&engine.list_model());
                } else {
                    write_json_line(&json!({
                        "command": "session",
                        "list": serde_json::to_value(engine.list_model())?,
                    }))?;
                }
                continue;
            }
            SessionCommand::Help => {
                if mode == OutputMode::Human {
                    println!("{SESSION_HELP}");
                }
                continue;
            }
            SessionCommand::Accept => {
                exit = SessionExit::Select;
                break;
            }
            SessionCommand::Cancel => break,
        };
        emit_session_state(cli, mode, &engine, Some(&outcome))?;
    }

    let (selected, _) = engine.close(exit);
    match mode {
        OutputMode::Human => match &selected {
            Some(password) => println!("{}", password.bold()),
            None if !cli.quiet => eprintln!("cancelled"),
            None => {}
        },
        OutputMode::Json => {
            write_json_line(&json!({
                "command": "session",
                "selected": selected,
            }))?;
        }
    }
    Ok(())
}

fn run_config(cli: &Cli, args: &ConfigArgs) -> Result<(), CliError> {
    match &args.command {
        None | Some(ConfigCommand::Path) => {
            let path = cli.config.clone().unwrap_or_else(Config::default_path);
            let exists = path.exists();

            match output_mode(cli) {
                OutputMode::Human => {
                    println!("{}", path.display());
                    if !exists {
                        println!("  (file does not exist; defaults will be used)");
                    }
                }
                OutputMode::Json => {
                    let payload = json!({
                        "command": "config path",
                        "path": path.to_string_lossy(),
                        "exists": exists,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        Some(ConfigCommand::Show) => {
            let config = Config::load(cli.config.as_deref())
                .map_err(|e| CliError::Runtime(e.to_string()))?;

            match output_mode(cli) {
                OutputMode::Human => {
                    let toml_str = toml::to_string_pretty(&config)
                        .map_err(|e| CliError::Runtime(format!("serialize config: {e}")))?;
                    println!("{toml_str}");
                }
                OutputMode::Json => {
                    let payload = json!({
                        "command": "config show",
                        "config": serde_json::to_value(&config)?,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        Some(ConfigCommand::Validate) => match Config::load(cli.config.as_deref()) {
            Ok(config) => {
                let hash = config
                    .stable_hash()
                    .map_err(|e| CliError::Runtime(e.to_string()))?;

                match output_mode(cli) {
                    OutputMode::Human => {
                        println!("Configuration is valid.");
                        println!("  Source: {}", config.paths.config_file.display());
                        println!("  Hash: {hash}");
                    }
                    OutputMode::Json => {
                        let payload = json!({
                            "command": "config validate",
                            "valid": true,
                            "path": config.paths.config_file.to_string_lossy(),
                            "hash": hash,
                        });
                        write_json_line(&payload)?;
                    }
                }
                Ok(())
            }
            Err(e) => {
                match output_mode(cli) {
                    OutputMode::Human => {
                        eprintln!("Configuration is INVALID: {e}");
                    }
                    OutputMode::Json => {
                        let payload = json!({
                            "command": "config validate",
                            "valid": false,
                            "code": e.code(),
                            "error": e.to_string(),
                        });
                        write_json_line(&payload)?;
                    }
                }
                Err(CliError::User(format!("invalid config: {e}")))
            }
        },
    }
}

// ---------------------------------------------------------------------------
// Edit and session-line parsing
// ---------------------------------------------------------------------------

const SESSION_HELP: &str = "\
commands:
  length=N | min-numbers=N | min-special=N   set a numeric option
  upper|lower|numbers|special=on|off|toggle  switch a character class
  regenerate | copy                          run an action
  tap SECTION ROW                            activate a row
  input SECTION ROW on|off|N                 change a row's widget
  show | help
  accept                                     end and print the password
  cancel                                     end without a password";

#[derive(Debug, Clone, PartialEq, Eq)]
enum SessionCommand {
    Event(SessionEvent),
    Regenerate,
    Copy,
    Show,
    Help,
    Accept,
    Cancel,
}

/// Parse `field=value` into an edit.
fn parse_edit(raw: &str) -> Result<Edit, String> {
    let Some((field, value)) = raw.split_once('=') else {
        return Err(format!("expected FIELD=VALUE, got {raw:?}"));
    };
    let field = field.trim().to_ascii_lowercase().replace('-', "_");
    let value = value.trim();

    match field.as_str() {
        "length" => Ok(Edit::SetLength {
            value: parse_count(&field, value)?,
        }),
        "min_numbers" => Ok(Edit::SetMinNumbers {
            value: parse_count(&field, value)?,
        }),
        "min_special" => Ok(Edit::SetMinSpecial {
            value: parse_count(&field, value)?,
        }),
        name => {
            let class =
                CharClass::from_name(name).ok_or_else(|| format!("unknown option {name:?}"))?;
            if value.eq_ignore_ascii_case("toggle") {
                Ok(Edit::ToggleClass { class })
            } else {
                Ok(Edit::SetClass {
                    class,
                    enabled: parse_switch(name, value)?,
                })
            }
        }
    }
}

fn parse_count(field: &str, raw: &str) -> Result<u32, String> {
    raw.parse::<u32>()
        .map_err(|e| format!("{field}: expected a non-negative number, got {raw:?} ({e})"))
}

fn parse_switch(field: &str, raw: &str) -> Result<bool, String> {
    match raw.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => Err(format!("{field}: expected on/off/toggle, got {raw:?}")),
    }
}

/// Parse one stdin line. Blank lines and `#` comments yield `None`.
fn parse_session_line(line: &str) -> Result<Option<SessionCommand>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let words: Vec<&str> = line.split_whitespace().collect();
    let command = match words.as_slice() {
        ["regenerate" | "r"] => SessionCommand::Regenerate,
        ["copy" | "c"] => SessionCommand::Copy,
        ["show" | "list"] => SessionCommand::Show,
        ["help" | "?"] => SessionCommand::Help,
        ["accept" | "select" | "done"] => SessionCommand::Accept,
        ["cancel" | "quit" | "q"] => SessionCommand::Cancel,
        ["tap", section, row] => {
            SessionCommand::Event(SessionEvent::Select(parse_row(section, row)?))
        }
        ["input", section, row, value] => {
            let at = parse_row(section, row)?;
            let field = field_at(at)
                .ok_or_else(|| format!("row {section} {row} has no input widget"))?;
            let input = if field.class().is_some() {
                RowInput::Switch(parse_switch(field.label(), value)?)
            } else {
                RowInput::Number(parse_count(field.label(), value)?)
            };
            SessionCommand::Event(SessionEvent::Input { at, input })
        }
        [single] if single.contains('=') => {
            SessionCommand::Event(SessionEvent::Edit(parse_edit(single)?))
        }
        _ => return Err(format!("unrecognized command {line:?} (try `help`)")),
    };
    Ok(Some(command))
}

fn parse_row(section: &str, row: &str) -> Result<RowRef, String> {
    let section = section
        .parse::<usize>()
        .map_err(|e| format!("section: {e}"))?;
    let row = row.parse::<usize>().map_err(|e| format!("row: {e}"))?;
    Ok(RowRef::new(section, row))
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn emit_session_state(
    cli: &Cli,
    mode: OutputMode,
    engine: &CliEngine,
    outcome: Option<&EventOutcome>,
) -> Result<(), CliError> {
    match mode {
        OutputMode::Human => {
            if let Some(EventOutcome::Activated { activation }) = outcome {
                print_activation_human(cli, activation);
            }
            if let Some(EventOutcome::Edited { report }) = outcome
                && !cli.quiet
            {
                if report.ignored_locked {
                    println!("{}", "class is required by policy".yellow());
                }
                if report.forced_lowercase {
                    println!("{}", "a-z re-enabled".yellow());
                }
            }
            print_display_human(engine.display());
        }
        OutputMode::Json => {
            write_json_line(&json!({
                "command": "session",
                "outcome": outcome.map(serde_json::to_value).transpose()?,
                "display": serde_json::to_value(engine.display())?,
                "notice": engine.notice().map(|n| n.message),
            }))?;
        }
    }
    Ok(())
}

fn emit_session_error(mode: OutputMode, message: &str) -> Result<(), CliError> {
    match mode {
        OutputMode::Human => eprintln!("{}", message.red()),
        OutputMode::Json => write_json_line(&json!({
            "command": "session",
            "error": message,
        }))?,
    }
    Ok(())
}

fn print_activation_human(cli: &Cli, activation: &Activation) {
    if cli.quiet {
        return;
    }
    match activation {
        Activation::Copied => eprintln!("{}", "Copied".green()),
        Activation::NothingToCopy => eprintln!("{}", "nothing to copy".yellow()),
        Activation::CopyFailed { details } => eprintln!("{}", details.red()),
        Activation::Regenerated | Activation::None => {}
    }
}

fn print_display_human(display: &PasswordDisplay) {
    match display {
        PasswordDisplay::Generated { password } => println!("{}", password.bold()),
        PasswordDisplay::Failed { code, message } => {
            println!("{} {}", "-".dimmed(), format!("[{code}] {message}").red());
        }
    }
}

fn print_state_human(state: &OptionState) {
    let on_off = |b: bool| if b { "on" } else { "off" };
    println!(
        "length={} upper={} lower={} numbers={} special={} min-numbers={} min-special={}",
        state.length,
        on_off(state.use_uppercase),
        on_off(state.use_lowercase),
        on_off(state.use_numbers),
        on_off(state.use_special),
        state.min_numbers,
        state.min_special,
    );
}

fn print_list_human(model: &ListModel) {
    for (index, section) in model.sections.iter().enumerate() {
        if let Some(header) = section.header {
            println!("{}", header.to_uppercase().bold());
        }
        for (row_index, row) in section.rows.iter().enumerate() {
            let line = match row {
                Row::Action { label, .. } => (*label).to_string(),
                Row::Option { label, control, .. } => {
                    format!("{label:<18} {}", render_control(control))
                }
            };
            println!("  [{index}.{row_index}] {line}");
        }
        if let Some(footer) = section.footer {
            println!("  {}", footer.dimmed());
        }
    }
}

fn render_control(control: &RowControl) -> String {
    match control {
        RowControl::Slider { value, min, max } => format!("{value} ({min}..={max})"),
        RowControl::Stepper { value, min, max } => format!("{value} [{min}..={max}]"),
        RowControl::Switch { on, enabled } => {
            let state = if *on { "on" } else { "off" };
            if *enabled {
                state.to_string()
            } else {
                format!("{state} (locked)")
            }
        }
    }
}

fn write_json_line(payload: &Value) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, payload)?;
    writeln!(stdout)?;
    Ok(())
}

fn output_mode(cli: &Cli) -> OutputMode {
    let env_mode = std::env::var("PWO_OUTPUT_FORMAT").ok();
    resolve_output_mode(cli.json, env_mode.as_deref(), io::stdout().is_terminal())
}

fn resolve_output_mode(json_flag: bool, env_mode: Option<&str>, stdout_is_tty: bool) -> OutputMode {
    if json_flag {
        return OutputMode::Json;
    }

    let fallback = if stdout_is_tty {
        OutputMode::Human
    } else {
        OutputMode::Json
    };

    match env_mode
        .map(str::trim)
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("json") => OutputMode::Json,
        Some("human") => OutputMode::Human,
        _ => fallback,
    }
}
