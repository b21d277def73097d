use std::{
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
};

mod output;
mod shell;
mod terminal;

use anyhow::Context;
use clap::ArgAction;
use gradebook::{
    Config, Gradebook, ReportError, StudentId, StudentName,
    domain::validate,
    storage::{LoadError, LoadSummary},
};
use output::OutputFormat;
use shell::Shell;
use terminal::Tone;
use tracing::instrument;

/// Parse a single score for a comma-separated `--scores` list.
///
/// This is a CLI boundary function that reuses the same validation as the
/// interactive prompts.
fn parse_score(s: &str) -> Result<f64, String> {
    validate::validate_score(s).map_err(|e| format!("{e}"))
}

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The path to the configuration file
    #[arg(short, long, default_value = "gradebook.toml", global = true)]
    config: PathBuf,

    /// The path to the data file (overrides the configuration)
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command
            .unwrap_or(Command::Shell)
            .run(&self.config, self.file.as_deref())
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        // Logs go to stderr so they never interleave with menu output.
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Start the interactive menu (default)
    Shell,

    /// Write a default configuration file
    Init,

    /// Add a new student
    Add(Add),

    /// List every student
    List(List),

    /// Replace a student's scores
    Modify(Modify),

    /// Delete a student
    Delete(Delete),

    /// Show the class average
    Average(Average),

    /// Rank students by total score
    Rank(Rank),

    /// List students with at least one failing score
    Failed(Failed),
}

impl Command {
    fn run(self, config_path: &Path, data_file: Option<&Path>) -> anyhow::Result<()> {
        let config = || load_config(config_path, data_file);
        match self {
            Self::Shell => run_shell(&config()?)?,
            Self::Init => Init::run(config_path, data_file)?,
            Self::Add(command) => command.run(&config()?)?,
            Self::List(command) => command.run(&config()?)?,
            Self::Modify(command) => command.run(&config()?)?,
            Self::Delete(command) => command.run(&config()?)?,
            Self::Average(command) => command.run(&config()?)?,
            Self::Rank(command) => command.run(&config()?)?,
            Self::Failed(command) => command.run(&config()?)?,
        }
        Ok(())
    }
}

/// Loads the configuration file, if any, and applies the `--file` override.
fn load_config(path: &Path, data_file: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::load_or_default(path)?;
    if let Some(data_file) = data_file {
        config.set_data_file(data_file.to_path_buf());
    }
    tracing::debug!(?config, "Configuration loaded");
    Ok(config)
}

/// Opens the gradebook for a one-shot command.
///
/// Lines dropped under the `skip` policy are listed on stderr; a mutating
/// command saves without them.
fn open(config: &Config) -> anyhow::Result<Gradebook> {
    let color = terminal::supports_color(supports_color::Stream::Stderr);
    open_with_notices(config, &mut io::stderr().lock(), color)
}

fn open_with_notices<W: Write>(
    config: &Config,
    notices: &mut W,
    color: bool,
) -> anyhow::Result<Gradebook> {
    let (gradebook, summary) = load(config)
        .with_context(|| format!("Failed to load {}", config.data_file().display()))?;
    write_skipped(notices, &summary, color)?;
    Ok(gradebook)
}

fn load(config: &Config) -> Result<(Gradebook, LoadSummary), LoadError> {
    let mut gradebook = Gradebook::empty(config);
    let summary = gradebook.load()?;
    Ok((gradebook, summary))
}

fn write_skipped<W: Write>(out: &mut W, summary: &LoadSummary, color: bool) -> io::Result<()> {
    for skipped in &summary.skipped {
        let message = format!("Skipped {}", skipped.reason);
        writeln!(out, "{}", Tone::Warning.paint(&message, color))?;
    }
    Ok(())
}

fn save(gradebook: &Gradebook) -> anyhow::Result<()> {
    gradebook
        .save()
        .with_context(|| format!("Failed to save {}", gradebook.path().display()))
}

#[instrument(skip(config))]
fn run_shell(config: &Config) -> anyhow::Result<()> {
    let color = terminal::supports_color(supports_color::Stream::Stdout);
    start_shell(config, io::stdin().lock(), io::stdout(), color)?;
    Ok(())
}

/// Loads the roster, reports what was found, and runs the menu.
///
/// Refuses to start on unreadable data: the exit save would overwrite it.
fn start_shell<R: BufRead, W: Write>(
    config: &Config,
    input: R,
    mut output: W,
    color: bool,
) -> anyhow::Result<Gradebook> {
    let (gradebook, summary) = load(config).with_context(|| {
        format!(
            "Failed to load {}; fix or move the file before starting",
            config.data_file().display()
        )
    })?;

    if summary.found {
        writeln!(
            output,
            "Data loaded successfully! Loaded {} students.",
            summary.students
        )?;
    } else {
        writeln!(
            output,
            "{}",
            Tone::Muted.paint("No existing data file found.", color)
        )?;
    }
    write_skipped(&mut output, &summary, color)?;

    Shell::new(gradebook, input, output).with_color(color).run()
}

#[derive(Debug, clap::Parser)]
pub struct Init {}

impl Init {
    #[instrument]
    fn run(config_path: &Path, data_file: Option<&Path>) -> anyhow::Result<()> {
        if config_path.exists() {
            anyhow::bail!(
                "Configuration already exists at {}",
                config_path.display()
            );
        }

        let mut config = Config::default();
        if let Some(data_file) = data_file {
            config.set_data_file(data_file.to_path_buf());
        }
        config
            .save(config_path)
            .context("Failed to create configuration")?;

        println!("Created {}", config_path.display());
        println!("  data file: {}", config.data_file().display());
        println!("  pass mark: {}", config.pass_mark());
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Add {
    /// The student's name
    #[clap(long, short)]
    name: StudentName,

    /// A unique student ID
    #[clap(long, short)]
    id: StudentId,

    /// Scores in subject order, comma-separated (e.g. 90,55.5)
    #[clap(long, short, value_delimiter = ',', value_parser = parse_score)]
    scores: Vec<f64>,
}

impl Add {
    #[instrument]
    fn run(self, config: &Config) -> anyhow::Result<()> {
        let mut gradebook = open(config)?;
        let record = gradebook.add(self.name, self.id, self.scores)?;
        let msg = format!("✅ Added {} ({})", record.name(), record.id());
        save(&gradebook)?;

        println!("{}", Tone::Success.stdout(&msg));
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct List {
    /// Output format
    #[arg(long, short, value_enum, default_value_t)]
    output: OutputFormat,
}

impl List {
    #[instrument]
    fn run(self, config: &Config) -> anyhow::Result<()> {
        let gradebook = open(config)?;
        let rows = gradebook.report().listing();
        let mut stdout = io::stdout().lock();

        match self.output {
            OutputFormat::Json => output::write_json(&mut stdout, &rows)?,
            OutputFormat::Table if rows.is_empty() => {
                println!("{}", Tone::Warning.stdout("No student data!"));
            }
            OutputFormat::Table => {
                output::write_table(&mut stdout, &rows, terminal::is_narrow())?;
                let footer = format!(
                    "{} student(s) in {}",
                    rows.len(),
                    gradebook.path().display()
                );
                writeln!(stdout, "{}", Tone::Muted.stdout(&footer))?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Modify {
    /// The ID of the student to modify
    id: StudentId,

    /// New scores in subject order; the number of subjects cannot change
    #[clap(long, short, value_delimiter = ',', value_parser = parse_score)]
    scores: Vec<f64>,
}

impl Modify {
    #[instrument]
    fn run(self, config: &Config) -> anyhow::Result<()> {
        let mut gradebook = open(config)?;
        let total = gradebook.modify(&self.id, self.scores)?.total();
        save(&gradebook)?;

        println!(
            "{}",
            Tone::Success.stdout(&format!("✅ Updated {} (Total: {total})", self.id))
        );
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Delete {
    /// The ID of the student to delete
    id: StudentId,
}

impl Delete {
    #[instrument]
    fn run(self, config: &Config) -> anyhow::Result<()> {
        let mut gradebook = open(config)?;
        if !gradebook.delete(&self.id) {
            anyhow::bail!("Student {} not found", self.id);
        }
        save(&gradebook)?;

        println!("{}", Tone::Success.stdout(&format!("✅ Deleted {}", self.id)));
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Average {
    /// Output format
    #[arg(long, short, value_enum, default_value_t)]
    output: OutputFormat,
}

impl Average {
    #[instrument]
    fn run(self, config: &Config) -> anyhow::Result<()> {
        let gradebook = open(config)?;
        let average = match gradebook.report().class_average() {
            Ok(average) => Some(average),
            Err(ReportError::EmptyStore) => None,
        };

        match (self.output, average) {
            (OutputFormat::Json, average) => output::write_json(
                &mut io::stdout().lock(),
                &serde_json::json!({
                    "students": gradebook.store().len(),
                    "average": average,
                }),
            )?,
            (OutputFormat::Table, Some(average)) => println!("Class average: {average}"),
            (OutputFormat::Table, None) => {
                println!("{}", Tone::Warning.stdout("No student data!"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Rank {
    /// Show only the top N students (0 for all)
    #[arg(long, short, default_value_t = 0)]
    top: usize,

    /// Output format
    #[arg(long, short, value_enum, default_value_t)]
    output: OutputFormat,
}

impl Rank {
    #[instrument]
    fn run(self, config: &Config) -> anyhow::Result<()> {
        let gradebook = open(config)?;
        let report = gradebook.report();
        let rows = report.rows(report.ranking(self.top));
        let mut stdout = io::stdout().lock();

        match self.output {
            OutputFormat::Json => output::write_json(&mut stdout, &rows)?,
            OutputFormat::Table if rows.is_empty() => {
                println!("{}", Tone::Warning.stdout("No student data!"));
            }
            OutputFormat::Table => output::write_ranking(&mut stdout, &rows)?,
        }
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Failed {
    /// Output format
    #[arg(long, short, value_enum, default_value_t)]
    output: OutputFormat,
}

impl Failed {
    #[instrument]
    fn run(self, config: &Config) -> anyhow::Result<()> {
        let gradebook = open(config)?;
        let report = gradebook.report();
        let rows = report.rows(report.failed_students());
        let mut stdout = io::stdout().lock();

        match self.output {
            OutputFormat::Json => output::write_json(&mut stdout, &rows)?,
            OutputFormat::Table if gradebook.store().is_empty() => {
                println!("{}", Tone::Warning.stdout("No student data!"));
            }
            OutputFormat::Table if rows.is_empty() => {
                println!("{}", Tone::Success.stdout("No failed students!"));
            }
            OutputFormat::Table => output::write_table(&mut stdout, &rows, terminal::is_narrow())?,
        }
        Ok(())
    }
}
