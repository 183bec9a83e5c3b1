use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use lce_cli::analysis::{run_orbit, run_spectrum, run_sweep};
use lce_cli::config::ExperimentConfig;
use lce_cli::report::{render_run, render_sweep, to_json, OutputFormat};
use lce_cli::system::{parse_assignment, parse_state, FieldKind, FieldSpec};
use lce_core::TangentScheme;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Estimate Lyapunov spectra of three-dimensional flows.
#[derive(Debug, Parser)]
#[command(name = "lce", version)]
struct Cli {
    /// TOML file describing the field, run settings and initial state.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Report format for `run` and `sweep` (default text). `orbit` only writes JSON.
    #[arg(long, value_enum, global = true)]
    format: Option<OutputFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Estimate the spectrum, contraction rate and Kaplan-Yorke dimension.
    Run(Overrides),
    /// Integrate the post-transient trajectory and write it as JSON (always).
    Orbit {
        #[command(flatten)]
        overrides: Overrides,
        /// Number of states to record after the transient.
        #[arg(long, default_value_t = 10_000)]
        steps: usize,
        /// Output file; stdout when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Vary one coefficient over a range, running the estimates in parallel.
    Sweep {
        #[command(flatten)]
        overrides: Overrides,
        /// Coefficient to vary.
        #[arg(long)]
        parameter: String,
        #[arg(long)]
        from: f64,
        #[arg(long)]
        to: f64,
        #[arg(long, default_value_t = 10)]
        count: usize,
    },
}

#[derive(Debug, Args)]
struct Overrides {
    /// Flow to analyse (replaces the config file's field).
    #[arg(long, value_enum)]
    field: Option<FieldKind>,
    /// Coefficient override, e.g. --param rho=28. Repeatable.
    #[arg(long = "param", value_name = "NAME=VALUE")]
    params: Vec<String>,
    #[arg(long)]
    dt: Option<f64>,
    #[arg(long)]
    transients: Option<usize>,
    #[arg(long)]
    steps_per_pullback: Option<usize>,
    #[arg(long)]
    pullbacks: Option<usize>,
    #[arg(long, value_enum)]
    scheme: Option<SchemeArg>,
    /// Initial state as x,y,z.
    #[arg(long, allow_hyphen_values = true)]
    initial: Option<String>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum SchemeArg {
    FrozenBase,
    StageCoupled,
}

impl From<SchemeArg> for TangentScheme {
    fn from(value: SchemeArg) -> Self {
        match value {
            SchemeArg::FrozenBase => TangentScheme::FrozenBase,
            SchemeArg::StageCoupled => TangentScheme::StageCoupled,
        }
    }
}

impl Overrides {
    fn apply(&self, config: &mut ExperimentConfig) -> Result<()> {
        if let Some(kind) = self.field {
            config.field = FieldSpec::from_kind(kind);
        }
        for raw in &self.params {
            let (name, value) = parse_assignment(raw)?;
            config.field.set_parameter(&name, value)?;
        }
        if let Some(dt) = self.dt {
            config.run.dt = dt;
        }
        if let Some(transients) = self.transients {
            config.run.transients = transients;
        }
        if let Some(steps) = self.steps_per_pullback {
            config.run.steps_per_pullback = steps;
        }
        if let Some(pullbacks) = self.pullbacks {
            config.run.pullbacks = pullbacks;
        }
        if let Some(scheme) = self.scheme {
            config.run.scheme = scheme.into();
        }
        if let Some(initial) = &self.initial {
            config.initial_state = parse_state(initial)?;
        }
        Ok(())
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_config(path: Option<&PathBuf>, overrides: &Overrides) -> Result<ExperimentConfig> {
    let mut config = match path {
        Some(path) => ExperimentConfig::load(path)?,
        None => ExperimentConfig::default(),
    };
    overrides.apply(&mut config)?;
    Ok(config)
}

fn emit(text: &str) -> Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{text}").context("Failed to write to stdout.")
}

fn check_orbit_format(format: Option<OutputFormat>) -> Result<()> {
    if format == Some(OutputFormat::Text) {
        bail!("The orbit command only writes JSON; drop --format text.");
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Command::Run(overrides) => {
            let config = build_config(cli.config.as_ref(), overrides)?;
            let report = run_spectrum(&config)?;
            match cli.format.unwrap_or_default() {
                OutputFormat::Text => emit(&render_run(&report))?,
                OutputFormat::Json => emit(&to_json(&report)?)?,
            }
        }
        Command::Orbit {
            overrides,
            steps,
            output,
        } => {
            check_orbit_format(cli.format)?;
            let config = build_config(cli.config.as_ref(), overrides)?;
            let orbit = run_orbit(&config, *steps)?;
            match output {
                Some(path) => {
                    let file = File::create(path)
                        .with_context(|| format!("Failed to create {}.", path.display()))?;
                    let mut writer = BufWriter::new(file);
                    serde_json::to_writer(&mut writer, &orbit)
                        .context("Failed to write orbit JSON.")?;
                    writer.flush().context("Failed to flush orbit file.")?;
                    tracing::info!(states = orbit.len(), path = %path.display(), "orbit written");
                }
                None => emit(&to_json(&orbit)?)?,
            }
        }
        Command::Sweep {
            overrides,
            parameter,
            from,
            to,
            count,
        } => {
            let config = build_config(cli.config.as_ref(), overrides)?;
            let report = run_sweep(&config, parameter, *from, *to, *count)?;
            match cli.format.unwrap_or_default() {
                OutputFormat::Text => emit(&render_sweep(&report))?,
                OutputFormat::Json => emit(&to_json(&report)?)?,
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{check_orbit_format, Cli};
    use clap::Parser;

    #[test]
    fn orbit_rejects_text_format() {
        let cli = Cli::try_parse_from(["lce", "orbit", "--format", "text"]).unwrap();
        let err = check_orbit_format(cli.format).expect_err("text orbit output should fail");
        assert!(err.to_string().contains("only writes JSON"));

        let cli = Cli::try_parse_from(["lce", "orbit", "--format", "json"]).unwrap();
        assert!(check_orbit_format(cli.format).is_ok());
        let cli = Cli::try_parse_from(["lce", "orbit"]).unwrap();
        assert!(check_orbit_format(cli.format).is_ok());
    }
}
