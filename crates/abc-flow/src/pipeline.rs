use std::path::PathBuf;
use std::time::Instant;

use abc_repl::{AbcError, AbcSession, CommandFlags, LineChannel};
use anyhow::{bail, Context};

use crate::aiger::summarize_file;
use crate::config::{build_session_config, load_flow_toml, FlowStep, FlowToml, SessionOverrides};
use crate::results::{FlowReport, StepRecord};

/// Arguments for the `run` subcommand.
#[derive(Debug)]
pub struct RunArgs {
    /// Path to the flow config TOML file (built-in flow when absent).
    pub config: Option<PathBuf>,
    /// Circuit to load before the first step.
    pub circuit: PathBuf,
    /// Optional CLI override for the ABC executable.
    pub executable: Option<PathBuf>,
    /// Optional CLI override for training mode.
    pub training: Option<bool>,
    /// Path for the JSON report.
    pub json: Option<PathBuf>,
}

/// Arguments for the `stats` and `cec` subcommands.
#[derive(Debug)]
pub struct CircuitArgs {
    pub circuit: PathBuf,
    pub executable: Option<PathBuf>,
}

/// Load a circuit, run every configured step, and report per-step stats.
pub async fn run_flow(args: RunArgs) -> anyhow::Result<()> {
    let start = Instant::now();

    // 1. Load config
    let toml = match &args.config {
        Some(path) => load_flow_toml(path)?,
        None => FlowToml::default(),
    };
    let config = build_session_config(&toml.session, args.executable, args.training)?;

    // 2. Start ABC and load the circuit
    let mut session = AbcSession::spawn(&config).context("starting ABC")?;
    session
        .read_circuit(&args.circuit)
        .await
        .with_context(|| format!("loading {}", args.circuit.display()))?;

    // 3. Run the flow
    let steps = run_steps(&mut session, &toml.flow.steps).await?;
    let exit_code = session.quit().await.context("shutting down ABC")?;

    let report = FlowReport {
        circuit: args.circuit.display().to_string(),
        training: config.training,
        steps,
        exit_code,
        elapsed_secs: start.elapsed().as_secs_f64(),
    };
    print_report(&report);

    if let Some(path) = &args.json {
        report.write_json(path)?;
    }
    Ok(())
}

/// Load a circuit and print a single stats snapshot.
pub async fn run_stats(args: CircuitArgs) -> anyhow::Result<()> {
    let config = build_session_config(&SessionOverrides::default(), args.executable, None)?;
    let mut session = AbcSession::spawn(&config).context("starting ABC")?;
    session
        .read_circuit(&args.circuit)
        .await
        .with_context(|| format!("loading {}", args.circuit.display()))?;

    let stats = session.print_stats().await?;
    session.quit().await.context("shutting down ABC")?;

    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

/// Load a circuit, rewrite it once, and check it against the original.
pub async fn run_cec(args: CircuitArgs) -> anyhow::Result<()> {
    let config = build_session_config(&SessionOverrides::default(), args.executable, Some(false))?;
    let mut session = AbcSession::spawn(&config).context("starting ABC")?;
    session
        .read_circuit(&args.circuit)
        .await
        .with_context(|| format!("loading {}", args.circuit.display()))?;

    session.rewrite(CommandFlags::default()).await?;
    let result = session.cec().await?.report;
    session.quit().await.context("shutting down ABC")?;

    println!(
        "{}: {} ({:.2}s)",
        args.circuit.display(),
        if result.equivalent {
            "equivalent"
        } else {
            "NOT equivalent"
        },
        result.time_secs
    );
    if !result.equivalent {
        bail!("rewritten network is not equivalent to {}", args.circuit.display());
    }
    Ok(())
}

/// Count nodes, edges and NOT gates of an AIGER file.
///
/// Prints exactly three integers so the output can feed a session's stats helper.
pub fn run_aig_stats(file: PathBuf) -> anyhow::Result<()> {
    let counts = summarize_file(&file)?.counts();
    println!(
        "{} {} {}",
        counts.total_nodes, counts.total_edges, counts.not_gates
    );
    Ok(())
}

/// Run `steps` in order, stopping at the first error.
pub async fn run_steps<C: LineChannel>(
    session: &mut AbcSession<C>,
    steps: &[FlowStep],
) -> Result<Vec<StepRecord>, AbcError> {
    let mut records = Vec::with_capacity(steps.len());
    for (index, step) in steps.iter().enumerate() {
        let record = run_step(session, index, step).await?;
        tracing::info!(
            index,
            step = %record.step,
            ands = record.stats.as_ref().map(|s| s.ands),
            levels = record.stats.as_ref().map(|s| s.levels),
            time_ms = record.time_ms,
            "Flow step finished"
        );
        records.push(record);
    }
    Ok(records)
}

async fn run_step<C: LineChannel>(
    session: &mut AbcSession<C>,
    index: usize,
    step: &FlowStep,
) -> Result<StepRecord, AbcError> {
    let start = Instant::now();
    let mut record = StepRecord {
        index,
        step: step.label(),
        stats: None,
        rewrite: None,
        equivalence: None,
        time_ms: 0,
    };

    match step {
        FlowStep::Stats => record.stats = Some(session.print_stats().await?),
        FlowStep::Balance => record.stats = session.balance().await?.stats,
        FlowStep::Rewrite { .. } => {
            let outcome = session.rewrite(step.flags()).await?;
            record.rewrite = outcome.report;
            record.stats = outcome.stats;
        }
        FlowStep::Resub { .. } => record.stats = session.resub(step.flags()).await?.stats,
        FlowStep::Refactor { .. } => record.stats = session.refactor(step.flags()).await?.stats,
        FlowStep::Cec => {
            let outcome = session.cec().await?;
            record.equivalence = Some(outcome.report);
            record.stats = outcome.stats;
        }
    }

    record.time_ms = start.elapsed().as_millis() as u64;
    Ok(record)
}

fn print_report(report: &FlowReport) {
    println!("\n--- Flow Summary ---");
    println!("Circuit: {}", report.circuit);
    for step in &report.steps {
        let equivalence = match &step.equivalence {
            Some(e) if e.equivalent => " equivalent",
            Some(_) => " NOT equivalent",
            None => "",
        };
        match &step.stats {
            Some(s) => println!(
                "{:>3} {:<14} and = {:<7} lev = {:<4}{equivalence}",
                step.index, step.step, s.ands, s.levels
            ),
            None => println!("{:>3} {:<14}{equivalence}", step.index, step.step),
        }
    }
    if let Some((first, last)) = report.stats_bounds() {
        println!(
            "ANDs: {} -> {}, levels: {} -> {}",
            first.ands, last.ands, first.levels, last.levels
        );
    }
    if report.steps.iter().any(|s| s.equivalence.is_some()) {
        println!("All cec checks passed: {}", report.all_equivalent());
    }
    println!("Elapsed: {:.1}s", report.elapsed_secs);
}
