use serde::Serialize;
use serde_json::{Value, json};
use std::io::Read;
use std::time::Instant;
use strata::fixtures;
use strata::validate::{check_repeatable, check_repeatable_warm, validate};
use strata::{Alignment, CountingMode, LayoutOptions, Layouter};
use strata_levels::{LayoutInput, LevelGraph, LevelGraphBuilder};
use strata_pool::{Dispatcher, PoolOptions, TaskRegistry};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Layout(strata::Error),
    Levels(strata_levels::Error),
    Dispatch(strata_pool::DispatchError),
    Json(serde_json::Error),
    Failed(usize),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Layout(err) => write!(f, "{err}"),
            CliError::Levels(err) => write!(f, "invalid graph: {err}"),
            CliError::Dispatch(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::Failed(n) => write!(f, "{n} graph(s) failed to lay out"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<strata::Error> for CliError {
    fn from(value: strata::Error) -> Self {
        Self::Layout(value)
    }
}

impl From<strata_levels::Error> for CliError {
    fn from(value: strata_levels::Error) -> Self {
        Self::Levels(value)
    }
}

impl From<strata_pool::DispatchError> for CliError {
    fn from(value: strata_pool::DispatchError) -> Self {
        Self::Dispatch(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Layout,
    Bench,
    Validate,
    Batch,
    Random,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum BenchMode {
    #[default]
    Cold,
    Warm,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    config: Option<String>,
    dense: bool,
    balanced: bool,
    spacing: Option<f64>,
    pretty: bool,
    fixture: Option<String>,
    mode: BenchMode,
    runs: Option<usize>,
    workers: Option<usize>,
    seed: Option<u64>,
    inputs: Vec<String>,
}

fn usage() -> &'static str {
    "strata-cli <command> [options]\n\
\n\
Commands:\n\
  layout    [--fixture <name>|<path>|-]      Lay out a graph document (default command)\n\
  bench     [--fixture <name>|<path>]        Time the layout pipeline\n\
            [--mode cold|warm] [--runs <n>]\n\
  validate  [--fixture <name>|<path>]        Check repeatability and layout invariants\n\
            [--runs <n>]\n\
  batch     [--workers <n>] <path>...        Lay out several documents on a worker pool\n\
  random    [--fixture <name>] [--seed <n>]  Print a seeded random graph document\n\
\n\
Layout options:\n\
  --config <path>    JSON file with layout options\n\
  --dense            Count crossings with the dense kernels\n\
  --balanced         Balance four alignment passes\n\
  --spacing <n>      Minimum gap between neighboring nodes\n\
  --pretty           Pretty-print JSON output\n\
\n\
Fixtures: small, medium, large, wide. Set STRATA_LOG to control logging.\n"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();
    let mut it = argv.iter().skip(1).peekable();

    if let Some(cmd) = it.peek().map(|s| s.as_str()) {
        let command = match cmd {
            "layout" => Some(Command::Layout),
            "bench" => Some(Command::Bench),
            "validate" => Some(Command::Validate),
            "batch" => Some(Command::Batch),
            "random" => Some(Command::Random),
            _ => None,
        };
        if let Some(command) = command {
            args.command = command;
            it.next();
        }
    }

    while let Some(a) = it.next() {
        match a.as_str() {
            "-h" | "--help" => return Err(CliError::Usage(usage())),
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config = Some(path.clone());
            }
            "--dense" => args.dense = true,
            "--balanced" => args.balanced = true,
            "--pretty" => args.pretty = true,
            "--spacing" => {
                let Some(s) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                let spacing = s.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
                if !spacing.is_finite() || spacing < 0.0 {
                    return Err(CliError::Usage(usage()));
                }
                args.spacing = Some(spacing);
            }
            "--fixture" => {
                let Some(name) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.fixture = Some(name.clone());
            }
            "--mode" => {
                let Some(mode) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.mode = match mode.as_str() {
                    "cold" => BenchMode::Cold,
                    "warm" => BenchMode::Warm,
                    _ => return Err(CliError::Usage(usage())),
                };
            }
            "--runs" => {
                let Some(n) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                let runs = n.parse::<usize>().map_err(|_| CliError::Usage(usage()))?;
                if runs == 0 {
                    return Err(CliError::Usage(usage()));
                }
                args.runs = Some(runs);
            }
            "--workers" => {
                let Some(n) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.workers = Some(n.parse::<usize>().map_err(|_| CliError::Usage(usage()))?);
            }
            "--seed" => {
                let Some(n) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.seed = Some(n.parse::<u64>().map_err(|_| CliError::Usage(usage()))?);
            }
            other if other.starts_with('-') && other != "-" => {
                return Err(CliError::Usage(usage()));
            }
            path => args.inputs.push(path.to_string()),
        }
    }

    let max_inputs = match args.command {
        Command::Batch => usize::MAX,
        Command::Random => 0,
        _ => 1,
    };
    if args.inputs.len() > max_inputs {
        return Err(CliError::Usage(usage()));
    }
    if matches!(args.command, Command::Batch) && args.inputs.is_empty() {
        return Err(CliError::Usage(usage()));
    }
    if args.fixture.is_some() && !args.inputs.is_empty() {
        return Err(CliError::Usage(usage()));
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn read_document(input: Option<&str>) -> Result<LayoutInput, CliError> {
    Ok(serde_json::from_str(&read_input(input)?)?)
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

fn layout_options(args: &Args) -> Result<LayoutOptions, CliError> {
    let mut options: LayoutOptions = match args.config.as_deref() {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => LayoutOptions::default(),
    };
    if args.dense {
        options.counting = CountingMode::Dense;
    }
    if args.balanced {
        options.position.alignment = Alignment::Balanced;
    }
    if let Some(spacing) = args.spacing {
        options.position.spacing = spacing;
    }
    Ok(options)
}

/// Resolves `--fixture <name>` or a document path to a level graph. Without either, the `medium`
/// fixture is used.
fn load_graph(args: &Args) -> Result<(String, LevelGraph), CliError> {
    if let Some(path) = args.inputs.first() {
        let document = read_document(Some(path))?;
        let (levels, _) = LevelGraphBuilder::from_input(&document)?.build();
        return Ok((path.clone(), levels));
    }
    let name = args.fixture.as_deref().unwrap_or("medium");
    Ok((name.to_string(), fixtures::named(name)?))
}

#[derive(Debug, Serialize)]
struct BenchReport {
    graph: String,
    mode: &'static str,
    runs: usize,
    nodes: usize,
    edges: usize,
    total_crossings: u64,
    elapsed_ms: f64,
    mean_ms: f64,
}

fn bench(args: &Args) -> Result<(), CliError> {
    let options = layout_options(args)?;
    let (graph, levels) = load_graph(args)?;
    let runs = args.runs.unwrap_or(10);

    let (mode, started, result) = match args.mode {
        BenchMode::Cold => {
            let started = Instant::now();
            let mut result = strata::layout(&levels, &options)?;
            for _ in 1..runs {
                result = strata::layout(&levels, &options)?;
            }
            ("cold", started, result)
        }
        BenchMode::Warm => {
            let mut layouter = new_layouter(&options)?;
            // The first run only warms the scratch buffers.
            layouter.layout(&levels)?;
            let started = Instant::now();
            let mut result = layouter.layout(&levels)?;
            for _ in 1..runs {
                result = layouter.layout(&levels)?;
            }
            ("warm", started, result)
        }
    };
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    tracing::debug!(graph = graph.as_str(), mode, runs, elapsed_ms, "benchmark finished");

    write_json(
        &BenchReport {
            graph,
            mode,
            runs,
            nodes: levels.node_count(),
            edges: levels.edge_count(),
            total_crossings: result.total_crossings(),
            elapsed_ms,
            mean_ms: elapsed_ms / runs as f64,
        },
        args.pretty,
    )
}

fn new_layouter(options: &LayoutOptions) -> Result<Layouter, CliError> {
    Ok(match options.counting {
        CountingMode::Tree => Layouter::new(options.clone()),
        CountingMode::Dense => {
            Layouter::with_dense_kernels(options.clone(), strata::DenseKernels::initialized()?)
        }
    })
}

fn validate_graph(args: &Args) -> Result<(), CliError> {
    let options = layout_options(args)?;
    let (graph, levels) = load_graph(args)?;
    let runs = args.runs.unwrap_or(3);

    let cold = check_repeatable(&levels, &options, runs)?;
    validate(&levels, &cold, options.position.spacing)?;
    let warm = check_repeatable_warm(&mut new_layouter(&options)?, &levels, runs)?;
    if warm != cold {
        return Err(strata::Error::Validation("warm and cold runs differ".to_string()).into());
    }

    write_json(
        &json!({
            "graph": graph,
            "runs": runs,
            "total_crossings": cold.total_crossings(),
            "before": cold.stats.crossings_before,
            "ok": true,
        }),
        args.pretty,
    )
}

fn batch(args: &Args) -> Result<(), CliError> {
    let options = layout_options(args)?;
    let inputs = args
        .inputs
        .iter()
        .map(|path| read_document(Some(path)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut registry = TaskRegistry::new();
    strata::tasks::register(&mut registry);
    let pool = PoolOptions::with_workers(args.workers.unwrap_or(0));
    let dispatcher = Dispatcher::new(registry, &pool)?;
    let results = strata::tasks::layout_all(&dispatcher, &inputs, &options)?;
    dispatcher.shutdown();

    let mut failed = 0;
    let out: Vec<Value> = args
        .inputs
        .iter()
        .zip(results)
        .map(|(path, result)| match result {
            Ok(document) => json!({ "path": path, "layout": document }),
            Err(err) => {
                failed += 1;
                tracing::warn!(path = path.as_str(), error = %err, "layout failed");
                json!({ "path": path, "error": err.to_string() })
            }
        })
        .collect();
    write_json(&out, args.pretty)?;

    if failed > 0 {
        return Err(CliError::Failed(failed));
    }
    Ok(())
}

fn random(args: &Args) -> Result<(), CliError> {
    let name = args.fixture.as_deref().unwrap_or("small");
    let (_, default_seed, options) = fixtures::named_fixtures()
        .into_iter()
        .find(|(n, _, _)| *n == name)
        .ok_or_else(|| strata::Error::UnknownFixture {
            name: name.to_string(),
        })?;
    let levels = fixtures::random_level_graph(args.seed.unwrap_or(default_seed), &options)?;
    write_json(&fixtures::to_layout_input(&levels), args.pretty)
}

fn run(args: Args) -> Result<(), CliError> {
    match args.command {
        Command::Layout => {
            let options = layout_options(&args)?;
            let document = match args.fixture.as_deref() {
                Some(name) => fixtures::to_layout_input(&fixtures::named(name)?),
                None => read_document(args.inputs.first().map(String::as_str))?,
            };
            let layout = new_layouter(&options)?.layout_input(&document)?;
            write_json(&layout, args.pretty)
        }
        Command::Bench => bench(&args),
        Command::Validate => validate_graph(&args),
        Command::Batch => batch(&args),
        Command::Random => random(&args),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("STRATA_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };
    init_logging();

    match run(args) {
        Ok(()) => {}
        Err(err @ CliError::Failed(_)) => {
            eprintln!("{err}");
            std::process::exit(3);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
