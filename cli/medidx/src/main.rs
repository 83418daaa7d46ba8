use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
use medi_dx::evaluation::read_cases;
use medi_dx::symptoms::{load_symptom_file, parse_symptom_line, save_symptom_file};
use medi_dx::{
    evaluate_cases, DiagnosisError, DiagnosisSearch, EvaluationPolicy, HeuristicKind, Query,
    RankingReporter,
};
use medi_kg::ingest::load_graph_csv;
use medi_kg::KnowledgeGraph;

pub mod config;

use config::{Config, DEFAULT_GRAPH, DEFAULT_SYMPTOMS};

const CONFIG_FILE: &str = "medidx.toml";

#[derive(Debug, Parser)]
#[command(
    name = "medidx",
    version,
    about = "Rank candidate diseases from reported symptoms using a weighted knowledge graph",
    long_about = "medidx builds a weighted symptom-disease knowledge graph from an association\n\
        dataset and ranks candidate diseases for a list of symptoms.\n\n\
        Each edge costs -ln(strength); a disease is scored by the sum of the costs of\n\
        every reported symptom linked to it, so lower scores are more likely.\n\n\
        EXAMPLES:\n\
        \n  medidx build --csv DerivedKnowledgeGraph_final.csv\n\
        \n  medidx symptoms --line \"nausea, vomiting, heartburn\"\n\
        \n  medidx diagnose --symptoms symptoms.txt\n\
        \n  medidx evaluate --cases labeled_cases.csv --limit 50"
)]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file (defaults to ./medidx.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write a commented medidx.toml in the current directory
    Init,
    /// Build the knowledge graph snapshot from a CSV dataset
    Build(BuildArgs),
    /// Enter symptoms manually and save them as a symptom list
    Symptoms(SymptomsArgs),
    /// Rank possible diseases for a symptom list
    Diagnose(DiagnoseArgs),
    /// Measure accuracy against labeled cases
    Evaluate(EvaluateArgs),
}

#[derive(Debug, Args, Clone)]
struct BuildArgs {
    /// Dataset CSV with 'Diseases,Symptoms' columns
    #[arg(long, value_name = "FILE")]
    csv: PathBuf,

    /// Where to write the graph snapshot
    #[arg(long = "graph-output", value_name = "FILE")]
    graph_output: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
struct SymptomsArgs {
    /// Comma-separated symptoms (read one line from stdin when omitted)
    #[arg(long, value_name = "SYMPTOMS")]
    line: Option<String>,

    /// Symptom list file to write
    #[arg(long, value_name = "FILE", default_value = DEFAULT_SYMPTOMS)]
    output: PathBuf,
}

#[derive(Debug, Args, Clone)]
struct DiagnoseArgs {
    /// Graph snapshot produced by 'medidx build'
    #[arg(long, value_name = "FILE")]
    graph: Option<PathBuf>,

    /// Symptom list file, one symptom per line
    #[arg(long, value_name = "FILE")]
    symptoms: Option<PathBuf>,

    /// Additional symptom (repeatable)
    #[arg(short = 's', long = "symptom", value_name = "SYMPTOM")]
    symptom: Vec<String>,

    /// Result file ('name<TAB>cost' per line)
    #[arg(short = 'o', long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Only report the best N diseases
    #[arg(long = "top-k", value_name = "N")]
    top_k: Option<usize>,

    /// Search heuristic (zero, min-incident)
    #[arg(long, value_name = "NAME")]
    heuristic: Option<HeuristicKind>,
}

#[derive(Debug, Args, Clone)]
struct EvaluateArgs {
    /// Graph snapshot produced by 'medidx build'
    #[arg(long, value_name = "FILE")]
    graph: Option<PathBuf>,

    /// Labeled cases CSV with 'label,symptoms' columns
    #[arg(long, value_name = "FILE")]
    cases: PathBuf,

    /// Process at most N cases
    #[arg(long, value_name = "N")]
    limit: Option<usize>,

    /// Count a case correct only if its label ranks within the best N
    #[arg(long = "top-k", value_name = "N")]
    top_k: Option<usize>,

    /// Search heuristic (zero, min-incident)
    #[arg(long, value_name = "NAME")]
    heuristic: Option<HeuristicKind>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);
    let ctx = Context { quiet: cli.quiet };

    let config = match load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(rc) => std::process::exit(rc),
    };
    log::debug!("effective configuration: {config}");

    let rc = match cli.command {
        Command::Init => run_init(&ctx),
        Command::Build(args) => run_build(&ctx, &config, &args),
        Command::Symptoms(args) => run_symptoms(&ctx, &args),
        Command::Diagnose(args) => run_diagnose(&ctx, &config, &args),
        Command::Evaluate(args) => run_evaluate(&ctx, &config, &args),
    };
    std::process::exit(rc);
}

fn log_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let _ = env_logger::Builder::new()
        .filter_level(log_level(verbose, quiet))
        .parse_env("MEDIDX_LOG")
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {}: {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init();
}

struct Context {
    quiet: bool,
}

impl Context {
    fn info(&self, msg: &str) {
        if !self.quiet {
            println!("{msg}");
        }
    }

    fn success(&self, msg: &str) {
        if !self.quiet {
            println!("✓ {msg}");
        }
    }
}

/// Explicit `--config` must exist; the implicit `./medidx.toml` is optional.
fn load_config(explicit: Option<&Path>) -> Result<Config, i32> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => {
            let p = PathBuf::from(CONFIG_FILE);
            if !p.exists() {
                return Ok(Config::default());
            }
            p
        }
    };

    let text = fs::read_to_string(&path).map_err(|e| {
        eprintln!("error: failed to read '{}': {e}", path.display());
        2
    })?;
    config::parse_config(&text).map_err(|e| {
        eprintln!("error: invalid '{}': {e}", path.display());
        2
    })
}

fn load_graph(ctx: &Context, path: &Path) -> Result<KnowledgeGraph, i32> {
    ctx.info("Loading knowledge graph...");
    match KnowledgeGraph::load(path) {
        Ok(g) => {
            ctx.info("Knowledge graph loaded.");
            Ok(g)
        }
        Err(e) => {
            eprintln!("error: {e}");
            if path == Path::new(DEFAULT_GRAPH) && !path.exists() {
                eprintln!("hint: run 'medidx build --csv <dataset>' first");
            }
            Err(2)
        }
    }
}

fn run_init(ctx: &Context) -> i32 {
    let path = PathBuf::from(CONFIG_FILE);
    if path.exists() {
        eprintln!("error: '{}' already exists", path.display());
        return 2;
    }
    if let Err(e) = fs::write(&path, config::generate_config()) {
        eprintln!("error: failed to write '{}': {e}", path.display());
        return 2;
    }
    ctx.success(&format!("Created {}", path.display()));
    0
}

fn run_build(ctx: &Context, config: &Config, args: &BuildArgs) -> i32 {
    let graph = match load_graph_csv(&args.csv) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("error: {}: {e}", args.csv.display());
            return 2;
        }
    };
    let out = args
        .graph_output
        .clone()
        .unwrap_or_else(|| config.graph_path());
    if let Err(e) = graph.save(&out) {
        eprintln!("error: {e}");
        return 2;
    }
    ctx.success(&format!(
        "Knowledge graph built: {} diseases, {} symptoms, {} edges. Data saved to {}.",
        graph.disease_count(),
        graph.symptom_count(),
        graph.edge_count(),
        out.display()
    ));
    0
}

fn run_symptoms(ctx: &Context, args: &SymptomsArgs) -> i32 {
    let line = match &args.line {
        Some(l) => l.clone(),
        None => {
            ctx.info("Please enter all symptoms in one line, separated by commas.");
            ctx.info("Example: severe abdominal pain, nausea, vomiting, occasional heartburn");
            let mut buf = String::new();
            if let Err(e) = io::stdin().lock().read_line(&mut buf) {
                eprintln!("error: failed to read stdin: {e}");
                return 2;
            }
            buf
        }
    };

    let symptoms = parse_symptom_line(&line);
    if symptoms.is_empty() {
        eprintln!("error: no symptoms were entered");
        return 1;
    }
    ctx.info(&format!("Entered Symptoms: {symptoms:?}"));
    if let Err(e) = save_symptom_file(&symptoms, &args.output) {
        eprintln!("error: {e}");
        return 2;
    }
    ctx.success(&format!("Symptoms have been saved to {}", args.output.display()));
    0
}

fn run_diagnose(ctx: &Context, config: &Config, args: &DiagnoseArgs) -> i32 {
    let graph_path = args.graph.clone().unwrap_or_else(|| config.graph_path());
    let graph = match load_graph(ctx, &graph_path) {
        Ok(g) => g,
        Err(rc) => return rc,
    };

    let mut symptoms = Vec::new();
    let file = match (&args.symptoms, args.symptom.is_empty()) {
        (Some(p), _) => Some(p.clone()),
        (None, true) => Some(PathBuf::from(DEFAULT_SYMPTOMS)),
        (None, false) => None,
    };
    if let Some(path) = file {
        match load_symptom_file(&path) {
            Ok(list) => symptoms.extend(list),
            Err(e) => {
                eprintln!("error: {e}");
                return 2;
            }
        }
    }
    symptoms.extend(args.symptom.iter().cloned());
    let query = Query::new(&symptoms);
    ctx.info(&format!("Loaded Symptoms: {:?}", query.symptoms()));

    let heuristic = args.heuristic.unwrap_or_else(|| config.heuristic());
    let search = DiagnosisSearch::with_heuristic(&graph, heuristic);
    ctx.info(&format!("Searching for possible diseases ({heuristic} heuristic)..."));
    let result = match search.run(&query) {
        Ok(r) => r,
        Err(DiagnosisError::NoKnownSymptoms { .. }) => {
            eprintln!("error: no valid symptoms found in the knowledge graph");
            return 1;
        }
    };

    let ranked = result.ranked();
    if ranked.is_empty() {
        ctx.info("No diseases identified based on the provided symptoms.");
        return 0;
    }

    let reporter = RankingReporter::new(
        config.precision(),
        args.top_k.or(config.diagnosis.top_k),
    );
    let output = args.output.clone().unwrap_or_else(|| config.output_path());
    if let Err(e) = reporter.write_file(&ranked, &output) {
        eprintln!("error: {e}");
        return 2;
    }
    ctx.info(&format!("Possible diseases have been saved to {}", output.display()));

    ctx.info("\nPossible Diseases:");
    for line in reporter.summary_lines(&ranked) {
        ctx.info(&line);
    }
    0
}

fn run_evaluate(ctx: &Context, config: &Config, args: &EvaluateArgs) -> i32 {
    let graph_path = args.graph.clone().unwrap_or_else(|| config.graph_path());
    let graph = match load_graph(ctx, &graph_path) {
        Ok(g) => g,
        Err(rc) => return rc,
    };
    let cases = match read_cases(&args.cases) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {}: {e}", args.cases.display());
            return 2;
        }
    };

    let policy = EvaluationPolicy {
        top_k: args.top_k.or(config.evaluation.top_k),
        limit: args.limit.or(config.evaluation.limit),
    };
    let heuristic = args.heuristic.unwrap_or_else(|| config.heuristic());
    let search = DiagnosisSearch::with_heuristic(&graph, heuristic);
    let tally = evaluate_cases(&search, &cases, &policy);

    if !ctx.quiet {
        print!("{}", tally.render());
    }
    0
}
