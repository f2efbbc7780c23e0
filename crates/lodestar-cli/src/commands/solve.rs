//! Solve command.

use clap::Args;
use lodestar_cdcl::{Options, SatResult, Solver};
use lodestar_format::{DimacsCnf, DratWriter};
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Args)]
pub struct SolveArgs {
    /// Input file in DIMACS CNF format
    #[arg(required = true)]
    pub input: PathBuf,

    /// Write a DRAT proof trace to this file
    #[arg(short, long)]
    pub proof: Option<PathBuf>,

    /// Write solver statistics as JSON to this file
    #[arg(long)]
    pub stats_json: Option<PathBuf>,

    /// Suppress the model ('v' lines) on satisfiable instances
    #[arg(short = 'n', long)]
    pub no_model: bool,

    /// Stop after this many conflicts and report unknown
    #[arg(short, long)]
    pub conflict_limit: Option<u64>,

    /// Base growth of the reduce conflict threshold
    #[arg(long, default_value_t = 300)]
    pub reduce_interval: u32,

    /// Conflicts between restart checks
    #[arg(long, default_value_t = 50)]
    pub restart_interval: u32,

    /// Fast/slow glue ratio above which a restart fires
    #[arg(long, default_value_t = 1.25)]
    pub restart_margin: f64,

    /// Trail-size ratio above which a restart is blocked
    #[arg(long, default_value_t = 1.4)]
    pub restart_block_margin: f64,

    /// Window of the fast glue moving average
    #[arg(long, default_value_t = 33)]
    pub fast_glue_window: u32,

    /// Window of the slow glue moving average
    #[arg(long, default_value_t = 100_000)]
    pub slow_glue_window: u32,

    /// Disable learned-clause minimization
    #[arg(long)]
    pub no_minimize: bool,

    /// Disable phase saving
    #[arg(long)]
    pub no_phase_saving: bool,

    /// Tie-break seed
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
}

impl SolveArgs {
    fn options(&self) -> Options {
        Options {
            reduce_interval: self.reduce_interval,
            restart_interval: self.restart_interval,
            restart_margin: self.restart_margin,
            restart_block_margin: self.restart_block_margin,
            fast_glue_window: self.fast_glue_window,
            slow_glue_window: self.slow_glue_window,
            minimize: !self.no_minimize,
            phase_saving: !self.no_phase_saving,
            seed: self.seed,
            conflict_limit: self.conflict_limit,
            ..Options::default()
        }
    }
}

pub fn run(args: SolveArgs) -> anyhow::Result<i32> {
    tracing::info!("Loading problem from {:?}", args.input);

    let content = fs::read_to_string(&args.input)?;
    let problem = DimacsCnf::from_str(&content)?;
    tracing::info!(
        "Loaded DIMACS: {} vars, {} clauses",
        problem.num_vars,
        problem.clauses.len()
    );

    let mut solver = Solver::with_options(args.options());
    solver.reserve(problem.num_vars)?;
    if let Some(path) = &args.proof {
        solver.connect_proof(Box::new(DratWriter::create(path)?));
    }
    for clause in &problem.clauses {
        solver.add_original_clause(clause)?;
    }

    let start = Instant::now();
    let result = solver.solve()?;
    let elapsed = start.elapsed();

    match &result {
        SatResult::Sat(model) => {
            println!("s SATISFIABLE");
            if !args.no_model {
                print_model(model);
            }
        }
        SatResult::Unsat => {
            println!("s UNSATISFIABLE");
        }
        SatResult::Unknown(reason) => {
            println!("s UNKNOWN ({reason})");
        }
    }

    let stats = solver.stats();
    println!("c conflicts:    {}", stats.conflicts);
    println!("c decisions:    {}", stats.decisions);
    println!("c propagations: {}", stats.propagations);
    println!("c restarts:     {}", stats.restarts);
    println!("c reductions:   {}", stats.reductions);
    println!("c learned:      {}", stats.learned);
    println!("c peak memory:  {} bytes", stats.bytes_peak);
    println!("c Time: {:.3}s", elapsed.as_secs_f64());

    if let Some(path) = &args.stats_json {
        fs::write(path, serde_json::to_string_pretty(stats)?)?;
    }

    Ok(result.code())
}

/// Prints the model as DIMACS 'v' lines, a dozen literals per line.
fn print_model(model: &[bool]) {
    let mut line = String::from("v");
    for (i, &value) in model.iter().enumerate() {
        let lit = if value { (i + 1) as i64 } else { -((i + 1) as i64) };
        line.push_str(&format!(" {lit}"));
        if (i + 1) % 12 == 0 {
            println!("{line}");
            line = String::from("v");
        }
    }
    line.push_str(" 0");
    println!("{line}");
}
