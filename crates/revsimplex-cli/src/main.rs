use clap::{Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use revsimplex_solver::{
    DEFAULT_MAX_ITERATIONS, DEFAULT_SINGULARITY_THRESHOLD, GeneratorConfig, Problem,
    ProblemGenerator, Simplex, Solution, SolutionStatus, format_row,
};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "revsimplex")]
#[command(about = "Revised simplex solver for standard-form linear programs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Log iterations (-v) or every intermediate matrix (-vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Print only the optimal value and the solution vector
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Pretty, global = true)]
    format: Format,
    /// Iterations before giving up
    #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS, global = true)]
    max_iterations: usize,
    /// Basis matrices with |det| below this are treated as singular
    #[arg(long, default_value_t = DEFAULT_SINGULARITY_THRESHOLD, global = true)]
    singularity_threshold: f64,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an LP file and output its syntax tree
    Parse {
        /// The LP file to parse
        file: PathBuf,
    },
    /// Solve a problem stored in an LP file
    Solve {
        /// The LP file to solve
        file: PathBuf,
    },
    /// Generate random problems until one is solvable, then solve it
    Random {
        /// Seed for reproducible problems
        #[arg(long)]
        seed: Option<u64>,
        /// Round every coefficient to an integer
        #[arg(long)]
        round: bool,
        /// Problems to try before giving up
        #[arg(long, default_value_t = 10_000)]
        attempts: usize,
        /// Save the generated problem to this LP file
        #[arg(long)]
        save: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Pretty,
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let solver = Simplex::new()
        .with_max_iterations(cli.max_iterations)
        .with_singularity_threshold(cli.singularity_threshold);

    let problem = match &cli.command {
        Commands::Parse { file } => {
            parse_only(file, cli.format);
            return;
        }
        Commands::Solve { file } => match revsimplex_lp::read_problem(file) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        Commands::Random {
            seed,
            round,
            attempts,
            save,
        } => {
            let problem = random_problem(&solver, *seed, *round, *attempts, cli.verbose > 0);
            if let Some(path) = save {
                match revsimplex_lp::save_problem(path, &problem) {
                    Ok(()) => eprintln!("Problem saved under {}", path.display()),
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        std::process::exit(1);
                    }
                }
            }
            problem
        }
    };

    let pretty = cli.format == Format::Pretty;
    if pretty && !cli.quiet {
        println!("Initial problem:");
        println!("{}", problem);
        match solver.solution_vector(&problem) {
            Ok(x) => println!("base sol = {}", format_row(x.as_slice())),
            Err(e) => println!("base sol = unavailable ({})", e),
        }
        println!();
    }

    let mut problem = problem;
    let solution = solver.solve(&mut problem);

    if pretty {
        print_solution(&solution, cli.quiet);
    } else {
        match serde_json::to_string_pretty(&solution) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }

    if !solution.is_optimal() {
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .without_time()
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        std::process::exit(1);
    }
}

fn parse_only(file: &Path, format: Format) {
    let source = match std::fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            std::process::exit(1);
        }
    };

    match revsimplex_lp::Parser::parse(&source) {
        Ok(lp) => {
            if format == Format::Json {
                println!("{}", serde_json::to_string_pretty(&lp).unwrap_or_else(|e| {
                    format!("Error: {}", e)
                }));
            } else {
                println!("{:#?}", lp);
            }
        }
        Err(e) => {
            eprintln!("Parse error: {}", e);
            std::process::exit(1);
        }
    }
}

fn random_problem(
    solver: &Simplex,
    seed: Option<u64>,
    round: bool,
    attempts: usize,
    verbose: bool,
) -> Problem {
    let mut rng: Box<dyn RngCore> = match seed {
        Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
        None => Box::new(rand::rng()),
    };
    let generator = ProblemGenerator::new(GeneratorConfig {
        round,
        ..GeneratorConfig::default()
    });

    match generator.find_solvable(&mut rng, solver, attempts) {
        Some((problem, tries)) => {
            if verbose {
                eprintln!("Took {} attempts to find a well bounded random problem", tries);
            }
            problem
        }
        None => {
            eprintln!("No solvable random problem found in {} attempts", attempts);
            std::process::exit(1);
        }
    }
}

fn print_solution(solution: &Solution, quiet: bool) {
    match solution.status {
        SolutionStatus::Optimal => {
            if quiet {
                println!("{}", solution.objective_value);
                println!("{}", format_row(&solution.values));
            } else {
                println!("Optimality reached = {}", solution.objective_value);
                println!("Pivots: {}", solution.pivots);
                println!("Optimal solution =");
                print_labeled(&solution.values);
            }
        }
        SolutionStatus::Unbounded => {
            eprintln!("Problem is unbounded");
        }
        SolutionStatus::SingularBasis => {
            eprintln!("Basis matrix became singular after {} pivots", solution.pivots);
        }
        SolutionStatus::IterationLimit => {
            eprintln!(
                "No optimum after {} pivots; last objective = {}",
                solution.pivots, solution.objective_value
            );
            if !quiet && !solution.values.is_empty() {
                println!("Last solution =");
                print_labeled(&solution.values);
            }
        }
    }
}

/// One tab-separated row of `x1 x2 ...` labels and one of values
fn print_labeled(values: &[f64]) {
    let labels: Vec<String> = (1..=values.len()).map(|i| format!("x{}", i)).collect();
    let cells: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    println!("\t{}", labels.join("\t"));
    println!("\t{}", cells.join("\t"));
}
