use clap::Parser;
use stockcut::input::{parse_dimensions, parse_piece};
use stockcut::render;
use stockcut::{Config, Objective, OptimizeResult, PieceSpec, StrategyKind, Unit, optimize};
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "stockcut",
    about = "2D guillotine cutting stock optimizer"
)]
struct Cli {
    /// Board dimensions (WxH, e.g. 2800x2070)
    #[arg(long)]
    board: String,

    /// Pieces as [ID:]WxH:QTY (e.g. A:930x750:5 300x800:3)
    #[arg(long = "pieces", num_args = 1..)]
    pieces: Vec<String>,

    /// Blade kerf width
    #[arg(long, default_value_t = 3.0)]
    kerf: f64,

    /// Unit of all lengths given: mm, cm, m, or in
    #[arg(long, default_value = "mm")]
    unit: Unit,

    /// Disable piece rotation
    #[arg(long)]
    no_rotate: bool,

    /// Try a two-column split layout first
    #[arg(long)]
    two_columns: bool,

    /// Try the multi-column, multi-start optimizer first
    #[arg(long)]
    advanced: bool,

    /// Objective of the full-width packer: waste, cuts, or balanced
    #[arg(long, default_value = "waste")]
    objective: Objective,

    /// Force a strategy: shelf-column, two-column, multi-column, or full-width
    #[arg(long)]
    strategy: Option<StrategyKind>,

    /// Seed of the shuffled order tried by the advanced optimizer
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Show ASCII layout of each board
    #[arg(long)]
    layout: bool,

    /// Print the full result as JSON
    #[arg(long)]
    json: bool,

    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

fn print_result(result: &OptimizeResult, layout: bool) {
    for board in &result.boards {
        println!(
            "Board {} ({:.1}% used):",
            board.index + 1,
            board.utilization * 100.0
        );
        for p in board.pieces() {
            let rot = if p.rotated { " [rotated]" } else { "" };
            println!("  {} {} @ ({}, {}){}", p.id, p.rect(), p.x, p.y, rot);
        }
        if layout {
            print!("{}", render::render_board(board));
        }
        println!();
    }

    for u in &result.unplaced {
        println!(
            "Unplaced: {} {}x{} x{} ({:?})",
            u.spec_id, u.width, u.height, u.quantity, u.reason
        );
    }

    let summary = result.summary();
    println!(
        "Summary: {} board{} used, {:.1}% utilization, {} cuts{}",
        summary.board_count,
        if summary.board_count == 1 { "" } else { "s" },
        summary.utilization * 100.0,
        summary.cut_count,
        result
            .strategy
            .map(|s| format!(" ({s})"))
            .unwrap_or_default(),
    );
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(level)
        .init();

    let board = parse_dimensions(&cli.board, cli.unit).unwrap_or_else(|e| fail(e));
    let specs: Vec<PieceSpec> = cli
        .pieces
        .iter()
        .enumerate()
        .map(|(i, p)| parse_piece(p, i + 1, cli.unit))
        .collect::<Result<Vec<_>, _>>()
        .unwrap_or_else(|e| fail(e));

    let config = Config {
        board_width: board.w,
        board_height: board.h,
        kerf: cli.unit.to_mm(cli.kerf),
        allow_rotation: !cli.no_rotate,
        force_two_columns: cli.two_columns,
        objective: cli.objective,
        use_advanced_optimizer: cli.advanced,
        seed: cli.seed,
        strategy: cli.strategy,
    };
    if let Err(e) = config.validate() {
        fail(e);
    }

    let result = optimize(&config, &specs);

    if cli.json {
        match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{json}"),
            Err(e) => fail(e),
        }
    } else {
        print_result(&result, cli.layout);
    }
}
