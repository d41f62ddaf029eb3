use std::{
    fs, io,
    panic::{self, AssertUnwindSafe},
    path::{Path, PathBuf},
};

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use rand::{SeedableRng, rngs::StdRng};
use tracing::{error, info, warn};

use crate::{
    cards::{
        batch::{self, Card},
        document,
        layout::{GridLayout, compute_layout},
    },
    config::{self, Config, Overrides},
    constants::{CARD_SETTINGS, EXIT_CODES, GRID},
    error::AppError,
    game, logging,
    movie::MovieDatabase,
    reconcile::scan_stills_dir,
    render::HtmlRenderer,
    session::{
        self, AbortReason, EditSession, SessionPaths, SessionReport, lookup::OmdbLookup,
        terminal::{self, TerminalPrompter},
        viewer::SystemViewer,
    },
    slideshow, storage,
};

const SAMPLE_POOL_SIZE: usize = 240;

#[derive(Parser, Debug)]
#[command(name = "stillframe")]
#[command(about = "Movie still guessing game: cards, call sheets and slideshows", long_about = None)]
pub struct Cli {
    #[arg(long, help = "Write a sample card document from made-up names and exit")]
    pub test: bool,

    #[arg(long, global = true, help = "Directory holding the movie stills")]
    pub stills: Option<PathBuf>,

    #[arg(long, global = true, help = "Movie database file")]
    pub database: Option<PathBuf>,

    #[arg(long, global = true, help = "Directory for generated files")]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(about = "Reconcile the database with the stills directory and fill in details")]
    Scan,

    #[command(about = "Write a call sheet, slideshow and cards for one round")]
    Play {
        #[command(flatten)]
        cards: CardArgs,

        #[arg(long, help = "Number of movies to call (default: all)")]
        draw: Option<usize>,
    },

    #[command(about = "Write cards only")]
    Cards {
        #[command(flatten)]
        cards: CardArgs,
    },

    #[command(about = "Export the movie database")]
    Export {
        #[arg(long, value_enum, default_value = "json", help = "Export format")]
        format: ExportFormat,

        #[arg(long, short, help = "Output path")]
        out: Option<PathBuf>,
    },

    #[command(about = "Merge the in-progress backup into the movie database")]
    RestoreBackup,

    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum, help = "Shell type")]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone)]
pub struct CardArgs {
    #[arg(long, default_value_t = CARD_SETTINGS.default_cards, help = "Number of cards (rounded up to even)")]
    pub cards: usize,

    #[arg(long, help = "Title across the top row of each card")]
    pub title: Option<String>,

    #[arg(long, help = "Fill the center cell with a name instead of FREE SPACE")]
    pub no_free_space: bool,

    #[arg(long, help = "Seed for a repeatable shuffle")]
    pub seed: Option<u64>,
}

impl Default for CardArgs {
    fn default() -> Self {
        Self {
            cards: CARD_SETTINGS.default_cards,
            title: None,
            no_free_space: false,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn ensure_dir(dir: &std::path::Path) -> Result<(), AppError> {
    fs::create_dir_all(dir).map_err(|e| AppError::io(format!("creating {}", dir.display()), e))
}

struct CardPlan {
    layout: GridLayout,
    cards: Vec<Card>,
}

fn load_for_game(config: &Config) -> Result<MovieDatabase, AppError> {
    let database = storage::load_database(&config.database_file)?;
    let incomplete = database.incomplete_count();
    if incomplete > 0 {
        println!(
            "{} entries without a title and year are left out. Run `stillframe scan` to fill them in.",
            incomplete
        );
    }
    Ok(database)
}

fn plan_cards(
    config: &Config,
    args: &CardArgs,
    pool: &[String],
    rng: &mut StdRng,
) -> Result<CardPlan, AppError> {
    let layout = compute_layout(&GRID);
    let title = args.title.as_deref().unwrap_or(&config.card_title);
    let use_free_space = config.use_free_space && !args.no_free_space;
    let cards = batch::generate(&layout, args.cards, pool, use_free_space, title, rng)?;
    Ok(CardPlan { layout, cards })
}

fn write_card_plan(plan: &CardPlan, config: &Config, prefix: &str) -> Result<PathBuf, AppError> {
    let path = config
        .output_dir
        .join(game::stamped_file_name(prefix, "html"));
    let mut renderer = HtmlRenderer::new("stillframe cards");
    document::write_cards(&mut renderer, &plan.layout, &plan.cards, &path)?;
    Ok(path)
}

pub fn scan(config: &Config) -> Result<SessionReport, AppError> {
    let database = storage::load_database(&config.database_file)?;
    let scanned = scan_stills_dir(&config.stills_dir)?;
    info!(files = scanned.len(), dir = %config.stills_dir.display(), "scanned stills");

    let paths = SessionPaths {
        stills_dir: config.stills_dir.clone(),
        database: config.database_file.clone(),
        backup: config.backup_file.clone(),
    };
    let lookup = OmdbLookup::new(config.omdb_api_key.clone());
    let mut viewer = SystemViewer;
    let mut prompter = TerminalPrompter::new()?;

    let report = EditSession::new(&mut prompter, &lookup, &mut viewer, paths)
        .run(&database, &scanned);
    if let Err(e) = prompter.restore() {
        warn!(error = %e, "could not restore the terminal");
    }
    let report = report?;

    println!(
        "Reconciled {}: {} added, {} removed.",
        config.stills_dir.display(),
        report.added,
        report.dropped
    );
    match report.aborted {
        None => println!("Finished {} entries.", report.finished),
        Some(AbortReason::Quit) => println!(
            "Stopped after {} entries. Progress saved.",
            report.finished
        ),
        Some(AbortReason::Interrupted) => println!(
            "Interrupted after {} entries. Progress saved.",
            report.finished
        ),
    }
    let incomplete = report.movies.iter().filter(|m| !m.is_complete()).count();
    if incomplete > 0 {
        println!("{} entries still need a title and year.", incomplete);
    }
    Ok(report)
}

pub fn play(config: &Config, args: &CardArgs, draw: Option<usize>) -> Result<(), AppError> {
    let database = load_for_game(config)?;
    let mut rng = make_rng(args.seed);

    let playable = game::playable_movies(&database.movies, &mut rng);
    let pool = game::option_pool(&playable);
    let plan = plan_cards(config, args, &pool, &mut rng)?;
    let calls = game::draw_calls(playable, draw, &mut rng);

    ensure_dir(&config.output_dir)?;
    let sheet = game::write_call_sheet(&calls, &config.output_dir)?;

    let slides_path = config
        .output_dir
        .join(game::stamped_file_name("slideshow", "html"));
    let mut slides = HtmlRenderer::new("stillframe slideshow");
    slideshow::write_slideshow(&mut slides, &calls, &config.stills_dir, &slides_path)?;

    let cards_path = write_card_plan(&plan, config, "cards")?;

    println!("Call sheet: {}", sheet.display());
    println!("Slideshow:  {}", slides_path.display());
    println!(
        "Cards:      {} ({} cards)",
        cards_path.display(),
        plan.cards.len()
    );
    Ok(())
}

pub fn cards(config: &Config, args: &CardArgs) -> Result<(), AppError> {
    let database = load_for_game(config)?;
    let mut rng = make_rng(args.seed);

    let playable = game::playable_movies(&database.movies, &mut rng);
    let plan = plan_cards(config, args, &game::option_pool(&playable), &mut rng)?;

    ensure_dir(&config.output_dir)?;
    let path = write_card_plan(&plan, config, "cards")?;
    println!("Wrote {} cards to {}", plan.cards.len(), path.display());
    Ok(())
}

pub fn sample_cards(config: &Config) -> Result<(), AppError> {
    let pool: Vec<String> = (1..=SAMPLE_POOL_SIZE)
        .map(|i| format!("Sample Movie {i}"))
        .collect();
    let args = CardArgs::default();
    let mut rng = make_rng(None);
    let plan = plan_cards(config, &args, &pool, &mut rng)?;

    ensure_dir(&config.output_dir)?;
    let path = write_card_plan(&plan, config, "sample-cards")?;
    println!("Wrote sample cards to {}", path.display());
    Ok(())
}

pub fn export_data(
    config: &Config,
    format: ExportFormat,
    out_path: Option<PathBuf>,
) -> Result<(), AppError> {
    let database = storage::load_database(&config.database_file)?;

    let content = match format {
        ExportFormat::Json => serde_json::to_string_pretty(&database)
            .map_err(|e| AppError::io("encoding export", e))?,
        ExportFormat::Csv => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            for movie in &database.movies {
                writer
                    .serialize(movie)
                    .map_err(|e| AppError::io("encoding export", e))?;
            }
            let bytes = writer
                .into_inner()
                .map_err(|e| AppError::io("encoding export", e))?;
            String::from_utf8(bytes).map_err(|e| AppError::io("encoding export", e))?
        }
    };

    if let Some(path) = out_path {
        storage::write_text_file(&path, &content)
            .map_err(|e| AppError::io(format!("writing {}", path.display()), e))?;
        println!("Exported to {}", path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

pub fn restore_backup(config: &Config) -> Result<(), AppError> {
    let changed = session::restore_backup(&config.backup_file, &config.database_file)?;
    println!(
        "Restored {} entries from {} into {}",
        changed,
        config.backup_file.display(),
        config.database_file.display()
    );
    Ok(())
}

pub fn print_completions(shell: Shell) {
    clap_complete::generate(shell, &mut Cli::command(), "stillframe", &mut io::stdout());
}

fn dispatch(cli: Cli, config: &Config) -> Result<(), AppError> {
    if cli.test {
        return sample_cards(config);
    }

    match cli.command {
        None => {
            scan(config)?;
            play(config, &CardArgs::default(), None)
        }
        Some(Command::Scan) => scan(config).map(|_| ()),
        Some(Command::Play { cards, draw }) => play(config, &cards, draw),
        Some(Command::Cards { cards: args }) => cards(config, &args),
        Some(Command::Export { format, out }) => export_data(config, format, out),
        Some(Command::RestoreBackup) => restore_backup(config),
        Some(Command::Completions { shell }) => {
            print_completions(shell);
            Ok(())
        }
    }
}

/// Parses arguments, runs the command and returns the process exit code.
/// Usage errors exit with the generic failure code so they never read as a
/// database problem. `--help` and `--version` exit cleanly.
fn usage_exit_code(e: &clap::Error) -> i32 {
    if e.use_stderr() { EXIT_CODES.unknown } else { 0 }
}

/// Runs a command, mapping errors and panics to exit codes. Every failure
/// names the backup file so edits in progress can be found.
fn guarded<F>(config: &Config, log_file: Option<&Path>, f: F) -> i32
where
    F: FnOnce() -> Result<(), AppError>,
{
    let (message, code) = match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => return 0,
        Ok(Err(e)) => {
            error!(error = %e, "command failed");
            (format!("Error: {}", e), e.exit_code())
        }
        Err(_) => {
            error!("command panicked");
            (
                "stillframe stopped unexpectedly.".to_string(),
                EXIT_CODES.unexpected,
            )
        }
    };

    eprintln!("{}", message);
    eprintln!(
        "Edits in progress are kept in {}. Run `stillframe restore-backup` to recover them.",
        config.backup_file.display()
    );
    if let Some(log_file) = log_file {
        eprintln!("Log: {}", log_file.display());
    }
    code
}

pub fn run_cli() -> i32 {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return usage_exit_code(&e);
        }
    };
    let log_file = logging::init(&logging::log_path());
    terminal::install_panic_hook();

    let settings = config::load_settings(&config::settings_path());
    let config = Config::resolve(
        settings,
        Overrides {
            stills_dir: cli.stills.clone(),
            database_file: cli.database.clone(),
            output_dir: cli.output.clone(),
        },
    );

    guarded(&config, log_file.as_deref(), || dispatch(cli, &config))
}
