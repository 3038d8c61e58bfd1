use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use gym_records::{codec, load_file, storage, Console, MemberRegistry, Settings};

#[derive(Parser)]
#[command(name = "gym-records", version, about = "Gym membership record keeper")]
struct Cli {
    /// Data file loaded on start and saved on exit (overrides GYM_DATA_FILE)
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// Write logs here while the terminal form is open
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Numbered text menu
    Console,
    /// Full-screen terminal form
    Tui,
    /// Print every member in the data file
    List {
        /// Print JSON instead of the table
        #[arg(long)]
        json: bool,
    },
    /// Write the human-readable table export
    Export { path: PathBuf },
    /// Decode a file and report bad rows without changing anything
    Check { path: PathBuf },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let (mut settings, settings_err) = Settings::from_env_or_default();
    if let Some(e) = settings_err {
        eprintln!("⚠️  {:#}. Using default settings.", e);
    }
    if let Some(file) = cli.file {
        settings.data_file = file;
    }

    let command = match cli.command {
        Some(command) => command,
        None => choose_interface()?,
    };

    // The terminal form owns the screen, so it never logs to stderr
    let to_stderr = !matches!(command, Commands::Tui);
    init_logging(cli.log_file.as_deref(), to_stderr)?;

    match command {
        Commands::Console => run_console(settings),
        Commands::Tui => run_ui_mode(settings),
        Commands::List { json } => run_list(&settings, json),
        Commands::Export { path } => run_export(&settings, &path),
        Commands::Check { path } => run_check(&path),
    }
}

/// Logs go to stderr, or to `log_file` when given. With neither they are dropped.
fn init_logging(log_file: Option<&Path>, stderr: bool) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::WARN.into())
        .from_env_lossy();

    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else if stderr {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
    Ok(())
}

fn choose_interface() -> Result<Commands> {
    println!("🏋️  Gym Membership Records v{}", gym_records::VERSION);
    println!("Choose an interface:");
    println!("1. Console menu");
    println!("2. Terminal form");
    print!("Enter choice (1 or 2): ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;

    Ok(match line.trim() {
        "2" => Commands::Tui,
        "1" => Commands::Console,
        _ => {
            println!("Invalid choice. Starting the console menu.");
            Commands::Console
        }
    })
}

fn run_console(settings: Settings) -> Result<()> {
    let stdin = io::stdin();
    let mut console = Console::new(stdin.lock(), io::stdout(), MemberRegistry::new(), settings);
    console.run().context("Console session failed")?;
    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(settings: Settings) -> Result<()> {
    use gym_records::ui;

    let registry = match load_file(&settings.data_file) {
        Ok(report) => {
            println!(
                "✓ Loaded {} members from {} ({} rows skipped)",
                report.loaded(),
                settings.data_file.display(),
                report.skipped()
            );
            report.registry
        }
        Err(e) => {
            eprintln!("⚠️  {}. Starting with an empty list.", e);
            MemberRegistry::new()
        }
    };

    let mut app = ui::App::new(registry, settings);
    ui::run_ui(&mut app).context("Terminal form failed")?;

    println!("\n✅ Terminal form closed");
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_settings: Settings) -> Result<()> {
    eprintln!("❌ Terminal form not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the console menu: gym-records console");
    std::process::exit(1);
}

fn run_list(settings: &Settings, json: bool) -> Result<()> {
    let report = load_file(&settings.data_file).context("Failed to load data file")?;
    let registry = report.registry;

    if json {
        let out = serde_json::to_string_pretty(registry.list())?;
        println!("{}", out);
        return Ok(());
    }

    println!(
        "{:<10} {:<28} {:<8} {:<11} {:<7} {:>16}  {}",
        codec::TABLE_COLUMNS[0],
        codec::TABLE_COLUMNS[1],
        codec::TABLE_COLUMNS[2],
        codec::TABLE_COLUMNS[3],
        codec::TABLE_COLUMNS[4],
        codec::TABLE_COLUMNS[5],
        codec::TABLE_COLUMNS[6],
    );
    for member in registry.iter() {
        let [id, name, kind, joined, status, fee, details] = codec::table_row(member, &settings.fees);
        println!(
            "{:<10} {:<28} {:<8} {:<11} {:<7} {:>16}  {}",
            id, name, kind, joined, status, fee, details
        );
    }
    println!("\n{} members", registry.len());
    Ok(())
}

fn run_export(settings: &Settings, path: &Path) -> Result<()> {
    let report = load_file(&settings.data_file).context("Failed to load data file")?;
    let written = storage::export_table(path, &report.registry, &settings.fees)
        .with_context(|| format!("Failed to export to {}", path.display()))?;
    println!("✓ Exported {} members to {}", written, path.display());
    Ok(())
}

fn run_check(path: &Path) -> Result<()> {
    let report = load_file(path)?;

    for issue in &report.issues {
        println!("❌ {}", issue);
    }
    println!(
        "✓ {} members decoded, {} rows skipped",
        report.loaded(),
        report.skipped()
    );
    Ok(())
}
