use cc_app::{AppResult, TableSection, project_service, table};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "ccperf")]
#[command(about = "Centrifugal compressor test-to-guarantee performance conversion", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum SectionArg {
    First,
    Second,
}

impl From<SectionArg> for TableSection {
    fn from(s: SectionArg) -> Self {
        match s {
            SectionArg::First => TableSection::First,
            SectionArg::Second => TableSection::Second,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Validate project file syntax and values
    Validate {
        /// Path to the project YAML or JSON file
        project_path: PathBuf,
    },
    /// Rebuild every test point and conversion of a project
    Evaluate {
        /// Path to the project YAML or JSON file
        project_path: PathBuf,
    },
    /// Find the speed that reproduces the guarantee discharge pressure
    MatchSpeed {
        /// Path to the project YAML or JSON file
        project_path: PathBuf,
        /// Print the result without writing the speed back to the project
        #[arg(long)]
        dry_run: bool,
    },
    /// Convert rows of test points to the project guarantee
    Table {
        /// Path to the project YAML or JSON file
        project_path: PathBuf,
        /// Comma-separated test points with a unit-tagged header
        table_path: PathBuf,
        /// Section whose guarantee the rows are converted to
        #[arg(long, value_enum, default_value = "first")]
        section: SectionArg,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { project_path } => cmd_validate(&project_path),
        Commands::Evaluate { project_path } => cmd_evaluate(&project_path),
        Commands::MatchSpeed {
            project_path,
            dry_run,
        } => cmd_match_speed(&project_path, dry_run),
        Commands::Table {
            project_path,
            table_path,
            section,
            output,
        } => cmd_table(&project_path, &table_path, section.into(), output.as_deref()),
    }
}

fn cmd_validate(project_path: &Path) -> AppResult<()> {
    println!("Validating project: {}", project_path.display());
    let project = project_service::load_project(project_path)?;
    project_service::validate_project(&project)?;
    println!("✓ Project is valid");
    println!("  Name: {}", project.name);
    println!("  Test points: {}", project.compressor.test_point_count());
    Ok(())
}

fn cmd_evaluate(project_path: &Path) -> AppResult<()> {
    let project = project_service::load_project(project_path)?;
    println!("Evaluating project: {}", project.name);
    let evaluation = project_service::evaluate_project(&project)?;
    println!("{evaluation}");
    Ok(())
}

fn cmd_match_speed(project_path: &Path, dry_run: bool) -> AppResult<()> {
    let project = project_service::load_project(project_path)?;
    println!("Matching speed for project: {}", project.name);
    let (updated, evaluation) = project_service::match_speed(&project)?;
    println!("{evaluation}");
    if dry_run {
        println!("✓ Matched speed {:.2} rpm (not saved)", evaluation.speed_rpm);
    } else {
        project_service::save_project(project_path, &updated)?;
        info!(path = %project_path.display(), speed_rpm = evaluation.speed_rpm, "project saved");
        println!(
            "✓ Matched speed {:.2} rpm saved to {}",
            evaluation.speed_rpm,
            project_path.display()
        );
    }
    Ok(())
}

fn cmd_table(
    project_path: &Path,
    table_path: &Path,
    section: TableSection,
    output: Option<&Path>,
) -> AppResult<()> {
    let project = project_service::load_project(project_path)?;
    let text = std::fs::read_to_string(table_path)?;
    let report = table::evaluate_table(&project, section, &text)?;
    let csv = report.to_csv();
    info!(
        rows = report.rows.len(),
        flagged = report.flagged.len(),
        "table converted"
    );

    if let Some(path) = output {
        std::fs::write(path, csv)?;
        println!(
            "✓ Converted {} rows to {}",
            report.rows.len(),
            path.display()
        );
    } else {
        print!("{csv}");
    }
    for f in &report.flagged {
        eprintln!("  line {}: {}", f.line, f.reason);
    }
    Ok(())
}
