use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use snowgen_core::Config;
use snowgen_engine::{create_new_schema, ObjectStatus, RunOptions, RunReport};
use snowgen_repo::{create_database, init_project, LocalStore, ProjectLayout, SaveOutcome, TemplateRepository};

/// snowgen - Snowflake DDL generation from schema templates
#[derive(Parser)]
#[command(name = "snowgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: snowgen.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the starter object tree with template files
    Init,

    /// Create a new database folder
    NewDatabase {
        /// Database name
        name: String,
    },

    /// Generate every object of a schema template into a schema
    NewSchema {
        /// Target schema name
        #[arg(short, long)]
        schema: String,

        /// Schema template to apply
        #[arg(short, long)]
        template: String,

        /// Overwrite existing object files
        #[arg(short, long)]
        replace: bool,

        /// Schema whose existing tables feed generated dynamic tables
        #[arg(long)]
        source_schema: Option<String>,

        /// Database of the source schema (default: the template's database)
        #[arg(long)]
        source_database: Option<String>,

        /// Header delimiter of data templates (default: from config)
        #[arg(short, long, value_parser = parse_delimiter)]
        delimiter: Option<String>,

        /// Value of the {env} placeholder (default: from config)
        #[arg(short, long)]
        env: Option<String>,

        /// Extra placeholder value, KEY=VALUE (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        overrides: Vec<(String, String)>,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,

        /// Also save the run report to a JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List schema templates
    ListTemplates,

    /// List databases in the object tree
    ListDatabases,

    /// List schemas of a database
    ListSchemas {
        /// Database name
        database: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let config = load_config(cli.config.as_deref(), cli.verbose)?;
    let layout = ProjectLayout::from_config(&config);
    tracing::debug!(?layout, "project layout resolved");

    if cli.verbose {
        eprintln!("{} {}", "Objects root:".cyan(), layout.objects_root.display());
    }

    match cli.command {
        Commands::Init => init_command(&layout),
        Commands::NewDatabase { name } => new_database_command(&layout, &name),
        Commands::NewSchema {
            schema,
            template,
            replace,
            source_schema,
            source_database,
            delimiter,
            env,
            overrides,
            json,
            output,
        } => {
            let mut options = RunOptions::from_config(&config);
            options.replace = replace;
            options.source_schema = source_schema;
            options.source_database = source_database;
            if let Some(delimiter) = delimiter {
                options.delimiter = delimiter;
            }
            if let Some(env) = env {
                options.env = env;
            }
            options.overrides = overrides.into_iter().collect::<BTreeMap<_, _>>();

            new_schema_command(layout, &schema, &template, &options, json, output.as_deref())
        }
        Commands::ListTemplates => {
            let repo = TemplateRepository::new(LocalStore, layout);
            print_list("Schema templates", &repo.schema_template_names()?);
            Ok(())
        }
        Commands::ListDatabases => {
            let repo = TemplateRepository::new(LocalStore, layout);
            print_list("Databases", &repo.list_databases()?);
            Ok(())
        }
        Commands::ListSchemas { database } => {
            let repo = TemplateRepository::new(LocalStore, layout);
            print_list(&format!("Schemas in {}", database), &repo.list_schemas(&database)?);
            Ok(())
        }
    }
}

/// Explicit path, then `snowgen.toml` in the working directory, then defaults
fn load_config(path: Option<&Path>, verbose: bool) -> Result<Config> {
    if let Some(path) = path {
        return Config::from_file(path).with_context(|| format!("Failed to load config {}", path.display()));
    }

    let default_path = Path::new("snowgen.toml");
    if default_path.exists() {
        return Config::from_file(default_path).context("Failed to load snowgen.toml");
    }

    if verbose {
        eprintln!("{}", "No config file found, using defaults".yellow());
    }
    Ok(Config::default())
}

fn parse_key_value(raw: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))?;
    if key.is_empty() {
        return Err(format!("empty key in '{}'", raw));
    }
    Ok((key.to_string(), value.to_string()))
}

fn parse_delimiter(raw: &str) -> std::result::Result<String, String> {
    if raw.is_empty() {
        return Err("delimiter must not be empty".to_string());
    }
    Ok(raw.to_string())
}

fn init_command(layout: &ProjectLayout) -> Result<()> {
    let written = init_project(&LocalStore, layout)?;

    for (path, outcome) in &written {
        let label = match outcome {
            SaveOutcome::Unchanged => "kept".yellow(),
            _ => "created".green(),
        };
        println!("  {} {}", label, path.display());
    }
    println!("{}", "✓ Created directory structure".green());
    Ok(())
}

fn new_database_command(layout: &ProjectLayout, name: &str) -> Result<()> {
    let path = create_database(&LocalStore, layout, name)?;
    println!("{} {}", "✓ Database created:".green(), path.display());
    Ok(())
}

fn new_schema_command(
    layout: ProjectLayout,
    schema: &str,
    template: &str,
    options: &RunOptions,
    json: bool,
    output: Option<&Path>,
) -> Result<()> {
    let repo = TemplateRepository::new(LocalStore, layout);
    let report = create_new_schema(&repo, schema, template, options)
        .with_context(|| format!("Failed to create schema {} from template {}", schema, template))?;

    if let Some(path) = output {
        report
            .save_to_file(path)
            .with_context(|| format!("Failed to save report to {}", path.display()))?;
    }

    if json {
        println!("{}", report.to_json()?);
    } else {
        print_report_summary(&report);
    }

    if report.has_failures() {
        std::process::exit(1);
    }
    Ok(())
}

fn print_report_summary(report: &RunReport) {
    println!("\n{}", "=".repeat(60).bright_blue());
    println!(
        "{} {}.{} ({})",
        "Schema".bold().bright_blue(),
        report.database,
        report.schema,
        report.template
    );
    println!("{}", "=".repeat(60).bright_blue());

    for outcome in &report.objects {
        let status = match outcome.status {
            ObjectStatus::Created => "created".green(),
            ObjectStatus::Replaced => "replaced".cyan(),
            ObjectStatus::Unchanged => "unchanged".dimmed(),
            ObjectStatus::Failed => "failed".red().bold(),
        };
        println!("  {:<10} {:<18} {}", status, outcome.category.to_string(), outcome.object);
        if let Some(error) = &outcome.error {
            println!("             {}", error.red());
        }
    }

    for failure in &report.category_failures {
        println!("  {} {}: {}", "✗".red().bold(), failure.category, failure.message.red());
    }

    let summary = &report.summary;
    println!();
    println!(
        "{} created, {} replaced, {} unchanged, {} failed",
        summary.created.to_string().green(),
        summary.replaced.to_string().cyan(),
        summary.unchanged,
        summary.failed.to_string().red()
    );
    if summary.failed_categories > 0 {
        println!("{} categories aborted", summary.failed_categories.to_string().red());
    } else if summary.failed == 0 {
        println!("{}", "✓ Schema generated".green());
    }
}

fn print_list(title: &str, items: &[String]) {
    println!("{}", title.bold());
    if items.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for item in items {
        println!("  {}", item);
    }
}
