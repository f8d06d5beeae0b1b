use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use strata_cfg::interpolate::resolve_interpolations;
use strata_cfg::loader::load_file;
use strata_cfg::merge::merge;
use strata_cfg::overrides::parse_override;
use strata_cfg::path::{assign_path, find_path};
use strata_cfg::yaml::{to_yaml_string, write_yaml_file};
use strata_cfg::{ConfigError, Value};

const RUN_DIR_TEMPLATE: &str = "outputs/${now:%Y-%m-%d_%H-%M-%S}";

/// Hierarchical YAML configuration loader.
///
/// Composes config files through their `defaults` lists, applies override
/// expressions, resolves `${...}` interpolations, and prints the result.
#[derive(Parser)]
#[command(name = "strata", version, about)]
struct Cli {
    /// Configuration YAML file to load (can be repeated)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Vec<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    verbose: bool,

    /// Override expressions like `trainer.max_epochs=100` or `+new.key=value`.
    /// Nested keys use dot-notation; escape literal dots with a backslash.
    /// Use `strata.run.dir=null` to disable run directory creation.
    #[arg(value_name = "OVERRIDE")]
    overrides: Vec<String>,
}

fn seg(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

/// Fill in `strata.run.dir` and `strata.job.name` when the loaded config
/// does not set them, before overrides and interpolation run.
fn ensure_strata_defaults(config: &mut Value) -> Result<(), ConfigError> {
    let run_dir = seg(&["strata", "run", "dir"]);
    match find_path(config, &run_dir) {
        Some(_) => {}
        None => assign_path(config, &run_dir, Value::from(RUN_DIR_TEMPLATE), true)?,
    }

    let job_name = seg(&["strata", "job", "name"]);
    let default_name = std::env::args()
        .next()
        .map(PathBuf::from)
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "strata".to_string());
    match find_path(config, &job_name) {
        Some(Value::Null) => assign_path(config, &job_name, Value::from(default_name), false)?,
        Some(_) => {}
        None => assign_path(config, &job_name, Value::from(default_name), true)?,
    }
    Ok(())
}

/// `strata.run.dir` after resolution: null or empty disables the run
/// directory entirely.
fn resolve_run_directory(config: &Value) -> Result<Option<PathBuf>, ConfigError> {
    match find_path(config, &seg(&["strata", "run", "dir"])) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(PathBuf::from(s))),
        Some(other) => Err(ConfigError::TypeMismatch {
            expected: "string or null".to_string(),
            found: other.type_name().to_string(),
            hint: Some("strata.run.dir selects the run directory".into()),
            code: Some(400),
        }),
    }
}

fn write_artifacts(
    config: &Value,
    overrides: &[String],
    run_dir: &Path,
) -> Result<(), ConfigError> {
    let meta_dir = run_dir.join(".strata");
    std::fs::create_dir_all(&meta_dir).map_err(|e| ConfigError::FileError {
        message: format!("failed to create run directory: {}", e),
        path: meta_dir.display().to_string(),
        hint: None,
        code: Some(300),
    })?;

    write_yaml_file(config, &meta_dir.join("config.yaml"))?;

    if let Some(strata_node) = find_path(config, &seg(&["strata"])) {
        write_yaml_file(strata_node, &meta_dir.join("strata.yaml"))?;
    }

    let expressions = Value::Sequence(overrides.iter().map(|e| Value::from(e.as_str())).collect());
    write_yaml_file(&expressions, &meta_dir.join("overrides.yaml"))?;

    println!("# Run directory: {}", run_dir.display());
    println!("# Stored configuration: {}", meta_dir.join("config.yaml").display());
    Ok(())
}

fn run(cli: Cli) -> Result<(), ConfigError> {
    let mut files = cli.config;
    if files.is_empty() {
        if Path::new("config.yaml").exists() {
            files.push(PathBuf::from("config.yaml"));
        } else {
            warn!("no configuration files provided; starting from empty mapping");
        }
    }

    let mut config = Value::mapping();
    for path in &files {
        debug!(path = %path.display(), "loading configuration file");
        let loaded = load_file(path)?;
        merge(&mut config, &loaded);
    }

    ensure_strata_defaults(&mut config)?;

    for expression in &cli.overrides {
        let parsed = parse_override(expression)?;
        assign_path(&mut config, &parsed.path, parsed.value, parsed.require_new)?;
    }

    resolve_interpolations(&mut config)?;

    let run_dir = match resolve_run_directory(&config)? {
        Some(dir) => {
            let absolute = std::path::absolute(&dir).map_err(|e| ConfigError::FileError {
                message: format!("failed to resolve run directory: {}", e),
                path: dir.display().to_string(),
                hint: None,
                code: Some(300),
            })?;
            assign_path(
                &mut config,
                &seg(&["strata", "run", "dir"]),
                Value::from(absolute.display().to_string()),
                false,
            )?;
            Some(absolute)
        }
        None => {
            assign_path(&mut config, &seg(&["strata", "run", "dir"]), Value::Null, false)?;
            None
        }
    };

    print!("{}", to_yaml_string(&config));

    match run_dir {
        Some(dir) => write_artifacts(&config, &cli.overrides, &dir)?,
        None => println!("# strata.run.dir is null; skipping run directory creation"),
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("strata_cfg={level},strata={level}"))),
        )
        .with_target(false)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("Error: {}", error);
            ExitCode::FAILURE
        }
    }
}
