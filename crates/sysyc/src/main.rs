//! SysY semantic checker
//!
//! Usage: sysyc [OPTIONS] <input>...

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser as ClapParser, ValueEnum};
use sysy_checker::common::DiagnosticReporter;
use sysy_checker::driver::{Driver, DriverConfig};
use sysy_checker::sema::{AnalyzerConfig, DimensionPolicy, ShadowingPolicy};
use tracing::{debug, info};

/// What an array dimension may be
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Default)]
enum Dimensions {
    /// Bare integer literals only
    #[default]
    Literal,
    /// Constant expressions over literals and `const` names
    Constant,
}

/// Lints that are off unless requested
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
enum Warning {
    /// Variables that are never read
    Unused,
}

#[derive(ClapParser, Debug)]
#[command(name = "sysyc")]
#[command(author = "SysY Tools Team")]
#[command(version)]
#[command(about = "Semantic checker for the SysY language", long_about = None)]
struct Args {
    /// Input source files (.sy)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Accepted form of array dimensions
    #[arg(long, value_enum, default_value = "literal")]
    dimension_policy: Dimensions,

    /// Report locals and parameters that shadow a global
    #[arg(long)]
    forbid_shadowing: bool,

    /// Enable an optional warning
    #[arg(short = 'W', value_enum)]
    warn: Vec<Warning>,

    /// Report variables that are never read (same as `-W unused`)
    #[arg(long)]
    warn_unused: bool,

    /// Longest accepted chain of unary operators (0 disables the check)
    #[arg(long, default_value_t = AnalyzerConfig::DEFAULT_UNARY_CHAIN_LIMIT)]
    unary_chain_limit: usize,

    /// Nesting bound for constant expressions
    #[arg(long, default_value_t = AnalyzerConfig::DEFAULT_MAX_CONST_DEPTH)]
    max_const_depth: usize,

    /// Treat warnings as errors for the exit status
    #[arg(long)]
    deny_warnings: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Dump AST (for debugging)
    #[arg(long)]
    dump_ast: bool,

    /// Dump tokens (for debugging)
    #[arg(long)]
    dump_tokens: bool,
}

impl Args {
    fn analyzer_config(&self) -> AnalyzerConfig {
        let dimensions = match self.dimension_policy {
            Dimensions::Literal => DimensionPolicy::IntegerLiteral,
            Dimensions::Constant => DimensionPolicy::ConstantExpression,
        };
        let shadowing = if self.forbid_shadowing {
            ShadowingPolicy::Forbid
        } else {
            ShadowingPolicy::Allow
        };
        let unary_limit = (self.unary_chain_limit > 0).then_some(self.unary_chain_limit);

        AnalyzerConfig::default()
            .with_dimensions(dimensions)
            .with_shadowing(shadowing)
            .with_warn_unused(self.warn_unused || self.warn.contains(&Warning::Unused))
            .with_unary_chain_limit(unary_limit)
            .with_max_const_depth(self.max_const_depth)
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("error: {:#}", e);
            process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let default = if verbose { "sysy_checker=debug,sysyc=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact()
        .try_init();
}

/// Check every input; `Ok(false)` when any of them failed
fn run(args: &Args) -> Result<bool> {
    let config = DriverConfig {
        dump_tokens: args.dump_tokens,
        dump_ast: args.dump_ast,
        analyzer: args.analyzer_config(),
    };
    debug!(?config, "configuration");

    let driver = Driver::new(config);
    let mut reporter = DiagnosticReporter::new();
    let mut passed = true;

    for input in &args.inputs {
        let outcome = driver
            .check_file(input, &mut reporter)
            .with_context(|| format!("failed to check {}", input.display()))?;

        if outcome.failed(args.deny_warnings) {
            passed = false;
        }
        info!(
            file = %input.display(),
            errors = outcome.errors,
            warnings = outcome.warnings,
            syntax_error = outcome.syntax_error,
            "checked"
        );
    }

    if args.verbose && passed {
        eprintln!("No errors in {} file(s)", args.inputs.len());
    }

    Ok(passed)
}
