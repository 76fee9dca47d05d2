//! EFX Compiler - EFX expression and template translator
//!
//! Usage: efxc --symbols <symbols.toml> [OPTIONS] <input> [-o <output>]

use anyhow::{anyhow, bail, Context as _};
use clap::{Parser as ClapParser, ValueEnum};
use efx_compiler::common::{DiagnosticReporter, TranslateResult};
use efx_compiler::config::{ErrorMode, TranslatorOptions};
use efx_compiler::driver::{ComponentRegistry, Translator};
use efx_compiler::frontend::parser::{parse_expression_input, parse_line, scan_lines};
use efx_compiler::frontend::translate::indent::line_depths;
use efx_sdk::SymbolTable;
use std::fs;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

/// Input kind
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Default)]
enum Mode {
    /// Indented template lines
    #[default]
    Template,
    /// A single `{context} ${expression}` line
    Expression,
}

#[derive(ClapParser, Debug)]
#[command(name = "efxc")]
#[command(author = "EFX Toolkit Team")]
#[command(version)]
#[command(about = "Translate EFX expressions and templates into XPath-based scripts", long_about = None)]
struct Args {
    /// Input file (.efx)
    #[arg(required = true)]
    input: PathBuf,

    /// Symbol table (TOML)
    #[arg(long, required = true)]
    symbols: PathBuf,

    /// Translator configuration (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SDK version, overriding the configuration (e.g. eforms-sdk-1.0, 0.7)
    #[arg(long)]
    sdk: Option<String>,

    /// Input kind
    #[arg(short, long, value_enum, default_value = "template")]
    mode: Mode,

    /// Keep translating sibling statements after an error
    #[arg(long)]
    permissive: bool,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Dump AST (for debugging)
    #[arg(long)]
    dump_ast: bool,

    /// Dump IR (for debugging)
    #[arg(long)]
    dump_ir: bool,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("error: {:#}", e);
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Report a translation error against the input file
fn diagnose<T>(
    reporter: &DiagnosticReporter,
    file_id: usize,
    result: TranslateResult<T>,
) -> anyhow::Result<T> {
    result.map_err(|e| {
        reporter.report_error(file_id, &e);
        anyhow!("translation failed")
    })
}

fn run(args: &Args) -> anyhow::Result<()> {
    // Read input file
    let source = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let filename = args.input.display().to_string();

    // Set up diagnostic reporter
    let mut reporter = DiagnosticReporter::new();
    let file_id = reporter.add_file(&filename, &source);

    let mut options = match &args.config {
        Some(path) => TranslatorOptions::from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => TranslatorOptions::default(),
    };
    if let Some(sdk) = &args.sdk {
        options = options.with_sdk_version(sdk.as_str());
    }
    if args.permissive {
        options = options.with_error_mode(ErrorMode::Permissive);
    }

    let symbols = SymbolTable::load(&args.symbols)
        .with_context(|| format!("failed to load symbols from {}", args.symbols.display()))?;

    if args.verbose {
        eprintln!(
            "Translating {} ({:?}, SDK {})",
            args.input.display(),
            args.mode,
            options.sdk_version
        );
    }

    if args.dump_ast {
        eprintln!("=== AST ===");
        diagnose(&reporter, file_id, dump_ast(&source, args.mode))?;
        eprintln!("=== End AST ===\n");
    }

    let registry = ComponentRegistry::with_defaults();
    let translator = diagnose(&reporter, file_id, Translator::new(&symbols, &registry, options))?;

    let (output, failures) = match args.mode {
        Mode::Expression => {
            let script = diagnose(&reporter, file_id, translator.translate_expression(&source))?;
            (script, 0)
        }
        Mode::Template => {
            let mut sink = translator.error_sink();
            let module = diagnose(&reporter, file_id, translator.build_template(&source, sink.as_mut()))?;
            if args.dump_ir {
                eprintln!("=== IR ===");
                eprintln!("{:#?}", module);
                eprintln!("=== End IR ===\n");
            }
            for error in sink.errors() {
                reporter.report_error(file_id, error);
            }
            (translator.render(&module), sink.errors().len())
        }
    };

    // Write output
    match &args.output {
        Some(path) => fs::write(path, format!("{}\n", output))
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{}", output),
    }

    if failures > 0 {
        bail!("{} statement(s) could not be translated", failures);
    }

    if args.verbose {
        if let Some(path) = &args.output {
            eprintln!("Successfully translated to {}", path.display());
        }
    }

    Ok(())
}

fn dump_ast(source: &str, mode: Mode) -> TranslateResult<()> {
    match mode {
        Mode::Expression => {
            let (context, expr) = parse_expression_input(source)?;
            eprintln!("{:#?}", context);
            eprintln!("{:#?}", expr);
        }
        Mode::Template => {
            let lines = scan_lines(source);
            let depths = line_depths(&lines)?;
            for (raw, depth) in lines.iter().zip(depths) {
                eprintln!("{:#?}", parse_line(raw, depth)?);
            }
        }
    }
    Ok(())
}
