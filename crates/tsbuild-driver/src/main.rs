use ariadne::{Color, Label, Report, ReportKind, Source};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::io::{self, BufRead, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;
use tracing_subscriber::EnvFilter;

use tsbuild_deps::ResolverSession;
use tsbuild_diag::{files_with_diagnostics, DiagnosticRecord};
use tsbuild_driver::{BuildNotice, BuildReport, BuildWorker, Settings, Trigger, TscCompiler, SETTINGS_FILE};

#[derive(Parser)]
#[command(
    name = "tsbuild",
    version = "0.1.0",
    about = "Dependency-ordered builds for TypeScript projects",
    long_about = "Orders TypeScript sources so that files declaring types come before\nthe files that use them, runs tsc on that order and reports its diagnostics."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the project once
    Build {
        #[command(flatten)]
        project: ProjectArgs,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Build on every saved file path read from stdin, one per line
    Listen {
        #[command(flatten)]
        project: ProjectArgs,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the compilation order of a source directory (debug)
    Order {
        /// Source directory
        dir: PathBuf,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Parse saved compiler output and show the diagnostics (debug)
    Diagnostics {
        /// File holding compiler stderr, or `-` for stdin
        input: PathBuf,

        /// Directory that relative diagnostic paths are resolved against
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
}

#[derive(Args, Clone)]
struct ProjectArgs {
    /// Project root
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Settings file (default: <root>/tsbuild.json)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Source directory, relative to the root
    #[arg(long)]
    src: Option<String>,

    /// Output file, relative to the root
    #[arg(long)]
    out: Option<String>,

    /// Node executable
    #[arg(long)]
    node: Option<String>,

    /// TypeScript compiler script
    #[arg(long)]
    tsc: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { project, verbose } => {
            init_tracing(verbose);
            build_command(project)
        }
        Commands::Listen { project, verbose } => {
            init_tracing(verbose);
            listen_command(project)
        }
        Commands::Order { dir, verbose } => {
            init_tracing(verbose);
            order_command(dir, verbose)
        }
        Commands::Diagnostics { input, root } => {
            init_tracing(false);
            diagnostics_command(input, root)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(io::stderr)
        .init();
}

/// Canonical project root plus settings with CLI overrides applied
fn load_project(project: ProjectArgs) -> Result<(PathBuf, Settings), String> {
    let root = project
        .root
        .canonicalize()
        .map_err(|e| format!("Error resolving project root {}: {}", project.root.display(), e))?;

    let settings_path = project.settings.unwrap_or_else(|| root.join(SETTINGS_FILE));
    let mut settings = Settings::load(&settings_path).map_err(|e| e.to_string())?;

    if let Some(src) = project.src {
        settings.src = src;
    }
    if let Some(out) = project.out {
        settings.out = out;
    }
    if let Some(node) = project.node {
        settings.node = node;
    }
    if let Some(tsc) = project.tsc {
        settings.tsc = tsc;
    }

    Ok((root, settings))
}

fn spawn_worker(project: ProjectArgs) -> Result<(PathBuf, BuildWorker, std::sync::mpsc::Receiver<BuildNotice>), String> {
    let (root, settings) = load_project(project)?;
    let compiler = TscCompiler::new(settings.node.clone(), settings.tsc.clone());
    let (worker, notices) = BuildWorker::spawn(root.clone(), settings, Box::new(compiler))
        .map_err(|e| format!("Error starting build worker: {}", e))?;
    Ok((root, worker, notices))
}

fn build_command(project: ProjectArgs) -> ExitCode {
    let (root, worker, notices) = match spawn_worker(project) {
        Ok(parts) => parts,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    worker.trigger(Trigger::Requested);
    let notice = notices.recv();
    worker.shutdown();

    match notice {
        Ok(notice) => {
            if report_notice(&root, notice) {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(_) => {
            eprintln!("Build worker stopped without reporting a result");
            ExitCode::FAILURE
        }
    }
}

fn listen_command(project: ProjectArgs) -> ExitCode {
    let (root, worker, notices) = match spawn_worker(project) {
        Ok(parts) => parts,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let reporter = thread::spawn(move || {
        for notice in notices {
            report_notice(&root, notice);
        }
    });

    for line in io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                eprintln!("Error reading save events: {}", e);
                break;
            }
        };
        let saved = line.trim();
        if saved.is_empty() {
            continue;
        }
        if !worker.trigger(Trigger::Saved(PathBuf::from(saved))) {
            break;
        }
    }

    worker.shutdown();
    if reporter.join().is_err() {
        eprintln!("Result reporter panicked");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn order_command(dir: PathBuf, verbose: bool) -> ExitCode {
    let dir = match dir.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error resolving source directory: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut session = ResolverSession::new(dir);
    let order = match session.build_order() {
        Ok(order) => order,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    for (i, path) in order.iter().enumerate() {
        if verbose {
            println!("{:4}. {}", i + 1, path.display());
        } else {
            println!("{}", path.display());
        }
    }
    ExitCode::SUCCESS
}

fn diagnostics_command(input: PathBuf, root: PathBuf) -> ExitCode {
    let mut raw = Vec::new();
    let read = if input.as_os_str() == "-" {
        io::stdin().lock().read_to_end(&mut raw).map(|_| ())
    } else {
        fs::read(&input).map(|bytes| raw = bytes)
    };
    if let Err(e) = read {
        eprintln!("Error reading {}: {}", input.display(), e);
        return ExitCode::FAILURE;
    }

    let records = tsbuild_diag::parse_bytes(&raw);
    for record in &records {
        println!("{}", record);
    }
    if !records.is_empty() {
        render_diagnostics(&root, &records);
    }
    ExitCode::SUCCESS
}

/// Print one build result; returns whether the build counts as successful
fn report_notice(root: &Path, notice: BuildNotice) -> bool {
    let report = match notice.result {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Build error: {}", e);
            return false;
        }
    };

    match &report {
        BuildReport::Skipped => {}
        BuildReport::Succeeded { files } => {
            println!("{} ({} files)", report.status(), files.len());
        }
        BuildReport::Failed { diagnostics, .. } => {
            render_diagnostics(root, diagnostics);
            println!("{}", report.status());
        }
    }
    !report.is_failure()
}

/// Show each diagnostic against its source when the file can be read,
/// then a `file: line` summary
fn render_diagnostics(root: &Path, records: &[DiagnosticRecord]) {
    for file in files_with_diagnostics(records) {
        let source = fs::read_to_string(root.join(file)).ok();
        for record in records.iter().filter(|r| r.file_path() == file) {
            let rendered = source
                .as_deref()
                .is_some_and(|source| report_diagnostic(file, source, record));
            if !rendered {
                eprintln!("{}", record);
            }
        }
    }

    eprintln!();
    for record in records {
        eprintln!("  {:<40} {}", record.location(), record.message);
    }
}

fn report_diagnostic(filename: &str, source: &str, record: &DiagnosticRecord) -> bool {
    let Some(start) = record.char_offset_in(source) else {
        return false;
    };
    let end = (start + 1).min(source.chars().count());
    let span = (filename, start..end);

    let mut report = Report::build(ReportKind::Error, span.clone()).with_message(&record.message);
    if let Some(code) = diagnostic_code(&record.message) {
        report = report.with_code(code);
    }
    report
        .with_label(
            Label::new(span)
                .with_message(format!("line {}, column {}", record.line, record.column))
                .with_color(Color::Red),
        )
        .finish()
        .eprint((filename, Source::from(source)))
        .is_ok()
}

/// `TS2304` out of `error TS2304: Cannot find name 'Foo'.`
fn diagnostic_code(message: &str) -> Option<&str> {
    let rest = message.strip_prefix("error ").unwrap_or(message);
    let (code, _) = rest.split_once(':')?;
    (code.starts_with("TS") && code.len() > 2 && code[2..].bytes().all(|b| b.is_ascii_digit())).then_some(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_code() {
        assert_eq!(diagnostic_code("error TS2304: Cannot find name 'Foo'."), Some("TS2304"));
        assert_eq!(diagnostic_code("TS1005: ';' expected."), Some("TS1005"));
        assert_eq!(diagnostic_code("error: something"), None);
        assert_eq!(diagnostic_code("Cannot find name"), None);
        assert_eq!(diagnostic_code("error TSX: nope"), None);
    }
}
