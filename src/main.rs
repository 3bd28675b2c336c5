use clap::{ArgAction, Parser};
use mockable::discovery::{self, Target};
use mockable::{MockableError, Options, Outcome, RewriteDriver};
use std::ffi::OsString;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Exit status for every fatal condition
const EXIT_FAILURE: i32 = 2;

/// Flags that `go generate` directives spell with a single dash
const GO_FLAGS: &[&str] = &["interface", "filename", "dir", "stdout", "json", "synchronized"];

#[derive(Parser)]
#[command(name = "mockable")]
#[command(about = "Mockable - put the free functions of a Go file behind a swappable interface")]
struct Cli {
    /// Name of the interface to create
    #[arg(long)]
    interface: String,

    /// Go file to rewrite (defaults to $GOFILE, set by go generate)
    #[arg(long, env = "GOFILE")]
    filename: String,

    /// Package directory holding the file
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// Print the rewritten file instead of replacing it
    #[arg(long)]
    stdout: bool,

    /// Print a JSON report instead of replacing the file
    #[arg(long, conflicts_with = "stdout")]
    json: bool,

    /// Guard the swappable variable with a sync.RWMutex
    #[arg(long)]
    synchronized: bool,

    /// More logging (-v for debug, -vv for trace); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse_from(normalize_go_flags(std::env::args_os()));
    init_tracing(cli.verbose);

    let options = Options::new(&cli.interface, &cli.filename).synchronized(cli.synchronized);
    let start = Instant::now();

    let driver = RewriteDriver::new(&options).unwrap_or_else(|e| fail(&e, None));
    let target = discovery::locate(&cli.dir, &options.file_name).unwrap_or_else(|e| fail(&e, None));
    let outcome = driver
        .run(&target.source)
        .unwrap_or_else(|e| fail(&e, Some(&target)));

    if cli.json {
        println!("{}", serde_json::to_string(&outcome).unwrap());
        return;
    }

    match outcome {
        Outcome::AlreadyPresent { interface } => {
            if cli.stdout {
                print!("{}", target.source);
            }
            print_notice(&format!(
                "{} already declares interface {}, nothing to do",
                target.path.display(),
                interface
            ));
        }
        Outcome::Rewritten(rewrite) => {
            if cli.stdout {
                print!("{}", rewrite.code);
                return;
            }
            target
                .write(&rewrite.code)
                .unwrap_or_else(|e| fail(&e, None));
            print_generated(&target.path.display().to_string());
            print_summary(&rewrite.report.interface, rewrite.report.promoted.len(), start.elapsed());
        }
    }
}

/// Accept the single-dash long flags Go tools use (`-interface=Foo`)
fn normalize_go_flags(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    args.into_iter()
        .map(|arg| {
            let Some(text) = arg.to_str() else {
                return arg;
            };
            let Some(flag) = text.strip_prefix('-') else {
                return arg;
            };
            if flag.starts_with('-') {
                return arg;
            }
            let name = flag.split('=').next().unwrap_or(flag);
            if GO_FLAGS.contains(&name) {
                OsString::from(format!("-{}", text))
            } else {
                arg
            }
        })
        .collect()
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "mockable=warn",
        1 => "mockable=debug",
        _ => "mockable=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn fail(err: &MockableError, target: Option<&Target>) -> ! {
    let (source, filename) = match target {
        Some(t) => (t.source.as_str(), t.file_name()),
        None => ("", String::new()),
    };
    if io::stderr().is_terminal() {
        eprint!("{}", err.render_color(source, &filename));
    } else {
        eprint!("{}", err.render(source, &filename));
    }
    process::exit(EXIT_FAILURE);
}

fn print_generated(path: &str) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("  \x1b[32m✓\x1b[0m {}", path);
    } else {
        eprintln!("  ✓ {}", path);
    }
}

fn print_notice(message: &str) {
    if io::stderr().is_terminal() {
        eprintln!("  \x1b[33m•\x1b[0m {}", message);
    } else {
        eprintln!("  • {}", message);
    }
}

fn print_summary(interface: &str, count: usize, elapsed: std::time::Duration) {
    let is_tty = io::stderr().is_terminal();
    let time_str = format_duration(elapsed);
    let functions_word = if count == 1 { "function" } else { "functions" };

    if is_tty {
        eprintln!(
            "\n\x1b[1m✨ Put {} {} behind {} in {}\x1b[0m",
            count, functions_word, interface, time_str
        );
    } else {
        eprintln!("\n✨ Put {} {} behind {} in {}", count, functions_word, interface, time_str);
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let micros = d.as_micros();
    if micros < 1000 {
        format!("{}μs", micros)
    } else if micros < 1_000_000 {
        format!("{:.1}ms", micros as f64 / 1000.0)
    } else {
        format!("{:.2}s", d.as_secs_f64())
    }
}
