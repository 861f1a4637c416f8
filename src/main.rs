use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use rotate::cli::rotate_file;
use rotate::config::validate_chunk_size;
use rotate::{Direction, ReportFormat, RotateOptions, DEFAULT_CHUNK_SIZE};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;

/// Version info from build.rs
const VERSION: &str = env!("ROTATE_VERSION");
const BUILD: &str = env!("ROTATE_BUILD");
const PROFILE: &str = env!("ROTATE_PROFILE");
const GIT_HASH: &str = env!("ROTATE_GIT_HASH");

fn get_version() -> &'static str {
    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();
    VERSION_STRING.get_or_init(|| format!("{} {} build {} ({})", PROFILE, VERSION, BUILD, GIT_HASH))
}

#[derive(Parser)]
#[command(name = "rotate")]
#[command(about = "Rotate every bit of a file one place left or right", long_about = None)]
struct Cli {
    /// Print version
    #[arg(short = 'V', long)]
    version: bool,

    /// Direction to rotate: left or right (any case)
    #[arg(value_parser = parse_direction, required_unless_present = "version")]
    direction: Option<Direction>,

    /// File to rotate
    #[arg(value_name = "FILE_IN", required_unless_present = "version")]
    input: Option<PathBuf>,

    /// Where to write the rotated file (created or truncated)
    #[arg(value_name = "FILE_OUT", required_unless_present = "version")]
    output: Option<PathBuf>,

    /// Bytes read and rotated at a time
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE, value_parser = parse_chunk_size)]
    chunk_size: usize,

    /// Print a summary once done (text or json)
    #[arg(long, value_parser = parse_report)]
    report: Option<ReportFormat>,

    /// Log to stderr (-v info, -vv debug, -vvv per-chunk trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_direction(s: &str) -> Result<Direction, String> {
    s.parse().map_err(|e| format!("{}", e))
}

fn parse_report(s: &str) -> Result<ReportFormat, String> {
    s.parse().map_err(|e| format!("{}", e))
}

fn parse_chunk_size(s: &str) -> Result<usize, String> {
    let size: usize = s.parse().map_err(|e| format!("{}", e))?;
    validate_chunk_size(size).map_err(|e| format!("{}", e))
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::try_parse().unwrap_or_else(|e| {
        // Validation errors (bad direction, bad chunk size) carry no usage line
        if e.kind() == ErrorKind::ValueValidation {
            let _ = e.print();
            eprintln!("\n{}", Cli::command().render_usage());
            std::process::exit(e.exit_code());
        }
        e.exit()
    });

    if cli.version {
        println!("rotate {}", get_version());
        return ExitCode::SUCCESS;
    }

    init_logging(cli.verbose);

    let (Some(direction), Some(input), Some(output)) = (cli.direction, cli.input, cli.output)
    else {
        eprintln!("{}", Cli::command().render_usage());
        return ExitCode::FAILURE;
    };

    let options = RotateOptions {
        chunk_size: cli.chunk_size,
        report: cli.report,
    };

    let result = rotate_file(&input, &output, direction, &options).and_then(|report| {
        if let Some(format) = options.report {
            print!("{}", report.render(format)?);
        }
        Ok(())
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
