mod platform;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use engine_logging::{level_from_verbosity, LogDestination};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogTarget {
    File,
    Terminal,
    Both,
}

#[derive(Debug, Parser)]
#[command(name = "artgen")]
#[command(about = "Turn a photo into vector art with the remote image-effects service")]
struct Args {
    /// Image to upload right away
    image: Option<PathBuf>,

    /// RON file overriding the API settings
    #[arg(short, long, default_value = "artgen.ron")]
    config: PathBuf,

    /// Directory downloaded results are saved to
    #[arg(short, long, default_value = "downloads")]
    output_dir: PathBuf,

    /// Where log output goes
    #[arg(long, value_enum, default_value_t = LogTarget::File)]
    log: LogTarget,

    /// Log file used by `--log file` and `--log both`
    #[arg(long, default_value = engine_logging::DEFAULT_LOG_FILE)]
    log_file: PathBuf,

    /// More log detail (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Upload, generate and download without prompting, then exit
    #[arg(long, requires = "image")]
    auto: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let destination = match args.log {
        LogTarget::File => LogDestination::File(args.log_file.clone()),
        LogTarget::Terminal => LogDestination::Terminal,
        LogTarget::Both => LogDestination::Both(args.log_file.clone()),
    };
    engine_logging::initialize(destination, level_from_verbosity(args.verbose));

    let settings = platform::load_settings(&args.config);
    let succeeded = platform::run_app(platform::AppOptions {
        settings,
        output_dir: args.output_dir,
        initial_image: args.image,
        auto: args.auto,
    })?;

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
