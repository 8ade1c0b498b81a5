use super::*;

use crate::common::{render_table, Format};
use crate::monitor::{FingerprintBuilder, IdentityProvider, SysfsProvider};

use std::str::FromStr;
use std::time::Duration;

pub struct Config {
    format: Format,
    root: PathBuf,
    timeout: humantime::Duration,
    verbose: u8,
}

impl TryFrom<&ArgMatches> for Config {
    type Error = String;

    fn try_from(args: &ArgMatches) -> Result<Self, Self::Error> {
        let timeout = match args.get_one::<humantime::Duration>("TIMEOUT") {
            Some(timeout) => *timeout,
            None => humantime::Duration::from_str("5s").map_err(|e| e.to_string())?,
        };

        if Duration::from(timeout).is_zero() {
            return Err("timeout must be greater than 0".into());
        }

        Ok(Config {
            format: args
                .get_one::<String>("FORMAT")
                .map(|f| f.parse::<Format>())
                .transpose()?
                .unwrap_or_default(),
            root: args
                .get_one::<PathBuf>("ROOT")
                .cloned()
                .unwrap_or_else(|| PathBuf::from("/")),
            timeout,
            verbose: *args.get_one::<u8>("VERBOSE").unwrap_or(&0),
        })
    }
}

pub fn command() -> Command {
    Command::new("fingerprint")
        .about("Build the hardware identity fingerprint once and print it")
        .arg(
            clap::Arg::new("FORMAT")
                .long("format")
                .help("Output format")
                .action(clap::ArgAction::Set)
                .value_parser(Format::VALUES)
                .default_value("table"),
        )
        .arg(
            clap::Arg::new("ROOT")
                .long("root")
                .help("Filesystem root to read sysfs and procfs from")
                .action(clap::ArgAction::Set)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            clap::Arg::new("TIMEOUT")
                .long("timeout")
                .help("Per identifier query timeout")
                .action(clap::ArgAction::Set)
                .value_parser(value_parser!(humantime::Duration)),
        )
        .arg(
            clap::Arg::new("VERBOSE")
                .long("verbose")
                .short('v')
                .help("Increase the verbosity")
                .action(clap::ArgAction::Count),
        )
}

/// Builds a single fingerprint the same way the monitor does, prints it,
/// and exits.
pub fn run(config: Config) {
    let mut log = crate::common::debug_log(crate::common::verbosity(config.verbose));

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to launch async runtime");

    let provider: Arc<dyn IdentityProvider> = Arc::new(SysfsProvider::new(&config.root));
    let builder = FingerprintBuilder::new(provider, config.timeout.into());

    let fingerprint = rt.block_on(builder.build());

    match config.format {
        Format::Table => print!("{}", render_table(&fingerprint.rows())),
        Format::Json => match serde_json::to_string_pretty(&fingerprint) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("failed to serialize fingerprint: {e}");
                std::process::exit(1);
            }
        },
    }

    let _ = log.flush();
}
