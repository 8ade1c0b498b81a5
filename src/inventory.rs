use super::*;

use crate::common::{render_table, Format};
use systeminfo::SystemInfo;

pub struct Config {
    format: Format,
    root: PathBuf,
    verbose: u8,
}

impl TryFrom<&ArgMatches> for Config {
    type Error = String;

    fn try_from(args: &ArgMatches) -> Result<Self, Self::Error> {
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
            verbose: *args.get_one::<u8>("VERBOSE").unwrap_or(&0),
        })
    }
}

pub fn command() -> Command {
    Command::new("inventory")
        .about("Display the system inventory")
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
            clap::Arg::new("VERBOSE")
                .long("verbose")
                .short('v')
                .help("Increase the verbosity")
                .action(clap::ArgAction::Count),
        )
}

/// Collects the inventory once, prints it, and exits.
pub fn run(config: Config) {
    let mut log = crate::common::debug_log(crate::common::verbosity(config.verbose));

    debug!("collecting inventory from: {:?}", config.root);

    let info = SystemInfo::new(&config.root);

    match config.format {
        Format::Table => print!("{}", render_table(&info.entries())),
        Format::Json => match serde_json::to_string_pretty(&info) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("failed to serialize inventory: {e}");
                std::process::exit(1);
            }
        },
    }

    let _ = log.flush();
}
