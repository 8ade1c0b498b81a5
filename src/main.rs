use clap::{value_parser, ArgMatches, Command};
use ringlog::*;

use std::path::PathBuf;
use std::sync::Arc;

mod common;
mod fingerprint;
mod inventory;
mod monitor;

fn main() {
    // parse command line options
    let cli = Command::new(env!("CARGO_BIN_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .long_about(
            "hwidwatch watches a machine's hardware identity (motherboard, disks, \
            network adapters, CPU and GPU) and reports when it changes.",
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(monitor::command())
        .subcommand(inventory::command())
        .subcommand(fingerprint::command())
        .get_matches();

    match cli.subcommand() {
        Some(("monitor", args)) => {
            let config = monitor::Config::try_from(args).unwrap_or_else(|e| {
                eprintln!("error loading config file: {e}");
                std::process::exit(1);
            });

            monitor::run(config)
        }
        Some(("inventory", args)) => {
            let config = inventory::Config::try_from(args).unwrap_or_else(|e| {
                eprintln!("{e}");
                std::process::exit(1);
            });

            inventory::run(config)
        }
        Some(("fingerprint", args)) => {
            let config = fingerprint::Config::try_from(args).unwrap_or_else(|e| {
                eprintln!("{e}");
                std::process::exit(1);
            });

            fingerprint::run(config)
        }
        _ => unreachable!("a subcommand is required"),
    }
}
