//! Reboot stack CLI

use clap::{Arg, ArgAction, Command};
use reboot_stack::aws;
use std::path::PathBuf;
use tracing::error;

/// Returns the version of the crate.
pub const fn crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Flag for verbose output
const VERBOSE_FLAG: &str = "verbose";

/// Entrypoint for the reboot stack CLI
#[tokio::main]
async fn main() -> std::process::ExitCode {
    // Define application
    let matches = Command::new("reboot-stack")
        .version(crate_version())
        .about("Declare a Lambda function that reboots an EC2 instance and notifies via SNS.")
        .arg(
            Arg::new(VERBOSE_FLAG)
                .short('v')
                .long(VERBOSE_FLAG)
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new(aws::SYNTH_CMD)
                .about("Produce the resource declaration graph from a JSON configuration file.")
                .arg(
                    Arg::new("config")
                        .long("config")
                        .default_value(aws::DEFAULT_CONFIG_PATH)
                        .help("Path to JSON config file")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .help("Write the template to this path instead of stdout")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .default_value("json")
                        .value_parser(["json", "yaml"])
                        .help("Template serialization format"),
                ),
        )
        .subcommand(
            Command::new(aws::BUNDLE_CMD)
                .about("Cross-compile the function source into the deployable artifact.")
                .arg(
                    Arg::new("source")
                        .long("source")
                        .default_value(aws::FUNCTION_SOURCE)
                        .help("Directory containing the function source")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .default_value("build")
                        .help("Directory the artifact is written to")
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
        .get_matches();

    // Create logger
    let level = if matches.get_flag(VERBOSE_FLAG) {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    // Parse subcommands
    match matches.subcommand() {
        Some((aws::SYNTH_CMD, matches)) => {
            let config = matches.get_one::<PathBuf>("config").unwrap();
            let output = matches.get_one::<PathBuf>("output");
            let format = match matches.get_one::<String>("format").unwrap().as_str() {
                "yaml" => aws::Format::Yaml,
                _ => aws::Format::Json,
            };
            if let Err(e) = aws::synth(config, output.map(PathBuf::as_path), format).await {
                error!(error = ?e, "failed to synthesize declaration");
            } else {
                return std::process::ExitCode::SUCCESS;
            }
        }
        Some((aws::BUNDLE_CMD, matches)) => {
            let source = matches.get_one::<PathBuf>("source").unwrap();
            let output = matches.get_one::<PathBuf>("output").unwrap();
            if let Err(e) = aws::bundle(source, output).await {
                error!(error = ?e, "failed to build function artifact");
            } else {
                return std::process::ExitCode::SUCCESS;
            }
        }
        Some((cmd, _)) => {
            error!(cmd, "invalid subcommand");
        }
        None => {
            error!("no subcommand provided");
        }
    }
    std::process::ExitCode::FAILURE
}
