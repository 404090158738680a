pub mod build;
pub mod paths;
pub mod serve;

use clap::{Arg, Command};

/// Arguments every command that reads content understands.
pub fn add_content_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("source")
                .short('s')
                .long("source")
                .value_name("DIR")
                .help("Content root containing docs/, guides/ and examples/ [default: ./content]"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file [default: ./manual.toml]"),
        )
        .arg(
            Arg::new("highlight")
                .long("highlight")
                .value_name("THEME")
                .help("Highlight fenced code blocks with this syntect theme"),
        )
}
