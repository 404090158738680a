use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use manual_core::build_site;
use std::path::Path;
use tracing::warn;

use crate::config::ManualConfig;

pub fn make_subcommand() -> Command {
    super::add_content_args(Command::new("build"))
        .about("Pre-render every page of every collection")
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DIR")
                .help("Output directory for generated site [default: ./out]"),
        )
        .arg(
            Arg::new("theme")
                .short('t')
                .long("theme")
                .value_name("DIR")
                .help("Theme directory [default: ./theme]"),
        )
}

pub fn execute(args: &ArgMatches) -> Result<()> {
    // Load cascading configuration
    let config = ManualConfig::load(args)?;

    let content_dir = config.site.content.root.clone();
    let output_dir = Path::new(&config.build.output);
    let theme_dir = Path::new(&config.build.theme);

    let report = build_site(&config.site, &content_dir, output_dir, theme_dir)?;

    for skipped in &report.skipped {
        warn!("Skipped {}", skipped);
    }
    println!(
        "Built {} pages ({} skipped) in {}",
        report.pages,
        report.skipped.len(),
        output_dir.display()
    );

    Ok(())
}
