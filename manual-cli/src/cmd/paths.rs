use anyhow::{Result, anyhow};
use clap::{Arg, ArgAction, ArgMatches, Command};
use manual_core::{ContentSite, PageMetadata, Slug};
use serde::Serialize;

use crate::config::ManualConfig;

pub fn make_subcommand() -> Command {
    super::add_content_args(Command::new("paths"))
        .about("Print the slugs a build pre-renders for a collection, as JSON")
        .arg(
            Arg::new("collection")
                .required(true)
                .value_parser(["docs", "guides", "examples"])
                .help("Collection to enumerate"),
        )
        .arg(
            Arg::new("metadata")
                .short('m')
                .long("metadata")
                .action(ArgAction::SetTrue)
                .help("Include title, description and keywords for every slug"),
        )
}

#[derive(Serialize)]
struct PathEntry {
    slug: Slug,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<PageMetadata>,
}

pub fn execute(args: &ArgMatches) -> Result<()> {
    let config = ManualConfig::load(args)?;
    let collection = args
        .get_one::<String>("collection")
        .ok_or_else(|| anyhow!("collection is required"))?;
    let with_metadata = args.get_flag("metadata");

    let site = ContentSite::from_config(&config.site);
    let entries: Vec<PathEntry> = site
        .paths(collection)
        .into_iter()
        .map(|path| PathEntry {
            metadata: with_metadata
                .then(|| site.metadata(collection, &path.slug))
                .flatten(),
            slug: path.slug,
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}
