use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use manual_server::{PageServer, PageServerConfig};
use std::path::PathBuf;

use crate::config::ManualConfig;

pub fn make_subcommand() -> Command {
    super::add_content_args(Command::new("serve"))
        .about("Serve pages straight from the content directory")
        .arg(
            Arg::new("theme")
                .short('t')
                .long("theme")
                .value_name("DIR")
                .help("Theme directory [default: ./theme]"),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Port to serve on [default: 3000]"),
        )
        .arg(
            Arg::new("host")
                .long("host")
                .value_name("HOST")
                .help("Host to bind to [default: 127.0.0.1]"),
        )
        .arg(
            Arg::new("open")
                .long("open")
                .help("Open browser automatically")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-live-reload")
                .long("no-live-reload")
                .help("Do not reload browsers when content changes")
                .action(clap::ArgAction::SetTrue),
        )
}

pub async fn execute(args: &ArgMatches) -> Result<()> {
    // Load cascading configuration
    let config = ManualConfig::load(args)?;
    let build = config.build;

    let server = PageServer::new(PageServerConfig {
        host: build.host,
        port: build.port,
        settings: config.site,
        theme: PathBuf::from(build.theme),
        open: build.open,
        live_reload: build.live_reload,
    });

    server.run().await
}
