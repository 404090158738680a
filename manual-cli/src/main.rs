mod cmd;
mod config;

use anyhow::{Result, bail};
use clap::{Arg, ArgAction, Command};
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("manual")
        .about("Render docs, guides and examples from Markdown")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log progress and skipped documents"),
        )
        .subcommand(cmd::build::make_subcommand())
        .subcommand(cmd::serve::make_subcommand())
        .subcommand(cmd::paths::make_subcommand())
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();

    // --verbose enables DEBUG for our crates, otherwise RUST_LOG or WARN
    let filter = if matches.get_flag("verbose") {
        EnvFilter::new("info,manual_core=debug,manual_server=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match matches.subcommand() {
        Some(("build", args)) => cmd::build::execute(args),
        Some(("serve", args)) => cmd::serve::execute(args).await,
        Some(("paths", args)) => cmd::paths::execute(args),
        Some((other, _)) => bail!("unknown command '{other}'"),
        None => bail!("no command given"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        cli().debug_assert();
    }

    #[test]
    fn test_paths_requires_known_collection() {
        assert!(cli().try_get_matches_from(["manual", "paths", "blog"]).is_err());
        let matches = cli()
            .try_get_matches_from(["manual", "paths", "guides", "--metadata"])
            .unwrap();
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(name, "paths");
        assert!(args.get_flag("metadata"));
    }
}
