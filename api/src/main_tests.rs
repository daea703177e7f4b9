use super::{Cli, Commands};
use clap::Parser;

#[test]
fn cli_parses_serve_with_snapshot() {
    let cli = Cli::try_parse_from(["api-server", "serve", "--snapshot", "servers.csv"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Serve { snapshot: Some(ref p) } if p.ends_with("servers.csv")
    ));

    let cli = Cli::try_parse_from(["api-server", "serve"]).unwrap();
    assert!(matches!(cli.command, Commands::Serve { snapshot: None }));
}

#[test]
fn cli_requires_import_path() {
    let cli = Cli::try_parse_from(["api-server", "import", "servers.csv"]).unwrap();
    assert!(matches!(cli.command, Commands::Import { .. }));

    assert!(Cli::try_parse_from(["api-server", "import"]).is_err());
    assert!(Cli::try_parse_from(["api-server", "doctor"]).is_ok());
}
