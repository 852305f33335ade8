use clap::{CommandFactory, Parser};
use vaultsort::tooling::cli::{Cli, Commands};

#[test]
fn parse_valid_command_matrix() {
    let cases: Vec<Vec<&str>> = vec![
        vec!["vaultsort", "organize"],
        vec!["vaultsort", "organize", "--dry-run"],
        vec!["vaultsort", "organize", "--format", "json"],
        vec!["vaultsort", "file", "Attachments/x.png"],
        vec!["vaultsort", "prune"],
        vec!["vaultsort", "prune", "--format", "json"],
        vec!["vaultsort", "checksum", "Attachments/x.png"],
        vec!["vaultsort", "watch"],
        vec!["vaultsort", "watch", "--debounce-ms", "250", "--force"],
        vec!["vaultsort", "config"],
        vec!["vaultsort", "--vault", "/tmp/vault", "--log-level", "debug", "organize"],
    ];

    for args in cases {
        let parsed = Cli::try_parse_from(args.clone());
        assert!(parsed.is_ok(), "expected valid parse for args: {args:?}");
    }
}

#[test]
fn parse_rejects_invalid_commands() {
    let cases: Vec<Vec<&str>> = vec![
        vec!["vaultsort"],
        vec!["vaultsort", "file"],
        vec!["vaultsort", "checksum"],
        vec!["vaultsort", "watch", "--debounce-ms", "soon"],
        vec!["vaultsort", "scan"],
    ];

    for args in cases {
        assert!(
            Cli::try_parse_from(args.clone()).is_err(),
            "expected parse failure for args: {args:?}"
        );
    }
}

#[test]
fn parse_defaults() {
    let cli = Cli::try_parse_from(["vaultsort", "organize"]).unwrap();
    assert_eq!(cli.vault, std::path::PathBuf::from("."));
    assert!(cli.config.is_none());
    assert_eq!(
        cli.command,
        Commands::Organize {
            dry_run: false,
            format: "text".to_string()
        }
    );

    let cli = Cli::try_parse_from(["vaultsort", "watch"]).unwrap();
    assert_eq!(
        cli.command,
        Commands::Watch {
            debounce_ms: None,
            force: false
        }
    );
}

#[test]
fn command_definition_is_consistent() {
    Cli::command().debug_assert();
}
