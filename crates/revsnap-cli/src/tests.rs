use super::*;

#[test]
fn parses_db_ping_command() {
    let cli = Cli::try_parse_from(["revsnap", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn parses_db_migrate_command() {
    let cli = Cli::try_parse_from(["revsnap", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn parses_db_seed_command() {
    let cli = Cli::try_parse_from(["revsnap", "db", "seed"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Seed
        })
    ));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["revsnap"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn snapshots_generate_defaults_to_current_week_for_all_brands() {
    let cli = Cli::try_parse_from(["revsnap", "snapshots", "generate"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Snapshots {
            command: SnapshotCommands::Generate {
                brand: None,
                historical: false,
                dry_run: false,
            }
        })
    ));
}

#[test]
fn snapshots_generate_with_brand_filter() {
    let cli =
        Cli::try_parse_from(["revsnap", "snapshots", "generate", "--brand", "acme"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Snapshots {
            command: SnapshotCommands::Generate {
                brand: Some(ref b),
                ..
            }
        }) if b == "acme"
    ));
}

#[test]
fn snapshots_generate_historical_dry_run() {
    let cli = Cli::try_parse_from([
        "revsnap",
        "snapshots",
        "generate",
        "--historical",
        "--dry-run",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Snapshots {
            command: SnapshotCommands::Generate {
                brand: None,
                historical: true,
                dry_run: true,
            }
        })
    ));
}

#[test]
fn snapshots_show_defaults_limit() {
    let cli = Cli::try_parse_from(["revsnap", "snapshots", "show", "--brand", "acme"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Snapshots {
            command: SnapshotCommands::Show {
                ref brand,
                limit: 10,
            }
        }) if brand == "acme"
    ));
}

#[test]
fn snapshots_show_with_limit() {
    let cli = Cli::try_parse_from([
        "revsnap", "snapshots", "show", "--brand", "acme", "--limit", "4",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Snapshots {
            command: SnapshotCommands::Show { limit: 4, .. }
        })
    ));
}

#[test]
fn snapshots_show_requires_brand() {
    assert!(Cli::try_parse_from(["revsnap", "snapshots", "show"]).is_err());
}

#[test]
fn languages_analyze_optional_brand() {
    let cli = Cli::try_parse_from(["revsnap", "languages", "analyze"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Languages {
            command: LanguageCommands::Analyze { brand: None }
        })
    ));

    let cli =
        Cli::try_parse_from(["revsnap", "languages", "analyze", "--brand", "acme"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Languages {
            command: LanguageCommands::Analyze { brand: Some(ref b) }
        }) if b == "acme"
    ));
}

#[test]
fn snapshots_list_brands_takes_no_arguments() {
    let cli = Cli::try_parse_from(["revsnap", "snapshots", "list-brands"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Snapshots {
            command: SnapshotCommands::ListBrands
        })
    ));
}

#[test]
fn languages_compare_defaults_to_top_five() {
    let cli = Cli::try_parse_from(["revsnap", "languages", "compare"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Languages {
            command: LanguageCommands::Compare { top: 5 }
        })
    ));

    let cli = Cli::try_parse_from(["revsnap", "languages", "compare", "--top", "3"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Languages {
            command: LanguageCommands::Compare { top: 3 }
        })
    ));
}

#[test]
fn reviews_audit_ratings_defaults_limit() {
    let cli = Cli::try_parse_from(["revsnap", "reviews", "audit-ratings"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Reviews {
            command: ReviewCommands::AuditRatings { limit: 50 }
        })
    ));
}

#[test]
fn unknown_subcommand_is_rejected() {
    assert!(Cli::try_parse_from(["revsnap", "collect", "products"]).is_err());
}
