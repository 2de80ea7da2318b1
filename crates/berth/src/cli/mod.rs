//! CLI argument parsing and command dispatch.
//!
//! This module provides the command-line interface for berth using clap's
//! derive API. Each command has its own argument struct with validation and
//! helpful error messages.
//!
//! # Commands
//!
//! - `init`: Initialize a new berth repository
//! - `info`: Show repository information
//! - `service`: Add, list, show, update, remove services
//! - `system`: Add, list, remove systems
//! - `owner`: Add, list, remove owners
//! - `deps`: Show the dependency tree; add or remove dependency edges
//! - `orphans`: List services with no dependency edges at all
//! - `lint`: Run catalog integrity checks
//! - `search`: Search records by text
//! - `discover`: Import service manifests from a directory tree
//!
//! # Global Flags
//!
//! - `--json`: output in JSON format (applies to all commands)
//! - `--quiet`: minimal output, record ids only (JSON wins if both given)
//!
//! # Example
//!
//! ```bash
//! berth service add payments --owner platform-team --lifecycle production
//! berth deps add payments auth --api token
//! berth deps tree payments --depth 2
//! berth lint
//! ```

mod args;
mod execute;
mod types;
mod validators;

use anyhow::Result;
use clap::{Parser, Subcommand};

// Re-export argument structs
pub use args::{
    DepsAction, DepsArgs, DiscoverArgs, InfoArgs, InitArgs, LintArgs, OrphansArgs, OwnerAction,
    OwnerArgs, SearchArgs, ServiceAction, ServiceArgs, SystemAction, SystemArgs,
};

// Re-export types
pub use types::{DirectionArg, LifecycleArg};

// Re-export validators for external use
pub use validators::{validate_description, validate_key, validate_name};

/// Berth - a service catalog for small platform teams
///
/// Track services, systems, owners, and the dependencies between them using
/// plain JSONL files in `.berth/` for easy version control integration.
#[derive(Parser, Debug)]
#[command(name = "berth")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Minimal output (record ids only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Initialize a new berth repository
    ///
    /// Creates the `.berth/` directory with configuration and empty record
    /// files. Run this once in your project root.
    Init(InitArgs),

    /// Show repository information
    ///
    /// Displays the data directory and record counts.
    Info(InfoArgs),

    /// Manage services
    ///
    /// Services are the deployable units the catalog tracks; everything
    /// else hangs off them.
    Service(ServiceArgs),

    /// Manage systems
    ///
    /// Systems group related services.
    System(SystemArgs),

    /// Manage owners
    ///
    /// Owners are the teams or people referenced by services and systems.
    Owner(OwnerArgs),

    /// Query and edit dependency edges
    ///
    /// `deps tree` answers "what does X depend on" and "what depends on X";
    /// `deps add`/`deps rm` edit the edges.
    Deps(DepsArgs),

    /// List orphaned services
    ///
    /// Shows services with no dependency edges in either direction.
    Orphans(OrphansArgs),

    /// Run catalog integrity checks
    ///
    /// Reports dangling references, missing owners, duplicate names, empty
    /// systems, and circular dependencies. Exits nonzero if any finding has
    /// error severity.
    Lint(LintArgs),

    /// Search the catalog by text
    ///
    /// Case-insensitive substring search across names, ids, tags, and
    /// descriptions of every record kind.
    Search(SearchArgs),

    /// Import service manifests from a directory tree
    ///
    /// Scans for `*.yaml`/`*.yml` files with `kind: service` and imports
    /// them as catalog records.
    Discover(DiscoverArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    #[must_use]
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    ///
    /// # Errors
    ///
    /// Returns clap's error for invalid arguments.
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// The output mode selected by the global flags.
    #[must_use]
    pub fn output_mode(&self) -> crate::output::OutputMode {
        use crate::output::OutputMode;
        if self.json {
            OutputMode::Json
        } else if self.quiet {
            OutputMode::Quiet
        } else {
            OutputMode::Text
        }
    }

    /// Execute the CLI command
    ///
    /// # Errors
    ///
    /// Propagates command failures; `lint` fails when errors are found.
    pub async fn execute(&self) -> Result<()> {
        use crate::app::App;

        let output_mode = self.output_mode();

        match &self.command {
            Some(Commands::Init(args)) => execute::execute_init(args, self.quiet).await,
            Some(Commands::Info(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_info(&app, args, output_mode).await
            }
            Some(Commands::Service(args)) => {
                let mut app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_service(&mut app, args, output_mode).await
            }
            Some(Commands::System(args)) => {
                let mut app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_system(&mut app, args, output_mode).await
            }
            Some(Commands::Owner(args)) => {
                let mut app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_owner(&mut app, args, output_mode).await
            }
            Some(Commands::Deps(args)) => {
                let mut app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_deps(&mut app, args, output_mode).await
            }
            Some(Commands::Orphans(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_orphans(&app, args, output_mode).await
            }
            Some(Commands::Lint(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_lint(&app, args, output_mode).await
            }
            Some(Commands::Search(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_search(&app, args, output_mode).await
            }
            Some(Commands::Discover(args)) => {
                let mut app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_discover(&mut app, args, output_mode).await
            }
            None => {
                println!("Berth service catalog");
                println!("Use --help for more information");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========== CLI Parsing Tests ==========

    #[test]
    fn parse_no_command() {
        let cli = Cli::try_parse_from(["berth"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.json);
        assert!(!cli.quiet);
    }

    #[test]
    fn parse_global_json_flag() {
        let cli = Cli::try_parse_from(["berth", "--json", "lint"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Some(Commands::Lint(_))));
    }

    #[test]
    fn parse_global_quiet_flag() {
        let cli = Cli::try_parse_from(["berth", "-q", "orphans"]).unwrap();
        assert!(cli.quiet);
        assert!(matches!(cli.command, Some(Commands::Orphans(_))));
    }

    #[test]
    fn json_wins_over_quiet() {
        let cli = Cli::try_parse_from(["berth", "--json", "--quiet", "info"]).unwrap();
        assert_eq!(cli.output_mode(), crate::output::OutputMode::Json);
    }

    #[test]
    fn parse_init() {
        let cli = Cli::try_parse_from(["berth", "init"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Init(_))));
    }

    #[test]
    fn parse_service_add_minimal() {
        let cli = Cli::try_parse_from(["berth", "service", "add", "payments"]).unwrap();
        match cli.command {
            Some(Commands::Service(args)) => match args.action {
                ServiceAction::Add {
                    name,
                    lifecycle,
                    deps,
                    ..
                } => {
                    assert_eq!(name, "payments");
                    assert!(lifecycle.is_none());
                    assert!(deps.is_empty());
                }
                other => panic!("expected Add action, got {other:?}"),
            },
            _ => panic!("expected Service command"),
        }
    }

    #[test]
    fn parse_service_add_full() {
        let cli = Cli::try_parse_from([
            "berth",
            "service",
            "add",
            "payments",
            "--description",
            "Charges cards",
            "--system",
            "billing",
            "--owner",
            "platform-team",
            "--lifecycle",
            "production",
            "--deps",
            "auth,ledger",
            "--tags",
            "critical,pci",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Service(args)) => match args.action {
                ServiceAction::Add {
                    name,
                    description,
                    system,
                    owner,
                    lifecycle,
                    deps,
                    tags,
                } => {
                    assert_eq!(name, "payments");
                    assert_eq!(description, "Charges cards");
                    assert_eq!(system.as_deref(), Some("billing"));
                    assert_eq!(owner.as_deref(), Some("platform-team"));
                    assert_eq!(lifecycle, Some(LifecycleArg::Production));
                    assert_eq!(deps, vec!["auth", "ledger"]);
                    assert_eq!(tags, vec!["critical", "pci"]);
                }
                other => panic!("expected Add action, got {other:?}"),
            },
            _ => panic!("expected Service command"),
        }
    }

    #[test]
    fn parse_service_add_rejects_empty_name() {
        let result = Cli::try_parse_from(["berth", "service", "add", "   "]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_service_list_defaults() {
        let cli = Cli::try_parse_from(["berth", "service", "list"]).unwrap();
        match cli.command {
            Some(Commands::Service(args)) => match args.action {
                ServiceAction::List { limit, system, .. } => {
                    assert_eq!(limit, 50);
                    assert!(system.is_none());
                }
                other => panic!("expected List action, got {other:?}"),
            },
            _ => panic!("expected Service command"),
        }
    }

    #[test]
    fn parse_service_update() {
        let cli = Cli::try_parse_from([
            "berth",
            "service",
            "update",
            "payments",
            "--lifecycle",
            "deprecated",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Service(args)) => match args.action {
                ServiceAction::Update {
                    service, lifecycle, ..
                } => {
                    assert_eq!(service, "payments");
                    assert_eq!(lifecycle, Some(LifecycleArg::Deprecated));
                }
                other => panic!("expected Update action, got {other:?}"),
            },
            _ => panic!("expected Service command"),
        }
    }

    #[test]
    fn parse_service_rm_force() {
        let cli = Cli::try_parse_from(["berth", "service", "rm", "payments", "--force"]).unwrap();
        match cli.command {
            Some(Commands::Service(args)) => match args.action {
                ServiceAction::Rm { service, force } => {
                    assert_eq!(service, "payments");
                    assert!(force);
                }
                other => panic!("expected Rm action, got {other:?}"),
            },
            _ => panic!("expected Service command"),
        }
    }

    #[test]
    fn parse_deps_tree_defaults() {
        let cli = Cli::try_parse_from(["berth", "deps", "tree", "payments"]).unwrap();
        match cli.command {
            Some(Commands::Deps(args)) => match args.action {
                DepsAction::Tree {
                    service,
                    direction,
                    depth,
                } => {
                    assert_eq!(service, "payments");
                    assert!(direction.is_none());
                    assert_eq!(depth, crate::graph::DEFAULT_MAX_DEPTH);
                }
                other => panic!("expected Tree action, got {other:?}"),
            },
            _ => panic!("expected Deps command"),
        }
    }

    #[test]
    fn parse_deps_tree_with_direction_and_depth() {
        let cli = Cli::try_parse_from([
            "berth", "deps", "tree", "payments", "--direction", "up", "--depth", "5",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Deps(args)) => match args.action {
                DepsAction::Tree {
                    direction, depth, ..
                } => {
                    assert_eq!(direction, Some(DirectionArg::Up));
                    assert_eq!(depth, 5);
                }
                other => panic!("expected Tree action, got {other:?}"),
            },
            _ => panic!("expected Deps command"),
        }
    }

    #[test]
    fn parse_deps_add_with_api() {
        let cli = Cli::try_parse_from([
            "berth", "deps", "add", "payments", "auth", "--api", "token",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Deps(args)) => match args.action {
                DepsAction::Add { from, to, api, .. } => {
                    assert_eq!(from, "payments");
                    assert_eq!(to, "auth");
                    assert_eq!(api.as_deref(), Some("token"));
                }
                other => panic!("expected Add action, got {other:?}"),
            },
            _ => panic!("expected Deps command"),
        }
    }

    #[test]
    fn parse_deps_rm() {
        let cli = Cli::try_parse_from(["berth", "deps", "rm", "payments", "auth"]).unwrap();
        match cli.command {
            Some(Commands::Deps(args)) => match args.action {
                DepsAction::Rm { from, to } => {
                    assert_eq!(from, "payments");
                    assert_eq!(to, "auth");
                }
                other => panic!("expected Rm action, got {other:?}"),
            },
            _ => panic!("expected Deps command"),
        }
    }

    #[test]
    fn parse_lint_errors_only() {
        let cli = Cli::try_parse_from(["berth", "lint", "--errors-only"]).unwrap();
        match cli.command {
            Some(Commands::Lint(args)) => assert!(args.errors_only),
            _ => panic!("expected Lint command"),
        }
    }

    #[test]
    fn parse_search_with_limit() {
        let cli = Cli::try_parse_from(["berth", "search", "payments", "-n", "5"]).unwrap();
        match cli.command {
            Some(Commands::Search(args)) => {
                assert_eq!(args.query, "payments");
                assert_eq!(args.limit, 5);
            }
            _ => panic!("expected Search command"),
        }
    }

    #[test]
    fn parse_discover_dry_run() {
        let cli = Cli::try_parse_from(["berth", "discover", "./manifests", "--dry-run"]).unwrap();
        match cli.command {
            Some(Commands::Discover(args)) => {
                assert!(args.dry_run);
                assert_eq!(args.dir, std::path::PathBuf::from("./manifests"));
            }
            _ => panic!("expected Discover command"),
        }
    }

    #[test]
    fn parse_system_and_owner_add() {
        let cli = Cli::try_parse_from(["berth", "system", "add", "billing"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::System(_))));

        let cli = Cli::try_parse_from(["berth", "owner", "add", "platform-team"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Owner(_))));
    }
}
