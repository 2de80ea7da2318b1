//! CLI argument structs for all commands.
//!
//! Each command has its own argument struct with clap derive attributes
//! for parsing and validation.

use clap::{Parser, Subcommand};

use super::types::{DirectionArg, LifecycleArg};
use super::validators::{validate_description, validate_key, validate_name};
use crate::graph::DEFAULT_MAX_DEPTH;

/// Arguments for the `init` command
#[derive(Parser, Debug, Clone)]
pub struct InitArgs {}

/// Arguments for the `service` command
#[derive(Parser, Debug, Clone)]
pub struct ServiceArgs {
    /// Service subcommand
    #[command(subcommand)]
    pub action: ServiceAction,
}

/// Service management actions
#[derive(Subcommand, Debug, Clone)]
pub enum ServiceAction {
    /// Add a service to the catalog
    Add {
        /// Service name
        #[arg(value_parser = validate_name)]
        name: String,

        /// What the service does
        #[arg(short = 'D', long, value_parser = validate_description, default_value = "")]
        description: String,

        /// System this service belongs to (id or name)
        #[arg(long, value_parser = validate_key)]
        system: Option<String>,

        /// Owning team or person (id or name)
        #[arg(long, value_parser = validate_key)]
        owner: Option<String>,

        /// Lifecycle stage
        #[arg(short = 'l', long, value_enum)]
        lifecycle: Option<LifecycleArg>,

        /// Dependencies (comma-separated service ids or names)
        #[arg(long, value_delimiter = ',')]
        deps: Vec<String>,

        /// Tags (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        tags: Vec<String>,
    },

    /// List services with optional filters
    List {
        /// Filter by system (id or name)
        #[arg(long, value_parser = validate_key)]
        system: Option<String>,

        /// Filter by owner (id or name)
        #[arg(long, value_parser = validate_key)]
        owner: Option<String>,

        /// Filter by lifecycle stage
        #[arg(short = 'l', long, value_enum)]
        lifecycle: Option<LifecycleArg>,

        /// Filter by tag
        #[arg(short, long)]
        tag: Option<String>,

        /// Maximum number of services to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },

    /// Show full details for a service
    Show {
        /// Service id or name
        #[arg(value_parser = validate_key)]
        service: String,
    },

    /// Update an existing service
    Update {
        /// Service id or name
        #[arg(value_parser = validate_key)]
        service: String,

        /// New name
        #[arg(long, value_parser = validate_name)]
        name: Option<String>,

        /// New description
        #[arg(short = 'D', long, value_parser = validate_description)]
        description: Option<String>,

        /// New system (id or name)
        #[arg(long, value_parser = validate_key)]
        system: Option<String>,

        /// New owner (id or name)
        #[arg(long, value_parser = validate_key)]
        owner: Option<String>,

        /// New lifecycle stage
        #[arg(short = 'l', long, value_enum)]
        lifecycle: Option<LifecycleArg>,

        /// Replacement tag set (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        tags: Option<Vec<String>>,
    },

    /// Remove a service from the catalog
    Rm {
        /// Service id or name
        #[arg(value_parser = validate_key)]
        service: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

/// Arguments for the `system` command
#[derive(Parser, Debug, Clone)]
pub struct SystemArgs {
    /// System subcommand
    #[command(subcommand)]
    pub action: SystemAction,
}

/// System management actions
#[derive(Subcommand, Debug, Clone)]
pub enum SystemAction {
    /// Add a system to the catalog
    Add {
        /// System name
        #[arg(value_parser = validate_name)]
        name: String,

        /// What the system encompasses
        #[arg(short = 'D', long, value_parser = validate_description, default_value = "")]
        description: String,

        /// Owning team or person (id or name)
        #[arg(long, value_parser = validate_key)]
        owner: Option<String>,
    },

    /// List all systems
    List {},

    /// Remove a system from the catalog
    Rm {
        /// System id or name
        #[arg(value_parser = validate_key)]
        system: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

/// Arguments for the `owner` command
#[derive(Parser, Debug, Clone)]
pub struct OwnerArgs {
    /// Owner subcommand
    #[command(subcommand)]
    pub action: OwnerAction,
}

/// Owner management actions
#[derive(Subcommand, Debug, Clone)]
pub enum OwnerAction {
    /// Add an owner to the catalog
    Add {
        /// Owner name
        #[arg(value_parser = validate_name)]
        name: String,

        /// Contact or role information
        #[arg(short = 'D', long, value_parser = validate_description, default_value = "")]
        description: String,
    },

    /// List all owners
    List {},

    /// Remove an owner from the catalog
    Rm {
        /// Owner id or name
        #[arg(value_parser = validate_key)]
        owner: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

/// Arguments for the `deps` command
#[derive(Parser, Debug, Clone)]
pub struct DepsArgs {
    /// Dependency subcommand
    #[command(subcommand)]
    pub action: DepsAction,
}

/// Dependency management actions
#[derive(Subcommand, Debug, Clone)]
pub enum DepsAction {
    /// Show the dependency tree around a service
    Tree {
        /// Service id or name
        #[arg(value_parser = validate_key)]
        service: String,

        /// Only walk one direction of the relation
        #[arg(short, long, value_enum)]
        direction: Option<DirectionArg>,

        /// Maximum traversal depth
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        depth: usize,
    },

    /// Add a dependency edge between two services
    Add {
        /// Service that depends on another (id or name)
        #[arg(value_parser = validate_key)]
        from: String,

        /// Dependency target (id or name; stored verbatim if unknown)
        #[arg(value_parser = validate_key)]
        to: String,

        /// Which of the target's APIs is consumed
        #[arg(long)]
        api: Option<String>,

        /// Free-text note about the relationship
        #[arg(short = 'D', long, value_parser = validate_description)]
        description: Option<String>,
    },

    /// Remove a dependency edge between two services
    Rm {
        /// Service that depends on another (id or name)
        #[arg(value_parser = validate_key)]
        from: String,

        /// Dependency target (id or name)
        #[arg(value_parser = validate_key)]
        to: String,
    },
}

/// Arguments for the `orphans` command
#[derive(Parser, Debug, Clone, Default)]
pub struct OrphansArgs {}

/// Arguments for the `lint` command
#[derive(Parser, Debug, Clone, Default)]
pub struct LintArgs {
    /// Only show findings at error severity
    #[arg(long)]
    pub errors_only: bool,
}

/// Arguments for the `search` command
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    /// Text to search for across names, ids, tags, and descriptions
    pub query: String,

    /// Maximum number of hits to display
    #[arg(short = 'n', long, default_value = "20")]
    pub limit: usize,
}

/// Arguments for the `discover` command
#[derive(Parser, Debug, Clone)]
pub struct DiscoverArgs {
    /// Directory tree to scan for service manifests
    pub dir: std::path::PathBuf,

    /// Scan and report without importing anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug, Clone, Default)]
pub struct InfoArgs {}
