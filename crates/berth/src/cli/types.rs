//! CLI-facing value enums.
//!
//! Clap's `ValueEnum` derive wants enums it owns; these mirror the domain
//! enums and convert into them, keeping clap attributes out of the domain.

use crate::domain::Lifecycle;
use crate::graph::Direction;
use clap::ValueEnum;

/// Lifecycle stage argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LifecycleArg {
    /// Early development, no stability promises
    Experimental,
    /// Serving real traffic
    Production,
    /// Still running but scheduled for replacement
    Deprecated,
    /// Shut down, kept for record only
    Decommissioned,
}

impl From<LifecycleArg> for Lifecycle {
    fn from(arg: LifecycleArg) -> Self {
        match arg {
            LifecycleArg::Experimental => Lifecycle::Experimental,
            LifecycleArg::Production => Lifecycle::Production,
            LifecycleArg::Deprecated => Lifecycle::Deprecated,
            LifecycleArg::Decommissioned => Lifecycle::Decommissioned,
        }
    }
}

/// Traversal direction argument for `deps tree`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DirectionArg {
    /// Only walk dependents (who depends on this service)
    Up,
    /// Only walk dependencies (what this service depends on)
    Down,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Up => Direction::Up,
            DirectionArg::Down => Direction::Down,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_arg_converts_to_domain() {
        assert_eq!(
            Lifecycle::from(LifecycleArg::Production),
            Lifecycle::Production
        );
        assert_eq!(
            Lifecycle::from(LifecycleArg::Decommissioned),
            Lifecycle::Decommissioned
        );
    }

    #[test]
    fn direction_arg_converts_to_graph_direction() {
        assert_eq!(Direction::from(DirectionArg::Up), Direction::Up);
        assert_eq!(Direction::from(DirectionArg::Down), Direction::Down);
    }
}
