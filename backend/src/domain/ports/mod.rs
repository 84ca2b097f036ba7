//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod follow_command;
mod follow_graph_query;
mod follow_override_repository;
mod roster_provider;

pub use follow_command::FollowCommand;
#[cfg(test)]
pub use follow_command::MockFollowCommand;
pub use follow_graph_query::{FixtureFollowGraphQuery, FollowGraphQuery};
#[cfg(test)]
pub use follow_graph_query::MockFollowGraphQuery;
#[cfg(test)]
pub use follow_override_repository::MockFollowOverrideRepository;
pub use follow_override_repository::{
    FixtureFollowOverrideRepository, FollowOverrideRepository, FollowOverrideRepositoryError,
};
#[cfg(test)]
pub use roster_provider::MockRosterProvider;
pub use roster_provider::{FixtureRosterProvider, RosterProvider, RosterProviderError};
