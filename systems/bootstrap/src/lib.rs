#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that prepares the Geocoin experience.

use geocoin_core::Command;
use geocoin_persistence::{LoadOutcome, LoadSource};
use geocoin_world::{query, World};

/// Produces data required to greet the player and resume their session.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Looks up the banner shown when the experience starts.
    #[must_use]
    pub fn welcome_banner(&self, world: &World) -> &'static str {
        query::welcome_banner(world)
    }

    /// Derives the commands that bring a freshly constructed world up to the
    /// persisted session, if one was restored.
    ///
    /// Fresh and discarded-corrupt outcomes yield no commands; the world's
    /// default construction already matches the fresh session.
    #[must_use]
    pub fn commands(&self, outcome: &LoadOutcome) -> Vec<Command> {
        match outcome.source {
            LoadSource::Restored => vec![Command::RestoreSession {
                snapshot: outcome.session.clone(),
            }],
            LoadSource::Fresh | LoadSource::DiscardedCorrupt(_) => Vec::new(),
        }
    }
}
