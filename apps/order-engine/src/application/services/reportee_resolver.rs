//! Reportee Resolver
//!
//! Expands the manager hierarchy below a user, one hop per round.

use std::collections::BTreeSet;
use std::sync::Arc;

use futures::future::try_join_all;

use crate::application::ports::{DirectoryError, DirectoryPort};
use crate::domain::shared::UserId;

/// Hops walked below the starting user.
///
/// This is the only guard against cycles in the hierarchy: deeper chains
/// are truncated and a cycle is walked at most this many times.
pub const MAX_REPORTEE_DEPTH: usize = 5;

/// Resolves every user reachable below a manager within
/// [`MAX_REPORTEE_DEPTH`] hops.
pub struct ReporteeResolver<D>
where
    D: DirectoryPort,
{
    directory: Arc<D>,
}

impl<D> ReporteeResolver<D>
where
    D: DirectoryPort,
{
    /// Create a new resolver.
    pub const fn new(directory: Arc<D>) -> Self {
        Self { directory }
    }

    /// Deduplicated reportee ids below `manager`.
    ///
    /// Lookups within one hop run concurrently; any failure fails the walk.
    ///
    /// # Errors
    ///
    /// Returns error if a directory lookup fails.
    pub async fn resolve(&self, manager: &UserId) -> Result<BTreeSet<UserId>, DirectoryError> {
        let mut reportees = BTreeSet::new();
        let mut frontier = vec![manager.clone()];

        for hop in 0..MAX_REPORTEE_DEPTH {
            if frontier.is_empty() {
                break;
            }

            let lookups = frontier
                .iter()
                .map(|user| self.directory.direct_reportees(user));
            let next: BTreeSet<UserId> = try_join_all(lookups).await?.into_iter().flatten().collect();

            tracing::trace!(hop, found = next.len(), "Expanded reportee frontier");

            reportees.extend(next.iter().cloned());
            frontier = next.into_iter().collect();
        }

        Ok(reportees)
    }
}
