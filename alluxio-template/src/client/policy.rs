//! Worker placement policies for reads and writes.

use crate::consts::{MOST_AVAILABLE_FIRST, NON_SPECIFIED_WORKER};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationPolicy {
    MostAvailableFirst,
    SpecificHost(String),
}

/// Resolves a target-worker string into an explicit policy.
///
/// `None` leaves the choice to the client. Every string other than the two
/// sentinels is taken as a worker hostname.
pub fn resolve_location_policy(target: &str) -> Option<LocationPolicy> {
    match target {
        "" | NON_SPECIFIED_WORKER => None,
        MOST_AVAILABLE_FIRST => Some(LocationPolicy::MostAvailableFirst),
        host => Some(LocationPolicy::SpecificHost(host.to_string())),
    }
}
