//! Pure scheduling logic: conflict detection and relevance ranking. Nothing
//! in here does I/O or mutates a ride.

pub mod conflict;
pub mod ranking;

pub use conflict::{
    committed_intervals, conflicting_ride, find_user_conflict, first_conflict, is_busy,
    is_user_busy,
};
pub use ranking::{rank, rank_scored, LocationTier, RankedRide, RideScore};
