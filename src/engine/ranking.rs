//! Relevance ranking of open rides against a search query.

use std::cmp::Ordering;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    error::ScheduleError,
    models::{ride::RideRecord, search::SearchQuery},
};

/// How many of the two endpoints a ride shares with the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum LocationTier {
    None = 0,
    One = 1,
    Both = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RideScore {
    pub tier: LocationTier,
    /// Absolute distance between the ride's and the desired departure.
    #[serde(serialize_with = "serialize_gap")]
    pub departure_gap: Duration,
}

fn serialize_gap<S: serde::Serializer>(gap: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(gap.num_seconds())
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedRide<'a> {
    pub ride: &'a RideRecord,
    pub score: RideScore,
}

/// Score `ride` against `query`, with `desired_departure` taken from the
/// query's validated window.
pub fn score(ride: &RideRecord, query: &SearchQuery, desired_departure: DateTime<Utc>) -> RideScore {
    let matches = [
        ride.departure.same_place(&query.departure),
        ride.destination.same_place(&query.destination),
    ]
    .into_iter()
    .filter(|hit| *hit)
    .count();
    let tier = match matches {
        2 => LocationTier::Both,
        1 => LocationTier::One,
        _ => LocationTier::None,
    };
    let gap = ride.departure_time - desired_departure;
    RideScore {
        tier,
        departure_gap: if gap < Duration::zero() { -gap } else { gap },
    }
}

/// Rides from `pool` that `query.requester` could join, most relevant first.
pub fn rank<'a>(
    pool: &'a [RideRecord],
    query: &SearchQuery,
) -> Result<Vec<&'a RideRecord>, ScheduleError> {
    Ok(rank_scored(pool, query)?
        .into_iter()
        .map(|ranked| ranked.ride)
        .collect())
}

/// Same ordering as [`rank`], keeping the score of every ride.
pub fn rank_scored<'a>(
    pool: &'a [RideRecord],
    query: &SearchQuery,
) -> Result<Vec<RankedRide<'a>>, ScheduleError> {
    let desired = query.interval()?;

    let mut ranked: Vec<RankedRide<'a>> = pool
        .iter()
        .filter(|ride| match check_record(ride) {
            Ok(()) => true,
            Err(err) => {
                warn!("skipping ride in search: {err}");
                false
            }
        })
        .filter(|ride| is_joinable_by(ride, query))
        .map(|ride| RankedRide {
            ride,
            score: score(ride, query, desired.start()),
        })
        .collect();

    ranked.sort_by(compare);
    debug!(
        pool = pool.len(),
        matches = ranked.len(),
        requester = %query.requester,
        "ranked rides"
    );
    Ok(ranked)
}

fn check_record(ride: &RideRecord) -> Result<(), ScheduleError> {
    if ride.seats < 0 {
        return Err(ScheduleError::MalformedRecord {
            id: ride.id,
            reason: format!("negative seat count {}", ride.seats),
        });
    }
    ride.interval()
        .map(|_| ())
        .map_err(|err| ScheduleError::MalformedRecord {
            id: ride.id,
            reason: err.to_string(),
        })
}

fn is_joinable_by(ride: &RideRecord, query: &SearchQuery) -> bool {
    ride.has_free_seats() && !ride.involves(query.requester)
}

fn compare(a: &RankedRide<'_>, b: &RankedRide<'_>) -> Ordering {
    b.score
        .tier
        .cmp(&a.score.tier)
        .then_with(|| a.score.departure_gap.cmp(&b.score.departure_gap))
        .then_with(|| a.ride.id.cmp(&b.ride.id))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::TimeZone;

    use super::*;
    use crate::models::{
        ride::{Location, RideId},
        user::UserId,
    };

    const REQUESTER: UserId = UserId(100);

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2018, 11, 8, hour, 0, 0).unwrap()
    }

    fn ride(id: i64, from: &str, to: &str, depart: u32) -> RideRecord {
        RideRecord {
            id: RideId(id),
            departure: Location::named(from),
            destination: Location::named(to),
            departure_time: at(depart),
            arrival_time: at(depart + 1),
            seats: 2,
            driver: UserId(id * 10),
            passengers: BTreeSet::new(),
        }
    }

    fn query(from: &str, to: &str, depart: u32) -> SearchQuery {
        SearchQuery {
            departure: Location::named(from),
            destination: Location::named(to),
            departure_time: at(depart),
            arrival_time: at(depart + 2),
            requester: REQUESTER,
        }
    }

    fn ids(rides: &[&RideRecord]) -> Vec<i64> {
        rides.iter().map(|ride| ride.id.0).collect()
    }

    #[test]
    fn exact_and_close_beats_exact_and_late_beats_partial() {
        let pool = vec![
            ride(1, "Lund", "Malmö", 9),
            ride(2, "Lund", "Helsingborg", 9),
            ride(3, "Lund", "Malmö", 11),
        ];
        let ranked = rank(&pool, &query("Lund", "Malmö", 9)).unwrap();
        assert_eq!(ids(&ranked), vec![1, 3, 2]);
    }

    #[test]
    fn unrelated_routes_stay_eligible_but_come_last() {
        let pool = vec![ride(1, "Kiruna", "Umeå", 9), ride(2, "Lund", "Umeå", 13)];
        let ranked = rank_scored(&pool, &query("Lund", "Malmö", 9)).unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].ride.id, RideId(2));
        assert_eq!(ranked[0].score.tier, LocationTier::One);
        assert_eq!(ranked[1].score.tier, LocationTier::None);
    }

    #[test]
    fn time_gap_is_absolute() {
        let pool = vec![ride(1, "Lund", "Malmö", 7), ride(2, "Lund", "Malmö", 10)];
        let ranked = rank_scored(&pool, &query("Lund", "Malmö", 9)).unwrap();
        assert_eq!(ranked[0].ride.id, RideId(2));
        assert_eq!(ranked[0].score.departure_gap, Duration::hours(1));
        assert_eq!(ranked[1].score.departure_gap, Duration::hours(2));
    }

    #[test]
    fn full_rides_are_excluded() {
        let mut full = ride(1, "Lund", "Malmö", 9);
        full.seats = 0;
        let pool = vec![full, ride(2, "Kiruna", "Umeå", 20)];
        assert_eq!(ids(&rank(&pool, &query("Lund", "Malmö", 9)).unwrap()), vec![2]);
    }

    #[test]
    fn own_and_joined_rides_are_excluded() {
        let mut own = ride(1, "Lund", "Malmö", 9);
        own.driver = REQUESTER;
        let mut joined = ride(2, "Lund", "Malmö", 9);
        joined.passengers.insert(REQUESTER);
        let pool = vec![own, joined, ride(3, "Lund", "Malmö", 9)];
        assert_eq!(ids(&rank(&pool, &query("Lund", "Malmö", 9)).unwrap()), vec![3]);
    }

    #[test]
    fn ties_fall_back_to_ascending_id() {
        let pool = vec![
            ride(9, "Lund", "Malmö", 9),
            ride(4, "Lund", "Malmö", 9),
            ride(6, "Lund", "Malmö", 9),
        ];
        assert_eq!(
            ids(&rank(&pool, &query("Lund", "Malmö", 9)).unwrap()),
            vec![4, 6, 9]
        );
    }

    #[test]
    fn ranking_is_deterministic_and_leaves_pool_untouched() {
        let pool = vec![
            ride(5, "Lund", "Malmö", 12),
            ride(2, "Malmö", "Lund", 9),
            ride(3, "Lund", "Ystad", 8),
            ride(1, "Lund", "Malmö", 6),
        ];
        let before = pool.clone();
        let q = query("Lund", "Malmö", 9);
        let first = serde_json::to_string(&rank(&pool, &q).unwrap()).unwrap();
        let second = serde_json::to_string(&rank(&pool, &q).unwrap()).unwrap();
        assert_eq!(first, second);
        assert_eq!(pool, before);
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let mut negative = ride(1, "Lund", "Malmö", 9);
        negative.seats = -1;
        let mut backwards = ride(2, "Lund", "Malmö", 9);
        backwards.arrival_time = at(8);
        let pool = vec![negative, backwards, ride(3, "Lund", "Malmö", 9)];
        assert_eq!(ids(&rank(&pool, &query("Lund", "Malmö", 9)).unwrap()), vec![3]);
    }

    #[test]
    fn malformed_query_window_is_rejected() {
        let mut q = query("Lund", "Malmö", 9);
        q.arrival_time = q.departure_time;
        assert!(matches!(
            rank(&[ride(1, "Lund", "Malmö", 9)], &q),
            Err(ScheduleError::InvalidInterval { .. })
        ));
    }

    #[test]
    fn empty_pool_gives_empty_result() {
        assert!(rank(&[], &query("Lund", "Malmö", 9)).unwrap().is_empty());
    }
}
