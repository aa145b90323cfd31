//! Time-conflict checks between a candidate ride and the rides a user is
//! already committed to.

use crate::{
    error::ScheduleError,
    models::{interval::TimeInterval, ride::RideRecord, user::UserId},
};

/// Whether `candidate` overlaps any of `committed`.
///
/// Windows that only share an endpoint are not in conflict, so back-to-back
/// rides are allowed. An empty `committed` set is never busy.
pub fn is_busy(candidate: &TimeInterval, committed: &[TimeInterval]) -> bool {
    first_conflict(candidate, committed).is_some()
}

/// The first committed window that `candidate` overlaps, if any.
pub fn first_conflict<'a>(
    candidate: &TimeInterval,
    committed: &'a [TimeInterval],
) -> Option<&'a TimeInterval> {
    committed.iter().find(|window| candidate.overlaps(window))
}

/// Windows of every ride in `rides` that `user` drives or rides in.
pub fn committed_intervals(
    user: UserId,
    rides: &[RideRecord],
) -> Result<Vec<TimeInterval>, ScheduleError> {
    rides
        .iter()
        .filter(|ride| ride.involves(user))
        .map(RideRecord::interval)
        .collect()
}

/// Whether taking part in `candidate` would clash with `user`'s other rides.
///
/// `candidate` itself is ignored if it already shows up in `rides`.
pub fn is_user_busy(
    candidate: &RideRecord,
    user: UserId,
    rides: &[RideRecord],
) -> Result<bool, ScheduleError> {
    Ok(find_user_conflict(candidate, user, rides)?.is_some())
}

/// Like [`is_user_busy`], but names the ride that clashes.
pub fn find_user_conflict<'a>(
    candidate: &RideRecord,
    user: UserId,
    rides: &'a [RideRecord],
) -> Result<Option<&'a RideRecord>, ScheduleError> {
    let window = candidate.interval()?;
    conflicting_ride(
        &window,
        user,
        rides.iter().filter(|ride| ride.id != candidate.id),
    )
}

/// The first ride among `rides` involving `user` whose window overlaps
/// `window`.
pub fn conflicting_ride<'a>(
    window: &TimeInterval,
    user: UserId,
    rides: impl IntoIterator<Item = &'a RideRecord>,
) -> Result<Option<&'a RideRecord>, ScheduleError> {
    for ride in rides.into_iter().filter(|ride| ride.involves(user)) {
        if window.overlaps(&ride.interval()?) {
            return Ok(Some(ride));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::{DateTime, Duration, TimeZone, Utc};
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;
    use crate::models::ride::{Location, RideId};

    fn t(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2018, 11, 8, 0, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    fn iv(start: i64, end: i64) -> TimeInterval {
        TimeInterval::new(t(start), t(end)).unwrap()
    }

    // The original four-clause check, kept as a regression oracle.
    fn legacy_is_busy(ride: &TimeInterval, this: &TimeInterval) -> bool {
        let (ride_d, ride_a) = (ride.start(), ride.end());
        let (this_d, this_a) = (this.start(), this.end());
        ride_d < this_d && ride_a > this_d && ride_a < this_a
            || ride_d > this_d && ride_a < this_a
            || ride_d > this_d && ride_d < this_a && ride_a > this_a
            || ride_d < this_d && ride_a > this_a
    }

    fn ride(id: i64, start: i64, end: i64, driver: i64, passengers: &[i64]) -> RideRecord {
        RideRecord {
            id: RideId(id),
            departure: Location::named("Lund"),
            destination: Location::named("Malmö"),
            departure_time: t(start),
            arrival_time: t(end),
            seats: 3,
            driver: UserId(driver),
            passengers: passengers.iter().copied().map(UserId).collect::<BTreeSet<_>>(),
        }
    }

    #[test]
    fn touching_is_not_overlapping() {
        assert!(!is_busy(&iv(0, 10), &[iv(10, 20)]));
        assert!(!is_busy(&iv(10, 20), &[iv(0, 10)]));
    }

    #[test]
    fn strict_containment_conflicts_both_ways() {
        assert!(is_busy(&iv(5, 25), &[iv(10, 20)]));
        assert!(is_busy(&iv(10, 20), &[iv(5, 25)]));
    }

    #[test]
    fn partial_overlap_conflicts() {
        assert!(is_busy(&iv(0, 15), &[iv(10, 25)]));
        assert!(is_busy(&iv(10, 25), &[iv(0, 15)]));
    }

    #[test]
    fn disjoint_windows_do_not_conflict() {
        assert!(!is_busy(&iv(0, 5), &[iv(10, 15)]));
    }

    #[test]
    fn empty_commitments_are_never_busy() {
        assert!(!is_busy(&iv(0, 5), &[]));
    }

    #[test]
    fn any_single_overlap_makes_the_user_busy() {
        let committed = [iv(0, 5), iv(30, 40), iv(60, 90)];
        assert!(is_busy(&iv(35, 50), &committed));
        assert_eq!(first_conflict(&iv(35, 50), &committed), Some(&iv(30, 40)));
        assert!(!is_busy(&iv(40, 60), &committed));
    }

    #[test]
    fn identical_windows_conflict() {
        // The legacy check missed shared endpoints; the canonical rule does not.
        assert!(is_busy(&iv(0, 10), &[iv(0, 10)]));
        assert!(is_busy(&iv(0, 10), &[iv(0, 5)]));
        assert!(!legacy_is_busy(&iv(0, 10), &iv(0, 10)));
    }

    #[test]
    fn overlap_is_symmetric() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..2_000 {
            let a_start = rng.gen_range(0..200);
            let a = iv(a_start, a_start + rng.gen_range(1..80));
            let b_start = rng.gen_range(0..200);
            let b = iv(b_start, b_start + rng.gen_range(1..80));
            assert_eq!(is_busy(&a, &[b]), is_busy(&b, &[a]), "{a:?} vs {b:?}");
        }
    }

    #[test]
    fn agrees_with_legacy_four_case_check() {
        let mut rng = StdRng::seed_from_u64(2018);
        let mut checked = 0;
        while checked < 5_000 {
            let a_start = rng.gen_range(0..300);
            let a_end = a_start + rng.gen_range(1..120);
            let b_start = rng.gen_range(0..300);
            let b_end = b_start + rng.gen_range(1..120);
            // The legacy check used strict comparisons only, so it is the
            // reference only where no two endpoints coincide.
            let endpoints = [a_start, a_end, b_start, b_end];
            let distinct = endpoints
                .iter()
                .enumerate()
                .all(|(i, x)| endpoints[i + 1..].iter().all(|y| x != y));
            if !distinct {
                continue;
            }
            let (a, b) = (iv(a_start, a_end), iv(b_start, b_end));
            assert_eq!(is_busy(&a, &[b]), legacy_is_busy(&a, &b), "{a:?} vs {b:?}");
            checked += 1;
        }
    }

    #[test]
    fn committed_windows_cover_driving_and_riding() {
        let rides = [
            ride(1, 0, 60, 1, &[]),
            ride(2, 120, 180, 2, &[1]),
            ride(3, 300, 360, 2, &[3]),
        ];
        let windows = committed_intervals(UserId(1), &rides).unwrap();
        assert_eq!(windows, vec![iv(0, 60), iv(120, 180)]);
    }

    #[test]
    fn user_busy_checks_every_commitment() {
        let rides = [ride(1, 0, 60, 1, &[]), ride(2, 120, 180, 2, &[1])];
        let candidate = ride(9, 150, 200, 5, &[]);
        assert!(is_user_busy(&candidate, UserId(1), &rides).unwrap());
        assert_eq!(
            find_user_conflict(&candidate, UserId(1), &rides)
                .unwrap()
                .map(|r| r.id),
            Some(RideId(2))
        );
        assert!(!is_user_busy(&candidate, UserId(4), &rides).unwrap());
    }

    #[test]
    fn candidate_does_not_conflict_with_itself() {
        let rides = [ride(1, 0, 60, 1, &[2])];
        assert!(!is_user_busy(&rides[0], UserId(2), &rides).unwrap());
    }

    #[test]
    fn malformed_windows_fail_fast() {
        let candidate = ride(9, 60, 60, 5, &[]);
        assert!(matches!(
            is_user_busy(&candidate, UserId(1), &[]),
            Err(ScheduleError::InvalidInterval { .. })
        ));

        let rides = [ride(1, 50, 10, 1, &[])];
        let candidate = ride(9, 0, 30, 5, &[]);
        assert!(matches!(
            is_user_busy(&candidate, UserId(1), &rides),
            Err(ScheduleError::InvalidInterval { .. })
        ));
        assert!(committed_intervals(UserId(1), &rides).is_err());
    }
}
