extern crate pretty_env_logger as pel;

use approx::assert_abs_diff_eq;
use rstest::*;
use satnav::md::{CancelToken, ExtremalSearchStrategy, SearchSettings, TemporalSearch};
use satnav::time::{Duration, Unit};
use satnav::SearchError;

use crate::{one_orbit, AnalyticEphemeris, Body, LEO_PERIOD_S, LEO_RADIUS_KM, MOON_DISTANCE_KM};

#[fixture]
fn ephem() -> AnalyticEphemeris {
    AnalyticEphemeris::new(crate::test_epoch())
}

fn search(ephem: &AnalyticEphemeris, step: Duration) -> TemporalSearch<'_, AnalyticEphemeris> {
    TemporalSearch::new(
        ephem,
        Body::Satellite,
        Body::Moon,
        Body::Earth,
        SearchSettings::builder().step(step).build(),
    )
}

#[rstest]
fn closest_approach_over_one_orbit(ephem: AnalyticEphemeris) {
    crate::init_logger();
    let (start, end) = one_orbit();
    let extremum = search(&ephem, Unit::Minute * 1)
        .find_minimum_distance(start, end)
        .unwrap();

    // The satellite starts on the Earth-Moon line, and the end of the orbit is excluded.
    assert_eq!(extremum.epoch, start);
    assert_eq!(extremum.samples, 95);
    let expected = ((MOON_DISTANCE_KM - LEO_RADIUS_KM).powi(2) + 100.0).sqrt();
    assert_abs_diff_eq!(extremum.value, expected, epsilon = 1e-6);
}

#[rstest]
fn largest_off_nadir_angle_over_one_orbit(ephem: AnalyticEphemeris) {
    let (start, end) = one_orbit();
    let extremum = search(&ephem, Unit::Minute * 1)
        .find_maximum_off_nadir_angle(start, end)
        .unwrap();
    assert_eq!(extremum.epoch, start);
    let expected = 180.0 - (10.0_f64 / (MOON_DISTANCE_KM - LEO_RADIUS_KM)).atan().to_degrees();
    assert_abs_diff_eq!(extremum.value, expected, epsilon = 1e-9);
}

#[rstest]
fn every_sample_is_in_the_interval(ephem: AnalyticEphemeris) {
    // Start half an orbit in: the Moon is then behind the Earth and the best instant is the last sample.
    let (start, _) = one_orbit();
    let start = start + (LEO_PERIOD_S / 2.0) * Unit::Second;
    let end = start + (LEO_PERIOD_S / 2.0) * Unit::Second;
    let step = Unit::Second * 7;

    for strategy in [
        ExtremalSearchStrategy::MinimizeDistance,
        ExtremalSearchStrategy::MaximizeOffNadirAngle,
    ] {
        let extremum = search(&ephem, step).find(strategy, start, end).unwrap();
        assert!(extremum.epoch >= start && extremum.epoch < end, "{strategy}");
        assert!(end - extremum.epoch <= step, "{strategy}: {}", extremum.epoch);
    }
}

#[rstest]
fn finer_steps_are_never_worse(ephem: AnalyticEphemeris) {
    let (start, end) = one_orbit();
    // Shift the window so that the true extremum is not on the coarse grid
    let start = start + Unit::Second * 17;
    let end = end + Unit::Second * 17;

    let coarse = search(&ephem, Unit::Minute * 2);
    let fine = search(&ephem, Unit::Second * 10);

    let coarse_max = coarse.find_maximum_off_nadir_angle(start, end).unwrap();
    let fine_max = fine.find_maximum_off_nadir_angle(start, end).unwrap();
    assert!(fine_max.value >= coarse_max.value);
    assert!(fine_max.samples > coarse_max.samples);

    let coarse_min = coarse.find_minimum_distance(start, end).unwrap();
    let fine_min = fine.find_minimum_distance(start, end).unwrap();
    assert!(fine_min.value <= coarse_min.value);
}

#[rstest]
fn single_sample_interval(ephem: AnalyticEphemeris) {
    let (start, _) = one_orbit();
    let extremum = search(&ephem, Unit::Hour * 1)
        .find_minimum_distance(start, start + Unit::Second * 1)
        .unwrap();
    assert_eq!(extremum.epoch, start);
    assert_eq!(extremum.samples, 1);
}

#[rstest]
fn invalid_searches(ephem: AnalyticEphemeris) {
    let (start, end) = one_orbit();
    assert_eq!(
        search(&ephem, Unit::Minute * 1).find_minimum_distance(end, start),
        Err(SearchError::EmptyInterval {
            start: end,
            end: start
        })
    );
    assert!(matches!(
        search(&ephem, Unit::Minute * 1).find_minimum_distance(start, start),
        Err(SearchError::EmptyInterval { .. })
    ));
    assert!(matches!(
        search(&ephem, Duration::ZERO).find_minimum_distance(start, end),
        Err(SearchError::InvalidStep { .. })
    ));
    assert!(matches!(
        search(&ephem, -(Unit::Minute * 1)).find_minimum_distance(start, end),
        Err(SearchError::InvalidStep { .. })
    ));
}

#[rstest]
fn ephemeris_gaps_are_propagated(mut ephem: AnalyticEphemeris) {
    let (start, end) = one_orbit();
    ephem.available_until = Some(start + Unit::Minute * 30);
    let err = search(&ephem, Unit::Minute * 1)
        .find_maximum_off_nadir_angle(start, end)
        .unwrap_err();
    match err {
        SearchError::SearchEphemeris { epoch, .. } => {
            assert_eq!(epoch, start + Unit::Minute * 31)
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[rstest]
fn cancelled_search(ephem: AnalyticEphemeris) {
    pel::try_init().ok();
    let (start, end) = one_orbit();
    let cancel = CancelToken::new();
    cancel.cancel();
    let search = TemporalSearch::new(
        &ephem,
        Body::Satellite,
        Body::Moon,
        Body::Earth,
        SearchSettings::builder().cancel(cancel).build(),
    );
    assert_eq!(
        search.find_minimum_distance(start, end),
        Err(SearchError::Cancelled {
            epoch: start,
            samples: 0
        })
    );
}
