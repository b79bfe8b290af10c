use anise::constants::frames::{EARTH_J2000, MOON_J2000};
use anise::prelude::Almanac;
use rstest::*;
use satnav::cosmic::{AlmanacProvider, EphemerisProvider};
use satnav::io::PlannerConfig;
use satnav::linalg::Vector3;
use satnav::md::CapturePlanner;
use satnav::time::Unit;
use satnav::{EphemerisError, PlannerError, SearchError};
use std::sync::Arc;

use crate::test_epoch;

#[fixture]
fn provider() -> AlmanacProvider {
    // No kernel is loaded, so every query between distinct bodies must fail without panicking.
    AlmanacProvider::new(Arc::new(Almanac::default()), EARTH_J2000)
}

#[rstest]
fn center_of_the_provider(provider: AlmanacProvider) {
    // A body seen from itself needs no kernel
    let epoch = test_epoch();
    let state = provider.state_at(EARTH_J2000, epoch).unwrap();
    assert_eq!(state.epoch, epoch);
    assert_eq!(state.position_km, Vector3::zeros());
    assert_eq!(state.velocity_km_s, Vector3::zeros());
    assert_eq!(
        provider.position_at(MOON_J2000, epoch, MOON_J2000).unwrap(),
        Vector3::zeros()
    );
}

#[rstest]
fn missing_ephemerides_are_reported(provider: AlmanacProvider) {
    println!("{provider}");
    assert!(matches!(
        provider.state_at(MOON_J2000, test_epoch()),
        Err(EphemerisError::AlmanacQuery { .. })
    ));
    assert!(matches!(
        provider.position_at(MOON_J2000, test_epoch(), EARTH_J2000),
        Err(EphemerisError::AlmanacQuery { .. })
    ));
}

#[rstest]
fn provider_errors_reach_the_planner(provider: AlmanacProvider) {
    let planner = CapturePlanner::new(
        &provider,
        EARTH_J2000,
        MOON_J2000,
        EARTH_J2000,
        PlannerConfig::default(),
    );
    let start = test_epoch();
    let err = planner.plan_single(start, start + Unit::Hour * 1).unwrap_err();
    println!("{err}");
    match err {
        PlannerError::WindowSearch {
            window,
            source: SearchError::SearchEphemeris { epoch, source },
            ..
        } => {
            assert_eq!(window, 0);
            assert_eq!(epoch, start);
            assert!(matches!(source, EphemerisError::AlmanacQuery { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
}
