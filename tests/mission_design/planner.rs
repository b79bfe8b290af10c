extern crate pretty_env_logger as pel;

use approx::assert_abs_diff_eq;
use rstest::*;
use satnav::io::{ConfigError, ConfigRepr, PlannerConfig};
use satnav::md::{CancelToken, CaptureConfig, CapturePlanner, ExtremalSearchStrategy};
use satnav::time::{Epoch, Unit};
use satnav::{EphemerisError, PlannerError, SearchError};

use crate::{one_orbit, AnalyticEphemeris, Body, LEO_PERIOD_S, LEO_RADIUS_KM, MOON_DISTANCE_KM};

#[fixture]
fn ephem() -> AnalyticEphemeris {
    AnalyticEphemeris::new(crate::test_epoch())
}

fn two_orbits() -> (Epoch, Epoch) {
    let (start, _) = one_orbit();
    (start, start + (2.0 * LEO_PERIOD_S) * Unit::Second)
}

fn planner(ephem: &AnalyticEphemeris, config: PlannerConfig) -> CapturePlanner<'_, AnalyticEphemeris> {
    CapturePlanner::new(ephem, Body::Satellite, Body::Moon, Body::Earth, config)
}

#[rstest]
fn one_capture_per_window(ephem: AnalyticEphemeris) {
    crate::init_logger();
    let (start, end) = two_orbits();
    let config = PlannerConfig::builder().intervals(4).build();
    let planner = planner(&ephem, config);

    let windows = planner.windows(start, end).unwrap();
    let plan = planner.plan(start, end).unwrap();
    assert_eq!(plan.len(), 4);
    assert!(plan.is_complete());

    let events = plan.into_events().unwrap();
    assert_eq!(events.len(), 4);
    for (event, (index, window_start, window_end)) in events.iter().zip(windows.iter()) {
        println!("{event}");
        assert_eq!(event.window, *index);
        assert!(event.epoch >= *window_start && event.epoch < *window_end);
        assert!((0.0..=180.0).contains(&event.off_nadir_angle_deg));
        assert!(event.frame_count >= 1);
        assert!(event.frames_per_second >= 1.0 && event.frames_per_second <= 20.0);
        assert!((event.quaternion.norm() - 1.0).abs() < 1e-9);
        assert!(event.capture_start() < event.epoch);
        assert!(event.phase_angle_deg.is_none());
    }
    for pair in events.windows(2) {
        assert!(pair[0].epoch < pair[1].epoch);
    }

    // The Moon passes over the zenith at the start of each orbit, and right before the end of the other windows.
    assert_eq!(events[0].epoch, start);
    assert_eq!(events[1].epoch, start + (LEO_PERIOD_S - 30.0) * Unit::Second);
    assert_eq!(events[2].epoch, start + LEO_PERIOD_S * Unit::Second);
    assert_eq!(events[0].frame_count, 106);
}

#[rstest]
fn parallel_and_sequential_plans_match(ephem: AnalyticEphemeris) {
    let (start, end) = two_orbits();
    let parallel = planner(&ephem, PlannerConfig::builder().intervals(7).build())
        .plan(start, end)
        .unwrap();
    let sequential = planner(
        &ephem,
        PlannerConfig::builder().intervals(7).parallel(false).build(),
    )
    .plan(start, end)
    .unwrap();
    assert_eq!(parallel, sequential);
    let indexes: Vec<usize> = parallel.windows.iter().map(|w| w.index).collect();
    assert_eq!(indexes, (0..7).collect::<Vec<usize>>());
}

#[rstest]
fn closest_approach_strategy(ephem: AnalyticEphemeris) {
    let (start, end) = one_orbit();
    let config = PlannerConfig::builder()
        .strategy(ExtremalSearchStrategy::MinimizeDistance)
        .build();
    let event = planner(&ephem, config).plan_single(start, end).unwrap();
    assert_eq!(event.window, 0);
    assert_eq!(event.epoch, start);
    let expected = ((MOON_DISTANCE_KM - LEO_RADIUS_KM).powi(2) + 100.0).sqrt();
    assert_abs_diff_eq!(event.distance_km, expected, epsilon = 1e-6);
    // The quaternion is computed at the closest approach
    let expected_deg = 180.0 - (10.0_f64 / (MOON_DISTANCE_KM - LEO_RADIUS_KM)).atan().to_degrees();
    assert_abs_diff_eq!(event.off_nadir_angle_deg, expected_deg, epsilon = 1e-9);
    assert!(!event.degenerate_attitude);
}

#[rstest]
fn zenith_passes_are_flagged(mut ephem: AnalyticEphemeris) {
    ephem.moon_height_km = 0.0;
    let (start, end) = one_orbit();
    let event = planner(&ephem, PlannerConfig::default())
        .plan_single(start, end)
        .unwrap();
    assert!(event.degenerate_attitude);
    assert_abs_diff_eq!(event.off_nadir_angle_deg, 180.0, epsilon = 1e-12);
    assert!(event
        .quaternion
        .as_scalar_first()
        .iter()
        .all(|c| c.is_finite()));
}

#[rstest]
fn lit_by_the_sun(ephem: AnalyticEphemeris) {
    let (start, end) = one_orbit();
    let event = planner(&ephem, PlannerConfig::default())
        .with_light_source(Body::Sun)
        .plan_single(start, end)
        .unwrap();
    let phase = event.phase_angle_deg.unwrap();
    let expected = (ephem.moon_height_km / MOON_DISTANCE_KM).atan().to_degrees();
    assert_abs_diff_eq!(phase, expected, epsilon = 1e-8);
}

#[rstest]
fn failed_windows_do_not_stop_the_plan(mut ephem: AnalyticEphemeris) {
    pel::try_init().ok();
    let (start, end) = two_orbits();
    ephem.available_until = Some(start + Unit::Minute * 100);

    let plan = planner(&ephem, PlannerConfig::builder().intervals(2).build())
        .plan(start, end)
        .unwrap();
    assert_eq!(plan.len(), 2);
    assert!(!plan.is_complete());
    assert_eq!(plan.events().count(), 1);
    assert_eq!(plan.events().next().unwrap().window, 0);

    let failures: Vec<_> = plan.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].index, 1);
    println!("{}", failures[0]);
    match &failures[0].outcome {
        Err(PlannerError::WindowSearch {
            window,
            source:
                SearchError::SearchEphemeris {
                    epoch,
                    source: EphemerisError::BodyUnavailable { .. },
                },
            ..
        }) => {
            assert_eq!(*window, 1);
            assert_eq!(*epoch, start + Unit::Second * 6060);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    // All or nothing
    assert!(matches!(
        plan.into_events(),
        Err(PlannerError::WindowSearch { window: 1, .. })
    ));
}

#[rstest]
fn cancelled_plan(ephem: AnalyticEphemeris) {
    let (start, end) = two_orbits();
    let cancel = CancelToken::new();
    let planner = planner(&ephem, PlannerConfig::builder().intervals(3).build())
        .with_cancel(cancel.clone());
    cancel.cancel();

    let plan = planner.plan(start, end).unwrap();
    assert_eq!(plan.len(), 3);
    assert_eq!(plan.events().count(), 0);
    for window in plan.failures() {
        assert!(matches!(
            window.outcome,
            Err(PlannerError::WindowSearch {
                source: SearchError::Cancelled { samples: 0, .. },
                ..
            })
        ));
    }
}

#[rstest]
fn invalid_plans(ephem: AnalyticEphemeris) {
    let (start, end) = one_orbit();
    assert_eq!(
        planner(&ephem, PlannerConfig::builder().intervals(0).build()).plan(start, end),
        Err(PlannerError::IntervalCount { intervals: 0 })
    );
    assert!(matches!(
        planner(&ephem, PlannerConfig::default()).plan(end, start),
        Err(PlannerError::EmptyHorizon { .. })
    ));
    assert!(matches!(
        planner(&ephem, PlannerConfig::builder().search_step_s(0.0).build()).plan_single(start, end),
        Err(PlannerError::PlannerConfig {
            source: ConfigError::InvalidConfig { .. }
        })
    ));
}

#[rstest]
fn invalid_configs_are_errors(ephem: AnalyticEphemeris) {
    let start = ephem.epoch0;
    let end = start + Unit::Minute * 10;

    // A maximum frame rate below one frame per second, planned on the thread pool
    let cfg = PlannerConfig::loads("intervals: 2\ncapture:\n  max_fps: 0.5\n").unwrap();
    assert!(cfg.parallel);
    let err = planner(&ephem, cfg).plan(start, end).unwrap_err();
    println!("{err}");
    assert!(matches!(err, PlannerError::PlannerConfig { .. }));

    let cfg = PlannerConfig::loads("search_step_s: .nan\n").unwrap();
    assert!(cfg.search_step_s.is_nan());
    assert!(matches!(
        planner(&ephem, cfg.clone()).plan_single(start, end),
        Err(PlannerError::PlannerConfig { .. })
    ));
    assert!(matches!(
        planner(&ephem, cfg).plan(start, end),
        Err(PlannerError::PlannerConfig { .. })
    ));

    let cfg = PlannerConfig::builder()
        .capture(CaptureConfig::builder().max_fps(f64::NAN).build())
        .build();
    assert!(matches!(
        planner(&ephem, cfg).plan_single(start, end),
        Err(PlannerError::PlannerConfig { .. })
    ));
}
