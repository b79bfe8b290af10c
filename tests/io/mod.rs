use rstest::*;
use satnav::io::plan::{PlanTable, PLAN_HEADERS};
use satnav::io::{ConfigRepr, PlannerConfig};
use satnav::md::{CaptureConfig, CapturePlanner, ExtremalSearchStrategy};
use satnav::time::Unit;
use std::fs;
use std::path::PathBuf;

use crate::{test_epoch, AnalyticEphemeris, Body, LEO_PERIOD_S};

#[fixture]
fn output_dir() -> PathBuf {
    let dir = std::env::temp_dir().join("satnav_tests");
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[rstest]
fn planner_config_from_file(output_dir: PathBuf) {
    let path = output_dir.join("planner.yaml");
    fs::write(
        &path,
        r#"
intervals: 12
search_step_s: 10.0
strategy: MinimizeDistance
parallel: false
capture:
  orbital_period_min: 97.5
  max_fps: 30.0
"#,
    )
    .unwrap();

    let cfg = PlannerConfig::load(&path).unwrap();
    assert_eq!(cfg.intervals, 12);
    assert_eq!(cfg.search_step_s, 10.0);
    assert_eq!(cfg.strategy, ExtremalSearchStrategy::MinimizeDistance);
    assert!(!cfg.parallel);
    assert!(!cfg.show_progress);
    assert_eq!(cfg.capture.orbital_period_min, 97.5);
    assert_eq!(cfg.capture.max_fps, 30.0);
    // Unspecified capture parameters describe the Moon
    assert_eq!(cfg.capture.target_diameter_km, CaptureConfig::default().target_diameter_km);
    assert!(cfg.validate().is_ok());
}

#[rstest]
fn many_capture_configs(output_dir: PathBuf) {
    let path = output_dir.join("captures.yaml");
    fs::write(
        &path,
        r#"
- target_frame_count: 50
- target_diameter_km: 12742.0
  target_angular_fov_deg: 1.9
"#,
    )
    .unwrap();
    let cfgs = CaptureConfig::load_many(&path).unwrap();
    assert_eq!(cfgs.len(), 2);
    assert_eq!(cfgs[0].target_frame_count, 50);
    assert_eq!(cfgs[1].target_diameter_km, 12742.0);
    assert_eq!(cfgs[1].target_frame_count, 106);
}

#[rstest]
fn plan_table_file(output_dir: PathBuf) {
    let ephem = AnalyticEphemeris::new(test_epoch());
    let config = PlannerConfig::builder().intervals(3).build();
    let start = test_epoch();
    let end = start + (1.5 * LEO_PERIOD_S) * Unit::Second;
    let plan = CapturePlanner::new(&ephem, Body::Satellite, Body::Moon, Body::Earth, config)
        .plan(start, end)
        .unwrap();

    let path = PlanTable::new(&plan)
        .to_file(output_dir.join("plan.txt"))
        .unwrap();
    let text = fs::read_to_string(path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], PLAN_HEADERS.join("|"));
    for (i, line) in lines[1..].iter().enumerate() {
        let columns: Vec<&str> = line.split('|').collect();
        assert_eq!(columns.len(), PLAN_HEADERS.len());
        assert_eq!(columns[0], format!("{}", i + 1));
        // Ten decimals on every float column
        for column in [2, 3, 4, 5, 6, 8] {
            let decimals = columns[column].split('.').nth(1).unwrap();
            assert_eq!(decimals.len(), 10, "{}", columns[column]);
        }
    }
}

#[test]
fn sample_planner_config() {
    let manifest_dir =
        PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").unwrap_or(".".to_string()));
    let cfg = PlannerConfig::load(manifest_dir.join("data/planner.yaml")).unwrap();
    assert_eq!(cfg.intervals, 6);
    assert_eq!(cfg.search_step_s, 30.0);
    assert_eq!(cfg.capture, CaptureConfig::default());
    assert!(cfg.validate().is_ok());
}
