use std::{
    collections::BTreeMap,
    io::{self, Write},
};

use proptest::prelude::*;
use syringe_pump::{
    AxisId, DispenserError, ReagentDispenser, SyringeAxisConfig, SyringePump, SyringePumpConfig,
};

const TOLERANCE: f64 = 1e-9;

fn x_axis() -> SyringeAxisConfig {
    SyringeAxisConfig {
        mm_per_rev: 8.0,
        steps_per_rev: 200,
        mm_per_ml: 50.0,
        max_mm_per_min: 500.0,
    }
}

fn pump_with_x() -> SyringePump<Vec<u8>> {
    let mut pump =
        SyringePump::with_axes(BTreeMap::from([(AxisId::X, x_axis())]), Vec::new()).unwrap();
    pump.transport_mut().clear();
    pump
}

fn written(pump: &SyringePump<Vec<u8>>) -> String {
    String::from_utf8(pump.transport().clone()).unwrap()
}

struct BrokenPipe;

impl Write for BrokenPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "controller unplugged"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn construction_pushes_settings_before_anything_else() {
    let pump = SyringePump::with_axes(BTreeMap::from([(AxisId::X, x_axis())]), Vec::new()).unwrap();

    assert_eq!(written(&pump), "$100=25\n$110=500\n");
}

#[test]
fn default_config_configures_three_axes() {
    let pump = SyringePump::new(&SyringePumpConfig::default(), Vec::new()).unwrap();

    assert_eq!(
        written(&pump),
        "$100=25\n$110=500\n$101=25\n$111=500\n$102=25\n$112=500\n"
    );
    assert_eq!(pump.axes().collect::<Vec<_>>(), AxisId::ALL.to_vec());
}

#[test]
fn calibration_matches_reference_axis() {
    let pump = pump_with_x();

    let calibration = pump.calibration(AxisId::X).unwrap();
    assert_eq!(calibration.steps_per_mm, 25.0);
    assert_eq!(calibration.min_mm_per_min, 144.0);

    let limits = pump.speed_limits(AxisId::X).unwrap();
    assert!((limits.max_speed - 500.0 / 50.0 / 60.0).abs() < TOLERANCE);
    assert!((limits.min_speed - 144.0 / 50.0 / 60.0).abs() < TOLERANCE);
}

#[test]
fn dispense_without_duration_runs_at_max_rate() {
    let mut pump = pump_with_x();

    let elapsed = pump.dispense(AxisId::X, 2.0, None).unwrap();

    assert_eq!(written(&pump), "G91 G1 X100 F500\n");
    assert!((elapsed - 12.0).abs() < TOLERANCE);
}

#[test]
fn dispense_over_duration_uses_requested_rate() {
    let mut pump = pump_with_x();

    let elapsed = pump.dispense(AxisId::X, 2.0, Some(30.0)).unwrap();

    assert_eq!(written(&pump), "G91 G1 X100 F200\n");
    assert!((elapsed - 30.0).abs() < TOLERANCE);
}

#[test]
fn negative_volume_reverses_direction() {
    let mut pump = pump_with_x();

    let elapsed = pump.dispense(AxisId::X, -1.0, None).unwrap();

    assert_eq!(written(&pump), "G91 G1 X-50 F500\n");
    assert!((elapsed - 6.0).abs() < TOLERANCE);
}

#[test]
fn each_dispense_writes_exactly_one_line() {
    let mut pump = pump_with_x();

    pump.dispense(AxisId::X, 1.0, None).unwrap();
    pump.dispense(AxisId::X, -1.0, Some(60.0)).unwrap();

    assert_eq!(written(&pump).lines().count(), 2);
}

#[test]
fn unknown_axis_never_touches_the_transport() {
    let mut pump = pump_with_x();

    assert!(matches!(
        pump.dispense(AxisId::Y, 1.0, None),
        Err(DispenserError::UnknownAxis(axis)) if axis == "Y"
    ));
    assert!(matches!(
        pump.speed_limits(AxisId::Z),
        Err(DispenserError::UnknownAxis(axis)) if axis == "Z"
    ));
    assert!(pump.transport().is_empty());
}

#[test]
fn invalid_arguments_never_touch_the_transport() {
    let mut pump = pump_with_x();

    assert!(matches!(
        pump.dispense(AxisId::X, 0.0, None),
        Err(DispenserError::InvalidVolume(_))
    ));
    assert!(matches!(
        pump.dispense(AxisId::X, 1.0, Some(-5.0)),
        Err(DispenserError::InvalidDuration(_))
    ));
    assert!(pump.transport().is_empty());
}

#[test]
fn out_of_range_moves_never_touch_the_transport() {
    let mut pump = pump_with_x();

    assert!(matches!(
        pump.dispense(AxisId::X, 1e307, None),
        Err(DispenserError::InvalidVolume(_))
    ));
    assert!(matches!(
        pump.dispense(AxisId::X, 1e-300, Some(1e300)),
        Err(DispenserError::InvalidDuration(_))
    ));
    assert!(pump.transport().is_empty());
}

#[test]
fn unbounded_feed_floor_fails_before_any_write() {
    let config = SyringeAxisConfig {
        mm_per_rev: 1e308,
        ..x_axis()
    };

    let result = SyringePump::with_axes(BTreeMap::from([(AxisId::X, config)]), BrokenPipe);

    assert!(matches!(
        result,
        Err(DispenserError::InvalidConfiguration { axis, .. }) if axis == "X"
    ));
}

#[test]
fn invalid_configuration_fails_before_any_write() {
    let mut config = SyringePumpConfig::default();
    config.axes.get_mut("Z").unwrap().max_mm_per_min = 0.0;

    // a writer that fails would surface a transport error if anything were sent
    let result = SyringePump::new(&config, BrokenPipe);

    assert!(matches!(
        result,
        Err(DispenserError::InvalidConfiguration { axis, .. }) if axis == "Z"
    ));
}

#[test]
fn unsupported_axis_name_fails_construction() {
    let mut config = SyringePumpConfig::default();
    config.axes.insert("E".to_string(), x_axis());

    assert!(matches!(
        SyringePump::new(&config, Vec::new()),
        Err(DispenserError::InvalidConfiguration { axis, .. }) if axis == "E"
    ));
}

#[test]
fn transport_errors_propagate_unchanged() {
    let result = SyringePump::with_axes(BTreeMap::from([(AxisId::X, x_axis())]), BrokenPipe);

    match result {
        Err(DispenserError::Transport(e)) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("construction succeeded over a broken transport"),
    }
}

#[test]
fn works_through_the_dispenser_trait() {
    fn run(dispenser: &mut dyn ReagentDispenser) -> f64 {
        dispenser.dispense(AxisId::X, 1.0, Some(60.0)).unwrap()
    }

    let mut pump = pump_with_x();
    let elapsed = run(&mut pump);

    assert!((elapsed - 60.0).abs() < TOLERANCE);
    assert!(written(&pump).starts_with("G91 G1 X50 F"));
}

#[test]
fn speed_limits_are_stable() {
    let pump = pump_with_x();

    assert_eq!(
        pump.speed_limits(AxisId::X).unwrap(),
        pump.speed_limits(AxisId::X).unwrap()
    );
}

proptest! {
    #[test]
    fn calibration_follows_mechanics(mm_per_rev in 0.1f64..50.0, steps_per_rev in 1u32..10_000) {
        let config = SyringeAxisConfig { mm_per_rev, steps_per_rev, ..x_axis() };
        let pump = SyringePump::with_axes(BTreeMap::from([(AxisId::X, config)]), Vec::new()).unwrap();
        let calibration = pump.calibration(AxisId::X).unwrap();

        let steps_per_mm = steps_per_rev as f64 / mm_per_rev;
        prop_assert!((calibration.steps_per_mm - steps_per_mm).abs() <= TOLERANCE * steps_per_mm);
        prop_assert_eq!(calibration.min_mm_per_min, ((30.0 / calibration.steps_per_mm) * 120.0).ceil());
        prop_assert!(calibration.min_mm_per_min >= 0.0);
        prop_assert_eq!(calibration.min_mm_per_min.fract(), 0.0);
    }

    #[test]
    fn max_speed_round_trips(mm_per_ml in 0.5f64..200.0, max_mm_per_min in 1.0f64..5000.0) {
        let config = SyringeAxisConfig { mm_per_ml, max_mm_per_min, ..x_axis() };
        let pump = SyringePump::with_axes(BTreeMap::from([(AxisId::X, config)]), Vec::new()).unwrap();

        let limits = pump.speed_limits(AxisId::X).unwrap();
        prop_assert!((limits.max_speed * mm_per_ml * 60.0 - max_mm_per_min).abs() < 1e-6);
    }

    #[test]
    fn fast_requests_are_clamped(volume in 0.1f64..20.0, duration in 0.01f64..100.0) {
        let requested = volume * 50.0 * 60.0 / duration;
        prop_assume!(requested > 500.0 * (1.0 + 1e-9));

        let plan = pump_with_x().plan_dispense(AxisId::X, volume, Some(duration)).unwrap();

        prop_assert!(plan.clamped);
        prop_assert_eq!(plan.feed_rate, 500.0);
        prop_assert!(plan.elapsed > duration);
    }

    #[test]
    fn slow_requests_take_the_requested_time(volume in -20.0f64..20.0, duration in 1.0f64..3600.0) {
        prop_assume!(volume.abs() > 1e-3);
        let requested = volume.abs() * 50.0 * 60.0 / duration;
        prop_assume!(requested < 500.0);

        let plan = pump_with_x().plan_dispense(AxisId::X, volume, Some(duration)).unwrap();

        prop_assert!(!plan.clamped);
        prop_assert_eq!(plan.distance.signum(), volume.signum());
        prop_assert!((plan.feed_rate - requested).abs() <= TOLERANCE * requested);
        prop_assert!((plan.elapsed - duration).abs() <= 1e-6 * duration);
    }
}
