use approx::assert_relative_eq;
use venus_transit::parallax::ParallaxResult;

/// Route `tracing` output through the test harness; repeated calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Two results of the same pair and instant must agree on every computed quantity.
pub fn assert_result_close(actual: &ParallaxResult, expected: &ParallaxResult, epsilon: f64) {
    assert_eq!(actual.site_a, expected.site_a);
    assert_eq!(actual.site_b, expected.site_b);
    assert_eq!(actual.epoch, expected.epoch);
    assert_relative_eq!(actual.baseline_km, expected.baseline_km, epsilon = epsilon);
    assert_relative_eq!(
        actual.earth_sun_distance_km,
        expected.earth_sun_distance_km,
        epsilon = epsilon
    );
    assert_relative_eq!(
        actual.parallax_angle_arcsec,
        expected.parallax_angle_arcsec,
        epsilon = epsilon
    );
    assert_relative_eq!(
        actual.calculated_au_km,
        expected.calculated_au_km,
        epsilon = epsilon
    );
    assert_relative_eq!(actual.error_percent, expected.error_percent, epsilon = epsilon);
}
