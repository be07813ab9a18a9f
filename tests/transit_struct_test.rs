mod common;

use std::sync::{Arc, Mutex};

use venus_transit::config::{RotationModel, TransitConfig};
use venus_transit::constants::J2000_JD;
use venus_transit::geodesy::GeodeticLocation;
use venus_transit::history::{HistoryFilter, PrecisionMode};
use venus_transit::orbital_elements::Body;
use venus_transit::parallax::{ParallaxObserver, ParallaxResult};
use venus_transit::sites::ObservationSite;
use venus_transit::time::{parse_epoch, FixedClock};
use venus_transit::transit::Transit;
use venus_transit::transit_errors::TransitError;

#[derive(Default)]
struct Recorder(Mutex<Vec<(String, String)>>);

impl ParallaxObserver for Recorder {
    fn on_result(&self, result: &ParallaxResult) {
        self.0
            .lock()
            .unwrap()
            .push((result.site_a.clone(), result.site_b.clone()));
    }
}

fn site(id: &str, lat: f64, lon: f64) -> ObservationSite {
    ObservationSite::new(id, id, GeodeticLocation::new(lat, lon, 0.0).unwrap(), "", "")
}

#[test]
fn test_transit_observer_and_history() {
    common::init_tracing();
    let mut transit = Transit::builtin().unwrap();
    let recorder = Arc::new(Recorder::default());
    transit.subscribe(recorder.clone());

    transit.historical_parallax(1882, PrecisionMode::Standard).unwrap();
    assert_eq!(recorder.0.lock().unwrap().len(), 3);

    let epoch = parse_epoch("1882-12-06T17:06:00 UTC").unwrap();
    transit
        .compute_parallax_by_ids(1882, "washington", "santiago", epoch, PrecisionMode::Ultra)
        .unwrap();
    assert_eq!(
        recorder.0.lock().unwrap().last().unwrap(),
        &("washington".to_string(), "santiago".to_string())
    );

    let all = transit.filter_history(&HistoryFilter::default());
    assert_eq!(all.len(), 4);

    let strict = transit.filter_history(&HistoryFilter {
        max_error: Some(0.0),
        ..Default::default()
    });
    assert!(strict.is_empty());

    transit.clear_history();
    assert!(transit.history().is_empty());
}

#[test]
fn test_clock_and_site_list() {
    let transit = Transit::builtin().unwrap();
    let clock = FixedClock(parse_epoch("2004-06-08T08:20:00 UTC").unwrap());
    let sites = vec![site("greenwich", 51.4769, 0.0), site("sydney", -33.8688, 151.2093)];

    let r = transit
        .engine()
        .compute_parallax_at(&clock, &sites[0], &sites[1], PrecisionMode::Standard)
        .unwrap();
    let same = transit
        .engine()
        .compute_from_sites(&sites, clock.0, PrecisionMode::Standard)
        .unwrap();
    common::assert_result_close(&r, &same, 1e-12);

    assert_eq!(
        transit
            .engine()
            .compute_from_sites(&[], clock.0, PrecisionMode::Standard),
        Err(TransitError::InsufficientObservations { found: 0 })
    );
}

#[test]
fn test_rotation_model_from_config() {
    let config: TransitConfig =
        serde_json::from_str(r#"{ "rotation_model": "inclination_only" }"#).unwrap();
    let flat = Transit::with_config(config).unwrap();
    let full = Transit::builtin().unwrap();
    assert_eq!(flat.config().rotation_model, RotationModel::InclinationOnly);

    // the radius does not depend on the orientation model
    let a = flat.position(Body::Venus, J2000_JD).unwrap();
    let b = full.position(Body::Venus, J2000_JD).unwrap();
    assert!((a.distance() - b.distance()).abs() < 1e-12);
    assert!((a.x - b.x).abs() > 1e-6 || (a.y - b.y).abs() > 1e-6);
}

#[test]
fn test_unknown_body_name() {
    let transit = Transit::builtin().unwrap();
    assert_eq!(
        transit.position_by_name("mars", J2000_JD),
        Err(TransitError::UnknownBody("mars".into()))
    );
}
