mod common;

use venus_transit::constants::AU_KM;
use venus_transit::history::{PrecisionMode, PrecisionPolicy};
use venus_transit::sites::roster::TransitRoster;
use venus_transit::transit::Transit;
use venus_transit::transit_errors::TransitError;

#[test]
fn test_1761_pairs() {
    common::init_tracing();
    let transit = Transit::builtin().unwrap();

    let h = transit.historical_parallax(1761, PrecisionMode::Standard).unwrap();
    assert_eq!(h.year, 1761);
    assert_eq!(h.results.len(), 3);
    assert_eq!(h.summary.count, 3);

    let min = h
        .results
        .iter()
        .map(|r| r.error_percent)
        .fold(f64::INFINITY, f64::min);
    assert_eq!(h.best_result.error_percent, min);

    for r in &h.results {
        assert_eq!(r.epoch, h.mid_transit);
        assert!(r.baseline_km > 0.0);
        assert!(r.calculated_au_km > 0.98 * AU_KM && r.calculated_au_km < 1.03 * AU_KM);
        // a ~1.5 % error fails even the loosest tolerance
        assert!(r.error_percent > PrecisionPolicy::tolerance(PrecisionMode::Standard));
        assert!(!PrecisionPolicy::is_within_tolerance(r));
    }

    // all pairs share the same instant, so the estimates barely spread
    assert!(h.summary.std_dev_au_km < 1e-3 * AU_KM);
    assert_eq!(transit.history().len(), 3);
}

#[test]
fn test_every_year_is_computable() {
    let transit = Transit::builtin().unwrap();
    let years = transit.rosters().unwrap().years();

    for year in years {
        let n = transit.roster(year).unwrap().sites.len();
        let h = transit.historical_parallax(year, PrecisionMode::High).unwrap();
        assert_eq!(h.results.len(), n * (n - 1) / 2, "year {year}");
        assert!(h.summary.mean_error_percent < 5.0, "year {year}");
    }
}

#[test]
fn test_unknown_year() {
    let transit = Transit::builtin().unwrap();
    assert_eq!(
        transit.historical_parallax(1900, PrecisionMode::Standard),
        Err(TransitError::UnknownTransitYear(1900))
    );
    assert!(transit.history().is_empty());
}

#[test]
fn test_single_site_roster() {
    let transit = Transit::builtin().unwrap();
    let full = transit.roster(1769).unwrap();
    let lonely = TransitRoster {
        sites: full.sites[..1].to_vec(),
        ..full.clone()
    };

    assert_eq!(
        transit.engine().historical_parallax(&lonely, PrecisionMode::Standard),
        Err(TransitError::InsufficientObservations { found: 1 })
    );
}

#[test]
fn test_recomputation_is_reproducible() {
    let transit = Transit::builtin().unwrap();
    let first = transit.historical_parallax(1874, PrecisionMode::Ultra).unwrap();
    let second = transit.historical_parallax(1874, PrecisionMode::Ultra).unwrap();

    for (a, b) in first.results.iter().zip(&second.results) {
        common::assert_result_close(a, b, 0.0);
    }
    assert_eq!(transit.history().len(), 2 * first.results.len());
}
