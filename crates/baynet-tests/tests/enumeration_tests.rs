//! End-to-end tests for enumeration inference.
//!
//! Expected values are derived by hand from the CPTs in the fixtures.

use baynet_core::{
    enumerate_all, enumeration_ask, enumeration_ask_with_config, CptRow, EnumerationConfig,
    Evidence, InferenceError, NetworkBuilder,
};
use baynet_tests::{assert_close, class_network, rain_appointment, sprinkler_network};

#[test]
fn appointment_given_no_rain_reads_cpt_row() {
    let network = rain_appointment();
    let dist = enumeration_ask(&network, "appointment", &Evidence::new().with("rain", "none"))
        .expect("posterior");
    assert_close(dist.get("attend").expect("attend"), 0.9, 1e-12, "attend");
    assert_close(dist.get("miss").expect("miss"), 0.1, 1e-12, "miss");
}

#[test]
fn rain_given_missed_appointment_inverts_cpt() {
    // P(none | miss) = 0.7*0.1 / (0.7*0.1 + 0.3*0.6) = 0.07 / 0.25
    let network = rain_appointment();
    let dist = enumeration_ask(&network, "rain", &Evidence::new().with("appointment", "miss"))
        .expect("posterior");
    assert_close(dist.get("none").expect("none"), 0.28, 1e-12, "none");
    assert_close(dist.get("heavy").expect("heavy"), 0.72, 1e-12, "heavy");
}

#[test]
fn missing_cpt_row_is_a_malformed_network_error() {
    let network = NetworkBuilder::new()
        .root("rain", [("none", 0.7), ("heavy", 0.3)])
        .variable(
            "appointment",
            ["rain"],
            ["attend", "miss"],
            [CptRow::new(["none"], [("attend", 0.9), ("miss", 0.1)])],
        )
        .build()
        .expect("network");

    let err = enumeration_ask(&network, "rain", &Evidence::new().with("appointment", "miss"))
        .expect_err("missing row");
    assert!(err.is_malformed_network());
    assert_eq!(
        err,
        InferenceError::NoMatchingRow {
            variable: "appointment".into(),
            value: "miss".into(),
            parents: "rain=heavy".into(),
        }
    );
}

#[test]
fn impossible_evidence_is_a_zero_evidence_error() {
    let network = NetworkBuilder::new()
        .root("rain", [("none", 0.7), ("heavy", 0.3)])
        .variable(
            "appointment",
            ["rain"],
            ["attend", "miss"],
            [
                CptRow::new(["none"], [("attend", 1.0), ("miss", 0.0)]),
                CptRow::new(["heavy"], [("attend", 1.0), ("miss", 0.0)]),
            ],
        )
        .build()
        .expect("network");

    let err = enumeration_ask(&network, "rain", &Evidence::new().with("appointment", "miss"))
        .expect_err("zero evidence");
    assert_eq!(
        err,
        InferenceError::ZeroEvidence {
            query: "rain".into(),
            evidence: "{appointment=miss}".into(),
        }
    );
}

#[test]
fn observed_query_returns_point_mass() {
    let network = class_network();
    let evidence = Evidence::new().with("train", "delayed").with("rain", "light");
    let dist = enumeration_ask(&network, "train", &evidence).expect("posterior");
    assert_eq!(dist.get("delayed"), Some(1.0));
    assert_eq!(dist.get("on_time"), Some(0.0));
}

#[test]
fn root_term_equals_prior_without_evidence() {
    let network = class_network();
    for (value, prior) in [("none", 0.7), ("light", 0.2), ("heavy", 0.1)] {
        let evidence = Evidence::new().with("rain", value);
        let mass = enumerate_all(&network, network.topological_order(), &evidence).expect("mass");
        assert_close(mass, prior, 1e-12, value);
    }
}

#[test]
fn distribution_covers_domain_exactly_and_sums_to_one() {
    let network = class_network();
    let dist = enumeration_ask(&network, "rain", &Evidence::new().with("appointment", "miss"))
        .expect("posterior");
    let values: Vec<&str> = dist.iter().map(|(v, _)| v).collect();
    assert_eq!(values, ["none", "light", "heavy"]);
    assert_close(dist.total(), 1.0, 1e-9, "total");
    assert!(dist.iter().all(|(_, p)| p >= 0.0));
}

#[test]
fn maintenance_given_delayed_train_in_heavy_rain() {
    // yes: 0.1 * 0.6 = 0.06, no: 0.9 * 0.5 = 0.45
    let network = class_network();
    let evidence = Evidence::new().with("train", "delayed").with("rain", "heavy");
    let dist = enumeration_ask(&network, "maintenance", &evidence).expect("posterior");
    assert_close(dist.get("yes").expect("yes"), 0.06 / 0.51, 1e-12, "yes");
    assert_close(dist.get("no").expect("no"), 0.45 / 0.51, 1e-12, "no");
}

#[test]
fn train_given_attended_appointment_marginalizes_rain_and_maintenance() {
    // P(on_time) = 0.7*(0.4*0.8 + 0.6*0.9) + 0.2*(0.2*0.6 + 0.8*0.7) + 0.1*(0.1*0.4 + 0.9*0.5)
    let on_time: f64 = 0.7 * (0.4 * 0.8 + 0.6 * 0.9)
        + 0.2 * (0.2 * 0.6 + 0.8 * 0.7)
        + 0.1 * (0.1 * 0.4 + 0.9 * 0.5);
    let delayed = 1.0 - on_time;
    let attend_on_time = on_time * 0.9;
    let attend_delayed = delayed * 0.6;
    let total = attend_on_time + attend_delayed;

    let network = class_network();
    let dist = enumeration_ask(&network, "train", &Evidence::new().with("appointment", "attend"))
        .expect("posterior");
    assert_close(dist.get("on_time").expect("on_time"), attend_on_time / total, 1e-12, "on_time");
    assert_close(dist.get("delayed").expect("delayed"), attend_delayed / total, 1e-12, "delayed");
}

#[test]
fn appointment_depends_only_on_train_once_train_is_known() {
    let network = class_network();
    let evidence = Evidence::new()
        .with("rain", "light")
        .with("maintenance", "no")
        .with("train", "delayed");
    let dist = enumeration_ask(&network, "appointment", &evidence).expect("posterior");
    assert_close(dist.get("attend").expect("attend"), 0.6, 1e-12, "attend");
    assert_close(dist.get("miss").expect("miss"), 0.4, 1e-12, "miss");
}

#[test]
fn distinct_topological_orders_agree() {
    let network = sprinkler_network();
    let evidence = Evidence::new().with("wet_grass", "yes");
    let default = enumeration_ask(&network, "rain", &evidence).expect("default order");

    // sprinkler and rain both depend only on cloudy, so either may come first.
    let swapped = EnumerationConfig::with_order(["cloudy", "rain", "sprinkler", "wet_grass"]);
    let other = enumeration_ask_with_config(&network, "rain", &evidence, &swapped)
        .expect("alternative order");

    let default_order: Vec<&str> = network.topological_order().iter().map(|n| &**n).collect();
    assert_eq!(default_order, ["cloudy", "sprinkler", "rain", "wet_grass"]);
    for (value, p) in default.iter() {
        assert_close(other.get(value).expect("value"), p, 1e-12, value);
    }
}

#[test]
fn non_topological_order_is_rejected() {
    let network = class_network();
    let config = EnumerationConfig::with_order(["train", "rain", "maintenance", "appointment"]);
    let err = enumeration_ask_with_config(&network, "rain", &Evidence::new(), &config)
        .expect_err("invalid order");
    assert!(matches!(err, InferenceError::InvalidOrder(_)));
}
