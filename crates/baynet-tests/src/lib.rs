//! Shared fixtures for the baynet integration tests.

use std::path::PathBuf;

use baynet_core::{CptRow, Network, NetworkBuilder};

/// Two-node chain `rain -> appointment`.
pub fn rain_appointment() -> Network {
    NetworkBuilder::new()
        .root("rain", [("none", 0.7), ("heavy", 0.3)])
        .variable(
            "appointment",
            ["rain"],
            ["attend", "miss"],
            [
                CptRow::new(["none"], [("attend", 0.9), ("miss", 0.1)]),
                CptRow::new(["heavy"], [("attend", 0.4), ("miss", 0.6)]),
            ],
        )
        .build()
        .expect("rain/appointment network")
}

/// The rain / maintenance / train / appointment network, built in code.
///
/// Matches the tables under `data/class`.
pub fn class_network() -> Network {
    NetworkBuilder::new()
        .root("rain", [("none", 0.7), ("light", 0.2), ("heavy", 0.1)])
        .variable(
            "maintenance",
            ["rain"],
            ["yes", "no"],
            [
                CptRow::new(["none"], [("yes", 0.4), ("no", 0.6)]),
                CptRow::new(["light"], [("yes", 0.2), ("no", 0.8)]),
                CptRow::new(["heavy"], [("yes", 0.1), ("no", 0.9)]),
            ],
        )
        .variable(
            "train",
            ["rain", "maintenance"],
            ["on_time", "delayed"],
            [
                CptRow::new(["none", "yes"], [("on_time", 0.8), ("delayed", 0.2)]),
                CptRow::new(["none", "no"], [("on_time", 0.9), ("delayed", 0.1)]),
                CptRow::new(["light", "yes"], [("on_time", 0.6), ("delayed", 0.4)]),
                CptRow::new(["light", "no"], [("on_time", 0.7), ("delayed", 0.3)]),
                CptRow::new(["heavy", "yes"], [("on_time", 0.4), ("delayed", 0.6)]),
                CptRow::new(["heavy", "no"], [("on_time", 0.5), ("delayed", 0.5)]),
            ],
        )
        .variable(
            "appointment",
            ["train"],
            ["attend", "miss"],
            [
                CptRow::new(["on_time"], [("attend", 0.9), ("miss", 0.1)]),
                CptRow::new(["delayed"], [("attend", 0.6), ("miss", 0.4)]),
            ],
        )
        .build()
        .expect("class network")
}

/// Directory of the CSV tables for [`class_network`].
pub fn class_data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/class")
}

/// Directory of the seven-variable study network, where `exam` has three parents.
pub fn custom_data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/custom")
}

/// Directory of test-only CSV fixtures.
pub fn fixture_dir(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join(name)
}

pub fn assert_close(actual: f64, expected: f64, tol: f64, label: &str) {
    assert!(
        (actual - expected).abs() <= tol,
        "{} mismatch: expected {:.15}, got {:.15}, diff={:.3e}",
        label,
        expected,
        actual,
        (actual - expected).abs()
    );
}

/// `cloudy -> {sprinkler, rain} -> wet_grass`, which has two topological orders.
pub fn sprinkler_network() -> Network {
    NetworkBuilder::new()
        .root("cloudy", [("yes", 0.5), ("no", 0.5)])
        .variable(
            "sprinkler",
            ["cloudy"],
            ["on", "off"],
            [
                CptRow::new(["yes"], [("on", 0.1), ("off", 0.9)]),
                CptRow::new(["no"], [("on", 0.5), ("off", 0.5)]),
            ],
        )
        .variable(
            "rain",
            ["cloudy"],
            ["yes", "no"],
            [
                CptRow::new(["yes"], [("yes", 0.8), ("no", 0.2)]),
                CptRow::new(["no"], [("yes", 0.2), ("no", 0.8)]),
            ],
        )
        .variable(
            "wet_grass",
            ["sprinkler", "rain"],
            ["yes", "no"],
            [
                CptRow::new(["on", "yes"], [("yes", 0.99), ("no", 0.01)]),
                CptRow::new(["on", "no"], [("yes", 0.9), ("no", 0.1)]),
                CptRow::new(["off", "yes"], [("yes", 0.9), ("no", 0.1)]),
                CptRow::new(["off", "no"], [("yes", 0.0), ("no", 1.0)]),
            ],
        )
        .build()
        .expect("sprinkler network")
}
