//! Baynet CLI - exact enumeration inference over Bayesian networks stored as CSV tables
//!
//! Usage:
//!   baynet <dir>                                   # Summarize a network
//!   baynet <dir> --query train -e rain=heavy       # Posterior of a variable
//!   baynet <dir> -q train -e rain=heavy --trace    # Include the derivation
//!   baynet <dir> -q train -o json                  # Output results as JSON

use std::process;

use baynet_core::{enumeration_ask, enumeration_ask_traced, Distribution, Evidence, Network};
use baynet_loader::load_network_with_warnings;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "baynet")]
#[command(version)]
#[command(about = "Baynet - exact inference by enumeration over discrete Bayesian networks")]
#[command(
    long_about = "Load a Bayesian network from a directory of CSV tables (graph.csv plus one <variable>.csv per variable) and compute posterior distributions by enumeration"
)]
struct Cli {
    /// Directory containing graph.csv and the per-variable tables
    #[arg(value_name = "DIR")]
    dir: String,

    /// Variable whose posterior distribution to compute
    #[arg(short, long, value_name = "VARIABLE")]
    query: Option<String>,

    /// Observed assignment, repeatable
    #[arg(short, long = "evidence", value_name = "VARIABLE=VALUE", value_parser = parse_assignment)]
    evidence: Vec<(String, String)>,

    /// Print the step-by-step derivation of the posterior
    #[arg(short, long)]
    trace: bool,

    /// Output format: summary, json, or debug
    #[arg(short, long, default_value = "summary", value_name = "FORMAT")]
    output: String,

    /// List variables, domains and parents instead of querying
    #[arg(short, long)]
    list: bool,

    /// Fail if any CPT lint warning is found
    #[arg(long)]
    strict: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((variable, value)) if !variable.trim().is_empty() && !value.trim().is_empty() => {
            Ok((variable.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected VARIABLE=VALUE, got '{}'", raw)),
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install logger: {}", e);
    }
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let (network, warnings) = match load_network_with_warnings(&cli.dir) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error loading network from '{}': {}", cli.dir, e);
            process::exit(1);
        }
    };

    if cli.strict && !warnings.is_empty() {
        eprintln!("{} CPT warning(s) in '{}':", warnings.len(), cli.dir);
        for warning in &warnings {
            eprintln!("  - {}", warning);
        }
        process::exit(1);
    }

    let Some(query) = cli.query.as_deref().filter(|_| !cli.list) else {
        print_network(&cli.dir, &network);
        return;
    };

    let evidence: Evidence = cli.evidence.iter().cloned().collect();
    let result = if cli.trace {
        enumeration_ask_traced(&network, query, &evidence).map(|(d, trace)| (d, Some(trace)))
    } else {
        enumeration_ask(&network, query, &evidence).map(|d| (d, None))
    };

    let (distribution, trace) = match result {
        Ok(answer) => answer,
        Err(e) => {
            eprintln!("Error computing P({} | {}): {}", query, evidence, e);
            process::exit(1);
        }
    };

    match cli.output.as_str() {
        "json" => {
            let value = format_result(&evidence, &distribution, trace.as_deref());
            match serde_json::to_string_pretty(&value) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("Error serializing to JSON: {}", e);
                    process::exit(1);
                }
            }
        }
        "debug" => {
            println!("{:#?}", distribution);
            if let Some(trace) = trace {
                println!("{}", trace);
            }
        }
        "summary" | _ => print_summary(&evidence, &distribution, trace.as_deref()),
    }
}

fn print_network(dir: &str, network: &Network) {
    println!("✓ Network '{}' loaded ({} variables)\n", dir, network.len());
    println!("Variables:");
    for variable in network.variables() {
        print!("  {} [{}]", variable.name, variable.domain.join(", "));
        if !variable.parents.is_empty() {
            print!(" <- {}", variable.parents.join(", "));
        }
        println!();
    }
    println!(
        "\nTopological order: {}",
        network.topological_order().join(", ")
    );
    println!("\nRun with --query <VARIABLE> [-e VARIABLE=VALUE ...] to compute a posterior");
}

fn print_summary(evidence: &Evidence, distribution: &Distribution, trace: Option<&str>) {
    if let Some(trace) = trace {
        println!("Trace:\n{}\n", trace);
    }
    println!("Result:");
    for (value, p) in distribution.iter() {
        if evidence.is_empty() {
            println!("  P({}={}) = {:.4}", distribution.variable(), value, p);
        } else {
            println!(
                "  P({}={} | {}) = {:.4}",
                distribution.variable(),
                value,
                evidence,
                p
            );
        }
    }
}

fn format_result(
    evidence: &Evidence,
    distribution: &Distribution,
    trace: Option<&str>,
) -> serde_json::Value {
    let probabilities: Vec<serde_json::Value> = distribution
        .iter()
        .map(|(value, p)| serde_json::json!({ "value": value, "probability": p }))
        .collect();
    let mut out = serde_json::json!({
        "query": distribution.variable(),
        "evidence": evidence,
        "distribution": probabilities,
    });
    if let Some(trace) = trace {
        out["trace"] = serde_json::Value::String(trace.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_assignment_splits_on_first_equals() {
        assert_eq!(
            parse_assignment("rain=heavy"),
            Ok(("rain".to_string(), "heavy".to_string()))
        );
        assert_eq!(
            parse_assignment(" train = on_time "),
            Ok(("train".to_string(), "on_time".to_string()))
        );
        assert!(parse_assignment("rain").is_err());
        assert!(parse_assignment("=heavy").is_err());
    }

    #[test]
    fn json_result_lists_values_in_domain_order() {
        let evidence = Evidence::new().with("rain", "heavy");
        let distribution = Distribution::normalize(
            "maintenance".into(),
            vec![("yes".into(), 0.06), ("no".into(), 0.45)],
            &evidence,
        )
        .expect("normalized");

        let value = format_result(&evidence, &distribution, None);
        let values: Vec<&str> = value["distribution"]
            .as_array()
            .expect("array")
            .iter()
            .map(|entry| entry["value"].as_str().expect("value"))
            .collect();
        assert_eq!(values, ["yes", "no"]);
        assert_eq!(value["query"], "maintenance");
        assert_eq!(value["evidence"]["rain"], "heavy");
        assert!(value.get("trace").is_none());

        let json = serde_json::to_string(&value).expect("serialize");
        let yes = json.find("\"yes\"").expect("yes");
        let no = json.find("\"no\"").expect("no");
        assert!(yes < no);
    }
}
