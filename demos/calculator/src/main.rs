use clap::Parser;
use fnwire::{FileReply, Gateway, HandlerError, HttpMethod};
use fnwire_macros::procedure;
use serde_json::{json, Value};
use std::io;
use tracing_subscriber::EnvFilter;

/// Remote-procedure calculator served over HTTP.
#[derive(Parser)]
#[command(name = "calculator")]
#[command(about = "fnwire calculator demo", long_about = None)]
struct Cli {
    /// Interface to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 8080)]
    port: u16,
}

#[procedure(defaults(b = 2))]
fn add(a: i64, b: i64) -> i64 {
    a + b
}

#[procedure]
fn subtract(a: f64, b: f64) -> f64 {
    a - b
}

#[procedure]
fn divide(a: f64, b: f64) -> Result<f64, HandlerError> {
    if b == 0.0 {
        return Err(HandlerError::failure("division by zero"));
    }
    Ok(a / b)
}

/// Constant table backing `constant`, `search` and `export`.
const CONSTANTS: &[(&str, f64)] = &[
    ("pi", std::f64::consts::PI),
    ("e", std::f64::consts::E),
    ("tau", std::f64::consts::TAU),
];

#[procedure]
fn constant(name: String) -> Result<f64, HandlerError> {
    CONSTANTS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, v)| *v)
        .ok_or_else(|| HandlerError::not_found(format!("unknown constant '{name}'")))
}

/// Substring search over the constant table: `GET /search?q=pi`.
#[procedure(defaults(q = ""))]
fn search(q: String) -> Value {
    let hits: Vec<&str> = CONSTANTS
        .iter()
        .filter(|(n, _)| n.contains(q.as_str()))
        .map(|(n, _)| *n)
        .collect();
    json!({ "query": q, "hits": hits })
}

/// Download the constant table as CSV: `GET /export`.
#[procedure]
fn export() -> Result<FileReply, HandlerError> {
    let path = std::env::temp_dir().join("calculator-constants.csv");
    let mut csv = String::from("name,value\n");
    for (name, value) in CONSTANTS {
        csv.push_str(&format!("{name},{value}\n"));
    }
    std::fs::write(&path, csv).map_err(|e| HandlerError::failure(format!("write export: {e}")))?;
    FileReply::open(&path).map_err(|e| HandlerError::failure(format!("open export: {e}")))
}

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let cli = Cli::parse();

    let mut gateway = Gateway::new();
    gateway.register(add_procedure());
    gateway.register(subtract_procedure());
    gateway.register(divide_procedure());
    gateway.register(constant_procedure());
    gateway.register_at(search_procedure(), "search", HttpMethod::Get);
    gateway.register_at(export_procedure(), "export", HttpMethod::Get);
    gateway.dump_routes();

    println!("🚀 calculator serving on http://{}:{}", cli.host, cli.port);
    let handle = gateway.serve((cli.host.as_str(), cli.port))?;
    handle
        .join()
        .map_err(|e| io::Error::other(format!("server failed: {e:?}")))?;
    Ok(())
}
