//! Submit a form from the command line.
//!
//! ```text
//! quoteflow-submit <form-slug> <values.json> [slot=path ...]
//! ```
//!
//! Walks the form's steps with the given values, attaches any files, and
//! performs a single submission against `QUOTE_API_BASE_URL`.

use std::process::ExitCode;

use quoteflow_client::{ClientConfig, QuoteApi};
use quoteflow_core::attachment::AttachmentFile;
use quoteflow_core::forms::FormKind;
use quoteflow_core::session::{FormSession, SessionError};
use quoteflow_core::submission::Outcome;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage: quoteflow-submit <form-slug> <values.json> [slot=path ...]";

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quoteflow_client=info,quoteflow_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(std::env::args().skip(1).collect()).await {
        Ok(Outcome::Confirmed { reference_number }) => {
            match reference_number {
                Some(reference) => println!("Submitted. Reference number: {reference}"),
                None => println!("Submitted."),
            }
            ExitCode::SUCCESS
        }
        Ok(Outcome::Failed { message, .. }) => {
            eprintln!("Submission failed: {message}");
            ExitCode::FAILURE
        }
        Err(message) => {
            eprintln!("{message}");
            ExitCode::from(2)
        }
    }
}

async fn run(args: Vec<String>) -> Result<Outcome, String> {
    let [slug, values_path, attachments @ ..] = args.as_slice() else {
        return Err(USAGE.to_string());
    };

    let kind = FormKind::from_slug(slug).map_err(|e| e.to_string())?;
    let raw = tokio::fs::read_to_string(values_path)
        .await
        .map_err(|e| format!("Cannot read {values_path}: {e}"))?;
    let values: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(&raw).map_err(|e| format!("{values_path} is not a JSON object: {e}"))?;

    let mut session = kind.new_session();
    for (name, value) in values {
        session.set_field(&name, value).map_err(describe)?;
    }

    for spec in attachments {
        let (slot, path) = spec
            .split_once('=')
            .ok_or_else(|| format!("Attachment '{spec}' must be slot=path\n{USAGE}"))?;
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| format!("Cannot read {path}: {e}"))?;
        let file_name = std::path::Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string());
        session
            .attach(slot, AttachmentFile::new(file_name, bytes))
            .map_err(describe)?;
    }

    walk_to_final_step(&mut session)?;

    let config = ClientConfig::from_env().map_err(|e| e.to_string())?;
    let api = QuoteApi::new(&config).map_err(|e| format!("Cannot build HTTP client: {e}"))?;
    session.submit(&api).await.map_err(describe)
}

fn walk_to_final_step(session: &mut FormSession) -> Result<(), String> {
    while !session.is_final_step() {
        session.advance().map_err(describe)?;
    }
    Ok(())
}

fn describe(err: SessionError) -> String {
    let violations = err.violations();
    if violations.is_empty() {
        return err.to_string();
    }
    violations
        .iter()
        .map(|v| format!("  step {}: {}: {}", v.step, v.field, v.message))
        .fold(err.to_string(), |acc, line| acc + "\n" + &line)
}
