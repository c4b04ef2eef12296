use anyhow::Context;
use app_utils::clock::unix_now;
use app_utils::{hex, load_document, load_policy};
use cert_extensions::oid::{
    AUTHORITY_INFO_ACCESS, CRL_DISTRIBUTION_POINTS, NTDS_CA_SECURITY_EXT, SUBJECT_ALT_NAME,
};
use cert_policy::{
    AttributeMap, CertificateRequest, DirectoryObject, EvaluationContext, RequestValidator,
    ValidationOutcome,
};
use colored::*;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Inputs of `certguard evaluate`
pub struct EvaluateArgs {
    pub policy: PathBuf,
    pub request: PathBuf,
    pub directory: Option<PathBuf>,
    pub attestation: Option<PathBuf>,
    pub template: String,
    pub now: Option<u64>,
    pub ca_max_not_after: Option<u64>,
}

/// Evaluate the request and print the outcome; returns whether it was issued
pub fn run(args: &EvaluateArgs) -> anyhow::Result<bool> {
    let policy = load_policy(&args.policy)
        .with_context(|| format!("Failed to load policy {}", args.policy.display()))?;
    let request: CertificateRequest = load(&args.request)?;
    let directory: Option<DirectoryObject> = args.directory.as_deref().map(load).transpose()?;
    let attestation: Option<AttributeMap> = args.attestation.as_deref().map(load).transpose()?;
    let now = match args.now {
        Some(now) => now,
        None => unix_now()?,
    };
    debug!(
        template = %args.template,
        now,
        directory = directory.is_some(),
        attestation = attestation.is_some(),
        "inputs loaded"
    );

    let mut context = EvaluationContext::new(&args.template, now);
    if let Some(directory) = &directory {
        context = context.with_directory(directory);
    }
    if let Some(attestation) = &attestation {
        context = context.with_attestation(attestation);
    }
    if let Some(ceiling) = args.ca_max_not_after {
        context = context.with_ca_max_not_after(ceiling);
    }

    let outcome = RequestValidator::new(&policy).validate(&request, &context);
    print_outcome(&args.template, &outcome);
    Ok(outcome.decision().is_success())
}

fn load<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    load_document(path).with_context(|| format!("Failed to load {}", path.display()))
}

fn extension_name(oid: &str) -> &'static str {
    [
        (SUBJECT_ALT_NAME, "Subject Alternative Name"),
        (CRL_DISTRIBUTION_POINTS, "CRL Distribution Points"),
        (AUTHORITY_INFO_ACCESS, "Authority Information Access"),
        (NTDS_CA_SECURITY_EXT, "Security Identifier"),
    ]
    .into_iter()
    .find(|(known, _)| known.to_string() == oid)
    .map_or("Extension", |(_, name)| name)
}

fn print_outcome(template: &str, outcome: &ValidationOutcome) {
    let decision = outcome.decision();
    let status = format!("{decision} (0x{:08X})", decision.status_code());
    if decision.is_success() {
        println!("{} {} {}", "✓".green().bold(), template.bold(), status.green());
    } else {
        println!("{} {} {}", "✗".red().bold(), template.bold(), status.red());
    }

    for reason in outcome.reasons() {
        println!("  {} {}", "⚠".yellow(), reason);
    }

    if !outcome.properties().is_empty() {
        println!("{}", "Properties:".bold());
        for (field, value) in outcome.properties() {
            println!("  {field} = {value:?}");
        }
    }

    if !outcome.extensions().is_empty() {
        println!("{}", "Extensions:".bold());
        for (oid, value) in outcome.extensions() {
            let name = extension_name(oid);
            if value.is_empty() {
                println!("  {name} ({oid}): {}", "remove".yellow());
            } else {
                println!("  {name} ({oid}): {}", hex::encode(value));
            }
        }
    }
}
