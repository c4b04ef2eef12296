use anyhow::Context;
use app_utils::load_policy;
use cert_policy::{FieldRule, OutboundFieldRule, PolicyDocument};
use colored::*;
use std::collections::HashSet;
use std::path::Path;

pub fn check(file_path: &Path) -> anyhow::Result<()> {
    println!("{} {}", "Checking policy:".bold(), file_path.display());

    let policy = load_policy(file_path)
        .with_context(|| format!("Failed to load {}", file_path.display()))?;

    println!("  {} Subject rules: {}", "✓".green(), policy.subject_rules().len());
    println!(
        "  {} SAN rules: {}",
        "✓".green(),
        policy.subject_alternative_name_rules().len()
    );
    println!(
        "  {} Outbound rules: {} subject, {} SAN",
        "✓".green(),
        policy.outbound_subject().len(),
        policy.outbound_subject_alternative_name().len()
    );
    if policy.directory_services().is_some() {
        println!("  {} Directory services section present", "✓".green());
    }
    if !policy.attestation_rules().is_empty() {
        println!(
            "  {} Attestation rules: {}",
            "✓".green(),
            policy.attestation_rules().len()
        );
    }
    if policy.audit_only() {
        println!("  {} Audit-only mode: denials are logged, not enforced", "⚠".yellow());
    }

    let warnings = lint(&policy);
    for warning in &warnings {
        println!("  {} {}", "⚠".yellow(), warning);
    }

    // Summary
    println!();
    if warnings.is_empty() {
        println!("{} Policy is valid!", "✓".green().bold());
    } else {
        println!(
            "{} Policy is valid with {} warning(s)",
            "⚠".yellow().bold(),
            warnings.len()
        );
    }

    Ok(())
}

/// Problems that do not make a document invalid but are almost certainly
/// mistakes
pub fn lint(policy: &PolicyDocument) -> Vec<String> {
    let mut warnings = Vec::new();
    lint_field_rules("subjectRules", policy.subject_rules(), &mut warnings);
    lint_field_rules(
        "subjectAlternativeNameRules",
        policy.subject_alternative_name_rules(),
        &mut warnings,
    );
    lint_outbound_rules("outboundSubject", policy.outbound_subject(), &mut warnings);
    lint_outbound_rules(
        "outboundSubjectAlternativeName",
        policy.outbound_subject_alternative_name(),
        &mut warnings,
    );
    warnings
}

fn lint_field_rules(section: &str, rules: &[FieldRule], warnings: &mut Vec<String>) {
    let mut seen = HashSet::new();
    for (i, rule) in rules.iter().enumerate() {
        let field = &rule.field;
        if !seen.insert(field) {
            warnings.push(format!(
                "{section} rule {} duplicates an earlier rule for {field}; values must satisfy both",
                i + 1
            ));
        }
        if !field.is_known() {
            warnings.push(format!("{section} rule {}: unknown field {field}", i + 1));
        }
        if rule.patterns.is_empty() {
            warnings.push(format!(
                "{section} rule {} ({field}) has no patterns and denies every value",
                i + 1
            ));
        }
        for (j, pattern) in rule.patterns.iter().enumerate() {
            if let Err(e) = pattern.check_expression() {
                warnings.push(format!(
                    "{section} rule {} ({field}) pattern {}: {e}",
                    i + 1,
                    j + 1
                ));
            }
        }
    }
}

fn lint_outbound_rules(section: &str, rules: &[OutboundFieldRule], warnings: &mut Vec<String>) {
    let mut seen = HashSet::new();
    for (i, rule) in rules.iter().enumerate() {
        if !rule.field.is_known() {
            warnings.push(format!(
                "{section} rule {}: unknown field {}",
                i + 1,
                rule.field
            ));
        }
        if !seen.insert((&rule.field, &rule.value)) {
            warnings.push(format!("{section} rule {} is a duplicate", i + 1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cert_policy::{FieldId, Pattern, PolicyDocumentBuilder};

    #[test]
    fn test_clean_policy_has_no_warnings() {
        let policy = PolicyDocumentBuilder::new()
            .subject_rule_with(FieldId::CommonName, |rule| {
                rule.pattern(Pattern::regex(r"\.adcslabor\.de$"))
            })
            .san_rule_with(FieldId::IpAddress, |rule| {
                rule.pattern(Pattern::cidr("10.0.0.0/8"))
            })
            .build()
            .unwrap();
        assert!(lint(&policy).is_empty());
    }

    #[test]
    fn test_lint_findings() {
        let policy = PolicyDocumentBuilder::new()
            .subject_rule_with(FieldId::CommonName, |rule| rule.pattern(Pattern::regex("(")))
            .subject_rule_with(FieldId::CommonName, |rule| rule)
            .san_rule_with(FieldId::IpAddress, |rule| {
                rule.pattern(Pattern::cidr("10.0.0.0"))
            })
            .outbound_subject_with("favouriteColour", |rule| rule.value("blue"))
            .outbound_subject_with(FieldId::CountryName, |rule| rule.value("DE"))
            .outbound_subject_with(FieldId::CountryName, |rule| rule.value("DE"))
            .build()
            .unwrap();

        let warnings = lint(&policy);
        assert_eq!(warnings.len(), 6, "{warnings:#?}");
        assert!(warnings[0].contains("invalid regular expression"));
        assert!(warnings[1].contains("duplicates"));
        assert!(warnings[2].contains("no patterns"));
        assert!(warnings[3].contains("invalid CIDR"));
        assert!(warnings[4].contains("favouriteColour"));
        assert!(warnings[5].contains("duplicate"));
    }
}
