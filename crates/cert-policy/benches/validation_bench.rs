use cert_extensions::SanKind;
use cert_policy::{
    CertificateRequest, EvaluationContext, FieldId, KeyAlgorithm, Pattern, PolicyDocument,
    PolicyDocumentBuilder, PublicKeyInfo, RequestValidator,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn create_web_server_policy(outbound: bool) -> PolicyDocument {
    let mut builder = PolicyDocumentBuilder::new()
        .key_algorithm(KeyAlgorithm::Rsa)
        .key_length(2048, 4096)
        .supplement_dns_names(true)
        .subject_rule_with(FieldId::CommonName, |rule| {
            rule.mandatory()
                .max_length(64)
                .pattern(Pattern::regex(r"^[-_a-zA-Z0-9]*\.adcslabor\.de$"))
                .pattern(Pattern::regex(".*(porn|gambling).*").deny())
        })
        .san_rule_with(FieldId::DnsName, |rule| {
            rule.max_occurrences(10)
                .pattern(Pattern::regex(r"^[-_a-zA-Z0-9.]*\.adcslabor\.de$"))
        })
        .san_rule_with(FieldId::IpAddress, |rule| {
            rule.max_occurrences(10)
                .pattern(Pattern::cidr("192.168.0.0/16"))
                .pattern(Pattern::cidr("192.168.123.0/24").deny())
        });

    if outbound {
        builder = builder
            .outbound_subject_with(FieldId::OrganizationName, |rule| {
                rule.value("ADCS Labor").force()
            })
            .outbound_san_with(FieldId::DnsName, |rule| {
                rule.value("www.{sdn:commonName}").force()
            })
            .crl_distribution_point("http://pki.adcslabor.de/CertData/ADCS Labor Issuing CA 1.crl")
            .ca_issuer("http://pki.adcslabor.de/CertData/ADCS Labor Issuing CA 1.crt");
    }

    builder.build().unwrap()
}

fn create_request(san_entries: usize) -> CertificateRequest {
    let mut request = CertificateRequest::new(PublicKeyInfo::rsa(3072))
        .with_subject(FieldId::CommonName, "intranet.adcslabor.de");
    for i in 0..san_entries {
        request = request
            .with_san(SanKind::DnsName, format!("host{i}.adcslabor.de"))
            .unwrap();
    }
    request
}

fn benchmark_validation(c: &mut Criterion) {
    let inbound_only = create_web_server_policy(false);
    let with_outbound = create_web_server_policy(true);
    let small = create_request(1);
    let large = create_request(10);
    let context = EvaluationContext::new("WebServer", 1_700_000_000);

    c.bench_function("validate_inbound_only", |b| {
        let validator = RequestValidator::new(&inbound_only);
        b.iter(|| validator.validate(black_box(&small), &context));
    });

    c.bench_function("validate_with_outbound", |b| {
        let validator = RequestValidator::new(&with_outbound);
        b.iter(|| validator.validate(black_box(&small), &context));
    });

    c.bench_function("validate_ten_san_entries", |b| {
        let validator = RequestValidator::new(&with_outbound);
        b.iter(|| validator.validate(black_box(&large), &context));
    });
}

fn benchmark_policy_loading(c: &mut Criterion) {
    let toml = create_web_server_policy(true).to_toml().unwrap();

    c.bench_function("policy_from_toml", |b| {
        b.iter(|| PolicyDocument::from_toml(black_box(&toml)));
    });
}

criterion_group!(benches, benchmark_validation, benchmark_policy_loading);
criterion_main!(benches);
