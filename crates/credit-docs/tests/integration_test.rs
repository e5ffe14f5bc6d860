//! Integration tests for credit-docs
//!
//! Records are rendered end to end and the bytes reopened with lopdf.

use credit_docs::{
    DocumentRecord, DocumentRenderer, FsAssets, RenderConfig, CREDITOR_SCHEME_ID,
    MANDATE_REFERENCE, PLACEHOLDER,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::path::Path;

fn record(value: serde_json::Value) -> DocumentRecord {
    serde_json::from_value(value).unwrap()
}

fn offer_record(rate: f64) -> DocumentRecord {
    record(json!({
        "kind": "credit_offer",
        "client_name": "Mario Bianchi",
        "terms": { "principal": 12000.0, "annual_rate_percent": rate, "term_months": 48 },
        "effective_rate_percent": 6.9,
        "created_at": "2025-03-07T09:05:00"
    }))
}

fn mandate_record(address: &str, iban: &str) -> DocumentRecord {
    record(json!({
        "kind": "direct_debit_mandate",
        "payer_name": "Anna Verdi",
        "address": address,
        "city": "Alba (CN)",
        "country": "Italia",
        "fiscal_code": "VRDNNA80A41A124X",
        "iban": iban,
        "bic": "BPMOIT22XXX"
    }))
}

fn render_in(dir: &Path, config: &RenderConfig, record: &DocumentRecord) -> Vec<u8> {
    let assets = FsAssets::new(dir);
    DocumentRenderer::new(config, &assets).render(record).unwrap()
}

fn render(record: &DocumentRecord) -> Vec<u8> {
    render_in(Path::new("/nonexistent-assets"), &RenderConfig::default(), record)
}

/// Decoded content stream of every page, in page order
fn page_contents(bytes: &[u8]) -> Vec<String> {
    let doc = lopdf::Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .values()
        .map(|&id| String::from_utf8_lossy(&doc.get_page_content(id).unwrap()).into_owned())
        .collect()
}

fn write_png(dir: &Path, name: &str, width: u32, height: u32) {
    image::DynamicImage::new_rgb8(width, height)
        .save_with_format(dir.join(name), image::ImageFormat::Png)
        .unwrap();
}

#[test]
fn test_offer_renders_two_decorated_pages() {
    let pages = page_contents(&render(&offer_record(6.45)));
    assert_eq!(pages.len(), 2);

    for (i, content) in pages.iter().enumerate() {
        assert!(content.contains("1 0 0 RG"), "border missing on page {}", i + 1);
        assert!(content.contains(&format!("({}) Tj", i + 1)));
    }

    assert!(pages[0].contains("12.000,00) Tj"));
    assert!(pages[0].contains("284,30) Tj"));
    assert!(pages[1].contains("1.646,53) Tj"));
    assert!(pages[1].contains("13.646,53) Tj"));
}

#[test]
fn test_interest_free_offer_amounts() {
    let pages = page_contents(&render(&offer_record(0.0)));
    assert!(pages[0].contains("250,00) Tj"));
    assert!(pages[1].contains("12.000,00) Tj"));
}

#[test]
fn test_offer_with_partial_assets() {
    let dir = tempfile::tempdir().unwrap();
    let config = RenderConfig::default();
    write_png(dir.path(), "logo_lender.png", 260, 64);
    write_png(dir.path(), "signature_lender.png", 300, 120);
    write_png(dir.path(), "stamp.png", 64, 64);

    let bytes = render_in(dir.path(), &config, &offer_record(6.45));
    let pages = page_contents(&bytes);
    assert_eq!(pages.len(), 2);
    assert!(pages[0].contains("/Im1 Do"));
    assert!(pages[1].contains(" Do"));
}

#[test]
fn test_offer_with_truncated_assets_still_renders() {
    let dir = tempfile::tempdir().unwrap();
    let config = RenderConfig::default();
    write_png(dir.path(), "stamp.png", 64, 64);
    write_png(dir.path(), "signature_lender.png", 300, 120);
    for name in ["stamp.png", "signature_lender.png"] {
        let path = dir.path().join(name);
        let bytes = std::fs::read(&path).unwrap();
        std::fs::write(&path, &bytes[..40]).unwrap();
    }

    let bytes = render_in(dir.path(), &config, &offer_record(6.45));
    let pages = page_contents(&bytes);
    assert_eq!(pages.len(), 2);
    assert!(pages.iter().all(|page| !page.contains("/Im")));
    assert!(pages[0].contains("284,30) Tj"));
}

#[test]
fn test_mandate_is_one_page_with_constants() {
    let pages = page_contents(&render(&mandate_record("Via Roma 1", "IT60X0542811101000000123456")));
    assert_eq!(pages.len(), 1);
    assert!(pages[0].contains(&format!("({MANDATE_REFERENCE}) Tj")));
    assert!(pages[0].contains(&format!("({CREDITOR_SCHEME_ID}) Tj")));
    assert!(pages[0].contains("(1) Tj"));
}

#[test]
fn test_mandate_empty_address_prints_placeholder() {
    let pages = page_contents(&render(&mandate_record("", "IT60X0542811101000000123456")));
    assert!(pages[0].contains("(Indirizzo: ) Tj"));
    assert!(pages[0].contains(&format!("({PLACEHOLDER}) Tj")));
}

#[test]
fn test_mandate_long_iban_is_printed_whole() {
    let iban = "IT60X0542811101000000123456IT60X0542811101000000123456IT60X05428111010000";
    let pages = page_contents(&render(&mandate_record("Via Roma 1", iban)));
    assert!(pages[0].contains(&format!("({iban}) Tj")));
}

#[test]
fn test_guarantee_letter_has_two_pages() {
    let letter = record(json!({
        "kind": "guarantee_letter",
        "payer_name": "Anna Verdi",
        "fiscal_code": "VRDNNA80A41A124X",
        "iban": "IT60X0542811101000000123456"
    }));
    let pages = page_contents(&render(&letter));
    assert_eq!(pages.len(), 2);
    assert!(pages[1].contains("(2) Tj"));
}

#[test]
fn test_config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("render.json");
    std::fs::write(
        &path,
        r#"{"issuer": {"lender_name": "Banca Esempio"}, "timezone_label": "CET"}"#,
    )
    .unwrap();

    let config = RenderConfig::from_file(&path).unwrap();
    assert_eq!(config.issuer.lender_name, "Banca Esempio");

    let pages = page_contents(&render_in(dir.path(), &config, &offer_record(6.45)));
    assert!(pages[0].contains("(Esempio) Tj"));
    assert!(pages[0].contains("(\\(CET\\)) Tj"));
}

#[test]
fn test_suggested_file_names() {
    assert_eq!(offer_record(6.45).suggested_file_name(), "offerta_credito.pdf");
    assert_eq!(mandate_record("", "").suggested_file_name(), "mandato_sepa.pdf");
}
