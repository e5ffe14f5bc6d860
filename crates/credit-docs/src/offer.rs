//! Preliminary credit offer
//!
//! Two flowing pages: header, parameter table and terms on the first; the
//! economic summary, legal notes and signatures on the second.

use crate::assets::{scale_signature, AssetSource};
use crate::config::RenderConfig;
use crate::schema::{placeholder_or, CreditOffer};
use credit_calc::{format_currency, format_months, format_percent, format_timestamp};
use pdf_core::{
    Align, Cell, Color, FlowBlock, ImageBlock, LineStyle, Padding, ParagraphStyle, Span, Table,
    TableRow, TableStyle, VAlign, MM,
};

/// Page margin on all sides, millimetres
pub const MARGIN_MM: f64 = 15.0;

const SIGNATURE_WIDTH_MM: f64 = 72.0;
const SIGNATURE_MAX_HEIGHT_MM: f64 = 34.0;
const SIGNATURE_ROW_MM: f64 = 36.0;
/// Pulls the signature image down onto the signing rule
const SIGNATURE_BOTTOM_PADDING: f64 = -8.0;
const SIGNATURE_RULE_WIDTH: f64 = 1.2;
const STAMP_SIZE: f64 = 120.0;

fn small() -> ParagraphStyle {
    ParagraphStyle::new(9.5, 11.0)
}

fn tiny() -> ParagraphStyle {
    ParagraphStyle::new(8.3, 10.0)
}

fn h1() -> ParagraphStyle {
    ParagraphStyle::new(14.0, 16.0).with_space_after(6.0)
}

fn h2() -> ParagraphStyle {
    ParagraphStyle::new(11.0, 13.0)
        .with_space_before(4.0)
        .with_space_after(4.0)
}

fn body() -> ParagraphStyle {
    ParagraphStyle::new(10.5, 12.5)
}

fn right_small() -> ParagraphStyle {
    ParagraphStyle::new(9.2, 11.0).with_align(Align::Right)
}

fn heading(text: &str, style: ParagraphStyle) -> FlowBlock {
    FlowBlock::paragraph(vec![Span::bold(text)], style)
}

fn bullets(blocks: &mut Vec<FlowBlock>, title: &str, items: &[&str]) {
    blocks.push(heading(title, h2()));
    blocks.extend(
        items
            .iter()
            .map(|item| FlowBlock::text(format!("• {item}"), small())),
    );
}

const BENEFITS: &[&str] = &[
    "Possibilita di sospendere fino a 3 rate nel corso del finanziamento",
    "Estinzione anticipata, totale o parziale, senza penali",
    "Piano di ammortamento a rata costante per tutta la durata",
];

const PENALTIES: &[&str] = &[
    "Ritardo nel pagamento: interessi di mora nella misura prevista dal contratto",
    "Mancato pagamento di 2 rate: possibile risoluzione del contratto",
    "Nessuna penale di risoluzione anticipata in assenza di inadempimenti",
];

const COMMUNICATIONS: &[&str] = &[
    "Comunicazioni periodiche inviate all'indirizzo indicato dal cliente.",
    "Contratto e allegati consegnati anche in formato elettronico.",
    "Nessun pagamento e dovuto a soggetti diversi dal finanziatore.",
];

const LEGAL_NOTES: &[&str] = &[
    "La presente offerta e preliminare e non vincolante fino alla firma del contratto.",
    "Il TAEG e indicativo e puo variare alla data di firma del contratto.",
    "Il cliente ha diritto a ricevere il modulo SECCI e il piano di ammortamento completo.",
    "Il cliente ha diritto di recesso entro 14 giorni dalla firma del contratto.",
    "Reclami al finanziatore o all'Arbitro Bancario Finanziario (ABF).",
    "Trattamento dei dati personali secondo la normativa vigente.",
];

/// Flowing blocks of a credit offer
///
/// Every amount is derived from the single `offer.terms`. Logos, signatures
/// and the stamp are included only when their asset resolves.
pub fn build_offer(
    offer: &CreditOffer,
    config: &RenderConfig,
    assets: &dyn AssetSource,
) -> Vec<FlowBlock> {
    let issuer = &config.issuer;
    let terms = &offer.terms;
    let schedule = terms.schedule();
    let mut blocks = Vec::new();

    if let Some(logos) = logo_row(config, assets) {
        blocks.push(FlowBlock::Table(logos));
        blocks.push(FlowBlock::Spacer(4.0 * MM));
    }

    blocks.push(heading(&issuer.lender_name, h1()));
    blocks.push(FlowBlock::text(
        format!("Sede legale: {}", issuer.lender_address),
        small(),
    ));
    blocks.push(heading("Offerta preliminare di credito", h1()));
    blocks.push(FlowBlock::Spacer(2.0 * MM));

    blocks.push(FlowBlock::paragraph(
        vec![
            Span::bold("Cliente:"),
            Span::regular(format!(" {}", placeholder_or(&offer.client_name))),
        ],
        body(),
    ));
    blocks.push(FlowBlock::paragraph(
        vec![
            Span::regular("Intermediario del credito: "),
            Span::bold(issuer.intermediary_name.as_str()),
            Span::regular(format!(" ({})", issuer.intermediary_registration)),
        ],
        small(),
    ));
    blocks.push(FlowBlock::text(issuer.contact_line.as_str(), small()));
    blocks.push(FlowBlock::text(
        format!(
            "Creato: {} ({})",
            format_timestamp(&offer.created_at),
            config.timezone_label
        ),
        right_small(),
    ));
    blocks.push(FlowBlock::Spacer(3.0 * MM));

    let parameters = [
        ("Importo del credito", format_currency(terms.principal)),
        ("Tasso fisso (TAN)", format_percent(terms.annual_rate_percent)),
        ("TAEG indicativo", format_percent(offer.effective_rate_percent)),
        ("Durata", format_months(terms.term_months)),
        ("Rata mensile*", format_currency(schedule.periodic_payment)),
        ("Spese di istruttoria", "€ 0".to_string()),
        ("Commissione incasso", "€ 0".to_string()),
        ("Contributo amministrativo", "€ 0".to_string()),
        ("Spese per comunicazioni periodiche", "€ 0".to_string()),
        ("Premio assicurativo", "Facoltativo (se richiesto)".to_string()),
        (
            "Erogazione fondi",
            "Dopo la firma del contratto definitivo".to_string(),
        ),
    ];
    let mut rows = vec![
        TableRow::new(vec![Cell::bold("Parametro"), Cell::bold("Dettagli")]).with_align(Align::Center),
    ];
    rows.extend(
        parameters
            .into_iter()
            .map(|(label, value)| TableRow::new(vec![Cell::text(label), Cell::text(value)])),
    );
    blocks.push(FlowBlock::Table(Table {
        column_widths: vec![75.0 * MM, 100.0 * MM],
        rows,
        style: TableStyle {
            grid: Some(grid()),
            header_background: Some(Color::from_rgb(0xec, 0xec, 0xec)),
            padding: Padding::new(5.0, 5.0, 3.0, 3.0),
            ..TableStyle::default()
        },
        align: Align::Center,
    }));
    blocks.push(FlowBlock::Spacer(3.0 * MM));
    blocks.push(FlowBlock::text(
        "*Rata calcolata alla data dell'offerta.",
        tiny(),
    ));
    blocks.push(FlowBlock::Spacer(4.0 * MM));

    bullets(&mut blocks, "Vantaggi", BENEFITS);
    bullets(&mut blocks, "Penali e interessi di mora", PENALTIES);
    bullets(&mut blocks, "Comunicazioni", COMMUNICATIONS);

    blocks.push(FlowBlock::PageBreak);

    blocks.push(heading("Riepilogo economico", h2()));
    let summary = [
        ("Importo del credito", format_currency(terms.principal)),
        (
            "Interessi stimati (durata)",
            format_currency(schedule.total_interest),
        ),
        ("Spese una tantum", "€ 0".to_string()),
        ("Commissione incasso", "€ 0".to_string()),
        ("Totale dovuto (stima)", format_currency(schedule.total_payable)),
        ("Durata", format_months(terms.term_months)),
    ];
    blocks.push(FlowBlock::Table(Table {
        column_widths: vec![85.0 * MM, 85.0 * MM],
        rows: summary
            .into_iter()
            .map(|(label, value)| TableRow::new(vec![Cell::text(label), Cell::text(value)]))
            .collect(),
        style: TableStyle {
            grid: Some(grid()),
            label_background: Some(Color::from_rgb(0xf5, 0xf5, 0xf5)),
            padding: Padding::new(5.0, 5.0, 3.0, 3.0),
            ..TableStyle::default()
        },
        align: Align::Center,
    }));
    blocks.push(FlowBlock::Spacer(3.0 * MM));

    bullets(&mut blocks, "Informazioni legali (estratto)", LEGAL_NOTES);
    blocks.push(FlowBlock::Spacer(8.0 * MM));

    blocks.push(FlowBlock::Table(signature_table(config, assets)));

    if let Some(stamp) = assets.resolve(&config.assets.stamp) {
        blocks.push(FlowBlock::Spacer(5.0 * MM));
        blocks.push(FlowBlock::Image(ImageBlock {
            data: stamp.data,
            width: STAMP_SIZE,
            height: STAMP_SIZE,
            align: Align::Right,
        }));
    }

    blocks
}

fn grid() -> LineStyle {
    LineStyle::new(0.25, Color::gray(0.5))
}

/// Header row of logos, `None` when no logo resolves
fn logo_row(config: &RenderConfig, assets: &dyn AssetSource) -> Option<Table> {
    let slots = &config.assets.logos;
    let cells: Vec<Cell> = slots
        .iter()
        .enumerate()
        .map(|(i, slot)| match assets.resolve(&slot.path) {
            Some(logo) => Cell::Image(ImageBlock {
                data: logo.data,
                width: slot.width_mm * MM,
                height: slot.height_mm * MM,
                align: if i == 0 { Align::Left } else { Align::Right },
            }),
            None => Cell::Empty,
        })
        .collect();

    if cells.iter().all(|cell| matches!(cell, Cell::Empty)) {
        return None;
    }

    Some(Table {
        column_widths: slots.iter().map(|slot| slot.column_mm * MM).collect(),
        rows: vec![TableRow::new(cells)],
        style: TableStyle {
            valign: VAlign::Middle,
            ..TableStyle::default()
        },
        align: Align::Center,
    })
}

fn signature_cell(assets: &dyn AssetSource, path: &std::path::Path) -> Cell {
    match assets.resolve(path) {
        Some(signature) => {
            let (width, height) = scale_signature(
                signature.width,
                signature.height,
                SIGNATURE_WIDTH_MM * MM,
                SIGNATURE_MAX_HEIGHT_MM * MM,
            );
            Cell::Image(ImageBlock {
                data: signature.data,
                width,
                height,
                align: Align::Center,
            })
        }
        None => Cell::Empty,
    }
}

/// Client, lender and intermediary signature columns
fn signature_table(config: &RenderConfig, assets: &dyn AssetSource) -> Table {
    let issuer = &config.issuer;

    let heads = TableRow::new(vec![
        Cell::text("Firma Cliente"),
        Cell::text(format!("Firma Rappresentante\n{}", issuer.lender_name)),
        Cell::text(format!("Firma Rappresentante\n{}", issuer.intermediary_name)),
    ])
    .with_font(12.0, 14.0);

    let signatures = TableRow::new(vec![
        Cell::Empty,
        signature_cell(assets, &config.assets.lender_signature),
        signature_cell(assets, &config.assets.intermediary_signature),
    ])
    .with_height(SIGNATURE_ROW_MM * MM)
    .with_valign(VAlign::Bottom)
    .with_padding(Padding::new(6.0, 6.0, 0.0, SIGNATURE_BOTTOM_PADDING));

    let gap = TableRow::new(vec![Cell::Empty, Cell::Empty, Cell::Empty]).with_height(10.0 * MM);

    let captions = TableRow::new(vec![
        Cell::Empty,
        Cell::text(format!("Rapp. finanziatore: {}", issuer.lender_representative)),
        Cell::text(format!(
            "Rapp. intermediario: {}",
            issuer.intermediary_representative
        )),
    ])
    .with_font(9.2, 11.0);

    Table {
        column_widths: vec![50.0 * MM, 65.0 * MM, 65.0 * MM],
        rows: vec![heads, signatures, gap, captions],
        style: TableStyle {
            padding: Padding::new(6.0, 6.0, 3.0, 3.0),
            rules_below: vec![(1, LineStyle::new(SIGNATURE_RULE_WIDTH, Color::black()))],
            column_align: vec![Align::Center; 3],
            ..TableStyle::default()
        },
        align: Align::Center,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::RenderedAsset;
    use crate::{DocError, Result};
    use chrono::NaiveDate;
    use credit_calc::LoanTerms;
    use pretty_assertions::assert_eq;
    use std::path::{Path, PathBuf};

    /// Resolves only the listed paths, as `width` x `height` images
    struct FakeAssets {
        present: Vec<(PathBuf, u32, u32)>,
    }

    impl FakeAssets {
        fn none() -> Self {
            Self {
                present: Vec::new(),
            }
        }
    }

    impl AssetSource for FakeAssets {
        fn probe(&self, path: &Path) -> Result<RenderedAsset> {
            self.present
                .iter()
                .find(|(p, _, _)| p == path)
                .map(|(p, width, height)| RenderedAsset {
                    path: p.clone(),
                    width: *width,
                    height: *height,
                    data: vec![0xFF],
                })
                .ok_or_else(|| DocError::AssetMissing(path.display().to_string()))
        }

        fn read_font(&self, path: &Path) -> Result<Vec<u8>> {
            Err(DocError::FontMissing(path.display().to_string()))
        }
    }

    fn offer(principal: f64, rate: f64, term: u32) -> CreditOffer {
        CreditOffer {
            client_name: "Mario Bianchi".to_string(),
            terms: LoanTerms::new(principal, rate, term),
            effective_rate_percent: 6.9,
            created_at: NaiveDate::from_ymd_opt(2025, 3, 7)
                .unwrap()
                .and_hms_opt(9, 5, 0)
                .unwrap(),
        }
    }

    fn tables(blocks: &[FlowBlock]) -> Vec<&Table> {
        blocks
            .iter()
            .filter_map(|block| match block {
                FlowBlock::Table(table) => Some(table),
                _ => None,
            })
            .collect()
    }

    fn cell_text(cell: &Cell) -> String {
        match cell {
            Cell::Text(spans) => spans.iter().map(|s| s.text.as_str()).collect(),
            _ => String::new(),
        }
    }

    fn column(table: &Table, col: usize) -> Vec<String> {
        table.rows.iter().map(|row| cell_text(&row.cells[col])).collect()
    }

    #[test]
    fn test_parameter_and_summary_tables() {
        let blocks = build_offer(
            &offer(12_000.0, 6.45, 48),
            &RenderConfig::default(),
            &FakeAssets::none(),
        );
        let tables = tables(&blocks);
        // parameters, summary, signatures
        assert_eq!(tables.len(), 3);

        let parameters = column(tables[0], 1);
        assert_eq!(parameters.len(), 12);
        assert_eq!(parameters[0], "Dettagli");
        assert_eq!(parameters[1], "€ 12.000,00");
        assert_eq!(parameters[2], "6.45 %");
        assert_eq!(parameters[3], "6.90 %");
        assert_eq!(parameters[4], "48 mesi");
        assert_eq!(parameters[5], "€ 284,30");

        let summary = column(tables[1], 1);
        assert_eq!(
            summary,
            vec![
                "€ 12.000,00",
                "€ 1.646,53",
                "€ 0",
                "€ 0",
                "€ 13.646,53",
                "48 mesi"
            ]
        );
    }

    #[test]
    fn test_interest_free_offer() {
        let blocks = build_offer(
            &offer(12_000.0, 0.0, 48),
            &RenderConfig::default(),
            &FakeAssets::none(),
        );
        let tables = tables(&blocks);
        assert_eq!(column(tables[0], 1)[5], "€ 250,00");
        assert_eq!(column(tables[1], 1)[1], "€ 0,00");
    }

    #[test]
    fn test_single_page_break_between_sections() {
        let blocks = build_offer(
            &offer(12_000.0, 6.45, 48),
            &RenderConfig::default(),
            &FakeAssets::none(),
        );
        let breaks = blocks
            .iter()
            .filter(|block| matches!(block, FlowBlock::PageBreak))
            .count();
        assert_eq!(breaks, 1);
    }

    #[test]
    fn test_missing_assets_drop_logo_row_and_stamp() {
        let blocks = build_offer(
            &offer(12_000.0, 6.45, 48),
            &RenderConfig::default(),
            &FakeAssets::none(),
        );
        assert!(matches!(blocks[0], FlowBlock::Paragraph { .. }));
        assert!(!blocks.iter().any(|b| matches!(b, FlowBlock::Image(_))));

        let signatures = tables(&blocks)[2];
        assert!(signatures.rows[1]
            .cells
            .iter()
            .all(|cell| matches!(cell, Cell::Empty)));
    }

    #[test]
    fn test_partial_assets() {
        let config = RenderConfig::default();
        let assets = FakeAssets {
            present: vec![
                (config.assets.logos[1].path.clone(), 100, 100),
                (config.assets.lender_signature.clone(), 100, 200),
                (config.assets.stamp.clone(), 50, 50),
            ],
        };
        let blocks = build_offer(&offer(12_000.0, 6.45, 48), &config, &assets);

        let FlowBlock::Table(logos) = &blocks[0] else {
            panic!("expected the logo row first");
        };
        assert!(matches!(logos.rows[0].cells[0], Cell::Empty));
        assert!(matches!(logos.rows[0].cells[1], Cell::Image(_)));

        let signatures = tables(&blocks)[3];
        let Cell::Image(signature) = &signatures.rows[1].cells[1] else {
            panic!("expected the lender signature");
        };
        // tall image: clamped to the maximum height
        assert!((signature.height - SIGNATURE_MAX_HEIGHT_MM * MM).abs() < 1e-9);
        assert!((signature.width - SIGNATURE_MAX_HEIGHT_MM * MM / 2.0).abs() < 1e-9);
        assert!(matches!(signatures.rows[1].cells[2], Cell::Empty));

        assert!(matches!(blocks.last(), Some(FlowBlock::Image(stamp)) if stamp.width == STAMP_SIZE));
    }

    #[test]
    fn test_blank_client_name_uses_placeholder() {
        let mut record = offer(12_000.0, 6.45, 48);
        record.client_name = String::new();
        let blocks = build_offer(&record, &RenderConfig::default(), &FakeAssets::none());

        let client_line = blocks.iter().find_map(|block| match block {
            FlowBlock::Paragraph { spans, .. } if spans[0].text == "Cliente:" => {
                Some(spans[1].text.clone())
            }
            _ => None,
        });
        assert_eq!(client_line, Some(format!(" {}", crate::PLACEHOLDER)));
    }
}
