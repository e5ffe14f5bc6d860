//! Guarantee deposit letter
//!
//! Sections 1 and 2 (the deposit request) fill the first page; sections 3
//! and 4 follow an explicit page break in a larger body size.

use crate::config::RenderConfig;
use crate::schema::{placeholder_or, GuaranteeLetter};
use credit_calc::format_currency;
use pdf_core::{Align, FlowBlock, ParagraphStyle, Span, MM};

pub const MARGIN_MM: f64 = 20.0;

fn title() -> ParagraphStyle {
    ParagraphStyle::new(14.0, 17.0).with_space_after(8.0)
}

fn section(size: f32) -> ParagraphStyle {
    ParagraphStyle::new(size + 1.0, f64::from(size) + 4.0)
        .with_space_before(8.0)
        .with_space_after(4.0)
}

fn first_page_body() -> ParagraphStyle {
    ParagraphStyle::new(10.0, 13.0)
        .with_align(Align::Justify)
        .with_space_after(4.0)
}

fn second_page_body() -> ParagraphStyle {
    ParagraphStyle::new(11.5, 15.0)
        .with_align(Align::Justify)
        .with_space_after(5.0)
}

fn field(label: &str, value: &str) -> FlowBlock {
    FlowBlock::paragraph(
        vec![Span::bold(label), Span::regular(format!(" {}", placeholder_or(value)))],
        ParagraphStyle::new(10.5, 14.0),
    )
}

/// Flowing blocks of a guarantee letter
pub fn build_guarantee(letter: &GuaranteeLetter, config: &RenderConfig) -> Vec<FlowBlock> {
    let issuer = &config.issuer;
    let terms = &config.guarantee;
    let amount = format_currency(terms.amount);
    let body = first_page_body();

    let mut blocks = vec![
        FlowBlock::paragraph(
            vec![Span::bold(format!("{} - Richiesta di deposito cauzionale", issuer.lender_name))],
            title(),
        ),
        field("Debitore:", &letter.payer_name),
        field("Codice fiscale:", &letter.fiscal_code),
        field("IBAN di addebito:", &letter.iban),
        FlowBlock::Spacer(4.0 * MM),
        FlowBlock::paragraph(vec![Span::bold("1. Oggetto")], section(10.0)),
        FlowBlock::text(
            format!(
                "Ai fini dell'erogazione del finanziamento richiesto, {} chiede al debitore \
                 la costituzione di un deposito cauzionale a garanzia delle prime rate. Il \
                 deposito e restituito integralmente alla scadenza del piano di rimborso.",
                issuer.lender_name
            ),
            body,
        ),
        FlowBlock::paragraph(vec![Span::bold("2. Importo e modalita di versamento")], section(10.0)),
        FlowBlock::paragraph(
            vec![
                Span::regular("Importo del deposito: "),
                Span::bold(amount.as_str()),
            ],
            body,
        ),
        FlowBlock::text(
            format!(
                "Il versamento va eseguito entro {} giorni dalla data della presente \
                 esclusivamente sul conto intestato al finanziatore indicato nel contratto \
                 di finanziamento. Nessun importo deve essere versato a soggetti diversi \
                 dal finanziatore.",
                terms.payment_deadline_days
            ),
            body,
        ),
        FlowBlock::PageBreak,
    ];

    let body = second_page_body();
    blocks.extend([
        FlowBlock::paragraph(vec![Span::bold("3. Obblighi dell'intermediario")], section(11.5)),
        FlowBlock::text(
            format!(
                "{} ({}) assiste il debitore nella raccolta della documentazione e non \
                 riceve somme di denaro per conto del finanziatore o del debitore.",
                issuer.intermediary_name, issuer.intermediary_registration
            ),
            body,
        ),
        FlowBlock::text(
            "L'intermediario comunica al debitore ogni variazione delle condizioni \
             dell'offerta prima della firma del contratto.",
            body,
        ),
        FlowBlock::paragraph(vec![Span::bold("4. Conseguenze del mancato versamento")], section(11.5)),
        FlowBlock::text(
            "In assenza del deposito entro il termine indicato la pratica di finanziamento \
             non prosegue. Al debitore non e addebitato alcun costo per l'istruttoria svolta.",
            body,
        ),
        FlowBlock::Spacer(12.0 * MM),
        FlowBlock::paragraph(
            vec![Span::regular("Firma del debitore ____________________")],
            ParagraphStyle::new(11.5, 15.0).with_align(Align::Right),
        ),
    ]);

    blocks
}
