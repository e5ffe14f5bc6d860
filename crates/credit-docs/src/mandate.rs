//! SEPA direct-debit mandate
//!
//! A single page placed line by line with the [`Typesetter`]. Free-text
//! fields are clipped to the space left after their label. The fiscal code,
//! IBAN and BIC are always printed in full, even if that overruns the margin.

use crate::config::RenderConfig;
use crate::schema::{placeholder_or, DirectDebitMandate, CREDITOR_SCHEME_ID, MANDATE_REFERENCE};
use crate::typesetter::{Canvas, Cursor, Typesetter};
use crate::Result;
use pdf_core::MM;

pub const MARGIN_MM: f64 = 20.0;
const TOP_MM: f64 = 25.0;
const TITLE_SIZE: f32 = 14.0;
const BODY_SIZE: f32 = 10.5;
const LINE_HEIGHT: f64 = 15.0;

const AUTHORIZATION: &str = "Con la sottoscrizione del presente mandato il debitore autorizza il \
creditore a disporre sul conto indicato addebiti in via continuativa relativi alle rate del \
finanziamento e la propria banca a eseguire tali addebiti conformemente alle disposizioni \
impartite dal creditore.";

const CLAUSES: &[&str] = &[
    "Il debitore ha diritto di richiedere alla propria banca il rimborso di quanto addebitato \
     entro 8 settimane dalla data di addebito, alle condizioni previste dal contratto con la banca.",
    "Il debitore puo revocare il mandato in qualsiasi momento dandone comunicazione al creditore \
     e alla propria banca.",
    "I diritti del debitore sono indicati in un documento ottenibile dalla propria banca.",
];

/// Cursor at the top-left of an A4 mandate page, bottom-left origin
pub fn first_line_cursor(page_height: f64) -> Cursor {
    Cursor::new(
        MARGIN_MM * MM,
        page_height - TOP_MM * MM,
        LINE_HEIGHT,
        BODY_SIZE,
    )
}

/// Place the whole mandate
///
/// `content_width` is the horizontal budget from the left margin.
pub fn typeset_mandate<C: Canvas>(
    ts: &mut Typesetter<C>,
    mandate: &DirectDebitMandate,
    config: &RenderConfig,
    content_width: f64,
) -> Result<()> {
    let issuer = &config.issuer;

    ts.place_line("Mandato per addebito diretto SEPA", true, TITLE_SIZE)?;
    ts.newline(1);
    ts.set_font_size(BODY_SIZE);
    ts.place_label_value("Riferimento del mandato: ", MANDATE_REFERENCE, true, false)?;
    ts.place_label_value("Identificativo del creditore: ", CREDITOR_SCHEME_ID, true, false)?;
    ts.newline(1);

    ts.place_line("Dati del debitore", true, BODY_SIZE)?;
    place_clipped(ts, "Nome e cognome: ", &mandate.payer_name, content_width)?;
    place_clipped(ts, "Indirizzo: ", &mandate.address, content_width)?;
    place_clipped(ts, "Citta e provincia: ", &mandate.city, content_width)?;
    place_clipped(ts, "Paese: ", &mandate.country, content_width)?;
    ts.place_label_value("Codice fiscale: ", placeholder_or(&mandate.fiscal_code), true, false)?;
    ts.place_label_value("IBAN: ", placeholder_or(&mandate.iban), true, false)?;
    ts.place_label_value("BIC: ", placeholder_or(&mandate.bic), true, false)?;
    ts.newline(1);

    ts.place_paragraph(AUTHORIZATION, content_width, false)?;
    ts.newline(1);

    ts.place_line("Creditore", true, BODY_SIZE)?;
    ts.place_line(&issuer.lender_name, false, BODY_SIZE)?;
    for line in &issuer.creditor_address_lines {
        let line = ts.clip_to_width(line, content_width, false);
        ts.place_line(line, false, BODY_SIZE)?;
    }
    ts.newline(1);

    ts.place_line("Intermediario del credito", true, BODY_SIZE)?;
    ts.place_line(&issuer.intermediary_name, false, BODY_SIZE)?;
    ts.place_line(&issuer.intermediary_registration, false, BODY_SIZE)?;
    ts.newline(1);

    for clause in CLAUSES {
        ts.place_paragraph(clause, content_width, false)?;
    }
    ts.newline(2);

    ts.place_label_value("Luogo e data: ", "____________________", true, false)?;
    ts.newline(1);
    ts.place_label_value("Firma del debitore: ", "____________________", true, false)?;
    Ok(())
}

/// Label and free-text value, the value clipped to what is left of the line
fn place_clipped<C: Canvas>(
    ts: &mut Typesetter<C>,
    label: &str,
    value: &str,
    content_width: f64,
) -> Result<()> {
    let size = ts.cursor().font_size;
    let budget = content_width - ts.measure_width(label, true, size);
    let value = ts.clip_to_width(placeholder_or(value), budget, false);
    ts.place_label_value(label, value, true, false)
}
