//! PDF packing list with shipper/consignee blocks and a paginated items
//! table.
//!
//! Pagination is a pure chunking function so the page-break behaviour is
//! testable without parsing PDF bytes. When the items table exhausts the
//! vertical space of a page, rendering continues on the next page; rows are
//! never dropped.

use std::io::BufWriter;

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference};

use crate::domain::shipping::{ManifestLine, Party};
use crate::error::{ProviderError, ProviderResult};

/// A4 portrait.
const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;

/// Items table rows that fit one page below the address blocks.
pub const ROWS_PER_PAGE: usize = 34;

const MARGIN_MM: f32 = 15.0;
const ROW_HEIGHT_MM: f32 = 6.0;
const BODY_FONT_SIZE: f32 = 9.0;
const HEADER_FONT_SIZE: f32 = 14.0;

/// Split items into page-sized chunks; the concatenation always equals the
/// input.
pub fn paginate<T>(items: &[T], rows_per_page: usize) -> Vec<&[T]> {
    if rows_per_page == 0 {
        return vec![items];
    }
    items.chunks(rows_per_page).collect()
}

/// Render the packing list for one booking.
pub fn render_packing_list(
    booking_reference: &str,
    shipper: &Party,
    consignee: &Party,
    lines: &[ManifestLine],
) -> ProviderResult<Vec<u8>> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        format!("Packing List {booking_reference}"),
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "content",
    );
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ProviderError::Artifact(format!("packing list font: {e}")))?;
    let font_bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ProviderError::Artifact(format!("packing list font: {e}")))?;

    let pages = paginate(lines, ROWS_PER_PAGE);
    let total_pages = pages.len();

    for (page_index, page_lines) in pages.iter().enumerate() {
        let (page, layer) = if page_index == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "content")
        };
        render_page(
            &doc,
            page,
            layer,
            &font,
            &font_bold,
            booking_reference,
            shipper,
            consignee,
            page_lines,
            page_index + 1,
            total_pages,
        );
    }

    let mut buffer = Vec::new();
    doc.save(&mut BufWriter::new(&mut buffer))
        .map_err(|e| ProviderError::Artifact(format!("packing list save: {e}")))?;
    Ok(buffer)
}

#[allow(clippy::too_many_arguments)]
fn render_page(
    doc: &PdfDocumentReference,
    page: printpdf::PdfPageIndex,
    layer: printpdf::PdfLayerIndex,
    font: &IndirectFontRef,
    font_bold: &IndirectFontRef,
    booking_reference: &str,
    shipper: &Party,
    consignee: &Party,
    lines: &[ManifestLine],
    page_number: usize,
    total_pages: usize,
) {
    let layer = doc.get_page(page).get_layer(layer);
    let mut cursor = PAGE_HEIGHT_MM - MARGIN_MM;

    layer.use_text(
        format!("PACKING LIST — {booking_reference}"),
        HEADER_FONT_SIZE,
        Mm(MARGIN_MM),
        Mm(cursor),
        font_bold,
    );
    layer.use_text(
        format!("Page {page_number} of {total_pages}"),
        BODY_FONT_SIZE,
        Mm(PAGE_WIDTH_MM - MARGIN_MM - 30.0),
        Mm(cursor),
        font,
    );
    cursor -= 12.0;

    // Shipper and consignee blocks, side by side.
    for (label, party, x) in [
        ("SHIPPER", shipper, MARGIN_MM),
        ("CONSIGNEE", consignee, PAGE_WIDTH_MM / 2.0),
    ] {
        let mut block_cursor = cursor;
        layer.use_text(label, BODY_FONT_SIZE, Mm(x), Mm(block_cursor), font_bold);
        block_cursor -= 5.0;
        for text in [
            party.name.clone(),
            party.address_line.clone(),
            format!("{} {}", party.postal_code, party.city),
            party.country_code.clone(),
        ] {
            layer.use_text(text, BODY_FONT_SIZE, Mm(x), Mm(block_cursor), font);
            block_cursor -= 5.0;
        }
    }
    cursor -= 32.0;

    // Items table header.
    let columns: [(f32, &str); 5] = [
        (MARGIN_MM, "Order"),
        (MARGIN_MM + 35.0, "SKU"),
        (MARGIN_MM + 70.0, "Description"),
        (MARGIN_MM + 140.0, "Qty"),
        (MARGIN_MM + 155.0, "Weight kg"),
    ];
    for (x, title) in columns {
        layer.use_text(title, BODY_FONT_SIZE, Mm(x), Mm(cursor), font_bold);
    }
    cursor -= ROW_HEIGHT_MM;

    for line in lines {
        layer.use_text(line.order_ref.as_str(), BODY_FONT_SIZE, Mm(columns[0].0), Mm(cursor), font);
        layer.use_text(line.sku.as_str(), BODY_FONT_SIZE, Mm(columns[1].0), Mm(cursor), font);
        layer.use_text(line.description.as_str(), BODY_FONT_SIZE, Mm(columns[2].0), Mm(cursor), font);
        layer.use_text(
            line.quantity.to_string(),
            BODY_FONT_SIZE,
            Mm(columns[3].0),
            Mm(cursor),
            font,
        );
        layer.use_text(
            format!("{:.2}", line.weight_kg.round_dp(2)),
            BODY_FONT_SIZE,
            Mm(columns[4].0),
            Mm(cursor),
            font,
        );
        cursor -= ROW_HEIGHT_MM;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn lines(n: usize) -> Vec<ManifestLine> {
        (0..n)
            .map(|i| ManifestLine {
                order_ref: format!("ORD-{i}"),
                sku: format!("SKU-{i}"),
                description: "Stoneware bowl".to_string(),
                quantity: 1,
                weight_kg: dec!(0.9),
                value_eur: dec!(18.00),
                hs_code: "691200".to_string(),
            })
            .collect()
    }

    fn party() -> Party {
        Party {
            name: "TradeHaven Fulfilment".to_string(),
            company: None,
            address_line: "Hafenstrasse 12".to_string(),
            city: "Hamburg".to_string(),
            postal_code: "20457".to_string(),
            country_code: "DE".to_string(),
            email: None,
            phone: None,
        }
    }

    #[test]
    fn pagination_never_drops_rows() {
        let items = lines(ROWS_PER_PAGE * 2 + 5);
        let pages = paginate(&items, ROWS_PER_PAGE);
        assert_eq!(pages.len(), 3);
        let total: usize = pages.iter().map(|p| p.len()).sum();
        assert_eq!(total, items.len());
        assert!(pages.iter().all(|p| p.len() <= ROWS_PER_PAGE));
        assert_eq!(pages[2].len(), 5);
    }

    #[test]
    fn single_page_for_small_bookings() {
        let items = lines(4);
        assert_eq!(paginate(&items, ROWS_PER_PAGE).len(), 1);
    }

    #[test]
    fn renders_nonempty_pdf_for_multi_page_input() {
        let items = lines(ROWS_PER_PAGE + 1);
        let bytes = render_packing_list("SEA-1700000000", &party(), &party(), &items).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 1000);
    }
}
