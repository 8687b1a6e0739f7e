//! CSV manifest — the forwarder's tabular interface.
//!
//! One row per line item, fixed column order. The header is part of the
//! partner contract and must not change:
//! `Booking_Ref,Order_Ref,SKU,Description,Quantity,Weight_KG,Value_EUR,HS_Code`.

use crate::domain::shipping::ManifestLine;
use crate::error::{ProviderError, ProviderResult};

/// Fixed manifest header, in partner-contract order.
pub const MANIFEST_HEADER: [&str; 8] = [
    "Booking_Ref",
    "Order_Ref",
    "SKU",
    "Description",
    "Quantity",
    "Weight_KG",
    "Value_EUR",
    "HS_Code",
];

/// Render the manifest for one booking.
///
/// Never truncates: every line becomes exactly one row. Weight and value
/// are rescaled to two decimals so identical input renders byte-identical
/// output.
pub fn render_manifest(booking_reference: &str, lines: &[ManifestLine]) -> ProviderResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(MANIFEST_HEADER)
        .map_err(|e| ProviderError::Artifact(format!("manifest header: {e}")))?;

    for line in lines {
        writer
            .write_record([
                booking_reference,
                line.order_ref.as_str(),
                line.sku.as_str(),
                line.description.as_str(),
                &line.quantity.to_string(),
                &format!("{:.2}", line.weight_kg.round_dp(2)),
                &format!("{:.2}", line.value_eur.round_dp(2)),
                line.hs_code.as_str(),
            ])
            .map_err(|e| ProviderError::Artifact(format!("manifest row: {e}")))?;
    }

    writer
        .into_inner()
        .map_err(|e| ProviderError::Artifact(format!("manifest flush: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(order: &str, quantity: u32) -> ManifestLine {
        ManifestLine {
            order_ref: order.to_string(),
            sku: format!("SKU-{order}"),
            description: "Linen cushion, 40x40".to_string(),
            quantity,
            weight_kg: dec!(0.75),
            value_eur: dec!(24.5),
            hs_code: "940490".to_string(),
        }
    }

    #[test]
    fn header_matches_partner_contract_exactly() {
        let bytes = render_manifest("SEA-1", &[line("ORD-1", 1)]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(
            header,
            "Booking_Ref,Order_Ref,SKU,Description,Quantity,Weight_KG,Value_EUR,HS_Code"
        );
    }

    #[test]
    fn one_row_per_line_item() {
        let lines = vec![line("ORD-1", 1), line("ORD-1", 3), line("ORD-2", 2)];
        let bytes = render_manifest("SEA-1", &lines).unwrap();

        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let rows: Vec<_> = reader.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows.len(), lines.len());
        assert!(rows.iter().all(|r| &r[0] == "SEA-1"));
        assert_eq!(&rows[1][4], "3");
    }

    #[test]
    fn amounts_are_rescaled_to_two_decimals() {
        let bytes = render_manifest("SEA-1", &[line("ORD-1", 1)]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let row = text.lines().nth(1).unwrap();
        assert!(row.contains("0.75"));
        assert!(row.contains("24.50"), "value must render as 24.50: {row}");
    }
}
