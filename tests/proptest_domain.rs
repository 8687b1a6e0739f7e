//! Property-Based Tests — Domain Layer Invariants
//!
//! Uses `proptest` to verify settlement math, manifest generation and
//! routing references across random inputs.

use proptest::prelude::*;
use rust_decimal::Decimal;

use tradehaven_logistics::adapters::documents::manifest::render_manifest;
use tradehaven_logistics::adapters::documents::packing_list::{paginate, ROWS_PER_PAGE};
use tradehaven_logistics::domain::shipping::ManifestLine;
use tradehaven_logistics::domain::statement::VendorStatement;
use tradehaven_logistics::domain::supplier::{SupplierKind, SupplierRef};

fn cents(raw: i64) -> Decimal {
    Decimal::new(raw, 2)
}

// ── Settlement math ─────────────────────────────────────────

proptest! {
    /// Commission plus net payout always reconstructs gross sales.
    #[test]
    fn commission_and_net_sum_to_gross(
        gross_cents in 1i64..10_000_000,
        rate_bps in 1u32..9_999,
    ) {
        let gross = cents(gross_cents);
        let rate = Decimal::new(i64::from(rate_bps), 4);
        let stmt = VendorStatement::compute("v".to_string(), gross, rate, 1);

        prop_assert_eq!(stmt.commission_amount + stmt.net_payout, stmt.gross_sales);
        prop_assert!(stmt.net_payout >= Decimal::ZERO);
        prop_assert!(stmt.commission_amount >= Decimal::ZERO);
        prop_assert!(stmt.net_payout <= stmt.gross_sales);
    }

    /// The commission never exceeds gross times the rate by more than a
    /// rounding cent.
    #[test]
    fn commission_tracks_rate(gross_cents in 1i64..10_000_000) {
        let gross = cents(gross_cents);
        let rate = Decimal::new(8, 2); // 8 %
        let stmt = VendorStatement::compute("v".to_string(), gross, rate, 1);
        let exact = gross * rate;
        let diff = (stmt.commission_amount - exact).abs();
        prop_assert!(diff <= Decimal::new(1, 2), "diff {diff} too large");
    }
}

// ── Pagination ──────────────────────────────────────────────

proptest! {
    /// Chunking never drops or duplicates rows and respects the page size.
    #[test]
    fn pagination_partitions_exactly(len in 0usize..300) {
        let items: Vec<u32> = (0..len as u32).collect();
        let pages = paginate(&items, ROWS_PER_PAGE);

        let total: usize = pages.iter().map(|p| p.len()).sum();
        prop_assert_eq!(total, items.len());
        prop_assert!(pages.iter().all(|p| p.len() <= ROWS_PER_PAGE));

        let rejoined: Vec<u32> = pages.iter().flat_map(|p| p.iter().copied()).collect();
        prop_assert_eq!(rejoined, items);
    }
}

// ── Manifest round-trip ─────────────────────────────────────

fn manifest_line_strategy() -> impl Strategy<Value = ManifestLine> {
    (
        "[A-Z]{3}-[0-9]{1,4}",
        "[A-Z0-9]{4,10}",
        "[A-Za-z ]{1,30}",
        1u32..50,
        1i64..100_000,
        1i64..1_000_000,
    )
        .prop_map(|(order_ref, sku, description, quantity, weight, value)| ManifestLine {
            order_ref,
            sku,
            description,
            quantity,
            weight_kg: cents(weight),
            value_eur: cents(value),
            hs_code: "940360".to_string(),
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Parsing a generated manifest yields one row per line item and the
    /// exact contract header.
    #[test]
    fn manifest_rows_equal_line_items(
        lines in prop::collection::vec(manifest_line_strategy(), 1..40)
    ) {
        let bytes = render_manifest("SEA-1700000000", &lines).unwrap();

        let mut reader = csv::ReaderBuilder::new().from_reader(bytes.as_slice());
        let header = reader.headers().unwrap().clone();
        prop_assert_eq!(
            header.iter().collect::<Vec<_>>(),
            vec![
                "Booking_Ref", "Order_Ref", "SKU", "Description",
                "Quantity", "Weight_KG", "Value_EUR", "HS_Code",
            ]
        );

        let rows: Vec<csv::StringRecord> =
            reader.records().collect::<Result<_, _>>().unwrap();
        prop_assert_eq!(rows.len(), lines.len());
        for (row, line) in rows.iter().zip(&lines) {
            prop_assert_eq!(&row[0], "SEA-1700000000");
            prop_assert_eq!(&row[1], line.order_ref.as_str());
            let quantity_str = line.quantity.to_string();
            prop_assert_eq!(&row[4], quantity_str.as_str());
        }
    }
}

// ── Supplier references ─────────────────────────────────────

proptest! {
    /// Every internal id ever surfaced routes back to its owning supplier.
    #[test]
    fn internal_ids_always_route_back(
        external in "[A-Za-z0-9-]{1,20}",
        eu in any::<bool>(),
    ) {
        let kind = if eu {
            SupplierKind::EuropeanSupplier
        } else {
            SupplierKind::InternationalImport
        };
        let reference = SupplierRef::new(kind, external);
        let parsed = SupplierRef::parse(&reference.internal_id()).unwrap();
        prop_assert_eq!(parsed, reference);
    }
}
