//! Document generation for forwarder bookings.
//!
//! Produces the two artifacts the maritime forwarder consumes: a flat CSV
//! manifest and a paginated PDF packing list. Output is deterministic for
//! identical input. Generated files live in a `tempfile::TempDir` scoped to
//! the booking attempt; dropping the `DocumentSet` removes them on success
//! and failure paths alike, so no orphaned temporaries survive a booking.

pub mod manifest;
pub mod packing_list;

use std::path::PathBuf;

use tempfile::TempDir;
use tracing::debug;

use crate::domain::shipping::{DocumentArtifact, DocumentKind, ManifestLine, Party};
use crate::error::{ProviderError, ProviderResult};
use crate::ports::delivery::OutboundDocument;

/// Generated artifacts plus the temp workspace that owns their files.
#[derive(Debug)]
pub struct DocumentSet {
    /// In-memory copies handed to the delivery channel.
    pub outbound: Vec<OutboundDocument>,
    /// Metadata recorded on the booking.
    pub artifacts: Vec<DocumentArtifact>,
    /// On-disk copies for the duration of the booking attempt.
    pub paths: Vec<PathBuf>,
    _workspace: TempDir,
}

/// Renders manifest and packing list for one consolidated booking.
pub struct DocumentGenerator;

impl DocumentGenerator {
    /// Generate both artifacts into a fresh scoped workspace.
    pub fn generate(
        booking_reference: &str,
        shipper: &Party,
        consignee: &Party,
        lines: &[ManifestLine],
    ) -> ProviderResult<DocumentSet> {
        if lines.is_empty() {
            return Err(ProviderError::Validation(
                "cannot generate documents for an empty line list".to_string(),
            ));
        }

        let workspace = TempDir::new()
            .map_err(|e| ProviderError::Artifact(format!("temp workspace: {e}")))?;

        let manifest_bytes = manifest::render_manifest(booking_reference, lines)?;
        let packing_bytes =
            packing_list::render_packing_list(booking_reference, shipper, consignee, lines)?;

        let manifest_name = format!("{booking_reference}-manifest.csv");
        let packing_name = format!("{booking_reference}-packing-list.pdf");

        let mut paths = Vec::with_capacity(2);
        for (name, bytes) in [(&manifest_name, &manifest_bytes), (&packing_name, &packing_bytes)] {
            let path = workspace.path().join(name);
            std::fs::write(&path, bytes)
                .map_err(|e| ProviderError::Artifact(format!("write {name}: {e}")))?;
            paths.push(path);
        }

        debug!(
            booking_reference,
            manifest_bytes = manifest_bytes.len(),
            packing_bytes = packing_bytes.len(),
            "Documents generated"
        );

        let artifacts = vec![
            DocumentArtifact {
                kind: DocumentKind::ManifestCsv,
                file_name: manifest_name.clone(),
                size_bytes: manifest_bytes.len() as u64,
            },
            DocumentArtifact {
                kind: DocumentKind::PackingListPdf,
                file_name: packing_name.clone(),
                size_bytes: packing_bytes.len() as u64,
            },
        ];

        let outbound = vec![
            OutboundDocument {
                file_name: manifest_name,
                bytes: manifest_bytes,
            },
            OutboundDocument {
                file_name: packing_name,
                bytes: packing_bytes,
            },
        ];

        Ok(DocumentSet {
            outbound,
            artifacts,
            paths,
            _workspace: workspace,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(order: &str, sku: &str) -> ManifestLine {
        ManifestLine {
            order_ref: order.to_string(),
            sku: sku.to_string(),
            description: "Oak shelf".to_string(),
            quantity: 2,
            weight_kg: dec!(3.4),
            value_eur: dec!(49.90),
            hs_code: "940360".to_string(),
        }
    }

    fn party(name: &str) -> Party {
        Party {
            name: name.to_string(),
            company: None,
            address_line: "Pier 4".to_string(),
            city: "Rotterdam".to_string(),
            postal_code: "3011".to_string(),
            country_code: "NL".to_string(),
            email: None,
            phone: None,
        }
    }

    #[test]
    fn generates_both_artifacts_and_cleans_up_workspace() {
        let lines = vec![line("ORD-1", "SKU-1"), line("ORD-2", "SKU-2")];
        let set = DocumentGenerator::generate(
            "SEA-1700000000",
            &party("TradeHaven"),
            &party("Neptune"),
            &lines,
        )
        .unwrap();

        assert_eq!(set.artifacts.len(), 2);
        assert_eq!(set.outbound.len(), 2);
        assert!(set.artifacts.iter().all(|a| a.size_bytes > 0));

        let paths = set.paths.clone();
        assert!(paths.iter().all(|p| p.exists()));
        drop(set);
        assert!(paths.iter().all(|p| !p.exists()), "workspace must clean up");
    }

    #[test]
    fn empty_line_list_is_rejected() {
        let err = DocumentGenerator::generate(
            "SEA-1700000000",
            &party("TradeHaven"),
            &party("Neptune"),
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, ProviderError::Validation(_)));
    }

    #[test]
    fn identical_input_renders_identical_manifest() {
        let lines = vec![line("ORD-1", "SKU-1")];
        let a = DocumentGenerator::generate("SEA-1", &party("S"), &party("C"), &lines).unwrap();
        let b = DocumentGenerator::generate("SEA-1", &party("S"), &party("C"), &lines).unwrap();
        assert_eq!(a.outbound[0].bytes, b.outbound[0].bytes);
    }
}
