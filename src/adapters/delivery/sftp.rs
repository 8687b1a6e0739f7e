//! SFTP transport — secure file transfer to the partner's inbox.
//!
//! `ssh2` is a blocking library; the whole session runs inside
//! `spawn_blocking` so the async batch context never stalls on socket I/O.

use std::io::Write;
use std::net::TcpStream;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use ssh2::Session;
use tracing::{info, instrument};

use crate::config::SftpConfig;
use crate::ports::delivery::{DocumentTransport, OutboundDocument};

/// SFTP transport for one configured partner endpoint.
pub struct SftpTransport {
    config: SftpConfig,
}

impl SftpTransport {
    pub fn new(config: SftpConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl DocumentTransport for SftpTransport {
    fn name(&self) -> &'static str {
        "sftp"
    }

    #[instrument(skip(self, documents), fields(files = documents.len()))]
    async fn deliver(
        &self,
        booking_reference: &str,
        documents: &[OutboundDocument],
    ) -> Result<String> {
        let config = self.config.clone();
        let booking_reference = booking_reference.to_string();
        let documents = documents.to_vec();

        let remote_dir = tokio::task::spawn_blocking(move || {
            upload_all(&config, &booking_reference, &documents)
        })
        .await
        .context("SFTP upload task panicked")??;

        info!(remote_dir = %remote_dir, "Documents uploaded via SFTP");
        Ok(remote_dir)
    }
}

/// Open a session, create the booking directory and upload every file.
fn upload_all(
    config: &SftpConfig,
    booking_reference: &str,
    documents: &[OutboundDocument],
) -> Result<String> {
    let address = format!("{}:{}", config.host, config.port);
    let tcp = TcpStream::connect(&address)
        .with_context(|| format!("Failed to connect to SFTP host {address}"))?;

    let mut session = Session::new().context("Failed to create SSH session")?;
    session.set_tcp_stream(tcp);
    session.handshake().context("SSH handshake failed")?;

    let password = config.password.as_deref().unwrap_or_default();
    session
        .userauth_password(&config.username, password)
        .context("SFTP authentication failed")?;

    let sftp = session.sftp().context("Failed to open SFTP channel")?;

    let remote_dir = format!(
        "{}/{}",
        config.base_dir.trim_end_matches('/'),
        booking_reference
    );
    // Already-existing directory (a retried delivery) is fine.
    let _ = sftp.mkdir(Path::new(&remote_dir), 0o755);

    for document in documents {
        let remote_path = format!("{remote_dir}/{}", document.file_name);
        let mut remote_file = sftp
            .create(Path::new(&remote_path))
            .with_context(|| format!("Failed to create remote file {remote_path}"))?;
        remote_file
            .write_all(&document.bytes)
            .with_context(|| format!("Failed to write remote file {remote_path}"))?;
    }

    Ok(remote_dir)
}
