//! Copy one blob between two storage accounts in staged blocks.
//!
//! This is the wiring layer: it reads connection strings from the
//! environment, issues a short-lived read-scoped SAS token for the source,
//! and drives a transfer against the destination. Usage:
//!
//! ```shell
//! export BLOB_SOURCE_CONNECTION_STRING="AccountName=...;AccountKey=..."
//! export BLOB_TARGET_CONNECTION_STRING="AccountName=...;AccountKey=..."
//! cargo run --example blob_to_blob -- <source-container> <target-container> <blob-name>
//! ```

use anyhow::anyhow;
use anyhow::Context as _;
use anyhow::Result;

use blobport::BlobClient;
use blobport::Config;
use blobport::Credential;
use blobport::MemorySource;
use blobport::SasPermissions;
use blobport::ServiceSas;
use blobport::Transfer;
use blobport::TransferOptions;
use blobport::TransferOutcome;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenv::dotenv();
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let source_container = args.next().unwrap_or_else(|| "large-blob".to_string());
    let target_container = args.next().unwrap_or_else(|| "target-container".to_string());
    let blob_name = args.next().unwrap_or_else(|| "100MB.zip".to_string());

    let source_config = Config::from_connection_string(
        &std::env::var("BLOB_SOURCE_CONNECTION_STRING")
            .context("BLOB_SOURCE_CONNECTION_STRING is not set")?,
    )?;
    let target_config = Config::from_connection_string(
        &std::env::var("BLOB_TARGET_CONNECTION_STRING")
            .context("BLOB_TARGET_CONNECTION_STRING is not set")?,
    )?;

    // Read the source through a read-scoped SAS token instead of its key.
    let source_account = source_config
        .account_name
        .clone()
        .ok_or_else(|| anyhow!("source account name missing from connection string"))?;
    let source_key = source_config
        .account_key
        .clone()
        .ok_or_else(|| anyhow!("source account key missing from connection string"))?;
    let sas = ServiceSas::new(
        &source_account,
        &source_key,
        &source_container,
        SasPermissions::read(),
    );
    let source_credential = Credential::with_sas_token(&sas.token_string()?);

    let source = BlobClient::new(
        source_config.locator(&source_container, &blob_name)?,
        source_credential,
    );
    println!("downloading {}", source.locator().blob_url());
    let data = source.get().await?;
    println!("downloaded {} bytes", data.len());

    let target = BlobClient::new(
        target_config.locator(&target_container, &blob_name)?,
        target_config.credential()?,
    );
    let transfer = Transfer::new(target).with_options(TransferOptions {
        chunk_size: 8 * 1024 * 1024,
        ..TransferOptions::default()
    });

    let result = transfer.run(MemorySource::new(data)).await?;
    match &result.outcome {
        TransferOutcome::Success => println!(
            "transferred {} bytes in {:.2?}",
            result.bytes_transferred, result.elapsed
        ),
        TransferOutcome::AlreadyExists => println!("target blob already exists, nothing to do"),
        TransferOutcome::Failed(error) => println!(
            "transfer failed on chunks {:?}: {error}",
            result.failed_indices
        ),
    }

    Ok(())
}
