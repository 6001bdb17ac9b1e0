use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use farebox::application::dispatch::NotificationDispatcher;
use farebox::application::engine::TransferEngine;
use farebox::application::gate::AssignmentGate;
use farebox::application::registry::WalletRegistry;
use farebox::domain::ports::{LedgerStoreBox, WalletStoreBox};
use farebox::domain::wallet::{WalletKind, WalletOwner};
use farebox::infrastructure::in_memory::{InMemoryLedger, LogTransport};
use farebox::interfaces::csv::request_reader::{RequestReader, TransferRequest};
use farebox::interfaces::csv::wallet_writer::WalletWriter;
use farebox::interfaces::fixture::DirectoryFixture;
use miette::{IntoDiagnostic, Result};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input transfer requests CSV file
    requests: PathBuf,

    /// Directory fixture (users, buses, bank accounts, assignments)
    #[arg(long)]
    directory: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[cfg(feature = "storage-rocksdb")]
    #[arg(long)]
    db_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let fixture = DirectoryFixture::load(&cli.directory).into_diagnostic()?;
    let bus_ids: Vec<_> = fixture.buses.iter().map(|bus| bus.id).collect();
    let directory = fixture.into_directory().await;

    let (wallet_store, state_store, ledger_store) = build_stores(&cli).into_diagnostic()?;

    // Bus wallets are opened at onboarding by the platform; the CLI stands
    // in for it here. Passenger and owner wallets activate lazily.
    let wallets = WalletRegistry::new(wallet_store);
    for bus in bus_ids {
        wallets
            .open(WalletKind::Bus, WalletOwner::Bus(bus))
            .await
            .into_diagnostic()?;
    }

    let engine = TransferEngine::new(
        Box::new(directory.clone()),
        wallets,
        ledger_store,
        AssignmentGate::new(Box::new(directory)),
        NotificationDispatcher::new(Box::new(LogTransport)),
    );

    let file = File::open(&cli.requests).into_diagnostic()?;
    for request in RequestReader::new(file).requests() {
        let outcome = match request {
            Ok(TransferRequest::Payment(req)) => engine.pay(req).await.map(|_| ()),
            Ok(TransferRequest::Recharge(req)) => engine.recharge(req).await.map(|_| ()),
            Ok(TransferRequest::Withdraw(req)) => engine.withdraw(req).await.map(|_| ()),
            Err(err) => {
                warn!("skipping bad request row: {err}");
                continue;
            }
        };
        if let Err(err) = outcome {
            warn!("request rejected: {err}");
        }
    }

    let wallets = state_store.all().await.into_diagnostic()?;
    let stdout = std::io::stdout();
    let mut writer = WalletWriter::new(stdout.lock());
    writer.write_wallets(wallets).into_diagnostic()?;

    Ok(())
}

fn build_stores(
    _cli: &Cli,
) -> farebox::error::Result<(WalletStoreBox, WalletStoreBox, LedgerStoreBox)> {
    #[cfg(feature = "storage-rocksdb")]
    if let Some(path) = &_cli.db_path {
        let store = farebox::infrastructure::rocksdb::RocksDbLedger::open(path)?;
        return Ok((
            Box::new(store.clone()),
            Box::new(store.clone()),
            Box::new(store),
        ));
    }

    let store = InMemoryLedger::new();
    Ok((
        Box::new(store.clone()),
        Box::new(store.clone()),
        Box::new(store),
    ))
}
