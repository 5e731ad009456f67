mod cli;
mod client;

use std::io;

use anyhow::{Context, Result};
use prefpop_core::ApiConfig;
use tracing_subscriber::EnvFilter;

use crate::cli::Session;
use crate::client::{PopulationApi, ResasClient};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let config = ApiConfig::from_env().context("API キーの読み込みに失敗しました")?;
    let client = ResasClient::new(config)?;
    let catalog = client
        .prefectures()
        .context("都道府県一覧の取得に失敗しました")?;

    let mut session = Session::new(catalog);
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    cli::run(&mut session, &client, stdin.lock(), &mut stdout)
}
