//! dashboard-launcher: start the dashboard server and keep it supervised.

use dl_launcher::{DashboardCli, Variant};

use std::process::ExitCode;

use clap::Parser;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = DashboardCli::parse();
    dl_launcher::run(Variant::Dashboard, cli.into_args()).await
}
