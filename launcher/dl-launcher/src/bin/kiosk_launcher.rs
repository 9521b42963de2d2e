//! kiosk-launcher: unattended variant with server output discarded.

use dl_launcher::{KioskCli, Variant};

use std::process::ExitCode;

use clap::Parser;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = KioskCli::parse();
    dl_launcher::run(Variant::Kiosk, cli.into_args()).await
}
