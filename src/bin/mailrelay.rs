//! Only the email endpoint, for deployments where the pages are
//! served from elsewhere.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use website::apachelog::Logs;
use website::mail::EmailRelay;
use website::util::{getenv_or, log_basedir};
use website::webparts::{SEND_EMAIL_PATH, SiteRouter, serve};
use website::info;

#[derive(clap::Parser, Debug)]
/// Relay contact form submissions (JSON POSTed to /api/send-email)
/// via SMTP. Configured through EMAIL_USER, EMAIL_PASSWORD, MAIL_TO
/// and SMTP_RELAY.
struct Opts {
    /// Address to listen on (env LISTEN_HTTP, default 127.0.0.1:3001)
    #[clap(long)]
    listen: Option<String>,
}

fn main() -> Result<()> {
    let opts = Opts::parse();
    let listen_addr = match opts.listen {
        Some(a) => a,
        None => getenv_or("LISTEN_HTTP", Some("127.0.0.1:3001"))?,
    };
    let logbasedir = log_basedir()?;
    eprintln!("Logging to dir {logbasedir:?}");

    let mut site = SiteRouter::new(Logs::open_in_basedir(&logbasedir, false)?);
    site.relay = Some(Arc::new(EmailRelay::from_env()?));
    info!("serving {SEND_EMAIL_PATH}");
    serve(listen_addr, Arc::new(site))
}
