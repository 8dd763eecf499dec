//! Runtime settings of the site server, from the command line with
//! fallbacks from the environment.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, Context, anyhow};

use crate::route::LinkStyle;
use crate::util::{getenv, getenv_or, getenv_parsed};

pub const DEFAULT_LISTEN_HTTP: &str = "127.0.0.1:3000";
pub const DEFAULT_DATADIR: &str = "data";
pub const DEFAULT_CONTENT_POLL_SECS: u64 = 5;

#[derive(clap::Parser, Debug, Default)]
/// Serve the FTTG Solutions website. Options override the
/// corresponding environment variables.
pub struct Opts {
    /// Address to listen on (env LISTEN_HTTP, default 127.0.0.1:3000)
    #[clap(long)]
    pub listen: Option<String>,

    /// Directory holding json/ and static/ (env DATADIR, default
    /// "data")
    #[clap(long)]
    pub datadir: Option<PathBuf>,

    /// "path" for clean URLs or "hash" for #fragment links (env
    /// LINK_STYLE, default "path")
    #[clap(long)]
    pub link_style: Option<String>,

    /// Seconds between checks for changed content files, 0 disables
    /// (env CONTENT_POLL_SECS, default 5)
    #[clap(long)]
    pub poll_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    pub listen_addr: String,
    pub datadir: PathBuf,
    pub link_style: LinkStyle,
    /// None: no polling.
    pub poll_interval: Option<Duration>,
    /// Absolute URL the contact form posts to; None means the
    /// in-process email relay.
    pub form_api_endpoint: Option<String>,
}

impl SiteConfig {
    pub fn from_opts_and_env(opts: &Opts) -> Result<SiteConfig> {
        let listen_addr = match &opts.listen {
            Some(a) => a.clone(),
            None => getenv_or("LISTEN_HTTP", Some(DEFAULT_LISTEN_HTTP))?,
        };
        let datadir = match &opts.datadir {
            Some(d) => d.clone(),
            None => getenv_or("DATADIR", Some(DEFAULT_DATADIR))?.into(),
        };
        let link_style = match &opts.link_style {
            Some(s) => LinkStyle::from_str(s)?,
            None => match getenv("LINK_STYLE")? {
                Some(s) => LinkStyle::from_str(&s).context("LINK_STYLE env var")?,
                None => LinkStyle::default(),
            }
        };
        let poll_secs = match opts.poll_secs {
            Some(n) => n,
            None => getenv_parsed("CONTENT_POLL_SECS", DEFAULT_CONTENT_POLL_SECS)?,
        };
        let form_api_endpoint = getenv("FORM_API_ENDPOINT")?;
        if let Some(url) = &form_api_endpoint {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(anyhow!("FORM_API_ENDPOINT must be an absolute http(s) URL, \
                                    got {url:?}"))
            }
        }
        Ok(SiteConfig {
            listen_addr,
            datadir,
            link_style,
            poll_interval: (poll_secs > 0).then(|| Duration::from_secs(poll_secs)),
            form_api_endpoint,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_opts_override() -> Result<()> {
        let opts = Opts {
            listen: Some("0.0.0.0:8080".into()),
            datadir: Some("/srv/site".into()),
            link_style: Some("hash".into()),
            poll_secs: Some(0),
        };
        let c = SiteConfig::from_opts_and_env(&opts)?;
        assert_eq!(c.listen_addr, "0.0.0.0:8080");
        assert_eq!(c.datadir, PathBuf::from("/srv/site"));
        assert_eq!(c.link_style, LinkStyle::Hash);
        assert_eq!(c.poll_interval, None);

        let opts = Opts { link_style: Some("fragment".into()), ..Opts::default() };
        assert!(SiteConfig::from_opts_and_env(&opts).is_err());
        Ok(())
    }
}
