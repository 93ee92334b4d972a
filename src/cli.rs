//! Command-line interface definitions for issue_links.
//!
//! Every option can also come from a YAML config file (`--config`); flags
//! given on the command line win over the file, and the file wins over the
//! built-in site layout preset.

use crate::config::SiteLayout;
use crate::fetch::ProxyKind;
use clap::Parser;

/// Command-line arguments for the issue_links application.
///
/// # Examples
///
/// ```sh
/// # Issues from the last five years, printed newest first
/// issue_links
///
/// # Ten years back, also written as JSON
/// issue_links -y 10 -j ./json
///
/// # Through a SOCKS5 proxy
/// issue_links -H proxy.example.com -p 1080
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Archive page layout to scan
    #[arg(long, value_enum)]
    pub layout: Option<SiteLayout>,

    /// How many years back from the current year to scan (the current year is always included)
    #[arg(short, long)]
    pub years: Option<u32>,

    /// Site root that relative issue links are resolved against
    #[arg(long)]
    pub site: Option<String>,

    /// Yearly index URL template; `{year}` is replaced by the year
    #[arg(long)]
    pub base_url: Option<String>,

    /// Link pattern with two capture groups: issue URL, then issue label
    #[arg(long)]
    pub pattern: Option<String>,

    /// Drop issues whose label starts with this character
    #[arg(long)]
    pub exclude_leading: Option<char>,

    /// Output directory for the JSON issue list
    #[arg(short, long)]
    pub json_output_dir: Option<String>,

    /// Connect timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Proxy type
    #[arg(long, value_enum, env = "ISSUE_LINKS_PROXY_TYPE", default_value = "socks5")]
    pub proxy_type: ProxyKind,

    /// Proxy hostname, e.g. proxy.example.com (enables proxying)
    #[arg(short = 'H', long, env = "ISSUE_LINKS_PROXY_HOST")]
    pub proxy_host: Option<String>,

    /// Proxy port number, e.g. 1080
    #[arg(short = 'p', long, env = "ISSUE_LINKS_PROXY_PORT")]
    pub proxy_port: Option<u16>,

    /// Proxy username
    #[arg(short = 'u', long, env = "ISSUE_LINKS_PROXY_USER")]
    pub proxy_user: Option<String>,

    /// Proxy password
    #[arg(short = 'P', long, env = "ISSUE_LINKS_PROXY_PASSWORD", hide_env_values = true)]
    pub proxy_password: Option<String>,
}
