//! Extractor configuration: site layouts, exclusion rules, year ranges and
//! the optional YAML config file.
//!
//! The archive site has changed its index format over time, so the URL
//! template, link pattern and exclusion rule are all data rather than code.
//! [`SiteLayout`] bundles the known formats; any piece can be overridden.

use crate::cli::Cli;
use crate::error::{ConfigFileError, Error};
use crate::fetch::{ProxyConfig, TransportConfig};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Placeholder in a base URL template that is replaced by the year.
pub const YEAR_PLACEHOLDER: &str = "{year}";

/// Years scanned back from the current one when nothing else is configured.
pub const DEFAULT_YEAR_SPAN: u32 = 5;

static CURRENT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?im)href="(/issues/[0-9]{4}/[a-z]+/[0-9][0-9]?/)">([^<]+)"#).unwrap()
});

static LEGACY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)href=.(/contents/[0-9]{8}).>([^<]+)").unwrap());

/// Known formats of the archive's yearly index pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SiteLayout {
    /// `/issues/YYYY/` index pages linking `/issues/YYYY/mon/D/`.
    #[default]
    Current,
    /// Pre-2010 `archives/browse?year=YYYY` pages linking `/contents/YYYYMMDD`.
    Legacy,
}

impl SiteLayout {
    pub fn site(self) -> &'static str {
        match self {
            SiteLayout::Current => "https://www.nybooks.com",
            SiteLayout::Legacy => "http://www.nybooks.com",
        }
    }

    pub fn base_url_template(self) -> &'static str {
        match self {
            SiteLayout::Current => "https://www.nybooks.com/issues/{year}/",
            SiteLayout::Legacy => "http://www.nybooks.com/archives/browse?year={year}",
        }
    }

    pub fn link_pattern(self) -> &'static Regex {
        match self {
            SiteLayout::Current => &CURRENT_PATTERN,
            SiteLayout::Legacy => &LEGACY_PATTERN,
        }
    }

    /// The current layout lists "Volume ..." summaries next to real issues.
    pub fn exclusion(self) -> Exclusion {
        match self {
            SiteLayout::Current => Exclusion::LeadingChar('V'),
            SiteLayout::Legacy => Exclusion::Nothing,
        }
    }
}

/// Rule deciding which matched labels are not real issues.
#[derive(Clone, Default)]
pub enum Exclusion {
    #[default]
    Nothing,
    LeadingChar(char),
    Prefix(String),
    Predicate(Arc<dyn Fn(&str) -> bool + Send + Sync>),
}

impl Exclusion {
    /// Returns `true` when `label` must be discarded.
    pub fn matches(&self, label: &str) -> bool {
        match self {
            Exclusion::Nothing => false,
            Exclusion::LeadingChar(c) => label.starts_with(*c),
            Exclusion::Prefix(prefix) => label.starts_with(prefix.as_str()),
            Exclusion::Predicate(f) => f(label),
        }
    }
}

impl fmt::Debug for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exclusion::Nothing => f.write_str("Nothing"),
            Exclusion::LeadingChar(c) => f.debug_tuple("LeadingChar").field(c).finish(),
            Exclusion::Prefix(p) => f.debug_tuple("Prefix").field(p).finish(),
            Exclusion::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// Inclusive range of years to scan, always ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub first: i32,
    pub last: i32,
}

impl YearRange {
    /// `[current_year - span, current_year]`.
    pub fn ending_at(current_year: i32, span: u32) -> Self {
        let span = i32::try_from(span).unwrap_or(i32::MAX);
        Self {
            first: current_year.saturating_sub(span),
            last: current_year,
        }
    }

    pub fn years(&self) -> RangeInclusive<i32> {
        self.first..=self.last
    }
}

/// Everything the issue extractor needs to know about the site.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    year_span: u32,
    base_url_template: String,
    link_pattern: Regex,
    exclude: Exclusion,
}

impl ExtractorConfig {
    /// Build a validated configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidYearSpan`] if `year_span` is zero
    /// - [`Error::InvalidTemplate`] if the template lacks `{year}`
    /// - [`Error::Pattern`] if the pattern does not compile
    /// - [`Error::CaptureGroups`] unless the pattern has exactly two groups
    pub fn new(
        base_url_template: impl Into<String>,
        link_pattern: &str,
        exclude: Exclusion,
        year_span: u32,
    ) -> Result<Self, Error> {
        let link_pattern = Regex::new(link_pattern)?;
        Self::from_parts(base_url_template.into(), link_pattern, exclude, year_span)
    }

    /// Preset for one of the known site layouts.
    pub fn for_layout(layout: SiteLayout) -> Self {
        Self {
            year_span: DEFAULT_YEAR_SPAN,
            base_url_template: layout.base_url_template().to_string(),
            link_pattern: layout.link_pattern().clone(),
            exclude: layout.exclusion(),
        }
    }

    fn from_parts(
        base_url_template: String,
        link_pattern: Regex,
        exclude: Exclusion,
        year_span: u32,
    ) -> Result<Self, Error> {
        if year_span == 0 {
            return Err(Error::InvalidYearSpan(year_span));
        }
        if !base_url_template.contains(YEAR_PLACEHOLDER) {
            return Err(Error::InvalidTemplate(base_url_template));
        }
        // captures_len counts the implicit whole-match group
        let found = link_pattern.captures_len() - 1;
        if found != 2 {
            return Err(Error::CaptureGroups { found });
        }
        Ok(Self {
            year_span,
            base_url_template,
            link_pattern,
            exclude,
        })
    }

    pub fn year_span(&self) -> u32 {
        self.year_span
    }

    pub fn link_pattern(&self) -> &Regex {
        &self.link_pattern
    }

    pub fn exclude(&self) -> &Exclusion {
        &self.exclude
    }

    pub fn url_for_year(&self, year: i32) -> String {
        self.base_url_template
            .replace(YEAR_PLACEHOLDER, &year.to_string())
    }

    pub fn year_range(&self, current_year: i32) -> YearRange {
        YearRange::ending_at(current_year, self.year_span)
    }
}

/// Contents of the optional YAML config file. Every key is optional.
///
/// ```yaml
/// layout: current
/// years: 10
/// exclude_leading: V
/// timeout_secs: 30
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub site: Option<String>,
    pub layout: Option<SiteLayout>,
    pub years: Option<u32>,
    pub base_url: Option<String>,
    pub pattern: Option<String>,
    pub exclude_leading: Option<char>,
    pub timeout_secs: Option<u64>,
}

impl FileConfig {
    #[instrument(level = "info", skip_all, fields(%path))]
    pub fn load(path: &str) -> Result<Self, Error> {
        let read = || -> Result<Self, ConfigFileError> {
            let text = std::fs::read_to_string(path)?;
            Ok(serde_yaml::from_str(&text)?)
        };
        read().map_err(|source| Error::ConfigFile {
            path: path.to_string(),
            source,
        })
    }
}

/// Fully resolved settings for one run of the binary.
#[derive(Debug)]
pub struct Settings {
    pub site: String,
    pub extractor: ExtractorConfig,
    pub transport: TransportConfig,
}

impl Settings {
    /// Merge CLI flags over file values over the layout preset.
    pub fn resolve(cli: &Cli, file: FileConfig) -> Result<Self, Error> {
        let layout = cli.layout.or(file.layout).unwrap_or_default();
        let preset = ExtractorConfig::for_layout(layout);

        let template = cli
            .base_url
            .clone()
            .or(file.base_url)
            .unwrap_or_else(|| layout.base_url_template().to_string());
        let pattern = match cli.pattern.as_deref().or(file.pattern.as_deref()) {
            Some(p) => Regex::new(p)?,
            None => preset.link_pattern.clone(),
        };
        let exclude = match cli.exclude_leading.or(file.exclude_leading) {
            Some(c) => Exclusion::LeadingChar(c),
            None => preset.exclude.clone(),
        };
        let years = cli.years.or(file.years).unwrap_or(DEFAULT_YEAR_SPAN);
        let extractor = ExtractorConfig::from_parts(template, pattern, exclude, years)?;

        let site = cli
            .site
            .clone()
            .or(file.site)
            .unwrap_or_else(|| layout.site().to_string());
        url::Url::parse(&site).map_err(|source| Error::Site {
            site: site.clone(),
            source,
        })?;

        let mut transport = TransportConfig::default();
        if let Some(secs) = cli.timeout_secs.or(file.timeout_secs) {
            transport.connect_timeout = Duration::from_secs(secs);
        }
        transport.proxy = cli.proxy_host.as_ref().map(|host| ProxyConfig {
            kind: cli.proxy_type,
            host: host.clone(),
            port: cli.proxy_port,
            username: cli.proxy_user.clone(),
            password: cli.proxy_password.clone(),
        });

        debug!(?layout, %site, years, "Resolved settings");
        Ok(Self {
            site,
            extractor,
            transport,
        })
    }
}
