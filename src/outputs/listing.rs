//! Plain-text issue listing for the terminal.

use crate::collector::LinkCollector;
use itertools::Itertools;

/// One `name<TAB>url` line per issue, by URL descending.
pub fn render(collector: &LinkCollector) -> String {
    collector
        .by_url_descending()
        .into_iter()
        .map(|(url, name)| format!("{}\t{url}", name.trim()))
        .join("\n")
}
