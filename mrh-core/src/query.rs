//! Shareable links for the current view.

use crate::config::DataConfig;
use crate::controls::FORM_FIELDS;
use crate::error::{MrhError, MrhResult};
use crate::types::{GenomicPos, Viewport};
use std::collections::HashMap;

/// Encode dataset and viewport as a query string, fields in form order.
pub fn to_query(config: &DataConfig) -> String {
    let vp = config.viewport();
    let values = [
        config.dataset_id().to_string(),
        vp.chrom1.clone(),
        vp.start1.to_string(),
        vp.stop1.to_string(),
        vp.chrom2.clone(),
        vp.start2.to_string(),
        vp.stop2.to_string(),
    ];
    FORM_FIELDS
        .iter()
        .zip(values.iter())
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Replace everything after the first `?` in `href` with `query`.
pub fn with_query(href: &str, query: &str) -> String {
    let base = href.split_once('?').map_or(href, |(base, _)| base);
    format!("{}?{}", base, query)
}

/// Parse a link produced by [`to_query`] back into dataset id and viewport.
///
/// Unknown keys are ignored. The viewport is not clamped.
pub fn parse_query(query: &str) -> MrhResult<(String, Viewport)> {
    let query = query.trim_start_matches('?');
    let mut params = HashMap::new();
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, raw) = pair.split_once('=').unwrap_or((pair, ""));
        let value = urlencoding::decode(&raw.replace('+', " "))
            .map_err(|_| MrhError::invalid_field(key, raw))?
            .into_owned();
        params.insert(key.to_string(), value);
    }

    let text = |name: &str| -> MrhResult<String> {
        params
            .get(name)
            .filter(|v| !v.is_empty())
            .cloned()
            .ok_or_else(|| MrhError::MissingField(name.to_string()))
    };
    let number = |name: &str| -> MrhResult<GenomicPos> {
        let value = text(name)?;
        value.parse().map_err(|_| MrhError::invalid_field(name, value))
    };

    let viewport = Viewport::new(
        text("chrom1")?,
        number("start1")?,
        number("stop1")?,
        text("chrom2")?,
        number("start2")?,
        number("stop2")?,
    );
    Ok((text("dataset_id")?, viewport))
}

/// Somewhere to publish the current link.
pub trait AddressBar {
    fn current_url(&self) -> String;
    fn push_state(&mut self, url: String);
}

/// Address bar that just records history.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistory {
    entries: Vec<String>,
    initial: String,
}

impl MemoryHistory {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            entries: Vec::new(),
            initial: initial.into(),
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

impl AddressBar for MemoryHistory {
    fn current_url(&self) -> String {
        self.entries.last().cloned().unwrap_or_else(|| self.initial.clone())
    }

    fn push_state(&mut self, url: String) {
        self.entries.push(url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HeaderPolicy, Source};
    use crate::types::Header;

    fn config() -> DataConfig {
        let source = Source::new("my data/1", vec![Header::new("chr1", 0, 10_000, 0.0, 1.0)]).unwrap();
        DataConfig::new(source, Viewport::square("chr1", 200, 1200), HeaderPolicy::Chrom1).unwrap()
    }

    #[test]
    fn test_query_field_order_and_escaping() {
        let q = to_query(&config());
        assert_eq!(
            q,
            "dataset_id=my%20data%2F1&chrom1=chr1&start1=200&stop1=1200&chrom2=chr1&start2=200&stop2=1200"
        );
    }

    #[test]
    fn test_with_query_replaces_existing() {
        assert_eq!(with_query("http://h/v?a=1&b=2", "x=3"), "http://h/v?x=3");
        assert_eq!(with_query("http://h/v", "x=3"), "http://h/v?x=3");
    }

    #[test]
    fn test_parse_query_reads_link() {
        let cfg = config();
        let (id, vp) = parse_query(&format!("?{}", to_query(&cfg))).unwrap();
        assert_eq!(id, "my data/1");
        assert_eq!(&vp, cfg.viewport());
    }

    #[test]
    fn test_parse_query_missing_field() {
        let err = parse_query("dataset_id=a&chrom1=chr1&start1=0&stop1=10&chrom2=chr1&start2=0").unwrap_err();
        assert!(matches!(err, MrhError::MissingField(f) if f == "stop2"));
    }

    #[test]
    fn test_link_with_overflowing_span_is_rejected() {
        let mut cfg = config();
        let link = format!(
            "dataset_id=x&chrom1=chr1&start1=-5&stop1={}&chrom2=chr1&start2=0&stop2=10",
            i64::MAX
        );
        let (_, vp) = parse_query(&link).unwrap();
        assert!(matches!(cfg.set_viewport(vp), Err(MrhError::InvalidViewport(_))));
        assert_eq!(cfg.viewport(), &Viewport::square("chr1", 200, 1200));
    }

    #[test]
    fn test_memory_history() {
        let mut bar = MemoryHistory::new("http://h/v");
        assert_eq!(bar.current_url(), "http://h/v");
        bar.push_state("http://h/v?x=1".into());
        assert_eq!(bar.current_url(), "http://h/v?x=1");
        assert_eq!(bar.entries().len(), 1);
    }
}
