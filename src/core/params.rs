//! Page URL → vendor key and filter selections.

use crate::config::VendorMatch;
use crate::core::filters::FilterSelection;
use crate::errors::AppResult;
use crate::utils::date::parse_date;
use percent_encoding::percent_decode_str;
use url::Url;

/// Lowercase the ASCII letters, turn every run of other characters into one
/// hyphen and trim hyphens from both ends.
///
/// `"Acme Roofing!"` → `acme-roofing`. Applying it twice changes nothing.
pub fn normalize_vendor_key(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    out
}

/// Everything the pipeline reads from the page URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub vendor_key: Option<String>,
    pub filters: FilterSelection,
}

impl PageRequest {
    /// Parse an absolute URL or a bare `/path?query`.
    ///
    /// The vendor key is the last non-empty path segment, else the `vendor`
    /// query parameter, else absent. Filters come from repeated `type`,
    /// `property` and `due` parameters.
    pub fn from_url(raw: &str, mode: VendorMatch) -> AppResult<Self> {
        let url = match Url::parse(raw.trim()) {
            Ok(u) => u,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                Url::parse("http://localhost/")?.join(raw.trim())?
            }
            Err(e) => return Err(e.into()),
        };

        let from_path = url
            .path_segments()
            .and_then(|segs| segs.filter(|s| !s.is_empty()).last())
            .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned());

        let mut from_query = None;
        let mut filters = FilterSelection::default();
        for (k, v) in url.query_pairs() {
            match k.as_ref() {
                "vendor" if from_query.is_none() && !v.trim().is_empty() => {
                    from_query = Some(v.into_owned())
                }
                "type" => filters.types.push(v.into_owned()),
                "property" => filters.properties.push(v.into_owned()),
                "due" => {
                    if let Some(d) = parse_date(&v) {
                        filters.due_dates.push(d);
                    }
                }
                _ => {}
            }
        }

        let vendor_key = from_path
            .or(from_query)
            .map(|k| match mode {
                VendorMatch::Normalized => normalize_vendor_key(&k),
                VendorMatch::Exact => k.trim().to_string(),
            })
            .filter(|k| !k.is_empty());

        Ok(Self {
            vendor_key,
            filters,
        })
    }
}
