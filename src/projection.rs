//! Stateless helpers deriving display values from place data.

use url::Url;

use crate::PlaceSelection;

/// Builds the search query for a previously stored selection.
///
/// Joins store name, address and area with a single space, skipping parts
/// that are absent or blank. Returns an empty string when nothing is known.
pub fn build_selection_query(selection: &PlaceSelection) -> String {
    [
        selection.suggested_store_name.as_deref(),
        selection.address_line.as_deref(),
        selection.city_area.as_deref(),
    ]
    .into_iter()
    .flatten()
    .map(str::trim)
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(" ")
}

/// Extracts the city area from a formatted address.
///
/// The area is the second-to-last comma-separated segment (the last one is
/// usually the country), or the only segment when there is just one.
///
/// ```
/// use place_picker::projection::parse_city_area;
///
/// assert_eq!(
///     parse_city_area("1-2-3 Jinnan, Shibuya, Japan").as_deref(),
///     Some("Shibuya")
/// );
/// assert_eq!(parse_city_area("Shibuya").as_deref(), Some("Shibuya"));
/// assert_eq!(parse_city_area(" , "), None);
/// ```
pub fn parse_city_area(address: &str) -> Option<String> {
    let segments: Vec<&str> = address
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    match segments.len() {
        0 => None,
        1 => Some(segments[0].to_string()),
        n => Some(segments[n - 2].to_string()),
    }
}

/// Host label for a website, without scheme and `www.` prefix.
///
/// Returns `None` when the URL does not parse or has no host.
pub fn website_label(uri: &str) -> Option<String> {
    let url = Url::parse(uri.trim()).ok()?;
    let host = url.host_str()?;
    let label = host.strip_prefix("www.").unwrap_or(host);
    if label.is_empty() {
        None
    } else {
        Some(label.to_string())
    }
}
