/// Splits a free-text tag field on commas, trimming each fragment.
///
/// Empty fragments are dropped; duplicates and whitespace variants are
/// otherwise left alone, matching how the catalog has always stored tags.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Pulls one cookie's value out of a `Cookie` request header.
pub fn cookie_value<'h>(header: &'h str, name: &str) -> Option<&'h str> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;

        (key.trim() == name).then(|| value.trim())
    })
}
