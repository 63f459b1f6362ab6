use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::{ProbeError, Result};

/// Parses `Key: Value` lines into a header map. Blank entries are skipped and
/// repeated keys are appended, not replaced.
pub fn parse_header_lines<'a, I>(lines: I) -> Result<HeaderMap>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut headers = HeaderMap::new();

    for line in lines {
        let raw = line.trim();
        if raw.is_empty() {
            continue;
        }

        let (key, value) = raw
            .split_once(':')
            .ok_or_else(|| ProbeError::InvalidHeader(format!("expected `Key: Value`, got `{raw}`")))?;
        let key = key.trim();
        let value = value.trim();
        if key.is_empty() {
            return Err(ProbeError::InvalidHeader(format!("header key is empty: `{raw}`")));
        }

        let header_name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| ProbeError::InvalidHeader(format!("invalid header key `{key}`: {e}")))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| ProbeError::InvalidHeader(format!("invalid header value `{value}`: {e}")))?;
        headers.append(header_name, header_value);
    }

    Ok(headers)
}
