pub(crate) fn truncate_utf8(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes.min(s.len());
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

pub(crate) fn redact_text(mut text: String, secret: Option<&str>) -> String {
    let Some(secret) = secret else {
        return text;
    };

    if !secret.is_empty() {
        text = text.replace(secret, "<redacted>");
    }
    text
}

/// Lossy, truncated and redacted rendering of a raw body for logs.
pub(crate) fn body_for_log(body: Option<&[u8]>, max_bytes: usize, secret: Option<&str>) -> String {
    let Some(body) = body else {
        return String::new();
    };
    let text = redact_text(String::from_utf8_lossy(body).into_owned(), secret);
    truncate_utf8(&text, max_bytes).to_owned()
}
