//! Directory listing page

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::io;
use std::path::Path;
use tokio::fs;

/// Everything except RFC 3986 unreserved characters
const LINK_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// One row of the listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Read directory entries sorted case-insensitively by name
pub async fn read_entries(dir: &Path) -> io::Result<Vec<ListingEntry>> {
    let mut reader = fs::read_dir(dir).await?;
    let mut entries = Vec::new();

    while let Some(entry) = reader.next_entry().await? {
        let is_dir = entry.file_type().await.is_ok_and(|t| t.is_dir())
            || fs::metadata(entry.path()).await.is_ok_and(|m| m.is_dir());
        entries.push(ListingEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir,
        });
    }

    entries.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });
    Ok(entries)
}

/// Render the HTML listing for `request_path` (raw, percent-encoded)
pub fn render(request_path: &str, entries: &[ListingEntry]) -> String {
    let display_path = escape_html(&percent_decode_str(request_path).decode_utf8_lossy());
    let title = format!("Directory listing for {display_path}");

    let mut html = String::with_capacity(256 + entries.len() * 64);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{title}</title>\n"));
    html.push_str("</head>\n<body>\n");
    html.push_str(&format!("<h1>{title}</h1>\n<hr>\n<ul>\n"));

    for entry in entries {
        let suffix = if entry.is_dir { "/" } else { "" };
        let href = utf8_percent_encode(&entry.name, LINK_ENCODE_SET);
        html.push_str(&format!(
            "<li><a href=\"{href}{suffix}\">{}{suffix}</a></li>\n",
            escape_html(&entry.name)
        ));
    }

    html.push_str("</ul>\n<hr>\n</body>\n</html>\n");
    html
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TempDir;

    #[tokio::test]
    async fn test_read_entries_sorted() {
        let tmp = TempDir::new();
        tmp.write("b.txt", "b");
        tmp.write("A.txt", "a");
        tmp.mkdir("css");

        let entries = read_entries(tmp.path()).await.unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["A.txt", "b.txt", "css"]);
        assert!(entries[2].is_dir);
        assert!(!entries[0].is_dir);
    }

    #[test]
    fn test_render_escapes_and_encodes() {
        let entries = vec![
            ListingEntry {
                name: "<script>.js".to_string(),
                is_dir: false,
            },
            ListingEntry {
                name: "my docs".to_string(),
                is_dir: true,
            },
        ];

        let html = render("/a%20b/", &entries);
        assert!(html.contains("<title>Directory listing for /a b/</title>"));
        assert!(html.contains("href=\"%3Cscript%3E.js\">&lt;script&gt;.js</a>"));
        assert!(html.contains("href=\"my%20docs/\">my docs/</a>"));
        assert!(!html.contains("<script>"));
    }
}
