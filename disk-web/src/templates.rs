//! HTML rendering
//!
//! Pages are small enough to be assembled with `format!`. Every value that
//! originates from the visitor or the provider goes through [`escape_html`].

use bridge_traits::storage::FileItem;
use std::fmt::Write;

/// Media types the provider assigns, offered in the listing filter.
pub const MEDIA_TYPES: &[&str] = &[
    "audio",
    "backup",
    "book",
    "compressed",
    "data",
    "development",
    "diskimage",
    "document",
    "encoded",
    "executable",
    "flash",
    "font",
    "image",
    "settings",
    "spreadsheet",
    "text",
    "unknown",
    "video",
    "web",
];

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{}</body>\n</html>\n",
        escape_html(title),
        body
    )
}

/// Landing page: public key form and sign-in link.
pub fn render_index(notice: Option<&str>) -> String {
    let mut body = String::from("<h1>Yandex.Disk public folder browser</h1>\n");

    if let Some(notice) = notice {
        let _ = writeln!(body, "<p class=\"notice\">{}</p>", escape_html(notice));
    }

    body.push_str(
        "<form action=\"/files\" method=\"post\">\n\
         <label for=\"public_key\">Public folder link</label>\n\
         <input type=\"text\" id=\"public_key\" name=\"public_key\" required>\n\
         <button type=\"submit\">Show files</button>\n\
         </form>\n\
         <p><a href=\"/oauth/authorize\">Sign in with Yandex</a></p>\n",
    );

    page("Yandex.Disk browser", &body)
}

fn format_size(item: &FileItem) -> String {
    item.size.map(|s| s.to_string()).unwrap_or_default()
}

fn render_filter(public_key: &str, selected: Option<&str>) -> String {
    let mut form = String::from("<form action=\"/files\" method=\"get\">\n");
    let _ = writeln!(
        form,
        "<input type=\"hidden\" name=\"public_key\" value=\"{}\">",
        escape_html(public_key)
    );
    form.push_str("<select name=\"media_type\">\n<option value=\"\">all</option>\n");

    for media_type in MEDIA_TYPES {
        let marker = if selected == Some(*media_type) {
            " selected"
        } else {
            ""
        };
        let _ = writeln!(
            form,
            "<option value=\"{0}\"{1}>{0}</option>",
            media_type, marker
        );
    }

    form.push_str("</select>\n<button type=\"submit\">Filter</button>\n</form>\n");
    form
}

fn render_row(item: &FileItem) -> String {
    let name = item.name.as_deref().unwrap_or_default();
    let kind = item.resource_type.as_deref().unwrap_or_default();
    let media_type = item.media_type.as_deref().unwrap_or_default();

    let action = match item.download_url() {
        Some(url) if !item.is_dir() => format!(
            "<form action=\"/download\" method=\"post\">\
             <input type=\"hidden\" name=\"file_url\" value=\"{}\">\
             <button type=\"submit\">Download</button></form>",
            escape_html(url)
        ),
        _ => String::new(),
    };

    format!(
        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
        escape_html(name),
        escape_html(kind),
        escape_html(media_type),
        format_size(item),
        action
    )
}

/// Listing page for `public_key`.
pub fn render_listing(public_key: &str, items: &[FileItem], media_type: Option<&str>) -> String {
    let mut body = String::new();
    let _ = writeln!(body, "<h1>Files in {}</h1>", escape_html(public_key));
    body.push_str(&render_filter(public_key, media_type));

    if items.is_empty() {
        body.push_str("<p>No files found.</p>\n");
    } else {
        body.push_str(
            "<table>\n<tr><th>Name</th><th>Type</th><th>Media type</th><th>Size</th><th></th></tr>\n",
        );
        for item in items {
            body.push_str(&render_row(item));
        }
        body.push_str("</table>\n");
    }

    body.push_str("<p><a href=\"/\">Back</a></p>\n");
    page("Files", &body)
}
