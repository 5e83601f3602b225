//! HTML pages
//!
//! The login form and the directory browser. Every user-controlled string is
//! escaped before it is interpolated, and every link segment is percent-encoded.

use std::fmt::Write;

use crate::storage::DirectoryListing;
use crate::storage::validation::join_relative;

const STYLE: &str = "body{font-family:sans-serif;max-width:60em;margin:2em auto;padding:0 1em}\
table{border-collapse:collapse;width:100%}td{padding:.3em .5em;border-bottom:1px solid #ddd}\
form.inline{display:inline}.message{background:#fee;padding:.5em;border:1px solid #c99}\
.error{color:#a00}";

/// Escapes text for use in element content and quoted attributes.
pub fn html_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Builds a URL under `prefix` with each segment of `relative` percent-encoded.
///
/// `path_url("/download", "my docs/a b.txt")` is `/download/my%20docs/a%20b.txt`.
pub fn path_url(prefix: &str, relative: &str) -> String {
    let mut url = prefix.trim_end_matches('/').to_string();
    for segment in relative.split('/').filter(|s| !s.is_empty()) {
        url.push('/');
        url.push_str(&urlencoding::encode(segment));
    }
    if url.is_empty() {
        url.push('/');
    }
    url
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n\
         <style>{}</style>\n</head>\n<body>\n{}</body>\n</html>\n",
        html_escape(title),
        STYLE,
        body
    )
}

pub fn login_page(error: Option<&str>) -> String {
    let mut body = String::from("<h1>File Manager Login</h1>\n");
    if let Some(error) = error {
        let _ = writeln!(body, "<p class=\"error\">{}</p>", html_escape(error));
    }
    body.push_str(
        "<form method=\"post\" action=\"/login\">\n\
         <p><label>Username <input type=\"text\" name=\"username\" autofocus></label></p>\n\
         <p><label>Password <input type=\"password\" name=\"password\"></label></p>\n\
         <p><button type=\"submit\">Log in</button></p>\n\
         </form>\n",
    );
    page("Login", &body)
}

/// Directory browser for `listing`, with upload, new-folder and delete controls.
pub fn file_manager_page(listing: &DirectoryListing, username: &str, message: Option<&str>) -> String {
    let current = if listing.path.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", listing.path)
    };

    let mut body = String::new();
    let _ = writeln!(
        body,
        "<p>Logged in as <strong>{}</strong> | <a href=\"/logout\">Log out</a></p>",
        html_escape(username)
    );
    let _ = writeln!(body, "<h1>Index of {}</h1>", html_escape(&current));

    if let Some(message) = message {
        let _ = writeln!(body, "<p class=\"message\">{}</p>", html_escape(message));
    }

    body.push_str("<table>\n");
    if let Some(parent) = listing.parent() {
        let _ = writeln!(
            body,
            "<tr><td><a href=\"{}\">..</a></td><td></td></tr>",
            html_escape(&path_url("", parent))
        );
    }

    for folder in &listing.folders {
        let relative = join_relative(&listing.path, folder);
        let _ = writeln!(
            body,
            "<tr><td><a href=\"{}\">{}/</a></td><td></td></tr>",
            html_escape(&path_url("", &relative)),
            html_escape(folder)
        );
    }

    for file in &listing.files {
        let relative = join_relative(&listing.path, file);
        let _ = writeln!(
            body,
            "<tr><td><a href=\"{}\">{}</a></td><td>\
             <form class=\"inline\" method=\"post\" action=\"{}\">\
             <button type=\"submit\">Delete</button></form></td></tr>",
            html_escape(&path_url("/download", &relative)),
            html_escape(file),
            html_escape(&path_url("/delete", &relative))
        );
    }
    body.push_str("</table>\n");

    let _ = writeln!(
        body,
        "<h2>Upload files</h2>\n\
         <form method=\"post\" action=\"{}\" enctype=\"multipart/form-data\">\n\
         <input type=\"file\" name=\"files\" multiple>\n\
         <button type=\"submit\">Upload</button>\n</form>",
        html_escape(&path_url("", &listing.path))
    );
    let _ = writeln!(
        body,
        "<h2>New folder</h2>\n\
         <form method=\"post\" action=\"{}\">\n\
         <input type=\"text\" name=\"folder_name\">\n\
         <button type=\"submit\">Create</button>\n</form>",
        html_escape(&path_url("/create-folder", &listing.path))
    );

    page(&format!("File Manager - {}", current), &body)
}
