//! Local preview server.
//!
//! Serves a built output directory and answers the dynamic endpoints a
//! static host cannot:
//!
//! | Path | Response |
//! |------|----------|
//! | `/` | 302 to `/<locale>` from `Accept-Language` |
//! | `/api/search?q=&locale=` | [`SearchResponse`] JSON |
//! | `/api/content?slug=&lang=` | [`ContentDocument`] JSON, with fallback |
//! | `/api/translations?lang=` | UI strings JSON |
//! | anything else | file under the output directory, `dir/index.html` for directories |
//!
//! A path that resolves to no file and does not start with a supported
//! locale is redirected to the same path under the visitor's locale, so
//! `/welcome` lands on `/fa/welcome` for a Persian browser.
//!
//! Requests are handled one at a time on the calling thread. The search
//! index is read on the first query and kept for the life of the server.

use crate::config::SiteConfig;
use crate::content::{ContentDocument, ContentLoader, Slug};
use crate::i18n::Translator;
use crate::locale::LocaleSet;
use crate::search::{FileSource, IndexCache, SearchResponse};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tiny_http::{Header, Response, Server, StatusCode};
use url::Url;

pub const DEFAULT_PORT: u16 = 3000;

/// Bytes escaped inside one path segment of a `Location` header.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("Output directory {0} does not exist; run `polydoc build` first")]
    MissingOutput(PathBuf),
    #[error("Failed to bind {addr}: {message}")]
    Bind { addr: String, message: String },
}

mod mime {
    pub const HTML: &str = "text/html; charset=utf-8";
    pub const JSON: &str = "application/json; charset=utf-8";
    pub const PLAIN: &str = "text/plain; charset=utf-8";
    pub const CSS: &str = "text/css; charset=utf-8";
    pub const JAVASCRIPT: &str = "text/javascript; charset=utf-8";
    pub const SVG: &str = "image/svg+xml";
    pub const PNG: &str = "image/png";
    pub const JPEG: &str = "image/jpeg";
    pub const WEBP: &str = "image/webp";
    pub const ICO: &str = "image/x-icon";
    pub const WOFF2: &str = "font/woff2";
    pub const TTF: &str = "font/ttf";
    pub const OCTET: &str = "application/octet-stream";
}

pub fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html" | "htm") => mime::HTML,
        Some("json") => mime::JSON,
        Some("txt" | "md" | "mdx") => mime::PLAIN,
        Some("css") => mime::CSS,
        Some("js" | "mjs") => mime::JAVASCRIPT,
        Some("svg") => mime::SVG,
        Some("png") => mime::PNG,
        Some("jpg" | "jpeg") => mime::JPEG,
        Some("webp") => mime::WEBP,
        Some("ico") => mime::ICO,
        Some("woff2") => mime::WOFF2,
        Some("ttf") => mime::TTF,
        _ => mime::OCTET,
    }
}

// ============================================================================
// Routing
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    Redirect(String),
    Search {
        query: String,
        locale: Option<String>,
    },
    Content {
        slug: Slug,
        locale: String,
    },
    Translations {
        locale: String,
    },
    /// Percent-decoded path relative to the output directory.
    File(String),
    BadRequest,
}

/// Map a request target to a [`Route`]. Pure; touches no files.
pub fn route(target: &str, accept_language: Option<&str>, locales: &LocaleSet) -> Route {
    let Ok(url) = Url::parse("http://localhost/").and_then(|base| base.join(target)) else {
        return Route::BadRequest;
    };
    let param = |name: &str| {
        url.query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    };
    let query = url.query().unwrap_or_default();

    match url.path() {
        "/" => Route::Redirect(format!("/{}", locales.resolve(None, accept_language))),
        "/api/search" => Route::Search {
            query: param("q").unwrap_or_default(),
            locale: param("locale")
                .or_else(|| param("lang"))
                .filter(|l| !l.is_empty()),
        },
        "/api/content" => Route::Content {
            slug: Slug::parse(&param("slug").unwrap_or_default()),
            locale: request_locale(locales, query, accept_language).to_string(),
        },
        "/api/translations" => Route::Translations {
            locale: request_locale(locales, query, accept_language).to_string(),
        },
        path => match percent_decode_str(path).decode_utf8() {
            Ok(decoded) => Route::File(decoded.trim_matches('/').to_string()),
            Err(_) => Route::BadRequest,
        },
    }
}

/// `lang` query parameter, then `Accept-Language`, then the default.
fn request_locale<'a>(locales: &'a LocaleSet, query: &str, accept_language: Option<&str>) -> &'a str {
    locales
        .from_query(query)
        .unwrap_or_else(|| locales.resolve(None, accept_language))
}

/// Resolve a relative path inside `root`. Directories map to their
/// `index.html`. Paths escaping `root`, including through symlinks, are
/// rejected.
pub fn resolve_static(relative: &str, root: &Path) -> Option<PathBuf> {
    if relative.split('/').any(|s| s == "..") {
        return None;
    }
    let canonical = root.join(relative).canonicalize().ok()?;
    let root = root.canonicalize().ok()?;
    if !canonical.starts_with(&root) {
        return None;
    }
    if canonical.is_file() {
        return Some(canonical);
    }
    let index = canonical.join("index.html");
    index.is_file().then_some(index)
}

/// Where to send a locale-less path, if anywhere.
pub fn locale_redirect(relative: &str, accept_language: Option<&str>, locales: &LocaleSet) -> Option<String> {
    if locales.from_path(relative).is_some() {
        return None;
    }
    let locale = locales.resolve(None, accept_language);
    Some(format!("/{locale}/{}", encode_path(relative)))
}

/// Percent-encode a decoded relative path segment by segment, so the result
/// is plain ASCII with no control characters.
fn encode_path(relative: &str) -> String {
    relative
        .split('/')
        .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

// ============================================================================
// Server
// ============================================================================

/// A response before it is handed to the socket.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    pub location: Option<String>,
}

impl Reply {
    fn redirect(location: String) -> Self {
        Self {
            status: 302,
            content_type: mime::PLAIN,
            body: Vec::new(),
            location: Some(location),
        }
    }

    fn json(value: &impl Serialize) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => Self {
                status: 200,
                content_type: mime::JSON,
                body,
                location: None,
            },
            Err(e) => Self::text(500, format!("serialization failed: {e}")),
        }
    }

    fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: mime::PLAIN,
            body: body.into().into_bytes(),
            location: None,
        }
    }
}

pub struct PreviewServer {
    config: SiteConfig,
    loader: ContentLoader,
    output_dir: PathBuf,
    index: IndexCache<FileSource>,
    translator: Translator,
}

impl PreviewServer {
    pub fn new(config: SiteConfig, content_root: &Path, output_dir: &Path) -> Self {
        let loader = ContentLoader::new(content_root, &config);
        let translator = Translator::new(
            content_root.join(&config.content.locales_dir),
            loader.locales().clone(),
        );
        let index = IndexCache::new(FileSource::new(output_dir.join(&config.search.index_file)));
        Self {
            config,
            loader,
            output_dir: output_dir.to_path_buf(),
            index,
            translator,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Answer one request target.
    pub fn respond(&self, target: &str, accept_language: Option<&str>) -> Reply {
        let locales = self.loader.locales();
        match route(target, accept_language, locales) {
            Route::Redirect(location) => Reply::redirect(location),
            Route::Search { query, locale } => {
                let response: SearchResponse =
                    self.index
                        .search(&query, self.config.search.max_results, locale.as_deref());
                Reply::json(&response)
            }
            Route::Content { slug, locale } => {
                let doc: ContentDocument = self.loader.load(&slug, &locale);
                Reply::json(&doc)
            }
            Route::Translations { locale } => Reply::json(self.translator.get(&locale).as_ref()),
            Route::File(relative) => self.respond_file(&relative, accept_language),
            Route::BadRequest => Reply::text(400, "400 Bad Request"),
        }
    }

    fn respond_file(&self, relative: &str, accept_language: Option<&str>) -> Reply {
        if let Some(path) = resolve_static(relative, &self.output_dir) {
            return match fs::read(&path) {
                Ok(body) => Reply {
                    status: 200,
                    content_type: content_type(&path),
                    body,
                    location: None,
                },
                Err(e) => {
                    log::error!("Failed to read {}: {e}", path.display());
                    Reply::text(500, "500 Internal Server Error")
                }
            };
        }
        if let Some(location) = locale_redirect(relative, accept_language, self.loader.locales()) {
            return Reply::redirect(location);
        }
        match fs::read(self.output_dir.join("404.html")) {
            Ok(body) => Reply {
                status: 404,
                content_type: mime::HTML,
                body,
                location: None,
            },
            Err(_) => Reply::text(404, "404 Not Found"),
        }
    }

    /// Serve until the process is killed.
    pub fn run(&self, port: u16) -> Result<(), ServeError> {
        if !self.output_dir.is_dir() {
            return Err(ServeError::MissingOutput(self.output_dir.clone()));
        }
        let addr = format!("127.0.0.1:{port}");
        let server = Server::http(&addr).map_err(|e| ServeError::Bind {
            addr: addr.clone(),
            message: e.to_string(),
        })?;
        log::info!("Listening on http://{addr}");

        for request in server.incoming_requests() {
            let accept_language = request
                .headers()
                .iter()
                .find(|h| h.field.equiv("Accept-Language"))
                .map(|h| h.value.to_string());
            let reply = self.respond(request.url(), accept_language.as_deref());
            log::debug!("{} {} -> {}", request.method(), request.url(), reply.status);

            let mut response = Response::from_data(reply.body)
                .with_status_code(StatusCode(reply.status));
            if let Ok(h) = Header::from_bytes("Content-Type", reply.content_type) {
                response = response.with_header(h);
            }
            if let Some(location) = reply.location.as_deref() {
                match Header::from_bytes("Location", location.as_bytes()) {
                    Ok(h) => response = response.with_header(h),
                    Err(()) => log::warn!("Dropped invalid Location header {location:?}"),
                }
            }
            if let Err(e) = request.respond(response) {
                log::warn!("Failed to send response: {e}");
            }
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LocalesConfig;
    use crate::search;
    use crate::test_helpers::*;

    fn locales() -> LocaleSet {
        LocaleSet::from_config(&LocalesConfig::default())
    }

    // =========================================================================
    // Routing
    // =========================================================================

    #[test]
    fn root_redirects_by_accept_language() {
        let l = locales();
        assert_eq!(
            route("/", Some("fa-IR,fa;q=0.9,en;q=0.8"), &l),
            Route::Redirect("/fa".into())
        );
        assert_eq!(route("/", Some("de"), &l), Route::Redirect("/en".into()));
        assert_eq!(route("/", None, &l), Route::Redirect("/en".into()));
    }

    #[test]
    fn search_route_decodes_query() {
        assert_eq!(
            route("/api/search?q=ticket%20setup&locale=fa", None, &locales()),
            Route::Search {
                query: "ticket setup".into(),
                locale: Some("fa".into())
            }
        );
        assert_eq!(
            route("/api/search?q=x&locale=", None, &locales()),
            Route::Search {
                query: "x".into(),
                locale: None
            }
        );
    }

    #[test]
    fn content_route_locale_precedence() {
        let l = locales();
        let slug = Slug::new(["tickets", "setup"]);
        assert_eq!(
            route("/api/content?slug=tickets/setup&lang=fa", Some("en"), &l),
            Route::Content {
                slug: slug.clone(),
                locale: "fa".into()
            }
        );
        // Unsupported lang falls through to the header
        assert_eq!(
            route("/api/content?slug=tickets/setup&lang=xx", Some("fa"), &l),
            Route::Content {
                slug,
                locale: "fa".into()
            }
        );
        assert_eq!(
            route("/api/content", None, &l),
            Route::Content {
                slug: Slug::root(),
                locale: "en".into()
            }
        );
    }

    #[test]
    fn file_route_is_decoded() {
        assert_eq!(
            route("/fa/%D8%B1%D8%A7%D9%87%D9%86%D9%85%D8%A7/", None, &locales()),
            Route::File("fa/راهنما".into())
        );
    }

    #[test]
    fn locale_less_paths_redirect() {
        let l = locales();
        assert_eq!(locale_redirect("welcome", Some("fa"), &l), Some("/fa/welcome".into()));
        assert_eq!(locale_redirect("en/missing", Some("fa"), &l), None);
        assert_eq!(
            locale_redirect("guide/v1.2", None, &l),
            Some("/en/guide/v1.2".into())
        );
    }

    #[test]
    fn redirect_location_is_reencoded() {
        let l = locales();
        assert_eq!(
            locale_redirect("راه", Some("fa"), &l),
            Some("/fa/%D8%B1%D8%A7%D9%87".into())
        );
        assert_eq!(
            locale_redirect("x\r\nSet-Cookie: a=b", None, &l),
            Some("/en/x%0D%0ASet%2DCookie%3A%20a%3Db".into())
        );
    }

    #[test]
    fn content_types() {
        assert_eq!(content_type(Path::new("a/index.html")), mime::HTML);
        assert_eq!(content_type(Path::new("og-images/home.png")), mime::PNG);
        assert_eq!(content_type(Path::new("blob")), mime::OCTET);
    }

    // =========================================================================
    // Static resolution
    // =========================================================================

    #[test]
    fn resolves_directories_to_index() {
        let tmp = tempfile::TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("en/welcome")).unwrap();
        fs::write(tmp.path().join("en/welcome/index.html"), "hi").unwrap();
        let path = resolve_static("en/welcome", tmp.path()).unwrap();
        assert!(path.ends_with("en/welcome/index.html"));
        assert!(resolve_static("en/nope", tmp.path()).is_none());
    }

    #[test]
    fn rejects_traversal() {
        let tmp = tempfile::TempDir::new().unwrap();
        let root = tmp.path().join("dist");
        fs::create_dir_all(&root).unwrap();
        fs::write(tmp.path().join("secret.txt"), "x").unwrap();
        assert!(resolve_static("../secret.txt", &root).is_none());
    }

    // =========================================================================
    // Responses
    // =========================================================================

    fn server() -> (tempfile::TempDir, PreviewServer) {
        let tmp = setup_content();
        let config = config_for(tmp.path());
        let out = tmp.path().join("dist");
        fs::create_dir_all(out.join("en")).unwrap();
        fs::write(out.join("en/index.html"), "<h1>en</h1>").unwrap();
        fs::write(out.join("404.html"), "<h1>missing</h1>").unwrap();
        let records = search::build_index(&loader_for(tmp.path()));
        search::write_index(&records, &out.join(&config.search.index_file)).unwrap();
        let server = PreviewServer::new(config, tmp.path(), &out);
        (tmp, server)
    }

    #[test]
    fn search_endpoint_returns_hits() {
        let (_tmp, s) = server();
        let reply = s.respond("/api/search?q=ticket&locale=en", None);
        assert_eq!(reply.status, 200);
        let json: serde_json::Value = serde_json::from_slice(&reply.body).unwrap();
        assert_eq!(json["hits"][0]["url"], "/en/tickets");
        assert!(json["count"].as_u64().unwrap() >= 2);
    }

    #[test]
    fn content_endpoint_falls_back() {
        let (_tmp, s) = server();
        let reply = s.respond("/api/content?slug=tickets/setup&lang=fa", None);
        let json: serde_json::Value = serde_json::from_slice(&reply.body).unwrap();
        assert_eq!(json["title"], "Ticket setup");
        assert_eq!(json["locale"], "en");
        assert_eq!(json["exists"], true);

        let reply = s.respond("/api/content?slug=nope&lang=fa", None);
        let json: serde_json::Value = serde_json::from_slice(&reply.body).unwrap();
        assert_eq!(json["exists"], false);
    }

    #[test]
    fn translations_endpoint_fills_missing_keys() {
        let (_tmp, s) = server();
        let reply = s.respond("/api/translations?lang=fa", None);
        let json: serde_json::Value = serde_json::from_slice(&reply.body).unwrap();
        assert_eq!(json["documentation"], "مستندات");
        assert!(json["search"]["shortcuts"]["search"].is_string());
    }

    #[test]
    fn serves_files_and_404() {
        let (_tmp, s) = server();
        let reply = s.respond("/en/", None);
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body, b"<h1>en</h1>");

        let reply = s.respond("/en/missing", None);
        assert_eq!(reply.status, 404);
        assert_eq!(reply.body, b"<h1>missing</h1>");

        let reply = s.respond("/missing", Some("fa"));
        assert_eq!(reply.status, 302);
        assert_eq!(reply.location.as_deref(), Some("/fa/missing"));
    }

    #[test]
    fn redirect_header_is_ascii_without_line_breaks() {
        let (_tmp, s) = server();
        let reply = s.respond("/%D8%B1%D8%A7%D9%87", Some("fa"));
        assert_eq!(reply.status, 302);
        let location = reply.location.unwrap();
        assert_eq!(location, "/fa/%D8%B1%D8%A7%D9%87");
        assert!(Header::from_bytes("Location", location.as_bytes()).is_ok());

        let reply = s.respond("/x%0D%0ASet-Cookie:%20a=b", None);
        assert_eq!(reply.status, 302);
        let location = reply.location.unwrap();
        assert!(location.is_ascii());
        assert!(!location.contains(['\r', '\n']));
        assert!(location.starts_with("/en/x%0D%0A"));
    }
}
