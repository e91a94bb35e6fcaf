//! HTML site generation.
//!
//! Renders one page per `(locale, slug)` pair, where the slugs are the union
//! of every locale's documents. A page whose document is missing in its
//! locale shows the default locale's version (see [`ContentLoader::load`]);
//! its `<article>` carries the `lang` of the document actually shown.
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html                 # Redirect to the visitor's locale
//! ├── 404.html
//! ├── en/
//! │   ├── index.html             # slug []
//! │   └── tickets/
//! │       └── setup/index.html   # slug [tickets, setup]
//! ├── fa/
//! │   └── ...
//! └── static/
//!     ├── style.css              # embedded
//!     ├── search.js              # embedded
//!     └── ...                    # copied from <content>/assets/
//! ```
//!
//! ## Page anatomy
//!
//! - `<html lang dir>`: `dir="rtl"` for configured RTL locales
//! - Head: title, description, canonical, `hreflang` alternates, Open Graph
//!   and Twitter card tags pointing at `/og-images/<file>.png`
//! - Header: site name, search box, locale switcher
//! - Sidebar: every document of the locale, with icons
//! - Article: title, description, rendered body with heading ids
//! - TOC aside: headings from [`toc::extract_toc`]
//!
//! The markdown body goes through pulldown-cmark. MDX `import`/`export`
//! lines are dropped; JSX tags pass through as raw HTML.

use crate::config::SiteConfig;
use crate::content::{ContentDocument, ContentLoader, Slug};
use crate::i18n::{Translations, Translator};
use crate::icons::IconRegistry;
use crate::og::{OgKind, og_filename};
use crate::toc::{self, Heading};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Options, Parser, html as md_html};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

const CSS: &str = include_str!("../static/style.css");
const SEARCH_JS: &str = include_str!("../static/search.js");

/// Read-only inputs shared by every page.
pub struct SiteContext<'a> {
    pub config: &'a SiteConfig,
    pub loader: &'a ContentLoader,
    pub translator: &'a Translator,
    pub icons: &'a IconRegistry,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NavItem {
    pub title: String,
    pub slug: Slug,
    pub url: String,
    pub icon: Option<String>,
}

/// One written page.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedPage {
    pub locale: String,
    pub title: String,
    pub url: String,
    /// Locale of the document shown; differs from `locale` on fallback.
    pub source_locale: String,
    pub exists: bool,
    pub headings: usize,
}

#[derive(Debug, Default)]
pub struct GenerateReport {
    pub output_dir: PathBuf,
    pub pages: Vec<GeneratedPage>,
    pub assets_copied: bool,
}

pub fn generate(
    ctx: &SiteContext,
    content_root: &Path,
    output_dir: &Path,
) -> Result<GenerateReport, GenerateError> {
    fs::create_dir_all(output_dir)?;
    let locales = ctx.loader.locales();
    let slugs = ctx.loader.all_slugs();

    let mut report = GenerateReport {
        output_dir: output_dir.to_path_buf(),
        ..GenerateReport::default()
    };

    for locale in locales.supported() {
        let t = ctx.translator.get(locale);
        let nav = build_nav(ctx.loader, locale, &slugs);
        for slug in &slugs {
            let doc = ctx.loader.load(slug, locale);
            let headings = toc::extract_toc(&doc.body);
            let page = render_page(ctx, locale, &doc, &headings, &nav, &t);

            let dir = slug
                .segments()
                .iter()
                .fold(output_dir.join(locale), |p, s| p.join(s));
            fs::create_dir_all(&dir)?;
            fs::write(dir.join("index.html"), page.into_string())?;

            report.pages.push(GeneratedPage {
                locale: locale.clone(),
                title: doc.title.clone(),
                url: slug.url(locale),
                source_locale: doc.locale.clone(),
                exists: doc.exists,
                headings: headings.len(),
            });
        }
    }

    let default = locales.default_locale();
    let t = ctx.translator.get(default);
    let not_found = ContentDocument::not_found(&Slug::root(), default);
    let nav = build_nav(ctx.loader, default, &slugs);
    let page = render_page(ctx, default, &not_found, &[], &nav, &t);
    fs::write(output_dir.join("404.html"), page.into_string())?;

    let redirect = render_redirect(locales.supported(), default)?;
    fs::write(output_dir.join("index.html"), redirect.into_string())?;

    let static_dir = output_dir.join("static");
    fs::create_dir_all(&static_dir)?;
    let assets = content_root.join(&ctx.config.content.assets_dir);
    if assets.is_dir() {
        copy_dir_recursive(&assets, &static_dir)?;
        report.assets_copied = true;
    }
    fs::write(static_dir.join("style.css"), CSS)?;
    fs::write(static_dir.join("search.js"), SEARCH_JS)?;

    Ok(report)
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Sidebar entries for a locale, one per slug, with fallback titles.
pub fn build_nav(loader: &ContentLoader, locale: &str, slugs: &[Slug]) -> Vec<NavItem> {
    slugs
        .iter()
        .map(|slug| {
            let doc = loader.load(slug, locale);
            NavItem {
                title: doc.title,
                slug: slug.clone(),
                url: slug.url(locale),
                icon: doc.icon,
            }
        })
        .collect()
}

// ============================================================================
// Markdown
// ============================================================================

/// Append `{#id}` to every TOC heading line so the rendered `<hN>` carries
/// the same anchor the TOC links to.
pub fn inject_heading_ids(body: &str, headings: &[Heading]) -> String {
    let mut lines: Vec<String> = body.lines().map(str::to_string).collect();
    for heading in headings {
        if let Some(line) = lines.get_mut(heading.line) {
            let trimmed = line.trim_end().len();
            line.truncate(trimmed);
            line.push_str(&format!(" {{#{}}}", heading.id()));
        }
    }
    lines.join("\n")
}

/// Drop MDX `import`/`export` statements outside fenced code.
pub fn strip_mdx_statements(body: &str) -> String {
    let mut in_fence = false;
    body.lines()
        .filter(|line| {
            let trimmed = line.trim_start();
            if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
                in_fence = !in_fence;
                return true;
            }
            in_fence || !(trimmed.starts_with("import ") || trimmed.starts_with("export "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_markdown(body: &str, headings: &[Heading]) -> String {
    let source = strip_mdx_statements(&inject_heading_ids(body, headings));
    let options = Options::ENABLE_HEADING_ATTRIBUTES
        | Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS;
    let mut out = String::new();
    md_html::push_html(&mut out, Parser::new_ext(&source, options));
    out
}

// ============================================================================
// HTML Components
// ============================================================================

fn absolute(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

fn page_head(ctx: &SiteContext, locale: &str, doc: &ContentDocument) -> Markup {
    let site = &ctx.config.site;
    let kind = OgKind::for_slug(&doc.slug);
    let url = absolute(&site.base_url, &doc.slug.url(locale));
    let image = absolute(
        &site.base_url,
        &format!("/{}/{}", ctx.config.og.output_dir, og_filename(&doc.slug)),
    );
    let title = if doc.slug.is_root() {
        site.name.clone()
    } else {
        format!("{} | {}", doc.title, site.name)
    };

    html! {
        meta charset="UTF-8";
        meta name="viewport" content="width=device-width, initial-scale=1.0";
        title { (title) }
        meta name="description" content=(doc.description);
        link rel="canonical" href=(url);
        @for alt in ctx.loader.locales().supported() {
            link rel="alternate" hreflang=(alt) href=(absolute(&site.base_url, &doc.slug.url(alt)));
        }
        meta property="og:type" content=(kind.og_type());
        meta property="og:title" content=(doc.title);
        meta property="og:description" content=(doc.description);
        meta property="og:url" content=(url);
        meta property="og:site_name" content=(site.name);
        meta property="og:locale" content=(locale);
        meta property="og:image" content=(image);
        meta property="og:image:width" content="1200";
        meta property="og:image:height" content="630";
        meta name="twitter:card" content="summary_large_image";
        meta name="twitter:title" content=(doc.title);
        meta name="twitter:description" content=(doc.description);
        meta name="twitter:image" content=(image);
        link rel="stylesheet" href="/static/style.css";
        script src="/static/search.js" defer {}
    }
}

fn site_header(ctx: &SiteContext, locale: &str, slug: &Slug, t: &Translations) -> Markup {
    let search = &ctx.config.search;
    html! {
        header.site-header {
            a.site-name href=(Slug::root().url(locale)) { (ctx.config.site.name) }
            form.search role="search" action="/api/search"
                data-index={ "/" (search.index_file) }
                data-locale=(locale)
                data-max-results=(search.max_results) {
                input type="search" name="q" placeholder=(t.search.placeholder)
                    aria-label=(t.search.title) autocomplete="off";
                input type="hidden" name="locale" value=(locale);
                div.search-results hidden
                    data-no-results=(t.search.no_results)
                    data-no-results-description=(t.search.no_results_description)
                    data-searching=(t.search.searching) {}
            }
            nav.locale-switcher {
                @for code in ctx.loader.locales().supported() {
                    a href=(slug.url(code)) hreflang=(code)
                        class=[(code == locale).then_some("current")] {
                        (code.to_uppercase())
                    }
                }
            }
        }
    }
}

fn sidebar(ctx: &SiteContext, nav: &[NavItem], current: &Slug) -> Markup {
    html! {
        nav.sidebar {
            ul {
                @for item in nav {
                    @let depth = item.slug.segments().len();
                    @let class = if item.slug == *current {
                        format!("depth-{depth} current")
                    } else {
                        format!("depth-{depth}")
                    };
                    li class=(class) {
                        a href=(item.url) {
                            @if let Some(icon) = item.icon.as_deref().and_then(|i| ctx.icons.render(i)) {
                                (icon)
                            }
                            span { (item.title) }
                        }
                    }
                }
            }
        }
    }
}

fn toc_aside(headings: &[Heading], t: &Translations) -> Markup {
    html! {
        @if !headings.is_empty() {
            aside.toc {
                h2 { (t.on_this_page) }
                ul {
                    @for h in headings {
                        li class={ "depth-" (h.depth) } {
                            a href=(h.url) { (h.title) }
                        }
                    }
                }
            }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

pub fn render_page(
    ctx: &SiteContext,
    locale: &str,
    doc: &ContentDocument,
    headings: &[Heading],
    nav: &[NavItem],
    t: &Translations,
) -> Markup {
    let dir = if ctx.loader.locales().is_rtl(locale) {
        "rtl"
    } else {
        "ltr"
    };
    let body = render_markdown(&doc.body, headings);

    html! {
        (DOCTYPE)
        html lang=(locale) dir=(dir) {
            head {
                (page_head(ctx, locale, doc))
            }
            body {
                (site_header(ctx, locale, &doc.slug, t))
                div.layout {
                    (sidebar(ctx, nav, &doc.slug))
                    main {
                        article lang=(doc.locale) {
                            h1 { (doc.title) }
                            @if !doc.description.is_empty() {
                                p.description { (doc.description) }
                            }
                            div.content {
                                (PreEscaped(body))
                            }
                        }
                    }
                    (toc_aside(headings, t))
                }
            }
        }
    }
}

/// Root page that sends visitors to their preferred supported locale.
fn render_redirect(supported: &[String], default: &str) -> Result<Markup, GenerateError> {
    let supported_json = serde_json::to_string(supported)?;
    let target = format!("/{default}");
    let script = format!(
        "(function(){{var s={supported_json};var d={default:?};\
         var langs=navigator.languages||[navigator.language||''];\
         for(var i=0;i<langs.length;i++){{var c=(langs[i]||'').toLowerCase();\
         if(s.indexOf(c)<0){{c=c.split('-')[0];}}\
         if(s.indexOf(c)>=0){{d=c;break;}}}}\
         location.replace('/'+d);}})();"
    );
    Ok(html! {
        (DOCTYPE)
        html {
            head {
                meta charset="UTF-8";
                meta http-equiv="refresh" content={ "0; url=" (target) };
                script { (PreEscaped(script)) }
            }
            body {
                a href=(target) { (target) }
            }
        }
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    struct Fixture {
        _tmp: tempfile::TempDir,
        root: PathBuf,
        config: SiteConfig,
        loader: ContentLoader,
        translator: Translator,
        icons: IconRegistry,
    }

    impl Fixture {
        fn new() -> Self {
            let tmp = setup_content();
            let root = tmp.path().to_path_buf();
            let config = config_for(&root);
            let loader = ContentLoader::new(&root, &config);
            let translator = Translator::new(root.join("locales"), loader.locales().clone());
            Self {
                _tmp: tmp,
                root,
                config,
                loader,
                translator,
                icons: IconRegistry::builtin(),
            }
        }

        fn ctx(&self) -> SiteContext<'_> {
            SiteContext {
                config: &self.config,
                loader: &self.loader,
                translator: &self.translator,
                icons: &self.icons,
            }
        }

        fn page(&self, slug: &[&str], locale: &str) -> String {
            let slug = Slug::new(slug.iter().copied());
            let doc = self.loader.load(&slug, locale);
            let headings = toc::extract_toc(&doc.body);
            let nav = build_nav(&self.loader, locale, &self.loader.all_slugs());
            let t = self.translator.get(locale);
            render_page(&self.ctx(), locale, &doc, &headings, &nav, &t).into_string()
        }
    }

    // =========================================================================
    // Markdown
    // =========================================================================

    #[test]
    fn heading_ids_match_toc_anchors() {
        let body = "## Setup\ntext\n## Setup\n### Permissions";
        let headings = toc::extract_toc(body);
        let html = render_markdown(body, &headings);
        for h in &headings {
            assert!(html.contains(&format!("id=\"{}\"", h.id())), "missing {}", h.id());
        }
        assert!(html.contains("id=\"setup-2\""));
    }

    #[test]
    fn headings_inside_tabs_get_no_id() {
        let body = "<Tabs>\n## Hidden\n</Tabs>\n\n## Shown";
        let html = render_markdown(body, &toc::extract_toc(body));
        assert!(html.contains("id=\"shown\""));
        assert!(!html.contains("id=\"hidden\""));
    }

    #[test]
    fn mdx_imports_are_dropped() {
        let body = "import { Card } from 'x';\n\n# Hi\n\n```js\nimport fs from 'fs';\n```";
        let out = strip_mdx_statements(body);
        assert!(!out.contains("Card"));
        assert!(out.contains("import fs from 'fs';"));
    }

    #[test]
    fn inject_appends_to_line() {
        let headings = toc::extract_toc("## A  \nx");
        assert_eq!(inject_heading_ids("## A  \nx", &headings), "## A {#a}\nx");
    }

    // =========================================================================
    // Pages
    // =========================================================================

    #[test]
    fn rtl_locale_sets_dir() {
        let f = Fixture::new();
        assert!(f.page(&["welcome"], "fa").contains(r#"<html lang="fa" dir="rtl">"#));
        assert!(f.page(&["welcome"], "en").contains(r#"<html lang="en" dir="ltr">"#));
    }

    #[test]
    fn fallback_page_marks_article_language() {
        let f = Fixture::new();
        let html = f.page(&["tickets", "setup"], "fa");
        assert!(html.contains(r#"<html lang="fa""#));
        assert!(html.contains(r#"<article lang="en">"#));
        assert!(html.contains("Ticket setup"));
    }

    #[test]
    fn head_has_og_and_alternates() {
        let f = Fixture::new();
        let html = f.page(&["tickets", "setup"], "en");
        assert!(html.contains(
            r#"content="https://docs.sudobotz.test/og-images/tickets-setup.png""#
        ));
        assert!(html.contains(r#"property="og:type" content="article""#));
        assert!(html.contains(r#"hreflang="fa" href="https://docs.sudobotz.test/fa/tickets/setup""#));
        assert!(html.contains("summary_large_image"));
    }

    #[test]
    fn root_page_is_website() {
        let f = Fixture::new();
        let html = f.page(&[], "en");
        assert!(html.contains(r#"property="og:type" content="website""#));
        assert!(html.contains("/og-images/home.png"));
    }

    #[test]
    fn toc_aside_lists_headings_outside_tabs() {
        let f = Fixture::new();
        let html = f.page(&["tickets", "setup"], "en");
        assert!(html.contains(r##"href="#setup""##));
        assert!(html.contains(r##"href="#setup-2""##));
        assert!(html.contains(r##"href="#permissions""##));
        assert!(!html.contains(r##"href="#hidden-inside-tabs""##));
    }

    #[test]
    fn sidebar_marks_current_and_renders_icons() {
        let f = Fixture::new();
        let html = f.page(&["welcome"], "en");
        assert!(html.contains(r#"class="depth-1 current""#));
        assert!(html.contains("<svg"));
    }

    #[test]
    fn search_box_uses_translations() {
        let f = Fixture::new();
        let html = f.page(&[], "fa");
        assert!(html.contains("جستجو در مستندات..."));
        assert!(html.contains(r#"data-locale="fa""#));
    }

    #[test]
    fn titles_are_escaped() {
        let f = Fixture::new();
        write_doc(&f.root, "en", "xss.mdx", "---\ntitle: \"<script>x</script>\"\n---\n");
        let html = f.page(&["xss"], "en");
        assert!(!html.contains("<script>x</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    // =========================================================================
    // Full generation
    // =========================================================================

    #[test]
    fn generate_writes_every_locale_and_slug() {
        let f = Fixture::new();
        let out = f.root.join("dist");
        let report = generate(&f.ctx(), &f.root, &out).unwrap();

        // 4 slugs × 2 locales
        assert_eq!(report.pages.len(), 8);
        for rel in [
            "en/index.html",
            "fa/index.html",
            "en/tickets/setup/index.html",
            "fa/tickets/setup/index.html",
            "404.html",
            "index.html",
            "static/style.css",
            "static/search.js",
        ] {
            assert!(out.join(rel).is_file(), "missing {rel}");
        }
        let fallbacks = report
            .pages
            .iter()
            .filter(|p| p.locale != p.source_locale)
            .count();
        assert_eq!(fallbacks, 2);
    }

    #[test]
    fn assets_are_copied_to_static() {
        let f = Fixture::new();
        let out = f.root.join("dist");
        let report = generate(&f.ctx(), &f.root, &out).unwrap();
        assert!(report.assets_copied);
        assert!(out.join("static/favicon.svg").is_file());
    }

    #[test]
    fn root_redirect_lists_locales() {
        let html = render_redirect(&["en".to_string(), "fa".to_string()], "en")
            .unwrap()
            .into_string();
        assert!(html.contains(r#"url=/en""#));
        assert!(html.contains(r#"var s=["en","fa"]"#));
    }
}
