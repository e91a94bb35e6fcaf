use clap::{Parser, Subcommand};
use polydoc::content::{self, ContentLoader};
use polydoc::generate::{self, SiteContext};
use polydoc::i18n::Translator;
use polydoc::icons::{self, IconRegistry};
use polydoc::locale::LocaleSet;
use polydoc::output::{self, LocaleCoverage};
use polydoc::search::{self, FileSource, IndexCache, IndexSource, MemorySource};
use polydoc::serve::{self, PreviewServer};
use polydoc::{config, llms, og, toc};
use std::path::{Path, PathBuf};

fn version_string() -> &'static str {
    let on_tag = env!("POLYDOC_ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("POLYDOC_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "polydoc")]
#[command(about = "Static site generator for multilingual documentation")]
#[command(long_about = "\
Static site generator for multilingual documentation

Each locale has its own directory of Markdown/MDX documents. Pages missing
in a locale are shown from the default locale.

Content structure:

  content/
  ├── config.toml                  # Site config (optional)
  ├── assets/                      # Logo, fonts, favicon → copied to dist/static/
  ├── locales/
  │   ├── en.json                  # UI strings
  │   └── fa.json                  # Missing keys fall back to English
  └── docs/
      ├── en/
      │   ├── index.mdx            # /en
      │   ├── welcome.mdx          # /en/welcome
      │   └── tickets/
      │       ├── index.mdx        # /en/tickets
      │       └── setup.mdx        # /en/tickets/setup
      └── fa/
          └── index.mdx            # /fa

Front-matter keys: title, description, icon.

Diagnostics go to stderr; set RUST_LOG=info or RUST_LOG=debug for more.
Run 'polydoc gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline: search index → OG images → pages → llms-full.txt
    Build,
    /// Write the search index JSON
    SearchIndex,
    /// Render Open Graph cards for the default locale
    OgImages,
    /// Produce the HTML pages
    Generate,
    /// Write llms-full.txt
    Llms,
    /// Query the search index (built in memory if not yet written)
    Search {
        query: String,
        /// Only show hits in this locale
        #[arg(long)]
        locale: Option<String>,
    },
    /// Print the table of contents of a document file
    Toc { file: PathBuf },
    /// Show which locale a request would get
    Locale {
        /// Request path, e.g. /fa/welcome
        #[arg(long)]
        path: Option<String>,
        /// Accept-Language header value
        #[arg(long)]
        accept_language: Option<String>,
    },
    /// Validate config, icons and locale coverage without building
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
    /// Serve the output directory with search and content endpoints
    Serve {
        #[arg(long, default_value_t = serve::DEFAULT_PORT)]
        port: u16,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Build => {
            let site_config = config::load_config(&cli.source)?;
            init_thread_pool(&site_config.processing);
            let loader = ContentLoader::new(&cli.source, &site_config);
            let registry = IconRegistry::builtin();
            icons::validate_documents(&loader, &registry)?;

            println!("==> Stage 1: Search index");
            write_search_index(&loader, &site_config, &cli.output)?;

            println!("==> Stage 2: Open Graph images");
            let report = og::generate_og_images(&loader, &site_config, &cli.source, &cli.output)?;
            output::print_og_output(&report);

            println!("==> Stage 3: Generating HTML → {}", cli.output.display());
            let translator = translator_for(&cli.source, &site_config, &loader);
            let ctx = SiteContext {
                config: &site_config,
                loader: &loader,
                translator: &translator,
                icons: &registry,
            };
            let report = generate::generate(&ctx, &cli.source, &cli.output)?;
            output::print_generate_output(&report);

            println!("==> Stage 4: llms-full.txt");
            let count = llms::write_llms(&loader, &cli.output)?;
            output::print_llms_output(count, &cli.output.join(llms::LLMS_FILE));

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::SearchIndex => {
            let site_config = config::load_config(&cli.source)?;
            let loader = ContentLoader::new(&cli.source, &site_config);
            write_search_index(&loader, &site_config, &cli.output)?;
        }
        Command::OgImages => {
            let site_config = config::load_config(&cli.source)?;
            init_thread_pool(&site_config.processing);
            let loader = ContentLoader::new(&cli.source, &site_config);
            let report = og::generate_og_images(&loader, &site_config, &cli.source, &cli.output)?;
            output::print_og_output(&report);
        }
        Command::Generate => {
            let site_config = config::load_config(&cli.source)?;
            let loader = ContentLoader::new(&cli.source, &site_config);
            let registry = IconRegistry::builtin();
            icons::validate_documents(&loader, &registry)?;
            let translator = translator_for(&cli.source, &site_config, &loader);
            let ctx = SiteContext {
                config: &site_config,
                loader: &loader,
                translator: &translator,
                icons: &registry,
            };
            let report = generate::generate(&ctx, &cli.source, &cli.output)?;
            output::print_generate_output(&report);
        }
        Command::Llms => {
            let site_config = config::load_config(&cli.source)?;
            let loader = ContentLoader::new(&cli.source, &site_config);
            let count = llms::write_llms(&loader, &cli.output)?;
            output::print_llms_output(count, &cli.output.join(llms::LLMS_FILE));
        }
        Command::Search { query, locale } => {
            let site_config = config::load_config(&cli.source)?;
            let index_path = cli.output.join(&site_config.search.index_file);
            let max = site_config.search.max_results;
            if index_path.is_file() {
                let cache = IndexCache::new(FileSource::new(index_path));
                run_search(&cache, &query, max, locale.as_deref());
            } else {
                log::info!("{} not found, indexing in memory", index_path.display());
                let loader = ContentLoader::new(&cli.source, &site_config);
                let cache = IndexCache::new(MemorySource::new(search::build_index(&loader)));
                run_search(&cache, &query, max, locale.as_deref());
            }
        }
        Command::Toc { file } => {
            let parsed = content::read_document(&file)?;
            output::print_toc(&toc::extract_toc(&parsed.body));
        }
        Command::Locale {
            path,
            accept_language,
        } => {
            let site_config = config::load_config(&cli.source)?;
            let locales = LocaleSet::from_config(&site_config.locales);
            let locale = locales.resolve(path.as_deref(), accept_language.as_deref());
            output::print_locale(
                locale,
                locales.is_rtl(locale),
                path.as_deref(),
                accept_language.as_deref(),
            );
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let site_config = config::load_config(&cli.source)?;
            let loader = ContentLoader::new(&cli.source, &site_config);
            let checked = icons::validate_documents(&loader, &IconRegistry::builtin())?;
            let (coverage, slugs) = locale_coverage(&loader);
            output::print_check_output(&coverage, slugs, checked);
            println!("==> Content is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Serve { port } => {
            let site_config = config::load_config(&cli.source)?;
            let server = PreviewServer::new(site_config, &cli.source, &cli.output);
            println!(
                "==> Serving {} at http://127.0.0.1:{port}",
                server.output_dir().display()
            );
            server.run(port)?;
        }
    }

    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores. User can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

fn translator_for(source: &Path, site_config: &config::SiteConfig, loader: &ContentLoader) -> Translator {
    Translator::new(
        source.join(&site_config.content.locales_dir),
        loader.locales().clone(),
    )
}

fn write_search_index(
    loader: &ContentLoader,
    site_config: &config::SiteConfig,
    out: &Path,
) -> Result<(), search::SearchError> {
    let records = search::build_index(loader);
    let path = out.join(&site_config.search.index_file);
    search::write_index(&records, &path)?;
    output::print_index_output(&records, &path);
    Ok(())
}

fn run_search<S: IndexSource>(cache: &IndexCache<S>, query: &str, max: usize, locale: Option<&str>) {
    let response = cache.search(query, max, locale);
    output::print_search_results(query, &response);
}

/// Documents present per locale, and the slugs each one falls back on.
fn locale_coverage(loader: &ContentLoader) -> (Vec<LocaleCoverage>, usize) {
    let slugs = loader.all_slugs();
    let mut coverage = Vec::new();
    for locale in loader.locales().supported() {
        let present: Vec<_> = match loader.documents(locale) {
            Ok(entries) => entries.into_iter().map(|entry| entry.slug).collect(),
            Err(e) => {
                log::warn!("{e}");
                Vec::new()
            }
        };
        let missing = slugs
            .iter()
            .filter(|slug| !present.contains(slug))
            .map(|slug| slug.to_string())
            .collect();
        coverage.push(LocaleCoverage {
            locale: locale.clone(),
            documents: present.len(),
            missing,
        });
    }
    (coverage, slugs.len())
}
