//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use polidoc_catalog::{CatalogService, ImportReport, SearchRequest, SearchScope, SearchSort};
use polidoc_shared::{Region, YouthLed, init_config, languages, load_config};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Polidoc — a searchable registry of policy documents.
#[derive(Parser)]
#[command(
    name = "polidoc",
    version,
    about = "Import spreadsheet registries of policy documents and search them.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Import a registry spreadsheet (preview by default).
    Import {
        /// Path to the xlsx workbook.
        file: PathBuf,

        /// Apply the import instead of previewing it.
        #[arg(long)]
        apply: bool,

        /// Replace a previously uploaded file with the same name.
        #[arg(long)]
        overwrite: bool,
    },

    /// Search the catalog.
    Search {
        /// Query text. Omit to browse everything.
        query: Option<String>,

        /// Fields to search: all, title, or abstract.
        #[arg(long, default_value = "all")]
        scope: String,

        /// Result order: relevance, dateasc, datedesc, or abc.
        #[arg(long, default_value = "relevance")]
        sort: String,

        /// Result page (1-based).
        #[arg(long, default_value = "1")]
        page: u32,

        /// Filter by youth-led class (Yes, No, Co-authored, N/A, Unknown).
        #[arg(long)]
        youth_led: Option<String>,

        /// Filter by region name.
        #[arg(long)]
        region: Option<String>,

        /// Filter by publication year.
        #[arg(long)]
        year: Option<i32>,

        /// Filter by document type.
        #[arg(long = "type")]
        doc_type: Option<String>,

        /// Filter by exact keyword.
        #[arg(long)]
        keyword: Option<String>,

        /// Filter by language (name or code).
        #[arg(long)]
        language: Option<String>,
    },

    /// Show the facet values available for filtering.
    Browse,

    /// Show one catalog entry with its cross-references.
    Entry {
        /// Item id of the entry.
        id: String,
    },

    /// Attach a file to a catalog entry.
    Attach {
        /// Item id of the entry.
        id: String,
        /// Path to the file to attach.
        file: PathBuf,
    },

    /// Detach a file from a catalog entry.
    Detach {
        /// Item id of the entry.
        id: String,
        /// Name of the attached file.
        filename: String,
    },

    /// Show catalog counts.
    Info,

    /// Manage uploaded spreadsheet files.
    Files {
        #[command(subcommand)]
        action: FilesAction,
    },

    /// Manage editable content pages.
    Page {
        #[command(subcommand)]
        action: PageAction,
    },

    /// Show recent catalog mutations.
    Audit {
        /// Number of events to show.
        #[arg(long, default_value = "20")]
        limit: u32,
    },

    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// File registry subcommands.
#[derive(Subcommand)]
pub(crate) enum FilesAction {
    /// List uploaded spreadsheets.
    List,
    /// Print the public URL of an uploaded spreadsheet.
    Url { filename: String },
    /// Delete an uploaded spreadsheet and its record.
    Delete { filename: String },
}

/// Content page subcommands.
#[derive(Subcommand)]
pub(crate) enum PageAction {
    /// Print a page body.
    Get { slug: String },
    /// Create or replace a page body from a file.
    Set { slug: String, file: PathBuf },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "polidoc=info",
        1 => "polidoc=debug",
        _ => "polidoc=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Import {
            file,
            apply,
            overwrite,
        } => cmd_import(&file, apply, overwrite).await,
        Command::Search {
            query,
            scope,
            sort,
            page,
            youth_led,
            region,
            year,
            doc_type,
            keyword,
            language,
        } => {
            let request = build_request(
                query.as_deref().unwrap_or(""),
                &scope,
                &sort,
                page,
                youth_led.as_deref(),
                region.as_deref(),
                year,
                doc_type,
                keyword,
                language.as_deref(),
            )?;
            cmd_search(&request).await
        }
        Command::Browse => cmd_browse().await,
        Command::Entry { id } => cmd_entry(&id).await,
        Command::Attach { id, file } => cmd_attach(&id, &file).await,
        Command::Detach { id, filename } => cmd_detach(&id, &filename).await,
        Command::Info => cmd_info().await,
        Command::Files { action } => match action {
            FilesAction::List => cmd_files_list().await,
            FilesAction::Url { filename } => cmd_files_url(&filename).await,
            FilesAction::Delete { filename } => cmd_files_delete(&filename).await,
        },
        Command::Page { action } => match action {
            PageAction::Get { slug } => cmd_page_get(&slug).await,
            PageAction::Set { slug, file } => cmd_page_set(&slug, &file).await,
        },
        Command::Audit { limit } => cmd_audit(limit).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

async fn open_service() -> Result<CatalogService> {
    let config = load_config()?;
    Ok(CatalogService::from_config(config).await?)
}

#[allow(clippy::too_many_arguments)]
fn build_request(
    query: &str,
    scope: &str,
    sort: &str,
    page: u32,
    youth_led: Option<&str>,
    region: Option<&str>,
    year: Option<i32>,
    doc_type: Option<String>,
    keyword: Option<String>,
    language: Option<&str>,
) -> Result<SearchRequest> {
    let scope = SearchScope::from_str_opt(scope)
        .ok_or_else(|| eyre!("invalid scope '{scope}': expected all, title, or abstract"))?;
    let sort = SearchSort::from_str_opt(sort)
        .ok_or_else(|| eyre!("invalid sort '{sort}': expected relevance, dateasc, datedesc, or abc"))?;
    let youth_led = youth_led
        .map(|s| {
            YouthLed::from_str_opt(s)
                .ok_or_else(|| eyre!("invalid youth-led class '{s}'"))
        })
        .transpose()?;
    let region = region
        .map(|s| Region::from_name(s).ok_or_else(|| eyre!("unknown region '{s}'")))
        .transpose()?;
    // Accept a language name or a registry code.
    let language = language.map(|s| {
        languages::code_for(s)
            .map(String::from)
            .unwrap_or_else(|| s.to_lowercase())
    });

    Ok(SearchRequest {
        query: query.to_string(),
        scope,
        sort,
        page,
        youth_led,
        region,
        year,
        doc_type,
        keyword,
        language,
    })
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_import(file: &PathBuf, apply: bool, overwrite: bool) -> Result<()> {
    let bytes = std::fs::read(file)
        .map_err(|e| eyre!("cannot read '{}': {e}", file.display()))?;
    let filename = file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| eyre!("'{}' has no usable file name", file.display()))?
        .to_string();

    info!(file = %file.display(), apply, "importing spreadsheet");
    let service = open_service().await?;

    let spinner = spinner(if apply { "Importing..." } else { "Previewing..." });
    let result = if apply {
        service.apply_import(&bytes, &filename, overwrite).await
    } else {
        service.preview_import(&bytes, &filename).await
    };
    spinner.finish_and_clear();
    let report = result?;

    print_report(&report, apply);
    Ok(())
}

fn print_report(report: &ImportReport, applied: bool) {
    println!();
    if applied {
        println!("  Import applied (sheet: {})", report.sheet_name);
    } else {
        println!("  Import preview (sheet: {})", report.sheet_name);
    }
    println!("  Total:      {}", report.total);
    println!("  New:        {}", report.diff.new.len());
    println!("  Modified:   {}", report.diff.modified.len());
    println!("  Unmodified: {}", report.diff.unmodified.len());
    println!("  Deleted:    {}", report.diff.deleted.len());
    if report.file_already_exists && !applied {
        println!("  Note: a file with this name was uploaded before (use --overwrite)");
    }
    if !report.nits.is_empty() {
        println!();
        println!("  Data-quality findings ({}):", report.nits.len());
        for nit in &report.nits {
            println!("    - {nit}");
        }
    }
    println!();
}

async fn cmd_search(request: &SearchRequest) -> Result<()> {
    let service = open_service().await?;
    let results = service.search(request).await?;

    println!();
    println!(
        "  Showing {}-{} of {} entries (page {} of {})",
        results.start_entry,
        results.end_entry,
        results.total_entries,
        results.page,
        results.total_pages
    );
    println!();
    for hit in &results.hits {
        let entry = &hit.entry;
        let date = entry
            .start_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "undated".into());
        println!("  [{}] {}", entry.item_id, entry.title);
        println!(
            "      {} | {} | youth-led: {} | {}",
            date,
            hit.language_name,
            entry.youth_led,
            entry.doc_type
        );
        if hit.available_languages.len() > 1 {
            println!("      also in: {}", hit.available_languages.join(", "));
        }
    }
    if !results.youth_led_counts.is_empty() {
        println!();
        let parts: Vec<String> = results
            .youth_led_counts
            .iter()
            .map(|(class, count)| format!("{class}: {count}"))
            .collect();
        println!("  Youth-led: {}", parts.join(", "));
    }
    println!();
    Ok(())
}

async fn cmd_browse() -> Result<()> {
    let service = open_service().await?;
    let facets = service.facets().await;

    println!();
    println!("  Youth-led:");
    for facet in &facets.youth_led {
        println!("    {} ({})", facet.value, facet.count);
    }
    println!("  Years: {}", join_display(&facets.years));
    println!("  Document types:");
    for facet in &facets.doc_types {
        println!("    {} ({})", facet.value, facet.count);
    }
    println!("  Regions: {}", facets.regions.join(", "));
    println!("  Languages:");
    for language in &facets.languages {
        println!("    {} ({})", language.name, language.count);
    }
    println!();
    Ok(())
}

fn join_display<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

async fn cmd_entry(id: &str) -> Result<()> {
    let service = open_service().await?;
    let detail = service
        .entry(id)
        .await?
        .ok_or_else(|| eyre!("no entry with id '{id}'"))?;
    let entry = &detail.entry;

    println!();
    println!("  [{}] {}", entry.item_id, entry.title);
    println!("  Authors:    {}", entry.authors);
    println!("  Publishers: {}", entry.org_publishers.join("; "));
    if !entry.org_doc_id.is_empty() {
        println!("  Doc #:      {}", entry.org_doc_id);
    }
    println!("  Type:       {} ({})", entry.doc_type, entry.org_type);
    println!("  Language:   {}", languages::display_name(&entry.language));
    println!("  Youth-led:  {}", entry.youth_led);
    if let Some(date) = entry.start_date {
        println!("  Date:       {date}");
    }
    println!("  Regions:    {}", join_display(&entry.regions));
    if !entry.keywords.is_empty() {
        println!("  Keywords:   {}", entry.keywords.join("; "));
    }
    println!("  URL:        {}", entry.url);
    if !entry.abstract_text.is_empty() {
        println!();
        println!("  {}", entry.abstract_text);
    }
    if !detail.alternates.is_empty() {
        println!();
        println!("  Also available in:");
        for (language, alt_id) in &detail.alternates {
            println!("    {language}: {alt_id}");
        }
    }
    if !detail.related.is_empty() {
        println!();
        println!("  Related documents:");
        for (related_id, title) in &detail.related {
            println!("    [{related_id}] {title}");
        }
    }
    if !detail.files.is_empty() {
        println!();
        println!("  Files:");
        for file in &detail.files {
            println!("    {}  {}", file.filename, service.object_url(&file.object_key));
        }
    }
    println!();
    Ok(())
}

async fn cmd_attach(id: &str, file: &PathBuf) -> Result<()> {
    let bytes = std::fs::read(file)
        .map_err(|e| eyre!("cannot read '{}': {e}", file.display()))?;
    let filename = file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| eyre!("'{}' has no usable file name", file.display()))?;

    let service = open_service().await?;
    let url = service.add_attachment(id, filename, &bytes).await?;
    println!("{url}");
    Ok(())
}

async fn cmd_detach(id: &str, filename: &str) -> Result<()> {
    let service = open_service().await?;
    if service.remove_attachment(id, filename).await? {
        println!("detached {filename} from {id}");
        Ok(())
    } else {
        Err(eyre!("entry '{id}' has no attached file named '{filename}'"))
    }
}

async fn cmd_info() -> Result<()> {
    let service = open_service().await?;
    let info = service.info().await?;

    println!();
    println!("  Entries:   {}", info.entry_count);
    println!("  Languages: {}", info.language_count);
    println!("  Files:     {}", info.file_count);
    if let Some(last) = &info.last_import_at {
        println!("  Last import: {last}");
    }
    println!();
    Ok(())
}

async fn cmd_files_list() -> Result<()> {
    let service = open_service().await?;
    let files = service.list_files().await?;
    if files.is_empty() {
        println!("no uploaded files");
        return Ok(());
    }
    for file in files {
        println!(
            "{}  {:>10} bytes  {}  {}",
            file.uploaded_at, file.size_bytes, file.sha256, file.filename
        );
    }
    Ok(())
}

async fn cmd_files_url(filename: &str) -> Result<()> {
    let service = open_service().await?;
    let url = service
        .file_url(filename)
        .await?
        .ok_or_else(|| eyre!("no uploaded file named '{filename}'"))?;
    println!("{url}");
    Ok(())
}

async fn cmd_files_delete(filename: &str) -> Result<()> {
    let service = open_service().await?;
    if service.delete_file(filename).await? {
        println!("deleted {filename}");
        Ok(())
    } else {
        Err(eyre!("no uploaded file named '{filename}'"))
    }
}

async fn cmd_page_get(slug: &str) -> Result<()> {
    let service = open_service().await?;
    let content = service
        .get_page(slug)
        .await?
        .ok_or_else(|| eyre!("no page with slug '{slug}'"))?;
    println!("{content}");
    Ok(())
}

async fn cmd_page_set(slug: &str, file: &PathBuf) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .map_err(|e| eyre!("cannot read '{}': {e}", file.display()))?;
    let service = open_service().await?;
    service.set_page(slug, &content).await?;
    println!("updated page '{slug}'");
    Ok(())
}

async fn cmd_audit(limit: u32) -> Result<()> {
    let service = open_service().await?;
    let events = service.recent_audit(limit).await?;
    if events.is_empty() {
        println!("no audit events");
        return Ok(());
    }
    for event in events {
        println!("{}  {:14}  {}", event.created_at, event.event_type, event.message);
    }
    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("created {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Progress spinner
// ---------------------------------------------------------------------------

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner.set_message(message.to_string());
    spinner
}
