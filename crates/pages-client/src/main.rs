use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pages_client::{ClientConfig, HttpPageStore, PageCache, PageTree, Session, Subscription};
use pages_shared::{api::UpdatePageRequest, Page};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "pages")]
#[command(about = "Browse and edit a pages workspace from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every page in backend order
    List,
    /// Show the page hierarchy
    Tree {
        /// Descend into every page instead of only the root level
        #[arg(long)]
        expand_all: bool,
    },
    /// Most recently modified pages
    Recent {
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Print a single page with its content
    Show { id: Uuid },
    /// Create an "Untitled" page
    Create {
        #[arg(long)]
        parent: Option<Uuid>,
    },
    /// Change a page's title
    Rename { id: Uuid, title: String },
    Delete { id: Uuid },
    Duplicate { id: Uuid },
    /// Search page titles
    Search { query: String },
    /// Append text to a page's content
    Append { id: Uuid, text: String },
    /// Store an access token for later runs
    Login { token: String },
    /// Forget the stored access token
    Logout,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pages_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::from_env()?;
    let session = config.session().context("Could not load session")?;

    let store = HttpPageStore::new(&config.api_url, session).with_search_options(config.search);
    if !store.is_authenticated() {
        tracing::warn!("no session found, requests will be sent unauthenticated");
    }

    let cache = Arc::new(PageCache::new(store));
    let _changes = log_changes(&cache);

    run(cli.command, &cache, &config).await
}

/// Log every snapshot replacement
fn log_changes(cache: &Arc<PageCache<HttpPageStore>>) -> Subscription {
    let weak = Arc::downgrade(cache);
    cache.subscribe(move || {
        if let Some(cache) = weak.upgrade() {
            tracing::debug!(
                pages = cache.snapshot().len(),
                query = ?cache.active_query(),
                "page cache changed"
            );
        }
    })
}

async fn run(
    command: Command,
    cache: &PageCache<HttpPageStore>,
    config: &ClientConfig,
) -> Result<()> {
    match command {
        Command::List => {
            let pages = cache.list().await?;
            for page in pages.iter() {
                print_page_line(page, 0);
            }
        }
        Command::Tree { expand_all } => {
            let pages = cache.list().await?;
            let expanded: HashSet<Uuid> = if expand_all {
                pages.iter().map(|p| p.id).collect()
            } else {
                HashSet::new()
            };
            let tree = PageTree::new(&pages);
            if tree.is_empty() {
                println!("No pages yet");
            }
            for row in tree.expanded_tree(&expanded, None) {
                print_page_line(row.page, row.depth);
            }
        }
        Command::Recent { limit } => {
            for page in cache.recent(limit.unwrap_or(config.recent_limit)).await? {
                println!(
                    "{}  {}",
                    page.last_modified().format("%Y-%m-%d %H:%M"),
                    label(&page)
                );
            }
        }
        Command::Show { id } => {
            let page = cache.get(id).await.context("Page not found")?;
            let pages = cache.list().await?;
            let tree = PageTree::new(&pages);
            let breadcrumb: Vec<&str> = tree
                .ancestors(id)
                .iter()
                .rev()
                .map(|p| p.title.as_str())
                .collect();

            if !breadcrumb.is_empty() {
                println!("{}", breadcrumb.join(" / "));
            }
            println!("{}", label(&page));
            println!("{} words", page.word_count());
            println!();
            println!("{}", page.content);
        }
        Command::Create { parent } => {
            let page = cache.create(parent).await?;
            println!("Created {}", page.id);
        }
        Command::Rename { id, title } => {
            cache.update(id, UpdatePageRequest::title(title)).await?;
            println!("Renamed {}", id);
        }
        Command::Delete { id } => {
            cache.delete(id).await?;
            println!("Deleted {}", id);
        }
        Command::Duplicate { id } => match cache.duplicate(id).await? {
            Some(page) => println!("Duplicated as {}", page.id),
            None => anyhow::bail!("Page {} not found", id),
        },
        Command::Search { query } => {
            let results = cache.search(&query).await?;
            println!("Search Results ({})", results.len());
            for page in results.iter() {
                print_page_line(page, 0);
            }
        }
        Command::Append { id, text } => {
            if !cache.append_content(id, &text).await? {
                anyhow::bail!("Page {} not found", id);
            }
            println!("Appended to {}", id);
        }
        Command::Login { token } => {
            Session::new(token).save()?;
            println!("Session saved");
        }
        Command::Logout => {
            Session::delete()?;
            println!("Logged out");
        }
    }

    Ok(())
}

fn label(page: &Page) -> String {
    match &page.icon {
        Some(icon) => format!("{} {}", icon, page.title),
        None => page.title.clone(),
    }
}

fn print_page_line(page: &Page, depth: usize) {
    println!("{}{}  [{}]", "  ".repeat(depth), label(page), page.id);
}
