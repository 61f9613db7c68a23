use std::sync::Arc;
use clap::{Parser, Subcommand};
use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use postboard_sync::{
    BrowseSession, ClientConfig, HttpBackend, MemoryRouter, NewPost, Submission,
};

mod render;
mod repl;

#[derive(Parser)]
#[command(name = "postboard")]
#[command(about = "Browse authors, posts and comments from a JSON REST service", long_about = None)]
struct Cli {
    /// Base URL of the REST service
    #[arg(long, env = "POSTBOARD_BASE_URL")]
    base_url: Option<String>,

    /// Posts per page
    #[arg(long, env = "POSTBOARD_PAGE_SIZE")]
    page_size: Option<usize>,

    /// Log filter, e.g. "debug" or "postboard_sync=trace" (overrides RUST_LOG)
    #[arg(long, env = "POSTBOARD_LOG")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List authors
    Authors {
        /// Only authors whose name contains this text (case-insensitive)
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// List the posts of one author
    Posts {
        /// Author ID
        author: u64,

        /// Page to show
        #[arg(short, long, default_value = "1")]
        page: usize,

        /// Star these post IDs before listing
        #[arg(long = "star", value_name = "ID")]
        star: Vec<u64>,
    },

    /// Show a post with its comments
    Show {
        /// Post ID
        post: u64,
    },

    /// Create a post for an author
    New {
        /// Author ID
        author: u64,

        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        body: String,
    },

    /// Interactive browser
    Browse,
}

fn init_tracing(level: Option<&str>) {
    let filter = level
        .map(String::from)
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "postboard=info,postboard_sync=info".into());

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = ClientConfig::from_env().context("Failed to load configuration")?;

    if let Some(url) = &cli.base_url {
        config.base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(size) = cli.page_size {
        config.page_size = size;
    }

    config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("Invalid configuration")?;
    Ok(config)
}

fn create_session(config: ClientConfig) -> Result<BrowseSession> {
    let backend = Arc::new(HttpBackend::new(&config).context("Failed to create HTTP client")?);
    Ok(BrowseSession::new(config, backend, Box::new(MemoryRouter::new())))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.log_level.as_deref());

    let config = load_config(&cli)?;
    tracing::debug!(base_url = %config.base_url, page_size = config.page_size, "configuration loaded");
    let mut session = create_session(config)?;

    match cli.command {
        Commands::Authors { ref filter } => {
            session.start();
            session.settled().await;
            if let Some(text) = filter {
                session.search(text.as_str());
                session.filter().flush();
            }
            println!("{}", render::authors(&session.authors_view()));
        }

        Commands::Posts { author, page, ref star } => {
            session.start();
            session.select_author(author);
            session.settled().await;
            for id in star {
                session.toggle_star(*id);
            }
            session.set_page(page);
            println!("{}", render::posts(&session.posts_view()));
        }

        Commands::Show { post } => {
            session.open_post(post);
            session.settled().await;
            println!("{}", render::detail(&session.detail_view()));
        }

        Commands::New { author, ref title, ref body } => {
            session.start();
            session.select_author(author);
            session.settled().await;

            match session.submit_post(NewPost::new(author, title.as_str(), body.as_str())).await {
                Ok(Submission::Applied(post)) | Ok(Submission::Discarded(post)) => {
                    println!("✓ Created post {}\n", post.id);
                    println!("{}", render::posts(&session.posts_view()));
                }
                Err(e) => {
                    eprintln!("{}", render::error(&e));
                    session.shutdown();
                    std::process::exit(1);
                }
            }
        }

        Commands::Browse => {
            return repl::run(session).await;
        }
    }

    session.shutdown();
    Ok(())
}
