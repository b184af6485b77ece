use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use ig_api_types::{ImageHash, ImageResult};
use ig_client_core::{FetchOutcome, GalleryClient, ToggleOutcome};
use ig_gateway_http::{GatewayConfig, HttpGateway};
use ig_storage::RocksDbSessionStore;
use ig_wallet::{StaticWalletProvider, WalletSession};
use std::rc::Rc;
use std::time::Duration;
use tracing::info;

type Client = GalleryClient<StaticWalletProvider, RocksDbSessionStore>;

#[derive(Debug, Parser)]
#[command(name = "gallery", version, about = "Browse, search and like images on the gallery service")]
struct Cli {
    /// Gallery API base URL.
    #[arg(long, env = "GALLERY_API_URL", global = true)]
    api_url: Option<String>,

    /// Content endpoint used to build image URLs.
    #[arg(long, env = "GALLERY_CONTENT_URL", global = true)]
    content_url: Option<String>,

    #[arg(long, env = "GALLERY_HTTP_TIMEOUT_SECS", global = true)]
    timeout_secs: Option<u64>,

    /// Wallet address to connect with.
    #[arg(long, env = "GALLERY_WALLET", global = true)]
    wallet: Option<String>,

    /// Where the connected wallet is remembered between runs.
    #[arg(long, env = "GALLERY_SESSION_DB", default_value = ".gallery-session", global = true)]
    session_db: String,

    /// Results requested per page.
    #[arg(long, global = true)]
    page_size: Option<u32>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check the service is up.
    Health,
    /// Connect `--wallet` and remember it.
    Connect,
    /// Forget the remembered wallet.
    Disconnect,
    /// Show the remembered wallet.
    Whoami,
    /// Walk the random feed.
    Feed {
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Similarity search.
    Search { query: String },
    /// List every indexed image.
    Images,
    /// Show the images liked by the connected wallet.
    Likes,
    /// Like an image, or unlike it if already liked.
    Toggle { hash: String },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = GatewayConfig::new(
        cli.api_url.clone(),
        cli.content_url.clone(),
        cli.timeout_secs.map(Duration::from_secs),
    );
    info!("using gallery API at {}", config.api_base_url);
    let gateway = HttpGateway::new(config).context("failed to build HTTP client")?;

    let store = RocksDbSessionStore::open_default(&cli.session_db)
        .with_context(|| format!("failed to open session store at {}", cli.session_db))?;
    let provider = cli.wallet.clone().map(StaticWalletProvider::single);
    let client = GalleryClient::new(Rc::new(gateway), WalletSession::new(provider, store))
        .with_page_size(cli.page_size);

    run(&cli, &client).await
}

async fn run(cli: &Cli, client: &Client) -> Result<()> {
    match &cli.command {
        Command::Health => {
            let health = client.health().await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&health)?);
            } else {
                println!(
                    "{} ({} images, device {}, index {})",
                    health.status,
                    health.indexed_images.unwrap_or_default(),
                    health.device.as_deref().unwrap_or("?"),
                    health.index_type.as_deref().unwrap_or("none"),
                );
            }
        }
        Command::Connect => {
            if cli.wallet.is_none() {
                bail!("pass --wallet <address> (or set GALLERY_WALLET) to connect");
            }
            let account = client.connect().await?;
            println!("connected as {} ({} likes)", account.short(), client.liked().len());
        }
        Command::Disconnect => {
            client.restore().await;
            client.disconnect().await;
            println!("disconnected");
        }
        Command::Whoami => match client.restore().await {
            Some(account) => println!("{account}"),
            None => println!("not connected"),
        },
        Command::Feed { pages } => {
            ensure_account(cli, client).await?;
            client.search("").await?;
            for _ in 1..*pages {
                match client.load_more().await? {
                    FetchOutcome::Applied { added: 0 } | FetchOutcome::Skipped(_) => break,
                    _ => {}
                }
            }
            print_images(cli, client, client.feed().items())?;
            if let Some(seed) = client.feed().continuation() {
                info!("next page seed: {seed}");
            }
        }
        Command::Search { query } => {
            ensure_account(cli, client).await?;
            client.search(query).await?;
            print_images(cli, client, client.feed().items())?;
        }
        Command::Images => {
            let images = client.list_images().await?;
            print_images(cli, client, &images)?;
        }
        Command::Likes => {
            let Some(account) = ensure_account(cli, client).await? else {
                bail!("no wallet connected; run `gallery connect --wallet <address>`");
            };
            let liked = client.liked();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&liked)?);
            } else {
                println!("{} likes for {}", liked.len(), account.short());
                for hash in liked {
                    println!("  {hash}");
                }
            }
        }
        Command::Toggle { hash } => {
            ensure_account(cli, client).await?;
            let hash = ImageHash(hash.clone());
            match client.toggle_like(&hash).await? {
                ToggleOutcome::Liked => println!("liked {hash}"),
                ToggleOutcome::Unliked => println!("unliked {hash}"),
                ToggleOutcome::Pending => println!("{hash} is already being updated"),
            }
        }
    }

    Ok(())
}

/// Reuse the remembered wallet, or connect `--wallet` when nothing is remembered.
async fn ensure_account(cli: &Cli, client: &Client) -> Result<Option<ig_api_types::WalletAddress>> {
    if let Some(account) = client.restore().await {
        return Ok(Some(account));
    }
    if cli.wallet.is_some() {
        return Ok(Some(client.connect().await?));
    }
    Ok(None)
}

fn print_images(cli: &Cli, client: &Client, images: &[ImageResult]) -> Result<()> {
    if cli.json {
        println!("{}", serde_json::to_string_pretty(images)?);
        return Ok(());
    }

    for image in images {
        let marker = if client.is_liked(&image.hash) { "♥" } else { " " };
        match image.similarity {
            Some(score) => println!("{marker} {:<24} {score:.3}  {}", image.filename, image.display_url),
            None => println!("{marker} {:<24}        {}", image.filename, image.display_url),
        }
    }
    Ok(())
}
