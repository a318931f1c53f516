use anyhow::Result;
use clap::Parser;
use std::io;
use std::path::PathBuf;
use tracing::warn;
use tweetsheet::app::{fetch_export, publish_export};
use tweetsheet::config::Config;
use tweetsheet::prompt;
use tweetsheet::sheets::client::GoogleSheetsClient;
use tweetsheet::sheets::render_tsv;
use tweetsheet::twitter::client::TwitterClient;

#[derive(Parser)]
#[command(name = "tweetsheet")]
#[command(about = "Copy a Twitter user's recent tweets and engagement counts into a Google Sheet")]
#[command(version)]
struct Cli {
    /// Account to export, with or without the leading "@" (prompted if omitted)
    #[arg(short, long)]
    user: Option<String>,

    /// Number of tweets to fetch (prompted if omitted; the API returns at least 5)
    #[arg(short = 'n', long)]
    count: Option<usize>,

    /// Path to config file (default: <config dir>/tweetsheet/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Spreadsheet id, overriding the config file
    #[arg(long)]
    spreadsheet: Option<String>,

    /// Worksheet name, overriding the config file
    #[arg(long)]
    worksheet: Option<String>,

    /// Print the table as TSV instead of writing the spreadsheet
    #[arg(long)]
    dry_run: bool,

    /// Open the spreadsheet in a browser when done
    #[arg(long)]
    open: bool,

    /// Log each page request
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "tweetsheet=debug"
    } else {
        "tweetsheet=info"
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(id) = cli.spreadsheet {
        config.sheets.spreadsheet_id = id;
    }
    if let Some(name) = cli.worksheet {
        config.sheets.worksheet = name;
    }

    let handle = match cli.user {
        Some(user) => prompt::normalize_handle(&user)?,
        None => prompt::ask_handle(&mut io::stdin().lock(), &mut io::stdout())?,
    };
    let count = match cli.count {
        Some(count) => count,
        None => prompt::ask_count(&mut io::stdin().lock(), &mut io::stdout())?,
    };
    println!(
        "This tool may return a different number of tweets than requested because the API returns at least {} per request",
        config.twitter.page_min
    );

    let twitter = TwitterClient::from_config(&config.twitter)?;
    let export = fetch_export(&twitter, &config.twitter, &handle, count).await?;

    if let Some(notice) = export.shortfall_notice() {
        println!("{}", notice);
    }

    if cli.dry_run {
        print!("{}", render_tsv(&export.table()));
        return Ok(());
    }

    let sheets = GoogleSheetsClient::connect(&config.sheets).await?;
    publish_export(&sheets, &export).await?;

    let url = config.sheets.document_url();
    println!("Please check {}", url);

    if cli.open {
        if let Err(e) = open::that(&url) {
            warn!(error = %e, "could not open browser");
        }
    }

    Ok(())
}
