use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use statuz::quote::HttpQuoteSource;
use statuz::{
    AppConfig, Category, Controller, DataUrlSink, ExportPipeline, ImageRefGenerator, QuoteSource,
    ViewState, CATEGORIES,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "statuz")]
#[command(about = "Random background + quote composer with PNG export", long_about = None)]
struct Cli {
    /// Configuration file path (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory exports are written to
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Category to start with (see `statuz categories`)
    #[arg(long)]
    category: Option<String>,

    /// Font used for the quote overlay
    #[arg(long, value_name = "FILE")]
    font: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the quote categories
    Categories,
    /// Fetch and print one quote
    Quote,
    /// Print a fresh background image URL
    ImageUrl,
    /// Fetch an image and a quote, then export the composition once
    Export {
        /// Print a data URL on stdout instead of writing a file
        #[arg(long)]
        data_url: bool,
    },
    /// Drive the view from stdin, one command per line (default)
    Interactive,
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if let Some(dir) = &cli.output_dir {
        config.export.output_dir = dir.clone();
    }
    if let Some(font) = &cli.font {
        config.export.font_path = Some(font.clone());
    }
    if let Some(slug) = &cli.category {
        config.default_category = Category::parse(slug)?.as_str().to_string();
    }
    config.validate()?;
    Ok(config)
}

fn render(state: &ViewState) {
    println!("[{}] {}", state.selected_category, state.image_url);
    match (&state.current_quote, state.quote_loading) {
        (_, true) => println!("  (loading quote...)"),
        (Some(q), false) => println!("  \"{}\"\n    - {}", q.content, q.author),
        (None, false) => println!("  (no quote)"),
    }
}

async fn interactive(controller: Controller) -> Result<()> {
    controller.mount().await.context("initial quote fetch panicked")?;
    render(&controller.snapshot());
    println!("commands: new-quote | new-image | randomize | category <slug> | export | show | quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let mut parts = line.split_whitespace();
        let Some(cmd) = parts.next() else { continue };
        match cmd {
            "new-quote" | "n" => {
                let pending = controller.request_new_quote();
                render(&controller.snapshot());
                pending.await?;
            }
            "new-image" | "b" => {
                controller.request_new_image();
            }
            "randomize" | "r" => {
                controller.randomize().await?;
            }
            "category" | "c" => match parts.next().map(Category::parse) {
                Some(Ok(category)) => controller.select_category(category).await?,
                Some(Err(e)) => {
                    eprintln!("{}", e);
                    continue;
                }
                None => {
                    println!("{}", CATEGORIES.join(" "));
                    continue;
                }
            },
            "export" | "e" => match controller.export().await {
                Some(d) => println!("saved {}", d.location),
                None => println!("export failed (see log)"),
            },
            "show" | "s" => {}
            "quit" | "q" | "exit" => break,
            other => {
                eprintln!("unknown command: {}", other);
                continue;
            }
        }
        render(&controller.snapshot());
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    log::debug!("{} ({}) starting", config.app_name, config.app_id);

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Categories => {
            for c in Category::all() {
                println!("{}", c);
            }
        }
        Commands::Quote => {
            let source = HttpQuoteSource::new(&config)?;
            let quote = source.fetch(&config.default_category()).await?;
            println!("\"{}\"\n    - {}", quote.content, quote.author);
        }
        Commands::ImageUrl => {
            println!("{}", ImageRefGenerator::from_config(&config).next());
        }
        Commands::Export { data_url } => {
            let controller = if data_url {
                let sink = Arc::new(DataUrlSink::new(std::io::stdout()));
                let exporter = ExportPipeline::from_config(&config.export, sink)?;
                Controller::new(
                    &config,
                    Arc::new(HttpQuoteSource::new(&config)?),
                    Arc::new(statuz::image_load::HttpImageLoader::new(&config)?),
                    exporter,
                )
            } else {
                Controller::with_http_sources(config)?
            };
            controller.mount().await.context("quote fetch panicked")?;
            match controller.export().await {
                Some(d) if !data_url => println!("{}", d.location),
                Some(_) => {}
                None => anyhow::bail!("export failed"),
            }
        }
        Commands::Interactive => interactive(Controller::with_http_sources(config)?).await?,
    }

    Ok(())
}
