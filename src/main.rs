use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use forge_sdk::{
    DitherMethod, ForgeClient, Orientation, OutputFormat, Palette, Paper, RenderRequestBuilder,
};
use log::info;
use tracing_subscriber::EnvFilter;

/// Command-line client for a Forge rendering server
#[derive(Parser)]
#[command(name = "forge", version, about)]
struct Cli {
    /// Server base URL
    #[arg(long, env = "FORGE_URL", default_value = "http://localhost:3000")]
    server: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 120)]
    timeout: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check whether the server is up
    Health,
    /// Render HTML files (or URLs with --url) concurrently
    Render(RenderArgs),
}

#[derive(clap::Args)]
struct RenderArgs {
    /// HTML files to render, or URLs when --url is given
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Treat inputs as URLs instead of file paths
    #[arg(long)]
    url: bool,

    #[arg(long, default_value = "pdf")]
    format: OutputFormat,

    #[arg(long)]
    paper: Option<Paper>,

    #[arg(long)]
    orientation: Option<Orientation>,

    /// Preset name or "T,R,B,L" in millimeters
    #[arg(long)]
    margins: Option<String>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// Output DPI
    #[arg(long)]
    density: Option<f64>,

    /// Quantization color count (2-256)
    #[arg(long)]
    colors: Option<u16>,

    /// Palette preset or comma separated hex colors
    #[arg(long)]
    palette: Option<Palette>,

    #[arg(long)]
    dither: Option<DitherMethod>,

    /// PDF title metadata
    #[arg(long)]
    title: Option<String>,

    /// Directory the outputs are written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let client = ForgeClient::with_timeout(&cli.server, Duration::from_secs(cli.timeout))
        .context("failed to create client")?;

    let code = match cli.command {
        Command::Health => {
            if client.health().await {
                println!("ok");
                ExitCode::SUCCESS
            } else {
                println!("unavailable");
                ExitCode::FAILURE
            }
        }
        Command::Render(args) => render_all(&client, &args).await?,
    };
    client.close();
    Ok(code)
}

async fn render_all(client: &ForgeClient, args: &RenderArgs) -> Result<ExitCode> {
    let jobs = args.inputs.iter().map(|input| async move {
        let result = render_one(client, args, input).await;
        (input, result)
    });

    let mut failed = false;
    for (input, result) in futures::future::join_all(jobs).await {
        match result {
            Ok(path) => println!("{} -> {}", input, path.display()),
            Err(err) => {
                failed = true;
                eprintln!("{}: {:#}", input, err);
            }
        }
    }
    Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

async fn render_one(client: &ForgeClient, args: &RenderArgs, input: &str) -> Result<PathBuf> {
    let builder = if args.url {
        client.render_url(input)
    } else {
        let html = tokio::fs::read_to_string(input)
            .await
            .with_context(|| format!("failed to read {}", input))?;
        client.render_html(html)
    };
    let builder = apply_options(builder, args)?;

    let bytes = builder.send().await?;
    let out = output_path(&args.out_dir, input, args.url, args.format);
    tokio::fs::write(&out, &bytes)
        .await
        .with_context(|| format!("failed to write {}", out.display()))?;
    info!("wrote {} bytes to {}", bytes.len(), out.display());
    Ok(out)
}

fn apply_options(mut b: RenderRequestBuilder, args: &RenderArgs) -> forge_sdk::Result<RenderRequestBuilder> {
    b = b.format(args.format);
    if let Some(p) = args.paper {
        b = b.paper(p);
    }
    if let Some(o) = args.orientation {
        b = b.orientation(o);
    }
    if let Some(m) = &args.margins {
        b = b.margins(m)?;
    }
    if let Some(w) = args.width {
        b = b.width(w)?;
    }
    if let Some(h) = args.height {
        b = b.height(h)?;
    }
    if let Some(d) = args.density {
        b = b.density(d)?;
    }
    if let Some(n) = args.colors {
        b = b.colors(n)?;
    }
    match &args.palette {
        Some(Palette::Preset(p)) => b = b.palette(*p),
        Some(Palette::Custom(colors)) => b = b.custom_palette(colors.iter().cloned())?,
        None => {}
    }
    if let Some(d) = args.dither {
        b = b.dither(d);
    }
    if let Some(t) = &args.title {
        b = b.pdf_title(t.clone());
    }
    Ok(b)
}

/// `<out_dir>/<stem>.<ext>`; URLs use their last path segment, or the host.
fn output_path(out_dir: &Path, input: &str, is_url: bool, format: OutputFormat) -> PathBuf {
    let stem = if is_url {
        let parsed = url::Url::parse(input).ok();
        parsed
            .as_ref()
            .and_then(|u| u.path_segments()?.filter(|s| !s.is_empty()).last().map(file_stem))
            .or_else(|| parsed.as_ref()?.host_str().map(str::to_string))
    } else {
        Some(file_stem(input))
    };
    let stem = stem.unwrap_or_else(|| "page".to_string());
    out_dir.join(format!("{}.{}", stem, format.extension()))
}

fn file_stem(name: &str) -> String {
    Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string())
}
