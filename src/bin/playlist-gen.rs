use std::io::{Read, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use playlist_gen_rs::config::Configs;
use playlist_gen_rs::constant::MIN_REQUEST_DELAY_MS;
use playlist_gen_rs::gateway::Gateway;
use playlist_gen_rs::lastfm::LastFm;

/// Batch playlist generator: reads a small declarative program and prints
/// a deterministic list of streaming track URIs.
///
/// Argument parsing, file/stdin/stdout plumbing, config loading, and
/// credential loading live here so the library stays a pure resolution
/// pipeline.
#[derive(Parser, Debug)]
#[command(name = "playlist-gen", version, about)]
struct Cli {
    /// Path to the input program, or `-` (default) to read stdin.
    #[arg(short, long, default_value = "-")]
    input: String,

    /// A single-argument program instead of reading a file; `\n` is
    /// translated to a literal line break before parsing.
    #[arg(short, long)]
    program: Option<String>,

    /// Path to write the output to, or `-` (default) for stdout.
    #[arg(short, long, default_value = "-")]
    output: String,

    /// Last.fm API key for `#ORDER BY LASTFM`. Falls back to the
    /// `LASTFM_API_KEY` environment variable.
    #[arg(long)]
    lastfm_api_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let program_text = read_program(&cli)?;

    let configs = Configs::from_env().context("loading app configuration")?;
    let app_config = &configs.app_config;

    let mut client_builder = reqwest::Client::builder();
    if let Some(proxy_url) = app_config.proxy_url() {
        client_builder = client_builder.proxy(reqwest::Proxy::all(proxy_url)?);
    }
    let http_client = client_builder.build()?;

    let gateway = Gateway::new(
        &app_config.streaming_api_endpoint,
        Duration::from_millis(app_config.min_request_delay_ms.max(MIN_REQUEST_DELAY_MS)),
    )?
    .with_client(http_client);

    let lastfm_api_key = cli.lastfm_api_key.clone().or(configs.lastfm_api_key.clone());
    let lastfm = lastfm_api_key.map(LastFm::new);

    let output = playlist_gen_rs::run_program(&program_text, &gateway, lastfm.as_ref()).await;

    write_output(&cli, &output)
}

fn read_program(cli: &Cli) -> Result<String> {
    if let Some(program) = &cli.program {
        return Ok(program.replace("\\n", "\n"));
    }

    if cli.input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading program from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(PathBuf::from(&cli.input))
            .with_context(|| format!("reading program from {}", cli.input))
    }
}

fn write_output(cli: &Cli, output: &str) -> Result<()> {
    if cli.output == "-" {
        println!("{output}");
        Ok(())
    } else {
        let mut file =
            std::fs::File::create(&cli.output).with_context(|| format!("creating {}", cli.output))?;
        writeln!(file, "{output}").with_context(|| format!("writing {}", cli.output))
    }
}
