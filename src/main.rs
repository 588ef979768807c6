//! ollamactl - Main CLI Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use futures_util::StreamExt;
use ollamactl::cli::display::{self, TransferProgress};
use ollamactl::cli::{Args, Commands, Verbosity};
use ollamactl::config::Config;
use ollamactl::errors::ConfigError;
use ollamactl::models::ProgressChunk;
use ollamactl::repl::{self, input::confirm, Conversation};
use ollamactl::streaming::Reply;
use ollamactl::types::{EmbeddingsRequest, GenerateRequest, PullRequest, PushRequest};
use ollamactl::{logging, mcp, OllamaClient};
use std::path::Path;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(args.verbosity());

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            display::show_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    if let Commands::InitConfig { output } = &args.command {
        init_config(output.as_deref())?;
        return Ok(ExitCode::SUCCESS);
    }

    let mut config = Config::load(args.config.as_deref()).context("Error loading configuration")?;
    if args.mcphost_config && mcp::import_hosts(&mut config) == 0 {
        display::show_warning("No Ollama hosts imported from MCP config");
    }

    let client = connect(&args, &config)?;
    let verbosity = args.verbosity();

    match args.command {
        Commands::ListModels { json } => list_models(&client, json).await?,
        Commands::Run {
            model,
            prompt,
            system,
            no_stream,
        } => {
            let model = resolve_model(model, &config)?;
            let mut request = GenerateRequest::new(model, prompt)
                .stream(config.settings.stream && !no_stream);
            if let Some(system) = system {
                request = request.system(system);
            }
            run_prompt(&client, request, verbosity).await?;
        }
        Commands::Pull { model, insecure } => {
            display::show_info(&format!("Pulling model: {}", model));
            let reply = client
                .pull_model(PullRequest::new(&model).insecure(insecure))
                .await?;
            follow_progress(reply, verbosity).await?;
            display::show_success(&format!("Successfully pulled {}", model));
        }
        Commands::Push { model, insecure } => {
            display::show_info(&format!("Pushing model: {}", model));
            let reply = client
                .push_model(PushRequest::new(&model).insecure(insecure))
                .await?;
            follow_progress(reply, verbosity).await?;
            display::show_success(&format!("Successfully pushed {}", model));
        }
        Commands::Delete { model, yes } => {
            if !yes && !confirm(&format!("Delete model {}?", model))? {
                println!("{}", "Cancelled".yellow());
                return Ok(ExitCode::SUCCESS);
            }
            client.delete_model(&model).await?;
            display::show_success(&format!("Successfully deleted {}", model));
        }
        Commands::Show { model } => {
            let info = client.show_model(&model).await?;
            display::print_model_info(&model, &info);
        }
        Commands::Chat { model, system } => {
            let model = resolve_model(model, &config)?;
            let mut conversation = Conversation::new(model, system);
            repl::run_chat(&client, &mut conversation).await?;
        }
        Commands::Embed { model, text } => {
            let model = resolve_model(model, &config)?;
            let embedding = client.embeddings(EmbeddingsRequest::new(model, text)).await?;
            println!("{}", serde_json::to_string(&embedding)?);
        }
        Commands::Health => {
            if client.health_check().await {
                display::show_success(&format!("Server at {} is reachable", client.base_url()));
            } else {
                display::show_error(&format!("Server at {} is not reachable", client.base_url()));
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::InitConfig { output } => init_config(output.as_deref())?,
    }

    client.close();
    Ok(ExitCode::SUCCESS)
}

/// Build the client for the selected host
fn connect(args: &Args, config: &Config) -> Result<OllamaClient> {
    let mut profile = config.profile(args.host.as_deref());
    if let Some(port) = args.port {
        profile = profile.with_port(port);
    }

    Ok(OllamaClient::with_timeout(profile, config.timeout())?)
}

fn resolve_model(model: Option<String>, config: &Config) -> Result<String> {
    model
        .or_else(|| config.settings.default_model.clone())
        .context("No model given; pass --model or set settings.default_model")
}

async fn list_models(client: &OllamaClient, json: bool) -> Result<()> {
    let models = client.list_models().await?;

    if json {
        let rows: Vec<_> = models
            .iter()
            .map(|m| {
                serde_json::json!({
                    "name": m.resolved_name(),
                    "size": m.size,
                    "modified_at": m.modified_at,
                    "digest": m.digest,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else if models.is_empty() {
        println!("{}", "No models found".yellow());
    } else {
        display::print_model_table(&models);
    }

    Ok(())
}

async fn run_prompt(client: &OllamaClient, request: GenerateRequest, verbosity: Verbosity) -> Result<()> {
    let mut chunks = client.generate(request).await?.into_stream();
    let mut metrics = None;

    while let Some(chunk) = chunks.next().await {
        let chunk = chunk?;
        display::stream_fragment(&chunk.response)?;
        if chunk.done {
            metrics = Some(chunk.metrics);
        }
    }
    println!();

    if let (Some(metrics), Verbosity::Verbose | Verbosity::VeryVerbose) = (metrics, verbosity) {
        display::print_stats(&metrics);
    }

    Ok(())
}

async fn follow_progress(reply: Reply<ProgressChunk>, verbosity: Verbosity) -> Result<()> {
    let mut progress = TransferProgress::new(verbosity.show_progress());
    let mut chunks = reply.into_stream();

    while let Some(chunk) = chunks.next().await {
        match chunk {
            Ok(chunk) => progress.update(&chunk),
            Err(e) => {
                progress.finish();
                return Err(e.into());
            }
        }
    }

    progress.finish();
    Ok(())
}

fn init_config(output: Option<&Path>) -> Result<()> {
    let path = match output {
        Some(path) => path.to_path_buf(),
        None => Config::global_path().ok_or(ConfigError::NoConfigDir)?,
    };

    if path.exists()
        && !confirm(&format!(
            "Config file already exists at {}. Overwrite?",
            path.display()
        ))?
    {
        println!("{}", "Cancelled".yellow());
        return Ok(());
    }

    Config::example()
        .save(&path)
        .context("Error creating config")?;

    display::show_success(&format!("Created example config at {}", path.display()));
    println!("\nEdit this file to add your Ollama servers.");
    Ok(())
}
