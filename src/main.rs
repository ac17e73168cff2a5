use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use prompt_chain_rs::adk::model::anthropic::AnthropicModel;
use prompt_chain_rs::chain::config::ChainConfig;
use prompt_chain_rs::chain::diagram::DiagramExporter;
use prompt_chain_rs::chain::logging::{self, banner, log_state};
use prompt_chain_rs::chain::{ChainEvent, ChainGraph, ChainState, PromptChain};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML settings file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the prompt chain once
    Run {
        /// Topic to generate for (defaults to the configured topic)
        #[arg(short, long)]
        topic: Option<String>,

        /// The model to use
        #[arg(short, long)]
        model: Option<String>,

        /// Skip the workflow diagram
        #[arg(long)]
        no_diagram: bool,

        /// Where to write the PNG diagram
        #[arg(long)]
        diagram_path: Option<String>,
    },
    /// List the models available to the API key
    Models,
    /// Export the workflow diagram only
    Diagram {
        /// Where to write the PNG diagram
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    logging::init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ChainConfig::load(path)?,
        None => ChainConfig::default(),
    };
    config.apply_env_overrides();

    match args.command {
        Commands::Run {
            topic,
            model,
            no_diagram,
            diagram_path,
        } => {
            if let Some(model) = model {
                config.model = model;
            }
            if let Some(path) = diagram_path {
                config.diagram.png_path = path;
            }

            banner("WORKFLOW START");

            let options = config.chain_options()?;
            let client_config = config.resolve_model_client()?;
            let model = Arc::new(AnthropicModel::new(client_config)?);
            log::info!("Using Anthropic model: {}", model.model_name());

            if config.diagram.enabled && !no_diagram {
                DiagramExporter::new(config.diagram.clone())
                    .export_best_effort(&ChainGraph::prompt_chain())
                    .await;
            }

            let initial =
                ChainState::with_topic(topic.unwrap_or_else(|| config.default_topic.clone()));
            log_state("Initial", &initial);

            let chain = PromptChain::new(model, options);
            let (tx, mut rx) = mpsc::channel(16);

            let printer = tokio::spawn(async move {
                while let Some(event) = rx.recv().await {
                    match event {
                        ChainEvent::Step { step, state, .. } => {
                            log_state(&format!("Step {}", step), &state)
                        }
                        ChainEvent::Retry { pass } => {
                            log::info!("Retrying, pass {}", pass)
                        }
                        ChainEvent::Done(_) => banner("WORKFLOW COMPLETE"),
                    }
                }
            });

            let result = chain.stream(initial, tx).await;
            printer.await.context("state printer task panicked")?;
            let final_state = result?;

            log::debug!("Final state JSON: {}", final_state.to_json());
            println!("\nFinal State:\n{}", final_state);
        }
        Commands::Models => {
            let client_config = config.resolve_model_client()?;
            let model = AnthropicModel::new(client_config)?;

            println!("Available Anthropic models for this key:\n");
            for info in model.list_models().await? {
                match info.display_name {
                    Some(name) => println!("- {} ({})", info.id, name),
                    None => println!("- {}", info.id),
                }
            }
        }
        Commands::Diagram { output } => {
            if let Some(path) = output {
                config.diagram.png_path = path;
            }

            DiagramExporter::new(config.diagram.clone())
                .export_best_effort(&ChainGraph::prompt_chain())
                .await;
        }
    }

    Ok(())
}
