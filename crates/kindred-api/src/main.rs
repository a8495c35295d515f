//! Kindred CLI and REST API entry point.
//!
//! Binary name: `kindred`
//!
//! Parses CLI arguments, initializes database and services, then dispatches
//! to the appropriate command handler or starts the REST API server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, DeleteResource, ListResource, SaveResource, ShowResource};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,kindred=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "kindred", &mut std::io::stdout());
        return Ok(());
    }

    // Initialize application state (DB, services)
    let state = AppState::init().await?;

    match cli.command {
        Commands::List { resource } => match resource {
            ListResource::Profiles { kind } => {
                cli::profile::list_profiles(&state, &kind, cli.json).await?;
            }
            ListResource::Sessions => {
                cli::session::list_sessions(&state, cli.json).await?;
            }
            ListResource::Images { limit } => {
                cli::image::list_images(&state, limit, cli.json).await?;
            }
        },

        Commands::Show { resource } => match resource {
            ShowResource::Profile { kind, name } => {
                cli::profile::show_profile(&state, &kind, &name, cli.json).await?;
            }
            ShowResource::Session { id } => {
                cli::session::show_session(&state, &id, cli.json).await?;
            }
        },

        Commands::Save { resource } => match resource {
            SaveResource::Profile { kind, name, attrs } => {
                cli::profile::save_profile(&state, &kind, &name, &attrs, cli.json).await?;
            }
        },

        Commands::Delete { resource } => match resource {
            DeleteResource::Profile { kind, name, force } => {
                cli::profile::delete_profile(&state, &kind, &name, force, cli.json).await?;
            }
        },

        Commands::Chat {
            chatbot,
            user,
            resume,
        } => {
            cli::chat::run(&state, chatbot, user, resume).await?;
        }

        Commands::Image {
            prompt,
            negative_prompt,
            model,
            steps,
            cfg_scale,
            width,
            height,
            seed,
        } => {
            cli::image::generate(
                &state,
                prompt,
                negative_prompt,
                &model,
                steps,
                cfg_scale,
                width,
                height,
                seed,
                cli.json,
            )
            .await?;
        }

        Commands::Serve { port, host } => {
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            println!(
                "  {} Kindred API listening on {}",
                console::style("⚡").bold(),
                console::style(format!("http://{addr}")).cyan()
            );
            println!("  {}", console::style("Press Ctrl+C to stop").dim());

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            println!("\n  Server stopped.");
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
