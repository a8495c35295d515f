//! CLI command definitions and dispatch for the `kindred` binary.
//!
//! Uses clap derive macros for argument parsing. The CLI follows a verb-noun
//! pattern (e.g., `kindred save profile`, `kindred list sessions`).

pub mod chat;
pub mod image;
pub mod profile;
pub mod session;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Your local AI companion backend.
#[derive(Parser)]
#[command(name = "kindred", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List resources.
    #[command(alias = "ls")]
    List {
        #[command(subcommand)]
        resource: ListResource,
    },

    /// Show details of a resource.
    Show {
        #[command(subcommand)]
        resource: ShowResource,
    },

    /// Save (create or update) a resource.
    Save {
        #[command(subcommand)]
        resource: SaveResource,
    },

    /// Delete a resource.
    #[command(alias = "rm")]
    Delete {
        #[command(subcommand)]
        resource: DeleteResource,
    },

    /// Start an interactive chat session.
    Chat {
        /// Chatbot profile name to load (defaults to 'Default').
        #[arg(long)]
        chatbot: Option<String>,

        /// User profile name to load (defaults to 'Guest').
        #[arg(long)]
        user: Option<String>,

        /// Resume a saved session by ID.
        #[arg(long)]
        resume: Option<String>,
    },

    /// Generate a single image.
    Image {
        /// The prompt to render.
        prompt: String,

        /// Things the image should not contain.
        #[arg(long, default_value = "")]
        negative_prompt: String,

        /// Diffusion model (stable_diffusion, waifu_diffusion).
        #[arg(long, default_value = "stable_diffusion")]
        model: String,

        /// Sampling steps (1-100).
        #[arg(long, default_value = "30")]
        steps: u16,

        /// Classifier-free guidance scale.
        #[arg(long, default_value = "7.5")]
        cfg_scale: f32,

        /// Image width in pixels.
        #[arg(long, default_value = "512")]
        width: u32,

        /// Image height in pixels.
        #[arg(long, default_value = "512")]
        height: u32,

        /// Fixed seed for reproducibility.
        #[arg(long)]
        seed: Option<i64>,
    },

    /// Start the REST API server.
    Serve {
        /// Port to listen on.
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ListResource {
    /// List stored profiles of a kind.
    Profiles {
        /// Profile kind (chatbot, user).
        kind: String,
    },

    /// List saved chat sessions.
    Sessions,

    /// List recently generated images.
    Images {
        /// Maximum number of rows.
        #[arg(long, default_value = "20")]
        limit: i64,
    },
}

#[derive(Subcommand)]
pub enum ShowResource {
    /// Show a profile's attributes.
    Profile {
        /// Profile kind (chatbot, user).
        kind: String,

        /// Profile name.
        name: String,
    },

    /// Show a saved session including its transcript.
    Session {
        /// Session ID.
        id: String,
    },
}

#[derive(Subcommand)]
pub enum SaveResource {
    /// Create or update a profile.
    Profile {
        /// Profile kind (chatbot, user).
        kind: String,

        /// Profile name (unique within the kind).
        name: String,

        /// Attribute as key=value; repeatable. Values parse as bool,
        /// integer, float, JSON array/object, or plain text.
        #[arg(long = "attr", value_name = "KEY=VALUE")]
        attrs: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum DeleteResource {
    /// Delete a profile permanently.
    Profile {
        /// Profile kind (chatbot, user).
        kind: String,

        /// Profile name.
        name: String,

        /// Skip confirmation prompt.
        #[arg(long)]
        force: bool,
    },
}
