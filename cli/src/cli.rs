use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cms")]
#[command(about = "Query a headless content API and forward newsletter signups", long_about = None)]
pub struct Cli {
    /// TOML config file; CMS_API_BASE, CMS_ASSETS_BASE and CMS_API_TOKEN override it
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch a path from the content API and print the JSON body
    Get {
        /// Path below the API base (e.g. /articles) or an absolute URL
        path: String,

        /// Query parameters as a JSON object, e.g. '{"populate":["cover"]}'
        #[arg(short, long)]
        params: Option<String>,
    },
    /// Resolve a media field value into image URLs
    Media {
        /// Media field as JSON, in any of the supported shapes
        field: String,

        /// Print every URL instead of the first image binding
        #[arg(long)]
        all: bool,
    },
    /// Build the cover-first gallery of an entry
    Gallery {
        /// Entry as JSON
        entry: String,

        #[arg(long, default_value = "cover")]
        cover_key: String,

        #[arg(long, default_value = "images")]
        gallery_key: String,

        #[arg(short, long, default_value_t = 6)]
        limit: usize,
    },
    /// Subscribe an email address to the newsletter
    Subscribe {
        email: String,

        /// Where the signup came from
        #[arg(short, long)]
        source: Option<String>,

        /// Record the signup without marketing consent
        #[arg(long)]
        no_consent: bool,
    },
}
