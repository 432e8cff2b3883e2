use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracker_core::{LaunchRequest, PodcastGenerationRequest, RebuildMode, RebuildRequest};

use super::config::DEFAULT_CONFIG_FILE;

#[derive(Debug, Parser)]
#[command(author, version, about = "Launch and follow long-running notebook jobs", long_about = None)]
pub(crate) struct Cli {
    /// Configuration file (RON)
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Rebuild embeddings and follow progress until the job finishes
    Rebuild(RebuildArgs),
    /// Generate a podcast episode and follow the job
    Podcast(PodcastArgs),
    /// List podcast episodes grouped by status
    Episodes {
        /// Keep refreshing while any episode is still in progress
        #[arg(long)]
        watch: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ModeArg {
    Existing,
    All,
}

impl From<ModeArg> for RebuildMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Existing => RebuildMode::Existing,
            ModeArg::All => RebuildMode::All,
        }
    }
}

#[derive(Debug, Args)]
pub(crate) struct RebuildArgs {
    /// Which items to re-embed
    #[arg(long, value_enum, default_value_t = ModeArg::Existing)]
    pub mode: ModeArg,
    #[arg(long)]
    pub no_sources: bool,
    #[arg(long)]
    pub no_notes: bool,
    #[arg(long)]
    pub no_insights: bool,
}

impl RebuildArgs {
    pub fn into_request(self) -> LaunchRequest {
        LaunchRequest::Rebuild(RebuildRequest {
            mode: self.mode.into(),
            include_sources: !self.no_sources,
            include_notes: !self.no_notes,
            include_insights: !self.no_insights,
        })
    }
}

#[derive(Debug, Args)]
pub(crate) struct PodcastArgs {
    #[arg(long)]
    pub episode_profile: String,
    #[arg(long)]
    pub speaker_profile: String,
    /// Episode name
    #[arg(long)]
    pub name: String,
    /// Content to talk about
    #[arg(long, conflicts_with = "content_file")]
    pub content: Option<String>,
    /// Read the content from a file instead
    #[arg(long)]
    pub content_file: Option<PathBuf>,
    #[arg(long)]
    pub notebook: Option<String>,
    #[arg(long)]
    pub briefing_suffix: Option<String>,
}

impl PodcastArgs {
    pub fn into_request(self) -> anyhow::Result<LaunchRequest> {
        let content = match (self.content, self.content_file) {
            (Some(text), _) => text,
            (None, Some(path)) => fs::read_to_string(&path)
                .with_context(|| format!("failed to read content from {path:?}"))?,
            (None, None) => String::new(),
        };
        Ok(LaunchRequest::Podcast(PodcastGenerationRequest {
            episode_profile: self.episode_profile,
            speaker_profile: self.speaker_profile,
            episode_name: self.name,
            content,
            notebook_id: self.notebook,
            briefing_suffix: self.briefing_suffix,
        }))
    }
}
