use std::sync::Arc;

use clap::Parser;
use tracker_core::{
    group_episodes_by_status, CollectionRefreshPolicy, LaunchRequest, PollSettings, PollerPhase,
};
use tracker_engine::{
    ChannelSnapshotSink, EpisodeSource, JobApi, JobLauncher, PollingLifecycleManager,
    TrackerEvent,
};
use tracker_logging::{tracker_info, tracker_warn};

use super::cli::{Cli, Command};
use super::{config, logging, render};

pub(crate) async fn run_app() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = config::load(&cli.config)?;
    logging::initialize(
        config.log_destination,
        tracker_logging::parse_level(&config.log_level),
    );
    tracker_info!("using api at {}", config.base_url);

    let api = Arc::new(JobApi::new(config.client_settings())?);
    match cli.command {
        Command::Rebuild(args) => {
            follow_job(api, config.poll_settings(), args.into_request()).await
        }
        Command::Podcast(args) => {
            follow_job(api, config.poll_settings(), args.into_request()?).await
        }
        Command::Episodes { watch } => {
            show_episodes(&*api, config.refresh_policy(), watch).await
        }
    }
}

/// Launches `request` and prints every snapshot until polling stops.
/// Ctrl-C unmounts the view, which cancels the poller.
async fn follow_job(
    api: Arc<JobApi>,
    settings: PollSettings,
    request: LaunchRequest,
) -> anyhow::Result<()> {
    let launcher = JobLauncher::from_api(api, settings);
    let (sink, mut events) = ChannelSnapshotSink::channel();
    let mut view = PollingLifecycleManager::new();
    view.on_mount();

    let job = view.launch(&launcher, &request, Arc::new(sink)).await?;
    println!("{}", render::receipt_line(&job));

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(TrackerEvent::Snapshot(snapshot)) => {
                    println!("{}", render::snapshot_line(&snapshot));
                }
                Some(TrackerEvent::Stopped { handle, phase }) => {
                    tracker_info!("{handle}: polling stopped ({phase})");
                    return finish(phase);
                }
                None => return Ok(()),
            },
            signal = tokio::signal::ctrl_c() => {
                signal?;
                tracker_warn!("interrupted, cancelling {}", job.handle);
                view.on_unmount();
            }
        }
    }
}

fn finish(phase: PollerPhase) -> anyhow::Result<()> {
    match phase {
        PollerPhase::Failed => anyhow::bail!("job failed"),
        PollerPhase::Cancelled => {
            println!("cancelled; the job keeps running on the server");
            Ok(())
        }
        _ => Ok(()),
    }
}

async fn show_episodes(
    source: &dyn EpisodeSource,
    policy: CollectionRefreshPolicy,
    watch: bool,
) -> anyhow::Result<()> {
    loop {
        let episodes = source.list_episodes().await?;
        print!("{}", render::episode_table(&group_episodes_by_status(&episodes)));
        if !watch {
            return Ok(());
        }
        let Some(delay) = policy.next_interval(&episodes) else {
            tracker_info!("no episodes in progress, stopped refreshing");
            return Ok(());
        };
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            signal = tokio::signal::ctrl_c() => {
                signal?;
                return Ok(());
            }
        }
    }
}
