//! Trainer wiring: landmark stream → counting service → voice cues and journal

use crate::config::TrainerConfig;
use crate::counting_service::{start_counting_service, CountingCommand, CountingHandles, CountingStats};
use crate::notifier::{LogSpeech, NotifierStats, VoiceNotifier};
use crate::set_journal::SetJournal;
use fit_core::{FitError, FitResult};
use fit_processing::SessionSnapshot;
use fit_simulation::{RealTimeLandmarkStream, StreamCommand};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::time::{interval, sleep, timeout, Duration};
use tracing::{debug, info, warn};

/// Outcome of a trainer run
#[derive(Debug, Clone)]
pub struct WorkoutSummary {
    pub session: Option<SessionSnapshot>,
    pub frames_processed: u64,
    pub frames_without_person: u64,
    pub cues: NotifierStats,
    pub sets_journaled: u32,
}

impl WorkoutSummary {
    /// Human-readable report printed at exit
    pub fn report(&self) -> String {
        let mut lines = Vec::new();
        match &self.session {
            Some(s) => {
                lines.push(format!("Exercise: {}", s.exercise));
                lines.push(format!("Repetitions: {}", s.total_reps));
                lines.push(format!(
                    "Sets completed: {}/{}",
                    s.current_set.saturating_sub(1),
                    s.target_sets
                ));
                if s.workout_complete {
                    lines.push("Workout complete".to_string());
                }
            }
            None => lines.push("No frames were counted".to_string()),
        }
        lines.push(format!(
            "Frames: {} ({} without a person)",
            self.frames_processed, self.frames_without_person
        ));
        lines.push(format!(
            "Voice cues: {} spoken, {} throttled",
            self.cues.spoken, self.cues.throttled
        ));
        if self.sets_journaled > 0 {
            lines.push(format!("Sets journaled: {}", self.sets_journaled));
        }
        lines.join("\n")
    }
}

/// Trainer application
pub struct TrainerApp {
    config: TrainerConfig,
}

impl TrainerApp {
    pub fn new(config: TrainerConfig) -> FitResult<Self> {
        config.validate()?;
        Ok(TrainerApp { config })
    }

    /// Run until the stream ends, the workout completes or Ctrl-C
    pub async fn run(self) -> anyhow::Result<WorkoutSummary> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Ctrl-C handler unavailable");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Run until the stream ends, the workout completes or `shutdown` resolves
    pub async fn run_until<F>(self, shutdown: F) -> anyhow::Result<WorkoutSummary>
    where
        F: Future<Output = ()>,
    {
        let config = self.config;

        let mut stream = RealTimeLandmarkStream::new(config.stream.clone())?;
        let frames = stream.subscribe();
        let stream_control = stream.control_handle();

        let CountingHandles {
            events,
            commands,
            stats,
            task: counting_task,
        } = start_counting_service(frames, config.session.clone())?;

        let notifier = VoiceNotifier::new(LogSpeech, config.voice.clone());
        let notifier_task = tokio::spawn(notifier.run(events.resubscribe()));

        let journal_task = config.journal.clone().map(|path| {
            info!(path = %path.display(), "Journaling completed sets");
            tokio::spawn(SetJournal::new(path).run(events.resubscribe()))
        });
        drop(events);

        let mut stream_task = tokio::spawn(async move { stream.run().await });

        commands
            .send(CountingCommand::Start)
            .await
            .map_err(|_| FitError::ChannelClosed { channel: "counting commands" })?;
        wait_until_running(&stats, Duration::from_secs(5)).await?;
        send_stream(&stream_control, StreamCommand::Start).await?;

        info!(
            exercise = %config.session.exercise,
            target_reps = config.session.target_reps,
            target_sets = config.session.target_sets,
            "Trainer running"
        );

        let mut status = interval(Duration::from_millis(config.status_interval_ms));
        tokio::pin!(shutdown);
        let mut stopping = false;

        loop {
            tokio::select! {
                result = &mut stream_task => {
                    match result {
                        Ok(Ok(())) => info!("Landmark stream finished"),
                        Ok(Err(e)) => warn!(error = %e, "Landmark stream failed"),
                        Err(e) => warn!(error = %e, "Landmark stream task aborted"),
                    }
                    break;
                }

                _ = &mut shutdown, if !stopping => {
                    info!("Shutdown requested");
                    stopping = true;
                    request_shutdown(&stream_control).await;
                }

                _ = status.tick() => {
                    let snapshot = stats.lock().await.session.clone();
                    if let Some(snapshot) = snapshot {
                        info!("{}", snapshot.hud_line());
                        if snapshot.workout_complete && !stopping {
                            stopping = true;
                            request_shutdown(&stream_control).await;
                        }
                    }
                }
            }
        }

        // Closing the frame stream winds down every downstream task
        counting_task.await?;
        let cues = notifier_task.await?;
        let sets_journaled = match journal_task {
            Some(task) => task.await?,
            None => 0,
        };

        let final_stats: CountingStats = stats.lock().await.clone();
        Ok(WorkoutSummary {
            session: final_stats.session,
            frames_processed: final_stats.frames_processed,
            frames_without_person: final_stats.frames_without_person,
            cues,
            sets_journaled,
        })
    }
}

async fn send_stream(control: &mpsc::Sender<StreamCommand>, command: StreamCommand) -> FitResult<()> {
    control
        .send(command)
        .await
        .map_err(|_| FitError::ChannelClosed { channel: "stream commands" })
}

/// The stream may already have ended on its own
async fn request_shutdown(control: &mpsc::Sender<StreamCommand>) {
    if send_stream(control, StreamCommand::Shutdown).await.is_err() {
        debug!("Landmark stream already finished");
    }
}

async fn wait_until_running(stats: &Arc<Mutex<CountingStats>>, limit: Duration) -> FitResult<()> {
    timeout(limit, async {
        while !stats.lock().await.is_running {
            sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .map_err(|_| FitError::Timeout { operation: "counting service start" })
}
