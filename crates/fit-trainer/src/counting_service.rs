//! Counting service: runs a workout session against a live frame stream

use fit_core::{FitResult, LandmarkFrame};
use fit_processing::{Exercise, SessionConfig, SessionEvent, SessionSnapshot, WorkoutSession};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Commands for controlling counting
#[derive(Debug, Clone)]
pub enum CountingCommand {
    Start,
    /// Stop and discard the session; the next `Start` counts from zero
    Stop,
    Pause,
    Resume,
    /// Begin a fresh session without changing the running state
    ResetSession,
    UpdateConfig(SessionConfig),
}

/// Statistics about counting progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountingStats {
    pub is_running: bool,
    pub exercise: Exercise,
    pub frames_processed: u64,
    pub frames_without_person: u64,
    pub events_published: u64,
    pub average_latency_us: u64,
    pub last_update: u64,
    /// State of the session after the last processed frame
    pub session: Option<SessionSnapshot>,
}

impl CountingStats {
    fn new(exercise: Exercise) -> Self {
        CountingStats {
            is_running: false,
            exercise,
            frames_processed: 0,
            frames_without_person: 0,
            events_published: 0,
            average_latency_us: 0,
            last_update: fit_core::now_millis(),
            session: None,
        }
    }
}

/// Real-time repetition counting service
pub struct CountingService {
    session: WorkoutSession,

    // Communication channels
    input_receiver: broadcast::Receiver<LandmarkFrame>,
    output_sender: broadcast::Sender<SessionEvent>,
    command_receiver: mpsc::Receiver<CountingCommand>,
    command_sender: mpsc::Sender<CountingCommand>,

    // State management
    is_running: Arc<Mutex<bool>>,
    stats: Arc<Mutex<CountingStats>>,

    total_processing_time: u64,
}

impl CountingService {
    /// Create new counting service
    pub fn new(
        input_receiver: broadcast::Receiver<LandmarkFrame>,
        config: SessionConfig,
    ) -> FitResult<Self> {
        let session = WorkoutSession::new(config)?;
        let (output_sender, _) = broadcast::channel(256);
        let (command_sender, command_receiver) = mpsc::channel(32);
        let stats = CountingStats::new(session.config().exercise);

        Ok(CountingService {
            session,
            input_receiver,
            output_sender,
            command_receiver,
            command_sender,
            is_running: Arc::new(Mutex::new(false)),
            stats: Arc::new(Mutex::new(stats)),
            total_processing_time: 0,
        })
    }

    /// Get output receiver for session events
    pub fn subscribe_output(&self) -> broadcast::Receiver<SessionEvent> {
        self.output_sender.subscribe()
    }

    /// Get command sender for controlling counting
    pub fn command_handle(&self) -> mpsc::Sender<CountingCommand> {
        self.command_sender.clone()
    }

    /// Shared statistics handle
    pub fn stats_handle(&self) -> Arc<Mutex<CountingStats>> {
        self.stats.clone()
    }

    /// Main counting loop; ends when the frame stream closes
    pub async fn run(&mut self) -> FitResult<()> {
        info!(exercise = %self.session.config().exercise, "Counting service ready");

        loop {
            tokio::select! {
                frame_result = self.input_receiver.recv() => {
                    match frame_result {
                        Ok(frame) => {
                            if *self.is_running.lock().await {
                                self.process_frame(frame).await;
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(skipped, "Counting lagged behind the frame stream");
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            info!("Frame stream closed, stopping counting service");
                            break;
                        }
                    }
                }

                command = self.command_receiver.recv() => {
                    match command {
                        Some(CountingCommand::Start) => {
                            self.set_running(true).await;
                            info!("Counting started");
                        }
                        Some(CountingCommand::Stop) => {
                            self.set_running(false).await;
                            self.replace_session(self.session.config().clone()).await?;
                            info!("Counting stopped");
                        }
                        Some(CountingCommand::Pause) => {
                            self.set_running(false).await;
                            info!("Counting paused");
                        }
                        Some(CountingCommand::Resume) => {
                            self.set_running(true).await;
                            info!("Counting resumed");
                        }
                        Some(CountingCommand::ResetSession) => {
                            self.replace_session(self.session.config().clone()).await?;
                            info!("Session reset");
                        }
                        Some(CountingCommand::UpdateConfig(config)) => {
                            // A rejected configuration leaves the current session in place
                            if let Err(e) = self.replace_session(config).await {
                                warn!(error = %e, "Failed to update session configuration");
                            }
                        }
                        None => {
                            debug!("Counting command channel closed");
                            break;
                        }
                    }
                }
            }
        }

        self.set_running(false).await;
        Ok(())
    }

    async fn process_frame(&mut self, frame: LandmarkFrame) {
        let start_time = std::time::Instant::now();
        let events = self.session.process_frame(&frame);
        let processing_time = start_time.elapsed().as_micros() as u64;

        self.total_processing_time += processing_time;

        let published = events.len() as u64;

        for event in events {
            if let SessionEvent::Repetition { event: rep, reps_in_set, .. } = &event {
                info!(repetition = rep.repetition, reps_in_set, "Repetition");
            }
            // No subscribers is not an error
            let _ = self.output_sender.send(event);
        }

        let snapshot = self.session.snapshot();
        let total_time = self.total_processing_time;
        self.update_stats(|stats| {
            stats.frames_processed += 1;
            stats.frames_without_person = snapshot.frames_without_person;
            stats.events_published += published;
            stats.average_latency_us = total_time / stats.frames_processed;
            stats.last_update = fit_core::now_millis();
            stats.session = Some(snapshot);
        })
        .await;
    }

    async fn replace_session(&mut self, config: SessionConfig) -> FitResult<()> {
        let session = WorkoutSession::new(config)?;
        let exercise = session.config().exercise;
        self.session = session;
        self.total_processing_time = 0;

        self.update_stats(|stats| {
            let is_running = stats.is_running;
            *stats = CountingStats::new(exercise);
            stats.is_running = is_running;
        })
        .await;
        Ok(())
    }

    async fn set_running(&self, running: bool) {
        *self.is_running.lock().await = running;
        self.update_stats(|stats| stats.is_running = running).await;
    }

    /// Update stats with a closure
    async fn update_stats<F>(&self, update_fn: F)
    where
        F: FnOnce(&mut CountingStats),
    {
        let mut stats = self.stats.lock().await;
        update_fn(&mut stats);
    }
}

/// Handles to a counting service running in the background
pub struct CountingHandles {
    pub events: broadcast::Receiver<SessionEvent>,
    pub commands: mpsc::Sender<CountingCommand>,
    pub stats: Arc<Mutex<CountingStats>>,
    pub task: JoinHandle<()>,
}

/// Helper function to start the counting service in background
pub fn start_counting_service(
    input_receiver: broadcast::Receiver<LandmarkFrame>,
    config: SessionConfig,
) -> FitResult<CountingHandles> {
    let mut service = CountingService::new(input_receiver, config)?;

    let events = service.subscribe_output();
    let commands = service.command_handle();
    let stats = service.stats_handle();

    let task = tokio::spawn(async move {
        if let Err(e) = service.run().await {
            tracing::error!(error = %e, "Counting service error");
        }
    });

    Ok(CountingHandles {
        events,
        commands,
        stats,
        task,
    })
}
