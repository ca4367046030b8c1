//! Real-time landmark streaming, paced at the simulated camera frame rate

use crate::landmark_simulator::{LandmarkSimulator, SimulationConfig};
use crate::motion_patterns::MotionPattern;
use fit_core::{FitResult, LandmarkFrame};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{interval, Duration, Instant};
use tracing::{debug, info, warn};

/// Configuration for real-time streaming
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Landmark simulation configuration
    pub simulation: SimulationConfig,
    /// Frames kept for slow subscribers before they lag; fixed once the
    /// stream is created
    pub buffer_size: usize,
    /// End the stream after this many frames
    pub max_frames: Option<u64>,
    /// Begin emitting without waiting for a `Start` command
    pub autostart: bool,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            buffer_size: 64,
            max_frames: None,
            autostart: false,
        }
    }
}

/// Commands for controlling the stream
#[derive(Debug, Clone)]
pub enum StreamCommand {
    Start,
    Stop,
    Pause,
    Resume,
    UpdateConfig(StreamConfig),
    UpdatePattern(MotionPattern),
    /// End the run loop and close the frame channel
    Shutdown,
}

/// Stream statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamStats {
    pub is_running: bool,
    pub frames_generated: u64,
    pub empty_frames: u64,
    pub total_duration: f64,
    pub average_frame_time: f64,
    pub last_update: u64,
}

/// Real-time landmark frame stream
pub struct RealTimeLandmarkStream {
    config: StreamConfig,
    simulator: Arc<Mutex<LandmarkSimulator>>,
    data_sender: broadcast::Sender<LandmarkFrame>,
    control_receiver: mpsc::Receiver<StreamCommand>,
    control_sender: mpsc::Sender<StreamCommand>,
    is_running: Arc<Mutex<bool>>,
    stats: Arc<Mutex<StreamStats>>,
    current_frame: Arc<Mutex<Option<LandmarkFrame>>>,
}

impl RealTimeLandmarkStream {
    /// Create new real-time landmark stream
    pub fn new(config: StreamConfig) -> FitResult<Self> {
        let simulator = LandmarkSimulator::new(config.simulation.clone())?;
        let (data_sender, _) = broadcast::channel(config.buffer_size.max(1));
        let (control_sender, control_receiver) = mpsc::channel(32);

        Ok(RealTimeLandmarkStream {
            is_running: Arc::new(Mutex::new(config.autostart)),
            config,
            simulator: Arc::new(Mutex::new(simulator)),
            data_sender,
            control_receiver,
            control_sender,
            stats: Arc::new(Mutex::new(StreamStats::default())),
            current_frame: Arc::new(Mutex::new(None)),
        })
    }

    /// Get a receiver for frame updates
    pub fn subscribe(&self) -> broadcast::Receiver<LandmarkFrame> {
        self.data_sender.subscribe()
    }

    /// Get control sender for sending commands
    pub fn control_handle(&self) -> mpsc::Sender<StreamCommand> {
        self.control_sender.clone()
    }

    fn frame_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.config.simulation.frame_rate)
    }

    /// Run the streaming loop until the frame limit is reached or a
    /// `Shutdown` command arrives
    pub async fn run(&mut self) -> FitResult<()> {
        let mut frame_timer = interval(self.frame_period());

        info!(
            frame_rate = self.config.simulation.frame_rate,
            pattern = self.config.simulation.pattern.description(),
            "Landmark stream ready"
        );

        loop {
            tokio::select! {
                _ = frame_timer.tick() => {
                    if !*self.is_running.lock().await {
                        continue;
                    }

                    let start_time = Instant::now();
                    let frame = {
                        let mut sim = self.simulator.lock().await;
                        sim.next_frame()?
                    };
                    let generation_time = start_time.elapsed();

                    let frames_generated = {
                        let mut stats = self.stats.lock().await;
                        stats.frames_generated += 1;
                        if frame.is_empty() {
                            stats.empty_frames += 1;
                        }
                        stats.total_duration += 1.0 / self.config.simulation.frame_rate;
                        stats.average_frame_time = generation_time.as_secs_f64();
                        stats.last_update = fit_core::now_millis();
                        stats.frames_generated
                    };

                    *self.current_frame.lock().await = Some(frame.clone());

                    // No subscribers is not an error
                    let _ = self.data_sender.send(frame);

                    if generation_time > self.frame_period() {
                        warn!(
                            elapsed_ms = generation_time.as_secs_f64() * 1000.0,
                            "Frame generation slower than the frame period"
                        );
                    }

                    if self.config.max_frames.is_some_and(|max| frames_generated >= max) {
                        info!(frames = frames_generated, "Landmark stream reached its frame limit");
                        break;
                    }
                }

                command = self.control_receiver.recv() => {
                    match command {
                        Some(StreamCommand::Start) => {
                            self.set_running(true).await;
                            info!("Landmark stream started");
                        }
                        Some(StreamCommand::Stop) => {
                            self.set_running(false).await;
                            {
                                let mut stats = self.stats.lock().await;
                                stats.frames_generated = 0;
                                stats.empty_frames = 0;
                                stats.total_duration = 0.0;
                            }
                            self.simulator.lock().await.reset_time();
                            info!("Landmark stream stopped");
                        }
                        Some(StreamCommand::Pause) => {
                            self.set_running(false).await;
                            info!("Landmark stream paused");
                        }
                        Some(StreamCommand::Resume) => {
                            self.set_running(true).await;
                            info!("Landmark stream resumed");
                        }
                        Some(StreamCommand::UpdateConfig(mut new_config)) => {
                            let updated = self
                                .simulator
                                .lock()
                                .await
                                .update_config(new_config.simulation.clone());
                            // A rejected configuration leaves the running stream untouched
                            if let Err(e) = updated {
                                warn!(error = %e, "Failed to update stream configuration");
                                continue;
                            }

                            // The broadcast channel is sized once at construction
                            if new_config.buffer_size != self.config.buffer_size {
                                warn!(
                                    requested = new_config.buffer_size,
                                    kept = self.config.buffer_size,
                                    "Buffer size cannot change on a running stream"
                                );
                                new_config.buffer_size = self.config.buffer_size;
                            }

                            self.config = new_config;
                            frame_timer = interval(self.frame_period());
                            info!("Landmark stream configuration updated");
                        }
                        Some(StreamCommand::UpdatePattern(pattern)) => {
                            self.simulator.lock().await.set_pattern(pattern);
                            self.config.simulation.pattern = pattern;
                            info!(pattern = pattern.description(), "Landmark stream pattern updated");
                        }
                        Some(StreamCommand::Shutdown) => {
                            info!("Landmark stream shutting down");
                            break;
                        }
                        None => {
                            debug!("Landmark stream control channel closed");
                            break;
                        }
                    }
                }
            }
        }

        self.set_running(false).await;
        Ok(())
    }

    async fn set_running(&self, running: bool) {
        *self.is_running.lock().await = running;
        self.stats.lock().await.is_running = running;
    }

    /// Get current stream statistics
    pub async fn stats(&self) -> StreamStats {
        self.stats.lock().await.clone()
    }

    /// Get the most recent frame
    pub async fn current_frame(&self) -> Option<LandmarkFrame> {
        self.current_frame.lock().await.clone()
    }

    pub async fn is_running(&self) -> bool {
        *self.is_running.lock().await
    }

    /// Get current configuration
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }
}

/// Helper function to create and start a stream in the background
pub fn start_landmark_stream(
    config: StreamConfig,
) -> FitResult<(broadcast::Receiver<LandmarkFrame>, mpsc::Sender<StreamCommand>)> {
    let mut stream = RealTimeLandmarkStream::new(config)?;
    let data_receiver = stream.subscribe();
    let control_sender = stream.control_handle();

    tokio::spawn(async move {
        if let Err(e) = stream.run().await {
            tracing::error!(error = %e, "Landmark stream error");
        }
    });

    Ok((data_receiver, control_sender))
}
