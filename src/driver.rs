use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::WorldConfig;
use crate::input::InputState;
use crate::render::Renderer;
use crate::session::GameSession;

/// Shared stop flag; cloning hands out another handle to the same flag.
#[derive(Clone, Debug, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DriverOutcome {
    pub steps: u64,
    pub restarts: u32,
    pub game_over: bool,
}

pub struct GameDriver<R, I> {
    config: WorldConfig,
    session: GameSession,
    renderer: R,
    input: I,
    stop: StopHandle,
    max_steps: Option<u64>,
    interval: Duration,
}

impl<R: Renderer, I: InputState> GameDriver<R, I> {
    pub fn new(config: WorldConfig, renderer: R, input: I) -> Self {
        let interval = Duration::from_millis(config.tick_interval_ms());
        Self {
            session: GameSession::new(config.clone()),
            config,
            renderer,
            input,
            stop: StopHandle::default(),
            max_steps: None,
            interval,
        }
    }

    /// Caps the run at `steps` session steps across restarts.
    pub fn with_max_steps(mut self, steps: u64) -> Self {
        self.max_steps = Some(steps);
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn into_parts(self) -> (GameSession, R, I) {
        (self.session, self.renderer, self.input)
    }

    pub async fn run(&mut self) -> DriverOutcome {
        let mut outcome = DriverOutcome::default();
        self.renderer.init();

        loop {
            if self.stop.is_stopped() {
                break;
            }
            if self.max_steps.is_some_and(|max| outcome.steps >= max) {
                break;
            }

            self.input.prepare(&self.session);
            let frame = self.session.step(&mut self.input);
            self.renderer.render(&frame);
            outcome.steps += 1;

            if self.session.is_game_over() {
                if !self.renderer.stop_render().await {
                    outcome.game_over = true;
                    break;
                }
                self.restart();
                outcome.restarts += 1;
            }

            tokio::time::sleep(self.interval).await;
        }

        self.renderer.destroy();
        outcome
    }

    fn restart(&mut self) {
        self.input.clear();
        self.session = GameSession::new(self.config.clone());
        info!(seed = self.session.world().seed(), "session restarted");
    }
}
