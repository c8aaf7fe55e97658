use std::collections::VecDeque;
use std::future::Future;
use std::io::Write;

use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InfoLine {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl InfoLine {
    pub fn new(key: impl Into<String>, value: impl ToString) -> Self {
        Self {
            key: key.into(),
            value: Some(value.to_string()),
        }
    }

    pub fn flag(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RenderFrame {
    pub tick: u64,
    pub grid: Vec<String>,
    pub info: Vec<InfoLine>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub debug: Vec<String>,
}

impl RenderFrame {
    pub fn info_value(&self, key: &str) -> Option<&str> {
        self.info
            .iter()
            .find(|line| line.key == key)
            .and_then(|line| line.value.as_deref())
    }

    pub fn has_info(&self, key: &str) -> bool {
        self.info.iter().any(|line| line.key == key)
    }
}

pub trait Renderer {
    fn init(&mut self) {}

    fn render(&mut self, frame: &RenderFrame);

    /// Asked after game over; `true` restarts the run.
    fn stop_render(&mut self) -> impl Future<Output = bool> + Send;

    fn destroy(&mut self) {}
}

/// Writes every frame as one JSON line.
pub struct JsonLinesRenderer<W: Write> {
    out: W,
    restarts_left: u32,
}

impl<W: Write> JsonLinesRenderer<W> {
    pub fn new(out: W, restarts: u32) -> Self {
        Self {
            out,
            restarts_left: restarts,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for JsonLinesRenderer<W> {
    fn render(&mut self, frame: &RenderFrame) {
        let line = match serde_json::to_string(frame) {
            Ok(line) => line,
            Err(error) => {
                tracing::warn!(%error, "failed to encode frame");
                return;
            }
        };
        if let Err(error) = writeln!(self.out, "{line}") {
            tracing::warn!(%error, tick = frame.tick, "failed to write frame");
        }
    }

    fn stop_render(&mut self) -> impl Future<Output = bool> + Send {
        let restart = self.restarts_left > 0;
        self.restarts_left = self.restarts_left.saturating_sub(1);
        async move { restart }
    }

    fn destroy(&mut self) {
        if let Err(error) = self.out.flush() {
            tracing::warn!(%error, "failed to flush frames");
        }
    }
}

/// Keeps frames in memory.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub frames: Vec<RenderFrame>,
    pub stop_prompts: u32,
    pub initialized: bool,
    pub destroyed: bool,
    answers: VecDeque<bool>,
}

impl RecordingRenderer {
    /// Scripted answers to the restart prompt; exhausted answers mean stop.
    pub fn with_answers(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn last_frame(&self) -> Option<&RenderFrame> {
        self.frames.last()
    }
}

impl Renderer for RecordingRenderer {
    fn init(&mut self) {
        self.initialized = true;
    }

    fn render(&mut self, frame: &RenderFrame) {
        self.frames.push(frame.clone());
    }

    fn stop_render(&mut self) -> impl Future<Output = bool> + Send {
        self.stop_prompts += 1;
        let restart = self.answers.pop_front().unwrap_or(false);
        async move { restart }
    }

    fn destroy(&mut self) {
        self.destroyed = true;
    }
}
