use anyhow::{bail, Context};
use glam::{Affine3A, Vec3};
use raydesk_input::{FrameInput, HandFrame, InputSource, InputState};
use raydesk_testkit::{aim, sky};
use serde::Deserialize;
use std::{fs, path::Path};

#[derive(Debug, Deserialize)]
struct ScriptedInputFile {
    #[serde(default)]
    name: Option<String>,
    steps: Vec<ScriptedStep>,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct ScriptedStep {
    /// Seconds this step is held for.
    duration: f32,
    #[serde(default)]
    hmd: ScriptedHead,
    #[serde(default)]
    left: ScriptedHand,
    #[serde(default)]
    right: ScriptedHand,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct ScriptedHead {
    position: [f32; 3],
}

impl Default for ScriptedHead {
    fn default() -> Self {
        Self {
            position: [0.0, 1.6, 0.0],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct ScriptedHand {
    position: [f32; 3],
    /// Point the ray passes through; `None` aims at the sky.
    target: Option<[f32; 3]>,
    /// Wrist roll in degrees around the ray.
    roll: f32,
    #[serde(flatten)]
    buttons: InputState,
}

impl Default for ScriptedHand {
    fn default() -> Self {
        Self {
            position: [0.0, 1.2, -0.2],
            target: None,
            roll: 0.0,
            buttons: InputState::default(),
        }
    }
}

impl ScriptedHand {
    fn to_frame(&self) -> HandFrame {
        let position = Vec3::from(self.position);
        let pose = match self.target {
            Some(target) => aim(position, Vec3::from(target)),
            None => sky(position),
        };
        HandFrame {
            transform: pose * Affine3A::from_rotation_z(self.roll.to_radians()),
            state: self.buttons,
        }
    }
}

impl ScriptedStep {
    fn to_frame(&self) -> FrameInput {
        FrameInput {
            hmd: Affine3A::from_translation(Vec3::from(self.hmd.position)),
            hands: [self.left.to_frame(), self.right.to_frame()],
        }
    }
}

/// Plays a JSON script of timed steps, one fixed-length frame per poll.
pub struct ScriptedInputPlayer {
    name: String,
    steps: Vec<ScriptedStep>,
    index: usize,
    frame_in_step: u64,
    frame_time: f32,
    finished: bool,
}

impl ScriptedInputPlayer {
    pub fn from_path(path: &Path, frame_time: f32) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading script {}", path.display()))?;
        let fallback = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "script".to_string());
        Self::from_json(&contents, &fallback, frame_time)
    }

    pub fn from_json(
        contents: &str,
        fallback_name: &str,
        frame_time: f32,
    ) -> anyhow::Result<Self> {
        let file: ScriptedInputFile =
            serde_json::from_str(contents).context("parsing scripted input")?;
        if file.steps.is_empty() {
            bail!("scripted input file contains no steps");
        }
        if !(frame_time.is_finite() && frame_time > 0.0) {
            bail!("frame time must be positive, got {frame_time}");
        }
        Ok(Self {
            name: file.name.unwrap_or_else(|| fallback_name.to_string()),
            steps: file.steps,
            index: 0,
            frame_in_step: 0,
            frame_time,
            finished: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// True once the last step has been held for its full duration.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Number of frames the whole script plays for.
    pub fn total_frames(&self) -> u64 {
        self.steps
            .iter()
            .map(|step| self.frames_for(step.duration))
            .sum()
    }

    fn frames_for(&self, duration: f32) -> u64 {
        ((duration / self.frame_time).round() as u64).max(1)
    }

    fn advance(&mut self) -> &ScriptedStep {
        let current = self.index;
        self.frame_in_step += 1;
        if self.frame_in_step >= self.frames_for(self.steps[current].duration) {
            self.frame_in_step = 0;
            if self.index + 1 < self.steps.len() {
                self.index += 1;
            } else {
                self.finished = true;
            }
        }
        &self.steps[current]
    }
}

impl InputSource for ScriptedInputPlayer {
    fn poll(&mut self) -> FrameInput {
        self.advance().to_frame()
    }
}
