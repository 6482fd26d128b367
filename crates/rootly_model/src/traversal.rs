//! Resumable grant traversal state.
//!
//! A `TraversalStack` records how far grant resolution for one resource has
//! progressed. It is exchanged with the host as an opaque page token, so the
//! token is the only state that survives between calls.
//!
//! ## Token format
//!
//! A non-empty stack is encoded as a JSON array of frames, bottom first.
//! The empty stack is encoded as the empty string, which the host reads as
//! "start" on input and "done" on output.

use crate::error::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};

/// The traversal level a frame belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// A schedule and its rotation pages.
    Schedule,
    /// A single rotation's member list.
    ScheduleRotation,
}

/// One unit of suspended traversal progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Frame {
    /// Progress through a schedule.
    Schedule {
        /// Schedule id.
        schedule_id: String,
        /// Upstream cursor of the next rotation page; empty for the first page.
        rotation_cursor: String,
        /// Whether owner and on-call grants were already emitted.
        owners_resolved: bool,
    },
    /// A rotation whose members have not been emitted yet.
    ScheduleRotation {
        /// Id of the schedule the rotation belongs to.
        schedule_id: String,
        /// Rotation id.
        rotation_id: String,
    },
}

impl Frame {
    /// Creates the frame for a schedule that has not been visited yet.
    pub fn schedule(schedule_id: impl Into<String>) -> Self {
        Frame::Schedule {
            schedule_id: schedule_id.into(),
            rotation_cursor: String::new(),
            owners_resolved: false,
        }
    }

    /// Creates the frame resuming a schedule at the given rotation cursor.
    pub fn schedule_continuation(
        schedule_id: impl Into<String>,
        rotation_cursor: impl Into<String>,
    ) -> Self {
        Frame::Schedule {
            schedule_id: schedule_id.into(),
            rotation_cursor: rotation_cursor.into(),
            owners_resolved: true,
        }
    }

    /// Creates the frame for one of a schedule's rotations.
    pub fn rotation(schedule_id: impl Into<String>, rotation_id: impl Into<String>) -> Self {
        Frame::ScheduleRotation {
            schedule_id: schedule_id.into(),
            rotation_id: rotation_id.into(),
        }
    }

    /// Returns the frame's traversal level.
    pub fn kind(&self) -> FrameKind {
        match self {
            Frame::Schedule { .. } => FrameKind::Schedule,
            Frame::ScheduleRotation { .. } => FrameKind::ScheduleRotation,
        }
    }

    /// Returns the id of the schedule or rotation the frame concerns.
    pub fn resource_id(&self) -> &str {
        match self {
            Frame::Schedule { schedule_id, .. } => schedule_id,
            Frame::ScheduleRotation { rotation_id, .. } => rotation_id,
        }
    }

    /// Returns the id of the schedule whose grants the frame resolves.
    pub fn schedule_id(&self) -> &str {
        match self {
            Frame::Schedule { schedule_id, .. } | Frame::ScheduleRotation { schedule_id, .. } => {
                schedule_id
            }
        }
    }
}

/// An ordered, last-in-first-out sequence of frames.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraversalStack {
    frames: Vec<Frame>,
}

impl TraversalStack {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a stack holding a single frame.
    pub fn seeded(frame: Frame) -> Self {
        Self {
            frames: vec![frame],
        }
    }

    /// Decodes a page token.
    ///
    /// The empty token decodes to the empty stack.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::MalformedToken` if the token is not a non-empty
    /// sequence of frames with non-empty ids, all belonging to one schedule
    /// and holding at most one schedule frame.
    pub fn decode(token: &str) -> ModelResult<Self> {
        if token.is_empty() {
            return Ok(Self::new());
        }

        let frames: Vec<Frame> =
            serde_json::from_str(token).map_err(|e| ModelError::malformed(e.to_string()))?;

        if frames.is_empty() {
            return Err(ModelError::malformed("empty frame sequence"));
        }

        let owner = frames[0].schedule_id();
        let mut schedule_frames = 0;
        for frame in &frames {
            if frame.resource_id().is_empty() || frame.schedule_id().is_empty() {
                return Err(ModelError::malformed("frame with empty id"));
            }
            if frame.schedule_id() != owner {
                return Err(ModelError::malformed(format!(
                    "frames span schedules {owner} and {}",
                    frame.schedule_id()
                )));
            }
            if frame.kind() == FrameKind::Schedule {
                schedule_frames += 1;
                if schedule_frames > 1 {
                    return Err(ModelError::malformed(format!(
                        "schedule {owner} appears more than once"
                    )));
                }
            }
        }

        Ok(Self { frames })
    }

    /// Encodes the stack as a page token.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::Encode` if serialization fails.
    pub fn encode(&self) -> ModelResult<String> {
        if self.frames.is_empty() {
            return Ok(String::new());
        }
        serde_json::to_string(&self.frames).map_err(|e| ModelError::Encode(e.to_string()))
    }

    /// Returns the top frame.
    pub fn peek(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// Removes and returns the top frame.
    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    /// Pushes a frame on top.
    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    /// Returns the number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns true if no frames remain.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Returns the frames, bottom first.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }
}

impl FromIterator<Frame> for TraversalStack {
    fn from_iter<I: IntoIterator<Item = Frame>>(iter: I) -> Self {
        Self {
            frames: iter.into_iter().collect(),
        }
    }
}
