// src/sensor/mock.rs
//! Scripted Polhemus transport for tests and hardware-free runs.

use std::collections::VecDeque;
use std::time::Duration;

use crate::error::{ValidationError, ValidationResult};
use crate::sensor::frame::{RawFrame, FRAME_TERMINATOR};
use crate::sensor::transport::UsbTransport;

/// What the mock answers to the next transfer.
#[derive(Debug, Clone, PartialEq)]
pub enum MockReply {
    /// Bytes returned by the next read.
    Response(Vec<u8>),
    /// The next read times out.
    ReadTimeout,
    /// The next write times out.
    WriteTimeout,
}

/// In-memory transport answering reads from a queue of scripted replies.
///
/// When the queue is empty, reads return the fallback response if one is set and
/// time out otherwise.
#[derive(Debug, Default)]
pub struct MockTransport {
    replies: VecDeque<MockReply>,
    fallback: Option<Vec<u8>>,
    writes: Vec<Vec<u8>>,
}

/// Renders frames the way the tracker does: one CRLF-terminated line per sensor.
pub fn encode_frames(frames: &[RawFrame]) -> Vec<u8> {
    let mut bytes = Vec::new();
    for (i, frame) in frames.iter().enumerate() {
        let [x, y, z] = frame.position;
        let [q0, q1, q2, q3] = frame.quaternion;
        let line = format!(
            "0{} {x:9.3} {y:9.3} {z:9.3} {q0:8.4} {q1:8.4} {q2:8.4} {q3:8.4}",
            i + 1
        );
        bytes.extend_from_slice(line.as_bytes());
        bytes.extend_from_slice(FRAME_TERMINATOR);
    }
    bytes
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers every unscripted read with `frames`.
    pub fn with_fallback(frames: &[RawFrame]) -> Self {
        Self {
            fallback: Some(encode_frames(frames)),
            ..Self::default()
        }
    }

    pub fn push_frames(&mut self, frames: &[RawFrame]) {
        self.replies
            .push_back(MockReply::Response(encode_frames(frames)));
    }

    pub fn push(&mut self, reply: MockReply) {
        self.replies.push_back(reply);
    }

    pub fn set_fallback(&mut self, frames: &[RawFrame]) {
        self.fallback = Some(encode_frames(frames));
    }

    /// Every payload written so far, configuration commands included.
    pub fn writes(&self) -> &[Vec<u8>] {
        &self.writes
    }
}

impl UsbTransport for MockTransport {
    fn write_bulk(
        &mut self,
        _endpoint: u8,
        data: &[u8],
        _timeout: Duration,
    ) -> ValidationResult<usize> {
        if self.replies.front() == Some(&MockReply::WriteTimeout) {
            self.replies.pop_front();
            return Err(ValidationError::TransportTimeout("sending the frame request"));
        }
        self.writes.push(data.to_vec());
        Ok(data.len())
    }

    fn read_bulk(
        &mut self,
        _endpoint: u8,
        buf: &mut [u8],
        _timeout: Duration,
    ) -> ValidationResult<usize> {
        let response = match self.replies.pop_front() {
            Some(MockReply::Response(bytes)) => bytes,
            Some(MockReply::ReadTimeout) | Some(MockReply::WriteTimeout) => {
                return Err(ValidationError::TransportTimeout("waiting for frame data"))
            }
            None => match &self.fallback {
                Some(bytes) => bytes.clone(),
                None => return Err(ValidationError::TransportTimeout("waiting for frame data")),
            },
        };
        let n = response.len().min(buf.len());
        buf[..n].copy_from_slice(&response[..n]);
        Ok(n)
    }
}
