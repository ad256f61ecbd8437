//! Speech gate: hard per-session narration budget with an attempt cooldown
//!
//! The gate is checked and claimed synchronously inside the controller, before
//! any narration work is spawned, so two requesters can never both slip past
//! the in-progress flag across a suspension point.

use orb_core::{SessionTime, SpeechContext, SpeechSource};
use std::time::Duration;

pub const DEFAULT_MAX_SPEECHES: u32 = 1;
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(5_000);

/// Why an attempt was turned away. Rejections are never queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("speech budget exhausted ({used}/{max})")]
    BudgetExhausted { used: u32, max: u32 },

    #[error("another narration is in progress")]
    InProgress,

    #[error("cooling down, {remaining_ms}ms remaining")]
    CoolingDown { remaining_ms: u64 },
}

/// What a requester wants spoken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechRequest {
    /// Literal text, or `None` to ask the message provider.
    pub text: Option<String>,
    pub source: SpeechSource,
}

impl SpeechRequest {
    pub fn generated(source: SpeechSource) -> Self {
        Self { text: None, source }
    }

    pub fn scripted(text: impl Into<String>, source: SpeechSource) -> Self {
        Self {
            text: Some(text.into()),
            source,
        }
    }
}

/// An accepted attempt. Holding one means the gate is marked in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechTicket {
    pub speech_number: u32,
    pub source: SpeechSource,
    pub text: Option<String>,
    pub voice_muted: bool,
    pub staring_secs: u64,
    pub accepted_at: SessionTime,
}

impl SpeechTicket {
    pub fn context(&self) -> SpeechContext {
        SpeechContext {
            staring_duration: self.staring_secs,
            speech_count: self.speech_number,
            source: self.source,
        }
    }
}

#[derive(Debug)]
pub struct SpeechGate {
    max: u32,
    cooldown: Duration,
    used: u32,
    in_progress: bool,
    last_attempt: Option<SessionTime>,
}

impl Default for SpeechGate {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SPEECHES, DEFAULT_COOLDOWN)
    }
}

impl SpeechGate {
    pub fn new(max: u32, cooldown: Duration) -> Self {
        Self {
            max,
            cooldown,
            used: 0,
            in_progress: false,
            last_attempt: None,
        }
    }

    pub fn used(&self) -> u32 {
        self.used
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn in_progress(&self) -> bool {
        self.in_progress
    }

    pub fn is_exhausted(&self) -> bool {
        self.used >= self.max
    }

    pub fn last_attempt(&self) -> Option<SessionTime> {
        self.last_attempt
    }

    /// Check and claim in one step. On success the budget is consumed
    /// immediately; it is never refunded, even if playback later fails.
    pub fn attempt(
        &mut self,
        now: SessionTime,
        request: SpeechRequest,
        staring_secs: u64,
        voice_muted: bool,
    ) -> Result<SpeechTicket, Rejection> {
        if self.used >= self.max {
            return Err(Rejection::BudgetExhausted {
                used: self.used,
                max: self.max,
            });
        }
        if self.in_progress {
            return Err(Rejection::InProgress);
        }
        if let Some(last) = self.last_attempt {
            let since = now.since(last);
            if since < self.cooldown {
                let remaining = self.cooldown - since;
                return Err(Rejection::CoolingDown {
                    remaining_ms: remaining.as_millis() as u64,
                });
            }
        }

        self.in_progress = true;
        self.used += 1;
        self.last_attempt = Some(now);

        Ok(SpeechTicket {
            speech_number: self.used,
            source: request.source,
            text: request.text,
            voice_muted,
            staring_secs,
            accepted_at: now,
        })
    }

    /// Release the in-progress claim. Returns false if nothing was running.
    pub fn finish(&mut self) -> bool {
        std::mem::replace(&mut self.in_progress, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn click() -> SpeechRequest {
        SpeechRequest::generated(SpeechSource::OrbClick)
    }

    #[test]
    fn ten_simultaneous_attempts_admit_one() {
        let mut gate = SpeechGate::default();
        let now = SessionTime::from_secs(10);
        let accepted = (0..10)
            .map(|_| gate.attempt(now, click(), 10, false))
            .filter(|r| r.is_ok())
            .count();
        assert_eq!(accepted, 1);
        assert_eq!(gate.used(), 1);
    }

    #[test]
    fn single_budget_rejects_after_cooldown_too() {
        let mut gate = SpeechGate::default();
        gate.attempt(SessionTime::ZERO, click(), 0, false).unwrap();
        gate.finish();
        assert_eq!(
            gate.attempt(SessionTime::from_millis(4_999), click(), 4, false),
            Err(Rejection::BudgetExhausted { used: 1, max: 1 })
        );
        assert_eq!(
            gate.attempt(SessionTime::from_millis(5_000), click(), 5, false),
            Err(Rejection::BudgetExhausted { used: 1, max: 1 })
        );
    }

    #[test]
    fn cooldown_boundary_with_larger_budget() {
        let mut gate = SpeechGate::new(2, DEFAULT_COOLDOWN);
        gate.attempt(SessionTime::ZERO, click(), 0, false).unwrap();
        gate.finish();
        assert_eq!(
            gate.attempt(SessionTime::from_millis(4_999), click(), 4, false),
            Err(Rejection::CoolingDown { remaining_ms: 1 })
        );
        let ticket = gate
            .attempt(SessionTime::from_millis(5_000), click(), 5, false)
            .unwrap();
        assert_eq!(ticket.speech_number, 2);
    }

    #[test]
    fn in_progress_blocks_even_with_budget() {
        let mut gate = SpeechGate::new(3, Duration::ZERO);
        gate.attempt(SessionTime::ZERO, click(), 0, false).unwrap();
        assert_eq!(
            gate.attempt(SessionTime::from_secs(60), click(), 60, false),
            Err(Rejection::InProgress)
        );
        assert!(gate.finish());
        assert!(!gate.finish());
        assert!(gate.attempt(SessionTime::from_secs(61), click(), 61, false).is_ok());
    }

    #[test]
    fn ticket_carries_request() {
        let mut gate = SpeechGate::default();
        let req = SpeechRequest::scripted("hello", SpeechSource::UltimateMessage);
        let ticket = gate.attempt(SessionTime::from_secs(135), req, 135, true).unwrap();
        assert_eq!(ticket.text.as_deref(), Some("hello"));
        assert!(ticket.voice_muted);
        let ctx = ticket.context();
        assert_eq!(ctx.speech_count, 1);
        assert_eq!(ctx.staring_duration, 135);
        assert_eq!(ctx.source, SpeechSource::UltimateMessage);
    }
}
