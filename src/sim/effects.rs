//! Post-processing signals and the overlay message queue
//!
//! The core only decides when an effect runs and how strong it is. Shaders
//! and text rendering read these signals each frame.

use std::collections::VecDeque;
use std::time::Duration;

/// Active timed signal
#[derive(Debug, Clone, Copy, PartialEq)]
struct Timer {
    started: Duration,
    duration: Duration,
}

impl Timer {
    fn new(now: Duration, duration: Duration) -> Self {
        Self {
            started: now,
            duration,
        }
    }

    fn elapsed(&self, now: Duration) -> Duration {
        now.saturating_sub(self.started)
    }

    fn is_running(&self, now: Duration) -> bool {
        self.elapsed(now) < self.duration
    }

    /// 0.0 at start, 1.0 when expired
    fn progress(&self, now: Duration) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed(now).as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EarthquakeSignal {
    pub intensity: f32,
    pub remaining: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeDirection {
    /// From black to the scene
    Lighten,
    /// From the scene to black
    Darken,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeSignal {
    pub direction: FadeDirection,
    /// 0.0 at start, 1.0 at the end
    pub progress: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AberrationSignal {
    pub gravity_scale: f32,
    pub remaining: Duration,
}

/// Earthquake, fade and aberration state
#[derive(Debug, Clone, Default)]
pub struct PostEffects {
    earthquake: Option<(Timer, f32)>,
    fade: Option<(Timer, FadeDirection)>,
    aberration: Option<(Timer, f32)>,
}

impl PostEffects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_earthquake(&mut self, now: Duration, intensity: f32, duration: Duration) {
        self.earthquake = Some((Timer::new(now, duration), intensity));
    }

    pub fn earthquake(&self, now: Duration) -> Option<EarthquakeSignal> {
        let (timer, intensity) = self.earthquake?;
        timer.is_running(now).then(|| EarthquakeSignal {
            intensity,
            remaining: timer.duration - timer.elapsed(now),
        })
    }

    pub fn start_fade(&mut self, now: Duration, direction: FadeDirection, duration: Duration) {
        self.fade = Some((Timer::new(now, duration), direction));
    }

    pub fn fade(&self, now: Duration) -> Option<FadeSignal> {
        let (timer, direction) = self.fade?;
        timer.is_running(now).then(|| FadeSignal {
            direction,
            progress: timer.progress(now),
        })
    }

    pub fn start_aberration(&mut self, now: Duration, gravity_scale: f32, duration: Duration) {
        self.aberration = Some((Timer::new(now, duration), gravity_scale));
    }

    pub fn aberration(&self, now: Duration) -> Option<AberrationSignal> {
        let (timer, gravity_scale) = self.aberration?;
        timer.is_running(now).then(|| AberrationSignal {
            gravity_scale,
            remaining: timer.duration - timer.elapsed(now),
        })
    }

    /// Clear an expired aberration. Returns true exactly once per expiry.
    pub fn take_expired_aberration(&mut self, now: Duration) -> bool {
        match self.aberration {
            Some((timer, _)) if !timer.is_running(now) => {
                self.aberration = None;
                true
            }
            _ => false,
        }
    }

    /// Stop the gameplay signals (used when a level is torn down)
    pub fn clear_gameplay(&mut self) {
        self.earthquake = None;
        self.aberration = None;
    }
}

/// Two-line message shown over the playground
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub title: String,
    pub subtitle: String,
    pub duration: Duration,
}

impl Overlay {
    pub fn new(title: impl Into<String>, subtitle: impl Into<String>, duration: Duration) -> Self {
        Self {
            title: title.into(),
            subtitle: subtitle.into(),
            duration,
        }
    }
}

/// Overlays shown one after another
#[derive(Debug, Clone, Default)]
pub struct OverlayQueue {
    pending: VecDeque<Overlay>,
    current: Option<(Overlay, Duration)>,
}

impl OverlayQueue {
    pub fn push(&mut self, overlay: Overlay) {
        self.pending.push_back(overlay);
    }

    /// Retire the current overlay once its time is up and start the next
    pub fn update(&mut self, now: Duration) {
        let expired = self
            .current
            .as_ref()
            .is_some_and(|(overlay, started)| now.saturating_sub(*started) >= overlay.duration);
        if expired {
            self.current = None;
        }
        if self.current.is_none() {
            self.current = self.pending.pop_front().map(|next| (next, now));
        }
    }

    pub fn current(&self) -> Option<&Overlay> {
        self.current.as_ref().map(|(o, _)| o)
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_earthquake_runs_for_its_duration() {
        let mut fx = PostEffects::new();
        fx.start_earthquake(ms(1_000), 0.7, ms(500));
        let s = fx.earthquake(ms(1_200)).unwrap();
        assert_eq!(s.intensity, 0.7);
        assert_eq!(s.remaining, ms(300));
        assert!(fx.earthquake(ms(1_500)).is_none());
    }

    #[test]
    fn test_fade_progress() {
        let mut fx = PostEffects::new();
        fx.start_fade(ms(0), FadeDirection::Darken, ms(1_000));
        let s = fx.fade(ms(250)).unwrap();
        assert_eq!(s.direction, FadeDirection::Darken);
        assert!((s.progress - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_aberration_expiry_reported_once() {
        let mut fx = PostEffects::new();
        fx.start_aberration(ms(0), -1.0, ms(100));
        assert!(!fx.take_expired_aberration(ms(50)));
        assert!(fx.take_expired_aberration(ms(100)));
        assert!(!fx.take_expired_aberration(ms(200)));
    }

    #[test]
    fn test_overlays_play_in_order() {
        let mut queue = OverlayQueue::default();
        queue.push(Overlay::new("Level 1", "", ms(100)));
        queue.push(Overlay::new("Extra life", "", ms(100)));

        queue.update(ms(0));
        assert_eq!(queue.current().unwrap().title, "Level 1");
        queue.update(ms(99));
        assert_eq!(queue.current().unwrap().title, "Level 1");
        queue.update(ms(100));
        assert_eq!(queue.current().unwrap().title, "Extra life");
        queue.update(ms(250));
        assert!(queue.current().is_none());
    }
}
