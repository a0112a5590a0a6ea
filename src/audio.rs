//! Positional sound cues
//!
//! The mixer itself belongs to the host. Gameplay talks to it through `AudioBackend`
//! using copyable `SoundHandle`s, and `AudioManager` applies the player's volume settings.

use glam::Vec3;

use crate::settings::Settings;

/// Sound cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// Horn blast attached to an approaching obstacle
    Honk,
}

impl SoundCue {
    /// Sample length in seconds
    pub fn duration(self) -> f32 {
        match self {
            SoundCue::Honk => 1.25,
        }
    }
}

/// Handle to a playing sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SoundHandle(u32);

impl SoundHandle {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

/// Audio subsystem seam
pub trait AudioBackend {
    /// Start a sample at a world position; it fades out beyond `max_distance`
    fn play_positional(
        &mut self,
        cue: SoundCue,
        volume: f32,
        position: Vec3,
        max_distance: f32,
    ) -> SoundHandle;

    /// True once the sample finished or was stopped. Unknown handles count as stopped.
    fn is_stopped(&self, handle: SoundHandle) -> bool;

    /// Move a playing sample
    fn set_position(&mut self, handle: SoundHandle, position: Vec3);

    /// Stop a sample early
    fn stop(&mut self, handle: SoundHandle);

    /// Place the listener; `dt` is the smoothing step for the pose change
    fn set_listener(&mut self, position: Vec3, right: Vec3, dt: f32);

    /// Advance backend time (retire finished samples)
    fn update(&mut self, _elapsed: f32) {}
}

/// Audio manager for the game
pub struct AudioManager<B> {
    backend: B,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl<B: AudioBackend> AudioManager<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    pub fn with_settings(backend: B, settings: &Settings) -> Self {
        let mut manager = Self::new(backend);
        manager.set_master_volume(settings.master_volume);
        manager.set_sfx_volume(settings.sfx_volume);
        manager.set_muted(settings.muted);
        manager
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a cue at a world position, scaled by the current volume settings
    pub fn play_at(
        &mut self,
        cue: SoundCue,
        volume: f32,
        position: Vec3,
        max_distance: f32,
    ) -> SoundHandle {
        let vol = volume * self.effective_volume();
        self.backend.play_positional(cue, vol, position, max_distance)
    }

    pub fn is_stopped(&self, handle: SoundHandle) -> bool {
        self.backend.is_stopped(handle)
    }

    pub fn set_position(&mut self, handle: SoundHandle, position: Vec3) {
        self.backend.set_position(handle, position);
    }

    pub fn stop(&mut self, handle: SoundHandle) {
        self.backend.stop(handle);
    }

    pub fn set_listener(&mut self, position: Vec3, right: Vec3, dt: f32) {
        self.backend.set_listener(position, right, dt);
    }

    pub fn update(&mut self, elapsed: f32) {
        self.backend.update(elapsed);
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

/// A sample tracked by `HeadlessAudio`
#[derive(Debug, Clone, PartialEq)]
pub struct Voice {
    pub handle: SoundHandle,
    pub cue: SoundCue,
    pub volume: f32,
    pub position: Vec3,
    pub max_distance: f32,
    pub remaining: f32,
    pub stopped: bool,
}

/// Backend with no output device: tracks voices and listener pose only
#[derive(Debug, Default)]
pub struct HeadlessAudio {
    voices: Vec<Voice>,
    next_id: u32,
    pub listener_position: Vec3,
    pub listener_right: Vec3,
    /// Total samples started
    pub started: u32,
    /// Total samples stopped early
    pub stopped_early: u32,
}

impl HeadlessAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn voice(&self, handle: SoundHandle) -> Option<&Voice> {
        self.voices.iter().find(|v| v.handle == handle)
    }

    /// Voices still playing
    pub fn active_count(&self) -> usize {
        self.voices.iter().filter(|v| !v.stopped).count()
    }
}

impl AudioBackend for HeadlessAudio {
    fn play_positional(
        &mut self,
        cue: SoundCue,
        volume: f32,
        position: Vec3,
        max_distance: f32,
    ) -> SoundHandle {
        let handle = SoundHandle::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.started += 1;
        self.voices.push(Voice {
            handle,
            cue,
            volume,
            position,
            max_distance,
            remaining: cue.duration(),
            stopped: false,
        });
        handle
    }

    fn is_stopped(&self, handle: SoundHandle) -> bool {
        self.voice(handle).is_none_or(|v| v.stopped)
    }

    fn set_position(&mut self, handle: SoundHandle, position: Vec3) {
        if let Some(voice) = self.voices.iter_mut().find(|v| v.handle == handle) {
            voice.position = position;
        }
    }

    fn stop(&mut self, handle: SoundHandle) {
        if let Some(voice) = self
            .voices
            .iter_mut()
            .find(|v| v.handle == handle && !v.stopped)
        {
            voice.stopped = true;
            self.stopped_early += 1;
        }
    }

    fn set_listener(&mut self, position: Vec3, right: Vec3, _dt: f32) {
        self.listener_position = position;
        self.listener_right = right;
    }

    fn update(&mut self, elapsed: f32) {
        for voice in &mut self.voices {
            voice.remaining -= elapsed;
            if voice.remaining <= 0.0 {
                voice.stopped = true;
            }
        }
        self.voices.retain(|v| !v.stopped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_finishes_after_duration() {
        let mut audio = HeadlessAudio::new();
        let h = audio.play_positional(SoundCue::Honk, 1.0, Vec3::ZERO, 5.0);
        assert!(!audio.is_stopped(h));

        audio.update(SoundCue::Honk.duration() + 0.01);
        assert!(audio.is_stopped(h));
        assert_eq!(audio.active_count(), 0);
    }

    #[test]
    fn test_stop_counts_once() {
        let mut audio = HeadlessAudio::new();
        let h = audio.play_positional(SoundCue::Honk, 1.0, Vec3::ZERO, 5.0);
        audio.stop(h);
        audio.stop(h);
        assert!(audio.is_stopped(h));
        assert_eq!(audio.stopped_early, 1);
    }

    #[test]
    fn test_manager_applies_mute() {
        let mut manager = AudioManager::new(HeadlessAudio::new());
        manager.set_muted(true);
        let h = manager.play_at(SoundCue::Honk, 1.0, Vec3::ONE, 5.0);
        assert_eq!(manager.backend().voice(h).map(|v| v.volume), Some(0.0));
    }

    #[test]
    fn test_settings_volumes_are_clamped() {
        let settings = Settings {
            master_volume: 2.0,
            sfx_volume: 0.5,
            ..Default::default()
        };
        let mut manager = AudioManager::with_settings(HeadlessAudio::new(), &settings);
        let h = manager.play_at(SoundCue::Honk, 1.0, Vec3::ONE, 5.0);
        let volume = manager.backend().voice(h).map(|v| v.volume).unwrap_or_default();
        assert!((volume - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_set_position_tracks() {
        let mut manager = AudioManager::new(HeadlessAudio::new());
        let h = manager.play_at(SoundCue::Honk, 1.0, Vec3::ZERO, 5.0);
        manager.set_position(h, Vec3::new(0.0, -10.0, 0.0));
        let voice = manager.backend().voice(h).unwrap();
        assert_eq!(voice.position, Vec3::new(0.0, -10.0, 0.0));
    }
}
