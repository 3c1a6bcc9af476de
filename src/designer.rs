//! Template designer core, independent of any rendering.
//!
//! The designer keeps a draft copy of the template owned by the application
//! root. Every operation builds a complete replacement template and returns
//! it; the caller commits that value as the canonical template and then
//! calls [`TemplateDesigner::sync`], which is the only way the draft follows
//! the canonical value.

mod assets;
mod color;
mod playback;
mod sound;
mod upload;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

use crate::error::DesignerError;
use crate::models::TemplateConfig;

pub use assets::{
    builtin_sound, sample_image_index, BuiltinSound, BUILTIN_SOUNDS, DEFAULT_IMAGE_URL,
    DEFAULT_SOUND, PRESET_COLORS, SAMPLE_IMAGES,
};
pub use color::{parse_hex_color, terminal_color, validate_color};
pub use playback::{clip_length, wav_length, Playback, PlaybackState};
pub use sound::{is_session_url, SoundHandle, SoundRegistry};
pub use upload::{convert_image, describe_data_uri, image_mime, ImageConversion, ImageConverted};

pub struct TemplateDesigner {
    draft: TemplateConfig,
    playback: Playback,
    sounds: SoundRegistry,
    sound_handle: Option<SoundHandle>,
    pending_image: Option<ImageConversion>,
    next_ticket: u64,
    fallback_clip: Duration,
}

impl TemplateDesigner {
    pub fn new(template: &TemplateConfig, fallback_clip: Duration) -> Self {
        Self {
            draft: template.clone(),
            playback: Playback::Stopped,
            sounds: SoundRegistry::new(),
            sound_handle: None,
            pending_image: None,
            next_ticket: 0,
            fallback_clip,
        }
    }

    pub fn draft(&self) -> &TemplateConfig {
        &self.draft
    }

    pub fn sounds(&self) -> &SoundRegistry {
        &self.sounds
    }

    /// Overwrite the draft with the owner's template. A session sound the
    /// template no longer points at is released here, and a new sound stops
    /// playback.
    pub fn sync(&mut self, template: &TemplateConfig) {
        if template.sound_url != self.draft.sound_url {
            self.stop_playback();
        }
        if self.draft != *template {
            debug!("designer draft resynchronized");
            self.draft = template.clone();
        }
        let orphaned = self
            .sound_handle
            .as_ref()
            .is_some_and(|handle| handle.url() != self.draft.sound_url);
        if orphaned {
            self.sound_handle = None;
        }
    }

    pub fn set_color(&mut self, color: &str) -> Result<TemplateConfig, DesignerError> {
        let color = validate_color(color)?;
        Ok(self.replace(self.draft.with_primary_color(color)))
    }

    pub fn set_image_from_sample(&mut self, url: &str) -> TemplateConfig {
        self.replace(self.draft.with_image_url(url))
    }

    /// Start converting `path` in the background. A conversion already in
    /// flight is cancelled; only the newest upload can land.
    pub fn begin_image_upload<E>(
        &mut self,
        path: PathBuf,
        runtime: &Handle,
        events: UnboundedSender<E>,
    ) -> u64
    where
        E: From<ImageConverted> + Send + 'static,
    {
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        // Replacing drops (and aborts) the previous conversion.
        self.pending_image = Some(ImageConversion::spawn(runtime, ticket, path, events));
        ticket
    }

    pub fn is_converting(&self) -> bool {
        self.pending_image.is_some()
    }

    /// Apply a finished conversion. Results for anything but the pending
    /// ticket are stale and yield `Ok(None)`.
    pub fn finish_image_upload(
        &mut self,
        done: ImageConverted,
    ) -> Result<Option<TemplateConfig>, DesignerError> {
        let pending = self.pending_image.as_ref().map(ImageConversion::ticket);
        if pending != Some(done.ticket) {
            debug!(ticket = done.ticket, ?pending, "discarding stale image conversion");
            return Ok(None);
        }
        self.pending_image = None;
        let uri = done.result?;
        info!(ticket = done.ticket, bytes = uri.len(), "image upload converted");
        Ok(Some(self.replace(self.draft.with_image_url(uri))))
    }

    pub fn set_sound_from_preset(&mut self, url: &str) -> TemplateConfig {
        self.sound_handle = None;
        self.stop_playback();
        self.replace(self.draft.with_sound_url(url))
    }

    /// Hand out a session URL for the file at `path` and point the template
    /// at it. The previous session sound, if any, is released.
    pub fn set_sound_from_upload(
        &mut self,
        path: &Path,
    ) -> Result<TemplateConfig, DesignerError> {
        let handle = self.sounds.acquire(path)?;
        let next = self.draft.with_sound_url(handle.url());
        self.sound_handle = Some(handle);
        self.stop_playback();
        Ok(self.replace(next))
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.playback.state()
    }

    pub fn playback(&self) -> &Playback {
        &self.playback
    }

    pub fn toggle_playback(&mut self, now: Instant) -> PlaybackState {
        let source = self.preview_sound_url().to_string();
        let sounds = &self.sounds;
        let fallback = self.fallback_clip;
        let state = self
            .playback
            .toggle(now, || clip_length(&source, sounds).unwrap_or(fallback));
        debug!(?state, "preview playback toggled");
        state
    }

    /// Natural end notification from the clock. Returns whether playback
    /// just ended.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.playback.poll_end(now)
    }

    /// The sound the preview plays: the draft's, or the first built-in.
    pub fn preview_sound_url(&self) -> &str {
        if self.draft.sound_url.is_empty() {
            DEFAULT_SOUND.url
        } else {
            &self.draft.sound_url
        }
    }

    fn stop_playback(&mut self) {
        self.playback.finish();
    }

    fn replace(&mut self, next: TemplateConfig) -> TemplateConfig {
        self.draft = next.clone();
        next
    }
}

impl Drop for TemplateDesigner {
    fn drop(&mut self) {
        if self.pending_image.is_some() {
            debug!("designer torn down with a conversion in flight");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;
    use tokio::sync::mpsc;

    fn designer() -> TemplateDesigner {
        TemplateDesigner::new(&TemplateConfig::default(), Duration::from_millis(1500))
    }

    #[test]
    fn set_color_is_readable_immediately() {
        let mut designer = designer();
        for color in PRESET_COLORS.iter().copied().chain(["#abcdef", "#000000"]) {
            let next = designer.set_color(color).unwrap();
            assert_eq!(next.primary_color, color);
            assert_eq!(designer.draft().primary_color, color);
        }
    }

    #[test]
    fn invalid_color_leaves_draft_untouched() {
        let mut designer = designer();
        let before = designer.draft().clone();
        assert!(designer.set_color("purple").is_err());
        assert_eq!(designer.draft(), &before);
    }

    #[test]
    fn each_operation_replaces_exactly_one_field() {
        let mut designer = designer();
        let colored = designer.set_color("#10B981").unwrap();
        let imaged = designer.set_image_from_sample(SAMPLE_IMAGES[2]);
        assert_eq!(imaged.primary_color, colored.primary_color);
        assert_eq!(imaged.sound_url, colored.sound_url);
        assert_eq!(imaged.image_url, SAMPLE_IMAGES[2]);

        let sounded = designer.set_sound_from_preset(BUILTIN_SOUNDS[1].url);
        assert_eq!(sounded.primary_color, "#10B981");
        assert_eq!(sounded.image_url, SAMPLE_IMAGES[2]);
        assert_eq!(sounded.sound_url, BUILTIN_SOUNDS[1].url);
    }

    #[test]
    fn sync_overwrites_the_draft() {
        let mut designer = designer();
        designer.set_color("#EF4444").unwrap();

        let external = TemplateConfig::default().with_image_url(SAMPLE_IMAGES[1]);
        designer.sync(&external);
        assert_eq!(designer.draft(), &external);
    }

    #[test]
    fn uploaded_sound_is_released_when_superseded() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("intro.wav");
        fs::write(&file, b"RIFF").unwrap();

        let mut designer = designer();
        let first = designer.set_sound_from_upload(&file).unwrap();
        assert!(is_session_url(&first.sound_url));
        assert_eq!(designer.sounds().live_count(), 1);

        let second = designer.set_sound_from_upload(&file).unwrap();
        assert_ne!(first.sound_url, second.sound_url);
        assert_eq!(designer.sounds().resolve(&first.sound_url), None);
        assert_eq!(designer.sounds().live_count(), 1);

        designer.set_sound_from_preset(BUILTIN_SOUNDS[0].url);
        assert_eq!(designer.sounds().live_count(), 0);
    }

    #[test]
    fn uploaded_sound_is_released_when_sync_drops_it() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("intro.ogg");
        fs::write(&file, b"OggS").unwrap();

        let mut designer = designer();
        let with_sound = designer.set_sound_from_upload(&file).unwrap();
        designer.sync(&with_sound);
        assert_eq!(designer.sounds().live_count(), 1);

        designer.sync(&TemplateConfig::default());
        assert_eq!(designer.sounds().live_count(), 0);
    }

    #[test]
    fn uploaded_sound_is_released_on_teardown() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("intro.mp3");
        fs::write(&file, b"ID3").unwrap();

        let mut designer = designer();
        designer.set_sound_from_upload(&file).unwrap();
        let registry = designer.sounds().clone();
        assert_eq!(registry.live_count(), 1);

        drop(designer);
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn failed_sound_upload_keeps_previous_sound() {
        let mut designer = designer();
        designer.set_sound_from_preset(BUILTIN_SOUNDS[1].url);
        assert!(designer
            .set_sound_from_upload(Path::new("/definitely/missing.wav"))
            .is_err());
        assert_eq!(designer.draft().sound_url, BUILTIN_SOUNDS[1].url);
    }

    #[test]
    fn playback_toggles_and_ends_naturally() {
        let start = Instant::now();
        let mut designer = designer();
        assert_eq!(designer.playback_state(), PlaybackState::Stopped);

        assert_eq!(designer.toggle_playback(start), PlaybackState::Playing);
        assert_eq!(designer.toggle_playback(start), PlaybackState::Stopped);

        // The default Chime clip is one millisecond long.
        designer.toggle_playback(start);
        assert!(designer.tick(start + Duration::from_millis(1)));
        assert_eq!(designer.playback_state(), PlaybackState::Stopped);
        assert_eq!(designer.toggle_playback(start), PlaybackState::Playing);
    }

    #[test]
    fn unmeasurable_sound_uses_fallback_length() {
        let start = Instant::now();
        let mut designer = designer();
        designer.set_sound_from_preset("https://example.com/theme.mp3");
        designer.toggle_playback(start);
        assert!(!designer.tick(start + Duration::from_millis(1499)));
        assert!(designer.tick(start + Duration::from_millis(1500)));
    }

    #[test]
    fn changing_sound_stops_playback() {
        let mut designer = designer();
        designer.toggle_playback(Instant::now());
        designer.set_sound_from_preset(BUILTIN_SOUNDS[1].url);
        assert_eq!(designer.playback_state(), PlaybackState::Stopped);
    }

    #[test]
    fn sound_changed_by_owner_stops_playback() {
        let mut designer = designer();
        let playing = designer.set_sound_from_preset("https://example.com/theme.mp3");
        designer.sync(&playing);
        designer.toggle_playback(Instant::now());
        assert_eq!(designer.playback_state(), PlaybackState::Playing);

        designer.sync(&TemplateConfig::default());
        assert_eq!(designer.playback_state(), PlaybackState::Stopped);
    }

    #[test]
    fn sync_with_same_sound_keeps_playing() {
        let mut designer = designer();
        designer.toggle_playback(Instant::now());
        let recolored = designer.draft().with_primary_color("#EF4444");
        designer.sync(&recolored);
        assert_eq!(designer.playback_state(), PlaybackState::Playing);
    }

    #[tokio::test]
    async fn image_upload_lands_after_conversion() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("party.png");
        fs::write(&file, b"png!").unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel::<ImageConverted>();
        let mut designer = designer();
        designer.set_color("#F59E0B").unwrap();
        designer.begin_image_upload(file, &Handle::current(), tx);
        assert!(designer.is_converting());
        assert!(designer.draft().image_url.is_empty());

        let done = rx.recv().await.unwrap();
        let next = designer.finish_image_upload(done).unwrap().unwrap();
        assert_eq!(next.image_url, "data:image/png;base64,cG5nIQ==");
        assert_eq!(next.primary_color, "#F59E0B");
        assert!(!designer.is_converting());
    }

    #[tokio::test]
    async fn stale_conversion_is_discarded() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("first.png");
        let second = dir.path().join("second.png");
        fs::write(&first, b"one").unwrap();
        fs::write(&second, b"two").unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel::<ImageConverted>();
        let mut designer = designer();
        let old = designer.begin_image_upload(first, &Handle::current(), tx.clone());
        let new = designer.begin_image_upload(second, &Handle::current(), tx);
        assert_ne!(old, new);

        let forged = ImageConverted {
            ticket: old,
            result: Ok("data:image/png;base64,b25l".into()),
        };
        assert!(designer.finish_image_upload(forged).unwrap().is_none());

        let done = loop {
            let event = rx.recv().await.unwrap();
            if event.ticket == new {
                break event;
            }
        };
        let next = designer.finish_image_upload(done).unwrap().unwrap();
        assert_eq!(next.image_url, "data:image/png;base64,dHdv");
    }

    #[tokio::test]
    async fn failed_conversion_surfaces_an_error() {
        let dir = tempdir().unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel::<ImageConverted>();
        let mut designer = designer();
        designer.begin_image_upload(dir.path().join("nope.png"), &Handle::current(), tx);

        let done = rx.recv().await.unwrap();
        let err = designer.finish_image_upload(done).unwrap_err();
        assert!(matches!(err, DesignerError::Read { .. }));
        assert!(designer.draft().image_url.is_empty());
        assert!(!designer.is_converting());
    }

    #[tokio::test]
    async fn result_arriving_after_teardown_is_ignored() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("late.png");
        fs::write(&file, b"late").unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel::<ImageConverted>();
        let mut designer = designer();
        let ticket = designer.begin_image_upload(file, &Handle::current(), tx);
        drop(designer);

        // Either the task was aborted before sending, or its result reaches a
        // designer that never issued the ticket.
        let mut fresh = TemplateDesigner::new(&TemplateConfig::default(), Duration::ZERO);
        if let Some(done) = rx.recv().await {
            assert_eq!(done.ticket, ticket);
            assert!(fresh.finish_image_upload(done).unwrap().is_none());
        }
        assert!(fresh.draft().image_url.is_empty());
    }
}
