//! Attachment builder
//!
//! Turns one user-selected file into an [`Attachment`]. A build runs in two stages:
//! `probe_and_decide` inspects the payload and fills a [`BuildDecision`], then
//! `finalize` merges the caller's options and assigns the unique id. The compressed copy
//! of a photo is produced at most once, inside the photo stage.
//!
//! Handle ownership: every handle the builder registers is recorded in the decision.
//! If the build fails, all of them are released. If it succeeds, handles that ended up
//! in the returned record belong to the caller and the rest are released.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, error, info, warn};

use attachkit_core::config::normalize_mime;
use attachkit_core::models::generate_unique_id;
use attachkit_core::validation::validate_aspect_ratio_with_limit;
use attachkit_core::{
    AttachConfig, Attachment, AttachmentError, AttachmentInput, AttachmentMedia, AudioInfo,
    ErrorMetadata, LogLevel, MediaClass, PayloadRef, PosterFailurePolicy, QuickPreview,
};

use crate::traits::{ImageTranscoder, MediaProber, PayloadStore};
use crate::validator::{extension_for_content_type, replace_extension};

/// Values computed while probing, before caller options are applied
#[derive(Debug)]
struct BuildDecision {
    payload_ref: PayloadRef,
    filename: String,
    media: AttachmentMedia,
    preview_ref: Option<PayloadRef>,
    compressed_ref: Option<PayloadRef>,
    should_send_as_file: bool,
    /// Every handle registered by this build, in registration order
    registered: Vec<PayloadRef>,
}

impl BuildDecision {
    fn new(filename: &str, payload_ref: PayloadRef) -> Self {
        Self {
            registered: vec![payload_ref.clone()],
            payload_ref,
            filename: filename.to_string(),
            media: AttachmentMedia::File,
            preview_ref: None,
            compressed_ref: None,
            should_send_as_file: false,
        }
    }

    async fn register(
        &mut self,
        store: &dyn PayloadStore,
        data: Bytes,
        mime_type: &str,
    ) -> PayloadRef {
        let handle = store.register(data, mime_type).await;
        self.registered.push(handle.clone());
        handle
    }
}

pub struct AttachmentBuilder {
    config: Arc<AttachConfig>,
    prober: Arc<dyn MediaProber>,
    transcoder: Arc<dyn ImageTranscoder>,
    store: Arc<dyn PayloadStore>,
}

impl AttachmentBuilder {
    pub fn new(
        config: Arc<AttachConfig>,
        prober: Arc<dyn MediaProber>,
        transcoder: Arc<dyn ImageTranscoder>,
        store: Arc<dyn PayloadStore>,
    ) -> Self {
        Self {
            config,
            prober,
            transcoder,
            store,
        }
    }

    pub fn config(&self) -> &AttachConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn PayloadStore> {
        &self.store
    }

    /// Build an attachment record for one file.
    #[tracing::instrument(skip(self, input), fields(
        filename = %input.filename,
        mime_type = %input.mime_type,
        size_bytes = input.size_bytes
    ))]
    pub async fn build(&self, input: AttachmentInput) -> Result<Attachment, AttachmentError> {
        let payload_ref = self
            .store
            .register(input.payload.clone(), &input.mime_type)
            .await;
        let mut decision = BuildDecision::new(&input.filename, payload_ref);

        if let Err(e) = self.probe_and_decide(&input, &mut decision).await {
            log_build_failure(&e, decision.registered.len());
            for handle in &decision.registered {
                self.store.release(handle).await;
            }
            return Err(e);
        }

        Ok(self.finalize(input, decision).await)
    }

    async fn probe_and_decide(
        &self,
        input: &AttachmentInput,
        decision: &mut BuildDecision,
    ) -> Result<(), AttachmentError> {
        match self.config.media_types.classify(&input.mime_type) {
            MediaClass::Photo => self.decide_photo(input, decision).await,
            MediaClass::Video => self.decide_video(input, decision).await,
            MediaClass::Audio => self.decide_audio(input, decision).await,
            MediaClass::Other => {
                debug!("Unsupported media type, attaching as a plain file");
                Ok(())
            }
        }
    }

    async fn decide_photo(
        &self,
        input: &AttachmentInput,
        decision: &mut BuildDecision,
    ) -> Result<(), AttachmentError> {
        let config = &self.config;
        let metadata = self
            .prober
            .probe_image(input.payload.clone())
            .await
            .map_err(AttachmentError::ImageProbe)?;
        let (width, height) = (metadata.width, metadata.height);
        let long_side = metadata.long_side();

        if !validate_aspect_ratio_with_limit(width, height, config.max_aspect_ratio) {
            debug!(width, height, "Aspect ratio out of bounds, sending as file");
            decision.should_send_as_file = true;
        } else {
            let ceiling = config.quick_size_ceiling(input.options.wants_high_quality());
            let should_shrink = long_side > ceiling;
            let is_animated = config.media_types.is_animated_image(&input.mime_type);
            let is_quick_encoding =
                normalize_mime(&input.mime_type) == config.quick_preview_mime_type;
            let has_supplied_copy = input.options.compressed_ref.is_some();

            if !has_supplied_copy && !is_animated && (should_shrink || !is_quick_encoding) {
                let scale = if should_shrink {
                    f64::from(ceiling) / f64::from(long_side)
                } else {
                    1.0
                };
                let compressed = self
                    .transcoder
                    .resize(input.payload.clone(), scale, &config.quick_preview_mime_type)
                    .await
                    .map_err(AttachmentError::Transcode)?;
                info!(
                    width,
                    height,
                    scale,
                    compressed_size = compressed.len(),
                    "Compressed copy produced"
                );
                let handle = decision
                    .register(self.store.as_ref(), compressed, &config.quick_preview_mime_type)
                    .await;
                decision.compressed_ref = Some(handle);
            }

            if is_quick_encoding || decision.compressed_ref.is_some() || has_supplied_copy {
                if let Some(extension) = extension_for_content_type(&config.quick_preview_mime_type)
                {
                    decision.filename = replace_extension(&decision.filename, extension);
                }
            }

            decision.media = AttachmentMedia::Image {
                quick: QuickPreview::image(width, height),
            };
        }

        // The thumbnail is produced even for photos sent as files.
        if long_side > config.max_thumb_size {
            let scale = f64::from(config.max_thumb_size) / f64::from(long_side);
            let thumbnail = self
                .transcoder
                .resize(input.payload.clone(), scale, &config.quick_preview_mime_type)
                .await
                .map_err(AttachmentError::Transcode)?;
            let handle = decision
                .register(self.store.as_ref(), thumbnail, &config.quick_preview_mime_type)
                .await;
            decision.preview_ref = Some(handle);
        } else {
            decision.preview_ref = Some(decision.payload_ref.clone());
        }

        Ok(())
    }

    async fn decide_video(
        &self,
        input: &AttachmentInput,
        decision: &mut BuildDecision,
    ) -> Result<(), AttachmentError> {
        match self.prober.probe_video(input.payload.clone()).await {
            Ok(metadata) => {
                if validate_aspect_ratio_with_limit(
                    metadata.width,
                    metadata.height,
                    self.config.max_aspect_ratio,
                ) {
                    decision.media = AttachmentMedia::Video {
                        quick: QuickPreview::video(
                            metadata.width,
                            metadata.height,
                            metadata.duration,
                        ),
                    };
                } else {
                    decision.should_send_as_file = true;
                }
            }
            Err(e) => {
                let error = AttachmentError::VideoProbe(e);
                warn!(error = %error, "Video probe failed, sending as file");
                decision.should_send_as_file = true;
            }
        }

        match self.prober.video_poster(input.payload.clone()).await {
            Ok(poster) => {
                let handle = decision
                    .register(self.store.as_ref(), poster, &self.config.quick_preview_mime_type)
                    .await;
                decision.preview_ref = Some(handle);
            }
            Err(e) => match self.config.poster_failure {
                PosterFailurePolicy::Propagate => {
                    return Err(AttachmentError::PosterDerivation(e));
                }
                PosterFailurePolicy::Skip => {
                    warn!(error = %e, "Poster derivation failed, continuing without preview");
                }
            },
        }

        Ok(())
    }

    async fn decide_audio(
        &self,
        input: &AttachmentInput,
        decision: &mut BuildDecision,
    ) -> Result<(), AttachmentError> {
        let metadata = self
            .prober
            .probe_audio(input.payload.clone())
            .await
            .map_err(AttachmentError::AudioProbe)?;

        decision.media = AttachmentMedia::Audio {
            audio: AudioInfo {
                duration: metadata.duration.filter(|d| d.is_finite()).unwrap_or(0.0),
                title: metadata.title,
                performer: metadata.performer,
            },
        };

        if let Some(cover) = metadata.cover {
            let handle = decision
                .register(self.store.as_ref(), cover.data, &cover.mime_type)
                .await;
            decision.preview_ref = Some(handle);
        }

        Ok(())
    }

    async fn finalize(&self, input: AttachmentInput, decision: BuildDecision) -> Attachment {
        let forced_file = decision.should_send_as_file;
        let mut attachment = Attachment {
            payload: input.payload,
            payload_ref: decision.payload_ref,
            filename: decision.filename,
            mime_type: input.mime_type,
            size_bytes: input.size_bytes,
            media: decision.media,
            preview_ref: decision.preview_ref,
            compressed_ref: decision.compressed_ref,
            should_send_as_file: decision.should_send_as_file,
            should_send_in_high_quality: None,
            should_send_as_spoiler: None,
            voice: None,
            unique_id: generate_unique_id(),
        }
        .with_options(&input.options);

        // Geometry that cannot be shown inline stays a file whatever the caller asked for.
        if forced_file && !attachment.should_send_as_file {
            debug!("Ignoring send-inline request for out-of-bounds media");
            attachment = attachment.with_send_as_file();
        }

        // Handles shadowed by caller options are not returned, so they are ours to drop.
        let kept = attachment.handles();
        for handle in decision.registered.iter().filter(|h| !kept.contains(h)) {
            self.store.release(handle).await;
        }

        info!(
            unique_id = %attachment.unique_id,
            kind = attachment.media.kind(),
            send_as_file = attachment.should_send_as_file,
            compressed = attachment.compressed_ref.is_some(),
            "Attachment built"
        );
        attachment
    }
}

fn log_build_failure(error: &AttachmentError, registered: usize) {
    let error_code = error.error_code();
    match error.log_level() {
        LogLevel::Debug => {
            debug!(error = %error, error_code, registered, "Attachment build failed");
        }
        LogLevel::Warn => {
            warn!(error = %error, error_code, registered, "Attachment build failed");
        }
        LogLevel::Error => {
            error!(error = %error, error_code, registered, "Attachment build failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{AudioMetadata, CoverArt, ImageMetadata, VideoMetadata};
    use crate::payload_store::InMemoryPayloadStore;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use attachkit_core::AttachmentOptions;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeProber {
        image: Option<(u32, u32)>,
        video: Option<(u32, u32, f64)>,
        poster: bool,
        audio: Option<AudioMetadata>,
    }

    #[async_trait]
    impl MediaProber for FakeProber {
        async fn probe_image(&self, _data: Bytes) -> Result<ImageMetadata, anyhow::Error> {
            let (width, height) = self.image.ok_or_else(|| anyhow!("not an image"))?;
            Ok(ImageMetadata {
                width,
                height,
                format: "Fake".to_string(),
                exif_orientation: None,
            })
        }

        async fn probe_video(&self, _data: Bytes) -> Result<VideoMetadata, anyhow::Error> {
            let (width, height, duration) =
                self.video.ok_or_else(|| anyhow!("moov atom not found"))?;
            Ok(VideoMetadata {
                duration,
                width,
                height,
                codec: "h264".to_string(),
            })
        }

        async fn probe_audio(&self, _data: Bytes) -> Result<AudioMetadata, anyhow::Error> {
            self.audio.clone().ok_or_else(|| anyhow!("not audio"))
        }

        async fn video_poster(&self, _data: Bytes) -> Result<Bytes, anyhow::Error> {
            if self.poster {
                Ok(Bytes::from_static(b"\xFF\xD8poster"))
            } else {
                Err(anyhow!("no decodable frame"))
            }
        }
    }

    #[derive(Default)]
    struct FakeTranscoder {
        scales: Mutex<Vec<f64>>,
    }

    impl FakeTranscoder {
        fn scales(&self) -> Vec<f64> {
            self.scales.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ImageTranscoder for FakeTranscoder {
        async fn resize(
            &self,
            _data: Bytes,
            scale: f64,
            target_mime_type: &str,
        ) -> Result<Bytes, anyhow::Error> {
            self.scales.lock().unwrap().push(scale);
            Ok(Bytes::from(format!("{}@{}", target_mime_type, scale)))
        }
    }

    struct Harness {
        builder: AttachmentBuilder,
        store: Arc<InMemoryPayloadStore>,
        transcoder: Arc<FakeTranscoder>,
    }

    fn harness_with_config(prober: FakeProber, config: AttachConfig) -> Harness {
        let store = Arc::new(InMemoryPayloadStore::new());
        let transcoder = Arc::new(FakeTranscoder::default());
        let builder = AttachmentBuilder::new(
            Arc::new(config),
            Arc::new(prober),
            transcoder.clone(),
            store.clone(),
        );
        Harness {
            builder,
            store,
            transcoder,
        }
    }

    fn harness(prober: FakeProber) -> Harness {
        harness_with_config(prober, AttachConfig::default())
    }

    fn image_prober(width: u32, height: u32) -> FakeProber {
        FakeProber {
            image: Some((width, height)),
            ..FakeProber::default()
        }
    }

    fn input(filename: &str, mime_type: &str) -> AttachmentInput {
        AttachmentInput::new(filename, mime_type, Bytes::from_static(b"original-bytes"))
    }

    #[tokio::test]
    async fn test_photo_within_bounds_gets_quick_preview() {
        let h = harness(image_prober(800, 600));
        let attachment = h.builder.build(input("photo.jpeg", "image/jpeg")).await.unwrap();

        assert_eq!(attachment.quick(), Some(&QuickPreview::image(800, 600)));
        assert!(!attachment.should_send_as_file);
        assert!(attachment.compressed_ref.is_none());
        assert_eq!(attachment.filename, "photo.jpg");
        assert_eq!(attachment.size_bytes, 14);
        // Only the thumbnail was produced.
        assert_eq!(h.transcoder.scales(), vec![40.0 / 800.0]);
    }

    #[tokio::test]
    async fn test_extreme_aspect_ratio_sends_as_file() {
        let h = harness(image_prober(4200, 200));
        let attachment = h.builder.build(input("banner.png", "image/png")).await.unwrap();

        assert!(attachment.should_send_as_file);
        assert_eq!(attachment.quick(), None);
        assert_eq!(attachment.media, AttachmentMedia::File);
        assert!(attachment.compressed_ref.is_none());
        assert_eq!(attachment.filename, "banner.png");
        assert!(attachment.preview_ref.is_some());
    }

    #[tokio::test]
    async fn test_wide_photo_gets_compressed_copy() {
        let h = harness(image_prober(1600, 900));
        let attachment = h.builder.build(input("wide.jpg", "image/jpeg")).await.unwrap();

        let compressed = attachment.compressed_ref.clone().unwrap();
        assert_ne!(compressed, attachment.payload_ref);
        let stored = h.store.resolve(&compressed).await.unwrap();
        let original = h.store.resolve(&attachment.payload_ref).await.unwrap();
        assert_ne!(stored.data, original.data);
        assert_eq!(stored.mime_type, "image/jpeg");

        assert_eq!(attachment.filename, "wide.jpg");
        assert_eq!(attachment.quick(), Some(&QuickPreview::image(1600, 900)));
        assert_eq!(h.transcoder.scales()[0], 0.8);
    }

    #[tokio::test]
    async fn test_high_quality_raises_ceiling() {
        let h = harness(image_prober(1800, 1200));
        let attachment = h
            .builder
            .build(input("hq.jpg", "image/jpeg").with_options(AttachmentOptions::high_quality()))
            .await
            .unwrap();

        assert!(attachment.compressed_ref.is_none());
        assert_eq!(attachment.quick().map(|q| q.width), Some(1800));
        assert_eq!(attachment.should_send_in_high_quality, Some(true));
        assert_eq!(h.transcoder.scales(), vec![40.0 / 1800.0]);
    }

    #[tokio::test]
    async fn test_png_end_to_end() {
        let h = harness(image_prober(3000, 1000));
        let attachment = h.builder.build(input("photo.png", "image/png")).await.unwrap();

        assert!(!attachment.should_send_as_file);
        assert_eq!(attachment.quick(), Some(&QuickPreview::image(3000, 1000)));
        assert!(attachment.compressed_ref.is_some());
        assert!(attachment.filename.ends_with(".jpg"));
        assert_eq!(attachment.mime_type, "image/png");

        let scales = h.transcoder.scales();
        assert_eq!(scales.len(), 2);
        assert_eq!(scales[0], 1280.0 / 3000.0);
        assert_eq!(scales[1], 40.0 / 3000.0);
    }

    #[tokio::test]
    async fn test_small_png_is_reencoded_at_full_scale() {
        let h = harness(image_prober(30, 20));
        let attachment = h.builder.build(input("icon.png", "image/png")).await.unwrap();

        assert!(attachment.compressed_ref.is_some());
        assert_eq!(h.transcoder.scales(), vec![1.0]);
        assert_eq!(attachment.filename, "icon.jpg");
        // Below the thumbnail threshold the original doubles as the preview.
        assert_eq!(attachment.preview_ref.as_ref(), Some(&attachment.payload_ref));
    }

    #[tokio::test]
    async fn test_gif_is_never_compressed() {
        let h = harness(image_prober(2000, 1500));
        let attachment = h.builder.build(input("loop.gif", "image/gif")).await.unwrap();

        assert!(attachment.compressed_ref.is_none());
        assert_eq!(attachment.filename, "loop.gif");
        assert_eq!(attachment.quick(), Some(&QuickPreview::image(2000, 1500)));
    }

    #[tokio::test]
    async fn test_supplied_compressed_copy_skips_transcode() {
        let h = harness(image_prober(3000, 1000));
        let supplied = h
            .store
            .register(Bytes::from_static(b"earlier copy"), "image/jpeg")
            .await;
        let options = AttachmentOptions {
            compressed_ref: Some(supplied.clone()),
            ..AttachmentOptions::default()
        };

        let attachment = h
            .builder
            .build(input("photo.png", "image/png").with_options(options))
            .await
            .unwrap();

        assert_eq!(attachment.compressed_ref, Some(supplied));
        assert_eq!(attachment.filename, "photo.jpg");
        assert_eq!(h.transcoder.scales(), vec![40.0 / 3000.0]);
    }

    #[tokio::test]
    async fn test_options_override_computed_values() {
        let h = harness(image_prober(800, 600));
        let custom_preview = h
            .store
            .register(Bytes::from_static(b"preview"), "image/jpeg")
            .await;
        let options = AttachmentOptions {
            filename: Some("renamed.jpg".to_string()),
            preview_ref: Some(custom_preview.clone()),
            should_send_as_spoiler: Some(true),
            ..AttachmentOptions::default()
        };

        let attachment = h
            .builder
            .build(input("photo.jpg", "image/jpeg").with_options(options))
            .await
            .unwrap();

        assert_eq!(attachment.filename, "renamed.jpg");
        assert_eq!(attachment.preview_ref, Some(custom_preview));
        assert_eq!(attachment.should_send_as_spoiler, Some(true));
        // The computed thumbnail was shadowed and released: payload + custom preview remain.
        assert_eq!(h.store.len().await, 2);
    }

    #[tokio::test]
    async fn test_send_as_file_option_drops_quick_preview() {
        let h = harness(image_prober(800, 600));
        let options = AttachmentOptions {
            should_send_as_file: Some(true),
            ..AttachmentOptions::default()
        };

        let attachment = h
            .builder
            .build(input("photo.jpg", "image/jpeg").with_options(options))
            .await
            .unwrap();

        assert!(attachment.should_send_as_file);
        assert_eq!(attachment.quick(), None);
    }

    #[tokio::test]
    async fn test_send_inline_option_cannot_unflag_extreme_aspect_ratio() {
        let h = harness(image_prober(4200, 200));
        let options = AttachmentOptions {
            should_send_as_file: Some(false),
            ..AttachmentOptions::default()
        };

        let attachment = h
            .builder
            .build(input("banner.png", "image/png").with_options(options))
            .await
            .unwrap();

        assert!(attachment.should_send_as_file);
        assert_eq!(attachment.media, AttachmentMedia::File);
    }

    #[tokio::test]
    async fn test_send_inline_option_keeps_photo_within_bounds_inline() {
        let h = harness(image_prober(800, 600));
        let options = AttachmentOptions {
            should_send_as_file: Some(false),
            ..AttachmentOptions::default()
        };

        let attachment = h
            .builder
            .build(input("photo.jpg", "image/jpeg").with_options(options))
            .await
            .unwrap();

        assert!(!attachment.should_send_as_file);
        assert_eq!(attachment.quick(), Some(&QuickPreview::image(800, 600)));
    }

    #[tokio::test]
    async fn test_image_probe_failure_releases_handles() {
        let h = harness(FakeProber::default());
        let result = h.builder.build(input("broken.png", "image/png")).await;

        assert!(matches!(result, Err(AttachmentError::ImageProbe(_))));
        assert!(h.store.is_empty().await);
    }

    #[tokio::test]
    async fn test_video_probe_failure_still_gets_poster() {
        let h = harness(FakeProber {
            poster: true,
            ..FakeProber::default()
        });
        let attachment = h.builder.build(input("clip.mp4", "video/mp4")).await.unwrap();

        assert!(attachment.should_send_as_file);
        assert_eq!(attachment.quick(), None);
        let preview = attachment.preview_ref.clone().unwrap();
        let poster = h.store.resolve(&preview).await.unwrap();
        assert_eq!(poster.mime_type, "image/jpeg");
    }

    #[tokio::test]
    async fn test_video_quick_preview_carries_duration() {
        let h = harness(FakeProber {
            video: Some((1920, 1080, 12.5)),
            poster: true,
            ..FakeProber::default()
        });
        let attachment = h.builder.build(input("clip.mov", "video/quicktime")).await.unwrap();

        assert!(!attachment.should_send_as_file);
        assert_eq!(attachment.quick(), Some(&QuickPreview::video(1920, 1080, 12.5)));
    }

    #[tokio::test]
    async fn test_video_extreme_aspect_ratio_sends_as_file() {
        let h = harness(FakeProber {
            video: Some((2100, 100, 3.0)),
            poster: true,
            ..FakeProber::default()
        });
        let attachment = h.builder.build(input("strip.webm", "video/webm")).await.unwrap();

        assert!(attachment.should_send_as_file);
        assert_eq!(attachment.media, AttachmentMedia::File);
    }

    #[tokio::test]
    async fn test_poster_failure_propagates_by_default() {
        let h = harness(FakeProber {
            video: Some((640, 480, 1.0)),
            ..FakeProber::default()
        });
        let result = h.builder.build(input("clip.mp4", "video/mp4")).await;

        assert!(matches!(result, Err(AttachmentError::PosterDerivation(_))));
        assert!(h.store.is_empty().await);
    }

    #[tokio::test]
    async fn test_poster_failure_skipped_when_configured() {
        let config = AttachConfig {
            poster_failure: PosterFailurePolicy::Skip,
            ..AttachConfig::default()
        };
        let h = harness_with_config(
            FakeProber {
                video: Some((640, 480, 1.0)),
                ..FakeProber::default()
            },
            config,
        );
        let attachment = h.builder.build(input("clip.mp4", "video/mp4")).await.unwrap();

        assert!(attachment.preview_ref.is_none());
        assert_eq!(attachment.quick(), Some(&QuickPreview::video(640, 480, 1.0)));
    }

    async fn build_audio(duration: Option<f64>) -> Attachment {
        let h = harness(FakeProber {
            audio: Some(AudioMetadata {
                duration,
                ..AudioMetadata::default()
            }),
            ..FakeProber::default()
        });
        h.builder.build(input("track.mp3", "audio/mpeg")).await.unwrap()
    }

    #[tokio::test]
    async fn test_audio_duration_defaults_only_when_unknown() {
        let unknown = build_audio(None).await;
        assert_eq!(unknown.audio().map(|a| a.duration), Some(0.0));

        let zero = build_audio(Some(0.0)).await;
        assert_eq!(zero.audio().map(|a| a.duration), Some(0.0));

        let known = build_audio(Some(215.3)).await;
        assert_eq!(known.audio().map(|a| a.duration), Some(215.3));
        assert_eq!(known.audio().and_then(|a| a.title.clone()), None);
        assert!(known.preview_ref.is_none());
        assert!(!known.should_send_as_file);
    }

    #[tokio::test]
    async fn test_audio_cover_becomes_preview() {
        let h = harness(FakeProber {
            audio: Some(AudioMetadata {
                duration: Some(60.0),
                title: Some("Song".to_string()),
                performer: Some("Band".to_string()),
                codec: Some("mp3".to_string()),
                cover: Some(CoverArt {
                    data: Bytes::from_static(b"\xFF\xD8cover"),
                    mime_type: "image/jpeg".to_string(),
                }),
            }),
            ..FakeProber::default()
        });
        let attachment = h.builder.build(input("song.mp3", "audio/mp3")).await.unwrap();

        let audio = attachment.audio().unwrap();
        assert_eq!(audio.title.as_deref(), Some("Song"));
        assert_eq!(audio.performer.as_deref(), Some("Band"));
        let cover = h.store.resolve(attachment.preview_ref.as_ref().unwrap()).await.unwrap();
        assert_eq!(cover.data, Bytes::from_static(b"\xFF\xD8cover"));
    }

    #[tokio::test]
    async fn test_unsupported_type_is_plain_file() {
        let h = harness(FakeProber::default());
        let attachment = h
            .builder
            .build(input("report.pdf", "application/pdf"))
            .await
            .unwrap();

        assert_eq!(attachment.media, AttachmentMedia::File);
        assert!(!attachment.should_send_as_file);
        assert!(attachment.preview_ref.is_none());
        assert_eq!(attachment.filename, "report.pdf");
        assert_eq!(h.store.len().await, 1);
    }

    #[tokio::test]
    async fn test_mime_type_matching_ignores_case() {
        let h = harness(image_prober(100, 100));
        let attachment = h.builder.build(input("photo.JPG", "IMAGE/JPEG")).await.unwrap();

        assert!(attachment.quick().is_some());
        assert!(attachment.compressed_ref.is_none());
        assert_eq!(attachment.mime_type, "IMAGE/JPEG");
    }

    #[tokio::test]
    async fn test_unique_ids_differ() {
        let h = harness(FakeProber::default());
        let a = h.builder.build(input("a.txt", "text/plain")).await.unwrap();
        let b = h.builder.build(input("a.txt", "text/plain")).await.unwrap();
        assert_ne!(a.unique_id, b.unique_id);
    }
}
