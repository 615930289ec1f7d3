//! Default media prober: `image` for stills, ffprobe / ffmpeg for video and audio

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;

use attachkit_core::AttachConfig;

use crate::audio::AudioProcessor;
use crate::image::ImageProcessor;
use crate::metadata::{AudioMetadata, ImageMetadata, VideoMetadata};
use crate::traits::MediaProber;
use crate::video::{PosterExtractor, VideoProcessor};

pub struct FfmpegMediaProber {
    video: VideoProcessor,
    poster: PosterExtractor,
    audio: AudioProcessor,
}

impl FfmpegMediaProber {
    pub fn new(ffprobe_path: String, ffmpeg_path: String) -> Result<Self> {
        Ok(Self {
            video: VideoProcessor::new(ffprobe_path.clone())?,
            poster: PosterExtractor::new(ffmpeg_path.clone())?,
            audio: AudioProcessor::new(ffprobe_path, ffmpeg_path)?,
        })
    }

    pub fn from_config(config: &AttachConfig) -> Result<Self> {
        Self::new(config.ffprobe_path.clone(), config.ffmpeg_path.clone())
    }
}

#[async_trait]
impl MediaProber for FfmpegMediaProber {
    async fn probe_image(&self, data: Bytes) -> Result<ImageMetadata> {
        ImageProcessor::probe(data).await
    }

    async fn probe_video(&self, data: Bytes) -> Result<VideoMetadata> {
        self.video.probe(data).await
    }

    async fn probe_audio(&self, data: Bytes) -> Result<AudioMetadata> {
        self.audio.probe(data).await
    }

    async fn video_poster(&self, data: Bytes) -> Result<Bytes> {
        self.poster.extract(data).await
    }
}
