use anyhow::{Context, Result};
use image::{Rgba, RgbaImage};
use log::{error, info};
use minimp4::Mp4Muxer;
use openh264::encoder::{BitRate, Encoder, EncoderConfig, FrameRate};
use openh264::formats::YUVBuffer;
use rayon::prelude::*;
use std::fs;
use std::io::Cursor;
use std::path::Path;

pub const ENCODE_BATCH_SIZE: usize = 30;

fn channels(pixel: &Rgba<u8>) -> (f32, f32, f32) {
    (f32::from(pixel[0]), f32::from(pixel[1]), f32::from(pixel[2]))
}

/// BT.601 luma.
fn luma(pixel: &Rgba<u8>) -> f32 {
    let (r, g, b) = channels(pixel);
    0.299 * r + 0.587 * g + 0.114 * b
}

/// BT.601 (Cb, Cr), offset to sit around 128.
fn chroma(pixel: &Rgba<u8>) -> (f32, f32) {
    let (r, g, b) = channels(pixel);
    (
        -0.169 * r - 0.331 * g + 0.5 * b + 128.0,
        0.5 * r - 0.419 * g - 0.081 * b + 128.0,
    )
}

/// Packs a frame as planar I420: a full-size Y plane, then quarter-size U and V
/// planes where each sample averages one 2x2 block. Dimensions must be even.
pub fn rgb_to_yuv420(image: &RgbaImage) -> Vec<u8> {
    let (width, height) = image.dimensions();
    let (blocks_x, blocks_y) = (width / 2, height / 2);
    let luma_len = width as usize * height as usize;
    let chroma_len = blocks_x as usize * blocks_y as usize;

    let mut yuv = Vec::with_capacity(luma_len + 2 * chroma_len);
    yuv.extend(image.pixels().map(|p| luma(p).round() as u8));

    let mut v_plane = Vec::with_capacity(chroma_len);
    for by in 0..blocks_y {
        for bx in 0..blocks_x {
            let (mut u, mut v) = (0.0, 0.0);
            for (dx, dy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
                let (cb, cr) = chroma(image.get_pixel(2 * bx + dx, 2 * by + dy));
                u += cb;
                v += cr;
            }
            yuv.push((u / 4.0).round() as u8);
            v_plane.push((v / 4.0).round() as u8);
        }
    }
    yuv.extend(v_plane);
    yuv
}

/// Accumulates H.264 frames and muxes them into an MP4 file on `finish`.
pub struct VideoWriter {
    encoder: Encoder,
    h264_data: Vec<u8>,
    width: u32,
    height: u32,
    frame_count: usize,
}

impl VideoWriter {
    pub fn new(width: u32, height: u32, fps: u32) -> Result<Self> {
        if width % 2 != 0 || height % 2 != 0 {
            anyhow::bail!("Video dimensions must be even, got {}x{}", width, height);
        }
        let encoder = Encoder::with_api_config(
            openh264::OpenH264API::from_source(),
            EncoderConfig::new()
                .max_frame_rate(FrameRate::from_hz(fps as f32))
                .bitrate(BitRate::from_bps(5_000_000)), // 5 Mbps
        )
        .context("Failed to initialize H.264 encoder")?;

        Ok(Self {
            encoder,
            h264_data: Vec::new(),
            width,
            height,
            frame_count: 0,
        })
    }

    /// Converts a batch of frames to YUV in parallel, then encodes them in order.
    pub fn encode_batch(&mut self, frames: &[RgbaImage]) -> Result<()> {
        if let Some(bad) = frames.iter().find(|f| f.dimensions() != (self.width, self.height)) {
            anyhow::bail!(
                "Frame is {}x{} but the video is {}x{}",
                bad.width(),
                bad.height(),
                self.width,
                self.height
            );
        }

        let yuv_frames: Vec<Vec<u8>> = frames.par_iter().map(rgb_to_yuv420).collect();

        for yuv_data in yuv_frames {
            let yuv_source = YUVBuffer::from_vec(yuv_data, self.width as usize, self.height as usize);
            match self.encoder.encode(&yuv_source) {
                Ok(bitstream) => {
                    bitstream.write_vec(&mut self.h264_data);
                    self.frame_count += 1;
                }
                Err(e) => error!("Error encoding frame {}: {}", self.frame_count, e),
            }
        }
        Ok(())
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Muxes every encoded frame into `path`. Returns the number of frames written.
    pub fn finish(self, path: &Path, description: &str) -> Result<usize> {
        info!("Creating MP4 file...");
        let mut video_buffer = Cursor::new(Vec::new());
        {
            let mut mp4muxer = Mp4Muxer::new(&mut video_buffer);
            mp4muxer.init_video(self.width as i32, self.height as i32, false, description);
            mp4muxer.write_video(&self.h264_data);
            mp4muxer.close();
        }
        let video_bytes = video_buffer.into_inner();

        fs::write(path, &video_bytes)
            .with_context(|| format!("Failed to write video file to {}", path.display()))?;
        Ok(self.frame_count)
    }
}
