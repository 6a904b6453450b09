//! Argument assembly for the transcode tool
//!
//! Clip jobs seek and bound the read on the input side, so speed filters
//! change the output length but never the span of source that is read.
//! Timestamps are normalized so trims start exactly on the requested time.

use std::path::Path;

use crate::domain::model::*;
use crate::engine::format_number;

/// Lowest tempo a single `atempo` stage accepts
const ATEMPO_MIN: f64 = 0.5;
/// Fixed DNxHD bitrate
const DNXHD_BITRATE: &str = "185M";
const DNXHD_HEIGHT: u32 = 1080;

/// Builds transcode-tool invocations for export jobs
pub struct TranscodeCommandBuilder;

impl TranscodeCommandBuilder {
    /// Arguments for any export job against `input`
    pub fn job_args(input: &Path, job: &ExportJob) -> Vec<String> {
        let output = job.output_path();
        match &job.kind {
            JobKind::Clip { start, end } => {
                Self::clip_args(input, *start, *end, &job.settings, &output)
            }
            JobKind::Frame { timestamp } => Self::frame_args(input, *timestamp, &output),
        }
    }

    pub fn clip_args(
        input: &Path,
        start: TimeSpec,
        end: TimeSpec,
        settings: &EncodingSettings,
        output: &Path,
    ) -> Vec<String> {
        let duration = (end.as_seconds() - start.as_seconds()).max(0.0);
        let mut args: Vec<String> = vec![
            "-ss".into(),
            start.to_timecode(),
            "-t".into(),
            format_number(duration, 3),
            "-i".into(),
            input.to_string_lossy().into_owned(),
        ];

        let mut video_filters: Vec<String> = Vec::new();
        let mut audio_filters: Vec<String> = Vec::new();

        if settings.speed != 1.0 {
            video_filters.push(format!("setpts={}*PTS", format_number(1.0 / settings.speed, 6)));
            if settings.audio {
                audio_filters.extend(Self::atempo_chain(settings.speed));
            }
        }

        Self::push_codec_args(&mut args, &mut video_filters, settings);

        if !settings.audio {
            args.push("-an".into());
        }

        if settings.codec != Codec::Dnxhd {
            if let Some(height) = settings.resolution.height() {
                video_filters.push(format!("scale=-2:{}", height));
            }
        }

        if !video_filters.is_empty() {
            args.push("-vf".into());
            args.push(video_filters.join(","));
        }
        if !audio_filters.is_empty() {
            args.push("-af".into());
            args.push(audio_filters.join(","));
        }
        if let Some(fps) = settings.fps {
            args.push("-r".into());
            args.push(fps.to_string());
        }

        args.extend(
            ["-avoid_negative_ts", "make_zero", "-fflags", "+genpts"]
                .into_iter()
                .map(String::from),
        );
        if settings.codec.is_intermediate() {
            args.push("-movflags".into());
            args.push("+faststart".into());
        }

        args.push("-y".into());
        args.push(output.to_string_lossy().into_owned());
        args
    }

    /// One still frame at a fixed quality; no duration or range flags
    pub fn frame_args(input: &Path, timestamp: TimeSpec, output: &Path) -> Vec<String> {
        vec![
            "-ss".into(),
            timestamp.to_timecode(),
            "-i".into(),
            input.to_string_lossy().into_owned(),
            "-frames:v".into(),
            "1".into(),
            "-q:v".into(),
            "2".into(),
            "-y".into(),
            output.to_string_lossy().into_owned(),
        ]
    }

    /// `atempo` stages whose product equals `speed`, each within the accepted range
    pub fn atempo_chain(speed: f64) -> Vec<String> {
        let mut stages = Vec::new();
        let mut remaining = speed;
        while remaining < ATEMPO_MIN {
            stages.push(format!("atempo={}", format_number(ATEMPO_MIN, 6)));
            remaining /= ATEMPO_MIN;
        }
        stages.push(format!("atempo={}", format_number(remaining, 6)));
        stages
    }

    fn push_codec_args(
        args: &mut Vec<String>,
        video_filters: &mut Vec<String>,
        settings: &EncodingSettings,
    ) {
        let mut push = |items: &[&str]| args.extend(items.iter().map(|s| s.to_string()));
        let bitrate = settings.bitrate_mbps.map(|mbps| format!("{}M", mbps));

        match settings.codec {
            Codec::H264 | Codec::H265 => {
                let (encoder, crf) = match settings.codec {
                    Codec::H265 => ("libx265", "20"),
                    _ => ("libx264", "18"),
                };
                push(&["-c:v", encoder, "-preset", "fast", "-crf", crf]);
                if let Some(bitrate) = &bitrate {
                    push(&["-b:v", bitrate.as_str()]);
                }
                if settings.audio {
                    push(&["-c:a", "aac", "-b:a", "192k"]);
                }
            }
            Codec::ProRes422 | Codec::ProRes4444 => {
                let (profile, pix_fmt) = match settings.codec {
                    Codec::ProRes4444 => ("4", "yuva444p10le"),
                    _ => ("3", "yuv422p10le"),
                };
                push(&["-c:v", "prores_ks", "-profile:v", profile]);
                push(&["-pix_fmt", pix_fmt, "-vendor", "apl0"]);
                if settings.audio {
                    push(&["-c:a", "pcm_s16le"]);
                }
            }
            Codec::Dnxhd => {
                push(&["-c:v", "dnxhd"]);
                if settings.resolution == Resolution::Native {
                    video_filters.push(format!("scale=-2:{}", DNXHD_HEIGHT));
                }
                push(&["-b:v", DNXHD_BITRATE]);
                if settings.audio {
                    push(&["-c:a", "pcm_s16le"]);
                }
            }
            Codec::Vp9 => {
                push(&["-c:v", "libvpx-vp9", "-crf", "30", "-b:v", "0"]);
                if let Some(bitrate) = &bitrate {
                    push(&["-b:v", bitrate.as_str()]);
                }
                if settings.audio {
                    push(&["-c:a", "libopus", "-b:a", "192k"]);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atempo_chain() {
        assert_eq!(TranscodeCommandBuilder::atempo_chain(2.0), vec!["atempo=2"]);
        assert_eq!(TranscodeCommandBuilder::atempo_chain(0.5), vec!["atempo=0.5"]);
        assert_eq!(
            TranscodeCommandBuilder::atempo_chain(0.25),
            vec!["atempo=0.5", "atempo=0.5"]
        );
        assert_eq!(
            TranscodeCommandBuilder::atempo_chain(0.2),
            vec!["atempo=0.5", "atempo=0.5", "atempo=0.8"]
        );
    }
}
