use std::{
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use anyhow::Context as _;
use image::imageops::{self, FilterType};

use crate::{
    config::PipelineConfig,
    cubemap::ensure_parent_dir,
    error::{SpritemillError, SpritemillResult},
    frames::{SourceFrame, collect_animations, plan_batch},
};

#[derive(Clone, Debug)]
pub struct WebmEncodeConfig {
    /// Square frame resolution of the encoded video.
    pub resolution: u32,
    pub fps: u32,
    pub out_path: PathBuf,
    pub overwrite: bool,
}

impl WebmEncodeConfig {
    pub fn validate(&self) -> SpritemillResult<()> {
        if self.resolution == 0 {
            return Err(SpritemillError::validation(
                "encode resolution must be non-zero",
            ));
        }
        if !self.resolution.is_multiple_of(2) {
            // yuva420p chroma subsampling needs even frame dimensions.
            return Err(SpritemillError::validation(
                "encode resolution must be even (required for yuva420p webm output)",
            ));
        }
        if self.fps == 0 {
            return Err(SpritemillError::validation("encode fps must be non-zero"));
        }
        Ok(())
    }
}

pub fn default_webm_config(
    out_path: impl Into<PathBuf>,
    resolution: u32,
    fps: u32,
) -> WebmEncodeConfig {
    WebmEncodeConfig {
        resolution,
        fps,
        out_path: out_path.into(),
        overwrite: true,
    }
}

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Resample a frame sequence to a square resolution and write it to
/// `staging` renumbered contiguously from 1 (`frame_0001.png`, ...).
///
/// Sprite frames are resampled nearest-neighbor: the sources are low-res
/// pixel art and a smoothing filter would smear the hard edges the
/// flood-fill keying on the extraction side depends on.
pub fn stage_frames(
    frames: &[SourceFrame],
    resolution: u32,
    staging: &Path,
) -> SpritemillResult<usize> {
    for (i, frame) in frames.iter().enumerate() {
        let img = image::open(&frame.path)
            .with_context(|| format!("decode frame '{}'", frame.path.display()))?
            .to_rgba8();
        let resampled = imageops::resize(&img, resolution, resolution, FilterType::Nearest);
        let staged = staging.join(format!("frame_{:04}.png", i + 1));
        resampled
            .save(&staged)
            .with_context(|| format!("write staged frame '{}'", staged.display()))?;
    }
    Ok(frames.len())
}

/// Encode one animation's frames into a lossless alpha-capable WebM.
///
/// Frames are staged in a transient directory that is removed whether the
/// encode succeeds or fails. A failed encode leaves no partial output
/// file.
pub fn encode_animation(frames: &[SourceFrame], cfg: &WebmEncodeConfig) -> SpritemillResult<()> {
    cfg.validate()?;

    if !is_ffmpeg_on_path() {
        return Err(SpritemillError::encode(
            "ffmpeg is required for WebM encoding, but was not found on PATH",
        ));
    }

    let staging = tempfile::tempdir().with_context(|| "create frame staging directory")?;
    stage_frames(frames, cfg.resolution, staging.path())?;

    ensure_parent_dir(&cfg.out_path)?;

    // System ffmpeg rather than a bindings crate: no native FFmpeg dev
    // header/lib requirements.
    let mut cmd = Command::new("ffmpeg");
    if cfg.overwrite {
        cmd.arg("-y");
    } else {
        cmd.arg("-n");
    }
    cmd.args(["-loglevel", "error", "-framerate", &cfg.fps.to_string(), "-i"])
        .arg(staging.path().join("frame_%04d.png"))
        .args(["-c:v", "libvpx-vp9", "-pix_fmt", "yuva420p", "-lossless", "1"])
        .arg(&cfg.out_path);

    let out = cmd.output().map_err(|e| {
        SpritemillError::encode(format!(
            "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
        ))
    })?;

    if !out.status.success() {
        let _ = std::fs::remove_file(&cfg.out_path);
        let stderr = String::from_utf8_lossy(&out.stderr);
        return Err(SpritemillError::encode(format!(
            "ffmpeg exited with status {} for '{}': {}",
            out.status,
            cfg.out_path.display(),
            stderr.trim()
        )));
    }

    Ok(())
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub encoded: usize,
    pub failed: usize,
    pub missing: usize,
}

/// Encode every allow-listed animation found in `moves_dir` into
/// `<character>_<animation>.webm` files under `out_dir`.
///
/// An allow-listed key with no frames on disk is warned about and
/// skipped; a per-animation encoder failure is reported and the batch
/// moves on. Malformed frame names abort the whole run before any
/// encoding starts.
#[tracing::instrument(skip(cfg))]
pub fn encode_moves_dir(
    moves_dir: &Path,
    out_dir: &Path,
    cfg: &PipelineConfig,
) -> SpritemillResult<BatchStats> {
    cfg.validate()?;

    let groups = collect_animations(moves_dir)?;
    let plan = plan_batch(&groups, &cfg.allowed_keys);

    let mut stats = BatchStats::default();
    for key in &plan.missing {
        eprintln!("  WARNING: {key} not found in {}", moves_dir.display());
        stats.missing += 1;
    }

    for (key, frames) in &plan.jobs {
        let encode_cfg = default_webm_config(
            out_dir.join(format!("{key}.webm")),
            cfg.target_resolution,
            cfg.frame_rate,
        );
        match encode_animation(frames, &encode_cfg) {
            Ok(()) => {
                println!(
                    "  {key}: {} frames -> {}",
                    frames.len(),
                    encode_cfg.out_path.display()
                );
                stats.encoded += 1;
            }
            // Only encoder failures are per-item; anything else (bad
            // config, undecodable frame data) fails the run.
            Err(err @ SpritemillError::Encode(_)) => {
                eprintln!("  ERROR: {err}");
                stats.failed += 1;
            }
            Err(err) => return Err(err),
        }
    }

    Ok(stats)
}
