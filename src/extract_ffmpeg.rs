use std::{
    path::{Path, PathBuf},
    process::Command,
};

use anyhow::Context as _;

use crate::{
    encode_ffmpeg::is_ffmpeg_on_path,
    error::{SpritemillError, SpritemillResult},
    keying::key_out_background,
};

/// Decode one WebM into keyed RGBA frames `<videoBaseName>_<i>.png` under
/// `out_dir`, numbered contiguously from 0 in extraction order.
///
/// Extraction is variable-frame-rate aware: ffmpeg emits exactly one PNG
/// per source frame, never dropping or duplicating to hit a fixed rate.
/// Nothing is persisted when the decode fails; staging is transient
/// either way. Returns the number of frames written.
pub fn extract_video(webm_path: &Path, out_dir: &Path) -> SpritemillResult<usize> {
    if !webm_path.exists() {
        return Err(SpritemillError::input(format!(
            "{} not found",
            webm_path.display()
        )));
    }

    let base = webm_path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| {
            SpritemillError::input(format!("non-UTF-8 video name '{}'", webm_path.display()))
        })?;

    if !is_ffmpeg_on_path() {
        return Err(SpritemillError::encode(
            "ffmpeg is required for WebM frame extraction, but was not found on PATH",
        ));
    }

    let staging = tempfile::tempdir().with_context(|| "create frame staging directory")?;

    let out = Command::new("ffmpeg")
        .args(["-loglevel", "error", "-i"])
        .arg(webm_path)
        .args(["-vsync", "vfr"])
        .arg(staging.path().join("frame_%04d.png"))
        .output()
        .map_err(|e| {
            SpritemillError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

    if !out.status.success() {
        let stderr = String::from_utf8_lossy(&out.stderr);
        return Err(SpritemillError::encode(format!(
            "ffmpeg exited with status {} for '{}': {}",
            out.status,
            webm_path.display(),
            stderr.trim()
        )));
    }

    let staged = collect_staged_frames(staging.path())?;
    persist_keyed_frames(&staged, base, out_dir)
}

/// The staged `frame_*.png` files in extraction order. The 4-digit
/// zero-padded names make lexical order the frame order.
fn collect_staged_frames(staging: &Path) -> SpritemillResult<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(staging)
        .with_context(|| format!("read staging directory '{}'", staging.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("frame_") && n.ends_with(".png"))
        })
        .collect();
    paths.sort();
    Ok(paths)
}

fn persist_keyed_frames(
    staged: &[PathBuf],
    base: &str,
    out_dir: &Path,
) -> SpritemillResult<usize> {
    for (i, path) in staged.iter().enumerate() {
        let mut frame = image::open(path)
            .with_context(|| format!("decode extracted frame '{}'", path.display()))?
            .into_rgba8();
        key_out_background(&mut frame);

        let out_path = out_dir.join(format!("{base}_{i}.png"));
        frame
            .save(&out_path)
            .with_context(|| format!("write frame '{}'", out_path.display()))?;
    }
    Ok(staged.len())
}

/// Create `dir` if absent and delete any `*.png` already in it. Runs
/// unconditionally before a full extraction pass.
pub fn clear_runtime_dir(dir: &Path) -> SpritemillResult<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create runtime directory '{}'", dir.display()))?;
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("read runtime directory '{}'", dir.display()))?
    {
        let path = entry
            .with_context(|| format!("read runtime directory '{}'", dir.display()))?
            .path();
        if path.extension().and_then(|e| e.to_str()) == Some("png") {
            std::fs::remove_file(&path)
                .with_context(|| format!("remove stale frame '{}'", path.display()))?;
        }
    }
    Ok(())
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExtractStats {
    pub videos: usize,
    pub failed: usize,
}

/// Extract every `*.webm` under `videos_dir` into `out_dir`, clearing
/// prior frames first. A per-video decode failure is reported and the
/// batch moves on.
pub fn extract_videos_dir(videos_dir: &Path, out_dir: &Path) -> SpritemillResult<ExtractStats> {
    clear_runtime_dir(out_dir)?;

    let mut videos: Vec<PathBuf> = std::fs::read_dir(videos_dir)
        .with_context(|| format!("read videos directory '{}'", videos_dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("webm"))
        .collect();
    videos.sort();

    let mut stats = ExtractStats::default();
    for video in &videos {
        let name = video.file_stem().and_then(|s| s.to_str()).unwrap_or("?");
        match extract_video(video, out_dir) {
            Ok(frames) => {
                println!("  {name}: {frames} frames");
                stats.videos += 1;
            }
            // Only decoder failures are per-item; undecodable extracted
            // frame data fails the run.
            Err(err @ SpritemillError::Encode(_)) => {
                eprintln!("  ERROR: {err}");
                stats.failed += 1;
            }
            Err(err) => return Err(err),
        }
    }
    Ok(stats)
}
