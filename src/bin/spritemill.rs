use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use spritemill::{PipelineConfig, cubemap, encode_ffmpeg, extract_ffmpeg};

#[derive(Parser, Debug)]
#[command(name = "spritemill", version)]
struct Cli {
    /// Pipeline config JSON; built-in defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Combine 6 cubemap face images into a single cross-layout PNG.
    Pack(PackArgs),
    /// Split a cubemap cross-layout image into 6 face JPGs.
    Unpack(UnpackArgs),
    /// Encode sprite frame sequences into alpha WebM videos (requires `ffmpeg` on PATH).
    Encode(EncodeArgs),
    /// Extract WebM frames as alpha-keyed PNGs (requires `ffmpeg` on PATH).
    Extract(ExtractArgs),
}

#[derive(Parser, Debug)]
struct PackArgs {
    /// Directory holding the `<tag>.jpg` faces (px, nx, py, ny, pz, nz).
    #[arg(default_value = ".")]
    faces_dir: PathBuf,

    /// Output PNG path; defaults to `<faces_dir>_cubemap_4k.png` next to
    /// the faces directory.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct UnpackArgs {
    /// Cross-layout source image.
    source: PathBuf,

    /// Output folder name; defaults to the source stem up to its first `_`.
    folder: Option<String>,
}

#[derive(Parser, Debug)]
struct EncodeArgs {
    /// Directory of `<character>_<animation>_<index>.png` frames.
    #[arg(default_value = "moves")]
    moves_dir: PathBuf,

    /// Directory the `.webm` videos are written to.
    #[arg(default_value = ".")]
    out_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct ExtractArgs {
    /// Directory of `.webm` videos.
    #[arg(default_value = ".")]
    videos_dir: PathBuf,

    /// Output folder name under the videos directory; cleared before the run.
    #[arg(default_value = "runtime")]
    folder: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_deref())?;
    match cli.cmd {
        Command::Pack(args) => cmd_pack(args, &cfg),
        Command::Unpack(args) => cmd_unpack(args, &cfg),
        Command::Encode(args) => cmd_encode(args, &cfg),
        Command::Extract(args) => cmd_extract(args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<PipelineConfig> {
    match path {
        Some(p) => Ok(PipelineConfig::load(p)?),
        None => Ok(PipelineConfig::default()),
    }
}

fn cmd_pack(args: PackArgs, cfg: &PipelineConfig) -> anyhow::Result<()> {
    let out = match args.out {
        Some(out) => out,
        None => {
            let dir = args
                .faces_dir
                .canonicalize()
                .with_context(|| format!("resolve faces directory '{}'", args.faces_dir.display()))?;
            let name = dir.file_name().and_then(|n| n.to_str()).unwrap_or("cubemap");
            dir.parent()
                .unwrap_or_else(|| Path::new("."))
                .join(format!("{name}_cubemap_4k.png"))
        }
    };
    cubemap::pack_dir(&args.faces_dir, &out, cfg.face_size)?;
    Ok(())
}

fn cmd_unpack(args: UnpackArgs, cfg: &PipelineConfig) -> anyhow::Result<()> {
    cubemap::unpack_to_dir(&args.source, args.folder.as_deref(), cfg.face_size)?;
    Ok(())
}

fn cmd_encode(args: EncodeArgs, cfg: &PipelineConfig) -> anyhow::Result<()> {
    let stats = encode_ffmpeg::encode_moves_dir(&args.moves_dir, &args.out_dir, cfg)?;
    println!(
        "Done! {} encoded, {} failed, {} missing",
        stats.encoded, stats.failed, stats.missing
    );
    Ok(())
}

fn cmd_extract(args: ExtractArgs) -> anyhow::Result<()> {
    let out_dir = args.videos_dir.join(&args.folder);
    let stats = extract_ffmpeg::extract_videos_dir(&args.videos_dir, &out_dir)?;
    if stats.failed > 0 {
        eprintln!("{} video(s) failed to extract", stats.failed);
    }
    println!("Done! Frames in {}/", out_dir.display());
    Ok(())
}
