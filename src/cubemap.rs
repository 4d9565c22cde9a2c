use std::{fs::File, io::BufWriter, path::{Path, PathBuf}};

use anyhow::Context as _;
use image::{DynamicImage, RgbImage, codecs::jpeg::JpegEncoder, imageops, imageops::FilterType};

use crate::error::{SpritemillError, SpritemillResult};

pub const CROSS_COLS: u32 = 4;
pub const CROSS_ROWS: u32 = 3;

const FACE_JPEG_QUALITY: u8 = 95;

/// One face of a cubemap texture, named after its axis direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FaceTag {
    Px,
    Nx,
    Py,
    Ny,
    Pz,
    Nz,
}

impl FaceTag {
    /// All faces, in cross-layout reading order.
    pub const ALL: [FaceTag; 6] = [
        FaceTag::Py,
        FaceTag::Nx,
        FaceTag::Pz,
        FaceTag::Px,
        FaceTag::Nz,
        FaceTag::Ny,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FaceTag::Px => "px",
            FaceTag::Nx => "nx",
            FaceTag::Py => "py",
            FaceTag::Ny => "ny",
            FaceTag::Pz => "pz",
            FaceTag::Nz => "nz",
        }
    }

    /// Cross layout cell (col, row), each unit = one face:
    ///
    /// ```text
    ///           [py]
    /// [nx] [pz] [px] [nz]
    ///           [ny]
    /// ```
    pub fn cell(self) -> (u32, u32) {
        match self {
            FaceTag::Py => (1, 0),
            FaceTag::Nx => (0, 1),
            FaceTag::Pz => (1, 1),
            FaceTag::Px => (2, 1),
            FaceTag::Nz => (3, 1),
            FaceTag::Ny => (1, 2),
        }
    }
}

/// A blank cross canvas; the 6 unused cells stay black.
pub fn blank_canvas(face_size: u32) -> RgbImage {
    RgbImage::new(CROSS_COLS * face_size, CROSS_ROWS * face_size)
}

/// Resample one face to `face_size` and paste it into its layout cell.
pub fn place_face(canvas: &mut RgbImage, tag: FaceTag, face: &DynamicImage, face_size: u32) {
    let resampled = face
        .resize_exact(face_size, face_size, FilterType::Lanczos3)
        .to_rgb8();
    let (col, row) = tag.cell();
    imageops::replace(
        canvas,
        &resampled,
        i64::from(col * face_size),
        i64::from(row * face_size),
    );
}

/// Split a cross canvas back into its 6 faces, resampled to
/// `target_size` squares, in [`FaceTag::ALL`] order.
///
/// Face dimensions derive from the canvas by integer division, so inputs
/// that are not a multiple of 4x3 lose their right/bottom remainder.
pub fn unpack_cross(
    img: &DynamicImage,
    target_size: u32,
) -> SpritemillResult<Vec<(FaceTag, RgbImage)>> {
    let face_w = img.width() / CROSS_COLS;
    let face_h = img.height() / CROSS_ROWS;
    if face_w == 0 || face_h == 0 {
        return Err(SpritemillError::validation(format!(
            "cross canvas {}x{} is smaller than the {CROSS_COLS}x{CROSS_ROWS} grid",
            img.width(),
            img.height()
        )));
    }

    let mut faces = Vec::with_capacity(FaceTag::ALL.len());
    for tag in FaceTag::ALL {
        let (col, row) = tag.cell();
        let face = img
            .crop_imm(col * face_w, row * face_h, face_w, face_h)
            .resize_exact(target_size, target_size, FilterType::Lanczos3)
            .to_rgb8();
        faces.push((tag, face));
    }
    Ok(faces)
}

/// Combine `<tag>.jpg` faces from a directory into a single cross PNG.
///
/// All 6 face files must exist before any decoding starts; a missing face
/// fails the run without writing output.
pub fn pack_dir(faces_dir: &Path, out_path: &Path, face_size: u32) -> SpritemillResult<()> {
    let mut face_paths = Vec::with_capacity(FaceTag::ALL.len());
    for tag in FaceTag::ALL {
        let path = faces_dir.join(format!("{}.jpg", tag.as_str()));
        if !path.exists() {
            return Err(SpritemillError::input(format!(
                "face image '{}' not found",
                path.display()
            )));
        }
        face_paths.push((tag, path));
    }

    let mut canvas = blank_canvas(face_size);
    for (tag, path) in face_paths {
        let face =
            image::open(&path).with_context(|| format!("decode face '{}'", path.display()))?;
        place_face(&mut canvas, tag, &face, face_size);
        let (col, row) = tag.cell();
        println!("  placed {} at col={col} row={row}", tag.as_str());
    }

    ensure_parent_dir(out_path)?;
    canvas
        .save(out_path)
        .with_context(|| format!("write cross canvas '{}'", out_path.display()))?;
    println!(
        "Saved {} ({}x{})",
        out_path.display(),
        canvas.width(),
        canvas.height()
    );
    Ok(())
}

/// Split a cross-layout image into 6 face JPGs in a derived directory.
///
/// The output directory is a sibling of the source, named `folder` when
/// given, else the source stem up to its first `_`
/// (`nycriver_cubemap_4k.jpeg` -> `nycriver`). Returns the directory the
/// faces were written to.
pub fn unpack_to_dir(
    source: &Path,
    folder: Option<&str>,
    target_size: u32,
) -> SpritemillResult<PathBuf> {
    if !source.exists() {
        return Err(SpritemillError::input(format!(
            "{} not found",
            source.display()
        )));
    }

    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| {
            SpritemillError::input(format!("non-UTF-8 source name '{}'", source.display()))
        })?;
    let folder = match folder {
        Some(name) => name.to_string(),
        None => stem.split('_').next().unwrap_or(stem).to_string(),
    };
    let out_dir = source
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(&folder);
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("create output directory '{}'", out_dir.display()))?;

    let img = image::open(source).with_context(|| format!("decode '{}'", source.display()))?;
    println!("Source: {} ({}x{})", source.display(), img.width(), img.height());
    println!("Face size: {}x{}", img.width() / CROSS_COLS, img.height() / CROSS_ROWS);
    println!("Output: {}/", out_dir.display());

    for (tag, face) in unpack_cross(&img, target_size)? {
        let out_path = out_dir.join(format!("{}.jpg", tag.as_str()));
        let file = File::create(&out_path)
            .with_context(|| format!("create face file '{}'", out_path.display()))?;
        let encoder = JpegEncoder::new_with_quality(BufWriter::new(file), FACE_JPEG_QUALITY);
        face.write_with_encoder(encoder)
            .with_context(|| format!("write face '{}'", out_path.display()))?;
        let (col, row) = tag.cell();
        println!(
            "  saved {} (col={col} row={row}) -> {}",
            tag.as_str(),
            out_path.display()
        );
    }

    println!("Done - 6 faces saved to {}/", out_dir.display());
    Ok(out_dir)
}

pub(crate) fn ensure_parent_dir(path: &Path) -> SpritemillResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output directory '{}'", parent.display()))?;
    }
    Ok(())
}
