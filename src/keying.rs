use image::{Rgba, RgbaImage};

/// Marker written by the corner fills. The magenta/zero-alpha combination
/// does not occur in source art and never re-matches a later corner seed.
const SENTINEL: Rgba<u8> = Rgba([255, 0, 255, 0]);

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Make the black background connected to the image border transparent.
///
/// Seeds a zero-tolerance flood fill at each of the 4 corners whose pixel
/// is exactly black in RGB, re-coloring the reached region to a sentinel
/// value, then commits every sentinel pixel to transparent black in one
/// linear pass. Filling straight to (0,0,0,0) would make regions cleared
/// by the first corner indistinguishable from untouched (0,0,0,0) input,
/// so the fill goes through the sentinel instead.
///
/// Pixels not reachable from a black corner keep their RGB and alpha,
/// including isolated black islands and anti-aliased edges that are not
/// exactly black. Applying the keying twice is the same as applying it
/// once.
pub fn key_out_background(img: &mut RgbaImage) {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return;
    }

    let corners = [
        (0, 0),
        (width - 1, 0),
        (0, height - 1),
        (width - 1, height - 1),
    ];
    for (x, y) in corners {
        let seed = *img.get_pixel(x, y);
        // The background assumption is pure black; a corner covered by
        // sprite art (or already re-colored to the sentinel) seeds nothing.
        if seed.0[..3] != [0, 0, 0] {
            continue;
        }
        flood_to_sentinel(img, x, y, seed);
    }

    for px in img.pixels_mut() {
        if *px == SENTINEL {
            *px = TRANSPARENT;
        }
    }
}

/// Iterative 4-connectivity fill: every pixel reachable from (x, y)
/// through pixels exactly equal to `matched` becomes the sentinel.
fn flood_to_sentinel(img: &mut RgbaImage, x: u32, y: u32, matched: Rgba<u8>) {
    let (width, height) = img.dimensions();
    let mut stack = vec![(x, y)];
    while let Some((cx, cy)) = stack.pop() {
        let px = img.get_pixel_mut(cx, cy);
        if *px != matched {
            continue;
        }
        *px = SENTINEL;
        if cx > 0 {
            stack.push((cx - 1, cy));
        }
        if cx + 1 < width {
            stack.push((cx + 1, cy));
        }
        if cy > 0 {
            stack.push((cx, cy - 1));
        }
        if cy + 1 < height {
            stack.push((cx, cy + 1));
        }
    }
}
