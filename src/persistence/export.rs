//! PNG export of the rendered canvas.

use chrono::{DateTime, Utc};
use image::{ImageFormat, RgbaImage};
use std::error::Error;
use std::path::{Path, PathBuf};

/// File name for an export. With `timestamped`, the UTC time is inserted
/// before the extension (`my_castle.png` -> `my_castle-20261019-142501.png`)
/// so repeated exports do not overwrite each other.
#[must_use]
pub fn export_file_name(base: &str, timestamped: bool, now: DateTime<Utc>) -> String {
    let base = if base.trim().is_empty() { "my_castle.png" } else { base };
    if !timestamped {
        return base.to_string();
    }
    let stamp = now.format("%Y%m%d-%H%M%S");
    match base.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}-{stamp}.{ext}"),
        _ => format!("{base}-{stamp}"),
    }
}

/// Write `image` as a PNG to `dir/name`, creating `dir` if needed.
///
/// # Errors
/// Fails when the directory cannot be created or the PNG cannot be written.
pub fn export_png(image: &RgbaImage, dir: impl AsRef<Path>, name: &str) -> Result<PathBuf, Box<dyn Error>> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    let path = dir.join(name);
    image.save_with_format(&path, ImageFormat::Png)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ron::test_dir;
    use chrono::TimeZone;

    #[test]
    fn file_names() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 14, 25, 1).unwrap();
        assert_eq!(export_file_name("my_castle.png", false, now), "my_castle.png");
        assert_eq!(export_file_name("my_castle.png", true, now), "my_castle-20261019-142501.png");
        assert_eq!(export_file_name("castle", true, now), "castle-20261019-142501");
        assert_eq!(export_file_name("  ", false, now), "my_castle.png");
    }

    #[test]
    fn writes_decodable_png() {
        let dir = test_dir::fresh("export").join("out");
        let mut img = RgbaImage::new(4, 3);
        img.put_pixel(2, 1, image::Rgba([1, 2, 3, 255]));
        let path = export_png(&img, &dir, "shot.png").unwrap();
        assert_eq!(path, dir.join("shot.png"));

        let back = image::open(&path).unwrap().to_rgba8();
        assert_eq!(back.dimensions(), (4, 3));
        assert_eq!(*back.get_pixel(2, 1), image::Rgba([1, 2, 3, 255]));
    }
}
