use std::path::Path;

use tracing::info;

use crate::{
    cards::layout::Bounds,
    constants::SLIDESHOW,
    error::AppError,
    movie::MovieEntry,
    render::{BoxStyle, Renderer, Rgb, TextStyle},
};

const CAPTION_TEXT: TextStyle = TextStyle {
    size: 28.0,
    color: Rgb::WHITE,
    bold: true,
};

/// Box the still is fitted into on every slide.
pub fn still_box() -> Bounds {
    Bounds::new(
        SLIDESHOW.padding,
        SLIDESHOW.padding,
        SLIDESHOW.width - SLIDESHOW.padding * 2.0,
        SLIDESHOW.height - SLIDESHOW.padding * 2.0 - SLIDESHOW.caption_height,
    )
}

fn caption_box() -> Bounds {
    Bounds::new(
        0.0,
        SLIDESHOW.height - SLIDESHOW.padding - SLIDESHOW.caption_height,
        SLIDESHOW.width,
        SLIDESHOW.caption_height,
    )
}

/// One slide per call, in call-sheet order, captioned with its number.
pub fn draw_slides<R: Renderer>(
    renderer: &mut R,
    calls: &[MovieEntry],
    stills_dir: &Path,
) -> Result<(), AppError> {
    for (i, movie) in calls.iter().enumerate() {
        let still = stills_dir.join(&movie.file_path);
        let pixel_size = image::image_dimensions(&still)
            .map_err(|e| AppError::io(format!("reading size of {}", still.display()), e))?;

        renderer.begin_page(SLIDESHOW.width, SLIDESHOW.height);
        renderer.rect(
            Bounds::new(0.0, 0.0, SLIDESHOW.width, SLIDESHOW.height),
            BoxStyle {
                fill: Some(Rgb::BLACK),
                stroke: None,
                stroke_width: 0.0,
            },
        );
        renderer.image(&still, pixel_size, still_box());
        renderer.text(&format!("#{}", i + 1), caption_box(), CAPTION_TEXT);
    }
    Ok(())
}

pub fn write_slideshow<R: Renderer>(
    renderer: &mut R,
    calls: &[MovieEntry],
    stills_dir: &Path,
    path: &Path,
) -> Result<(), AppError> {
    draw_slides(renderer, calls, stills_dir)?;
    renderer
        .save(path)
        .map_err(|e| AppError::io(format!("writing slideshow {}", path.display()), e))?;
    info!(path = %path.display(), slides = calls.len(), "wrote slideshow");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf, time::SystemTime};

    use crate::render::HtmlRenderer;

    use super::*;

    fn unique_dir(prefix: &str) -> PathBuf {
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = PathBuf::from(format!("/tmp/{prefix}_{now}"));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    // Smallest valid 24-bit BMP: 2x1 pixels.
    fn write_bmp(path: &Path) {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"BM");
        bytes.extend_from_slice(&62u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&54u32.to_le_bytes());
        bytes.extend_from_slice(&40u32.to_le_bytes());
        bytes.extend_from_slice(&2i32.to_le_bytes());
        bytes.extend_from_slice(&1i32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&24u16.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&8u32.to_le_bytes());
        bytes.extend_from_slice(&2835i32.to_le_bytes());
        bytes.extend_from_slice(&2835i32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&[0, 0, 255, 255, 0, 0, 0, 0]);
        fs::write(path, bytes).unwrap();
    }

    #[test]
    fn test_still_box_leaves_room_for_caption() {
        let still = still_box();
        let caption = caption_box();
        assert!(still.y + still.height <= caption.y + 0.01);
        assert!(!still.overlaps(&caption));
    }

    #[test]
    fn test_write_slideshow_one_slide_per_call() {
        let dir = unique_dir("stillframe_slides");
        write_bmp(&dir.join("a.bmp"));
        write_bmp(&dir.join("b.bmp"));
        let calls = vec![
            MovieEntry::new("a.bmp", "Alien", "1979").unwrap(),
            MovieEntry::new("b.bmp", "Heat", "1995").unwrap(),
        ];

        let out = dir.join("slides.html");
        let mut renderer = HtmlRenderer::new("slides");
        write_slideshow(&mut renderer, &calls, &dir, &out).unwrap();

        let html = fs::read_to_string(&out).unwrap();
        assert_eq!(html.matches("<svg class=\"page\"").count(), 2);
        assert!(html.contains(">#2</tspan>"));
        assert!(!html.contains("Alien"));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_still_is_io_error() {
        let dir = unique_dir("stillframe_slides_missing");
        let calls = vec![MovieEntry::new("gone.jpg", "Alien", "1979").unwrap()];
        let mut renderer = HtmlRenderer::new("slides");

        let err = draw_slides(&mut renderer, &calls, &dir).unwrap_err();
        assert!(matches!(err, AppError::Io { .. }));

        fs::remove_dir_all(&dir).ok();
    }
}
