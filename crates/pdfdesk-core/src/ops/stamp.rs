//! Stamp a raster signature image onto a page

use crate::error::TransformError;
use crate::pageset::PageSet;
use serde::{Deserialize, Deserializer};
use std::str::FromStr;

/// Which page receives the stamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSelector {
    /// The document's final page, whatever its count.
    Last,
    /// A 1-indexed page number, clamped into `[1, page_count]`.
    Number(u32),
}

impl PageSelector {
    /// Resolve to a 0-based page index. Out-of-range numbers are clamped —
    /// stamping is the one deliberately permissive operation in the set;
    /// every other transform errors on a bad page number.
    pub fn resolve(self, page_count: usize) -> usize {
        match self {
            PageSelector::Last => page_count.saturating_sub(1),
            PageSelector::Number(number) => {
                (number.max(1) as usize).min(page_count).saturating_sub(1)
            }
        }
    }
}

impl FromStr for PageSelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("last") {
            return Ok(PageSelector::Last);
        }
        s.parse::<u32>()
            .map(PageSelector::Number)
            .map_err(|_| format!("expected \"last\" or a page number, got {s:?}"))
    }
}

impl<'de> Deserialize<'de> for PageSelector {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u32),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(number) => Ok(PageSelector::Number(number)),
            Raw::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Where and how large the image lands on the target page, in page units
/// with a bottom-left origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StampPlacement {
    pub x: f64,
    pub y: f64,
    pub rendered_width: f64,
    pub rendered_height: f64,
}

impl StampPlacement {
    /// Scale to the target width, height following from the image's natural
    /// aspect ratio.
    pub fn scale_to_width(
        x: f64,
        y: f64,
        target_width: f64,
        pixel_width: u32,
        pixel_height: u32,
    ) -> Self {
        Self {
            x,
            y,
            rendered_width: target_width,
            rendered_height: target_width * pixel_height as f64 / pixel_width as f64,
        }
    }
}

/// Draw `image_bytes` (PNG or JPEG) onto the selected page at `(x, y)`,
/// scaled to `width` with the aspect ratio preserved.
pub fn stamp_signature(
    mut set: PageSet,
    image_bytes: &[u8],
    selector: PageSelector,
    x: f64,
    y: f64,
    width: f64,
) -> Result<PageSet, TransformError> {
    let image = image::load_from_memory(image_bytes)
        .map_err(|e| TransformError::UnsupportedImageFormat(e.to_string()))?;
    let rgba = image.to_rgba8();
    let (pixel_width, pixel_height) = rgba.dimensions();

    let placement = StampPlacement::scale_to_width(x, y, width, pixel_width, pixel_height);

    let mut rgb = Vec::with_capacity(pixel_width as usize * pixel_height as usize * 3);
    let mut alpha = Vec::with_capacity(pixel_width as usize * pixel_height as usize);
    for pixel in rgba.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel.0[3]);
    }

    let page_count = set.page_count();
    let index = selector.resolve(page_count);
    let page = set
        .page_mut(index)
        .ok_or(TransformError::InvalidPageNumber {
            page: index as u32 + 1,
            page_count,
        })?;

    page.draw_image(
        rgb,
        alpha,
        (pixel_width, pixel_height),
        placement.x,
        placement.y,
        placement.rendered_width,
        placement.rendered_height,
    );

    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pageset::Page;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn deck(pages: usize) -> PageSet {
        let mut set = PageSet::new();
        for _ in 0..pages {
            set.add_page(Page::blank(612.0, 792.0));
        }
        set
    }

    fn sample_png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([20, 40, 60, 255]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn sample_jpeg(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([20, 40, 60]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Jpeg)
            .unwrap();
        bytes
    }

    /// The drawn content stream, if any, of a stamped page.
    fn stamp_ops(page: &Page) -> String {
        page.objects
            .values()
            .filter_map(|obj| match obj {
                lopdf::Object::Stream(s) if s.content.starts_with(b"q\n") => {
                    Some(String::from_utf8_lossy(&s.content).into_owned())
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_placement_preserves_aspect_ratio() {
        let p = StampPlacement::scale_to_width(50.0, 60.0, 180.0, 300, 150);
        assert_eq!(p.rendered_width, 180.0);
        assert_eq!(p.rendered_height, 90.0);
        assert_eq!((p.x, p.y), (50.0, 60.0));
    }

    #[test]
    fn test_stamp_png_draws_on_last_page() {
        let out = stamp_signature(
            deck(3),
            &sample_png(100, 50),
            PageSelector::Last,
            50.0,
            50.0,
            180.0,
        )
        .unwrap();

        assert!(out.page(0).unwrap().objects.is_empty());
        assert!(out.page(1).unwrap().objects.is_empty());

        let last = out.page(2).unwrap();
        assert!(!last.objects.is_empty());
        let ops = stamp_ops(last);
        assert!(ops.contains("180 0 0 90 50 50 cm"), "bad placement: {ops}");
        assert!(ops.contains("/Sig0 Do"));
    }

    #[test]
    fn test_stamp_jpeg_accepted() {
        let out = stamp_signature(
            deck(1),
            &sample_jpeg(60, 30),
            PageSelector::Number(1),
            10.0,
            20.0,
            120.0,
        )
        .unwrap();
        assert!(stamp_ops(out.page(0).unwrap()).contains("/Sig0 Do"));
    }

    #[test]
    fn test_stamp_garbage_image_rejected() {
        let result = stamp_signature(
            deck(1),
            b"not an image",
            PageSelector::Last,
            0.0,
            0.0,
            100.0,
        );
        assert!(matches!(
            result,
            Err(TransformError::UnsupportedImageFormat(_))
        ));
    }

    #[test]
    fn test_numeric_selector_is_clamped() {
        // Page 99 of a 2-page document clamps to the final page, and 0
        // clamps to the first; stamping is documented as the permissive
        // exception to the error-on-out-of-range rule.
        let out = stamp_signature(
            deck(2),
            &sample_png(10, 10),
            PageSelector::Number(99),
            0.0,
            0.0,
            50.0,
        )
        .unwrap();
        assert!(out.page(0).unwrap().objects.is_empty());
        assert!(!out.page(1).unwrap().objects.is_empty());

        let out = stamp_signature(
            deck(2),
            &sample_png(10, 10),
            PageSelector::Number(0),
            0.0,
            0.0,
            50.0,
        )
        .unwrap();
        assert!(!out.page(0).unwrap().objects.is_empty());
    }

    #[test]
    fn test_selector_resolution() {
        assert_eq!(PageSelector::Last.resolve(5), 4);
        assert_eq!(PageSelector::Last.resolve(1), 0);
        assert_eq!(PageSelector::Number(3).resolve(5), 2);
        assert_eq!(PageSelector::Number(9).resolve(5), 4);
        assert_eq!(PageSelector::Number(0).resolve(5), 0);
    }

    #[test]
    fn test_selector_parsing() {
        assert_eq!("last".parse::<PageSelector>(), Ok(PageSelector::Last));
        assert_eq!("LAST".parse::<PageSelector>(), Ok(PageSelector::Last));
        assert_eq!("3".parse::<PageSelector>(), Ok(PageSelector::Number(3)));
        assert!("3.5".parse::<PageSelector>().is_err());
        assert!("".parse::<PageSelector>().is_err());
    }

    #[test]
    fn test_stamp_twice_gets_distinct_names() {
        let once = stamp_signature(
            deck(1),
            &sample_png(10, 10),
            PageSelector::Last,
            0.0,
            0.0,
            50.0,
        )
        .unwrap();
        let twice = stamp_signature(
            once,
            &sample_png(10, 10),
            PageSelector::Last,
            100.0,
            0.0,
            50.0,
        )
        .unwrap();

        let ops = stamp_ops(twice.page(0).unwrap());
        assert!(ops.contains("/Sig0 Do"));
        assert!(ops.contains("/Sig1 Do"));
    }
}
