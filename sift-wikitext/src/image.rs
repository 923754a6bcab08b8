//! File link parsing: `[[File:Name.png|thumb|240px|alt=…|Caption]]`.

use crate::document::{Image, ImageAlign, ImageType};
use crate::lang::IMAGE_VALIGN;

/// Parse the inner text of a file link (between `[[` and `]]`). The
/// final unclassified segment becomes the raw caption, which the caller
/// processes into a sentence.
pub fn parse_file_link(inner: &str) -> Option<(Image, Option<String>)> {
    let segments = split_segments(inner);
    let (first, rest) = segments.split_first()?;

    let name = match first.split_once(':') {
        Some((_, name)) => name,
        None => first.as_str(),
    };
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    let mut image = Image {
        file: format!("File:{}", canonical_name(name)),
        ..Image::default()
    };
    let mut caption: Option<String> = None;

    for segment in rest {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        if classify_segment(&mut image, segment) {
            continue;
        }
        // Later unclassified segments win: the caption is the last one.
        caption = Some(segment.to_string());
    }

    Some((image, caption))
}

/// First character uppercased, spaces as underscores.
fn canonical_name(name: &str) -> String {
    let underscored = name.replace(' ', "_");
    let mut chars = underscored.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Returns true when the segment was recognised as a parameter.
fn classify_segment(image: &mut Image, segment: &str) -> bool {
    match segment.to_lowercase().as_str() {
        "thumb" | "thumbnail" => {
            image.r#type = Some(ImageType::Thumb);
            return true;
        }
        "frame" | "framed" => {
            image.r#type = Some(ImageType::Frame);
            return true;
        }
        "frameless" => {
            image.r#type = Some(ImageType::Frameless);
            return true;
        }
        "left" => {
            image.align = Some(ImageAlign::Left);
            return true;
        }
        "right" => {
            image.align = Some(ImageAlign::Right);
            return true;
        }
        "center" | "centre" => {
            image.align = Some(ImageAlign::Center);
            return true;
        }
        "none" => {
            image.align = Some(ImageAlign::None);
            return true;
        }
        "border" => {
            image.border = true;
            return true;
        }
        "upright" => {
            image.upright = Some(0.75);
            return true;
        }
        lower => {
            if IMAGE_VALIGN.contains(lower) {
                image.valign = Some(lower.to_string());
                return true;
            }
        }
    }

    if let Some((key, value)) = segment.split_once('=') {
        let value = value.trim();
        match key.trim().to_lowercase().as_str() {
            "upright" => {
                if let Ok(factor) = value.parse::<f64>() {
                    image.upright = Some(factor);
                    return true;
                }
            }
            "alt" => {
                image.alt = Some(value.to_string());
                return true;
            }
            "link" => {
                image.link = Some(value.to_string());
                return true;
            }
            "class" => {
                image.class = Some(value.to_string());
                return true;
            }
            "lang" => {
                image.lang = Some(value.to_string());
                return true;
            }
            "page" => {
                image.page = Some(value.to_string());
                return true;
            }
            _ => {}
        }
    }

    parse_size(image, segment)
}

/// `NNNpx` or `NNxNNpx`, whitespace tolerated.
fn parse_size(image: &mut Image, segment: &str) -> bool {
    let compact: String = segment
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    let Some(dims) = compact.strip_suffix("px") else {
        return false;
    };
    match dims.split_once('x') {
        Some((w, h)) => match (w.parse::<u32>(), h.parse::<u32>()) {
            (Ok(w), Ok(h)) => {
                image.width = Some(w);
                image.height = Some(h);
                true
            }
            _ => false,
        },
        None => match dims.parse::<u32>() {
            Ok(w) => {
                image.width = Some(w);
                true
            }
            _ => false,
        },
    }
}

/// Split on `|` outside `[[…]]` and `{{…}}` (captions may contain
/// links and templates).
fn split_segments(inner: &str) -> Vec<String> {
    let bytes = inner.as_bytes();
    let mut segments = Vec::new();
    let mut bracket = 0usize;
    let mut brace = 0usize;
    let mut seg_start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i..].starts_with(b"[[") {
            bracket += 1;
            i += 2;
        } else if bytes[i..].starts_with(b"]]") {
            bracket = bracket.saturating_sub(1);
            i += 2;
        } else if bytes[i..].starts_with(b"{{") {
            brace += 1;
            i += 2;
        } else if bytes[i..].starts_with(b"}}") {
            brace = brace.saturating_sub(1);
            i += 2;
        } else {
            if bytes[i] == b'|' && bracket == 0 && brace == 0 {
                segments.push(inner[seg_start..i].to_string());
                seg_start = i + 1;
            }
            i += 1;
        }
    }
    segments.push(inner[seg_start..].to_string());
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thumb_alt_caption() {
        let (image, caption) = parse_file_link(
            "File:Wikipedesketch1.png|thumb|alt=A cartoon centipede.|The Wikipede",
        )
        .unwrap();
        assert_eq!(image.file, "File:Wikipedesketch1.png");
        assert_eq!(image.r#type, Some(ImageType::Thumb));
        assert_eq!(image.alt.as_deref(), Some("A cartoon centipede."));
        assert_eq!(caption.as_deref(), Some("The Wikipede"));
        assert_eq!(
            image.url(),
            "https://wikipedia.org/wiki/Special:Redirect/file/Wikipedesketch1.png"
        );
    }

    #[test]
    fn test_name_canonicalisation() {
        let (image, _) = parse_file_link("file:my photo.jpg").unwrap();
        assert_eq!(image.file, "File:My_photo.jpg");
    }

    #[test]
    fn test_sizes() {
        let (image, _) = parse_file_link("File:A.png|250px").unwrap();
        assert_eq!(image.width, Some(250));
        assert_eq!(image.height, None);

        let (image, _) = parse_file_link("File:A.png|100x80 px").unwrap();
        assert_eq!(image.width, Some(100));
        assert_eq!(image.height, Some(80));
    }

    #[test]
    fn test_upright_forms() {
        let (image, _) = parse_file_link("File:A.png|upright").unwrap();
        assert_eq!(image.upright, Some(0.75));
        let (image, _) = parse_file_link("File:A.png|upright=1.35").unwrap();
        assert_eq!(image.upright, Some(1.35));
    }

    #[test]
    fn test_align_and_border() {
        let (image, _) = parse_file_link("File:A.png|left|border|frameless").unwrap();
        assert_eq!(image.align, Some(ImageAlign::Left));
        assert!(image.border);
        assert_eq!(image.r#type, Some(ImageType::Frameless));
    }

    #[test]
    fn test_caption_with_nested_link() {
        let (_, caption) =
            parse_file_link("File:A.png|thumb|A [[nested|link]] caption").unwrap();
        assert_eq!(caption.as_deref(), Some("A [[nested|link]] caption"));
    }

    #[test]
    fn test_valign_keyword() {
        let (image, _) = parse_file_link("File:A.png|middle").unwrap();
        assert_eq!(image.valign.as_deref(), Some("middle"));
    }
}
