//! Embedded metadata extraction. Absence of metadata is a normal state:
//! every failure mode here degrades to "no fields", never to an error.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use exif::{Context, In, Reader, Tag, Value};
use log::debug;

/// Metadata keys published by [`extract_metadata`]. Fixed and
/// case-sensitive; consumers match on these exact names.
pub const DATE_TIME_ORIGINAL: &str = "DateTimeOriginal";
pub const DATE_TIME: &str = "DateTime";
pub const IMAGE_DESCRIPTION: &str = "ImageDescription";
pub const XP_TITLE: &str = "XPTitle";
pub const MAKE: &str = "Make";
pub const MODEL: &str = "Model";
pub const IMAGE_WIDTH: &str = "ImageWidth";
pub const IMAGE_HEIGHT: &str = "ImageHeight";

// Windows Explorer's title tag; absent from the crate's tag table.
// Its payload is a UTF-16LE byte array, not Ascii.
const TAG_XP_TITLE: Tag = Tag(Context::Tiff, 0x9c9b);

/// Extensions the catalog considers photos (matched case-insensitively).
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "tiff", "webp"];

pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Read embedded metadata from an image file into field -> display value.
///
/// An unreadable file, a file without an EXIF container, or a corrupt
/// metadata block all yield an empty map.
pub fn extract_metadata(path: &Path) -> HashMap<String, String> {
    let mut fields = HashMap::new();

    let Ok(file) = File::open(path) else {
        return fields;
    };
    let mut reader = BufReader::new(file);
    let parsed = match Reader::new().read_from_container(&mut reader) {
        Ok(p) => p,
        Err(e) => {
            debug!("no embedded metadata in {}: {}", path.display(), e);
            return fields;
        }
    };

    let scalar_tags = [
        (Tag::DateTimeOriginal, DATE_TIME_ORIGINAL),
        (Tag::DateTime, DATE_TIME),
        (Tag::ImageDescription, IMAGE_DESCRIPTION),
        (Tag::Make, MAKE),
        (Tag::Model, MODEL),
    ];
    for (tag, key) in scalar_tags {
        if let Some(field) = parsed.get_field(tag, In::PRIMARY) {
            let value = field.display_value().to_string();
            fields.insert(key.to_string(), value.trim_matches('"').to_string());
        }
    }

    if let Some(field) = parsed.get_field(TAG_XP_TITLE, In::PRIMARY) {
        if let Some(title) = decode_utf16le(&field.value) {
            if !title.is_empty() {
                fields.insert(XP_TITLE.to_string(), title);
            }
        }
    }

    // JPEGs usually carry only the pixel-dimension tags, TIFFs the
    // primary ones; publish whichever exists under the primary name.
    let dimension_tags = [
        (Tag::ImageWidth, Tag::PixelXDimension, IMAGE_WIDTH),
        (Tag::ImageLength, Tag::PixelYDimension, IMAGE_HEIGHT),
    ];
    for (primary, fallback, key) in dimension_tags {
        let field = parsed
            .get_field(primary, In::PRIMARY)
            .or_else(|| parsed.get_field(fallback, In::PRIMARY));
        if let Some(f) = field {
            fields.insert(key.to_string(), f.display_value().to_string());
        }
    }

    fields
}

/// Decode the UTF-16LE byte payload of the Windows XP* tags into a
/// plain string, dropping the trailing nul terminator.
fn decode_utf16le(value: &Value) -> Option<String> {
    let Value::Byte(bytes) = value else {
        return None;
    };
    let units = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
    let decoded: String = char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect();
    Some(decoded.trim_end_matches('\0').trim().to_string())
}
