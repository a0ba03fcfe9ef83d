use exif::experimental::Writer;
use exif::{Field, In, Reader, Tag, Value};
use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::Path;

/// In-memory view of a JPEG's EXIF metadata (0th, Exif, GPS and 1st IFDs).
/// Scoped to a single file's processing: loaded from the source bytes,
/// mutated to guarantee an Orientation tag, then re-serialized with the
/// thumbnail attached.
#[derive(Debug, Default)]
pub struct ExifContainer {
    fields: Vec<Field>,
}

impl ExifContainer {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse failure is recoverable here: the caller gets an empty container
    /// and processing continues with freshly written metadata.
    pub fn from_jpeg_bytes(bytes: &[u8]) -> Self {
        match Reader::new().read_from_container(&mut Cursor::new(bytes)) {
            Ok(exif) => Self {
                fields: exif.fields().cloned().collect(),
            },
            Err(err) => {
                log::debug!("EXIF parse failed, starting from an empty container: {err}");
                Self::empty()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn orientation(&self) -> Option<u16> {
        let field = self
            .fields
            .iter()
            .find(|f| f.tag == Tag::Orientation && f.ifd_num == In::PRIMARY)?;
        match &field.value {
            Value::Short(v) => v.first().copied(),
            _ => None,
        }
    }

    /// Defaults the 0th-IFD Orientation tag to 0 (unspecified) when absent.
    /// An existing value is never overwritten.
    pub fn ensure_orientation(&mut self) {
        let present = self
            .fields
            .iter()
            .any(|f| f.tag == Tag::Orientation && f.ifd_num == In::PRIMARY);
        if present {
            return;
        }
        self.fields.push(Field {
            tag: Tag::Orientation,
            ifd_num: In::PRIMARY,
            value: Value::Short(vec![0]),
        });
    }

    /// Re-serializes the container as a TIFF blob with `thumbnail` attached
    /// to the 1st IFD. The blob is what goes into the JPEG APP1 segment
    /// (without the "Exif\0\0" identifier, which img-parts adds back).
    pub fn serialize_with_thumbnail(&self, thumbnail: &[u8]) -> Result<Vec<u8>, exif::Error> {
        let mut writer = Writer::new();
        for field in self.fields.iter().filter(|f| writable(f)) {
            writer.push_field(field);
        }
        writer.set_jpeg(thumbnail, In::THUMBNAIL);

        let mut cursor = Cursor::new(Vec::new());
        writer.write(&mut cursor, false)?;
        Ok(cursor.into_inner())
    }
}

/// Offset-carrying tags are regenerated by the writer, and values the reader
/// could not decode cannot be re-encoded.
fn writable(field: &Field) -> bool {
    if matches!(field.value, Value::Unknown(..)) {
        return false;
    }
    !matches!(
        field.tag,
        Tag::JPEGInterchangeFormat
            | Tag::JPEGInterchangeFormatLength
            | Tag::StripOffsets
            | Tag::StripByteCounts
    )
}

/// Probe used by the scanner. Any open or parse error reads as "no
/// thumbnail" so the file still gets queued and fails (or succeeds) in the
/// worker instead.
pub fn has_embedded_thumbnail(path: &Path) -> bool {
    let Ok(file) = File::open(path) else {
        return false;
    };
    let mut reader = BufReader::new(file);
    match Reader::new().read_from_container(&mut reader) {
        Ok(exif) => exif
            .get_field(Tag::JPEGInterchangeFormat, In::THUMBNAIL)
            .is_some(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::ExifContainer;
    use exif::{In, Reader, Tag, Value};

    fn read_back(tiff: &[u8]) -> exif::Exif {
        Reader::new()
            .read_raw(tiff.to_vec())
            .expect("serialized EXIF must parse back")
    }

    #[test]
    fn empty_container_gains_orientation_zero() {
        let mut container = ExifContainer::empty();
        assert!(container.is_empty());
        container.ensure_orientation();

        let tiff = container
            .serialize_with_thumbnail(b"not-really-a-jpeg")
            .expect("serialize");
        let exif = read_back(&tiff);

        let orientation = exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .expect("orientation must exist");
        assert!(matches!(&orientation.value, Value::Short(v) if v.first() == Some(&0)));
    }

    #[test]
    fn existing_orientation_is_not_overwritten() {
        let mut container = ExifContainer::empty();
        container.ensure_orientation();
        let tiff = container.serialize_with_thumbnail(b"thumb").expect("serialize");

        let mut reparsed = ExifContainer {
            fields: read_back(&tiff).fields().cloned().collect(),
        };
        // Flip the stored value, then make sure ensure_orientation leaves it.
        for field in &mut reparsed.fields {
            if field.tag == Tag::Orientation {
                field.value = Value::Short(vec![6]);
            }
        }
        reparsed.ensure_orientation();
        assert_eq!(reparsed.orientation(), Some(6));
    }

    #[test]
    fn thumbnail_bytes_survive_serialization() {
        let thumb = vec![0xFFu8, 0xD8, 0x01, 0x02, 0x03, 0xFF, 0xD9];
        let mut container = ExifContainer::empty();
        container.ensure_orientation();

        let tiff = container.serialize_with_thumbnail(&thumb).expect("serialize");
        let exif = read_back(&tiff);

        assert!(exif
            .get_field(Tag::JPEGInterchangeFormat, In::THUMBNAIL)
            .is_some());
    }

    #[test]
    fn garbage_bytes_yield_empty_container() {
        let container = ExifContainer::from_jpeg_bytes(b"definitely not a jpeg");
        assert!(container.is_empty());
        assert_eq!(container.orientation(), None);
    }
}
