use std::io;
use std::path::Path;

use id3::{ErrorKind, Tag, TagLike};
use log::{info, warn};

/// Descriptive fields shown at the top of the transcript page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Metadata {
    pub title: String,
    pub comment: Option<String>,
    pub language: Option<String>,
    pub podcast_name: Option<String>,
}

impl Metadata {
    /// Metadata with only the title set, derived from the file name.
    pub fn fallback<P: AsRef<Path>>(path: P) -> Self {
        let title = path
            .as_ref()
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            title,
            ..Self::default()
        }
    }

    /// One-line summary of the optional fields, e.g.
    /// `Comment: pilot, Language: eng`. Empty when none are set.
    pub fn summary(&self) -> String {
        let parts = [
            ("Comment", &self.comment),
            ("Language", &self.language),
            ("Podcast", &self.podcast_name),
        ];
        parts
            .iter()
            .filter_map(|(label, value)| value.as_ref().map(|v| format!("{}: {}", label, v)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Reads the ID3 tag of `path`. A missing or unreadable tag falls back to the
/// file name; only I/O errors are returned.
pub fn read_tags<P: AsRef<Path>>(path: P) -> io::Result<Metadata> {
    let path = path.as_ref();
    let mut meta = Metadata::fallback(path);

    let tag = match Tag::read_from_path(path) {
        Ok(tag) => tag,
        Err(err) => {
            return match err.kind {
                ErrorKind::Io(io_err) => Err(io_err),
                ErrorKind::NoTag => {
                    info!("No ID3 tag found in '{}'", path.display());
                    Ok(meta)
                }
                _ => {
                    warn!("Could not read ID3 tag of '{}': {}", path.display(), err.description);
                    Ok(meta)
                }
            };
        }
    };

    if let Some(title) = non_empty(tag.title()) {
        meta.title = title;
    }
    meta.comment = non_empty(tag.comments().next().map(|c| c.text.as_str()));
    meta.language = non_empty(text_frame(&tag, "TLAN"));
    meta.podcast_name = non_empty(text_frame(&tag, "TDES")).or_else(|| non_empty(tag.album()));

    Ok(meta)
}

fn text_frame<'a>(tag: &'a Tag, id: &str) -> Option<&'a str> {
    tag.get(id).and_then(|frame| frame.content().text())
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(|v| v.trim_matches(|c: char| c.is_whitespace() || c == '\0'))
        .filter(|v| !v.is_empty())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use id3::frame::Comment;
    use id3::{Frame, Version};

    #[test]
    fn fallback_title_is_file_stem() {
        assert_eq!(Metadata::fallback("/tmp/shows/ep1.mp3").title, "ep1");
        assert_eq!(Metadata::fallback("episode.final.mp3").title, "episode.final");
    }

    #[test]
    fn summary_skips_absent_fields() {
        let meta = Metadata {
            title: "Episode 1".to_string(),
            comment: None,
            language: Some("eng".to_string()),
            podcast_name: Some("Morning Show".to_string()),
        };
        assert_eq!(meta.summary(), "Language: eng, Podcast: Morning Show");
        assert_eq!(Metadata::fallback("a.mp3").summary(), "");
    }

    #[test]
    fn file_without_tag_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("untagged.mp3");
        std::fs::write(&path, b"not really an mp3").unwrap();

        let meta = read_tags(&path).unwrap();

        assert_eq!(meta, Metadata::fallback(&path));
        assert_eq!(meta.title, "untagged");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();

        let err = read_tags(dir.path().join("gone.mp3")).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn reads_known_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tagged.mp3");

        let mut tag = Tag::new();
        tag.set_title("Episode 1");
        tag.set_album("Album Show");
        tag.add_frame(Comment {
            lang: "eng".to_string(),
            description: String::new(),
            text: "Pilot".to_string(),
        });
        tag.add_frame(Frame::text("TLAN", "eng"));
        let mut bytes = Vec::new();
        tag.write_to(&mut bytes, Version::Id3v24).unwrap();
        bytes.extend_from_slice(&[0xFF, 0xFB, 0x90, 0x00]);
        std::fs::write(&path, bytes).unwrap();

        let meta = read_tags(&path).unwrap();

        assert_eq!(meta.title, "Episode 1");
        assert_eq!(meta.comment.as_deref(), Some("Pilot"));
        assert_eq!(meta.language.as_deref(), Some("eng"));
        assert_eq!(meta.podcast_name.as_deref(), Some("Album Show"));
    }
}
