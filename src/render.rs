//! HTML transcript page generator
//!
//! Builds one self-contained document: the audio player, a clickable
//! transcript and the inlined stylesheet and script that keep them in sync.

use crate::audio::AudioSource;
use crate::srt::Segment;
use crate::tags::Metadata;

use std::collections::HashMap;

use log::debug;

const PAGE_CSS: &str = include_str!("assets/page.css");
const PAGE_JS: &str = include_str!("assets/page.js");

/// Page-level settings passed to [`render`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOpts {
    /// Value of `<html lang>`.
    pub lang: String,
    /// Move the highlight along with playback.
    pub follow_playback: bool,
    /// Open the page positioned at this offset.
    pub start_at_ms: Option<u64>,
}

impl Default for RenderOpts {
    fn default() -> Self {
        Self {
            lang: "en".to_string(),
            follow_playback: true,
            start_at_ms: None,
        }
    }
}

/// Segments paired with their anchor ids.
pub struct Transcript<'a> {
    segments: &'a [Segment],
    ids: Vec<String>,
}

impl<'a> Transcript<'a> {
    /// Anchor ids are `seg-<index>`. A repeated cue index gets a `-2`, `-3`,
    /// ... suffix in file order so every id stays unique.
    pub fn new(segments: &'a [Segment]) -> Self {
        let mut seen: HashMap<usize, usize> = HashMap::new();
        let ids = segments
            .iter()
            .map(|s| {
                let count = seen.entry(s.index).or_insert(0);
                *count += 1;
                if *count == 1 {
                    format!("seg-{}", s.index)
                } else {
                    format!("seg-{}-{}", s.index, count)
                }
            })
            .collect();
        Self { segments, ids }
    }

    pub fn id(&self, position: usize) -> &str {
        &self.ids[position]
    }

    /// Position of the segment active at `t_ms`.
    pub fn position_at(&self, t_ms: u64) -> Option<usize> {
        let last = self.segments.len().checked_sub(1)?;
        let covering = self
            .segments
            .iter()
            .enumerate()
            .position(|(i, s)| s.start_ms <= t_ms && (t_ms < s.end_ms || i == last));
        if covering.is_some() {
            return covering;
        }
        let latest = self
            .segments
            .iter()
            .enumerate()
            .filter(|(_, s)| s.start_ms <= t_ms)
            .max_by_key(|(i, s)| (s.start_ms, *i))
            .map(|(i, _)| i);
        Some(latest.unwrap_or(0))
    }
}

/// Tracks the single highlighted segment.
#[derive(Debug, Default)]
pub struct HighlightState {
    current: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct HighlightChange {
    /// Previously highlighted id to clear, if it differs from `apply`.
    pub clear: Option<String>,
    pub apply: String,
}

impl HighlightState {
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn advance(&mut self, id: &str) -> HighlightChange {
        let previous = self.current.replace(id.to_string());
        HighlightChange {
            clear: previous.filter(|p| p != id),
            apply: id.to_string(),
        }
    }
}

pub fn render(
    meta: &Metadata,
    segments: &[Segment],
    audio: &AudioSource,
    opts: &RenderOpts,
) -> String {
    let transcript = Transcript::new(segments);

    let mut highlight = HighlightState::default();
    if let Some(pos) = opts.start_at_ms.and_then(|t| transcript.position_at(t)) {
        let change = highlight.advance(transcript.id(pos));
        debug_assert!(change.clear.is_none());
        debug!("Opening at {}", change.apply);
    }

    let mut output = String::new();

    // Head
    output.push_str("<!DOCTYPE html>\n");
    output.push_str(&format!("<html lang=\"{}\">\n", escape(&opts.lang)));
    output.push_str("<head>\n");
    output.push_str("  <meta charset=\"UTF-8\">\n");
    output.push_str(
        "  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    output.push_str(&format!("  <title>{}</title>\n", escape(&meta.title)));
    output.push_str("  <style>\n");
    output.push_str(PAGE_CSS);
    output.push_str("  </style>\n");
    output.push_str("</head>\n");

    // Header and player
    output.push_str("<body>\n");
    output.push_str(&format!("  <h2>{}</h2>\n", escape(&meta.title)));
    let summary = meta.summary();
    if !summary.is_empty() {
        output.push_str(&format!("  <p class=\"metadata\">{}</p>\n", escape(&summary)));
    }
    output.push_str("  <div class=\"player-row\">\n");
    output.push_str("    <audio id=\"player\" controls preload=\"auto\">\n");
    output.push_str(&format!(
        "      <source src=\"{}\" type=\"{}\">\n",
        escape(&audio.src()),
        escape(audio.mime())
    ));
    output.push_str("      Your browser does not support the audio element.\n");
    output.push_str("    </audio>\n");
    output.push_str(
        "    <button class=\"jump-button\" onclick=\"scrollToCurrentSegment()\">To text</button>\n",
    );
    output.push_str("  </div>\n");

    // Transcript
    output.push_str("  <div id=\"transcript\">\n");
    for (pos, segment) in segments.iter().enumerate() {
        push_segment(&mut output, transcript.id(pos), segment, highlight.current());
    }
    output.push_str("  </div>\n");

    // Floating controls
    output.push_str("  <div id=\"floating-controls\">\n");
    output.push_str("    <button onclick=\"scrollToPlayer()\">↑ To audio</button>\n");
    output.push_str("    <button id=\"playPauseBtn\" onclick=\"togglePlay()\">▶</button>\n");
    output.push_str("  </div>\n");

    // Script
    output.push_str("  <script>\n");
    push_transcript_data(&mut output, &transcript, &highlight, opts);
    output.push_str(PAGE_JS);
    output.push_str("  </script>\n");
    output.push_str("</body>\n");
    output.push_str("</html>\n");

    output
}

fn push_segment(output: &mut String, id: &str, segment: &Segment, highlighted: Option<&str>) {
    let class = if highlighted == Some(id) {
        "transcript-segment highlight"
    } else {
        "transcript-segment"
    };
    let text = escape(&segment.text()).replace('\n', "<br>");
    output.push_str(&format!(
        concat!(
            "    <p id=\"{}\" class=\"{}\">",
            "<a class=\"timestamp\" href=\"#{}\" data-start=\"{}\">[{}]</a> {}</p>\n"
        ),
        id,
        class,
        id,
        seconds(segment.start_ms),
        format_timestamp(segment.start_ms),
        text
    ));
}

fn push_transcript_data(
    output: &mut String,
    transcript: &Transcript,
    highlight: &HighlightState,
    opts: &RenderOpts,
) {
    output.push_str("const TRANSCRIPT = {\n");
    output.push_str("  segments: [\n");
    for (pos, segment) in transcript.segments.iter().enumerate() {
        output.push_str(&format!(
            "    {{id: \"{}\", start: {}, end: {}}},\n",
            transcript.id(pos),
            seconds(segment.start_ms),
            seconds(segment.end_ms)
        ));
    }
    output.push_str("  ],\n");
    match highlight.current() {
        Some(id) => output.push_str(&format!("  highlighted: \"{}\",\n", id)),
        None => output.push_str("  highlighted: null,\n"),
    }
    output.push_str(&format!("  follow: {},\n", opts.follow_playback));
    match opts.start_at_ms {
        Some(ms) => output.push_str(&format!("  startAt: {},\n", seconds(ms))),
        None => output.push_str("  startAt: null,\n"),
    }
    output.push_str("};\n");
}

/// Milliseconds as a decimal number of seconds, e.g. `4.500`.
fn seconds(ms: u64) -> String {
    format!("{}.{:03}", ms / 1000, ms % 1000)
}

/// Display label for a timestamp link: `MM:SS`, or `H:MM:SS` past the hour.
fn format_timestamp(ms: u64) -> String {
    let total_secs = ms / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

fn escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(index: usize, start_ms: u64, end_ms: u64, text: &str) -> Segment {
        Segment {
            index,
            start_ms,
            end_ms,
            text: text.lines().map(String::from).collect(),
        }
    }

    fn two_segments() -> Vec<Segment> {
        vec![seg(1, 1000, 4500, "Hello world"), seg(2, 4500, 7000, "Second line")]
    }

    fn titled(title: &str) -> Metadata {
        Metadata {
            title: title.to_string(),
            ..Metadata::default()
        }
    }

    macro_rules! test_format_timestamp {
        ($($name:ident: $value:expr,)*) => {
        $(
            #[test]
            fn $name() {
                let (input, expected) = $value;

                assert_eq!(format_timestamp(input), expected);
            }
        )*
        }
    }

    test_format_timestamp! {
        test_format_timestamp_0: (0, "00:00"),
        test_format_timestamp_1: (999, "00:00"),
        test_format_timestamp_2: (61_500, "01:01"),
        test_format_timestamp_3: (3_599_999, "59:59"),
        test_format_timestamp_4: (3_600_000, "1:00:00"),
        test_format_timestamp_5: (36_061_000, "10:01:01"),
    }

    #[test]
    fn lookup_selects_covering_segment() {
        let subs = two_segments();
        let transcript = Transcript::new(&subs);

        let index_at = |t| transcript.position_at(t).map(|i| subs[i].index);

        assert_eq!(index_at(5000), Some(2));
        assert_eq!(index_at(4500), Some(2));
        assert_eq!(index_at(4499), Some(1));
    }

    #[test]
    fn lookup_edges() {
        let subs = vec![seg(1, 1000, 2000, "a"), seg(2, 5000, 6000, "b")];
        let transcript = Transcript::new(&subs);

        // Before the first cue, in a gap, and past the open-ended last cue.
        assert_eq!(transcript.position_at(0), Some(0));
        assert_eq!(transcript.position_at(3000), Some(0));
        assert_eq!(transcript.position_at(60_000), Some(1));
        assert_eq!(Transcript::new(&[]).position_at(1000), None);
    }

    #[test]
    fn duplicate_indices_get_unique_ids() {
        let subs = vec![
            seg(1, 0, 1, "a"),
            seg(1, 1, 2, "b"),
            seg(2, 2, 3, "c"),
            seg(1, 3, 4, "d"),
        ];
        let transcript = Transcript::new(&subs);

        let ids: Vec<&str> = (0..subs.len()).map(|i| transcript.id(i)).collect();

        assert_eq!(ids, vec!["seg-1", "seg-1-2", "seg-2", "seg-1-3"]);
    }

    fn change(clear: Option<&str>, apply: &str) -> HighlightChange {
        HighlightChange {
            clear: clear.map(String::from),
            apply: apply.to_string(),
        }
    }

    #[test]
    fn highlight_moves_one_segment_at_a_time() {
        let mut state = HighlightState::default();

        assert_eq!(state.advance("seg-1"), change(None, "seg-1"));
        assert_eq!(state.advance("seg-1"), change(None, "seg-1"));
        assert_eq!(state.advance("seg-2"), change(Some("seg-1"), "seg-2"));
        assert_eq!(state.current(), Some("seg-2"));
    }

    #[test]
    fn title_only_metadata_page() {
        let html = render(
            &titled("Episode 1"),
            &two_segments(),
            &AudioSource::link("ep1.mp3"),
            &RenderOpts::default(),
        );

        assert!(html.starts_with("<!DOCTYPE html>\n<html lang=\"en\">"));
        assert!(html.contains("<title>Episode 1</title>"));
        assert!(!html.contains("class=\"metadata\""));
        assert!(!html.contains("Comment:"));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn metadata_summary_is_rendered() {
        let meta = Metadata {
            comment: Some("Q&A".to_string()),
            ..titled("Episode 1")
        };

        let html = render(
            &meta,
            &[],
            &AudioSource::link("ep1.mp3"),
            &RenderOpts::default(),
        );

        assert!(html.contains("<p class=\"metadata\">Comment: Q&amp;A</p>"));
    }

    #[test]
    fn linked_source_is_verbatim() {
        let html = render(
            &titled("Episode 1"),
            &two_segments(),
            &AudioSource::link("ep1.mp3"),
            &RenderOpts::default(),
        );

        assert!(html.contains("<source src=\"ep1.mp3\" type=\"audio/mpeg\">"));
        assert!(!html.contains("base64"));
    }

    #[test]
    fn embedded_source_round_trips() {
        let bytes = b"ID3\x04\x00fake mp3 payload \xff\xfb".to_vec();
        let html = render(
            &titled("Episode 1"),
            &two_segments(),
            &AudioSource::embed(&bytes, "audio/mpeg"),
            &RenderOpts::default(),
        );

        let start = html.find("src=\"data:").unwrap() + "src=\"".len();
        let end = start + html[start..].find('"').unwrap();

        assert_eq!(AudioSource::from_data_uri(&html[start..end]), Some(bytes));
    }

    #[test]
    fn audio_variant_only_changes_the_source() {
        let subs = two_segments();
        let meta = titled("Episode 1");
        let opts = RenderOpts::default();
        let linked = render(&meta, &subs, &AudioSource::link("ep1.mp3"), &opts);
        let embedded = render(&meta, &subs, &AudioSource::embed(b"abc", "audio/mpeg"), &opts);

        let swapped = linked.replace("src=\"ep1.mp3\"", "src=\"data:audio/mpeg;base64,YWJj\"");
        assert_eq!(swapped, embedded);
    }

    #[test]
    fn segments_become_clickable_rows() {
        let subs = vec![
            seg(1, 1000, 4500, "Hello <world>\nline two"),
            seg(2, 4500, 7000, ""),
        ];
        let opts = RenderOpts::default();

        let html = render(&titled("t"), &subs, &AudioSource::link("a.mp3"), &opts);

        let first = concat!(
            "<p id=\"seg-1\" class=\"transcript-segment\">",
            "<a class=\"timestamp\" href=\"#seg-1\" data-start=\"1.000\">[00:01]</a>",
            " Hello &lt;world&gt;<br>line two</p>"
        );
        let second = concat!(
            "<p id=\"seg-2\" class=\"transcript-segment\">",
            "<a class=\"timestamp\" href=\"#seg-2\" data-start=\"4.500\">[00:04]</a> </p>"
        );
        assert!(html.contains(first));
        assert!(html.contains(second));
        assert!(html.contains("{id: \"seg-2\", start: 4.500, end: 7.000},"));
        assert!(html.contains("highlighted: null,"));
    }

    #[test]
    fn start_offset_preselects_segment() {
        let opts = RenderOpts {
            start_at_ms: Some(5000),
            follow_playback: false,
            lang: "nl".to_string(),
        };

        let html = render(&titled("t"), &two_segments(), &AudioSource::link("a.mp3"), &opts);

        assert!(html.contains("<html lang=\"nl\">"));
        assert!(html.contains("<p id=\"seg-2\" class=\"transcript-segment highlight\">"));
        assert!(html.contains("<p id=\"seg-1\" class=\"transcript-segment\">"));
        assert!(html.contains("highlighted: \"seg-2\","));
        assert!(html.contains("follow: false,"));
        assert!(html.contains("startAt: 5.000,"));
    }

    #[test]
    fn page_is_self_contained() {
        let opts = RenderOpts::default();

        let html = render(&titled("t"), &two_segments(), &AudioSource::link("a.mp3"), &opts);

        assert!(!html.contains("http://"));
        assert!(!html.contains("https://"));
        assert!(!html.contains("<link"));
        assert!(!html.contains("<script src"));
        assert!(html.contains("id=\"floating-controls\""));
        assert!(html.contains("onclick=\"togglePlay()\""));
        assert!(html.contains("onclick=\"scrollToPlayer()\""));
    }
}
