use crate::srt::Segment;

use anyhow::{Context, Result};
use log::debug;
use regex::Regex;

pub struct ProcessOpts {
    pub strip_markup: bool,
}

pub fn process(subs: Vec<Segment>, opts: &ProcessOpts) -> Result<Vec<Segment>> {
    let subs = if opts.strip_markup {
        strip_markup(subs)?
    } else {
        subs
    };
    Ok(tidy_lines(subs))
}

fn strip_markup(subs: Vec<Segment>) -> Result<Vec<Segment>> {
    // Matches HTML-style tags (<i>, </font>, <font color="...">) and
    // ASS override blocks ({\an8}, {\i1}).
    let markup =
        Regex::new(r#"</?[A-Za-z][^<>]*>|\{\\[^{}]*\}"#).context("Invalid markup regex.")?;

    let subs = subs
        .into_iter()
        .map(|mut sub| {
            for line in sub.text.iter_mut() {
                if markup.is_match(line) {
                    let stripped = markup.replace_all(line, "").into_owned();
                    debug!(
                        "Stripped markup from cue {}: '{}' -> '{}'",
                        sub.index, line, stripped
                    );
                    *line = stripped;
                }
            }
            sub
        })
        .collect();
    Ok(subs)
}

fn tidy_lines(subs: Vec<Segment>) -> Vec<Segment> {
    subs.into_iter()
        .map(|mut sub| {
            sub.text = sub
                .text
                .iter()
                .map(|line| line.trim())
                .filter(|line| !line.is_empty())
                .map(String::from)
                .collect();
            sub
        })
        .collect()
}
