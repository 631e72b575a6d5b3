use crate::error::SubcastError;
use crate::srt::Segment;

use nom::branch::alt;
use nom::bytes::complete::{tag, take_while_m_n};
use nom::character::complete::{digit1, space0};
use nom::combinator::{all_consuming, map_res, verify};
use nom::IResult;

pub struct Parser;
impl Parser {
    pub fn new() -> Self {
        Self {}
    }

    /// Parses a complete SRT document. Segments come back in file order;
    /// the first malformed block aborts the parse.
    pub fn parse(&mut self, input: &str) -> Result<Vec<Segment>, SubcastError> {
        let input = input.strip_prefix('\u{FEFF}').unwrap_or(input);
        blocks(input).iter().map(segment).collect()
    }
}

struct Block<'a> {
    number: usize,
    first_line: usize,
    lines: Vec<&'a str>,
}

fn blocks(input: &str) -> Vec<Block<'_>> {
    let mut blocks = Vec::new();
    let mut current: Option<Block> = None;
    for (n, line) in input.lines().enumerate() {
        if line.trim().is_empty() {
            if let Some(block) = current.take() {
                blocks.push(block);
            }
            continue;
        }
        let number = blocks.len() + 1;
        current
            .get_or_insert_with(|| Block {
                number,
                first_line: n + 1,
                lines: Vec::new(),
            })
            .lines
            .push(line);
    }
    if let Some(block) = current {
        blocks.push(block);
    }
    blocks
}

fn segment(block: &Block) -> Result<Segment, SubcastError> {
    let index_line = block.lines[0].trim();
    let index = match all_consuming(seq_num)(index_line) {
        Ok((_, index)) => index,
        Err(_) => {
            return Err(SubcastError::MalformedIndex {
                block: block.number,
                line: block.first_line,
                found: index_line.to_string(),
            })
        }
    };

    let timing_line = block.lines.get(1).map_or("", |l| l.trim());
    let (start_ms, end_ms) = match all_consuming(show_hide)(timing_line) {
        Ok((_, range)) => range,
        Err(_) => {
            return Err(SubcastError::MalformedTimestamp {
                block: block.number,
                line: block.first_line + 1,
                found: timing_line.to_string(),
            })
        }
    };

    let text = block
        .lines
        .get(2..)
        .unwrap_or(&[])
        .iter()
        .map(|l| l.trim_end().to_string())
        .collect();

    Ok(Segment {
        index,
        start_ms,
        end_ms,
        text,
    })
}

fn show_hide(input: &str) -> IResult<&str, (u64, u64)> {
    let (input, show_at) = timestamp(input)?;
    let (input, _) = space0(input)?;
    let (input, _) = tag("-->")(input)?;
    let (input, _) = space0(input)?;
    let (input, hide_at) = timestamp(input)?;
    let (input, _) = space0(input)?;

    Ok((input, (show_at, hide_at)))
}

fn timestamp(input: &str) -> IResult<&str, u64> {
    const MILLIS_MIN: usize = 0;
    const MILLIS_MAX: usize = 3;
    let take_millis = || {
        map_res(
            take_while_m_n(MILLIS_MIN, MILLIS_MAX, |c: char| c.is_ascii_digit()),
            |s: &str| {
                // `,2` is not valid SRT but shows up in the wild. Right-pad it,
                // so it reads as `,200`.
                format!("{:0<3}", s).parse::<u64>()
            },
        )
    };

    const HMS_MIN: usize = 1;
    const HMS_MAX: usize = 2;
    let take_hms = || {
        map_res(
            take_while_m_n(HMS_MIN, HMS_MAX, |c: char| c.is_ascii_digit()),
            // Left-pad: 1:13:45 means 01:13:45.
            |s: &str| format!("{:0>2}", s).parse::<u64>(),
        )
    };

    let (input, hours) = take_hms()(input)?;
    let (input, _) = tag(":")(input)?;
    let (input, minutes) = take_hms()(input)?;
    let (input, _) = tag(":")(input)?;
    let (input, seconds) = take_hms()(input)?;
    let (input, _) = alt((tag(","), tag(".")))(input)?;
    let (input, millis) = take_millis()(input)?;

    Ok((input, ((hours * 60 + minutes) * 60 + seconds) * 1000 + millis))
}

fn seq_num(input: &str) -> IResult<&str, usize> {
    // Cue numbers start at 1.
    verify(map_res(digit1, |s: &str| s.parse()), |n: &usize| *n > 0)(input)
}
