//! Inline color tags.
//!
//! A tag is an upper-case name in angle brackets (`<G>`, `<LC>`) that switches the color of
//! everything after it. Names that are not color tags are kept as literal text.

use colored::{Color, Colorize};
use regex::Regex;
use std::sync::LazyLock;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([A-Z]+)>").expect("static regex must compile"));

/// Foreground color for a tag name. `L` prefixes select the bright variant.
pub fn color_for_tag(tag: &str) -> Option<Color> {
    let color = match tag {
        "B" => Color::Blue,
        "C" => Color::Cyan,
        "G" => Color::Green,
        "M" => Color::Magenta,
        "R" => Color::Red,
        "W" => Color::White,
        "Y" => Color::Yellow,
        "LB" => Color::BrightBlue,
        "LC" => Color::BrightCyan,
        "LG" => Color::BrightGreen,
        "LM" => Color::BrightMagenta,
        "LR" => Color::BrightRed,
        "LW" => Color::BrightWhite,
        "LY" => Color::BrightYellow,
        _ => return None,
    };
    Some(color)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Color(Color),
}

/// Split a tagged message into text runs and color switches.
pub fn parse(message: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut last = 0;
    for caps in TAG_RE.captures_iter(message) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            segments.push(Segment::Text(&message[last..whole.start()]));
        }
        segments.push(match color_for_tag(name.as_str()) {
            Some(color) => Segment::Color(color),
            None => Segment::Text(whole.as_str()),
        });
        last = whole.end();
    }
    if last < message.len() {
        segments.push(Segment::Text(&message[last..]));
    }
    segments
}

/// Resolve tags into ANSI colors, or strip them when `colorize` is off.
pub fn render(message: &str, colorize: bool) -> String {
    let mut out = String::with_capacity(message.len());
    let mut current = None;
    for segment in parse(message) {
        match segment {
            Segment::Color(color) => current = Some(color),
            Segment::Text(text) => match current {
                Some(color) if colorize => out.push_str(&text.color(color).to_string()),
                _ => out.push_str(text),
            },
        }
    }
    out
}
