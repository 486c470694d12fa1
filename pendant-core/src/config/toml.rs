//! Minimal TOML reader for `panel.toml`
//!
//! Handles only the subset the panel file uses. Arrays, inline tables,
//! floats and dates are NOT supported.
//!
//! Supported features:
//! - Key = value pairs (string, integer, boolean)
//! - Integers with `_` digit separators
//! - [section] and [section.subsection] headers
//! - Comments (# ...)
//!
//! Unknown sections and keys are skipped so newer files still boot on older
//! firmware.

use heapless::String as HString;

use super::types::{ConfigError, PanelConfig};
use crate::geometry::{ColorOrder, Orientation};
use crate::touch::{AxisCalibration, EdgePolicy};

/// Parse error, with the 1-based line it occurred on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Malformed section header
    InvalidSection { line: u32 },
    /// Line is neither a header nor `key = value`
    InvalidLine { line: u32 },
    /// Value has the wrong type or is out of range
    InvalidValue { line: u32 },
    /// Parsed, but the values are inconsistent
    Invalid(ConfigError),
}

impl From<ConfigError> for ParseError {
    fn from(e: ConfigError) -> Self {
        ParseError::Invalid(e)
    }
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Display,
    Touch,
    TouchX,
    TouchY,
    Unknown,
}

/// Parse and validate `panel.toml`
///
/// Missing keys keep their [`PanelConfig::default`] values.
pub fn parse_config(input: &str) -> Result<PanelConfig, ParseError> {
    let mut config = PanelConfig::default();
    let mut section = Section::Root;

    for (idx, line) in input.lines().enumerate() {
        let line_no = idx as u32 + 1;
        let line = strip_comment(line).trim();

        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') {
            if !line.ends_with(']') || line.len() < 3 {
                return Err(ParseError::InvalidSection { line: line_no });
            }
            section = parse_section_header(&line[1..line.len() - 1]);
            continue;
        }

        let (key, value) =
            parse_key_value(line).ok_or(ParseError::InvalidLine { line: line_no })?;
        apply_value(section, key, value, &mut config)
            .map_err(|()| ParseError::InvalidValue { line: line_no })?;
    }

    config.validate()?;
    Ok(config)
}

fn parse_section_header(header: &str) -> Section {
    match header.trim() {
        "display" => Section::Display,
        "touch" => Section::Touch,
        "touch.x" => Section::TouchX,
        "touch.y" => Section::TouchY,
        _ => Section::Unknown,
    }
}

/// Drop a trailing comment, unless the `#` sits inside a string
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = value.trim();
    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key, value))
}

fn parse_string(value: &str) -> Result<&str, ()> {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .ok_or(())
}

fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ()> {
    if !value.contains('_') {
        return value.parse().map_err(|_| ());
    }
    let mut digits: HString<24> = HString::new();
    for c in value.chars().filter(|&c| c != '_') {
        digits.push(c)?;
    }
    digits.parse().map_err(|_| ())
}

fn parse_bool(value: &str) -> Result<bool, ()> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(()),
    }
}

fn parse_orientation(value: &str) -> Result<Orientation, ()> {
    Orientation::from_degrees(parse_int(value)?).ok_or(())
}

fn parse_color_order(value: &str) -> Result<ColorOrder, ()> {
    match parse_string(value)? {
        "rgb" => Ok(ColorOrder::Rgb),
        "bgr" => Ok(ColorOrder::Bgr),
        _ => Err(()),
    }
}

fn apply_axis(axis: &mut AxisCalibration, key: &str, value: &str) -> Result<(), ()> {
    match key {
        "min" => axis.min = parse_int(value)?,
        "max" => axis.max = parse_int(value)?,
        "invert" => axis.invert = parse_bool(value)?,
        _ => {}
    }
    Ok(())
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut PanelConfig,
) -> Result<(), ()> {
    match section {
        Section::Display => {
            let d = &mut config.display;
            match key {
                "width" => d.width = parse_int(value)?,
                "height" => d.height = parse_int(value)?,
                "orientation" => d.orientation = parse_orientation(value)?,
                "color_order" => d.color_order = parse_color_order(value)?,
                "spi_frequency_hz" => d.spi_frequency_hz = parse_int(value)?,
                "buffer_lines" => d.buffer_lines = parse_int(value)?,
                "flush_timeout_ms" => d.flush_timeout_ms = parse_int(value)?,
                "backlight" => d.backlight = parse_bool(value)?,
                _ => {}
            }
        }
        Section::Touch => {
            let t = &mut config.touch;
            match key {
                "spi_frequency_hz" => t.spi_frequency_hz = parse_int(value)?,
                "edge_policy" => {
                    t.calibration.edge_policy =
                        EdgePolicy::from_name(parse_string(value)?).ok_or(())?;
                }
                "pressure_threshold" => t.calibration.pressure_threshold = parse_int(value)?,
                "poll_interval_ms" => t.poll_interval_ms = parse_int(value)?,
                _ => {}
            }
        }
        Section::TouchX => apply_axis(&mut config.touch.calibration.x, key, value)?,
        Section::TouchY => apply_axis(&mut config.touch.calibration.y, key, value)?,
        Section::Root | Section::Unknown => {}
    }
    Ok(())
}
