//! Build script for pendant-firmware
//!
//! - Sets up linker search paths and scripts for memory.x
//! - Validates panel.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate panel.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=panel.toml");

    let config_path = Path::new("panel.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: panel.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a panel.toml configuration file.          ║\n\
            ║  Please create one in the pendant-firmware directory.            ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read panel.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in panel.toml                        ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_display(&config, &mut errors);
    validate_touch(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid panel configuration                              ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=panel.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Check an optional integer key against an inclusive range
fn check_range(
    table: &toml::Table,
    section: &str,
    key: &str,
    min: i64,
    max: i64,
    errors: &mut Vec<String>,
) -> Option<i64> {
    match table.get(key) {
        None => None,
        Some(toml::Value::Integer(v)) if (min..=max).contains(v) => Some(*v),
        Some(toml::Value::Integer(_)) => {
            errors.push(format!("[{}] {} must be {}-{}", section, key, min, max));
            None
        }
        Some(_) => {
            errors.push(format!("[{}] {} must be an integer", section, key));
            None
        }
    }
}

/// Check an optional string key against a fixed set of values
fn check_choice(
    table: &toml::Table,
    section: &str,
    key: &str,
    choices: &[&str],
    errors: &mut Vec<String>,
) {
    match table.get(key) {
        None => {}
        Some(toml::Value::String(s)) if choices.contains(&s.as_str()) => {}
        Some(_) => errors.push(format!(
            "[{}] {} must be one of {}",
            section,
            key,
            choices.join(", ")
        )),
    }
}

fn validate_display(config: &toml::Value, errors: &mut Vec<String>) {
    let display = match config.get("display") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            errors.push("[display] must be a table".to_string());
            return;
        }
        None => {
            errors.push("Missing [display] section".to_string());
            return;
        }
    };

    let width = check_range(display, "display", "width", 1, 320, errors);
    let height = check_range(display, "display", "height", 1, 320, errors);
    check_range(display, "display", "spi_frequency_hz", 1, 62_500_000, errors);
    check_range(display, "display", "flush_timeout_ms", 0, 10_000, errors);
    check_choice(display, "display", "color_order", &["rgb", "bgr"], errors);

    if let Some(orientation) = display.get("orientation") {
        if !matches!(orientation, toml::Value::Integer(0 | 90 | 180 | 270)) {
            errors.push("[display] orientation must be 0, 90, 180 or 270".to_string());
        }
    }

    let longest = width.unwrap_or(240).max(height.unwrap_or(320));
    check_range(display, "display", "buffer_lines", 1, longest, errors);
}

fn validate_touch(config: &toml::Value, errors: &mut Vec<String>) {
    let touch = match config.get("touch") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            errors.push("[touch] must be a table".to_string());
            return;
        }
        None => return,
    };

    check_range(touch, "touch", "spi_frequency_hz", 1, 2_500_000, errors);
    check_range(touch, "touch", "pressure_threshold", 0, 4095, errors);
    check_range(touch, "touch", "poll_interval_ms", 1, 1000, errors);
    check_choice(touch, "touch", "edge_policy", &["clamp", "discard"], errors);

    for axis in ["x", "y"] {
        let section = format!("touch.{}", axis);
        let table = match touch.get(axis) {
            Some(toml::Value::Table(t)) => t,
            Some(_) => {
                errors.push(format!("[{}] must be a table", section));
                continue;
            }
            None => continue,
        };
        let min = check_range(table, &section, "min", 0, 4095, errors);
        let max = check_range(table, &section, "max", 0, 4095, errors);
        if let (Some(min), Some(max)) = (min, max) {
            if min >= max {
                errors.push(format!("[{}] min must be below max", section));
            }
        }
        if let Some(v) = table.get("invert") {
            if !v.is_bool() {
                errors.push(format!("[{}] invert must be true or false", section));
            }
        }
    }
}
