//! Build script for graphyte-host
//!
//! Validates the compiled-in graphyte.toml so a broken default never ships.

use std::fs;
use std::path::Path;

const SECTIONS: [(&str, &[&str]); 4] = [
    ("gpio", &["sysfs_root", "base", "rs", "enable", "data"]),
    (
        "timing",
        &[
            "enable_pulse_ns",
            "enable_settle_ns",
            "clear_settle_ns",
            "interlace_ms",
        ],
    ),
    ("store", &["name", "clear_on_start"]),
    ("driver", &["program", "pid_file"]),
];

fn main() {
    println!("cargo:rerun-if-changed=graphyte.toml");
    println!("cargo:rerun-if-changed=build.rs");

    let path = Path::new("graphyte.toml");
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read graphyte.toml", &[e.to_string()]),
    };

    let config: toml::Table = match content.parse() {
        Ok(table) => table,
        Err(e) => fail(
            "Invalid TOML syntax in graphyte.toml",
            &e.to_string().lines().map(str::to_owned).collect::<Vec<_>>(),
        ),
    };

    let mut errors = Vec::new();
    for (section, keys) in SECTIONS {
        let Some(table) = config.get(section).and_then(|v| v.as_table()) else {
            errors.push(format!("missing [{section}] section"));
            continue;
        };
        for key in keys {
            if !table.contains_key(*key) {
                errors.push(format!("[{section}] missing '{key}'"));
            }
        }
    }

    let data_pins = config
        .get("gpio")
        .and_then(|g| g.get("data"))
        .and_then(|d| d.as_array())
        .map(|d| d.len());
    if data_pins.is_some_and(|n| n != 4) {
        errors.push("[gpio] data must list exactly 4 pins (D4-D7)".to_owned());
    }

    let interval = config
        .get("timing")
        .and_then(|t| t.get("interlace_ms"))
        .and_then(|i| i.as_integer());
    if interval.is_some_and(|ms| ms <= 0) {
        errors.push("[timing] interlace_ms must be positive".to_owned());
    }

    if !errors.is_empty() {
        fail("Invalid graphyte.toml", &errors);
    }
}

fn fail(title: &str, lines: &[String]) -> ! {
    let body = lines
        .iter()
        .map(|line| format!("║  • {line:<62} ║"))
        .collect::<Vec<_>>()
        .join("\n");
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {title:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {body}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n"
    );
}
