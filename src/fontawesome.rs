//! Font Awesome helpers behind the `awesome` and `parse` subcommands.
//!
//! [`download_styles`] fetches the `all.css` stylesheet shipped with Font
//! Awesome, [`parse_styles`] turns it into a `name → glyph` table in the
//! shape of `fa-icons.yaml`, and [`find_fonts`] lists the Font Awesome fonts
//! fontconfig knows about.

use log::{debug, info, warn};
use regex::Regex;
use std::collections::BTreeMap;
use std::process::Command;
use std::time::Duration;

/// Where `parse` fetches the stylesheet from by default.
pub const DEFAULT_STYLES_URL: &str = "https://github.com/FortAwesome/Font-Awesome/raw/6.x/css/all.css";

/// Upper bound for the whole download, connect included.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from the Font Awesome helpers.
#[derive(Debug, thiserror::Error)]
pub enum FontAwesomeError {
    #[error("failed to run fc-list: {0}")]
    FcList(std::io::Error),
    #[error("fc-list exited with {0}")]
    FcListStatus(std::process::ExitStatus),
    #[error("failed to download {url}: {reason}")]
    Download { url: String, reason: String },
    #[error("failed to encode glyph table: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to encode glyph table: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Fetch the stylesheet at `url`, giving up after [`DOWNLOAD_TIMEOUT`].
pub fn download_styles(url: &str) -> Result<String, FontAwesomeError> {
    let failed = |reason: String| FontAwesomeError::Download {
        url: url.to_string(),
        reason,
    };
    info!("downloading {}", url);
    let agent = ureq::AgentBuilder::new().timeout(DOWNLOAD_TIMEOUT).build();
    let response = agent.get(url).call().map_err(|e| failed(e.to_string()))?;
    let css = response.into_string().map_err(|e| failed(e.to_string()))?;
    debug!("downloaded {} byte(s)", css.len());
    Ok(css)
}

/// Matches one `.fa-<name> { --fa: "\<hex>"` rule.
const STYLE_PATTERN: &str = r#"\.fa-([a-zA-Z0-9\-]+)\s*\{\s*--fa:\s*"\\([a-fA-F0-9]+)""#;

/// Extract every icon name and its glyph from a Font Awesome stylesheet.
///
/// Rules whose code point is not a valid `char` are skipped.
pub fn parse_styles(css: &str) -> BTreeMap<String, String> {
    let re = match Regex::new(STYLE_PATTERN) {
        Ok(re) => re,
        Err(e) => {
            warn!("bad font awesome pattern: {}", e);
            return BTreeMap::new();
        }
    };

    let mut glyphs = BTreeMap::new();
    for caps in re.captures_iter(css) {
        let name = &caps[1];
        let glyph = u32::from_str_radix(&caps[2], 16)
            .ok()
            .and_then(char::from_u32);
        match glyph {
            Some(c) => {
                glyphs.insert(name.to_string(), c.to_string());
            }
            None => warn!("skipping {}: invalid code point {}", name, &caps[2]),
        }
    }
    debug!("parsed {} font awesome glyph(s)", glyphs.len());
    glyphs
}

/// Render a glyph table as `fa-icons.yaml`.
pub fn to_yaml(glyphs: &BTreeMap<String, String>) -> Result<String, FontAwesomeError> {
    Ok(serde_yaml::to_string(glyphs)?)
}

/// Render a glyph table as pretty-printed JSON.
pub fn to_json(glyphs: &BTreeMap<String, String>) -> Result<String, FontAwesomeError> {
    Ok(serde_json::to_string_pretty(glyphs)?)
}

/// Installed Font Awesome fonts, as reported by `fc-list`, sorted.
pub fn find_fonts() -> Result<Vec<String>, FontAwesomeError> {
    let output = Command::new("fc-list")
        .output()
        .map_err(FontAwesomeError::FcList)?;
    if !output.status.success() {
        return Err(FontAwesomeError::FcListStatus(output.status));
    }
    Ok(awesome_lines(&String::from_utf8_lossy(&output.stdout)))
}

fn awesome_lines(listing: &str) -> Vec<String> {
    let mut fonts: Vec<String> = listing
        .lines()
        .filter(|line| line.contains("Awesome"))
        .map(str::to_string)
        .collect();
    fonts.sort();
    fonts
}
