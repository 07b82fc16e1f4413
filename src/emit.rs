//! C/C++ header generation for flash-resident sprite tables
//!
//! Generated headers target Arduino-style toolchains: every pixel table is a
//! `static const uint16_t` array marked `PROGMEM` so it stays in flash, and
//! all identifiers pass through [`sanitize_identifier`].
//!
//! Two layouts are produced:
//!
//! - **Single image**: `<name>_W`, `<name>_H`, `<name>_KEY` and the `<name>`
//!   pixel table.
//! - **Animations**: one `namespace` per character holding `W`, `H`, `KEY`,
//!   a table per frame, a frame-pointer table and count per animation, an
//!   `AnimId` enum in first-seen animation order and an `ANIMS[]` lookup
//!   table indexed by that enum.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::animation::{AnimationSet, Character, FrameRecord};
use crate::color::Rgb565;
use crate::key::ColorKey;
use crate::trim::BoundingBox;

/// Default number of pixel values per line in generated tables.
pub const DEFAULT_VALUES_PER_LINE: usize = 12;

/// Name used when sanitizing leaves nothing behind.
pub const FALLBACK_IDENTIFIER: &str = "sprite";

static NON_IDENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9_]+").expect("identifier pattern is valid"));
static UNDERSCORES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_+").expect("underscore pattern is valid"));

/// Turn a free-form name into a C identifier.
///
/// # Examples
///
/// ```
/// use sprite565::emit::sanitize_identifier;
///
/// assert_eq!(sanitize_identifier("Senior Marche"), "senior_marche");
/// assert_eq!(sanitize_identifier("  --Hero__Walk!! "), "hero_walk");
/// assert_eq!(sanitize_identifier("2nd frame"), "_2nd_frame");
/// assert_eq!(sanitize_identifier("???"), "sprite");
/// ```
pub fn sanitize_identifier(name: &str) -> String {
    let lower = name.to_lowercase();
    let replaced = NON_IDENT.replace_all(&lower, "_");
    let collapsed = UNDERSCORES.replace_all(&replaced, "_");
    let trimmed = collapsed.trim_matches('_');

    if trimmed.is_empty() {
        return FALLBACK_IDENTIFIER.to_string();
    }
    if trimmed.starts_with(|c: char| c.is_ascii_digit()) {
        return format!("_{}", trimmed);
    }
    trimmed.to_string()
}

/// Everything needed to emit a single-image header.
#[derive(Debug, Clone)]
pub struct SingleImage<'a> {
    /// Base identifier (already sanitized)
    pub name: &'a str,
    pub width: u32,
    pub height: u32,
    pub pixels: &'a [Rgb565],
    pub key: ColorKey,
    /// Crop applied to the source canvas, if any
    pub trim: Option<BoundingBox>,
    /// Some opaque pixel encodes to the key value
    pub collision: bool,
}

/// Header generator.
#[derive(Debug, Clone)]
pub struct HeaderEmitter {
    values_per_line: usize,
}

impl Default for HeaderEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl HeaderEmitter {
    pub fn new() -> Self {
        Self { values_per_line: DEFAULT_VALUES_PER_LINE }
    }

    /// Set how many values are written per table line (minimum 1).
    pub fn with_values_per_line(mut self, values_per_line: usize) -> Self {
        self.values_per_line = values_per_line.max(1);
        self
    }

    /// Write `values` as table rows with the given indent.
    fn push_table_body(&self, content: &mut String, values: &[Rgb565], indent: &str) {
        let rows: Vec<_> = values.chunks(self.values_per_line).collect();
        for (i, row) in rows.iter().enumerate() {
            let line = row.iter().map(Rgb565::to_string).collect::<Vec<_>>().join(", ");
            content.push_str(indent);
            content.push_str(&line);
            if i + 1 < rows.len() {
                content.push(',');
            }
            content.push('\n');
        }
    }

    fn push_preamble(&self, content: &mut String) {
        content.push_str("#pragma once\n");
        content.push_str("#include <Arduino.h>\n");
        content.push('\n');
    }

    /// Generate a header for one image.
    pub fn single_header(&self, image: &SingleImage<'_>) -> String {
        let name = image.name;
        let mut content = String::new();
        self.push_preamble(&mut content);

        content.push_str("// Auto-generated: image -> RGB565 (KEY transparency)\n");
        if let Some(bbox) = image.trim {
            content.push_str(&format!(
                "// Trim bbox (original): {} (right/bottom exclusive)\n",
                bbox
            ));
        }
        content.push_str(&format!("// Size: {}x{}\n", image.width, image.height));
        content.push_str(&format!("// KEY (RGB565): {}\n", image.key.value));
        if image.key.collision || image.collision {
            content.push_str("// WARNING: KEY collides with opaque pixels.\n");
        }
        content.push('\n');

        content.push_str(&format!("static const uint16_t {}_W = {};\n", name, image.width));
        content.push_str(&format!("static const uint16_t {}_H = {};\n", name, image.height));
        content.push_str(&format!("static const uint16_t {}_KEY = {};\n", name, image.key.value));
        content.push('\n');
        content.push_str(&format!(
            "static const uint16_t {name}[{name}_W * {name}_H] PROGMEM = {{\n",
            name = name
        ));
        self.push_table_body(&mut content, image.pixels, "  ");
        content.push_str("};\n");

        content
    }

    /// Generate a header holding one namespace per character of `set`,
    /// in the order the characters appear in the set.
    ///
    /// `source` names the folder or character the header was built from.
    pub fn animation_header(
        &self,
        source: &str,
        set: &AnimationSet,
        key: ColorKey,
        warning: bool,
    ) -> String {
        let mut content = String::new();
        self.push_preamble(&mut content);

        content.push_str(&format!(
            "// Auto-generated: animations '{}' -> RGB565 (KEY transparency)\n",
            source
        ));
        content.push_str(&format!("// KEY (RGB565): {}\n", key.value));
        if warning {
            content.push_str("// WARNING: KEY collides with some opaque pixels.\n");
        }
        content.push('\n');

        for character in &set.characters {
            self.push_character(&mut content, character, key);
        }

        content
    }

    fn push_character(&self, content: &mut String, character: &Character<FrameRecord>, key: ColorKey) {
        let ns = sanitize_identifier(&character.name);
        let (width, height) = character.dimensions().unwrap_or((0, 0));

        content.push_str(&format!("namespace {} {{\n", ns));
        content.push_str(&format!("  static const uint16_t W = {};\n", width));
        content.push_str(&format!("  static const uint16_t H = {};\n", height));
        content.push_str(&format!("  static const uint16_t KEY = {};\n", key.value));
        content.push('\n');

        let mut anim_ids = Vec::with_capacity(character.animations.len());
        for animation in &character.animations {
            let anim = sanitize_identifier(&animation.name);
            let prefix = format!("{}_{}", ns, anim);

            let frame_names = frame_identifiers(&prefix, &animation.frames);
            for (name, frame) in frame_names.iter().zip(&animation.frames) {
                content.push_str(&format!("  static const uint16_t {}[W * H] PROGMEM = {{\n", name));
                self.push_table_body(content, &frame.pixels, "    ");
                content.push_str("  };\n");
                content.push('\n');
            }

            content.push_str(&format!(
                "  static const uint16_t* const {}_frames[] PROGMEM = {{\n",
                prefix
            ));
            content.push_str(&format!("    {}\n", frame_names.join(", ")));
            content.push_str("  };\n");
            content.push_str(&format!(
                "  static const uint8_t {}_count = {};\n",
                prefix,
                animation.frames.len()
            ));
            content.push('\n');

            anim_ids.push((anim, prefix));
        }

        content.push_str("  enum AnimId {\n");
        for (i, (anim, _)) in anim_ids.iter().enumerate() {
            let sep = if i + 1 < anim_ids.len() { "," } else { "" };
            content.push_str(&format!("    ANIM_{}{}\n", anim.to_uppercase(), sep));
        }
        content.push_str("  };\n");
        content.push('\n');

        content.push_str("  struct AnimDesc {\n");
        content.push_str("    const uint16_t* const* frames;\n");
        content.push_str("    uint8_t count;\n");
        content.push_str("  };\n");
        content.push('\n');

        content.push_str("  static const AnimDesc ANIMS[] PROGMEM = {\n");
        for (i, (_, prefix)) in anim_ids.iter().enumerate() {
            let sep = if i + 1 < anim_ids.len() { "," } else { "" };
            content.push_str(&format!("    {{ {p}_frames, {p}_count }}{}\n", sep, p = prefix));
        }
        content.push_str("  };\n");
        content.push('\n');

        content.push_str(&format!("}} // namespace {}\n", ns));
        content.push('\n');
    }
}

/// Table identifiers for the frames of one animation: `<prefix>_<index:03>`.
///
/// A repeated index gets a `_<n>` suffix so every table stays distinct.
fn frame_identifiers(prefix: &str, frames: &[FrameRecord]) -> Vec<String> {
    let mut names = Vec::with_capacity(frames.len());
    let mut repeat = 0;
    for (i, frame) in frames.iter().enumerate() {
        let base = format!("{}_{:03}", prefix, frame.index);
        if i > 0 && frames[i - 1].index == frame.index {
            repeat += 1;
            names.push(format!("{}_{}", base, repeat));
        } else {
            repeat = 0;
            names.push(base);
        }
    }
    names
}
