//! Animation grouping from frame filenames
//!
//! Animation frames are authored as individual images named
//! `<character> <animation> <index>`, for example `hero walk 01.png` or
//! `triceratops Senior Marche 02.png`. This module parses those names,
//! accumulates decoded frames per character and animation, checks that every
//! frame of a character has the same size, and orders frames by index.
//!
//! Characters and animations keep the order in which they were first seen;
//! that order becomes the animation id enumeration in generated headers.

use image::RgbaImage;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::Rgb565;
use crate::emit::sanitize_identifier;
use crate::trim::{self, BoundingBox, TrimMode};

static FRAME_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?P<char>.+?)\s+(?P<anim>.+?)\s+(?P<idx>\d+)\s*$")
        .expect("frame name pattern is valid")
});

/// Character, animation and frame index parsed from a filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameId {
    pub character: String,
    pub animation: String,
    pub index: u32,
}

/// Result of parsing a filename stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameName {
    Frame(FrameId),
    /// The stem does not follow `<character> <animation> <index>`
    Unrecognized,
}

/// Parse a filename stem (extension already stripped).
///
/// The character name is the shortest leading run of text, the animation
/// everything up to the trailing number. An index too large for `u32` is
/// treated as unrecognized.
///
/// # Examples
///
/// ```
/// use sprite565::animation::{parse_frame_name, FrameId, FrameName};
///
/// let parsed = parse_frame_name("triceratops Senior Marche 02");
/// assert_eq!(
///     parsed,
///     FrameName::Frame(FrameId {
///         character: "triceratops".to_string(),
///         animation: "Senior Marche".to_string(),
///         index: 2,
///     })
/// );
/// assert_eq!(parse_frame_name("logo"), FrameName::Unrecognized);
/// ```
pub fn parse_frame_name(stem: &str) -> FrameName {
    let Some(caps) = FRAME_NAME.captures(stem) else {
        return FrameName::Unrecognized;
    };
    let Ok(index) = caps["idx"].parse::<u32>() else {
        return FrameName::Unrecognized;
    };
    FrameName::Frame(FrameId {
        character: caps["char"].trim().to_string(),
        animation: caps["anim"].trim().to_string(),
        index,
    })
}

/// What to do when two frames of one animation share an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateIndices {
    /// Keep both, in discovery order
    #[default]
    Keep,
    /// Fail the group
    Reject,
}

/// Most frames one animation may hold; headers store the count as `uint8_t`.
pub const MAX_FRAMES: usize = u8::MAX as usize;

/// Validation failure for one character's frames.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupError {
    /// A frame differs in size from the character's first frame
    #[error(
        "inconsistent frame size for '{character}': {animation} {index:02} is {}x{}, expected {}x{}",
        .actual.0, .actual.1, .expected.0, .expected.1
    )]
    SizeMismatch {
        character: String,
        animation: String,
        index: u32,
        expected: (u32, u32),
        actual: (u32, u32),
    },
    /// Two frames of one animation share an index
    #[error("duplicate frame index for '{character}': {animation} {index:02} appears more than once")]
    DuplicateIndex { character: String, animation: String, index: u32 },
    /// Two animations of one character map to the same C identifier
    #[error("animations '{first}' and '{second}' of '{character}' both become '{identifier}'")]
    AnimationNameCollision { character: String, first: String, second: String, identifier: String },
    /// Two characters of one group map to the same C identifier
    #[error("characters '{first}' and '{second}' both become '{identifier}'")]
    CharacterNameCollision { first: String, second: String, identifier: String },
    /// More frames than the `uint8_t` frame count can hold
    #[error("too many frames for '{character}': {animation} has {count}, at most 255 are supported")]
    TooManyFrames { character: String, animation: String, count: usize },
}

impl GroupError {
    pub fn character(&self) -> &str {
        match self {
            GroupError::SizeMismatch { character, .. } => character,
            GroupError::DuplicateIndex { character, .. } => character,
            GroupError::AnimationNameCollision { character, .. } => character,
            GroupError::CharacterNameCollision { second, .. } => second,
            GroupError::TooManyFrames { character, .. } => character,
        }
    }
}

/// One animation: a name and its frames in index order.
#[derive(Debug, Clone, PartialEq)]
pub struct Animation<F> {
    pub name: String,
    pub frames: Vec<F>,
}

/// One character: a name and its animations in first-seen order.
#[derive(Debug, Clone, PartialEq)]
pub struct Character<F> {
    pub name: String,
    pub animations: Vec<Animation<F>>,
}

impl<F> Character<F> {
    pub fn animation(&self, name: &str) -> Option<&Animation<F>> {
        self.animations.iter().find(|a| a.name == name)
    }

    pub fn frames(&self) -> impl Iterator<Item = &F> {
        self.animations.iter().flat_map(|a| a.frames.iter())
    }

    pub fn frame_count(&self) -> usize {
        self.animations.iter().map(|a| a.frames.len()).sum()
    }
}

/// A decoded frame waiting to be encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFrame {
    pub index: u32,
    pub image: RgbaImage,
}

/// Accumulates decoded frames into character → animation → frames.
///
/// Frames are kept sorted by index as they arrive; equal indices stay in
/// arrival order.
#[derive(Debug, Default)]
pub struct GroupBuilder {
    characters: Vec<Character<SourceFrame>>,
}

impl GroupBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_frame(&mut self, id: FrameId, image: RgbaImage) {
        let character = match self.characters.iter().position(|c| c.name == id.character) {
            Some(pos) => &mut self.characters[pos],
            None => {
                self.characters.push(Character { name: id.character, animations: Vec::new() });
                let last = self.characters.len() - 1;
                &mut self.characters[last]
            }
        };

        let animation = match character.animations.iter().position(|a| a.name == id.animation) {
            Some(pos) => &mut character.animations[pos],
            None => {
                character.animations.push(Animation { name: id.animation, frames: Vec::new() });
                let last = character.animations.len() - 1;
                &mut character.animations[last]
            }
        };

        let at = animation.frames.partition_point(|f| f.index <= id.index);
        animation.frames.insert(at, SourceFrame { index: id.index, image });
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    pub fn frame_count(&self) -> usize {
        self.characters.iter().map(Character::frame_count).sum()
    }

    pub fn character_names(&self) -> impl Iterator<Item = &str> {
        self.characters.iter().map(|c| c.name.as_str())
    }

    pub fn images(&self) -> impl Iterator<Item = &RgbaImage> {
        self.characters.iter().flat_map(|c| c.frames().map(|f| &f.image))
    }

    /// Crop the accumulated frames.
    ///
    /// `Union` crops each character's frames to the union of their visible
    /// bounds and returns the applied boxes in character order. `Single`
    /// crops every frame on its own and returns nothing.
    pub fn trim(&mut self, mode: TrimMode) -> Vec<BoundingBox> {
        let mut applied = Vec::new();
        for character in &mut self.characters {
            let images = character
                .animations
                .iter_mut()
                .flat_map(|a| a.frames.iter_mut())
                .map(|f| &mut f.image);
            match mode {
                TrimMode::None => {}
                TrimMode::Union => applied.extend(trim::trim_union(images)),
                TrimMode::Single => {
                    for image in images {
                        if let Some(bbox) = trim::alpha_bbox(image) {
                            *image = trim::crop(image, bbox);
                        }
                    }
                }
            }
        }
        applied
    }

    /// Check one character's frames.
    fn check_character(
        character: &Character<SourceFrame>,
        duplicates: DuplicateIndices,
    ) -> Result<(), GroupError> {
        let mut expected: Option<(u32, u32)> = None;
        let mut identifiers: Vec<(String, &str)> = Vec::with_capacity(character.animations.len());
        for animation in &character.animations {
            let identifier = sanitize_identifier(&animation.name);
            if let Some((_, first)) = identifiers.iter().find(|(id, _)| *id == identifier) {
                return Err(GroupError::AnimationNameCollision {
                    character: character.name.clone(),
                    first: first.to_string(),
                    second: animation.name.clone(),
                    identifier,
                });
            }
            identifiers.push((identifier, &animation.name));

            if animation.frames.len() > MAX_FRAMES {
                return Err(GroupError::TooManyFrames {
                    character: character.name.clone(),
                    animation: animation.name.clone(),
                    count: animation.frames.len(),
                });
            }

            for (i, frame) in animation.frames.iter().enumerate() {
                let actual = frame.image.dimensions();
                match expected {
                    None => expected = Some(actual),
                    Some(size) if size != actual => {
                        return Err(GroupError::SizeMismatch {
                            character: character.name.clone(),
                            animation: animation.name.clone(),
                            index: frame.index,
                            expected: size,
                            actual,
                        });
                    }
                    Some(_) => {}
                }
                if duplicates == DuplicateIndices::Reject
                    && i > 0
                    && animation.frames[i - 1].index == frame.index
                {
                    return Err(GroupError::DuplicateIndex {
                        character: character.name.clone(),
                        animation: animation.name.clone(),
                        index: frame.index,
                    });
                }
            }
        }
        Ok(())
    }

    /// Position and error of the first character whose identifier was
    /// already taken by an earlier one.
    fn first_name_collision(characters: &[Character<SourceFrame>]) -> Option<(usize, GroupError)> {
        let mut identifiers: Vec<(String, &str)> = Vec::with_capacity(characters.len());
        for (pos, character) in characters.iter().enumerate() {
            let identifier = sanitize_identifier(&character.name);
            if let Some((_, first)) = identifiers.iter().find(|(id, _)| *id == identifier) {
                let error = GroupError::CharacterNameCollision {
                    first: first.to_string(),
                    second: character.name.clone(),
                    identifier,
                };
                return Some((pos, error));
            }
            identifiers.push((identifier, &character.name));
        }
        None
    }

    /// Validate every character, stopping at the first failure.
    pub fn validate(&self, duplicates: DuplicateIndices) -> Result<(), GroupError> {
        for character in &self.characters {
            Self::check_character(character, duplicates)?;
        }
        match Self::first_name_collision(&self.characters) {
            Some((_, error)) => Err(error),
            None => Ok(()),
        }
    }

    /// Remove every character that fails validation and return the errors.
    ///
    /// Of two characters sharing an identifier the later one is removed.
    pub fn take_invalid(&mut self, duplicates: DuplicateIndices) -> Vec<GroupError> {
        let mut errors = Vec::new();
        self.characters.retain(|c| match Self::check_character(c, duplicates) {
            Ok(()) => true,
            Err(e) => {
                errors.push(e);
                false
            }
        });
        while let Some((pos, error)) = Self::first_name_collision(&self.characters) {
            self.characters.remove(pos);
            errors.push(error);
        }
        errors
    }

    /// The grouped frames, each animation ordered by ascending index.
    pub fn finalize(self) -> Vec<Character<SourceFrame>> {
        self.characters
    }
}

/// One encoded animation frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameRecord {
    pub character: String,
    pub animation: String,
    pub index: u32,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Rgb565>,
}

/// Encoded frames for one or more characters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationSet {
    pub characters: Vec<Character<FrameRecord>>,
}

impl AnimationSet {
    pub fn character(&self, name: &str) -> Option<&Character<FrameRecord>> {
        self.characters.iter().find(|c| c.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }
}

impl Character<FrameRecord> {
    /// Shared frame size; `None` for a character with no frames.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.frames().next().map(|f| (f.width, f.height))
    }
}
