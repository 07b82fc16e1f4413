//! The image-to-header pipeline.
//!
//! [`Pipeline`] runs the pixel stages (decode, background removal, trim,
//! key selection, encode, emit) with one explicit [`Sprite565Config`]. The
//! `build_*` methods are thin adapters over it that differ only in how a
//! directory is scanned and batched:
//!
//! - [`Pipeline::build_singles`]: every image of a directory becomes its own
//!   header.
//! - [`Pipeline::build_characters`]: frames in a directory are grouped by
//!   character, one header and one key per character.
//! - [`Pipeline::build_folders`]: each subfolder is one group, one header and
//!   one key per folder.
//!
//! Groups are processed in two passes: every frame is loaded, segmented and
//! trimmed first, then a single key is chosen for the group and each frame
//! is encoded against it.

use image::RgbaImage;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

use crate::animation::{
    parse_frame_name, Animation, AnimationSet, Character, FrameId, FrameName, FrameRecord,
    GroupBuilder, GroupError,
};
use crate::background;
use crate::build::discovery::{discover_images, discover_subfolders, DiscoveryError};
use crate::build::result::{ArtifactKind, ArtifactResult, BuildReport, CharacterSummary};
use crate::config::{SizeMismatchPolicy, Sprite565Config};
use crate::decode::{self, DecodeError};
use crate::emit::{sanitize_identifier, HeaderEmitter, SingleImage};
use crate::encode::{encode_image, EncodedImage};
use crate::key::{select_key, ColorKey};
use crate::trim::{self, BoundingBox, TrimMode};

/// Subdirectory of a project root holding standalone images.
pub const SINGLE_DIR_NAME: &str = "single";
/// Subdirectory of a project root holding one folder per animation group.
pub const ANIMS_DIR_NAME: &str = "anims";
/// Default output directory, relative to a project root.
pub const OUT_DIR_NAME: &str = "generated_headers";

/// Error that stops a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// Invalid group under the `abort` size-mismatch policy
    #[error(transparent)]
    Group(#[from] GroupError),
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One converted standalone image.
#[derive(Debug, Clone)]
pub struct SingleOutput {
    /// Sanitized identifier, also the header file stem
    pub name: String,
    pub encoded: EncodedImage,
    pub key: ColorKey,
    /// Crop applied to the source canvas
    pub trim: Option<BoundingBox>,
    pub header: String,
    pub warnings: Vec<String>,
}

/// One converted animation group.
#[derive(Debug, Clone)]
pub struct GroupOutput {
    /// Encoded frames of every character that passed validation
    pub set: AnimationSet,
    pub key: ColorKey,
    /// Characters dropped under the `skip-group` policy
    pub failed: Vec<GroupError>,
    pub warnings: Vec<String>,
}

impl GroupOutput {
    /// Whether the header should carry a collision warning.
    pub fn has_collision(&self) -> bool {
        !self.warnings.is_empty()
    }

    fn summaries(&self) -> Vec<CharacterSummary> {
        self.set
            .characters
            .iter()
            .map(|c| {
                let (width, height) = c.dimensions().unwrap_or((0, 0));
                CharacterSummary {
                    name: c.name.clone(),
                    width,
                    height,
                    animations: c.animations.len(),
                    frames: c.frame_count(),
                }
            })
            .collect()
    }
}

/// Split image paths into parsed animation frames and unrecognized files.
pub fn partition_frames(paths: &[PathBuf]) -> (Vec<(FrameId, PathBuf)>, Vec<PathBuf>) {
    let mut frames = Vec::new();
    let mut unrecognized = Vec::new();

    for path in paths {
        let stem = path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
        match parse_frame_name(&stem) {
            FrameName::Frame(id) => frames.push((id, path.clone())),
            FrameName::Unrecognized => {
                tracing::warn!("{}", unrecognized_warning(path));
                unrecognized.push(path.clone());
            }
        }
    }

    (frames, unrecognized)
}

/// Image pipeline configured once per run.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: Sprite565Config,
    emitter: HeaderEmitter,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(Sprite565Config::default())
    }
}

impl Pipeline {
    pub fn new(config: Sprite565Config) -> Self {
        let emitter = HeaderEmitter::new().with_values_per_line(config.output.values_per_line);
        Self { config, emitter }
    }

    pub fn config(&self) -> &Sprite565Config {
        &self.config
    }

    /// Decode an image and clear its background when it has no
    /// transparency of its own.
    pub fn load_source(&self, path: &Path) -> Result<RgbaImage, DecodeError> {
        let mut image = decode::load_first_frame(path)?;
        let pipeline = &self.config.pipeline;

        if pipeline.auto_remove_background && !background::has_transparent_pixel(&image) {
            let cleared = background::remove_background(&mut image, pipeline.background_tolerance);
            tracing::debug!("{}: cleared {} background pixel(s)", path.display(), cleared);
        }

        Ok(image)
    }

    fn choose_key<'a, I>(&self, images: I) -> ColorKey
    where
        I: IntoIterator<Item = &'a RgbaImage>,
    {
        let pipeline = &self.config.pipeline;
        select_key(images, &pipeline.key_candidates, pipeline.alpha_threshold)
    }

    fn key_warning(&self, key: ColorKey) -> Option<String> {
        key.collision.then(|| {
            format!(
                "every key candidate is used by an opaque pixel; using {}, matching pixels will render transparent",
                key.value
            )
        })
    }

    /// Convert one standalone image into a header.
    pub fn convert_single(&self, path: &Path) -> Result<SingleOutput, PipelineError> {
        let pipeline = &self.config.pipeline;
        let stem = path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
        let name = sanitize_identifier(&stem);

        let image = self.load_source(path)?;
        let (image, trim) = match pipeline.trim_single {
            TrimMode::None => (image, None),
            TrimMode::Single | TrimMode::Union => trim::trim_single(image),
        };

        let key = self.choose_key([&image]);
        let encoded = encode_image(&image, key, pipeline.alpha_threshold);

        let mut warnings: Vec<String> = self.key_warning(key).into_iter().collect();
        if encoded.collision && !key.collision {
            warnings.push(format!("opaque pixels encode to KEY {}", key.value));
        }

        let header = self.emitter.single_header(&SingleImage {
            name: &name,
            width: encoded.width,
            height: encoded.height,
            pixels: &encoded.pixels,
            key,
            trim,
            collision: encoded.collision,
        });

        Ok(SingleOutput { name, encoded, key, trim, header, warnings })
    }

    /// Convert parsed frames into one animation group sharing a key.
    ///
    /// Under the `abort` policy the first invalid character is returned as
    /// an error; under `skip-group` it is dropped and listed in
    /// [`GroupOutput::failed`].
    pub fn convert_group(&self, frames: Vec<(FrameId, PathBuf)>) -> Result<GroupOutput, PipelineError> {
        let pipeline = &self.config.pipeline;

        let mut builder = GroupBuilder::new();
        for (id, path) in frames {
            let image = self.load_source(&path)?;
            builder.add_frame(id, image);
        }
        tracing::debug!("loaded {} frame(s)", builder.frame_count());

        for bbox in builder.trim(pipeline.trim_animations) {
            tracing::debug!("union trim: {}", bbox);
        }

        let failed = match pipeline.on_size_mismatch {
            SizeMismatchPolicy::Abort => {
                builder.validate(pipeline.duplicate_indices)?;
                Vec::new()
            }
            SizeMismatchPolicy::SkipGroup => builder.take_invalid(pipeline.duplicate_indices),
        };
        for error in &failed {
            tracing::error!("{}", error);
        }

        let key = self.choose_key(builder.images());

        let mut collided_frames = 0;
        let mut characters = Vec::new();
        for character in builder.finalize() {
            let mut animations = Vec::with_capacity(character.animations.len());
            for animation in character.animations {
                let mut records = Vec::with_capacity(animation.frames.len());
                for frame in animation.frames {
                    let encoded = encode_image(&frame.image, key, pipeline.alpha_threshold);
                    if encoded.collision {
                        collided_frames += 1;
                    }
                    records.push(FrameRecord {
                        character: character.name.clone(),
                        animation: animation.name.clone(),
                        index: frame.index,
                        width: encoded.width,
                        height: encoded.height,
                        pixels: encoded.pixels,
                    });
                }
                animations.push(Animation { name: animation.name, frames: records });
            }
            characters.push(Character { name: character.name, animations });
        }

        let mut warnings: Vec<String> = self.key_warning(key).into_iter().collect();
        if collided_frames > 0 && !key.collision {
            warnings.push(format!("{} frame(s) contain opaque pixels equal to KEY {}", collided_frames, key.value));
        }

        Ok(GroupOutput { set: AnimationSet { characters }, key, failed, warnings })
    }

    /// Render a converted group as a header.
    pub fn group_header(&self, source: &str, group: &GroupOutput) -> String {
        self.emitter.animation_header(source, &group.set, group.key, group.has_collision())
    }

    /// One header per image in `dir`, named `<image>.h`.
    pub fn build_singles(&self, dir: &Path, out_dir: &Path) -> Result<BuildReport, PipelineError> {
        let start = Instant::now();
        let mut report = BuildReport::new();
        self.singles_into(dir, out_dir, &mut report)?;
        Ok(report.with_duration(start.elapsed()))
    }

    fn singles_into(&self, dir: &Path, out_dir: &Path, report: &mut BuildReport) -> Result<(), PipelineError> {
        let files = discover_images(dir)?;
        if files.is_empty() {
            tracing::info!("no images in {}", dir.display());
        }

        for path in files {
            let single = self.convert_single(&path)?;
            let file_name = format!("{}.h", single.name);
            let Some(target) = claim_output(report, out_dir, &file_name, &single.name, ArtifactKind::Single)
            else {
                continue;
            };
            let output = write_header(&target, &single.header)?;

            for warning in &single.warnings {
                tracing::warn!("{}: {}", single.name, warning);
            }
            tracing::info!(
                "{} -> {} ({}x{}, key {})",
                path.display(),
                output.display(),
                single.encoded.width,
                single.encoded.height,
                single.key.value
            );

            report.add_result(
                ArtifactResult::success(single.name, ArtifactKind::Single, output, single.key.value)
                    .with_size(single.encoded.width, single.encoded.height)
                    .with_warnings(single.warnings),
            );
        }

        Ok(())
    }

    /// One header per character found among the frames in `dir`, named
    /// `<character>_anims_<W>x<H>.h`. Each character gets its own key.
    ///
    /// Frames are batched by sanitized character name, so `Hero` and `hero`
    /// land in one batch and are reported as a name collision.
    pub fn build_characters(&self, dir: &Path, out_dir: &Path) -> Result<BuildReport, PipelineError> {
        let start = Instant::now();
        let mut report = BuildReport::new();

        let files = discover_images(dir)?;
        let (frames, unrecognized) = partition_frames(&files);
        report.unrecognized = unrecognized;

        let mut by_character: Vec<(String, Vec<(FrameId, PathBuf)>)> = Vec::new();
        for (id, path) in frames {
            let identifier = sanitize_identifier(&id.character);
            match by_character.iter_mut().find(|(name, _)| *name == identifier) {
                Some((_, list)) => list.push((id, path)),
                None => by_character.push((identifier, vec![(id, path)])),
            }
        }

        for (identifier, frames) in by_character {
            let group = self.convert_group(frames)?;
            for error in &group.failed {
                report.add_result(ArtifactResult::failed(
                    error.character().to_string(),
                    ArtifactKind::Character,
                    error.to_string(),
                ));
            }
            let Some(character) = group.set.characters.first() else {
                continue;
            };
            let name = character.name.clone();

            let (width, height) = character.dimensions().unwrap_or((0, 0));
            let file_name = format!("{}_anims_{}x{}.h", identifier, width, height);
            let Some(target) = claim_output(&mut report, out_dir, &file_name, &name, ArtifactKind::Character)
            else {
                continue;
            };
            let output = write_header(&target, &self.group_header(&name, &group))?;

            for warning in &group.warnings {
                tracing::warn!("{}: {}", name, warning);
            }
            tracing::info!("{} -> {} (key {})", name, output.display(), group.key.value);

            report.add_result(
                ArtifactResult::success(name, ArtifactKind::Character, output, group.key.value)
                    .with_characters(group.summaries())
                    .with_warnings(group.warnings),
            );
        }

        Ok(report.with_duration(start.elapsed()))
    }

    /// One header per subfolder of `dir`, named `<folder>.h`, holding every
    /// character of the folder ordered by lower-cased name. Each folder gets
    /// one key.
    pub fn build_folders(&self, dir: &Path, out_dir: &Path) -> Result<BuildReport, PipelineError> {
        let start = Instant::now();
        let mut report = BuildReport::new();
        self.folders_into(dir, out_dir, &mut report)?;
        Ok(report.with_duration(start.elapsed()))
    }

    fn folders_into(&self, dir: &Path, out_dir: &Path, report: &mut BuildReport) -> Result<(), PipelineError> {
        let folders = discover_subfolders(dir)?;
        if folders.is_empty() {
            tracing::info!("no animation folders in {}", dir.display());
        }

        for folder in folders {
            let folder_name =
                folder.file_name().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();

            let files = discover_images(&folder)?;
            let (frames, unrecognized) = partition_frames(&files);
            let skipped: Vec<String> = unrecognized.iter().map(|p| unrecognized_warning(p)).collect();
            report.unrecognized.extend(unrecognized);
            if frames.is_empty() {
                tracing::info!("{}: no recognized frames", folder_name);
                continue;
            }

            let mut group = self.convert_group(frames)?;
            group.set.characters.sort_by_key(|c| c.name.to_lowercase());

            for error in &group.failed {
                report.add_result(ArtifactResult::failed(
                    format!("{}/{}", folder_name, error.character()),
                    ArtifactKind::Character,
                    error.to_string(),
                ));
            }
            if group.set.is_empty() {
                continue;
            }

            let file_name = format!("{}.h", sanitize_identifier(&folder_name));
            let Some(target) = claim_output(report, out_dir, &file_name, &folder_name, ArtifactKind::Folder)
            else {
                continue;
            };
            let output = write_header(&target, &self.group_header(&folder_name, &group))?;

            for warning in &group.warnings {
                tracing::warn!("{}: {}", folder_name, warning);
            }
            tracing::info!("{} -> {} (key {})", folder_name, output.display(), group.key.value);

            let characters = group.summaries();
            let mut warnings = group.warnings;
            warnings.extend(skipped);
            report.add_result(
                ArtifactResult::success(folder_name, ArtifactKind::Folder, output, group.key.value)
                    .with_characters(characters)
                    .with_warnings(warnings),
            );
        }

        Ok(())
    }

    /// Build a project root: `single/` through [`Self::build_singles`] and
    /// `anims/` through [`Self::build_folders`]. A missing subdirectory is
    /// skipped. Output defaults to `<root>/generated_headers`.
    ///
    /// Both stages share one report, so a folder header cannot overwrite a
    /// single-image header of the same name.
    pub fn build_project(&self, root: &Path, out_dir: Option<&Path>) -> Result<BuildReport, PipelineError> {
        let start = Instant::now();
        let out_dir = out_dir.map(Path::to_path_buf).unwrap_or_else(|| root.join(OUT_DIR_NAME));
        let mut report = BuildReport::new();

        let single_dir = root.join(SINGLE_DIR_NAME);
        if single_dir.is_dir() {
            self.singles_into(&single_dir, &out_dir, &mut report)?;
        } else {
            tracing::info!("'{}' not found, skipping single images", single_dir.display());
        }

        let anims_dir = root.join(ANIMS_DIR_NAME);
        if anims_dir.is_dir() {
            self.folders_into(&anims_dir, &out_dir, &mut report)?;
        } else {
            tracing::info!("'{}' not found, skipping animations", anims_dir.display());
        }

        Ok(report.with_duration(start.elapsed()))
    }
}

fn unrecognized_warning(path: &Path) -> String {
    let file = path.file_name().map(|s| s.to_string_lossy()).unwrap_or_default();
    format!("skipped '{}': name is not '<character> <animation> <index>'", file)
}

/// Reserve `out_dir/file_name` for one artifact of this run.
///
/// A path already written earlier in the run is not overwritten; the
/// artifact is recorded as failed instead and `None` is returned.
fn claim_output(
    report: &mut BuildReport,
    out_dir: &Path,
    file_name: &str,
    source: &str,
    kind: ArtifactKind,
) -> Option<PathBuf> {
    let path = out_dir.join(file_name);
    let Some(owner) = report.artifacts.iter().find(|a| a.output.as_deref() == Some(path.as_path())) else {
        return Some(path);
    };

    let message = format!("'{}' was already written for '{}'", path.display(), owner.source);
    tracing::error!("{}: {}", source, message);
    report.add_result(ArtifactResult::failed(source.to_string(), kind, message));
    None
}

/// Write `content` to `path`, creating its directory if needed.
fn write_header(path: &Path, content: &str) -> Result<PathBuf, PipelineError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|source| PipelineError::Write { path: parent.to_path_buf(), source })?;
    }
    fs::write(path, content).map_err(|source| PipelineError::Write { path: path.to_path_buf(), source })?;
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb565;
    use image::Rgba;
    use tempfile::TempDir;

    fn save(dir: &Path, name: &str, image: &RgbaImage) -> PathBuf {
        let path = dir.join(name);
        image.save(&path).expect("should save fixture");
        path
    }

    #[test]
    fn test_partition_frames() {
        let paths = vec![
            PathBuf::from("hero walk 1.png"),
            PathBuf::from("logo.png"),
            PathBuf::from("hero walk 2.png"),
        ];
        let (frames, unrecognized) = partition_frames(&paths);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].0.index, 1);
        assert_eq!(unrecognized, vec![PathBuf::from("logo.png")]);
    }

    #[test]
    fn test_convert_single_opaque_red() {
        let temp = TempDir::new().unwrap();
        let path = save(temp.path(), "Red Box.png", &RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255])));

        let single = Pipeline::default().convert_single(&path).unwrap();
        assert_eq!(single.name, "red_box");
        assert_eq!(single.key.value, Rgb565(0xF81F));
        assert_eq!(single.encoded.pixels, vec![Rgb565(0xF800); 16]);
        assert!(!single.encoded.collision);
        assert!(single.warnings.is_empty());
        assert!(single.header.contains("red_box_W = 4;"));
    }

    #[test]
    fn test_convert_single_trims_removed_background() {
        let temp = TempDir::new().unwrap();
        let mut img = RgbaImage::from_pixel(6, 6, Rgba([255, 255, 255, 255]));
        img.put_pixel(2, 3, Rgba([0, 0, 255, 255]));
        img.put_pixel(3, 3, Rgba([0, 0, 255, 255]));
        let path = save(temp.path(), "dot.png", &img);

        let single = Pipeline::default().convert_single(&path).unwrap();
        assert_eq!((single.encoded.width, single.encoded.height), (2, 1));
        assert_eq!(single.trim, Some(BoundingBox { x0: 2, y0: 3, x1: 4, y1: 4 }));
        assert_eq!(single.key.value, Rgb565(0xF81F));
        assert_eq!(single.encoded.pixels, vec![Rgb565(0x001F); 2]);
    }

    #[test]
    fn test_convert_single_without_trim_or_segmentation() {
        let temp = TempDir::new().unwrap();
        let mut img = RgbaImage::from_pixel(3, 3, Rgba([255, 255, 255, 255]));
        img.put_pixel(1, 1, Rgba([0, 0, 0, 255]));
        let path = save(temp.path(), "plain.png", &img);

        let mut config = Sprite565Config::default();
        config.pipeline.auto_remove_background = false;
        config.pipeline.trim_single = TrimMode::None;

        let single = Pipeline::new(config).convert_single(&path).unwrap();
        assert_eq!((single.encoded.width, single.encoded.height), (3, 3));
        assert_eq!(single.encoded.pixels.iter().filter(|p| p.value() == 0xFFFF).count(), 8);
        assert!(single.trim.is_none());
    }

    #[test]
    fn test_convert_group_shares_one_key() {
        let temp = TempDir::new().unwrap();
        // the first frame uses magenta, so the whole group must move on to green
        let magenta = save(temp.path(), "hero walk 1.png", &RgbaImage::from_pixel(2, 2, Rgba([255, 0, 255, 255])));
        let red = save(temp.path(), "hero walk 2.png", &RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255])));

        let (frames, _) = partition_frames(&[magenta, red]);
        let group = Pipeline::default().convert_group(frames).unwrap();
        assert_eq!(group.key.value, Rgb565(0x07E0));
        assert!(group.failed.is_empty());
        assert!(!group.has_collision());

        let hero = group.set.character("hero").unwrap();
        let walk = hero.animation("walk").unwrap();
        assert_eq!(walk.frames[0].pixels, vec![Rgb565(0xF81F); 4]);
        assert_eq!(walk.frames[1].pixels, vec![Rgb565(0xF800); 4]);
    }

    #[test]
    fn test_convert_group_abort_on_mismatch() {
        let temp = TempDir::new().unwrap();
        let a = save(temp.path(), "hero walk 1.png", &RgbaImage::from_pixel(8, 8, Rgba([9, 9, 9, 255])));
        let b = save(temp.path(), "hero walk 2.png", &RgbaImage::from_pixel(8, 9, Rgba([9, 9, 9, 255])));

        let (frames, _) = partition_frames(&[a, b]);
        let err = Pipeline::default().convert_group(frames).unwrap_err();
        assert!(matches!(err, PipelineError::Group(GroupError::SizeMismatch { index: 2, .. })));
    }

    #[test]
    fn test_write_header_creates_directory() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("deep").join("out").join("x.h");
        let path = write_header(&target, "#pragma once\n").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "#pragma once\n");
    }
}
