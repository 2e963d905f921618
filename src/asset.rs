//! Loading frames from disk.
//!
//! Assets are looked up by name in an [`AssetTable`] the caller fills in,
//! paths are relative to the table root.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use hashbrown::HashMap;
use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::{
    animation::Animation,
    image::Image,
    sheet::{self, SheetSpec},
    timeline::Frame,
};

#[derive(Debug, Default, Clone)]
pub struct AssetTable {
    root: PathBuf,
    paths: HashMap<String, PathBuf>,
}

impl AssetTable {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_owned(),
            paths: HashMap::default(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Register `name`, returns the previous path
    pub fn insert<S, P>(&mut self, name: S, path: P) -> Option<PathBuf>
    where
        S: Into<String>,
        P: AsRef<Path>,
    {
        self.paths.insert(name.into(), path.as_ref().to_owned())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.paths.contains_key(name)
    }

    /// Full path of `name`
    pub fn path(&self, name: &str) -> Result<PathBuf> {
        let path = self
            .paths
            .get(name)
            .ok_or_else(|| anyhow!("Unknown asset {name}"))?;
        Ok(self.root.join(path))
    }

    fn load_pixels(&self, name: &str) -> Result<RgbaImage> {
        let path = self.path(name)?;
        let pixels = image::open(&path)
            .with_context(|| format!("Failed to load image {}", path.display()))?
            .into_rgba8();
        log::debug!(
            "Loaded {name} from {} ({}x{})",
            path.display(),
            pixels.width(),
            pixels.height()
        );
        Ok(pixels)
    }

    pub fn load_image(&self, name: &str) -> Result<Image> {
        self.load_pixels(name).map(Image::new)
    }

    /// Load the sheet `name` and cut it into frames
    pub fn load_sheet(&self, name: &str, spec: &SheetSpec) -> Result<Vec<Image>> {
        let pixels = self.load_pixels(name)?;
        let layout = spec
            .layout()
            .with_context(|| format!("Bad layout for sheet {name}"))?;
        let frames = sheet::extract_frames(&pixels, &layout)
            .with_context(|| format!("Failed to slice sheet {name}"))?;
        Ok(frames)
    }
}

fn default_loop() -> bool {
    true
}

fn default_rate() -> f64 {
    1.0
}

/// Animation as written in a definition file
///
/// ```json
/// { "sheet": "hero", "rows": 1, "cols": 4, "duration": 0.1, "loop": true }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationDef {
    /// Asset name of the sprite sheet
    pub sheet: String,
    #[serde(flatten)]
    pub layout: SheetSpec,
    /// Same duration for every frame
    #[serde(default)]
    pub duration: Option<f64>,
    /// One duration per frame
    #[serde(default)]
    pub durations: Option<Vec<f64>>,
    #[serde(rename = "loop", default = "default_loop")]
    pub looping: bool,
    #[serde(default = "default_rate")]
    pub rate: f64,
}

impl AnimationDef {
    fn frame_durations(&self, frames: usize) -> Result<Vec<f64>> {
        match (self.duration, &self.durations) {
            (Some(duration), None) => Ok(vec![duration; frames]),
            (None, Some(durations)) => {
                if durations.len() != frames {
                    bail!(
                        "Sheet {} has {frames} frames but {} durations were given",
                        self.sheet,
                        durations.len()
                    );
                }
                Ok(durations.clone())
            }
            _ => bail!("Expected exactly one of duration or durations"),
        }
    }

    fn build_from(&self, images: Vec<Image>) -> Result<Animation> {
        let durations = self.frame_durations(images.len())?;
        let frames = images
            .into_iter()
            .zip(durations)
            .map(|(image, duration)| Frame::new(image, duration));
        let mut animation = Animation::new(frames, self.looping)?;
        animation.set_rate(self.rate, Some(0.0))?;
        Ok(animation)
    }

    pub fn build(&self, assets: &AssetTable) -> Result<Animation> {
        let images = assets.load_sheet(&self.sheet, &self.layout)?;
        self.build_from(images)
    }
}

/// Named animation definitions, usually one JSON file per character
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnimationSet {
    pub animations: HashMap<String, AnimationDef>,
}

impl AnimationSet {
    pub fn from_json(json: &str) -> Result<Self> {
        let set: Self = serde_json::from_str(json).context("Failed to parse animation set")?;
        Ok(set)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("In {}", path.display()))
    }

    /// Build every animation, sheets shared by several definitions are
    /// decoded once
    pub fn build(&self, assets: &AssetTable) -> Result<HashMap<String, Animation>> {
        let mut sheets: HashMap<&str, RgbaImage> = HashMap::default();
        let mut animations = HashMap::with_capacity(self.animations.len());
        for (name, def) in &self.animations {
            if !sheets.contains_key(def.sheet.as_str()) {
                let pixels = assets.load_pixels(&def.sheet)?;
                sheets.insert(def.sheet.as_str(), pixels);
            }
            let pixels = &sheets[def.sheet.as_str()];
            let layout = def
                .layout
                .layout()
                .with_context(|| format!("Bad layout for animation {name}"))?;
            let images = sheet::extract_frames(pixels, &layout)
                .with_context(|| format!("Failed to slice sheet for animation {name}"))?;
            let animation = def
                .build_from(images)
                .with_context(|| format!("Failed to build animation {name}"))?;
            animations.insert(name.clone(), animation);
        }
        log::debug!(
            "Built {} animations from {} sheets",
            animations.len(),
            sheets.len()
        );
        Ok(animations)
    }
}
