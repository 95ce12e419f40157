// this_file: backends/scrawl-skia/src/fonts.rs

//! Font acquisition and outline glyph drawing.

use crate::context::RenderContext;
use crate::mono::MonoFace;
use dashmap::DashMap;
use log::{debug, warn};
use once_cell::sync::Lazy;
use owned_ttf_parser::{AsFaceRef, OwnedFace};
use scrawl_core::utils::system_font_dirs;
use scrawl_core::{FontCache, FontKey, Result, Rgba, ScrawlError, TextMeasurer};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tiny_skia::{PathBuilder, Transform};
use ttf_parser::{GlyphId, OutlineBuilder};

/// Family names that always resolve to the built-in bitmap face.
pub const BUILTIN_FAMILIES: &[&str] = &["builtin", "mono", "monospace"];

/// Paint for one glyph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphInk {
    pub fill: Rgba,
    /// Outline colour and stroke width in pixels
    pub outline: Option<(Rgba, f32)>,
}

impl GlyphInk {
    pub fn solid(fill: Rgba) -> Self {
        Self {
            fill,
            outline: None,
        }
    }
}

/// A face that can both measure and draw.
pub trait GlyphFace: TextMeasurer {
    /// Draw `ch` at `size` with its baseline origin placed by `transform`.
    fn draw_glyph(
        &self,
        ctx: &mut RenderContext,
        ch: char,
        size: f32,
        transform: Transform,
        ink: &GlyphInk,
    );
}

/// Outline builder for converting TrueType outlines to tiny-skia paths
struct SkiaOutlineBuilder {
    builder: PathBuilder,
    scale: f32,
}

impl OutlineBuilder for SkiaOutlineBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        self.builder.move_to(x * self.scale, -y * self.scale);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.builder.line_to(x * self.scale, -y * self.scale);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.builder.quad_to(
            x1 * self.scale,
            -y1 * self.scale,
            x * self.scale,
            -y * self.scale,
        );
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.builder.cubic_to(
            x1 * self.scale,
            -y1 * self.scale,
            x2 * self.scale,
            -y2 * self.scale,
            x * self.scale,
            -y * self.scale,
        );
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

/// TrueType/OpenType face with em-normalised outlines cached per character.
pub struct OutlineFace {
    family: String,
    face: OwnedFace,
    units_per_em: f32,
    outlines: DashMap<char, Option<Arc<tiny_skia::Path>>>,
}

impl OutlineFace {
    pub fn from_bytes(family: impl Into<String>, data: Vec<u8>) -> Result<Self> {
        let family = family.into();
        let face = OwnedFace::from_vec(data, 0)
            .map_err(|err| ScrawlError::font_unavailable(&family, 400, err.to_string()))?;
        let units_per_em = face.as_face_ref().units_per_em().max(1) as f32;
        Ok(Self {
            family,
            face,
            units_per_em,
            outlines: DashMap::new(),
        })
    }

    fn glyph_id(&self, ch: char) -> GlyphId {
        self.face
            .as_face_ref()
            .glyph_index(ch)
            .unwrap_or(GlyphId(0))
    }

    /// Outline at 1 px per em, y pointing down.
    fn outline(&self, ch: char) -> Option<Arc<tiny_skia::Path>> {
        if let Some(cached) = self.outlines.get(&ch) {
            return cached.value().clone();
        }
        let mut builder = SkiaOutlineBuilder {
            builder: PathBuilder::new(),
            scale: 1.0 / self.units_per_em,
        };
        let path = self
            .face
            .as_face_ref()
            .outline_glyph(self.glyph_id(ch), &mut builder)
            .and_then(|_| builder.builder.finish())
            .map(Arc::new);
        self.outlines.insert(ch, path.clone());
        path
    }
}

impl TextMeasurer for OutlineFace {
    fn family(&self) -> &str {
        &self.family
    }

    fn char_advance(&self, ch: char, size: f32) -> f32 {
        let face = self.face.as_face_ref();
        match face.glyph_index(ch).and_then(|id| face.glyph_hor_advance(id)) {
            Some(advance) => advance as f32 / self.units_per_em * size,
            None if ch.is_whitespace() => size * 0.25,
            None => face
                .glyph_hor_advance(GlyphId(0))
                .map(|advance| advance as f32 / self.units_per_em * size)
                .unwrap_or(size * 0.5),
        }
    }
}

impl GlyphFace for OutlineFace {
    fn draw_glyph(
        &self,
        ctx: &mut RenderContext,
        ch: char,
        size: f32,
        transform: Transform,
        ink: &GlyphInk,
    ) {
        let Some(path) = self.outline(ch) else {
            return;
        };
        let local = transform.pre_scale(size, size);
        ctx.fill_path(&path, ink.fill, local);
        if let Some((color, width)) = ink.outline {
            ctx.stroke_path(&path, color, width / size, local);
        }
    }
}

enum FontSource {
    Bytes(Arc<Vec<u8>>),
    File(PathBuf),
}

/// Process-wide registry of faces.
///
/// Loaded faces are cached by family and weight and never evicted.
pub struct FontLibrary {
    cache: FontCache<dyn GlyphFace>,
    registered: DashMap<String, FontSource>,
    search_dirs: Vec<PathBuf>,
    builtin: Arc<MonoFace>,
}

static SHARED: Lazy<FontLibrary> = Lazy::new(FontLibrary::new);

impl Default for FontLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl FontLibrary {
    /// Library searching the platform font directories.
    pub fn new() -> Self {
        let dirs = system_font_dirs()
            .into_iter()
            .map(|dir| PathBuf::from(shellexpand::tilde(&dir).as_ref()))
            .collect();
        Self::with_search_dirs(dirs)
    }

    pub fn with_search_dirs(search_dirs: Vec<PathBuf>) -> Self {
        Self {
            cache: FontCache::new(),
            registered: DashMap::new(),
            search_dirs,
            builtin: Arc::new(MonoFace::new()),
        }
    }

    /// Instance shared by every render in the process.
    pub fn shared() -> &'static FontLibrary {
        &SHARED
    }

    /// Register in-memory font data under `family`.
    pub fn register_bytes(&self, family: &str, data: Vec<u8>) -> Result<()> {
        OutlineFace::from_bytes(family, data.clone())?;
        self.registered
            .insert(family_key(family), FontSource::Bytes(Arc::new(data)));
        self.cache.clear_failures();
        debug!(target: "scrawl::fonts", "registered in-memory face for '{family}'");
        Ok(())
    }

    /// Register a font file under `family`. The file is read on first use.
    pub fn register_file(&self, family: &str, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ScrawlError::font_unavailable(
                family,
                400,
                format!("{} is not a file", path.display()),
            ));
        }
        self.registered
            .insert(family_key(family), FontSource::File(path.to_owned()));
        self.cache.clear_failures();
        debug!(target: "scrawl::fonts", "registered '{family}' -> {}", path.display());
        Ok(())
    }

    /// The built-in bitmap face, always available.
    pub fn builtin(&self) -> Arc<dyn GlyphFace> {
        self.builtin.clone()
    }

    /// Load `family` at `weight`, or fail with [`ScrawlError::FontUnavailable`].
    pub fn acquire(&self, family: &str, weight: u16) -> Result<Arc<dyn GlyphFace>> {
        if is_builtin(family) {
            return Ok(self.builtin());
        }
        let key = FontKey::new(family_key(family), weight);
        self.cache
            .get_or_load(&key, || {
                let face = self.load(family, weight).map_err(|err| {
                    warn!(target: "scrawl::fonts", "{err}");
                    err
                })?;
                Ok(Arc::new(face) as Arc<dyn GlyphFace>)
            })
            .map_err(|reason| ScrawlError::font_unavailable(family, weight, reason))
    }

    /// Try `family`, then `fallback`, then the built-in face.
    pub fn acquire_or_fallback(&self, family: &str, fallback: &str, weight: u16) -> Arc<dyn GlyphFace> {
        match self.acquire(family, weight) {
            Ok(face) => face,
            Err(primary) => {
                debug!(target: "scrawl::fonts", "{primary}; trying fallback '{fallback}'");
                self.acquire(fallback, weight).unwrap_or_else(|err| {
                    debug!(target: "scrawl::fonts", "{err}; using built-in face");
                    self.builtin()
                })
            }
        }
    }

    fn load(&self, family: &str, weight: u16) -> Result<OutlineFace> {
        if let Some(source) = self.registered.get(&family_key(family)) {
            let data = match &*source {
                FontSource::Bytes(bytes) => bytes.as_ref().clone(),
                FontSource::File(path) => std::fs::read(path)?,
            };
            return OutlineFace::from_bytes(family, data);
        }

        for dir in &self.search_dirs {
            for stem in candidate_stems(family, weight) {
                for ext in ["ttf", "otf", "ttc"] {
                    let font_file = dir.join(format!("{stem}.{ext}"));
                    if font_file.is_file() {
                        debug!(target: "scrawl::fonts", "loading {}", font_file.display());
                        let data = std::fs::read(&font_file)?;
                        return OutlineFace::from_bytes(family, data);
                    }
                }
            }
        }

        Err(ScrawlError::font_unavailable(
            family,
            weight,
            "not registered and not found in the font directories",
        ))
    }
}

fn family_key(family: &str) -> String {
    family.trim().to_ascii_lowercase()
}

fn is_builtin(family: &str) -> bool {
    BUILTIN_FAMILIES.contains(&family_key(family).as_str())
}

/// File stems tried for `family`, weight-specific names first.
fn candidate_stems(family: &str, weight: u16) -> Vec<String> {
    let family = family.trim();
    let compact: String = family.chars().filter(|c| !c.is_whitespace()).collect();
    let suffix = match weight {
        0..=150 => "Thin",
        151..=250 => "ExtraLight",
        251..=350 => "Light",
        351..=450 => "Regular",
        451..=550 => "Medium",
        551..=650 => "SemiBold",
        651..=750 => "Bold",
        751..=850 => "ExtraBold",
        _ => "Black",
    };
    let mut stems = vec![format!("{compact}-{suffix}")];
    if compact != family {
        stems.push(format!("{family}-{suffix}"));
    }
    stems.push(family.to_string());
    if compact != family {
        stems.push(compact);
    }
    stems
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_library() -> FontLibrary {
        FontLibrary::with_search_dirs(Vec::new())
    }

    #[test]
    fn test_builtin_names_resolve() {
        let library = empty_library();
        let face = library.acquire("Mono", 400).unwrap();
        assert_eq!(face.family(), "builtin");
    }

    #[test]
    fn test_missing_family_is_unavailable() {
        let library = empty_library();
        let err = library.acquire("Caveat", 400).err().unwrap();
        assert!(matches!(err, ScrawlError::FontUnavailable { ref family, .. } if family == "Caveat"));
    }

    #[test]
    fn test_fallback_chain_never_fails() {
        let library = empty_library();
        let face = library.acquire_or_fallback("Caveat", "Arial", 700);
        assert_eq!(face.family(), "builtin");
    }

    #[test]
    fn test_register_rejects_garbage() {
        let library = empty_library();
        assert!(library.register_bytes("Broken", vec![0, 1, 2, 3]).is_err());
        assert!(library.register_file("Ghost", "/definitely/not/here.ttf").is_err());
    }

    #[test]
    fn test_candidate_stems() {
        assert_eq!(
            candidate_stems("Homemade Apple", 700),
            vec![
                "HomemadeApple-Bold".to_string(),
                "Homemade Apple-Bold".to_string(),
                "Homemade Apple".to_string(),
                "HomemadeApple".to_string(),
            ]
        );
        assert_eq!(
            candidate_stems("Caveat", 400),
            vec!["Caveat-Regular".to_string(), "Caveat".to_string()]
        );
    }
}
