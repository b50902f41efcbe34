//! Image transform parameters.
//!
//! Query keys outside the allow-list are ignored, as are values that fail to
//! parse. A `preset=<name>` key expands a configured preset first; explicit
//! keys override the preset's values.
//!
//! | Key    | Meaning                                   |
//! |--------|-------------------------------------------|
//! | `w`    | width in pixels                           |
//! | `h`    | height in pixels                          |
//! | `fit`  | `cover`, `contain`, `fill`, `inside`, `outside` |
//! | `q`    | quality, 1-100                            |
//! | `fm`   | output format: `webp`, `avif`, `jpeg`, `png` |
//! | `blur` | blur radius                               |
//! | `dpr`  | device pixel ratio, 1-4                   |

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::Serialize;

/// Query key selecting a named preset.
pub const PRESET_KEY: &str = "preset";

/// How an image is fitted into the target box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Fit {
    Cover,
    Contain,
    Fill,
    Inside,
    Outside,
}

impl FromStr for Fit {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cover" => Ok(Self::Cover),
            "contain" => Ok(Self::Contain),
            "fill" => Ok(Self::Fill),
            "inside" => Ok(Self::Inside),
            "outside" => Ok(Self::Outside),
            _ => Err(()),
        }
    }
}

/// Output encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Webp,
    Avif,
    Jpeg,
    Png,
}

impl FromStr for ImageFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "webp" => Ok(Self::Webp),
            "avif" => Ok(Self::Avif),
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            _ => Err(()),
        }
    }
}

impl ImageFormat {
    /// MIME type of the encoding.
    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Webp => "image/webp",
            Self::Avif => "image/avif",
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }
}

/// Validated transform request.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TransformParams {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fit: Option<Fit>,
    pub quality: Option<u8>,
    pub format: Option<ImageFormat>,
    pub blur: Option<f32>,
    pub dpr: Option<f32>,
}

impl TransformParams {
    /// Build parameters from query pairs and named presets.
    ///
    /// # Arguments
    ///
    /// * `pairs` - Decoded query pairs in request order
    /// * `presets` - Preset name to transform keys
    #[must_use]
    pub fn from_pairs<'a, I>(pairs: I, presets: &BTreeMap<String, BTreeMap<String, String>>) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let pairs: Vec<(&str, &str)> = pairs.into_iter().collect();
        let mut params = Self::default();

        let preset = pairs
            .iter()
            .find(|(key, _)| *key == PRESET_KEY)
            .map(|(_, name)| *name);
        if let Some(name) = preset {
            match presets.get(name) {
                Some(values) => {
                    for (key, value) in values {
                        params.apply(key, value);
                    }
                }
                None => tracing::debug!(preset = name, "Unknown image preset ignored"),
            }
        }

        for (key, value) in pairs {
            params.apply(key, value);
        }
        params
    }

    /// Check whether no transform was requested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply(&mut self, key: &str, value: &str) {
        let value = value.trim();
        match key {
            "w" => set(&mut self.width, parse_in(value, 1..=10_000)),
            "h" => set(&mut self.height, parse_in(value, 1..=10_000)),
            "fit" => set(&mut self.fit, value.parse().ok()),
            "q" => set(&mut self.quality, parse_in(value, 1..=100)),
            "fm" => set(&mut self.format, value.parse().ok()),
            "blur" => set(&mut self.blur, parse_float(value, 0.0, 250.0)),
            "dpr" => set(&mut self.dpr, parse_float(value, 1.0, 4.0)),
            _ => {}
        }
    }
}

fn set<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

fn parse_in<T>(value: &str, range: std::ops::RangeInclusive<T>) -> Option<T>
where
    T: FromStr + PartialOrd,
{
    value.parse().ok().filter(|v| range.contains(v))
}

fn parse_float(value: &str, min: f32, max: f32) -> Option<f32> {
    value
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite() && (min..=max).contains(v))
}

/// Error returned by an [`ImageTransformer`].
#[derive(Debug, thiserror::Error)]
#[error("Image transform failed: {0}")]
pub struct TransformError(pub String);

/// Applies transforms to image bytes.
///
/// No implementation ships with the site core; when none is configured the
/// original asset is served.
pub trait ImageTransformer: Send + Sync {
    /// Transform `source` and return the encoded image and its MIME type.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError`] if the image can't be decoded or encoded.
    fn transform(
        &self,
        source: &[u8],
        params: &TransformParams,
    ) -> Result<(Vec<u8>, &'static str), TransformError>;
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn presets() -> BTreeMap<String, BTreeMap<String, String>> {
        let thumb = [("w", "200"), ("h", "200"), ("fit", "cover"), ("fm", "webp")]
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        BTreeMap::from([("thumb".to_owned(), thumb)])
    }

    #[test]
    fn test_allow_listed_keys() {
        let params = TransformParams::from_pairs(
            [("w", "640"), ("q", "80"), ("fm", "AVIF"), ("dpr", "2")],
            &presets(),
        );

        assert_eq!(params.width, Some(640));
        assert_eq!(params.quality, Some(80));
        assert_eq!(params.format, Some(ImageFormat::Avif));
        assert_eq!(params.dpr, Some(2.0));
        assert_eq!(params.height, None);
    }

    #[test]
    fn test_unknown_keys_and_bad_values_ignored() {
        let params = TransformParams::from_pairs(
            [("x", "1"), ("w", "wide"), ("q", "0"), ("fit", "stretch"), ("blur", "NaN")],
            &presets(),
        );

        assert!(params.is_empty());
    }

    #[test]
    fn test_preset_with_override() {
        let params =
            TransformParams::from_pairs([("w", "100"), ("preset", "thumb")], &presets());

        assert_eq!(params.width, Some(100));
        assert_eq!(params.height, Some(200));
        assert_eq!(params.fit, Some(Fit::Cover));
        assert_eq!(params.format, Some(ImageFormat::Webp));
    }

    #[test]
    fn test_unknown_preset_ignored() {
        let params = TransformParams::from_pairs([("preset", "huge")], &presets());

        assert!(params.is_empty());
    }

    #[test]
    fn test_format_mime_type() {
        assert_eq!("jpg".parse::<ImageFormat>().map(ImageFormat::mime_type), Ok("image/jpeg"));
    }
}
