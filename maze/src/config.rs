use std::{fmt::Display, fs::File, io::BufReader, path::Path, str::FromStr};

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

/// A colour compared byte for byte against image pixels.
///
/// Written as a hex string, either `AARRGGBB` (e.g. `ff000000` for opaque black) or `RRGGBB`
/// which is taken as fully opaque.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const BLACK: Rgba = Rgba([0, 0, 0, 255]);
    pub const WHITE: Rgba = Rgba([255, 255, 255, 255]);
    pub const RED: Rgba = Rgba([255, 0, 0, 255]);
    pub const GREEN: Rgba = Rgba([0, 255, 0, 255]);
    pub const BLUE: Rgba = Rgba([0, 0, 255, 255]);
}

impl FromStr for Rgba {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');

        if !hex.is_ascii() || !(hex.len() == 6 || hex.len() == 8) {
            bail!("Invalid colour: {:?}, expected AARRGGBB or RRGGBB", s);
        }

        let bytes = (0..hex.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&hex[i..i + 2], 16))
            .collect::<Result<Vec<u8>, _>>()
            .with_context(|| format!("Invalid colour: {:?}", s))?;

        Ok(match bytes[..] {
            [a, r, g, b] => Rgba([r, g, b, a]),
            [r, g, b] => Rgba([r, g, b, 255]),
            _ => bail!("Invalid colour: {:?}", s),
        })
    }
}

impl TryFrom<String> for Rgba {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgba> for String {
    fn from(value: Rgba) -> Self {
        value.to_string()
    }
}

impl Display for Rgba {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [r, g, b, a] = self.0;
        write!(f, "{:02x}{:02x}{:02x}{:02x}", a, r, g, b)
    }
}

/// The colours used to read a maze out of an image and to draw the solution back onto it
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Palette {
    pub wall: Rgba,
    pub open: Rgba,
    pub start: Rgba,
    pub finish: Rgba,
    /// Colour the solved path is painted with
    pub path: Rgba,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            wall: Rgba::BLACK,
            open: Rgba::WHITE,
            start: Rgba::RED,
            finish: Rgba::BLUE,
            path: Rgba::GREEN,
        }
    }
}

impl Palette {
    /// Load a palette from a JSON file. Missing keys keep their default colour.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file =
            File::open(path).with_context(|| format!("Failed to open palette {}", path.display()))?;

        let palette: Palette = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse palette {}", path.display()))?;

        palette.validate()?;
        Ok(palette)
    }

    /// The four colours used for classifying pixels have to differ from each other
    pub fn validate(&self) -> anyhow::Result<()> {
        let roles = [
            ("wall", self.wall),
            ("open", self.open),
            ("start", self.start),
            ("finish", self.finish),
        ];

        for (i, (name, colour)) in roles.iter().enumerate() {
            for (other_name, other) in &roles[i + 1..] {
                if colour == other {
                    bail!(
                        "The {} and {} colours are both {}, every role needs its own colour",
                        name,
                        other_name,
                        colour
                    );
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_parse_colours() {
        assert_eq!("ff000000".parse::<Rgba>().unwrap(), Rgba::BLACK);
        assert_eq!("ffff0000".parse::<Rgba>().unwrap(), Rgba::RED);
        assert_eq!("#0000ff".parse::<Rgba>().unwrap(), Rgba::BLUE);
        assert_eq!("80ffffff".parse::<Rgba>().unwrap(), Rgba([255, 255, 255, 128]));

        assert!("fff".parse::<Rgba>().is_err());
        assert!("gg000000".parse::<Rgba>().is_err());
        assert!("ff00000é".parse::<Rgba>().is_err());
    }

    #[test]
    fn test_display_round_trip() {
        assert_eq!(Rgba::GREEN.to_string(), "ff00ff00");
        assert_eq!(Rgba::GREEN.to_string().parse::<Rgba>().unwrap(), Rgba::GREEN);
    }

    #[test]
    fn test_partial_json() {
        let palette: Palette =
            serde_json::from_str(r#"{ "wall": "ff202020", "path": "00ff00" }"#).unwrap();

        assert_eq!(palette.wall, Rgba([0x20, 0x20, 0x20, 0xff]));
        assert_eq!(palette.path, Rgba::GREEN);
        assert_eq!(palette.open, Palette::default().open);
        assert!(palette.validate().is_ok());
    }

    #[test]
    fn test_bad_json() {
        assert!(serde_json::from_str::<Palette>(r#"{ "wall": "black" }"#).is_err());
        assert!(serde_json::from_str::<Palette>(r#"{ "walls": "ff000000" }"#).is_err());
    }

    #[test]
    fn test_duplicate_roles() {
        let palette = Palette {
            start: Rgba::WHITE,
            ..Default::default()
        };

        let err = palette.validate().unwrap_err();
        assert!(err.to_string().contains("open and start"));

        // the path colour may reuse any of the others
        let palette = Palette {
            path: Rgba::RED,
            ..Default::default()
        };
        assert!(palette.validate().is_ok());
    }

    #[test]
    fn test_load() {
        let path = std::env::temp_dir().join(format!("maze-palette-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "finish": "ff00ffff" }"#).unwrap();

        let palette = Palette::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(palette.finish, Rgba([0, 255, 255, 255]));
        assert!(Palette::load(&path).is_err());
    }
}
