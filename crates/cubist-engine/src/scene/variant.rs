use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::model::{Geometry, cube};
use crate::shader::ProgramSources;

/// Which feature set the program renders.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Context and clear only.
    Blank,
    /// White cube.
    Plain,
    /// Per-vertex colors.
    Colored,
    /// Image-mapped faces.
    #[default]
    Textured,
}

impl Variant {
    pub const ALL: [Variant; 4] = [
        Variant::Blank,
        Variant::Plain,
        Variant::Colored,
        Variant::Textured,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Variant::Blank => "blank",
            Variant::Plain => "plain",
            Variant::Colored => "colored",
            Variant::Textured => "textured",
        }
    }

    /// Shader pair; `None` for [`Variant::Blank`].
    pub fn sources(self) -> Option<ProgramSources> {
        match self {
            Variant::Blank => None,
            Variant::Plain => Some(ProgramSources::plain()),
            Variant::Colored => Some(ProgramSources::colored()),
            Variant::Textured => Some(ProgramSources::textured()),
        }
    }

    /// Cube geometry; `None` for [`Variant::Blank`].
    pub fn geometry(self) -> Option<Geometry> {
        match self {
            Variant::Blank => None,
            Variant::Plain => Some(cube::plain()),
            Variant::Colored => Some(cube::colored()),
            Variant::Textured => Some(cube::textured()),
        }
    }

    pub fn needs_texture(self) -> bool {
        self == Variant::Textured
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown variant `{0}` (expected blank, plain, colored or textured)")]
pub struct UnknownVariant(pub String);

impl FromStr for Variant {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Variant::ALL
            .into_iter()
            .find(|v| v.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for v in Variant::ALL {
            assert_eq!(v.to_string().parse::<Variant>(), Ok(v));
        }
        assert_eq!("Colored".parse::<Variant>(), Ok(Variant::Colored));
    }

    #[test]
    fn unknown_name_is_rejected() {
        assert_eq!(
            "wireframe".parse::<Variant>(),
            Err(UnknownVariant("wireframe".into()))
        );
    }

    #[test]
    fn only_blank_has_no_pipeline() {
        for v in Variant::ALL {
            assert_eq!(v.sources().is_none(), v == Variant::Blank);
            assert_eq!(v.geometry().is_none(), v == Variant::Blank);
        }
        assert!(Variant::Textured.needs_texture());
        assert!(!Variant::Colored.needs_texture());
    }
}
