use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use cubist_engine::scene::Variant;

pub const USAGE: &str = "usage: cubist-viewer [blank|plain|colored|textured] [image-path]";

/// Image used by the textured variant when none is given.
pub const DEFAULT_IMAGE: &str = "assets/crate.png";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerConfig {
    pub variant: Variant,
    pub image_path: PathBuf,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            variant: Variant::default(),
            image_path: resolve_image_path(Path::new(DEFAULT_IMAGE)),
        }
    }
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run(ViewerConfig),
    Help,
}

impl ViewerConfig {
    /// Parses the arguments after the program name.
    pub fn from_args<I>(args: I) -> Result<Command>
    where
        I: IntoIterator<Item = String>,
    {
        let args: Vec<String> = args.into_iter().collect();
        if args.iter().any(|a| a == "-h" || a == "--help") {
            return Ok(Command::Help);
        }

        let mut config = ViewerConfig::default();
        match args.as_slice() {
            [] => {}
            [variant] => config.variant = parse_variant(variant)?,
            [variant, image] => {
                config.variant = parse_variant(variant)?;
                config.image_path = resolve_image_path(Path::new(image));
            }
            _ => bail!("too many arguments\n{USAGE}"),
        }
        Ok(Command::Run(config))
    }
}

fn parse_variant(arg: &str) -> Result<Variant> {
    arg.parse().with_context(|| USAGE.to_string())
}

/// Relative paths that do not exist under the working directory are tried
/// against this crate's directory, so `cargo run` works from the workspace root.
fn resolve_image_path(path: &Path) -> PathBuf {
    if path.is_absolute() || path.exists() {
        return path.to_path_buf();
    }
    let fallback = Path::new(env!("CARGO_MANIFEST_DIR")).join(path);
    if fallback.exists() {
        fallback
    } else {
        path.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command> {
        ViewerConfig::from_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn no_arguments_runs_the_textured_cube() {
        let Command::Run(config) = parse(&[]).unwrap() else {
            panic!("expected a run command");
        };
        assert_eq!(config.variant, Variant::Textured);
        assert!(config.image_path.ends_with(DEFAULT_IMAGE));
    }

    #[test]
    fn bundled_image_is_found_from_any_directory() {
        assert!(ViewerConfig::default().image_path.exists());
    }

    #[test]
    fn variant_and_image_are_positional() {
        let Command::Run(config) = parse(&["colored", "/tmp/other.png"]).unwrap() else {
            panic!("expected a run command");
        };
        assert_eq!(config.variant, Variant::Colored);
        assert_eq!(config.image_path, PathBuf::from("/tmp/other.png"));
    }

    #[test]
    fn unknown_variant_is_an_error() {
        let err = parse(&["wireframe"]).unwrap_err();
        assert!(format!("{err:#}").contains("wireframe"));
    }

    #[test]
    fn extra_arguments_are_rejected() {
        assert!(parse(&["plain", "a.png", "b.png"]).is_err());
    }

    #[test]
    fn help_wins_over_everything() {
        assert_eq!(parse(&["plain", "--help"]).unwrap(), Command::Help);
    }
}
