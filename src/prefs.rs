use crate::palette::Palette;
use crate::simulation::{MAX_SYMMETRY, MIN_SYMMETRY};
use std::fmt;
use std::path::{Path, PathBuf};

pub const DEFAULT_SYMMETRY: u32 = 6;

/// Remembered viewer choices: the selected palette and fold count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewerPrefs {
    pub palette: Palette,
    pub symmetry: u32,
}

impl Default for ViewerPrefs {
    fn default() -> Self {
        Self {
            palette: Palette::Dawn,
            symmetry: DEFAULT_SYMMETRY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefsError {
    Io(String),
    Parse { line: usize, message: String },
}

impl fmt::Display for PrefsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "I/O error: {msg}"),
            Self::Parse { line, message } => write!(f, "parse error at line {line}: {message}"),
        }
    }
}

impl std::error::Error for PrefsError {}

impl ViewerPrefs {
    /// Missing path or missing file yields defaults. Unknown keys are ignored.
    pub fn load(path: Option<&Path>) -> Result<Self, PrefsError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = match std::fs::read_to_string(path) {
            Ok(v) => v,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(PrefsError::Io(err.to_string())),
        };
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, PrefsError> {
        let mut prefs = Self::default();
        for (line_idx, raw) in text.lines().enumerate() {
            let line_no = line_idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(PrefsError::Parse {
                    line: line_no,
                    message: "expected <key>=<value>".to_string(),
                });
            };
            match key.trim() {
                "palette" => {
                    prefs.palette =
                        Palette::from_name(value.trim()).ok_or_else(|| PrefsError::Parse {
                            line: line_no,
                            message: format!("unknown palette '{}'", value.trim()),
                        })?;
                }
                "symmetry" => {
                    let n: u32 = value.trim().parse().map_err(|_| PrefsError::Parse {
                        line: line_no,
                        message: "symmetry must be an integer".to_string(),
                    })?;
                    prefs.symmetry = n.clamp(MIN_SYMMETRY, MAX_SYMMETRY);
                }
                _ => {}
            }
        }
        Ok(prefs)
    }

    pub fn render(&self) -> String {
        format!(
            "# kaleidoscope prefs v1\npalette={}\nsymmetry={}\n",
            self.palette.label(),
            self.symmetry
        )
    }

    /// Written through a sibling temp file, then renamed into place.
    pub fn save(&self, path: Option<&Path>) -> Result<(), PrefsError> {
        let Some(path) = path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PrefsError::Io(e.to_string()))?;
        }
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, self.render()).map_err(|e| PrefsError::Io(e.to_string()))?;
        std::fs::rename(&tmp, path).map_err(|e| PrefsError::Io(e.to_string()))
    }
}

pub fn prefs_storage_path() -> Option<PathBuf> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg.trim().is_empty() {
            return Some(PathBuf::from(xdg).join("kaleidoscope").join("prefs.txt"));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("kaleidoscope")
            .join("prefs.txt"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_reads_known_keys_and_skips_comments() {
        let p = ViewerPrefs::parse("# hi\n\npalette = ocean\nsymmetry=9\nfuture=1\n").unwrap();
        assert_eq!(p.palette, Palette::Ocean);
        assert_eq!(p.symmetry, 9);
    }

    #[test]
    fn parse_clamps_symmetry() {
        let p = ViewerPrefs::parse("symmetry=40").unwrap();
        assert_eq!(p.symmetry, MAX_SYMMETRY);
        let p = ViewerPrefs::parse("symmetry=0").unwrap();
        assert_eq!(p.symmetry, MIN_SYMMETRY);
    }

    #[test]
    fn parse_reports_line_numbers() {
        let err = ViewerPrefs::parse("palette=dawn\nnonsense").unwrap_err();
        assert_eq!(
            err,
            PrefsError::Parse {
                line: 2,
                message: "expected <key>=<value>".to_string()
            }
        );
        assert!(matches!(
            ViewerPrefs::parse("palette=plaid"),
            Err(PrefsError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn render_parses_back() {
        let p = ViewerPrefs {
            palette: Palette::Nebula,
            symmetry: 11,
        };
        assert_eq!(ViewerPrefs::parse(&p.render()).unwrap(), p);
    }
}
