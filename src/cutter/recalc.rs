// Formula recalculation through a headless office suite.

use crate::cutter::config_reader::RecalculationSettings;
use crate::cutter::*;

use std::path::PathBuf;
use std::process::Command;
use std::thread;
use std::time::Duration;

pub trait Recalculator {
    /// Recalculates the workbook saved at `path` in place, so that its formula
    /// cells carry computed values. Returns false when nothing was done.
    fn recalculate(&self, path: &Path) -> CutResult<bool>;
}

/// Leaves the formulas unevaluated.
pub struct NoRecalculation {}

impl Recalculator for NoRecalculation {
    fn recalculate(&self, path: &Path) -> CutResult<bool> {
        debug!("recalculate: disabled for {}", path.display());
        Ok(false)
    }
}

/// Opens the workbook with `<command> --headless --calc --convert-to xlsx`,
/// which recalculates on load, and moves the converted file back.
pub struct OfficeRecalculator {
    pub command: String,
    pub wait: Duration,
}

impl OfficeRecalculator {
    pub fn new(settings: &RecalculationSettings) -> OfficeRecalculator {
        OfficeRecalculator {
            command: settings.command.clone(),
            wait: Duration::from_secs(settings.wait_seconds),
        }
    }

    fn convert(&self, abs_path: &Path, out_dir: &Path) -> CutResult<PathBuf> {
        let p = abs_path.display().to_string();
        let out = Command::new(&self.command)
            .arg("--headless")
            .arg("--calc")
            .arg("--convert-to")
            .arg("xlsx")
            .arg("--outdir")
            .arg(out_dir)
            .arg(abs_path)
            .output()
            .context(RecalculationLaunchSnafu {
                command: self.command.clone(),
            })?;
        if !out.status.success() {
            return RecalculationFailedSnafu {
                path: p,
                message: format!(
                    "{} exited with {}: {}",
                    self.command,
                    out.status,
                    String::from_utf8_lossy(&out.stderr).trim()
                ),
            }
            .fail();
        }
        debug!(
            "convert: {}",
            String::from_utf8_lossy(&out.stdout).trim()
        );
        if !self.wait.is_zero() {
            info!("Waiting {:?} for the recalculation to settle", self.wait);
            thread::sleep(self.wait);
        }
        let stem = abs_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let converted = out_dir.join(format!("{}.xlsx", stem));
        if !converted.exists() {
            return RecalculationFailedSnafu {
                path: p,
                message: format!("no output produced at {}", converted.display()),
            }
            .fail();
        }
        Ok(converted)
    }
}

impl Recalculator for OfficeRecalculator {
    fn recalculate(&self, path: &Path) -> CutResult<bool> {
        let p = path.display().to_string();
        let abs_path = fs::canonicalize(path).map_err(|e| CutterError::RecalculationFailed {
            path: p.clone(),
            message: e.to_string(),
        })?;
        let parent = abs_path
            .parent()
            .map(|d| d.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));
        let out_dir = parent.join(".qcut-recalc");
        fs::create_dir_all(&out_dir).context(CreatingDirectorySnafu {
            path: out_dir.display().to_string(),
        })?;
        info!("Recalculating {} with {}", p, self.command);

        let res = self.convert(&abs_path, &out_dir).and_then(|converted| {
            fs::rename(&converted, &abs_path).map_err(|e| CutterError::RecalculationFailed {
                path: p.clone(),
                message: format!("moving {}: {}", converted.display(), e),
            })
        });
        if let Err(e) = fs::remove_dir_all(&out_dir) {
            warn!("Could not remove {}: {}", out_dir.display(), e);
        }
        res?;
        info!("Recalculated {}", p);
        Ok(true)
    }
}

/// The recalculator for a run: disabled by the settings or the command line.
pub fn recalculator_for(settings: &RecalculationSettings) -> Box<dyn Recalculator> {
    if settings.enabled {
        Box::new(OfficeRecalculator::new(settings))
    } else {
        Box::new(NoRecalculation {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_tool_is_a_launch_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.xlsx");
        fs::write(&path, b"").unwrap();
        let r = OfficeRecalculator {
            command: "qcut-no-such-office-suite".to_string(),
            wait: Duration::from_secs(0),
        };
        let res = r.recalculate(&path);
        assert!(matches!(res, Err(CutterError::RecalculationLaunch { .. })));
        // The scratch directory is cleaned up.
        assert!(!dir.path().join(".qcut-recalc").exists());
        assert!(path.exists());
    }

    #[test]
    fn disabled_settings_skip() {
        let settings = RecalculationSettings {
            enabled: false,
            ..RecalculationSettings::default()
        };
        let dir = tempfile::tempdir().unwrap();
        let r = recalculator_for(&settings);
        assert!(!r.recalculate(&dir.path().join("book.xlsx")).unwrap());
    }
}
