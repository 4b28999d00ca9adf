use crate::cutter::*;

use std::path::{Path, PathBuf};

/// Extensions of the workbooks that can be processed.
pub const WORKBOOK_EXTENSIONS: [&str; 3] = ["xlsx", "xlsm", "xls"];

/// Checks that the input exists and looks like a workbook.
pub fn check_input(path: &Path) -> CutResult<()> {
    let p = path.display().to_string();
    if !path.exists() {
        return InputNotFoundSnafu { path: p }.fail();
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    if !WORKBOOK_EXTENSIONS.contains(&ext.as_str()) {
        return UnsupportedExtensionSnafu { path: p }.fail();
    }
    Ok(())
}

/// The first `<dir>/<base><N>.xlsx` that does not exist yet, from N = 1.
/// Creates the directory.
pub fn next_version_path(dir: &str, base_name: &str) -> CutResult<PathBuf> {
    fs::create_dir_all(dir).context(CreatingDirectorySnafu { path: dir })?;
    let mut version: u32 = 1;
    loop {
        let candidate = Path::new(dir).join(format!("{}{}.xlsx", base_name, version));
        if !candidate.exists() {
            debug!("next_version_path: {}", candidate.display());
            return Ok(candidate);
        }
        version += 1;
    }
}

/// Where the workbook is saved before recalculation: `<stem>_formulas.<ext>`
/// next to the output.
pub fn formula_snapshot_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let ext = output
        .extension()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "xlsx".to_string());
    output.with_file_name(format!("{}_formulas.{}", stem, ext))
}

pub fn simplify_file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_skip_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let d = dir.path().join("output");
        let d = d.to_str().unwrap();
        let first = next_version_path(d, "run_v").unwrap();
        assert_eq!(simplify_file_name(&first), "run_v1.xlsx");
        fs::write(&first, b"").unwrap();
        fs::write(Path::new(d).join("run_v2.xlsx"), b"").unwrap();
        let third = next_version_path(d, "run_v").unwrap();
        assert_eq!(simplify_file_name(&third), "run_v3.xlsx");
    }

    #[test]
    fn input_checks() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("survey.xlsx");
        assert!(matches!(
            check_input(&missing),
            Err(CutterError::InputNotFound { .. })
        ));
        let csv = dir.path().join("survey.csv");
        fs::write(&csv, b"a,b").unwrap();
        assert!(matches!(
            check_input(&csv),
            Err(CutterError::UnsupportedExtension { .. })
        ));
        let upper = dir.path().join("survey.XLSX");
        fs::write(&upper, b"").unwrap();
        assert!(check_input(&upper).is_ok());
    }

    #[test]
    fn snapshot_next_to_output() {
        assert_eq!(
            formula_snapshot_path(Path::new("output/run_v3.xlsx")),
            PathBuf::from("output/run_v3_formulas.xlsx")
        );
    }
}
