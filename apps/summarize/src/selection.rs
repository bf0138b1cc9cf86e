//! Turns command line paths into candidate files using file metadata only.

use std::path::Path;

use anyhow::{Context, Result};
use shared::domain::CandidateFile;

pub fn candidate_from_path(path: &Path) -> Result<CandidateFile> {
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("failed to stat '{}'", path.display()))?;
    if !metadata.is_file() {
        anyhow::bail!("'{}' is not a regular file", path.display());
    }

    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .with_context(|| format!("'{}' has no usable file name", path.display()))?;
    let media_type = mime_guess::from_path(path)
        .first_raw()
        .unwrap_or_default()
        .to_string();

    Ok(CandidateFile::from_path(name, media_type, metadata.len(), path))
}

pub fn candidates_from_paths(paths: &[impl AsRef<Path>]) -> Result<Vec<CandidateFile>> {
    paths
        .iter()
        .map(|path| candidate_from_path(path.as_ref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::{
        env, fs,
        time::{SystemTime, UNIX_EPOCH},
    };

    use shared::domain::UploadSource;

    use super::*;

    #[test]
    fn guesses_media_type_from_extension() {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let dir = env::temp_dir().join(format!("summarize_selection_test_{suffix}"));
        fs::create_dir_all(&dir).expect("temp dir");

        let txt = dir.join("notes.txt");
        let docx = dir.join("brief.docx");
        fs::write(&txt, b"hello").expect("write txt");
        fs::write(&docx, b"PK").expect("write docx");

        let candidates = candidates_from_paths(&[&txt, &docx]).expect("candidates");
        assert_eq!(candidates[0].name, "notes.txt");
        assert_eq!(candidates[0].media_type, "text/plain");
        assert_eq!(candidates[0].size_bytes, 5);
        assert_eq!(candidates[0].source, UploadSource::Path(txt.clone()));
        assert_eq!(
            candidates[1].media_type,
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        );

        fs::remove_dir_all(dir).expect("cleanup");
    }

    #[test]
    fn missing_path_is_an_error() {
        let err = candidate_from_path(Path::new("/definitely/not/here.pdf"))
            .expect_err("must fail");
        assert!(err.to_string().contains("failed to stat"), "{err}");
    }
}
