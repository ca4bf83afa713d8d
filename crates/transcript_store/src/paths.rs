use std::path::{Path, PathBuf};

pub const TRANSCRIPT_DIR: [&str; 2] = [".portable_chat", "transcripts"];
pub const TRANSCRIPT_FILE: &str = "transcript.json";

#[must_use]
pub fn transcript_root(home: &Path) -> PathBuf {
    home.join(TRANSCRIPT_DIR[0]).join(TRANSCRIPT_DIR[1])
}

#[must_use]
pub fn transcript_path(home: &Path) -> PathBuf {
    transcript_root(home).join(TRANSCRIPT_FILE)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::transcript_path;

    #[test]
    fn transcript_lives_under_the_app_data_directory() {
        let path = transcript_path(Path::new("/home/soto"));
        assert_eq!(
            path,
            Path::new("/home/soto/.portable_chat/transcripts/transcript.json")
        );
    }
}
