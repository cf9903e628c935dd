use anyhow::{Result, Context};
use chrono::Local;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

/// UTF-8 byte order mark
pub const UTF8_BOM: &str = "\u{feff}";

/// Suffix of the corrected script
pub const SCRIPT_SUFFIX: &str = "_改";

/// Suffix of the diagnostic report
pub const REPORT_SUFFIX: &str = "_锤";

/// Line terminator used by a script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    // @detects: CRLF if the first line break is CRLF
    pub fn detect(content: &str) -> Self {
        match content.find('\n') {
            Some(pos) if pos > 0 && content.as_bytes()[pos - 1] == b'\r' => Self::CrLf,
            _ => Self::Lf,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }
}

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> io::Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    // @checks: .ass / .ASS extension
    pub fn has_ass_extension<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("ass"))
    }

    // @checks: File was written by the checker itself
    pub fn is_generated_output<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .is_some_and(|stem| stem.ends_with(SCRIPT_SUFFIX) || stem.ends_with(REPORT_SUFFIX))
    }

    /// Read a script as UTF-8, dropping a leading BOM
    pub fn read_script<P: AsRef<Path>>(path: P) -> io::Result<String> {
        let bytes = fs::read(path)?;
        let content = String::from_utf8(bytes)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(match content.strip_prefix(UTF8_BOM) {
            Some(stripped) => stripped.to_string(),
            None => content,
        })
    }

    /// Write a string to a file, creating the parent directory
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> io::Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }
        fs::write(path, content)
    }

    /// Write a string prefixed with the UTF-8 BOM
    pub fn write_with_bom<P: AsRef<Path>>(path: P, content: &str) -> io::Result<()> {
        let mut data = String::with_capacity(content.len() + UTF8_BOM.len());
        data.push_str(UTF8_BOM);
        data.push_str(content);
        Self::write_to_file(path, &data)
    }

    /// Timestamp used to tell output files of different runs apart
    pub fn run_stamp() -> String {
        Local::now().format("%Y%m%d_%H%M%S_%3f").to_string()
    }

    /// `stamp`, or `stamp_N` for the first N where neither artifact of
    /// `input_file` exists yet in `output_dir`
    pub fn unique_stamp<P1: AsRef<Path>, P2: AsRef<Path>>(
        input_file: P1,
        output_dir: P2,
        stamp: &str,
    ) -> String {
        let taken = |candidate: &str| {
            [(SCRIPT_SUFFIX, "ass"), (REPORT_SUFFIX, "txt")].iter().any(|(suffix, ext)| {
                Self::generate_output_path(&input_file, &output_dir, candidate, suffix, ext).exists()
            })
        };

        let mut candidate = stamp.to_string();
        let mut counter = 1;
        while taken(&candidate) {
            candidate = format!("{}_{}", stamp, counter);
            counter += 1;
        }
        candidate
    }

    // @generates: Output path for a checker artifact
    // @params: input_file, output_dir, stamp, suffix, extension
    pub fn generate_output_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        input_file: P1,
        output_dir: P2,
        stamp: &str,
        suffix: &str,
        extension: &str,
    ) -> PathBuf {
        let stem = input_file.as_ref().file_stem().unwrap_or_default();

        let mut output_filename = stem.to_string_lossy().to_string();
        output_filename.push('_');
        output_filename.push_str(stamp);
        output_filename.push_str(suffix);
        output_filename.push('.');
        output_filename.push_str(extension);

        output_dir.as_ref().join(output_filename)
    }

    /// Find files with a specific extension in a directory
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();
        let normalized_ext = extension.trim_start_matches('.');

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() {
                if let Some(ext) = path.extension() {
                    if ext.to_string_lossy().eq_ignore_ascii_case(normalized_ext) {
                        result.push(path.to_path_buf());
                    }
                }
            }
        }

        result.sort();
        Ok(result)
    }
}
