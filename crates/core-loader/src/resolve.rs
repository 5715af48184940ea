use std::io::Read;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;

use crate::error::LoaderError;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// A resolved program source: its decoded UTF-8 text plus the directory it
/// lives in (sound/include paths resolve relative to this first, per
/// spec.md §6).
pub struct ProgramSource {
    pub text: String,
    pub dir: PathBuf,
}

/// Resolves `name` to one of `name`, `name.gz`, `name/index.cfg`,
/// `name/index.cfg.gz` (spec.md §4.1/§6) and decodes it as UTF-8, applying
/// gzip decompression when the file's content starts with the gzip magic
/// (`\x1f\x8b`) — detected by content rather than extension, matching
/// `zstr`'s transparent behavior in original_source (`zstr::ifstream`).
pub fn resolve(name: &str) -> Result<ProgramSource, LoaderError> {
    let base = Path::new(name);
    let mut tried = Vec::new();

    let candidates: Vec<PathBuf> = if base.is_dir() {
        vec![
            base.join("index.cfg"),
            base.join("index.cfg.gz"),
        ]
    } else {
        vec![
            base.to_path_buf(),
            append_ext(base, "gz"),
            base.join("index.cfg"),
            base.join("index.cfg.gz"),
        ]
    };

    for candidate in candidates {
        tried.push(candidate.clone());
        if candidate.is_file() {
            let text = read_text(&candidate)?;
            let dir = candidate
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            return Ok(ProgramSource { text, dir });
        }
    }

    Err(LoaderError::ProgramNotFound {
        name: name.to_string(),
        tried,
    })
}

fn append_ext(base: &Path, ext: &str) -> PathBuf {
    let mut s = base.as_os_str().to_owned();
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}

fn read_text(path: &Path) -> Result<String, LoaderError> {
    let raw = std::fs::read(path).map_err(|source| LoaderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let bytes = if raw.len() >= 2 && raw[0..2] == GZIP_MAGIC {
        let mut decoder = GzDecoder::new(&raw[..]);
        let mut decoded = Vec::new();
        decoder
            .read_to_end(&mut decoded)
            .map_err(|source| LoaderError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        decoded
    } else {
        raw
    };
    String::from_utf8(bytes).map_err(|source| LoaderError::InvalidUtf8 {
        path: path.to_path_buf(),
        source,
    })
}
