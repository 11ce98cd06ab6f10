//! File loading and saving
//!
//! Loading detects a BOM, transcodes to the internal UTF-8 form,
//! strips CRLF line endings (remembering to restore them) and splits
//! the text into whole-line blocks. Saving re-applies newline style
//! and encoding and writes through a temp file in the same directory
//! followed by a rename, optionally fsyncing first.

use crate::buffer::Buffer;
use crate::encoding::{self, Encoding};
use crate::error::{EditorError, ErrorKind};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};

/// Detect the filetype from the extension or a `#!` first line.
pub fn detect_filetype(path: Option<&Path>, first_line: &[u8]) -> Option<&'static str> {
    if let Some(path) = path {
        let ext = path.extension().and_then(|e| e.to_str())?;
        let ft = match ext {
            "c" | "h" => Some("c"),
            "sh" | "bash" => Some("sh"),
            _ => None,
        };
        if ft.is_some() {
            return ft;
        }
    }
    if first_line.starts_with(b"#!") {
        let line = String::from_utf8_lossy(first_line);
        let interp = line
            .trim_start_matches("#!")
            .split_whitespace()
            .next()?
            .rsplit('/')
            .next()?
            .to_string();
        let interp = match interp.as_str() {
            "env" => line.split_whitespace().nth(1)?.to_string(),
            _ => interp,
        };
        return match interp.as_str() {
            "sh" | "bash" | "dash" | "ksh" | "zsh" => Some("sh"),
            _ => None,
        };
    }
    None
}

/// Strip CRLF endings in place. Returns true when the text used them
/// (every newline preceded by a carriage return, at least one).
fn strip_crlf(data: &mut Vec<u8>) -> bool {
    let mut saw = false;
    for i in 0..data.len() {
        if data[i] == b'\n' {
            if i == 0 || data[i - 1] != b'\r' {
                return false;
            }
            saw = true;
        }
    }
    if !saw {
        return false;
    }
    data.retain(|&b| b != b'\r');
    true
}

fn apply_crlf(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + data.len() / 16);
    for &b in data {
        if b == b'\n' {
            out.push(b'\r');
        }
        out.push(b);
    }
    out
}

/// Load a file into a fresh buffer. A missing file yields an empty
/// buffer bound to the path, like opening a new file.
pub fn load_buffer(path: &Path) -> Result<Buffer, EditorError> {
    let mut buffer = match fs::read(path) {
        Ok(raw) => {
            let (enc, skip) = encoding::detect_bom(&raw)
                .unwrap_or((Encoding::utf8(), 0));
            let mut data = encoding::decode(&raw[skip..], &enc);
            let crlf = strip_crlf(&mut data);

            let mut b = Buffer::from_bytes(&data);
            b.encoding = enc;
            b.crlf_newlines = crlf;
            b
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Buffer::new(),
        Err(e) => {
            return Err(EditorError::new(
                ErrorKind::Io,
                format!("{}: {e}", path.display()),
            ))
        }
    };

    buffer.path = Some(path.to_path_buf());
    buffer.display_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let first_line: Vec<u8> = {
        let blocks = &buffer.blocks;
        let mut it = crate::block::BlockIter::bof();
        it.line(blocks).to_vec()
    };
    if let Some(ft) = detect_filetype(Some(path), &first_line) {
        buffer.options.filetype = ft.to_string();
    }

    log::debug!(
        "loaded {} ({} bytes, {}, crlf={})",
        path.display(),
        buffer.blocks.len(),
        buffer.encoding.name(),
        buffer.crlf_newlines
    );
    Ok(buffer)
}

fn temp_path_for(path: &Path) -> PathBuf {
    static COUNTER: AtomicU32 = AtomicU32::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let mut name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.push_str(&format!(".tmp{}-{}", std::process::id(), n));
    path.with_file_name(name)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SaveOptions {
    /// Force LF / CRLF regardless of the buffer's newline style.
    pub crlf: Option<bool>,
    pub fsync: bool,
}

/// Save the buffer to `path` atomically and mark it saved.
pub fn save_buffer(buffer: &mut Buffer, path: &Path, opts: SaveOptions) -> Result<(), EditorError> {
    let mut data = buffer.blocks.to_bytes();
    let crlf = opts.crlf.unwrap_or(buffer.crlf_newlines);
    if crlf {
        data = apply_crlf(&data);
    }

    let mut out = Vec::new();
    if buffer.encoding.bom {
        out.extend_from_slice(buffer.encoding.bom_bytes());
    }
    out.extend_from_slice(&encoding::encode(&data, &buffer.encoding));

    let tmp = temp_path_for(path);
    let write = || -> std::io::Result<()> {
        let mut f = fs::File::create(&tmp)?;
        // Keep the permissions of an existing target
        if let Ok(meta) = fs::metadata(path) {
            let _ = f.set_permissions(meta.permissions());
        }
        f.write_all(&out)?;
        if opts.fsync {
            f.sync_all()?;
        }
        drop(f);
        fs::rename(&tmp, path)
    };
    if let Err(e) = write() {
        let _ = fs::remove_file(&tmp);
        return Err(EditorError::new(
            ErrorKind::Io,
            format!("{}: {e}", path.display()),
        ));
    }

    buffer.crlf_newlines = crlf;
    buffer.path = Some(path.to_path_buf());
    buffer.display_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    buffer.mark_saved();
    log::debug!("saved {} ({} bytes)", path.display(), out.len());
    Ok(())
}
