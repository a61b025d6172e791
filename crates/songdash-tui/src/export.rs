//! CSV export of the loaded page.

use std::path::{Path, PathBuf};

use catalog_proto::song::{Song, SongField};

pub const EXPORT_FILE_NAME: &str = "songs.csv";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("no songs loaded, nothing to export")]
    EmptyPage,
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Header line of field names followed by one line per song, joined with
/// `\n` and no trailing newline. Values are written raw, without quoting.
pub fn songs_to_csv(songs: &[Song]) -> String {
    let header = SongField::ALL
        .iter()
        .map(|f| f.name())
        .collect::<Vec<_>>()
        .join(",");

    std::iter::once(header)
        .chain(songs.iter().map(|song| {
            SongField::ALL
                .iter()
                .map(|&f| song.field(f).to_string())
                .collect::<Vec<_>>()
                .join(",")
        }))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write `songs.csv` into `dir`, replacing any previous export.
pub fn export_page(songs: &[Song], dir: &Path) -> Result<PathBuf, ExportError> {
    if songs.is_empty() {
        return Err(ExportError::EmptyPage);
    }
    let path = dir.join(EXPORT_FILE_NAME);
    std::fs::create_dir_all(dir)
        .and_then(|_| std::fs::write(&path, songs_to_csv(songs)))
        .map_err(|source| ExportError::Write {
            path: path.clone(),
            source,
        })?;
    Ok(path)
}
