use std::fs;
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::Builder;

use crate::domain::{MANIFEST_FILE_NAME, ManifestLine, MemberRecord};
use crate::error::MaplistError;

/// Keeps titled records, sorts by the rendered `title:id` string (byte order)
/// and drops lines that render identically.
pub fn build(records: &[MemberRecord]) -> Vec<ManifestLine> {
    let mut lines: Vec<ManifestLine> = records
        .iter()
        .filter_map(MemberRecord::manifest_line)
        .collect();
    lines.sort();
    lines.dedup();
    lines
}

pub fn render(lines: &[ManifestLine]) -> String {
    lines
        .iter()
        .map(ManifestLine::render)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Writes `maplist.txt` into `dir` (created if missing) and returns its
/// absolute path. The file only appears once fully written; an empty
/// manifest produces a zero-byte file.
pub fn write_manifest(dir: &Utf8Path, lines: &[ManifestLine]) -> Result<Utf8PathBuf, MaplistError> {
    fs::create_dir_all(dir.as_std_path())
        .map_err(|err| MaplistError::Filesystem(format!("create {dir}: {err}")))?;
    let dir = fs::canonicalize(dir.as_std_path())
        .map_err(|err| MaplistError::Filesystem(format!("resolve {dir}: {err}")))?;
    let dir = Utf8PathBuf::from_path_buf(dir)
        .map_err(|_| MaplistError::Filesystem("invalid output path".to_string()))?;
    let path = dir.join(MANIFEST_FILE_NAME);

    let mut builder = Builder::new();
    builder.prefix("maplist").suffix(".tmp");
    // tempfiles default to 0600; use the mode a plain create gets (umask applies)
    #[cfg(unix)]
    builder.permissions(fs::Permissions::from_mode(0o666));
    let mut temp = builder
        .tempfile_in(dir.as_std_path())
        .map_err(|err| MaplistError::Filesystem(err.to_string()))?;
    temp.write_all(render(lines).as_bytes())
        .map_err(|err| MaplistError::Filesystem(err.to_string()))?;
    temp.persist(path.as_std_path())
        .map_err(|err| MaplistError::Filesystem(format!("write {path}: {err}")))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_sorts_bytewise() {
        let records = vec![
            MemberRecord::new("3", Some("de_nuke")),
            MemberRecord::new("1", Some("Dust2")),
            MemberRecord::new("2", Some("aztec")),
        ];
        let rendered: Vec<String> = build(&records).iter().map(ManifestLine::render).collect();
        assert_eq!(rendered, vec!["Dust2:1", "aztec:2", "de_nuke:3"]);
    }

    #[test]
    fn render_has_no_trailing_newline() {
        let lines = build(&[
            MemberRecord::new("1", Some("a")),
            MemberRecord::new("2", Some("b")),
        ]);
        assert_eq!(render(&lines), "a:1\nb:2");
        assert_eq!(render(&[]), "");
    }
}
