use std::fs;

use camino::Utf8PathBuf;

use maplist_generator::domain::{ManifestLine, MemberRecord};
use maplist_generator::manifest::{build, write_manifest};

fn rendered(records: &[MemberRecord]) -> Vec<String> {
    build(records).iter().map(ManifestLine::render).collect()
}

#[test]
fn untitled_records_are_dropped_and_titles_trimmed() {
    let records = vec![
        MemberRecord::new("1", Some("")),
        MemberRecord::new("2", None),
        MemberRecord::new("3", Some("  Dust2  ")),
        MemberRecord::new("4", Some(" \t ")),
    ];
    assert_eq!(rendered(&records), vec!["Dust2:3"]);
}

#[test]
fn duplicate_renderings_collapse() {
    let records = vec![
        MemberRecord::new("7", Some("Inferno")),
        MemberRecord::new("7", Some("Inferno ")),
        MemberRecord::new("5", Some("Inferno")),
    ];
    assert_eq!(rendered(&records), vec!["Inferno:5", "Inferno:7"]);
}

#[test]
fn order_does_not_depend_on_input_order() {
    let mut records = vec![
        MemberRecord::new("30", Some("Mirage")),
        MemberRecord::new("10", Some("Ancient")),
        MemberRecord::new("20", Some("anubis")),
        MemberRecord::new("40", Some("Éclair")),
    ];
    let forward = rendered(&records);
    records.reverse();
    assert_eq!(rendered(&records), forward);
    assert_eq!(
        forward,
        vec!["Ancient:10", "Mirage:30", "anubis:20", "Éclair:40"]
    );
}

#[test]
fn write_creates_missing_directories() {
    let temp = tempfile::tempdir().unwrap();
    let dir = Utf8PathBuf::from_path_buf(temp.path().join("a").join("b")).unwrap();
    let lines = build(&[
        MemberRecord::new("2", Some("Vertigo")),
        MemberRecord::new("1", Some("Nuke")),
    ]);

    let path = write_manifest(&dir, &lines).unwrap();

    assert!(path.is_absolute());
    assert_eq!(path.file_name(), Some("maplist.txt"));
    assert_eq!(fs::read_to_string(&path).unwrap(), "Nuke:1\nVertigo:2");
    let leftovers = fs::read_dir(&dir).unwrap().count();
    assert_eq!(leftovers, 1);
}

#[test]
fn empty_manifest_is_zero_bytes() {
    let temp = tempfile::tempdir().unwrap();
    let dir = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
    let path = write_manifest(&dir, &[]).unwrap();
    assert_eq!(fs::metadata(&path).unwrap().len(), 0);
}

#[cfg(unix)]
#[test]
fn manifest_is_readable_like_a_plain_file() {
    use std::os::unix::fs::PermissionsExt;

    let temp = tempfile::tempdir().unwrap();
    let dir = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
    let plain = dir.join("plain.txt");
    fs::write(&plain, "a:1").unwrap();

    let path = write_manifest(&dir, &build(&[MemberRecord::new("1", Some("a"))])).unwrap();

    let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
    let plain_mode = fs::metadata(&plain).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, plain_mode);
}

#[cfg(unix)]
#[test]
fn replacing_a_manifest_keeps_it_readable() {
    use std::os::unix::fs::PermissionsExt;

    let temp = tempfile::tempdir().unwrap();
    let dir = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
    fs::write(dir.join("maplist.txt"), "old:1").unwrap();
    let before = fs::metadata(dir.join("maplist.txt")).unwrap().permissions().mode() & 0o777;

    let path = write_manifest(&dir, &build(&[MemberRecord::new("2", Some("new"))])).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "new:2");
    assert_eq!(fs::metadata(&path).unwrap().permissions().mode() & 0o777, before);
}
