#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use walkdir::WalkDir;

pub fn write_file(root: &Path, rel: &str, contents: &[u8]) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// Every file below `root`, keyed by '/'-joined relative path.
pub fn read_tree(root: &Path) -> BTreeMap<String, Vec<u8>> {
    let mut files = BTreeMap::new();
    if !root.exists() {
        return files;
    }
    for entry in WalkDir::new(root).min_depth(1) {
        let entry = entry.unwrap();
        if entry.file_type().is_file() {
            let rel = entry.path().strip_prefix(root).unwrap();
            let key = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            files.insert(key, fs::read(entry.path()).unwrap());
        }
    }
    files
}

pub fn file_names(root: &Path) -> Vec<String> {
    read_tree(root).into_keys().collect()
}

/// Asset tree with one file per category below `<root>/ba_data`.
pub fn seed_assets(root: &Path) {
    write_file(root, "ba_data/scripts/main.py", b"print('hi')\n");
    write_file(root, "ba_data/scripts/main.opt.pyc", b"\x00compiled");
    write_file(root, "ba_data/textures/wall.dds", b"dds-wall");
    write_file(root, "ba_data/textures/wall.ktx", b"ktx-wall");
    write_file(root, "ba_data/audio/hit.ogg", b"ogg-hit");
    write_file(root, "ba_data/fonts/main.fdata", b"font");
    write_file(root, "ba_data/data/levels.json", b"{}");
    write_file(root, "ba_data/models/box.bob", b"bob");
    write_file(root, "ba_data/models/box.cob", b"cob");
    write_file(root, "ba_data/python/pylib/os.py", b"import sys\n");
}
