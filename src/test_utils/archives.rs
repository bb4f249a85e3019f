//! In-memory archive builders shaped like upstream releases: one top-level
//! directory record followed by the files under it.

use flate2::Compression;
use flate2::write::GzEncoder;
use lzma_rust2::{XzOptions, XzWriter};
use std::io::{Cursor, Write};
use std::path::Path;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Zip bytes with `top/` followed by `top/<name>` for each file.
pub fn zip_bytes(top: &str, files: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    writer.add_directory(format!("{top}/"), options).unwrap();
    for (name, data) in files {
        writer.start_file(format!("{top}/{name}"), options).unwrap();
        writer.write_all(data.as_bytes()).unwrap();
    }

    writer.finish().unwrap().into_inner()
}

/// Gzip-compressed tar bytes with the same layout as [`zip_bytes`].
pub fn tar_gz_bytes(top: &str, files: &[(&str, &str)]) -> Vec<u8> {
    let encoder = append_tree(GzEncoder::new(Vec::new(), Compression::default()), top, files);
    encoder.finish().unwrap()
}

/// Xz-compressed tar bytes with the same layout as [`zip_bytes`].
pub fn tar_xz_bytes(top: &str, files: &[(&str, &str)]) -> Vec<u8> {
    let writer = XzWriter::new(Vec::new(), XzOptions::default()).unwrap();
    append_tree(writer, top, files).finish().unwrap()
}

/// Gzip-compressed tar bytes as produced by `tar -C staging -czf out.tar.gz .`:
/// a `./` record first, and every name prefixed with `./`.
pub fn dot_prefixed_tar_gz_bytes(top: &str, files: &[(&str, &str)]) -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));

    append_raw(&mut builder, "./", tar::EntryType::Directory, b"");
    append_raw(&mut builder, &format!("./{top}/"), tar::EntryType::Directory, b"");
    for (name, data) in files {
        append_raw(&mut builder, &format!("./{top}/{name}"), tar::EntryType::Regular, data.as_bytes());
    }

    builder.into_inner().unwrap().finish().unwrap()
}

pub fn write_zip(path: &Path, top: &str, files: &[(&str, &str)]) {
    std::fs::write(path, zip_bytes(top, files)).unwrap();
}

pub fn write_tar_gz(path: &Path, top: &str, files: &[(&str, &str)]) {
    std::fs::write(path, tar_gz_bytes(top, files)).unwrap();
}

pub fn write_tar_xz(path: &Path, top: &str, files: &[(&str, &str)]) {
    std::fs::write(path, tar_xz_bytes(top, files)).unwrap();
}

fn append_tree<W: Write>(writer: W, top: &str, files: &[(&str, &str)]) -> W {
    let mut builder = tar::Builder::new(writer);

    let mut dir = tar::Header::new_gnu();
    dir.set_entry_type(tar::EntryType::Directory);
    dir.set_size(0);
    dir.set_mode(0o755);
    builder.append_data(&mut dir, format!("{top}/"), std::io::empty()).unwrap();

    for (name, data) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o755);
        builder.append_data(&mut header, format!("{top}/{name}"), data.as_bytes()).unwrap();
    }

    builder.into_inner().unwrap()
}

/// Append an entry with `name` stored byte for byte; `append_data` would
/// normalise the `./` prefix away.
fn append_raw<W: Write>(builder: &mut tar::Builder<W>, name: &str, kind: tar::EntryType, data: &[u8]) {
    let mut header = tar::Header::new_gnu();
    header.as_old_mut().name[..name.len()].copy_from_slice(name.as_bytes());
    header.set_entry_type(kind);
    header.set_size(data.len() as u64);
    header.set_mode(0o755);
    header.set_cksum();
    builder.append(&header, data).unwrap();
}
