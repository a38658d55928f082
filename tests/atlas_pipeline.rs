//! End-to-end runs of the atlas pipeline against real files.
//!
//! Every test builds a small library of JPEGs in a temp directory, runs the
//! real `image`-crate backend, and inspects what landed on disk.

use atlasgen::config::AtlasConfig;
use atlasgen::filter::SkipReason;
use atlasgen::pipeline::{self, AtlasEvent, Outcome};
use image::codecs::jpeg::JpegEncoder;
use image::{ImageEncoder, RgbImage};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use tempfile::TempDir;

fn write_jpeg(root: &Path, rel: &str, width: u32, height: u32) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, 90])
    });
    let file = fs::File::create(path).unwrap();
    JpegEncoder::new(std::io::BufWriter::new(file))
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// `count` covers spread over album directories like a music library.
fn music_library(count: usize) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for i in 0..count {
        let rel = format!("Artist {i} - 200{} - Album/cover.jpg", i % 10);
        write_jpeg(tmp.path(), &rel, 40 + i as u32, 30);
    }
    tmp
}

fn config(root: &Path, width: u32) -> AtlasConfig {
    AtlasConfig {
        root: root.to_path_buf(),
        width,
        ..AtlasConfig::default()
    }
}

fn rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

#[test]
fn atlas_has_exact_requested_width() {
    let tmp = music_library(10);

    let report = pipeline::run(&config(tmp.path(), 100), &mut rng(), None).unwrap();

    let written = image::open(tmp.path().join("atlas.jpg")).unwrap();
    assert_eq!((written.width(), written.height()), (100, 100));
    assert_eq!(report.placed.len(), 9);
    assert_eq!(report.left_out.len(), 1);
    assert_eq!(report.grid.unwrap().canvas_size, 102);
}

#[test]
fn corrupt_file_is_reported_and_atlas_still_written() {
    let tmp = music_library(4);
    fs::write(tmp.path().join("broken.jpg"), b"definitely not a jpeg").unwrap();

    let report = pipeline::run(&config(tmp.path(), 64), &mut rng(), None).unwrap();

    assert_eq!(report.working_set.len(), 5);
    // Five files make a 2x2 grid; only the first four are ever decoded.
    let broken = PathBuf::from("broken.jpg");
    let visited = report.working_set.as_slice()[..4].contains(&broken);
    assert_eq!(report.placed.len(), if visited { 3 } else { 4 });
    assert_eq!(report.corrupt.len(), usize::from(visited));
    assert!(!report.placed.contains(&broken));
    assert!(matches!(report.outcome, Outcome::Written { .. }));
    assert!(tmp.path().join("atlas.jpg").exists());
}

#[test]
fn decode_failure_is_listed_as_unprocessed() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("broken.jpg"), b"definitely not a jpeg").unwrap();
    write_jpeg(tmp.path(), "good.jpg", 20, 20);
    let config = AtlasConfig {
        pattern: "broken.jpg".into(),
        ..config(tmp.path(), 32)
    };

    let report = pipeline::run(&config, &mut rng(), None).unwrap();

    assert!(report.placed.is_empty());
    assert_eq!(report.corrupt.len(), 1);
    assert_eq!(report.corrupt[0].path, PathBuf::from("broken.jpg"));
    assert!(matches!(report.corrupt[0].reason, SkipReason::Decode(_)));
    // A blank atlas is still written: the file passed the stat check.
    assert!(tmp.path().join("atlas.jpg").exists());
}

#[test]
fn no_usable_images_writes_nothing() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("readme.txt"), b"no images here").unwrap();
    let (tx, rx) = mpsc::channel();

    let report = pipeline::run(&config(tmp.path(), 64), &mut rng(), Some(tx)).unwrap();

    assert_eq!(report.outcome, Outcome::NothingToDo);
    assert!(!tmp.path().join("atlas.jpg").exists());
    assert!(rx.try_iter().any(|e| e == AtlasEvent::NothingToDo));
}

#[test]
fn files_below_min_size_are_still_placed() {
    let tmp = TempDir::new().unwrap();
    write_jpeg(tmp.path(), "tiny.jpg", 4, 4);
    let (tx, rx) = mpsc::channel();
    let config = AtlasConfig {
        min_file_size: 1_000_000,
        ..config(tmp.path(), 16)
    };

    let report = pipeline::run(&config, &mut rng(), Some(tx)).unwrap();

    assert_eq!(report.placed, vec![PathBuf::from("tiny.jpg")]);
    assert!(rx
        .try_iter()
        .any(|e| matches!(e, AtlasEvent::SizeAdvisory { ref path, .. } if path == Path::new("tiny.jpg"))));
}

#[test]
fn previous_atlas_is_not_reused_as_a_source() {
    let tmp = music_library(4);

    pipeline::run(&config(tmp.path(), 64), &mut rng(), None).unwrap();
    let second = pipeline::run(&config(tmp.path(), 64), &mut rng(), None).unwrap();

    assert_eq!(second.matched, 4);
    assert!(!second.working_set.iter().any(|p| p == Path::new("atlas.jpg")));
}

#[test]
fn png_output_keeps_transparent_letterbox() {
    let tmp = TempDir::new().unwrap();
    write_jpeg(tmp.path(), "wide.jpg", 80, 20);
    let config = AtlasConfig {
        file_name: "atlas.png".into(),
        ..config(tmp.path(), 40)
    };

    pipeline::run(&config, &mut rng(), None).unwrap();

    let atlas = image::open(tmp.path().join("atlas.png")).unwrap().to_rgba8();
    assert_eq!(atlas.dimensions(), (40, 40));
    assert_eq!(atlas.get_pixel(20, 1)[3], 0, "top band is padding");
    assert_eq!(atlas.get_pixel(20, 20)[3], 255, "middle holds the image");
}

#[test]
fn check_writes_nothing() {
    let tmp = music_library(5);

    let report = pipeline::check(&config(tmp.path(), 64), &mut rng(), None).unwrap();

    assert_eq!(report.outcome, Outcome::Planned);
    assert_eq!(report.grid.unwrap().side, 2);
    assert!(!tmp.path().join("atlas.jpg").exists());
}

#[test]
fn same_seed_gives_same_layout() {
    let tmp = music_library(6);

    let a = pipeline::check(&config(tmp.path(), 64), &mut rng(), None).unwrap();
    let b = pipeline::check(&config(tmp.path(), 64), &mut rng(), None).unwrap();

    assert_eq!(a.working_set, b.working_set);
    assert_eq!(a.left_out, b.left_out);
}
