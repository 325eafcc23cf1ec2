use image::{DynamicImage, GenericImageView};
use image_classifier::Label;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::{tempdir, TempDir};

struct TempTestDir {
    _dir: TempDir,
    path: PathBuf,
}

impl TempTestDir {
    fn new() -> Self {
        let dir = tempdir().expect("create temp dir");
        let path = dir.path().to_path_buf();
        Self { _dir: dir, path }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    /// Red 100x100 RGB PNG.
    fn sample_image(&self) -> PathBuf {
        let path = self.path.join("sample.png");
        DynamicImage::ImageRgb8(image::RgbImage::from_pixel(100, 100, image::Rgb([255, 0, 0])))
            .save(&path)
            .unwrap();
        path
    }

    fn grayscale_image(&self) -> PathBuf {
        let path = self.path.join("gray.png");
        DynamicImage::new_luma8(100, 100).save(&path).unwrap();
        path
    }
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_image-classifier"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute image-classifier")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_predict_command() {
    let dir = TempTestDir::new();
    let image = dir.sample_image();

    let output = run(&["predict", arg(&image)]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    let label = out
        .trim()
        .strip_prefix("Predicted class: ")
        .expect("summary line");
    assert!(Label::from_name(label).is_some());
}

#[test]
fn test_predict_command_with_seed_is_stable() {
    let dir = TempTestDir::new();
    let image = dir.sample_image();

    let first = run(&["--seed", "9", "predict", arg(&image)]);
    let second = run(&["predict", arg(&image), "--seed", "9"]);
    assert_eq!(stdout(&first), stdout(&second));
}

#[test]
fn test_resize_command() {
    let dir = TempTestDir::new();
    let image = dir.sample_image();
    let out_path = dir.path().join("resized.png");

    let output = run(&["resize", arg(&image), "50", "50", arg(&out_path)]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Image resized to 50x50"));

    let resized = image::open(&out_path).unwrap();
    assert_eq!(resized.dimensions(), (50, 50));
    assert_eq!(resized.color(), image::ColorType::Rgb8);
}

#[test]
fn test_resize_command_invalid_dimensions() {
    let dir = TempTestDir::new();
    let image = dir.sample_image();
    let out_path = dir.path().join("resized.png");

    let output = run(&["resize", arg(&image), "-10", "50", arg(&out_path)]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Error:"));
    assert!(!out_path.exists(), "no output file on failure");
}

#[test]
fn test_resize_command_oversized_target() {
    let dir = TempTestDir::new();
    let image = dir.sample_image();
    let out_path = dir.path().join("huge.png");

    let output = run(&["resize", arg(&image), "200000", "200000", arg(&out_path)]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Error processing image"));
    assert!(!out_path.exists());
}

#[test]
fn test_preprocess_command() {
    let dir = TempTestDir::new();
    let image = dir.grayscale_image();
    let out_path = dir.path().join("preprocessed.png");

    let output = run(&["preprocess", arg(&image), arg(&out_path)]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Image preprocessed (RGB, 224x224)"));

    let preprocessed = image::open(&out_path).unwrap();
    assert_eq!(preprocessed.dimensions(), (224, 224));
    assert_eq!(preprocessed.color(), image::ColorType::Rgb8);
}

#[test]
fn test_preprocess_command_custom_size() {
    let dir = TempTestDir::new();
    let image = dir.sample_image();
    let out_path = dir.path().join("preprocessed.png");

    let output = run(&[
        "preprocess",
        arg(&image),
        arg(&out_path),
        "--width",
        "128",
        "--height",
        "96",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let preprocessed = image::open(&out_path).unwrap();
    assert_eq!(preprocessed.dimensions(), (128, 96));
}

#[test]
fn test_to_rgb_command() {
    let dir = TempTestDir::new();
    let image = dir.grayscale_image();
    let out_path = dir.path().join("rgb.png");

    let output = run(&["to-rgb", arg(&image), arg(&out_path)]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Image converted to RGB"));

    let rgb = image::open(&out_path).unwrap();
    assert_eq!(rgb.color(), image::ColorType::Rgb8);
    assert_eq!(rgb.dimensions(), (100, 100));
}

#[test]
fn test_info_command() {
    let dir = TempTestDir::new();
    let image = dir.sample_image();

    let output = run(&["info", arg(&image)]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("Image information:"));
    assert!(out.contains("Size: 100x100"));
    assert!(out.contains("Mode: RGB"));
}

#[test]
fn test_missing_input_fails() {
    let dir = TempTestDir::new();
    let missing = dir.path().join("missing.png");

    for args in [
        vec!["predict", arg(&missing)],
        vec!["info", arg(&missing)],
    ] {
        let output = run(&args);
        assert!(!output.status.success());
        assert!(stderr(&output).contains("Error:"));
    }
}

#[test]
fn test_non_image_input_fails() {
    let dir = TempTestDir::new();
    let bogus = dir.path().join("notes.txt");
    std::fs::write(&bogus, "not an image").unwrap();

    let output = run(&["predict", arg(&bogus)]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Error processing image"));
}
