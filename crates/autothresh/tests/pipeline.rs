mod common;

use autothresh::core::{Binarizer, PixelData, TileCodec, NO_THRESHOLD};
use autothresh::{
    BatchConfig, BatchError, BatchPipeline, ConfigError, FileError, FileOutcome, FileStage,
    ImageCodec, SuccessPolicy, ThresholdMethod, TiffCodec,
};
use common::{square_u8, write_gray16, write_gray8, write_rgb8};

fn config(input: &std::path::Path, output: &std::path::Path, method: ThresholdMethod) -> BatchConfig {
    let mut cfg = BatchConfig::new(input, output, method);
    cfg.tile_size = 32;
    cfg
}

#[test]
fn batch_writes_binary_images() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_gray8(&input.path().join("a.tif"), 70, 45, &square_u8(70, 45));
    write_gray8(&input.path().join("b.TIFF"), 16, 16, &square_u8(16, 16));
    std::fs::write(input.path().join("notes.txt"), "not an image").unwrap();

    let mut cfg = config(input.path(), output.path(), ThresholdMethod::Otsu);
    cfg.concurrency = 2;
    let report = autothresh::run(&cfg).unwrap();

    assert_eq!(report.files.len(), 2);
    assert!(report.is_success());
    assert!(report.files[0].input.ends_with("a.tif"));

    let decoded = TiffCodec::default()
        .decode(&output.path().join("a.tif"))
        .unwrap();
    assert_eq!((decoded.buffer.width(), decoded.buffer.height()), (70, 45));
    let PixelData::U8(pixels) = decoded.buffer.data() else {
        panic!("expected 8-bit output");
    };
    assert!(pixels.iter().all(|&p| p == 0 || p == 255));
    // Centre is foreground, corner is background.
    assert_eq!(decoded.buffer.get(35, 22), 255);
    assert_eq!(decoded.buffer.get(0, 0), 0);
    let t = report.files[0].threshold().unwrap();
    assert!((40.0..200.0).contains(&t), "t = {t}");
}

#[test]
fn rgb_input_fails_alone() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_rgb8(&input.path().join("color.tif"), 8, 8);
    write_gray8(&input.path().join("gray.tif"), 16, 16, &square_u8(16, 16));

    let report = autothresh::run(&config(input.path(), output.path(), ThresholdMethod::Huang)).unwrap();

    let color = &report.files[0];
    match &color.outcome {
        FileOutcome::Failed { stage, error } => {
            assert_eq!(*stage, FileStage::Discovered);
            assert!(matches!(error, FileError::UnsupportedImageShape(_)), "{error}");
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(report.files[1].is_written());
    assert!(!output.path().join("color.tif").exists());
    assert!(!report.is_success());

    let mut any = config(input.path(), output.path(), ThresholdMethod::Huang);
    any.success_policy = SuccessPolicy::AnyWritten;
    assert!(autothresh::run(&any).unwrap().is_success());
}

#[test]
fn sixteen_bit_without_threshold_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("in.tif");
    let dst = dir.path().join("out.tif");
    let data: Vec<u16> = (0..48 * 48).map(|i| (i as u16).wrapping_mul(977)).collect();
    write_gray16(&src, 48, 48, &data);

    let codec = TiffCodec::default();
    let decoded = codec.decode(&src).unwrap();
    let unchanged = Binarizer::default().binarize(decoded.buffer.clone(), NO_THRESHOLD);
    let tiles = TileCodec::for_buffer(&unchanged, 64, codec.byte_order()).unwrap();
    assert_eq!(tiles.grid().tile_count(), 1);
    codec
        .encode(&dst, tiles.grid(), &decoded.metadata, &tiles.split(&unchanged))
        .unwrap();

    let again = codec.decode(&dst).unwrap();
    assert_eq!(again.buffer, decoded.buffer);
    assert_eq!(again.metadata, decoded.metadata);
}

#[test]
fn manual_threshold_applies_verbatim() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let data: Vec<u16> = (0..32 * 32).map(|i| i as u16 * 50).collect();
    write_gray16(&input.path().join("ramp.tif"), 32, 32, &data);

    let mut cfg = config(input.path(), output.path(), ThresholdMethod::Manual);
    cfg.threshold_value = Some(25_000.0);
    let report = autothresh::run(&cfg).unwrap();
    assert_eq!(report.files[0].threshold(), Some(25_000.0));

    let out = TiffCodec::default()
        .decode(&output.path().join("ramp.tif"))
        .unwrap();
    // Sample 500 is 25000 (not above), sample 501 is 25050.
    assert_eq!(out.buffer.get(20, 15), 0);
    assert_eq!(out.buffer.get(21, 15), 65535);
}

#[test]
fn manual_on_constant_image_thresholds_at_zero() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_gray8(&input.path().join("flat.tif"), 16, 16, &[100; 16 * 16]);

    let mut cfg = config(input.path(), output.path(), ThresholdMethod::Manual);
    cfg.threshold_value = Some(200.0);
    let report = autothresh::run(&cfg).unwrap();
    assert_eq!(report.files[0].threshold(), Some(0.0));

    let out = TiffCodec::default()
        .decode(&output.path().join("flat.tif"))
        .unwrap();
    let PixelData::U8(pixels) = out.buffer.data() else {
        panic!("expected 8-bit output");
    };
    assert!(pixels.iter().all(|&p| p == 255));
}

#[test]
fn threshold_report_lists_every_file() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_gray8(&input.path().join("one.tif"), 20, 20, &square_u8(20, 20));
    write_rgb8(&input.path().join("two.tif"), 4, 4);

    let report_path = output.path().join("thresholds.json");
    let mut cfg = config(input.path(), &output.path().join("masks"), ThresholdMethod::Li);
    cfg.threshold_report = Some(report_path.clone());
    autothresh::run(&cfg).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(report_path).unwrap()).unwrap();
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows[0]["threshold"].is_number());
    assert_eq!(rows[1]["stage"], "discovered");
}

#[test]
fn missing_input_is_fatal() {
    let output = tempfile::tempdir().unwrap();
    let missing = output.path().join("nope");
    let err = autothresh::run(&config(&missing, output.path(), ThresholdMethod::Otsu)).unwrap_err();
    assert!(matches!(err, BatchError::InputNotFound(_)), "{err}");
}

#[test]
fn empty_input_is_fatal() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    std::fs::write(input.path().join("readme.md"), "#").unwrap();
    let err = autothresh::run(&config(input.path(), output.path(), ThresholdMethod::Otsu)).unwrap_err();
    assert!(matches!(err, BatchError::EmptyInput(_)), "{err}");
}

#[test]
fn output_that_is_a_file_is_fatal() {
    let input = tempfile::tempdir().unwrap();
    write_gray8(&input.path().join("a.tif"), 16, 16, &square_u8(16, 16));
    let blocker = input.path().join("blocker");
    std::fs::write(&blocker, "x").unwrap();
    let err = autothresh::run(&config(input.path(), &blocker, ThresholdMethod::Otsu)).unwrap_err();
    assert!(matches!(err, BatchError::OutputUnwritable { .. }), "{err}");
}

#[test]
fn manual_without_value_is_a_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), dir.path(), ThresholdMethod::Manual);
    let err = BatchPipeline::new(cfg).unwrap_err();
    assert!(matches!(err, BatchError::Configuration(ConfigError::Threshold(_))), "{err}");
}

#[test]
fn existing_output_directory_is_reused() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_gray8(&input.path().join("a.tif"), 16, 16, &square_u8(16, 16));
    let cfg = config(input.path(), output.path(), ThresholdMethod::Mean);
    assert!(autothresh::run(&cfg).unwrap().is_success());
    assert!(autothresh::run(&cfg).unwrap().is_success());
}
