use regionscan::template::rotate::rotate_u8_bilinear;
use regionscan::{
    detect_template_matches, Image, MatchConfig, MergeStrategy, OwnedImage, Rect, Summary,
    TemplateDetector,
};

fn make_scene(width: usize, height: usize) -> OwnedImage {
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let value = ((x * 13) ^ (y * 7) ^ (x * y)) & 0xFF;
            data.push(value as u8);
        }
    }
    OwnedImage::new(data, width, height).unwrap()
}

fn extract_patch(
    image: &OwnedImage,
    x0: usize,
    y0: usize,
    width: usize,
    height: usize,
) -> OwnedImage {
    OwnedImage::from_view(image.view().roi(x0, y0, width, height).unwrap()).unwrap()
}

fn single_transform(threshold: f32) -> MatchConfig {
    MatchConfig {
        scales: vec![1.0],
        rotations_deg: vec![0.0],
        threshold,
        ..MatchConfig::default()
    }
}

#[test]
fn exact_crop_is_found_at_its_origin() {
    let scene = make_scene(96, 80);
    let patch = extract_patch(&scene, 31, 22, 24, 20);
    let scene = Image::from_gray(scene);
    let patch = Image::from_gray(patch);

    let result =
        detect_template_matches(&scene, &patch, Some(&[1.0][..]), Some(&[0.0][..]), Some(1.0))
            .unwrap();
    assert_eq!(result.detected_count(), 1);
    assert_eq!(result.regions()[0].rect, Rect::new(31, 22, 24, 20));
    assert!(result.regions()[0].score.unwrap() > 0.9999);
    assert_eq!(result.source_size(), (96, 80));
    assert_eq!(result.annotated_image().rgb_at(31, 22), Some([0, 255, 0]));
}

#[test]
fn rotated_pattern_is_found_at_matching_angle() {
    let scene = make_scene(96, 96);
    let patch = extract_patch(&scene, 40, 30, 21, 21);
    // The pattern is stored turned by 270 degrees; a further 90 restores it.
    let stored = rotate_u8_bilinear(patch.view(), 270.0, 0);

    let detector = TemplateDetector::new(MatchConfig {
        scales: vec![1.0],
        rotations_deg: vec![0.0, 90.0],
        threshold: 0.95,
        ..MatchConfig::default()
    });
    let result = detector
        .detect(&Image::from_gray(scene), &Image::from_gray(stored))
        .unwrap();
    assert_eq!(result.detected_count(), 1);
    assert_eq!(result.regions()[0].rect, Rect::new(40, 30, 21, 21));
}

#[test]
fn patterns_shrunk_below_minimum_are_skipped() {
    let scene = make_scene(64, 64);
    let patch = extract_patch(&scene, 10, 10, 14, 14);
    let detector = TemplateDetector::new(MatchConfig {
        scales: vec![0.6, 0.5],
        threshold: 0.9,
        ..MatchConfig::default()
    });
    let result = detector
        .detect(&Image::from_gray(scene), &Image::from_gray(patch))
        .unwrap();
    assert_eq!(result.detected_count(), 0);
    assert_eq!(
        result.summary(),
        &Summary::Matches {
            count: 0,
            best_score: None,
        }
    );
}

#[test]
fn pattern_at_minimum_size_is_matched_and_smaller_is_skipped() {
    let scene = make_scene(64, 64);
    let detector = TemplateDetector::new(single_transform(0.99));
    assert_eq!(detector.config().min_template_size, 10);

    let ten = extract_patch(&scene, 20, 14, 10, 10);
    let nine = extract_patch(&scene, 20, 14, 9, 9);
    let scene = Image::from_gray(scene);

    let found = detector.detect(&scene, &Image::from_gray(ten)).unwrap();
    assert_eq!(found.detected_count(), 1);
    assert_eq!(found.regions()[0].rect, Rect::new(20, 14, 10, 10));

    let skipped = detector.detect(&scene, &Image::from_gray(nine)).unwrap();
    assert_eq!(skipped.detected_count(), 0);
    assert!(skipped.regions().is_empty());
}

#[test]
fn repeated_pattern_reports_every_copy() {
    let source = make_scene(40, 40);
    let patch = extract_patch(&source, 8, 6, 16, 16);

    let mut data = vec![0u8; 120 * 60];
    for (x0, y0) in [(10usize, 10usize), (70, 30)] {
        for (row, line) in patch.view().rows().enumerate() {
            let start = (y0 + row) * 120 + x0;
            data[start..start + 16].copy_from_slice(line);
        }
    }
    let scene = Image::from_gray(OwnedImage::new(data, 120, 60).unwrap());

    for merge in [MergeStrategy::Sweep, MergeStrategy::Cluster] {
        let detector = TemplateDetector::new(MatchConfig {
            merge,
            ..single_transform(0.99)
        });
        let result = detector.detect(&scene, &Image::from_gray(patch.clone())).unwrap();
        let rects: Vec<_> = result.regions().iter().map(|r| r.rect).collect();
        assert_eq!(rects, [Rect::new(10, 10, 16, 16), Rect::new(70, 30, 16, 16)]);
    }
}

#[test]
fn repeated_runs_agree() {
    let scene = Image::from_gray(make_scene(80, 64));
    let patch = Image::from_gray(extract_patch(&make_scene(80, 64), 20, 18, 18, 18));
    let detector = TemplateDetector::new(MatchConfig {
        scales: vec![1.0, 0.8],
        rotations_deg: vec![0.0, 10.0, 20.0],
        threshold: 0.7,
        ..MatchConfig::default()
    });
    let first = detector.detect(&scene, &patch).unwrap();
    let second = detector.detect(&scene, &patch).unwrap();
    assert_eq!(first.regions(), second.regions());
    assert!(first.detected_count() >= 1);
}

#[test]
fn empty_grid_axes_are_rejected() {
    let scene = Image::from_gray(make_scene(32, 32));
    let patch = Image::from_gray(extract_patch(&make_scene(32, 32), 0, 0, 12, 12));
    let err = detect_template_matches(&scene, &patch, Some(&[][..]), None, None).unwrap_err();
    assert!(err.is_input_error());
}
