use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regionscan::merge::{merge_overlapping, reduce_close};
use regionscan::morph::{clean, StructuringElement};
use regionscan::{
    Candidate, CloseMergePolicy, ImageView, Mask, MergeStrategy, Rect, RegionScanError,
    TemplatePlan,
};

fn random_rect(rng: &mut StdRng) -> Rect {
    Rect::new(
        rng.random_range(0..200),
        rng.random_range(0..200),
        rng.random_range(1..60),
        rng.random_range(1..60),
    )
}

#[test]
fn image_view_rejects_invalid_dimensions() {
    let data = [0u8; 4];

    let err = ImageView::from_slice(&data, 0, 1).err().unwrap();
    assert_eq!(
        err,
        RegionScanError::InvalidDimensions {
            width: 0,
            height: 1,
        }
    );

    let err = ImageView::new(&data, 4, 1, 3).err().unwrap();
    assert_eq!(
        err,
        RegionScanError::InvalidStride {
            width: 4,
            stride: 3,
        }
    );

    let err = ImageView::new(&data[..3], 2, 2, 2).err().unwrap();
    assert_eq!(err, RegionScanError::BufferTooSmall { needed: 4, got: 3 });
}

#[test]
fn image_view_roi_matches_expected_values() {
    let data: Vec<u8> = (0u8..16).collect();
    let view = ImageView::from_slice(&data, 4, 4).unwrap();

    let roi = view.roi(1, 1, 2, 2).unwrap();
    assert_eq!(roi.stride(), 4);
    assert_eq!(roi.row(0).unwrap(), &[5u8, 6u8]);
    assert_eq!(roi.row(1).unwrap(), &[9u8, 10u8]);
    assert!(roi.get(2, 0).is_none());

    let err = view.roi(3, 3, 2, 2).err().unwrap();
    assert_eq!(
        err,
        RegionScanError::RoiOutOfBounds {
            x: 3,
            y: 3,
            width: 2,
            height: 2,
            img_width: 4,
            img_height: 4,
        }
    );
}

#[test]
fn template_plan_matches_known_stats() {
    let data = [0u8, 1, 2, 3];
    let plan = TemplatePlan::from_view(ImageView::from_slice(&data, 2, 2).unwrap()).unwrap();
    assert_eq!(plan.width(), 2);
    assert_eq!(plan.height(), 2);
    assert!((plan.mean() - 1.5).abs() < 1e-12);
    assert!((plan.var_t() - 5.0).abs() < 1e-12);
    for (value, expected) in plan.t_prime().iter().zip([-1.5, -0.5, 0.5, 1.5]) {
        assert!((value - expected).abs() < 1e-12);
    }
}

#[test]
fn template_plan_rejects_flat_templates() {
    let data = [5u8; 4];
    let err = TemplatePlan::from_view(ImageView::from_slice(&data, 2, 2).unwrap())
        .err()
        .unwrap();
    assert_eq!(
        err,
        RegionScanError::DegenerateTemplate {
            reason: "zero variance",
        }
    );
}

#[test]
fn union_is_commutative_associative_and_enclosing() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..500 {
        let a = random_rect(&mut rng);
        let b = random_rect(&mut rng);
        let c = random_rect(&mut rng);
        assert_eq!(a.union(&b), b.union(&a));
        assert_eq!(a.union(&b).union(&c), a.union(&b.union(&c)));
        let ab = a.union(&b);
        assert!(ab.contains_rect(&a));
        assert!(ab.contains_rect(&b));
    }
}

#[test]
fn merges_never_grow_the_candidate_list() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..100 {
        let count = rng.random_range(0..40);
        let candidates: Vec<Candidate> = (0..count)
            .map(|_| Candidate {
                rect: random_rect(&mut rng),
                score: rng.random_range(0.8..1.0),
            })
            .collect();

        for strategy in [MergeStrategy::Sweep, MergeStrategy::Cluster] {
            let merged = merge_overlapping(candidates.clone(), strategy);
            assert!(merged.len() <= candidates.len());
            // Every input rectangle ends up inside some merged rectangle.
            for cand in &candidates {
                assert!(merged.iter().any(|m| m.rect.contains_rect(&cand.rect)));
            }
        }

        let rects: Vec<Rect> = candidates.iter().map(|c| c.rect).collect();
        for policy in [CloseMergePolicy::KeepFirst, CloseMergePolicy::Union] {
            assert!(reduce_close(&rects, 20.0, policy).len() <= rects.len());
        }
    }
}

#[test]
fn cleanup_keeps_empty_masks_empty() {
    let mask = Mask::zeros(64, 48).unwrap();
    let cleaned = clean(&mask, StructuringElement::square(5).unwrap());
    assert_eq!(cleaned.count_set(), 0);
}
