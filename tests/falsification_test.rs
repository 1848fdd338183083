//! Popperian Falsification Tests - Dispatch Primitives
//!
//! Each test is a falsifiable claim about the dispatch layer. The suite runs
//! against whichever kernel library the build selected.
//!
//! Run: cargo test --test falsification_test
//! Run (accelerator): cargo test --features accel --test falsification_test

#![allow(clippy::unwrap_used, clippy::float_cmp, clippy::cast_precision_loss)]

use approx::assert_relative_eq;
use proptest::prelude::*;

use trueno_acc::prelude::*;
use trueno_acc::utilities;

fn stream() -> Stream {
    Stream::new().unwrap()
}

// ============================================================================
// SECTION 1: ELEMENTWISE CLAIMS (1-5)
// ============================================================================

/// Claim 1: Scaling by s then 1/s recovers the input
#[test]
fn claim_01_multiply_inverse_recovers_input() {
    let s = stream();
    let data: Vec<f32> = (0..10_000).map(|i| ((i * 37) % 2001) as f32 - 1000.0).collect();
    let mut buf = AccBuffer::from_slice(&data, &s);
    let config = LaunchConfig::default();

    utilities::multiply(&mut buf, 3.7, &config).unwrap();
    utilities::multiply(&mut buf, 1.0 / 3.7, &config).unwrap();

    for (got, want) in buf.to_vec().unwrap().iter().zip(&data) {
        assert!(
            (got - want).abs() <= 1e-4 * want.abs().max(1.0),
            "FALSIFIED: multiply inverse drifted ({got} vs {want})"
        );
    }
}

/// Claim 2: Translating a 3x3 image by dx=1 shifts rows right and leaves the
/// first column untouched
#[test]
fn claim_02_translate_boundary_skip() {
    let s = stream();
    let dims = Dims::new_2d(3, 3);
    let input = AccBuffer::image_from_vec((1..=9).map(|v| v as f32).collect(), dims, &s).unwrap();
    let mut output = AccBuffer::image(dims, &s).unwrap();

    utilities::translate(&input, &mut output, (1, 0), &LaunchConfig::default()).unwrap();

    assert_eq!(
        output.to_vec().unwrap(),
        vec![0.0, 1.0, 2.0, 0.0, 4.0, 5.0, 0.0, 7.0, 8.0],
        "FALSIFIED: translate is not boundary-skip"
    );
}

/// Claim 3: Destinations without a source keep their prior contents
#[test]
fn claim_03_translate_preserves_unwritten_destination() {
    let s = stream();
    let dims = Dims::new_2d(3, 3);
    let input = AccBuffer::image_from_vec(vec![1.0f64; 9], dims, &s).unwrap();
    let mut output = AccBuffer::from_slice(&[-5.0f64; 9], &s);

    utilities::translate(&input, &mut output, (0, 2), &LaunchConfig::default()).unwrap();

    let out = output.to_vec().unwrap();
    assert_eq!(&out[..6], &[-5.0; 6], "FALSIFIED: unwritten rows were modified");
    assert_eq!(&out[6..], &[1.0; 3]);
}

/// Claim 4: 3D translation moves whole slices along z
#[test]
fn claim_04_translate_3d_uses_dz() {
    let s = stream();
    let dims = Dims::new_3d(2, 2, 3);
    let data: Vec<f32> = (0..12).map(|v| v as f32).collect();
    let input = AccBuffer::image_from_vec(data, dims, &s).unwrap();
    let mut output = AccBuffer::image(dims, &s).unwrap();

    utilities::translate(&input, &mut output, (0, 0, -1), &LaunchConfig::new(2).unwrap()).unwrap();

    let out = output.to_vec().unwrap();
    assert_eq!(&out[..8], &[4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0]);
    assert_eq!(&out[8..], &[0.0; 4], "FALSIFIED: last slice should be untouched");
}

/// Claim 5: center_fft applied twice on even extents is the identity
#[test]
fn claim_05_center_fft_even_involution() {
    let s = stream();
    let dims = Dims::new_2d(8, 6);
    let data: Vec<f64> = (0..48).map(f64::from).collect();
    let input = AccBuffer::image_from_vec(data.clone(), dims, &s).unwrap();
    let mut once = AccBuffer::image(dims, &s).unwrap();
    let mut twice = AccBuffer::image(dims, &s).unwrap();
    let config = LaunchConfig::default();

    utilities::center_fft(&input, &mut once, &config).unwrap();
    utilities::center_fft(&once, &mut twice, &config).unwrap();

    assert_eq!(twice.to_vec().unwrap(), data, "FALSIFIED: center_fft is not an involution");
}

// ============================================================================
// SECTION 2: REDUCTION CLAIMS (6-10)
// ============================================================================

/// Claim 6: argmin returns the first occurrence
#[test]
fn claim_06_arg_min_first_occurrence() {
    let s = stream();
    let buf = AccBuffer::from_slice(&[4.0f32, 1.0, 7.0, 1.0], &s);
    let r = utilities::get_arg_min_on_device(&buf).unwrap();
    assert_eq!(r.index, 1, "FALSIFIED: argmin picked index {}", r.index);
    assert_eq!(r.value, 1.0);
}

/// Claim 7: argmin value equals min, argmax value equals max
#[test]
fn claim_07_arg_extrema_agree_with_extrema() {
    let s = stream();
    let data: Vec<f64> = (0..5000).map(|i| ((i * 7919) % 4999) as f64 - 2500.0).collect();
    let buf = AccBuffer::from_slice(&data, &s);

    let min = utilities::get_min_on_device(&buf).unwrap();
    let max = utilities::get_max_on_device(&buf).unwrap();
    let arg_min = utilities::get_arg_min_on_device(&buf).unwrap();
    let arg_max = utilities::get_arg_max_on_device(&buf).unwrap();

    assert_eq!(arg_min.value, min);
    assert_eq!(arg_max.value, max);
    assert_eq!(data[arg_min.index], min);
    assert_eq!(data[arg_max.index], max);
}

/// Claim 8: Sum over 10^6 elements of magnitude <= 10^3 is within 1e-5
/// relative of an f64 reference
#[test]
fn claim_08_sum_relative_tolerance() {
    let s = stream();
    let data: Vec<f32> = (0..1_000_000).map(|i| (i % 16) as f32).collect();
    let reference: f64 = data.iter().map(|&v| f64::from(v)).sum();
    let buf = AccBuffer::from_slice(&data, &s);

    let sum = f64::from(utilities::get_sum_on_device(&buf).unwrap());

    assert_relative_eq!(sum, reference, max_relative = 1e-5);
}

/// Claim 9: Reductions of an empty buffer are rejected before launch
#[test]
fn claim_09_empty_reduction_rejected() {
    let s = stream();
    let empty = AccBuffer::<f32>::new(0, &s);
    for err in [
        utilities::get_sum_on_device(&empty).unwrap_err(),
        utilities::get_min_on_device(&empty).unwrap_err(),
        utilities::get_max_on_device(&empty).unwrap_err(),
        utilities::get_arg_min_on_device(&empty).unwrap_err(),
        utilities::get_arg_max_on_device(&empty).unwrap_err(),
    ] {
        assert_eq!(err.kind(), trueno_acc::ErrorKind::Contract, "FALSIFIED: {err}");
    }
}

/// Claim 10: Single-element reductions return that element at index 0
#[test]
fn claim_10_single_element_reduction() {
    let s = stream();
    let buf = AccBuffer::from_slice(&[-3.25f64], &s);
    assert_eq!(utilities::get_sum_on_device(&buf).unwrap(), -3.25);
    let r = utilities::get_arg_max_on_device(&buf).unwrap();
    assert_eq!((r.index, r.value), (0, -3.25));
}

// ============================================================================
// SECTION 3: COMPACTION CLAIMS (11-15)
// ============================================================================

/// Claim 11: filter [-2, 3, 0, 5, -1] yields [3, 5] with count 2
#[test]
fn claim_11_filter_scenario() {
    let s = stream();
    let input = AccBuffer::from_slice(&[-2.0f32, 3.0, 0.0, 5.0, -1.0], &s);
    let mut output = AccBuffer::new(5, &s);

    let count = utilities::filter_greater_zero_on_device(&input, &mut output).unwrap();

    assert_eq!(count, 2);
    assert_eq!(output.size(), 2, "FALSIFIED: output not resized to the count");
    assert_eq!(output.to_vec().unwrap(), vec![3.0, 5.0]);
}

/// Claim 12: Filtering an all-negative buffer yields an empty output
#[test]
fn claim_12_filter_all_negative() {
    let s = stream();
    let input = AccBuffer::from_slice(&[-1.0f64; 300], &s);
    let mut output = AccBuffer::new(300, &s);
    assert_eq!(utilities::filter_greater_zero_on_device(&input, &mut output).unwrap(), 0);
    assert!(output.is_empty());
}

/// Claim 13: Scan of ones counts up
#[test]
fn claim_13_scan_of_ones() {
    let s = stream();
    let input = AccBuffer::from_slice(&[1.0f32; 4097], &s);
    let mut output = AccBuffer::new(4097, &s);
    utilities::scan_on_device(&input, &mut output).unwrap();
    let out = output.to_vec().unwrap();
    for (i, v) in out.iter().enumerate() {
        assert_eq!(*v, (i + 1) as f32, "FALSIFIED: scan[{i}] = {v}");
    }
}

/// Claim 14: Sort output is non-decreasing and a permutation of the input
#[test]
fn claim_14_sort_ordered_permutation() {
    let s = stream();
    let data: Vec<f64> = (0..3001).map(|i| f64::from((i * 1103) % 977) - 488.0).collect();
    let input = AccBuffer::from_slice(&data, &s);
    let mut output = AccBuffer::new(data.len(), &s);

    utilities::sort_on_device(&input, &mut output).unwrap();

    let mut expected = data;
    expected.sort_by(f64::total_cmp);
    assert_eq!(output.to_vec().unwrap(), expected);
}

/// Claim 15: Sort into a too-small output is a contract violation
#[test]
fn claim_15_sort_output_too_small() {
    let s = stream();
    let input = AccBuffer::from_slice(&[3.0f32, 2.0, 1.0], &s);
    let mut output = AccBuffer::new(2, &s);
    let err = utilities::sort_on_device(&input, &mut output).unwrap_err();
    assert!(matches!(err, Error::BufferTooSmall { required: 3, actual: 2, .. }));
}

// ============================================================================
// SECTION 4: MASK, SPECTRUM AND ORIENTATION CLAIMS (16-20)
// ============================================================================

/// Claim 16: The background mean of a constant volume is that constant
#[test]
fn claim_16_background_mean_of_constant_volume() {
    let s = stream();
    let dims = Dims::new_3d(16, 16, 16);
    let volume = AccBuffer::image_from_vec(vec![0.75f32; dims.count()], dims, &s).unwrap();
    let config = LaunchConfig::new(64).unwrap();
    let mut weights = AccBuffer::new(64, &s);
    let mut values = AccBuffer::new(64, &s);

    utilities::soft_mask_background_value(&volume, CosineMask::new(5.0, 2.0), &mut weights, &mut values, &config)
        .unwrap();

    let mean = utilities::get_sum_on_device(&values).unwrap() / utilities::get_sum_on_device(&weights).unwrap();
    assert_relative_eq!(mean, 0.75, max_relative = 1e-5);
}

/// Claim 17: A 2D image (z = 1) has no z taper: the mask is radially
/// symmetric in the plane
#[test]
fn claim_17_cosine_filter_2d_ignores_z() {
    let s = stream();
    let dims = Dims::new_2d(9, 9);
    let mut volume = AccBuffer::image_from_vec(vec![1.0f64; 81], dims, &s).unwrap();

    utilities::cosine_filter(&mut volume, CosineMask::new(2.0, 2.0), Background::Value(0.0), &LaunchConfig::default())
        .unwrap();

    let out = volume.to_vec().unwrap();
    assert_eq!(out[dims.index(4, 4, 0)], 1.0, "FALSIFIED: center was masked");
    assert_eq!(out[dims.index(1, 4, 0)], out[dims.index(4, 7, 0)]);
    assert_eq!(out[dims.index(0, 0, 0)], 0.0);
}

/// Claim 18: Noise background replaces far voxels by the noise volume
#[test]
fn claim_18_cosine_filter_noise_background() {
    let s = stream();
    let dims = Dims::new_3d(6, 6, 6);
    let noise_data: Vec<f32> = (0..dims.count()).map(|i| (i % 11) as f32).collect();
    let noise = AccBuffer::from_slice(&noise_data, &s);
    let mut volume = AccBuffer::image(dims, &s).unwrap();
    volume.fill(-1.0).unwrap();

    utilities::cosine_filter(&mut volume, CosineMask::new(1.0, 0.5), Background::Noise(&noise), &LaunchConfig::default())
        .unwrap();

    let out = volume.to_vec().unwrap();
    assert_eq!(out[dims.index(3, 3, 3)], -1.0);
    assert_eq!(out[0], noise_data[0]);
    assert_eq!(out[dims.count() - 1], noise_data[dims.count() - 1]);
}

/// Claim 19: Power spectrum conserves the power of all in-range, non-redundant
/// components
#[test]
fn claim_19_power_class_bins_total() {
    let s = stream();
    let dims = Dims::new_2d(9, 16);
    let image = AccBuffer::image_from_vec(vec![AccComplex::new(3.0f64, 4.0); dims.count()], dims, &s).unwrap();
    let mut spectrum = AccBuffer::new(9, &s);
    let mut highres = AccBuffer::new(1, &s);

    utilities::power_class(&image, &mut spectrum, &mut highres, 6, &LaunchConfig::default()).unwrap();

    let bins = spectrum.to_vec().unwrap();
    assert_eq!(bins[0], 0.0, "FALSIFIED: DC term was binned");
    let above: f64 = bins[6..].iter().sum();
    assert_relative_eq!(highres.to_vec().unwrap()[0], above, max_relative = 1e-12);
    assert!(bins.iter().all(|b| (b / 25.0).fract() == 0.0));
}

/// Claim 20: alpha = 0 gives the identity rotation
#[test]
fn claim_20_euler_2d_identity() {
    let s = stream();
    let alphas = AccBuffer::from_slice(&[0.0f32], &s);
    let mut eulers = AccBuffer::new(EULER_STRIDE, &s);

    utilities::make_eulers_2d(&alphas, &mut eulers, Orientation::Normal, &LaunchConfig::default()).unwrap();

    let m = eulers.to_vec().unwrap();
    assert_eq!([m[0], m[1], m[3], m[4]], [1.0, 0.0, 0.0, 1.0], "FALSIFIED: {m:?}");
    assert_eq!(m[8], 1.0);
}

/// Claim 21: Inverted 3D matrices are the transposes of normal ones
#[test]
fn claim_21_euler_3d_inverted_is_transpose() {
    let s = stream();
    let a = AccBuffer::from_slice(&[10.0f64, 200.0, -45.0], &s);
    let b = AccBuffer::from_slice(&[90.0f64, 33.0, 120.0], &s);
    let g = AccBuffer::from_slice(&[-5.0f64, 0.0, 270.0], &s);
    let mut normal = AccBuffer::new(3 * EULER_STRIDE, &s);
    let mut inverted = AccBuffer::new(3 * EULER_STRIDE, &s);
    let config = LaunchConfig::default();

    utilities::make_eulers_3d(&a, &b, &g, &mut normal, Orientation::Normal, None, &config).unwrap();
    utilities::make_eulers_3d(&a, &b, &g, &mut inverted, Orientation::Inverted, None, &config).unwrap();

    let (n, t) = (normal.to_vec().unwrap(), inverted.to_vec().unwrap());
    for k in 0..3 {
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(n[k * 9 + i * 3 + j], t[k * 9 + j * 3 + i]);
            }
        }
    }
}

// ============================================================================
// SECTION 5: STREAM CLAIMS (22-23)
// ============================================================================

/// Claim 22: Work enqueued on one stream is observed in order
#[test]
fn claim_22_same_stream_ordering() {
    let s = stream();
    let mut buf = AccBuffer::from_slice(&[1.0f64; 1024], &s);
    let config = LaunchConfig::default();
    for _ in 0..10 {
        utilities::multiply(&mut buf, 2.0, &config).unwrap();
    }
    let mut scanned = AccBuffer::new(1024, &s);
    utilities::scan_on_device(&buf, &mut scanned).unwrap();
    s.synchronize().unwrap();
    assert_eq!(scanned.to_vec().unwrap()[1023], 1024.0 * 1024.0);
}

/// Claim 23: Independent streams can run unrelated buffers concurrently
#[test]
fn claim_23_independent_streams() {
    let (s1, s2) = (stream(), stream());
    let mut a = AccBuffer::from_slice(&[1.0f32; 512], &s1);
    let mut b = AccBuffer::from_slice(&[2.0f32; 512], &s2);
    let config = LaunchConfig::default();
    utilities::multiply(&mut a, 3.0, &config).unwrap();
    utilities::multiply(&mut b, 5.0, &config).unwrap();
    assert_eq!(utilities::get_sum_on_device(&a).unwrap(), 1536.0);
    assert_eq!(utilities::get_sum_on_device(&b).unwrap(), 5120.0);
}

/// Claim 24: Background statistics are running sums: a second volume adds
/// to the per-thread totals of the first
#[test]
fn claim_24_background_statistics_accumulate() {
    let s = stream();
    let dims = Dims::new_3d(8, 8, 8);
    let ones = AccBuffer::image_from_vec(vec![1.0f64; dims.count()], dims, &s).unwrap();
    let threes = AccBuffer::image_from_vec(vec![3.0f64; dims.count()], dims, &s).unwrap();
    let mask = CosineMask::new(2.0, 1.0);
    let config = LaunchConfig::new(32).unwrap();
    let mut weights = AccBuffer::new(32, &s);
    let mut values = AccBuffer::new(32, &s);

    utilities::soft_mask_background_value(&ones, mask, &mut weights, &mut values, &config).unwrap();
    let once = utilities::get_sum_on_device(&weights).unwrap();
    utilities::soft_mask_background_value(&threes, mask, &mut weights, &mut values, &config).unwrap();

    assert_relative_eq!(utilities::get_sum_on_device(&weights).unwrap(), 2.0 * once, max_relative = 1e-12);
    let mean = utilities::get_sum_on_device(&values).unwrap() / utilities::get_sum_on_device(&weights).unwrap();
    assert_relative_eq!(mean, 2.0, max_relative = 1e-12);
}

// ============================================================================
// SECTION 6: PROPERTY CLAIMS
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Filter output is exactly the positive subsequence
    #[test]
    fn claim_prop_filter_positive_subsequence(data in prop::collection::vec(-10.0f32..10.0, 0..3000)) {
        let s = stream();
        let input = AccBuffer::from_slice(&data, &s);
        let mut output = AccBuffer::new(0, &s);
        let count = utilities::filter_greater_zero_on_device(&input, &mut output).unwrap();
        let expected: Vec<f32> = data.into_iter().filter(|&v| v > 0.0).collect();
        prop_assert_eq!(count, expected.len());
        prop_assert_eq!(output.to_vec().unwrap(), expected);
    }

    /// Scan matches the running sum
    #[test]
    fn claim_prop_scan_running_sum(data in prop::collection::vec(-100i32..100, 1..3000)) {
        let s = stream();
        let values: Vec<f64> = data.iter().map(|&v| f64::from(v)).collect();
        let input = AccBuffer::from_slice(&values, &s);
        let mut output = AccBuffer::new(values.len(), &s);
        utilities::scan_on_device(&input, &mut output).unwrap();
        let mut running = 0.0;
        for (got, v) in output.to_vec().unwrap().iter().zip(&values) {
            running += v;
            prop_assert_eq!(*got, running);
        }
    }

    /// Argmax index is the lowest index holding the maximum
    #[test]
    fn claim_prop_arg_max_lowest_index(data in prop::collection::vec(0u8..8, 1..2000)) {
        let s = stream();
        let values: Vec<f32> = data.iter().map(|&v| f32::from(v)).collect();
        let buf = AccBuffer::from_slice(&values, &s);
        let r = utilities::get_arg_max_on_device(&buf).unwrap();
        let max = values.iter().copied().fold(f32::MIN, f32::max);
        prop_assert_eq!(r.value, max);
        prop_assert_eq!(r.index, values.iter().position(|&v| v == max).unwrap());
    }
}
