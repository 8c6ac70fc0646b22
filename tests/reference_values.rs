use approx::assert_relative_eq;
use num_complex::Complex64;
use zbessel::{
    ai, ai_prime, ai_scaled, bessel_i, bessel_j, bessel_k, bessel_y, bi, bi_prime, hankel1,
    Accuracy, Error, Scaling,
};

const INV_PI: f64 = 0.318_309_886_183_790_67;

fn c(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

#[track_caller]
fn assert_close(actual: Complex64, expected: Complex64, rel: f64) {
    let err = (actual - expected).norm();
    assert!(
        err <= rel * expected.norm(),
        "got {actual}, expected {expected} (relative error {:e})",
        err / expected.norm()
    );
}

fn i(order: f64, z: Complex64) -> Complex64 {
    bessel_i(order, z, Scaling::Unscaled).unwrap().value
}

fn k(order: f64, z: Complex64) -> Complex64 {
    bessel_k(order, z, Scaling::Unscaled).unwrap().value
}

#[test]
fn tabulated_scenarios() {
    assert_relative_eq!(
        ai(c(5.0, 0.0)).unwrap().re,
        1.083_444_281_360_744_17e-4,
        max_relative = 1e-13
    );
    assert_relative_eq!(bi(c(5.0, 0.0)).unwrap().re, 657.792_044_171_171_18, max_relative = 1e-13);
    assert_close(i(0.0, c(0.4, 0.1)), c(1.037_751_775_187_953_9, 0.020_377_126_774_808_105), 1e-14);
    assert_relative_eq!(k(0.0, c(1.0, 0.0)).re, 0.421_024_438_240_708_33, max_relative = 1e-14);
    let h = hankel1(0.0, c(1.0, 0.0), Scaling::Unscaled).unwrap().value;
    assert_close(h, c(0.765_197_686_557_966_55, 0.088_256_964_215_676_958), 1e-14);
    let h0 = hankel1(0.0, c(0.0, 0.0), Scaling::Unscaled).unwrap().value;
    assert!(h0.re.is_infinite() && h0.im.is_infinite());
}

#[test]
fn small_argument_family() {
    let z = c(0.4, 0.1);
    assert_close(i(0.25, z), c(0.763_667_788_955_809_41, 0.058_945_676_897_604_621), 1e-14);
    assert_close(i(1.0, z), c(0.203_260_504_917_781_28, 0.052_966_801_658_563_766), 1e-14);
    assert_close(k(0.0, z), c(1.082_603_509_723_508_1, -0.213_244_596_347_405_56), 1e-14);
    let j = bessel_j(0.0, z, Scaling::Unscaled).unwrap().value;
    assert_close(j, c(0.962_751_345_515_284_45, -0.019_627_116_293_032_714), 1e-14);
    let y = bessel_y(0.0, z, Scaling::Unscaled).unwrap().value;
    assert_close(y, c(-0.587_382_873_598_432_9, 0.175_044_666_365_710_74), 1e-13);
    let ys = bessel_y(0.0, z, Scaling::Exponential).unwrap().value;
    assert_close(ys, c(-0.531_486_002_745_348_43, 0.158_386_963_955_315_68), 1e-13);
}

#[test]
fn left_half_plane_and_large_arguments() {
    let z = c(-1.0, -1.0);
    assert_close(i(0.5, z), c(0.641_838_475_337_985_87, -0.726_980_645_963_554_57), 1e-14);
    assert_close(i(2.5, z), c(0.109_051_251_393_149_9, 0.064_700_017_336_815_79), 1e-13);
    assert_close(i(-2.5, z), c(0.629_429_594_279_951_72, -0.684_143_992_529_602_34), 1e-13);
    assert_relative_eq!(i(0.0, c(5.0, 0.0)).re, 27.239_871_823_604_447, max_relative = 1e-14);
    assert_close(
        i(0.0, c(333.0, -876.0)),
        c(-2.424_669_957_915_728_9e142, -4.862_597_477_816_715_6e142),
        1e-12,
    );
    assert_close(
        k(25.0, c(1.0, 1.0)),
        c(1.243_920_310_213_261e27, -1.296_860_880_863_851_3e27),
        1e-13,
    );
    for (zr, zi, er, ei) in [
        (1.0, 1.0, -0.973_020_320_888_058_17, -1.160_002_999_791_696_9),
        (1.0, -1.0, -0.973_020_320_888_058_17, 1.160_002_999_791_696_9),
        (-1.0, 1.0, 0.817_408_389_550_203_51, 1.176_281_420_040_530_9),
        (-1.0, -1.0, 0.817_408_389_550_203_51, -1.176_281_420_040_530_9),
    ] {
        assert_close(k(2.5, c(zr, zi)), c(er, ei), 1e-13);
    }
}

#[test]
fn modified_wronskian() {
    for &order in &[0.0, 0.3, 1.0, 2.7, 10.5] {
        for &z in &[c(0.7, 0.2), c(3.0, -4.0), c(-2.0, 1.5), c(25.0, 10.0), c(0.1, -0.05)] {
            let w = i(order, z) * k(order + 1.0, z) + i(order + 1.0, z) * k(order, z);
            assert_close(w, z.inv(), 1e-11);
        }
    }
}

#[test]
fn airy_wronskian() {
    for &z in &[c(0.0, 0.0), c(1.0, 0.5), c(-3.0, 2.0), c(4.0, -4.0), c(-8.0, -1.0), c(12.0, 3.0)] {
        let w = ai(z).unwrap() * bi_prime(z).unwrap() - ai_prime(z).unwrap() * bi(z).unwrap();
        assert_close(w, c(INV_PI, 0.0), 1e-11);
    }
}

#[test]
fn scaled_airy_matches_exponential_factor() {
    for &z in &[c(0.5, 0.5), c(2.0, -1.0), c(-1.5, 3.0), c(6.0, 2.0)] {
        let zeta = z * z.sqrt() * (2.0 / 3.0);
        assert_close(ai_scaled(z).unwrap(), ai(z).unwrap() * zeta.exp(), 1e-13);
    }
}

#[test]
fn modified_reflection() {
    let two_over_pi = 2.0 * INV_PI;
    for &order in &[0.25, 1.5, 3.7] {
        for &z in &[c(0.9, 0.4), c(-2.0, 3.0), c(6.0, -1.0)] {
            let s = (core::f64::consts::PI * order).sin();
            let expected = i(order, z) + k(order, z) * (two_over_pi * s);
            assert_close(i(-order, z), expected, 1e-11);
        }
    }
}

#[test]
fn error_taxonomy() {
    assert!(matches!(
        bessel_i(f64::NAN, c(1.0, 0.0), Scaling::Unscaled),
        Err(Error::InvalidInput(_))
    ));
    assert_eq!(bessel_k(0.0, c(800.0, 0.0), Scaling::Unscaled).map(|o| o.value.re), Ok(0.0));
    assert_eq!(bessel_i(0.0, c(800.0, 0.0), Scaling::Unscaled), Err(Error::Overflow));
    assert_eq!(bessel_i(0.0, c(2.0e9, 0.0), Scaling::Exponential), Err(Error::TotalPrecisionLoss));
    let far = bessel_i(0.0, c(1.0e5, 0.0), Scaling::Exponential).unwrap();
    assert_eq!(far.accuracy, Accuracy::Reduced);
}
