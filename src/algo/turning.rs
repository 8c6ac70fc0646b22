//! Uniform expansion about the turning point, in terms of Airy functions.
//!
//! For large ν and `z = νζ_b`, with `w = √(1 - z²/ν²)`,
//!
//! `I(ν, νζ_b)`-type functions ≈ `φ [Ai(ν^{2/3} ζ) A(ζ) / ν^{1/3}
//!                                  + Ai'(ν^{2/3} ζ) B(ζ) / ν^{5/3}]`
//!
//! where `(2/3) ζ^{3/2} = ln((1 + w)/ζ_b) - w` and `φ = (4ζ/w²)^{1/4}`.
//! Near the turning point (|w²| ≤ 1/4) ζ and the sums come from power series
//! in `w²`; elsewhere from closed forms and the Debye polynomials.

#![allow(clippy::excessive_precision)]

#[cfg(not(feature = "std"))]
use num_traits::Float;

use num_complex::Complex64;

use super::constants::{HALF_PI, PI, TWO_THIRDS};
use super::debye::U_COEFFS;
use crate::complex::{modulus, quotient, CONE, CZERO};

/// 3π/2.
const THREE_HALVES_PI: f64 = 4.71238898038468986e+00;

/// Terms of the power series in `w²`.
const SERIES_TERMS: usize = 30;

/// Leading factors of the A-sum coefficients.
#[rustfmt::skip]
const A_LEAD: [f64; 14] = [
    1.00000000000000000e+00, 1.04166666666666667e-01,
    8.35503472222222222e-02, 1.28226574556327160e-01,
    2.91849026464140464e-01, 8.81627267443757652e-01,
    3.32140828186276754e+00, 1.49957629868625547e+01,
    7.89230130115865181e+01, 4.74451538868264323e+02,
    3.20749009089066193e+03, 2.40865496408740049e+04,
    1.98923119169509794e+05, 1.79190200777534383e+06,
];

/// Leading factors of the B-sum coefficients.
#[rustfmt::skip]
const B_LEAD: [f64; 14] = [
    1.00000000000000000e+00, -1.45833333333333333e-01,
    -9.87413194444444444e-02, -1.43312053915895062e-01,
    -3.17227202678413548e-01, -9.42429147957120249e-01,
    -3.51120304082635426e+00, -1.57272636203680451e+01,
    -8.22814390971859444e+01, -4.92355370523670524e+02,
    -3.31621856854797251e+03, -2.48276742452085896e+04,
    -2.04526587315129788e+05, -1.83844491706820990e+06,
];

/// Power-series coefficients of the A-sum terms near the turning point,
/// 30 per power of `1/ν²`.
#[rustfmt::skip]
const ALPHA: [f64; 180] = [
    // alpha_0
    -4.44444444444444444e-03, -9.22077922077922078e-04, -8.84892884892884893e-05,
    1.65927687832449737e-04, 2.46691372741792910e-04, 2.65995589346254780e-04,
    2.61824297061500945e-04, 2.48730437344655609e-04, 2.32721040083232098e-04,
    2.16362485712365082e-04, 2.00738858762752355e-04, 1.86267636637545172e-04,
    1.73060775917876493e-04, 1.61091705929015752e-04, 1.50274774160908134e-04,
    1.40503497391269794e-04, 1.31668816545922806e-04, 1.23667445598253261e-04,
    1.16405271474737902e-04, 1.09798298372713369e-04, 1.03772410422992823e-04,
    9.82626078369363448e-05, 9.32120517249503256e-05, 8.85710852478711718e-05,
    8.42963105715700223e-05, 8.03497548407791151e-05, 7.66981345359207388e-05,
    7.33122157481777809e-05, 7.01662625163141333e-05, 6.72375633790160292e-05,
    // alpha_1
    6.93735541354588974e-04, 2.32241745182921654e-04, -1.41986273556691197e-05,
    -1.16444931672048640e-04, -1.50803558053048762e-04, -1.55121924918096223e-04,
    -1.46809756646465549e-04, -1.33815503867491367e-04, -1.19744975684254051e-04,
    -1.06184319207974020e-04, -9.37699549891194492e-05, -8.26923045588193274e-05,
    -7.29374348155221211e-05, -6.44042357721016283e-05, -5.69611566009369048e-05,
    -5.04731044303561628e-05, -4.48134868008882786e-05, -3.98688727717598864e-05,
    -3.55400532972042498e-05, -3.17414256609022480e-05, -2.83996793904174811e-05,
    -2.54522720634870566e-05, -2.28459297164724555e-05, -2.05352753106480604e-05,
    -1.84816217627666085e-05, -1.66519330021393806e-05, -1.50179412980119482e-05,
    -1.35554031379040526e-05, -1.22434746473858131e-05, -1.10641884811308169e-05,
    // alpha_2
    -3.54211971457743841e-04, -1.56161263945159416e-04, 3.04465503594936410e-05,
    1.30198655773242693e-04, 1.67471106699712269e-04, 1.70222587683592569e-04,
    1.56501427608594704e-04, 1.36339170977445120e-04, 1.14886692029825128e-04,
    9.45869093034688111e-05, 7.64498419250898258e-05, 6.07570334965197354e-05,
    4.74394299290508799e-05, 3.62757512005344297e-05, 2.69939714979224901e-05,
    1.93210938247939253e-05, 1.30056674793963203e-05, 7.82620866744496661e-06,
    3.59257485819351583e-06, 1.44040049814251817e-07, -2.65396769697939116e-06,
    -4.91346867098485910e-06, -6.72739296091248287e-06, -8.17269379678657923e-06,
    -9.31304715093561232e-06, -1.02011418798016441e-05, -1.08805962510592880e-05,
    -1.13875481509603555e-05, -1.17519675674556414e-05, -1.19987364870944141e-05,
    // alpha_3
    3.78194199201772914e-04, 2.02471952761816167e-04, -6.37938506318862408e-05,
    -2.38598230603005903e-04, -3.10916256027361568e-04, -3.13680115247576316e-04,
    -2.78950273791323387e-04, -2.28564082619141374e-04, -1.75245280340846749e-04,
    -1.25544063060690348e-04, -8.22982872820208365e-05, -4.62860730588116458e-05,
    -1.72334302366962267e-05, 5.60690482304602267e-06, 2.31395443148286800e-05,
    3.62642745856793957e-05, 4.58006124490188752e-05, 5.24595294959114050e-05,
    5.68396208545815266e-05, 5.94349820393104052e-05, 6.06478527578421742e-05,
    6.08023907788436497e-05, 6.01577894539460388e-05, 5.89199657344698500e-05,
    5.72515823777593053e-05, 5.52804375585852577e-05, 5.31063773802880170e-05,
    5.08069302012325706e-05, 4.84418647620094842e-05, 4.60568581607475370e-05,
    // alpha_4
    -6.91141397288294174e-04, -4.29976633058871912e-04, 1.83067735980039018e-04,
    6.60088147542014144e-04, 8.75964969951185931e-04, 8.77335235958235514e-04,
    7.49369585378990637e-04, 5.63832329756980918e-04, 3.68059319971443156e-04,
    1.88464535514455599e-04, 3.70663057664904149e-05, -8.28520220232137023e-05,
    -1.72751952869172998e-04, -2.36314873605872983e-04, -2.77966150694906658e-04,
    -3.02079514155456919e-04, -3.12594712643820127e-04, -3.12872558758067163e-04,
    -3.05678038466324377e-04, -2.93226470614557331e-04, -2.77255655582934777e-04,
    -2.59103928467031709e-04, -2.39784014396480342e-04, -2.20048260045422848e-04,
    -2.00443911094971498e-04, -1.81358692210970687e-04, -1.63057674478657464e-04,
    -1.45712672175205844e-04, -1.29425421983924587e-04, -1.14245691942445952e-04,
    // alpha_5
    1.92821964248775885e-03, 1.35592576302022234e-03, -7.17858090421302995e-04,
    -2.58084802575270346e-03, -3.49271130826168475e-03, -3.46986299340960628e-03,
    -2.82285233351310182e-03, -1.88103076404891354e-03, -8.89531718383947600e-04,
    3.87912102631035228e-06, 7.28688540119691412e-04, 1.26566373053457758e-03,
    1.62518158372674427e-03, 1.83203153216373172e-03, 1.91588388990527909e-03,
    1.90588846755546138e-03, 1.82798982421825727e-03, 1.70389506421121530e-03,
    1.55097127171097686e-03, 1.38261421852276159e-03, 1.20881424230064774e-03,
    1.03676532638344962e-03, 8.71437918068619115e-04, 7.16080155297701002e-04,
    5.72637002558129372e-04, 4.42089819465802277e-04, 3.24724948503090564e-04,
    2.20342042730246599e-04, 1.28412898401353882e-04, 4.82005924552095464e-05,
];

/// Power-series coefficients of the B-sum terms near the turning point,
/// 30 per power of `1/ν²`.
#[rustfmt::skip]
const BETA: [f64; 210] = [
    // beta_0
    1.79988721413553309e-02, 5.59964911064388073e-03, 2.88501402231132779e-03,
    1.80096606761053941e-03, 1.24753110589199202e-03, 9.22878876572938311e-04,
    7.14430421727287357e-04, 5.71787281789704872e-04, 4.69431007606481533e-04,
    3.93232835462916638e-04, 3.34818889318297664e-04, 2.88952148495751517e-04,
    2.52211615549573284e-04, 2.22280580798883327e-04, 1.97541838033062524e-04,
    1.76836855019718004e-04, 1.59316899661821081e-04, 1.44347930197333986e-04,
    1.31448068119965379e-04, 1.20245444949302884e-04, 1.10449144504599392e-04,
    1.01828770740567258e-04, 9.41998224204237509e-05, 8.74130545753834437e-05,
    8.13466262162801467e-05, 7.59002269646219339e-05, 7.09906300634153481e-05,
    6.65482874842468183e-05, 6.25146958969275078e-05, 5.88403394426251749e-05,
    // beta_1
    -1.49282953213429172e-03, -8.78204709546389328e-04, -5.02916549572034614e-04,
    -2.94822138512746025e-04, -1.75463996970782828e-04, -1.04008550460816434e-04,
    -5.96141953046457895e-05, -3.12038929076098340e-05, -1.26089735980230047e-05,
    -2.42892608575730389e-07, 8.05996165414273571e-06, 1.36507009262147391e-05,
    1.73964125472926261e-05, 1.98672978842133780e-05, 2.14463263790822639e-05,
    2.23954659232456514e-05, 2.28967783814712629e-05, 2.30785389811177817e-05,
    2.30321976080909144e-05, 2.28236073720348722e-05, 2.25005881105292418e-05,
    2.20981015361991429e-05, 2.16418427448103905e-05, 2.11507649256220843e-05,
    2.06388749782170737e-05, 2.01165241997081666e-05, 1.95913450141179244e-05,
    1.90689367910436740e-05, 1.85533719641636667e-05, 1.80475722259674218e-05,
    // beta_2
    5.52213076721292790e-04, 4.47932581552384646e-04, 2.79520653992020589e-04,
    1.52468156198446602e-04, 6.93271105657043598e-05, 1.76258683069991397e-05,
    -1.35744996343269136e-05, -3.17972413350427135e-05, -4.18861861696693365e-05,
    -4.69004889379141029e-05, -4.87665447413787352e-05, -4.87010031186735069e-05,
    -4.74755620890086638e-05, -4.55813058138628452e-05, -4.33309644511266036e-05,
    -4.09230193157750364e-05, -3.84822638603221274e-05, -3.60857167535410501e-05,
    -3.37793306123367417e-05, -3.15888560772109621e-05, -2.95269561750807315e-05,
    -2.75978914828335759e-05, -2.58006174666883713e-05, -2.41308356761280200e-05,
    -2.25823509518346033e-05, -2.11479656768912971e-05, -1.98200638885294927e-05,
    -1.85909870801065077e-05, -1.74532699844210224e-05, -1.63997823854497997e-05,
    // beta_3
    -4.74617796559959808e-04, -4.77864567147321487e-04, -3.20390228067037603e-04,
    -1.61105016119962282e-04, -4.25778101285435204e-05, 3.44571294294967503e-05,
    7.97092684075674924e-05, 1.03138236708272200e-04, 1.12466775262204158e-04,
    1.13103642108481389e-04, 1.08651634848774268e-04, 1.01437951597661973e-04,
    9.29298396593363896e-05, 8.40293133016089978e-05, 7.52727991349134062e-05,
    6.69632521975730872e-05, 5.92564547323194704e-05, 5.22169308826975567e-05,
    4.58539485165360646e-05, 4.01445513891486808e-05, 3.50481730031328081e-05,
    3.05157995034346659e-05, 2.64956119950516039e-05, 2.29363633690998152e-05,
    1.97893056664021636e-05, 1.70091984636412623e-05, 1.45547428261524004e-05,
    1.23886640995878413e-05, 1.04775876076583236e-05, 8.79179954978479373e-06,
    // beta_4
    7.36465810572578444e-04, 8.72790805146193976e-04, 6.22614862573135066e-04,
    2.85998154194304147e-04, 3.84737672879366102e-06, -1.87906003636971558e-04,
    -2.97603646594554535e-04, -3.45998126832656348e-04, -3.53382470916037712e-04,
    -3.35715635775048757e-04, -3.04321124789039809e-04, -2.66722723047612821e-04,
    -2.27654214122819527e-04, -1.89922611854562356e-04, -1.55058918599093870e-04,
    -1.23778240761873630e-04, -9.62926147717644187e-05, -7.25178327714425337e-05,
    -5.22070028895633801e-05, -3.50347750511900522e-05, -2.06489761035551757e-05,
    -8.70106096849767054e-06, 1.13698686675100290e-06, 9.16426474122778849e-06,
    1.56477785428872620e-05, 2.08223629482466847e-05, 2.48923381004595156e-05,
    2.80340509574146325e-05, 3.03987774629861915e-05, 3.21156731406700616e-05,
    // beta_5
    -1.80182191963885708e-03, -2.43402962938042533e-03, -1.83422663549856802e-03,
    -7.62204596354009765e-04, 2.39079475256927218e-04, 9.49266117176881141e-04,
    1.34467449701540359e-03, 1.48457495259449178e-03, 1.44732339830617591e-03,
    1.30268261285657186e-03, 1.10351597375642682e-03, 8.86047440419791759e-04,
    6.73073208165665473e-04, 4.77603872856582378e-04, 3.05991926358789362e-04,
    1.60315694594721630e-04, 4.00749555270613286e-05, -5.66607461635251611e-05,
    -1.32506186772982638e-04, -1.90296187989614057e-04, -2.32811450376937408e-04,
    -2.62628811464668841e-04, -2.82050469867598672e-04, -2.93081563192861167e-04,
    -2.97435962176316616e-04, -2.96557334239348078e-04, -2.91647363312090861e-04,
    -2.83696203837734166e-04, -2.73512317095673346e-04, -2.61750155806768580e-04,
    // beta_6
    6.38585891212050914e-03, 9.62374215806377941e-03, 7.61878061207001043e-03,
    2.83219055545628054e-03, -2.09841352012720090e-03, -5.73826764216626498e-03,
    -7.70804244495414620e-03, -8.21011692264844401e-03, -7.65824520346905413e-03,
    -6.47209729391045177e-03, -4.99132412004966473e-03, -3.45612289713133280e-03,
    -2.01785580014170775e-03, -7.59430686781961401e-04, 2.84173631523859138e-04,
    1.10891667586337403e-03, 1.72901493872728771e-03, 2.16812590802684701e-03,
    2.45357710494539735e-03, 2.61281821058334862e-03, 2.67141039656276912e-03,
    2.65203073395980430e-03, 2.57411652877287315e-03, 2.45389126236094427e-03,
    2.30460058071795494e-03, 2.13684837686712662e-03, 1.95896528478870911e-03,
    1.77737008679454412e-03, 1.59690280765839059e-03, 1.42111975664438546e-03,
];

/// Power series of `ζ/w²` in `w²`.
#[rustfmt::skip]
const GAMMA: [f64; 30] = [
    6.29960524947436582e-01, 2.51984209978974633e-01, 1.54790300415655846e-01,
    1.10713062416159013e-01, 8.57309395527394825e-02, 6.97161316958684292e-02,
    5.86085671893713576e-02, 5.04698873536310685e-02, 4.42600580689154809e-02,
    3.93720661543509966e-02, 3.54283195924455368e-02, 3.21818857502098231e-02,
    2.94646240791157679e-02, 2.71581677112934479e-02, 2.51768272973861779e-02,
    2.34570755306078891e-02, 2.19508390134907203e-02, 2.06210828235646240e-02,
    1.94388240897880846e-02, 1.83810633800683158e-02, 1.74293213231963172e-02,
    1.65685837786612353e-02, 1.57865285987918445e-02, 1.50729501494095594e-02,
    1.44193250839954639e-02, 1.38184805735341786e-02, 1.32643378994276568e-02,
    1.27517121970498651e-02, 1.22761545318762767e-02, 1.18338262398482403e-02,
];

/// Quantities of the turning-point expansion at one `(z, ν)`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TurningPointExpansion {
    pub phi: Complex64,
    /// `ν^{2/3} ζ`, the Airy argument.
    pub arg: Complex64,
    pub zeta1: Complex64,
    pub zeta2: Complex64,
    pub asum: Complex64,
    pub bsum: Complex64,
}

impl TurningPointExpansion {
    /// `phi`, `arg`, `ζ₁` and `ζ₂` only.
    pub(crate) fn leading(z: Complex64, fnu: f64, tiny: f64, tol: f64) -> Self {
        Self::build(z, fnu, tiny, tol, false)
    }

    /// Everything, including the A and B sums.
    pub(crate) fn new(z: Complex64, fnu: f64, tiny: f64, tol: f64) -> Self {
        Self::build(z, fnu, tiny, tol, true)
    }

    fn build(z: Complex64, fnu: f64, tiny: f64, tol: f64, with_sums: bool) -> Self {
        let rfnu = 1.0 / fnu;
        let test = tiny * 1.0e3;
        let ac = fnu * test;
        if z.re.abs() <= ac && z.im.abs() <= ac {
            return TurningPointExpansion {
                phi: CONE,
                arg: CONE,
                zeta1: Complex64::new(2.0 * test.ln().abs() + fnu, 0.0),
                zeta2: Complex64::new(fnu, 0.0),
                asum: CZERO,
                bsum: CZERO,
            };
        }

        let zb = z * rfnu;
        let fn13 = fnu.cbrt();
        let scales = Scales {
            fnu,
            fn23: fn13 * fn13,
            rfn13: 1.0 / fn13,
            rfnu,
            rfnu2: rfnu * rfnu,
            tol,
        };
        let w2 = CONE - zb * zb;
        let aw2 = modulus(w2);
        if aw2 <= 0.25 {
            near_turning_point(w2, aw2, &scales, with_sums)
        } else {
            away_from_turning_point(w2, aw2, zb, &scales, with_sums)
        }
    }
}

struct Scales {
    fnu: f64,
    fn23: f64,
    rfn13: f64,
    rfnu: f64,
    rfnu2: f64,
    tol: f64,
}

/// |w²| ≤ 1/4: ζ, A and B as power series in `w²`.
fn near_turning_point(
    w2: Complex64,
    aw2: f64,
    sc: &Scales,
    with_sums: bool,
) -> TurningPointExpansion {
    let tol = sc.tol;
    let mut p = [CZERO; SERIES_TERMS];
    let mut ap = [0.0; SERIES_TERMS];
    p[0] = CONE;
    ap[0] = 1.0;
    let mut suma = Complex64::new(GAMMA[0], 0.0);
    let mut kmax = 1;
    if aw2 >= tol {
        kmax = SERIES_TERMS;
        for k in 1..SERIES_TERMS {
            p[k] = p[k - 1] * w2;
            suma += p[k] * GAMMA[k];
            ap[k] = ap[k - 1] * aw2;
            if ap[k] < tol {
                kmax = k + 1;
                break;
            }
        }
    }

    let zeta = w2 * suma;
    let arg = zeta * sc.fn23;
    let za = suma.sqrt();
    let zeta2 = w2.sqrt() * sc.fnu;
    let zeta1 = (CONE + zeta * za * TWO_THIRDS) * zeta2;
    let phi = (za + za).sqrt() * sc.rfn13;

    let mut out = TurningPointExpansion {
        phi,
        arg,
        zeta1,
        zeta2,
        asum: CZERO,
        bsum: CZERO,
    };
    if !with_sums {
        return out;
    }

    // Partial sum of p[k] * coeffs[k] that stops once ap[k] drops below atol.
    let partial = |coeffs: &[f64], atol: f64| -> Complex64 {
        let mut s = CZERO;
        for k in 0..kmax {
            s += p[k] * coeffs[k];
            if ap[k] < atol {
                break;
            }
        }
        s
    };

    let mut bsum: Complex64 = p[..kmax].iter().zip(&BETA[..kmax]).map(|(pk, b)| *pk * *b).sum();
    let mut asum = CZERO;
    let btol = tol * (bsum.re.abs() + bsum.im.abs());
    let mut atol = tol;
    let mut pp = 1.0;
    let mut a_done = false;
    let mut b_done = false;
    if sc.rfnu2 >= tol {
        for block in 1..7 {
            atol /= sc.rfnu2;
            pp *= sc.rfnu2;
            if !a_done {
                let lo = (block - 1) * SERIES_TERMS;
                asum += partial(&ALPHA[lo..lo + SERIES_TERMS], atol) * pp;
                a_done = pp < tol;
            }
            if !b_done {
                let lo = block * SERIES_TERMS;
                bsum += partial(&BETA[lo..lo + SERIES_TERMS], atol) * pp;
                b_done = pp < btol;
            }
            if a_done && b_done {
                break;
            }
        }
    }
    out.asum = asum + CONE;
    out.bsum = bsum * (sc.rfnu * sc.rfn13);
    out
}

/// |w²| > 1/4: ζ in closed form, A and B from the Debye polynomials.
fn away_from_turning_point(
    w2: Complex64,
    aw2: f64,
    zb: Complex64,
    sc: &Scales,
    with_sums: bool,
) -> TurningPointExpansion {
    let tol = sc.tol;
    let fnu = sc.fnu;

    // Branches are pinned to the first quadrant; callers reflect the rest.
    let ws = w2.sqrt();
    let w = Complex64::new(ws.re.max(0.0), ws.im.max(0.0));
    let zc = quotient(CONE + w, zb).ln();
    let zc = Complex64::new(zc.re.max(0.0), zc.im.clamp(0.0, HALF_PI));
    let zth = (zc - w) * 1.5;
    let zeta1 = zc * fnu;
    let zeta2 = w * fnu;

    let azth = modulus(zth);
    let ang = if zth.re >= 0.0 && zth.im < 0.0 {
        THREE_HALVES_PI
    } else if zth.re == 0.0 {
        HALF_PI
    } else {
        let a = (zth.im / zth.re).atan();
        if zth.re < 0.0 {
            a + PI
        } else {
            a
        }
    };
    let pp = azth.powf(TWO_THIRDS);
    let ang = ang * TWO_THIRDS;
    let zeta = Complex64::new(pp * ang.cos(), (pp * ang.sin()).max(0.0));
    let arg = zeta * sc.fn23;
    let rtzt = quotient(zth, zeta);
    let za = quotient(rtzt, w);
    let phi = (za + za).sqrt() * sc.rfn13;

    let mut out = TurningPointExpansion {
        phi,
        arg,
        zeta1,
        zeta2,
        asum: CZERO,
        bsum: CZERO,
    };
    if !with_sums {
        return out;
    }

    let raw = 1.0 / aw2.sqrt();
    let tfn = w.conj() * (raw * raw * sc.rfnu);
    let razth = 1.0 / azth;
    let rzth = zth.conj() * (razth * razth * sc.rfnu);
    let zc = rzth * A_LEAD[1];
    let raw2 = 1.0 / aw2;
    let t2 = w2.conj() * (raw2 * raw2);

    let mut up = [CZERO; 14];
    up[0] = CONE;
    up[1] = (t2 * U_COEFFS[1] + U_COEFFS[2]) * tfn;
    let mut bsum = up[1] + zc;
    let mut asum = CZERO;

    if sc.rfnu >= tol {
        let mut cr = [CZERO; 14];
        let mut dr = [CZERO; 14];
        let mut przth = rzth;
        let mut ptfn = tfn;
        let mut pp = 1.0;
        let btol = tol * (bsum.re.abs() + bsum.im.abs());
        let mut ks = 0;
        let mut kp1 = 2;
        let mut l = 3;
        let mut a_done = false;
        let mut b_done = false;

        for lr in (2..=12).step_by(2) {
            let lrp1 = lr + 1;
            // Two more Debye terms and the matching A/B products.
            for _ in lr..=lrp1 {
                ks += 1;
                kp1 += 1;
                let mut poly = Complex64::new(U_COEFFS[l], 0.0);
                for &c in &U_COEFFS[l + 1..l + kp1] {
                    poly = poly * t2 + c;
                }
                l += kp1;
                ptfn *= tfn;
                up[kp1 - 1] = ptfn * poly;
                cr[ks - 1] = przth * B_LEAD[ks];
                przth *= rzth;
                dr[ks - 1] = przth * A_LEAD[ks + 1];
            }
            pp *= sc.rfnu2;

            if !a_done {
                let mut suma = up[lrp1 - 1];
                for (jr, c) in cr[..lr].iter().enumerate() {
                    suma += *c * up[lrp1 - 2 - jr];
                }
                asum += suma;
                a_done = pp < tol && suma.re.abs() + suma.im.abs() < tol;
            }
            if !b_done {
                let mut sumb = up[lr + 1] + up[lrp1 - 1] * zc;
                for (jr, d) in dr[..lr].iter().enumerate() {
                    sumb += *d * up[lrp1 - 2 - jr];
                }
                bsum += sumb;
                b_done = pp < btol && sumb.re.abs() + sumb.im.abs() < btol;
            }
            if a_done && b_done {
                break;
            }
        }
    }

    out.asum = asum + CONE;
    out.bsum = quotient(-bsum * sc.rfn13, rtzt);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::WorkingPrecision;

    fn expansion(z: Complex64, fnu: f64) -> TurningPointExpansion {
        let wp = WorkingPrecision::standard();
        TurningPointExpansion::new(z, fnu, wp.tiny, wp.tol)
    }

    #[test]
    fn series_and_closed_form_agree_across_the_switch() {
        // |w²| just below and just above 1/4 for ν = 100.
        let fnu = 100.0;
        let inner = expansion(Complex64::new(fnu * 0.8661, 0.0), fnu);
        let outer = expansion(Complex64::new(fnu * 0.8659, 0.0), fnu);
        assert!((inner.phi - outer.phi).norm() < 1e-3 * outer.phi.norm());
        assert!((inner.asum - outer.asum).norm() < 1e-3);
        assert!((inner.zeta1 - inner.zeta2 - (outer.zeta1 - outer.zeta2)).norm() < 0.1);
    }

    #[test]
    fn at_the_turning_point_zeta_vanishes() {
        let e = expansion(Complex64::new(50.0, 0.0), 50.0);
        assert!(e.arg.norm() < 1e-12);
        // φ → 2^{1/3} ν^{-1/3} as w → 0.
        let expect = 2f64.cbrt() / 50f64.cbrt();
        assert!((e.phi.re - expect).abs() < 1e-12);
        assert!((e.asum.re - 1.0).abs() < 1e-3);
    }

    #[test]
    fn leading_form_has_no_sums() {
        let wp = WorkingPrecision::standard();
        let e = TurningPointExpansion::leading(Complex64::new(30.0, 40.0), 60.0, wp.tiny, wp.tol);
        assert_eq!(e.asum, CZERO);
        assert_eq!(e.bsum, CZERO);
        let full = expansion(Complex64::new(30.0, 40.0), 60.0);
        assert_eq!(e.phi, full.phi);
        assert_eq!(e.arg, full.arg);
    }
}
