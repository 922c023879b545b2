//! Tsitouras (2011), "Runge-Kutta pairs of order 5(4) satisfying only the
//! first column simplifying assumption". Irrational coefficients are kept with
//! their published digits and parsed directly into the target precision.

use super::MethodCoefficients;
use crate::{
    literal::{Decimal, Literal, ONE, Ratio, ZERO},
    method::MethodId,
};

const WEIGHTS: &[Literal] = &[
    Decimal("0.9646076681806522951816731316512876333711995238157997181903319145764851595234062815396e-1"),
    Ratio(1, 100),
    Decimal("0.4798896504144995747752495322905965199130404621990332488332634944254542060153074523509"),
    Decimal("1.379008574103741893192274821856872770756462643091360525934940067397245698027561293331"),
    Decimal("-3.290069515436080679901047585711363850115683290894936158531296799594813811049925401677"),
    Decimal("2.324710524099773982415355918398765796109060233222962411944060046314465391054716027841"),
    ZERO,
];

const EMBEDDED_WEIGHTS: &[Literal] = &[
    Decimal("0.9468075576583945807478876255758922856117527357724631226139574065785592789071067303271e-1"),
    Decimal("0.9183565540343253096776363936645313759813746240984095238905939532922955247253608687270e-2"),
    Decimal("0.4877705284247615707855642599631228241516691959761363774365216240304071651579571959813"),
    Decimal("1.234297566930478985655109673884237654035539930748192848315425833500484878378061439761"),
    Decimal("-2.707712349983525454881109975059321670689605166938197378763992255714444407154902012702"),
    Decimal("1.866628418170587035753719399566211498666255505244122593996591602841258328965767580089"),
    Ratio(1, 66),
];

pub static TSIT5: MethodCoefficients = MethodCoefficients {
    method: MethodId::Tsit5,
    order: 5,
    nodes: &[
        ZERO,
        Ratio(161, 1000),
        Ratio(327, 1000),
        Ratio(9, 10),
        Decimal("0.9800255409045096857298102862870245954942137979563024768854764293221195950761080302604"),
        ONE,
        ONE,
    ],
    stage_matrix: &[
        &[Ratio(161, 1000)],
        &[
            Decimal("-0.8480655492356988544426874250230774675121177393430391537369234245294192976164141156943e-2"),
            Decimal("0.3354806554923569885444268742502307746751211773934303915373692342452941929761641411569"),
        ],
        &[
            Decimal("2.897153057105493432130432594192938764924887287701866490314866693455023795137503079289"),
            Decimal("-6.359448489975074843148159912383825625952700647415626703305928850207288721235210244366"),
            Decimal("4.362295432869581411017727318190886861027813359713760212991062156752264926097707165077"),
        ],
        &[
            Decimal("5.325864828439256604428877920840511317836476253097040101202360397727981648835607691791"),
            Decimal("-11.74888356406282787774717033978577296188744178259862899288666928009020615663593781589"),
            Decimal("7.495539342889836208304604784564358155658679161518186721010132816213648793440552049753"),
            Decimal("-0.9249506636175524925650207933207191611349983406029535244034750452930469056411389539635e-1"),
        ],
        &[
            Decimal("5.861455442946420028659251486982647890394337666164814434818157239052507339770711679748"),
            Decimal("-12.92096931784710929170611868178335939541780751955743459166312250439928519268343184452"),
            Decimal("8.159367898576158643180400794539253485181918321135053305748355423955009222648673734986"),
            Decimal("-0.7158497328140099722453054252582973869127213147363544882721139659546372402303777878835e-1"),
            Decimal("-0.2826905039406838290900305721271224146717633626879770007617876201276764571291579142206e-1"),
        ],
        WEIGHTS.split_at(6).0,
    ],
    solution_weights: WEIGHTS,
    embedded: Some((4, EMBEDDED_WEIGHTS)),
    dense_output: None,
};
