use ndarray::{Array1, Array2};

use crate::io::load_csv;
use crate::training_set::TrainingSet;

/// Two inputs in [0, 1]: a smooth wave along x1 plus a step along x2.
pub fn setup_data_csv() -> TrainingSet {
    load_csv("./data/dat.csv").expect("Failed to read ./data/dat.csv")
}

pub fn setup_data_hardcoded() -> (Array2<f64>, Array1<f64>) {
    // y = x1^2 - x2 + noise
    let dat = Array2::from_shape_vec(
        (20, 3),
        vec![
            -0.103306, -0.190482, 0.239090,
            -0.399877, 0.031365, 0.349539,
            1.421804, -1.261359, 0.047635,
            3.292881, -1.623506, -0.786395,
            1.432053, -1.637318, 1.238578,
            1.833713, 1.928774, 1.859031,
            -0.073630, 0.615690, 0.462251,
            1.789215, 0.113525, -1.761796,
            2.677443, -1.239167, -1.032228,
            -1.292142, -0.237876, 1.369709,
            -0.702695, 0.076496, 0.561167,
            0.916690, -0.170680, -0.887348,
            2.064053, 1.990625, 1.982767,
            1.494964, -0.738891, -1.081336,
            2.441505, -0.843840, -1.719106,
            2.275256, 1.386334, -0.453946,
            2.036215, 1.832170, 1.389239,
            2.813455, 1.641088, -0.120051,
            4.228548, 1.921436, -0.410302,
            2.224410, 1.114043, -0.920898,
        ],
    )
    .unwrap();
    let y = dat.slice(ndarray::s![.., 0]).to_owned();
    let x = dat.slice(ndarray::s![.., 1..]).to_owned();
    (x, y)
}

#[test]
fn test_setup_data_csv() {
    let ts = setup_data_csv();
    assert_eq!(ts.len(), 200);
    assert_eq!(ts.input_dim(), 2);
}
