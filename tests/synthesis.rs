use std::f64::consts::PI;

use rusty_spectra::data::loader::load_file;
use rusty_spectra::peak_table::{group_modes, ModeGroup};
use rusty_spectra::{
    synthesize, BroadeningKernel, FrequencyUnit, Lineshape, Mode, ModeSet, SpectrumAxis,
    SpectrumConfig, SpectrumError,
};

fn mode(frequency: f64, intensity: f64) -> Mode {
    Mode::new(frequency, intensity, None).unwrap()
}

fn kernels(width: f64) -> [BroadeningKernel; 2] {
    [
        BroadeningKernel::lorentzian(width),
        BroadeningKernel::gaussian(width),
    ]
}

#[test]
fn empty_mode_set_gives_zero_spectrum() {
    let axis = SpectrumAxis::new(0.0, 1000.0, 0.5).unwrap();
    for kernel in kernels(4.0) {
        let sp = synthesize(&[], &axis, &kernel, 1.0).unwrap();
        assert_eq!(sp.len(), 2001);
        assert!(sp.y.iter().all(|&y| y == 0.0));
    }
}

#[test]
fn area_tracks_intensity() {
    let intensity = 3.5;
    let modes = [mode(0.0, intensity)];

    // Gaussian tails vanish well inside the window.
    let axis = SpectrumAxis::new(-100.0, 100.0, 0.25).unwrap();
    let sp = synthesize(&modes, &axis, &BroadeningKernel::gaussian(5.0), 1.0).unwrap();
    assert!((sp.integrate() - intensity).abs() < 1e-6);

    // Lorentzian tails are heavy: the missed area is about w / (π L).
    let axis = SpectrumAxis::new(-2000.0, 2000.0, 0.1).unwrap();
    let sp = synthesize(&modes, &axis, &BroadeningKernel::lorentzian(2.0), 1.0).unwrap();
    assert!((sp.integrate() - intensity).abs() / intensity < 1e-2);
}

#[test]
fn area_error_shrinks_with_resolution() {
    let modes = [mode(0.3, 1.0)];
    let kernel = BroadeningKernel::gaussian(1.0);
    let error = |resolution: f64| {
        let axis = SpectrumAxis::new(-20.0, 20.0, resolution).unwrap();
        let sp = synthesize(&modes, &axis, &kernel, 1.0).unwrap();
        (sp.integrate() - 1.0).abs()
    };
    let coarse = error(2.0);
    let fine = error(0.05);
    assert!(fine <= coarse);
    assert!(fine < 1e-6);
}

#[test]
fn lorentzian_peak_height() {
    let (width, intensity) = (4.0, 2.5);
    let axis = SpectrumAxis::new(400.0, 600.0, 0.5).unwrap();
    let sp = synthesize(
        &[mode(500.0, intensity)],
        &axis,
        &BroadeningKernel::lorentzian(width),
        1.0,
    )
    .unwrap();
    let i = sp.x.iter().position(|&x| x == 500.0).unwrap();
    let expected = 2.0 / (PI * width) * intensity;
    assert!((sp.y[i] - expected).abs() < 1e-12);
    assert_eq!(
        sp.y.iter().cloned().fold(f64::MIN, f64::max),
        sp.y[i],
        "peak sits on the mode"
    );
}

#[test]
fn mode_order_does_not_matter() {
    let modes = vec![
        mode(120.0, 0.4),
        mode(-15.0, 0.1),
        Mode::new(355.0, 1.2, Some(7.0)).unwrap(),
        mode(360.0, 0.9),
        mode(800.0, 0.05),
    ];
    let mut reversed = modes.clone();
    reversed.reverse();
    let mut rotated = modes.clone();
    rotated.rotate_left(2);

    let axis = SpectrumAxis::new(-100.0, 900.0, 1.0).unwrap();
    for kernel in kernels(5.0) {
        let a = synthesize(&modes, &axis, &kernel, 1.0).unwrap();
        for other in [&reversed, &rotated] {
            let b = synthesize(other, &axis, &kernel, 1.0).unwrap();
            assert_eq!(a.x, b.x);
            for (ya, yb) in a.y.iter().zip(&b.y) {
                assert!((ya - yb).abs() <= 1e-12 * ya.abs().max(1.0));
            }
        }
    }
}

#[test]
fn invalid_axes_rejected() {
    let kernel = BroadeningKernel::lorentzian(1.0);
    let reversed = SpectrumAxis {
        start: 5.0,
        end: 1.0,
        resolution: 0.1,
    };
    let zero_step = SpectrumAxis {
        start: 1.0,
        end: 5.0,
        resolution: 0.0,
    };
    for axis in [reversed, zero_step] {
        assert!(matches!(
            synthesize(&[mode(2.0, 1.0)], &axis, &kernel, 1.0),
            Err(SpectrumError::InvalidAxis(_))
        ));
    }
    assert!(matches!(
        SpectrumAxis::new(5.0, 1.0, 0.1),
        Err(SpectrumError::InvalidAxis(_))
    ));
    assert!(matches!(
        SpectrumAxis::new(1.0, 5.0, 0.0),
        Err(SpectrumError::InvalidAxis(_))
    ));
}

#[test]
fn well_separated_modes_superpose() {
    let axis = SpectrumAxis::new(0.0, 2000.0, 1.0).unwrap();
    let a = mode(400.0, 1.0);
    let b = Mode::new(1600.0, 2.0, Some(3.0)).unwrap();
    for kernel in kernels(2.0) {
        let both = synthesize(&[a, b], &axis, &kernel, 1.0).unwrap();
        let only_a = synthesize(&[a], &axis, &kernel, 1.0).unwrap();
        let only_b = synthesize(&[b], &axis, &kernel, 1.0).unwrap();
        for i in 0..both.len() {
            let sum = only_a.y[i] + only_b.y[i];
            assert!((both.y[i] - sum).abs() <= 1e-12 * sum.abs().max(1e-300));
        }
    }
}

#[test]
fn negative_frequencies_are_broadened() {
    let axis = SpectrumAxis::new(-50.0, 50.0, 1.0).unwrap();
    let sp = synthesize(
        &[mode(-20.0, 1.0)],
        &axis,
        &BroadeningKernel::gaussian(2.0),
        1.0,
    )
    .unwrap();
    let i = sp.x.iter().position(|&x| x == -20.0).unwrap();
    assert!(sp.y[i] > 0.1);
}

fn temp_file(name: &str, contents: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!("rusty_spectra_{}_{name}", std::process::id()));
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn csv_table_to_spectrum_in_thz() {
    let path = temp_file(
        "modes.csv",
        "frequency,intensity,linewidth,irrep\n\
         -10.0,0.0,,T1u\n\
         200.0,1.0,4.0,T1u\n\
         200.0,1.0,4.0,T1u\n\
         480.0,0.5,6.0,A2u\n",
    );
    let modes = load_file(&path, FrequencyUnit::InvCm).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(modes.len(), 4);
    assert!(modes.labels.is_some());

    let config = SpectrumConfig {
        lineshape: Lineshape::Gaussian,
        axis: Some(SpectrumAxis::new(0.0, 600.0, 0.5).unwrap()),
        unit: Some(FrequencyUnit::Thz),
        ..Default::default()
    };
    let sp = config.synthesize(&modes).unwrap();
    assert_eq!(sp.len(), 1201);
    let peak = sp
        .x
        .iter()
        .zip(&sp.y)
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(&x, _)| x)
        .unwrap();
    assert!((peak - 200.0 / 33.3564095198152).abs() < 1e-6);
}

#[test]
fn dat_table_peak_table() {
    let path = temp_file("modes.dat", "# v I\n1.0 0.2\n1.0 0.2\n3.0 1.0\n");
    let modes: ModeSet = load_file(&path, FrequencyUnit::Thz).unwrap();
    std::fs::remove_file(&path).ok();

    let groups: Vec<ModeGroup> = serde_json::from_str(
        r#"[{"symbol": "Eu", "band_indices": [1, 2]}, {"symbol": "A2u", "band_indices": [3]}]"#,
    )
    .unwrap();
    let table = group_modes(&modes, &groups).unwrap();
    assert_eq!(table.peaks[0].intensity, 0.4);
    let text = table.render();
    assert!(text.contains("Eu"));
    assert!(text.contains("v [THz]"));
}
