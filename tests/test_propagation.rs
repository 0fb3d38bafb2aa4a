//! Physics kernel: a pulse travelling across a domain interface

mod test_utils;

use pstd::prelude::*;
use test_utils::*;

const FRAMES: usize = 30;

fn scene(domains: Vec<DomainConfig>) -> Configuration {
    let settings = Settings {
        wave_length: 32,
        window_size: 32,
        ..stable_settings(FRAMES)
    };
    Configuration {
        settings,
        domains,
        receivers: vec![receiver("near", 1.5, 1.0), receiver("far", 2.4, 1.0)],
        speakers: vec![speaker(1.0, 1.0)],
    }
}

fn run(config: Configuration) -> Vec<Vec<f64>> {
    let mut kernel = PhysicsKernel::new();
    kernel.start_kernel(config).unwrap();
    let outcome = kernel.run(&mut Recorder::new()).unwrap();
    assert_eq!(outcome, RunOutcome::Completed { frames: FRAMES });
    kernel
        .receivers()
        .iter()
        .map(|r| r.received_values().to_vec())
        .collect()
}

fn peak(values: &[f64]) -> f64 {
    values.iter().fold(0.0_f64, |m, v| m.max(v.abs()))
}

#[test]
fn test_pulse_reaches_receiver_in_neighbour_domain() {
    let histories = run(scene(vec![
        domain("left", [0.0, 0.0], [2.0, 2.0]),
        domain("right", [2.0, 0.0], [2.0, 2.0]),
    ]));
    let far = &histories[1];

    assert_eq!(far.len(), FRAMES);
    assert!(far.iter().all(|v| v.is_finite()));
    // 1.4 m away: nothing at first, a clear arrival by the end
    assert!(peak(&far[..5]) < 1e-2);
    assert!(peak(far) > 2e-2);
}

#[test]
fn test_equal_density_interface_is_transparent() {
    let split = run(scene(vec![
        domain("left", [0.0, 0.0], [2.0, 2.0]),
        domain("right", [2.0, 0.0], [2.0, 2.0]),
    ]));
    let whole = run(scene(vec![domain("room", [0.0, 0.0], [4.0, 2.0])]));

    for (a, b) in split.iter().zip(&whole) {
        let scale = peak(b);
        for (x, y) in a.iter().zip(b) {
            assert!(
                (x - y).abs() < 0.1 * scale,
                "split {x} vs whole {y} (peak {scale})"
            );
        }
    }
}

fn echo_tail(edges: EdgesConfig) -> f64 {
    const LONG: usize = 90;
    let mut room = domain("room", [0.0, 0.0], [4.0, 3.0]);
    room.edges = edges;
    let config = Configuration {
        settings: stable_settings(LONG),
        domains: vec![room],
        receivers: vec![receiver("mic", 2.0, 1.5)],
        speakers: vec![speaker(1.6, 1.5)],
    };

    let mut kernel = PhysicsKernel::new();
    kernel.start_kernel(config).unwrap();
    kernel.run(&mut Recorder::new()).unwrap();
    let history = kernel.receivers()[0].received_values();
    assert_eq!(history.len(), LONG);

    // the direct pulse has passed by frame 40; the first echoes arrive after 50
    history[40..].iter().map(|v| v * v).sum()
}

#[test]
fn test_absorbing_edges_swallow_echoes() {
    let absorbing = EdgeConfig {
        absorption: 1.0,
        locally_reacting: false,
    };
    let all_absorbing = EdgesConfig {
        top: absorbing,
        bottom: absorbing,
        left: absorbing,
        right: absorbing,
    };

    let rigid = echo_tail(EdgesConfig::default());
    let damped = echo_tail(all_absorbing);

    assert!(rigid > 0.0);
    assert!(damped.is_finite());
    assert!(damped < 0.25 * rigid, "damped {damped} vs rigid {rigid}");
}
