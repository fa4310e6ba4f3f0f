// Host-side tests for the audio parameter store.

mod support;

use ar_sound::core::emitter::{DirectionalCone, Emitter};
use ar_sound::core::{DistanceModel, EmitterId, EmitterStore, ParamError};
use support::{CallLog, MockVoice, VoiceCall};

#[test]
fn defaults_match_the_two_emitters() {
    let red = Emitter::with_defaults(EmitterId::Red);
    assert_eq!(red.volume, 15.0);
    assert_eq!(red.reference_distance, 0.3);
    assert_eq!(red.rolloff_factor, 1.9);

    let blue = Emitter::with_defaults(EmitterId::Blue);
    assert_eq!(blue.volume, 1.0);
    assert_eq!(blue.reference_distance, 1.0);
    assert!((blue.rolloff_factor - 1.52).abs() < 1e-6);

    for e in [red, blue] {
        assert_eq!(e.distance_model, DistanceModel::Exponential);
        assert!(e.looping);
        assert_eq!(
            e.cone,
            DirectionalCone {
                inner_angle_deg: 180.0,
                outer_angle_deg: 230.0,
                outer_gain: 0.3,
            }
        );
    }
}

#[test]
fn set_volume_reads_back_exactly() {
    let mut store: EmitterStore<MockVoice> = EmitterStore::new();
    for v in [0.0, 0.1, 2.75, 29.9] {
        store.set_volume(EmitterId::Red, v).unwrap();
        assert_eq!(store.emitter(EmitterId::Red).volume, v);
    }
    assert_eq!(store.emitter(EmitterId::Blue).volume, 1.0);
}

#[test]
fn invalid_values_are_rejected_and_keep_the_old_value() {
    let mut store: EmitterStore<MockVoice> = EmitterStore::new();
    assert_eq!(
        store.set_volume(EmitterId::Blue, -1.0),
        Err(ParamError::Volume(-1.0))
    );
    assert!(store.set_volume(EmitterId::Blue, f32::NAN).is_err());
    assert_eq!(
        store.set_reference_distance(EmitterId::Red, 0.0),
        Err(ParamError::ReferenceDistance(0.0))
    );
    assert_eq!(
        store.set_rolloff(EmitterId::Red, -0.5),
        Err(ParamError::Rolloff(-0.5))
    );
    assert!(store.set_rolloff(EmitterId::Red, f32::INFINITY).is_err());

    assert_eq!(store.emitter(EmitterId::Blue).volume, 1.0);
    assert_eq!(store.emitter(EmitterId::Red).reference_distance, 0.3);
    assert_eq!(store.emitter(EmitterId::Red).rolloff_factor, 1.9);
}

#[test]
fn parameters_set_before_binding_are_applied_in_full_at_bind() {
    let log = CallLog::default();
    let mut store = EmitterStore::new();
    store.set_volume(EmitterId::Blue, 2.5).unwrap();
    store.set_reference_distance(EmitterId::Blue, 0.7).unwrap();
    store.set_rolloff(EmitterId::Blue, 3.0).unwrap();
    store.set_distance_model(EmitterId::Blue, DistanceModel::Linear);
    assert!(log.calls(EmitterId::Blue).is_empty());

    store.bind(EmitterId::Blue, MockVoice::new(EmitterId::Blue, &log));
    let calls = log.calls(EmitterId::Blue);
    assert!(calls.contains(&VoiceCall::Volume(2.5)));
    assert!(calls.contains(&VoiceCall::RefDistance(0.7)));
    assert!(calls.contains(&VoiceCall::Rolloff(3.0)));
    assert!(calls.contains(&VoiceCall::Model(DistanceModel::Linear)));
    assert!(calls.contains(&VoiceCall::Looping(true)));
    assert!(calls.contains(&VoiceCall::Cone(DirectionalCone::default())));
    assert!(!calls.contains(&VoiceCall::Play));
}

#[test]
fn bound_voice_receives_changes_immediately() {
    let log = CallLog::default();
    let mut store = EmitterStore::new();
    store.bind(EmitterId::Red, MockVoice::new(EmitterId::Red, &log));
    log.clear();

    store.set_volume(EmitterId::Red, 4.0).unwrap();
    store.set_distance_model(EmitterId::Red, DistanceModel::Inverse);
    assert_eq!(
        log.calls(EmitterId::Red),
        vec![
            VoiceCall::Volume(4.0),
            VoiceCall::Model(DistanceModel::Inverse)
        ]
    );
    // rejected values never reach the voice
    _ = store.set_volume(EmitterId::Red, -3.0);
    assert_eq!(log.calls(EmitterId::Red).len(), 2);
    assert!(log.calls(EmitterId::Blue).is_empty());
}

#[test]
fn rebinding_stops_the_previous_voice() {
    let log = CallLog::default();
    let mut store = EmitterStore::new();
    assert!(store
        .bind(EmitterId::Red, MockVoice::new(EmitterId::Red, &log))
        .is_none());
    let prev = store.bind(EmitterId::Red, MockVoice::new(EmitterId::Red, &log));
    assert!(prev.is_some());
    assert_eq!(log.count(EmitterId::Red, &VoiceCall::Stop), 1);

    assert!(store.unbind(EmitterId::Red).is_some());
    assert!(!store.is_bound(EmitterId::Red));
    assert_eq!(log.count(EmitterId::Red, &VoiceCall::Stop), 2);
    assert!(store.unbind(EmitterId::Red).is_none());
}

#[test]
fn distance_model_parses_dom_values() {
    for m in [
        DistanceModel::Linear,
        DistanceModel::Inverse,
        DistanceModel::Exponential,
    ] {
        assert_eq!(m.to_string().parse::<DistanceModel>(), Ok(m));
    }
    assert_eq!(
        "Exponential".parse::<DistanceModel>(),
        Err(ParamError::DistanceModel("Exponential".to_string()))
    );
}

#[test]
fn emitter_colors_and_phases_differ() {
    assert_eq!(EmitterId::Red.color(), [1.0, 0.0, 0.0]);
    assert_eq!(EmitterId::Blue.color(), [0.0, 0.0, 1.0]);
    assert_eq!(EmitterId::Red.phase(), 0.0);
    assert_eq!(EmitterId::Blue.phase(), std::f32::consts::PI);
}
