//! End-to-end session scenarios driven through the string-keyed API.

use rotation_core::{
    ConfigError, ConsistencyError, GameConfig, JobId, MarkerKind, Millis, ProcMode, TaxModel,
};
use rotation_runtime::{
    Intent, LoadWarning, PlaybackClock, RawConfig, RawOverride, RuntimeError, SaveFile, Session,
    TickMode,
};
use std::time::Duration;

const TEN_MINUTES: Millis = Millis(600_000);

fn caster(seed: &str) -> Session {
    let mut config = GameConfig::new(JobId::Caster);
    config.random_seed = seed.to_string();
    Session::new(config).unwrap()
}

fn striker(proc_mode: ProcMode) -> Session {
    let mut config = GameConfig::new(JobId::Striker);
    config.random_seed = "42".to_string();
    config.proc_mode = proc_mode;
    Session::new(config).unwrap()
}

fn play_opener(session: &mut Session) {
    for skill in ["blaze", "blaze", "quickcast", "blaze", "frost", "frost", "blaze"] {
        session.apply(&Intent::new(skill).wait_for_ready()).unwrap();
    }
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn same_seed_replays_identically() {
    let mut first = caster("1234");
    let mut second = caster("1234");
    play_opener(&mut first);
    play_opener(&mut second);

    assert_eq!(first.digest_hex(), second.digest_hex());
    assert_eq!(first.view(), second.view());
}

#[test]
fn empty_seed_is_generated() {
    let session = Session::new(GameConfig::new(JobId::Caster)).unwrap();
    let seed = &session.config().random_seed;
    assert_eq!(seed.len(), 4);
    assert!(seed.chars().all(|c| c.is_ascii_digit()));
}

#[test]
fn deleting_and_re_adding_restores_the_digest() {
    let mut session = caster("7");
    session.apply(&Intent::new("blaze").at(Millis(0))).unwrap();
    let middle = session.apply(&Intent::new("frost").at(Millis(2_517))).unwrap();
    session.apply(&Intent::new("frost").at(Millis(5_034))).unwrap();
    let before = session.digest_hex();

    session.delete_node(0, middle.id).unwrap();
    assert_ne!(session.digest_hex(), before);

    session.apply(&Intent::new("frost").at(Millis(2_517))).unwrap();
    assert_eq!(session.digest_hex(), before);
}

#[test]
fn scrubbing_does_not_change_the_result() {
    let mut session = caster("99");
    play_opener(&mut session);
    let cursor = session.cursor();
    let digest = session.digest_hex();

    session.rebuild_up_to(cursor);
    assert_eq!(session.digest_hex(), digest);

    session.advance_to(Millis(0));
    assert_eq!(session.cursor(), Millis(0));
    session.advance_to(cursor);
    assert_eq!(session.digest_hex(), digest);
}

// ============================================================================
// Configuration intake
// ============================================================================

#[test]
fn conflicting_stance_overrides_are_rejected() {
    let mut raw = RawConfig::default();
    for resource in ["fire_stance", "ice_stance"] {
        raw.overrides.push(RawOverride {
            resource: resource.into(),
            amount: "1".into(),
            timer: "10".into(),
            enabled: true,
        });
    }

    let err = Session::from_raw(&raw).err().unwrap();
    assert!(matches!(
        err,
        RuntimeError::Config(ConfigError::Inconsistent(ConsistencyError::Exclusive { .. }))
    ));
}

#[test]
fn one_stance_override_is_applied() {
    let mut raw = RawConfig::default();
    raw.random_seed = "5".into();
    raw.overrides.push(RawOverride {
        resource: "ice_stance".into(),
        amount: "3".into(),
        timer: "12".into(),
        enabled: true,
    });

    let session = Session::from_raw(&raw).unwrap();
    let view = session.view();
    let ice = view.slots[0]
        .resources
        .iter()
        .find(|row| row.name == "ice_stance")
        .unwrap();
    assert_eq!(ice.amount, 3);
}

#[test]
fn unknown_skills_are_errors_not_nodes() {
    let mut session = caster("1");
    let err = session.apply(&Intent::new("fireball")).unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::UnknownSkill { job: JobId::Caster, .. }
    ));
    assert!(session.view().slots[0].nodes.is_empty());
}

// ============================================================================
// Procs and charges
// ============================================================================

/// Runs the striker combo for ten minutes and returns (crosses, procs).
fn ten_minutes_of_combos(session: &mut Session) -> (usize, usize) {
    let mut crosses = 0;
    let mut procs = 0;
    loop {
        for skill in ["jab", "cross", "finisher"] {
            let row = session.apply(&Intent::new(skill).wait_for_ready()).unwrap();
            assert!(row.invalid.is_empty(), "{} was invalid: {:?}", skill, row.invalid);
            if skill == "cross" {
                crosses += 1;
                procs += row.procs.len();
            }
            if row.start >= TEN_MINUTES {
                return (crosses, procs);
            }
        }
    }
}

#[test]
fn forced_proc_modes_hold_for_ten_minutes() {
    let (crosses, procs) = ten_minutes_of_combos(&mut striker(ProcMode::Never));
    assert!(crosses > 50);
    assert_eq!(procs, 0);

    let (crosses, procs) = ten_minutes_of_combos(&mut striker(ProcMode::Always));
    assert!(crosses > 50);
    assert_eq!(procs, crosses);
}

#[test]
fn dash_starts_with_every_charge() {
    let mut session = striker(ProcMode::Rng);
    let charges = |session: &Session| {
        session.view().slots[0]
            .resources
            .iter()
            .find(|row| row.name == "dash_cd")
            .map(|row| row.available)
    };
    assert_eq!(charges(&session), Some(3));

    session.apply(&Intent::new("dash").at(Millis(0))).unwrap();
    assert_eq!(charges(&session), Some(2));
}

#[test]
fn full_dash_override_is_usable_at_zero() {
    let mut raw = RawConfig::default();
    raw.job = "striker".into();
    raw.random_seed = "42".into();
    raw.overrides.push(RawOverride {
        resource: "dash_cd".into(),
        amount: "3".into(),
        timer: "0".into(),
        enabled: true,
    });

    let mut session = Session::from_raw(&raw).unwrap();
    let dash = session.apply(&Intent::new("dash").at(Millis(0))).unwrap();
    assert_eq!(dash.start, Millis(0));
    assert!(dash.invalid.is_empty());

    let row = session.view().slots[0]
        .resources
        .iter()
        .find(|row| row.name == "dash_cd")
        .cloned()
        .unwrap();
    assert_eq!((row.available, row.max), (2, 3));
}

// ============================================================================
// Playback
// ============================================================================

#[test]
fn manual_playback_jumps_to_the_free_moment() {
    let mut session = caster("11");
    let mut clock = PlaybackClock::new(TickMode::Manual, 1.0).unwrap();
    session
        .apply_playing(&Intent::new("blaze").at(Millis(0)), &mut clock)
        .unwrap();

    assert_eq!(session.cursor(), session.next_free(0).unwrap());
    assert_eq!(session.cursor(), Millis(2_617));
    assert_eq!(session.tick(&mut clock, Duration::from_millis(16)), None);
}

#[test]
fn auto_pause_playback_stops_when_the_slot_is_free() {
    let mut session = caster("11");
    let mut clock = PlaybackClock::default();
    session
        .apply_playing(&Intent::new("blaze").at(Millis(0)), &mut clock)
        .unwrap();
    assert_eq!(session.cursor(), Millis(0));

    let mut frames = 0;
    while let Some(cursor) = session.tick(&mut clock, Duration::from_millis(16)) {
        assert!(cursor <= Millis(2_617));
        frames += 1;
    }
    // 32ms of combat per frame at the default double speed.
    assert_eq!(frames, 82);
    assert_eq!(session.cursor(), Millis(2_617));
    assert!(!clock.is_running());
}

// ============================================================================
// Slots, markers and saves
// ============================================================================

fn two_slot_session() -> Session {
    let mut session = caster("2024");
    play_opener(&mut session);
    let clone = session.clone_slot(0).unwrap();
    session
        .apply(&Intent::new("surge").on_slot(clone).at(Millis(4_000)))
        .unwrap();
    session.add_marker(MarkerKind::Untargetable, Millis(6_000), Millis(3_000));
    session.add_marker(
        MarkerKind::Note {
            text: "phase change".into(),
        },
        Millis(9_000),
        Millis(0),
    );
    session
}

#[test]
fn saves_restore_the_same_session() {
    let session = two_slot_session();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("opener.json");
    session.to_save().write(&path).unwrap();

    let (save, warnings) = SaveFile::read(&path).unwrap();
    assert!(warnings.is_empty());
    let restored = Session::restore(&save).unwrap();

    assert_eq!(restored.slot_count(), 2);
    assert_eq!(restored.cursor(), session.cursor());
    assert_eq!(restored.digest_hex(), session.digest_hex());
    assert_eq!(restored.view().markers.len(), 2);
}

#[test]
fn legacy_saves_load_with_a_warning() {
    let mut save = two_slot_session().to_save();
    save.version = 1;
    save.caster_tax = Some(Millis(100));

    let (loaded, warnings) = SaveFile::from_json(&save.to_json().unwrap()).unwrap();
    assert_eq!(
        warnings,
        vec![LoadWarning::LegacyCasterTax {
            caster_tax: Millis(100)
        }]
    );

    let restored = Session::restore(&loaded).unwrap();
    assert_eq!(
        restored.config().tax_model,
        TaxModel::Legacy {
            caster_tax: Millis(100)
        }
    );
    let resave = restored.to_save();
    assert_eq!(resave.version, 1);
    assert_eq!(resave.caster_tax, Some(Millis(100)));
}

#[test]
fn the_last_slot_cannot_be_removed() {
    let mut session = caster("3");
    assert!(matches!(session.remove_slot(0), Err(RuntimeError::Engine(_))));
    let added = session.add_slot().unwrap();
    session.remove_slot(added).unwrap();
    assert_eq!(session.slot_count(), 1);
}
