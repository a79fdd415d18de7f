use super::*;
use crate::config::{JobId, SpeedStat};
use crate::job::{Effect, PotencySpec, SkillId, SkillSpec};
use crate::node::{InvalidReason, NodeStatus};
use crate::resource::{ResourceDescriptor, ResourceId, ResourceOverrideData};
use crate::rng::ProcMode;
use crate::timeline::{PartyBuff, WarningKind};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "snake_case")]
enum Res {
    Gcd,
    Mana,
    Fire,
    Spark,
    Combo,
    DashCd,
}

impl ResourceId for Res {
    const ALL: &'static [Self] = &[
        Self::Gcd,
        Self::Mana,
        Self::Fire,
        Self::Spark,
        Self::Combo,
        Self::DashCd,
    ];

    fn descriptor(self) -> ResourceDescriptor<Self> {
        match self {
            Self::Gcd => ResourceDescriptor::cooldown(1, Millis(2_500)),
            Self::Mana => ResourceDescriptor::gauge(10_000).with_default(10_000),
            Self::Fire => ResourceDescriptor::stack_timer(3, Millis(15_000)),
            Self::Spark => ResourceDescriptor::buff(Millis(30_000)).with_potency_bonus(10),
            Self::Combo => ResourceDescriptor::buff(Millis(30_000)),
            Self::DashCd => ResourceDescriptor::cooldown(2, Millis(30_000)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
enum Skill {
    Bolt,
    Jab,
    Finisher,
    Dash,
}

impl SkillId for Skill {
    const ALL: &'static [Self] = &[Self::Bolt, Self::Jab, Self::Finisher, Self::Dash];
}

struct TestJob;

impl Job for TestJob {
    type Resource = Res;
    type Skill = Skill;

    const ID: JobId = JobId::Caster;
    const SPEED_STAT: SpeedStat = SpeedStat::SpellSpeed;
    const GCD: Res = Res::Gcd;
    const MANA: Option<Res> = Some(Res::Mana);

    fn skill(skill: Skill) -> SkillSpec<Res> {
        match skill {
            Skill::Bolt => SkillSpec::spell(Millis(2_500), Millis(2_500))
                .potency(PotencySpec::damage(200))
                .costs(&[(Res::Mana, 2_000)])
                .effects(&[
                    Effect::Gain(Res::Fire, 1),
                    Effect::Proc {
                        grant: Res::Spark,
                        chance_percent: 50,
                    },
                ]),
            Skill::Jab => SkillSpec::weaponskill(Millis(2_500))
                .potency(PotencySpec::damage(100))
                .effects(&[Effect::Refresh(Res::Combo)]),
            Skill::Finisher => SkillSpec::weaponskill(Millis(2_500))
                .potency(PotencySpec::damage(300))
                .combo(Res::Combo),
            Skill::Dash => SkillSpec::ability(Res::DashCd).potency(PotencySpec::damage(50)),
        }
    }
}

/// 2.5s recast at 60 fps.
const GCD: Millis = Millis(2_517);
/// 0.7s animation lock at 60 fps.
const LOCK: Millis = Millis(717);
/// 2.5s cast plus caster tax at 60 fps.
const CAST_LOCK: Millis = Millis(2_617);

fn config() -> GameConfig {
    GameConfig::new(JobId::Caster)
}

fn session() -> GameState<TestJob> {
    GameState::new(config()).unwrap()
}

fn session_with(edit: impl FnOnce(&mut GameConfig)) -> GameState<TestJob> {
    let mut config = config();
    edit(&mut config);
    GameState::new(config).unwrap()
}

fn at(skill: Skill, ms: i64) -> ActionIntent<Skill> {
    ActionIntent::new(skill).at(Millis(ms))
}

#[test]
fn rejects_config_for_another_job() {
    let result = GameState::<TestJob>::new(GameConfig::new(JobId::Striker));
    assert!(matches!(result, Err(ConfigError::JobMismatch { .. })));
}

#[test]
fn session_starts_at_countdown() {
    let state = session();
    assert_eq!(state.cursor(), Millis(-5_000));
    assert_eq!(state.slot_count(), 1);
}

#[test]
fn cast_locks_until_cast_plus_tax() {
    let mut state = session();
    let node = state.apply_action(at(Skill::Bolt, 0)).unwrap();
    let resolution = node.resolution.unwrap();
    assert_eq!(resolution.start, Millis(0));
    assert_eq!(resolution.cast, Millis(2_500));
    assert_eq!(resolution.recast, GCD);
    assert_eq!(resolution.lock, CAST_LOCK);
    assert_eq!(resolution.snapshot_at, Millis(2_500));
}

#[test]
fn press_inside_lock_starts_at_lock_end() {
    let mut state = session();
    state.apply_action(at(Skill::Bolt, 0)).unwrap();
    let dash = state.apply_action(at(Skill::Dash, 1_000)).unwrap();
    assert_eq!(dash.resolution.unwrap().start, CAST_LOCK);
    assert!(dash.invalid.is_empty());
}

#[test]
fn invalid_node_changes_nothing() {
    let mut state = session_with(|config| {
        config.overrides = vec![ResourceOverrideData::new("mana", 1_000, Millis::ZERO)];
    });
    let before = state.resources(0).unwrap();
    let node = state.apply_action(ActionIntent::new(Skill::Bolt)).unwrap();

    assert_eq!(node.status(), NodeStatus::Invalid);
    assert_eq!(
        node.invalid,
        vec![InvalidReason::ResourceUnavailable {
            resource: Res::Mana,
            needed: 2_000,
            available: 1_000,
        }]
    );
    assert_eq!(state.resources(0).unwrap(), before);
    let live = state.slot_state_snapshot(0).unwrap();
    assert_eq!(live.lock_until(), Millis(-5_000));
    assert_eq!(live.proc_draws(), 0);
}

#[test]
fn gcd_pressed_early_is_on_cooldown_unless_waiting() {
    let mut state = session();
    state.apply_action(at(Skill::Jab, 0)).unwrap();
    let early = state.apply_action(ActionIntent::new(Skill::Jab)).unwrap();
    assert_eq!(early.display_time(), LOCK);
    assert!(matches!(
        early.invalid.as_slice(),
        [InvalidReason::OnCooldown { resource: Res::Gcd, .. }]
    ));

    let waited = state
        .apply_action(ActionIntent::new(Skill::Jab).wait_for_ready())
        .unwrap();
    assert_eq!(waited.display_time(), GCD);
    assert!(waited.is_valid());
}

#[test]
fn wait_for_ready_waits_for_a_charge() {
    let mut state = session();
    state.apply_action(at(Skill::Dash, 0)).unwrap();
    state.apply_action(ActionIntent::new(Skill::Dash)).unwrap();

    let mut denied = session();
    denied.apply_action(at(Skill::Dash, 0)).unwrap();
    denied.apply_action(ActionIntent::new(Skill::Dash)).unwrap();
    let third = denied.apply_action(ActionIntent::new(Skill::Dash)).unwrap();
    assert!(matches!(
        third.invalid.as_slice(),
        [InvalidReason::OnCooldown { resource: Res::DashCd, ready_in }] if *ready_in == Millis(30_000) - LOCK - LOCK
    ));

    let third = state
        .apply_action(ActionIntent::new(Skill::Dash).wait_for_ready())
        .unwrap();
    assert_eq!(third.display_time(), Millis(30_000));
    assert!(third.is_valid());
}

#[test]
fn inserting_in_the_past_re_resolves_later_nodes() {
    let mut state = session();
    state.apply_action(at(Skill::Dash, 10_000)).unwrap();
    let second = state.apply_action(at(Skill::Dash, 10_717)).unwrap();
    assert!(second.is_valid());

    let early = state.apply_action(at(Skill::Dash, 0)).unwrap();
    assert!(early.is_valid());
    assert_eq!(early.display_time(), Millis(0));

    let nodes = state.timeline().slot(0).unwrap().nodes();
    assert_eq!(nodes.len(), 3);
    assert_eq!(nodes[0].id, early.id);
    assert!(nodes[1].is_valid());
    assert_eq!(nodes[2].id, second.id);
    assert_eq!(nodes[2].status(), NodeStatus::Invalid);
}

#[test]
fn appending_and_rebuilding_agree() {
    let mut appended = session();
    appended.apply_action(at(Skill::Jab, 0)).unwrap();
    appended.apply_action(at(Skill::Finisher, 2_517)).unwrap();
    appended.apply_action(at(Skill::Dash, 3_300)).unwrap();
    appended.advance_to(Millis(20_000));

    let mut inserted = session();
    inserted.apply_action(at(Skill::Dash, 3_300)).unwrap();
    inserted.apply_action(at(Skill::Finisher, 2_517)).unwrap();
    inserted.apply_action(at(Skill::Jab, 0)).unwrap();
    inserted.advance_to(Millis(20_000));

    assert_eq!(appended.state_digest(), inserted.state_digest());
    assert_eq!(appended.resources(0).unwrap(), inserted.resources(0).unwrap());
}

#[test]
fn delete_then_re_add_restores_state() {
    let mut state = session();
    state.apply_action(at(Skill::Jab, 0)).unwrap();
    let finisher = state.apply_action(at(Skill::Finisher, 2_517)).unwrap();
    assert!(finisher.is_valid());
    let digest = state.state_digest();

    state.delete_node(0, finisher.id).unwrap();
    assert_ne!(state.state_digest(), digest);
    state.apply_action(at(Skill::Finisher, 2_517)).unwrap();
    assert_eq!(state.state_digest(), digest);
}

#[test]
fn deleting_combo_starter_breaks_the_combo() {
    let mut state = session();
    let jab = state.apply_action(at(Skill::Jab, 0)).unwrap();
    state.apply_action(at(Skill::Finisher, 2_517)).unwrap();
    state.delete_node(0, jab.id).unwrap();

    let slot = state.timeline().slot(0).unwrap();
    assert_eq!(
        slot.nodes()[0].invalid,
        vec![InvalidReason::BrokenCombo { expected: Res::Combo }]
    );
    assert!(
        slot.warnings()
            .iter()
            .any(|warning| warning.kind == WarningKind::ComboBreak(Res::Combo))
    );
    assert_eq!(
        state.delete_node(0, jab.id),
        Err(EngineError::NodeNotFound { slot: 0, node: jab.id })
    );
}

#[test]
fn scrubbing_back_and_forth_matches_straight_replay() {
    let mut straight = session();
    straight.apply_action(at(Skill::Bolt, 0)).unwrap();
    straight.apply_action(at(Skill::Dash, 3_000)).unwrap();
    straight.advance_to(Millis(12_000));

    let mut scrubbed = session();
    scrubbed.apply_action(at(Skill::Bolt, 0)).unwrap();
    scrubbed.apply_action(at(Skill::Dash, 3_000)).unwrap();
    scrubbed.advance_to(Millis(12_000));
    scrubbed.advance_to(Millis(-1_000));
    assert_eq!(scrubbed.cursor(), Millis(-1_000));
    assert_eq!(scrubbed.resources(0).unwrap().amount(Res::Mana), 10_000);
    scrubbed.advance_to(Millis(12_000));

    assert_eq!(straight.state_digest(), scrubbed.state_digest());
}

#[test]
fn rebuild_matches_fresh_replay_at_every_cut() {
    let mut state = session();
    state.apply_action(at(Skill::Bolt, 0)).unwrap();
    state.apply_action(at(Skill::Jab, 2_617)).unwrap();
    state.apply_action(at(Skill::Finisher, 5_200)).unwrap();

    for cut in [-5_000, 0, 1, 2_617, 4_000, 5_200, 9_000] {
        let mut fresh = session();
        for node in state.timeline().slot(0).unwrap().nodes() {
            if node.requested_at <= Millis(cut) {
                fresh.apply_action(at(node.skill, node.requested_at.as_millis())).unwrap();
            }
        }
        fresh.advance_to(Millis(cut));

        state.rebuild_up_to(Millis(cut));
        assert_eq!(
            state.resources(0).unwrap(),
            fresh.resources(0).unwrap(),
            "cut at {cut}"
        );
    }
}

#[test]
fn mana_ticks_follow_the_configured_phase() {
    let mut state = session_with(|config| {
        config.overrides = vec![ResourceOverrideData::new("mana", 0, Millis::ZERO)];
    });
    // Ticks land at -2.7s, 0.3s and 3.3s.
    state.advance_to(Millis(3_299));
    assert_eq!(state.resources(0).unwrap().amount(Res::Mana), 400);
    state.advance_to(Millis(3_300));
    assert_eq!(state.resources(0).unwrap().amount(Res::Mana), 600);
}

#[test]
fn forced_procs_feed_later_snapshots() {
    let mut state = session_with(|config| config.proc_mode = ProcMode::Always);
    let first = state.apply_action(at(Skill::Bolt, 0)).unwrap();
    assert_eq!(first.resolution.as_ref().unwrap().procs, vec![Res::Spark]);

    let second = state.apply_action(at(Skill::Bolt, 2_617)).unwrap();
    assert_eq!(second.resolution.as_ref().unwrap().buffs, vec![(Res::Spark, 10)]);
    let potency = state
        .potency(0, second.id, &PotencyOptions::default())
        .unwrap()
        .unwrap();
    assert!((potency.theoretical - 220.0).abs() < 1e-9);

    let mut never = session_with(|config| config.proc_mode = ProcMode::Never);
    let node = never.apply_action(at(Skill::Bolt, 0)).unwrap();
    assert!(node.resolution.unwrap().procs.is_empty());
    assert_eq!(never.slot_state_snapshot(0).unwrap().proc_draws(), 1);
}

#[test]
fn cloned_slot_sees_the_same_procs() {
    let mut state = session_with(|config| config.random_seed = "4821".into());
    for i in 0..6 {
        state.apply_action(at(Skill::Bolt, i * 2_617)).unwrap();
    }
    let copy = state.clone_slot(0).unwrap();
    let snapshot = state.snapshot(&PotencyOptions::default());
    let procs = |slot: usize| -> Vec<_> {
        snapshot.slots[slot]
            .nodes
            .iter()
            .map(|view| view.node.resolution.as_ref().unwrap().procs.clone())
            .collect()
    };
    assert_eq!(procs(0), procs(copy));
    assert_eq!(snapshot.slots[0].resources, snapshot.slots[copy].resources);
}

#[test]
fn slots_are_independent() {
    let mut state = session();
    let second = state.add_slot().unwrap();
    state.apply_action(at(Skill::Bolt, 0).on_slot(second)).unwrap();
    state.advance_to(Millis(1_000));

    assert_eq!(state.resources(0).unwrap().amount(Res::Mana), 10_000);
    // 2000 spent at 0s, one tick of 200 at 0.3s.
    assert_eq!(state.resources(second).unwrap().amount(Res::Mana), 8_200);

    state.remove_slot(0).unwrap();
    assert_eq!(state.slot_count(), 1);
    assert_eq!(state.resources(0).unwrap().amount(Res::Mana), 8_200);
    assert_eq!(state.remove_slot(0), Err(EngineError::LastSlot));
}

#[test]
fn party_buff_markers_are_snapshotted() {
    let mut state = session();
    let jab = state.apply_action(at(Skill::Jab, 1_000)).unwrap();
    let marker = state.add_marker(
        MarkerKind::PartyBuff(PartyBuff {
            name: "hymn".into(),
            bonus_percent: 5,
        }),
        Millis(0),
        Millis(20_000),
    );
    let options = PotencyOptions::default();
    let buffed = state.potency(0, jab.id, &options).unwrap().unwrap();
    assert!((buffed.theoretical - 105.0).abs() < 1e-9);

    state.remove_marker(marker).unwrap();
    let plain = state.potency(0, jab.id, &options).unwrap().unwrap();
    assert!((plain.theoretical - 100.0).abs() < 1e-9);
}

#[test]
fn untargetable_windows_zero_realized_damage() {
    let mut state = session();
    state.add_marker(MarkerKind::Untargetable, Millis(0), Millis(2_000));
    state.apply_action(at(Skill::Jab, 1_000)).unwrap();
    state.apply_action(at(Skill::Jab, 3_517)).unwrap();

    let summary = state
        .potency_summary(0, &PotencyOptions::default(), None)
        .unwrap();
    assert!((summary.damage_theoretical - 200.0).abs() < 1e-9);
    assert!((summary.damage_realized - 100.0).abs() < 1e-9);
    assert_eq!(summary.masked_hits, 1);
}

#[test]
fn zero_targets_is_rejected() {
    let mut state = session();
    let result = state.apply_action(ActionIntent::new(Skill::Jab).targets(0));
    assert_eq!(result, Err(EngineError::NoTargets));
    assert!(matches!(
        state.apply_action(ActionIntent::new(Skill::Jab).on_slot(3)),
        Err(EngineError::SlotOutOfRange { slot: 3, count: 1 })
    ));
}

#[test]
fn cursor_inside_a_lock_leaves_the_held_node_pending() {
    let mut state = session();
    state.apply_action(at(Skill::Bolt, 0)).unwrap();
    let dash = state.apply_action(at(Skill::Dash, 1_000)).unwrap();
    assert_eq!(dash.display_time(), CAST_LOCK);

    state.rebuild_up_to(Millis(2_000));
    let live = state.slot_state_snapshot(0).unwrap();
    assert_eq!(state.cursor(), Millis(2_000));
    assert_eq!(live.now(), state.cursor());
    assert_eq!(live.lock_until(), CAST_LOCK);
    assert_eq!(live.store().available(Res::DashCd), 2);

    let mut straight = session();
    straight.apply_action(at(Skill::Bolt, 0)).unwrap();
    straight.apply_action(at(Skill::Dash, 1_000)).unwrap();
    straight.advance_to(Millis(5_000));

    state.advance_to(Millis(5_000));
    assert_eq!(state.resources(0).unwrap(), straight.resources(0).unwrap());
    assert_eq!(state.resources(0).unwrap().available(Res::DashCd), 1);
    assert_eq!(
        state.slot_state_snapshot(0).unwrap().lock_until(),
        straight.slot_state_snapshot(0).unwrap().lock_until()
    );
}

#[test]
fn rebuild_at_any_cut_stays_in_range_and_on_the_cursor() {
    let mut state = session();
    state.apply_action(at(Skill::Bolt, 0)).unwrap();
    state.apply_action(at(Skill::Dash, 1_000)).unwrap();
    state.apply_action(at(Skill::Dash, 2_700)).unwrap();
    state.apply_action(at(Skill::Jab, 3_000)).unwrap();
    state.apply_action(at(Skill::Finisher, 4_000)).unwrap();
    state
        .apply_action(at(Skill::Bolt, 6_000).wait_for_ready())
        .unwrap();
    let nodes = state.timeline().slot(0).unwrap().nodes().to_vec();

    // An odd step lands inside casts and locks as well as on node starts.
    for cut in (-5_000..20_000).step_by(137).map(Millis) {
        state.rebuild_up_to(cut);
        let live = state.slot_state_snapshot(0).unwrap();
        assert_eq!(state.cursor(), cut);
        assert_eq!(live.now(), cut, "cut at {cut}");

        let store = live.store();
        for &resource in Res::ALL {
            let max = resource.descriptor().max;
            assert!(store.amount(resource) <= max, "{resource} over max at {cut}");
            assert!(store.available(resource) <= max, "{resource} over max at {cut}");
            assert!(!store.timer(resource).is_negative(), "{resource} timer at {cut}");
        }

        let mut fresh = session();
        for node in nodes.iter().filter(|node| node.display_time() <= cut) {
            let mut intent = at(node.skill, node.requested_at.as_millis());
            if node.wait_for_ready {
                intent = intent.wait_for_ready();
            }
            fresh.apply_action(intent).unwrap();
        }
        fresh.advance_to(cut);
        assert_eq!(state.resources(0).unwrap(), fresh.resources(0).unwrap(), "cut at {cut}");
    }
}

#[test]
fn full_cooldown_override_is_usable_at_zero() {
    let mut state = session_with(|config| {
        config.overrides = vec![ResourceOverrideData::new("dash_cd", 2, Millis::ZERO)];
    });
    assert_eq!(state.resources(0).unwrap().available(Res::DashCd), 2);

    let dash = state.apply_action(at(Skill::Dash, 0)).unwrap();
    assert!(dash.is_valid());
    assert_eq!(dash.display_time(), Millis(0));
    assert_eq!(state.resources(0).unwrap().available(Res::DashCd), 1);
}
