//! Striker: a melee job built on a three-step combo.
//!
//! Jab opens, Cross follows, Finisher closes; each step leaves a short-lived
//! marker the next one consumes. Weaponskills build Fury, which Rend spends.
//! The job has 10% inherent haste.

use rotation_core::{
    ConsistencyRule, Effect, JobId, Job, Millis, PotencySpec, Requirement, ResourceDescriptor,
    ResourceId, SkillId, SkillSpec, SpeedStat,
};
use strum::VariantArray;

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::VariantArray,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StrikerResource {
    Gcd,
    Fury,
    /// Left by Jab, consumed by Cross.
    Opener,
    /// Left by Cross, consumed by Finisher.
    Follow,
    Empower,
    Momentum,
    EmpowerCd,
    DashCd,
}

impl ResourceId for StrikerResource {
    const ALL: &'static [Self] = Self::VARIANTS;

    fn descriptor(self) -> ResourceDescriptor<Self> {
        match self {
            Self::Gcd => ResourceDescriptor::cooldown(1, Millis(2_500)),
            Self::Fury => ResourceDescriptor::gauge(100),
            Self::Opener | Self::Follow => ResourceDescriptor::buff(Millis(30_000)),
            Self::Empower => ResourceDescriptor::buff(Millis(20_000)).with_potency_bonus(10),
            Self::Momentum => ResourceDescriptor::buff(Millis(15_000)).warn_on_timeout(),
            Self::EmpowerCd => ResourceDescriptor::cooldown(1, Millis(60_000)),
            Self::DashCd => ResourceDescriptor::cooldown(3, Millis(30_000)),
        }
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::VariantArray,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StrikerSkill {
    Jab,
    Cross,
    Finisher,
    Whirl,
    Onslaught,
    Rend,
    Empower,
    Dash,
    Braver,
}

impl SkillId for StrikerSkill {
    const ALL: &'static [Self] = Self::VARIANTS;
}

use StrikerResource as R;

pub struct Striker;

impl Job for Striker {
    type Resource = StrikerResource;
    type Skill = StrikerSkill;

    const ID: JobId = JobId::Striker;
    const SPEED_STAT: SpeedStat = SpeedStat::SkillSpeed;
    const GCD: R = R::Gcd;
    const INHERENT_HASTE: Option<u32> = Some(10);

    const CONSISTENCY: &'static [ConsistencyRule<R>] =
        &[ConsistencyRule::Exclusive(R::Opener, R::Follow)];

    fn skill(skill: StrikerSkill) -> SkillSpec<R> {
        const GCD: Millis = Millis(2_500);
        match skill {
            StrikerSkill::Jab => SkillSpec::weaponskill(GCD)
                .potency(PotencySpec::damage(200))
                .effects(&[
                    Effect::Clear(R::Follow),
                    Effect::Refresh(R::Opener),
                    Effect::Gain(R::Fury, 5),
                ]),
            StrikerSkill::Cross => SkillSpec::weaponskill(GCD)
                .potency(PotencySpec::damage(280))
                .combo(R::Opener)
                .effects(&[
                    Effect::Refresh(R::Follow),
                    Effect::Gain(R::Fury, 10),
                    Effect::Proc {
                        grant: R::Momentum,
                        chance_percent: 50,
                    },
                ]),
            StrikerSkill::Finisher => SkillSpec::weaponskill(GCD)
                .potency(PotencySpec::damage(380))
                .combo(R::Follow)
                .effects(&[Effect::Gain(R::Fury, 20)]),
            StrikerSkill::Whirl => SkillSpec::weaponskill(GCD)
                .potency(PotencySpec::damage(120).with_falloff(0))
                .effects(&[
                    Effect::Clear(R::Opener),
                    Effect::Clear(R::Follow),
                    Effect::Gain(R::Fury, 5),
                ]),
            StrikerSkill::Onslaught => SkillSpec::weaponskill(GCD)
                .potency(PotencySpec::damage(450))
                .requires(&[Requirement::Active(R::Momentum)])
                .effects(&[Effect::Consume(R::Momentum, 1)]),
            StrikerSkill::Rend => SkillSpec::weaponskill(GCD)
                .potency(PotencySpec::damage(520))
                .costs(&[(R::Fury, 50)]),
            StrikerSkill::Empower => {
                SkillSpec::ability(R::EmpowerCd).effects(&[Effect::Refresh(R::Empower)])
            }
            StrikerSkill::Dash => SkillSpec::ability(R::DashCd)
                .potency(PotencySpec::damage(150))
                .lock(Millis(800)),
            StrikerSkill::Braver => SkillSpec::limit_break(Millis(3_860)),
        }
    }
}
