//! Caster: a stance-swapping spellcaster.
//!
//! Fire and Ice stances are mutually exclusive stack timers. Ice restores
//! mana and builds Hearts; Fire spends both for damage and blocks natural
//! mana regeneration. While either stance holds, Glyphs accrue every 30s.

use rotation_core::{
    ConsistencyRule, Effect, JobId, Job, Millis, PotencySpec, Requirement, ResourceDescriptor,
    ResourceId, ResourceStore, SkillId, SkillSpec, SpeedStat,
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
pub enum CasterResource {
    Gcd,
    Mana,
    FireStance,
    IceStance,
    Hearts,
    /// Either stance is up.
    Attuned,
    Glyph,
    /// Proc from Blaze; enables Blaze Burst.
    Kindling,
    Quickcast,
    /// Standing inside the Surge circle. Can be suppressed while kept.
    Surge,
    Chain,
    QuickcastCd,
    SurgeCd,
    ChainCd,
}

impl ResourceId for CasterResource {
    const ALL: &'static [Self] = Self::VARIANTS;

    fn descriptor(self) -> ResourceDescriptor<Self> {
        match self {
            Self::Gcd => ResourceDescriptor::cooldown(1, Millis(2_500)),
            Self::Mana => ResourceDescriptor::gauge(10_000).with_default(10_000),
            Self::FireStance | Self::IceStance => {
                ResourceDescriptor::stack_timer(3, Millis(15_000)).warn_on_timeout()
            }
            Self::Hearts => ResourceDescriptor::gauge(3),
            Self::Attuned => ResourceDescriptor::derived(&[Self::FireStance, Self::IceStance]),
            Self::Glyph => ResourceDescriptor::accruing(2, Millis(30_000)).gated_by(Self::Attuned),
            Self::Kindling => ResourceDescriptor::buff(Millis(30_000)),
            Self::Quickcast => ResourceDescriptor::buff(Millis(10_000)),
            Self::Surge => ResourceDescriptor::buff(Millis(30_000)).with_potency_bonus(15),
            Self::Chain => ResourceDescriptor::stack_timer(3, Millis(15_000)),
            Self::QuickcastCd => ResourceDescriptor::cooldown(1, Millis(60_000)),
            Self::SurgeCd => ResourceDescriptor::cooldown(1, Millis(120_000)),
            Self::ChainCd => ResourceDescriptor::cooldown(2, Millis(60_000)),
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
pub enum CasterSkill {
    Blaze,
    Frost,
    Inferno,
    Flare,
    BlazeBurst,
    Glyphstrike,
    Quickcast,
    Surge,
    Chaincast,
    Meteor,
}

impl SkillId for CasterSkill {
    const ALL: &'static [Self] = Self::VARIANTS;
}

use CasterResource as R;

/// Cast-skipping resources, in the order they are spent.
const INSTANT: &[R] = &[R::Chain, R::Quickcast];

pub struct Caster;

impl Job for Caster {
    type Resource = CasterResource;
    type Skill = CasterSkill;

    const ID: JobId = JobId::Caster;
    const SPEED_STAT: SpeedStat = SpeedStat::SpellSpeed;
    const GCD: R = R::Gcd;
    const MANA: Option<R> = Some(R::Mana);

    const CONSISTENCY: &'static [ConsistencyRule<R>] = &[
        ConsistencyRule::Exclusive(R::FireStance, R::IceStance),
        ConsistencyRule::RequiresAny {
            resource: R::Hearts,
            any_of: &[R::FireStance, R::IceStance],
        },
        ConsistencyRule::TimerRequires {
            resource: R::Glyph,
            gate: R::Attuned,
        },
    ];

    fn skill(skill: CasterSkill) -> SkillSpec<R> {
        const GCD: Millis = Millis(2_500);
        match skill {
            // Gain the new stance before dropping the old one so the Glyph
            // timer never sees a gap.
            CasterSkill::Blaze => SkillSpec::spell(Millis(2_500), GCD)
                .potency(PotencySpec::damage(180))
                .costs(&[(R::Mana, 800)])
                .effects(&[
                    Effect::Gain(R::FireStance, 1),
                    Effect::Clear(R::IceStance),
                    Effect::Proc {
                        grant: R::Kindling,
                        chance_percent: 40,
                    },
                ])
                .instant_with(INSTANT),
            CasterSkill::Frost => SkillSpec::spell(Millis(2_500), GCD)
                .potency(PotencySpec::damage(180))
                .costs(&[(R::Mana, 400)])
                .effects(&[
                    Effect::Gain(R::IceStance, 1),
                    Effect::Clear(R::FireStance),
                    Effect::Gain(R::Hearts, 1),
                ])
                .instant_with(INSTANT),
            CasterSkill::Inferno => SkillSpec::spell(Millis(2_800), GCD)
                .potency(PotencySpec::damage(320))
                .requires(&[Requirement::Active(R::FireStance)])
                .costs(&[(R::Mana, 800)])
                .effects(&[Effect::Consume(R::Hearts, 1), Effect::Refresh(R::FireStance)])
                .instant_with(INSTANT),
            CasterSkill::Flare => SkillSpec::spell(Millis(3_000), GCD)
                .potency(PotencySpec::damage(240).with_falloff(40))
                .requires(&[Requirement::Active(R::FireStance)])
                .costs(&[(R::Mana, 1_500)])
                .effects(&[Effect::Clear(R::Hearts), Effect::Set(R::FireStance, 3)])
                .instant_with(INSTANT),
            CasterSkill::BlazeBurst => SkillSpec::spell(Millis::ZERO, GCD)
                .potency(PotencySpec::damage(260))
                .requires(&[Requirement::Active(R::Kindling)])
                .effects(&[
                    Effect::Consume(R::Kindling, 1),
                    Effect::Set(R::FireStance, 3),
                    Effect::Clear(R::IceStance),
                ]),
            CasterSkill::Glyphstrike => SkillSpec::spell(Millis::ZERO, GCD)
                .potency(PotencySpec::damage(600))
                .costs(&[(R::Glyph, 1)]),
            CasterSkill::Quickcast => {
                SkillSpec::ability(R::QuickcastCd).effects(&[Effect::Refresh(R::Quickcast)])
            }
            CasterSkill::Surge => {
                SkillSpec::ability(R::SurgeCd).effects(&[Effect::Refresh(R::Surge)])
            }
            CasterSkill::Chaincast => {
                SkillSpec::ability(R::ChainCd).effects(&[Effect::Set(R::Chain, 3)])
            }
            CasterSkill::Meteor => SkillSpec::limit_break(Millis(8_100)),
        }
    }

    fn regenerates_mana(store: &ResourceStore<R>) -> bool {
        !store.is_active(R::FireStance)
    }
}
