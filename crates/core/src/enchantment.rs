//! Enchantment identities and the durability negation roll.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Types of enchantments that can be applied to items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnchantmentType {
    // Tool enchantments
    /// Increases mining speed
    Efficiency,
    /// Allows silk touch harvesting of blocks
    SilkTouch,
    /// Increases block drop amounts
    Fortune,

    // Weapon enchantments
    /// Increases attack damage
    Sharpness,
    /// Increases knockback
    Knockback,
    /// Sets targets on fire
    FireAspect,
    /// Increases bow/arrow damage
    Power,
    /// Increases bow/arrow knockback
    Punch,
    /// Bow/arrow sets targets on fire
    Flame,
    /// Allows firing without consuming arrows.
    Infinity,

    // Armor enchantments
    /// Reduces damage from all sources
    Protection,
    /// Reduces fire damage
    FireProtection,
    /// Reduces explosion damage
    BlastProtection,
    /// Reduces projectile damage
    ProjectileProtection,
    /// Reduces fall damage (boots)
    FeatherFalling,
    /// Extends underwater breathing (helmet)
    Respiration,
    /// Removes underwater mining speed penalty (helmet).
    AquaAffinity,
    /// Increases underwater movement speed (boots).
    DepthStrider,

    // Universal enchantments
    /// Chance to negate each point of durability damage
    Unbreaking,
    /// Repairs item using XP
    Mending,
}

impl EnchantmentType {
    /// Every known enchantment, in id order.
    pub const ALL: [EnchantmentType; 20] = [
        EnchantmentType::Protection,
        EnchantmentType::FireProtection,
        EnchantmentType::FeatherFalling,
        EnchantmentType::BlastProtection,
        EnchantmentType::ProjectileProtection,
        EnchantmentType::Respiration,
        EnchantmentType::AquaAffinity,
        EnchantmentType::DepthStrider,
        EnchantmentType::Sharpness,
        EnchantmentType::Knockback,
        EnchantmentType::FireAspect,
        EnchantmentType::Efficiency,
        EnchantmentType::SilkTouch,
        EnchantmentType::Unbreaking,
        EnchantmentType::Fortune,
        EnchantmentType::Power,
        EnchantmentType::Punch,
        EnchantmentType::Flame,
        EnchantmentType::Infinity,
        EnchantmentType::Mending,
    ];

    /// Numeric id persisted in the `ench` list.
    pub fn id(self) -> i16 {
        match self {
            EnchantmentType::Protection => 0,
            EnchantmentType::FireProtection => 1,
            EnchantmentType::FeatherFalling => 2,
            EnchantmentType::BlastProtection => 3,
            EnchantmentType::ProjectileProtection => 4,
            EnchantmentType::Respiration => 5,
            EnchantmentType::AquaAffinity => 6,
            EnchantmentType::DepthStrider => 8,
            EnchantmentType::Sharpness => 16,
            EnchantmentType::Knockback => 19,
            EnchantmentType::FireAspect => 20,
            EnchantmentType::Efficiency => 32,
            EnchantmentType::SilkTouch => 33,
            EnchantmentType::Unbreaking => 34,
            EnchantmentType::Fortune => 35,
            EnchantmentType::Power => 48,
            EnchantmentType::Punch => 49,
            EnchantmentType::Flame => 50,
            EnchantmentType::Infinity => 51,
            EnchantmentType::Mending => 70,
        }
    }

    /// Resolve a persisted id; unknown ids yield `None`.
    pub fn from_id(id: i16) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.id() == id)
    }

    /// Get the maximum level for this enchantment
    pub fn max_level(&self) -> u8 {
        match self {
            EnchantmentType::Efficiency => 5,
            EnchantmentType::SilkTouch => 1,
            EnchantmentType::Fortune => 3,
            EnchantmentType::Sharpness => 5,
            EnchantmentType::Knockback => 2,
            EnchantmentType::FireAspect => 2,
            EnchantmentType::Power => 5,
            EnchantmentType::Punch => 2,
            EnchantmentType::Flame => 1,
            EnchantmentType::Infinity => 1,
            EnchantmentType::Protection => 4,
            EnchantmentType::FireProtection => 4,
            EnchantmentType::BlastProtection => 4,
            EnchantmentType::ProjectileProtection => 4,
            EnchantmentType::FeatherFalling => 4,
            EnchantmentType::Respiration => 3,
            EnchantmentType::AquaAffinity => 1,
            EnchantmentType::DepthStrider => 3,
            EnchantmentType::Unbreaking => 3,
            EnchantmentType::Mending => 1,
        }
    }

}

/// An enchantment with a specific level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Enchantment {
    /// The type of enchantment
    pub enchantment_type: EnchantmentType,
    /// The level of the enchantment (1 to max_level)
    pub level: u8,
}

impl Enchantment {
    /// Create a new enchantment
    pub fn new(enchantment_type: EnchantmentType, level: u8) -> Self {
        let max_level = enchantment_type.max_level();
        let level = level.min(max_level); // Clamp to max level
        Self {
            enchantment_type,
            level,
        }
    }
}

/// Roll whether one point of durability damage is negated by Unbreaking.
///
/// Armor only gets the roll 40% of the time; everything else keeps the
/// point with probability `1 / (level + 1)`.
pub fn negate_damage<R: Rng + ?Sized>(is_armor: bool, level: i32, rng: &mut R) -> bool {
    if level <= 0 {
        return false;
    }
    if is_armor && rng.gen::<f32>() < 0.6 {
        return false;
    }
    rng.gen_range(0..=level) > 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_max_level() {
        assert_eq!(EnchantmentType::Efficiency.max_level(), 5);
        assert_eq!(EnchantmentType::SilkTouch.max_level(), 1);
        assert_eq!(EnchantmentType::Unbreaking.max_level(), 3);
        assert_eq!(EnchantmentType::AquaAffinity.max_level(), 1);
        assert_eq!(EnchantmentType::DepthStrider.max_level(), 3);
    }

    #[test]
    fn test_enchantment_level_clamping() {
        let ench = Enchantment::new(EnchantmentType::SilkTouch, 10);
        assert_eq!(ench.level, 1);

        let ench = Enchantment::new(EnchantmentType::Efficiency, 3);
        assert_eq!(ench.level, 3);
    }

    #[test]
    fn ids_round_trip() {
        for ench in EnchantmentType::ALL {
            assert_eq!(EnchantmentType::from_id(ench.id()), Some(ench));
        }
        assert_eq!(EnchantmentType::Unbreaking.id(), 34);
        assert_eq!(EnchantmentType::from_id(7), None);
    }

    #[test]
    fn level_zero_never_negates() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            assert!(!negate_damage(false, 0, &mut rng));
        }
    }

    #[test]
    fn higher_levels_negate_more_often() {
        let mut rng = StdRng::seed_from_u64(42);
        let trials = 4000;
        let low = (0..trials).filter(|_| negate_damage(false, 1, &mut rng)).count();
        let high = (0..trials).filter(|_| negate_damage(false, 3, &mut rng)).count();
        // Expected rates are 1/2 and 3/4.
        assert!(low > trials * 2 / 5 && low < trials * 3 / 5, "low={low}");
        assert!(high > trials * 13 / 20 && high < trials * 17 / 20, "high={high}");
    }

    #[test]
    fn armor_negates_less_often() {
        let mut rng = StdRng::seed_from_u64(9);
        let trials = 4000;
        let armor = (0..trials).filter(|_| negate_damage(true, 3, &mut rng)).count();
        // Expected rate is 0.4 * 3/4 = 0.3.
        assert!(armor > trials / 5 && armor < trials * 2 / 5, "armor={armor}");
    }
}
