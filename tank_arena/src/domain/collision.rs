// Collision categories partitioning every body in the arena.

use serde::Serialize;

/// Disjoint tag attached to every physical body at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionCategory {
    Wall,
    Tank,
    TankProjectile,
}

impl CollisionCategory {
    pub const ALL: [CollisionCategory; 3] = [Self::Wall, Self::Tank, Self::TankProjectile];

    pub const fn bits(self) -> u32 {
        match self {
            CollisionCategory::Wall => 0b001,
            CollisionCategory::Tank => 0b010,
            CollisionCategory::TankProjectile => 0b100,
        }
    }
}

/// Category plus the set of categories a body physically collides with.
///
/// Filters only gate the physics response. Explicit collision queries ignore them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionFilter {
    pub category: CollisionCategory,
    pub mask: u32,
}

impl CollisionFilter {
    /// Collides with every category.
    pub const fn new(category: CollisionCategory) -> Self {
        Self {
            category,
            mask: u32::MAX,
        }
    }

    pub const fn with_mask(category: CollisionCategory, mask: u32) -> Self {
        Self { category, mask }
    }

    /// Both sides have to accept each other.
    pub fn can_collide(&self, other: &CollisionFilter) -> bool {
        (self.mask & other.category.bits()) != 0 && (other.mask & self.category.bits()) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_categories_are_listed_then_bits_are_disjoint() {
        let mut seen = 0u32;
        for category in CollisionCategory::ALL {
            assert_eq!(seen & category.bits(), 0);
            seen |= category.bits();
        }
        assert_eq!(seen, 0b111);
    }

    #[test]
    fn when_projectile_masks_walls_only_then_it_ignores_tanks() {
        let projectile = CollisionFilter::with_mask(
            CollisionCategory::TankProjectile,
            CollisionCategory::Wall.bits(),
        );
        let tank = CollisionFilter::new(CollisionCategory::Tank);
        let wall = CollisionFilter::new(CollisionCategory::Wall);

        assert!(!projectile.can_collide(&tank));
        assert!(!tank.can_collide(&projectile));
        assert!(projectile.can_collide(&wall));
        assert!(tank.can_collide(&tank));
    }

    #[test]
    fn when_two_projectiles_meet_then_they_pass_through() {
        let projectile = CollisionFilter::with_mask(
            CollisionCategory::TankProjectile,
            CollisionCategory::Wall.bits(),
        );

        assert!(!projectile.can_collide(&projectile));
    }
}
