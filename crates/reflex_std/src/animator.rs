//! The animator system.

use reflex_engine::{ComponentFilter, Ecs, FilterView, System, SystemContext};
use reflex_foundation::Result;

use crate::transform::{Rotation, RotationSpeed};

/// Spins every entity that has both a [`RotationSpeed`] and a [`Rotation`].
///
/// Each tick, the speed is added to the rotation through
/// [`Ecs::update_component`], so rotation observers hear about it one tick
/// later. Membership is fixed when an entity is tracked: entities must carry
/// both components by the time they are first added to a hierarchy.
#[derive(Debug, Default)]
pub struct Animator {
    animated: FilterView,
    frames: u64,
}

impl Animator {
    /// Creates an animator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The entities being animated.
    #[must_use]
    pub fn animated(&self) -> &FilterView {
        &self.animated
    }

    /// Number of ticks the animator has run.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn animate(&mut self, ecs: &mut Ecs) -> Result<()> {
        for entity in self.animated.to_vec() {
            let Some(&speed) = ecs.get_component::<RotationSpeed>(entity) else {
                continue;
            };
            ecs.update_component::<Rotation, _>(entity, |rotation| rotation.advance(speed))?;
        }
        self.frames += 1;
        Ok(())
    }
}

impl System for Animator {
    fn init(&mut self, ctx: &mut SystemContext<'_, Self>) -> Result<()> {
        self.animated = ctx.filter_entities(
            ComponentFilter::new()
                .have::<RotationSpeed>()
                .have::<Rotation>(),
        );
        ctx.on_tick(Self::animate);
        log::debug!("animator tracking {} entities", self.animated.len());
        Ok(())
    }
}
