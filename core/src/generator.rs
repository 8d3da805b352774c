use alloc::vec::Vec;

use rand::prelude::*;
use rand::rngs::SmallRng;

use crate::*;

/// Source of fresh piece appearances, consulted on spawn, refill and spawn-guard re-rolls.
pub trait PieceGenerator {
    /// `variants[kind.index()]` is the number of visual variants available for that kind, never zero.
    fn roll(&mut self, variants: &[u8; KIND_COUNT]) -> Appearance;
}

impl<G: PieceGenerator + ?Sized> PieceGenerator for &mut G {
    fn roll(&mut self, variants: &[u8; KIND_COUNT]) -> Appearance {
        (**self).roll(variants)
    }
}

/// Uniform kind, then a uniform variant within that kind.
#[derive(Clone, Debug)]
pub struct RandomPieceGenerator {
    rng: SmallRng,
}

impl RandomPieceGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl PieceGenerator for RandomPieceGenerator {
    fn roll(&mut self, variants: &[u8; KIND_COUNT]) -> Appearance {
        let kind = PieceKind::ALL[self.rng.random_range(0..KIND_COUNT)];
        let variant = self.rng.random_range(0..variants[kind.index()].max(1));
        Appearance::new(kind, variant)
    }
}

/// Replays a fixed list of appearances in a loop, ignoring the variant table.
#[derive(Clone, Debug, PartialEq)]
pub struct ScriptedGenerator {
    script: Vec<Appearance>,
    cursor: usize,
}

impl ScriptedGenerator {
    /// An empty script falls back to plain fast food.
    pub fn new(script: impl IntoIterator<Item = Appearance>) -> Self {
        Self {
            script: script.into_iter().collect(),
            cursor: 0,
        }
    }

    pub fn from_kinds(kinds: impl IntoIterator<Item = PieceKind>) -> Self {
        Self::new(kinds.into_iter().map(Appearance::plain))
    }
}

impl PieceGenerator for ScriptedGenerator {
    fn roll(&mut self, _variants: &[u8; KIND_COUNT]) -> Appearance {
        if self.script.is_empty() {
            return Appearance::plain(PieceKind::FastFood);
        }
        let appearance = self.script[self.cursor % self.script.len()];
        self.cursor = self.cursor.wrapping_add(1);
        appearance
    }
}
