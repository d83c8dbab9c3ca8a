use crate::video::{MediaElement, PreloadHint};

/// Keeps off-screen slots on metadata-only buffering and switches a slot to
/// full buffering the first time it comes within the preload margin.
#[derive(Debug)]
pub struct PreloadStrategy {
    hint: PreloadHint,
}

impl Default for PreloadStrategy {
    fn default() -> Self {
        Self {
            hint: PreloadHint::Metadata,
        }
    }
}

impl PreloadStrategy {
    /// Applies the initial hint to a freshly mounted element.
    pub fn attach<M: MediaElement>(element: &mut M) -> Self {
        let strategy = Self::default();
        element.set_preload(strategy.hint);
        strategy
    }

    pub fn hint(&self) -> PreloadHint {
        self.hint
    }

    /// Returns true only on the call that performed the upgrade.
    pub fn on_ratio<M: MediaElement>(&mut self, ratio: f64, element: &mut M) -> bool {
        if ratio <= 0.0 || self.hint == PreloadHint::Auto {
            return false;
        }
        self.hint = PreloadHint::Auto;
        element.set_preload(PreloadHint::Auto);
        true
    }
}
