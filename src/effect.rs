use crate::card::Card;
use crate::field::Field;

use std::fmt;
use std::sync::Arc;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ActivationStatus {
    Cannot,
    Can,
}

/// Hook for the bespoke text of a spell or trap. Implementations are
/// registered with typetag so card data files can name them, one table per
/// effect in the order they resolve:
///
/// ```toml
/// [[cards]]
/// name = "Example"
/// type = "Spell Card"
///     [[cards.effects]]
///     type = "MyEffect"
/// ```
#[typetag::serde(tag = "type")]
pub trait Effect: Send + Sync + fmt::Debug {
    fn can_activate(&self, _source: &Card, _field: &Field) -> ActivationStatus {
        ActivationStatus::Can
    }

    /// Runs with the activating card still on (or about to leave) the field
    /// of its controller.
    fn resolve(&self, source: &Card, field: &mut Field);
}

/// Shared handle so every copy dealt from one template reuses the effect.
pub type EffectHandle = Arc<dyn Effect>;
