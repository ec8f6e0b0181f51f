//! String-keyed event factory registry.
//!
//! Events are created from their control-file type identifier plus a
//! token cursor over their parameters, so existing run scripts stay
//! loadable. The registry is an explicit value constructed once at
//! startup and passed to whatever instantiates events; there is no global
//! state.

use std::collections::BTreeMap;

use crate::config::control::{ControlError, EventLine, TokenCursor};
use crate::kinetics::{
    BindingParams, BondBindsABSequentiallyToPolymer, BondBindsForwardConeToPolymer,
    BondBindsToPolymer, ConeParams, KineticEvent, PolymerFormsBondTriple,
};
use crate::state::{BondId, PolymerId};

/// What a new event instance is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTarget {
    /// A live polymer, for growth events
    Polymer(PolymerId),
    /// A free bond, for nucleation events
    FreeBond(BondId),
}

type EventFactory =
    fn(&mut TokenCursor, EventTarget) -> Result<Box<dyn KineticEvent>, ControlError>;

/// Registry mapping event type identifiers to constructors
pub struct EventRegistry {
    factories: BTreeMap<&'static str, EventFactory>,
}

impl EventRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Registry with every built-in event type registered
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("BondBindsToPolymerHead", make_plain_head);
        registry.register("BondBindsToPolymerTail", make_plain_tail);
        registry.register("BondBindsABSequentiallyToPolymerHead", make_sequential_head);
        registry.register("BondBindsABSequentiallyToPolymerTail", make_sequential_tail);
        registry.register("BondBindsForwardConeToPolymerHead", make_cone_head);
        registry.register("BondBindsForwardConeToPolymerTail", make_cone_tail);
        registry.register("PolymerFormsBondTriple", make_nucleation);
        registry
    }

    pub fn register(&mut self, kind: &'static str, factory: EventFactory) {
        self.factories.insert(kind, factory);
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Registered type identifiers, sorted
    pub fn kinds(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.factories.keys().copied()
    }

    /// Instantiate an event of the given kind, consuming its parameter
    /// tokens from the cursor
    pub fn create(
        &self,
        kind: &str,
        cursor: &mut TokenCursor,
        target: EventTarget,
    ) -> Result<Box<dyn KineticEvent>, ControlError> {
        let factory = self
            .factories
            .get(kind)
            .ok_or_else(|| ControlError::UnknownEventType(kind.to_string()))?;
        factory(cursor, target)
    }

    /// Instantiate from a parsed control-file line, requiring every token
    /// to be consumed
    pub fn create_from_line(
        &self,
        line: &EventLine,
        target: EventTarget,
    ) -> Result<Box<dyn KineticEvent>, ControlError> {
        let mut cursor = line.cursor();
        let event = self.create(&line.kind, &mut cursor, target)?;
        cursor.finish()?;
        Ok(event)
    }
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn require_polymer(kind: &'static str, target: EventTarget) -> Result<PolymerId, ControlError> {
    match target {
        EventTarget::Polymer(p) => Ok(p),
        EventTarget::FreeBond(_) => Err(ControlError::TargetMismatch {
            kind: kind.to_string(),
            target: "a free bond",
        }),
    }
}

fn require_free_bond(kind: &'static str, target: EventTarget) -> Result<BondId, ControlError> {
    match target {
        EventTarget::FreeBond(b) => Ok(b),
        EventTarget::Polymer(_) => Err(ControlError::TargetMismatch {
            kind: kind.to_string(),
            target: "a polymer end",
        }),
    }
}

fn make_plain_head(
    cursor: &mut TokenCursor,
    target: EventTarget,
) -> Result<Box<dyn KineticEvent>, ControlError> {
    let params = BindingParams::from_tokens(cursor)?;
    let polymer = require_polymer("BondBindsToPolymerHead", target)?;
    Ok(Box::new(BondBindsToPolymer::head(polymer, params)))
}

fn make_plain_tail(
    cursor: &mut TokenCursor,
    target: EventTarget,
) -> Result<Box<dyn KineticEvent>, ControlError> {
    let params = BindingParams::from_tokens(cursor)?;
    let polymer = require_polymer("BondBindsToPolymerTail", target)?;
    Ok(Box::new(BondBindsToPolymer::tail(polymer, params)))
}

fn make_sequential_head(
    cursor: &mut TokenCursor,
    target: EventTarget,
) -> Result<Box<dyn KineticEvent>, ControlError> {
    let params = BindingParams::from_tokens(cursor)?;
    let polymer = require_polymer("BondBindsABSequentiallyToPolymerHead", target)?;
    Ok(Box::new(BondBindsABSequentiallyToPolymer::head(
        polymer, params,
    )))
}

fn make_sequential_tail(
    cursor: &mut TokenCursor,
    target: EventTarget,
) -> Result<Box<dyn KineticEvent>, ControlError> {
    let params = BindingParams::from_tokens(cursor)?;
    let polymer = require_polymer("BondBindsABSequentiallyToPolymerTail", target)?;
    Ok(Box::new(BondBindsABSequentiallyToPolymer::tail(
        polymer, params,
    )))
}

fn make_cone_head(
    cursor: &mut TokenCursor,
    target: EventTarget,
) -> Result<Box<dyn KineticEvent>, ControlError> {
    let params = ConeParams::from_tokens(cursor)?;
    let polymer = require_polymer("BondBindsForwardConeToPolymerHead", target)?;
    Ok(Box::new(BondBindsForwardConeToPolymer::head(
        polymer, params,
    )))
}

fn make_cone_tail(
    cursor: &mut TokenCursor,
    target: EventTarget,
) -> Result<Box<dyn KineticEvent>, ControlError> {
    let params = ConeParams::from_tokens(cursor)?;
    let polymer = require_polymer("BondBindsForwardConeToPolymerTail", target)?;
    Ok(Box::new(BondBindsForwardConeToPolymer::tail(
        polymer, params,
    )))
}

fn make_nucleation(
    cursor: &mut TokenCursor,
    target: EventTarget,
) -> Result<Box<dyn KineticEvent>, ControlError> {
    let params = BindingParams::from_tokens(cursor)?;
    let seed = require_free_bond("PolymerFormsBondTriple", target)?;
    Ok(Box::new(PolymerFormsBondTriple::new(seed, params)))
}
