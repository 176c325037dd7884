//! The live instance a session drives.

use super::store::ValueStore;
use crate::error::InstanceError;

/// An interpreted model instance.
///
/// The instance owns its scheduling. The session only tells it how far to
/// run and hands it the store holding every exchanged value.
pub trait SimulationInstance: Send {
    /// Declare internal state before the first step.
    fn initialize(&mut self, _store: &mut ValueStore) -> Result<(), InstanceError> {
        Ok(())
    }

    /// Run every scheduled action up to and including `target`.
    fn advance_to(&mut self, target: f64, store: &mut ValueStore) -> Result<(), InstanceError>;
}

type Action = Box<dyn FnMut(f64, &mut ValueStore) -> Result<(), InstanceError> + Send>;

/// Instance running a fixed list of timed actions.
///
/// Each action fires once, in schedule order, on the first advance that
/// reaches its time.
#[derive(Default)]
pub struct ScriptedInstance {
    actions: Vec<(f64, Action)>,
    next: usize,
}

impl ScriptedInstance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `action` at `time`; the list is kept sorted by time.
    pub fn at(
        mut self,
        time: f64,
        action: impl FnMut(f64, &mut ValueStore) -> Result<(), InstanceError> + Send + 'static,
    ) -> Self {
        let pos = self.actions.partition_point(|(t, _)| *t <= time);
        self.actions.insert(pos, (time, Box::new(action)));
        self
    }

    /// Actions not yet fired.
    pub fn pending(&self) -> usize {
        self.actions.len() - self.next
    }
}

impl SimulationInstance for ScriptedInstance {
    fn advance_to(&mut self, target: f64, store: &mut ValueStore) -> Result<(), InstanceError> {
        while let Some((time, action)) = self.actions.get_mut(self.next) {
            if *time > target {
                break;
            }
            tracing::trace!("Firing action scheduled at {}", time);
            action(*time, &mut *store)?;
            self.next += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::QualifiedName;
    use crate::runtime::{Access, Value};

    #[test]
    fn test_actions_fire_in_time_order_up_to_target() {
        let counter = QualifiedName::from("C.n");
        let mut store = ValueStore::new();
        store.declare(counter.clone(), Access::Direct, Value::Integer(0));

        let bump = |_: f64, store: &mut ValueStore| {
            let name = QualifiedName::from("C.n");
            let n = match store.read(&name) {
                Ok(Value::Integer(n)) => *n,
                _ => 0,
            };
            store
                .overwrite(&name, Value::Integer(n + 1))
                .map_err(|e| InstanceError(e.to_string()))
        };
        let mut instance = ScriptedInstance::new().at(2.0, bump).at(1.0, bump).at(3.0, bump);

        instance.advance_to(2.0, &mut store).unwrap();
        assert_eq!(store.read(&counter).unwrap(), &Value::Integer(2));
        assert_eq!(instance.pending(), 1);

        instance.advance_to(2.5, &mut store).unwrap();
        assert_eq!(instance.pending(), 1);
        instance.advance_to(3.0, &mut store).unwrap();
        assert_eq!(store.read(&counter).unwrap(), &Value::Integer(3));
    }
}
