//! Stepping session: one handle per simulated instance.
//!
//! ```text
//!            step / set_parameter (try_lock)
//!   Ready ────────────────────────────────▶ (exclusive) ───▶ Ready
//!     ▲                                          │
//!     └──────────── Busy if already held ◀───────┘
//! ```
//!
//! `step` and `set_parameter` hold the session lock for their whole
//! duration. A second caller does not wait: it gets
//! [`SteppingError::Busy`]. The lock is never held across anything but the
//! call itself, so there is no timeout or cancellation here. A caller that
//! gives up on a step must discard the session.

use indexmap::IndexMap;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use super::instance::SimulationInstance;
use super::store::{Access, ValueStore};
use super::value::{NamedValue, TIME, Value};
use crate::binding::{
    Causality, ModelDescription, QualifiedName, StartValue, TypeKind, ValueReference,
};
use crate::error::{BindingError, ExpressionError, SteppingError};
use crate::model::{ExprType, Interpreter, LiteralInterpreter, Model};

/// A scalar variable resolved against the model.
#[derive(Debug, Clone)]
struct Binding {
    causality: Causality,
    kind: TypeKind,
    /// `None` when the description has no link for the variable.
    qualified: Option<QualifiedName>,
}

struct SessionState<I> {
    time: f64,
    store: ValueStore,
    instance: I,
    model: Model,
}

/// Explicit handle to one running instance.
pub struct Session<I: SimulationInstance> {
    /// Keyed by exported name, in table order.
    bindings: IndexMap<String, Binding>,
    names: FxHashMap<ValueReference, String>,
    interpreter: Box<dyn Interpreter>,
    state: Mutex<SessionState<I>>,
}

impl<I: SimulationInstance> Session<I> {
    /// Bind `description` to `model` and initialize `instance`.
    ///
    /// Every linked variable gets a direct cell seeded from the model's
    /// default, falling back to the description's start value.
    pub fn new(
        model: Model,
        description: &ModelDescription,
        mut instance: I,
    ) -> Result<Self, SteppingError> {
        let mut bindings = IndexMap::new();
        let mut names = FxHashMap::default();
        let mut store = ValueStore::new();

        for variable in &description.variables {
            let kind = variable.ty.kind;
            let qualified = description.links.get(variable.value_reference).cloned();
            match &qualified {
                Some(q) => {
                    let initial = model_default(&model, q, kind)
                        .or_else(|| variable.ty.start.as_ref().map(Value::from))
                        .unwrap_or(Value::Undefined);
                    store.declare(q.clone(), Access::Direct, initial);
                }
                None => tracing::warn!("'{}' has no link", variable.name),
            }
            names.insert(variable.value_reference, variable.name.clone());
            bindings.insert(
                variable.name.clone(),
                Binding {
                    causality: variable.effective_causality(),
                    kind,
                    qualified,
                },
            );
        }

        instance.initialize(&mut store)?;
        tracing::debug!("Session bound {} variables", bindings.len());

        Ok(Self {
            bindings,
            names,
            interpreter: Box::new(LiteralInterpreter),
            state: Mutex::new(SessionState {
                time: 0.0,
                store,
                instance,
                model,
            }),
        })
    }

    /// Use `interpreter` to parse and check parameter overrides.
    pub fn with_interpreter(mut self, interpreter: impl Interpreter + 'static) -> Self {
        self.interpreter = Box::new(interpreter);
        self
    }

    fn lock(&self) -> Result<parking_lot::MutexGuard<'_, SessionState<I>>, SteppingError> {
        self.state.try_lock().ok_or(SteppingError::Busy)
    }

    fn binding(&self, name: &str) -> Result<(&Binding, &QualifiedName), BindingError> {
        let binding = self
            .bindings
            .get(name)
            .ok_or_else(|| BindingError::UnknownVariable(name.to_string()))?;
        let qualified = binding
            .qualified
            .as_ref()
            .ok_or_else(|| BindingError::UnknownVariable(name.to_string()))?;
        Ok((binding, qualified))
    }

    /// Apply `inputs`, advance to `target` and read back time and outputs.
    ///
    /// The result starts with `("time", target)` followed by every output
    /// in table order.
    pub fn step(
        &self,
        target: f64,
        inputs: &[NamedValue],
    ) -> Result<Vec<NamedValue>, SteppingError> {
        let mut guard = self.lock()?;
        let state = &mut *guard;

        if target.is_nan() || target < state.time {
            return Err(SteppingError::TimeRegression {
                current: state.time,
                target,
            });
        }

        // Resolve every input before writing any.
        let mut writes = Vec::with_capacity(inputs.len());
        for input in inputs {
            let binding = self
                .bindings
                .get(&input.name)
                .filter(|b| b.causality == Causality::Input)
                .ok_or_else(|| BindingError::UnboundInput(input.name.clone()))?;
            let qualified = binding
                .qualified
                .as_ref()
                .ok_or_else(|| BindingError::UnboundInput(input.name.clone()))?;
            let value = input.value.clone().coerce(binding.kind).ok_or_else(|| {
                BindingError::TypeMismatch {
                    name: input.name.clone(),
                    expected: binding.kind,
                    found: input.value.kind_name(),
                }
            })?;
            writes.push((qualified, value));
        }
        for (qualified, value) in writes {
            state.store.overwrite(qualified, value)?;
        }

        tracing::trace!("Advancing from {} to {}", state.time, target);
        if let Err(e) = state.instance.advance_to(target, &mut state.store) {
            state.store.rollback();
            tracing::warn!("Step to {} failed: {}", target, e);
            return Err(e.into());
        }
        state.store.commit();
        state.time = target;

        let mut outputs = vec![NamedValue::new(TIME, Value::Real(target))];
        for (name, binding) in &self.bindings {
            if binding.causality != Causality::Output {
                continue;
            }
            let value = binding
                .qualified
                .as_ref()
                .and_then(|q| state.store.read(q).ok())
                .ok_or_else(|| BindingError::BoundOutputMissing(name.clone()))?;
            if value.is_undefined() {
                return Err(BindingError::OutputUninitialized(name.clone()).into());
            }
            outputs.push(NamedValue::new(name.as_str(), value.clone()));
        }
        Ok(outputs)
    }

    /// Override the default of a bound parameter for the next instantiation.
    ///
    /// The literal is parsed, then type checked; either failure leaves the
    /// declaration untouched.
    pub fn set_parameter(&self, name: &str, literal: &str) -> Result<(), SteppingError> {
        let mut guard = self.lock()?;
        let state = &mut *guard;

        let unbound = || BindingError::UnboundParameter(name.to_string());
        let qualified = self
            .bindings
            .get(name)
            .filter(|b| b.causality == Causality::Parameter)
            .and_then(|b| b.qualified.as_ref())
            .ok_or_else(unbound)?;
        let id = state
            .model
            .find_qualified(qualified.as_str())
            .ok_or_else(unbound)?;
        let def = state.model.definition(id).ok_or_else(unbound)?;
        if !def.is_value() {
            return Err(unbound().into());
        }

        let text = self
            .interpreter
            .parse_expression(literal)
            .map_err(|messages| ExpressionError::parse(literal, &messages))?;
        let typed = self
            .interpreter
            .type_check_expression(&text)
            .map_err(|messages| ExpressionError::type_check(literal, &messages))?;

        // Only the constructor argument is replaced, never the construction.
        let fits = match (&typed.ty, def.ty.port_kind()) {
            (ExprType::Object(_), _) => false,
            (ty, Some(port)) => ty.fits_port(port),
            (ty, None) => ty.conforms_to(&def.ty),
        };
        if !fits {
            return Err(ExpressionError::type_check(
                literal,
                &[format!("expected {}, found {:?}", def.ty, typed.ty)],
            )
            .into());
        }

        let patched = state
            .model
            .definition_mut(id)
            .and_then(|d| d.slot_mut())
            .is_some_and(|slot| slot.patch(&typed.text));
        if !patched {
            return Err(ExpressionError::NotPatchable {
                name: name.to_string(),
            }
            .into());
        }
        tracing::info!("Parameter '{}' set to {}", name, typed.text);
        Ok(())
    }

    /// Current value of a bound variable.
    pub fn get(&self, name: &str) -> Result<Value, SteppingError> {
        let state = self.lock()?;
        let (_, qualified) = self.binding(name)?;
        Ok(state.store.read(qualified)?.clone())
    }

    /// Overwrite a bound variable in place.
    pub fn set(&self, name: &str, value: Value) -> Result<(), SteppingError> {
        let mut state = self.lock()?;
        let (binding, qualified) = self.binding(name)?;
        let found = value.kind_name();
        let value = value
            .coerce(binding.kind)
            .ok_or_else(|| BindingError::TypeMismatch {
                name: name.to_string(),
                expected: binding.kind,
                found,
            })?;
        state.store.overwrite(qualified, value)?;
        Ok(())
    }

    /// Exported name of a value reference.
    pub fn resolve(&self, value_reference: ValueReference) -> Option<&str> {
        self.names.get(&value_reference).map(String::as_str)
    }

    pub fn current_time(&self) -> Result<f64, SteppingError> {
        Ok(self.lock()?.time)
    }

    /// Current default expression of a bound parameter.
    pub fn parameter(&self, name: &str) -> Result<String, SteppingError> {
        let state = self.lock()?;
        let unbound = || BindingError::UnboundParameter(name.to_string());
        let qualified = self
            .bindings
            .get(name)
            .filter(|b| b.causality == Causality::Parameter)
            .and_then(|b| b.qualified.as_ref())
            .ok_or_else(unbound)?;
        let initializer = state
            .model
            .find_qualified(qualified.as_str())
            .and_then(|id| state.model.definition(id))
            .and_then(|d| d.initializer())
            .ok_or_else(unbound)?;
        Ok(initializer.render())
    }

    /// Tear the session down, keeping the (possibly patched) model.
    pub fn into_model(self) -> Model {
        self.state.into_inner().model
    }
}

/// The literal default of the declaration behind `qualified`, if any.
fn model_default(model: &Model, qualified: &QualifiedName, kind: TypeKind) -> Option<Value> {
    let id = model.find_qualified(qualified.as_str())?;
    let text = model.definition(id)?.initializer()?.literal_argument()?;
    StartValue::parse(kind, text).map(|start| Value::from(&start))
}
