//! Value storage of a running instance.
//!
//! Every cell has an access mode. Exchange-visible declarations are
//! [`Access::Direct`]: the session overwrites them in place. Everything else
//! is [`Access::Transactional`]: writes are staged and only become visible
//! to readers outside the instance after [`ValueStore::commit`].

use indexmap::IndexMap;

use super::value::Value;
use crate::binding::QualifiedName;
use crate::error::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Direct,
    Transactional,
}

#[derive(Debug, Clone)]
struct Cell {
    access: Access,
    value: Value,
    staged: Option<Value>,
}

/// Named cells keyed by qualified declaration name.
#[derive(Debug, Clone, Default)]
pub struct ValueStore {
    cells: IndexMap<QualifiedName, Cell>,
}

impl ValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare (or redeclare) a cell.
    pub fn declare(&mut self, name: QualifiedName, access: Access, value: Value) {
        self.cells.insert(
            name,
            Cell {
                access,
                value,
                staged: None,
            },
        );
    }

    pub fn contains(&self, name: &QualifiedName) -> bool {
        self.cells.contains_key(name)
    }

    pub fn access(&self, name: &QualifiedName) -> Option<Access> {
        self.cells.get(name).map(|c| c.access)
    }

    /// Latest value of a cell, staged writes included.
    pub fn read(&self, name: &QualifiedName) -> Result<&Value, StoreError> {
        let cell = self.cell(name)?;
        Ok(cell.staged.as_ref().unwrap_or(&cell.value))
    }

    /// Committed value of a cell.
    pub fn committed(&self, name: &QualifiedName) -> Result<&Value, StoreError> {
        Ok(&self.cell(name)?.value)
    }

    /// Replace the value of a direct cell.
    pub fn overwrite(&mut self, name: &QualifiedName, value: Value) -> Result<(), StoreError> {
        let cell = self.cell_mut(name)?;
        if cell.access != Access::Direct {
            return Err(StoreError::NotDirectlyWritable(name.to_string()));
        }
        cell.value = value;
        Ok(())
    }

    /// Stage a write to a transactional cell.
    pub fn stage(&mut self, name: &QualifiedName, value: Value) -> Result<(), StoreError> {
        let cell = self.cell_mut(name)?;
        if cell.access != Access::Transactional {
            return Err(StoreError::NotTransactional(name.to_string()));
        }
        cell.staged = Some(value);
        Ok(())
    }

    /// Write through whichever path the cell's access mode allows.
    pub fn write(&mut self, name: &QualifiedName, value: Value) -> Result<(), StoreError> {
        match self.access(name) {
            Some(Access::Direct) => self.overwrite(name, value),
            Some(Access::Transactional) => self.stage(name, value),
            None => Err(StoreError::Unknown(name.to_string())),
        }
    }

    pub fn has_staged(&self) -> bool {
        self.cells.values().any(|c| c.staged.is_some())
    }

    pub fn commit(&mut self) {
        for cell in self.cells.values_mut() {
            if let Some(value) = cell.staged.take() {
                cell.value = value;
            }
        }
    }

    pub fn rollback(&mut self) {
        for cell in self.cells.values_mut() {
            cell.staged = None;
        }
    }

    fn cell(&self, name: &QualifiedName) -> Result<&Cell, StoreError> {
        self.cells
            .get(name)
            .ok_or_else(|| StoreError::Unknown(name.to_string()))
    }

    fn cell_mut(&mut self, name: &QualifiedName) -> Result<&mut Cell, StoreError> {
        self.cells
            .get_mut(name)
            .ok_or_else(|| StoreError::Unknown(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> QualifiedName {
        QualifiedName::from(s)
    }

    #[test]
    fn test_direct_cells_reject_staging() {
        let mut store = ValueStore::new();
        store.declare(name("H.level"), Access::Direct, Value::Undefined);

        store.overwrite(&name("H.level"), Value::Real(1.5)).unwrap();
        assert_eq!(store.read(&name("H.level")).unwrap(), &Value::Real(1.5));
        assert_eq!(
            store.stage(&name("H.level"), Value::Real(2.0)),
            Err(StoreError::NotTransactional("H.level".into()))
        );
    }

    #[test]
    fn test_transactional_commit_and_rollback() {
        let mut store = ValueStore::new();
        store.declare(name("C.count"), Access::Transactional, Value::Integer(0));

        assert_eq!(
            store.overwrite(&name("C.count"), Value::Integer(1)),
            Err(StoreError::NotDirectlyWritable("C.count".into()))
        );

        store.write(&name("C.count"), Value::Integer(1)).unwrap();
        assert!(store.has_staged());
        assert_eq!(store.read(&name("C.count")).unwrap(), &Value::Integer(1));
        assert_eq!(store.committed(&name("C.count")).unwrap(), &Value::Integer(0));

        store.rollback();
        assert_eq!(store.read(&name("C.count")).unwrap(), &Value::Integer(0));

        store.stage(&name("C.count"), Value::Integer(5)).unwrap();
        store.commit();
        assert!(!store.has_staged());
        assert_eq!(store.committed(&name("C.count")).unwrap(), &Value::Integer(5));
    }

    #[test]
    fn test_unknown_cell() {
        let store = ValueStore::new();
        assert_eq!(
            store.read(&name("X.y")),
            Err(StoreError::Unknown("X.y".into()))
        );
    }
}
