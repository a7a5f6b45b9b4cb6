//! Operator registry

use tracing::info;
use train_booking_core::{Error, Operator, OperatorPayload, Principal, Result};

use crate::database::Database;
use crate::storage::WriteBatch;

/// Register an operator owned by `caller`
///
/// Registering a name again replaces the earlier operator, including its
/// principal.
pub fn add_operator(db: &Database, caller: &Principal, payload: OperatorPayload) -> Result<Operator> {
    if payload.name.trim().is_empty() {
        return Err(Error::InvalidArgument("operator name must not be empty".into()));
    }

    let operator = Operator {
        name: payload.name,
        principal: caller.clone(),
        phone_number: payload.phone_number,
        address: payload.address,
    };

    let mut batch = WriteBatch::default();
    batch.put(&operator)?;
    db.commit(batch)?;

    info!(operator = %operator.name, principal = %caller, "registered operator");
    Ok(operator)
}

pub fn get_operator(db: &Database, name: &str) -> Result<Operator> {
    db.get::<Operator>(name)?
        .ok_or_else(|| Error::NotFound(format!("Operator with name {name} not found")))
}

pub fn get_operators(db: &Database) -> Result<Vec<Operator>> {
    Ok(db.all()?)
}
