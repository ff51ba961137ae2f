//! Result row scanning into single records and collections.

use crate::error::OrmResult;
use crate::model::Model;
use crate::naming;
use crate::value::Value;

/// Where the rows of a query land.
pub(crate) trait Destination: Send {
    type Record: Model;

    /// Collections accept zero rows; single records do not.
    const COLLECTION: bool;

    /// The record whose id constrains the query, if any.
    fn record(&self) -> Option<&Self::Record>;

    fn scan_row(&mut self, columns: &[String], values: Vec<Value>) -> OrmResult<()>;
}

/// Scan into the caller's record in place.
pub(crate) struct Single<'a, M>(pub &'a mut M);

/// Append one fresh record per row.
pub(crate) struct Many<'a, M>(pub &'a mut Vec<M>);

impl<M: Model> Destination for Single<'_, M> {
    type Record = M;
    const COLLECTION: bool = false;

    fn record(&self) -> Option<&M> {
        Some(&*self.0)
    }

    fn scan_row(&mut self, columns: &[String], values: Vec<Value>) -> OrmResult<()> {
        assign_row(self.0, columns, values)
    }
}

impl<M: Model> Destination for Many<'_, M> {
    type Record = M;
    const COLLECTION: bool = true;

    fn record(&self) -> Option<&M> {
        None
    }

    fn scan_row(&mut self, columns: &[String], values: Vec<Value>) -> OrmResult<()> {
        let mut record = M::default();
        assign_row(&mut record, columns, values)?;
        self.0.push(record);
        Ok(())
    }
}

/// Copy each column into the field whose accessor form matches. Columns with
/// no matching field are ignored. NULL leaves a non-optional field unchanged.
fn assign_row<M: Model>(record: &mut M, columns: &[String], values: Vec<Value>) -> OrmResult<()> {
    for (column, value) in columns.iter().zip(values) {
        let accessor = naming::column_to_accessor(column);
        let Some(field) = M::FIELDS.iter().find(|f| {
            naming::column_to_accessor(&naming::declared_to_column(f.name)) == accessor
        }) else {
            continue;
        };

        let was_null = value.is_null();
        match record.set(field.name, value) {
            Ok(_) => {}
            Err(_) if was_null => {}
            Err(err) => return Err(err),
        }
    }
    Ok(())
}
