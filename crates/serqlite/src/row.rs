use std::sync::Arc;

use indexmap::IndexMap;

use crate::{Column, Datum, Result, decode::Decode, error::Error};

/// One decoded result row.
///
/// Every column is kept in declaration order, including columns that share a name.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[Column]>,
    values: Vec<Datum>,
}

impl Row {
    pub(crate) fn new(columns: Arc<[Column]>, values: Vec<Datum>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn values(&self) -> &[Datum] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(column name, value)` pairs in declaration order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &Datum)> {
        self.columns
            .iter()
            .map(Column::name)
            .zip(self.values.iter())
    }

    pub fn into_pairs(self) -> Vec<(String, Datum)> {
        self.columns
            .iter()
            .map(|c| c.name.clone())
            .zip(self.values)
            .collect()
    }

    /// Key the row by column name. A later column shadows an earlier one of the same name.
    pub fn into_map(self) -> IndexMap<String, Datum> {
        let mut map = IndexMap::with_capacity(self.values.len());
        for (name, value) in self.into_pairs() {
            map.insert(name, value);
        }
        map
    }

    /// Read a value by column index.
    pub fn get_idx<'r, T>(&'r self, index: usize) -> Result<T>
    where
        T: Decode<'r>,
    {
        let value = self.values.get(index).ok_or(Error::ColumnIndexOutOfBounds {
            index,
            len: self.values.len(),
        })?;

        T::decode(value).map_err(|source| Error::ColumnDecode {
            column: self.columns[index].name.clone(),
            source,
        })
    }

    /// Read a value by column name. With duplicate names the last column wins, as in
    /// [`into_map`](Self::into_map).
    pub fn get<'r, T>(&'r self, column: &str) -> Result<T>
    where
        T: Decode<'r>,
    {
        let index = self
            .columns
            .iter()
            .rposition(|c| c.name == column)
            .ok_or_else(|| Error::ColumnNotFound(column.into()))?;
        self.get_idx(index)
    }
}

/// The container shape a query collects its rows into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Shape {
    /// Positional rows; duplicate column names are all preserved.
    #[default]
    List,
    /// One name-keyed map per row.
    Map,
}

/// The rows produced by a query, in the requested [`Shape`].
#[derive(Debug, Clone, PartialEq)]
pub enum Rows {
    List(Vec<Row>),
    Map(Vec<IndexMap<String, Datum>>),
}

impl Rows {
    pub(crate) fn collect(rows: Vec<Row>, shape: Shape) -> Self {
        match shape {
            Shape::List => Rows::List(rows),
            Shape::Map => Rows::Map(rows.into_iter().map(Row::into_map).collect()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Rows::List(rows) => rows.len(),
            Rows::Map(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The positional rows, or `None` for the map shape.
    pub fn into_list(self) -> Option<Vec<Row>> {
        match self {
            Rows::List(rows) => Some(rows),
            Rows::Map(_) => None,
        }
    }

    /// The rows as name-keyed maps, converting positional rows if needed.
    pub fn into_maps(self) -> Vec<IndexMap<String, Datum>> {
        match self {
            Rows::List(rows) => rows.into_iter().map(Row::into_map).collect(),
            Rows::Map(rows) => rows,
        }
    }
}
